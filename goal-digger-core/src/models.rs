use chrono::{DateTime, NaiveDate, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

/// Remote collections the client reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Collection {
    Tasks,
    Lists,
}

/// Ordering applied by `created_at` when a whole collection is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn as_query(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        }
    }
}

/// A stored entity as returned by the remote store.
///
/// Besides describing how a record lives on the wire, the trait carries enough
/// behaviour for a store without server-side logic to assign identifiers and
/// apply patches itself.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Payload sent on insert. The server fills in identifier and timestamp.
    type Insert: Serialize + Send + Sync;
    /// Partial payload sent on update.
    type Patch: Serialize + Send + Sync;

    const COLLECTION: Collection;
    const ID_COLUMN: &'static str;
    const ORDER: SortOrder;

    fn id(&self) -> Uuid;
    fn owner(&self) -> Uuid;
    fn created_at(&self) -> DateTime<Utc>;

    fn materialize(insert: &Self::Insert, id: Uuid, created_at: DateTime<Utc>) -> Self;
    fn apply(&mut self, patch: &Self::Patch);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub task_id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub list_id: Option<Uuid>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

impl Task {
    pub fn description_or_default(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    /// Whether the task refers to the given list. Dangling references still match.
    pub fn belongs_to(&self, list_id: &Uuid) -> bool {
        self.list_id.as_ref() == Some(list_id)
    }
}

/// Editable task fields, already normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDetails {
    pub title: String,
    pub description: String,
    pub list_id: Option<Uuid>,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTask {
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub list_id: Option<Uuid>,
    pub due_date: Option<NaiveDate>,
}

impl NewTask {
    pub fn new(user_id: Uuid, details: TaskDetails) -> Self {
        Self {
            user_id,
            title: details.title,
            description: details.description,
            completed: false,
            list_id: details.list_id,
            due_date: details.due_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TaskPatch {
    /// Completion toggle only.
    Completion { completed: bool },
    /// Edit in place: title, description, due date and list reference are all replaced.
    Details(TaskDetails),
}

impl Record for Task {
    type Insert = NewTask;
    type Patch = TaskPatch;

    const COLLECTION: Collection = Collection::Tasks;
    const ID_COLUMN: &'static str = "task_id";
    const ORDER: SortOrder = SortOrder::Descending;

    fn id(&self) -> Uuid {
        self.task_id
    }

    fn owner(&self) -> Uuid {
        self.user_id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn materialize(insert: &NewTask, id: Uuid, created_at: DateTime<Utc>) -> Self {
        Task {
            task_id: id,
            user_id: insert.user_id,
            title: insert.title.clone(),
            description: Some(insert.description.clone()),
            completed: insert.completed,
            created_at,
            list_id: insert.list_id,
            due_date: insert.due_date,
        }
    }

    fn apply(&mut self, patch: &TaskPatch) {
        match patch {
            TaskPatch::Completion { completed } => self.completed = *completed,
            TaskPatch::Details(details) => {
                self.title = details.title.clone();
                self.description = Some(details.description.clone());
                self.list_id = details.list_id;
                self.due_date = details.due_date;
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct List {
    pub list_id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewList {
    pub user_id: Uuid,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListPatch {
    pub title: String,
}

impl Record for List {
    type Insert = NewList;
    type Patch = ListPatch;

    const COLLECTION: Collection = Collection::Lists;
    const ID_COLUMN: &'static str = "list_id";
    const ORDER: SortOrder = SortOrder::Ascending;

    fn id(&self) -> Uuid {
        self.list_id
    }

    fn owner(&self) -> Uuid {
        self.user_id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn materialize(insert: &NewList, id: Uuid, created_at: DateTime<Utc>) -> Self {
        List {
            list_id: id,
            user_id: insert.user_id,
            title: insert.title.clone(),
            created_at,
        }
    }

    fn apply(&mut self, patch: &ListPatch) {
        self.title = patch.title.clone();
    }
}

/// Authenticated user as reported by the auth backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub user_metadata: serde_json::Value,
}

impl User {
    /// Display name stored under `user_metadata.name`, or an empty string.
    pub fn display_name(&self) -> &str {
        self.user_metadata
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub display_name: String,
}

impl From<&User> for Profile {
    fn from(user: &User) -> Self {
        Profile {
            email: user.email.clone().unwrap_or_default(),
            created_at: user.created_at,
            display_name: user.display_name().to_string(),
        }
    }
}

/// Attribute changes accepted by the auth backend's user update endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl UserAttributes {
    pub fn display_name(name: &str) -> Self {
        Self {
            password: None,
            data: Some(serde_json::json!({ "name": name })),
        }
    }

    pub fn password(password: &str) -> Self {
        Self {
            password: Some(password.to_string()),
            data: None,
        }
    }
}
