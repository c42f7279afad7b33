use chrono::Utc;
use goal_digger_client::{EventDispatcher, MemoryAuth, MemoryStore, Session, SyncEvent};
use goal_digger_core::{Task, User};
use std::sync::Arc;
use uuid::Uuid;

#[allow(dead_code)]
pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub auth: Arc<MemoryAuth>,
    pub events: Arc<EventDispatcher>,
    pub session: Session<MemoryStore, MemoryAuth>,
}

#[allow(dead_code)]
impl Harness {
    pub fn user_id(&self) -> Uuid {
        self.session.user().map(|u| u.id).unwrap()
    }

    /// Error messages emitted since the last drain.
    pub fn drain_errors(&self) -> Vec<String> {
        self.events
            .drain()
            .unwrap()
            .into_iter()
            .filter_map(|event| match event {
                SyncEvent::Error { message, .. } => Some(message),
                _ => None,
            })
            .collect()
    }
}

#[allow(dead_code)]
pub fn make_user(name: &str) -> User {
    User {
        id: Uuid::new_v4(),
        email: Some(format!("{}@example.com", name.to_lowercase())),
        created_at: Utc::now(),
        user_metadata: serde_json::json!({ "name": name }),
    }
}

/// Seeded store, signed-in user, session started.
#[allow(dead_code)]
pub async fn signed_in_with(store: MemoryStore, user: User) -> Harness {
    let store = Arc::new(store);
    let auth = Arc::new(MemoryAuth::signed_in(user));
    let events = Arc::new(EventDispatcher::new());
    let session = Session::start(store.clone(), auth.clone(), events.clone())
        .await
        .unwrap();
    Harness {
        store,
        auth,
        events,
        session,
    }
}

#[allow(dead_code)]
pub async fn signed_in() -> Harness {
    signed_in_with(MemoryStore::new(), make_user("Ada")).await
}

#[allow(dead_code)]
pub async fn signed_out() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let auth = Arc::new(MemoryAuth::signed_out());
    let events = Arc::new(EventDispatcher::new());
    let session = Session::start(store.clone(), auth.clone(), events.clone())
        .await
        .unwrap();
    Harness {
        store,
        auth,
        events,
        session,
    }
}

#[allow(dead_code)]
pub fn make_task(user_id: Uuid, title: &str, list_id: Option<Uuid>) -> Task {
    Task {
        task_id: Uuid::new_v4(),
        user_id,
        title: title.to_string(),
        description: None,
        completed: false,
        created_at: Utc::now(),
        list_id,
        due_date: None,
    }
}
