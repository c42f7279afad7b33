//! # REST Backend Tests
//!
//! Drives `RestStore` and `RestAuth` against a small axum stand-in for the
//! hosted backend, bound to an ephemeral local port.

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use goal_digger_client::{
    connect, AuthProvider, ClientConfig, EventDispatcher, RemoteStore, Session, SyncEvent,
};
use goal_digger_core::validation::Credentials;
use goal_digger_core::{SyncError, Task, TaskForm};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

const ANON_KEY: &str = "anon-key";
const ACCESS_TOKEN: &str = "token-ada";
const PASSWORD: &str = "Secret1";

#[derive(Clone)]
struct Backend {
    user: Value,
    tasks: Arc<Mutex<Vec<Value>>>,
}

impl Backend {
    fn new() -> Self {
        Self {
            user: json!({
                "id": Uuid::new_v4(),
                "email": "ada@example.com",
                "created_at": Utc::now(),
                "user_metadata": { "name": "Ada" },
            }),
            tasks: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn user_id(&self) -> String {
        self.user["id"].as_str().unwrap_or_default().to_string()
    }
}

fn reject(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

fn authorized(headers: &HeaderMap) -> bool {
    let bearer = format!("Bearer {}", ACCESS_TOKEN);
    headers.get("apikey").and_then(|v| v.to_str().ok()) == Some(ANON_KEY)
        && headers.get("authorization").and_then(|v| v.to_str().ok()) == Some(bearer.as_str())
}

fn eq_filter<'a>(query: &'a HashMap<String, String>, column: &str) -> Option<&'a str> {
    query.get(column).and_then(|v| v.strip_prefix("eq."))
}

async fn select_tasks(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&headers) {
        return reject(StatusCode::UNAUTHORIZED, "JWT expired");
    }
    let Some(owner) = eq_filter(&query, "user_id") else {
        return reject(StatusCode::BAD_REQUEST, "missing owner filter");
    };
    let mut rows: Vec<Value> = backend
        .tasks
        .lock()
        .unwrap()
        .iter()
        .filter(|row| row["user_id"] == owner)
        .cloned()
        .collect();
    if query.get("order").map(String::as_str) == Some("created_at.desc") {
        rows.reverse();
    }
    Json(rows).into_response()
}

async fn insert_tasks(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Json(body): Json<Vec<Value>>,
) -> Response {
    if !authorized(&headers) {
        return reject(StatusCode::UNAUTHORIZED, "JWT expired");
    }
    let mut stored = Vec::new();
    for mut row in body {
        if row["due_date"] == "" {
            return reject(StatusCode::BAD_REQUEST, "invalid input syntax for type date: \"\"");
        }
        row["task_id"] = json!(Uuid::new_v4());
        row["created_at"] = json!(Utc::now());
        backend.tasks.lock().unwrap().push(row.clone());
        stored.push(row);
    }
    (StatusCode::CREATED, Json(stored)).into_response()
}

async fn update_tasks(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    Json(patch): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return reject(StatusCode::UNAUTHORIZED, "JWT expired");
    }
    let id = eq_filter(&query, "task_id").unwrap_or_default();
    let mut tasks = backend.tasks.lock().unwrap();
    let mut updated = Vec::new();
    for row in tasks.iter_mut().filter(|row| row["task_id"] == id) {
        if let (Some(target), Some(fields)) = (row.as_object_mut(), patch.as_object()) {
            for (key, value) in fields {
                target.insert(key.clone(), value.clone());
            }
        }
        updated.push(row.clone());
    }
    Json(updated).into_response()
}

async fn delete_tasks(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&headers) {
        return reject(StatusCode::UNAUTHORIZED, "JWT expired");
    }
    let id = eq_filter(&query, "task_id").unwrap_or_default().to_string();
    backend.tasks.lock().unwrap().retain(|row| row["task_id"] != id.as_str());
    StatusCode::NO_CONTENT.into_response()
}

async fn lists_forbidden() -> Response {
    reject(StatusCode::FORBIDDEN, "permission denied for table lists")
}

async fn token(State(backend): State<Backend>, Json(body): Json<Value>) -> Response {
    if body["password"] != PASSWORD {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_grant",
                "error_description": "Invalid login credentials",
            })),
        )
            .into_response();
    }
    Json(json!({
        "access_token": ACCESS_TOKEN,
        "token_type": "bearer",
        "user": backend.user,
    }))
    .into_response()
}

async fn current_user(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return reject(StatusCode::UNAUTHORIZED, "invalid JWT");
    }
    Json(backend.user.clone()).into_response()
}

async fn logout(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return reject(StatusCode::UNAUTHORIZED, "invalid JWT");
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn spawn_backend(backend: Backend) -> ClientConfig {
    let app = Router::new()
        .route(
            "/rest/v1/tasks",
            get(select_tasks)
                .post(insert_tasks)
                .patch(update_tasks)
                .delete(delete_tasks),
        )
        .route("/rest/v1/lists", get(lists_forbidden).post(lists_forbidden))
        .route("/auth/v1/token", post(token))
        .route("/auth/v1/user", get(current_user))
        .route("/auth/v1/logout", post(logout))
        .with_state(backend);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    ClientConfig::new(format!("http://{}", addr), ANON_KEY)
}

#[tokio::test]
async fn test_signed_out_client_has_no_user() {
    let config = spawn_backend(Backend::new()).await;
    let (_store, auth) = connect(config).unwrap();
    assert_eq!(auth.current_user().await.unwrap(), None);
}

#[tokio::test]
async fn test_wrong_password_reports_backend_message() {
    let config = spawn_backend(Backend::new()).await;
    let (_store, auth) = connect(config).unwrap();

    let result = auth
        .sign_in_with_password(&Credentials::new("ada@example.com", "Wrong99"))
        .await;
    assert_eq!(
        result.unwrap_err(),
        SyncError::Remote("Invalid login credentials".into())
    );
}

#[tokio::test]
async fn test_invalid_credentials_never_leave_the_client() {
    let (_store, auth) = connect(ClientConfig::new("http://127.0.0.1:9", ANON_KEY)).unwrap();
    let result = auth
        .sign_in_with_password(&Credentials::new("not-an-email", "x"))
        .await;
    assert!(matches!(result, Err(SyncError::Validation(_))));
}

#[tokio::test]
async fn test_session_round_trip_over_rest() {
    let backend = Backend::new();
    let owner = backend.user_id();
    backend.tasks.lock().unwrap().extend([
        json!({
            "task_id": Uuid::new_v4(),
            "user_id": owner,
            "title": "Existing",
            "description": null,
            "completed": false,
            "created_at": Utc::now(),
            "list_id": null,
            "due_date": null,
        }),
        json!({
            "task_id": Uuid::new_v4(),
            "user_id": Uuid::new_v4(),
            "title": "Not mine",
            "completed": false,
            "created_at": Utc::now(),
        }),
    ]);
    let config = spawn_backend(backend.clone()).await;

    let (store, auth) = connect(config).unwrap();
    auth.sign_in_with_password(&Credentials::new("ada@example.com", PASSWORD))
        .await
        .unwrap();

    let events = Arc::new(EventDispatcher::new());
    let mut session = Session::start(Arc::new(store), Arc::new(auth), events.clone())
        .await
        .unwrap();

    let titles: Vec<&str> = session
        .tasks()
        .tasks()
        .iter()
        .map(|t| t.title.as_str())
        .collect();
    assert_eq!(titles, vec!["Existing"]);

    // lists are forbidden by the stand-in backend
    assert!(session.lists().lists().is_empty());
    assert!(events.drain().unwrap().contains(&SyncEvent::Error {
        scope: goal_digger_client::ErrorScope::Lists,
        message: "permission denied for table lists".into(),
    }));

    let created = session
        .tasks_mut()
        .create(&TaskForm::titled("Milk").with_due_date(" "))
        .await
        .unwrap();
    assert_eq!(session.tasks().tasks()[0], created);
    {
        let rows = backend.tasks.lock().unwrap();
        let row = rows.iter().find(|r| r["title"] == "Milk").unwrap();
        assert_eq!(row["due_date"], Value::Null);
        assert_eq!(row["user_id"], owner.as_str());
    }

    session
        .tasks_mut()
        .toggle_completion(created.task_id, false)
        .await
        .unwrap();
    assert!(session.tasks().get(&created.task_id).unwrap().completed);

    session.tasks_mut().delete(created.task_id).await.unwrap();
    assert_eq!(session.tasks().tasks().len(), 1);

    session.sign_out().await.unwrap();
    assert!(session.user().is_none());
}

#[tokio::test]
async fn test_update_of_vanished_row_is_not_found() {
    let backend = Backend::new();
    let config = spawn_backend(backend).await;
    let (store, auth) = connect(config).unwrap();
    auth.sign_in_with_password(&Credentials::new("ada@example.com", PASSWORD))
        .await
        .unwrap();

    let id = Uuid::new_v4();
    let result = store
        .update::<Task>(id, &goal_digger_core::TaskPatch::Completion { completed: true })
        .await;
    assert_eq!(result.unwrap_err(), SyncError::NotFound(id));
}
