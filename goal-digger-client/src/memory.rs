//! In-process store and auth collaborators, used by tests and offline demos.
//!
//! Rows are kept as JSON so one store serves every `Record` type, the same way
//! the hosted backend only ever sees serialized payloads.

use crate::auth::AuthProvider;
use crate::store::RemoteStore;
use async_trait::async_trait;
use chrono::Utc;
use goal_digger_core::{
    Collection, Record, SortOrder, SyncError, SyncResult, User, UserAttributes,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<Collection, Vec<Value>>>,
    failures: Mutex<HashMap<Collection, String>>,
    requests: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every request against `collection` fail with `message` until `recover` is called.
    pub async fn fail_with(&self, collection: Collection, message: impl Into<String>) {
        self.failures.lock().await.insert(collection, message.into());
    }

    pub async fn recover(&self, collection: Collection) {
        self.failures.lock().await.remove(&collection);
    }

    /// Number of requests received so far, failed ones included.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Store a record directly, bypassing request accounting.
    pub async fn seed<R: Record>(&self, record: &R) -> SyncResult<()> {
        let row = serde_json::to_value(record)?;
        self.tables
            .lock()
            .await
            .entry(R::COLLECTION)
            .or_default()
            .push(row);
        Ok(())
    }

    /// Every stored record of `R`'s collection regardless of owner, in insertion order.
    pub async fn rows<R: Record>(&self) -> SyncResult<Vec<R>> {
        let tables = self.tables.lock().await;
        tables
            .get(&R::COLLECTION)
            .map(|rows| rows.iter().cloned().map(serde_json::from_value).collect())
            .unwrap_or_else(|| Ok(Vec::new()))
            .map_err(SyncError::from)
    }

    async fn begin(&self, collection: Collection) -> SyncResult<()> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        match self.failures.lock().await.get(&collection) {
            Some(message) => Err(SyncError::Remote(message.clone())),
            None => Ok(()),
        }
    }

    fn row_matches<R: Record>(row: &Value, id: &Uuid) -> bool {
        row.get(R::ID_COLUMN).and_then(Value::as_str) == Some(id.to_string().as_str())
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn select_all<R: Record>(&self, owner: Uuid) -> SyncResult<Vec<R>> {
        self.begin(R::COLLECTION).await?;

        let tables = self.tables.lock().await;
        let mut records = Vec::new();
        for row in tables.get(&R::COLLECTION).into_iter().flatten() {
            let record: R = serde_json::from_value(row.clone())?;
            if record.owner() == owner {
                records.push(record);
            }
        }
        records.sort_by_key(|r| r.created_at());
        if R::ORDER == SortOrder::Descending {
            records.reverse();
        }

        tracing::debug!(
            "MEMORY: selected {} rows from {} for {}",
            records.len(),
            R::COLLECTION,
            owner
        );
        Ok(records)
    }

    async fn insert<R: Record>(&self, record: &R::Insert) -> SyncResult<R> {
        self.begin(R::COLLECTION).await?;

        let stored = R::materialize(record, Uuid::new_v4(), Utc::now());
        let row = serde_json::to_value(&stored)?;
        self.tables
            .lock()
            .await
            .entry(R::COLLECTION)
            .or_default()
            .push(row);
        Ok(stored)
    }

    async fn update<R: Record>(&self, id: Uuid, patch: &R::Patch) -> SyncResult<R> {
        self.begin(R::COLLECTION).await?;

        let mut tables = self.tables.lock().await;
        let row = tables
            .get_mut(&R::COLLECTION)
            .and_then(|rows| rows.iter_mut().find(|row| Self::row_matches::<R>(row, &id)))
            .ok_or(SyncError::NotFound(id))?;

        let mut record: R = serde_json::from_value(row.clone())?;
        record.apply(patch);
        *row = serde_json::to_value(&record)?;
        Ok(record)
    }

    async fn delete<R: Record>(&self, id: Uuid) -> SyncResult<()> {
        self.begin(R::COLLECTION).await?;

        if let Some(rows) = self.tables.lock().await.get_mut(&R::COLLECTION) {
            rows.retain(|row| !Self::row_matches::<R>(row, &id));
        }
        Ok(())
    }
}

/// Auth collaborator holding at most one signed-in user.
#[derive(Default)]
pub struct MemoryAuth {
    user: Mutex<Option<User>>,
    password: Mutex<Option<String>>,
    failure: Mutex<Option<String>>,
}

impl MemoryAuth {
    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn signed_in(user: User) -> Self {
        Self {
            user: Mutex::new(Some(user)),
            ..Self::default()
        }
    }

    /// A fresh user with the given display name.
    pub fn with_new_user(email: &str, display_name: &str) -> Self {
        Self::signed_in(User {
            id: Uuid::new_v4(),
            email: Some(email.to_string()),
            created_at: Utc::now(),
            user_metadata: serde_json::json!({ "name": display_name }),
        })
    }

    /// Make `update_user` and `sign_out` fail with `message` until cleared with `None`.
    pub async fn fail_with(&self, message: Option<String>) {
        *self.failure.lock().await = message;
    }

    /// Replace the signed-in user, as if another account had signed in.
    pub async fn switch_user(&self, user: Option<User>) {
        *self.user.lock().await = user;
    }

    pub async fn password(&self) -> Option<String> {
        self.password.lock().await.clone()
    }

    async fn check(&self) -> SyncResult<()> {
        match self.failure.lock().await.as_ref() {
            Some(message) => Err(SyncError::Remote(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl AuthProvider for MemoryAuth {
    async fn current_user(&self) -> SyncResult<Option<User>> {
        Ok(self.user.lock().await.clone())
    }

    async fn update_user(&self, attributes: &UserAttributes) -> SyncResult<User> {
        self.check().await?;

        let mut guard = self.user.lock().await;
        let user = guard.as_mut().ok_or(SyncError::UserNotLoaded)?;
        if let Some(Value::Object(data)) = &attributes.data {
            if !user.user_metadata.is_object() {
                user.user_metadata = Value::Object(Default::default());
            }
            if let Value::Object(metadata) = &mut user.user_metadata {
                metadata.extend(data.clone());
            }
        }
        if let Some(password) = &attributes.password {
            *self.password.lock().await = Some(password.clone());
        }
        Ok(user.clone())
    }

    async fn sign_out(&self) -> SyncResult<()> {
        self.check().await?;
        *self.user.lock().await = None;
        Ok(())
    }
}
