//! Remote Access Facade.
//!
//! CRUD over the `tasks` and `lists` collections. Implementations never panic
//! past this boundary: every failure comes back as a `SyncError`, and store
//! failures are reported as `SyncError::Remote` with the backend's message.

use async_trait::async_trait;
use goal_digger_core::{Record, SyncResult};
use uuid::Uuid;

#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Every record of `R`'s collection owned by `owner`.
    async fn select_all<R: Record>(&self, owner: Uuid) -> SyncResult<Vec<R>>;

    /// Insert and return the stored record, including server-assigned fields.
    async fn insert<R: Record>(&self, record: &R::Insert) -> SyncResult<R>;

    /// Apply `patch` to the record with `id` and return the stored result.
    async fn update<R: Record>(&self, id: Uuid, patch: &R::Patch) -> SyncResult<R>;

    async fn delete<R: Record>(&self, id: Uuid) -> SyncResult<()>;
}
