//! List Synchronization Controller.

use crate::events::{ErrorScope, EventDispatcher};
use crate::store::RemoteStore;
use goal_digger_core::normalize::list_title;
use goal_digger_core::{List, ListPatch, NewList, SyncError, SyncResult};
use std::sync::Arc;
use uuid::Uuid;

pub const DELETE_LIST_PROMPT: &str =
    "Are you sure you want to delete this list? Tasks in this list will not be deleted.";

/// Interactive "are you sure" gate for destructive actions.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

pub struct ListController<S> {
    store: Arc<S>,
    events: Arc<EventDispatcher>,
    user_id: Option<Uuid>,
    lists: Vec<List>,
}

impl<S: RemoteStore> ListController<S> {
    pub fn new(store: Arc<S>, events: Arc<EventDispatcher>) -> Self {
        Self {
            store,
            events,
            user_id: None,
            lists: Vec::new(),
        }
    }

    /// Switching to a different user drops the previous user's lists.
    pub fn set_user(&mut self, user_id: Option<Uuid>) {
        if self.user_id.is_some() && self.user_id != user_id {
            self.lists.clear();
            self.publish();
        }
        self.user_id = user_id;
    }

    /// Oldest first.
    pub fn lists(&self) -> &[List] {
        &self.lists
    }

    /// Title of the referenced list. `None` for dangling references.
    pub fn title_of(&self, list_id: &Uuid) -> Option<&str> {
        self.lists
            .iter()
            .find(|l| l.list_id == *list_id)
            .map(|l| l.title.as_str())
    }

    pub async fn load_all(&mut self) -> SyncResult<()> {
        let user_id = self.require_user()?;
        let result = self.store.select_all::<List>(user_id).await;
        let lists = self.settle(result)?;

        tracing::info!("LISTS: loaded {} lists for {}", lists.len(), user_id);
        self.lists = lists;
        self.publish();
        Ok(())
    }

    /// Create a list and append it to the collection.
    pub async fn create(&mut self, title: &str) -> SyncResult<List> {
        let user_id = self.require_user()?;
        let title = self.report(list_title(title))?;

        let result = self
            .store
            .insert::<List>(&NewList { user_id, title })
            .await;
        let list = self.settle(result)?;

        tracing::info!("LISTS: created {} '{}'", list.list_id, list.title);
        self.lists.push(list.clone());
        self.publish();
        Ok(list)
    }

    pub async fn rename(&mut self, list_id: Uuid, new_title: &str) -> SyncResult<List> {
        self.require_user()?;
        let title = self.report(list_title(new_title))?;
        let position = self.position(&list_id)?;

        let result = self
            .store
            .update::<List>(list_id, &ListPatch { title })
            .await;
        let list = self.settle(result)?;

        tracing::info!("LISTS: renamed {} to '{}'", list_id, list.title);
        self.lists[position] = list.clone();
        self.publish();
        Ok(list)
    }

    /// Delete a list after `confirm` agrees. Tasks referencing it are left alone.
    ///
    /// Returns `Ok(false)` when the user declines; nothing is sent in that case.
    pub async fn delete(&mut self, list_id: Uuid, confirm: &(dyn Confirm + Sync)) -> SyncResult<bool> {
        self.require_user()?;

        if !confirm.confirm(DELETE_LIST_PROMPT) {
            tracing::debug!("LISTS: deletion of {} declined", list_id);
            return Ok(false);
        }

        let result = self.store.delete::<List>(list_id).await;
        self.settle(result)?;

        tracing::info!("LISTS: deleted {}", list_id);
        self.lists.retain(|l| l.list_id != list_id);
        self.publish();
        Ok(true)
    }

    pub fn clear(&mut self) {
        self.user_id = None;
        self.lists.clear();
        self.publish();
    }

    fn require_user(&self) -> SyncResult<Uuid> {
        let user = self.user_id.ok_or(SyncError::UserNotLoaded);
        self.report(user)
    }

    fn position(&self, list_id: &Uuid) -> SyncResult<usize> {
        let position = self
            .lists
            .iter()
            .position(|l| l.list_id == *list_id)
            .ok_or(SyncError::NotFound(*list_id));
        self.report(position)
    }

    fn settle<T>(&self, result: SyncResult<T>) -> SyncResult<T> {
        if let Err(e) = &result {
            tracing::warn!("LISTS: remote call failed: {}", e);
        }
        self.report(result)
    }

    fn report<T>(&self, result: SyncResult<T>) -> SyncResult<T> {
        if let Err(e) = &result {
            self.events.emit_error(ErrorScope::Lists, &e.to_string());
        }
        result
    }

    fn publish(&self) {
        self.events.emit_lists_changed(&self.lists);
    }
}
