//! Task Synchronization Controller.
//!
//! Owns the session's task collection. Every mutation is confirm-then-apply:
//! the remote call is awaited first and the local collection only changes on
//! success. On failure the error is reported and the collection is left as it
//! was. Nothing is retried.

use crate::events::{ErrorScope, EventDispatcher};
use crate::store::RemoteStore;
use goal_digger_core::{
    derive_filtered_view, ListFilter, NewTask, SyncError, SyncResult, Task, TaskForm, TaskPatch,
};
use std::sync::Arc;
use uuid::Uuid;

pub struct TaskController<S> {
    store: Arc<S>,
    events: Arc<EventDispatcher>,
    user_id: Option<Uuid>,
    tasks: Vec<Task>,
    editing: Option<Uuid>,
}

impl<S: RemoteStore> TaskController<S> {
    pub fn new(store: Arc<S>, events: Arc<EventDispatcher>) -> Self {
        Self {
            store,
            events,
            user_id: None,
            tasks: Vec::new(),
            editing: None,
        }
    }

    /// Switching to a different user drops the previous user's tasks.
    pub fn set_user(&mut self, user_id: Option<Uuid>) {
        if self.user_id.is_some() && self.user_id != user_id {
            self.tasks.clear();
            self.editing = None;
            self.publish();
        }
        self.user_id = user_id;
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.user_id
    }

    /// Newest first.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, task_id: &Uuid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.task_id == *task_id)
    }

    pub fn editing(&self) -> Option<Uuid> {
        self.editing
    }

    /// Replace the collection with every task the current user owns.
    pub async fn load_all(&mut self) -> SyncResult<()> {
        let user_id = self.require_user()?;
        let result = self.store.select_all::<Task>(user_id).await;
        let tasks = self.settle(result)?;

        tracing::info!("TASKS: loaded {} tasks for {}", tasks.len(), user_id);
        self.tasks = tasks;
        self.publish();
        Ok(())
    }

    /// Create a task and put it at the front of the collection.
    pub async fn create(&mut self, form: &TaskForm) -> SyncResult<Task> {
        let user_id = self.require_user()?;
        let details = self.report(form.normalize())?;

        tracing::debug!("TASKS: creating '{}'", details.title);
        let result = self
            .store
            .insert::<Task>(&NewTask::new(user_id, details))
            .await;
        let task = self.settle(result)?;

        tracing::info!("TASKS: created {}", task.task_id);
        self.tasks.insert(0, task.clone());
        self.publish();
        Ok(task)
    }

    /// Replace title, description, due date and list reference of an existing task.
    pub async fn update(&mut self, task_id: Uuid, form: &TaskForm) -> SyncResult<Task> {
        self.require_user()?;
        let position = self.position(&task_id)?;
        let details = self.report(form.normalize())?;

        let result = self
            .store
            .update::<Task>(task_id, &TaskPatch::Details(details))
            .await;
        let task = self.settle(result)?;

        tracing::info!("TASKS: updated {}", task_id);
        self.tasks[position] = task.clone();
        self.publish();
        Ok(task)
    }

    /// Set completion to `!current` and flip the local flag once the store agrees.
    pub async fn toggle_completion(&mut self, task_id: Uuid, current: bool) -> SyncResult<()> {
        self.require_user()?;
        let position = self.position(&task_id)?;

        let patch = TaskPatch::Completion {
            completed: !current,
        };
        let result = self.store.update::<Task>(task_id, &patch).await;
        self.settle(result)?;

        tracing::info!("TASKS: {} completed={}", task_id, !current);
        self.tasks[position].completed = !current;
        self.publish();
        Ok(())
    }

    pub async fn delete(&mut self, task_id: Uuid) -> SyncResult<()> {
        self.require_user()?;

        let result = self.store.delete::<Task>(task_id).await;
        self.settle(result)?;

        tracing::info!("TASKS: deleted {}", task_id);
        self.tasks.retain(|t| t.task_id != task_id);
        if self.editing == Some(task_id) {
            self.editing = None;
        }
        self.publish();
        Ok(())
    }

    /// Select a task for editing and return a form prefilled from it.
    pub fn begin_edit(&mut self, task_id: Uuid) -> SyncResult<TaskForm> {
        let task = self.get(&task_id).ok_or(SyncError::NotFound(task_id))?;
        let form = TaskForm::from(task);
        self.editing = Some(task_id);
        Ok(form)
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Save the form against the task selected with `begin_edit`.
    pub async fn submit_edit(&mut self, form: &TaskForm) -> SyncResult<Task> {
        let task_id = self.editing.ok_or_else(|| {
            SyncError::InvalidState("no task selected for editing".to_string())
        });
        let task_id = self.report(task_id)?;

        let task = self.update(task_id, form).await?;
        self.editing = None;
        Ok(task)
    }

    /// Tasks visible under `filter`. Never touches the owned collection.
    pub fn filtered(&self, filter: &ListFilter) -> Vec<&Task> {
        derive_filtered_view(&self.tasks, filter)
    }

    /// Drop everything held for the session.
    pub fn clear(&mut self) {
        self.user_id = None;
        self.tasks.clear();
        self.editing = None;
        self.publish();
    }

    fn require_user(&self) -> SyncResult<Uuid> {
        let user = self.user_id.ok_or(SyncError::UserNotLoaded);
        self.report(user)
    }

    fn position(&self, task_id: &Uuid) -> SyncResult<usize> {
        let position = self
            .tasks
            .iter()
            .position(|t| t.task_id == *task_id)
            .ok_or(SyncError::NotFound(*task_id));
        self.report(position)
    }

    /// Log and surface a remote failure, passing success through untouched.
    fn settle<T>(&self, result: SyncResult<T>) -> SyncResult<T> {
        if let Err(e) = &result {
            tracing::warn!("TASKS: remote call failed: {}", e);
        }
        self.report(result)
    }

    fn report<T>(&self, result: SyncResult<T>) -> SyncResult<T> {
        if let Err(e) = &result {
            self.events.emit_error(ErrorScope::Tasks, &e.to_string());
        }
        result
    }

    fn publish(&self) {
        self.events.emit_tasks_changed(&self.tasks);
    }
}
