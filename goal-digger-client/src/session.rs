//! One authenticated session: the resolved user, both synchronization
//! controllers and the selected list filter.
//!
//! Each session owns its collections outright, so several sessions (or tests)
//! can run side by side without sharing state.

use crate::auth::AuthProvider;
use crate::events::{ErrorScope, EventDispatcher};
use crate::lists::ListController;
use crate::profile::ProfileController;
use crate::store::RemoteStore;
use crate::tasks::TaskController;
use goal_digger_core::{ListFilter, SyncResult, Task, User};
use std::sync::Arc;

pub struct Session<S, A> {
    auth: Arc<A>,
    events: Arc<EventDispatcher>,
    user: Option<User>,
    filter: ListFilter,
    tasks: TaskController<S>,
    lists: ListController<S>,
}

impl<S: RemoteStore, A: AuthProvider> Session<S, A> {
    pub fn new(store: Arc<S>, auth: Arc<A>, events: Arc<EventDispatcher>) -> Self {
        Self {
            tasks: TaskController::new(store.clone(), events.clone()),
            lists: ListController::new(store, events.clone()),
            auth,
            events,
            user: None,
            filter: ListFilter::All,
        }
    }

    /// Build a session and resolve its user. Without a signed-in user the
    /// session starts empty and every mutation fails with "user not loaded".
    pub async fn start(store: Arc<S>, auth: Arc<A>, events: Arc<EventDispatcher>) -> SyncResult<Self> {
        let mut session = Self::new(store, auth, events);
        session.resolve_user().await?;
        Ok(session)
    }

    /// Ask the auth collaborator for the current user and, if there is one,
    /// load both collections.
    pub async fn resolve_user(&mut self) -> SyncResult<Option<&User>> {
        let user = match self.auth.current_user().await {
            Ok(user) => user,
            Err(e) => {
                self.events.emit_error(ErrorScope::Session, &e.to_string());
                return Err(e);
            }
        };

        let user_id = user.as_ref().map(|u| u.id);
        self.tasks.set_user(user_id);
        self.lists.set_user(user_id);
        self.user = user;

        match user_id {
            Some(id) => {
                tracing::info!("SESSION: resolved user {}", id);
                self.events.emit_session_started(id);
                let (tasks, lists) = self.refresh().await;
                if let Err(e) = tasks.and(lists) {
                    tracing::warn!("SESSION: initial load incomplete: {}", e);
                }
            }
            None => tracing::info!("SESSION: no signed-in user"),
        }
        Ok(self.user.as_ref())
    }

    /// Reload tasks and lists concurrently. Each result is independent.
    pub async fn refresh(&mut self) -> (SyncResult<()>, SyncResult<()>) {
        tokio::join!(self.tasks.load_all(), self.lists.load_all())
    }

    pub async fn sign_out(&mut self) -> SyncResult<()> {
        if let Err(e) = self.auth.sign_out().await {
            tracing::warn!("SESSION: sign out failed: {}", e);
            self.events.emit_error(ErrorScope::Session, &e.to_string());
            return Err(e);
        }

        self.user = None;
        self.filter = ListFilter::All;
        self.tasks.clear();
        self.lists.clear();
        self.events.emit_signed_out();
        tracing::info!("SESSION: signed out");
        Ok(())
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn filter(&self) -> ListFilter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: ListFilter) {
        self.filter = filter;
    }

    /// Tasks under the selected filter.
    pub fn visible_tasks(&self) -> Vec<&Task> {
        self.tasks.filtered(&self.filter)
    }

    pub fn tasks(&self) -> &TaskController<S> {
        &self.tasks
    }

    pub fn tasks_mut(&mut self) -> &mut TaskController<S> {
        &mut self.tasks
    }

    pub fn lists(&self) -> &ListController<S> {
        &self.lists
    }

    pub fn lists_mut(&mut self) -> &mut ListController<S> {
        &mut self.lists
    }

    pub fn profile(&self) -> ProfileController<A> {
        ProfileController::new(self.auth.clone(), self.events.clone())
    }

    pub fn events(&self) -> Arc<EventDispatcher> {
        self.events.clone()
    }
}
