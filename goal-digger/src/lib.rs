//! Goal Digger - personal task manager client
//!
//! This crate provides a unified API over the core types and the client.
//!
//! # Example
//!
//! ```ignore
//! use goal_digger::{connect, ClientConfig, EventDispatcher, Session, TaskForm};
//!
//! let (store, auth) = connect(ClientConfig::from_env()?)?;
//! auth.sign_in_with_password(&Credentials::new(email, password)).await?;
//! let mut session = Session::start(Arc::new(store), Arc::new(auth), Arc::new(EventDispatcher::new())).await?;
//! session.tasks_mut().create(&TaskForm::titled("Milk")).await?;
//! ```

// Re-export client types
pub use goal_digger_client::{
    connect, init_logging, AccessToken, AuthProvider, ClientConfig, Confirm, ErrorScope,
    EventDispatcher, EventType, ListController, MemoryAuth, MemoryStore, ProfileController,
    RemoteStore, RestAuth, RestStore, Session, SyncEvent, TaskController, DELETE_LIST_PROMPT,
};

// Re-export core types that applications need
pub use goal_digger_core::validation::{Credentials, ProfileForm, SignUpForm};
pub use goal_digger_core::{
    derive_filtered_view, List, ListFilter, Profile, SyncError, SyncResult, Task, TaskForm, User,
};
