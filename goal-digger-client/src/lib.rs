pub mod auth;
pub mod config;
pub mod events;
pub mod lists;
pub mod logging;
pub mod memory;
pub mod profile;
pub mod rest;
pub mod session;
pub mod store;
pub mod tasks;

pub use auth::{AccessToken, AuthProvider, RestAuth};
pub use config::ClientConfig;
pub use events::{ErrorScope, EventDispatcher, EventType, SyncEvent};
pub use lists::{Confirm, ListController, DELETE_LIST_PROMPT};
pub use logging::init_logging;
pub use memory::{MemoryAuth, MemoryStore};
pub use profile::ProfileController;
pub use rest::RestStore;
pub use session::Session;
pub use store::RemoteStore;
pub use tasks::TaskController;

/// REST store and auth sharing one access token, built from `config`.
pub fn connect(config: ClientConfig) -> goal_digger_core::SyncResult<(RestStore, RestAuth)> {
    let token = AccessToken::new();
    let store = RestStore::new(config.clone(), token.clone())?;
    let auth = RestAuth::new(config, token)?;
    Ok((store, auth))
}
