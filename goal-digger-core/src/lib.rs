pub mod errors;
pub mod filter;
pub mod models;
pub mod normalize;
pub mod validation;

pub use errors::{SyncError, SyncResult};
pub use filter::{derive_filtered_view, ListFilter};
pub use models::*;
pub use normalize::TaskForm;
