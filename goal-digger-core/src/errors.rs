use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyncError {
    /// A required field was blank or malformed. Raised before any remote call.
    #[error("{0}")]
    Validation(String),

    /// No authenticated user has been resolved for this session yet.
    #[error("user not loaded")]
    UserNotLoaded,

    /// Failure reported by the remote store or auth backend, kept verbatim.
    #[error("{0}")]
    Remote(String),

    #[error("Record not found: {0}")]
    NotFound(uuid::Uuid),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl SyncError {
    pub fn validation(message: impl Into<String>) -> Self {
        SyncError::Validation(message.into())
    }

    pub fn remote(message: impl Into<String>) -> Self {
        SyncError::Remote(message.into())
    }

    /// True for errors raised locally, before the network was touched.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            SyncError::Validation(_) | SyncError::UserNotLoaded | SyncError::InvalidState(_)
        )
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Serialization(err.to_string())
    }
}

impl From<uuid::Error> for SyncError {
    fn from(err: uuid::Error) -> Self {
        SyncError::Validation(err.to_string())
    }
}

impl From<chrono::ParseError> for SyncError {
    fn from(err: chrono::ParseError) -> Self {
        SyncError::Validation(err.to_string())
    }
}

pub type SyncResult<T> = Result<T, SyncError>;
