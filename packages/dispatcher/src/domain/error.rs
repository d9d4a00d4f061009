//! Domain error types.

use thiserror::Error;

/// Errors raised while turning a stored document into a `NotificationRecord`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecordError {
    /// Document resource name is not `projects/*/databases/*/documents/...`
    #[error("invalid document path: '{0}'")]
    InvalidDocumentPath(String),

    /// `title`, `body` and `fcmToken` must be strings when present
    #[error("field '{field}' is not a string")]
    NonStringField { field: &'static str },

    /// FCM only accepts string payload values
    #[error("data entry '{key}' is not a string")]
    NonStringData { key: String },

    /// `data` is present but is not a map
    #[error("data field is not a map")]
    DataNotMap,

    /// Registration token must not be empty
    #[error("fcm token is empty")]
    EmptyToken,
}

/// Failures at the push-provider boundary.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PushError {
    #[error("notification has no destination token")]
    MissingToken,

    #[error("push provider rejected the message (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("push provider request failed: {0}")]
    Transport(String),

    #[error("failed to obtain access token: {0}")]
    Auth(String),
}

/// Failures at the storage boundary.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("document not found: '{0}'")]
    NotFound(String),

    #[error("document store rejected the update (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("document store request failed: {0}")]
    Transport(String),

    #[error("failed to obtain access token: {0}")]
    Auth(String),
}
