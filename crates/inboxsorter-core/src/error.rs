//! Error types for the core library.

use thiserror::Error;

use crate::service::MailError;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rules could not be loaded.
    #[error("Rule load error: {0}")]
    RuleLoad(#[from] RuleLoadError),

    /// Address cache could not be read.
    #[error(transparent)]
    CacheLoad(#[from] CacheLoadError),

    /// Address cache could not be written.
    #[error(transparent)]
    CacheSave(#[from] CacheSaveError),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// A problem with rule data.
///
/// `MalformedRow` is reported per row and never aborts a load;
/// `SourceUnavailable` aborts the load for the current run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleLoadError {
    /// A row is missing a required field.
    #[error("malformed row {index} in group '{group}': {reason}")]
    MalformedRow {
        /// Name of the group (sheet) the row came from.
        group: String,
        /// Position of the row inside its group.
        index: usize,
        /// What is wrong with the row.
        reason: String,
    },

    /// The rule source could not be read at all.
    #[error("rule source unavailable: {0}")]
    SourceUnavailable(String),
}

/// The backing store could not be read at startup.
#[derive(Debug, Error)]
#[error("failed to load address cache: {0}")]
pub struct CacheLoadError(#[from] pub sqlx::Error);

/// The backing store could not be written during a flush.
#[derive(Debug, Error)]
#[error("failed to save address cache: {0}")]
pub struct CacheSaveError(#[from] pub sqlx::Error);

/// The directory lookup collaborator failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("directory lookup failed: {0}")]
pub struct ResolveError(pub String);

/// A message could not be evaluated.
#[derive(Debug, Error)]
#[error("failed to evaluate message: {0}")]
pub struct ClassificationError(#[from] pub MailError);

/// A move or delete could not be applied.
#[derive(Debug, Error)]
#[error("action for destination '{destination}' failed: {source}")]
pub struct ActionError {
    /// Destination the message was being routed to.
    pub destination: String,
    /// Underlying mail object failure.
    #[source]
    pub source: MailError,
}
