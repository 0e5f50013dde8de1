use thiserror::Error;

/// Errors produced by the record store and the input layer above it.
///
/// `Validation` and `NotFound` are recoverable: the interactive loop reports
/// them and keeps going. `Storage`/`Io` mean the database itself failed.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("invalid {field}: {reason}")]
    Validation {
        field: &'static str,
        reason: String,
    },

    #[error("no application found with id {id}")]
    NotFound { id: i64 },

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database not initialized; run 'apptrack init' first")]
    Uninitialized,
}

impl TrackerError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        TrackerError::Validation {
            field,
            reason: reason.into(),
        }
    }
}
