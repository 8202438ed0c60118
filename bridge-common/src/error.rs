//! Common error types for Bridge

use std::collections::BTreeMap;

use thiserror::Error;

use crate::persistence::PersistenceError;

/// Common result type for Bridge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across Bridge components
///
/// Converted persistence errors keep their kind so callers can branch on it:
/// `EntityAlreadyExists`, `ConcurrentModification` and `ConstraintViolation`
/// always carry a fixed, user-facing message.
#[derive(Error, Debug)]
pub enum Error {
    /// Persistence failure that matched no known pattern, passed through unchanged
    #[error(transparent)]
    Persistence(PersistenceError),

    /// A record with the same unique key already exists
    #[error("{message}")]
    EntityAlreadyExists {
        entity_type: String,
        entity_keys: BTreeMap<String, String>,
        message: String,
    },

    /// Write rejected because the record version was stale
    #[error("{0}")]
    ConcurrentModification(String),

    /// Write rejected by a constraint that could not be attributed to a field
    #[error("{0}")]
    ConstraintViolation(String),

    /// Entity failed validation; `errors` maps field paths to messages
    #[error("{message}")]
    InvalidEntity {
        message: String,
        errors: BTreeMap<String, Vec<String>>,
    },

    /// Malformed input document
    #[error("Parse error: {0}")]
    Parse(String),

    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Entity keys of an `EntityAlreadyExists` error
    pub fn entity_keys(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            Error::EntityAlreadyExists { entity_keys, .. } => Some(entity_keys),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Parse(err.to_string())
    }
}
