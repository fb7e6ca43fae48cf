//! Error types shared across the Last Realm crates.

use thiserror::Error;

/// Top-level error type for operations at the edges of the simulation
/// (configuration, persistence, external collaborators).
#[derive(Debug, Error)]
pub enum LastRealmError {
    /// Configuration could not be read or was invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An external collaborator refused or failed a request
    #[error("External service error: {0}")]
    External(String),
}

/// Result type alias for Last Realm operations.
pub type LastRealmResult<T> = Result<T, LastRealmError>;
