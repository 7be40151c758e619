//! Error types for remote store access.

use std::fmt;
use thiserror::Error;

/// Result type for remote store operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// What a remote error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Workbook,
    Tab,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Workbook => write!(f, "workbook"),
            ResourceKind::Tab => write!(f, "tab"),
        }
    }
}

/// Errors reported by a remote spreadsheet store.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// A workbook or tab with this name already exists.
    #[error("{kind} already exists: {name}")]
    AlreadyExists { kind: ResourceKind, name: String },

    /// No workbook or tab with this name.
    #[error("{kind} not found: {name}")]
    NotFound { kind: ResourceKind, name: String },

    /// Transport or authentication failure; the store could not be reached
    /// or refused the credentials.
    #[error("Remote store unavailable: {0}")]
    Unavailable(String),

    /// Any other non-success response.
    #[error("Remote store error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Response body did not have the expected shape.
    #[error("Failed to decode remote response: {0}")]
    Decode(String),

    /// Configured endpoint is not a usable base URL.
    #[error("Invalid store URL: {0}")]
    InvalidUrl(String),
}

impl RemoteError {
    pub fn already_exists(kind: ResourceKind, name: impl Into<String>) -> Self {
        Self::AlreadyExists {
            kind,
            name: name.into(),
        }
    }

    pub fn not_found(kind: ResourceKind, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }
}
