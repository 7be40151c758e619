//! Error types for sheetsync workflows.

use sheetsync_remote::RemoteError;
use sheetsync_sheet::SheetError;
use sheetsync_stats::StatsError;
use thiserror::Error;

/// Result type for sheetsync workflows.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that end a sync run. None of them are retried.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A record has no value for a column of the destination tab.
    #[error("Record has no value for column '{column}' of tab {tab}")]
    MissingColumn { column: String, tab: String },

    /// The destination tab has no header row to order values by.
    #[error("Tab {tab} has no header row")]
    EmptyHeader { tab: String },

    /// External table is unreadable, lacks expected columns, or holds
    /// non-numeric data in a statistics column.
    #[error("Malformed table: {0}")]
    MalformedTable(String),

    /// Failure reported by the remote store.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// A data source could not produce a sample.
    #[error("Source error: {0}")]
    Source(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SyncError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// True for the store's "name already taken" error.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::Remote(RemoteError::AlreadyExists { .. }))
    }
}

impl From<StatsError> for SyncError {
    fn from(err: StatsError) -> Self {
        Self::MalformedTable(err.to_string())
    }
}

impl From<SheetError> for SyncError {
    fn from(err: SheetError) -> Self {
        match err {
            SheetError::Io(e) => Self::Io(e),
            other => Self::MalformedTable(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetsync_remote::ResourceKind;

    #[test]
    fn test_sheet_io_error_stays_io() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.csv");
        assert!(matches!(SyncError::from(SheetError::Io(io)), SyncError::Io(_)));

        let parse = SheetError::Empty("no header".to_string());
        assert!(matches!(SyncError::from(parse), SyncError::MalformedTable(_)));
    }

    #[test]
    fn test_stats_error_is_malformed_table() {
        let err = SyncError::from(StatsError::MissingColumn("TEMP".to_string()));
        assert!(matches!(err, SyncError::MalformedTable(ref m) if m.contains("TEMP")));
    }

    #[test]
    fn test_already_exists() {
        let err = SyncError::from(RemoteError::already_exists(ResourceKind::Workbook, "Readings"));
        assert!(err.is_already_exists());
        assert_eq!(err.to_string(), "workbook already exists: Readings");
    }
}
