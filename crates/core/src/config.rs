//! Run configuration, loaded from YAML and overridden from the command line.

use crate::error::{SyncError, SyncResult};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sheetsync_remote::GoogleSheetsConfig;
use sheetsync_sheet::CellValue;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable that overrides `remote.access_token`.
pub const ACCESS_TOKEN_ENV: &str = "SHEETSYNC_ACCESS_TOKEN";

/// Timestamp column used when the layout declares none.
pub const DEFAULT_TIMESTAMP_COLUMN: &str = "DATETIME";

/// Placeholder written to numeric columns of a freshly provisioned tab.
pub const SEED_NUMBER: f64 = 99.99999;

/// Type a provisioned column is seeded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Timestamp,
    Number,
}

/// A column of the provisioned layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub kind: ColumnKind,
}

impl ColumnSpec {
    pub fn timestamp(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ColumnKind::Timestamp,
        }
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ColumnKind::Number,
        }
    }

    /// Example value that lets the store infer the column's type.
    pub fn seed_value(&self, now: NaiveDateTime) -> CellValue {
        match self.kind {
            ColumnKind::Timestamp => CellValue::DateTime(now),
            ColumnKind::Number => CellValue::Float(SEED_NUMBER),
        }
    }
}

/// The four-column sensor layout: a timestamp and three readings.
pub fn default_columns() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::timestamp("DATETIME"),
        ColumnSpec::number("TEMP"),
        ColumnSpec::number("HUMIDITY"),
        ColumnSpec::number("PRESSURE"),
    ]
}

/// First name that appears more than once in `names`.
pub fn first_duplicate(names: &[String]) -> Option<&str> {
    let mut seen = HashSet::new();
    names
        .iter()
        .find(|name| !seen.insert(name.as_str()))
        .map(String::as_str)
}

/// Where sampled records come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SourceConfig {
    /// Fixed readings, for running without sensor hardware.
    Simulated,
    /// Replay the rows of a CSV file.
    Csv { path: PathBuf },
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig::Simulated
    }
}

/// Everything a run needs besides the mode.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    /// Workbook name; unique per account.
    pub workbook: String,
    /// Account granted write access when provisioning.
    pub share_with: Option<String>,
    pub share_message: Option<String>,
    /// Tabs created when provisioning.
    pub tabs: Vec<String>,
    /// Tab the sampling loop appends to.
    pub append_tab: String,
    /// Column layout seeded when provisioning.
    pub columns: Vec<ColumnSpec>,
    /// Samples to take; `None` runs until interrupted.
    pub sample_count: Option<u64>,
    /// Pause between samples. Keeps the run under the store's request-rate
    /// ceiling; must be at least one second.
    pub interval_secs: u64,
    pub source: SourceConfig,
    /// Tab the bulk loader overwrites.
    pub bulk_tab: String,
    /// CSV file for the bulk loader.
    pub csv_path: Option<PathBuf>,
    /// Columns to summarise; every numeric column when unset.
    pub stats_columns: Option<Vec<String>>,
    pub remote: GoogleSheetsConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            workbook: "RaspberryPiSenseHatReadings".to_string(),
            share_with: None,
            share_message: Some("I'm sharing this spreadsheet with you!".to_string()),
            tabs: vec!["GroupA".to_string(), "GroupB".to_string()],
            append_tab: "GroupA".to_string(),
            columns: default_columns(),
            sample_count: Some(100),
            interval_secs: 1,
            source: SourceConfig::Simulated,
            bulk_tab: "AstroPi".to_string(),
            csv_path: None,
            stats_columns: None,
            remote: GoogleSheetsConfig::default(),
        }
    }
}

impl SyncConfig {
    /// Load configuration from a YAML file. Missing keys take defaults.
    pub fn from_file(path: impl AsRef<Path>) -> SyncResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
            .map_err(|e| SyncError::config(format!("{}: {e}", path.display())))
    }

    pub fn from_yaml_str(text: &str) -> SyncResult<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).map_err(|e| SyncError::config(e.to_string()))
    }

    /// Take the access token from [`ACCESS_TOKEN_ENV`] when it is set.
    #[must_use]
    pub fn with_env(self) -> Self {
        match std::env::var(ACCESS_TOKEN_ENV) {
            Ok(token) if !token.trim().is_empty() => self.with_access_token(token),
            _ => self,
        }
    }

    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.remote.access_token = Some(token.into());
        self
    }

    /// Name of the first timestamp-typed column, `DATETIME` when none is.
    pub fn timestamp_column(&self) -> &str {
        self.columns
            .iter()
            .find(|c| c.kind == ColumnKind::Timestamp)
            .map_or(DEFAULT_TIMESTAMP_COLUMN, |c| c.name.as_str())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Check values every mode relies on.
    pub fn validate(&self) -> SyncResult<()> {
        if self.workbook.trim().is_empty() {
            return Err(SyncError::config("workbook name is empty"));
        }
        if self.interval_secs == 0 {
            return Err(SyncError::config(
                "interval_secs must be at least 1 to stay under the store's rate limit",
            ));
        }
        if self.tabs.is_empty() || self.tabs.iter().any(|t| t.trim().is_empty()) {
            return Err(SyncError::config("tabs must list at least one non-empty name"));
        }
        if let Some(tab) = first_duplicate(&self.tabs) {
            return Err(SyncError::config(format!("tab '{tab}' is listed twice")));
        }
        if self.columns.is_empty() {
            return Err(SyncError::config("columns must not be empty"));
        }
        if self.append_tab.trim().is_empty() {
            return Err(SyncError::config("append_tab is empty"));
        }
        Ok(())
    }
}
