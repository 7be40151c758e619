//! Overwrite a tab with a CSV file and summarise what the store returns.

use crate::error::SyncResult;
use serde::Serialize;
use sheetsync_remote::{SheetStore, Workbook};
use sheetsync_sheet::Sheet;
use sheetsync_stats::{summarize, Summary};
use std::path::Path;

/// Result of [`load_and_summarize`].
#[derive(Debug, Clone, Serialize)]
pub struct BulkLoadOutcome {
    /// Header of the tab as read back from the store.
    pub header: Vec<String>,
    /// Data rows written, header excluded.
    pub rows_loaded: usize,
    /// True when a tab of the same name was deleted first.
    pub replaced_existing: bool,
    pub summary: Summary,
}

/// Replace `tab` with the contents of `csv_path`, then read it back and
/// summarise its numeric columns.
///
/// The CSV is checked locally before the store is touched; a missing or
/// non-numeric statistics column fails without any remote write. Running
/// twice with the same file leaves the tab in the same state.
pub async fn load_and_summarize(
    store: &dyn SheetStore,
    workbook: &Workbook,
    tab: &str,
    csv_path: &Path,
    stats_columns: Option<&[String]>,
) -> SyncResult<BulkLoadOutcome> {
    let local = Sheet::from_csv(csv_path)?;
    summarize(&local, stats_columns)?;
    tracing::info!(
        path = %csv_path.display(),
        rows = local.data_row_count(),
        columns = local.col_count(),
        "read CSV"
    );

    let replaced_existing = store.tab_names(workbook).await?.iter().any(|t| t == tab);
    if replaced_existing {
        tracing::warn!(tab, "overwriting existing tab");
        store.delete_tab(workbook, tab).await?;
    }
    store.create_tab(workbook, tab).await?;
    store.insert_rows(workbook, tab, local.data()).await?;
    tracing::info!(tab, rows = local.data_row_count(), "tab loaded");

    let remote = store.fetch_tab(workbook, tab).await?;
    let summary = summarize(&remote, stats_columns)?;

    Ok(BulkLoadOutcome {
        header: remote.column_names().cloned().unwrap_or_default(),
        rows_loaded: local.data_row_count(),
        replaced_existing,
        summary,
    })
}
