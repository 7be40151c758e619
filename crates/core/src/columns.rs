//! Column order of a destination tab, read from its header row.

use crate::error::SyncResult;
use sheetsync_remote::{SheetStore, Workbook};
use std::fmt;

/// Ordered column labels of a tab's header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnOrder(Vec<String>);

impl ColumnOrder {
    pub fn new(columns: Vec<String>) -> Self {
        Self(columns)
    }

    pub fn columns(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.0.iter().any(|c| c == column)
    }
}

impl From<Vec<String>> for ColumnOrder {
    fn from(columns: Vec<String>) -> Self {
        Self(columns)
    }
}

impl<'a> FromIterator<&'a str> for ColumnOrder {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self(iter.into_iter().map(str::to_string).collect())
    }
}

impl fmt::Display for ColumnOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

/// Read the header row of `tab`.
///
/// Fetches the whole tab; the store offers no header-only read. An empty tab
/// yields an empty order.
pub async fn fetch_column_order(
    store: &dyn SheetStore,
    workbook: &Workbook,
    tab: &str,
) -> SyncResult<ColumnOrder> {
    let sheet = store.fetch_tab(workbook, tab).await?;
    let order = ColumnOrder(sheet.column_names().cloned().unwrap_or_default());
    if order.is_empty() {
        tracing::warn!(tab, "tab has no header row");
    } else {
        tracing::debug!(tab, columns = %order, "fetched column order");
    }
    Ok(order)
}
