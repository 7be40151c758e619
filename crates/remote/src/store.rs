use crate::error::{RemoteError, RemoteResult};
use crate::types::{ShareRequest, Workbook, WorkbookInfo};
use async_trait::async_trait;
use sheetsync_sheet::{CellValue, Sheet};

/// Operations consumed from a remote spreadsheet store.
///
/// Workbook and tab names are identifiers. Every call is one request to the
/// store; implementations do not retry.
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// Create an empty workbook. The store adds its default tab.
    async fn create_workbook(&self, name: &str) -> RemoteResult<Workbook>;

    async fn share_workbook(&self, workbook: &Workbook, share: &ShareRequest) -> RemoteResult<()>;

    /// Look up a workbook by name.
    async fn fetch_workbook(&self, name: &str) -> RemoteResult<Workbook>;

    async fn list_workbooks(&self) -> RemoteResult<Vec<WorkbookInfo>>;

    /// Remove a workbook and every tab in it.
    async fn delete_workbook(&self, workbook: &Workbook) -> RemoteResult<()>;

    /// Tab names in display order.
    async fn tab_names(&self, workbook: &Workbook) -> RemoteResult<Vec<String>>;

    async fn create_tab(&self, workbook: &Workbook, tab: &str) -> RemoteResult<()>;

    async fn delete_tab(&self, workbook: &Workbook, tab: &str) -> RemoteResult<()>;

    /// Full tab contents. Row 0 is the header and names the columns; an
    /// empty tab yields an empty sheet.
    async fn fetch_tab(&self, workbook: &Workbook, tab: &str) -> RemoteResult<Sheet>;

    /// Write `rows` starting at the tab's top-left cell in one request.
    async fn insert_rows(
        &self,
        workbook: &Workbook,
        tab: &str,
        rows: &[Vec<CellValue>],
    ) -> RemoteResult<()>;

    /// Append `rows` after the last non-empty row in one request.
    async fn append_rows(
        &self,
        workbook: &Workbook,
        tab: &str,
        rows: &[Vec<CellValue>],
    ) -> RemoteResult<()>;
}

/// Build a sheet from raw tab rows, padding ragged rows and naming columns
/// by the first row.
pub(crate) fn sheet_from_rows(tab: &str, rows: Vec<Vec<CellValue>>) -> RemoteResult<Sheet> {
    let mut sheet = Sheet::from_data(rows);
    sheet.set_name(tab);
    sheet.pad_rows();
    if !sheet.is_empty() {
        sheet
            .name_columns_by_row(0)
            .map_err(|e| RemoteError::Decode(format!("tab {tab}: {e}")))?;
    }
    Ok(sheet)
}
