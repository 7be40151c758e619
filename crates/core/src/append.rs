//! Append one record as a row, ordered by the tab's header.

use crate::columns::ColumnOrder;
use crate::error::{SyncError, SyncResult};
use sheetsync_remote::{SheetStore, Workbook};
use sheetsync_sheet::{CellValue, Record, SheetError};

/// Order `record`'s values by `order`.
///
/// Fails on the first column the record lacks. Keys outside `order` are
/// dropped.
pub fn project(record: &Record, order: &ColumnOrder, tab: &str) -> SyncResult<Vec<CellValue>> {
    if order.is_empty() {
        return Err(SyncError::EmptyHeader {
            tab: tab.to_string(),
        });
    }
    record.project(order.columns()).map_err(|e| match e {
        SheetError::ColumnNotFound { name } => SyncError::MissingColumn {
            column: name,
            tab: tab.to_string(),
        },
        other => other.into(),
    })
}

/// Append `record` to `tab` with one store call.
///
/// The row is validated locally first, so a record missing a column never
/// reaches the store. Nothing is retried.
pub async fn append_row(
    store: &dyn SheetStore,
    workbook: &Workbook,
    tab: &str,
    order: &ColumnOrder,
    record: &Record,
) -> SyncResult<()> {
    let row = project(record, order, tab)?;

    let extra = record.extra_keys(order.columns());
    if !extra.is_empty() {
        tracing::debug!(tab, ?extra, "ignoring keys not in header");
    }

    store.append_rows(workbook, tab, &[row]).await?;
    tracing::debug!(tab, columns = order.len(), "appended row");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order() -> ColumnOrder {
        ["DATETIME", "TEMP", "HUMIDITY"].into_iter().collect()
    }

    #[test]
    fn test_project_follows_order() {
        let record = Record::new()
            .with("HUMIDITY", 40.0)
            .with("DATETIME", "2018-08-06 12:00:00")
            .with("TEMP", 21.5)
            .with("EXTRA", 1i64);

        let row = project(&record, &order(), "GroupA").unwrap();
        assert_eq!(row[1], CellValue::Float(21.5));
        assert_eq!(row[2], CellValue::Float(40.0));
        assert_eq!(row.len(), 3);
    }

    #[test]
    fn test_project_missing_column() {
        let record = Record::new().with("DATETIME", "x").with("TEMP", 1.0);
        let err = project(&record, &order(), "GroupA").unwrap_err();
        assert!(matches!(
            err,
            SyncError::MissingColumn { ref column, ref tab } if column == "HUMIDITY" && tab == "GroupA"
        ));
    }

    #[test]
    fn test_project_empty_header() {
        let record = Record::new().with("TEMP", 1.0);
        let err = project(&record, &ColumnOrder::default(), "GroupA").unwrap_err();
        assert!(matches!(err, SyncError::EmptyHeader { .. }));
    }
}
