//! One-time workbook creation.
//!
//! Not idempotent: a second run against the same name fails with the
//! store's `AlreadyExists` error. Each tab receives one placeholder row so
//! the store infers column types; remove it by hand once real data arrives.

use crate::config::{first_duplicate, ColumnSpec};
use crate::error::{SyncError, SyncResult};
use chrono::Local;
use sheetsync_remote::{ShareRequest, SheetStore, Workbook, DEFAULT_TAB};
use sheetsync_sheet::CellValue;

/// Header row followed by one seed row typed per column.
pub fn seed_rows(columns: &[ColumnSpec]) -> Vec<Vec<CellValue>> {
    let now = Local::now().naive_local();
    vec![
        columns
            .iter()
            .map(|c| CellValue::String(c.name.clone()))
            .collect(),
        columns.iter().map(|c| c.seed_value(now)).collect(),
    ]
}

/// Create workbook `name`, share it, and seed one tab per entry of `tabs`.
///
/// The store's default tab is removed unless it is one of `tabs`.
pub async fn provision(
    store: &dyn SheetStore,
    name: &str,
    share: Option<&ShareRequest>,
    tabs: &[String],
    columns: &[ColumnSpec],
) -> SyncResult<Workbook> {
    if tabs.is_empty() {
        return Err(SyncError::config("provisioning needs at least one tab"));
    }
    if let Some(tab) = first_duplicate(tabs) {
        return Err(SyncError::config(format!("tab '{tab}' is listed twice")));
    }
    if columns.is_empty() {
        return Err(SyncError::config("provisioning needs at least one column"));
    }

    let workbook = store.create_workbook(name).await?;
    tracing::info!(workbook = name, id = %workbook.id, "workbook created");

    match share {
        Some(share) => {
            store.share_workbook(&workbook, share).await?;
            tracing::info!(workbook = name, email = %share.email, role = share.role.as_str(), "workbook shared");
        }
        None => tracing::warn!(workbook = name, "no share recipient configured"),
    }

    let existing = store.tab_names(&workbook).await?;
    let rows = seed_rows(columns);
    for tab in tabs {
        if !existing.contains(tab) {
            store.create_tab(&workbook, tab).await?;
        }
        store.insert_rows(&workbook, tab, &rows).await?;
        tracing::info!(tab = %tab, columns = columns.len(), "tab seeded");
    }

    if existing.iter().any(|t| t == DEFAULT_TAB) && !tabs.iter().any(|t| t == DEFAULT_TAB) {
        store.delete_tab(&workbook, DEFAULT_TAB).await?;
        tracing::debug!(tab = DEFAULT_TAB, "removed default tab");
    }

    Ok(workbook)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_columns;
    use sheetsync_remote::{MemoryStore, RemoteError, StoreCall};

    fn tabs(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_seed_rows_are_typed() {
        let rows = seed_rows(&default_columns());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0], CellValue::from("DATETIME"));
        assert!(matches!(rows[1][0], CellValue::DateTime(_)));
        assert_eq!(rows[1][3], CellValue::Float(99.99999));
    }

    #[tokio::test]
    async fn test_provision_creates_seeded_tabs() {
        let store = MemoryStore::new();
        let share = ShareRequest::writer("me@example.com");

        let wb = provision(
            &store,
            "Readings",
            Some(&share),
            &tabs(&["GroupA", "GroupB"]),
            &default_columns(),
        )
        .await
        .unwrap();

        assert_eq!(wb.name, "Readings");
        assert_eq!(store.tab_names(&wb).await.unwrap(), vec!["GroupA", "GroupB"]);
        assert_eq!(store.shares("Readings"), vec![share]);

        let rows = store.rows("Readings", "GroupB").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0],
            vec![
                CellValue::from("DATETIME"),
                CellValue::from("TEMP"),
                CellValue::from("HUMIDITY"),
                CellValue::from("PRESSURE")
            ]
        );

        let calls = store.calls();
        assert!(matches!(calls[0], StoreCall::CreateWorkbook { .. }));
        assert!(matches!(calls[1], StoreCall::ShareWorkbook { .. }));
        assert!(matches!(
            calls.last().unwrap(),
            StoreCall::DeleteTab { tab, .. } if tab == DEFAULT_TAB
        ));
    }

    #[tokio::test]
    async fn test_provision_twice_fails() {
        let store = MemoryStore::new();
        let columns = default_columns();
        let tab_list = tabs(&["GroupA"]);

        provision(&store, "Readings", None, &tab_list, &columns)
            .await
            .unwrap();
        let err = provision(&store, "Readings", None, &tab_list, &columns)
            .await
            .unwrap_err();

        assert!(err.is_already_exists());
        assert!(matches!(
            err,
            SyncError::Remote(RemoteError::AlreadyExists { .. })
        ));
    }

    #[tokio::test]
    async fn test_requested_default_tab_is_kept() {
        let store = MemoryStore::new();
        let wb = provision(
            &store,
            "Readings",
            None,
            &tabs(&[DEFAULT_TAB]),
            &default_columns(),
        )
        .await
        .unwrap();

        assert_eq!(store.tab_names(&wb).await.unwrap(), vec![DEFAULT_TAB]);
        assert_eq!(store.rows("Readings", DEFAULT_TAB).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_provision_requires_tabs() {
        let store = MemoryStore::new();
        let result = provision(&store, "Readings", None, &[], &default_columns()).await;
        assert!(matches!(result, Err(SyncError::Config(_))));
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_provision_rejects_duplicate_tabs() {
        let store = MemoryStore::new();
        let result = provision(
            &store,
            "Readings",
            None,
            &tabs(&["GroupA", "GroupA"]),
            &default_columns(),
        )
        .await;

        assert!(matches!(result, Err(SyncError::Config(m)) if m.contains("GroupA")));
        assert!(store.calls().is_empty());
    }
}
