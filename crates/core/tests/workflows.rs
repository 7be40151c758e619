use sheetsync_core::sampling::{SIMULATED_HUMIDITY, SIMULATED_PRESSURE, SIMULATED_TEMP};
use sheetsync_core::{
    append_row, default_columns, fetch_column_order, load_and_summarize, provision, run,
    ColumnOrder, SamplingOptions, SimulatedSensor, Source, SyncError, SyncResult,
};
use sheetsync_remote::{MemoryStore, RemoteError, SheetStore, StoreCall, Workbook};
use sheetsync_sheet::{CellValue, Record};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

async fn provisioned(store: &MemoryStore) -> Workbook {
    let tabs = vec!["GroupA".to_string(), "GroupB".to_string()];
    provision(store, "Readings", None, &tabs, &default_columns())
        .await
        .unwrap()
}

fn append_calls(store: &MemoryStore) -> usize {
    store
        .calls()
        .iter()
        .filter(|c| matches!(c, StoreCall::AppendRows { .. }))
        .count()
}

fn csv_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn test_projection_ignores_insertion_order() {
    let store = MemoryStore::new();
    let wb = provisioned(&store).await;
    let order = fetch_column_order(&store, &wb, "GroupA").await.unwrap();
    assert_eq!(order.columns(), ["DATETIME", "TEMP", "HUMIDITY", "PRESSURE"]);

    let forward = Record::new()
        .with("DATETIME", "2018-08-06 12:00:00")
        .with("TEMP", 21.5)
        .with("HUMIDITY", 40.0)
        .with("PRESSURE", 1013.25);
    let backward = Record::new()
        .with("PRESSURE", 1013.25)
        .with("HUMIDITY", 40.0)
        .with("TEMP", 21.5)
        .with("DATETIME", "2018-08-06 12:00:00");

    append_row(&store, &wb, "GroupA", &order, &forward).await.unwrap();
    append_row(&store, &wb, "GroupA", &order, &backward).await.unwrap();

    let rows = store.rows("Readings", "GroupA").unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[2], rows[3]);
    assert_eq!(
        rows[3],
        vec![
            CellValue::from("2018-08-06 12:00:00"),
            CellValue::Float(21.5),
            CellValue::Float(40.0),
            CellValue::Float(1013.25),
        ]
    );
}

#[tokio::test]
async fn test_missing_column_makes_no_store_call() {
    let store = MemoryStore::new();
    let wb = provisioned(&store).await;
    let order = fetch_column_order(&store, &wb, "GroupA").await.unwrap();
    store.clear_calls();

    let record = Record::new()
        .with("DATETIME", "2018-08-06 12:00:00")
        .with("TEMP", 21.5)
        .with("PRESSURE", 1013.25);
    let err = append_row(&store, &wb, "GroupA", &order, &record)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SyncError::MissingColumn { ref column, ref tab } if column == "HUMIDITY" && tab == "GroupA"
    ));
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn test_append_to_headerless_tab_fails() {
    let store = MemoryStore::new();
    let wb = store.create_workbook("Readings").await.unwrap();
    let order = fetch_column_order(&store, &wb, "Sheet1").await.unwrap();
    store.clear_calls();

    let record = Record::new().with("TEMP", 1.0);
    let err = append_row(&store, &wb, "Sheet1", &order, &record)
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::EmptyHeader { .. }));
    assert!(store.calls().is_empty());
}

/// Checks, on every sample, that each earlier sample was appended.
struct CountingSource {
    store: Arc<MemoryStore>,
    inner: SimulatedSensor,
    taken: usize,
}

impl Source for CountingSource {
    fn sample(&mut self) -> SyncResult<Record> {
        assert_eq!(append_calls(&self.store), self.taken);
        self.taken += 1;
        self.inner.sample()
    }
}

#[tokio::test]
async fn test_sampling_alternates_sample_and_append() {
    let store = Arc::new(MemoryStore::new());
    let wb = provisioned(&store).await;
    let order = fetch_column_order(store.as_ref(), &wb, "GroupA").await.unwrap();
    store.clear_calls();

    let mut source = CountingSource {
        store: Arc::clone(&store),
        inner: SimulatedSensor::new("DATETIME"),
        taken: 0,
    };
    let options = SamplingOptions::new(Some(5), Duration::from_millis(5));

    let report = run(
        &mut source,
        store.as_ref(),
        &wb,
        "GroupA",
        &order,
        options,
        std::future::pending::<()>(),
    )
    .await
    .unwrap();

    assert_eq!(report.samples, 5);
    assert!(!report.cancelled);
    assert_eq!(source.taken, 5);
    assert_eq!(append_calls(&store), 5);
    assert_eq!(store.calls().len(), 5);
    assert_eq!(store.rows("Readings", "GroupA").unwrap().len(), 2 + 5);
}

async fn tab_with_header(store: &MemoryStore, header: &[&str]) -> (Workbook, ColumnOrder) {
    let wb = store.create_workbook("Readings").await.unwrap();
    store.create_tab(&wb, "GroupA").await.unwrap();
    let row: Vec<CellValue> = header.iter().map(|h| CellValue::from(*h)).collect();
    store.insert_rows(&wb, "GroupA", &[row]).await.unwrap();
    let order = fetch_column_order(store, &wb, "GroupA").await.unwrap();
    (wb, order)
}

#[tokio::test]
async fn test_sampling_follows_reordered_header() {
    let store = MemoryStore::new();
    let (wb, order) = tab_with_header(&store, &["TEMP", "DATETIME", "HUMIDITY", "PRESSURE"]).await;

    let mut source = SimulatedSensor::new("DATETIME");
    let report = run(
        &mut source,
        &store,
        &wb,
        "GroupA",
        &order,
        SamplingOptions::new(Some(2), Duration::from_millis(1)),
        std::future::pending::<()>(),
    )
    .await
    .unwrap();
    assert_eq!(report.samples, 2);

    let rows = store.rows("Readings", "GroupA").unwrap();
    for row in &rows[1..] {
        assert_eq!(row[0], CellValue::Float(SIMULATED_TEMP));
        assert!(matches!(row[1], CellValue::DateTime(_)));
        assert_eq!(row[2], CellValue::Float(SIMULATED_HUMIDITY));
        assert_eq!(row[3], CellValue::Float(SIMULATED_PRESSURE));
    }
}

#[tokio::test]
async fn test_sampling_stops_on_column_without_reading() {
    let store = MemoryStore::new();
    let (wb, order) = tab_with_header(&store, &["DATETIME", "TEMP", "WIND"]).await;
    store.clear_calls();

    let mut source = SimulatedSensor::new("DATETIME");
    let err = run(
        &mut source,
        &store,
        &wb,
        "GroupA",
        &order,
        SamplingOptions::new(Some(3), Duration::from_millis(1)),
        std::future::pending::<()>(),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        SyncError::MissingColumn { ref column, ref tab } if column == "WIND" && tab == "GroupA"
    ));
    assert_eq!(append_calls(&store), 0);
    assert_eq!(store.rows("Readings", "GroupA").unwrap().len(), 1);
}

#[tokio::test]
async fn test_zero_count_takes_no_sample() {
    let store = MemoryStore::new();
    let wb = provisioned(&store).await;
    let order = fetch_column_order(&store, &wb, "GroupA").await.unwrap();
    store.clear_calls();

    let mut source = SimulatedSensor::new("DATETIME");
    let report = run(
        &mut source,
        &store,
        &wb,
        "GroupA",
        &order,
        SamplingOptions::new(Some(0), Duration::from_secs(1)),
        std::future::pending::<()>(),
    )
    .await
    .unwrap();

    assert_eq!(report.samples, 0);
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn test_shutdown_interrupts_pause() {
    let store = MemoryStore::new();
    let wb = provisioned(&store).await;
    let order = fetch_column_order(&store, &wb, "GroupA").await.unwrap();
    store.clear_calls();

    let mut source = SimulatedSensor::new("DATETIME");
    let report = tokio::time::timeout(
        Duration::from_secs(5),
        run(
            &mut source,
            &store,
            &wb,
            "GroupA",
            &order,
            SamplingOptions::new(None, Duration::from_secs(3600)),
            std::future::ready(()),
        ),
    )
    .await
    .expect("shutdown did not interrupt the pause")
    .unwrap();

    assert_eq!(report.samples, 1);
    assert!(report.cancelled);
    assert_eq!(append_calls(&store), 1);
}

#[tokio::test]
async fn test_unavailable_store_ends_run() {
    let store = MemoryStore::new();
    let wb = provisioned(&store).await;
    let order = fetch_column_order(&store, &wb, "GroupA").await.unwrap();
    store.set_unavailable(true);

    let mut source = SimulatedSensor::new("DATETIME");
    let err = run(
        &mut source,
        &store,
        &wb,
        "GroupA",
        &order,
        SamplingOptions::new(Some(3), Duration::from_millis(1)),
        std::future::pending::<()>(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, SyncError::Remote(RemoteError::Unavailable(_))));
    assert_eq!(append_calls(&store), 1);
}

#[tokio::test]
async fn test_bulk_load_is_idempotent() {
    let store = MemoryStore::new();
    let wb = provisioned(&store).await;
    let file = csv_file("DATETIME,TEMP,HUMIDITY\n2018-08-06 12:00:00,10,40\n2018-08-06 12:00:01,20,50\n2018-08-06 12:00:02,30,60\n");

    let first = load_and_summarize(&store, &wb, "AstroPi", file.path(), None)
        .await
        .unwrap();
    let after_first = store.rows("Readings", "AstroPi").unwrap();

    let second = load_and_summarize(&store, &wb, "AstroPi", file.path(), None)
        .await
        .unwrap();
    let after_second = store.rows("Readings", "AstroPi").unwrap();

    assert!(!first.replaced_existing);
    assert!(second.replaced_existing);
    assert_eq!(after_first, after_second);
    assert_eq!(after_second.len(), 4);
    assert_eq!(first.summary, second.summary);

    let tabs = store.tab_names(&wb).await.unwrap();
    assert_eq!(tabs.iter().filter(|t| *t == "AstroPi").count(), 1);
}

#[tokio::test]
async fn test_bulk_load_header_round_trip() {
    let store = MemoryStore::new();
    let wb = provisioned(&store).await;
    let file = csv_file("PRESSURE,DATETIME,TEMP\n1013,2018-08-06 12:00:00,10\n");

    let outcome = load_and_summarize(&store, &wb, "AstroPi", file.path(), None)
        .await
        .unwrap();

    assert_eq!(outcome.header, vec!["PRESSURE", "DATETIME", "TEMP"]);
    let order = fetch_column_order(&store, &wb, "AstroPi").await.unwrap();
    assert_eq!(order, ColumnOrder::new(outcome.header.clone()));
}

#[tokio::test]
async fn test_bulk_load_summary() {
    let store = MemoryStore::new();
    let wb = provisioned(&store).await;
    let file = csv_file("TEMP,HUMIDITY\n10,40\n20,50\n30,60\n");

    let outcome = load_and_summarize(&store, &wb, "AstroPi", file.path(), None)
        .await
        .unwrap();
    let summary = outcome.summary;

    let temp = summary.column("TEMP").unwrap();
    assert_eq!(temp.mean(), Some(20.0));
    assert_eq!(temp.sum, 60.0);
    assert_eq!(temp.count(), 3);
    assert_eq!(summary.column("HUMIDITY").unwrap().median(), Some(50.0));

    let corr = summary.correlation.get("TEMP", "HUMIDITY").unwrap();
    assert!((corr - 1.0).abs() < 1e-12);
}

#[tokio::test]
async fn test_bulk_load_rejects_missing_stats_column() {
    let store = MemoryStore::new();
    let wb = provisioned(&store).await;
    store.clear_calls();
    let file = csv_file("TEMP,HUMIDITY\n10,40\n");
    let columns = vec!["TEMP".to_string(), "WIND".to_string()];

    let err = load_and_summarize(&store, &wb, "AstroPi", file.path(), Some(&columns))
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::MalformedTable(ref m) if m.contains("WIND")));
    assert!(store.calls().is_empty());
}
