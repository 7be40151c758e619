//! Timed sampling loop and the record sources it draws from.

use crate::append::append_row;
use crate::columns::ColumnOrder;
use crate::error::{SyncError, SyncResult};
use chrono::Local;
use serde::Serialize;
use sheetsync_remote::{SheetStore, Workbook};
use sheetsync_sheet::{CellValue, Record, Sheet};
use std::future::Future;
use std::path::Path;
use std::time::Duration;

/// Produces one record per call.
///
/// Every record carries the sample time in the source's timestamp column.
pub trait Source: Send {
    fn sample(&mut self) -> SyncResult<Record>;
}

/// Readings reported when no sensor hardware is attached.
pub const SIMULATED_TEMP: f64 = 28.629_325_866_7;
pub const SIMULATED_HUMIDITY: f64 = 34.623_458_862_32;
pub const SIMULATED_PRESSURE: f64 = 1_021.213_123_121_121;

/// Fixed readings stamped with the current local time.
#[derive(Debug, Clone)]
pub struct SimulatedSensor {
    timestamp_column: String,
    readings: Vec<(String, f64)>,
}

impl SimulatedSensor {
    /// `TEMP`, `HUMIDITY` and `PRESSURE` plus a timestamp column.
    pub fn new(timestamp_column: impl Into<String>) -> Self {
        Self {
            timestamp_column: timestamp_column.into(),
            readings: vec![
                ("TEMP".to_string(), SIMULATED_TEMP),
                ("HUMIDITY".to_string(), SIMULATED_HUMIDITY),
                ("PRESSURE".to_string(), SIMULATED_PRESSURE),
            ],
        }
    }

    pub fn timestamp_column(&self) -> &str {
        &self.timestamp_column
    }
}

impl Source for SimulatedSensor {
    fn sample(&mut self) -> SyncResult<Record> {
        let mut record = Record::new().with(
            self.timestamp_column.as_str(),
            Local::now().naive_local(),
        );
        for (name, value) in &self.readings {
            record.insert(name.as_str(), *value);
        }
        Ok(record)
    }
}

/// Replays the rows of a CSV file, wrapping around at the end.
///
/// The timestamp column is overwritten with the sample time.
#[derive(Debug, Clone)]
pub struct CsvReplaySource {
    timestamp_column: String,
    rows: Vec<Record>,
    next: usize,
}

impl CsvReplaySource {
    pub fn from_path(path: impl AsRef<Path>, timestamp_column: impl Into<String>) -> SyncResult<Self> {
        let sheet = Sheet::from_csv(path.as_ref())?;
        Self::from_sheet(&sheet, timestamp_column)
    }

    pub fn from_sheet(sheet: &Sheet, timestamp_column: impl Into<String>) -> SyncResult<Self> {
        let rows: Vec<Record> = sheet
            .to_records()
            .ok_or_else(|| SyncError::MalformedTable(format!("{} has no header", sheet.name())))?
            .into_iter()
            .map(|row| row.into_iter().collect())
            .collect();
        if rows.is_empty() {
            return Err(SyncError::Source(format!("{} has no data rows", sheet.name())));
        }
        Ok(Self {
            timestamp_column: timestamp_column.into(),
            rows,
            next: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Source for CsvReplaySource {
    fn sample(&mut self) -> SyncResult<Record> {
        let mut record = self.rows[self.next].clone();
        self.next = (self.next + 1) % self.rows.len();
        record.insert(
            self.timestamp_column.as_str(),
            CellValue::DateTime(Local::now().naive_local()),
        );
        Ok(record)
    }
}

/// How many samples to take and how long to pause between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingOptions {
    /// `None` samples until shutdown.
    pub count: Option<u64>,
    pub interval: Duration,
}

impl SamplingOptions {
    pub fn new(count: Option<u64>, interval: Duration) -> Self {
        Self { count, interval }
    }
}

/// Outcome of a sampling run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SamplingReport {
    /// Rows appended.
    pub samples: u64,
    /// True when shutdown ended the run before `count` was reached.
    pub cancelled: bool,
}

/// Sample, append, then pause, until `count` samples are taken or
/// `shutdown` resolves.
///
/// There is no pause after the last sample. `shutdown` is only observed
/// during the pause, so an append in flight always completes. The first
/// error ends the run; rows already appended stay in the tab.
pub async fn run<F>(
    source: &mut dyn Source,
    store: &dyn SheetStore,
    workbook: &Workbook,
    tab: &str,
    order: &ColumnOrder,
    options: SamplingOptions,
    shutdown: F,
) -> SyncResult<SamplingReport>
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut report = SamplingReport::default();

    tracing::info!(tab, count = ?options.count, interval = ?options.interval, "sampling started");

    while options.count.map_or(true, |count| report.samples < count) {
        let record = source.sample()?;
        append_row(store, workbook, tab, order, &record).await?;
        report.samples += 1;
        tracing::debug!(tab, sample = report.samples, "sample appended");

        if options.count.is_some_and(|count| report.samples >= count) {
            break;
        }

        tokio::select! {
            () = &mut shutdown => {
                report.cancelled = true;
                tracing::info!(tab, samples = report.samples, "sampling interrupted");
                break;
            }
            () = tokio::time::sleep(options.interval) => {}
        }
    }

    tracing::info!(tab, samples = report.samples, "sampling finished");
    Ok(report)
}
