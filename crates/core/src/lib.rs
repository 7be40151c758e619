//! # sheetsync-core
//!
//! Workflows that keep a spreadsheet store in step with local data:
//!
//! - [`provision`] creates, shares and seeds a workbook
//! - [`fetch_column_order`] reads a tab's header
//! - [`append_row`] writes one record in header order
//! - [`run`] samples a [`Source`] on a fixed delay and appends each record
//! - [`load_and_summarize`] overwrites a tab from CSV and summarises it
//!
//! Each workflow takes the store handle explicitly.
//!
//! ```
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), sheetsync_core::SyncError> {
//! use sheetsync_core::{append_row, fetch_column_order, provision, default_columns};
//! use sheetsync_remote::MemoryStore;
//! use sheetsync_sheet::Record;
//!
//! let store = MemoryStore::new();
//! let tabs = vec!["GroupA".to_string()];
//! let wb = provision(&store, "Readings", None, &tabs, &default_columns()).await?;
//! let order = fetch_column_order(&store, &wb, "GroupA").await?;
//!
//! let record = Record::new()
//!     .with("TEMP", 21.5)
//!     .with("HUMIDITY", 40.0)
//!     .with("PRESSURE", 1013.0)
//!     .with("DATETIME", "2018-08-06 12:00:00");
//! append_row(&store, &wb, "GroupA", &order, &record).await?;
//! # Ok(())
//! # }
//! ```

pub mod append;
pub mod bulk;
pub mod columns;
pub mod config;
pub mod error;
pub mod provision;
pub mod sampling;

pub use append::append_row;
pub use bulk::{load_and_summarize, BulkLoadOutcome};
pub use columns::{fetch_column_order, ColumnOrder};
pub use config::{default_columns, ColumnKind, ColumnSpec, SourceConfig, SyncConfig};
pub use error::{SyncError, SyncResult};
pub use provision::provision;
pub use sampling::{run, CsvReplaySource, SamplingOptions, SamplingReport, SimulatedSensor, Source};
