//! # sheetsync-stats
//!
//! Descriptive statistics over the numeric columns of a [`Sheet`]:
//! count, mean, standard deviation, quartiles, sum and a pairwise
//! correlation matrix.
//!
//! ```
//! use sheetsync_sheet::Sheet;
//! use sheetsync_stats::summarize;
//!
//! let sheet = Sheet::from_csv_str("TEMP,HUMIDITY\n10,40\n20,50\n30,60").unwrap();
//! let summary = summarize(&sheet, None).unwrap();
//!
//! assert_eq!(summary.column("TEMP").unwrap().mean(), Some(20.0));
//! ```
//!
//! [`Sheet`]: sheetsync_sheet::Sheet

mod error;
pub mod math;
mod summary;

pub use error::{StatsError, StatsResult};
pub use summary::{numeric_column, summarize, ColumnSummary, CorrelationMatrix, Describe, Summary};
