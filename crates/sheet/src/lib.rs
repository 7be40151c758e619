//! Local tabular model for sheetsync
//!
//! Cells, sheets and records as they exist on this side of the wire, plus
//! CSV import for the bulk loader.
//!
//! # Examples
//!
//! ## Loading a CSV with a header row
//!
//! ```
//! use sheetsync_sheet::{CellValue, Sheet};
//!
//! let sheet = Sheet::from_csv_str("TEMP,HUMIDITY\n10,40\n20,50").unwrap();
//!
//! assert_eq!(sheet.data_row_count(), 2);
//! assert_eq!(
//!     sheet.column_by_name("TEMP").unwrap(),
//!     vec![CellValue::Int(10), CellValue::Int(20)]
//! );
//! ```
//!
//! ## Projecting a record onto a header
//!
//! ```
//! use sheetsync_sheet::{CellValue, Record};
//!
//! let record = Record::new().with("HUMIDITY", 34.6).with("TEMP", 28.6);
//! let header = vec!["TEMP".to_string(), "HUMIDITY".to_string()];
//!
//! assert_eq!(
//!     record.project(&header).unwrap(),
//!     vec![CellValue::Float(28.6), CellValue::Float(34.6)]
//! );
//! ```

mod cell;
mod csv;
mod error;
mod record;
mod sheet;

/// Re-export cell value type.
pub use cell::{CellValue, TIMESTAMP_FORMAT};
/// Re-export sheet error types.
pub use error::{Result, SheetError};
/// Re-export record type.
pub use record::Record;
/// Re-export sheet type.
pub use sheet::Sheet;
