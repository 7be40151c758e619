//! # sheetsync-remote
//!
//! Access to the remote spreadsheet store.
//!
//! [`SheetStore`] lists the operations the sync workflows consume. Two
//! backends implement it: [`GoogleSheetsStore`] talks to the Google Sheets
//! and Drive REST APIs, [`MemoryStore`] keeps everything in process and
//! records each call.

mod error;
mod google;
mod memory;
mod store;
mod types;

pub use error::{RemoteError, RemoteResult, ResourceKind};
pub use google::{GoogleSheetsConfig, GoogleSheetsStore};
pub use memory::{MemoryStore, StoreCall};
pub use store::SheetStore;
pub use types::{ShareRequest, ShareRole, Workbook, WorkbookInfo, DEFAULT_TAB};
