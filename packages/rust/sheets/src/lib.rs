//! Spreadsheet synchronization.
//!
//! This crate provides:
//! - [`SpreadsheetClient`]: the four primitives the synchronizer needs
//! - [`Synchronizer`]: header enforcement + row-by-row append
//! - [`GoogleSheetsClient`]: Sheets v4 REST with service-account auth
//! - [`MemorySheetClient`]: in-process sheet for dry runs and tests
//!
//! **Warning:** syncing into a sheet whose first row is not exactly
//! [`HEADER_ROW`](marksync_shared::HEADER_ROW) clears the whole sheet first.

mod google;
mod memory;
mod sync;
mod target;

use async_trait::async_trait;

use marksync_shared::Result;

pub use google::{GoogleSheetsClient, ServiceAccountKey};
pub use memory::{MemorySheetClient, SheetOp};
pub use sync::Synchronizer;
pub use target::SyncTarget;

/// A resolved worksheet: the first sheet of a spreadsheet.
///
/// Only valid for the sync call that resolved it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetHandle {
    pub spreadsheet_id: String,
    pub sheet_title: String,
}

/// Remote tabular store.
#[async_trait]
pub trait SpreadsheetClient: Send + Sync {
    /// Resolve a spreadsheet ID to its first sheet.
    async fn resolve(&self, spreadsheet_id: &str) -> Result<SheetHandle>;

    /// Every non-empty row of the sheet, top to bottom.
    async fn read_all_rows(&self, sheet: &SheetHandle) -> Result<Vec<Vec<String>>>;

    /// Remove all values from the sheet.
    async fn clear(&self, sheet: &SheetHandle) -> Result<()>;

    /// Append one row after the last non-empty row.
    async fn append_row(&self, sheet: &SheetHandle, row: &[String]) -> Result<()>;

    /// Human-readable client name for tracing.
    fn name(&self) -> &str;
}
