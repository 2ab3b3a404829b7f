//! Header enforcement and row-by-row append.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use marksync_shared::{HEADER_ROW, MarksyncError, Record, Result};

use crate::{SpreadsheetClient, SyncTarget};

/// Writes records into the first sheet of a target spreadsheet.
///
/// **Destructive:** if row 1 of the sheet is missing or differs from
/// [`HEADER_ROW`] in any cell, the entire sheet is cleared before the header
/// and the records are written. Prior content is not merged.
///
/// Each record is one remote append. A failed append stops the sync with
/// [`MarksyncError::SyncWrite`]; rows already appended remain.
pub struct Synchronizer {
    client: Arc<dyn SpreadsheetClient>,
    call_timeout: Duration,
}

impl Synchronizer {
    pub fn new(client: Arc<dyn SpreadsheetClient>, call_timeout: Duration) -> Self {
        Self {
            client,
            call_timeout,
        }
    }

    /// Sync `records` into `target`. Returns the number of data rows appended.
    #[instrument(skip_all, fields(client = self.client.name(), target = %target, records = records.len()))]
    pub async fn sync(&self, target: &SyncTarget, records: &[Record]) -> Result<usize> {
        // Step 1: resolve
        let spreadsheet_id = target.spreadsheet_id()?;
        let sheet = self
            .bounded("resolve", self.client.resolve(spreadsheet_id))
            .await?;
        debug!(spreadsheet_id, sheet = %sheet.sheet_title, "resolved spreadsheet");

        // Step 2: header
        let existing = self
            .bounded("read rows", self.client.read_all_rows(&sheet))
            .await?;
        if !has_expected_header(&existing) {
            warn!(
                existing_rows = existing.len(),
                "first row does not match header, clearing sheet"
            );
            self.bounded("clear", self.client.clear(&sheet)).await?;
            let header: Vec<String> = HEADER_ROW.iter().map(|h| (*h).to_string()).collect();
            self.bounded("append header", self.client.append_row(&sheet, &header))
                .await?;
        }

        // Step 3: one append per record
        let mut written = 0;
        for record in records {
            let row = record.to_row();
            self.bounded("append row", self.client.append_row(&sheet, &row))
                .await
                .map_err(|e| MarksyncError::SyncWrite {
                    written,
                    message: e.to_string(),
                })?;
            written += 1;
            debug!(row = written, mark = %record.mark, "appended row");
        }

        info!(written, "sync complete");
        Ok(written)
    }

    /// Run one remote call under the per-call timeout.
    async fn bounded<T>(&self, op: &str, call: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::time::timeout(self.call_timeout, call)
            .await
            .map_err(|_| {
                MarksyncError::Network(format!(
                    "{op} timed out after {}s",
                    self.call_timeout.as_secs_f64()
                ))
            })?
    }
}

fn has_expected_header(rows: &[Vec<String>]) -> bool {
    rows.first().is_some_and(|first| {
        first.len() == HEADER_ROW.len() && first.iter().zip(HEADER_ROW).all(|(a, b)| a == b)
    })
}
