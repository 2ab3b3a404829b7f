//! In-process spreadsheet.

use async_trait::async_trait;
use tokio::sync::Mutex;

use marksync_shared::{MarksyncError, Result};

use crate::{SheetHandle, SpreadsheetClient};

const SHEET_TITLE: &str = "Sheet1";

/// One primitive call, as observed by [`MemorySheetClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetOp {
    Resolve(String),
    ReadAll,
    Clear,
    Append(Vec<String>),
}

/// How [`MemorySheetClient::resolve`] should fail, if at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResolveFailure {
    Unauthorized,
    Missing,
}

#[derive(Debug, Default)]
struct State {
    rows: Vec<Vec<String>>,
    ops: Vec<SheetOp>,
    appends: usize,
    fail_after_appends: Option<usize>,
    resolve_failure: Option<ResolveFailure>,
}

/// A single-sheet spreadsheet held in memory.
///
/// Records every call so tests can assert on ordering, and can be told to fail
/// partway through a sync.
#[derive(Debug, Default)]
pub struct MemorySheetClient {
    state: Mutex<State>,
}

impl MemorySheetClient {
    /// An empty sheet.
    pub fn new() -> Self {
        Self::default()
    }

    /// A sheet pre-filled with `rows`.
    pub fn with_rows(rows: Vec<Vec<String>>) -> Self {
        Self {
            state: Mutex::new(State {
                rows,
                ..State::default()
            }),
        }
    }

    /// Let `appends` appends succeed, then fail every following one.
    pub fn fail_after(mut self, appends: usize) -> Self {
        self.state.get_mut().fail_after_appends = Some(appends);
        self
    }

    /// Reject resolution as if the service account lacks access.
    pub fn deny_access(mut self) -> Self {
        self.state.get_mut().resolve_failure = Some(ResolveFailure::Unauthorized);
        self
    }

    /// Reject resolution as if the spreadsheet did not exist.
    pub fn missing(mut self) -> Self {
        self.state.get_mut().resolve_failure = Some(ResolveFailure::Missing);
        self
    }

    /// Current sheet contents.
    pub async fn rows(&self) -> Vec<Vec<String>> {
        self.state.lock().await.rows.clone()
    }

    /// Every primitive call so far, in order.
    pub async fn ops(&self) -> Vec<SheetOp> {
        self.state.lock().await.ops.clone()
    }
}

#[async_trait]
impl SpreadsheetClient for MemorySheetClient {
    async fn resolve(&self, spreadsheet_id: &str) -> Result<SheetHandle> {
        let mut state = self.state.lock().await;
        state.ops.push(SheetOp::Resolve(spreadsheet_id.to_string()));

        match state.resolve_failure {
            Some(ResolveFailure::Unauthorized) => Err(MarksyncError::Authorization(format!(
                "caller does not have permission to open {spreadsheet_id}"
            ))),
            Some(ResolveFailure::Missing) => Err(MarksyncError::NotFound(format!(
                "spreadsheet {spreadsheet_id}"
            ))),
            None => Ok(SheetHandle {
                spreadsheet_id: spreadsheet_id.to_string(),
                sheet_title: SHEET_TITLE.to_string(),
            }),
        }
    }

    async fn read_all_rows(&self, _sheet: &SheetHandle) -> Result<Vec<Vec<String>>> {
        let mut state = self.state.lock().await;
        state.ops.push(SheetOp::ReadAll);
        Ok(state.rows.clone())
    }

    async fn clear(&self, _sheet: &SheetHandle) -> Result<()> {
        let mut state = self.state.lock().await;
        state.ops.push(SheetOp::Clear);
        state.rows.clear();
        Ok(())
    }

    async fn append_row(&self, _sheet: &SheetHandle, row: &[String]) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.fail_after_appends.is_some_and(|limit| state.appends >= limit) {
            return Err(MarksyncError::Network("simulated append failure".into()));
        }
        state.ops.push(SheetOp::Append(row.to_vec()));
        state.rows.push(row.to_vec());
        state.appends += 1;
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
