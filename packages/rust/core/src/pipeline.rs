//! End-to-end run: query → source → records → spreadsheet.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, instrument};
use uuid::Uuid;

use marksync_collector::SourceAdapter;
use marksync_extract::FieldExtractor;
use marksync_sheets::{SyncTarget, Synchronizer};
use marksync_shared::{Record, Result};

/// What a run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The source returned nothing; the spreadsheet was not touched.
    NoData,
    /// `count` records were extracted and appended.
    Synced { count: usize, records: Vec<Record> },
}

impl RunOutcome {
    /// Number of records synced (zero for [`RunOutcome::NoData`]).
    pub fn count(&self) -> usize {
        match self {
            Self::NoData => 0,
            Self::Synced { count, .. } => *count,
        }
    }
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when the run completes successfully.
    fn done(&self, outcome: &RunOutcome);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn done(&self, _outcome: &RunOutcome) {}
}

/// Collector and synchronizer wired to one source and one spreadsheet client.
///
/// Built once per process from configuration; each [`Pipeline::run`] is
/// independent.
pub struct Pipeline {
    source: Arc<dyn SourceAdapter>,
    extractor: FieldExtractor,
    synchronizer: Synchronizer,
}

impl Pipeline {
    pub fn new(
        source: Arc<dyn SourceAdapter>,
        extractor: FieldExtractor,
        synchronizer: Synchronizer,
    ) -> Self {
        Self {
            source,
            extractor,
            synchronizer,
        }
    }

    /// Name of the configured source adapter.
    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Run the full pipeline.
    ///
    /// 1. Collect: fetch documents for `query` and extract one record each
    /// 2. Sync: write the header (clearing the sheet if row 1 differs) and
    ///    append every record
    ///
    /// An empty collection ends the run with [`RunOutcome::NoData`] before the
    /// spreadsheet is contacted. Errors from either stage are returned as-is.
    #[instrument(skip_all, fields(run_id = %Uuid::now_v7(), source = self.source.name(), query = %query))]
    pub async fn run(
        &self,
        query: &str,
        target: &SyncTarget,
        progress: &dyn ProgressReporter,
    ) -> Result<RunOutcome> {
        let start = Instant::now();
        info!(target = %target, primary = self.extractor.has_primary(), "starting run");

        // --- Phase 1: Collect ---
        progress.phase("Collecting records");
        let records =
            marksync_collector::collect(query, self.source.as_ref(), &self.extractor).await?;

        if records.is_empty() {
            info!("no records found, skipping sync");
            let outcome = RunOutcome::NoData;
            progress.done(&outcome);
            return Ok(outcome);
        }

        // --- Phase 2: Sync ---
        progress.phase(&format!("Writing {} records to spreadsheet", records.len()));
        self.synchronizer.sync(target, &records).await?;

        let outcome = RunOutcome::Synced {
            count: records.len(),
            records,
        };
        progress.done(&outcome);

        info!(
            count = outcome.count(),
            elapsed_ms = start.elapsed().as_millis(),
            "run complete"
        );

        Ok(outcome)
    }
}
