//! Request/response shapes for the scrape operation.
//!
//! The response body keeps the field names external callers already rely on:
//! `success`, `message`, `count`, and `data` (omitted when there is none).

use serde::{Deserialize, Serialize};
use tracing::{error, instrument};

use marksync_sheets::SyncTarget;
use marksync_shared::{MarksyncError, Record, Result};

use crate::pipeline::{Pipeline, ProgressReporter, RunOutcome};

/// Status carried by every failed scrape.
const FAILURE_STATUS: u16 = 500;

/// Inbound scrape request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeRequest {
    /// Search query handed to the source adapter.
    pub formula: String,
    /// Spreadsheet URL containing `/spreadsheets/d/<id>`.
    pub spreadsheet_url: String,
}

/// Successful scrape body. `success` is false only for the no-data case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeResponse {
    pub success: bool,
    pub message: String,
    pub count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<Record>>,
}

/// Failed scrape: a status code and a human-readable detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeFailure {
    pub status: u16,
    #[serde(rename = "detail")]
    pub message: String,
}

impl std::fmt::Display for ScrapeFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HTTP {}: {}", self.status, self.message)
    }
}

impl std::error::Error for ScrapeFailure {}

impl From<RunOutcome> for ScrapeResponse {
    fn from(outcome: RunOutcome) -> Self {
        match outcome {
            RunOutcome::NoData => Self {
                success: false,
                message: "No trademarks found".into(),
                count: 0,
                data: None,
            },
            RunOutcome::Synced { count, records } => Self {
                success: true,
                message: format!(
                    "Successfully extracted {count} trademarks and saved to Google Sheets"
                ),
                count,
                data: Some(records),
            },
        }
    }
}

impl ScrapeResponse {
    /// Reword a successful body for a run that wrote to an in-memory sheet.
    pub fn into_dry_run(self) -> Self {
        if !self.success {
            return self;
        }
        Self {
            message: format!(
                "Dry run: extracted {} trademarks, nothing was saved to Google Sheets",
                self.count
            ),
            ..self
        }
    }
}

impl From<MarksyncError> for ScrapeFailure {
    fn from(err: MarksyncError) -> Self {
        Self {
            status: FAILURE_STATUS,
            message: err.to_string(),
        }
    }
}

/// Map a run result to the response shape.
pub fn respond(result: Result<RunOutcome>) -> std::result::Result<ScrapeResponse, ScrapeFailure> {
    match result {
        Ok(outcome) => Ok(outcome.into()),
        Err(e) => {
            error!(kind = e.kind(), error = %e, "scrape failed");
            Err(e.into())
        }
    }
}

/// Run `pipeline` for one request and shape the result.
#[instrument(skip_all, fields(formula = %request.formula))]
pub async fn handle(
    pipeline: &Pipeline,
    request: &ScrapeRequest,
    progress: &dyn ProgressReporter,
) -> std::result::Result<ScrapeResponse, ScrapeFailure> {
    let target = SyncTarget::new(request.spreadsheet_url.clone());
    respond(pipeline.run(&request.formula, &target, progress).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use marksync_collector::DemoSource;
    use marksync_extract::FieldExtractor;
    use marksync_sheets::{MemorySheetClient, Synchronizer};

    use crate::pipeline::SilentProgress;

    #[test]
    fn no_data_body() {
        let body = serde_json::to_value(ScrapeResponse::from(RunOutcome::NoData)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"success": false, "message": "No trademarks found", "count": 0})
        );
    }

    #[test]
    fn synced_body_carries_records() {
        let records = vec![Record {
            mark: "ACME".into(),
            ..Record::default()
        }];
        let response = ScrapeResponse::from(RunOutcome::Synced {
            count: 1,
            records: records.clone(),
        });
        assert!(response.success);
        assert_eq!(
            response.message,
            "Successfully extracted 1 trademarks and saved to Google Sheets"
        );
        assert_eq!(response.data, Some(records));

        let body = serde_json::to_value(&response).unwrap();
        assert_eq!(body["data"][0]["mark"], "ACME");
        assert_eq!(body["data"][0]["goods_services"], "");
    }

    #[test]
    fn dry_run_body_does_not_claim_a_save() {
        let response = ScrapeResponse::from(RunOutcome::Synced {
            count: 5,
            records: vec![Record::default(); 5],
        })
        .into_dry_run();
        assert!(response.success);
        assert_eq!(
            response.message,
            "Dry run: extracted 5 trademarks, nothing was saved to Google Sheets"
        );
        assert!(!response.message.starts_with("Successfully"));
        assert_eq!(response.data.map(|d| d.len()), Some(5));

        let no_data = ScrapeResponse::from(RunOutcome::NoData).into_dry_run();
        assert_eq!(no_data.message, "No trademarks found");
    }

    #[test]
    fn errors_become_status_500() {
        let failure = respond(Err(MarksyncError::invalid_target("nope"))).unwrap_err();
        assert_eq!(failure.status, 500);
        assert!(failure.message.starts_with("Invalid Google Sheets URL format"));

        let failure = ScrapeFailure::from(MarksyncError::SyncWrite {
            written: 2,
            message: "quota exceeded".into(),
        });
        assert_eq!(failure.message, "sync write failed after 2 row(s): quota exceeded");
        assert_eq!(
            serde_json::to_value(&failure).unwrap(),
            serde_json::json!({"status": 500, "detail": "sync write failed after 2 row(s): quota exceeded"})
        );
    }

    #[test]
    fn request_parses_from_json() {
        let request: ScrapeRequest = serde_json::from_str(
            r#"{"formula": "DEMO", "spreadsheet_url": "https://docs.google.com/spreadsheets/d/x/"}"#,
        )
        .unwrap();
        assert_eq!(request.formula, "DEMO");
    }

    #[tokio::test]
    async fn handle_runs_the_pipeline() {
        let sheet = Arc::new(MemorySheetClient::new());
        let pipeline = Pipeline::new(
            Arc::new(DemoSource),
            FieldExtractor::fallback_only(),
            Synchronizer::new(sheet.clone(), Duration::from_secs(5)),
        );
        let request = ScrapeRequest {
            formula: "DEMO".into(),
            spreadsheet_url: "https://docs.google.com/spreadsheets/d/abc123/edit".into(),
        };

        let response = handle(&pipeline, &request, &SilentProgress).await.unwrap();
        assert_eq!(response.count, 5);
        assert_eq!(response.data.map(|d| d.len()), Some(5));
        assert_eq!(sheet.rows().await.len(), 6);

        let bad = ScrapeRequest {
            spreadsheet_url: "https://docs.google.com/document/d/abc123".into(),
            ..request
        };
        let failure = handle(&pipeline, &bad, &SilentProgress).await.unwrap_err();
        assert_eq!(failure.status, 500);
    }
}
