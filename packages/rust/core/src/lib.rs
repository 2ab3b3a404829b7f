//! Pipeline orchestration for marksync.
//!
//! This crate ties together collection (source → records) and spreadsheet
//! synchronization into one end-to-end run, and maps run outcomes to the
//! request/response shapes exposed by the outer surface.

pub mod pipeline;
pub mod request;

pub use pipeline::{Pipeline, ProgressReporter, RunOutcome, SilentProgress};
pub use request::{ScrapeFailure, ScrapeRequest, ScrapeResponse, handle, respond};
