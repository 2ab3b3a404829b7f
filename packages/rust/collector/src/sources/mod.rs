//! Source adapter trait and built-in adapters.
//!
//! Adapters only hand back raw documents; retry or backoff, if ever needed,
//! lives inside the adapter.

mod demo;
mod files;

use async_trait::async_trait;

use marksync_shared::{RawDocument, Result};

pub use demo::DemoSource;
pub use files::FileSource;

/// Produces raw documents for a query.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Fetch documents for `query`, in source order. Zero documents is a valid answer.
    async fn fetch(&self, query: &str) -> Result<Vec<RawDocument>>;

    /// Human-readable adapter name for tracing.
    fn name(&self) -> &str;
}
