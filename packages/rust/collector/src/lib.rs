//! Record collection: query → raw documents → records.
//!
//! This crate provides:
//! - [`sources`]: the [`SourceAdapter`] trait plus demo and file adapters
//! - [`collect`]: runs the field extractor over every document in source order

pub mod sources;

use tracing::{debug, info, instrument};

use marksync_extract::FieldExtractor;
use marksync_shared::{Record, Result};

pub use sources::{DemoSource, FileSource, SourceAdapter};

/// Fetch documents for `query` and extract one record per document.
///
/// Order follows the adapter. Nothing is deduplicated, capped or retried; an
/// adapter error propagates unchanged. An empty document list gives an empty
/// record list.
#[instrument(skip_all, fields(source = source.name(), query = %query))]
pub async fn collect(
    query: &str,
    source: &dyn SourceAdapter,
    extractor: &FieldExtractor,
) -> Result<Vec<Record>> {
    let documents = source.fetch(query).await?;
    info!(documents = documents.len(), "documents fetched");

    let mut records = Vec::with_capacity(documents.len());
    for (i, doc) in documents.iter().enumerate() {
        let record = extractor.extract(doc).await;
        debug!(index = i, mark = %record.mark, serial = %record.us_serial_number, "record extracted");
        records.push(record);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use marksync_shared::{MarksyncError, RawDocument};

    struct EmptySource;

    #[async_trait]
    impl SourceAdapter for EmptySource {
        async fn fetch(&self, _query: &str) -> Result<Vec<RawDocument>> {
            Ok(Vec::new())
        }
        fn name(&self) -> &str {
            "empty"
        }
    }

    struct BrokenSource;

    #[async_trait]
    impl SourceAdapter for BrokenSource {
        async fn fetch(&self, _query: &str) -> Result<Vec<RawDocument>> {
            Err(MarksyncError::Source("upstream unavailable".into()))
        }
        fn name(&self) -> &str {
            "broken"
        }
    }

    struct DuplicateSource;

    #[async_trait]
    impl SourceAdapter for DuplicateSource {
        async fn fetch(&self, query: &str) -> Result<Vec<RawDocument>> {
            Ok(vec![
                RawDocument::new(query, "Serial Number: 11111111"),
                RawDocument::new(query, "Serial Number: 22222222"),
                RawDocument::new(query, "Serial Number: 11111111"),
            ])
        }
        fn name(&self) -> &str {
            "dupes"
        }
    }

    #[tokio::test]
    async fn empty_source_yields_no_records() {
        let records = collect("DEMO", &EmptySource, &FieldExtractor::fallback_only())
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn source_error_propagates() {
        let err = collect("DEMO", &BrokenSource, &FieldExtractor::fallback_only())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("upstream unavailable"));
    }

    #[tokio::test]
    async fn order_preserved_without_dedup() {
        let records = collect("q", &DuplicateSource, &FieldExtractor::fallback_only())
            .await
            .unwrap();
        let serials: Vec<&str> = records.iter().map(|r| r.us_serial_number.as_str()).collect();
        assert_eq!(serials, vec!["11111111", "22222222", "11111111"]);
    }

    #[tokio::test]
    async fn demo_source_through_fallback() {
        let records = collect("DEMO", &DemoSource, &FieldExtractor::fallback_only())
            .await
            .unwrap();
        let truth = DemoSource::sample_records();

        assert_eq!(records.len(), 5);
        for (got, want) in records.iter().zip(&truth) {
            assert_eq!(got.correspondent_email, want.correspondent_email);
            assert_eq!(got.phone, want.phone);
            assert_eq!(got.us_serial_number, want.us_serial_number);
            // Fallback never fills these
            assert_eq!(got.mark, "");
            assert_eq!(got.correspondent, "");
        }
    }
}
