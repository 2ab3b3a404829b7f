//! Field extraction: raw document → [`Record`].
//!
//! Two strategies, chosen once per document:
//! - a primary [`PrimaryExtractor`] (model-assisted, optional, may fail)
//! - the deterministic [`fallback`] patterns (always available)
//!
//! If the primary is configured and returns a parseable record, that record is
//! used as-is. Anything else (no primary, network error, timeout, garbage
//! reply) routes the whole document to the fallback. The fallback never patches
//! fields a successful primary left empty.

pub mod fallback;
mod openrouter;

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use marksync_shared::{OpenRouterConfig, RawDocument, Record, Result, resolve_api_key};

pub use openrouter::OpenRouterExtractor;

/// An optional, fallible extraction capability tried before the fallback.
#[async_trait]
pub trait PrimaryExtractor: Send + Sync {
    /// Produce a record from document content, or explain why not.
    async fn extract(&self, content: &str) -> Result<Record>;

    /// Human-readable name for tracing.
    fn name(&self) -> &str;
}

/// Total extractor: always yields a [`Record`], never an error.
pub struct FieldExtractor {
    primary: Option<Box<dyn PrimaryExtractor>>,
    timeout: Duration,
}

impl FieldExtractor {
    /// Extractor that only runs the fallback patterns.
    pub fn fallback_only() -> Self {
        Self {
            primary: None,
            timeout: Duration::from_secs(30),
        }
    }

    /// Extractor with a primary capability bounded by `timeout`.
    pub fn with_primary(primary: Box<dyn PrimaryExtractor>, timeout: Duration) -> Self {
        Self {
            primary: Some(primary),
            timeout,
        }
    }

    /// Build from config: an API key enables OpenRouter, no key means fallback only.
    pub fn from_config(config: &OpenRouterConfig) -> Result<Self> {
        match resolve_api_key(config) {
            Some(key) => {
                let primary = OpenRouterExtractor::new(config, key)?;
                Ok(Self::with_primary(
                    Box::new(primary),
                    Duration::from_secs(config.timeout_secs),
                ))
            }
            None => {
                debug!(env = %config.api_key_env, "no extraction API key, using fallback only");
                Ok(Self::fallback_only())
            }
        }
    }

    /// Whether a primary capability is configured.
    pub fn has_primary(&self) -> bool {
        self.primary.is_some()
    }

    /// Extract a record from `raw`. Failures of the primary are logged and absorbed.
    #[instrument(skip_all, fields(origin = raw.origin.as_deref().unwrap_or("-")))]
    pub async fn extract(&self, raw: &RawDocument) -> Record {
        if let Some(primary) = &self.primary {
            match tokio::time::timeout(self.timeout, primary.extract(&raw.content)).await {
                Ok(Ok(record)) => {
                    debug!(extractor = primary.name(), "primary extraction succeeded");
                    return record;
                }
                Ok(Err(e)) => {
                    warn!(extractor = primary.name(), error = %e, "primary extraction failed, using fallback");
                }
                Err(_) => {
                    warn!(
                        extractor = primary.name(),
                        timeout_secs = self.timeout.as_secs_f64(),
                        "primary extraction timed out, using fallback"
                    );
                }
            }
        }

        fallback::extract(&raw.content)
    }
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::fallback_only()
    }
}
