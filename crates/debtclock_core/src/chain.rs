//! Ordered source chain with a guaranteed answer
//!
//! Sources are tried strictly in order, each wrapped in the retry policy.
//! The first valid record wins. When every fetchable source has failed the
//! emergency fallback is returned, so [`SourceChain::resolve`] never fails.

use crate::config::WidgetConfig;
use crate::error::{ConfigError, FetchError};
use crate::model::{DebtRecord, Provenance, SourceKind};
use crate::retry::{RetryPolicy, Sleeper, with_retry};
use crate::sources::{DataSource, JsonTransport};

/// A source that exhausted its retries during one resolution
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFailure {
    pub source: SourceKind,
    pub error: FetchError,
}

/// Outcome of one pass over the chain
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub record: DebtRecord,
    /// Position of the answering source; the emergency fallback sits one
    /// past the last fetchable source
    pub source_index: usize,
    /// The source that answered, `None` for the emergency fallback
    pub source: Option<SourceKind>,
    /// Sources that failed before the answer, in the order they were tried
    pub failures: Vec<SourceFailure>,
}

impl Resolution {
    pub fn used_fallback(&self) -> bool {
        self.source.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct SourceChain {
    sources: Vec<DataSource>,
    retry: RetryPolicy,
    emergency: DebtRecord,
}

impl SourceChain {
    pub fn new(sources: Vec<DataSource>, retry: RetryPolicy, emergency: DebtRecord) -> Self {
        Self {
            sources,
            retry,
            emergency,
        }
    }

    /// Build the chain from a validated configuration.
    ///
    /// Disabled sources are left out, as are repeats in `source_order`.
    pub fn from_config(config: &WidgetConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let emergency = config.fallback()?.clone();

        let mut sources: Vec<DataSource> = Vec::with_capacity(config.source_order.len());
        for &kind in &config.source_order {
            if sources.iter().any(|source| source.kind() == kind) {
                tracing::debug!(source = %kind, "Ignoring repeated source");
                continue;
            }
            match DataSource::from_config(kind, config) {
                Some(source) => sources.push(source),
                None => tracing::debug!(source = %kind, "Source disabled, skipping"),
            }
        }

        Ok(Self::new(sources, config.retry.policy(), emergency))
    }

    pub fn sources(&self) -> &[DataSource] {
        &self.sources
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Walk the chain until a source answers.
    pub async fn resolve<T, S>(&self, transport: &T, sleeper: &S) -> Resolution
    where
        T: JsonTransport,
        S: Sleeper,
    {
        let mut failures = Vec::new();

        for (index, source) in self.sources.iter().enumerate() {
            let kind = source.kind();
            tracing::debug!(source = %kind, url = source.url(), "Trying source");

            match with_retry(&self.retry, sleeper, index, || source.fetch(transport)).await {
                Ok(record) => {
                    tracing::info!(
                        source = %kind,
                        amount = record.amount,
                        as_of = %record.as_of,
                        "Resolved debt figure"
                    );
                    return Resolution {
                        record,
                        source_index: index,
                        source: Some(kind),
                        failures,
                    };
                }
                Err(error) => {
                    tracing::warn!(source = %kind, error = %error, "Source exhausted, moving on");
                    failures.push(SourceFailure {
                        source: kind,
                        error,
                    });
                }
            }
        }

        tracing::warn!(
            failed = failures.len(),
            "All sources failed, showing emergency fallback"
        );
        Resolution {
            record: self.emergency.clone().tagged(Provenance::Estimated),
            source_index: self.sources.len(),
            source: None,
            failures,
        }
    }
}
