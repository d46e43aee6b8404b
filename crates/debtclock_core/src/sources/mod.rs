//! Fetchable data sources
//!
//! Each source knows one upstream document shape and normalizes it into a
//! [`DebtRecord`]. Sources never retry on their own; the chain wraps every
//! fetch in the retry policy.

use std::future::Future;

use serde::Deserialize;

use crate::config::WidgetConfig;
use crate::error::FetchError;
use crate::model::{DebtRecord, SourceKind, is_valid_amount};

mod snapshot;
mod treasury;

pub use snapshot::SnapshotSource;
pub use treasury::TreasurySource;

/// HTTP seam: GET a URL and decode the body as JSON.
///
/// Non-success statuses must be reported as [`FetchError::Status`].
pub trait JsonTransport {
    fn get_json(&self, url: &str) -> impl Future<Output = Result<serde_json::Value, FetchError>>;
}

/// A source the chain can fetch from
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    Snapshot(SnapshotSource),
    Treasury(TreasurySource),
}

impl DataSource {
    /// Build the source for `kind`, or `None` when it is switched off.
    pub fn from_config(kind: SourceKind, config: &WidgetConfig) -> Option<DataSource> {
        if !config.is_enabled(kind) {
            return None;
        }
        match kind {
            SourceKind::Cached => {
                let url = config.snapshot.url.clone()?;
                Some(DataSource::Snapshot(SnapshotSource::new(
                    url,
                    config.snapshot.label.clone(),
                )))
            }
            SourceKind::Live => Some(DataSource::Treasury(TreasurySource::new(
                config.api.request_url(),
                config.api.label.clone(),
            ))),
        }
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            DataSource::Snapshot(_) => SourceKind::Cached,
            DataSource::Treasury(_) => SourceKind::Live,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            DataSource::Snapshot(source) => source.url(),
            DataSource::Treasury(source) => source.url(),
        }
    }

    /// One fetch attempt, returning a valid record tagged with its provenance.
    pub async fn fetch<T: JsonTransport>(&self, transport: &T) -> Result<DebtRecord, FetchError> {
        let value = transport.get_json(self.url()).await?;
        let record = match self {
            DataSource::Snapshot(source) => source.parse(value)?,
            DataSource::Treasury(source) => source.parse(value)?,
        };
        Ok(record.tagged(self.kind().provenance()))
    }
}

/// Monetary field as published: JSON number or numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawAmount {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl RawAmount {
    /// The numeric value, if the field holds one.
    pub(crate) fn to_f64(&self) -> Option<f64> {
        match self {
            RawAmount::Number(value) => Some(*value),
            RawAmount::Text(text) => text.trim().parse().ok(),
            RawAmount::Other(_) => None,
        }
    }
}

/// Reject amounts that break the record invariant.
pub(crate) fn checked_amount(amount: f64) -> Result<f64, FetchError> {
    if is_valid_amount(amount) {
        Ok(amount)
    } else {
        Err(FetchError::shape(format!(
            "amount must be finite and positive (got {amount})"
        )))
    }
}
