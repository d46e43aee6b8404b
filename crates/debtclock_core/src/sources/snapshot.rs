//! Pre-published snapshot document
//!
//! Expected shape:
//!
//! ```json
//! { "amount": 36215124313382.16, "date": "2025-06-27",
//!   "lastUpdated": "2025-06-28T04:00:00Z", "source": "U.S. Treasury" }
//! ```

use jiff::Timestamp;
use jiff::civil::Date;
use serde::Deserialize;

use super::{RawAmount, checked_amount};
use crate::error::FetchError;
use crate::model::DebtRecord;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotDocument {
    amount: Option<RawAmount>,
    date: Option<String>,
    last_updated: Option<String>,
    source: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotSource {
    url: String,
    /// Used when the document does not name its source
    label: String,
}

impl SnapshotSource {
    pub fn new(url: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            label: label.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub(crate) fn parse(&self, value: serde_json::Value) -> Result<DebtRecord, FetchError> {
        let doc: SnapshotDocument = serde_json::from_value(value)?;

        let amount = doc
            .amount
            .as_ref()
            .and_then(RawAmount::to_f64)
            .ok_or_else(|| FetchError::shape("snapshot has no numeric amount"))?;
        let amount = checked_amount(amount)?;

        let date = doc
            .date
            .as_deref()
            .ok_or_else(|| FetchError::shape("snapshot has no date"))?;
        let as_of: Date = date
            .parse()
            .map_err(|e| FetchError::shape(format!("invalid snapshot date {date:?}: {e}")))?;

        if let Some(published) = doc.last_updated.as_deref() {
            match published.parse::<Timestamp>() {
                Ok(ts) => tracing::debug!(published = %ts, "Snapshot publication time"),
                Err(e) => tracing::debug!(published, error = %e, "Unparsed lastUpdated"),
            }
        }

        let label = doc
            .source
            .filter(|source| !source.trim().is_empty())
            .unwrap_or_else(|| self.label.clone());

        Ok(DebtRecord::new(amount, as_of, label))
    }
}
