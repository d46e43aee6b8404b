use std::fmt;

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

/// Where a displayed figure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Fresh record from the upstream API
    Live,
    /// Pre-published snapshot document
    Cached,
    /// Configured constant, used when nothing else answered
    #[default]
    Estimated,
}

impl Provenance {
    pub fn label(&self) -> &'static str {
        match self {
            Provenance::Live => "live",
            Provenance::Cached => "cached",
            Provenance::Estimated => "estimated",
        }
    }

    pub fn is_estimate(&self) -> bool {
        !matches!(self, Provenance::Live)
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Fetchable sources, in the vocabulary used by `source_order`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Cached,
    Live,
}

impl SourceKind {
    pub fn provenance(&self) -> Provenance {
        match self {
            SourceKind::Cached => Provenance::Cached,
            SourceKind::Live => Provenance::Live,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.provenance().label())
    }
}

/// A debt figure normalized from any source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtRecord {
    /// Total debt in dollars
    pub amount: f64,
    /// Date the figure was recorded
    pub as_of: Date,
    /// Human-readable provenance, e.g. "U.S. Treasury Fiscal Data (live)"
    pub source_label: String,
    #[serde(default)]
    pub provenance: Provenance,
}

impl DebtRecord {
    pub fn new(amount: f64, as_of: Date, source_label: impl Into<String>) -> Self {
        Self {
            amount,
            as_of,
            source_label: source_label.into(),
            provenance: Provenance::default(),
        }
    }

    /// A record may only be displayed when its amount is finite and positive.
    pub fn is_valid(&self) -> bool {
        is_valid_amount(self.amount)
    }

    pub fn is_estimate(&self) -> bool {
        self.provenance.is_estimate()
    }

    /// Mark the record with its provenance and append it to the source label.
    pub fn tagged(mut self, provenance: Provenance) -> Self {
        self.source_label = if self.source_label.is_empty() {
            provenance.label().to_string()
        } else {
            format!("{} ({})", self.source_label, provenance)
        };
        self.provenance = provenance;
        self
    }
}

/// Zero, negative and non-finite amounts are never shown.
pub fn is_valid_amount(amount: f64) -> bool {
    amount.is_finite() && amount > 0.0
}
