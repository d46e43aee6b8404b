//! Live Treasury Fiscal Data API
//!
//! The API answers with `{ "data": [ { ... } ], "meta": { ... } }`, newest
//! row first given the default sort. Only the first row is read.

use jiff::civil::Date;
use serde::Deserialize;

use super::{RawAmount, checked_amount};
use crate::error::FetchError;
use crate::model::DebtRecord;

#[derive(Debug, Deserialize)]
struct TreasuryResponse {
    #[serde(default)]
    data: Vec<TreasuryRow>,
}

#[derive(Debug, Deserialize)]
struct TreasuryRow {
    record_date: Option<String>,
    tot_pub_debt_out_amt: Option<RawAmount>,
    total_public_debt_outstanding_amt: Option<RawAmount>,
    debt_outstanding_amt: Option<RawAmount>,
}

type AmountField = fn(&TreasuryRow) -> Option<&RawAmount>;

/// Amount fields in the order they are consulted. Different Fiscal Data
/// datasets publish the total under different names.
const AMOUNT_FIELDS: [(&str, AmountField); 3] = [
    ("tot_pub_debt_out_amt", TreasuryRow::debt_to_penny),
    ("total_public_debt_outstanding_amt", TreasuryRow::public_debt_outstanding),
    ("debt_outstanding_amt", TreasuryRow::debt_outstanding),
];

impl TreasuryRow {
    fn debt_to_penny(&self) -> Option<&RawAmount> {
        self.tot_pub_debt_out_amt.as_ref()
    }

    fn public_debt_outstanding(&self) -> Option<&RawAmount> {
        self.total_public_debt_outstanding_amt.as_ref()
    }

    fn debt_outstanding(&self) -> Option<&RawAmount> {
        self.debt_outstanding_amt.as_ref()
    }

    /// First amount field that is present and numeric
    fn amount(&self) -> Option<(&'static str, f64)> {
        AMOUNT_FIELDS
            .iter()
            .find_map(|(name, field)| field(self).and_then(RawAmount::to_f64).map(|v| (*name, v)))
    }

    /// Missing or unreadable dates count as today
    fn as_of(&self) -> Date {
        let today = || jiff::Zoned::now().date();
        match self.record_date.as_deref() {
            None => today(),
            Some(text) => text.parse().unwrap_or_else(|e| {
                tracing::warn!(record_date = text, error = %e, "Unreadable record_date, using today");
                today()
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TreasurySource {
    /// Base URL with query parameters already applied
    request_url: String,
    label: String,
}

impl TreasurySource {
    pub fn new(request_url: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            request_url: request_url.into(),
            label: label.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.request_url
    }

    pub(crate) fn parse(&self, value: serde_json::Value) -> Result<DebtRecord, FetchError> {
        let response: TreasuryResponse = serde_json::from_value(value)?;
        let row = response
            .data
            .into_iter()
            .next()
            .ok_or_else(|| FetchError::shape("response has no data rows"))?;

        let (field, amount) = row
            .amount()
            .ok_or_else(|| FetchError::shape("no recognized amount field in first row"))?;
        let amount = checked_amount(amount)?;
        tracing::debug!(field, amount, "Read live amount");

        Ok(DebtRecord::new(amount, row.as_of(), self.label.clone()))
    }
}
