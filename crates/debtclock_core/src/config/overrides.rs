//! Narrow, explicit override of selected configuration options.

use serde::{Deserialize, Serialize};

use crate::config::WidgetConfig;
use crate::error::ConfigError;
use crate::model::{DebtRecord, SourceKind};

/// Optional replacement values for the recognized configuration options.
///
/// Unset fields leave the base configuration untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigOverride {
    pub api_url: Option<String>,
    pub api_enabled: Option<bool>,
    pub snapshot_url: Option<String>,
    pub snapshot_enabled: Option<bool>,
    pub source_order: Option<Vec<SourceKind>>,

    pub max_retries: Option<u32>,
    pub retry_delay_ms: Option<u64>,

    pub animation_enabled: Option<bool>,
    pub duration_ms: Option<i64>,
    pub reduction_fraction: Option<f64>,
    pub easing: Option<String>,

    pub show_symbol: Option<bool>,
    pub use_grouping: Option<bool>,
    pub abbreviate_trillions: Option<bool>,
    pub round_to_integer: Option<bool>,
    pub fixed_width_digits: Option<bool>,

    pub auto_refresh: Option<bool>,
    pub interval_ms: Option<u64>,

    pub emergency_fallback: Option<DebtRecord>,
}

impl ConfigOverride {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub(crate) fn apply_to(&self, config: &mut WidgetConfig) {
        set(&mut config.api.url, &self.api_url);
        set(&mut config.api.enabled, &self.api_enabled);
        if let Some(url) = &self.snapshot_url {
            config.snapshot.url = Some(url.clone());
        }
        set(&mut config.snapshot.enabled, &self.snapshot_enabled);
        set(&mut config.source_order, &self.source_order);

        set(&mut config.retry.max_retries, &self.max_retries);
        set(&mut config.retry.retry_delay_ms, &self.retry_delay_ms);

        set(&mut config.animation.enabled, &self.animation_enabled);
        set(&mut config.animation.duration_ms, &self.duration_ms);
        set(&mut config.animation.reduction_fraction, &self.reduction_fraction);
        set(&mut config.animation.easing, &self.easing);

        let display = &mut config.display;
        set(&mut display.show_symbol, &self.show_symbol);
        set(&mut display.use_grouping, &self.use_grouping);
        set(&mut display.abbreviate_trillions, &self.abbreviate_trillions);
        set(&mut display.round_to_integer, &self.round_to_integer);
        set(&mut display.fixed_width_digits, &self.fixed_width_digits);

        set(&mut config.refresh.auto_refresh, &self.auto_refresh);
        set(&mut config.refresh.interval_ms, &self.interval_ms);

        if let Some(record) = &self.emergency_fallback {
            config.emergency_fallback = Some(record.clone());
        }
    }
}

fn set<T: Clone>(slot: &mut T, value: &Option<T>) {
    if let Some(value) = value {
        *slot = value.clone();
    }
}
