//! Widget configuration
//!
//! The main configuration type is [`WidgetConfig`]. It is built once at
//! startup (from defaults, a file, or a host-provided JSON document),
//! validated, and then handed by value to the components that need it.
//! The only way to change it afterwards is a [`ConfigOverride`] queued on the
//! widget, which takes effect when the next refresh cycle starts.
//!
//! # Example (YAML)
//!
//! ```yaml
//! source_order: [cached, live]
//! snapshot:
//!   enabled: true
//!   url: https://example.org/debt.json
//! retry:
//!   max_retries: 2
//!   retry_delay_ms: 500
//! animation:
//!   easing: easeInOutCubic
//! emergency_fallback:
//!   amount: 36215124313382.16
//!   as_of: 2025-06-27
//!   source_label: U.S. Treasury (last known)
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::easing::Easing;
use crate::error::ConfigError;
use crate::format::DisplayOptions;
use crate::model::{DebtRecord, SourceKind, is_valid_amount};
use crate::retry::RetryPolicy;

mod overrides;

pub use overrides::ConfigOverride;

/// Treasury "Debt to the Penny" dataset
pub const TREASURY_DEBT_TO_PENNY_URL: &str =
    "https://api.fiscaldata.treasury.gov/services/api/fiscal_service/v2/accounting/od/debt_to_penny";

/// Last known figure shipped with the widget
const BUILTIN_FALLBACK_AMOUNT: f64 = 36_215_124_313_382.16;

fn default_source_order() -> Vec<SourceKind> {
    vec![SourceKind::Cached, SourceKind::Live]
}

/// Complete widget configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub snapshot: SnapshotConfig,

    /// Retry settings shared by every fetchable source
    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub animation: AnimationConfig,

    #[serde(default)]
    pub display: DisplayOptions,

    #[serde(default)]
    pub refresh: RefreshConfig,

    /// Fetchable sources in priority order. The emergency fallback is always
    /// tried last and does not appear here.
    #[serde(default = "default_source_order")]
    pub source_order: Vec<SourceKind>,

    /// Mandatory; `None` only exists so a missing entry can be reported as a
    /// configuration error instead of a parse error.
    #[serde(default)]
    pub emergency_fallback: Option<DebtRecord>,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            snapshot: SnapshotConfig::default(),
            retry: RetryConfig::default(),
            animation: AnimationConfig::default(),
            display: DisplayOptions::default(),
            refresh: RefreshConfig::default(),
            source_order: default_source_order(),
            emergency_fallback: Some(DebtRecord::new(
                BUILTIN_FALLBACK_AMOUNT,
                jiff::civil::date(2025, 6, 27),
                "U.S. Treasury Fiscal Data (last known)",
            )),
        }
    }
}

impl WidgetConfig {
    /// Decode and validate a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: WidgetConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Check every startup invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.fallback()?;

        if self.animation.duration_ms < 0 {
            return Err(ConfigError::NegativeDuration(self.animation.duration_ms));
        }

        let fraction = self.animation.reduction_fraction;
        if !fraction.is_finite() || !(0.0..1.0).contains(&fraction) {
            return Err(ConfigError::InvalidReductionFraction(fraction));
        }

        if self.refresh.auto_refresh && self.refresh.interval_ms == 0 {
            return Err(ConfigError::ZeroRefreshInterval);
        }

        if self.snapshot.enabled && self.snapshot.url.as_deref().is_none_or(str::is_empty) {
            return Err(ConfigError::MissingSnapshotUrl);
        }

        if self.api.enabled && self.api.url.trim().is_empty() {
            return Err(ConfigError::EmptyApiUrl);
        }

        Ok(())
    }

    /// The emergency fallback record, checked against the validity invariant.
    pub fn fallback(&self) -> Result<&DebtRecord, ConfigError> {
        let record = self
            .emergency_fallback
            .as_ref()
            .ok_or(ConfigError::MissingFallback)?;
        if !is_valid_amount(record.amount) {
            return Err(ConfigError::InvalidFallbackAmount(record.amount));
        }
        Ok(record)
    }

    /// Whether a fetchable source is switched on.
    pub fn is_enabled(&self, kind: SourceKind) -> bool {
        match kind {
            SourceKind::Cached => self.snapshot.enabled,
            SourceKind::Live => self.api.enabled,
        }
    }

    /// Copy of this configuration with the override's fields applied.
    pub fn with_override(&self, overrides: &ConfigOverride) -> WidgetConfig {
        let mut config = self.clone();
        overrides.apply_to(&mut config);
        config
    }
}

/// Live upstream API settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub enabled: bool,
    pub url: String,
    pub params: QueryParams,
    pub label: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: TREASURY_DEBT_TO_PENNY_URL.to_string(),
            params: QueryParams::default(),
            label: "U.S. Treasury Fiscal Data".to_string(),
        }
    }
}

impl ApiConfig {
    /// Full request URL, e.g. `<url>?sort=-record_date&page[size]=1&format=json`
    pub fn request_url(&self) -> String {
        let separator = if self.url.contains('?') { '&' } else { '?' };
        format!(
            "{}{}sort={}&page[size]={}&format={}",
            self.url, separator, self.params.sort, self.params.page_size, self.params.format
        )
    }
}

/// Query parameters for the latest-record request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryParams {
    /// Descending by date, newest first
    pub sort: String,
    pub page_size: u32,
    pub format: String,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            sort: "-record_date".to_string(),
            page_size: 1,
            format: "json".to_string(),
        }
    }
}

/// Pre-published snapshot document settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    pub enabled: bool,
    pub url: Option<String>,
    /// Label used when the document has no `source` field
    pub label: String,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: None,
            label: "Published snapshot".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: u32,
    /// Base delay; attempt `n` waits `n * retry_delay_ms`
    pub retry_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay_ms: 1000,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, Duration::from_millis(self.retry_delay_ms))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub enabled: bool,
    pub duration_ms: i64,
    /// Start the count this fraction below the target
    pub reduction_fraction: f64,
    /// Easing name; unknown names fall back to linear
    pub easing: String,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            duration_ms: 2000,
            reduction_fraction: 0.1,
            easing: Easing::EaseOutExpo.name().to_string(),
        }
    }
}

impl AnimationConfig {
    pub fn easing(&self) -> Easing {
        Easing::from_name(&self.easing)
    }

    pub fn start_value(&self, target: f64) -> f64 {
        target * (1.0 - self.reduction_fraction)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    pub auto_refresh: bool,
    pub interval_ms: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            auto_refresh: true,
            interval_ms: 60 * 60 * 1000,
        }
    }
}

impl RefreshConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}
