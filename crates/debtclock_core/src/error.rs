use std::fmt;

/// Errors produced while fetching or decoding a single source.
///
/// All variants are retried the same way by [`crate::retry::with_retry`];
/// the chain decides what to do once retries are exhausted.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchError {
    /// Network failure before a response was received
    Transport(String),
    /// Response received with a non-success status
    Status { code: u16, reason: String },
    /// Payload missing expected fields or carrying an unusable amount
    Shape(String),
}

impl FetchError {
    pub fn shape(msg: impl Into<String>) -> Self {
        FetchError::Shape(msg.into())
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Transport(msg) => write!(f, "transport failure: {msg}"),
            FetchError::Status { code, reason } => write!(f, "HTTP {code}: {reason}"),
            FetchError::Shape(msg) => write!(f, "unexpected payload: {msg}"),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Shape(err.to_string())
    }
}

/// Startup-time configuration problems. These are fatal for the host.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    MissingFallback,
    InvalidFallbackAmount(f64),
    NegativeDuration(i64),
    InvalidReductionFraction(f64),
    ZeroRefreshInterval,
    MissingSnapshotUrl,
    EmptyApiUrl,
    /// Configuration text could not be decoded
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingFallback => write!(f, "emergency fallback record is required"),
            ConfigError::InvalidFallbackAmount(amount) => write!(
                f,
                "emergency fallback amount must be finite and positive (got {amount})"
            ),
            ConfigError::NegativeDuration(ms) => {
                write!(f, "animation duration must be >= 0 ms (got {ms})")
            }
            ConfigError::InvalidReductionFraction(fraction) => write!(
                f,
                "reduction fraction must be in [0, 1) (got {fraction})"
            ),
            ConfigError::ZeroRefreshInterval => {
                write!(f, "refresh interval must be > 0 when auto-refresh is enabled")
            }
            ConfigError::MissingSnapshotUrl => {
                write!(f, "snapshot source is enabled but has no url")
            }
            ConfigError::EmptyApiUrl => write!(f, "api source is enabled but its url is empty"),
            ConfigError::Parse(msg) => write!(f, "configuration error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}
