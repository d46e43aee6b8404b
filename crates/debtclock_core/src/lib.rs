//! Public debt counter engine
//!
//! This crate contains the host-agnostic parts of the debt counter widget:
//! - Resilient data acquisition: an ordered chain of data sources (cached
//!   snapshot, live Treasury API, emergency constant) with per-source retry
//! - Display formatting of monetary magnitudes, as plain text or as markup
//!   with one container per digit for fixed-pitch rendering
//! - A frame-driven animator with named easing functions and cooperative
//!   cancellation
//! - A widget controller that runs refresh cycles and discards stale results
//!
//! Hosts supply the I/O seams: [`sources::JsonTransport`] for HTTP,
//! [`retry::Sleeper`] for timers, [`animation::Clock`] for timestamps and
//! [`widget::RenderTarget`] for the display surface.
//!
//! ```ignore
//! use debtclock_core::{DebtWidget, WidgetConfig};
//!
//! let mut widget = DebtWidget::new(WidgetConfig::default(), target, clock)?;
//! let outcome = widget.refresh(&transport, &sleeper).await;
//!
//! // Each display frame
//! while widget.frame() {}
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod animation;
pub mod chain;
pub mod easing;
pub mod error;
pub mod format;
pub mod retry;
pub mod sources;
pub mod widget;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod config;
pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use animation::{AnimationRequest, Animator, CancelHandle, Clock, ManualClock};
pub use chain::{Resolution, SourceChain, SourceFailure};
pub use config::{ConfigOverride, WidgetConfig};
pub use easing::Easing;
pub use error::{ConfigError, FetchError};
pub use format::{DisplayOptions, format_markup, format_plain};
pub use model::{CycleId, DebtRecord, Provenance, SourceKind};
pub use retry::{RetryPolicy, Sleeper, with_retry};
pub use sources::{DataSource, JsonTransport};
pub use widget::{CycleOutcome, DebtWidget, RefreshCycle, RenderTarget, Slot};
