//! Platform layer for native/web hosts.
//!
//! Each platform supplies the engine's I/O seams:
//! - [`debtclock_core::JsonTransport`]: HTTP GET returning JSON
//! - [`debtclock_core::Sleeper`]: waiting between retries
//! - [`debtclock_core::Clock`]: frame timestamps for the animator
//!
//! Native uses reqwest on a worker thread with a tokio runtime; web uses the
//! browser's `fetch`, timers and `performance.now()`.

#[cfg(feature = "native")]
pub mod native;

#[cfg(feature = "web")]
pub mod web;

#[cfg(feature = "native")]
pub use native::{InstantClock, RefreshWorker, ReqwestTransport, TokioSleeper};

#[cfg(feature = "web")]
pub use web::{DomSurface, FetchTransport, GlooSleeper, PerformanceClock};
