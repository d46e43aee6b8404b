//! Debt counter host application
//!
//! Binds the [`debtclock_core`] widget to a concrete display surface:
//! - `native`: full-screen terminal UI with a background fetch worker
//! - `web`: WASM module writing into page elements

// ============================================================================
// Host modules
// ============================================================================

pub mod platform;

#[cfg(feature = "native")]
pub mod app;
#[cfg(feature = "native")]
pub mod config_file;
#[cfg(feature = "native")]
mod logging;

#[cfg(feature = "web")]
mod web;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

#[cfg(feature = "native")]
pub use app::App;
#[cfg(feature = "native")]
pub use logging::init_logging;

/// Route `tracing` events to the browser console.
#[cfg(feature = "web")]
pub fn init_logging_web() {
    let config = tracing_wasm::WASMLayerConfigBuilder::new()
        .set_max_level(tracing::Level::INFO)
        .build();
    tracing_wasm::set_as_global_default_with_config(config);
}
