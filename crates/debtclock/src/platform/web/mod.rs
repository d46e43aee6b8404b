//! Web platform implementations using browser APIs.

mod dom;
mod http;
mod timer;

pub use dom::{AMOUNT_ID, DATE_ID, DomSurface, SOURCE_ID};
pub use http::FetchTransport;
pub use timer::{GlooSleeper, PerformanceClock};
