//! Native platform implementations using reqwest, tokio and threads.

mod clock;
mod http;
mod worker;

pub use clock::{InstantClock, TokioSleeper};
pub use http::ReqwestTransport;
pub use worker::{RefreshRequest, RefreshResponse, RefreshWorker};
