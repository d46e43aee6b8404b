//! Engine tests for the debt counter
//!
//! Tests are organized by topic:
//! - `retry` - Attempt counts and linear backoff delays
//! - `chain` - Source ordering, fallthrough and the emergency fallback
//! - `animation` - Frame sequencing, termination and cancellation
//! - `widget` - Refresh cycles, rendering, overrides and stale results
//!
//! `support` holds the scripted transport, recording sleeper and recording
//! display surface shared by the topics above.

mod support;
mod widget;
