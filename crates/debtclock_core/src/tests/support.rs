//! Test doubles for the host seams

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use serde_json::{Value, json};

use crate::config::WidgetConfig;
use crate::error::FetchError;
use crate::retry::Sleeper;
use crate::sources::JsonTransport;
use crate::widget::{RenderTarget, Slot};

pub const API_URL: &str = "https://api.test/debt_to_penny";
pub const SNAPSHOT_URL: &str = "https://snapshot.test/debt.json";

/// Config pointing at the test URLs with both sources on, snapshot first.
pub fn test_config() -> WidgetConfig {
    let mut config = WidgetConfig::default();
    config.api.url = API_URL.to_string();
    config.snapshot.enabled = true;
    config.snapshot.url = Some(SNAPSHOT_URL.to_string());
    config
}

pub fn live_url(config: &WidgetConfig) -> String {
    config.api.request_url()
}

pub fn treasury_body(amount: &str, record_date: &str) -> Value {
    json!({
        "data": [{ "record_date": record_date, "tot_pub_debt_out_amt": amount }],
        "meta": { "count": 1 }
    })
}

pub fn snapshot_body(amount: f64, date: &str) -> Value {
    json!({
        "amount": amount,
        "date": date,
        "lastUpdated": format!("{date}T12:00:00Z"),
        "source": "Debt snapshot"
    })
}

pub fn server_error() -> FetchError {
    FetchError::Status {
        code: 503,
        reason: "Service Unavailable".to_string(),
    }
}

/// Answers each URL from a script. The last scripted answer repeats once
/// the script runs out; unscripted URLs fail at the transport level.
#[derive(Default)]
pub struct ScriptedTransport {
    scripts: RefCell<HashMap<String, VecDeque<Result<Value, FetchError>>>>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(self, url: &str, answers: Vec<Result<Value, FetchError>>) -> Self {
        self.scripts
            .borrow_mut()
            .insert(url.to_string(), answers.into());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.calls.borrow().iter().filter(|call| *call == url).count()
    }
}

impl JsonTransport for ScriptedTransport {
    async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        self.calls.borrow_mut().push(url.to_string());

        let mut scripts = self.scripts.borrow_mut();
        let Some(answers) = scripts.get_mut(url) else {
            return Err(FetchError::Transport(format!("no route to {url}")));
        };
        if answers.len() > 1 {
            answers
                .pop_front()
                .unwrap_or_else(|| Err(FetchError::Transport("script empty".to_string())))
        } else {
            answers
                .front()
                .cloned()
                .unwrap_or_else(|| Err(FetchError::Transport("script empty".to_string())))
        }
    }
}

/// Returns immediately and remembers every requested delay.
#[derive(Default)]
pub struct RecordingSleeper {
    delays: RefCell<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delays_ms(&self) -> Vec<u128> {
        self.delays.borrow().iter().map(Duration::as_millis).collect()
    }
}

impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.borrow_mut().push(duration);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    Text(String),
    Markup(String),
}

/// Display surface that keeps every write in order.
#[derive(Default)]
pub struct RecordingTarget {
    writes: RefCell<Vec<(Slot, Write)>>,
}

impl RecordingTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes_to(&self, slot: Slot) -> Vec<Write> {
        self.writes
            .borrow()
            .iter()
            .filter(|(s, _)| *s == slot)
            .map(|(_, write)| write.clone())
            .collect()
    }

    pub fn last(&self, slot: Slot) -> Option<Write> {
        self.writes_to(slot).pop()
    }

    pub fn count(&self) -> usize {
        self.writes.borrow().len()
    }
}

impl RenderTarget for RecordingTarget {
    fn write_text(&self, slot: Slot, text: &str) {
        self.writes
            .borrow_mut()
            .push((slot, Write::Text(text.to_string())));
    }

    fn write_markup(&self, slot: Slot, markup: &str) {
        self.writes
            .borrow_mut()
            .push((slot, Write::Markup(markup.to_string())));
    }
}
