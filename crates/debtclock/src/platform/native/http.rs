//! HTTP transport backed by reqwest.

use std::time::Duration;

use debtclock_core::{FetchError, JsonTransport};
use reqwest::Client;
use reqwest::header::ACCEPT;

const CONNECT_TIMEOUT_SECS: u64 = 8;
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .user_agent(concat!("debtclock/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http })
    }
}

fn transport_error(err: reqwest::Error) -> FetchError {
    FetchError::Transport(err.to_string())
}

impl JsonTransport for ReqwestTransport {
    async fn get_json(&self, url: &str) -> Result<serde_json::Value, FetchError> {
        let response = self
            .http
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                code: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("unknown").to_string(),
            });
        }

        let body = response.text().await.map_err(transport_error)?;
        Ok(serde_json::from_str(&body)?)
    }
}
