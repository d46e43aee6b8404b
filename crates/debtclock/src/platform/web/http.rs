//! HTTP transport over the browser's `fetch`.

use debtclock_core::{FetchError, JsonTransport};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, RequestMode, Response};

#[derive(Debug, Clone, Copy, Default)]
pub struct FetchTransport;

fn js_transport(err: JsValue) -> FetchError {
    FetchError::Transport(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

impl JsonTransport for FetchTransport {
    async fn get_json(&self, url: &str) -> Result<serde_json::Value, FetchError> {
        let window =
            web_sys::window().ok_or_else(|| FetchError::Transport("no window".to_string()))?;

        let init = RequestInit::new();
        init.set_method("GET");
        init.set_mode(RequestMode::Cors);
        let headers = Headers::new().map_err(js_transport)?;
        headers
            .set("Accept", "application/json")
            .map_err(js_transport)?;
        init.set_headers(&headers);

        let request = Request::new_with_str_and_init(url, &init).map_err(js_transport)?;
        let response: Response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(js_transport)?
            .dyn_into()
            .map_err(js_transport)?;

        if !response.ok() {
            return Err(FetchError::Status {
                code: response.status(),
                reason: response.status_text(),
            });
        }

        let body = JsFuture::from(response.text().map_err(js_transport)?)
            .await
            .map_err(js_transport)?
            .as_string()
            .ok_or_else(|| FetchError::shape("response body is not text"))?;
        Ok(serde_json::from_str(&body)?)
    }
}
