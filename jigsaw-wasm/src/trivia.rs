use jigsaw_core::trivia::{
    DEFAULT_FACT_MODEL, EMPTY_FACT, FACT_API_BASE, FALLBACK_FACT, fact_endpoint,
    fact_request_body, parse_fact_response,
};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, Response};

use crate::utils::log;

async fn request_fact(api_key: &str, model: &str, title: &str) -> Result<Option<String>, JsValue> {
    let window = web_sys::window().ok_or("no window")?;

    let opts = RequestInit::new();
    opts.set_method("POST");
    opts.set_body(&JsValue::from_str(&fact_request_body(title).to_string()));

    let request = Request::new_with_str_and_init(&fact_endpoint(FACT_API_BASE, model), &opts)?;
    request.headers().set("Content-Type", "application/json")?;
    request.headers().set("x-goog-api-key", api_key)?;

    let resp: Response = JsFuture::from(window.fetch_with_request(&request))
        .await?
        .dyn_into()?;
    if !resp.ok() {
        return Err(JsValue::from_str(&format!("HTTP {}", resp.status())));
    }
    let text = JsFuture::from(resp.text()?)
        .await?
        .as_string()
        .unwrap_or_default();
    let body: serde_json::Value =
        serde_json::from_str(&text).map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(parse_fact_response(&body))
}

/// One sentence about `title`; falls back to a canned fact on any failure.
pub async fn fetch_fact(api_key: Option<String>, model: Option<String>, title: String) -> String {
    let Some(key) = api_key.filter(|k| !k.is_empty()) else {
        log("fact lookup skipped: no API key");
        return FALLBACK_FACT.to_string();
    };
    let model = model.unwrap_or_else(|| DEFAULT_FACT_MODEL.to_string());
    match request_fact(&key, &model, &title).await {
        Ok(Some(fact)) => fact,
        Ok(None) => EMPTY_FACT.to_string(),
        Err(err) => {
            log(&format!("fact lookup failed: {:?}", err));
            FALLBACK_FACT.to_string()
        }
    }
}
