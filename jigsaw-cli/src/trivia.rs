use std::time::Duration;

use jigsaw_core::trivia::{
    DEFAULT_FACT_MODEL, EMPTY_FACT, FACT_API_BASE, FALLBACK_FACT, fact_endpoint,
    fact_request_body, parse_fact_response,
};
use thiserror::Error;
use tracing::{debug, instrument, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum TriviaError {
    #[error("no API key configured")]
    MissingKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("reply carried no text")]
    Empty,
}

/// Client for the artwork-fact service.
pub struct FactClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl FactClient {
    pub fn new(api_key: Option<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http,
            api_key,
            base_url: FACT_API_BASE.to_string(),
            model: DEFAULT_FACT_MODEL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// One sentence about `title`. Never fails: any problem yields a canned fact.
    #[instrument(skip(self), fields(model = %self.model))]
    pub async fn fetch_fact(&self, title: &str) -> String {
        match self.try_fetch(title).await {
            Ok(fact) => fact,
            Err(TriviaError::Empty) => EMPTY_FACT.to_string(),
            Err(err) => {
                warn!(%err, "fact lookup failed");
                FALLBACK_FACT.to_string()
            }
        }
    }

    async fn try_fetch(&self, title: &str) -> Result<String, TriviaError> {
        let key = self
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(TriviaError::MissingKey)?;

        debug!("requesting artwork fact");

        let response = self
            .http
            .post(fact_endpoint(&self.base_url, &self.model))
            .header("x-goog-api-key", key)
            .json(&fact_request_body(title))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TriviaError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: serde_json::Value = response.json().await?;
        parse_fact_response(&body).ok_or(TriviaError::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_key_falls_back() {
        let client = FactClient::new(None);
        assert_eq!(client.fetch_fact("Mona Lisa").await, FALLBACK_FACT);
        let blank = FactClient::new(Some(String::new()));
        assert_eq!(blank.fetch_fact("Mona Lisa").await, FALLBACK_FACT);
    }

    #[tokio::test]
    async fn unreachable_service_falls_back() {
        let client = FactClient::new(Some("key".into())).with_base_url("http://127.0.0.1:9");
        assert_eq!(client.fetch_fact("Mona Lisa").await, FALLBACK_FACT);
    }
}
