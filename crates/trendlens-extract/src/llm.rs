//! Chat-completion client for the hosted extraction model.
//!
//! Speaks the OpenAI-compatible `/v1/chat/completions` shape: one system
//! message with the rules and one user message with the page. The reply text
//! is fence-stripped, parsed as JSON, and pushed through a validation
//! boundary before anything downstream sees it.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use trendlens_core::products::{priority_for_score, Product};

use crate::error::ExtractError;

/// Client for the hosted chat-completion endpoint.
///
/// Use [`ExtractionClient::new`] for production or
/// [`ExtractionClient::with_base_url`] to point at a mock server in tests.
pub struct ExtractionClient {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
    model: String,
}

impl ExtractionClient {
    /// Creates a client for the given endpoint, bearer credential, and model.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ExtractError::InvalidUrl`] if `base_url`
    /// does not parse.
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        model: &str,
        timeout_secs: u64,
    ) -> Result<Self, ExtractError> {
        Self::with_base_url(base_url, api_key, model, timeout_secs)
    }

    /// Creates a client with an explicit base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Same as [`ExtractionClient::new`].
    pub fn with_base_url(
        base_url: &str,
        api_key: Option<String>,
        model: &str,
        timeout_secs: u64,
    ) -> Result<Self, ExtractError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| ExtractError::InvalidUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            api_key,
            model: model.to_owned(),
        })
    }

    /// Whether a bearer credential is configured. Requests without one are
    /// rejected at the request level, not at startup.
    #[must_use]
    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// Sends one extraction exchange and returns the validated products.
    ///
    /// # Errors
    ///
    /// - [`ExtractError::UnexpectedStatus`] — non-2xx from the endpoint (no retry).
    /// - [`ExtractError::MissingCompletion`] — 2xx reply with no choices.
    /// - [`ExtractError::Deserialize`] — reply content is not the expected JSON.
    /// - [`ExtractError::Http`] — network or TLS failure.
    pub async fn extract_products(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        store: Option<&str>,
        store_url: &str,
    ) -> Result<Vec<Product>, ExtractError> {
        let endpoint = self
            .base_url
            .join("v1/chat/completions")
            .map_err(|e| ExtractError::InvalidUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;

        let request = ChatCompletionsRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_prompt.to_string(),
                },
            ],
        };

        let mut builder = self.client.post(endpoint.clone()).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ExtractError::UnexpectedStatus {
                status: status.as_u16(),
                url: endpoint.to_string(),
            });
        }

        let completion: ChatCompletionsResponse = response.json().await?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(ExtractError::MissingCompletion)?;

        let stripped = strip_code_fences(&content);
        let payload: ExtractionPayload =
            serde_json::from_str(stripped).map_err(|e| ExtractError::Deserialize {
                context: format!("extraction reply for {store_url}"),
                source: e,
            })?;

        Ok(validate_products(payload.products, store, store_url))
    }
}

/// Remove markdown code fences (```json … ```), which models emit despite
/// instructions not to.
#[must_use]
pub fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open
        .strip_suffix("```")
        .unwrap_or(without_open)
        .trim()
}

/// Validation boundary between the model's reply and the typed [`Product`].
///
/// Entries missing a title, price, or image are dropped. Absent colors and
/// sizes become empty lists. A missing trend score defaults to 5.0 and scores
/// are clamped into `[1, 10]`; priority is recomputed locally from the score,
/// never trusted from the model.
fn validate_products(raw: Vec<RawProduct>, store: Option<&str>, store_url: &str) -> Vec<Product> {
    raw.into_iter()
        .filter_map(|raw| {
            let title = non_empty(raw.title)?;
            let price = non_empty(raw.price)?;
            let image = non_empty(raw.image)?;

            let trend_score = raw.trend_score.unwrap_or(5.0).clamp(1.0, 10.0);

            Some(Product {
                title,
                price,
                colors: raw.colors,
                sizes: raw.sizes,
                image,
                trend_score,
                recommendation: raw.recommendation.unwrap_or_default(),
                priority: priority_for_score(trend_score),
                store: store.map(str::to_owned),
                store_url: Some(store_url.to_owned()),
            })
        })
        .collect()
}

fn non_empty(field: Option<String>) -> Option<String> {
    field.filter(|s| !s.trim().is_empty())
}

#[derive(Debug, Serialize)]
struct ChatCompletionsRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionsResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// Untrusted product shape as the model returns it: everything optional.
#[derive(Debug, Deserialize)]
struct RawProduct {
    title: Option<String>,
    price: Option<String>,
    #[serde(default)]
    colors: Vec<String>,
    #[serde(default)]
    sizes: Vec<String>,
    image: Option<String>,
    trend_score: Option<f64>,
    recommendation: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExtractionPayload {
    #[serde(default)]
    products: Vec<RawProduct>,
}
