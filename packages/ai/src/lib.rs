#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Completion-API client for crime analysis prompts.
//!
//! Thin pass-through to the `OpenAI` chat completions endpoint: one user
//! message in, the provider's JSON body out, verbatim. The provider owns
//! the response schema, so nothing here is typed beyond the request —
//! error payloads travel back to the caller exactly like success payloads.

use serde::Serialize;
use thiserror::Error;

/// Model requested when `OPENAI_MODEL` is unset.
pub const DEFAULT_MODEL: &str = "gpt-4";

const COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
const TEMPERATURE: f64 = 0.5;

/// Errors that can occur while calling the completion API.
///
/// Provider-side failures (auth, quota, bad model) are not errors here:
/// the provider reports them as JSON and that JSON is forwarded as-is.
#[derive(Debug, Error)]
pub enum AiError {
    /// The HTTP request could not be sent or the body could not be read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider returned a body that is not JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// `OpenAI` chat completions client.
pub struct CompletionClient {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<RequestMessage<'a>>,
    temperature: f64,
}

#[derive(Serialize)]
struct RequestMessage<'a> {
    role: &'a str,
    content: &'a str,
}

impl CompletionClient {
    /// Creates a client with an explicit key and model.
    #[must_use]
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            client: reqwest::Client::new(),
        }
    }

    /// Builds a client from `OPENAI_API_KEY` and `OPENAI_MODEL`.
    ///
    /// An absent key is not checked here; it is sent as an empty bearer
    /// token and surfaces as a provider error payload on first use.
    #[must_use]
    pub fn from_env() -> Self {
        let api_key = std::env::var("OPENAI_API_KEY").unwrap_or_default();
        let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_owned());
        Self::new(api_key, model)
    }

    /// Sends `text` as a single user message and returns the provider's
    /// JSON body verbatim, whether or not the HTTP status was a success.
    ///
    /// # Errors
    ///
    /// Returns [`AiError`] if the request cannot be sent or the response
    /// body is not JSON.
    pub async fn analyze(&self, text: &str) -> Result<serde_json::Value, AiError> {
        let request = CompletionRequest {
            model: &self.model,
            messages: vec![RequestMessage {
                role: "user",
                content: text,
            }],
            temperature: TEMPERATURE,
        };

        let resp = self
            .client
            .post(COMPLETIONS_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            log::warn!("Completion API returned {status}");
        }

        Ok(serde_json::from_str(&body)?)
    }
}
