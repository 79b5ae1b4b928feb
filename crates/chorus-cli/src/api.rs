//! Chorus proxy client.
//!
//! Implements the domain's `GenerationClient` port over HTTP: one `POST`
//! per persona call, no retry, a bounded per-request timeout.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use chorus::{
    AttachedImage, DomainError, GenerationClient, SubmissionRequest, EMPTY_RESPONSE_PLACEHOLDER,
};

/// API client for the Chorus proxy endpoint.
pub struct ChorusClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

// ============================================
// Wire Types
// ============================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    prompt: &'a str,
    ai_name: &'a str,
    image_data: Option<&'a AttachedImage>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    text: Option<String>,
}

impl ChorusClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }
}

#[async_trait]
impl GenerationClient for ChorusClient {
    async fn generate(&self, request: &SubmissionRequest) -> Result<String, DomainError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = GenerateRequest {
            prompt: &request.prompt,
            ai_name: &request.persona_name,
            image_data: request.image.as_ref(),
        };

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    DomainError::Timeout(self.timeout)
                } else {
                    DomainError::Transport(err.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(proxy_error(status, &body));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|err| DomainError::Proxy(format!("Failed to parse proxy response: {err}")))?;

        Ok(non_empty_text(parsed.text))
    }
}

// ============================================
// Helper Functions
// ============================================

/// Extracts the `error` field from a failure body. A string is surfaced
/// verbatim; any other JSON value is re-serialized so the user still sees
/// something actionable.
fn proxy_error(status: StatusCode, body: &str) -> DomainError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| match json.get("error") {
            Some(serde_json::Value::String(text)) => Some(text.clone()),
            Some(serde_json::Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        })
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| format!("Server Error ({status})"));

    DomainError::Proxy(message)
}

fn non_empty_text(text: Option<String>) -> String {
    match text {
        Some(text) if !text.trim().is_empty() => text,
        _ => EMPTY_RESPONSE_PLACEHOLDER.to_string(),
    }
}
