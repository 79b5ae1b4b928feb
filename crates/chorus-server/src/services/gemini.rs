//! Upstream Gemini client.
//!
//! The only place the server-held API key is used. Builds the
//! `generateContent` payload (persona preamble, prompt, optional inline
//! image) and extracts the first candidate's concatenated text parts.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use chorus::{AttachedImage, EMPTY_RESPONSE_PLACEHOLDER};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(60);

/// Client for the Gemini `generateContent` REST API.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
}

#[derive(Debug, Error)]
pub enum GeminiError {
    /// The upstream could not be reached.
    #[error("Gemini API request failed: {0}")]
    Request(String),

    /// The upstream answered 2xx but the body was not understood.
    #[error("Failed to parse Gemini response: {0}")]
    Parse(String),

    /// The upstream answered with a failure status.
    #[error("{message}")]
    Api { status: u16, message: String },
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// One generation call for one persona. Every persona hits the same
    /// model; only the preamble name differs.
    pub async fn generate(
        &self,
        prompt: &str,
        persona_name: &str,
        image: Option<&AttachedImage>,
    ) -> Result<String, GeminiError> {
        let url = format!(
            "{}/{model}:generateContent?key={api_key}",
            BASE_URL,
            model = self.model,
            api_key = self.api_key
        );

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: build_parts(prompt, persona_name, image),
            }],
        };

        let response = self
            .client
            .post(&url)
            .timeout(UPSTREAM_TIMEOUT)
            .json(&request)
            .send()
            .await
            .map_err(|err| GeminiError::Request(err.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(status, body));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|err| GeminiError::Parse(err.to_string()))?;

        Ok(extract_text(parsed).unwrap_or_else(|| EMPTY_RESPONSE_PLACEHOLDER.to_string()))
    }
}

// ============================================
// Request/Response Types
// ============================================

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

// ============================================
// Helper Functions
// ============================================

fn build_parts(prompt: &str, persona_name: &str, image: Option<&AttachedImage>) -> Vec<Part> {
    let name = if persona_name.trim().is_empty() {
        "an AI"
    } else {
        persona_name
    };

    let mut parts = vec![
        Part::Text {
            text: format!("You are {name}. Answer clearly."),
        },
        Part::Text {
            text: prompt.to_string(),
        },
    ];

    if let Some(image) = image {
        parts.push(Part::InlineData {
            inline_data: InlineData {
                mime_type: image.mime_type.clone(),
                data: image.base64.clone(),
            },
        });
    }

    parts
}

/// First candidate's concatenated text parts.
fn extract_text(response: GenerateContentResponse) -> Option<String> {
    let text: String = response
        .candidates?
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .filter_map(|part| part.text)
        .collect();

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn map_http_error(status: StatusCode, body: String) -> GeminiError {
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|json| {
            json.get("error")
                .and_then(|err| err.get("message"))
                .and_then(|msg| msg.as_str())
                .map(|msg| msg.to_string())
        })
        .unwrap_or_else(|| body.clone());

    GeminiError::Api {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_parts_prepends_persona_preamble() {
        let parts = build_parts("Hello", "Gemini Pro", None);
        assert_eq!(parts.len(), 2);
        match &parts[0] {
            Part::Text { text } => assert_eq!(text, "You are Gemini Pro. Answer clearly."),
            _ => panic!("expected text part"),
        }
    }

    #[test]
    fn test_build_parts_falls_back_for_blank_name() {
        let parts = build_parts("Hello", "  ", None);
        match &parts[0] {
            Part::Text { text } => assert_eq!(text, "You are an AI. Answer clearly."),
            _ => panic!("expected text part"),
        }
    }

    #[test]
    fn test_request_body_carries_inline_image() {
        let image = AttachedImage::new("image/png", "aGVsbG8=");
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: build_parts("What is this?", "ChatGPT", Some(&image)),
            }],
        };

        let json = serde_json::to_value(&request).unwrap();
        let parts = &json["contents"][0]["parts"];
        assert_eq!(parts[2]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[2]["inlineData"]["data"], "aGVsbG8=");
    }

    #[test]
    fn test_extract_text_concatenates_parts_of_first_candidate() {
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [
                { "content": { "parts": [ { "text": "Hi " }, { "text": "there" } ] } },
                { "content": { "parts": [ { "text": "ignored" } ] } }
            ]
        }))
        .unwrap();

        assert_eq!(extract_text(response).as_deref(), Some("Hi there"));
    }

    #[test]
    fn test_extract_text_handles_empty_candidates() {
        let response: GenerateContentResponse =
            serde_json::from_value(serde_json::json!({ "candidates": [] })).unwrap();
        assert!(extract_text(response).is_none());
    }

    #[test]
    fn test_map_http_error_extracts_upstream_message() {
        let body = r#"{"error":{"code":429,"message":"rate limited","status":"RESOURCE_EXHAUSTED"}}"#;
        let err = map_http_error(StatusCode::TOO_MANY_REQUESTS, body.to_string());
        match err {
            GeminiError::Api { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "rate limited");
            }
            _ => panic!("expected api error"),
        }
    }

    #[test]
    fn test_map_http_error_falls_back_to_raw_body() {
        let err = map_http_error(StatusCode::BAD_GATEWAY, "upstream exploded".to_string());
        match err {
            GeminiError::Api { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "upstream exploded");
            }
            _ => panic!("expected api error"),
        }
    }
}
