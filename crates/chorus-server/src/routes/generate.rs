//! Generate Route - the proxy endpoint the front end talks to.
//!
//! Accepts the browser-side wire shape `{ prompt, aiName, imageData }`,
//! attaches the server-held credential, and normalizes success and error
//! bodies. The session gate on the client is cosmetic; this route does
//! not authenticate callers.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use chorus::AttachedImage;

use crate::services::gemini::GeminiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub prompt: String,
    #[serde(default)]
    pub ai_name: String,
    #[serde(default)]
    pub image_data: Option<AttachedImage>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ErrorReply = (StatusCode, Json<ErrorResponse>);

fn error_reply(status: StatusCode, message: impl Into<String>) -> ErrorReply {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// Forwards one persona prompt to the upstream model.
pub async fn generate(
    State(state): State<AppState>,
    Json(payload): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, ErrorReply> {
    let Some(gemini) = &state.gemini else {
        return Err(error_reply(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Server API key is missing.",
        ));
    };

    if payload.prompt.trim().is_empty() {
        return Err(error_reply(
            StatusCode::BAD_REQUEST,
            "Prompt must not be empty.",
        ));
    }

    tracing::info!(
        persona = %payload.ai_name,
        has_image = payload.image_data.is_some(),
        "forwarding generation request"
    );

    let text = gemini
        .generate(&payload.prompt, &payload.ai_name, payload.image_data.as_ref())
        .await
        .map_err(|err| {
            tracing::warn!(error = %err, "upstream call failed");
            match err {
                // Forward the upstream status so rate limits and quota
                // errors arrive unmangled.
                GeminiError::Api { status, message } => error_reply(
                    StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                    message,
                ),
                other => error_reply(StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
            }
        })?;

    Ok(Json(GenerateResponse { text }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/generate", post(generate))
}
