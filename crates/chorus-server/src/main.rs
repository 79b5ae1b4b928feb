//! Chorus proxy server.
//!
//! Thin endpoint between the front end and the upstream generative model.
//! Holds the `GEMINI_API_KEY` so the credential never reaches a client.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{routing::get, Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

mod routes;
mod services;

use services::gemini::GeminiClient;

/// Application state shared across all routes. `gemini` is `None` when no
/// credential is configured; generation requests then fail with a
/// configuration error while `/health` stays up.
#[derive(Clone)]
pub struct AppState {
    pub gemini: Option<Arc<GeminiClient>>,
}

#[derive(Serialize)]
struct HealthCheck {
    status: String,
    message: String,
    version: String,
}

async fn health_check() -> Json<HealthCheck> {
    Json(HealthCheck {
        status: "ok".to_string(),
        message: "Chorus proxy is running - many personas, one model".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Chorus proxy initializing...");

    let gemini = match std::env::var("GEMINI_API_KEY") {
        Ok(key) if !key.trim().is_empty() => {
            tracing::info!("Gemini upstream configured");
            Some(Arc::new(GeminiClient::new(key)))
        }
        _ => {
            tracing::warn!("No GEMINI_API_KEY set - generation requests will fail");
            None
        }
    };

    let state = AppState { gemini };

    // The browser front end is served from another origin; mirror the
    // original proxy's permissive CORS headers.
    let router = Router::new()
        .route("/health", get(health_check))
        .merge(routes::generate::router())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr: SocketAddr = std::env::var("CHORUS_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8000".to_string())
        .parse()
        .context("Invalid CHORUS_ADDR")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!("Chorus proxy ready on {addr}");
    axum::serve(listener, router).await?;

    Ok(())
}
