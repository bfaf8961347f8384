//! HTTP surface
//!
//! JSON endpoints for the frontend plus the map and chat page.

mod error;
mod handlers;
mod pages;

pub use error::ApiError;
pub use handlers::{ChatRequest, ChatResponse, CreateTripResponse, StatusResponse};
pub use pages::PageRenderer;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use eyre::{Context, Result};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::chat::ChatService;
use crate::pipeline::Pipeline;
use crate::registry::TaskStore;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub registry: Arc<dyn TaskStore>,
    pub chat: Arc<ChatService>,
    pub pages: Arc<PageRenderer>,
    pub maps_api_key: String,
}

impl AppState {
    pub fn new(
        pipeline: Arc<Pipeline>,
        registry: Arc<dyn TaskStore>,
        chat: Arc<ChatService>,
        maps_api_key: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            pipeline,
            registry,
            chat,
            pages: Arc::new(PageRenderer::new()?),
            maps_api_key: maps_api_key.into(),
        })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/api/create-trip", post(handlers::create_trip))
        .route("/status/{id}", get(handlers::status))
        .route("/chat-map/{id}", get(handlers::chat_map))
        .route("/api/chat", post(handlers::chat))
        .route("/api/locations/{id}", get(handlers::locations))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until the process is stopped
pub async fn serve(bind: &str, state: AppState) -> Result<()> {
    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    info!(%bind, "serve: listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("serve: shutdown signal received");
        })
        .await
        .context("HTTP server failed")
}
