mod handlers;

use anyhow::{Context, Result};
use axum::Router;
use axum::routing::post;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::search::SearchSettings;

/// Shared, read-only server state. Each request builds its own collaborators from it.
pub struct AppState {
    pub settings: SearchSettings,
}

pub fn build_router(settings: SearchSettings) -> Router {
    let state = Arc::new(AppState { settings });

    Router::new()
        .route("/api/blood-banks", post(handlers::search_blood_banks))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start(addr: &str, settings: SearchSettings) -> Result<()> {
    let app = build_router(settings);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Cannot bind to {}", addr))?;

    info!("bloodfind server listening on http://{}", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
