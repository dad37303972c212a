//! HTTP server for lectiod

use crate::routes;
use anyhow::{Context, Result};
use axum::Router;
use lectio_common::VerseService;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Application state shared across handlers
pub struct AppState {
    pub service: VerseService,
    /// Ceiling for `/api/search?limit=`
    pub search_limit: usize,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(service: VerseService, search_limit: usize) -> Self {
        Self {
            service,
            search_limit,
            start_time: Instant::now(),
        }
    }
}

/// All routes, with request tracing
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(routes::verse_routes())
        .merge(routes::health_routes())
        .with_state(Arc::new(state))
        .layer(TraceLayer::new_for_http())
}

/// Run the HTTP server
pub async fn run(state: AppState, addr: &str) -> Result<()> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("  Listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
