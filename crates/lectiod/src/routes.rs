//! API routes for lectiod
//!
//! All endpoints are read-only `GET`s; axum answers other methods with 405
//! before any handler runs. Failures use the `{ "error": "..." }` body.

use crate::server::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use lectio_common::{ErrorBody, ErrorKind, ResolutionError, ResolvedVerse};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

type AppStateArc = Arc<AppState>;

// ============================================================================
// Errors
// ============================================================================

/// Status code plus `{ "error": ... }` body
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::DataIntegrity => StatusCode::INTERNAL_SERVER_ERROR,
        ErrorKind::Upstream => StatusCode::BAD_GATEWAY,
    }
}

impl From<ResolutionError> for ApiError {
    fn from(err: ResolutionError) -> Self {
        match err.kind() {
            ErrorKind::DataIntegrity => error!("  Corpus fault: {}", err),
            ErrorKind::Upstream => warn!("  Upstream failure: {}", err),
            _ => info!("  Rejected: {}", err),
        }
        Self {
            status: status_for(err.kind()),
            message: ErrorBody::from(&err).error,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

// ============================================================================
// Verse Routes
// ============================================================================

pub fn verse_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/api/verse", get(get_verse))
        .route("/api/chapter", get(get_chapter))
        .route("/api/search", get(search))
        .route("/api/daily", get(daily))
        .route("/api/random", get(random))
}

#[derive(Debug, Deserialize)]
pub struct VerseQuery {
    pub book: Option<String>,
    pub chapter: Option<String>,
    pub verse: Option<String>,
}

async fn get_verse(
    State(state): State<AppStateArc>,
    Query(query): Query<VerseQuery>,
) -> ApiResult<ResolvedVerse> {
    let verse = state
        .service
        .resolve(
            query.book.as_deref(),
            query.chapter.as_deref(),
            query.verse.as_deref(),
        )
        .await?;
    Ok(Json(verse))
}

#[derive(Debug, Deserialize)]
pub struct ChapterQuery {
    pub book: Option<String>,
    pub chapter: Option<String>,
}

async fn get_chapter(
    State(state): State<AppStateArc>,
    Query(query): Query<ChapterQuery>,
) -> ApiResult<Vec<ResolvedVerse>> {
    let verses = state
        .service
        .chapter(query.book.as_deref(), query.chapter.as_deref())
        .await?;
    Ok(Json(verses))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub limit: Option<String>,
}

async fn search(
    State(state): State<AppStateArc>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Vec<ResolvedVerse>> {
    let limit = match query.limit.as_deref().map(str::trim) {
        None | Some("") => state.search_limit,
        Some(raw) => raw
            .parse::<usize>()
            .map_err(|_| ApiError::bad_request(format!("Invalid limit: '{}' is not a number.", raw)))?
            .min(state.search_limit),
    };

    let hits = state
        .service
        .search(query.q.as_deref().unwrap_or_default(), limit)
        .await?;
    Ok(Json(hits))
}

#[derive(Debug, Deserialize)]
pub struct DailyQuery {
    pub date: Option<String>,
}

async fn daily(
    State(state): State<AppStateArc>,
    Query(query): Query<DailyQuery>,
) -> ApiResult<ResolvedVerse> {
    let date = match query.date.as_deref().map(str::trim) {
        None | Some("") => chrono::Local::now().date_naive(),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
            ApiError::bad_request(format!("Invalid date: '{}'. Expected YYYY-MM-DD.", raw))
        })?,
    };
    Ok(Json(state.service.daily(date).await?))
}

async fn random(State(state): State<AppStateArc>) -> ApiResult<ResolvedVerse> {
    Ok(Json(state.service.random().await?))
}

// ============================================================================
// Health Routes
// ============================================================================

pub fn health_routes() -> Router<AppStateArc> {
    Router::new().route("/health", get(health))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub mode: String,
    pub backend: String,
    pub uptime_secs: u64,
}

async fn health(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        mode: state.service.mode().as_str().to_string(),
        backend: state.service.describe(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}
