//! HTTP surface tests: status codes and bodies for each outcome.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use lectio_common::corpus::{CorpusIndex, LazyCorpus};
use lectio_common::remote::FakeSource;
use lectio_common::{ErrorBody, LocalResolver, Reference, ResolvedVerse, VerseService};
use lectiod::server::{router, AppState};
use serde::de::DeserializeOwned;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const CORPUS: &str = r#"[
    {"abbrev": "gn", "name": "Genesis", "chapters": [
        ["In the beginning God created the heaven and the earth.", "And the earth was without form, and void."],
        ["Thus the heavens and the earth were finished."]
    ]},
    {"abbrev": "jo", "name": "John", "chapters": [["In the beginning was the Word."]]}
]"#;

fn local_app() -> Router {
    let index = CorpusIndex::from_json_str(CORPUS).unwrap();
    let service = VerseService::local(LocalResolver::new(Arc::new(LazyCorpus::from_index(index))));
    router(AppState::new(service, 2))
}

async fn send(app: Router, method: Method, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

async fn get<T: DeserializeOwned>(app: Router, uri: &str) -> (StatusCode, T) {
    let (status, body) = send(app, Method::GET, uri).await;
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_verse_success_shape() {
    let (status, body): (_, serde_json::Value) =
        get(local_app(), "/api/verse?book=GN&chapter=1&verse=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        serde_json::json!({
            "book": "Genesis",
            "chapter": 1,
            "verse": 2,
            "text": "And the earth was without form, and void.",
            "reference": "Genesis 1:2"
        })
    );
}

#[tokio::test]
async fn test_missing_fields_are_400() {
    for uri in [
        "/api/verse",
        "/api/verse?chapter=1&verse=1",
        "/api/verse?book=gn&verse=1",
        "/api/verse?book=gn&chapter=1",
        "/api/verse?book=&chapter=1&verse=1",
    ] {
        let (status, body): (_, ErrorBody) = get(local_app(), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert!(body.error.starts_with("Missing required field"), "{}", uri);
    }
}

#[tokio::test]
async fn test_non_numeric_is_400() {
    let (status, body): (_, ErrorBody) =
        get(local_app(), "/api/verse?book=gn&chapter=one&verse=1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.error.contains("chapter"));
    assert!(body.error.contains("one"));
}

#[tokio::test]
async fn test_range_errors_are_404_with_bound() {
    let (status, body): (_, ErrorBody) =
        get(local_app(), "/api/verse?book=gn&chapter=999&verse=1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body.error, "Invalid chapter number: 999. Genesis has 2 chapters.");

    let (status, body): (_, ErrorBody) =
        get(local_app(), "/api/verse?book=gn&chapter=2&verse=7").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.error.contains("has 1 verses"));

    let (status, body): (_, ErrorBody) =
        get(local_app(), "/api/verse?book=xx&chapter=1&verse=1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body.error, "Book 'xx' not found.");
}

#[tokio::test]
async fn test_non_get_is_rejected() {
    let (status, _) = send(local_app(), Method::POST, "/api/verse?book=gn&chapter=1&verse=1").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

    let (status, _) = send(local_app(), Method::DELETE, "/api/daily").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_chapter_and_search() {
    let (status, verses): (_, Vec<ResolvedVerse>) =
        get(local_app(), "/api/chapter?book=genesis&chapter=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(verses.len(), 2);

    // Server ceiling is 2 even when more are asked for
    let (status, hits): (_, Vec<ResolvedVerse>) =
        get(local_app(), "/api/search?q=beginning&limit=10").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[1].reference, "John 1:1");

    let (status, _): (_, ErrorBody) = get(local_app(), "/api/search?q=earth&limit=x").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _): (_, ErrorBody) = get(local_app(), "/api/search").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_daily_is_stable_for_a_date() {
    let fake = FakeSource::new().with_verse(
        Reference::new("john", 3, 16),
        ResolvedVerse::new("John", 3, 16, "For God so loved the world"),
    );
    let app = router(AppState::new(VerseService::remote(Arc::new(fake)), 10));

    // 2024-01-08 and 2024-01-16 are days 8 and 16 of the year
    let (status, first): (_, ResolvedVerse) = get(app.clone(), "/api/daily?date=2024-01-08").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first.reference, "John 3:16");

    let (_, again): (_, ResolvedVerse) = get(app.clone(), "/api/daily?date=2024-01-08").await;
    let (_, wrapped): (_, ResolvedVerse) = get(app.clone(), "/api/daily?date=2024-01-16").await;
    assert_eq!(first, again);
    assert_eq!(first, wrapped);

    let (status, body): (_, ErrorBody) = get(app, "/api/daily?date=yesterday").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.error.contains("yesterday"));
}

#[tokio::test]
async fn test_upstream_failure_is_502() {
    let app = router(AppState::new(
        VerseService::remote(Arc::new(FakeSource::failing("bible-api returned HTTP 503"))),
        10,
    ));
    let (status, body): (_, ErrorBody) = get(app, "/api/verse?book=john&chapter=3&verse=16").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body.error.contains("503"));
}

#[tokio::test]
async fn test_corrupt_corpus_is_500_without_detail() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("corpus.json");
    fs::write(&path, "{ not json").unwrap();

    let service = VerseService::local(LocalResolver::new(Arc::new(LazyCorpus::new(&path))));
    let app = router(AppState::new(service, 10));

    let (status, body): (_, ErrorBody) =
        get(app, "/api/verse?book=gn&chapter=1&verse=1").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body.error,
        "The scripture corpus is unavailable. Please try again later."
    );
}

#[tokio::test]
async fn test_health() {
    let (status, body): (_, lectiod::routes::HealthResponse) = get(local_app(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.status, "ok");
    assert_eq!(body.mode, "local");
}
