//! Remote verse sources
//!
//! Each external service sits behind the `VerseSource` trait so the rest of
//! the crate never sees its URL scheme or response shape:
//! - `BibleApiSource` (bible-api.com style, `{ "verses": [...] }`)
//! - `LabsSource` (labs.bible.org style, bare JSON array)
//! - `FakeSource` (canned responses for tests)
//!
//! Every operation makes exactly one request. Transport failures, non-2xx
//! statuses and unusable bodies all come back as `ResolutionError::Upstream`;
//! nothing is retried or cached here.

pub mod bible_api;
pub mod labs;

pub use bible_api::BibleApiSource;
pub use labs::LabsSource;

use crate::config::{ConfigError, RemoteConfig, BACKEND_BIBLE_API, BACKEND_LABS};
use crate::error::ResolutionError;
use crate::reference::{Reference, ResolvedVerse};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, warn};

// ============================================================================
// Verse Source Trait
// ============================================================================

/// Capability shared by every verse-retrieval service
#[async_trait]
pub trait VerseSource: Send + Sync {
    /// One verse; only the first record of the response is used
    async fn fetch_verse(&self, reference: &Reference) -> Result<ResolvedVerse, ResolutionError>;

    /// Every verse of a chapter, in service order
    async fn fetch_chapter(
        &self,
        book: &str,
        chapter: u32,
    ) -> Result<Vec<ResolvedVerse>, ResolutionError>;

    /// Free-text search; zero hits is not an error
    async fn search_verses(&self, query: &str) -> Result<Vec<ResolvedVerse>, ResolutionError>;

    /// Backend identifier for logging
    fn name(&self) -> &'static str;
}

/// Build the source named by `[remote] backend`
pub fn build_source(config: &RemoteConfig) -> Result<Arc<dyn VerseSource>, ConfigError> {
    let base_url = config.effective_base_url()?;
    let http = http_client(config.effective_timeout_secs())?;

    let source: Arc<dyn VerseSource> = match config.backend.as_str() {
        BACKEND_BIBLE_API => Arc::new(BibleApiSource::new(
            http,
            base_url,
            config.search_url.clone(),
            config.translation.clone(),
        )),
        BACKEND_LABS => Arc::new(LabsSource::new(http, base_url, config.search_url.clone())),
        other => return Err(ConfigError::UnknownBackend(other.to_string())),
    };

    debug!("Remote verse source: {} ({})", source.name(), config.backend);
    Ok(source)
}

pub(crate) fn http_client(timeout_secs: u64) -> Result<reqwest::Client, ConfigError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(format!("lectio/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ConfigError::Http(e.to_string()))
}

// ============================================================================
// Shared transport helpers
// ============================================================================

/// Verse record after transport decoding, before it becomes a `ResolvedVerse`
#[derive(Debug, Clone)]
pub(crate) struct RemoteVerseRecord {
    pub book: String,
    pub chapter: u32,
    pub verse: u32,
    pub text: String,
}

impl RemoteVerseRecord {
    pub fn into_resolved(self) -> ResolvedVerse {
        ResolvedVerse::new(self.book.trim(), self.chapter, self.verse, self.text.trim())
    }
}

/// Issue one GET and decode the JSON body, folding every failure into `Upstream`
pub(crate) async fn get_json<T: DeserializeOwned>(
    source: &'static str,
    request: reqwest::RequestBuilder,
) -> Result<T, ResolutionError> {
    let response = request.send().await.map_err(|e| {
        warn!("{}: request failed: {}", source, e);
        ResolutionError::upstream(format!("{} unreachable: {}", source, e))
    })?;

    let status = response.status();
    if !status.is_success() {
        warn!("{}: HTTP {}", source, status);
        return Err(ResolutionError::upstream(format!(
            "{} returned HTTP {}",
            source, status
        )));
    }

    response.json::<T>().await.map_err(|e| {
        warn!("{}: unusable response body: {}", source, e);
        ResolutionError::upstream(format!("{} returned an unusable response: {}", source, e))
    })
}

/// First record of a single-verse query
pub(crate) fn first_verse(
    source: &'static str,
    passage: &str,
    records: Vec<RemoteVerseRecord>,
) -> Result<ResolvedVerse, ResolutionError> {
    records
        .into_iter()
        .next()
        .map(RemoteVerseRecord::into_resolved)
        .ok_or_else(|| ResolutionError::upstream(format!("{} returned no verses for {}", source, passage)))
}

/// Non-empty record list of a chapter query
pub(crate) fn all_verses(
    source: &'static str,
    passage: &str,
    records: Vec<RemoteVerseRecord>,
) -> Result<Vec<ResolvedVerse>, ResolutionError> {
    if records.is_empty() {
        return Err(ResolutionError::upstream(format!(
            "{} returned no verses for {}",
            source, passage
        )));
    }
    Ok(records.into_iter().map(RemoteVerseRecord::into_resolved).collect())
}

/// `"{book} {chapter}[:{verse}]"` as sent to services
pub(crate) fn passage(book: &str, chapter: u32, verse: Option<u32>) -> String {
    match verse {
        Some(verse) => format!("{} {}:{}", book, chapter, verse),
        None => format!("{} {}", book, chapter),
    }
}

// ============================================================================
// Fake Verse Source (Testing)
// ============================================================================

/// Verse source answering from an in-memory table; unknown keys fail upstream
#[derive(Default)]
pub struct FakeSource {
    verses: HashMap<Reference, ResolvedVerse>,
    search_results: Vec<ResolvedVerse>,
    fail_with: Option<String>,
    calls: Mutex<usize>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_verse(mut self, reference: Reference, verse: ResolvedVerse) -> Self {
        self.verses.insert(reference, verse);
        self
    }

    pub fn with_search_results(mut self, results: Vec<ResolvedVerse>) -> Self {
        self.search_results = results;
        self
    }

    /// Every call fails upstream with this cause
    pub fn failing(cause: &str) -> Self {
        Self {
            fail_with: Some(cause.to_string()),
            ..Self::default()
        }
    }

    /// Number of calls made so far
    pub fn calls(&self) -> usize {
        self.calls.lock().map(|c| *c).unwrap_or(0)
    }

    fn record_call(&self) -> Result<(), ResolutionError> {
        if let Ok(mut calls) = self.calls.lock() {
            *calls += 1;
        }
        match &self.fail_with {
            Some(cause) => Err(ResolutionError::upstream(cause.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl VerseSource for FakeSource {
    async fn fetch_verse(&self, reference: &Reference) -> Result<ResolvedVerse, ResolutionError> {
        self.record_call()?;
        self.verses
            .get(reference)
            .cloned()
            .ok_or_else(|| ResolutionError::upstream(format!("fake has no verse {}", reference)))
    }

    async fn fetch_chapter(
        &self,
        book: &str,
        chapter: u32,
    ) -> Result<Vec<ResolvedVerse>, ResolutionError> {
        self.record_call()?;
        let mut verses: Vec<ResolvedVerse> = self
            .verses
            .iter()
            .filter(|(r, _)| r.book == book && r.chapter == chapter)
            .map(|(_, v)| v.clone())
            .collect();
        if verses.is_empty() {
            return Err(ResolutionError::upstream(format!(
                "fake has no chapter {} {}",
                book, chapter
            )));
        }
        verses.sort_by_key(|v| v.verse);
        Ok(verses)
    }

    async fn search_verses(&self, _query: &str) -> Result<Vec<ResolvedVerse>, ResolutionError> {
        self.record_call()?;
        Ok(self.search_results.clone())
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}
