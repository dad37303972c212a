//! labs.bible.org style service
//!
//! Verse endpoint: `GET {base_url}?passage={book} {chapter}[:{verse}]&type=json&formatting=plain`
//! Response: `[{"bookname": "John", "chapter": "3", "verse": "16", "text": "..."}]`
//!
//! Chapter and verse arrive as strings or numbers depending on deployment.

use super::{all_verses, first_verse, get_json, passage, RemoteVerseRecord, VerseSource};
use crate::error::ResolutionError;
use crate::reference::{Reference, ResolvedVerse};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

const NAME: &str = "labs";

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Number {
    Int(u32),
    Text(String),
}

impl Number {
    fn value(&self, field: &str) -> Result<u32, ResolutionError> {
        match self {
            Number::Int(n) => Ok(*n),
            Number::Text(s) => s.trim().parse().map_err(|_| {
                ResolutionError::upstream(format!("{} sent non-numeric {} '{}'", NAME, field, s))
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct VerseRecord {
    bookname: String,
    chapter: Number,
    verse: Number,
    text: String,
}

impl TryFrom<VerseRecord> for RemoteVerseRecord {
    type Error = ResolutionError;

    fn try_from(record: VerseRecord) -> Result<Self, Self::Error> {
        Ok(RemoteVerseRecord {
            chapter: record.chapter.value("chapter")?,
            verse: record.verse.value("verse")?,
            book: record.bookname,
            text: record.text,
        })
    }
}

pub struct LabsSource {
    http: reqwest::Client,
    base_url: String,
    search_url: Option<String>,
}

impl LabsSource {
    pub fn new(http: reqwest::Client, base_url: String, search_url: Option<String>) -> Self {
        Self {
            http,
            base_url,
            search_url,
        }
    }

    async fn get_records(
        &self,
        url: &str,
        key: &str,
        value: &str,
    ) -> Result<Vec<RemoteVerseRecord>, ResolutionError> {
        debug!("{}: GET {} {}={}", NAME, url, key, value);
        let request = self
            .http
            .get(url)
            .query(&[(key, value), ("type", "json"), ("formatting", "plain")]);

        let records: Vec<VerseRecord> = get_json(NAME, request).await?;
        records.into_iter().map(RemoteVerseRecord::try_from).collect()
    }
}

#[async_trait]
impl VerseSource for LabsSource {
    async fn fetch_verse(&self, reference: &Reference) -> Result<ResolvedVerse, ResolutionError> {
        let passage = passage(&reference.book, reference.chapter, Some(reference.verse));
        let records = self.get_records(&self.base_url, "passage", &passage).await?;
        first_verse(NAME, &passage, records)
    }

    async fn fetch_chapter(
        &self,
        book: &str,
        chapter: u32,
    ) -> Result<Vec<ResolvedVerse>, ResolutionError> {
        let passage = passage(book, chapter, None);
        let records = self.get_records(&self.base_url, "passage", &passage).await?;
        all_verses(NAME, &passage, records)
    }

    async fn search_verses(&self, query: &str) -> Result<Vec<ResolvedVerse>, ResolutionError> {
        let search_url = self
            .search_url
            .as_deref()
            .ok_or_else(|| ResolutionError::upstream(format!("{} has no search endpoint configured", NAME)))?;
        let records = self.get_records(search_url, "search", query).await?;
        Ok(records.into_iter().map(RemoteVerseRecord::into_resolved).collect())
    }

    fn name(&self) -> &'static str {
        NAME
    }
}
