//! bible-api.com style service
//!
//! Verse endpoint: `GET {base_url}/{book} {chapter}[:{verse}]?translation=..`
//! Response: `{"reference": "...", "verses": [{"book_name", "chapter", "verse", "text"}]}`

use super::{all_verses, first_verse, get_json, passage, RemoteVerseRecord, VerseSource};
use crate::error::ResolutionError;
use crate::reference::{Reference, ResolvedVerse};
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

const NAME: &str = "bible-api";

#[derive(Debug, Deserialize)]
struct PassageResponse {
    verses: Vec<VerseRecord>,
}

#[derive(Debug, Deserialize)]
struct VerseRecord {
    book_name: String,
    chapter: u32,
    verse: u32,
    text: String,
}

impl From<VerseRecord> for RemoteVerseRecord {
    fn from(record: VerseRecord) -> Self {
        RemoteVerseRecord {
            book: record.book_name,
            chapter: record.chapter,
            verse: record.verse,
            text: record.text,
        }
    }
}

pub struct BibleApiSource {
    http: reqwest::Client,
    base_url: String,
    search_url: Option<String>,
    translation: Option<String>,
}

impl BibleApiSource {
    pub fn new(
        http: reqwest::Client,
        base_url: String,
        search_url: Option<String>,
        translation: Option<String>,
    ) -> Self {
        Self {
            http,
            base_url,
            search_url,
            translation,
        }
    }

    /// Passage URL with the passage as a single percent-encoded path segment
    fn passage_url(&self, passage: &str) -> Result<Url, ResolutionError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ResolutionError::upstream(format!("{} base URL invalid: {}", NAME, e)))?;
        url.path_segments_mut()
            .map_err(|_| ResolutionError::upstream(format!("{} base URL cannot take a path", NAME)))?
            .pop_if_empty()
            .push(passage);
        Ok(url)
    }

    async fn fetch_passage(&self, passage: &str) -> Result<Vec<RemoteVerseRecord>, ResolutionError> {
        let url = self.passage_url(passage)?;
        debug!("{}: GET {}", NAME, url);

        let mut request = self.http.get(url);
        if let Some(translation) = &self.translation {
            request = request.query(&[("translation", translation.as_str())]);
        }

        let response: PassageResponse = get_json(NAME, request).await?;
        Ok(response.verses.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl VerseSource for BibleApiSource {
    async fn fetch_verse(&self, reference: &Reference) -> Result<ResolvedVerse, ResolutionError> {
        let passage = passage(&reference.book, reference.chapter, Some(reference.verse));
        let records = self.fetch_passage(&passage).await?;
        first_verse(NAME, &passage, records)
    }

    async fn fetch_chapter(
        &self,
        book: &str,
        chapter: u32,
    ) -> Result<Vec<ResolvedVerse>, ResolutionError> {
        let passage = passage(book, chapter, None);
        let records = self.fetch_passage(&passage).await?;
        all_verses(NAME, &passage, records)
    }

    async fn search_verses(&self, query: &str) -> Result<Vec<ResolvedVerse>, ResolutionError> {
        let search_url = self
            .search_url
            .as_deref()
            .ok_or_else(|| ResolutionError::upstream(format!("{} has no search endpoint configured", NAME)))?;
        debug!("{}: search '{}'", NAME, query);

        let mut request = self.http.get(search_url).query(&[("q", query)]);
        if let Some(translation) = &self.translation {
            request = request.query(&[("translation", translation.as_str())]);
        }

        let response: PassageResponse = get_json(NAME, request).await?;
        Ok(response
            .verses
            .into_iter()
            .map(|r| RemoteVerseRecord::from(r).into_resolved())
            .collect())
    }

    fn name(&self) -> &'static str {
        NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(base: &str) -> BibleApiSource {
        BibleApiSource::new(reqwest::Client::new(), base.to_string(), None, None)
    }

    #[test]
    fn test_passage_url_encodes_spaces() {
        let url = source("https://bible-api.com").passage_url("1 john 3:16").unwrap();
        assert_eq!(url.as_str(), "https://bible-api.com/1%20john%203:16");

        let url = source("http://localhost:9000/api/").passage_url("john 3").unwrap();
        assert_eq!(url.as_str(), "http://localhost:9000/api/john%203");
    }

    #[test]
    fn test_response_shape_decodes() {
        let body = r#"{"reference":"John 3:16","verses":[{"book_id":"JHN","book_name":"John","chapter":3,"verse":16,"text":"For God so loved the world\n"}],"text":"For God so loved the world\n","translation_id":"web"}"#;
        let response: PassageResponse = serde_json::from_str(body).unwrap();
        let v = RemoteVerseRecord::from(response.verses.into_iter().next().unwrap()).into_resolved();
        assert_eq!(v.reference, "John 3:16");
        assert_eq!(v.text, "For God so loved the world");
    }

    #[tokio::test]
    async fn test_search_without_endpoint_fails_upstream() {
        let err = source("https://bible-api.com").search_verses("love").await.unwrap_err();
        assert!(matches!(err, ResolutionError::Upstream { .. }));
    }
}
