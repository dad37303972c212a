//! Local Resolver - answers references from the on-disk corpus

use crate::corpus::{Book, CorpusIndex, LazyCorpus};
use crate::error::{Field, ResolutionError, ValidationError};
use crate::reference::{normalize, normalize_chapter, Reference, ResolvedVerse};
use std::sync::Arc;
use tracing::debug;

/// Resolves references against a lazily loaded corpus
#[derive(Clone)]
pub struct LocalResolver {
    corpus: Arc<LazyCorpus>,
}

impl LocalResolver {
    pub fn new(corpus: Arc<LazyCorpus>) -> Self {
        Self { corpus }
    }

    pub fn corpus(&self) -> &Arc<LazyCorpus> {
        &self.corpus
    }

    /// Resolve raw caller input
    pub fn resolve(
        &self,
        raw_book: Option<&str>,
        raw_chapter: Option<&str>,
        raw_verse: Option<&str>,
    ) -> Result<ResolvedVerse, ResolutionError> {
        let reference = normalize(raw_book, raw_chapter, raw_verse)?;
        let requested = raw_book.map(str::trim).unwrap_or_default();
        self.resolve_with_label(&reference, requested)
    }

    /// Resolve an already normalized reference
    pub fn resolve_reference(&self, reference: &Reference) -> Result<ResolvedVerse, ResolutionError> {
        self.resolve_with_label(reference, &reference.book)
    }

    fn resolve_with_label(
        &self,
        reference: &Reference,
        requested: &str,
    ) -> Result<ResolvedVerse, ResolutionError> {
        let index = self.corpus.get()?;
        let book = find(&index, &reference.book, requested)?;
        let verses = chapter_verses(book, reference.chapter)?;

        let text = (reference.verse as usize)
            .checked_sub(1)
            .and_then(|i| verses.get(i))
            .ok_or_else(|| ResolutionError::VerseOutOfRange {
                book: book.display_name(),
                chapter: reference.chapter,
                requested: reference.verse,
                max: verses.len(),
            })?;

        debug!("Resolved {} locally", reference);
        Ok(ResolvedVerse::new(
            book.display_name(),
            reference.chapter,
            reference.verse,
            text.as_str(),
        ))
    }

    /// Every verse of one chapter, in order
    pub fn resolve_chapter(
        &self,
        raw_book: Option<&str>,
        raw_chapter: Option<&str>,
    ) -> Result<Vec<ResolvedVerse>, ResolutionError> {
        let (book_id, chapter) = normalize_chapter(raw_book, raw_chapter)?;
        let requested = raw_book.map(str::trim).unwrap_or_default();

        let index = self.corpus.get()?;
        let book = find(&index, &book_id, requested)?;
        let verses = chapter_verses(book, chapter)?;
        let display = book.display_name();

        Ok(verses
            .iter()
            .enumerate()
            .map(|(i, text)| ResolvedVerse::new(display.as_str(), chapter, i as u32 + 1, text.as_str()))
            .collect())
    }

    /// Case-insensitive substring search over verse text, in corpus order.
    ///
    /// No ranking; the first `limit` hits are returned.
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<ResolvedVerse>, ResolutionError> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Err(ValidationError::MissingField(Field::Query).into());
        }

        let index = self.corpus.get()?;
        let mut hits = Vec::new();

        'books: for book in index.books() {
            let display = book.display_name();
            for (c, verses) in book.chapters.iter().enumerate() {
                for (v, text) in verses.iter().enumerate() {
                    if hits.len() >= limit {
                        break 'books;
                    }
                    if text.to_lowercase().contains(&needle) {
                        hits.push(ResolvedVerse::new(
                            display.as_str(),
                            c as u32 + 1,
                            v as u32 + 1,
                            text.as_str(),
                        ));
                    }
                }
            }
        }

        debug!("Local search '{}' matched {} verses", needle, hits.len());
        Ok(hits)
    }
}

fn find<'a>(
    index: &'a CorpusIndex,
    book_id: &str,
    requested: &str,
) -> Result<&'a Book, ResolutionError> {
    index
        .find_book(book_id)
        .ok_or_else(|| ResolutionError::BookNotFound {
            requested: requested.to_string(),
        })
}

fn chapter_verses(book: &Book, chapter: u32) -> Result<&[String], ResolutionError> {
    book.chapter(chapter)
        .ok_or_else(|| ResolutionError::ChapterOutOfRange {
            book: book.display_name(),
            requested: chapter,
            max: book.chapter_count(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> LocalResolver {
        let index = CorpusIndex::from_json_str(
            r#"[
                {"abbrev": "gn", "name": "Genesis", "chapters": [["In the beginning", "And the earth"], ["Thus the heavens"]]},
                {"abbrev": "ex", "chapters": [["Now these are the names"]]}
            ]"#,
        )
        .unwrap();
        LocalResolver::new(Arc::new(LazyCorpus::from_index(index)))
    }

    #[test]
    fn test_resolve_prefers_full_name() {
        let v = resolver().resolve(Some("gn"), Some("1"), Some("2")).unwrap();
        assert_eq!(v.book, "Genesis");
        assert_eq!(v.text, "And the earth");
        assert_eq!(v.reference, "Genesis 1:2");
    }

    #[test]
    fn test_resolve_uppercases_abbreviation_without_name() {
        let v = resolver().resolve(Some("ex"), Some("1"), Some("1")).unwrap();
        assert_eq!(v.book, "EX");
        assert_eq!(v.reference, "EX 1:1");
    }

    #[test]
    fn test_book_not_found_keeps_raw_spelling() {
        let err = resolver().resolve(Some(" Xx "), Some("1"), Some("1")).unwrap_err();
        assert_eq!(
            err,
            ResolutionError::BookNotFound {
                requested: "Xx".to_string()
            }
        );
    }

    #[test]
    fn test_verse_out_of_range_reports_max() {
        let err = resolver().resolve(Some("gn"), Some("2"), Some("5")).unwrap_err();
        assert_eq!(
            err,
            ResolutionError::VerseOutOfRange {
                book: "Genesis".to_string(),
                chapter: 2,
                requested: 5,
                max: 1,
            }
        );
    }

    #[test]
    fn test_resolve_chapter() {
        let verses = resolver().resolve_chapter(Some("Genesis"), Some("1")).unwrap();
        assert_eq!(verses.len(), 2);
        assert_eq!(verses[1].reference, "Genesis 1:2");

        let err = resolver().resolve_chapter(Some("gn"), Some("3")).unwrap_err();
        assert!(matches!(err, ResolutionError::ChapterOutOfRange { max: 2, .. }));
    }

    #[test]
    fn test_search_is_case_insensitive_and_limited() {
        let r = resolver();
        let hits = r.search("THE", 10).unwrap();
        assert_eq!(hits.len(), 4);
        assert_eq!(hits[0].reference, "Genesis 1:1");

        let hits = r.search("the", 2).unwrap();
        assert_eq!(hits.len(), 2);

        assert!(matches!(
            r.search("  ", 10),
            Err(ResolutionError::Validation(ValidationError::MissingField(Field::Query)))
        ));
    }
}
