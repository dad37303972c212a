//! Reference normalization.
//!
//! Turns raw caller input (query-string values, CLI arguments) into a
//! canonical `Reference`. Pure functions only; whether the book exists is
//! decided later by the corpus index or the remote service.

use crate::error::{Field, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A (book, chapter, verse) triple identifying a single verse
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    /// Trimmed, case-folded book identifier
    pub book: String,
    pub chapter: u32,
    pub verse: u32,
}

impl Reference {
    /// Build a reference from already trusted parts (rotation tables, tests).
    pub fn new(book: &str, chapter: u32, verse: u32) -> Self {
        Self {
            book: normalize_book_id(book),
            chapter,
            verse,
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_reference(&self.book, self.chapter, self.verse))
    }
}

/// Verse text plus its display reference, identical in shape whether it
/// came from the local corpus or a remote service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedVerse {
    pub book: String,
    pub chapter: u32,
    pub verse: u32,
    pub text: String,
    pub reference: String,
}

impl ResolvedVerse {
    pub fn new(book: impl Into<String>, chapter: u32, verse: u32, text: impl Into<String>) -> Self {
        let book = book.into();
        let reference = format_reference(&book, chapter, verse);
        Self {
            book,
            chapter,
            verse,
            text: text.into(),
            reference,
        }
    }
}

/// `"{book} {chapter}:{verse}"`, shared by every source
pub fn format_reference(book: &str, chapter: u32, verse: u32) -> String {
    format!("{} {}:{}", book, chapter, verse)
}

/// Trim and case-fold a book identifier
pub fn normalize_book_id(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Validate raw (book, chapter, verse) input.
///
/// Fields are checked in order, so the first missing or malformed one is
/// the one reported.
pub fn normalize(
    raw_book: Option<&str>,
    raw_chapter: Option<&str>,
    raw_verse: Option<&str>,
) -> Result<Reference, ValidationError> {
    let book = require(Field::Book, raw_book)?;
    let chapter_raw = require(Field::Chapter, raw_chapter)?;
    let verse_raw = require(Field::Verse, raw_verse)?;

    let chapter = parse_number(Field::Chapter, chapter_raw)?;
    let verse = parse_number(Field::Verse, verse_raw)?;

    Ok(Reference {
        book: normalize_book_id(book),
        chapter,
        verse,
    })
}

/// Validate raw (book, chapter) input for whole-chapter lookups
pub fn normalize_chapter(
    raw_book: Option<&str>,
    raw_chapter: Option<&str>,
) -> Result<(String, u32), ValidationError> {
    let book = require(Field::Book, raw_book)?;
    let chapter_raw = require(Field::Chapter, raw_chapter)?;
    let chapter = parse_number(Field::Chapter, chapter_raw)?;
    Ok((normalize_book_id(book), chapter))
}

/// Parse a single citation such as `"gn 1:1"` or `"1 John 3:16"`.
///
/// The book is everything before the last whitespace run; the remainder is
/// `chapter:verse`.
pub fn parse_citation(citation: &str) -> Result<Reference, ValidationError> {
    let trimmed = citation.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField(Field::Book));
    }

    let (book, location) = match trimmed.rsplit_once(char::is_whitespace) {
        Some((book, location)) => (book, location),
        None => return Err(ValidationError::MissingField(Field::Chapter)),
    };

    let (chapter, verse) = match location.split_once(':') {
        Some((chapter, verse)) => (Some(chapter), Some(verse)),
        None => (Some(location), None),
    };

    normalize(Some(book), chapter, verse)
}

fn require(field: Field, raw: Option<&str>) -> Result<&str, ValidationError> {
    match raw.map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ValidationError::MissingField(field)),
    }
}

/// Strict base-10 parse; anything below 1 (or past `u32`) is out of range
fn parse_number(field: Field, raw: &str) -> Result<u32, ValidationError> {
    let value: i64 = raw.parse().map_err(|_| ValidationError::NotANumber {
        field,
        value: raw.to_string(),
    })?;

    if value < 1 {
        return Err(ValidationError::OutOfRange { field, value });
    }

    u32::try_from(value).map_err(|_| ValidationError::OutOfRange { field, value })
}
