//! Error types for Lectio.
//!
//! Every failure a lookup can produce is a distinct variant carrying the
//! offending value and, for range errors, the valid upper bound.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Input field named in validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Book,
    Chapter,
    Verse,
    Query,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Book => "book",
            Field::Chapter => "chapter",
            Field::Verse => "verse",
            Field::Query => "query",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Missing or malformed caller input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}.")]
    MissingField(Field),

    #[error("Invalid {field} number: '{value}' is not a number.")]
    NotANumber { field: Field, value: String },

    #[error("Invalid {field} number: {value}. Numbers start at 1.")]
    OutOfRange { field: Field, value: i64 },
}

/// Coarse classification used for status codes and exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    DataIntegrity,
    Upstream,
}

/// Any failure resolving a reference, locally or remotely
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Book '{requested}' not found.")]
    BookNotFound { requested: String },

    #[error("Invalid chapter number: {requested}. {book} has {max} chapters.")]
    ChapterOutOfRange {
        book: String,
        requested: u32,
        max: usize,
    },

    #[error("Invalid verse number: {requested}. {book} {chapter} has {max} verses.")]
    VerseOutOfRange {
        book: String,
        chapter: u32,
        requested: u32,
        max: usize,
    },

    #[error("Corpus data integrity error: {0}")]
    DataIntegrity(String),

    #[error("Upstream service error: {cause}")]
    Upstream { cause: String },
}

impl ResolutionError {
    pub fn upstream(cause: impl Into<String>) -> Self {
        ResolutionError::Upstream {
            cause: cause.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ResolutionError::Validation(_) => ErrorKind::Validation,
            ResolutionError::BookNotFound { .. }
            | ResolutionError::ChapterOutOfRange { .. }
            | ResolutionError::VerseOutOfRange { .. } => ErrorKind::NotFound,
            ResolutionError::DataIntegrity(_) => ErrorKind::DataIntegrity,
            ResolutionError::Upstream { .. } => ErrorKind::Upstream,
        }
    }

    /// Message safe to show to the caller.
    ///
    /// Data integrity details stay in the operator log; callers only learn
    /// that the corpus is unavailable.
    pub fn user_message(&self) -> String {
        match self {
            ResolutionError::DataIntegrity(_) => {
                "The scripture corpus is unavailable. Please try again later.".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Wire shape of a failure: `{ "error": "<message>" }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl From<&ResolutionError> for ErrorBody {
    fn from(err: &ResolutionError) -> Self {
        Self {
            error: err.user_message(),
        }
    }
}
