//! Corpus Index - process-wide, load-once index over the local scripture dataset
//!
//! The dataset is a JSON array of books:
//!
//! ```json
//! [{"abbrev": "gn", "name": "Genesis", "chapters": [["In the beginning...", "..."]]}]
//! ```
//!
//! Each book is registered under its case-folded abbreviation and, when
//! present, its case-folded full name. On alias collision the first book
//! registered keeps the alias.
//!
//! Loading happens at most once per `LazyCorpus`. A failed load is cached
//! and returned to every later caller; nothing reloads it.

use crate::error::ResolutionError;
use crate::reference::normalize_book_id;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Environment variable overriding the corpus path
pub const CORPUS_ENV: &str = "LECTIO_CORPUS";

/// Corpus path used when neither config nor environment names one
pub const DEFAULT_CORPUS_PATH: &str = "/var/lib/lectio/corpus.json";

/// A book of the corpus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    #[serde(rename = "abbrev")]
    pub abbreviation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// `chapters[c - 1][v - 1]` is the text of verse `c:v`
    pub chapters: Vec<Vec<String>>,
}

impl Book {
    /// Full name if known, otherwise the uppercased abbreviation
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => self.abbreviation.trim().to_uppercase(),
        }
    }

    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }

    /// Verses in a 1-based chapter, if it exists
    pub fn chapter(&self, chapter: u32) -> Option<&[String]> {
        let index = (chapter as usize).checked_sub(1)?;
        self.chapters.get(index).map(Vec::as_slice)
    }

    /// Case-folded aliases this book answers to
    fn aliases(&self) -> Vec<String> {
        let mut aliases = vec![normalize_book_id(&self.abbreviation)];
        if let Some(name) = &self.name {
            let name = normalize_book_id(name);
            if !name.is_empty() && name != aliases[0] {
                aliases.push(name);
            }
        }
        aliases
    }

    fn check_integrity(&self, position: usize) -> Result<(), ResolutionError> {
        if self.abbreviation.trim().is_empty() {
            return Err(ResolutionError::DataIntegrity(format!(
                "book #{} has an empty abbreviation",
                position + 1
            )));
        }
        if self.chapters.is_empty() {
            return Err(ResolutionError::DataIntegrity(format!(
                "book '{}' has no chapters",
                self.abbreviation
            )));
        }
        if let Some(empty) = self.chapters.iter().position(Vec::is_empty) {
            return Err(ResolutionError::DataIntegrity(format!(
                "book '{}' chapter {} has no verses",
                self.abbreviation,
                empty + 1
            )));
        }
        Ok(())
    }
}

/// Immutable alias index over the books of a corpus
#[derive(Debug)]
pub struct CorpusIndex {
    books: Vec<Book>,
    aliases: HashMap<String, usize>,
}

impl CorpusIndex {
    /// Build the index, validating every book
    pub fn from_books(books: Vec<Book>) -> Result<Self, ResolutionError> {
        let mut aliases = HashMap::new();

        for (position, book) in books.iter().enumerate() {
            book.check_integrity(position)?;

            for alias in book.aliases() {
                match aliases.get(&alias) {
                    Some(&owner) => {
                        let owner: &Book = &books[owner];
                        warn!(
                            "Corpus alias '{}' of '{}' already registered by '{}', keeping first",
                            alias, book.abbreviation, owner.abbreviation
                        );
                    }
                    None => {
                        aliases.insert(alias, position);
                    }
                }
            }
        }

        debug!(
            "Corpus index built: {} books, {} aliases",
            books.len(),
            aliases.len()
        );
        Ok(Self { books, aliases })
    }

    /// Parse corpus JSON; a leading UTF-8 byte-order mark is ignored
    pub fn from_json_str(json: &str) -> Result<Self, ResolutionError> {
        let json = json.strip_prefix('\u{feff}').unwrap_or(json);
        let books: Vec<Book> = serde_json::from_str(json)
            .map_err(|e| ResolutionError::DataIntegrity(format!("malformed corpus JSON: {}", e)))?;
        Self::from_books(books)
    }

    pub fn load(path: &Path) -> Result<Self, ResolutionError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            ResolutionError::DataIntegrity(format!(
                "cannot read corpus file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json_str(&json)
    }

    /// Case-insensitive exact match on abbreviation or full name
    pub fn find_book(&self, id: &str) -> Option<&Book> {
        self.aliases
            .get(&normalize_book_id(id))
            .map(|&index| &self.books[index])
    }

    /// Books in dataset order
    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}

/// A corpus file loaded on first access, at most once
pub struct LazyCorpus {
    path: PathBuf,
    cell: OnceCell<Result<Arc<CorpusIndex>, ResolutionError>>,
    builds: AtomicUsize,
}

impl LazyCorpus {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cell: OnceCell::new(),
            builds: AtomicUsize::new(0),
        }
    }

    /// Already-built index (tests, embedded datasets)
    pub fn from_index(index: CorpusIndex) -> Self {
        let cell = OnceCell::new();
        let _ = cell.set(Ok(Arc::new(index)));
        Self {
            path: PathBuf::new(),
            cell,
            builds: AtomicUsize::new(0),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The index, building it on first call.
    ///
    /// Concurrent first callers block until the single build finishes, so
    /// nobody sees a partially populated index.
    pub fn get(&self) -> Result<Arc<CorpusIndex>, ResolutionError> {
        self.cell
            .get_or_init(|| {
                self.builds.fetch_add(1, Ordering::SeqCst);
                match CorpusIndex::load(&self.path) {
                    Ok(index) => {
                        info!(
                            "Loaded corpus from {} ({} books)",
                            self.path.display(),
                            index.len()
                        );
                        Ok(Arc::new(index))
                    }
                    Err(e) => {
                        error!("Corpus unavailable, lookups will fail until restart: {}", e);
                        Err(e)
                    }
                }
            })
            .clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    /// How many times a build ran (0 or 1)
    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }
}

static GLOBAL_CORPUS: OnceCell<Arc<LazyCorpus>> = OnceCell::new();

/// Configure the process-wide corpus. The first call wins.
pub fn init_global(path: impl Into<PathBuf>) -> Arc<LazyCorpus> {
    let path = path.into();
    let corpus = GLOBAL_CORPUS.get_or_init(|| Arc::new(LazyCorpus::new(path.clone())));
    if corpus.path() != path.as_path() {
        warn!(
            "Global corpus already configured for {}, ignoring {}",
            corpus.path().display(),
            path.display()
        );
    }
    Arc::clone(corpus)
}

pub fn default_corpus_path() -> PathBuf {
    std::env::var_os(CORPUS_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CORPUS_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn book(abbrev: &str, name: Option<&str>, chapters: &[&[&str]]) -> Book {
        Book {
            abbreviation: abbrev.to_string(),
            name: name.map(str::to_string),
            chapters: chapters
                .iter()
                .map(|c| c.iter().map(|v| v.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn test_lookup_by_either_alias_any_case() {
        let index =
            CorpusIndex::from_books(vec![book("gn", Some("Genesis"), &[&["a", "b"]])]).unwrap();
        for id in ["gn", "GN", " Gn ", "genesis", "GENESIS"] {
            assert_eq!(index.find_book(id).unwrap().abbreviation, "gn", "{}", id);
        }
        assert!(index.find_book("gen").is_none());
    }

    #[test]
    fn test_first_registration_wins() {
        let index = CorpusIndex::from_books(vec![
            book("jo", Some("John"), &[&["first"]]),
            book("JO", Some("Joel"), &[&["second"]]),
        ])
        .unwrap();
        assert_eq!(index.find_book("jo").unwrap().chapters[0][0], "first");
        assert_eq!(index.find_book("joel").unwrap().chapters[0][0], "second");
    }

    #[test]
    fn test_display_name_falls_back_to_abbreviation() {
        assert_eq!(book("ex", None, &[&["a"]]).display_name(), "EX");
        assert_eq!(book("ex", Some("Exodus"), &[&["a"]]).display_name(), "Exodus");
    }

    #[test]
    fn test_empty_chapter_is_integrity_error() {
        let err = CorpusIndex::from_books(vec![book("gn", None, &[&["a"], &[]])]).unwrap_err();
        assert!(matches!(err, ResolutionError::DataIntegrity(_)));

        let err = CorpusIndex::from_books(vec![book("gn", None, &[])]).unwrap_err();
        assert!(matches!(err, ResolutionError::DataIntegrity(_)));
    }

    #[test]
    fn test_bom_is_tolerated() {
        let json = "\u{feff}[{\"abbrev\":\"gn\",\"chapters\":[[\"a\"]]}]";
        let index = CorpusIndex::from_json_str(json).unwrap();
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_missing_abbrev_is_integrity_error() {
        let err = CorpusIndex::from_json_str("[{\"chapters\":[[\"a\"]]}]").unwrap_err();
        assert!(matches!(err, ResolutionError::DataIntegrity(_)));
    }

    #[test]
    fn test_lazy_failure_is_cached() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("corpus.json");
        fs::write(&path, "[{\"abbrev\": \"gn\", \"chapters\": [[").unwrap();

        let corpus = LazyCorpus::new(&path);
        assert!(!corpus.is_loaded());
        let first = corpus.get().unwrap_err();
        assert!(matches!(first, ResolutionError::DataIntegrity(_)));

        // Fixing the file does not trigger a reload
        fs::write(&path, "[{\"abbrev\": \"gn\", \"chapters\": [[\"a\"]]}]").unwrap();
        assert_eq!(corpus.get().unwrap_err(), first);
        assert_eq!(corpus.build_count(), 1);
    }

    #[test]
    fn test_missing_file_is_integrity_error() {
        let temp_dir = TempDir::new().unwrap();
        let corpus = LazyCorpus::new(temp_dir.path().join("absent.json"));
        assert!(matches!(
            corpus.get().unwrap_err(),
            ResolutionError::DataIntegrity(_)
        ));
    }

    // Only test in this binary that touches the process-wide corpus
    #[test]
    fn test_init_global_first_call_wins() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("corpus.json");
        fs::write(&path, "[{\"abbrev\": \"gn\", \"chapters\": [[\"a\"]]}]").unwrap();

        let first = init_global(&path);
        let second = init_global(temp_dir.path().join("other.json"));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.path(), path.as_path());
        assert_eq!(second.get().unwrap().len(), 1);
    }
}
