//! Lectio Common - scripture reference resolution
//!
//! Resolves (book, chapter, verse) references against a local JSON corpus
//! or a remote verse service, and picks the verse of the day.

pub mod config;
pub mod corpus;
pub mod error;
pub mod reference;
pub mod remote;
pub mod resolver;
pub mod selector;
pub mod service;

pub use config::{LectioConfig, SourceMode};
pub use corpus::{Book, CorpusIndex, LazyCorpus};
pub use error::{ErrorBody, ErrorKind, Field, ResolutionError, ValidationError};
pub use reference::{format_reference, normalize, parse_citation, Reference, ResolvedVerse};
pub use remote::VerseSource;
pub use resolver::LocalResolver;
pub use selector::{daily_reference, random_reference};
pub use service::VerseService;
