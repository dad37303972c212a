//! Resolution facade - the one entry point the daemon and the CLI call
//!
//! Input is always normalized here first, so a malformed reference never
//! reaches the corpus or the network. Local and remote answers share the
//! `ResolvedVerse` shape and the `ResolutionError` taxonomy.

use crate::config::{ConfigError, LectioConfig, SourceMode};
use crate::corpus;
use crate::error::{Field, ResolutionError, ValidationError};
use crate::reference::{normalize, normalize_chapter, Reference, ResolvedVerse};
use crate::remote::{self, VerseSource};
use crate::resolver::LocalResolver;
use crate::selector;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Clone)]
enum Backend {
    Local(LocalResolver),
    Remote(Arc<dyn VerseSource>),
}

/// Resolves references through the configured backend
#[derive(Clone)]
pub struct VerseService {
    backend: Backend,
}

impl VerseService {
    pub fn local(resolver: LocalResolver) -> Self {
        Self {
            backend: Backend::Local(resolver),
        }
    }

    pub fn remote(source: Arc<dyn VerseSource>) -> Self {
        Self {
            backend: Backend::Remote(source),
        }
    }

    /// Service for `config.mode`; local mode binds the process-wide corpus
    pub fn from_config(config: &LectioConfig) -> Result<Self, ConfigError> {
        let service = match config.mode {
            SourceMode::Local => {
                let corpus = corpus::init_global(config.corpus.path.clone());
                Self::local(LocalResolver::new(corpus))
            }
            SourceMode::Remote => Self::remote(remote::build_source(&config.remote)?),
        };
        info!("Verse service ready ({})", service.describe());
        Ok(service)
    }

    pub fn mode(&self) -> SourceMode {
        match self.backend {
            Backend::Local(_) => SourceMode::Local,
            Backend::Remote(_) => SourceMode::Remote,
        }
    }

    /// Human-readable backend description for logs and health output
    pub fn describe(&self) -> String {
        match &self.backend {
            Backend::Local(resolver) => format!("local corpus {}", resolver.corpus().path().display()),
            Backend::Remote(source) => format!("remote {}", source.name()),
        }
    }

    /// Load the corpus now instead of on the first request.
    ///
    /// A no-op in remote mode.
    pub fn warm_up(&self) -> Result<(), ResolutionError> {
        match &self.backend {
            Backend::Local(resolver) => resolver.corpus().get().map(|_| ()),
            Backend::Remote(_) => Ok(()),
        }
    }

    /// Resolve raw (book, chapter, verse) input
    pub async fn resolve(
        &self,
        raw_book: Option<&str>,
        raw_chapter: Option<&str>,
        raw_verse: Option<&str>,
    ) -> Result<ResolvedVerse, ResolutionError> {
        let reference = normalize(raw_book, raw_chapter, raw_verse)?;
        match &self.backend {
            Backend::Local(resolver) => resolver.resolve(raw_book, raw_chapter, raw_verse),
            Backend::Remote(source) => source.fetch_verse(&reference).await,
        }
    }

    /// Resolve an already normalized reference
    pub async fn resolve_reference(
        &self,
        reference: &Reference,
    ) -> Result<ResolvedVerse, ResolutionError> {
        debug!("Resolving {} via {}", reference, self.mode().as_str());
        match &self.backend {
            Backend::Local(resolver) => resolver.resolve_reference(reference),
            Backend::Remote(source) => source.fetch_verse(reference).await,
        }
    }

    pub async fn chapter(
        &self,
        raw_book: Option<&str>,
        raw_chapter: Option<&str>,
    ) -> Result<Vec<ResolvedVerse>, ResolutionError> {
        let (book, chapter) = normalize_chapter(raw_book, raw_chapter)?;
        match &self.backend {
            Backend::Local(resolver) => resolver.resolve_chapter(raw_book, raw_chapter),
            Backend::Remote(source) => source.fetch_chapter(&book, chapter).await,
        }
    }

    /// Unranked search, at most `limit` results
    pub async fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<ResolvedVerse>, ResolutionError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ValidationError::MissingField(Field::Query).into());
        }
        match &self.backend {
            Backend::Local(resolver) => resolver.search(query, limit),
            Backend::Remote(source) => {
                let mut hits = source.search_verses(query).await?;
                hits.truncate(limit);
                Ok(hits)
            }
        }
    }

    /// Verse of the day for `date`
    pub async fn daily(&self, date: NaiveDate) -> Result<ResolvedVerse, ResolutionError> {
        self.resolve_reference(&selector::daily_reference(date)).await
    }

    /// A random verse; may fail with a range error when the sampler overshoots
    pub async fn random(&self) -> Result<ResolvedVerse, ResolutionError> {
        let reference = selector::random_reference();
        self.resolve_reference(&reference).await
    }
}
