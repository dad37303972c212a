//! lectioctl command implementations

use crate::output;
use anyhow::Result;
use chrono::NaiveDate;
use lectio_common::{parse_citation, LazyCorpus, ResolutionError, ResolvedVerse, VerseService};

/// Shared by every command: where verses come from and how to print them
pub struct Context {
    pub service: VerseService,
    pub json: bool,
}

/// `verse gn 1 1` or `verse "gn 1:1"`
pub async fn verse(
    ctx: &Context,
    book: &str,
    chapter: Option<&str>,
    verse: Option<&str>,
) -> Result<()> {
    let resolved = lookup_verse(ctx, book, chapter, verse).await?;
    if ctx.json {
        emit_json(&resolved)
    } else {
        output::print_verse(&resolved);
        Ok(())
    }
}

/// A lone argument is a citation; otherwise the three parts go in as given
pub async fn lookup_verse(
    ctx: &Context,
    book: &str,
    chapter: Option<&str>,
    verse: Option<&str>,
) -> Result<ResolvedVerse> {
    let resolved = match (chapter, verse) {
        (None, None) => {
            let reference = parse_citation(book).map_err(ResolutionError::from)?;
            ctx.service.resolve_reference(&reference).await?
        }
        _ => ctx.service.resolve(Some(book), chapter, verse).await?,
    };
    Ok(resolved)
}

pub async fn chapter(ctx: &Context, book: &str, chapter: &str) -> Result<()> {
    let verses = ctx.service.chapter(Some(book), Some(chapter)).await?;
    if ctx.json {
        emit_json(&verses)
    } else {
        output::print_chapter(&verses);
        Ok(())
    }
}

pub async fn search(ctx: &Context, query: &str, limit: usize) -> Result<()> {
    let hits = ctx.service.search(query, limit).await?;
    if ctx.json {
        emit_json(&hits)
    } else {
        output::print_hits(&hits);
        Ok(())
    }
}

pub async fn daily(ctx: &Context, date: Option<NaiveDate>) -> Result<()> {
    let date = date.unwrap_or_else(|| chrono::Local::now().date_naive());
    let resolved = ctx.service.daily(date).await?;
    if ctx.json {
        emit_json(&resolved)
    } else {
        output::print_verse(&resolved);
        Ok(())
    }
}

pub async fn random(ctx: &Context) -> Result<()> {
    let resolved = ctx.service.random().await?;
    if ctx.json {
        emit_json(&resolved)
    } else {
        output::print_verse(&resolved);
        Ok(())
    }
}

/// Books of the local corpus
pub fn books(ctx: &Context, corpus: &LazyCorpus) -> Result<()> {
    let index = corpus.get()?;
    if ctx.json {
        emit_json(index.books())
    } else {
        output::print_books(index.books());
        Ok(())
    }
}

fn emit_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    output::print_json(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lectio_common::remote::FakeSource;
    use lectio_common::{ErrorKind, Reference};
    use std::sync::Arc;

    fn fake() -> Arc<FakeSource> {
        Arc::new(FakeSource::new().with_verse(
            Reference::new("john", 3, 16),
            ResolvedVerse::new("John", 3, 16, "For God so loved the world"),
        ))
    }

    fn context(source: &Arc<FakeSource>) -> Context {
        Context {
            service: VerseService::remote(source.clone()),
            json: true,
        }
    }

    fn kind(err: &anyhow::Error) -> Option<ErrorKind> {
        err.downcast_ref::<ResolutionError>().map(ResolutionError::kind)
    }

    #[tokio::test]
    async fn test_citation_and_parts_resolve_alike() {
        let source = fake();
        let ctx = context(&source);

        let cited = lookup_verse(&ctx, "John 3:16", None, None).await.unwrap();
        let parts = lookup_verse(&ctx, "JOHN", Some("3"), Some("16")).await.unwrap();
        assert_eq!(cited, parts);
        assert_eq!(cited.reference, "John 3:16");
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_bad_citation_keeps_validation_kind() {
        let source = fake();
        let ctx = context(&source);

        let err = lookup_verse(&ctx, "john", None, None).await.unwrap_err();
        assert_eq!(kind(&err), Some(ErrorKind::Validation));

        let err = lookup_verse(&ctx, "john", Some("3"), None).await.unwrap_err();
        assert_eq!(kind(&err), Some(ErrorKind::Validation));

        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_upstream_failure_reaches_exit_code() {
        let source = Arc::new(FakeSource::failing("bible-api returned HTTP 503"));
        let err = verse(&context(&source), "john 3:16", None, None)
            .await
            .unwrap_err();
        assert_eq!(kind(&err), Some(ErrorKind::Upstream));
        assert_eq!(
            crate::errors::exit_code(ErrorKind::Upstream),
            crate::errors::EXIT_UNAVAILABLE
        );
    }
}
