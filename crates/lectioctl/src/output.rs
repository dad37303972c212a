//! Output formatting for lectioctl

use lectio_common::{Book, ResolutionError, ResolvedVerse};
use owo_colors::OwoColorize;

const WRAP_WIDTH: usize = 78;

/// One verse: reference header, wrapped text
pub fn print_verse(verse: &ResolvedVerse) {
    println!("{}", verse.reference.bold().cyan());
    for line in textwrap::wrap(&verse.text, WRAP_WIDTH) {
        println!("  {}", line);
    }
}

/// Whole chapter: one header, then numbered verses
pub fn print_chapter(verses: &[ResolvedVerse]) {
    let Some(first) = verses.first() else {
        println!("{}", "No verses found.".yellow());
        return;
    };
    println!("{}", format!("{} {}", first.book, first.chapter).bold().cyan());
    for verse in verses {
        let number = format!("{:>3}", verse.verse);
        let mut lines = textwrap::wrap(&verse.text, WRAP_WIDTH - 4).into_iter();
        if let Some(line) = lines.next() {
            println!("{} {}", number.bold(), line);
        }
        for line in lines {
            println!("    {}", line);
        }
    }
}

/// Search hits, each with its full reference
pub fn print_hits(verses: &[ResolvedVerse]) {
    if verses.is_empty() {
        println!("{}", "No verses found.".yellow());
        return;
    }
    for verse in verses {
        print_verse(verse);
    }
}

pub fn print_books(books: &[Book]) {
    for book in books {
        println!(
            "{:<8} {:<24} {} chapters",
            book.abbreviation.cyan(),
            book.display_name(),
            book.chapter_count()
        );
    }
}

pub fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_error(err: &ResolutionError) {
    eprintln!("{} {}", "[ERROR]".bright_red(), err.user_message());
}
