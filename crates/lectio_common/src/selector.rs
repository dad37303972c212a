//! Daily and random reference selection
//!
//! `daily_reference` is a pure function of the date it is given; callers
//! read the clock, never this module. Day-of-year is counted within the
//! supplied date's own year (January 1st is day 1).

use crate::reference::Reference;
use chrono::{Datelike, NaiveDate};
use rand::Rng;

/// Curated verse-of-the-day rotation, in order
pub const ROTATION: [(&str, u32, u32); 8] = [
    ("john", 3, 16),
    ("psalms", 23, 1),
    ("philippians", 4, 13),
    ("jeremiah", 29, 11),
    ("proverbs", 3, 5),
    ("romans", 8, 28),
    ("isaiah", 41, 10),
    ("matthew", 11, 28),
];

/// Books the random sampler picks from
pub const CANDIDATE_BOOKS: [&str; 12] = [
    "genesis",
    "exodus",
    "psalms",
    "proverbs",
    "isaiah",
    "jeremiah",
    "matthew",
    "mark",
    "luke",
    "john",
    "acts",
    "romans",
];

/// Inclusive upper bounds of the random sampler
pub const RANDOM_MAX_CHAPTER: u32 = 50;
pub const RANDOM_MAX_VERSE: u32 = 20;

/// 1-based day of the year of `date`, within its own year
pub fn day_of_year(date: NaiveDate) -> u32 {
    date.ordinal()
}

/// Verse of the day for `date`; wraps around the rotation
pub fn daily_reference(date: NaiveDate) -> Reference {
    let index = day_of_year(date) as usize % ROTATION.len();
    let (book, chapter, verse) = ROTATION[index];
    Reference::new(book, chapter, verse)
}

/// Random reference from the thread-local RNG
pub fn random_reference() -> Reference {
    random_reference_with(&mut rand::thread_rng())
}

/// Random reference from a caller-supplied RNG.
///
/// The result is not checked against the book's real length; the resolver
/// rejects out-of-range picks.
pub fn random_reference_with<R: Rng + ?Sized>(rng: &mut R) -> Reference {
    let book = CANDIDATE_BOOKS[rng.gen_range(0..CANDIDATE_BOOKS.len())];
    let chapter = rng.gen_range(1..=RANDOM_MAX_CHAPTER);
    let verse = rng.gen_range(1..=RANDOM_MAX_VERSE);
    Reference::new(book, chapter, verse)
}
