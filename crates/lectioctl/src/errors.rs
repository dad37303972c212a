//! Exit status for lectioctl
//!
//! sysexits-style codes so scripts can tell a bad reference from an outage.

use lectio_common::ErrorKind;

/// Malformed or missing input
pub const EXIT_USAGE: i32 = 64;

/// Corpus missing or unparseable
pub const EXIT_DATA_ERROR: i32 = 65;

/// Reference outside the corpus
pub const EXIT_NOT_FOUND: i32 = 66;

/// Remote service failed
pub const EXIT_UNAVAILABLE: i32 = 69;

pub fn exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Validation => EXIT_USAGE,
        ErrorKind::NotFound => EXIT_NOT_FOUND,
        ErrorKind::DataIntegrity => EXIT_DATA_ERROR,
        ErrorKind::Upstream => EXIT_UNAVAILABLE,
    }
}
