//! Object naming for uploaded step images.
//!
//! Uploaded photos are stored flat in their bucket under
//! `{unix_millis}-{suffix}.jpg`. The millisecond timestamp keeps names
//! roughly sortable by upload time; the random suffix prevents collisions
//! between concurrent uploads in the same millisecond.

use rand::Rng;

use crate::image::OUTPUT_EXTENSION;
use crate::types::Timestamp;

/// Length of the random part of an object name.
pub const SUFFIX_LEN: usize = 11;

const SUFFIX_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Build an object path from a timestamp and a suffix.
///
/// # Examples
///
/// ```
/// use chrono::TimeZone;
/// use stepdish_core::naming::upload_path;
///
/// let at = chrono::Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
/// assert_eq!(upload_path(at, "k3x9"), "1700000000123-k3x9.jpg");
/// ```
pub fn upload_path(at: Timestamp, suffix: &str) -> String {
    format!("{}-{}.{}", at.timestamp_millis(), suffix, OUTPUT_EXTENSION)
}

/// A fresh lowercase base-36 suffix of [`SUFFIX_LEN`] characters.
pub fn random_suffix() -> String {
    let mut rng = rand::rng();
    (0..SUFFIX_LEN)
        .map(|_| SUFFIX_ALPHABET[rng.random_range(0..SUFFIX_ALPHABET.len())] as char)
        .collect()
}

/// A fresh object path for an image uploaded now.
pub fn new_upload_path() -> String {
    upload_path(chrono::Utc::now(), &random_suffix())
}
