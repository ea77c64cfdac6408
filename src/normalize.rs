//! Name/title normalization for equality and substring lookups.
//!
//! `normalize` canonicalizes free-text queries the same way the graph build
//! pipeline canonicalizes actor/movie names before indexing: NFKD
//! decomposition, drop anything outside ASCII (this is what removes
//! combining marks — accents decompose into a base letter plus a combining
//! mark outside the ASCII range), case-fold, trim.

use unicode_normalization::UnicodeNormalization;

/// Normalize a string for case-insensitive, accent-insensitive comparison.
///
/// Idempotent: `normalize(normalize(s)) == normalize(s)`.
pub fn normalize(s: &str) -> String {
    let decomposed: String = s.nfkd().filter(char::is_ascii).collect();
    decomposed.to_ascii_lowercase().trim().to_string()
}
