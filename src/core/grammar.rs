//! Lexical shapes of the identifiers that tie the planning docs together.

use regex::Regex;
use std::sync::LazyLock;

/// `TEST-<TAG>-<nnn>`, e.g. `TEST-AUTH-001`. Unanchored; used for token scans.
pub static TEST_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"TEST-[A-Z0-9]+-[0-9]{3}").unwrap());

/// Anchored form of [`TEST_ID`] for validating a whole heading token.
pub static TEST_ID_EXACT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^TEST-[A-Z0-9]+-[0-9]{3}$").unwrap());

/// `TEST-ID: <id>` declaration in a test stub. Group 1 is the declared id.
pub static TEST_ID_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"TEST-ID:\s*(TEST-[A-Z0-9]+-[0-9]{3})").unwrap());

pub static INVARIANT_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"INV-\d+").unwrap());

pub static RISK_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"R-\d+").unwrap());

/// All non-overlapping matches of `pattern` in `text`.
pub fn tokens<'a>(pattern: &Regex, text: &'a str) -> impl Iterator<Item = &'a str> {
    pattern.find_iter(text).map(|m| m.as_str())
}

pub fn is_test_id(candidate: &str) -> bool {
    TEST_ID_EXACT.is_match(candidate)
}
