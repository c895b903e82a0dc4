#![cfg_attr(not(feature = "std"), no_std)]
#![doc = include_str!("../../README.md")]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod sqli;
pub mod xss;

pub use sqli::{Fingerprint, SqliFlags, SqliState};
pub use xss::{Html5Flags, XssDetector, XssResult};

/// Returns `true` if `input` contains a SQL-injection payload.
///
/// Tries the input as-is, then re-parses it under the contexts the
/// underlying driver enumerates: MySQL dialect (when comment statistics
/// suggest it), and as if preceded by a stray `'` or `"` (the common shape
/// of an injection breaking out of a quoted literal). Cannot fail: there is
/// no input for which this returns anything other than a `bool`.
pub fn is_sqli(input: &[u8]) -> bool {
    SqliState::new(input, SqliFlags::FLAG_SQL_ANSI).detect()
}

/// Returns `true` if `input` contains an XSS payload.
///
/// Runs the streaming HTML5-subset tokenizer across all five starting
/// contexts (bare data, and the four attribute-value quoting styles) since
/// the caller rarely knows which HTML position the string will be reflected
/// into.
pub fn is_xss(input: &[u8]) -> bool {
    XssDetector::new().detect(input).is_injection()
}

/// Computes the SQL fingerprint libinjection-style `is_sqli` derives its
/// verdict from, without running the whitelist pass. Exposed for tooling
/// that wants to inspect *why* an input was flagged, not just whether it
/// was.
pub fn sqli_fingerprint(input: &[u8]) -> Fingerprint {
    let mut state = SqliState::new(input, SqliFlags::FLAG_SQL_ANSI);
    state.get_fingerprint()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trivial_sql_is_flagged() {
        assert!(is_sqli(b"1 OR 1=1"));
        assert!(is_sqli(b"' UNION SELECT password FROM users--"));
    }

    #[test]
    fn ordinary_text_is_not_flagged() {
        assert!(!is_sqli(b"hello world"));
        assert!(!is_sqli(b"user@example.com"));
    }

    #[test]
    fn script_tag_is_flagged() {
        assert!(is_xss(b"<script>alert(1)</script>"));
    }

    #[test]
    fn ordinary_html_is_not_flagged() {
        assert!(!is_xss(b"<p>hello world</p>"));
    }

    #[test]
    fn empty_input_is_never_an_injection() {
        assert!(!is_sqli(b""));
        assert!(!is_xss(b""));
    }
}
