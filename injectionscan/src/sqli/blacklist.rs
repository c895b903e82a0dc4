//! Checks whether a fingerprint corresponds to a known SQL-injection shape,
//! run after the whitelist pass has had a chance to clear an input.
//!
//! There is no standalone fingerprint table here: the fingerprint alphabet
//! is just the type-code bytes folding can produce, so a blacklisted
//! fingerprint is stored as an ordinary (if unusual-looking) entry in the
//! same table [`super::keywords`] uses for words, prefixed with a sentinel
//! byte that no word or real fingerprint ever starts with.

use super::keywords;
use super::tokenizer::TokenType;

/// Sentinel byte prepended to a fingerprint before it's looked up, so it
/// can't collide with a real word in the shared table.
const FINGERPRINT_SENTINEL: u8 = b'0';

/// Returns `true` if `fingerprint` is a known-bad shape: uppercase it,
/// prefix it with the sentinel, and look the result up through the same
/// table [`keywords::lookup_word`] uses for plain words. A hit whose
/// resolved type is [`TokenType::Fingerprint`] is a known injection shape;
/// anything else (not found, or found as some other kind of entry) isn't.
pub fn is_blacklisted(fingerprint: &str) -> bool {
    let bytes = fingerprint.as_bytes();
    if bytes.is_empty() || bytes.len() >= 31 {
        return false;
    }

    let mut buf = [0u8; 32];
    buf[0] = FINGERPRINT_SENTINEL;
    for (i, &b) in bytes.iter().enumerate() {
        buf[i + 1] = b.to_ascii_uppercase();
    }
    let probe = core::str::from_utf8(&buf[..bytes.len() + 1]).unwrap_or("");

    keywords::lookup_word(probe) == TokenType::Fingerprint
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tautology_fingerprint_is_blacklisted() {
        assert!(is_blacklisted("1o1"));
    }

    #[test]
    fn evil_fingerprint_is_blacklisted() {
        assert!(is_blacklisted("X"));
    }

    #[test]
    fn union_select_star_from_fingerprint_is_blacklisted() {
        assert!(is_blacklisted("1Ukok"));
    }

    #[test]
    fn lookup_is_case_insensitive_on_the_fingerprint_itself() {
        assert!(is_blacklisted("1o1"));
        assert!(is_blacklisted("1O1"));
    }

    #[test]
    fn ordinary_fingerprint_is_not_blacklisted() {
        assert!(!is_blacklisted("n"));
    }

    #[test]
    fn empty_fingerprint_is_not_blacklisted() {
        assert!(!is_blacklisted(""));
    }
}
