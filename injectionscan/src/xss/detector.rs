//! Classifies a stream of HTML5 tokens as carrying an XSS payload.

use super::blacklists::{
    htmlencode_startswith, AttributeType, BLACK_ATTRS, BLACK_ATTR_EVENTS, BLACK_TAGS,
    BLACK_URL_PROTOCOLS,
};
use super::html5::{Html5Flags, Html5State, TokenType};

/// The outcome of running [`XssDetector::detect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XssResult {
    flagged: bool,
}

impl XssResult {
    pub fn is_injection(&self) -> bool {
        self.flagged
    }
}

/// Runs the HTML5-subset tokenizer across every starting context and asks
/// the static classifier whether any of the tokens it produces are
/// dangerous.
pub struct XssDetector;

impl Default for XssDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl XssDetector {
    pub fn new() -> Self {
        Self
    }

    pub fn detect(&self, input: &[u8]) -> XssResult {
        for flags in Html5Flags::ALL_STARTING_CONTEXTS {
            if Self::is_xss(input, flags) {
                return XssResult { flagged: true };
            }
        }
        XssResult { flagged: false }
    }

    fn is_xss(input: &[u8], flags: Html5Flags) -> bool {
        let mut state = Html5State::new(input, flags);
        let mut attr = AttributeType::None;

        while let Some(tok) = state.next() {
            let value = tok.value(input);
            match tok.token_type {
                TokenType::Doctype => return true,
                TokenType::TagNameOpen | TokenType::TagNameSelfClose => {
                    if is_black_tag(value) {
                        return true;
                    }
                }
                TokenType::AttrName => {
                    attr = classify_attr(value);
                }
                TokenType::AttrValue => {
                    match attr {
                        AttributeType::Black | AttributeType::Style => return true,
                        AttributeType::Url => {
                            if is_black_url(value) {
                                return true;
                            }
                        }
                        AttributeType::Indirect => {
                            if classify_attr(value) != AttributeType::None {
                                return true;
                            }
                        }
                        AttributeType::None => {}
                    }
                    attr = AttributeType::None;
                }
                TokenType::TagComment => {
                    if is_dangerous_comment(value) {
                        return true;
                    }
                }
                _ => {}
            }
        }

        false
    }
}

/// A tag is dangerous if it's literally on the blacklist, or if its name
/// begins (case-insensitively) with `svg` or `xsl` — both namespaces admit
/// script-bearing constructs (`<svg onload=...>`, XSLT `<xsl:script>`) that
/// a flat name list can't enumerate.
fn is_black_tag(tag: &[u8]) -> bool {
    if BLACK_TAGS.iter().any(|&t| cstrcasecmp_with_null(t, tag)) {
        return true;
    }
    let tag = strip_trailing_nul(tag);
    starts_with_ignore_case(tag, b"svg") || starts_with_ignore_case(tag, b"xsl")
}

fn starts_with_ignore_case(haystack: &[u8], prefix: &[u8]) -> bool {
    haystack.len() >= prefix.len() && haystack[..prefix.len()].eq_ignore_ascii_case(prefix)
}

fn strip_trailing_nul(value: &[u8]) -> &[u8] {
    match value.iter().position(|&b| b == 0) {
        Some(nul) => &value[..nul],
        None => value,
    }
}

/// Classifies an `AttrName` token by the rule table in the design: event
/// handlers and a handful of exact names are unconditionally dangerous,
/// `style`/`filter` defer judgement to their value, URL-bearing attributes
/// defer to the URL check, and `attributename` (used by some legacy
/// expression-binding attributes) defers by reclassifying its *value* as if
/// it were itself an attribute name.
fn classify_attr(name: &[u8]) -> AttributeType {
    if name.len() >= 5
        && starts_with_ignore_case(name, b"on")
        && BLACK_ATTR_EVENTS.iter().any(|&a| cstrcasecmp_with_null(a, name))
    {
        return AttributeType::Black;
    }
    if cstrcasecmp_with_null("xmlns", name) || cstrcasecmp_with_null("xlink", name) {
        return AttributeType::Black;
    }
    if cstrcasecmp_with_null("dataformatas", name) || cstrcasecmp_with_null("datasrc", name) {
        return AttributeType::Black;
    }
    if cstrcasecmp_with_null("attributename", name) {
        return AttributeType::Indirect;
    }
    if cstrcasecmp_with_null("style", name) || cstrcasecmp_with_null("filter", name) {
        return AttributeType::Style;
    }
    if BLACK_ATTRS.iter().any(|&a| cstrcasecmp_with_null(a, name)) {
        return AttributeType::Url;
    }
    AttributeType::None
}

fn is_black_url(value: &[u8]) -> bool {
    let trimmed = skip_leading_junk(value);
    BLACK_URL_PROTOCOLS.iter().any(|&p| htmlencode_startswith(p, trimmed))
}

/// Drops bytes `<= 32` (controls and space) or `>= 127` (DEL and beyond)
/// from the front of the value — browsers ignore this junk when deciding
/// what scheme a URL starts with, so a detector that didn't would let
/// `\x01javascript:...` slip past the prefix match.
fn skip_leading_junk(value: &[u8]) -> &[u8] {
    let mut start = 0;
    while start < value.len() && (value[start] <= 32 || value[start] >= 127) {
        start += 1;
    }
    &value[start..]
}

/// A comment is dangerous if it carries a backtick (a common quote-breaking
/// trick in comment-adjacent injections), opens with IE's conditional-
/// comment syntax (`[if ...]`, which executes the contained markup in
/// vulnerable versions rather than treating it as inert text), opens with
/// `xml` (case-insensitive, an XML processing-instruction-like prefix), or
/// opens with `IMPORT`/`ENTITY` (external-entity and CSS `@import`-style
/// injection markers), both checked case-insensitively over the first six
/// bytes.
fn is_dangerous_comment(value: &[u8]) -> bool {
    if value.contains(&b'`') {
        return true;
    }
    if starts_with_ignore_case(value, b"[if") {
        return true;
    }
    if starts_with_ignore_case(value, b"xml") {
        return true;
    }
    let head = &value[..value.len().min(6)];
    head.eq_ignore_ascii_case(b"IMPORT") || head.eq_ignore_ascii_case(b"ENTITY")
}

/// Compares a known blacklist entry against a token value case-insensitively,
/// skipping any NUL byte *anywhere* in the haystack rather than stopping at
/// the first one — a NUL inserted mid-name (`scr\0ipt`) is how the tag/event
/// blacklists get bypassed otherwise, since the HTML5 tokenizer treats NUL as
/// ignorable inside a name. Only `needle` needs to be fully consumed; trailing
/// haystack bytes past that point don't affect the match.
fn cstrcasecmp_with_null(needle: &str, haystack: &[u8]) -> bool {
    let needle = needle.as_bytes();
    let mut ni = 0;
    let mut hi = 0;

    while ni < needle.len() && hi < haystack.len() {
        if haystack[hi] == 0 {
            hi += 1;
            continue;
        }
        if !haystack[hi].eq_ignore_ascii_case(&needle[ni]) {
            return false;
        }
        ni += 1;
        hi += 1;
    }

    ni == needle.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_script_tag() {
        assert!(XssDetector::new().detect(b"<script>alert(1)</script>").is_injection());
    }

    #[test]
    fn does_not_flag_plain_paragraph() {
        assert!(!XssDetector::new().detect(b"<p>hello</p>").is_injection());
    }

    #[test]
    fn flags_event_handler_attribute() {
        assert!(XssDetector::new().detect(b"<img src=x onerror=alert(1)>").is_injection());
    }

    #[test]
    fn flags_javascript_url() {
        assert!(XssDetector::new().detect(b"<a href=\"javascript:alert(1)\">x</a>").is_injection());
    }

    #[test]
    fn flags_conditional_comment() {
        assert!(XssDetector::new().detect(b"<!--[if IE]><script>alert(1)</script><![endif]-->").is_injection());
    }

    #[test]
    fn flags_nul_obfuscated_tag_name() {
        assert!(XssDetector::new().detect(b"<\0script>alert(1)</script>").is_injection());
    }

    #[test]
    fn flags_nul_obfuscated_event_handler() {
        assert!(XssDetector::new().detect(b"<img src=x on\0error=alert(1)>").is_injection());
    }

    #[test]
    fn cstrcasecmp_skips_embedded_nul() {
        assert!(cstrcasecmp_with_null("script", b"scr\0ipt"));
        assert!(!cstrcasecmp_with_null("script", b"scr\0ipz"));
    }
}
