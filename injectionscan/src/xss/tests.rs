//! End-to-end scenarios exercising [`super::XssDetector`] across the full
//! starting-context sweep rather than a single tokenizer state.

use super::detector::XssDetector;

fn is_xss(input: &[u8]) -> bool {
    XssDetector::new().detect(input).is_injection()
}

#[test]
fn test_safe_input() {
    assert!(!is_xss(b"hello world"));
    assert!(!is_xss(b"<p>this is a paragraph</p>"));
    assert!(!is_xss(b"user@example.com"));
    assert!(!is_xss(b""));
}

#[test]
fn test_script_tag() {
    assert!(is_xss(b"<script>alert(1)</script>"));
    assert!(is_xss(b"<SCRIPT>alert(1)</SCRIPT>"));
    assert!(is_xss(b"<script src=evil.js></script>"));
}

#[test]
fn test_event_handlers() {
    assert!(is_xss(b"<img src=x onerror=alert(1)>"));
    assert!(is_xss(b"<body onload=alert(1)>"));
    assert!(is_xss(b"<div onclick=\"alert(1)\">click me</div>"));
}

#[test]
fn test_dangerous_urls() {
    assert!(is_xss(b"<a href=\"javascript:alert(1)\">click</a>"));
    assert!(is_xss(b"<iframe src=\"data:text/html,<script>alert(1)</script>\">"));
    assert!(is_xss(b"<a href=\"vbscript:msgbox(1)\">click</a>"));
}

#[test]
fn test_style_attribute() {
    assert!(is_xss(b"<div style=\"background:url(javascript:alert(1))\">x</div>"));
}

#[test]
fn test_dangerous_tags() {
    assert!(is_xss(b"<iframe src=evil.html></iframe>"));
    assert!(is_xss(b"<object data=evil.swf></object>"));
    assert!(is_xss(b"<embed src=evil.swf>"));
    assert!(is_xss(b"<applet code=Evil.class></applet>"));
}

#[test]
fn test_svg_tags() {
    assert!(is_xss(b"<svg onload=alert(1)>"));
}

#[test]
fn test_comments() {
    assert!(is_xss(b"<!--[if IE]><script>alert(1)</script><![endif]-->"));
    assert!(!is_xss(b"<!-- just a harmless comment -->"));
}

#[test]
fn test_doctype() {
    assert!(is_xss(b"<!DOCTYPE html>"));
}

#[test]
fn test_empty_input() {
    assert!(!is_xss(b""));
}

#[test]
fn test_multiple_contexts() {
    assert!(is_xss(b"\" onmouseover=\"alert(1)"));
    assert!(is_xss(b"' onmouseover='alert(1)"));
    assert!(is_xss(b"onmouseover=alert(1)"));
}
