//! Static tables the XSS classifier checks tag names, attribute names,
//! attribute values, and comments against.

/// Which kind of attribute an `AttrName` token named, tracked so the
/// following `AttrValue` token can be judged against the right rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    None,
    Black,
    Style,
    Url,
    /// `attributename`-style legacy indirection: the *value* names another
    /// attribute, so the value itself gets reclassified as if it were an
    /// attribute name.
    Indirect,
}

/// DOM event-handler attributes (`onclick`, `onerror`, ...), sorted so they
/// could be binary-searched; checked with a linear scan here since the
/// table is short enough that the branch predictor wins.
pub(crate) const BLACK_ATTR_EVENTS: &[&str] = &[
    "onabort", "onactivate", "onafterprint", "onafterscriptexecute", "onafterupdate",
    "onanimationcancel", "onanimationend", "onanimationiteration", "onanimationstart",
    "onbeforeactivate", "onbeforecopy", "onbeforecut", "onbeforedeactivate",
    "onbeforeeditfocus", "onbeforepaste", "onbeforeprint", "onbeforescriptexecute",
    "onbeforeunload", "onbeforeupdate", "onbegin", "onblur", "onbounce", "oncanplay",
    "oncanplaythrough", "oncellchange", "onchange", "onclick", "oncontextmenu",
    "oncontrolselect", "oncopy", "oncuechange", "oncut", "ondataavailable",
    "ondatasetchanged", "ondatasetcomplete", "ondblclick", "ondeactivate", "ondrag",
    "ondragend", "ondragenter", "ondragleave", "ondragover", "ondragstart", "ondrop",
    "ondurationchange", "onemptied", "onend", "onended", "onerror", "onerrorupdate",
    "onfilterchange", "onfinish", "onfocus", "onfocusin", "onfocusout", "onformchange",
    "onforminput", "onhashchange", "onhelp", "oninput", "oninvalid", "onkeydown",
    "onkeypress", "onkeyup", "onlayoutcomplete", "onload", "onloadeddata",
    "onloadedmetadata", "onloadstart", "onlosecapture", "onmediacomplete",
    "onmediaerror", "onmessage", "onmousedown", "onmouseenter", "onmouseleave",
    "onmousemove", "onmouseout", "onmouseover", "onmouseup", "onmousewheel", "onmove",
    "onmoveend", "onmovestart", "onoffline", "ononline", "onoutofsync", "onpage",
    "onpaste", "onpause", "onplay", "onplaying", "onpopstate", "onprogress",
    "onpropertychange", "onratechange", "onreadystatechange", "onredo", "onrepeat",
    "onreset", "onresize", "onresizeend", "onresizestart", "onresume", "onreverse",
    "onrowdelete", "onrowenter", "onrowexit", "onrowinserted", "onrowsdelete",
    "onrowsinserted", "onscroll", "onsearch", "onseek", "onseeked", "onseeking",
    "onselect", "onselectionchange", "onselectstart", "onshow", "onstart", "onstop",
    "onstorage", "onsubmit", "onsuspend", "onsynchrestored", "ontimeerror",
    "ontimeupdate", "ontoggle", "ontrackchange", "ontransitioncancel",
    "ontransitionend", "ontransitionrun", "ontransitionstart", "onunload",
    "onurlflip", "onvolumechange", "onwaiting", "onwheel",
];

/// Non-event attributes that are dangerous purely by existing (`style`,
/// `background`, ...).
pub(crate) const BLACK_ATTRS: &[&str] = &[
    "background", "dynsrc", "formaction", "href", "lowsrc", "poster", "src", "style",
    "xlink:href", "action", "data", "codebase", "classid", "srcdoc", "ping", "usemap",
    "manifest", "profile", "cite", "longdesc", "by", "folder", "from", "handler", "to",
    "values",
];

/// Tag names that are dangerous regardless of attributes.
pub(crate) const BLACK_TAGS: &[&str] = &[
    "applet", "audio", "base", "embed", "frame", "frameset", "iframe", "import",
    "isindex", "link", "meta", "object", "script", "style", "svg", "video", "xml",
    "math", "template", "form", "comment", "handler", "listener", "noscript",
    "vmlframe", "xss",
];

/// URL schemes that execute rather than navigate. No trailing `:` — `JAVA`
/// is a deliberately short prefix so it also catches `JAVASCRIPT`.
pub(crate) const BLACK_URL_PROTOCOLS: &[&str] = &["DATA", "VIEW-SOURCE", "VBSCRIPT", "JAVA"];

pub(crate) const HEX_DECODE_MAP: [i32; 256] = build_hex_decode_map();

const fn build_hex_decode_map() -> [i32; 256] {
    let mut map = [-1i32; 256];
    let mut i = 0u8;
    while i < 10 {
        map[(b'0' + i) as usize] = i as i32;
        i += 1;
    }
    let mut i = 0u8;
    while i < 6 {
        map[(b'a' + i) as usize] = 10 + i as i32;
        map[(b'A' + i) as usize] = 10 + i as i32;
        i += 1;
    }
    map
}

pub(crate) struct DecodedChar {
    pub value: u32,
    pub consumed: usize,
}

/// Decodes one HTML character reference (`&#123;`, `&#x7B;`) starting at
/// `pos`, which must point at the leading `&`. Returns `None` if `pos`
/// isn't an entity. Numeric values are capped at `0x1000FF` since nothing
/// past that range matters for the ASCII comparisons callers make with the
/// result, and capping avoids `u32` overflow on pathologically long digit
/// runs.
pub(crate) fn html_decode_char_at(input: &[u8], pos: usize) -> Option<DecodedChar> {
    const OVERFLOW_CAP: u32 = 0x1000FF;

    if pos >= input.len() || input[pos] != b'&' {
        return None;
    }
    if pos + 1 >= input.len() || input[pos + 1] != b'#' {
        return None;
    }

    let mut idx = pos + 2;
    let hex = idx < input.len() && (input[idx] == b'x' || input[idx] == b'X');
    if hex {
        idx += 1;
    }

    let digits_start = idx;
    let mut value: u32 = 0;
    while idx < input.len() {
        let b = input[idx];
        if hex {
            let d = HEX_DECODE_MAP[b as usize];
            if d < 0 {
                break;
            }
            value = (value.saturating_mul(16)).saturating_add(d as u32).min(OVERFLOW_CAP);
        } else {
            if !b.is_ascii_digit() {
                break;
            }
            value = (value.saturating_mul(10)).saturating_add((b - b'0') as u32).min(OVERFLOW_CAP);
        }
        idx += 1;
    }

    if idx == digits_start {
        return None;
    }

    if idx < input.len() && input[idx] == b';' {
        idx += 1;
    }

    Some(DecodedChar { value, consumed: idx - pos })
}

/// Case-insensitive prefix match against `needle` that also skips NUL and
/// LF bytes in `haystack` and transparently decodes a leading HTML numeric
/// entity into the character it would render as, before comparing. This is
/// what lets `j&#x61;vascript:` and `j\x00avascript:` both match
/// `javascript:`.
pub(crate) fn htmlencode_startswith(needle: &str, haystack: &[u8]) -> bool {
    let needle = needle.as_bytes();
    let mut ni = 0;
    let mut hi = 0;

    while ni < needle.len() {
        if hi >= haystack.len() {
            return false;
        }

        if haystack[hi] == 0 || haystack[hi] == b'\n' {
            hi += 1;
            continue;
        }

        if haystack[hi] == b'&' {
            if let Some(decoded) = html_decode_char_at(haystack, hi) {
                if decoded.value <= 0xFF && (decoded.value as u8).eq_ignore_ascii_case(&needle[ni]) {
                    ni += 1;
                    hi += decoded.consumed;
                    continue;
                }
                return false;
            }
        }

        if !haystack[hi].eq_ignore_ascii_case(&needle[ni]) {
            return false;
        }
        ni += 1;
        hi += 1;
    }

    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn decodes_decimal_entity() {
        let d = html_decode_char_at(b"&#97;x", 0).unwrap();
        assert_eq!(d.value, b'a' as u32);
        assert_eq!(d.consumed, 5);
    }

    #[test]
    fn decodes_hex_entity() {
        let d = html_decode_char_at(b"&#x61;x", 0).unwrap();
        assert_eq!(d.value, b'a' as u32);
    }

    #[test]
    fn caps_overflowing_numeric_value() {
        let d = html_decode_char_at(b"&#99999999999;", 0).unwrap();
        assert_eq!(d.value, 0x1000FF);
    }

    #[test]
    fn not_an_entity_returns_none() {
        assert!(html_decode_char_at(b"plain text", 0).is_none());
    }

    #[test]
    fn prefix_match_is_case_insensitive() {
        assert!(htmlencode_startswith("javascript:", b"JavaScript:alert(1)"));
    }

    #[test]
    fn prefix_match_skips_null_bytes() {
        assert!(htmlencode_startswith("javascript:", b"j\0a\0vascript:alert(1)"));
    }

    #[test]
    fn prefix_match_decodes_entities() {
        assert!(htmlencode_startswith("javascript:", b"j&#x61;vascript:alert(1)"));
    }
}
