//! Streaming HTML5-subset tokenizer.
//!
//! This is not a conformant HTML5 tokenizer: it implements just enough of
//! the spec's state machine to recognize tag names, attribute names and
//! values, comments, and doctypes, which is all the classifier in
//! [`super::detector`] needs to decide whether a reflected value breaks out
//! into a dangerous HTML context.

use bitflags::bitflags;

bitflags! {
    /// The HTML context a value is assumed to start inside. A reflected
    /// value rarely carries its surrounding markup with it, so the detector
    /// tries every starting context in turn.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Html5Flags: u32 {
        const DATA_STATE         = 0b0000_0001;
        const VALUE_NO_QUOTE     = 0b0000_0010;
        const VALUE_SINGLE_QUOTE = 0b0000_0100;
        const VALUE_DOUBLE_QUOTE = 0b0000_1000;
        const VALUE_BACK_QUOTE   = 0b0001_0000;
    }
}

impl Html5Flags {
    pub const ALL_STARTING_CONTEXTS: [Html5Flags; 5] = [
        Html5Flags::DATA_STATE,
        Html5Flags::VALUE_NO_QUOTE,
        Html5Flags::VALUE_SINGLE_QUOTE,
        Html5Flags::VALUE_DOUBLE_QUOTE,
        Html5Flags::VALUE_BACK_QUOTE,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    DataText,
    TagNameOpen,
    TagNameClose,
    TagNameSelfClose,
    TagData,
    TagClose,
    AttrName,
    AttrValue,
    TagComment,
    Doctype,
}

/// One emitted token: its kind, and the byte span in the original input it
/// was taken from.
#[derive(Debug, Clone, Copy)]
pub struct Html5Token {
    pub token_type: TokenType,
    pub pos: usize,
    pub len: usize,
}

impl Html5Token {
    pub fn value<'a>(&self, input: &'a [u8]) -> &'a [u8] {
        &input[self.pos..self.pos + self.len]
    }
}

type StateFn = fn(&mut Html5State) -> Option<Html5Token>;

/// Drives the tokenizer one token at a time. `pos` is the cursor into
/// `input`; `state` is the state function to call on the next `next()`.
pub struct Html5State<'a> {
    input: &'a [u8],
    pos: usize,
    state: StateFn,
    in_tag_close: bool,
    quote_attr: u8,
}

impl<'a> Html5State<'a> {
    pub fn new(input: &'a [u8], flags: Html5Flags) -> Self {
        // `VALUE_NO_QUOTE` models a value reflected into an unquoted
        // attribute position: the attacker-controlled bytes themselves
        // start a fresh `name=value` pair, so parsing begins in
        // `BEFORE_ATTR_NAME` rather than mid attribute-value. The quoted
        // contexts below model breaking out of an *already-quoted* value,
        // so they start past the opening quote, mid attribute-value.
        let state: StateFn = if flags.contains(Html5Flags::VALUE_NO_QUOTE) {
            Self::state_before_attribute_name
        } else if flags.contains(Html5Flags::VALUE_SINGLE_QUOTE) {
            Self::state_attribute_value_single
        } else if flags.contains(Html5Flags::VALUE_DOUBLE_QUOTE) {
            Self::state_attribute_value_double
        } else if flags.contains(Html5Flags::VALUE_BACK_QUOTE) {
            Self::state_attribute_value_back_quote
        } else {
            Self::state_data
        };

        Self {
            input,
            pos: 0,
            state,
            in_tag_close: false,
            quote_attr: 0,
        }
    }

    pub fn next(&mut self) -> Option<Html5Token> {
        loop {
            if self.pos >= self.input.len() {
                return self.state_eof();
            }
            let f = self.state;
            if let Some(tok) = f(self) {
                return Some(tok);
            }
            if self.pos >= self.input.len() {
                return self.state_eof();
            }
        }
    }

    fn byte_at(&self, pos: usize) -> i32 {
        if pos < self.input.len() {
            self.input[pos] as i32
        } else {
            -1
        }
    }

    fn find_byte(&self, needle: u8, from: usize) -> Option<usize> {
        find_byte(self.input, needle, from)
    }

    fn h5_skip_white(&self, from: usize) -> usize {
        let mut pos = from;
        while pos < self.input.len() && is_whitespace(self.input[pos]) {
            pos += 1;
        }
        pos
    }

    fn state_eof(&mut self) -> Option<Html5Token> {
        None
    }

    fn state_data(&mut self) -> Option<Html5Token> {
        let start = self.pos;
        match self.find_byte(b'<', start) {
            Some(lt) => {
                if lt > start {
                    self.pos = lt;
                    return Some(Html5Token { token_type: TokenType::DataText, pos: start, len: lt - start });
                }
                self.pos = lt + 1;
                self.state = Self::state_tag_open;
                None
            }
            None => {
                self.pos = self.input.len();
                if self.pos > start {
                    Some(Html5Token { token_type: TokenType::DataText, pos: start, len: self.pos - start })
                } else {
                    None
                }
            }
        }
    }

    fn state_tag_open(&mut self) -> Option<Html5Token> {
        let c = self.byte_at(self.pos);
        if c == b'/' as i32 {
            self.pos += 1;
            self.state = Self::state_end_tag_open;
            None
        } else if c == b'!' as i32 {
            self.pos += 1;
            self.state = Self::state_markup_declaration_open;
            None
        } else if c == b'?' as i32 {
            self.state = Self::state_bogus_comment;
            None
        } else if c == b'%' as i32 {
            self.state = Self::state_bogus_comment2;
            None
        } else if is_alphabetic_c_style(c) || c == 0 {
            // IE-ism: a NUL right after `<` still opens a tag name.
            self.in_tag_close = false;
            self.state = Self::state_tag_name;
            None
        } else {
            // Not a tag after all — emit the `<` already consumed by
            // `state_data` as its own text token before falling back.
            self.state = Self::state_data;
            Some(Html5Token { token_type: TokenType::DataText, pos: self.pos - 1, len: 1 })
        }
    }

    fn state_end_tag_open(&mut self) -> Option<Html5Token> {
        let c = self.byte_at(self.pos);
        if is_alphabetic_c_style(c) {
            self.in_tag_close = true;
            self.state = Self::state_tag_name_close;
            None
        } else {
            self.state = Self::state_bogus_comment;
            None
        }
    }

    fn state_tag_name(&mut self) -> Option<Html5Token> {
        let start = self.pos;
        let mut pos = start;
        while pos < self.input.len() {
            let b = self.input[pos];
            // IE-ism: NUL bytes inside a tag name are skipped, not boundaries.
            if b != 0 && is_tag_name_boundary(b) {
                break;
            }
            pos += 1;
        }
        self.pos = pos;
        self.state = Self::state_before_attribute_name;

        if pos < self.input.len() && self.input[pos] == b'/' {
            self.pos += 1;
            self.state = Self::state_self_closing_start_tag;
            return Some(Html5Token { token_type: TokenType::TagNameSelfClose, pos: start, len: pos - start });
        }

        Some(Html5Token { token_type: TokenType::TagNameOpen, pos: start, len: pos - start })
    }

    fn state_tag_name_close(&mut self) -> Option<Html5Token> {
        let start = self.pos;
        let mut pos = start;
        while pos < self.input.len() && !is_tag_name_boundary(self.input[pos]) {
            pos += 1;
        }
        self.pos = pos;
        self.state = Self::state_emit_tag_close_char;
        Some(Html5Token { token_type: TokenType::TagNameClose, pos: start, len: pos - start })
    }

    fn state_emit_tag_close_char(&mut self) -> Option<Html5Token> {
        let pos = self.h5_skip_white(self.pos);
        let close = self.find_byte(b'>', pos).unwrap_or(self.input.len());
        self.pos = if close < self.input.len() { close + 1 } else { close };
        self.state = Self::state_data;
        Some(Html5Token { token_type: TokenType::TagClose, pos, len: close.saturating_sub(pos) })
    }

    fn state_self_closing_start_tag(&mut self) -> Option<Html5Token> {
        let c = self.byte_at(self.pos);
        if c == b'>' as i32 {
            self.pos += 1;
        }
        self.state = Self::state_data;
        None
    }

    fn state_before_attribute_name(&mut self) -> Option<Html5Token> {
        let pos = self.h5_skip_white(self.pos);
        self.pos = pos;

        let c = self.byte_at(pos);
        if c == b'>' as i32 {
            self.pos += 1;
            self.state = Self::state_data;
            None
        } else if c == b'/' as i32 {
            self.pos += 1;
            self.state = Self::state_self_closing_start_tag;
            None
        } else if c < 0 {
            self.state = Self::state_data;
            None
        } else {
            self.state = Self::state_attribute_name;
            None
        }
    }

    fn state_attribute_name(&mut self) -> Option<Html5Token> {
        let start = self.pos;
        let mut pos = start;
        while pos < self.input.len() && !is_attr_name_boundary(self.input[pos]) {
            pos += 1;
        }
        self.pos = pos;
        self.state = Self::state_after_attribute_name;
        Some(Html5Token { token_type: TokenType::AttrName, pos: start, len: pos - start })
    }

    fn state_after_attribute_name(&mut self) -> Option<Html5Token> {
        let pos = self.h5_skip_white(self.pos);
        self.pos = pos;

        let c = self.byte_at(pos);
        if c == b'=' as i32 {
            self.pos += 1;
            self.state = Self::state_before_attribute_value;
            None
        } else {
            self.state = Self::state_before_attribute_name;
            None
        }
    }

    fn state_before_attribute_value(&mut self) -> Option<Html5Token> {
        let pos = self.h5_skip_white(self.pos);
        self.pos = pos;

        match self.byte_at(pos) {
            c if c == b'"' as i32 => {
                self.pos += 1;
                self.state = Self::state_attribute_value_double;
                None
            }
            c if c == b'\'' as i32 => {
                self.pos += 1;
                self.state = Self::state_attribute_value_single;
                None
            }
            c if c == b'`' as i32 => {
                self.pos += 1;
                self.state = Self::state_attribute_value_back_quote;
                None
            }
            _ => {
                self.state = Self::state_attribute_value_no_quote;
                None
            }
        }
    }

    fn state_attribute_value_quoted(&mut self, quote: u8) -> Option<Html5Token> {
        let start = self.pos;
        match self.find_byte(quote, start) {
            Some(end) => {
                self.pos = end + 1;
                self.state = Self::state_after_attribute_value_quoted;
                Some(Html5Token { token_type: TokenType::AttrValue, pos: start, len: end - start })
            }
            None => {
                let end = self.input.len();
                self.pos = end;
                self.state = Self::state_data;
                if end > start {
                    Some(Html5Token { token_type: TokenType::AttrValue, pos: start, len: end - start })
                } else {
                    None
                }
            }
        }
    }

    fn state_attribute_value_double(&mut self) -> Option<Html5Token> {
        self.quote_attr = b'"';
        self.state_attribute_value_quoted(b'"')
    }

    fn state_attribute_value_single(&mut self) -> Option<Html5Token> {
        self.quote_attr = b'\'';
        self.state_attribute_value_quoted(b'\'')
    }

    fn state_attribute_value_back_quote(&mut self) -> Option<Html5Token> {
        self.quote_attr = b'`';
        self.state_attribute_value_quoted(b'`')
    }

    fn state_attribute_value_no_quote(&mut self) -> Option<Html5Token> {
        let start = self.pos;
        let mut pos = start;
        while pos < self.input.len() && !is_whitespace(self.input[pos]) && self.input[pos] != b'>' {
            pos += 1;
        }
        self.pos = pos;
        self.state = Self::state_before_attribute_name;

        if pos > start {
            Some(Html5Token { token_type: TokenType::AttrValue, pos: start, len: pos - start })
        } else {
            None
        }
    }

    fn state_after_attribute_value_quoted(&mut self) -> Option<Html5Token> {
        self.state = Self::state_before_attribute_name;
        None
    }

    fn state_markup_declaration_open(&mut self) -> Option<Html5Token> {
        let rest = &self.input[self.pos..];
        if rest.len() >= 2 && rest[0] == b'-' && rest[1] == b'-' {
            self.pos += 2;
            self.state = Self::state_comment;
            None
        } else if rest.len() >= 7 && rest[..7].eq_ignore_ascii_case(b"DOCTYPE") {
            self.pos += 7;
            self.state = Self::state_doctype;
            None
        } else if rest.len() >= 7 && &rest[..7] == b"[CDATA[" {
            self.pos += 7;
            self.state = Self::state_cdata;
            None
        } else {
            self.state = Self::state_bogus_comment;
            None
        }
    }

    fn state_doctype(&mut self) -> Option<Html5Token> {
        let start = self.h5_skip_white(self.pos);
        let end = self.find_byte(b'>', start).unwrap_or(self.input.len());
        self.pos = if end < self.input.len() { end + 1 } else { end };
        self.state = Self::state_data;
        Some(Html5Token { token_type: TokenType::Doctype, pos: start, len: end.saturating_sub(start) })
    }

    /// Runs to the next bare `>`, as for `<? ... >` and the `MARKUP_DECL_OPEN`
    /// fallback.
    fn state_bogus_comment(&mut self) -> Option<Html5Token> {
        let start = self.pos;
        let end = self.find_byte(b'>', start).unwrap_or(self.input.len());
        self.pos = if end < self.input.len() { end + 1 } else { end };
        self.state = Self::state_data;
        Some(Html5Token { token_type: TokenType::TagComment, pos: start, len: end.saturating_sub(start) })
    }

    /// Runs to the next `%>`, as for ASP-style `<% ... %>` blocks.
    fn state_bogus_comment2(&mut self) -> Option<Html5Token> {
        let start = self.pos;
        let mut pos = start;
        let end = loop {
            match self.find_byte(b'%', pos) {
                Some(p) if p + 1 < self.input.len() && self.input[p + 1] == b'>' => break p,
                Some(p) => pos = p + 1,
                None => break self.input.len(),
            }
        };
        self.pos = if end < self.input.len() { end + 2 } else { end };
        self.state = Self::state_data;
        Some(Html5Token { token_type: TokenType::TagComment, pos: start, len: end.saturating_sub(start) })
    }

    fn state_comment(&mut self) -> Option<Html5Token> {
        let start = self.pos;
        let end = find_comment_end(self.input, start);
        self.pos = end.end;
        self.state = Self::state_data;
        Some(Html5Token { token_type: TokenType::TagComment, pos: start, len: end.content_len })
    }

    fn state_cdata(&mut self) -> Option<Html5Token> {
        let start = self.pos;
        let end = find_cdata_end(self.input, start);
        self.pos = end.end;
        self.state = Self::state_data;
        Some(Html5Token { token_type: TokenType::TagComment, pos: start, len: end.content_len })
    }
}

struct CommentEnd {
    content_len: usize,
    end: usize,
}

/// Internet Explorer historically allowed a NUL byte inside the `-->`
/// sequence closing a comment and still treated it as closed; this scan
/// tolerates that shape so a NUL-spliced comment terminator is not missed.
fn find_comment_end(input: &[u8], start: usize) -> CommentEnd {
    let mut pos = start;
    while pos + 2 < input.len() {
        if input[pos] == b'-' && input[pos + 1] == b'-' {
            let mut close = pos + 2;
            while close < input.len() && input[close] == 0 {
                close += 1;
            }
            if close < input.len() && input[close] == b'>' {
                return CommentEnd { content_len: pos - start, end: close + 1 };
            }
        }
        pos += 1;
    }
    CommentEnd { content_len: input.len() - start, end: input.len() }
}

fn find_cdata_end(input: &[u8], start: usize) -> CommentEnd {
    let mut pos = start;
    while pos + 2 < input.len() {
        if input[pos] == b']' && input[pos + 1] == b']' && input[pos + 2] == b'>' {
            return CommentEnd { content_len: pos - start, end: pos + 3 };
        }
        pos += 1;
    }
    CommentEnd { content_len: input.len() - start, end: input.len() }
}

fn find_byte(input: &[u8], needle: u8, from: usize) -> Option<usize> {
    if from >= input.len() {
        return None;
    }
    input[from..].iter().position(|&b| b == needle).map(|i| i + from)
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\x0B' | 0x0C | b'\r' | 0)
}

/// Matches the signed `char` comparison the tag/attribute boundary checks
/// rely on: bytes `>= 0x80` are never treated as ASCII letters here.
fn is_alphabetic_c_style(c: i32) -> bool {
    (0x41..=0x5A).contains(&c) || (0x61..=0x7A).contains(&c)
}

fn is_tag_name_boundary(b: u8) -> bool {
    is_whitespace(b) || b == b'>' || b == b'/'
}

fn is_attr_name_boundary(b: u8) -> bool {
    is_whitespace(b) || b == b'>' || b == b'='
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(input: &[u8], flags: Html5Flags) -> Vec<(TokenType, String)> {
        let mut state = Html5State::new(input, flags);
        let mut out = Vec::new();
        while let Some(tok) = state.next() {
            let val = String::from_utf8_lossy(tok.value(input)).into_owned();
            out.push((tok.token_type, val));
        }
        out
    }

    #[test]
    fn tokenizes_simple_tag() {
        let toks = collect(b"<script>alert(1)</script>", Html5Flags::DATA_STATE);
        assert!(toks.iter().any(|(t, v)| *t == TokenType::TagNameOpen && v == "script"));
        assert!(toks.iter().any(|(t, v)| *t == TokenType::TagNameClose && v == "script"));
    }

    #[test]
    fn tokenizes_attribute_name_and_value() {
        let toks = collect(b"<img src=x onerror=alert(1)>", Html5Flags::DATA_STATE);
        assert!(toks.iter().any(|(t, v)| *t == TokenType::AttrName && v == "onerror"));
    }

    #[test]
    fn tokenizes_comment() {
        let toks = collect(b"<!-- hi -->", Html5Flags::DATA_STATE);
        assert!(toks.iter().any(|(t, _)| *t == TokenType::TagComment));
    }

    #[test]
    fn tokenizes_doctype() {
        let toks = collect(b"<!DOCTYPE html>", Html5Flags::DATA_STATE);
        assert!(toks.iter().any(|(t, _)| *t == TokenType::Doctype));
    }

    #[test]
    fn double_quoted_value_context_stops_at_quote() {
        let toks = collect(b"onerror=alert(1)\" foo=bar", Html5Flags::VALUE_DOUBLE_QUOTE);
        assert!(toks.iter().any(|(t, v)| *t == TokenType::AttrValue && v == "onerror=alert(1)"));
    }

    #[test]
    fn question_mark_bogus_comment_stops_at_bare_gt() {
        let toks = collect(b"<?xml version=\"1.0\"?><p>after</p>", Html5Flags::DATA_STATE);
        assert!(toks.iter().any(|(t, v)| *t == TokenType::TagComment && v.contains("xml")));
        assert!(toks.iter().any(|(t, v)| *t == TokenType::TagNameOpen && v == "p"));
    }

    #[test]
    fn percent_bogus_comment_stops_at_percent_gt() {
        let toks = collect(b"<% asp code %><p>after</p>", Html5Flags::DATA_STATE);
        assert!(toks.iter().any(|(t, v)| *t == TokenType::TagComment && v.contains("asp code")));
        assert!(toks.iter().any(|(t, v)| *t == TokenType::TagNameOpen && v == "p"));
    }

    #[test]
    fn html_whitespace_includes_vertical_tab_and_nul() {
        assert!(is_whitespace(b'\x0B'));
        assert!(is_whitespace(0));
    }

    #[test]
    fn nul_after_lt_still_opens_a_tag_name() {
        let toks = collect(b"<\0script>alert(1)</script>", Html5Flags::DATA_STATE);
        assert!(toks.iter().any(|(t, v)| *t == TokenType::TagNameOpen && v.contains("script")));
    }

    #[test]
    fn invalid_byte_after_lt_emits_the_lt_as_data_text() {
        let toks = collect(b"< foo", Html5Flags::DATA_STATE);
        assert!(toks.iter().any(|(t, v)| *t == TokenType::DataText && v == "<"));
    }
}
