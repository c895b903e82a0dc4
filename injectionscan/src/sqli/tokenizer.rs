//! Byte-level SQL lexer producing one fixed-alphabet [`Token`] at a time.

use crate::sqli::{SqliFlags, keywords};

const TYPE_NONE: u8 = 0;
const TYPE_KEYWORD: u8 = b'k';
const TYPE_UNION: u8 = b'U';
const TYPE_GROUP: u8 = b'B';
const TYPE_EXPRESSION: u8 = b'E';
const TYPE_SQLTYPE: u8 = b't';
const TYPE_FUNCTION: u8 = b'f';
const TYPE_BAREWORD: u8 = b'n';
const TYPE_NUMBER: u8 = b'1';
const TYPE_VARIABLE: u8 = b'v';
const TYPE_STRING: u8 = b's';
const TYPE_OPERATOR: u8 = b'o';
const TYPE_LOGIC_OPERATOR: u8 = b'&';
const TYPE_COMMENT: u8 = b'c';
const TYPE_COLLATE: u8 = b'A';
const TYPE_LEFTPARENS: u8 = b'(';
const TYPE_RIGHTPARENS: u8 = b')';
const TYPE_LEFTBRACE: u8 = b'{';
const TYPE_RIGHTBRACE: u8 = b'}';
const TYPE_DOT: u8 = b'.';
const TYPE_COMMA: u8 = b',';
const TYPE_COLON: u8 = b':';
const TYPE_SEMICOLON: u8 = b';';
const TYPE_TSQL: u8 = b'T';
const TYPE_UNKNOWN: u8 = b'?';
const TYPE_EVIL: u8 = b'X';
const TYPE_FINGERPRINT: u8 = b'F';
const TYPE_BACKSLASH: u8 = b'\\';

pub(crate) const CHAR_NULL: u8 = b'\0';
const CHAR_SINGLE: u8 = b'\'';
const CHAR_DOUBLE: u8 = b'"';
const CHAR_TICK: u8 = b'`';

const LIBINJECTION_SQLI_TOKEN_SIZE: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    None,
    Keyword,
    Union,
    Group,
    Expression,
    SqlType,
    Function,
    Bareword,
    Number,
    Variable,
    String,
    Operator,
    LogicOperator,
    Comment,
    Collate,
    LeftParenthesis,
    RightParenthesis,
    LeftBrace,
    RightBrace,
    Dot,
    Comma,
    Colon,
    Semicolon,
    Tsql,
    Unknown,
    Evil,
    Fingerprint,
    Backslash,
}

/// One lexical unit of SQL input. Fixed capacity: no heap allocation per
/// token. `val` holds up to 31 bytes of the token's own text plus a NUL
/// terminator; longer tokens are truncated for storage but `pos`/`len`
/// still describe their true span in the original input.
#[derive(Debug, Clone)]
pub struct Token {
    pub token_type: TokenType,
    pub pos: usize,
    pub len: usize,
    pub val: [u8; 32],
    pub str_open: u8,
    pub str_close: u8,
    pub count: i32,
}

impl Default for Token {
    fn default() -> Self {
        Self::new()
    }
}

impl Token {
    pub fn new() -> Self {
        Self {
            token_type: TokenType::None,
            pos: 0,
            len: 0,
            val: [0; 32],
            str_open: CHAR_NULL,
            str_close: CHAR_NULL,
            count: 0,
        }
    }

    pub fn value_as_str(&self) -> &str {
        let end = self.len.min(32);
        core::str::from_utf8(&self.val[..end]).unwrap_or("")
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    pub fn assign_char(&mut self, token_type: u8, pos: usize, value: u8) {
        self.token_type = byte_to_token_type(token_type);
        self.pos = pos;
        self.len = 1;
        self.val[0] = value;
        self.val[1] = CHAR_NULL;
        self.str_open = CHAR_NULL;
        self.str_close = CHAR_NULL;
        self.count = 0;
    }

    pub fn assign(&mut self, token_type: u8, pos: usize, len: usize, value: &[u8]) {
        let copy_len = len.min(LIBINJECTION_SQLI_TOKEN_SIZE - 1);
        self.token_type = byte_to_token_type(token_type);
        self.pos = pos;
        self.len = copy_len;

        self.val = [0; 32];
        for i in 0..copy_len {
            if i < value.len() {
                self.val[i] = value[i];
            }
        }
        self.val[copy_len] = CHAR_NULL;
        self.str_open = CHAR_NULL;
        self.str_close = CHAR_NULL;
        self.count = 0;
    }

    pub fn copy_from(&mut self, other: &Token) {
        *self = other.clone();
    }
}

fn byte_to_token_type(b: u8) -> TokenType {
    match b {
        TYPE_KEYWORD => TokenType::Keyword,
        TYPE_UNION => TokenType::Union,
        TYPE_GROUP => TokenType::Group,
        TYPE_EXPRESSION => TokenType::Expression,
        TYPE_SQLTYPE => TokenType::SqlType,
        TYPE_FUNCTION => TokenType::Function,
        TYPE_BAREWORD => TokenType::Bareword,
        TYPE_NUMBER => TokenType::Number,
        TYPE_VARIABLE => TokenType::Variable,
        TYPE_STRING => TokenType::String,
        TYPE_OPERATOR => TokenType::Operator,
        TYPE_LOGIC_OPERATOR => TokenType::LogicOperator,
        TYPE_COMMENT => TokenType::Comment,
        TYPE_COLLATE => TokenType::Collate,
        TYPE_LEFTPARENS => TokenType::LeftParenthesis,
        TYPE_RIGHTPARENS => TokenType::RightParenthesis,
        TYPE_LEFTBRACE => TokenType::LeftBrace,
        TYPE_RIGHTBRACE => TokenType::RightBrace,
        TYPE_DOT => TokenType::Dot,
        TYPE_COMMA => TokenType::Comma,
        TYPE_COLON => TokenType::Colon,
        TYPE_SEMICOLON => TokenType::Semicolon,
        TYPE_TSQL => TokenType::Tsql,
        TYPE_UNKNOWN => TokenType::Unknown,
        TYPE_EVIL => TokenType::Evil,
        TYPE_FINGERPRINT => TokenType::Fingerprint,
        TYPE_BACKSLASH => TokenType::Backslash,
        _ => TokenType::None,
    }
}

pub(crate) fn token_type_to_byte(t: TokenType) -> u8 {
    match t {
        TokenType::Keyword => TYPE_KEYWORD,
        TokenType::Union => TYPE_UNION,
        TokenType::Group => TYPE_GROUP,
        TokenType::Expression => TYPE_EXPRESSION,
        TokenType::SqlType => TYPE_SQLTYPE,
        TokenType::Function => TYPE_FUNCTION,
        TokenType::Bareword => TYPE_BAREWORD,
        TokenType::Number => TYPE_NUMBER,
        TokenType::Variable => TYPE_VARIABLE,
        TokenType::String => TYPE_STRING,
        TokenType::Operator => TYPE_OPERATOR,
        TokenType::LogicOperator => TYPE_LOGIC_OPERATOR,
        TokenType::Comment => TYPE_COMMENT,
        TokenType::Collate => TYPE_COLLATE,
        TokenType::LeftParenthesis => TYPE_LEFTPARENS,
        TokenType::RightParenthesis => TYPE_RIGHTPARENS,
        TokenType::LeftBrace => TYPE_LEFTBRACE,
        TokenType::RightBrace => TYPE_RIGHTBRACE,
        TokenType::Dot => TYPE_DOT,
        TokenType::Comma => TYPE_COMMA,
        TokenType::Colon => TYPE_COLON,
        TokenType::Semicolon => TYPE_SEMICOLON,
        TokenType::Tsql => TYPE_TSQL,
        TokenType::Unknown => TYPE_UNKNOWN,
        TokenType::Evil => TYPE_EVIL,
        TokenType::Fingerprint => TYPE_FINGERPRINT,
        TokenType::Backslash => TYPE_BACKSLASH,
        _ => TYPE_NONE,
    }
}

type LookupFn = dyn Fn(&str) -> TokenType;

pub struct SqliTokenizer<'a> {
    input: &'a [u8],
    flags: SqliFlags,
    pos: usize,
    current: Token,
    lookup_fn: Option<&'a LookupFn>,
    /// Whether the synthesized leading string token (see
    /// [`SqliTokenizer::next_token`]'s quote-context handling) has already
    /// been emitted.
    emitted_initial_quote: bool,
    pub stats_comment_c: i32,
    pub stats_comment_ddw: i32,
    pub stats_comment_ddx: i32,
    pub stats_comment_hash: i32,
}

impl<'a> SqliTokenizer<'a> {
    pub fn new(input: &'a [u8], flags: SqliFlags) -> Self {
        Self {
            input,
            flags,
            pos: 0,
            current: Token::new(),
            lookup_fn: None,
            emitted_initial_quote: false,
            stats_comment_c: 0,
            stats_comment_ddw: 0,
            stats_comment_ddx: 0,
            stats_comment_hash: 0,
        }
    }

    pub fn with_lookup_fn(mut self, lookup_fn: &'a LookupFn) -> Self {
        self.lookup_fn = Some(lookup_fn);
        self
    }

    fn lookup_word(&self, word: &str) -> TokenType {
        match self.lookup_fn {
            Some(lookup_fn) => lookup_fn(word),
            None => keywords::lookup_word(word),
        }
    }

    /// Pulls the next token from the input, or `None` at end of input.
    ///
    /// When the tokenizer is started in a quote context (`QUOTE_SINGLE` or
    /// `QUOTE_DOUBLE`), the very first call behaves as if the input were
    /// already the body of a string opened by that delimiter elsewhere —
    /// the common shape of a value that breaks out of an application's own
    /// quoting. That leading token is a `String` whose `str_open` stays
    /// `\0` (no real opening delimiter was consumed from this buffer) and
    /// whose `str_close` is the delimiter found, or `\0` if the context
    /// string runs to EOF unterminated.
    pub fn next_token(&mut self) -> Option<Token> {
        if self.input.is_empty() {
            return None;
        }

        if !self.emitted_initial_quote {
            self.emitted_initial_quote = true;
            let delim = self.flags.quote_context();
            if delim != CHAR_NULL {
                self.current.clear();
                self.pos = self.parse_string_core(self.pos, delim, 0);
                return Some(self.current.clone());
            }
        }

        if self.pos >= self.input.len() {
            return None;
        }

        self.current.clear();

        while self.pos < self.input.len() {
            let ch = self.input[self.pos];
            let new_pos = self.dispatch_char_parser(ch);
            self.pos = new_pos;

            if self.current.token_type != TokenType::None {
                return Some(self.current.clone());
            }
        }

        None
    }

    fn dispatch_char_parser(&mut self, ch: u8) -> usize {
        match ch {
            0..=32 | 160 | 240 => self.parse_white(),
            33 => self.parse_operator2(),  // !
            34 => self.parse_string(),     // "
            35 => self.parse_hash(),       // #
            36 => self.parse_money(),      // $
            37 => self.parse_operator1(),  // %
            38 => self.parse_operator2(),  // &
            39 => self.parse_string(),     // '
            40 => self.parse_char(),       // (
            41 => self.parse_char(),       // )
            42 => self.parse_operator2(),  // *
            43 => self.parse_operator1(),  // +
            44 => self.parse_char(),       // ,
            45 => self.parse_dash(),       // -
            46 => self.parse_number(),     // .
            47 => self.parse_slash(),      // /
            48..=57 => self.parse_number(),
            58 => self.parse_operator2(),  // :
            59 => self.parse_char(),       // ;
            60 => self.parse_operator2(),  // <
            61 => self.parse_operator2(),  // =
            62 => self.parse_operator2(),  // >
            63 => self.parse_other(),      // ?
            64 => self.parse_var(),        // @
            65 => self.parse_word(),       // A
            66 => self.parse_bstring(),    // B
            67..=68 => self.parse_word(),  // C-D
            69 => self.parse_estring(),    // E
            70..=77 => self.parse_word(),  // F-M
            78 => self.parse_nqstring(),   // N
            79..=80 => self.parse_word(),  // O-P
            81 => self.parse_qstring(),    // Q
            82..=84 => self.parse_word(),  // R-T
            85 => self.parse_ustring(),    // U
            86..=87 => self.parse_word(),  // V-W
            88 => self.parse_xstring(),    // X
            89..=90 => self.parse_word(),  // Y-Z
            91 => self.parse_bword(),      // [
            92 => self.parse_backslash(),  // \
            93 => self.parse_other(),      // ]
            94 => self.parse_operator1(),  // ^
            95 => self.parse_word(),       // _
            96 => self.parse_tick(),       // `
            97 => self.parse_word(),       // a
            98 => self.parse_bstring(),    // b
            99..=100 => self.parse_word(), // c-d
            101 => self.parse_estring(),   // e
            102..=109 => self.parse_word(),// f-m
            110 => self.parse_nqstring(),  // n
            111..=112 => self.parse_word(),// o-p
            113 => self.parse_qstring(),   // q
            114..=116 => self.parse_word(),// r-t
            117 => self.parse_ustring(),   // u
            118..=119 => self.parse_word(),// v-w
            120 => self.parse_xstring(),   // x
            121..=122 => self.parse_word(),// y-z
            123 => self.parse_char(),      // {
            124 => self.parse_operator2(), // |
            125 => self.parse_char(),      // }
            126 => self.parse_operator1(), // ~
            _ => self.parse_other(),
        }
    }

    fn parse_white(&mut self) -> usize {
        self.pos + 1
    }

    fn parse_operator1(&mut self) -> usize {
        let ch = self.input[self.pos];
        self.current.assign_char(TYPE_OPERATOR, self.pos, ch);
        self.pos + 1
    }

    /// A lone `:` that isn't half of a recognized two-char operator gets its
    /// own type (`Colon`), not `Operator` — matches `spec.md` §4.2 "`:` alone
    /// → colon". `::` itself is still the two-byte `Operator` below, same as
    /// every other recognized pair.
    fn parse_operator2(&mut self) -> usize {
        let pos = self.pos;
        let mut new_pos = pos + 1;

        if new_pos < self.input.len() {
            let ch = self.input[pos];
            let ch2 = self.input[new_pos];

            match (ch, ch2) {
                (b'!', b'=')
                | (b'<', b'=')
                | (b'>', b'=')
                | (b'<', b'>')
                | (b'=', b'=')
                | (b'&', b'&')
                | (b'|', b'|')
                | (b'!', b'!')
                | (b':', b':') => {
                    let op = [ch, ch2];
                    self.current.assign(TYPE_OPERATOR, pos, 2, &op);
                    new_pos += 1;
                }
                (b':', _) => {
                    self.current.assign_char(TYPE_COLON, pos, ch);
                }
                _ => {
                    self.current.assign_char(TYPE_OPERATOR, pos, ch);
                }
            }
        } else {
            let ch = self.input[pos];
            if ch == b':' {
                self.current.assign_char(TYPE_COLON, pos, ch);
            } else {
                self.current.assign_char(TYPE_OPERATOR, pos, ch);
            }
        }

        new_pos
    }

    fn parse_other(&mut self) -> usize {
        let ch = self.input[self.pos];
        self.current.assign_char(TYPE_UNKNOWN, self.pos, ch);
        self.pos + 1
    }

    fn parse_char(&mut self) -> usize {
        let ch = self.input[self.pos];
        self.current.assign_char(ch, self.pos, ch);
        self.pos + 1
    }

    fn parse_hash(&mut self) -> usize {
        self.stats_comment_hash += 1;
        if self.flags.is_mysql() {
            self.stats_comment_hash += 1;
            self.parse_eol_comment()
        } else {
            self.current.assign_char(TYPE_OPERATOR, self.pos, b'#');
            self.pos + 1
        }
    }

    fn parse_dash(&mut self) -> usize {
        let pos = self.pos;
        let slen = self.input.len();

        if pos + 1 < slen && self.input[pos + 1] == b'-' {
            if pos + 2 >= slen || self.is_white_char(self.input[pos + 2]) {
                self.stats_comment_ddw += 1;
                return self.parse_eol_comment();
            } else {
                self.stats_comment_ddx += 1;
                if self.flags.is_ansi() {
                    return self.parse_eol_comment();
                } else {
                    self.current.assign_char(TYPE_OPERATOR, pos, b'-');
                    return pos + 1;
                }
            }
        }

        self.current.assign_char(TYPE_OPERATOR, pos, b'-');
        pos + 1
    }

    fn parse_slash(&mut self) -> usize {
        let pos = self.pos;
        let slen = self.input.len();

        if pos + 1 < slen && self.input[pos + 1] == b'*' {
            self.stats_comment_c += 1;
            self.parse_c_comment()
        } else {
            self.current.assign_char(TYPE_OPERATOR, pos, b'/');
            pos + 1
        }
    }

    /// `\N` is MySQL's textual-NUL shorthand (the `NULL` a `LOAD DATA`
    /// file uses), so it lexes directly as a `Number`; any other byte
    /// after `\` carries no meaning of its own and is emitted bare.
    fn parse_backslash(&mut self) -> usize {
        let pos = self.pos;
        let slen = self.input.len();

        if pos + 1 < slen && self.input[pos + 1] == b'N' {
            let token = &self.input[pos..pos + 2];
            self.current.assign(TYPE_NUMBER, pos, 2, token);
            return pos + 2;
        }

        let ch = self.input[pos];
        self.current.assign_char(TYPE_BACKSLASH, pos, ch);
        pos + 1
    }

    fn parse_eol_comment(&mut self) -> usize {
        let pos = self.pos;
        let slen = self.input.len();

        let mut end_pos = pos;
        while end_pos < slen && self.input[end_pos] != b'\n' {
            end_pos += 1;
        }

        let comment_slice = &self.input[pos..end_pos];
        self.current.assign(TYPE_COMMENT, pos, end_pos - pos, comment_slice);

        if end_pos < slen {
            end_pos + 1
        } else {
            slen
        }
    }

    /// A C-style comment is folded to a single `X` (evil) token, not a plain
    /// comment, when it either nests another `/*` before its own closing
    /// `*/` or opens with the MySQL executable-comment marker `/*!` — both
    /// shapes execute as live SQL rather than being inert.
    fn parse_c_comment(&mut self) -> usize {
        let pos = self.pos;
        let slen = self.input.len();

        let mut end_pos = pos + 2;
        let mut nested = false;

        while end_pos + 1 < slen {
            if self.input[end_pos] == b'*' && self.input[end_pos + 1] == b'/' {
                end_pos += 2;
                break;
            }
            if self.input[end_pos] == b'/' && self.input[end_pos + 1] == b'*' {
                nested = true;
            }
            end_pos += 1;
        }

        let comment_slice = &self.input[pos..end_pos];
        let executable = comment_slice.len() >= 3 && comment_slice[2] == b'!';

        if nested || executable {
            self.current.assign(TYPE_EVIL, pos, end_pos - pos, comment_slice);
        } else {
            self.current.assign(TYPE_COMMENT, pos, end_pos - pos, comment_slice);
        }
        end_pos
    }

    fn parse_string(&mut self) -> usize {
        let pos = self.pos;
        let delim = self.input[pos];
        self.parse_string_core(pos, delim, 1)
    }

    fn parse_string_core(&mut self, pos: usize, delim: u8, offset: usize) -> usize {
        let slen = self.input.len();
        let start_pos = pos + offset;
        let mut end_pos = start_pos;

        loop {
            if end_pos >= slen {
                let content = &self.input[start_pos..];
                self.current.assign(TYPE_STRING, start_pos, slen - start_pos, content);
                self.current.str_close = CHAR_NULL;
                return slen;
            }

            match self.memchr(delim, &self.input[end_pos..]) {
                Some(found_pos) => {
                    let actual_pos = end_pos + found_pos;

                    if actual_pos > 0 && self.is_backslash_escaped(actual_pos - 1) {
                        end_pos = actual_pos + 1;
                        continue;
                    } else if self.is_double_delim_escaped(actual_pos) {
                        end_pos = actual_pos + 2;
                        continue;
                    } else {
                        let content = &self.input[start_pos..actual_pos];
                        self.current.assign(TYPE_STRING, start_pos, actual_pos - start_pos, content);
                        self.current.str_close = delim;
                        return actual_pos + 1;
                    }
                }
                None => {
                    let content = &self.input[start_pos..];
                    self.current.assign(TYPE_STRING, start_pos, slen - start_pos, content);
                    self.current.str_close = CHAR_NULL;
                    return slen;
                }
            }
        }
    }

    fn parse_estring(&mut self) -> usize {
        let pos = self.pos;
        let slen = self.input.len();

        if pos + 2 >= slen || self.input[pos + 1] != CHAR_SINGLE {
            return self.parse_word();
        }

        self.parse_string_core(pos, CHAR_SINGLE, 2)
    }

    fn parse_ustring(&mut self) -> usize {
        let pos = self.pos;
        let slen = self.input.len();

        if pos + 2 < slen && self.input[pos + 1] == b'&' && self.input[pos + 2] == b'\'' {
            self.pos += 2;
            let result = self.parse_string();
            self.current.str_open = b'u';
            if self.current.str_close == b'\'' {
                self.current.str_close = b'u';
            }
            result
        } else {
            self.parse_word()
        }
    }

    fn parse_qstring(&mut self) -> usize {
        self.parse_qstring_core(0)
    }

    fn parse_nqstring(&mut self) -> usize {
        let pos = self.pos;
        let slen = self.input.len();

        if pos + 2 < slen && self.input[pos + 1] == CHAR_SINGLE {
            return self.parse_estring();
        }

        self.parse_qstring_core(1)
    }

    fn parse_qstring_core(&mut self, offset: usize) -> usize {
        let pos = self.pos + offset;
        let slen = self.input.len();

        if pos >= slen
            || (self.input[pos] != b'q' && self.input[pos] != b'Q')
            || pos + 2 >= slen
            || self.input[pos + 1] != b'\''
        {
            return self.parse_word();
        }

        let start_delim = self.input[pos + 2];
        if start_delim < 33 {
            return self.parse_word();
        }

        let end_delim = match start_delim {
            b'(' => b')',
            b'[' => b']',
            b'{' => b'}',
            b'<' => b'>',
            _ => start_delim,
        };

        let content_start = pos + 3;
        if let Some(end_pos) = self.find_qstring_end(content_start, end_delim) {
            let content = &self.input[content_start..end_pos];
            self.current.assign(TYPE_STRING, content_start, end_pos - content_start, content);
            self.current.str_open = b'q';
            self.current.str_close = b'q';
            end_pos + 2
        } else {
            let content = &self.input[content_start..];
            self.current.assign(TYPE_STRING, content_start, slen - content_start, content);
            self.current.str_open = b'q';
            self.current.str_close = CHAR_NULL;
            slen
        }
    }

    fn parse_bstring(&mut self) -> usize {
        let pos = self.pos;
        let slen = self.input.len();

        if pos + 2 >= slen || self.input[pos + 1] != b'\'' {
            return self.parse_word();
        }

        let content_start = pos + 2;
        let mut content_end = content_start;

        while content_end < slen && (self.input[content_end] == b'0' || self.input[content_end] == b'1') {
            content_end += 1;
        }

        if content_end >= slen || self.input[content_end] != b'\'' {
            return self.parse_word();
        }

        let full_token = &self.input[pos..content_end + 1];
        self.current.assign(TYPE_NUMBER, pos, content_end + 1 - pos, full_token);
        content_end + 1
    }

    fn parse_xstring(&mut self) -> usize {
        let pos = self.pos;
        let slen = self.input.len();

        if pos + 2 >= slen || self.input[pos + 1] != b'\'' {
            return self.parse_word();
        }

        let content_start = pos + 2;
        let mut content_end = content_start;

        while content_end < slen {
            match self.input[content_end] {
                b'0'..=b'9' | b'A'..=b'F' | b'a'..=b'f' => content_end += 1,
                _ => break,
            }
        }

        if content_end >= slen || self.input[content_end] != b'\'' {
            return self.parse_word();
        }

        let full_token = &self.input[pos..content_end + 1];
        self.current.assign(TYPE_NUMBER, pos, content_end + 1 - pos, full_token);
        content_end + 1
    }

    fn parse_bword(&mut self) -> usize {
        let pos = self.pos;

        if let Some(end_pos) = self.memchr(b']', &self.input[pos..]) {
            let actual_end = pos + end_pos;
            let content = &self.input[pos..=actual_end];
            self.current.assign(TYPE_BAREWORD, pos, content.len(), content);
            actual_end + 1
        } else {
            let content = &self.input[pos..];
            self.current.assign(TYPE_BAREWORD, pos, content.len(), content);
            self.input.len()
        }
    }

    fn parse_word(&mut self) -> usize {
        let pos = self.pos;
        let slen = self.input.len();

        const WORD_BOUNDARY: &[u8] =
            b" []{}()<>:\\?=@!#~+-*/&|^%,'\t\n\x0B\x0C\r\"\xA0\x00;";
        let mut end_pos = pos;

        while end_pos < slen && !WORD_BOUNDARY.contains(&self.input[end_pos]) {
            end_pos += 1;
        }

        let word_len = end_pos - pos;
        let word_slice = &self.input[pos..end_pos];

        self.current.assign(TYPE_BAREWORD, pos, word_len, word_slice);

        for (i, &byte) in word_slice.iter().enumerate() {
            if byte == b'.' || byte == b'`' {
                let partial_word = core::str::from_utf8(&word_slice[..i]).unwrap_or("");
                let token_type = self.lookup_word(partial_word);
                if token_type != TokenType::None && token_type != TokenType::Bareword {
                    self.current.clear();
                    let type_byte = token_type_to_byte(token_type);
                    self.current.assign(type_byte, pos, i, &word_slice[..i]);
                    return pos + i;
                }
            }
        }

        if word_len < LIBINJECTION_SQLI_TOKEN_SIZE {
            let word_str = core::str::from_utf8(word_slice).unwrap_or("");
            let token_type = self.lookup_word(word_str);
            if token_type != TokenType::None {
                self.current.token_type = token_type;
            }
        }

        end_pos
    }

    fn parse_tick(&mut self) -> usize {
        let pos = self.parse_string_core(self.pos, CHAR_TICK, 1);

        let word_str = core::str::from_utf8(&self.current.val[..self.current.len]).unwrap_or("");
        let token_type = self.lookup_word(word_str);

        if token_type == TokenType::Function {
            self.current.token_type = TokenType::Function;
        } else {
            self.current.token_type = TokenType::Bareword;
        }

        pos
    }

    fn parse_var(&mut self) -> usize {
        let pos = self.pos;
        let slen = self.input.len();
        let mut new_pos = pos + 1;

        let mut at_count = 1;
        if new_pos < slen && self.input[new_pos] == b'@' {
            new_pos += 1;
            at_count = 2;
        }

        self.current.count = at_count;

        if new_pos < slen {
            if self.input[new_pos] == b'`' {
                self.pos = new_pos;
                let result = self.parse_tick();
                self.current.token_type = TokenType::Variable;
                return result;
            } else if self.input[new_pos] == CHAR_SINGLE || self.input[new_pos] == CHAR_DOUBLE {
                self.pos = new_pos;
                let result = self.parse_string();
                self.current.token_type = TokenType::Variable;
                return result;
            }
        }

        const VAR_BOUNDARY: &[u8] = b" <>:?=@!#~+-*/&|^%(),'\t\n\x0B\x0C\r'`\"";
        let mut end_pos = new_pos;

        while end_pos < slen && !VAR_BOUNDARY.contains(&self.input[end_pos]) {
            end_pos += 1;
        }

        if end_pos == new_pos {
            self.current.assign(TYPE_VARIABLE, new_pos, 0, &[]);
            new_pos
        } else {
            let var_slice = &self.input[new_pos..end_pos];
            self.current.assign(TYPE_VARIABLE, new_pos, end_pos - new_pos, var_slice);
            end_pos
        }
    }

    fn parse_money(&mut self) -> usize {
        let pos = self.pos;
        let slen = self.input.len();

        if pos + 1 == slen {
            self.current.assign_char(TYPE_BAREWORD, pos, b'$');
            return slen;
        }

        let next_char = self.input[pos + 1];

        const MONEY_CHARS: &[u8] = b"0123456789.,";
        let mut end_pos = pos + 1;

        while end_pos < slen && MONEY_CHARS.contains(&self.input[end_pos]) {
            end_pos += 1;
        }

        if end_pos > pos + 1 {
            let money_slice = &self.input[pos..end_pos];
            self.current.assign(TYPE_NUMBER, pos, end_pos - pos, money_slice);
            return end_pos;
        }

        if next_char == b'$' {
            return self.parse_dollar_string();
        }

        const TAG_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
        let mut tag_end = pos + 1;

        while tag_end < slen && TAG_CHARS.contains(&self.input[tag_end]) {
            tag_end += 1;
        }

        if tag_end == pos + 1 {
            self.current.assign_char(TYPE_BAREWORD, pos, b'$');
            pos + 1
        } else if tag_end < slen && self.input[tag_end] == b'$' {
            self.parse_tagged_dollar_string(tag_end)
        } else {
            self.current.assign_char(TYPE_BAREWORD, pos, b'$');
            pos + 1
        }
    }

    /// Parses numeric literals: decimal, hex (`0x..`), binary (`0b..`), and
    /// the optional exponent/float suffixes. When an `e`/`E` exponent marker
    /// is present but consumes no digits (`1e`, `1e+`), the marker does not
    /// belong to the number: only the digits before it are emitted as a
    /// `Number`, and the lexer resumes at `e` so it is re-lexed as its own
    /// token on the next call.
    fn parse_number(&mut self) -> usize {
        let pos = self.pos;
        let slen = self.input.len();
        let mut end_pos = pos;

        if end_pos < slen && self.input[end_pos] == b'0' && end_pos + 1 < slen {
            match self.input[end_pos + 1] {
                b'X' | b'x' => {
                    end_pos += 2;
                    while end_pos < slen {
                        match self.input[end_pos] {
                            b'0'..=b'9' | b'A'..=b'F' | b'a'..=b'f' => end_pos += 1,
                            _ => break,
                        }
                    }

                    if end_pos == pos + 2 {
                        let token = &self.input[pos..pos + 2];
                        self.current.assign(TYPE_BAREWORD, pos, 2, token);
                        return pos + 2;
                    } else {
                        let token = &self.input[pos..end_pos];
                        self.current.assign(TYPE_NUMBER, pos, end_pos - pos, token);
                        return end_pos;
                    }
                }
                b'B' | b'b' => {
                    end_pos += 2;
                    while end_pos < slen && (self.input[end_pos] == b'0' || self.input[end_pos] == b'1') {
                        end_pos += 1;
                    }

                    if end_pos == pos + 2 {
                        let token = &self.input[pos..pos + 2];
                        self.current.assign(TYPE_BAREWORD, pos, 2, token);
                        return pos + 2;
                    } else {
                        let token = &self.input[pos..end_pos];
                        self.current.assign(TYPE_NUMBER, pos, end_pos - pos, token);
                        return end_pos;
                    }
                }
                _ => {}
            }
        }

        let start_pos = end_pos;

        while end_pos < slen && self.input[end_pos].is_ascii_digit() {
            end_pos += 1;
        }

        if end_pos < slen && self.input[end_pos] == b'.' {
            end_pos += 1;
            while end_pos < slen && self.input[end_pos].is_ascii_digit() {
                end_pos += 1;
            }

            if end_pos - start_pos == 1 {
                self.current.assign_char(TYPE_DOT, start_pos, b'.');
                return end_pos;
            }
        }

        if end_pos < slen && (self.input[end_pos] == b'E' || self.input[end_pos] == b'e') {
            let mut exp_end = end_pos + 1;
            if exp_end < slen && (self.input[exp_end] == b'+' || self.input[exp_end] == b'-') {
                exp_end += 1;
            }
            let digits_start = exp_end;
            while exp_end < slen && self.input[exp_end].is_ascii_digit() {
                exp_end += 1;
            }
            if exp_end > digits_start {
                end_pos = exp_end;
            }
            // else: no exponent digits consumed, leave end_pos before 'e'
        }

        if end_pos < slen {
            match self.input[end_pos] {
                b'd' | b'D' | b'f' | b'F' => {
                    if end_pos + 1 == slen {
                        end_pos += 1;
                    } else if self.is_white_char(self.input[end_pos + 1]) || self.input[end_pos + 1] == b';' {
                        end_pos += 1;
                    } else if self.input[end_pos + 1] == b'u' || self.input[end_pos + 1] == b'U' {
                        end_pos += 1;
                    }
                }
                _ => {}
            }
        }

        let token = &self.input[start_pos..end_pos];
        self.current.assign(TYPE_NUMBER, start_pos, end_pos - start_pos, token);
        end_pos
    }

    fn is_white_char(&self, ch: u8) -> bool {
        matches!(ch, b' ' | b'\t' | b'\n' | b'\x0B' | b'\x0C' | b'\r' | 0 | 160)
    }

    fn memchr(&self, needle: u8, haystack: &[u8]) -> Option<usize> {
        haystack.iter().position(|&x| x == needle)
    }

    /// Walks backward from `pos` counting the consecutive run of `\` bytes
    /// ending there. An odd run means the byte at `pos + 1` is escaped; an
    /// even run means the backslashes pair off among themselves and `pos + 1`
    /// stands on its own (e.g. `\\'` closes the string: the two backslashes
    /// escape each other, not the quote).
    fn is_backslash_escaped(&self, pos: usize) -> bool {
        let mut run = 0usize;
        let mut idx = pos;
        loop {
            if self.input[idx] != b'\\' {
                break;
            }
            run += 1;
            match idx.checked_sub(1) {
                Some(prev) => idx = prev,
                None => break,
            }
        }
        run % 2 == 1
    }

    fn is_double_delim_escaped(&self, pos: usize) -> bool {
        pos + 1 < self.input.len() && self.input[pos] == self.input[pos + 1]
    }

    fn find_qstring_end(&self, start: usize, end_delim: u8) -> Option<usize> {
        let mut pos = start;

        while pos + 1 < self.input.len() {
            if self.input[pos] == end_delim && self.input[pos + 1] == b'\'' {
                return Some(pos);
            }
            pos += 1;
        }

        None
    }

    fn parse_dollar_string(&mut self) -> usize {
        let pos = self.pos;
        let slen = self.input.len();

        let content_start = pos + 2;

        let mut end_pos = content_start;
        while end_pos + 1 < slen {
            if self.input[end_pos] == b'$' && self.input[end_pos + 1] == b'$' {
                let content = &self.input[content_start..end_pos];
                self.current.assign(TYPE_STRING, content_start, end_pos - content_start, content);
                self.current.str_open = b'$';
                self.current.str_close = b'$';
                return end_pos + 2;
            }
            end_pos += 1;
        }

        let content = &self.input[content_start..];
        self.current.assign(TYPE_STRING, content_start, slen - content_start, content);
        self.current.str_open = b'$';
        self.current.str_close = CHAR_NULL;
        slen
    }

    fn parse_tagged_dollar_string(&mut self, tag_end: usize) -> usize {
        let pos = self.pos;
        let slen = self.input.len();
        let tag = &self.input[pos..=tag_end];
        let content_start = tag_end + 1;

        let mut search_pos = content_start;
        while search_pos + tag.len() <= slen {
            if &self.input[search_pos..search_pos + tag.len()] == tag {
                let content = &self.input[content_start..search_pos];
                self.current.assign(TYPE_STRING, content_start, search_pos - content_start, content);
                self.current.str_open = b'$';
                self.current.str_close = b'$';
                return search_pos + tag.len();
            }
            search_pos += 1;
        }

        let content = &self.input[content_start..];
        self.current.assign(TYPE_STRING, content_start, slen - content_start, content);
        self.current.str_open = b'$';
        self.current.str_close = CHAR_NULL;
        slen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &[u8], flags: SqliFlags) -> Vec<Token> {
        let mut tok = SqliTokenizer::new(input, flags);
        let mut out = Vec::new();
        while let Some(t) = tok.next_token() {
            out.push(t);
        }
        out
    }

    #[test]
    fn simple_select_tokenizes() {
        let ts = tokens(b"SELECT * FROM users", SqliFlags::FLAG_SQL_ANSI);
        assert_eq!(ts.len(), 4);
        assert_eq!(ts[0].token_type, TokenType::Keyword);
        assert_eq!(ts[1].token_type, TokenType::Operator);
        assert_eq!(ts[2].token_type, TokenType::Keyword);
        assert_eq!(ts[3].token_type, TokenType::Bareword);
    }

    #[test]
    fn number_with_incomplete_exponent_resumes_at_e() {
        let ts = tokens(b"1e", SqliFlags::FLAG_SQL_ANSI);
        assert_eq!(ts.len(), 2);
        assert_eq!(ts[0].token_type, TokenType::Number);
        assert_eq!(ts[0].value_as_str(), "1");
        assert_eq!(ts[1].value_as_str(), "e");
    }

    #[test]
    fn number_with_full_exponent_is_one_token() {
        let ts = tokens(b"1e10", SqliFlags::FLAG_SQL_ANSI);
        assert_eq!(ts.len(), 1);
        assert_eq!(ts[0].token_type, TokenType::Number);
        assert_eq!(ts[0].value_as_str(), "1e10");
    }

    #[test]
    fn nested_comment_is_evil() {
        let ts = tokens(b"/* outer /* inner */ */", SqliFlags::FLAG_SQL_ANSI);
        assert_eq!(ts[0].token_type, TokenType::Evil);
    }

    #[test]
    fn mysql_executable_comment_is_evil() {
        let ts = tokens(b"/*!50000 SELECT 1*/", SqliFlags::FLAG_SQL_MYSQL);
        assert_eq!(ts[0].token_type, TokenType::Evil);
    }

    #[test]
    fn plain_comment_is_not_evil() {
        let ts = tokens(b"/* just a comment */", SqliFlags::FLAG_SQL_ANSI);
        assert_eq!(ts[0].token_type, TokenType::Comment);
    }

    #[test]
    fn single_quoted_string_round_trips() {
        let ts = tokens(b"'hello'", SqliFlags::FLAG_SQL_ANSI);
        assert_eq!(ts.len(), 1);
        assert_eq!(ts[0].token_type, TokenType::String);
        assert_eq!(ts[0].value_as_str(), "hello");
    }

    #[test]
    fn lone_colon_is_its_own_type() {
        let ts = tokens(b"x:int", SqliFlags::FLAG_SQL_ANSI);
        assert_eq!(ts.len(), 3);
        assert_eq!(ts[0].token_type, TokenType::Bareword);
        assert_eq!(ts[1].token_type, TokenType::Colon);
        assert_eq!(ts[2].token_type, TokenType::SqlType);
    }

    #[test]
    fn trailing_lone_colon_at_eof_is_colon_not_operator() {
        let ts = tokens(b":", SqliFlags::FLAG_SQL_ANSI);
        assert_eq!(ts.len(), 1);
        assert_eq!(ts[0].token_type, TokenType::Colon);
    }

    #[test]
    fn double_colon_is_still_a_single_operator_token() {
        let ts = tokens(b"x::int", SqliFlags::FLAG_SQL_ANSI);
        assert_eq!(ts.len(), 3);
        assert_eq!(ts[0].token_type, TokenType::Bareword);
        assert_eq!(ts[1].token_type, TokenType::Operator);
        assert_eq!(ts[1].value_as_str(), "::");
        assert_eq!(ts[2].token_type, TokenType::SqlType);
    }
}
