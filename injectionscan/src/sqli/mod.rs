//! SQL-injection detection: lex, fold to a fingerprint, classify.

pub mod blacklist;
pub mod keywords;
pub mod tokenizer;

#[cfg(test)]
mod tests;

use core::fmt;
use core::ops::Deref;

use bitflags::bitflags;

#[cfg(feature = "smallvec")]
use smallvec::SmallVec;

use tokenizer::{token_type_to_byte, SqliTokenizer, Token, TokenType, CHAR_NULL};

/// Number of folded tokens a fingerprint is built from. Longer statements
/// still tokenize and fold in full; only the first five folded tokens feed
/// the fingerprint, mirroring how a WAF only needs to recognize the *shape*
/// of an injection, not parse an arbitrarily long statement.
pub const LIBINJECTION_SQLI_MAX_TOKENS: usize = 5;

#[cfg(feature = "smallvec")]
type TokenVec = SmallVec<[Token; 8]>;
#[cfg(not(feature = "smallvec"))]
type TokenVec = Vec<Token>;

bitflags! {
    /// Parsing context: which SQL dialect's comment/operator rules apply,
    /// and what quote character (if any) the input is assumed to already
    /// be inside of when parsing starts.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SqliFlags: u32 {
        const FLAG_NONE          = 0;
        const FLAG_QUOTE_NONE    = 0b0000_0001;
        const FLAG_QUOTE_SINGLE  = 0b0000_0010;
        const FLAG_QUOTE_DOUBLE  = 0b0000_0100;
        const FLAG_SQL_ANSI      = 0b0000_1000;
        const FLAG_SQL_MYSQL     = 0b0001_0000;
    }
}

impl SqliFlags {
    pub fn is_ansi(&self) -> bool {
        self.contains(SqliFlags::FLAG_SQL_ANSI)
    }

    pub fn is_mysql(&self) -> bool {
        self.contains(SqliFlags::FLAG_SQL_MYSQL)
    }

    pub fn quote_context(&self) -> u8 {
        if self.contains(SqliFlags::FLAG_QUOTE_SINGLE) {
            b'\''
        } else if self.contains(SqliFlags::FLAG_QUOTE_DOUBLE) {
            b'"'
        } else {
            CHAR_NULL
        }
    }
}

/// The folded token-type sequence a SQL statement reduces to, e.g. `1o1`
/// for `1 OR 1`. At most [`LIBINJECTION_SQLI_MAX_TOKENS`] bytes.
#[derive(Clone, Copy)]
pub struct Fingerprint {
    bytes: [u8; LIBINJECTION_SQLI_MAX_TOKENS],
    len: usize,
}

impl Fingerprint {
    fn new() -> Self {
        Self { bytes: [0; LIBINJECTION_SQLI_MAX_TOKENS], len: 0 }
    }

    fn push(&mut self, b: u8) {
        if self.len < LIBINJECTION_SQLI_MAX_TOKENS {
            self.bytes[self.len] = b;
            self.len += 1;
        }
    }

    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.bytes[..self.len]).unwrap_or("")
    }
}

impl Deref for Fingerprint {
    type Target = str;
    fn deref(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq for Fingerprint {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl PartialEq<str> for Fingerprint {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Fingerprint {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Fingerprint").field(&self.as_str()).finish()
    }
}

/// Drives tokenization, folding, and classification for one input across
/// the quote/dialect contexts [`SqliState::detect`] enumerates.
pub struct SqliState<'a> {
    input: &'a [u8],
    flags: SqliFlags,
}

impl<'a> SqliState<'a> {
    pub fn new(input: &'a [u8], flags: SqliFlags) -> Self {
        Self { input, flags }
    }

    /// Runs the full detection pipeline across every context a reflected
    /// value might land in, returning on the first positive verdict:
    ///
    /// 1. Bare, under ANSI comment rules.
    /// 2. Bare again under MySQL rules, but only if the ANSI pass's own
    ///    comment statistics (`--` without trailing whitespace, or `#`)
    ///    suggest this is actually MySQL dialect.
    /// 3. As if it had broken out of a `'`-quoted literal, under ANSI
    ///    rules, then (by the same comment-statistics heuristic) MySQL
    ///    rules — but only when the input contains a `'` at all.
    /// 4. As if it had broken out of a `"`-quoted literal under MySQL
    ///    rules, but only when the input contains a `"`.
    pub fn detect(&mut self) -> bool {
        if self.input.is_empty() {
            return false;
        }

        let base = (self.flags & !SqliFlags::FLAG_SQL_MYSQL) | SqliFlags::FLAG_SQL_ANSI;

        let (hit, stats) = self.check_is_sqli(base);
        if hit {
            return true;
        }
        if stats.suggests_mysql() {
            let mysql_flags = (base & !SqliFlags::FLAG_SQL_ANSI) | SqliFlags::FLAG_SQL_MYSQL;
            if self.check_is_sqli(mysql_flags).0 {
                return true;
            }
        }

        if self.input.contains(&b'\'') {
            let single = (base & !(SqliFlags::FLAG_QUOTE_NONE | SqliFlags::FLAG_QUOTE_DOUBLE))
                | SqliFlags::FLAG_QUOTE_SINGLE;
            let (hit, stats) = self.check_is_sqli(single);
            if hit {
                return true;
            }
            if stats.suggests_mysql() {
                let mysql_flags = (single & !SqliFlags::FLAG_SQL_ANSI) | SqliFlags::FLAG_SQL_MYSQL;
                if self.check_is_sqli(mysql_flags).0 {
                    return true;
                }
            }
        }

        if self.input.contains(&b'"') {
            let double = (base & !(SqliFlags::FLAG_QUOTE_NONE | SqliFlags::FLAG_SQL_ANSI))
                | SqliFlags::FLAG_QUOTE_DOUBLE
                | SqliFlags::FLAG_SQL_MYSQL;
            if self.check_is_sqli(double).0 {
                return true;
            }
        }

        false
    }

    /// Computes the fingerprint for this input under its base flags,
    /// without running the whitelist pass.
    pub fn get_fingerprint(&mut self) -> Fingerprint {
        let folded = self.fold(self.flags);
        generate_fingerprint(&folded)
    }

    pub fn reset(&mut self, input: &'a [u8], flags: SqliFlags) {
        self.input = input;
        self.flags = flags;
    }

    fn fold(&self, flags: SqliFlags) -> TokenVec {
        let (raw, _stats) = self.tokenize_with_stats(flags);
        fold_tokens(&raw)
    }

    fn tokenize_with_stats(&self, flags: SqliFlags) -> (TokenVec, CommentStats) {
        let mut tok = SqliTokenizer::new(self.input, flags);
        let mut out = TokenVec::new();
        while let Some(t) = tok.next_token() {
            out.push(t);
        }
        let stats = CommentStats {
            ddw: tok.stats_comment_ddw,
            ddx: tok.stats_comment_ddx,
            c: tok.stats_comment_c,
            hash: tok.stats_comment_hash,
        };
        (out, stats)
    }

    /// Runs one (quote, dialect) pass end to end: tokenize, fold, compute
    /// the fingerprint, and classify it. Returns both the verdict and the
    /// comment statistics gathered along the way, since [`Self::detect`]
    /// reuses those stats to decide whether a MySQL re-pass is warranted.
    fn check_is_sqli(&mut self, flags: SqliFlags) -> (bool, CommentStats) {
        let (raw, stats) = self.tokenize_with_stats(flags);
        let folded = fold_tokens(&raw);
        let fp = generate_fingerprint(&folded);

        if !blacklist::is_blacklisted(fp.as_str()) {
            return (false, stats);
        }

        (!is_not_whitelist(self.input, &folded, fp.as_str(), raw.len()), stats)
    }
}

/// Comment statistics gathered during one tokenizer pass. A `--` comment
/// without trailing whitespace (`ddx`) or a `#` comment (`hash`) are marks
/// the ANSI dialect doesn't produce on its own initiative — their presence
/// is the signal the driver uses to decide a MySQL re-pass is worth trying.
#[derive(Debug, Clone, Copy, Default)]
struct CommentStats {
    #[allow(dead_code)]
    ddw: i32,
    ddx: i32,
    #[allow(dead_code)]
    c: i32,
    hash: i32,
}

impl CommentStats {
    fn suggests_mysql(&self) -> bool {
        self.ddx > 0 || self.hash > 0
    }
}

/// Builds the fingerprint from the first five folded tokens — except if an
/// `X` (evil) token appears anywhere in the folded stream, in which case
/// the entire fingerprint collapses to the single byte `X`: the structural
/// oddity evil tokens mark (a nested C-style comment, a MySQL executable
/// comment, an empty braced identifier) is itself the verdict, regardless
/// of what comes before or after it.
fn generate_fingerprint(folded: &[Token]) -> Fingerprint {
    if folded.iter().any(|t| t.token_type == TokenType::Evil) {
        let mut fp = Fingerprint::new();
        fp.push(token_type_to_byte(TokenType::Evil));
        return fp;
    }

    let mut fp = Fingerprint::new();
    for t in folded.iter().take(LIBINJECTION_SQLI_MAX_TOKENS) {
        fp.push(token_type_to_byte(t.token_type));
    }
    fp
}

/// Public introspection hook for golden-file folder tests: runs the same
/// folding pass [`SqliState::detect`] uses internally over an
/// already-tokenized stream, without touching the blacklist/whitelist
/// classifier. Exposed so a test harness can feed it the output of
/// [`tokenizer::SqliTokenizer::next_token`] directly and compare the
/// folded shape against a fixture, independently of the final verdict.
pub fn sqli_fold(raw: &[Token]) -> Vec<Token> {
    fold_tokens(raw).into_iter().collect()
}

/// Context functions spec.md §4.3 calls out by name: a bareword or
/// `@@`-style system variable that names one of these is reclassified as a
/// function call when it's immediately followed by `(`, on top of the
/// (unconditional) bareword rule below — these are session/context
/// introspection calls attackers probe with, regardless of dialect.
const CURATED_CONTEXT_FUNCTIONS: &[&str] = &[
    "current_date",
    "current_time",
    "current_timestamp",
    "current_user",
    "database",
    "password",
    "session_user",
    "system_user",
    "user",
    "user_id",
];

fn is_curated_context_function(word: &str) -> bool {
    let bare = word.trim_start_matches(['@', '$', ':']);
    CURATED_CONTEXT_FUNCTIONS.iter().any(|&c| lower_eq(bare, c))
}

/// Token types the generic bigram merge below will treat as the left half
/// of a two-word phrase.
fn is_merge_word_left(t: TokenType) -> bool {
    matches!(
        t,
        TokenType::Keyword
            | TokenType::Bareword
            | TokenType::Operator
            | TokenType::Union
            | TokenType::Function
            | TokenType::Expression
            | TokenType::Tsql
            | TokenType::SqlType
    )
}

/// Token types the generic bigram merge will treat as the right half —
/// the same set as the left half, plus `LogicOperator` (so e.g. `IS` +
/// `NOT` can merge even though `NOT` alone would also read as a plain
/// logic-op in other contexts).
fn is_merge_word_right(t: TokenType) -> bool {
    is_merge_word_left(t) || t == TokenType::LogicOperator
}

/// Generic keyword-table-driven bigram merge: tries `a`'s and `b`'s values
/// joined by a space, uppercased, against [`keywords::lookup_word`]. A hit
/// collapses both tokens into one carrying the looked-up type — this is
/// what turns `GROUP` + `BY`, `NOT` + `IN`, `LEFT` + `JOIN`, `UNION` +
/// `ALL`, and so on into a single logical token, driven entirely by the
/// multi-word entries in the keyword table rather than a hardcoded list of
/// pairs.
fn syntax_merge_words(a: &Token, b: &Token) -> Option<Token> {
    if !is_merge_word_left(a.token_type) || !is_merge_word_right(b.token_type) {
        return None;
    }

    let a_word = a.value_as_str();
    let b_word = b.value_as_str();
    if a_word.is_empty() || b_word.is_empty() || a_word.len() + b_word.len() + 1 > 31 {
        return None;
    }

    let mut buf = [0u8; 32];
    let mut len = 0;
    for &byte in a_word.as_bytes() {
        buf[len] = byte.to_ascii_uppercase();
        len += 1;
    }
    buf[len] = b' ';
    len += 1;
    for &byte in b_word.as_bytes() {
        buf[len] = byte.to_ascii_uppercase();
        len += 1;
    }
    let probe = core::str::from_utf8(&buf[..len]).unwrap_or("");

    let merged_type = keywords::lookup_word(probe);
    if merged_type == TokenType::None {
        return None;
    }

    let mut merged = a.clone();
    merged.token_type = merged_type;
    merged.len = (b.pos + b.len).saturating_sub(a.pos);
    Some(merged)
}

fn lower_eq(word: &str, target: &str) -> bool {
    word.eq_ignore_ascii_case(target)
}

/// The four "arithmetic-looking" five-token shapes that force a reset:
/// `1 (o|,) ( 1 ) ` , `n o ( n|1 )`, `1 ) , ( 1`, and `n ) o ( n` — see
/// spec.md §4.3. Matching one means the window has drifted into a long
/// chain of parenthesized arithmetic that isn't adding any shape
/// information, so folding keeps only the first two tokens and drops the
/// rest.
fn is_overflow_shape(w: &[Token]) -> bool {
    if w.len() < 5 {
        return false;
    }
    let t = [w[0].token_type, w[1].token_type, w[2].token_type, w[3].token_type, w[4].token_type];
    use TokenType::{Bareword, Comma, LeftParenthesis, Number, Operator, RightParenthesis};

    (t[0] == Number
        && matches!(t[1], Operator | Comma)
        && t[2] == LeftParenthesis
        && t[3] == Number
        && t[4] == RightParenthesis)
        || (t[0] == Bareword
            && t[1] == Operator
            && t[2] == LeftParenthesis
            && matches!(t[3], Bareword | Number)
            && t[4] == RightParenthesis)
        || (t[0] == Number && t[1] == RightParenthesis && t[2] == Comma && t[3] == LeftParenthesis && t[4] == Number)
        || (t[0] == Bareword
            && t[1] == RightParenthesis
            && t[2] == Operator
            && t[3] == LeftParenthesis
            && t[4] == Bareword)
}

/// The outcome of one [`fold_pass`]: either folding made progress (or
/// reached a fixed point) and should keep going, or an empty braced
/// bareword (`{}`-shaped) was found — an evil shape the fingerprint
/// collapses to `X` regardless of anything else in the statement, so
/// folding stops immediately rather than continuing to fold the rest.
enum FoldOutcome {
    Progress(TokenVec),
    Evil(TokenVec),
}

/// Reduces a raw token stream to its canonical shape per spec.md §4.3:
/// comments are dropped, consecutive semicolons/parens collapse, known
/// multi-word keyword phrases merge into a single token, constant
/// arithmetic and dotted/cast-like chains collapse to their shape, and a
/// handful of context-sensitive reclassifications (`IN`/`LIKE` before `(`,
/// `;IF`, `COLLATE` + underscore type, ...) run. The pass repeats until a
/// fixed point, since folding can expose a new adjacency (e.g. merging
/// `NOT` + `IN` can then let the result merge with a preceding `IS`).
fn fold_tokens(raw: &[Token]) -> TokenVec {
    let mut current: TokenVec = raw
        .iter()
        .filter(|t| t.token_type != TokenType::Comment)
        .cloned()
        .collect();

    loop {
        match fold_pass(&current) {
            FoldOutcome::Evil(evil) => return evil,
            FoldOutcome::Progress(folded) => {
                let done = folded.len() == current.len();
                current = folded;
                if done {
                    break;
                }
            }
        }
    }

    current
}

fn fold_pass(tokens: &[Token]) -> FoldOutcome {
    use TokenType::{
        Bareword, Collate, Colon, Comma, Dot, Expression, Function, Group, Keyword, LeftBrace, LeftParenthesis,
        LogicOperator, Number, Operator, RightBrace, RightParenthesis, SqlType, String as StringTy, Tsql, Union,
        Variable,
    };

    let mut out: TokenVec = TokenVec::new();
    let mut i = 0;

    while i < tokens.len() {
        let t = &tokens[i];
        let next = tokens.get(i + 1);
        let third = tokens.get(i + 2);

        // Five-token arithmetic-chain overflow: collapse to the first two
        // tokens and drop the rest.
        if is_overflow_shape(&tokens[i..]) {
            out.push(t.clone());
            out.push(tokens[i + 1].clone());
            i += 5;
            continue;
        }

        if t.token_type == TokenType::Semicolon {
            if out.last().map(|l| l.token_type) != Some(TokenType::Semicolon) {
                out.push(t.clone());
            }

            // `;IF` is T-SQL's conditional-statement marker, not a plain
            // function call.
            if let Some(n) = next {
                if n.token_type == Function && lower_eq(n.value_as_str(), "if") {
                    let mut tsql = n.clone();
                    tsql.token_type = Tsql;
                    out.push(tsql);
                    i += 2;
                    continue;
                }
            }

            i += 1;
            continue;
        }

        // String concatenation: two adjacent string literals fold to one.
        if t.token_type == StringTy && next.map(|n| n.token_type) == Some(StringTy) {
            out.push(t.clone());
            i += 2;
            continue;
        }

        // `((` collapses to `(`; `))` collapses to `)`.
        if (t.token_type == LeftParenthesis && next.map(|n| n.token_type) == Some(LeftParenthesis))
            || (t.token_type == RightParenthesis && next.map(|n| n.token_type) == Some(RightParenthesis))
        {
            out.push(t.clone());
            i += 2;
            continue;
        }

        // `(` immediately followed by a unary operator drops the unary —
        // `(-1)` is shaped the same as `(1)` for fingerprinting purposes.
        if t.token_type == LeftParenthesis
            && next.map(|n| n.token_type == Operator && is_unary_op(n.value_as_str())) == Some(true)
        {
            out.push(t.clone());
            i += 2;
            continue;
        }

        // An operator or logic-op immediately followed by a unary operator
        // or a bare SQL type drops the second token: `1 = -1` folds the
        // same as `1 = 1`, and a cast-like `x::int` folds past the type.
        if matches!(t.token_type, Operator | LogicOperator)
            && next.map(|n| (n.token_type == Operator && is_unary_op(n.value_as_str())) || n.token_type == SqlType)
                == Some(true)
        {
            out.push(t.clone());
            i += 2;
            continue;
        }

        // A backslash is only meaningful in front of an arithmetic operator
        // (where it's reclassified as a number, matching `\N`-style odd
        // dialect numerics); otherwise it carries no signal and is dropped.
        if t.token_type == TokenType::Backslash {
            if let Some(n) = next {
                if n.token_type == Operator && is_arithmetic_op(n.value_as_str()) {
                    let mut num = t.clone();
                    num.token_type = Number;
                    out.push(num);
                    i += 1;
                    continue;
                }
            }
            i += 1;
            continue;
        }

        // `IN`/`NOT IN`, as a keyword, only reads as a comparison operator
        // when a parenthesized list follows it; otherwise it's just an
        // ordinary identifier-shaped word.
        if t.token_type == Keyword && (lower_eq(t.value_as_str(), "in") || lower_eq(t.value_as_str(), "not in")) {
            let mut reclassified = t.clone();
            reclassified.token_type = if next.map(|n| n.token_type) == Some(LeftParenthesis) {
                Operator
            } else {
                Bareword
            };
            out.push(reclassified);
            i += 1;
            continue;
        }

        // `LIKE`/`NOT LIKE` followed by `(` reads as a function call
        // (`LIKE(...)`-style dialect extensions), not a comparison.
        if t.token_type == Operator
            && (lower_eq(t.value_as_str(), "like") || lower_eq(t.value_as_str(), "not like"))
            && next.map(|n| n.token_type) == Some(LeftParenthesis)
        {
            let mut func = t.clone();
            func.token_type = Function;
            out.push(func);
            i += 1;
            continue;
        }

        // `COLLATE utf8_bin`-style: an underscore in the collation name is
        // the hallmark of a real collation identifier, reclassified as a
        // SQL type so it folds the same as any other cast target.
        if let Some(n) = next {
            if t.token_type == Collate && n.token_type == Bareword && n.value_as_str().contains('_') {
                out.push(t.clone());
                let mut sqltype = n.clone();
                sqltype.token_type = SqlType;
                out.push(sqltype);
                i += 2;
                continue;
            }

            // `{` immediately followed by an empty bareword (`{}`-shaped)
            // is the ODBC-escape evil shape: stop folding immediately,
            // since its mere presence forces the fingerprint to `X`
            // regardless of anything else.
            if t.token_type == LeftBrace && n.token_type == Bareword && n.len == 0 {
                out.push(t.clone());
                let mut evil = n.clone();
                evil.token_type = TokenType::Evil;
                out.push(evil);
                return FoldOutcome::Evil(out);
            }
        }

        // A trailing `}` never opened anything real folding cares about;
        // drop it regardless of what precedes it.
        if next.map(|n| n.token_type) == Some(RightBrace) {
            out.push(t.clone());
            i += 2;
            continue;
        }

        // Generic two-word keyword-table merge (`GROUP BY`, `NOT IN`,
        // `LEFT JOIN`, `UNION ALL`, ...).
        if let Some(n) = next {
            if let Some(merged) = syntax_merge_words(t, n) {
                out.push(merged);
                i += 2;
                continue;
            }
        }

        // Any bareword directly in front of `(` is a function call.
        if t.token_type == Bareword && next.map(|n| n.token_type) == Some(LeftParenthesis) {
            let mut func = t.clone();
            func.token_type = Function;
            out.push(func);
            i += 1;
            continue;
        }

        // A `@@`-style variable, or a plain keyword, naming one of the
        // curated context functions (`USER()`, `DATABASE()`,
        // `CURRENT_USER()`, ...) in front of `(` also reads as a function
        // call. Barewords are already covered by the unconditional rule
        // above; this only matters for the words this table already
        // classifies as `Keyword` (`USER`, `DATABASE`) or that only ever
        // show up as a `Variable` (`@@session_user`-style references).
        if matches!(t.token_type, Variable | Keyword)
            && is_curated_context_function(t.value_as_str())
            && next.map(|n| n.token_type) == Some(LeftParenthesis)
        {
            let mut func = t.clone();
            func.token_type = Function;
            out.push(func);
            i += 1;
            continue;
        }

        if let (Some(n), Some(th)) = (next, third) {
            // `number operator number` collapses to a single number:
            // constant arithmetic carries no more signal than the literal
            // it evaluates to.
            if t.token_type == Number && n.token_type == Operator && th.token_type == Number {
                out.push(t.clone());
                i += 3;
                continue;
            }

            // `operator X operator` (X anything but `(`) collapses to the
            // first operator: a binary op sandwiched between two more
            // operators reads as the first one applying to whatever
            // follows.
            if t.token_type == Operator
                && n.token_type != LeftParenthesis
                && th.token_type == Operator
            {
                out.push(t.clone());
                i += 3;
                continue;
            }

            // `logicop X logicop` collapses to the first logic operator.
            if t.token_type == LogicOperator && th.token_type == LogicOperator {
                out.push(t.clone());
                i += 3;
                continue;
            }

            // `variable op (variable|number|bareword)` collapses to the
            // variable.
            if t.token_type == Variable && n.token_type == Operator && matches!(th.token_type, Variable | Number | Bareword) {
                out.push(t.clone());
                i += 3;
                continue;
            }

            // `(bareword|number) op (number|bareword)` collapses to the
            // first token.
            if matches!(t.token_type, Bareword | Number)
                && n.token_type == Operator
                && matches!(th.token_type, Number | Bareword)
            {
                out.push(t.clone());
                i += 3;
                continue;
            }

            // `(bareword|number|string|variable) : sqltype` — a
            // PostgreSQL-style cast spelled with a single colon — collapses
            // to the operand. The doubled-colon spelling (`x::int`) lexes as
            // one two-byte `Operator` token instead of two `Colon`s (see
            // `parse_operator2`), and `SqlType` isn't among the trailing
            // types the operator-collapse rules above accept, so that
            // spelling doesn't fold here either — only the single-colon form
            // does.
            if matches!(t.token_type, Bareword | Number | StringTy | Variable)
                && n.token_type == Colon
                && th.token_type == SqlType
            {
                out.push(t.clone());
                i += 3;
                continue;
            }

            // `(bareword|number|string|variable) , (bareword|number|string|variable)`
            // collapses to the first operand, same as the operator case.
            if matches!(t.token_type, Bareword | Number | StringTy | Variable)
                && n.token_type == Comma
                && matches!(th.token_type, Bareword | Number | StringTy | Variable)
            {
                out.push(t.clone());
                i += 3;
                continue;
            }

            // `(expression|group|comma) unary (` drops the unary, keeping
            // the opening paren directly after the clause keyword.
            if matches!(t.token_type, Expression | Group | Comma)
                && n.token_type == Operator
                && is_unary_op(n.value_as_str())
                && th.token_type == LeftParenthesis
            {
                out.push(t.clone());
                out.push(th.clone());
                i += 3;
                continue;
            }

            // `(keyword|expression|group) unary (number|bareword|variable|string|function)`
            // drops the unary, keeping the clause keyword and its operand
            // adjacent.
            if matches!(t.token_type, Keyword | Expression | Group)
                && n.token_type == Operator
                && is_unary_op(n.value_as_str())
                && matches!(th.token_type, Number | Bareword | Variable | StringTy | Function)
            {
                out.push(t.clone());
                out.push(th.clone());
                i += 3;
                continue;
            }

            // `, unary (number|bareword|variable|string|function)` — a
            // unary-prefixed value in an argument list — drops the unary.
            if t.token_type == Comma
                && n.token_type == Operator
                && is_unary_op(n.value_as_str())
                && matches!(th.token_type, Number | Bareword | Variable | StringTy | Function)
            {
                out.push(t.clone());
                out.push(th.clone());
                i += 3;
                continue;
            }

            // `bareword . bareword` — a qualified identifier — collapses
            // to a single bareword.
            if t.token_type == Bareword && n.token_type == Dot && th.token_type == Bareword {
                out.push(t.clone());
                i += 3;
                continue;
            }

            // `expression . bareword` keeps both, dropping the dot.
            if t.token_type == Expression && n.token_type == Dot && th.token_type == Bareword {
                out.push(t.clone());
                out.push(th.clone());
                i += 3;
                continue;
            }

            // `function ( X` where X isn't `)`: `USER(` specifically
            // reclassifies back to a bareword (it's being called as a
            // value, not invoked), falling through without consuming the
            // lookahead tokens so the `(` is still folded normally next.
            if t.token_type == Function
                && n.token_type == LeftParenthesis
                && th.token_type != RightParenthesis
                && lower_eq(t.value_as_str(), "user")
            {
                let mut bareword = t.clone();
                bareword.token_type = Bareword;
                out.push(bareword);
                i += 1;
                continue;
            }
        }

        out.push(t.clone());
        i += 1;
    }

    FoldOutcome::Progress(out)
}

/// A unary operator token: negation, sign, bitwise-not.
fn is_unary_op(word: &str) -> bool {
    matches!(word, "!" | "-" | "+" | "~")
}

/// An arithmetic binary operator token.
fn is_arithmetic_op(word: &str) -> bool {
    matches!(word, "+" | "-" | "*" | "/" | "%")
}

/// The fold pass, keyword table, and blacklist all agree an input is
/// dangerous. The whitelist pass below exists to pull back obviously safe
/// shapes the blacklist is too coarse to exclude on its own — a
/// blacklisted fingerprint by itself is a necessary, not sufficient,
/// condition. `raw_token_count` is the number of tokens the lexer produced
/// *before* folding, since several rescue rules key on the original
/// statement shape, not its folded summary.
///
/// Returns `true` when the whitelist rescues the input (safe); `false`
/// when nothing rescues it and the blacklisted fingerprint stands.
fn is_not_whitelist(input: &[u8], folded: &[Token], fingerprint: &str, raw_token_count: usize) -> bool {
    if folded.last().map(|t| t.token_type) == Some(TokenType::Comment) && contains_sp_password(input) {
        return false;
    }

    match folded.len() {
        2 => handle_two_token_whitelist(input, folded, raw_token_count),
        3 => handle_three_token_whitelist(folded, fingerprint, raw_token_count),
        _ => false,
    }
}

/// `sp_password` truncates MS-SQL audit logging; its mere presence at the
/// end of a statement (the last folded token is a trailing comment that
/// swallowed the rest of the line) is always treated as an attack
/// regardless of the fingerprint shape. Unlike the keyword table's
/// case-insensitive lookup, this check is case-sensitive: the procedure
/// name itself is case-sensitive on the servers that special-case it.
fn contains_sp_password(input: &[u8]) -> bool {
    input.windows(b"sp_password".len()).any(|w| w == b"sp_password")
}

fn is_c_style_comment(value: &str) -> bool {
    value.starts_with("/*")
}

/// Length-2 fingerprint rescues. `a` is the statement's only real token,
/// `b` is whatever follows it (typically a trailing comment or a second
/// keyword-ish token); see `spec.md` §4.4.
fn handle_two_token_whitelist(input: &[u8], folded: &[Token], raw_token_count: usize) -> bool {
    let a = &folded[0];
    let b = &folded[1];
    let b_val = b.value_as_str();

    // `_U`: second token is UNION, rescued iff exactly 2 tokens were lexed.
    if b.token_type == TokenType::Union {
        return raw_token_count == 2;
    }

    // Second token's first byte is `#` (a bare MySQL comment marker that
    // never actually started a comment under this dialect pass).
    if b_val.as_bytes().first() == Some(&b'#') {
        return true;
    }

    let is_comment = b.token_type == TokenType::Comment;
    let c_style = is_comment && is_c_style_comment(b_val);

    // Bareword then a non-C-style comment: an ordinary identifier followed
    // by a line comment, not an injection shape.
    if a.token_type == TokenType::Bareword && is_comment && !c_style {
        return true;
    }

    // Number then a C-style comment: never rescued — `1/*...*/` is exactly
    // the comment-truncation shape the blacklist exists to catch.
    if a.token_type == TokenType::Number && c_style {
        return false;
    }

    // Number then any other comment: rescued unless there's more going on
    // than this one pair — either more tokens were actually lexed, or the
    // comment opens immediately (no separating whitespace) right after the
    // number.
    if a.token_type == TokenType::Number && is_comment {
        let after = a.pos + a.len;
        let next_is_white = input.get(after).copied().is_some_and(is_sql_white);
        let next_opens_comment = matches!(input.get(after..after + 2), Some(s) if s == b"/*" || s == b"--");
        return !(raw_token_count > 2 || next_is_white || next_opens_comment);
    }

    // Second token longer than 2 bytes and starting with `-`: an operator
    // chain (`--foo`) rather than a real second clause.
    if b_val.len() > 2 && b_val.as_bytes().first() == Some(&b'-') {
        return true;
    }

    false
}

fn is_sql_white(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\x0B' | b'\x0C' | b'\r' | 0 | 160)
}

/// Length-3 fingerprint rescues.
///
/// Three-token `sos`/`s&s` shapes: a string, a binary-ish middle token,
/// and a second string. These fold identically whether the input is an
/// inert two-literal expression or a real injection that closes one
/// string and opens another — the only thing that distinguishes them is
/// whether the first string's opening quote matches the second string's
/// closing quote (the hallmark of a quote that was never actually closed
/// by the application, just by the attacker's payload). The remaining
/// `&`-joined pairs and the bare-keyword-in-the-middle case are rescued
/// more liberally, per `spec.md` §4.4.
fn handle_three_token_whitelist(folded: &[Token], fingerprint: &str, raw_token_count: usize) -> bool {
    if fingerprint == "sos" || fingerprint == "s&s" {
        let unquoted_break_out = folded[0].str_open == CHAR_NULL
            && folded[2].str_close == CHAR_NULL
            && folded[0].str_close == folded[2].str_open;
        return !unquoted_break_out;
    }

    if matches!(fingerprint, "s&n" | "n&1" | "1&1" | "1&v" | "1&s") {
        return raw_token_count == 3;
    }

    let middle = &folded[1];
    if middle.token_type == TokenType::Keyword {
        let w = middle.value_as_str();
        let is_into_like = w.len() >= 5 && w.as_bytes()[..4].eq_ignore_ascii_case(b"into");
        if !is_into_like {
            return true;
        }
    }

    false
}
