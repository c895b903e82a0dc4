//! Static keyword table the tokenizer consults to classify barewords as
//! SQL keywords, functions, types, or operators.
//!
//! The table is sorted by lowercased keyword and searched with
//! [`binary_search_by`], matching the no-heap, no-hash-map spirit of the
//! rest of the tokenizer. It is a curated, representative set of
//! standard-SQL and common-dialect keywords, not an exhaustive corpus.

use crate::sqli::tokenizer::TokenType;

/// `(lowercased keyword, token type)`, sorted by keyword.
///
/// Three kinds of entry share this table: plain words, classified
/// independently (the folding pass that follows tokenization is what
/// collapses adjacent keyword tokens into multi-word constructs like
/// `GROUP BY`); a handful of two-word phrases, looked up directly by the
/// folder's generic bigram merge when it tries to collapse two adjacent
/// tokens into one; and sentinel fingerprint entries prefixed with the
/// digit `'0'` (a byte no real fingerprint ever starts with), which let
/// [`super::blacklist::is_blacklisted`] reuse this same table instead of
/// keeping a separate one.
const KEYWORDS: &[(&str, TokenType)] = &[
    ("01&1", TokenType::Fingerprint),
    ("01&1c", TokenType::Fingerprint),
    ("01&1v", TokenType::Fingerprint),
    ("01&1vc", TokenType::Fingerprint),
    ("01&s", TokenType::Fingerprint),
    ("01&sc", TokenType::Fingerprint),
    ("01&v", TokenType::Fingerprint),
    ("01&vc", TokenType::Fingerprint),
    ("01(1", TokenType::Fingerprint),
    ("01(1)", TokenType::Fingerprint),
    ("01(1)1", TokenType::Fingerprint),
    ("01(n)", TokenType::Fingerprint),
    ("01(v)", TokenType::Fingerprint),
    ("01,1", TokenType::Fingerprint),
    ("01,1c", TokenType::Fingerprint),
    ("01,s", TokenType::Fingerprint),
    ("01,v", TokenType::Fingerprint),
    ("01.1", TokenType::Fingerprint),
    ("01;1", TokenType::Fingerprint),
    ("01;s", TokenType::Fingerprint),
    ("01;v", TokenType::Fingerprint),
    ("01b", TokenType::Fingerprint),
    ("01c1", TokenType::Fingerprint),
    ("01ck1", TokenType::Fingerprint),
    ("01n1", TokenType::Fingerprint),
    ("01o1", TokenType::Fingerprint),
    ("01o1c", TokenType::Fingerprint),
    ("01o1o1", TokenType::Fingerprint),
    ("01os", TokenType::Fingerprint),
    ("01ov", TokenType::Fingerprint),
    ("01s1", TokenType::Fingerprint),
    ("01sc", TokenType::Fingerprint),
    ("01so", TokenType::Fingerprint),
    ("01u1", TokenType::Fingerprint),
    ("01ukok", TokenType::Fingerprint),
    ("01v1", TokenType::Fingerprint),
    ("01v1v1", TokenType::Fingerprint),
    ("01vc", TokenType::Fingerprint),
    ("0n(n(n))", TokenType::Fingerprint),
    ("0n(n)", TokenType::Fingerprint),
    ("0n(s)", TokenType::Fingerprint),
    ("0n(v)", TokenType::Fingerprint),
    ("0n,n", TokenType::Fingerprint),
    ("0s&1", TokenType::Fingerprint),
    ("0s&1c", TokenType::Fingerprint),
    ("0s&1uk", TokenType::Fingerprint),
    ("0s&s", TokenType::Fingerprint),
    ("0s&sc", TokenType::Fingerprint),
    ("0s&sos", TokenType::Fingerprint),
    ("0s&v", TokenType::Fingerprint),
    ("0s(", TokenType::Fingerprint),
    ("0s(n)", TokenType::Fingerprint),
    ("0s(s)", TokenType::Fingerprint),
    ("0s(v)", TokenType::Fingerprint),
    ("0s)", TokenType::Fingerprint),
    ("0s,n", TokenType::Fingerprint),
    ("0s,s", TokenType::Fingerprint),
    ("0s,v", TokenType::Fingerprint),
    ("0s-1", TokenType::Fingerprint),
    ("0s.1", TokenType::Fingerprint),
    ("0s;", TokenType::Fingerprint),
    ("0s;1", TokenType::Fingerprint),
    ("0s;n", TokenType::Fingerprint),
    ("0s;s", TokenType::Fingerprint),
    ("0s;v", TokenType::Fingerprint),
    ("0sb", TokenType::Fingerprint),
    ("0sos", TokenType::Fingerprint),
    ("0sos&", TokenType::Fingerprint),
    ("0soso", TokenType::Fingerprint),
    ("0sov", TokenType::Fingerprint),
    ("0sv", TokenType::Fingerprint),
    ("0svc", TokenType::Fingerprint),
    ("0v&1", TokenType::Fingerprint),
    ("0v(", TokenType::Fingerprint),
    ("0v)", TokenType::Fingerprint),
    ("0v,n", TokenType::Fingerprint),
    ("0v,v", TokenType::Fingerprint),
    ("0vn", TokenType::Fingerprint),
    ("0vo1", TokenType::Fingerprint),
    ("0vos", TokenType::Fingerprint),
    ("0vv", TokenType::Fingerprint),
    ("0x", TokenType::Fingerprint),
    ("add", TokenType::Keyword),
    ("all", TokenType::Keyword),
    ("alter", TokenType::Keyword),
    ("analyze", TokenType::Keyword),
    ("and", TokenType::LogicOperator),
    ("any", TokenType::Keyword),
    ("as", TokenType::Keyword),
    ("asc", TokenType::Keyword),
    ("avg", TokenType::Function),
    ("begin", TokenType::Keyword),
    ("between", TokenType::Keyword),
    ("bigint", TokenType::SqlType),
    ("binary", TokenType::SqlType),
    ("bit", TokenType::SqlType),
    ("blob", TokenType::SqlType),
    ("bool", TokenType::SqlType),
    ("boolean", TokenType::SqlType),
    ("by", TokenType::Keyword),
    ("call", TokenType::Keyword),
    ("case", TokenType::Keyword),
    ("cast", TokenType::Function),
    ("char", TokenType::SqlType),
    ("character", TokenType::SqlType),
    ("check", TokenType::Keyword),
    ("collate", TokenType::Collate),
    ("column", TokenType::Keyword),
    ("comment", TokenType::Keyword),
    ("commit", TokenType::Keyword),
    ("concat", TokenType::Function),
    ("constraint", TokenType::Keyword),
    ("convert", TokenType::Function),
    ("count", TokenType::Function),
    ("create", TokenType::Keyword),
    ("cross", TokenType::Keyword),
    ("cross join", TokenType::Keyword),
    ("current_date", TokenType::Function),
    ("current_time", TokenType::Function),
    ("current_timestamp", TokenType::Function),
    ("current_user", TokenType::Function),
    ("database", TokenType::Keyword),
    ("date", TokenType::SqlType),
    ("datetime", TokenType::SqlType),
    ("decimal", TokenType::SqlType),
    ("declare", TokenType::Keyword),
    ("default", TokenType::Keyword),
    ("delete", TokenType::Keyword),
    ("desc", TokenType::Keyword),
    ("describe", TokenType::Keyword),
    ("distinct", TokenType::Keyword),
    ("double", TokenType::SqlType),
    ("drop", TokenType::Keyword),
    ("else", TokenType::Keyword),
    ("elseif", TokenType::Keyword),
    ("end", TokenType::Keyword),
    ("enum", TokenType::SqlType),
    ("escape", TokenType::Keyword),
    ("except", TokenType::Union),
    ("exec", TokenType::Keyword),
    ("execute", TokenType::Keyword),
    ("exists", TokenType::Keyword),
    ("explain", TokenType::Keyword),
    ("extract", TokenType::Function),
    ("false", TokenType::Bareword),
    ("float", TokenType::SqlType),
    ("for", TokenType::Keyword),
    ("foreign", TokenType::Keyword),
    ("from", TokenType::Keyword),
    ("full", TokenType::Keyword),
    ("function", TokenType::Keyword),
    ("grant", TokenType::Keyword),
    ("group", TokenType::Keyword),
    ("group by", TokenType::Keyword),
    ("group_concat", TokenType::Function),
    ("having", TokenType::Keyword),
    ("if", TokenType::Keyword),
    ("ifnull", TokenType::Function),
    ("in", TokenType::Keyword),
    ("index", TokenType::Keyword),
    ("inner", TokenType::Keyword),
    ("inner join", TokenType::Keyword),
    ("insert", TokenType::Keyword),
    ("int", TokenType::SqlType),
    ("integer", TokenType::SqlType),
    ("intersect", TokenType::Union),
    ("into", TokenType::Keyword),
    ("is", TokenType::Keyword),
    ("is not", TokenType::Operator),
    ("join", TokenType::Keyword),
    ("key", TokenType::Keyword),
    ("left", TokenType::Keyword),
    ("left join", TokenType::Keyword),
    ("like", TokenType::Operator),
    ("limit", TokenType::Keyword),
    ("load_file", TokenType::Function),
    ("loop", TokenType::Keyword),
    ("max", TokenType::Function),
    ("mediumint", TokenType::SqlType),
    ("min", TokenType::Function),
    ("not", TokenType::Keyword),
    ("not in", TokenType::Keyword),
    ("not like", TokenType::Operator),
    ("null", TokenType::Keyword),
    ("numeric", TokenType::SqlType),
    ("offset", TokenType::Keyword),
    ("on", TokenType::Keyword),
    ("or", TokenType::LogicOperator),
    ("order", TokenType::Keyword),
    ("order by", TokenType::Keyword),
    ("outer", TokenType::Keyword),
    ("outer join", TokenType::Keyword),
    ("outfile", TokenType::Keyword),
    ("primary", TokenType::Keyword),
    ("primary key", TokenType::Keyword),
    ("procedure", TokenType::Keyword),
    ("real", TokenType::SqlType),
    ("references", TokenType::Keyword),
    ("regexp", TokenType::Keyword),
    ("replace", TokenType::Function),
    ("return", TokenType::Keyword),
    ("revoke", TokenType::Keyword),
    ("right", TokenType::Keyword),
    ("right join", TokenType::Keyword),
    ("rlike", TokenType::Keyword),
    ("rollback", TokenType::Keyword),
    ("row", TokenType::Keyword),
    ("schema", TokenType::Keyword),
    ("select", TokenType::Keyword),
    ("set", TokenType::Keyword),
    ("show", TokenType::Keyword),
    ("smallint", TokenType::SqlType),
    ("some", TokenType::Keyword),
    ("sp_password", TokenType::Bareword),
    ("substring", TokenType::Function),
    ("sum", TokenType::Function),
    ("table", TokenType::Keyword),
    ("text", TokenType::SqlType),
    ("then", TokenType::Keyword),
    ("timestamp", TokenType::SqlType),
    ("tinyint", TokenType::SqlType),
    ("to", TokenType::Keyword),
    ("top", TokenType::Keyword),
    ("transaction", TokenType::Keyword),
    ("trigger", TokenType::Keyword),
    ("true", TokenType::Bareword),
    ("truncate", TokenType::Keyword),
    ("union", TokenType::Union),
    ("union all", TokenType::Union),
    ("unique", TokenType::Keyword),
    ("update", TokenType::Keyword),
    ("use", TokenType::Keyword),
    ("user", TokenType::Keyword),
    ("values", TokenType::Keyword),
    ("varbinary", TokenType::SqlType),
    ("varchar", TokenType::SqlType),
    ("view", TokenType::Keyword),
    ("when", TokenType::Keyword),
    ("where", TokenType::Keyword),
    ("while", TokenType::Keyword),
    ("with", TokenType::Keyword),
    ("xor", TokenType::LogicOperator),
];

/// Looks up a bareword's classification, case-insensitively. Returns
/// [`TokenType::None`] for anything not in the table, which the caller
/// treats as an ordinary bareword/identifier.
pub fn lookup_word(word: &str) -> TokenType {
    if word.len() > 32 {
        return TokenType::None;
    }

    let mut buf = [0u8; 32];
    let bytes = word.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        buf[i] = b.to_ascii_lowercase();
    }
    let lowered = core::str::from_utf8(&buf[..bytes.len()]).unwrap_or("");

    match KEYWORDS.binary_search_by(|&(k, _)| k.cmp(lowered)) {
        Ok(idx) => KEYWORDS[idx].1,
        Err(_) => TokenType::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_sorted() {
        for pair in KEYWORDS.windows(2) {
            assert!(pair[0].0 < pair[1].0, "{} should sort before {}", pair[0].0, pair[1].0);
        }
    }

    #[test]
    fn finds_keyword_case_insensitively() {
        assert_eq!(lookup_word("SELECT"), TokenType::Keyword);
        assert_eq!(lookup_word("select"), TokenType::Keyword);
        assert_eq!(lookup_word("SeLeCt"), TokenType::Keyword);
    }

    #[test]
    fn finds_logic_operator() {
        assert_eq!(lookup_word("or"), TokenType::LogicOperator);
        assert_eq!(lookup_word("and"), TokenType::LogicOperator);
    }

    #[test]
    fn finds_function() {
        assert_eq!(lookup_word("count"), TokenType::Function);
    }

    #[test]
    fn unknown_word_is_none() {
        assert_eq!(lookup_word("frobnicate"), TokenType::None);
    }

    #[test]
    fn sp_password_is_found_but_not_specialcased_here() {
        assert_eq!(lookup_word("sp_password"), TokenType::Bareword);
    }

    #[test]
    fn finds_multiword_phrase_case_insensitively() {
        assert_eq!(lookup_word("GROUP BY"), TokenType::Keyword);
        assert_eq!(lookup_word("Not Like"), TokenType::Operator);
    }

    #[test]
    fn finds_fingerprint_sentinel() {
        assert_eq!(lookup_word("01&1"), TokenType::Fingerprint);
        assert_eq!(lookup_word("0x"), TokenType::Fingerprint);
    }
}
