//! End-to-end scenarios over [`SqliState::detect`], exercising the
//! tokenizer, folder, and classifier together the way `is_sqli` does.

use super::*;

fn detects(input: &[u8]) -> bool {
    SqliState::new(input, SqliFlags::FLAG_SQL_ANSI).detect()
}

#[test]
fn comment_truncated_union_load_file_is_flagged() {
    assert!(detects(b"-1' and 1=1 union/* foo */select load_file('/etc/passwd')--"));
}

#[test]
fn classic_tautology_is_flagged() {
    assert!(detects(b"1' OR '1'='1"));
}

#[test]
fn bare_union_select_is_flagged() {
    assert!(detects(b"1 UNION SELECT * FROM users"));
}

#[test]
fn email_address_is_not_flagged() {
    assert!(!detects(b"john.doe@example.com"));
}

#[test]
fn plain_integer_is_not_flagged() {
    assert!(!detects(b"12345"));
}

#[test]
fn empty_and_whitespace_only_are_not_flagged() {
    assert!(!detects(b""));
    assert!(!detects(b"   "));
    assert!(!detects(b"\t\n\r "));
}

#[test]
fn fingerprint_length_never_exceeds_five() {
    let mut state = SqliState::new(b"1 UNION SELECT a,b,c,d,e,f FROM users WHERE 1=1", SqliFlags::FLAG_SQL_ANSI);
    let fp = state.get_fingerprint();
    assert!(fp.as_str().len() <= LIBINJECTION_SQLI_MAX_TOKENS);
}

#[test]
fn nested_comment_forces_evil_fingerprint() {
    let mut state = SqliState::new(b"/* a /* b */ c */ 1", SqliFlags::FLAG_SQL_ANSI);
    let fp = state.get_fingerprint();
    assert_eq!(fp.as_str(), "X");
}

#[test]
fn folding_is_a_fixed_point() {
    let input: &[u8] = b"1 OR 1=1 AND 2=2";
    let mut a = SqliState::new(input, SqliFlags::FLAG_SQL_ANSI);
    let mut b = SqliState::new(input, SqliFlags::FLAG_SQL_ANSI);
    assert_eq!(a.get_fingerprint().as_str(), b.get_fingerprint().as_str());
}

#[test]
fn single_colon_cast_folds_to_the_operand() {
    let mut tok = tokenizer::SqliTokenizer::new(b"x:int", SqliFlags::FLAG_SQL_ANSI);
    let mut raw = Vec::new();
    while let Some(t) = tok.next_token() {
        raw.push(t);
    }
    assert_eq!(raw.len(), 3);

    let folded = sqli_fold(&raw);
    assert_eq!(folded.len(), 1);
    assert_eq!(folded[0].token_type, TokenType::Bareword);
}

#[test]
fn input_without_sql_markers_is_never_flagged() {
    for input in [
        "hello world",
        "the quick brown fox",
        "user_id_12345",
        "a plain sentence with no operators",
    ] {
        assert!(!detects(input.as_bytes()), "{input:?} should not be flagged");
    }
}
