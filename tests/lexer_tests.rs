//! Lexer tests over the public token stream, including the serialized
//! form consumed by external tooling.

use rill::lexer::{lex, TokenKind};
use rill::span::Span;

fn kinds(source: &str) -> Vec<TokenKind> {
    lex(source)
        .expect("lexing failed")
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

#[test]
fn full_statement_tokenizes() {
    assert_eq!(
        kinds(r#"let msg = if (ok) "yes" else "no""#),
        vec![
            TokenKind::Let,
            TokenKind::Ident("msg".to_string()),
            TokenKind::Eq,
            TokenKind::If,
            TokenKind::LParen,
            TokenKind::Ident("ok".to_string()),
            TokenKind::RParen,
            TokenKind::Str("yes".to_string()),
            TokenKind::Else,
            TokenKind::Str("no".to_string()),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn numbers_decode_to_doubles() {
    assert_eq!(
        kinds("0 7 3.5 10.25"),
        vec![
            TokenKind::Number(0.0),
            TokenKind::Number(7.0),
            TokenKind::Number(3.5),
            TokenKind::Number(10.25),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn comment_only_source_is_just_eof() {
    assert_eq!(kinds("// nothing here"), vec![TokenKind::Eof]);
    assert_eq!(
        kinds("// a\n// b\n// c"),
        vec![TokenKind::Eof]
    );
}

#[test]
fn comments_do_not_swallow_code() {
    assert_eq!(
        kinds("1 // one\n+ 2"),
        vec![
            TokenKind::Number(1.0),
            TokenKind::Plus,
            TokenKind::Number(2.0),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn slashes_inside_strings_are_not_comments() {
    assert_eq!(
        kinds(r#""http://example""#),
        vec![TokenKind::Str("http://example".to_string()), TokenKind::Eof]
    );
}

#[test]
fn multibyte_content_in_strings() {
    assert_eq!(
        kinds(r#""héllo → wörld""#),
        vec![
            TokenKind::Str("héllo → wörld".to_string()),
            TokenKind::Eof
        ]
    );
}

#[test]
fn error_spans_point_at_the_offending_character() {
    let err = lex("let x =\n  #").unwrap_err();
    assert_eq!(err.span, Span::new(2, 3, 2, 4));
}

#[test]
fn unknown_escape_is_rejected() {
    let err = lex(r#""a\qb""#).unwrap_err();
    assert!(err.message.contains("escape"));
}

#[test]
fn tokens_serialize_to_json() {
    let tokens = lex("let x = 1").unwrap();
    let json = serde_json::to_string(&tokens).expect("serialization failed");
    assert!(json.contains("\"Let\""));
    assert!(json.contains("\"start_line\":1"));

    let token = &tokens[3];
    let json = serde_json::to_value(token).unwrap();
    assert_eq!(json["kind"]["Number"], 1.0);
}

#[test]
fn token_describe_is_human_readable() {
    let tokens = lex(r#"name "hi" 4 =>"#).unwrap();
    assert_eq!(tokens[0].describe(), "identifier 'name'");
    assert_eq!(tokens[1].describe(), "string \"hi\"");
    assert_eq!(tokens[2].describe(), "number '4'");
    assert_eq!(tokens[3].describe(), "'=>'");
    assert_eq!(tokens[4].describe(), "end of input");
}
