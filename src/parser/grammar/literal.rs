//! Literal parsers for the Rill language.

use crate::ast::expression::{BooleanLit, NullLit, UndefinedLit};
use crate::lexer::TokenKind;

use crate::parser::combinators::{expect, BoxedParser};

/// boolean := "true" | "false"
pub fn boolean() -> BoxedParser<BooleanLit> {
    let true_lit = expect(TokenKind::True) >> |tok| BooleanLit {
        value: true,
        position: tok.span,
    };
    let false_lit = expect(TokenKind::False) >> |tok| BooleanLit {
        value: false,
        position: tok.span,
    };
    true_lit | false_lit
}

/// null := "null"
pub fn null() -> BoxedParser<NullLit> {
    expect(TokenKind::Null) >> |tok| NullLit { position: tok.span }
}

/// undefined := "undefined"
pub fn undefined() -> BoxedParser<UndefinedLit> {
    expect(TokenKind::Undefined) >> |tok| UndefinedLit { position: tok.span }
}
