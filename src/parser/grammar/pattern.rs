//! Pattern parsers for `match` cases.

use crate::ast::pattern::Pattern;
use crate::lexer::TokenKind;

use crate::parser::combinators::{expect, ident, number, string_literal, BoxedParser};
use crate::parser::state::{ParseState, Parser};

use super::literal::{boolean, null};

/// pattern := "_" | NUMBER | STRING | "true" | "false" | "null" | IDENT
pub fn pattern() -> BoxedParser<Pattern> {
    BoxedParser::new(move |state: &mut ParseState| {
        match state.peek().map(|t| &t.kind) {
            Some(TokenKind::Underscore) => {
                let tok = expect(TokenKind::Underscore).parse(state)?;
                Ok(Pattern::Wildcard(tok.span))
            }
            Some(TokenKind::Number(_)) => Ok(Pattern::Number(number().parse(state)?)),
            Some(TokenKind::Str(_)) => Ok(Pattern::Str(string_literal().parse(state)?)),
            Some(TokenKind::True) | Some(TokenKind::False) => {
                Ok(Pattern::Boolean(boolean().parse(state)?))
            }
            Some(TokenKind::Null) => Ok(Pattern::Null(null().parse(state)?)),
            Some(TokenKind::Ident(_)) => Ok(Pattern::Ident(ident().parse(state)?)),
            _ => Err(state.error_here("unknown pattern").expected("pattern")),
        }
    })
}
