//! Surface type expression parsers.
//!
//! type := prim | "[" type "]" | "Array" "<" type ">"
//!       | "[" type ":" type "]" | "Dict" "<" type "," type ">"
//!       | "(" (type ("," type)*)? ")" "=>" type
//!       | IDENT

use crate::ast::expression::Ident;
use crate::ast::types::TypeExpr;
use crate::lexer::TokenKind;

use crate::parser::combinators::{expect, BoxedParser};
use crate::parser::state::{ParseState, Parser};

pub fn type_expr() -> BoxedParser<TypeExpr> {
    BoxedParser::new(move |state: &mut ParseState| {
        match state.peek().map(|t| t.kind.clone()) {
            // "(" (type ("," type)*)? ")" "=>" type
            Some(TokenKind::LParen) => {
                let lparen = state.advance().unwrap();
                let mut params = Vec::new();
                if !matches!(state.peek().map(|t| &t.kind), Some(TokenKind::RParen)) {
                    params.push(type_expr().parse(state)?);
                    while matches!(state.peek().map(|t| &t.kind), Some(TokenKind::Comma)) {
                        state.advance();
                        params.push(type_expr().parse(state)?);
                    }
                }
                expect(TokenKind::RParen).parse(state)?;
                expect(TokenKind::FatArrow).parse(state)?;
                let ret = type_expr().parse(state)?;
                let position = lparen.span.merge(ret.position());
                Ok(TypeExpr::Function(params, Box::new(ret), position))
            }

            // "[" type "]" or "[" type ":" type "]"
            Some(TokenKind::LBracket) => {
                let lbracket = state.advance().unwrap();
                let first = type_expr().parse(state)?;
                if matches!(state.peek().map(|t| &t.kind), Some(TokenKind::Colon)) {
                    state.advance();
                    let value = type_expr().parse(state)?;
                    let rbracket = expect(TokenKind::RBracket).parse(state)?;
                    Ok(TypeExpr::Dict(
                        Box::new(first),
                        Box::new(value),
                        lbracket.span.merge(rbracket.span),
                    ))
                } else {
                    let rbracket = expect(TokenKind::RBracket).parse(state)?;
                    Ok(TypeExpr::Array(
                        Box::new(first),
                        lbracket.span.merge(rbracket.span),
                    ))
                }
            }

            // `null` and `undefined` lex as keywords, not identifiers.
            Some(TokenKind::Null) => {
                let tok = state.advance().unwrap();
                Ok(TypeExpr::Null(tok.span))
            }
            Some(TokenKind::Undefined) => {
                let tok = state.advance().unwrap();
                Ok(TypeExpr::Undefined(tok.span))
            }

            Some(TokenKind::Ident(name)) => {
                let tok = state.advance().unwrap();
                let span = tok.span;
                match name.as_str() {
                    "number" => Ok(TypeExpr::Number(span)),
                    "string" => Ok(TypeExpr::Str(span)),
                    "boolean" => Ok(TypeExpr::Boolean(span)),
                    "unit" => Ok(TypeExpr::Unit(span)),
                    "Array" => {
                        expect(TokenKind::Lt).parse(state)?;
                        let inner = type_expr().parse(state)?;
                        let gt = expect(TokenKind::Gt).parse(state)?;
                        Ok(TypeExpr::Array(Box::new(inner), span.merge(gt.span)))
                    }
                    "Dict" => {
                        expect(TokenKind::Lt).parse(state)?;
                        let key = type_expr().parse(state)?;
                        expect(TokenKind::Comma).parse(state)?;
                        let value = type_expr().parse(state)?;
                        let gt = expect(TokenKind::Gt).parse(state)?;
                        Ok(TypeExpr::Dict(
                            Box::new(key),
                            Box::new(value),
                            span.merge(gt.span),
                        ))
                    }
                    _ => Ok(TypeExpr::Name(Ident {
                        name,
                        position: span,
                    })),
                }
            }

            _ => Err(state.error_here("unexpected token").expected("type")),
        }
    })
}
