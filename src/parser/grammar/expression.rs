//! Expression parsers: the precedence chain, postfix forms, and primaries.
//!
//! Precedence from loosest to tightest: `||`, `&&`, equality, relational,
//! additive, multiplicative, unary, postfix (call/member/index), primary.
//! Binary levels are left-associative; unary operators are
//! right-associative.

use crate::ast::expression::{
    ArrayLit, BinOpKind, BinaryOp, Block, Call, DictLit, Expression, FunctionLit, IfExpr,
    IndexAccess, MatchCase, MatchExpr, MemberAccess, Param, RecordLit, UnaryOp, UnaryOpKind,
};
use crate::lexer::TokenKind;

use crate::parser::combinators::{
    expect, ident, number, optional, sep_by1, string_literal, BoxedParser,
};
use crate::parser::state::{ParseError, ParseResult, ParseState, Parser};

use super::literal::{boolean, null, undefined};
use super::pattern::pattern;
use super::statement_sequence;
use super::types::type_expr;

/// expression := logical_or
pub fn expression() -> BoxedParser<Expression> {
    logical_or()
}

/// Left-associative binary operator level: `next ((op) next)*`.
fn binary_chain(
    ops: Vec<(TokenKind, BinOpKind)>,
    next: BoxedParser<Expression>,
) -> BoxedParser<Expression> {
    BoxedParser::new(move |state: &mut ParseState| {
        let mut left = next.parse(state)?;

        loop {
            let op = match state.peek() {
                Some(tok) => ops.iter().find(|(kind, _)| *kind == tok.kind).map(|(_, op)| *op),
                None => None,
            };
            let Some(op) = op else { break };
            state.advance();

            let right = next.parse(state)?;
            let position = left.position().merge(right.position());
            left = Expression::Binary(BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
                position,
            });
        }

        Ok(left)
    })
}

/// logical_or := logical_and ("||" logical_and)*
fn logical_or() -> BoxedParser<Expression> {
    binary_chain(vec![(TokenKind::PipePipe, BinOpKind::Or)], logical_and())
}

/// logical_and := equality ("&&" equality)*
fn logical_and() -> BoxedParser<Expression> {
    binary_chain(vec![(TokenKind::AmpAmp, BinOpKind::And)], equality())
}

/// equality := relational (("==" | "!=") relational)*
fn equality() -> BoxedParser<Expression> {
    binary_chain(
        vec![
            (TokenKind::EqEq, BinOpKind::Eq),
            (TokenKind::NotEq, BinOpKind::NotEq),
        ],
        relational(),
    )
}

/// relational := additive (("<" | "<=" | ">" | ">=") additive)*
fn relational() -> BoxedParser<Expression> {
    binary_chain(
        vec![
            (TokenKind::Lt, BinOpKind::Lt),
            (TokenKind::LtEq, BinOpKind::LtEq),
            (TokenKind::Gt, BinOpKind::Gt),
            (TokenKind::GtEq, BinOpKind::GtEq),
        ],
        additive(),
    )
}

/// additive := multiplicative (("+" | "-") multiplicative)*
fn additive() -> BoxedParser<Expression> {
    binary_chain(
        vec![
            (TokenKind::Plus, BinOpKind::Add),
            (TokenKind::Minus, BinOpKind::Sub),
        ],
        multiplicative(),
    )
}

/// multiplicative := unary (("*" | "/" | "%") unary)*
fn multiplicative() -> BoxedParser<Expression> {
    binary_chain(
        vec![
            (TokenKind::Star, BinOpKind::Mul),
            (TokenKind::Slash, BinOpKind::Div),
            (TokenKind::Percent, BinOpKind::Rem),
        ],
        unary(),
    )
}

/// unary := ("!" | "-") unary | postfix
fn unary() -> BoxedParser<Expression> {
    BoxedParser::new(move |state: &mut ParseState| {
        let op = match state.peek().map(|t| &t.kind) {
            Some(TokenKind::Minus) => Some(UnaryOpKind::Neg),
            Some(TokenKind::Bang) => Some(UnaryOpKind::Not),
            _ => None,
        };

        match op {
            Some(op) => {
                let tok = state.advance().unwrap();
                let operand = unary().parse(state)?;
                let position = tok.span.merge(operand.position());
                Ok(Expression::Unary(UnaryOp {
                    op,
                    operand: Box::new(operand),
                    position,
                }))
            }
            None => postfix().parse(state),
        }
    })
}

/// postfix := primary ("(" args? ")" | "." IDENT | "[" expression "]")*
fn postfix() -> BoxedParser<Expression> {
    BoxedParser::new(move |state: &mut ParseState| {
        let mut expr = primary().parse(state)?;

        loop {
            match state.peek().map(|t| &t.kind) {
                Some(TokenKind::LParen) => {
                    state.advance();
                    let mut args = Vec::new();
                    if !matches!(state.peek().map(|t| &t.kind), Some(TokenKind::RParen)) {
                        args.push(expression().parse(state)?);
                        while matches!(state.peek().map(|t| &t.kind), Some(TokenKind::Comma)) {
                            state.advance();
                            args.push(expression().parse(state)?);
                        }
                    }
                    let rparen = expect(TokenKind::RParen).parse(state)?;
                    let position = expr.position().merge(rparen.span);
                    expr = Expression::Call(Call {
                        callee: Box::new(expr),
                        args,
                        position,
                    });
                }
                Some(TokenKind::Dot) => {
                    state.advance();
                    let field = ident().label("field name").parse(state)?;
                    let position = expr.position().merge(field.position);
                    expr = Expression::Member(MemberAccess {
                        object: Box::new(expr),
                        field,
                        position,
                    });
                }
                Some(TokenKind::LBracket) => {
                    state.advance();
                    let index = expression().parse(state)?;
                    let rbracket = expect(TokenKind::RBracket).parse(state)?;
                    let position = expr.position().merge(rbracket.span);
                    expr = Expression::Index(IndexAccess {
                        object: Box::new(expr),
                        index: Box::new(index),
                        position,
                    });
                }
                _ => break,
            }
        }

        Ok(expr)
    })
}

/// primary := NUMBER | STRING | "true" | "false" | "null" | "undefined"
///          | IDENT "=>" expression | IDENT
///          | "(" … ")" (function literal or parenthesized expression)
///          | "if" "(" expression ")" expression ("else" expression)?
///          | "match" expression "{" match_case ("," match_case)* ","? "}"
///          | "[" array_or_dict "]"
///          | "{" block_or_record "}"
fn primary() -> BoxedParser<Expression> {
    BoxedParser::new(move |state: &mut ParseState| {
        let Some(tok) = state.peek() else {
            return Err(ParseError::new("unexpected end of input").expected("expression"));
        };

        match &tok.kind {
            TokenKind::Number(_) => Ok(Expression::Number(number().parse(state)?)),
            TokenKind::Str(_) => Ok(Expression::Str(string_literal().parse(state)?)),
            TokenKind::True | TokenKind::False => Ok(Expression::Boolean(boolean().parse(state)?)),
            TokenKind::Null => Ok(Expression::Null(null().parse(state)?)),
            TokenKind::Undefined => Ok(Expression::Undefined(undefined().parse(state)?)),
            TokenKind::If => if_expression(state),
            TokenKind::Match => match_expression(state),
            TokenKind::LBracket => array_or_dict(state),
            TokenKind::LBrace => block_or_record(state),
            TokenKind::LParen => {
                // Requires look-ahead: a parameter list followed by an
                // optional return annotation and `=>` is a function
                // literal; anything else is a parenthesized expression.
                let pos = state.position();
                match paren_function(state) {
                    Ok(expr) => Ok(expr),
                    Err(_) => {
                        state.restore(pos);
                        expect(TokenKind::LParen).parse(state)?;
                        let inner = expression().parse(state)?;
                        expect(TokenKind::RParen).parse(state)?;
                        Ok(inner)
                    }
                }
            }
            TokenKind::Ident(_) => {
                // `x => body` is the only paren-free function literal form.
                if matches!(state.peek_next().map(|t| &t.kind), Some(TokenKind::FatArrow)) {
                    let name = ident().parse(state)?;
                    expect(TokenKind::FatArrow).parse(state)?;
                    let body = expression().parse(state)?;
                    let position = name.position.merge(body.position());
                    Ok(Expression::Function(FunctionLit {
                        params: vec![Param {
                            name,
                            annotation: None,
                        }],
                        return_annotation: None,
                        body: Box::new(body),
                        position,
                    }))
                } else {
                    Ok(Expression::Ident(ident().parse(state)?))
                }
            }
            _ => Err(state.error_here("unexpected token").expected("expression")),
        }
    })
}

/// Function literal with a parenthesized parameter list:
/// `( param ("," param)* )? (":" type)? "=>" expression`
fn paren_function(state: &mut ParseState) -> ParseResult<Expression> {
    let lparen = expect(TokenKind::LParen).parse(state)?;

    let mut params = Vec::new();
    if !matches!(state.peek().map(|t| &t.kind), Some(TokenKind::RParen)) {
        params.push(param(state)?);
        while matches!(state.peek().map(|t| &t.kind), Some(TokenKind::Comma)) {
            state.advance();
            params.push(param(state)?);
        }
    }
    expect(TokenKind::RParen).parse(state)?;

    let return_annotation = if matches!(state.peek().map(|t| &t.kind), Some(TokenKind::Colon)) {
        state.advance();
        Some(type_expr().parse(state)?)
    } else {
        None
    };

    expect(TokenKind::FatArrow).parse(state)?;
    let body = expression().parse(state)?;

    let position = lparen.span.merge(body.position());
    Ok(Expression::Function(FunctionLit {
        params,
        return_annotation,
        body: Box::new(body),
        position,
    }))
}

/// param := IDENT (":" type)?
fn param(state: &mut ParseState) -> ParseResult<Param> {
    let name = ident().label("parameter name").parse(state)?;
    let annotation = if matches!(state.peek().map(|t| &t.kind), Some(TokenKind::Colon)) {
        state.advance();
        Some(type_expr().parse(state)?)
    } else {
        None
    };
    Ok(Param { name, annotation })
}

/// if := "if" "(" expression ")" expression ("else" expression)?
fn if_expression(state: &mut ParseState) -> ParseResult<Expression> {
    let if_tok = expect(TokenKind::If).parse(state)?;
    expect(TokenKind::LParen).parse(state)?;
    let condition = expression().parse(state)?;
    expect(TokenKind::RParen).parse(state)?;
    let then_branch = expression().parse(state)?;

    let else_branch = if matches!(state.peek().map(|t| &t.kind), Some(TokenKind::Else)) {
        state.advance();
        Some(Box::new(expression().parse(state)?))
    } else {
        None
    };

    let position = match &else_branch {
        Some(e) => if_tok.span.merge(e.position()),
        None => if_tok.span.merge(then_branch.position()),
    };
    Ok(Expression::If(IfExpr {
        condition: Box::new(condition),
        then_branch: Box::new(then_branch),
        else_branch,
        position,
    }))
}

/// match := "match" expression "{" match_case ("," match_case)* ","? "}"
fn match_expression(state: &mut ParseState) -> ParseResult<Expression> {
    let match_tok = expect(TokenKind::Match).parse(state)?;
    let discriminant = expression().parse(state)?;
    expect(TokenKind::LBrace).parse(state)?;

    let mut cases = vec![match_case(state)?];
    loop {
        if matches!(state.peek().map(|t| &t.kind), Some(TokenKind::Comma)) {
            state.advance();
            // Tolerate a trailing comma before the closing brace.
            if matches!(state.peek().map(|t| &t.kind), Some(TokenKind::RBrace)) {
                break;
            }
            cases.push(match_case(state)?);
        } else {
            break;
        }
    }
    let rbrace = expect(TokenKind::RBrace).parse(state)?;

    let position = match_tok.span.merge(rbrace.span);
    Ok(Expression::Match(MatchExpr {
        discriminant: Box::new(discriminant),
        cases,
        position,
    }))
}

/// match_case := pattern ("if" expression)? "=>" expression
fn match_case(state: &mut ParseState) -> ParseResult<MatchCase> {
    let pat = pattern().parse(state)?;

    let guard = if matches!(state.peek().map(|t| &t.kind), Some(TokenKind::If)) {
        state.advance();
        Some(expression().parse(state)?)
    } else {
        None
    };

    expect(TokenKind::FatArrow).parse(state)?;
    let body = expression().parse(state)?;

    let position = pat.position().merge(body.position());
    Ok(MatchCase {
        pattern: pat,
        guard,
        body,
        position,
    })
}

/// `[` … `]`: an array literal, unless the first element is followed by
/// `:`, which makes it a dictionary literal. `[]` is an empty array.
fn array_or_dict(state: &mut ParseState) -> ParseResult<Expression> {
    let lbracket = expect(TokenKind::LBracket).parse(state)?;

    if matches!(state.peek().map(|t| &t.kind), Some(TokenKind::RBracket)) {
        let rbracket = state.advance().unwrap();
        return Ok(Expression::Array(ArrayLit {
            elements: Vec::new(),
            position: lbracket.span.merge(rbracket.span),
        }));
    }

    let first = expression().parse(state)?;

    if matches!(state.peek().map(|t| &t.kind), Some(TokenKind::Colon)) {
        state.advance();
        let first_value = expression().parse(state)?;
        let mut entries = vec![(first, first_value)];
        while matches!(state.peek().map(|t| &t.kind), Some(TokenKind::Comma)) {
            state.advance();
            let key = expression().parse(state)?;
            expect(TokenKind::Colon).parse(state)?;
            let value = expression().parse(state)?;
            entries.push((key, value));
        }
        let rbracket = expect(TokenKind::RBracket).parse(state)?;
        Ok(Expression::Dict(DictLit {
            entries,
            position: lbracket.span.merge(rbracket.span),
        }))
    } else {
        let mut elements = vec![first];
        while matches!(state.peek().map(|t| &t.kind), Some(TokenKind::Comma)) {
            state.advance();
            elements.push(expression().parse(state)?);
        }
        let rbracket = expect(TokenKind::RBracket).parse(state)?;
        Ok(Expression::Array(ArrayLit {
            elements,
            position: lbracket.span.merge(rbracket.span),
        }))
    }
}

/// `{` … `}`: a record literal when the first token is `}` (empty record)
/// or an identifier/string followed by `:`; otherwise a block expression.
fn block_or_record(state: &mut ParseState) -> ParseResult<Expression> {
    let lbrace = expect(TokenKind::LBrace).parse(state)?;

    if matches!(state.peek().map(|t| &t.kind), Some(TokenKind::RBrace)) {
        let rbrace = state.advance().unwrap();
        return Ok(Expression::Record(RecordLit {
            fields: Vec::new(),
            position: lbrace.span.merge(rbrace.span),
        }));
    }

    let starts_record = matches!(
        (
            state.peek().map(|t| &t.kind),
            state.peek_next().map(|t| &t.kind)
        ),
        (
            Some(TokenKind::Ident(_)) | Some(TokenKind::Str(_)),
            Some(TokenKind::Colon)
        )
    );

    if starts_record {
        let fields = sep_by1(BoxedParser::new(record_field), expect(TokenKind::Comma))
            .parse(state)?;
        let rbrace = expect(TokenKind::RBrace).parse(state)?;

        for (i, (name, _)) in fields.iter().enumerate() {
            if fields[..i].iter().any(|(other, _)| other.name == name.name) {
                return Err(ParseError::new(format!(
                    "duplicate field '{}' in record literal",
                    name.name
                ))
                .at(name.position));
            }
        }

        Ok(Expression::Record(RecordLit {
            fields,
            position: lbrace.span.merge(rbrace.span),
        }))
    } else {
        let statements = statement_sequence(state, |s| {
            matches!(s.peek().map(|t| &t.kind), Some(TokenKind::RBrace)) || s.at_eof()
        })?;
        let rbrace = expect(TokenKind::RBrace).parse(state)?;
        Ok(Expression::Block(Block {
            statements,
            position: lbrace.span.merge(rbrace.span),
        }))
    }
}

/// record_field := (IDENT | STRING) ":" expression
fn record_field(
    state: &mut ParseState,
) -> ParseResult<(crate::ast::expression::Ident, Expression)> {
    let name = match state.peek().map(|t| &t.kind) {
        Some(TokenKind::Str(_)) => {
            let lit = string_literal().parse(state)?;
            crate::ast::expression::Ident {
                name: lit.value,
                position: lit.position,
            }
        }
        _ => ident().label("field name").parse(state)?,
    };
    expect(TokenKind::Colon).parse(state)?;
    let value = expression().parse(state)?;
    Ok((name, value))
}

/// Parse an optional annotation introduced by `:`. Shared with statements.
pub(crate) fn optional_annotation() -> BoxedParser<Option<crate::ast::types::TypeExpr>> {
    optional(expect(TokenKind::Colon) * type_expr())
}
