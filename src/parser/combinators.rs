//! Parser combinators: a boxed, clonable parser type with operator sugar,
//! plus the token-level primitive parsers the grammar rules are built from.

use std::ops::{Add, BitOr, Mul, Shr, Sub};
use std::rc::Rc;

use crate::ast::expression::{Ident, NumberLit, StringLit};
use crate::lexer::{Token, TokenKind};

use super::state::{ParseError, ParseResult, ParseState, Parser};

// === Boxed Parser for type erasure ===

pub struct BoxedParser<T> {
    parser: Rc<dyn Fn(&mut ParseState) -> ParseResult<T>>,
}

impl<T> Clone for BoxedParser<T> {
    fn clone(&self) -> Self {
        BoxedParser {
            parser: Rc::clone(&self.parser),
        }
    }
}

impl<T: 'static> BoxedParser<T> {
    pub fn new<P: Parser<T> + 'static>(parser: P) -> Self {
        BoxedParser {
            parser: Rc::new(move |state| parser.parse(state)),
        }
    }
}

impl<T> Parser<T> for BoxedParser<T> {
    fn parse(&self, state: &mut ParseState) -> ParseResult<T> {
        let result = (self.parser)(state);
        if let Err(err) = &result {
            state.record_error(err.clone());
        }
        result
    }
}

// === Combinators as methods ===

impl<T: 'static> BoxedParser<T> {
    /// Sequence: parse self then other, return (T, U)
    pub fn seq<U: 'static>(self, other: BoxedParser<U>) -> BoxedParser<(T, U)> {
        BoxedParser::new(move |state: &mut ParseState| {
            let a = self.parse(state)?;
            let b = other.parse(state)?;
            Ok((a, b))
        })
    }

    /// Keep left: parse self then other, discard other's result
    pub fn skip<U: 'static>(self, other: BoxedParser<U>) -> BoxedParser<T> {
        BoxedParser::new(move |state: &mut ParseState| {
            let a = self.parse(state)?;
            let _ = other.parse(state)?;
            Ok(a)
        })
    }

    /// Keep right: parse self then other, discard self's result
    pub fn skip_left<U: 'static>(self, other: BoxedParser<U>) -> BoxedParser<U> {
        BoxedParser::new(move |state: &mut ParseState| {
            let _ = self.parse(state)?;
            other.parse(state)
        })
    }

    /// Map: transform the result
    pub fn map<U: 'static, F: Fn(T) -> U + 'static>(self, f: F) -> BoxedParser<U> {
        BoxedParser::new(move |state: &mut ParseState| {
            let a = self.parse(state)?;
            Ok(f(a))
        })
    }

    /// Choice: try self, on failure backtrack and try other
    pub fn or(self, other: BoxedParser<T>) -> BoxedParser<T> {
        BoxedParser::new(move |state: &mut ParseState| {
            let pos = state.position();
            match self.parse(state) {
                Ok(a) => Ok(a),
                Err(_) => {
                    state.restore(pos);
                    other.parse(state)
                }
            }
        })
    }

    /// Attach a human-readable label used in "expected …" error messages.
    pub fn label(self, what: &'static str) -> BoxedParser<T> {
        BoxedParser::new(move |state: &mut ParseState| {
            self.parse(state).map_err(|err| err.expected(what))
        })
    }
}

// === Operator Overloading ===

/// `+` for sequence: A + B -> (A, B)
impl<T: 'static, U: 'static> Add<BoxedParser<U>> for BoxedParser<T> {
    type Output = BoxedParser<(T, U)>;

    fn add(self, rhs: BoxedParser<U>) -> Self::Output {
        self.seq(rhs)
    }
}

/// `-` for keep left: A - B -> A (parse B, discard result)
impl<T: 'static, U: 'static> Sub<BoxedParser<U>> for BoxedParser<T> {
    type Output = BoxedParser<T>;

    fn sub(self, rhs: BoxedParser<U>) -> Self::Output {
        self.skip(rhs)
    }
}

/// `*` for keep right: A * B -> B (parse A, discard result)
impl<T: 'static, U: 'static> Mul<BoxedParser<U>> for BoxedParser<T> {
    type Output = BoxedParser<U>;

    fn mul(self, rhs: BoxedParser<U>) -> Self::Output {
        self.skip_left(rhs)
    }
}

/// `|` for choice: A | B -> A or B
impl<T: 'static> BitOr<BoxedParser<T>> for BoxedParser<T> {
    type Output = BoxedParser<T>;

    fn bitor(self, rhs: BoxedParser<T>) -> Self::Output {
        self.or(rhs)
    }
}

/// `>>` for map: A >> fn -> B
impl<T: 'static, U: 'static, F: Fn(T) -> U + 'static> Shr<F> for BoxedParser<T> {
    type Output = BoxedParser<U>;

    fn shr(self, f: F) -> Self::Output {
        self.map(f)
    }
}

// === Primitive Parsers ===

/// Consume exactly the given token kind.
///
/// Only usable for payload-free kinds (delimiters, operators, keywords).
pub fn expect(kind: TokenKind) -> BoxedParser<Token> {
    let desc = kind.describe();
    BoxedParser::new(move |state: &mut ParseState| match state.peek() {
        Some(tok) if tok.kind == kind => Ok(state.advance().unwrap()),
        Some(tok) => Err(ParseError::new("unexpected token")
            .at(tok.span)
            .expected(desc.clone())
            .found(tok.describe())),
        None => Err(ParseError::new("unexpected end of input").expected(desc.clone())),
    })
}

/// Consume an identifier token, producing an AST [`Ident`].
pub fn ident() -> BoxedParser<Ident> {
    BoxedParser::new(|state: &mut ParseState| match state.peek() {
        Some(Token {
            kind: TokenKind::Ident(_),
            ..
        }) => {
            let tok = state.advance().unwrap();
            let TokenKind::Ident(name) = tok.kind else {
                unreachable!()
            };
            Ok(Ident {
                name,
                position: tok.span,
            })
        }
        Some(tok) => Err(ParseError::new("unexpected token")
            .at(tok.span)
            .expected("identifier")
            .found(tok.describe())),
        None => Err(ParseError::new("unexpected end of input").expected("identifier")),
    })
}

/// Consume a number token, producing an AST [`NumberLit`].
pub fn number() -> BoxedParser<NumberLit> {
    BoxedParser::new(|state: &mut ParseState| match state.peek() {
        Some(Token {
            kind: TokenKind::Number(_),
            ..
        }) => {
            let tok = state.advance().unwrap();
            let TokenKind::Number(value) = tok.kind else {
                unreachable!()
            };
            Ok(NumberLit {
                value,
                position: tok.span,
            })
        }
        Some(tok) => Err(ParseError::new("unexpected token")
            .at(tok.span)
            .expected("number")
            .found(tok.describe())),
        None => Err(ParseError::new("unexpected end of input").expected("number")),
    })
}

/// Consume a string token, producing an AST [`StringLit`].
pub fn string_literal() -> BoxedParser<StringLit> {
    BoxedParser::new(|state: &mut ParseState| match state.peek() {
        Some(Token {
            kind: TokenKind::Str(_),
            ..
        }) => {
            let tok = state.advance().unwrap();
            let TokenKind::Str(value) = tok.kind else {
                unreachable!()
            };
            Ok(StringLit {
                value,
                position: tok.span,
            })
        }
        Some(tok) => Err(ParseError::new("unexpected token")
            .at(tok.span)
            .expected("string")
            .found(tok.describe())),
        None => Err(ParseError::new("unexpected end of input").expected("string")),
    })
}

/// Optional: parse zero or one.
pub fn optional<T: 'static>(parser: BoxedParser<T>) -> BoxedParser<Option<T>> {
    BoxedParser::new(move |state: &mut ParseState| {
        let pos = state.position();
        match parser.parse(state) {
            Ok(item) => Ok(Some(item)),
            Err(_) => {
                state.restore(pos);
                Ok(None)
            }
        }
    })
}

/// One or more occurrences of `parser` separated by `sep`.
pub fn sep_by1<T: 'static, S: 'static>(
    parser: BoxedParser<T>,
    sep: BoxedParser<S>,
) -> BoxedParser<Vec<T>> {
    BoxedParser::new(move |state: &mut ParseState| {
        let first = parser.parse(state)?;
        let mut items = vec![first];
        loop {
            let pos = state.position();
            if sep.parse(state).is_err() {
                state.restore(pos);
                break;
            }
            match parser.parse(state) {
                Ok(item) => items.push(item),
                Err(_) => {
                    state.restore(pos);
                    break;
                }
            }
        }
        Ok(items)
    })
}
