//! Parser state management.
//!
//! Provides the infrastructure the grammar rules are built on:
//!
//! - [`ParseState`] - token stream position, backtracking, furthest-error
//!   tracking
//! - [`ParseError`] - structured parse failure with expected/found context
//! - [`Parser`] - the trait every parser implements
//!
//! Alternative grammar rules backtrack by saving and restoring positions:
//!
//! ```text
//! let pos = state.position();
//! match parser.parse(state) {
//!     Ok(result) => result,
//!     Err(_) => {
//!         state.restore(pos);
//!         alternative.parse(state)
//!     }
//! }
//! ```
//!
//! Because alternatives fail routinely, the "real" error for a malformed
//! input is the one raised at the furthest position any rule reached.
//! `ParseState` records that error so the driver can report it instead of
//! whichever alternative happened to fail last.

use std::fmt;

use crate::lexer::{LexError, Token, TokenKind};
use crate::span::Span;

/// Structured parse error with context information.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub message: String,
    pub span: Option<Span>,
    pub expected: Vec<String>,
    pub found: Option<String>,
}

impl ParseError {
    /// Create a new parse error with a message.
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            span: None,
            expected: vec![],
            found: None,
        }
    }

    /// Add an expected token/construct to this error.
    pub fn expected(mut self, what: impl Into<String>) -> Self {
        self.expected.push(what.into());
        self
    }

    /// Set what was actually found.
    pub fn found(mut self, what: impl Into<String>) -> Self {
        self.found = Some(what.into());
        self
    }

    /// Set the source location for this error.
    pub fn at(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Merge expected tokens from another error at the same position.
    pub fn merge_expected(mut self, other: &ParseError) -> Self {
        for exp in &other.expected {
            if !self.expected.contains(exp) {
                self.expected.push(exp.clone());
            }
        }
        self
    }
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError::new(err.message).at(err.span)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = if !self.expected.is_empty() {
            let expected_str = if self.expected.len() == 1 {
                self.expected[0].clone()
            } else {
                let (last, rest) = self.expected.split_last().unwrap();
                format!("{} or {}", rest.join(", "), last)
            };
            match &self.found {
                Some(found) => format!("expected {}, found {}", expected_str, found),
                None => format!("expected {}", expected_str),
            }
        } else {
            self.message.clone()
        };

        match &self.span {
            Some(span) => write!(f, "parse error at {}: {}", span, msg),
            None => write!(f, "parse error: {}", msg),
        }
    }
}

impl std::error::Error for ParseError {}

/// Result type for parse operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Parser state: token stream, position, and furthest-error tracking.
pub struct ParseState {
    tokens: Vec<Token>,
    index: usize,
    furthest_error: Option<(usize, ParseError)>,
}

impl ParseState {
    /// Create a new parse state from a token stream.
    ///
    /// The stream is expected to end with an `Eof` token.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            index: 0,
            furthest_error: None,
        }
    }

    /// Consume and return the next token.
    pub fn advance(&mut self) -> Option<Token> {
        if self.index < self.tokens.len() {
            let token = self.tokens[self.index].clone();
            self.index += 1;
            Some(token)
        } else {
            None
        }
    }

    /// Peek at the next token without consuming it.
    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    /// Peek one token past the next.
    pub fn peek_next(&self) -> Option<&Token> {
        self.tokens.get(self.index + 1)
    }

    /// Whether the next token is `Eof` (or the stream is exhausted).
    pub fn at_eof(&self) -> bool {
        matches!(self.peek(), None | Some(Token { kind: TokenKind::Eof, .. }))
    }

    /// Current position in the token stream.
    pub fn position(&self) -> usize {
        self.index
    }

    /// Restore the parser to a previously saved position.
    pub fn restore(&mut self, position: usize) {
        self.index = position;
    }

    /// Record an error, keeping track of the furthest position reached.
    ///
    /// Errors at the same position merge their expected lists, producing
    /// messages like "expected identifier or '('".
    pub fn record_error(&mut self, error: ParseError) {
        match &self.furthest_error {
            Some((pos, _)) if *pos > self.index => {}
            Some((pos, existing)) if *pos == self.index => {
                let merged = existing.clone().merge_expected(&error);
                self.furthest_error = Some((self.index, merged));
            }
            _ => {
                self.furthest_error = Some((self.index, error));
            }
        }
    }

    /// The error at the furthest position reached, if any.
    pub fn furthest_error(&self) -> Option<&ParseError> {
        self.furthest_error.as_ref().map(|(_, e)| e)
    }

    /// Create an error at the current position with span and found info.
    pub fn error_here(&self, message: impl Into<String>) -> ParseError {
        let msg = message.into();
        match self.peek() {
            Some(tok) => ParseError::new(msg).at(tok.span).found(tok.describe()),
            None => ParseError::new(msg).found("end of input"),
        }
    }
}

/// Generic parser trait; every grammar rule implements it.
pub trait Parser<T>: Sized {
    fn parse(&self, state: &mut ParseState) -> ParseResult<T>;
}

/// Any `Fn(&mut ParseState) -> ParseResult<T>` is a parser.
impl<T, F: Fn(&mut ParseState) -> ParseResult<T>> Parser<T> for F {
    fn parse(&self, state: &mut ParseState) -> ParseResult<T> {
        self(state)
    }
}
