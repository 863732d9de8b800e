//! Parser for the Rill language.
//!
//! The grammar rules live in [`grammar`], built on the combinator
//! infrastructure in [`combinators`] and the state management in
//! [`state`]. The public entry point is [`parse`], which lexes and parses
//! a complete program.

mod combinators;
mod grammar;
mod state;

pub use combinators::*;
pub use state::{ParseError, ParseResult, ParseState, Parser};

use crate::ast::Program;
use crate::lexer;

/// Parse a complete program from source text.
///
/// Lexes the source and runs the program grammar over the token stream.
/// On failure the returned error is the one raised at the furthest
/// position the parser reached.
pub fn parse(source: &str) -> Result<Program, ParseError> {
    let tokens = lexer::lex(source)?;
    let mut state = ParseState::new(tokens);
    grammar::program(&mut state)
}
