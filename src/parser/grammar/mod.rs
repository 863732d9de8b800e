//! Grammar rules for the Rill language, organized by category:
//!
//! - `literal`: literal parsers (numbers, strings, booleans, null/undefined)
//! - `expression`: the precedence chain, postfix forms, and primaries
//! - `pattern`: match-case patterns
//! - `statement`: statements and `let` binding groups
//! - `types`: surface type expressions

mod expression;
mod literal;
mod pattern;
mod statement;
mod types;

pub use expression::expression;
pub use statement::statement;

use crate::ast::{Program, Statement};
use crate::lexer::TokenKind;

use super::state::{ParseResult, ParseState, Parser};

/// Parse statements until the terminator reports true.
///
/// Semicolons between statements are optional and extras are skipped.
pub(crate) fn statement_sequence(
    state: &mut ParseState,
    at_end: fn(&ParseState) -> bool,
) -> ParseResult<Vec<Statement>> {
    let mut statements = Vec::new();
    loop {
        while matches!(
            state.peek().map(|t| &t.kind),
            Some(TokenKind::Semicolon)
        ) {
            state.advance();
        }
        if at_end(state) {
            break;
        }
        statements.push(statement().parse(state)?);
    }
    Ok(statements)
}

/// program := top_stmt (';'? top_stmt)* ';'?
pub fn program(state: &mut ParseState) -> ParseResult<Program> {
    let items = match statement_sequence(state, |s| s.at_eof()) {
        Ok(items) => items,
        Err(err) => {
            return Err(state.furthest_error().cloned().unwrap_or(err));
        }
    };

    if !state.at_eof() {
        let err = state.error_here("unexpected token");
        return Err(state.furthest_error().cloned().unwrap_or(err));
    }

    Ok(Program { items })
}
