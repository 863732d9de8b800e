//! Rill - a small ML-flavored expression language.
//!
//! This library provides the core pipeline for Rill programs: a
//! hand-written lexer, a recursive-descent parser, a Hindley-Milner type
//! inferencer with row-polymorphic records, and a tree-walking evaluator.
//!
//! The pieces compose as `source → tokens → AST → types + value`:
//!
//! ```text
//! let program = rill::parse("let add = (x, y) => x + y; add(5, 10)")?;
//! let env = rill::infer_and_solve(&program, None)?;
//! let value = rill::evaluate(&program)?;
//! ```
//!
//! or in one step via [`run_program`]. Inference runs before evaluation
//! and its success is a prerequisite: a program that fails to type-check
//! is never run.

pub mod ast;
pub mod builtins;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod span;
pub mod types;

use std::fmt;

pub use interpreter::{evaluate, RuntimeError, Value};
pub use parser::{parse, ParseError};
pub use types::{infer_and_solve, infer_expression, Type, TypeEnv, TypeError};

/// Any error the pipeline can produce, by stage.
#[derive(Debug, Clone)]
pub enum Error {
    Parse(ParseError),
    Type(TypeError),
    Runtime(RuntimeError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Parse(err) => write!(f, "{}", err),
            Error::Type(err) => write!(f, "{}", err),
            Error::Runtime(err) => write!(f, "{}", err),
        }
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::Parse(err)
    }
}

impl From<TypeError> for Error {
    fn from(err: TypeError) -> Self {
        Error::Type(err)
    }
}

impl From<RuntimeError> for Error {
    fn from(err: RuntimeError) -> Self {
        Error::Runtime(err)
    }
}

impl std::error::Error for Error {}

/// Parse, type-check, and evaluate a program in one step.
///
/// Returns the value of the program's final statement.
pub fn run_program(source: &str) -> Result<Value, Error> {
    let program = parse(source)?;
    infer_and_solve(&program, None)?;
    Ok(evaluate(&program)?)
}
