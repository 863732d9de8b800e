//! Abstract syntax tree for parsed Rill programs.
//!
//! The AST is produced by the parser and shared (read-only) by the type
//! inferencer and the evaluator. It is split into semantic categories:
//!
//! - Top-level: [`Program`] and [`Statement`] (this module)
//! - [`expression`] - the expression sum type and its node structs
//! - [`pattern`] - patterns used by `match` cases
//! - [`types`] - surface type expressions (annotations)
//!
//! Every node carries a `position: Span` pointing back at the source text
//! it was parsed from.

pub mod expression;
pub mod pattern;
pub mod types;

use crate::span::Span;

use expression::{Expression, Ident};
use types::TypeExpr;

/// A complete Rill program: an ordered sequence of top-level statements.
#[derive(Debug, Clone)]
pub struct Program {
    pub items: Vec<Statement>,
}

/// A statement: either a `let` binding group or a discarded expression.
///
/// Statements appear at the top level of a program and inside block
/// expressions. The value of a block (and of a program) is the value of
/// its final statement; a trailing binding group yields `null`.
#[derive(Debug, Clone)]
pub enum Statement {
    Let(LetGroup),
    Expression(Expression),
}

/// A `let` binding group: one or more bindings introduced together.
///
/// Bindings joined by `,` or `and` within a single `let` form one group
/// and are typed and evaluated as a unit, so they may refer to each other
/// (mutual recursion). Separate `let` statements do not see later
/// bindings.
#[derive(Debug, Clone)]
pub struct LetGroup {
    pub bindings: Vec<Binding>,
    pub position: Span,
}

/// A single binding inside a `let` group.
#[derive(Debug, Clone)]
pub struct Binding {
    pub name: Ident,
    pub annotation: Option<TypeExpr>,
    pub value: Expression,
    pub position: Span,
}
