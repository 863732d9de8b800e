use crate::span::Span;

use super::expression::{BooleanLit, Ident, NullLit, NumberLit, StringLit};

/// Patterns matched by `match` cases.
///
/// Literal patterns compare against the discriminant with structural
/// equality; identifier patterns always match and bind the discriminant;
/// the wildcard `_` always matches without binding.
#[derive(Debug, Clone)]
pub enum Pattern {
    Wildcard(Span),
    Number(NumberLit),
    Str(StringLit),
    Boolean(BooleanLit),
    Null(NullLit),
    Ident(Ident),
}

impl Pattern {
    /// The source span of this pattern.
    pub fn position(&self) -> Span {
        match self {
            Pattern::Wildcard(span) => *span,
            Pattern::Number(n) => n.position,
            Pattern::Str(s) => s.position,
            Pattern::Boolean(b) => b.position,
            Pattern::Null(n) => n.position,
            Pattern::Ident(i) => i.position,
        }
    }
}
