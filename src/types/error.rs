//! Type errors raised by the inferencer.

use std::fmt;

use crate::span::Span;

use super::ty::{Type, TypeVar};
use super::unify::UnifyError;

#[derive(Debug, Clone, PartialEq)]
pub enum TypeError {
    /// An identifier with no binding in the type environment.
    UndefinedIdentifier { name: String, span: Span },
    /// Two types that should be equal are not.
    Mismatch {
        expected: Type,
        found: Type,
        span: Span,
    },
    /// A type variable appears in its own solution (infinite type).
    OccursCheck {
        var: TypeVar,
        ty: Type,
        span: Span,
    },
    /// A function applied to the wrong number of arguments.
    ArityMismatch {
        expected: usize,
        found: usize,
        span: Span,
    },
    /// Required record field(s) absent from a closed record.
    MissingFields {
        fields: Vec<String>,
        record: Type,
        span: Span,
    },
    /// A type annotation that names no known type.
    UnknownTypeExpr { name: String, span: Span },
}

impl TypeError {
    pub fn undefined_identifier(name: impl Into<String>, span: Span) -> Self {
        TypeError::UndefinedIdentifier {
            name: name.into(),
            span,
        }
    }

    pub fn mismatch(expected: Type, found: Type, span: Span) -> Self {
        TypeError::Mismatch {
            expected,
            found,
            span,
        }
    }

    pub fn unknown_type_expr(name: impl Into<String>, span: Span) -> Self {
        TypeError::UnknownTypeExpr {
            name: name.into(),
            span,
        }
    }

    /// Attach a source span to a unification failure.
    pub fn from_unify_error(err: UnifyError, span: Span) -> Self {
        match err {
            UnifyError::Mismatch { expected, found } => TypeError::Mismatch {
                expected,
                found,
                span,
            },
            UnifyError::OccursCheck { var, ty } => TypeError::OccursCheck { var, ty, span },
            UnifyError::ArityMismatch { expected, found } => TypeError::ArityMismatch {
                expected,
                found,
                span,
            },
            UnifyError::MissingFields { fields, record } => TypeError::MissingFields {
                fields,
                record,
                span,
            },
        }
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeError::UndefinedIdentifier { name, span } => {
                write!(f, "type error at {}: undefined identifier '{}'", span, name)
            }
            TypeError::Mismatch {
                expected,
                found,
                span,
            } => {
                write!(
                    f,
                    "type error at {}: cannot unify {} and {}",
                    span,
                    expected.pretty(),
                    found.pretty()
                )
            }
            TypeError::OccursCheck { var, ty, span } => {
                write!(
                    f,
                    "type error at {}: occurs check failed: cannot construct infinite type {} = {}",
                    span,
                    Type::Var(var.clone()).pretty(),
                    ty.pretty()
                )
            }
            TypeError::ArityMismatch {
                expected,
                found,
                span,
            } => {
                write!(
                    f,
                    "type error at {}: function expects {} argument(s), found {}",
                    span, expected, found
                )
            }
            TypeError::MissingFields {
                fields,
                record,
                span,
            } => {
                write!(
                    f,
                    "type error at {}: missing field(s) {} in {}",
                    span,
                    fields.join(", "),
                    record.pretty()
                )
            }
            TypeError::UnknownTypeExpr { name, span } => {
                write!(f, "type error at {}: unknown type expression '{}'", span, name)
            }
        }
    }
}

impl std::error::Error for TypeError {}
