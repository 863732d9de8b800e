//! Runtime errors raised by the evaluator.

use std::fmt;

use crate::span::Span;

#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeError {
    /// A name with no binding at runtime.
    UndefinedVariable { name: String, span: Span },
    /// A binding read before its initializer ran (recursive data).
    UninitializedBinding { name: String, span: Span },
    /// A function called with the wrong number of arguments.
    ArityMismatch {
        expected: usize,
        found: usize,
        span: Span,
    },
    /// An operator or call applied to operands of the wrong shape.
    TypeMismatch { message: String, span: Span },
    /// Division (or remainder) by zero.
    DivisionByZero { span: Span },
    /// Property access on null, undefined, or a non-record value.
    MemberAccessOnNonRecord { kind: &'static str, span: Span },
    /// Property access on a record lacking the field.
    MissingField { field: String, span: Span },
    /// Array index outside the array's bounds (or not an integer).
    IndexOutOfBounds {
        index: f64,
        length: usize,
        span: Span,
    },
    /// A match expression where no case matched the discriminant.
    NoMatchingPattern { span: Span },
    /// A built-in function rejected its arguments.
    Builtin {
        name: &'static str,
        message: String,
        span: Span,
    },
}

impl RuntimeError {
    pub fn type_mismatch(message: impl Into<String>, span: Span) -> Self {
        RuntimeError::TypeMismatch {
            message: message.into(),
            span,
        }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::UndefinedVariable { name, span } => {
                write!(f, "runtime error at {}: undefined variable '{}'", span, name)
            }
            RuntimeError::UninitializedBinding { name, span } => {
                write!(
                    f,
                    "runtime error at {}: '{}' referenced before initialization",
                    span, name
                )
            }
            RuntimeError::ArityMismatch {
                expected,
                found,
                span,
            } => {
                write!(
                    f,
                    "runtime error at {}: function expects {} argument(s), got {}",
                    span, expected, found
                )
            }
            RuntimeError::TypeMismatch { message, span } => {
                write!(f, "runtime error at {}: {}", span, message)
            }
            RuntimeError::DivisionByZero { span } => {
                write!(f, "runtime error at {}: division by zero", span)
            }
            RuntimeError::MemberAccessOnNonRecord { kind, span } => {
                write!(
                    f,
                    "runtime error at {}: cannot access property of {}",
                    span, kind
                )
            }
            RuntimeError::MissingField { field, span } => {
                write!(f, "runtime error at {}: record has no field '{}'", span, field)
            }
            RuntimeError::IndexOutOfBounds {
                index,
                length,
                span,
            } => {
                write!(
                    f,
                    "runtime error at {}: index {} out of bounds for array of length {}",
                    span, index, length
                )
            }
            RuntimeError::NoMatchingPattern { span } => {
                write!(f, "runtime error at {}: no pattern matched the value", span)
            }
            RuntimeError::Builtin {
                name,
                message,
                span,
            } => {
                write!(f, "runtime error at {}: {}: {}", span, name, message)
            }
        }
    }
}

impl std::error::Error for RuntimeError {}
