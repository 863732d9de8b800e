//! The Rill type system: Hindley-Milner inference with row-polymorphic
//! records and invariant array/dictionary types.

pub mod env;
pub mod error;
pub mod infer;
pub mod subst;
pub mod ty;
pub mod unify;

pub use env::TypeEnv;
pub use error::TypeError;
pub use infer::{infer_and_solve, infer_expression, Infer};
pub use subst::Substitution;
pub use ty::{Row, RowVar, Type, TypeScheme, TypeVar};
