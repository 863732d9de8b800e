//! Type substitutions.
//!
//! A substitution maps type-variable ids to types and row-variable ids to
//! row variables, representing the assignments discovered by unification:
//!
//! ```text
//! // After inferring (x) => x + 1 we might have:   't0 := number
//! // After inferring (x) => x we might have:       't0 := 't1
//! ```
//!
//! ## Application
//!
//! Applying a substitution to a type replaces every mapped variable,
//! recursing through arrays, dictionaries, record rows, and functions:
//!
//! ```text
//! // Substitution: {'t0 := number}
//! apply('t0)          -> number
//! apply(('t0) => 't0) -> (number) => number
//! apply(('t0) => 't1) -> (number) => 't1
//! ```
//!
//! ## Composition
//!
//! `newer.compose(&older)` produces a substitution equivalent to applying
//! `older` first and `newer` second: `newer` is applied to every image in
//! `older`, then `newer`'s own mappings are folded in for keys not
//! already bound:
//!
//! ```text
//! older = {'t0 := 't1}
//! newer = {'t1 := number}
//! newer.compose(&older) = {'t0 := number, 't1 := number}
//! ```
//!
//! The solver accumulates with `acc = mgu.compose(&acc)` as constraints
//! are processed in order; after solving, application is idempotent.
//!
//! The two variable spaces are kept in separate maps: row variables only
//! ever map to other row variables, so a row tail either gets replaced by
//! its image or stays as it is.

use rustc_hash::FxHashMap;

use super::ty::{Row, RowVar, Type, TypeVar};

/// A substitution: type-variable id → type, row-variable id → row variable.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Substitution {
    types: FxHashMap<u32, Type>,
    rows: FxHashMap<u32, RowVar>,
}

impl Substitution {
    /// The empty substitution.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A substitution with a single type-variable mapping.
    pub fn singleton(var: &TypeVar, ty: Type) -> Self {
        let mut subst = Self::empty();
        subst.types.insert(var.id, ty);
        subst
    }

    /// A substitution with a single row-variable mapping.
    pub fn row_singleton(from: RowVar, to: RowVar) -> Self {
        let mut subst = Self::empty();
        subst.rows.insert(from.0, to);
        subst
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.rows.is_empty()
    }

    /// Apply this substitution to a type.
    ///
    /// Walks the type, replacing any mapped type variable by its image and
    /// recursing into arrays, dictionaries, rows, and function types. For
    /// a record row with a tail, the tail is looked up and replaced by its
    /// row-variable image when one is bound.
    pub fn apply(&self, ty: &Type) -> Type {
        match ty {
            Type::Number
            | Type::Str
            | Type::Boolean
            | Type::Null
            | Type::Undefined
            | Type::Unit => ty.clone(),
            Type::Var(v) => match self.types.get(&v.id) {
                Some(image) => image.clone(),
                None => ty.clone(),
            },
            Type::Array(elem) => Type::array(self.apply(elem)),
            Type::Dict(key, value) => Type::dict(self.apply(key), self.apply(value)),
            Type::Record(row) => Type::Record(self.apply_row(row)),
            Type::Function(params, ret) => Type::Function(
                params.iter().map(|p| self.apply(p)).collect(),
                Box::new(self.apply(ret)),
            ),
        }
    }

    /// Apply this substitution to a row.
    pub fn apply_row(&self, row: &Row) -> Row {
        let fields = row
            .fields
            .iter()
            .map(|(name, ty)| (name.clone(), self.apply(ty)))
            .collect();
        let rest = row.rest.map(|tail| self.resolve_row_var(tail));
        Row { fields, rest }
    }

    /// Follow row-variable mappings to their final representative.
    fn resolve_row_var(&self, var: RowVar) -> RowVar {
        let mut current = var;
        while let Some(next) = self.rows.get(&current.0) {
            if *next == current {
                break;
            }
            current = *next;
        }
        current
    }

    /// Compose this substitution with an older one: `self ∘ other`.
    ///
    /// Applies `self` to every image in `other`, then folds in any mapping
    /// of `self` whose key is not already bound. The result applies
    /// `other` first and `self` second, so a solver accumulates with
    /// `acc = mgu.compose(&acc)`.
    pub fn compose(&self, other: &Substitution) -> Substitution {
        let mut types: FxHashMap<u32, Type> = other
            .types
            .iter()
            .map(|(id, ty)| (*id, self.apply(ty)))
            .collect();
        for (id, ty) in &self.types {
            if !types.contains_key(id) {
                types.insert(*id, ty.clone());
            }
        }

        let mut rows: FxHashMap<u32, RowVar> = other
            .rows
            .iter()
            .map(|(id, tail)| (*id, self.resolve_row_var(*tail)))
            .collect();
        for (id, tail) in &self.rows {
            if !rows.contains_key(id) {
                rows.insert(*id, *tail);
            }
        }

        Substitution { types, rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_substitution_is_identity() {
        let subst = Substitution::empty();
        assert_eq!(subst.apply(&Type::Number), Type::Number);
    }

    #[test]
    fn singleton_replaces_variable() {
        let var = TypeVar::new(0);
        let subst = Substitution::singleton(&var, Type::Number);
        assert_eq!(subst.apply(&Type::Var(var)), Type::Number);
    }

    #[test]
    fn apply_recurses_into_functions() {
        let var = TypeVar::new(0);
        let subst = Substitution::singleton(&var, Type::Number);
        let ty = Type::function(vec![Type::Var(var)], Type::Str);
        assert_eq!(
            subst.apply(&ty),
            Type::function(vec![Type::Number], Type::Str)
        );
    }

    #[test]
    fn apply_preserves_unbound_vars() {
        let bound = TypeVar::new(0);
        let unbound = TypeVar::new(1);
        let subst = Substitution::singleton(&bound, Type::Number);
        assert_eq!(
            subst.apply(&Type::Var(unbound.clone())),
            Type::Var(unbound)
        );
    }

    #[test]
    fn apply_substitutes_record_fields_and_tail() {
        let var = TypeVar::new(0);
        let subst = Substitution::singleton(&var, Type::Number)
            .compose(&Substitution::row_singleton(RowVar(0), RowVar(1)));
        let ty = Type::Record(Row::open(
            [("x".to_string(), Type::Var(var))].into_iter().collect(),
            RowVar(0),
        ));
        let expected = Type::Record(Row::open(
            [("x".to_string(), Type::Number)].into_iter().collect(),
            RowVar(1),
        ));
        assert_eq!(subst.apply(&ty), expected);
    }

    #[test]
    fn compose_chains_mappings() {
        let v0 = TypeVar::new(0);
        let v1 = TypeVar::new(1);

        let older = Substitution::singleton(&v0, Type::Var(v1.clone()));
        let newer = Substitution::singleton(&v1, Type::Number);
        let composed = newer.compose(&older);

        assert_eq!(composed.apply(&Type::Var(v0)), Type::Number);
        assert_eq!(composed.apply(&Type::Var(v1)), Type::Number);
    }

    #[test]
    fn compose_keeps_newer_on_conflict() {
        let var = TypeVar::new(0);
        let older = Substitution::singleton(&var, Type::Str);
        let newer = Substitution::singleton(&var, Type::Number);
        // The older mapping's image survives; the newer one is only folded
        // in for keys not already bound.
        let composed = newer.compose(&older);
        assert_eq!(composed.apply(&Type::Var(var)), Type::Str);
    }

    #[test]
    fn application_is_idempotent_after_compose() {
        let v0 = TypeVar::new(0);
        let v1 = TypeVar::new(1);

        let older = Substitution::singleton(&v0, Type::Var(v1.clone()));
        let newer = Substitution::singleton(&v1, Type::Boolean);
        let composed = newer.compose(&older);

        let ty = Type::function(vec![Type::Var(v0), Type::Var(v1)], Type::Unit);
        let once = composed.apply(&ty);
        let twice = composed.apply(&once);
        assert_eq!(once, twice);
    }
}
