//! Unification: the algorithm producing a most-general substitution that
//! makes two types equal.
//!
//! Structural, with two wrinkles specific to this type system:
//!
//! - **Row unification.** Records unify field-by-field over the
//!   intersection of their field names. Fields present on one side only
//!   are tolerated exactly when the other side's row is open (has a row
//!   variable tail); two open tails unify their row variables. Row
//!   variables only ever unify with row variables.
//! - **Occurs-check suppression for records.** The occurs check never
//!   looks inside record types, so a type variable bound to an open
//!   record whose field types mention the same variable resolves instead
//!   of being rejected as an infinite type.

use std::fmt;

use super::subst::Substitution;
use super::ty::{Row, Type, TypeVar};

#[derive(Debug, Clone, PartialEq)]
pub enum UnifyError {
    Mismatch {
        expected: Type,
        found: Type,
    },
    OccursCheck {
        var: TypeVar,
        ty: Type,
    },
    ArityMismatch {
        expected: usize,
        found: usize,
    },
    /// Fields required by one record but absent from the other, which is
    /// closed and so cannot absorb them.
    MissingFields {
        fields: Vec<String>,
        record: Type,
    },
}

impl fmt::Display for UnifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnifyError::Mismatch { expected, found } => {
                write!(
                    f,
                    "cannot unify {} and {}",
                    expected.pretty(),
                    found.pretty()
                )
            }
            UnifyError::OccursCheck { var, ty } => {
                write!(
                    f,
                    "occurs check failed: cannot construct infinite type {} = {}",
                    Type::Var(var.clone()).pretty(),
                    ty.pretty()
                )
            }
            UnifyError::ArityMismatch { expected, found } => {
                write!(
                    f,
                    "function arity mismatch: expected {} parameter(s), found {}",
                    expected, found
                )
            }
            UnifyError::MissingFields { fields, record } => {
                write!(
                    f,
                    "missing field(s) {} in {}",
                    fields.join(", "),
                    record.pretty()
                )
            }
        }
    }
}

/// Whether `var` occurs free in `ty`.
///
/// Guards against infinite types like `'a = ('a) => 'b`. The check does
/// not descend into record types (see the module docs); a stricter check
/// would only fail strictly more programs.
pub fn occurs_in(var: &TypeVar, ty: &Type) -> bool {
    match ty {
        Type::Number | Type::Str | Type::Boolean | Type::Null | Type::Undefined | Type::Unit => {
            false
        }
        Type::Var(v) => v.id == var.id,
        Type::Array(elem) => occurs_in(var, elem),
        Type::Dict(key, value) => occurs_in(var, key) || occurs_in(var, value),
        Type::Record(_) => false,
        Type::Function(params, ret) => {
            params.iter().any(|p| occurs_in(var, p)) || occurs_in(var, ret)
        }
    }
}

/// Unify two types, producing the most general substitution making them
/// equal.
pub fn unify(t1: &Type, t2: &Type) -> Result<Substitution, UnifyError> {
    match (t1, t2) {
        // Identical concrete types unify with the empty substitution.
        (Type::Number, Type::Number)
        | (Type::Str, Type::Str)
        | (Type::Boolean, Type::Boolean)
        | (Type::Null, Type::Null)
        | (Type::Undefined, Type::Undefined)
        | (Type::Unit, Type::Unit) => Ok(Substitution::empty()),

        // Type variables.
        (Type::Var(v1), Type::Var(v2)) if v1.id == v2.id => Ok(Substitution::empty()),
        (Type::Var(v), ty) | (ty, Type::Var(v)) => {
            if occurs_in(v, ty) {
                Err(UnifyError::OccursCheck {
                    var: v.clone(),
                    ty: ty.clone(),
                })
            } else {
                Ok(Substitution::singleton(v, ty.clone()))
            }
        }

        // Function types: arity must match; thread the substitution
        // through parameters left to right, then the return types.
        (Type::Function(p1, r1), Type::Function(p2, r2)) => {
            if p1.len() != p2.len() {
                return Err(UnifyError::ArityMismatch {
                    expected: p1.len(),
                    found: p2.len(),
                });
            }
            let mut subst = Substitution::empty();
            for (a, b) in p1.iter().zip(p2.iter()) {
                let s = unify(&subst.apply(a), &subst.apply(b))?;
                subst = s.compose(&subst);
            }
            let s = unify(&subst.apply(r1), &subst.apply(r2))?;
            Ok(s.compose(&subst))
        }

        (Type::Array(e1), Type::Array(e2)) => unify(e1, e2),

        (Type::Dict(k1, v1), Type::Dict(k2, v2)) => {
            let s1 = unify(k1, k2)?;
            let s2 = unify(&s1.apply(v1), &s1.apply(v2))?;
            Ok(s2.compose(&s1))
        }

        (Type::Record(row1), Type::Record(row2)) => unify_rows(row1, row2),

        _ => Err(UnifyError::Mismatch {
            expected: t1.clone(),
            found: t2.clone(),
        }),
    }
}

/// Row unification: unify like-named fields, then reconcile the leftovers
/// against the rows' tails.
fn unify_rows(row1: &Row, row2: &Row) -> Result<Substitution, UnifyError> {
    let mut subst = Substitution::empty();

    for (name, ty1) in &row1.fields {
        if let Some(ty2) = row2.fields.get(name) {
            let s = unify(&subst.apply(ty1), &subst.apply(ty2))?;
            subst = s.compose(&subst);
        }
    }

    let only_in_first: Vec<String> = row1
        .fields
        .keys()
        .filter(|name| !row2.fields.contains_key(*name))
        .cloned()
        .collect();
    let only_in_second: Vec<String> = row2
        .fields
        .keys()
        .filter(|name| !row1.fields.contains_key(*name))
        .cloned()
        .collect();

    // Extra fields on one side require an open tail on the other.
    if !only_in_first.is_empty() && row2.rest.is_none() {
        return Err(UnifyError::MissingFields {
            fields: only_in_first,
            record: Type::Record(row2.clone()),
        });
    }
    if !only_in_second.is_empty() && row1.rest.is_none() {
        return Err(UnifyError::MissingFields {
            fields: only_in_second,
            record: Type::Record(row1.clone()),
        });
    }

    if let (Some(r1), Some(r2)) = (row1.rest, row2.rest) {
        if r1 != r2 {
            subst = Substitution::row_singleton(r1, r2).compose(&subst);
        }
    }

    Ok(subst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ty::RowVar;
    use std::collections::BTreeMap;

    #[test]
    fn unify_identical_primitives() {
        assert_eq!(unify(&Type::Number, &Type::Number), Ok(Substitution::empty()));
        assert_eq!(unify(&Type::Str, &Type::Str), Ok(Substitution::empty()));
        assert_eq!(unify(&Type::Unit, &Type::Unit), Ok(Substitution::empty()));
    }

    #[test]
    fn unify_var_with_concrete() {
        let var = TypeVar::new(0);
        let subst = unify(&Type::Var(var.clone()), &Type::Number).unwrap();
        assert_eq!(subst.apply(&Type::Var(var)), Type::Number);
    }

    #[test]
    fn unify_two_vars() {
        let v1 = TypeVar::new(0);
        let v2 = TypeVar::new(1);
        let subst = unify(&Type::Var(v1.clone()), &Type::Var(v2.clone())).unwrap();
        assert_eq!(subst.apply(&Type::Var(v1)), Type::Var(v2));
    }

    #[test]
    fn unify_mismatch() {
        let result = unify(&Type::Number, &Type::Str);
        assert!(matches!(result, Err(UnifyError::Mismatch { .. })));
    }

    #[test]
    fn occurs_check_rejects_infinite_type() {
        let var = TypeVar::new(0);
        let ty = Type::function(vec![Type::Var(var.clone())], Type::Number);
        let result = unify(&Type::Var(var), &ty);
        assert!(matches!(result, Err(UnifyError::OccursCheck { .. })));
    }

    #[test]
    fn occurs_check_suppressed_for_records() {
        let var = TypeVar::new(0);
        let mut fields = BTreeMap::new();
        fields.insert("self".to_string(), Type::Var(var.clone()));
        let record = Type::Record(Row::open(fields, RowVar(0)));

        // Binding 'a to a record mentioning 'a resolves rather than
        // failing the occurs check.
        let subst = unify(&Type::Var(var.clone()), &record).unwrap();
        assert_eq!(subst.apply(&Type::Var(var)), record);
    }

    #[test]
    fn unify_functions_threads_substitution() {
        let a = TypeVar::new(0);
        let b = TypeVar::new(1);
        let f1 = Type::function(vec![Type::Var(a.clone()), Type::Var(a.clone())], Type::Var(b.clone()));
        let f2 = Type::function(vec![Type::Number, Type::Number], Type::Boolean);

        let subst = unify(&f1, &f2).unwrap();
        assert_eq!(subst.apply(&Type::Var(a)), Type::Number);
        assert_eq!(subst.apply(&Type::Var(b)), Type::Boolean);
    }

    #[test]
    fn unify_function_arity_mismatch() {
        let f1 = Type::function(vec![Type::Number], Type::Number);
        let f2 = Type::function(vec![Type::Number, Type::Number], Type::Number);
        assert!(matches!(
            unify(&f1, &f2),
            Err(UnifyError::ArityMismatch {
                expected: 1,
                found: 2
            })
        ));
    }

    #[test]
    fn unify_arrays() {
        let var = TypeVar::new(0);
        let subst = unify(
            &Type::array(Type::Var(var.clone())),
            &Type::array(Type::Number),
        )
        .unwrap();
        assert_eq!(subst.apply(&Type::Var(var)), Type::Number);
    }

    #[test]
    fn unify_dicts() {
        let k = TypeVar::new(0);
        let v = TypeVar::new(1);
        let subst = unify(
            &Type::dict(Type::Var(k.clone()), Type::Var(v.clone())),
            &Type::dict(Type::Str, Type::Number),
        )
        .unwrap();
        assert_eq!(subst.apply(&Type::Var(k)), Type::Str);
        assert_eq!(subst.apply(&Type::Var(v)), Type::Number);
    }

    #[test]
    fn unify_closed_records_same_fields() {
        let r1 = Type::record(vec![("x".to_string(), Type::Number)]);
        let r2 = Type::record(vec![("x".to_string(), Type::Number)]);
        assert!(unify(&r1, &r2).is_ok());
    }

    #[test]
    fn unify_records_missing_field_in_closed() {
        let wide = Type::record(vec![
            ("x".to_string(), Type::Number),
            ("y".to_string(), Type::Number),
        ]);
        let narrow = Type::record(vec![("x".to_string(), Type::Number)]);
        let result = unify(&wide, &narrow);
        match result {
            Err(UnifyError::MissingFields { fields, .. }) => {
                assert_eq!(fields, vec!["y".to_string()]);
            }
            other => panic!("expected MissingFields, got {:?}", other),
        }
    }

    #[test]
    fn unify_records_extra_fields_absorbed_by_open_tail() {
        let wide = Type::record(vec![
            ("x".to_string(), Type::Number),
            ("y".to_string(), Type::Number),
        ]);
        let mut fields = BTreeMap::new();
        fields.insert("x".to_string(), Type::Number);
        let open = Type::Record(Row::open(fields, RowVar(0)));
        assert!(unify(&wide, &open).is_ok());
    }

    #[test]
    fn unify_open_tails_unifies_row_vars() {
        let mut f1 = BTreeMap::new();
        f1.insert("x".to_string(), Type::Number);
        let mut f2 = BTreeMap::new();
        f2.insert("x".to_string(), Type::Number);
        let r1 = Row::open(f1, RowVar(0));
        let r2 = Row::open(f2, RowVar(1));

        let subst = unify(&Type::Record(r1.clone()), &Type::Record(r2)).unwrap();
        let applied = subst.apply(&Type::Record(r1));
        match applied {
            Type::Record(row) => assert_eq!(row.rest, Some(RowVar(1))),
            other => panic!("expected record, got {:?}", other),
        }
    }

    #[test]
    fn unify_record_with_number_fails() {
        let record = Type::record(vec![("x".to_string(), Type::Number)]);
        assert!(matches!(
            unify(&record, &Type::Number),
            Err(UnifyError::Mismatch { .. })
        ));
    }
}
