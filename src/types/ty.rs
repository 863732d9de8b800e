//! Core type system definitions.
//!
//! The type system is built from four components:
//!
//! - **Type** - concrete and polymorphic types (primitives, arrays,
//!   dictionaries, records, functions, type variables)
//! - **TypeVar** - a type variable with a unique id and an optional
//!   display name (from annotations)
//! - **Row** / **RowVar** - record rows: a field map plus an optional row
//!   variable tail. A row with a tail is *open* (more fields may exist);
//!   without one it is *closed*. Row variables live in their own id space.
//! - **TypeScheme** - a polymorphic type quantifying type variables
//!   (row variables are never generalized)
//!
//! Type variables are placeholders unified with concrete types during
//! inference. A scheme like `forall 'a. ('a) => 'a` is instantiated with
//! fresh variables at every use, which is what makes `let` bindings
//! polymorphic.

use std::collections::BTreeMap;
use std::fmt;

use rustc_hash::FxHashSet;

/// Type variable for polymorphism.
///
/// Uniquely identified by `id`; `name` is an optional human-readable name
/// used for pretty printing (annotation-derived variables keep the name
/// they were written with).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeVar {
    pub id: u32,
    pub name: Option<String>,
}

impl TypeVar {
    /// Create a new unnamed type variable.
    pub fn new(id: u32) -> Self {
        Self { id, name: None }
    }

    /// Create a new type variable with a display name.
    pub fn with_name(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: Some(name.into()),
        }
    }
}

/// A row variable: stands for "any further fields" in an open record row.
///
/// Row variables have their own id space, separate from type variables,
/// and only ever unify with other row variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowVar(pub u32);

/// A record row: field name to type, plus an optional row-variable tail.
///
/// Field names are unique (enforced by the map). The tail being present
/// marks the record as open: it permits additional unspecified fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub fields: BTreeMap<String, Type>,
    pub rest: Option<RowVar>,
}

impl Row {
    /// A closed row over the given fields.
    pub fn closed(fields: BTreeMap<String, Type>) -> Self {
        Self { fields, rest: None }
    }

    /// An open row over the given fields with the given tail.
    pub fn open(fields: BTreeMap<String, Type>, rest: RowVar) -> Self {
        Self {
            fields,
            rest: Some(rest),
        }
    }
}

/// All possible types in Rill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Var(TypeVar),
    Number,
    Str,
    Boolean,
    Null,
    Undefined,
    Unit,
    Array(Box<Type>),
    Dict(Box<Type>, Box<Type>),
    Record(Row),
    Function(Vec<Type>, Box<Type>),
}

impl Type {
    /// Create an array type.
    pub fn array(elem: Type) -> Self {
        Type::Array(Box::new(elem))
    }

    /// Create a dictionary type.
    pub fn dict(key: Type, value: Type) -> Self {
        Type::Dict(Box::new(key), Box::new(value))
    }

    /// Create a function type.
    pub fn function(params: Vec<Type>, ret: Type) -> Self {
        Type::Function(params, Box::new(ret))
    }

    /// Create a closed record type from (name, type) pairs.
    pub fn record<I: IntoIterator<Item = (String, Type)>>(fields: I) -> Self {
        Type::Record(Row::closed(fields.into_iter().collect()))
    }

    /// The set of type variables free in this type.
    pub fn free_type_vars(&self) -> FxHashSet<TypeVar> {
        let mut set = FxHashSet::default();
        self.collect_type_vars(&mut set);
        set
    }

    fn collect_type_vars(&self, out: &mut FxHashSet<TypeVar>) {
        match self {
            Type::Number
            | Type::Str
            | Type::Boolean
            | Type::Null
            | Type::Undefined
            | Type::Unit => {}
            Type::Var(v) => {
                out.insert(v.clone());
            }
            Type::Array(elem) => elem.collect_type_vars(out),
            Type::Dict(key, value) => {
                key.collect_type_vars(out);
                value.collect_type_vars(out);
            }
            Type::Record(row) => {
                for ty in row.fields.values() {
                    ty.collect_type_vars(out);
                }
            }
            Type::Function(params, ret) => {
                for p in params {
                    p.collect_type_vars(out);
                }
                ret.collect_type_vars(out);
            }
        }
    }

    /// The set of row variables free in this type.
    pub fn free_row_vars(&self) -> FxHashSet<RowVar> {
        let mut set = FxHashSet::default();
        self.collect_row_vars(&mut set);
        set
    }

    fn collect_row_vars(&self, out: &mut FxHashSet<RowVar>) {
        match self {
            Type::Number
            | Type::Str
            | Type::Boolean
            | Type::Null
            | Type::Undefined
            | Type::Unit
            | Type::Var(_) => {}
            Type::Array(elem) => elem.collect_row_vars(out),
            Type::Dict(key, value) => {
                key.collect_row_vars(out);
                value.collect_row_vars(out);
            }
            Type::Record(row) => {
                if let Some(rest) = row.rest {
                    out.insert(rest);
                }
                for ty in row.fields.values() {
                    ty.collect_row_vars(out);
                }
            }
            Type::Function(params, ret) => {
                for p in params {
                    p.collect_row_vars(out);
                }
                ret.collect_row_vars(out);
            }
        }
    }

    /// Human-readable rendering of this type.
    pub fn pretty(&self) -> String {
        match self {
            Type::Number => "number".to_string(),
            Type::Str => "string".to_string(),
            Type::Boolean => "boolean".to_string(),
            Type::Null => "null".to_string(),
            Type::Undefined => "undefined".to_string(),
            Type::Unit => "unit".to_string(),
            Type::Var(v) => match &v.name {
                Some(name) => format!("'{}", name),
                None => format!("'t{}", v.id),
            },
            Type::Array(elem) => format!("[{}]", elem.pretty()),
            Type::Dict(key, value) => format!("[{}: {}]", key.pretty(), value.pretty()),
            Type::Record(row) => {
                if row.fields.is_empty() {
                    return match row.rest {
                        Some(_) => "{ .. }".to_string(),
                        None => "{}".to_string(),
                    };
                }
                let fields: Vec<String> = row
                    .fields
                    .iter()
                    .map(|(name, ty)| format!("{}: {}", name, ty.pretty()))
                    .collect();
                match row.rest {
                    Some(_) => format!("{{ {}, .. }}", fields.join(", ")),
                    None => format!("{{ {} }}", fields.join(", ")),
                }
            }
            Type::Function(params, ret) => {
                let params: Vec<String> = params.iter().map(|p| p.pretty()).collect();
                format!("({}) => {}", params.join(", "), ret.pretty())
            }
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pretty())
    }
}

/// Polymorphic type scheme: a type with universally quantified variables.
///
/// Only type variables are quantified; row variables flow through
/// unification but are never generalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeScheme {
    pub vars: Vec<TypeVar>,
    pub ty: Type,
}

impl TypeScheme {
    /// Create a monomorphic scheme (no quantified variables).
    pub fn monomorphic(ty: Type) -> Self {
        Self {
            vars: Vec::new(),
            ty,
        }
    }

    /// Create a polymorphic scheme with quantified variables.
    pub fn polymorphic(vars: Vec<TypeVar>, ty: Type) -> Self {
        Self { vars, ty }
    }

    /// The type variables free in this scheme: free in the body but not
    /// quantified.
    pub fn free_type_vars(&self) -> FxHashSet<TypeVar> {
        let mut free = self.ty.free_type_vars();
        for v in &self.vars {
            free.remove(v);
        }
        free
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_type_vars_concrete() {
        let ty = Type::function(vec![Type::Number], Type::Str);
        assert!(ty.free_type_vars().is_empty());
    }

    #[test]
    fn free_type_vars_function() {
        let a = TypeVar::new(0);
        let b = TypeVar::new(1);
        let ty = Type::function(vec![Type::Var(a.clone())], Type::Var(b.clone()));
        let free = ty.free_type_vars();
        assert_eq!(free.len(), 2);
        assert!(free.contains(&a));
        assert!(free.contains(&b));
    }

    #[test]
    fn free_type_vars_in_record_fields() {
        let a = TypeVar::new(0);
        let ty = Type::record(vec![("x".to_string(), Type::Var(a.clone()))]);
        assert!(ty.free_type_vars().contains(&a));
    }

    #[test]
    fn free_row_vars_in_open_record() {
        let row = RowVar(7);
        let ty = Type::Record(Row::open(BTreeMap::new(), row));
        assert!(ty.free_row_vars().contains(&row));
        assert!(ty.free_type_vars().is_empty());
    }

    #[test]
    fn scheme_free_vars_exclude_quantified() {
        let a = TypeVar::new(0);
        let b = TypeVar::new(1);
        let scheme = TypeScheme::polymorphic(
            vec![a.clone()],
            Type::function(vec![Type::Var(a)], Type::Var(b.clone())),
        );
        let free = scheme.free_type_vars();
        assert_eq!(free.len(), 1);
        assert!(free.contains(&b));
    }

    #[test]
    fn pretty_print_primitives() {
        assert_eq!(Type::Number.pretty(), "number");
        assert_eq!(Type::Str.pretty(), "string");
        assert_eq!(Type::Unit.pretty(), "unit");
    }

    #[test]
    fn pretty_print_containers() {
        assert_eq!(Type::array(Type::Number).pretty(), "[number]");
        assert_eq!(Type::dict(Type::Str, Type::Number).pretty(), "[string: number]");
    }

    #[test]
    fn pretty_print_function() {
        let ty = Type::function(vec![Type::Number, Type::Number], Type::Boolean);
        assert_eq!(ty.pretty(), "(number, number) => boolean");
    }

    #[test]
    fn pretty_print_record() {
        let ty = Type::record(vec![
            ("x".to_string(), Type::Number),
            ("y".to_string(), Type::Str),
        ]);
        assert_eq!(ty.pretty(), "{ x: number, y: string }");
    }

    #[test]
    fn pretty_print_open_record() {
        let mut fields = BTreeMap::new();
        fields.insert("x".to_string(), Type::Number);
        let ty = Type::Record(Row::open(fields, RowVar(0)));
        assert_eq!(ty.pretty(), "{ x: number, .. }");
    }

    #[test]
    fn pretty_print_named_var() {
        let ty = Type::Var(TypeVar::with_name(0, "a"));
        assert_eq!(ty.pretty(), "'a");
    }
}
