//! The built-in function registry.
//!
//! Every built-in has two halves kept side by side here: a polymorphic
//! type scheme registered into the initial type environment, and a native
//! implementation installed into the evaluator's global scope. All
//! built-ins in scope are pure; implementations do their own runtime
//! shape checks and report failures as messages, which the evaluator
//! wraps into runtime errors at the call site.

use crate::interpreter::Value;
use crate::types::{Type, TypeEnv, TypeScheme, TypeVar};

/// A built-in function: name, arity hint, and native implementation.
pub struct Builtin {
    pub name: &'static str,
    pub arity: usize,
    pub run: fn(&[Value]) -> Result<Value, String>,
}

impl std::fmt::Debug for Builtin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Builtin")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

/// All built-ins, in catalog order.
pub static BUILTINS: &[Builtin] = &[
    Builtin { name: "length", arity: 1, run: length },
    Builtin { name: "head", arity: 1, run: head },
    Builtin { name: "tail", arity: 1, run: tail },
    Builtin { name: "push", arity: 2, run: push },
    Builtin { name: "empty", arity: 1, run: empty },
    Builtin { name: "range", arity: 2, run: range },
    Builtin { name: "sum", arity: 1, run: sum },
    Builtin { name: "product", arity: 1, run: product },
    Builtin { name: "flatten", arity: 1, run: flatten },
    Builtin { name: "unique", arity: 1, run: unique },
    Builtin { name: "chunk", arity: 2, run: chunk },
    Builtin { name: "zip", arity: 2, run: zip },
    Builtin { name: "concat", arity: 2, run: concat },
    Builtin { name: "substring", arity: 3, run: substring },
    Builtin { name: "strlen", arity: 1, run: strlen },
    Builtin { name: "sqrt", arity: 1, run: sqrt },
    Builtin { name: "abs", arity: 1, run: abs },
    Builtin { name: "floor", arity: 1, run: floor },
    Builtin { name: "ceil", arity: 1, run: ceil },
    Builtin { name: "toString", arity: 1, run: to_string },
    Builtin { name: "toNumber", arity: 1, run: to_number },
    Builtin { name: "dictKeys", arity: 1, run: dict_keys },
    Builtin { name: "dictValues", arity: 1, run: dict_values },
    Builtin { name: "dictEntries", arity: 1, run: dict_entries },
    Builtin { name: "dictFromEntries", arity: 1, run: dict_from_entries },
    Builtin { name: "dictMerge", arity: 2, run: dict_merge },
    Builtin { name: "dictHas", arity: 2, run: dict_has },
    Builtin { name: "dictSet", arity: 3, run: dict_set },
    Builtin { name: "dictDelete", arity: 2, run: dict_delete },
    Builtin { name: "dictSize", arity: 1, run: dict_size },
];

/// Look up a built-in by name.
pub fn lookup(name: &str) -> Option<&'static Builtin> {
    BUILTINS.iter().find(|b| b.name == name)
}

// ── Type schemes ───────────────────────────────────────────────────────

// Quantified variables in built-in schemes use a reserved id range far
// above anything the inferencer's fresh counter reaches in practice;
// instantiation replaces them with fresh variables anyway.
fn var_a() -> TypeVar {
    TypeVar::with_name(90_000, "a")
}

fn var_b() -> TypeVar {
    TypeVar::with_name(90_001, "b")
}

fn poly1(make: impl FnOnce(Type) -> Type) -> TypeScheme {
    let a = var_a();
    TypeScheme::polymorphic(vec![a.clone()], make(Type::Var(a)))
}

fn poly2(make: impl FnOnce(Type, Type) -> Type) -> TypeScheme {
    let a = var_a();
    let b = var_b();
    TypeScheme::polymorphic(
        vec![a.clone(), b.clone()],
        make(Type::Var(a), Type::Var(b)),
    )
}

fn mono(ty: Type) -> TypeScheme {
    TypeScheme::monomorphic(ty)
}

/// A `{ key: k, value: v }` record type (dictEntries element shape).
fn entry_record(key: Type, value: Type) -> Type {
    Type::record(vec![("key".to_string(), key), ("value".to_string(), value)])
}

/// The initial type environment: a scheme for every built-in.
pub fn type_env() -> TypeEnv {
    let entries: Vec<(String, TypeScheme)> = vec![
        // length : forall a. ([a]) => number
        (
            "length".into(),
            poly1(|a| Type::function(vec![Type::array(a)], Type::Number)),
        ),
        // head : forall a. ([a]) => a
        (
            "head".into(),
            poly1(|a| Type::function(vec![Type::array(a.clone())], a)),
        ),
        // tail : forall a. ([a]) => [a]
        (
            "tail".into(),
            poly1(|a| Type::function(vec![Type::array(a.clone())], Type::array(a))),
        ),
        // push : forall a. ([a], a) => [a]
        (
            "push".into(),
            poly1(|a| {
                Type::function(
                    vec![Type::array(a.clone()), a.clone()],
                    Type::array(a),
                )
            }),
        ),
        // empty : forall a. ([a]) => boolean
        (
            "empty".into(),
            poly1(|a| Type::function(vec![Type::array(a)], Type::Boolean)),
        ),
        // range : (number, number) => [number]
        (
            "range".into(),
            mono(Type::function(
                vec![Type::Number, Type::Number],
                Type::array(Type::Number),
            )),
        ),
        // sum : ([number]) => number
        (
            "sum".into(),
            mono(Type::function(
                vec![Type::array(Type::Number)],
                Type::Number,
            )),
        ),
        // product : ([number]) => number
        (
            "product".into(),
            mono(Type::function(
                vec![Type::array(Type::Number)],
                Type::Number,
            )),
        ),
        // flatten : forall a. ([[a]]) => [a]
        (
            "flatten".into(),
            poly1(|a| {
                Type::function(
                    vec![Type::array(Type::array(a.clone()))],
                    Type::array(a),
                )
            }),
        ),
        // unique : forall a. ([a]) => [a]
        (
            "unique".into(),
            poly1(|a| Type::function(vec![Type::array(a.clone())], Type::array(a))),
        ),
        // chunk : forall a. ([a], number) => [[a]]
        (
            "chunk".into(),
            poly1(|a| {
                Type::function(
                    vec![Type::array(a.clone()), Type::Number],
                    Type::array(Type::array(a)),
                )
            }),
        ),
        // zip : forall a b. ([a], [b]) => [{ first: a, second: b }]
        (
            "zip".into(),
            poly2(|a, b| {
                Type::function(
                    vec![Type::array(a.clone()), Type::array(b.clone())],
                    Type::array(Type::record(vec![
                        ("first".to_string(), a),
                        ("second".to_string(), b),
                    ])),
                )
            }),
        ),
        // concat : forall a. ([a], [a]) => [a]
        (
            "concat".into(),
            poly1(|a| {
                Type::function(
                    vec![Type::array(a.clone()), Type::array(a.clone())],
                    Type::array(a),
                )
            }),
        ),
        // substring : (string, number, number) => string
        (
            "substring".into(),
            mono(Type::function(
                vec![Type::Str, Type::Number, Type::Number],
                Type::Str,
            )),
        ),
        // strlen : (string) => number
        (
            "strlen".into(),
            mono(Type::function(vec![Type::Str], Type::Number)),
        ),
        // sqrt/abs/floor/ceil : (number) => number
        (
            "sqrt".into(),
            mono(Type::function(vec![Type::Number], Type::Number)),
        ),
        (
            "abs".into(),
            mono(Type::function(vec![Type::Number], Type::Number)),
        ),
        (
            "floor".into(),
            mono(Type::function(vec![Type::Number], Type::Number)),
        ),
        (
            "ceil".into(),
            mono(Type::function(vec![Type::Number], Type::Number)),
        ),
        // toString : forall a. (a) => string
        (
            "toString".into(),
            poly1(|a| Type::function(vec![a], Type::Str)),
        ),
        // toNumber : (string) => number
        (
            "toNumber".into(),
            mono(Type::function(vec![Type::Str], Type::Number)),
        ),
        // dictKeys : forall k v. ([k: v]) => [k]
        (
            "dictKeys".into(),
            poly2(|k, v| {
                Type::function(vec![Type::dict(k.clone(), v)], Type::array(k))
            }),
        ),
        // dictValues : forall k v. ([k: v]) => [v]
        (
            "dictValues".into(),
            poly2(|k, v| {
                Type::function(vec![Type::dict(k, v.clone())], Type::array(v))
            }),
        ),
        // dictEntries : forall k v. ([k: v]) => [{ key: k, value: v }]
        (
            "dictEntries".into(),
            poly2(|k, v| {
                Type::function(
                    vec![Type::dict(k.clone(), v.clone())],
                    Type::array(entry_record(k, v)),
                )
            }),
        ),
        // dictFromEntries : forall k v. ([{ key: k, value: v }]) => [k: v]
        (
            "dictFromEntries".into(),
            poly2(|k, v| {
                Type::function(
                    vec![Type::array(entry_record(k.clone(), v.clone()))],
                    Type::dict(k, v),
                )
            }),
        ),
        // dictMerge : forall k v. ([k: v], [k: v]) => [k: v]
        (
            "dictMerge".into(),
            poly2(|k, v| {
                Type::function(
                    vec![
                        Type::dict(k.clone(), v.clone()),
                        Type::dict(k.clone(), v.clone()),
                    ],
                    Type::dict(k, v),
                )
            }),
        ),
        // dictHas : forall k v. ([k: v], k) => boolean
        (
            "dictHas".into(),
            poly2(|k, v| {
                Type::function(vec![Type::dict(k.clone(), v), k], Type::Boolean)
            }),
        ),
        // dictSet : forall k v. ([k: v], k, v) => [k: v]
        (
            "dictSet".into(),
            poly2(|k, v| {
                Type::function(
                    vec![Type::dict(k.clone(), v.clone()), k.clone(), v.clone()],
                    Type::dict(k, v),
                )
            }),
        ),
        // dictDelete : forall k v. ([k: v], k) => [k: v]
        (
            "dictDelete".into(),
            poly2(|k, v| {
                Type::function(
                    vec![Type::dict(k.clone(), v.clone()), k.clone()],
                    Type::dict(k, v),
                )
            }),
        ),
        // dictSize : forall k v. ([k: v]) => number
        (
            "dictSize".into(),
            poly2(|k, v| Type::function(vec![Type::dict(k, v)], Type::Number)),
        ),
    ];
    TypeEnv::with_bindings(entries)
}

// ── Shape-check helpers ────────────────────────────────────────────────

fn expect_array<'a>(value: &'a Value, what: &str) -> Result<&'a Vec<Value>, String> {
    match value {
        Value::Array(elements) => Ok(elements),
        other => Err(format!("{} must be an array, got {}", what, other.kind())),
    }
}

fn expect_dict<'a>(value: &'a Value, what: &str) -> Result<&'a Vec<(Value, Value)>, String> {
    match value {
        Value::Dict(entries) => Ok(entries),
        other => Err(format!(
            "{} must be a dictionary, got {}",
            what,
            other.kind()
        )),
    }
}

fn expect_number(value: &Value, what: &str) -> Result<f64, String> {
    match value {
        Value::Number(n) => Ok(*n),
        other => Err(format!("{} must be a number, got {}", what, other.kind())),
    }
}

fn expect_string<'a>(value: &'a Value, what: &str) -> Result<&'a str, String> {
    match value {
        Value::Str(s) => Ok(s),
        other => Err(format!("{} must be a string, got {}", what, other.kind())),
    }
}

// ── Array built-ins ────────────────────────────────────────────────────

fn length(args: &[Value]) -> Result<Value, String> {
    let elements = expect_array(&args[0], "argument")?;
    Ok(Value::Number(elements.len() as f64))
}

fn head(args: &[Value]) -> Result<Value, String> {
    let elements = expect_array(&args[0], "argument")?;
    elements
        .first()
        .cloned()
        .ok_or_else(|| "head of empty array".to_string())
}

fn tail(args: &[Value]) -> Result<Value, String> {
    let elements = expect_array(&args[0], "argument")?;
    if elements.is_empty() {
        return Err("tail of empty array".to_string());
    }
    Ok(Value::Array(elements[1..].to_vec()))
}

fn push(args: &[Value]) -> Result<Value, String> {
    let elements = expect_array(&args[0], "first argument")?;
    let mut result = elements.clone();
    result.push(args[1].clone());
    Ok(Value::Array(result))
}

fn empty(args: &[Value]) -> Result<Value, String> {
    let elements = expect_array(&args[0], "argument")?;
    Ok(Value::Boolean(elements.is_empty()))
}

fn range(args: &[Value]) -> Result<Value, String> {
    let start = expect_number(&args[0], "first argument")?;
    let end = expect_number(&args[1], "second argument")?;
    let mut out = Vec::new();
    let mut n = start;
    while n < end {
        out.push(Value::Number(n));
        n += 1.0;
    }
    Ok(Value::Array(out))
}

fn sum(args: &[Value]) -> Result<Value, String> {
    let elements = expect_array(&args[0], "argument")?;
    let mut total = 0.0;
    for elem in elements {
        total += expect_number(elem, "every element")?;
    }
    Ok(Value::Number(total))
}

fn product(args: &[Value]) -> Result<Value, String> {
    let elements = expect_array(&args[0], "argument")?;
    let mut total = 1.0;
    for elem in elements {
        total *= expect_number(elem, "every element")?;
    }
    Ok(Value::Number(total))
}

fn flatten(args: &[Value]) -> Result<Value, String> {
    let elements = expect_array(&args[0], "argument")?;
    let mut out = Vec::new();
    for elem in elements {
        out.extend(expect_array(elem, "every element")?.iter().cloned());
    }
    Ok(Value::Array(out))
}

fn unique(args: &[Value]) -> Result<Value, String> {
    let elements = expect_array(&args[0], "argument")?;
    let mut out: Vec<Value> = Vec::new();
    for elem in elements {
        if !out.iter().any(|seen| seen.structural_eq(elem)) {
            out.push(elem.clone());
        }
    }
    Ok(Value::Array(out))
}

fn chunk(args: &[Value]) -> Result<Value, String> {
    let elements = expect_array(&args[0], "first argument")?;
    let size = expect_number(&args[1], "second argument")?;
    if size < 1.0 || size.fract() != 0.0 {
        return Err(format!("chunk size must be a positive integer, got {}", size));
    }
    let size = size as usize;
    let out = elements
        .chunks(size)
        .map(|chunk| Value::Array(chunk.to_vec()))
        .collect();
    Ok(Value::Array(out))
}

fn zip(args: &[Value]) -> Result<Value, String> {
    let first = expect_array(&args[0], "first argument")?;
    let second = expect_array(&args[1], "second argument")?;
    let out = first
        .iter()
        .zip(second.iter())
        .map(|(a, b)| {
            Value::Record(vec![
                ("first".to_string(), a.clone()),
                ("second".to_string(), b.clone()),
            ])
        })
        .collect();
    Ok(Value::Array(out))
}

fn concat(args: &[Value]) -> Result<Value, String> {
    let first = expect_array(&args[0], "first argument")?;
    let second = expect_array(&args[1], "second argument")?;
    let mut out = first.clone();
    out.extend(second.iter().cloned());
    Ok(Value::Array(out))
}

// ── String built-ins ───────────────────────────────────────────────────

fn substring(args: &[Value]) -> Result<Value, String> {
    let s = expect_string(&args[0], "first argument")?;
    let start = expect_number(&args[1], "second argument")?;
    let end = expect_number(&args[2], "third argument")?;

    let chars: Vec<char> = s.chars().collect();
    let clamp = |n: f64| -> usize {
        if n.is_nan() || n < 0.0 {
            0
        } else if n >= chars.len() as f64 {
            chars.len()
        } else {
            n as usize
        }
    };
    let (mut a, mut b) = (clamp(start), clamp(end));
    if a > b {
        std::mem::swap(&mut a, &mut b);
    }
    Ok(Value::Str(chars[a..b].iter().collect()))
}

fn strlen(args: &[Value]) -> Result<Value, String> {
    let s = expect_string(&args[0], "argument")?;
    Ok(Value::Number(s.chars().count() as f64))
}

// ── Numeric built-ins ──────────────────────────────────────────────────

fn sqrt(args: &[Value]) -> Result<Value, String> {
    Ok(Value::Number(expect_number(&args[0], "argument")?.sqrt()))
}

fn abs(args: &[Value]) -> Result<Value, String> {
    Ok(Value::Number(expect_number(&args[0], "argument")?.abs()))
}

fn floor(args: &[Value]) -> Result<Value, String> {
    Ok(Value::Number(expect_number(&args[0], "argument")?.floor()))
}

fn ceil(args: &[Value]) -> Result<Value, String> {
    Ok(Value::Number(expect_number(&args[0], "argument")?.ceil()))
}

// ── Conversions ────────────────────────────────────────────────────────

fn to_string(args: &[Value]) -> Result<Value, String> {
    Ok(Value::Str(args[0].to_string()))
}

fn to_number(args: &[Value]) -> Result<Value, String> {
    let s = expect_string(&args[0], "argument")?;
    s.trim()
        .parse::<f64>()
        .map(Value::Number)
        .map_err(|_| format!("cannot convert '{}' to a number", s))
}

// ── Dictionary built-ins ───────────────────────────────────────────────

fn dict_keys(args: &[Value]) -> Result<Value, String> {
    let entries = expect_dict(&args[0], "argument")?;
    Ok(Value::Array(entries.iter().map(|(k, _)| k.clone()).collect()))
}

fn dict_values(args: &[Value]) -> Result<Value, String> {
    let entries = expect_dict(&args[0], "argument")?;
    Ok(Value::Array(entries.iter().map(|(_, v)| v.clone()).collect()))
}

fn dict_entries(args: &[Value]) -> Result<Value, String> {
    let entries = expect_dict(&args[0], "argument")?;
    let out = entries
        .iter()
        .map(|(k, v)| {
            Value::Record(vec![
                ("key".to_string(), k.clone()),
                ("value".to_string(), v.clone()),
            ])
        })
        .collect();
    Ok(Value::Array(out))
}

fn dict_from_entries(args: &[Value]) -> Result<Value, String> {
    let elements = expect_array(&args[0], "argument")?;
    let mut entries: Vec<(Value, Value)> = Vec::new();
    for elem in elements {
        let Value::Record(fields) = elem else {
            return Err(format!(
                "every element must be a {{ key, value }} record, got {}",
                elem.kind()
            ));
        };
        let key = fields
            .iter()
            .find(|(name, _)| name == "key")
            .map(|(_, v)| v.clone())
            .ok_or_else(|| "entry record is missing the 'key' field".to_string())?;
        let value = fields
            .iter()
            .find(|(name, _)| name == "value")
            .map(|(_, v)| v.clone())
            .ok_or_else(|| "entry record is missing the 'value' field".to_string())?;
        dict_insert(&mut entries, key, value);
    }
    Ok(Value::Dict(entries))
}

fn dict_merge(args: &[Value]) -> Result<Value, String> {
    let first = expect_dict(&args[0], "first argument")?;
    let second = expect_dict(&args[1], "second argument")?;
    let mut entries = first.clone();
    for (k, v) in second {
        dict_insert(&mut entries, k.clone(), v.clone());
    }
    Ok(Value::Dict(entries))
}

fn dict_has(args: &[Value]) -> Result<Value, String> {
    let entries = expect_dict(&args[0], "first argument")?;
    let found = entries.iter().any(|(k, _)| k.structural_eq(&args[1]));
    Ok(Value::Boolean(found))
}

fn dict_set(args: &[Value]) -> Result<Value, String> {
    let entries = expect_dict(&args[0], "first argument")?;
    let mut entries = entries.clone();
    dict_insert(&mut entries, args[1].clone(), args[2].clone());
    Ok(Value::Dict(entries))
}

fn dict_delete(args: &[Value]) -> Result<Value, String> {
    let entries = expect_dict(&args[0], "first argument")?;
    let out = entries
        .iter()
        .filter(|(k, _)| !k.structural_eq(&args[1]))
        .cloned()
        .collect();
    Ok(Value::Dict(out))
}

fn dict_size(args: &[Value]) -> Result<Value, String> {
    let entries = expect_dict(&args[0], "argument")?;
    Ok(Value::Number(entries.len() as f64))
}

/// Insert preserving insertion order: an existing structurally equal key
/// keeps its position and has its value replaced.
pub(crate) fn dict_insert(entries: &mut Vec<(Value, Value)>, key: Value, value: Value) {
    match entries.iter_mut().find(|(k, _)| k.structural_eq(&key)) {
        Some((_, slot)) => *slot = value,
        None => entries.push((key, value)),
    }
}
