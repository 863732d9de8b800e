//! Type inference for Rill.
//!
//! The inferencer walks the AST accumulating two kinds of obligations:
//!
//! - **Equality constraints** `(τ₁, τ₂)` solved by unification.
//! - **Field-access constraints** `(object, field, result)` recorded when a
//!   member access lands on a type that is still a bare variable. Solving
//!   groups them by object and unifies the object with a synthesized open
//!   record carrying the required fields.
//!
//! Solving happens at binding-group boundaries (so the group's types can
//! be generalized into schemes) and after every top-level item. The solver
//! maintains a running substitution; constraint lists are cleared once
//! folded in.
//!
//! Directional subtyping (`τ usable where σ expected`) is applied at
//! exactly two places: call sites and `let` annotation boundaries. It
//! gives functions contravariant parameters and covariant returns, and
//! records width subtyping; everything else degrades to an equality
//! constraint.

use rustc_hash::FxHashMap;

use crate::ast::expression::{
    BinOpKind, Expression, FunctionLit, IfExpr, MatchExpr, UnaryOpKind,
};
use crate::ast::pattern::Pattern;
use crate::ast::types::TypeExpr;
use crate::ast::{LetGroup, Program, Statement};
use crate::builtins;
use crate::span::Span;

use super::env::TypeEnv;
use super::error::TypeError;
use super::subst::Substitution;
use super::ty::{Row, RowVar, Type, TypeScheme, TypeVar};
use super::unify::unify;

/// An equality constraint between two types, tagged with the span of the
/// expression that produced it.
#[derive(Debug, Clone)]
struct Constraint {
    left: Type,
    right: Type,
    span: Span,
}

/// A deferred obligation that `object` resolves to a record containing
/// `field` with type `result`.
#[derive(Debug, Clone)]
struct FieldConstraint {
    object: Type,
    field: String,
    result: Type,
    span: Span,
}

/// The inference engine: fresh-variable counters, constraint accumulators,
/// and the running substitution.
pub struct Infer {
    next_type_var: u32,
    next_row_var: u32,
    constraints: Vec<Constraint>,
    field_constraints: Vec<FieldConstraint>,
    subst: Substitution,
}

impl Infer {
    pub fn new() -> Self {
        Self {
            next_type_var: 0,
            next_row_var: 0,
            constraints: Vec::new(),
            field_constraints: Vec::new(),
            subst: Substitution::empty(),
        }
    }

    // ── Fresh variables ────────────────────────────────────────────────

    fn fresh_var(&mut self) -> Type {
        let id = self.next_type_var;
        self.next_type_var += 1;
        Type::Var(TypeVar::new(id))
    }

    fn fresh_named_var(&mut self, name: &str) -> Type {
        let id = self.next_type_var;
        self.next_type_var += 1;
        Type::Var(TypeVar::with_name(id, name))
    }

    fn fresh_row_var(&mut self) -> RowVar {
        let id = self.next_row_var;
        self.next_row_var += 1;
        RowVar(id)
    }

    // ── Schemes ────────────────────────────────────────────────────────

    /// Produce a fresh type from a scheme by substituting fresh variables
    /// for its quantifiers.
    fn instantiate(&mut self, scheme: &TypeScheme) -> Type {
        let mut mapping = Substitution::empty();
        for var in &scheme.vars {
            let fresh = match &var.name {
                Some(name) => self.fresh_named_var(name),
                None => self.fresh_var(),
            };
            mapping = mapping.compose(&Substitution::singleton(var, fresh));
        }
        self.subst.apply(&mapping.apply(&scheme.ty))
    }

    /// Quantify the type variables free in `ty` but not in `env`.
    fn generalize(&self, env: &TypeEnv, ty: &Type) -> TypeScheme {
        let free_in_env = env.free_type_vars();
        let mut vars: Vec<TypeVar> = ty
            .free_type_vars()
            .into_iter()
            .filter(|v| !free_in_env.contains(v))
            .collect();
        vars.sort_by_key(|v| v.id);
        TypeScheme {
            vars,
            ty: ty.clone(),
        }
    }

    // ── Constraint accumulation ────────────────────────────────────────

    fn constrain(&mut self, left: Type, right: Type, span: Span) {
        self.constraints.push(Constraint { left, right, span });
    }

    fn constrain_field(&mut self, object: Type, field: String, result: Type, span: Span) {
        self.field_constraints.push(FieldConstraint {
            object,
            field,
            result,
            span,
        });
    }

    // ── Directional subtyping ──────────────────────────────────────────

    /// Emit the obligations for `sub ≤ sup`: `sub` is usable where `sup`
    /// is expected. Applied only at call sites and `let` annotation
    /// boundaries.
    fn subtype(&mut self, sub: &Type, sup: &Type, span: Span) -> Result<(), TypeError> {
        if sub == sup {
            return Ok(());
        }
        match (sub, sup) {
            // Contravariant parameters, covariant return.
            (Type::Function(p1, r1), Type::Function(p2, r2)) => {
                if p1.len() != p2.len() {
                    return Err(TypeError::ArityMismatch {
                        expected: p1.len(),
                        found: p2.len(),
                        span,
                    });
                }
                for (a, b) in p1.iter().zip(p2.iter()) {
                    self.subtype(b, a, span)?;
                }
                self.subtype(r1, r2, span)
            }

            // Width subtyping: every field required by `sup` must exist in
            // `sub`; extra fields in `sub` are allowed.
            (Type::Record(sub_row), Type::Record(sup_row)) => {
                let mut missing = Vec::new();
                for (name, sup_field) in &sup_row.fields {
                    match sub_row.fields.get(name) {
                        Some(sub_field) => self.subtype(sub_field, sup_field, span)?,
                        None => missing.push(name.clone()),
                    }
                }
                if !missing.is_empty() {
                    return Err(TypeError::MissingFields {
                        fields: missing,
                        record: Type::Record(sub_row.clone()),
                        span,
                    });
                }
                Ok(())
            }

            // Arrays, dictionaries, type variables, and everything else
            // fall back to invariant equality.
            _ => {
                self.constrain(sub.clone(), sup.clone(), span);
                Ok(())
            }
        }
    }

    // ── Constraint solving ─────────────────────────────────────────────

    /// Fold the accumulated constraints into the running substitution.
    ///
    /// Equalities are processed sequentially; field-access constraints are
    /// then grouped by (substituted) object type and each group is unified
    /// against a synthesized open record with the required fields. Both
    /// lists are cleared.
    fn solve(&mut self) -> Result<Substitution, TypeError> {
        let constraints = std::mem::take(&mut self.constraints);
        for c in constraints {
            let left = self.subst.apply(&c.left);
            let right = self.subst.apply(&c.right);
            let mgu = unify(&left, &right).map_err(|e| TypeError::from_unify_error(e, c.span))?;
            self.subst = mgu.compose(&self.subst);
        }

        let field_constraints = std::mem::take(&mut self.field_constraints);
        // Group the deferred accesses by object type so that several
        // accesses on the same object synthesize a single record.
        let mut groups: Vec<(Type, Vec<FieldConstraint>)> = Vec::new();
        for fc in field_constraints {
            let object = self.subst.apply(&fc.object);
            match groups.iter_mut().find(|(ty, _)| *ty == object) {
                Some((_, members)) => members.push(fc),
                None => groups.push((object, vec![fc])),
            }
        }

        for (object, members) in groups {
            let span = members[0].span;
            let mut fields = std::collections::BTreeMap::new();
            for fc in &members {
                let result = self.subst.apply(&fc.result);
                if let Some(existing) = fields.get(&fc.field).cloned() {
                    // Two accesses to the same field must agree.
                    let mgu = unify(&self.subst.apply(&existing), &result)
                        .map_err(|e| TypeError::from_unify_error(e, fc.span))?;
                    self.subst = mgu.compose(&self.subst);
                } else {
                    fields.insert(fc.field.clone(), result);
                }
            }
            let tail = self.fresh_row_var();
            let synthesized = Type::Record(Row::open(fields, tail));
            let object = self.subst.apply(&object);
            let mgu = unify(&object, &self.subst.apply(&synthesized))
                .map_err(|e| TypeError::from_unify_error(e, span))?;
            self.subst = mgu.compose(&self.subst);
        }

        Ok(self.subst.clone())
    }

    // ── Annotations ────────────────────────────────────────────────────

    /// Convert a surface type expression to a type.
    ///
    /// Primitive names map to primitives; any other lowercase name is a
    /// type variable, scoped to the current annotation (`names`), so the
    /// same name denotes the same variable within one signature. Other
    /// capitalized names are unknown type expressions.
    fn type_from_annotation(
        &mut self,
        texpr: &TypeExpr,
        names: &mut FxHashMap<String, Type>,
    ) -> Result<Type, TypeError> {
        match texpr {
            TypeExpr::Number(_) => Ok(Type::Number),
            TypeExpr::Str(_) => Ok(Type::Str),
            TypeExpr::Boolean(_) => Ok(Type::Boolean),
            TypeExpr::Null(_) => Ok(Type::Null),
            TypeExpr::Undefined(_) => Ok(Type::Undefined),
            TypeExpr::Unit(_) => Ok(Type::Unit),
            TypeExpr::Array(elem, _) => {
                Ok(Type::array(self.type_from_annotation(elem, names)?))
            }
            TypeExpr::Dict(key, value, _) => Ok(Type::dict(
                self.type_from_annotation(key, names)?,
                self.type_from_annotation(value, names)?,
            )),
            TypeExpr::Function(params, ret, _) => {
                let params = params
                    .iter()
                    .map(|p| self.type_from_annotation(p, names))
                    .collect::<Result<Vec<_>, _>>()?;
                let ret = self.type_from_annotation(ret, names)?;
                Ok(Type::function(params, ret))
            }
            TypeExpr::Name(ident) => {
                if ident.name.chars().next().is_some_and(|c| c.is_ascii_uppercase()) {
                    return Err(TypeError::unknown_type_expr(&ident.name, ident.position));
                }
                if let Some(existing) = names.get(&ident.name) {
                    return Ok(existing.clone());
                }
                let fresh = self.fresh_named_var(&ident.name);
                names.insert(ident.name.clone(), fresh.clone());
                Ok(fresh)
            }
        }
    }

    // ── Expression inference ───────────────────────────────────────────

    fn infer_expr(&mut self, env: &TypeEnv, expr: &Expression) -> Result<Type, TypeError> {
        match expr {
            Expression::Number(_) => Ok(Type::Number),
            Expression::Str(_) => Ok(Type::Str),
            Expression::Boolean(_) => Ok(Type::Boolean),
            Expression::Null(_) => Ok(Type::Null),
            Expression::Undefined(_) => Ok(Type::Undefined),

            Expression::Ident(ident) => match env.lookup(&ident.name) {
                Some(scheme) => {
                    let scheme = scheme.clone();
                    Ok(self.instantiate(&scheme))
                }
                None => Err(TypeError::undefined_identifier(&ident.name, ident.position)),
            },

            Expression::Array(array) => {
                let mut elements = array.elements.iter();
                match elements.next() {
                    None => Ok(Type::array(self.fresh_var())),
                    Some(first) => {
                        let elem_ty = self.infer_expr(env, first)?;
                        for elem in elements {
                            let ty = self.infer_expr(env, elem)?;
                            self.constrain(ty, elem_ty.clone(), elem.position());
                        }
                        Ok(Type::array(elem_ty))
                    }
                }
            }

            Expression::Dict(dict) => {
                let mut entries = dict.entries.iter();
                match entries.next() {
                    None => Ok(Type::dict(self.fresh_var(), self.fresh_var())),
                    Some((first_key, first_value)) => {
                        let key_ty = self.infer_expr(env, first_key)?;
                        let value_ty = self.infer_expr(env, first_value)?;
                        for (key, value) in entries {
                            let k = self.infer_expr(env, key)?;
                            self.constrain(k, key_ty.clone(), key.position());
                            let v = self.infer_expr(env, value)?;
                            self.constrain(v, value_ty.clone(), value.position());
                        }
                        Ok(Type::dict(key_ty, value_ty))
                    }
                }
            }

            Expression::Record(record) => {
                let mut fields = std::collections::BTreeMap::new();
                for (name, value) in &record.fields {
                    let ty = self.infer_expr(env, value)?;
                    fields.insert(name.name.clone(), ty);
                }
                Ok(Type::Record(Row::closed(fields)))
            }

            Expression::Member(member) => {
                let object_ty = self.infer_expr(env, &member.object)?;
                let object_ty = self.subst.apply(&object_ty);
                match object_ty {
                    Type::Record(row) => match row.fields.get(&member.field.name) {
                        Some(field_ty) => Ok(field_ty.clone()),
                        None => {
                            if row.rest.is_some() {
                                Ok(self.fresh_var())
                            } else {
                                Err(TypeError::MissingFields {
                                    fields: vec![member.field.name.clone()],
                                    record: Type::Record(row),
                                    span: member.position,
                                })
                            }
                        }
                    },
                    // Defer: the object is not yet known to be a record.
                    other => {
                        let result = self.fresh_var();
                        self.constrain_field(
                            other,
                            member.field.name.clone(),
                            result.clone(),
                            member.position,
                        );
                        Ok(result)
                    }
                }
            }

            Expression::Index(index) => {
                let is_dict_access = matches!(index.index.as_ref(), Expression::Str(_))
                    || matches!(index.object.as_ref(), Expression::Dict(_));
                let container_ty = self.infer_expr(env, &index.object)?;
                let index_ty = self.infer_expr(env, &index.index)?;
                if is_dict_access {
                    let value_ty = self.fresh_var();
                    self.constrain(
                        container_ty,
                        Type::dict(index_ty, value_ty.clone()),
                        index.position,
                    );
                    Ok(value_ty)
                } else {
                    let elem_ty = self.fresh_var();
                    self.constrain(
                        container_ty,
                        Type::array(elem_ty.clone()),
                        index.position,
                    );
                    self.constrain(index_ty, Type::Number, index.index.position());
                    Ok(elem_ty)
                }
            }

            Expression::Function(function) => self.infer_function(env, function),

            Expression::Call(call) => {
                let callee_ty = self.infer_expr(env, &call.callee)?;
                let mut arg_tys = Vec::with_capacity(call.args.len());
                for arg in &call.args {
                    arg_tys.push(self.infer_expr(env, arg)?);
                }
                let ret_ty = self.fresh_var();
                self.subtype(
                    &callee_ty,
                    &Type::Function(arg_tys, Box::new(ret_ty.clone())),
                    call.position,
                )?;
                Ok(ret_ty)
            }

            Expression::Binary(binary) => {
                let left = self.infer_expr(env, &binary.left)?;
                let right = self.infer_expr(env, &binary.right)?;
                match binary.op {
                    BinOpKind::Add
                    | BinOpKind::Sub
                    | BinOpKind::Mul
                    | BinOpKind::Div
                    | BinOpKind::Rem => {
                        self.constrain(left, Type::Number, binary.left.position());
                        self.constrain(right, Type::Number, binary.right.position());
                        Ok(Type::Number)
                    }
                    BinOpKind::Lt | BinOpKind::LtEq | BinOpKind::Gt | BinOpKind::GtEq => {
                        self.constrain(left, Type::Number, binary.left.position());
                        self.constrain(right, Type::Number, binary.right.position());
                        Ok(Type::Boolean)
                    }
                    BinOpKind::Eq | BinOpKind::NotEq => {
                        self.constrain(left, right, binary.position);
                        Ok(Type::Boolean)
                    }
                    BinOpKind::And | BinOpKind::Or => {
                        self.constrain(left, Type::Boolean, binary.left.position());
                        self.constrain(right, Type::Boolean, binary.right.position());
                        Ok(Type::Boolean)
                    }
                }
            }

            Expression::Unary(unary) => {
                let operand = self.infer_expr(env, &unary.operand)?;
                match unary.op {
                    UnaryOpKind::Neg => {
                        self.constrain(operand, Type::Number, unary.operand.position());
                        Ok(Type::Number)
                    }
                    UnaryOpKind::Not => {
                        self.constrain(operand, Type::Boolean, unary.operand.position());
                        Ok(Type::Boolean)
                    }
                }
            }

            Expression::If(if_expr) => self.infer_if(env, if_expr),

            Expression::Block(block) => {
                let mut block_env = env.clone();
                let mut last_ty = Type::Unit;
                for stmt in &block.statements {
                    match stmt {
                        Statement::Let(group) => {
                            block_env = self.infer_let_group(&block_env, group)?;
                            last_ty = Type::Unit;
                        }
                        Statement::Expression(expr) => {
                            last_ty = self.infer_expr(&block_env, expr)?;
                        }
                    }
                }
                Ok(last_ty)
            }

            Expression::Match(match_expr) => self.infer_match(env, match_expr),
        }
    }

    fn infer_function(
        &mut self,
        env: &TypeEnv,
        function: &FunctionLit,
    ) -> Result<Type, TypeError> {
        // Parameter and return annotations share one name scope, so the
        // same written variable denotes the same type throughout a
        // signature.
        let mut names = FxHashMap::default();
        let mut fn_env = env.clone();
        let mut param_tys = Vec::with_capacity(function.params.len());
        for param in &function.params {
            let ty = match &param.annotation {
                Some(ann) => self.type_from_annotation(ann, &mut names)?,
                None => self.fresh_var(),
            };
            fn_env = fn_env.extend(&param.name.name, TypeScheme::monomorphic(ty.clone()));
            param_tys.push(ty);
        }

        let body_ty = self.infer_expr(&fn_env, &function.body)?;

        if let Some(ann) = &function.return_annotation {
            let ret_ty = self.type_from_annotation(ann, &mut names)?;
            self.constrain(body_ty.clone(), ret_ty, function.body.position());
        }

        // Nested binding groups may already have solved parts of the
        // signature; pick those refinements up.
        let param_tys = param_tys.iter().map(|t| self.subst.apply(t)).collect();
        let body_ty = self.subst.apply(&body_ty);
        Ok(Type::Function(param_tys, Box::new(body_ty)))
    }

    fn infer_if(&mut self, env: &TypeEnv, if_expr: &IfExpr) -> Result<Type, TypeError> {
        let cond_ty = self.infer_expr(env, &if_expr.condition)?;
        self.constrain(cond_ty, Type::Boolean, if_expr.condition.position());

        let then_ty = self.infer_expr(env, &if_expr.then_branch)?;

        let Some(else_branch) = &if_expr.else_branch else {
            self.constrain(then_ty, Type::Unit, if_expr.then_branch.position());
            return Ok(Type::Unit);
        };
        let else_ty = self.infer_expr(env, else_branch)?;

        // Two record branches with common fields meet at their structural
        // join; anything else must agree exactly.
        if let (Type::Record(then_row), Type::Record(else_row)) = (&then_ty, &else_ty) {
            let then_row = then_row.clone();
            let else_row = else_row.clone();
            let has_common = then_row
                .fields
                .keys()
                .any(|name| else_row.fields.contains_key(name));
            if has_common {
                return Ok(self.record_join(&then_row, &else_row, if_expr.position));
            }
        }

        self.constrain(then_ty.clone(), else_ty, if_expr.position);
        Ok(then_ty)
    }

    /// The structural join of two record rows: a closed row over the
    /// common fields, joining nested records recursively and equating
    /// everything else.
    fn record_join(&mut self, a: &Row, b: &Row, span: Span) -> Type {
        let mut fields = std::collections::BTreeMap::new();
        for (name, a_field) in &a.fields {
            let Some(b_field) = b.fields.get(name) else {
                continue;
            };
            let joined = match (a_field, b_field) {
                (Type::Record(a_row), Type::Record(b_row)) => {
                    self.record_join(a_row, b_row, span)
                }
                _ => {
                    self.constrain(a_field.clone(), b_field.clone(), span);
                    a_field.clone()
                }
            };
            fields.insert(name.clone(), joined);
        }
        Type::Record(Row::closed(fields))
    }

    fn infer_match(&mut self, env: &TypeEnv, match_expr: &MatchExpr) -> Result<Type, TypeError> {
        let disc_ty = self.infer_expr(env, &match_expr.discriminant)?;

        let mut result_ty: Option<Type> = None;
        for case in &match_expr.cases {
            // An identifier pattern generalizes the discriminant type into
            // the case scope, so guard and body uses are polymorphic over
            // it.
            let case_env = match &case.pattern {
                Pattern::Ident(ident) => {
                    let disc = self.subst.apply(&disc_ty);
                    let scheme = self.generalize(env, &disc);
                    env.extend(&ident.name, scheme)
                }
                _ => env.clone(),
            };

            if let Some(guard) = &case.guard {
                let guard_ty = self.infer_expr(&case_env, guard)?;
                self.constrain(guard_ty, Type::Boolean, guard.position());
            }

            let body_ty = self.infer_expr(&case_env, &case.body)?;
            match &result_ty {
                Some(first) => self.constrain(body_ty, first.clone(), case.body.position()),
                None => result_ty = Some(body_ty),
            }
        }

        // The case list is non-empty by construction.
        Ok(result_ty.unwrap_or(Type::Unit))
    }

    // ── Binding groups ─────────────────────────────────────────────────

    /// Type a `let` binding group as a unit.
    ///
    /// Every name in the group is pre-declared with its annotated type or
    /// a fresh placeholder, so initializers can refer to any group member
    /// (mutual recursion). After all initializers are inferred the
    /// constraints are solved and each solved type is generalized against
    /// the outer environment.
    fn infer_let_group(&mut self, env: &TypeEnv, group: &LetGroup) -> Result<TypeEnv, TypeError> {
        let mut placeholders = Vec::with_capacity(group.bindings.len());
        let mut group_env = env.clone();
        for binding in &group.bindings {
            let (placeholder, annotated) = match &binding.annotation {
                Some(ann) => {
                    let mut names = FxHashMap::default();
                    (self.type_from_annotation(ann, &mut names)?, true)
                }
                None => (self.fresh_var(), false),
            };
            group_env = group_env.extend(
                &binding.name.name,
                TypeScheme::monomorphic(placeholder.clone()),
            );
            placeholders.push((placeholder, annotated));
        }

        for (binding, (placeholder, annotated)) in group.bindings.iter().zip(&placeholders) {
            let inferred = self.infer_expr(&group_env, &binding.value)?;
            if *annotated {
                // Directional: width-wider records satisfy narrower
                // record annotations.
                self.subtype(&inferred, placeholder, binding.position)?;
            } else {
                self.constrain(inferred, placeholder.clone(), binding.position);
            }
        }

        self.solve()?;

        // Generalize against the outer environment: the placeholders
        // themselves must not block quantification.
        let outer = env.apply_subst(&self.subst);
        let mut result_env = outer.clone();
        for (binding, (placeholder, _)) in group.bindings.iter().zip(&placeholders) {
            let solved = self.subst.apply(placeholder);
            let scheme = self.generalize(&outer, &solved);
            result_env = result_env.extend(&binding.name.name, scheme);
        }
        Ok(result_env)
    }
}

impl Default for Infer {
    fn default() -> Self {
        Self::new()
    }
}

// ── Top-level drivers ──────────────────────────────────────────────────

/// Infer and solve an entire program, returning the resulting type
/// environment.
///
/// Items are processed in order; each item's constraints are solved
/// before the next is inferred, and binding groups write generalized
/// schemes into the environment. `base_env` defaults to the built-in
/// registry's environment.
pub fn infer_and_solve(
    program: &Program,
    base_env: Option<TypeEnv>,
) -> Result<TypeEnv, TypeError> {
    let mut infer = Infer::new();
    let mut env = base_env.unwrap_or_else(builtins::type_env);

    for item in &program.items {
        match item {
            Statement::Let(group) => {
                env = infer.infer_let_group(&env, group)?;
            }
            Statement::Expression(expr) => {
                infer.infer_expr(&env, expr)?;
                let subst = infer.solve()?;
                env = env.apply_subst(&subst);
            }
        }
    }

    Ok(env)
}

/// Infer the type of a single expression in the given environment.
pub fn infer_expression(expr: &Expression, env: &TypeEnv) -> Result<Type, TypeError> {
    let mut infer = Infer::new();
    let ty = infer.infer_expr(env, expr)?;
    let subst = infer.solve()?;
    Ok(subst.apply(&ty))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn env_of(source: &str) -> TypeEnv {
        let program = parse(source).expect("parsing failed");
        infer_and_solve(&program, None).expect("inference failed")
    }

    fn error_of(source: &str) -> TypeError {
        let program = parse(source).expect("parsing failed");
        infer_and_solve(&program, None).expect_err("expected a type error")
    }

    fn type_of_binding(env: &TypeEnv, name: &str) -> Type {
        env.lookup(name).expect("binding not found").ty.clone()
    }

    #[test]
    fn infer_number_literal() {
        let program = parse("42").unwrap();
        let Statement::Expression(expr) = &program.items[0] else {
            panic!("expected expression");
        };
        let ty = infer_expression(expr, &TypeEnv::empty()).unwrap();
        assert_eq!(ty, Type::Number);
    }

    #[test]
    fn infer_undefined_identifier_errors() {
        let program = parse("nope").unwrap();
        let Statement::Expression(expr) = &program.items[0] else {
            panic!("expected expression");
        };
        let err = infer_expression(expr, &TypeEnv::empty()).unwrap_err();
        assert!(matches!(err, TypeError::UndefinedIdentifier { name, .. } if name == "nope"));
    }

    #[test]
    fn infer_binary_addition() {
        let env = env_of("let n = 5 + 3");
        assert_eq!(type_of_binding(&env, "n"), Type::Number);
    }

    #[test]
    fn infer_mixed_addition_errors() {
        let err = error_of(r#"5 + "hello""#);
        assert!(matches!(err, TypeError::Mismatch { .. }));
    }

    #[test]
    fn infer_comparison_yields_boolean() {
        let env = env_of("let b = 1 < 2");
        assert_eq!(type_of_binding(&env, "b"), Type::Boolean);
    }

    #[test]
    fn infer_function_type() {
        let env = env_of("let add = (x, y) => x + y");
        assert_eq!(
            type_of_binding(&env, "add"),
            Type::function(vec![Type::Number, Type::Number], Type::Number)
        );
    }

    #[test]
    fn infer_call_result() {
        let env = env_of("let add = (x, y) => x + y; let r = add(5, 10)");
        assert_eq!(type_of_binding(&env, "r"), Type::Number);
    }

    #[test]
    fn let_polymorphism_two_instantiations() {
        let env = env_of(r#"let id = (x) => x; let a = id(42); let b = id("hi")"#);
        assert_eq!(type_of_binding(&env, "a"), Type::Number);
        assert_eq!(type_of_binding(&env, "b"), Type::Str);
    }

    #[test]
    fn identity_scheme_is_generalized() {
        let env = env_of("let id = (x) => x");
        let scheme = env.lookup("id").unwrap();
        assert_eq!(scheme.vars.len(), 1);
    }

    #[test]
    fn occurs_check_rejects_self_application() {
        let err = error_of("let f = (g) => g(g)");
        assert!(matches!(err, TypeError::OccursCheck { .. }));
    }

    #[test]
    fn record_field_access() {
        let env = env_of("let p = { x: 1, y: 2 }; let n = p.x");
        assert_eq!(type_of_binding(&env, "n"), Type::Number);
    }

    #[test]
    fn missing_field_on_closed_record_errors() {
        let err = error_of("let p = { x: 1 }; p.z");
        assert!(matches!(err, TypeError::MissingFields { .. }));
    }

    #[test]
    fn row_polymorphic_accessor_accepts_wider_records() {
        let env = env_of(
            "let getX = (p) => p.x; \
             let a = getX({ x: 1, y: 2 }); \
             let b = getX({ x: 3, y: 4, z: 5 })",
        );
        assert_eq!(type_of_binding(&env, "a"), Type::Number);
        assert_eq!(type_of_binding(&env, "b"), Type::Number);
    }

    #[test]
    fn width_subtyping_at_annotation() {
        let env = env_of("let p: { x: number } = { x: 1, y: 2 }");
        assert_eq!(
            type_of_binding(&env, "p"),
            Type::record(vec![("x".to_string(), Type::Number)])
        );
    }

    #[test]
    fn annotation_mismatch_errors() {
        let err = error_of("let nums: Array<string> = [1, 2, 3]");
        assert!(matches!(err, TypeError::Mismatch { .. }));
    }

    #[test]
    fn array_annotation_accepts_matching_elements() {
        let env = env_of("let nums: [number] = [1, 2, 3]");
        assert_eq!(type_of_binding(&env, "nums"), Type::array(Type::Number));
    }

    #[test]
    fn array_elements_must_agree() {
        let err = error_of(r#"[1, "two"]"#);
        assert!(matches!(err, TypeError::Mismatch { .. }));
    }

    #[test]
    fn empty_array_is_polymorphic() {
        let env = env_of("let xs = []");
        match type_of_binding(&env, "xs") {
            Type::Array(_) => {}
            other => panic!("expected array type, got {}", other),
        }
    }

    #[test]
    fn mutual_recursion_in_one_group() {
        let env = env_of(
            "let even = (n) => if (n == 0) true else odd(n - 1) \
             and odd = (n) => if (n == 0) false else even(n - 1)",
        );
        assert_eq!(
            type_of_binding(&env, "even"),
            Type::function(vec![Type::Number], Type::Boolean)
        );
        assert_eq!(
            type_of_binding(&env, "odd"),
            Type::function(vec![Type::Number], Type::Boolean)
        );
    }

    #[test]
    fn separate_lets_do_not_see_later_bindings() {
        let err = error_of("let f = (n) => g(n); let g = (n) => n");
        assert!(matches!(err, TypeError::UndefinedIdentifier { name, .. } if name == "g"));
    }

    #[test]
    fn if_branches_must_agree() {
        let err = error_of(r#"if (true) 1 else "two""#);
        assert!(matches!(err, TypeError::Mismatch { .. }));
    }

    #[test]
    fn if_without_else_is_unit() {
        let err = error_of("if (true) 42");
        // then branch must be unit when there is no else
        assert!(matches!(err, TypeError::Mismatch { .. }));
    }

    #[test]
    fn if_record_branches_take_structural_join() {
        let env = env_of(
            "let r = if (true) { x: 1, y: 2 } else { x: 3, z: 4 }",
        );
        assert_eq!(
            type_of_binding(&env, "r"),
            Type::record(vec![("x".to_string(), Type::Number)])
        );
    }

    #[test]
    fn match_case_bodies_must_agree() {
        let err = error_of(r#"match 1 { 0 => "zero", _ => 1 }"#);
        assert!(matches!(err, TypeError::Mismatch { .. }));
    }

    #[test]
    fn match_guard_must_be_boolean() {
        let err = error_of(r#"match 1 { x if x + 1 => "a", _ => "b" }"#);
        assert!(matches!(err, TypeError::Mismatch { .. }));
    }

    #[test]
    fn match_infers_case_type() {
        let env = env_of(r#"let r = match 5 { x if x < 0 => "neg", 0 => "zero", _ => "pos" }"#);
        assert_eq!(type_of_binding(&env, "r"), Type::Str);
    }

    #[test]
    fn index_into_array() {
        let env = env_of("let xs = [1, 2, 3]; let n = xs[0]");
        assert_eq!(type_of_binding(&env, "n"), Type::Number);
    }

    #[test]
    fn index_with_string_literal_is_dict_access() {
        let env = env_of(r#"let d = ["a": 1]; let n = d["a"]"#);
        assert_eq!(type_of_binding(&env, "n"), Type::Number);
    }

    #[test]
    fn array_index_must_be_number() {
        let err = error_of("let xs = [1, 2]; xs[true]");
        assert!(matches!(err, TypeError::Mismatch { .. }));
    }

    #[test]
    fn unknown_type_expression_errors() {
        let err = error_of("let x: Foo = 1");
        assert!(matches!(err, TypeError::UnknownTypeExpr { name, .. } if name == "Foo"));
    }

    #[test]
    fn annotation_variables_share_a_scope() {
        let env = env_of("let f: (a) => a = (x) => x; let n = f(1)");
        assert_eq!(type_of_binding(&env, "n"), Type::Number);
    }

    #[test]
    fn call_arity_mismatch_errors() {
        let err = error_of("let f = (x) => x; f(1, 2)");
        assert!(matches!(err, TypeError::ArityMismatch { .. }));
    }

    #[test]
    fn calling_a_number_errors() {
        let err = error_of("let n = 1; n(2)");
        assert!(matches!(err, TypeError::Mismatch { .. }));
    }

    #[test]
    fn block_type_is_final_expression() {
        let env = env_of("let n = { let x = 1; x + 1 }");
        assert_eq!(type_of_binding(&env, "n"), Type::Number);
    }

    #[test]
    fn block_scoped_polymorphism() {
        let env = env_of(r#"let r = { let id = (x) => x; id(1); id("a") }"#);
        assert_eq!(type_of_binding(&env, "r"), Type::Str);
    }

    #[test]
    fn generalize_instantiate_round_trip() {
        let mut infer = Infer::new();
        let env = TypeEnv::empty();

        let a = infer.fresh_var();
        let ty = Type::function(vec![a.clone()], a);
        let scheme = infer.generalize(&env, &ty);
        assert_eq!(scheme.vars.len(), 1);

        let inst = infer.instantiate(&scheme);
        assert!(unify(&inst, &ty).is_ok());
    }

    #[test]
    fn instantiate_produces_fresh_vars_each_time() {
        let mut infer = Infer::new();
        let env = TypeEnv::empty();
        let a = infer.fresh_var();
        let scheme = infer.generalize(&env, &Type::function(vec![a.clone()], a));

        let first = infer.instantiate(&scheme);
        let second = infer.instantiate(&scheme);
        assert_ne!(first, second);
    }

    #[test]
    fn builtin_schemes_are_usable() {
        let env = env_of("let n = length([1, 2, 3])");
        assert_eq!(type_of_binding(&env, "n"), Type::Number);
    }

    #[test]
    fn solved_top_level_schemes_have_no_loose_vars() {
        let env = env_of("let add = (x, y) => x + y; let r = add(1, 2)");
        let scheme = env.lookup("r").unwrap();
        assert!(scheme.ty.free_type_vars().is_empty());
    }
}
