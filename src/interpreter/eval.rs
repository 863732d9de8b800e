//! The evaluator: a tree walker over the parsed AST.
//!
//! Evaluation happens against a chain of mutable scope frames. Closures
//! capture the frame they were created in by reference; `let` groups
//! pre-declare their names with an uninitialized sentinel so initializers
//! can refer to any group member, which is what makes recursion and
//! mutual recursion work without a fixpoint representation.

use std::rc::Rc;

use crate::ast::expression::{
    BinOpKind, Call, Expression, FunctionLit, IndexAccess, MatchExpr, MemberAccess, UnaryOpKind,
};
use crate::ast::pattern::Pattern;
use crate::ast::{LetGroup, Program, Statement};
use crate::builtins;
use crate::span::Span;

use super::env::{Env, EnvRef};
use super::error::RuntimeError;
use super::value::{Closure, Value};

/// Evaluate a program, returning the value of its final statement.
///
/// The initial environment contains one entry per built-in.
pub fn evaluate(program: &Program) -> Result<Value, RuntimeError> {
    let env = global_env();
    let mut result = Value::Null;
    for item in &program.items {
        result = item.eval(&env)?;
    }
    Ok(result)
}

/// The global environment: every built-in bound to its implementation.
fn global_env() -> EnvRef {
    let env = Env::root();
    {
        let mut frame = env.borrow_mut();
        for builtin in builtins::BUILTINS {
            frame.define(builtin.name, Value::Builtin(builtin));
        }
    }
    env
}

impl Statement {
    /// Evaluate one statement. A binding group yields `null`.
    pub(crate) fn eval(&self, env: &EnvRef) -> Result<Value, RuntimeError> {
        match self {
            Statement::Let(group) => {
                group.eval(env)?;
                Ok(Value::Null)
            }
            Statement::Expression(expr) => expr.eval(env),
        }
    }
}

impl LetGroup {
    /// Evaluate a binding group.
    ///
    /// Every name is pre-defined with an uninitialized sentinel, then the
    /// initializers run in order, each replacing its slot as soon as it
    /// finishes. Reading a sentinel raises a "referenced before
    /// initialization" error; function literals tolerate their own name
    /// being pending because they do not read it until called.
    fn eval(&self, env: &EnvRef) -> Result<(), RuntimeError> {
        for binding in &self.bindings {
            env.borrow_mut()
                .define(&binding.name.name, Value::Uninitialized);
        }
        for binding in &self.bindings {
            let value = binding.value.eval(env)?;
            env.borrow_mut().define(&binding.name.name, value);
        }
        Ok(())
    }
}

impl Expression {
    pub(crate) fn eval(&self, env: &EnvRef) -> Result<Value, RuntimeError> {
        match self {
            Expression::Number(n) => Ok(Value::Number(n.value)),
            Expression::Str(s) => Ok(Value::Str(s.value.clone())),
            Expression::Boolean(b) => Ok(Value::Boolean(b.value)),
            Expression::Null(_) => Ok(Value::Null),
            Expression::Undefined(_) => Ok(Value::Undefined),

            Expression::Ident(ident) => match env.borrow().get(&ident.name) {
                Some(Value::Uninitialized) => Err(RuntimeError::UninitializedBinding {
                    name: ident.name.clone(),
                    span: ident.position,
                }),
                Some(value) => Ok(value),
                None => Err(RuntimeError::UndefinedVariable {
                    name: ident.name.clone(),
                    span: ident.position,
                }),
            },

            Expression::Array(array) => {
                let mut elements = Vec::with_capacity(array.elements.len());
                for elem in &array.elements {
                    elements.push(elem.eval(env)?);
                }
                Ok(Value::Array(elements))
            }

            Expression::Dict(dict) => {
                let mut entries: Vec<(Value, Value)> = Vec::with_capacity(dict.entries.len());
                for (key_expr, value_expr) in &dict.entries {
                    let key = key_expr.eval(env)?;
                    let value = value_expr.eval(env)?;
                    builtins::dict_insert(&mut entries, key, value);
                }
                Ok(Value::Dict(entries))
            }

            Expression::Record(record) => {
                let mut fields = Vec::with_capacity(record.fields.len());
                for (name, value_expr) in &record.fields {
                    fields.push((name.name.clone(), value_expr.eval(env)?));
                }
                Ok(Value::Record(fields))
            }

            Expression::Member(member) => member.eval(env),
            Expression::Index(index) => index.eval(env),

            Expression::Function(function) => Ok(Value::Closure(function.capture(env))),

            Expression::Call(call) => call.eval(env),

            Expression::Binary(binary) => {
                match binary.op {
                    // Short-circuiting operators evaluate the right side
                    // only when the left doesn't decide.
                    BinOpKind::And => {
                        let left = binary.left.eval(env)?;
                        if !left.is_truthy() {
                            return Ok(Value::Boolean(false));
                        }
                        let right = binary.right.eval(env)?;
                        Ok(Value::Boolean(right.is_truthy()))
                    }
                    BinOpKind::Or => {
                        let left = binary.left.eval(env)?;
                        if left.is_truthy() {
                            return Ok(Value::Boolean(true));
                        }
                        let right = binary.right.eval(env)?;
                        Ok(Value::Boolean(right.is_truthy()))
                    }
                    _ => {
                        let left = binary.left.eval(env)?;
                        let right = binary.right.eval(env)?;
                        eval_binary(binary.op, left, right, binary.position)
                    }
                }
            }

            Expression::Unary(unary) => {
                let operand = unary.operand.eval(env)?;
                match unary.op {
                    UnaryOpKind::Neg => match operand {
                        Value::Number(n) => Ok(Value::Number(-n)),
                        other => Err(RuntimeError::type_mismatch(
                            format!("unary '-' requires a number, got {}", other.kind()),
                            unary.position,
                        )),
                    },
                    UnaryOpKind::Not => Ok(Value::Boolean(!operand.is_truthy())),
                }
            }

            Expression::If(if_expr) => {
                let condition = if_expr.condition.eval(env)?;
                if condition.is_truthy() {
                    if_expr.then_branch.eval(env)
                } else {
                    match &if_expr.else_branch {
                        Some(else_branch) => else_branch.eval(env),
                        None => Ok(Value::Null),
                    }
                }
            }

            Expression::Block(block) => {
                let frame = Env::child(env);
                let mut result = Value::Null;
                for stmt in &block.statements {
                    result = stmt.eval(&frame)?;
                }
                Ok(result)
            }

            Expression::Match(match_expr) => match_expr.eval(env),
        }
    }
}

/// Arithmetic, comparison, and equality operators (the non-short-circuit
/// ones), with both operands already evaluated.
fn eval_binary(
    op: BinOpKind,
    left: Value,
    right: Value,
    span: Span,
) -> Result<Value, RuntimeError> {
    match op {
        BinOpKind::Add => match (&left, &right) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
            // `+` concatenates as soon as either side is a string.
            (Value::Str(_), _) | (_, Value::Str(_)) => {
                Ok(Value::Str(format!("{}{}", left, right)))
            }
            _ => Err(numeric_operand_error("+", &left, &right, span)),
        },
        BinOpKind::Sub | BinOpKind::Mul | BinOpKind::Div | BinOpKind::Rem => {
            let (Value::Number(a), Value::Number(b)) = (&left, &right) else {
                return Err(numeric_operand_error(op_symbol(op), &left, &right, span));
            };
            match op {
                BinOpKind::Sub => Ok(Value::Number(a - b)),
                BinOpKind::Mul => Ok(Value::Number(a * b)),
                BinOpKind::Div => {
                    if *b == 0.0 {
                        Err(RuntimeError::DivisionByZero { span })
                    } else {
                        Ok(Value::Number(a / b))
                    }
                }
                BinOpKind::Rem => {
                    if *b == 0.0 {
                        Err(RuntimeError::DivisionByZero { span })
                    } else {
                        Ok(Value::Number(a % b))
                    }
                }
                _ => unreachable!(),
            }
        }
        BinOpKind::Lt | BinOpKind::LtEq | BinOpKind::Gt | BinOpKind::GtEq => {
            let (Value::Number(a), Value::Number(b)) = (&left, &right) else {
                return Err(numeric_operand_error(op_symbol(op), &left, &right, span));
            };
            let result = match op {
                BinOpKind::Lt => a < b,
                BinOpKind::LtEq => a <= b,
                BinOpKind::Gt => a > b,
                BinOpKind::GtEq => a >= b,
                _ => unreachable!(),
            };
            Ok(Value::Boolean(result))
        }
        BinOpKind::Eq => Ok(Value::Boolean(left.structural_eq(&right))),
        BinOpKind::NotEq => Ok(Value::Boolean(!left.structural_eq(&right))),
        BinOpKind::And | BinOpKind::Or => unreachable!("short-circuit ops handled by caller"),
    }
}

fn op_symbol(op: BinOpKind) -> &'static str {
    match op {
        BinOpKind::Add => "+",
        BinOpKind::Sub => "-",
        BinOpKind::Mul => "*",
        BinOpKind::Div => "/",
        BinOpKind::Rem => "%",
        BinOpKind::Eq => "==",
        BinOpKind::NotEq => "!=",
        BinOpKind::Lt => "<",
        BinOpKind::LtEq => "<=",
        BinOpKind::Gt => ">",
        BinOpKind::GtEq => ">=",
        BinOpKind::And => "&&",
        BinOpKind::Or => "||",
    }
}

fn numeric_operand_error(op: &str, left: &Value, right: &Value, span: Span) -> RuntimeError {
    RuntimeError::type_mismatch(
        format!(
            "operator '{}' requires numbers, got {} and {}",
            op,
            left.kind(),
            right.kind()
        ),
        span,
    )
}

impl FunctionLit {
    /// Produce a closure capturing the current environment.
    fn capture(&self, env: &EnvRef) -> Closure {
        Closure {
            params: self.params.iter().map(|p| p.name.name.clone()).collect(),
            body: Rc::new((*self.body).clone()),
            env: Rc::clone(env),
        }
    }
}

impl Call {
    fn eval(&self, env: &EnvRef) -> Result<Value, RuntimeError> {
        let callee = self.callee.eval(env)?;
        let mut args = Vec::with_capacity(self.args.len());
        for arg in &self.args {
            args.push(arg.eval(env)?);
        }

        match callee {
            Value::Builtin(builtin) => {
                if args.len() != builtin.arity {
                    return Err(RuntimeError::ArityMismatch {
                        expected: builtin.arity,
                        found: args.len(),
                        span: self.position,
                    });
                }
                (builtin.run)(&args).map_err(|message| RuntimeError::Builtin {
                    name: builtin.name,
                    message,
                    span: self.position,
                })
            }
            Value::Closure(closure) => {
                if args.len() != closure.params.len() {
                    return Err(RuntimeError::ArityMismatch {
                        expected: closure.params.len(),
                        found: args.len(),
                        span: self.position,
                    });
                }
                let frame = Env::child(&closure.env);
                for (param, arg) in closure.params.iter().zip(args) {
                    frame.borrow_mut().define(param, arg);
                }
                closure.body.eval(&frame)
            }
            other => Err(RuntimeError::type_mismatch(
                format!("cannot call a {}", other.kind()),
                self.position,
            )),
        }
    }
}

impl MemberAccess {
    fn eval(&self, env: &EnvRef) -> Result<Value, RuntimeError> {
        let object = self.object.eval(env)?;
        match object {
            Value::Record(fields) => fields
                .iter()
                .find(|(name, _)| *name == self.field.name)
                .map(|(_, value)| value.clone())
                .ok_or_else(|| RuntimeError::MissingField {
                    field: self.field.name.clone(),
                    span: self.position,
                }),
            other => Err(RuntimeError::MemberAccessOnNonRecord {
                kind: other.kind(),
                span: self.position,
            }),
        }
    }
}

impl IndexAccess {
    fn eval(&self, env: &EnvRef) -> Result<Value, RuntimeError> {
        let object = self.object.eval(env)?;
        let index = self.index.eval(env)?;
        match object {
            Value::Array(elements) => {
                let Value::Number(n) = index else {
                    return Err(RuntimeError::type_mismatch(
                        format!("array index must be a number, got {}", index.kind()),
                        self.position,
                    ));
                };
                if n.fract() != 0.0 || n < 0.0 || n >= elements.len() as f64 {
                    return Err(RuntimeError::IndexOutOfBounds {
                        index: n,
                        length: elements.len(),
                        span: self.position,
                    });
                }
                Ok(elements[n as usize].clone())
            }
            Value::Dict(entries) => Ok(entries
                .iter()
                .find(|(key, _)| key.structural_eq(&index))
                .map(|(_, value)| value.clone())
                .unwrap_or(Value::Undefined)),
            other => Err(RuntimeError::type_mismatch(
                format!("cannot index a {}", other.kind()),
                self.position,
            )),
        }
    }
}

impl MatchExpr {
    fn eval(&self, env: &EnvRef) -> Result<Value, RuntimeError> {
        let discriminant = self.discriminant.eval(env)?;

        for case in &self.cases {
            let frame = Env::child(env);
            if !case.pattern.matches(&discriminant, &frame) {
                continue;
            }
            if let Some(guard) = &case.guard {
                if !guard.eval(&frame)?.is_truthy() {
                    continue;
                }
            }
            return case.body.eval(&frame);
        }

        Err(RuntimeError::NoMatchingPattern {
            span: self.position,
        })
    }
}

impl Pattern {
    /// Attempt to match a value, binding identifier patterns into `env`.
    fn matches(&self, value: &Value, env: &EnvRef) -> bool {
        match self {
            Pattern::Wildcard(_) => true,
            Pattern::Number(n) => value.structural_eq(&Value::Number(n.value)),
            Pattern::Str(s) => value.structural_eq(&Value::Str(s.value.clone())),
            Pattern::Boolean(b) => value.structural_eq(&Value::Boolean(b.value)),
            Pattern::Null(_) => value.structural_eq(&Value::Null),
            Pattern::Ident(ident) => {
                env.borrow_mut().define(&ident.name, value.clone());
                true
            }
        }
    }
}
