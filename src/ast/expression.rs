use crate::span::Span;

use super::pattern::Pattern;
use super::types::TypeExpr;
use super::Statement;

/// All expression forms in Rill.
#[derive(Debug, Clone)]
pub enum Expression {
    Number(NumberLit),
    Str(StringLit),
    Boolean(BooleanLit),
    Null(NullLit),
    Undefined(UndefinedLit),
    Ident(Ident),
    Array(ArrayLit),
    Dict(DictLit),
    Record(RecordLit),
    Member(MemberAccess),
    Index(IndexAccess),
    Function(FunctionLit),
    Call(Call),
    Binary(BinaryOp),
    Unary(UnaryOp),
    If(IfExpr),
    Block(Block),
    Match(MatchExpr),
}

impl Expression {
    /// The source span of this expression.
    pub fn position(&self) -> Span {
        match self {
            Expression::Number(n) => n.position,
            Expression::Str(s) => s.position,
            Expression::Boolean(b) => b.position,
            Expression::Null(n) => n.position,
            Expression::Undefined(u) => u.position,
            Expression::Ident(i) => i.position,
            Expression::Array(a) => a.position,
            Expression::Dict(d) => d.position,
            Expression::Record(r) => r.position,
            Expression::Member(m) => m.position,
            Expression::Index(i) => i.position,
            Expression::Function(f) => f.position,
            Expression::Call(c) => c.position,
            Expression::Binary(b) => b.position,
            Expression::Unary(u) => u.position,
            Expression::If(i) => i.position,
            Expression::Block(b) => b.position,
            Expression::Match(m) => m.position,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Ident {
    pub name: String,
    pub position: Span,
}

#[derive(Debug, Clone)]
pub struct NumberLit {
    pub value: f64,
    pub position: Span,
}

#[derive(Debug, Clone)]
pub struct StringLit {
    pub value: String,
    pub position: Span,
}

#[derive(Debug, Clone)]
pub struct BooleanLit {
    pub value: bool,
    pub position: Span,
}

#[derive(Debug, Clone)]
pub struct NullLit {
    pub position: Span,
}

#[derive(Debug, Clone)]
pub struct UndefinedLit {
    pub position: Span,
}

#[derive(Debug, Clone)]
pub struct ArrayLit {
    pub elements: Vec<Expression>,
    pub position: Span,
}

/// A dictionary literal: an ordered sequence of key/value expression pairs.
#[derive(Debug, Clone)]
pub struct DictLit {
    pub entries: Vec<(Expression, Expression)>,
    pub position: Span,
}

/// A record literal: an ordered sequence of name/value pairs.
///
/// Field names are unique; the parser rejects duplicates.
#[derive(Debug, Clone)]
pub struct RecordLit {
    pub fields: Vec<(Ident, Expression)>,
    pub position: Span,
}

/// `object.field`
#[derive(Debug, Clone)]
pub struct MemberAccess {
    pub object: Box<Expression>,
    pub field: Ident,
    pub position: Span,
}

/// `container[index]`
#[derive(Debug, Clone)]
pub struct IndexAccess {
    pub object: Box<Expression>,
    pub index: Box<Expression>,
    pub position: Span,
}

/// A function parameter: a name with an optional type annotation.
#[derive(Debug, Clone)]
pub struct Param {
    pub name: Ident,
    pub annotation: Option<TypeExpr>,
}

/// A function literal: `(a, b) => body`, `(a: number): number => body`,
/// or the paren-free single-parameter form `x => body`.
#[derive(Debug, Clone)]
pub struct FunctionLit {
    pub params: Vec<Param>,
    pub return_annotation: Option<TypeExpr>,
    pub body: Box<Expression>,
    pub position: Span,
}

#[derive(Debug, Clone)]
pub struct Call {
    pub callee: Box<Expression>,
    pub args: Vec<Expression>,
    pub position: Span,
}

/// Binary operator kinds, grouped by precedence level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOpKind {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

#[derive(Debug, Clone)]
pub struct BinaryOp {
    pub op: BinOpKind,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    pub position: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOpKind {
    Neg,
    Not,
}

#[derive(Debug, Clone)]
pub struct UnaryOp {
    pub op: UnaryOpKind,
    pub operand: Box<Expression>,
    pub position: Span,
}

/// `if (condition) then_branch else else_branch`
#[derive(Debug, Clone)]
pub struct IfExpr {
    pub condition: Box<Expression>,
    pub then_branch: Box<Expression>,
    pub else_branch: Option<Box<Expression>>,
    pub position: Span,
}

/// A block expression `{ statements… }`.
///
/// The block's value is the value of its final statement.
#[derive(Debug, Clone)]
pub struct Block {
    pub statements: Vec<Statement>,
    pub position: Span,
}

#[derive(Debug, Clone)]
pub struct MatchExpr {
    pub discriminant: Box<Expression>,
    pub cases: Vec<MatchCase>,
    pub position: Span,
}

#[derive(Debug, Clone)]
pub struct MatchCase {
    pub pattern: Pattern,
    pub guard: Option<Expression>,
    pub body: Expression,
    pub position: Span,
}
