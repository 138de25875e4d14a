//! Expression nodes.

use ordered_float::OrderedFloat;
use shaderlink_core::{BinaryOp, Span, UnaryOp, VarId};

use crate::Ident;

/// An expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Integer literal (`3`)
    Int(i64, Span),
    /// Float literal (`1.5`)
    Float(OrderedFloat<f64>, Span),
    /// Boolean literal
    Bool(bool, Span),
    /// Variable, function or type reference
    Var(Ident),
    /// Swizzle, struct field or package member (`a.b`)
    Member(Box<MemberExpr>),
    /// Constant index (`a[2]`)
    Index(Box<IndexExpr>),
    /// Dynamic index macro (`getIndex(a, i)`)
    GetIndex(Box<GetIndexExpr>),
    /// Function call or constructor
    Call(Box<CallExpr>),
    /// Binary operation
    Binary(Box<BinaryExpr>),
    /// Prefix operation
    Unary(Box<UnaryExpr>),
    /// Parenthesized expression
    Paren(Box<Expr>, Span),
}

impl Expr {
    /// Get the span of this expression.
    pub fn span(&self) -> Span {
        match self {
            Self::Int(_, span) | Self::Float(_, span) | Self::Bool(_, span) => *span,
            Self::Var(ident) => ident.span,
            Self::Member(e) => e.span,
            Self::Index(e) => e.span,
            Self::GetIndex(e) => e.span,
            Self::Call(e) => e.span,
            Self::Binary(e) => e.span,
            Self::Unary(e) => e.span,
            Self::Paren(_, span) => *span,
        }
    }
}

/// `object.key`
#[derive(Debug, Clone, PartialEq)]
pub struct MemberExpr {
    pub object: Expr,
    pub key: String,
    /// Set when `object` names a package and `key` one of its exports.
    pub package_member: Option<VarId>,
    pub span: Span,
}

/// `container[index]` with a compile-time index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexExpr {
    pub container: Expr,
    pub index: Expr,
    pub span: Span,
}

/// `getIndex(container, index)`.
#[derive(Debug, Clone, PartialEq)]
pub struct GetIndexExpr {
    pub container: Expr,
    pub index: Expr,
    /// The synthesized accessor, bound during activity analysis.
    pub helper: Option<VarId>,
    pub span: Span,
}

/// `callee(args...)`
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub callee: Expr,
    pub args: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub op: BinaryOp,
    pub left: Expr,
    pub right: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub operand: Expr,
    pub span: Span,
}
