//! Abstract syntax tree for shader modules.
//!
//! The tree is produced by an external parser (or by the constructors in
//! [`builder`]) and then mutated in place by the compiler passes: identifiers
//! are bound to variables, dynamic-index macros are bound to their helpers,
//! and synthesized helper functions are spliced into module statement lists.

pub mod builder;
pub mod decl;
pub mod expr;
pub mod stmt;

use shaderlink_core::{Span, VarId};

pub use decl::{
    ConstDecl, FunctionDecl, HelperContainer, HelperFunction, HelperKind, InterfaceDecl, Param,
    ParamQualifier, Precision, StructDecl, StructMember, VarDecl,
};
pub use expr::{BinaryExpr, CallExpr, Expr, GetIndexExpr, IndexExpr, MemberExpr, UnaryExpr};
pub use shaderlink_core::{AssignOp, BinaryOp, UnaryOp, UpdateOp};
pub use stmt::{
    AssignStmt, ExportStmt, ExtensionStmt, ForStmt, IfBranch, IfStmt, ImportItem, ImportStmt,
    PrecisionStmt, ReexportStmt, ReturnStmt, SetIndexStmt, Stmt, UpdateStmt, VersionStmt,
};

/// An identifier occurrence, bound to a variable by name resolution.
///
/// Declarations, references and type names all use `Ident`; after
/// resolution `var` holds the handle whose current name is emitted.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub var: Option<VarId>,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            var: None,
            span,
        }
    }
}
