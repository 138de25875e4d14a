//! Statement nodes.
//!
//! Top-level module statements and function-body statements share one enum:
//! - Pragmas (`#version`, `#extension`) and precision statements
//! - Imports, exports and re-exports
//! - Declarations (interface variables, consts, locals, structs, functions)
//! - Control flow (if, for, return)
//! - Assignments, calls, `++`/`--` and `setIndex`
//! - Synthesized helper functions

use shaderlink_core::{AssignOp, Span, UpdateOp, VarId};

use crate::Ident;
use crate::decl::{
    ConstDecl, FunctionDecl, HelperFunction, InterfaceDecl, Precision, StructDecl, VarDecl,
};
use crate::expr::{CallExpr, Expr};

/// A statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `#version N [profile]`
    Version(VersionStmt),
    /// `#extension name : behavior`
    Extension(ExtensionStmt),
    /// `precision mediump float;`
    Precision(PrecisionStmt),
    /// `import {name as alias} from "path"` or `import * as alias from "path"`
    Import(ImportStmt),
    /// `import export {name as alias} from "path"`
    Reexport(ReexportStmt),
    /// `export {name as alias}`
    Export(ExportStmt),
    /// `attribute T name;`
    Attribute(InterfaceDecl),
    /// `uniform T name[len];`
    Uniform(InterfaceDecl),
    /// `varying T name;`
    Varying(InterfaceDecl),
    /// `const T name = init;`
    Const(ConstDecl),
    /// `T name = init;`
    Var(VarDecl),
    /// Struct definition
    Struct(StructDecl),
    /// Function definition
    Function(FunctionDecl),
    /// Assignment, plain or compound
    Assign(AssignStmt),
    /// If statement
    If(IfStmt),
    /// For loop
    For(Box<ForStmt>),
    /// Return statement
    Return(ReturnStmt),
    /// Call statement
    Call(CallExpr),
    /// `i++` / `i--`
    Update(UpdateStmt),
    /// `setIndex(container, index, value)`
    SetIndex(SetIndexStmt),
    /// Synthesized dynamic-index accessor
    Helper(HelperFunction),
}

impl Stmt {
    /// Get the span of this statement.
    pub fn span(&self) -> Span {
        match self {
            Self::Version(s) => s.span,
            Self::Extension(s) => s.span,
            Self::Precision(s) => s.span,
            Self::Import(s) => s.span,
            Self::Reexport(s) => s.span,
            Self::Export(s) => s.span,
            Self::Attribute(s) | Self::Uniform(s) | Self::Varying(s) => s.span,
            Self::Const(s) => s.span,
            Self::Var(s) => s.span,
            Self::Struct(s) => s.span,
            Self::Function(s) => s.span,
            Self::Assign(s) => s.span,
            Self::If(s) => s.span,
            Self::For(s) => s.span,
            Self::Return(s) => s.span,
            Self::Call(s) => s.span,
            Self::Update(s) => s.span,
            Self::SetIndex(s) => s.span,
            Self::Helper(s) => s.span,
        }
    }

    /// Statements that must precede all declarations of a module.
    pub fn is_prologue(&self) -> bool {
        matches!(
            self,
            Self::Version(_) | Self::Extension(_) | Self::Precision(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VersionStmt {
    pub number: u32,
    pub profile: Option<String>,
    pub span: Span,
}

impl VersionStmt {
    /// The pragma argument, e.g. `300 es`.
    pub fn text(&self) -> String {
        match &self.profile {
            Some(profile) => format!("{} {}", self.number, profile),
            None => self.number.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtensionStmt {
    pub name: String,
    pub behavior: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrecisionStmt {
    pub precision: Precision,
    pub ty: Ident,
    pub span: Span,
}

/// What an import statement pulls from the module.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportItem {
    /// One exported name.
    Named(String),
    /// Every export, bound as a package.
    All,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportStmt {
    pub item: ImportItem,
    /// Local binding.
    pub alias: Ident,
    /// Absolute module path, resolved by the parser.
    pub path: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReexportStmt {
    pub name: String,
    pub alias: String,
    pub path: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportStmt {
    pub target: Ident,
    pub alias: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignStmt {
    pub target: Expr,
    pub op: AssignOp,
    pub value: Expr,
    pub span: Span,
}

/// One `if`/`else if`/`else` arm. The final `else` has no condition.
#[derive(Debug, Clone, PartialEq)]
pub struct IfBranch {
    pub cond: Option<Expr>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub branches: Vec<IfBranch>,
    pub span: Span,
}

impl IfStmt {
    /// Whether the chain ends in an unconditional `else`.
    pub fn has_else(&self) -> bool {
        self.branches
            .last()
            .is_some_and(|branch| branch.cond.is_none())
    }
}

/// `for (init; cond; step) { body }`
#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub init: Stmt,
    pub cond: Expr,
    pub step: Stmt,
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStmt {
    pub target: Expr,
    pub op: UpdateOp,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetIndexStmt {
    pub container: Expr,
    pub index: Expr,
    pub value: Expr,
    /// The synthesized setter, bound during activity analysis.
    pub helper: Option<VarId>,
    pub span: Span,
}
