//! Declaration nodes: interface variables, consts, locals, structs,
//! functions and synthesized helpers.

use std::fmt;

use shaderlink_core::Span;

use crate::Ident;
use crate::expr::Expr;
use crate::stmt::Stmt;

/// Precision qualifier of interface declarations and precision statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Precision {
    Low,
    Medium,
    High,
}

impl Precision {
    pub fn as_str(self) -> &'static str {
        match self {
            Precision::Low => "lowp",
            Precision::Medium => "mediump",
            Precision::High => "highp",
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `attribute`, `uniform` and `varying` declarations.
///
/// ```text
/// uniform highp vec3 lightDir;
/// uniform Light lights[4];
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceDecl {
    pub precision: Option<Precision>,
    pub ty: Ident,
    pub name: Ident,
    pub length: Option<usize>,
    pub span: Span,
}

/// `const T name[len] = init;`
#[derive(Debug, Clone, PartialEq)]
pub struct ConstDecl {
    pub ty: Ident,
    pub name: Ident,
    pub length: Option<usize>,
    pub init: Option<Expr>,
    /// Declared as `export const`; the name is kept verbatim.
    pub exported: bool,
    /// Source text replacing `init` when emitted, set by constant injection.
    pub injected: Option<String>,
    pub span: Span,
}

/// `T name[len] = init;`
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub ty: Ident,
    pub name: Ident,
    pub length: Option<usize>,
    pub init: Option<Expr>,
    pub span: Span,
}

/// One `T field[len];` line of a struct.
#[derive(Debug, Clone, PartialEq)]
pub struct StructMember {
    pub ty: Ident,
    pub name: String,
    pub length: Option<usize>,
    pub span: Span,
}

/// `struct Name { ... };`
#[derive(Debug, Clone, PartialEq)]
pub struct StructDecl {
    pub name: Ident,
    pub members: Vec<StructMember>,
    pub span: Span,
}

/// Parameter direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ParamQualifier {
    /// No qualifier written.
    #[default]
    Default,
    In,
    Out,
    InOut,
}

impl ParamQualifier {
    /// Emitted prefix, including the trailing space.
    pub fn prefix(self) -> &'static str {
        match self {
            ParamQualifier::Default => "",
            ParamQualifier::In => "in ",
            ParamQualifier::Out => "out ",
            ParamQualifier::InOut => "inout ",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub qualifier: ParamQualifier,
    pub ty: Ident,
    pub name: Ident,
    pub length: Option<usize>,
    pub span: Span,
}

/// A function definition. `ret` is `None` for void.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub ret: Option<Ident>,
    pub name: Ident,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// Which dynamic-index macro a helper implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HelperKind {
    Get,
    Set,
}

impl HelperKind {
    /// The macro name, also used as the helper name prefix.
    pub fn macro_name(self) -> &'static str {
        match self {
            HelperKind::Get => "getIndex",
            HelperKind::Set => "setIndex",
        }
    }
}

/// Shape of the container a helper indexes.
#[derive(Debug, Clone, PartialEq)]
pub enum HelperContainer {
    /// `T x[len]`
    Array { len: usize },
    /// A vector type such as `vec3`.
    Vector { ty: String, len: usize },
}

impl HelperContainer {
    pub fn len(&self) -> usize {
        match self {
            HelperContainer::Array { len } | HelperContainer::Vector { len, .. } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A synthesized `getIndex`/`setIndex` accessor.
///
/// Only created by activity analysis; earlier passes never see it.
#[derive(Debug, Clone, PartialEq)]
pub struct HelperFunction {
    pub kind: HelperKind,
    pub name: Ident,
    /// Element type; bound to the struct's variable for struct elements.
    pub element: Ident,
    pub container: HelperContainer,
    pub span: Span,
}
