//! Constructors for building trees by hand.
//!
//! Parsers attach real spans; trees built with these helpers use
//! `Span::default()` everywhere.
//!
//! ```
//! use shaderlink_ast::builder::*;
//!
//! let module = vec![
//!     uniform("vec4", "tint"),
//!     function(None, "main", vec![], vec![assign(var("gl_FragColor"), var("tint"))]),
//! ];
//! assert_eq!(module.len(), 2);
//! ```

use ordered_float::OrderedFloat;
use shaderlink_core::{AssignOp, BinaryOp, Span, UnaryOp, UpdateOp};

use crate::decl::{
    ConstDecl, FunctionDecl, InterfaceDecl, Param, ParamQualifier, Precision, StructDecl,
    StructMember, VarDecl,
};
use crate::expr::{BinaryExpr, CallExpr, Expr, GetIndexExpr, IndexExpr, MemberExpr, UnaryExpr};
use crate::stmt::{
    AssignStmt, ExportStmt, ExtensionStmt, ForStmt, IfBranch, IfStmt, ImportItem, ImportStmt,
    PrecisionStmt, ReexportStmt, ReturnStmt, SetIndexStmt, Stmt, UpdateStmt, VersionStmt,
};
use crate::Ident;

fn ident(name: &str) -> Ident {
    Ident::new(name, Span::default())
}

// ============================================================================
// Expressions
// ============================================================================

pub fn int(value: i64) -> Expr {
    Expr::Int(value, Span::default())
}

pub fn float(value: f64) -> Expr {
    Expr::Float(OrderedFloat(value), Span::default())
}

pub fn boolean(value: bool) -> Expr {
    Expr::Bool(value, Span::default())
}

pub fn var(name: &str) -> Expr {
    Expr::Var(ident(name))
}

pub fn member(object: Expr, key: &str) -> Expr {
    Expr::Member(Box::new(MemberExpr {
        object,
        key: key.to_string(),
        package_member: None,
        span: Span::default(),
    }))
}

pub fn index(container: Expr, index: Expr) -> Expr {
    Expr::Index(Box::new(IndexExpr {
        container,
        index,
        span: Span::default(),
    }))
}

/// `getIndex(container, index)`
pub fn get_index(container: Expr, index: Expr) -> Expr {
    Expr::GetIndex(Box::new(GetIndexExpr {
        container,
        index,
        helper: None,
        span: Span::default(),
    }))
}

/// Call a function or constructor by name.
pub fn call(name: &str, args: Vec<Expr>) -> Expr {
    Expr::Call(Box::new(call_expr(name, args)))
}

fn call_expr(name: &str, args: Vec<Expr>) -> CallExpr {
    CallExpr {
        callee: var(name),
        args,
        span: Span::default(),
    }
}

pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary(Box::new(BinaryExpr {
        op,
        left,
        right,
        span: Span::default(),
    }))
}

pub fn unary(op: UnaryOp, operand: Expr) -> Expr {
    Expr::Unary(Box::new(UnaryExpr {
        op,
        operand,
        span: Span::default(),
    }))
}

pub fn paren(inner: Expr) -> Expr {
    Expr::Paren(Box::new(inner), Span::default())
}

// ============================================================================
// Pragmas, imports and exports
// ============================================================================

pub fn version(number: u32, profile: Option<&str>) -> Stmt {
    Stmt::Version(VersionStmt {
        number,
        profile: profile.map(str::to_string),
        span: Span::default(),
    })
}

pub fn extension(name: &str, behavior: &str) -> Stmt {
    Stmt::Extension(ExtensionStmt {
        name: name.to_string(),
        behavior: behavior.to_string(),
        span: Span::default(),
    })
}

pub fn precision(precision: Precision, ty: &str) -> Stmt {
    Stmt::Precision(PrecisionStmt {
        precision,
        ty: ident(ty),
        span: Span::default(),
    })
}

/// `import {name as alias} from "path"`
pub fn import(name: &str, alias: &str, path: &str) -> Stmt {
    Stmt::Import(ImportStmt {
        item: ImportItem::Named(name.to_string()),
        alias: ident(alias),
        path: path.to_string(),
        span: Span::default(),
    })
}

/// `import * as alias from "path"`
pub fn import_all(alias: &str, path: &str) -> Stmt {
    Stmt::Import(ImportStmt {
        item: ImportItem::All,
        alias: ident(alias),
        path: path.to_string(),
        span: Span::default(),
    })
}

/// `import export {name as alias} from "path"`
pub fn reexport(name: &str, alias: &str, path: &str) -> Stmt {
    Stmt::Reexport(ReexportStmt {
        name: name.to_string(),
        alias: alias.to_string(),
        path: path.to_string(),
        span: Span::default(),
    })
}

pub fn export(name: &str) -> Stmt {
    export_as(name, name)
}

pub fn export_as(name: &str, alias: &str) -> Stmt {
    Stmt::Export(ExportStmt {
        target: ident(name),
        alias: alias.to_string(),
        span: Span::default(),
    })
}

// ============================================================================
// Declarations
// ============================================================================

fn interface(precision: Option<Precision>, ty: &str, name: &str, length: Option<usize>) -> InterfaceDecl {
    InterfaceDecl {
        precision,
        ty: ident(ty),
        name: ident(name),
        length,
        span: Span::default(),
    }
}

pub fn attribute(ty: &str, name: &str) -> Stmt {
    Stmt::Attribute(interface(None, ty, name, None))
}

pub fn uniform(ty: &str, name: &str) -> Stmt {
    Stmt::Uniform(interface(None, ty, name, None))
}

pub fn uniform_array(ty: &str, name: &str, len: usize) -> Stmt {
    Stmt::Uniform(interface(None, ty, name, Some(len)))
}

pub fn varying(ty: &str, name: &str) -> Stmt {
    Stmt::Varying(interface(None, ty, name, None))
}

pub fn varying_with(precision: Precision, ty: &str, name: &str) -> Stmt {
    Stmt::Varying(interface(Some(precision), ty, name, None))
}

fn const_decl(ty: &str, name: &str, init: Expr, exported: bool) -> Stmt {
    Stmt::Const(ConstDecl {
        ty: ident(ty),
        name: ident(name),
        length: None,
        init: Some(init),
        exported,
        injected: None,
        span: Span::default(),
    })
}

pub fn constant(ty: &str, name: &str, init: Expr) -> Stmt {
    const_decl(ty, name, init, false)
}

/// `export const T name = init;`
pub fn export_const(ty: &str, name: &str, init: Expr) -> Stmt {
    const_decl(ty, name, init, true)
}

pub fn local(ty: &str, name: &str, init: Option<Expr>) -> Stmt {
    Stmt::Var(VarDecl {
        ty: ident(ty),
        name: ident(name),
        length: None,
        init,
        span: Span::default(),
    })
}

pub fn local_array(ty: &str, name: &str, len: usize) -> Stmt {
    Stmt::Var(VarDecl {
        ty: ident(ty),
        name: ident(name),
        length: Some(len),
        init: None,
        span: Span::default(),
    })
}

pub fn structure(name: &str, members: Vec<StructMember>) -> Stmt {
    Stmt::Struct(StructDecl {
        name: ident(name),
        members,
        span: Span::default(),
    })
}

pub fn field(ty: &str, name: &str) -> StructMember {
    StructMember {
        ty: ident(ty),
        name: name.to_string(),
        length: None,
        span: Span::default(),
    }
}

pub fn field_array(ty: &str, name: &str, len: usize) -> StructMember {
    StructMember {
        length: Some(len),
        ..field(ty, name)
    }
}

/// A function definition; `ret` of `None` is void.
pub fn function(ret: Option<&str>, name: &str, params: Vec<Param>, body: Vec<Stmt>) -> Stmt {
    Stmt::Function(FunctionDecl {
        ret: ret.map(ident),
        name: ident(name),
        params,
        body,
        span: Span::default(),
    })
}

pub fn param(ty: &str, name: &str) -> Param {
    param_with(ParamQualifier::Default, ty, name)
}

pub fn param_with(qualifier: ParamQualifier, ty: &str, name: &str) -> Param {
    Param {
        qualifier,
        ty: ident(ty),
        name: ident(name),
        length: None,
        span: Span::default(),
    }
}

pub fn param_array(ty: &str, name: &str, len: usize) -> Param {
    Param {
        length: Some(len),
        ..param(ty, name)
    }
}

// ============================================================================
// Statements
// ============================================================================

pub fn assign(target: Expr, value: Expr) -> Stmt {
    assign_op(target, AssignOp::Assign, value)
}

pub fn assign_op(target: Expr, op: AssignOp, value: Expr) -> Stmt {
    Stmt::Assign(AssignStmt {
        target,
        op,
        value,
        span: Span::default(),
    })
}

/// An `if`/`else if`/`else` chain; a `None` condition is the final `else`.
pub fn if_chain(branches: Vec<(Option<Expr>, Vec<Stmt>)>) -> Stmt {
    Stmt::If(IfStmt {
        branches: branches
            .into_iter()
            .map(|(cond, body)| IfBranch {
                cond,
                body,
                span: Span::default(),
            })
            .collect(),
        span: Span::default(),
    })
}

pub fn if_then(cond: Expr, body: Vec<Stmt>) -> Stmt {
    if_chain(vec![(Some(cond), body)])
}

pub fn if_else(cond: Expr, then: Vec<Stmt>, otherwise: Vec<Stmt>) -> Stmt {
    if_chain(vec![(Some(cond), then), (None, otherwise)])
}

pub fn for_loop(init: Stmt, cond: Expr, step: Stmt, body: Vec<Stmt>) -> Stmt {
    Stmt::For(Box::new(ForStmt {
        init,
        cond,
        step,
        body,
        span: Span::default(),
    }))
}

pub fn ret(value: Expr) -> Stmt {
    Stmt::Return(ReturnStmt {
        value: Some(value),
        span: Span::default(),
    })
}

pub fn ret_void() -> Stmt {
    Stmt::Return(ReturnStmt {
        value: None,
        span: Span::default(),
    })
}

pub fn call_stmt(name: &str, args: Vec<Expr>) -> Stmt {
    Stmt::Call(call_expr(name, args))
}

pub fn increment(target: Expr) -> Stmt {
    Stmt::Update(UpdateStmt {
        target,
        op: UpdateOp::Increment,
        span: Span::default(),
    })
}

pub fn decrement(target: Expr) -> Stmt {
    Stmt::Update(UpdateStmt {
        target,
        op: UpdateOp::Decrement,
        span: Span::default(),
    })
}

/// `setIndex(container, index, value)`
pub fn set_index(container: Expr, index: Expr, value: Expr) -> Stmt {
    Stmt::SetIndex(SetIndexStmt {
        container,
        index,
        value,
        helper: None,
        span: Span::default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn if_else_ends_with_unconditional_branch() {
        let Stmt::If(stmt) = if_else(boolean(true), vec![], vec![]) else {
            panic!("expected if statement");
        };
        assert!(stmt.has_else());

        let Stmt::If(stmt) = if_then(boolean(true), vec![]) else {
            panic!("expected if statement");
        };
        assert!(!stmt.has_else());
    }

    #[test]
    fn export_defaults_alias_to_name() {
        let Stmt::Export(stmt) = export("light") else {
            panic!("expected export");
        };
        assert_eq!(stmt.alias, "light");
        assert_eq!(stmt.target.name, "light");
    }
}
