//! Compiler passes, run by the bundle in this order over every module:
//!
//! - [`resolve`]: bind identifiers and build export tables
//! - [`eval`]: type check declarations and expressions
//! - [`activity`]: backward liveness and helper injection ([`dynamic_index`])
//! - [`names`]: assign final identifiers
//! - [`write`]: emit source text

pub mod activity;
pub mod dynamic_index;
pub mod eval;
pub mod names;
pub mod resolve;
pub mod write;

pub use activity::ActivityPass;
pub use eval::{ExprEvaluator, TypeCheckPass};
pub use names::NamingPass;
pub use resolve::{NameResolutionOutput, NameResolutionPass};
pub use write::Writer;

use shaderlink_ast::Stmt;

use crate::usage::Usage;

/// Whether a module-level declaration survives dead-code elimination.
///
/// Varyings, structs, helpers and local variables are always kept.
pub(crate) fn is_emitted(stmt: &Stmt, usage: &Usage, top_level: bool) -> bool {
    let used = |ident: &shaderlink_ast::Ident| ident.var.is_some_and(|id| usage.is_used(id));
    match stmt {
        Stmt::Attribute(d) | Stmt::Uniform(d) => used(&d.name),
        Stmt::Const(d) => d.exported || used(&d.name),
        Stmt::Function(d) => used(&d.name),
        Stmt::Var(d) => !top_level || used(&d.name),
        Stmt::Import(_) | Stmt::Reexport(_) | Stmt::Export(_) | Stmt::Version(_) => false,
        _ => true,
    }
}
