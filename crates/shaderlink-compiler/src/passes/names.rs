//! Naming Pass - give every emitted variable its final identifier.
//!
//! Runs in two sweeps over all modules of a bundle. [`NamingPass::preserve`]
//! claims the names that must survive unchanged (`main`, exported consts,
//! interface variables, helpers) in the root namespace; only then does
//! [`NamingPass::assign`] hand out generated names to everything else, so a
//! renamed variable can never take a preserved name.

use petgraph::graph::NodeIndex;
use shaderlink_ast::{Ident, Stmt};
use shaderlink_core::{ShaderError, VarId};

use crate::namespace::Namespace;
use crate::passes::is_emitted;
use crate::passes::resolve::bound;
use crate::usage::Usage;
use crate::variable::VarArena;

type Result<T> = std::result::Result<T, ShaderError>;

pub struct NamingPass<'a> {
    vars: &'a mut VarArena,
    namespace: &'a mut Namespace,
    usage: &'a Usage,
}

impl<'a> NamingPass<'a> {
    pub fn new(vars: &'a mut VarArena, namespace: &'a mut Namespace, usage: &'a Usage) -> Self {
        Self {
            vars,
            namespace,
            usage,
        }
    }

    /// The variable a module-level statement declares.
    fn declared(stmt: &Stmt) -> Option<&Ident> {
        match stmt {
            Stmt::Attribute(d) | Stmt::Uniform(d) | Stmt::Varying(d) => Some(&d.name),
            Stmt::Const(d) => Some(&d.name),
            Stmt::Var(d) => Some(&d.name),
            Stmt::Struct(d) => Some(&d.name),
            Stmt::Function(d) => Some(&d.name),
            Stmt::Helper(d) => Some(&d.name),
            _ => None,
        }
    }

    /// Claim the names of must-keep declarations and of `main`.
    pub fn preserve(&mut self, statements: &[Stmt], main: Option<VarId>) -> Result<()> {
        let root = self.namespace.root();
        for stmt in statements {
            if !is_emitted(stmt, self.usage, true) {
                continue;
            }
            let Some(ident) = Self::declared(stmt) else {
                continue;
            };
            let id = bound(ident)?;
            if Some(id) == main || self.vars.get(id).decl.keeps_name() {
                self.namespace.preserve(root, id, self.vars)?;
            }
        }
        Ok(())
    }

    /// Name every other emitted declaration, depth first.
    pub fn assign(&mut self, statements: &[Stmt]) -> Result<()> {
        let root = self.namespace.root();
        for stmt in statements {
            if is_emitted(stmt, self.usage, true) {
                self.assign_stmt(root, stmt)?;
            }
        }
        Ok(())
    }

    fn name(&mut self, node: NodeIndex, ident: &Ident) -> Result<()> {
        let id = bound(ident)?;
        self.namespace.assign(node, id, self.vars);
        Ok(())
    }

    fn assign_block(&mut self, node: NodeIndex, statements: &[Stmt]) -> Result<()> {
        for stmt in statements {
            if is_emitted(stmt, self.usage, false) {
                self.assign_stmt(node, stmt)?;
            }
        }
        Ok(())
    }

    fn assign_stmt(&mut self, node: NodeIndex, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::Function(d) => {
                self.name(node, &d.name)?;
                let scope = self.namespace.new_function(node);
                for param in &d.params {
                    self.name(scope, &param.name)?;
                }
                self.assign_block(scope, &d.body)
            }
            Stmt::If(s) => {
                for branch in &s.branches {
                    let block = self.namespace.new_block(node);
                    self.assign_block(block, &branch.body)?;
                }
                Ok(())
            }
            Stmt::For(s) => {
                let block = self.namespace.new_block(node);
                self.assign_stmt(block, &s.init)?;
                self.assign_block(block, &s.body)
            }
            other => match Self::declared(other) {
                Some(ident) => self.name(node, ident),
                None => Ok(()),
            },
        }
    }
}
