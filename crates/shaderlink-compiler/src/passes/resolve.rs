//! Name Resolution Pass - bind every identifier to a variable.
//!
//! Walks one module in source order. Declarations allocate a variable in the
//! arena and bind it in the innermost frame; references look their name up
//! through the frame chain. Imports read the export tables of modules that
//! were resolved earlier in bundle order.
//!
//! ## Responsibilities
//!
//! - Allocate variables for declarations (with their `DeclKind`)
//! - Bind identifiers, type names and package members
//! - Build the module's export table
//! - Reject `return` outside functions and writes to package members

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use shaderlink_ast::{
    ConstDecl, Expr, FunctionDecl, Ident, ImportItem, ImportStmt, InterfaceDecl, Stmt,
};
use shaderlink_core::{ModuleError, NameError, ShaderError, Span, VarId};

use crate::config::Stage;
use crate::module::{Export, ExportTable};
use crate::scope::ScopeStack;
use crate::variable::{DeclKind, VarArena, Variable};

type Result<T> = std::result::Result<T, ShaderError>;

/// Output of resolving one module.
#[derive(Debug, Default)]
pub struct NameResolutionOutput {
    pub exports: ExportTable,
    /// The module's own `main` function, if it defines one.
    pub main: Option<VarId>,
    pub declarations: usize,
}

pub struct NameResolutionPass<'a> {
    vars: &'a mut VarArena,
    scopes: ScopeStack,
    /// Export tables of already resolved modules, by path.
    registry: &'a FxHashMap<String, ExportTable>,
    stage: Stage,
    path: &'a str,
    exports: ExportTable,
    declarations: usize,
}

impl<'a> NameResolutionPass<'a> {
    pub fn new(
        vars: &'a mut VarArena,
        globals: FxHashMap<String, VarId>,
        registry: &'a FxHashMap<String, ExportTable>,
        stage: Stage,
        path: &'a str,
    ) -> Self {
        Self {
            vars,
            scopes: ScopeStack::new(globals),
            registry,
            stage,
            path,
            exports: ExportTable::new(),
            declarations: 0,
        }
    }

    pub fn run(mut self, statements: &mut [Stmt]) -> Result<NameResolutionOutput> {
        self.resolve_block(statements)?;
        let main = self
            .scopes
            .lookup_local("main")
            .filter(|&id| self.vars.get(id).decl == DeclKind::Function);
        Ok(NameResolutionOutput {
            exports: self.exports,
            main,
            declarations: self.declarations,
        })
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    /// Allocate a variable for `ident` and bind it in the innermost frame.
    fn declare(&mut self, ident: &mut Ident, decl: DeclKind, constant: bool) -> Result<VarId> {
        let var = Variable::new(ident.name.clone(), decl, ident.span);
        let id = self.vars.alloc(if constant { var.constant() } else { var });
        self.scopes.declare(&ident.name, id, self.vars, ident.span)?;
        ident.var = Some(id);
        self.declarations += 1;
        Ok(id)
    }

    fn export(&mut self, alias: &str, var: VarId, span: Span) -> Result<()> {
        if let Some(previous) = self.exports.get(alias) {
            return Err(NameError::DuplicateExport {
                name: alias.to_string(),
                span,
                previous: previous.span,
            }
            .into());
        }
        self.exports.insert(alias.to_string(), Export { var, span });
        Ok(())
    }

    fn module_exports(&self, path: &str, span: Span) -> Result<&'a ExportTable> {
        self.registry.get(path).ok_or_else(|| {
            ModuleError::NotFound {
                path: path.to_string(),
                from: self.path.to_string(),
                span,
            }
            .into()
        })
    }

    fn imported(&self, path: &str, name: &str, span: Span) -> Result<VarId> {
        self.module_exports(path, span)?
            .get(name)
            .map(|export| export.var)
            .ok_or_else(|| {
                NameError::NotExported {
                    name: name.to_string(),
                    path: path.to_string(),
                    span,
                }
                .into()
            })
    }

    fn resolve_import(&mut self, import: &mut ImportStmt) -> Result<()> {
        let id = match &import.item {
            ImportItem::Named(name) => self.imported(&import.path, name, import.span)?,
            ImportItem::All => {
                let members: BTreeMap<String, VarId> = self
                    .module_exports(&import.path, import.span)?
                    .iter()
                    .map(|(name, export)| (name.clone(), export.var))
                    .collect();
                let mut package =
                    Variable::new(import.alias.name.clone(), DeclKind::Package, import.span)
                        .constant();
                package.package = Some(members);
                self.vars.alloc(package)
            }
        };
        self.scopes
            .declare(&import.alias.name, id, self.vars, import.alias.span)?;
        import.alias.var = Some(id);
        Ok(())
    }

    fn resolve_interface(&mut self, decl: &mut InterfaceDecl, kind: DeclKind) -> Result<()> {
        self.resolve_ident(&mut decl.ty)?;
        let constant = match kind {
            DeclKind::Varying => self.stage == Stage::Fragment,
            _ => true,
        };
        self.declare(&mut decl.name, kind, constant)?;
        Ok(())
    }

    fn resolve_const(&mut self, decl: &mut ConstDecl) -> Result<()> {
        self.resolve_ident(&mut decl.ty)?;
        if let Some(init) = &mut decl.init {
            self.resolve_expr(init)?;
        }
        let kind = DeclKind::Const {
            exported: decl.exported,
        };
        let id = self.declare(&mut decl.name, kind, true)?;
        if decl.exported {
            self.export(&decl.name.name, id, decl.span)?;
        }
        Ok(())
    }

    fn resolve_function(&mut self, decl: &mut FunctionDecl) -> Result<()> {
        if let Some(existing) = self.scopes.lookup(&decl.name.name) {
            return Err(NameError::AlreadyDefined {
                name: decl.name.name.clone(),
                span: decl.name.span,
                previous: self.vars.get(existing).span,
            }
            .into());
        }
        let id = self.declare(&mut decl.name, DeclKind::Function, true)?;
        if let Some(ret) = &mut decl.ret {
            self.resolve_ident(ret)?;
        }

        self.scopes.push_function(id);
        for param in &mut decl.params {
            self.resolve_ident(&mut param.ty)?;
            self.declare(&mut param.name, DeclKind::Param, false)?;
        }
        self.resolve_block(&mut decl.body)?;
        self.scopes.pop();
        Ok(())
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn resolve_block(&mut self, statements: &mut [Stmt]) -> Result<()> {
        for stmt in statements {
            self.resolve_stmt(stmt)?;
        }
        Ok(())
    }

    fn resolve_stmt(&mut self, stmt: &mut Stmt) -> Result<()> {
        match stmt {
            Stmt::Version(_) | Stmt::Extension(_) | Stmt::Helper(_) => Ok(()),
            Stmt::Precision(s) => self.resolve_ident(&mut s.ty),
            Stmt::Import(s) => self.resolve_import(s),
            Stmt::Reexport(s) => {
                let id = self.imported(&s.path, &s.name, s.span)?;
                self.export(&s.alias, id, s.span)
            }
            Stmt::Export(s) => {
                self.resolve_ident(&mut s.target)?;
                let id = bound(&s.target)?;
                self.export(&s.alias, id, s.span)
            }
            Stmt::Attribute(d) => self.resolve_interface(d, DeclKind::Attribute),
            Stmt::Uniform(d) => self.resolve_interface(d, DeclKind::Uniform),
            Stmt::Varying(d) => self.resolve_interface(d, DeclKind::Varying),
            Stmt::Const(d) => self.resolve_const(d),
            Stmt::Var(d) => {
                self.resolve_ident(&mut d.ty)?;
                if let Some(init) = &mut d.init {
                    self.resolve_expr(init)?;
                }
                let kind = if self.scopes.depth() == 0 {
                    DeclKind::Global
                } else {
                    DeclKind::Local
                };
                self.declare(&mut d.name, kind, false)?;
                Ok(())
            }
            Stmt::Struct(d) => {
                for member in &mut d.members {
                    self.resolve_ident(&mut member.ty)?;
                }
                self.declare(&mut d.name, DeclKind::Struct, true)?;
                Ok(())
            }
            Stmt::Function(d) => self.resolve_function(d),
            Stmt::Assign(s) => {
                self.resolve_expr(&mut s.target)?;
                if let Expr::Member(member) = &s.target
                    && member.package_member.is_some()
                {
                    return Err(NameError::PackageMemberAssignment { span: s.span }.into());
                }
                self.resolve_expr(&mut s.value)
            }
            Stmt::If(s) => {
                for branch in &mut s.branches {
                    if let Some(cond) = &mut branch.cond {
                        self.resolve_expr(cond)?;
                    }
                    self.scopes.push_block();
                    self.resolve_block(&mut branch.body)?;
                    self.scopes.pop();
                }
                Ok(())
            }
            Stmt::For(s) => {
                self.scopes.push_block();
                self.resolve_stmt(&mut s.init)?;
                self.resolve_expr(&mut s.cond)?;
                self.resolve_stmt(&mut s.step)?;
                self.resolve_block(&mut s.body)?;
                self.scopes.pop();
                Ok(())
            }
            Stmt::Return(s) => {
                if self.scopes.enclosing_function().is_none() {
                    return Err(NameError::ReturnOutsideFunction { span: s.span }.into());
                }
                match &mut s.value {
                    Some(value) => self.resolve_expr(value),
                    None => Ok(()),
                }
            }
            Stmt::Call(call) => {
                self.resolve_expr(&mut call.callee)?;
                self.resolve_exprs(&mut call.args)
            }
            Stmt::Update(s) => self.resolve_expr(&mut s.target),
            Stmt::SetIndex(s) => {
                self.resolve_expr(&mut s.container)?;
                self.resolve_expr(&mut s.index)?;
                self.resolve_expr(&mut s.value)
            }
        }
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn resolve_ident(&mut self, ident: &mut Ident) -> Result<()> {
        match self.scopes.lookup(&ident.name) {
            Some(id) => {
                ident.var = Some(id);
                Ok(())
            }
            None => Err(NameError::Undefined {
                name: ident.name.clone(),
                span: ident.span,
            }
            .into()),
        }
    }

    fn resolve_exprs(&mut self, exprs: &mut [Expr]) -> Result<()> {
        for expr in exprs {
            self.resolve_expr(expr)?;
        }
        Ok(())
    }

    /// The package an expression denotes, if any.
    fn package_of(&self, expr: &Expr) -> Option<VarId> {
        let id = match expr {
            Expr::Var(ident) => ident.var?,
            Expr::Member(member) => member.package_member?,
            _ => return None,
        };
        self.vars.get(id).is_package().then_some(id)
    }

    fn resolve_expr(&mut self, expr: &mut Expr) -> Result<()> {
        match expr {
            Expr::Int(..) | Expr::Float(..) | Expr::Bool(..) => Ok(()),
            Expr::Var(ident) => self.resolve_ident(ident),
            Expr::Member(member) => {
                self.resolve_expr(&mut member.object)?;
                if let Some(package) = self.package_of(&member.object) {
                    let record = self.vars.get(package);
                    let found = record
                        .package
                        .as_ref()
                        .and_then(|members| members.get(&member.key).copied());
                    match found {
                        Some(id) => member.package_member = Some(id),
                        None => {
                            return Err(NameError::UnknownPackageMember {
                                package: record.name.clone(),
                                name: member.key.clone(),
                                span: member.span,
                            }
                            .into());
                        }
                    }
                }
                Ok(())
            }
            Expr::Index(index) => {
                self.resolve_expr(&mut index.container)?;
                self.resolve_expr(&mut index.index)
            }
            Expr::GetIndex(index) => {
                self.resolve_expr(&mut index.container)?;
                self.resolve_expr(&mut index.index)
            }
            Expr::Call(call) => {
                self.resolve_expr(&mut call.callee)?;
                self.resolve_exprs(&mut call.args)
            }
            Expr::Binary(binary) => {
                self.resolve_expr(&mut binary.left)?;
                self.resolve_expr(&mut binary.right)
            }
            Expr::Unary(unary) => self.resolve_expr(&mut unary.operand),
            Expr::Paren(inner, _) => self.resolve_expr(inner),
        }
    }
}

/// The variable an identifier was bound to.
pub(crate) fn bound(ident: &Ident) -> std::result::Result<VarId, shaderlink_core::InternalError> {
    ident
        .var
        .ok_or_else(|| shaderlink_core::InternalError::Unresolved {
            name: ident.name.clone(),
            span: ident.span,
        })
}
