//! Activity Pass - backward liveness over one module.
//!
//! Blocks are walked last statement first, so a declaration is judged by
//! the reads of the statements after it. This is a single sweep: loop
//! bodies are not revisited.
//!
//! ## Responsibilities
//!
//! - Mark every variable read by live code as used
//! - Track declared variables (and fragment varyings) that must end up used
//! - Skip bodies of functions nothing calls
//! - Rewrite `getIndex`/`setIndex` calls to injected helpers
//! - Reject statements after a `return`

use shaderlink_ast::{Expr, HelperKind, Stmt};
use shaderlink_core::{ControlFlowError, ShaderError};

use crate::config::Stage;
use crate::passes::dynamic_index::inject_helper;
use crate::passes::eval::ExprEvaluator;
use crate::passes::resolve::bound;
use crate::usage::Usage;
use crate::variable::{DeclKind, VarArena};

type Result<T> = std::result::Result<T, ShaderError>;

pub struct ActivityPass<'a> {
    vars: &'a mut VarArena,
    usage: &'a mut Usage,
    stage: Stage,
}

impl<'a> ActivityPass<'a> {
    pub fn new(vars: &'a mut VarArena, usage: &'a mut Usage, stage: Stage) -> Self {
        Self { vars, usage, stage }
    }

    pub fn run(mut self, statements: &mut [Stmt]) -> Result<()> {
        self.process_block(statements)
    }

    fn process_block(&mut self, statements: &mut [Stmt]) -> Result<()> {
        let last = statements.len().saturating_sub(1);
        if let Some(pos) = statements[..last]
            .iter()
            .position(|stmt| matches!(stmt, Stmt::Return(_)))
        {
            return Err(ControlFlowError::Unreachable {
                span: statements[pos + 1].span(),
            }
            .into());
        }
        for stmt in statements.iter_mut().rev() {
            self.process_stmt(stmt)?;
        }
        Ok(())
    }

    fn process_stmt(&mut self, stmt: &mut Stmt) -> Result<()> {
        match stmt {
            Stmt::Version(_)
            | Stmt::Extension(_)
            | Stmt::Precision(_)
            | Stmt::Import(_)
            | Stmt::Reexport(_)
            | Stmt::Export(_)
            | Stmt::Attribute(_)
            | Stmt::Uniform(_)
            | Stmt::Struct(_)
            | Stmt::Helper(_) => Ok(()),
            Stmt::Varying(d) => {
                if self.stage == Stage::Fragment {
                    self.usage.track(bound(&d.name)?, d.span);
                }
                Ok(())
            }
            Stmt::Const(d) => {
                let id = bound(&d.name)?;
                if d.exported || self.usage.is_used(id) {
                    if let Some(init) = &mut d.init {
                        self.process_expr(init)?;
                    }
                }
                Ok(())
            }
            Stmt::Var(d) => {
                let id = bound(&d.name)?;
                self.usage.track(id, d.span);
                if self.vars.get(id).decl == DeclKind::Local || self.usage.is_used(id) {
                    if let Some(init) = &mut d.init {
                        self.process_expr(init)?;
                    }
                }
                Ok(())
            }
            Stmt::Function(d) => {
                if self.usage.is_used(bound(&d.name)?) {
                    self.process_block(&mut d.body)?;
                }
                Ok(())
            }
            Stmt::Assign(s) => {
                self.process_expr(&mut s.value)?;
                match &s.target {
                    Expr::Var(_) => Ok(()),
                    _ => self.process_expr(&mut s.target),
                }
            }
            Stmt::If(s) => {
                for branch in s.branches.iter_mut().rev() {
                    self.process_block(&mut branch.body)?;
                    if let Some(cond) = &mut branch.cond {
                        self.process_expr(cond)?;
                    }
                }
                Ok(())
            }
            Stmt::For(s) => {
                self.process_block(&mut s.body)?;
                self.process_stmt(&mut s.step)?;
                self.process_expr(&mut s.cond)?;
                self.process_stmt(&mut s.init)
            }
            Stmt::Return(s) => match &mut s.value {
                Some(value) => self.process_expr(value),
                None => Ok(()),
            },
            Stmt::Call(call) => {
                self.process_expr(&mut call.callee)?;
                self.process_exprs(&mut call.args)
            }
            Stmt::Update(s) => self.process_expr(&mut s.target),
            Stmt::SetIndex(s) => {
                let container = ExprEvaluator::new(self.vars).eval(&s.container)?;
                let helper =
                    inject_helper(self.vars, self.usage, HelperKind::Set, &container, s.span)?;
                self.usage.mark_used(helper, s.span);
                s.helper = Some(helper);
                self.process_expr(&mut s.value)?;
                self.process_expr(&mut s.index)?;
                self.process_expr(&mut s.container)
            }
        }
    }

    fn process_exprs(&mut self, exprs: &mut [Expr]) -> Result<()> {
        for expr in exprs.iter_mut().rev() {
            self.process_expr(expr)?;
        }
        Ok(())
    }

    fn process_expr(&mut self, expr: &mut Expr) -> Result<()> {
        match expr {
            Expr::Int(..) | Expr::Float(..) | Expr::Bool(..) => Ok(()),
            Expr::Var(ident) => {
                self.usage.mark_used(bound(ident)?, ident.span);
                Ok(())
            }
            Expr::Member(member) => match member.package_member {
                Some(id) => {
                    self.usage.mark_used(id, member.span);
                    Ok(())
                }
                None => self.process_expr(&mut member.object),
            },
            Expr::Index(index) => {
                self.process_expr(&mut index.index)?;
                self.process_expr(&mut index.container)
            }
            Expr::GetIndex(index) => {
                let container = ExprEvaluator::new(self.vars).eval(&index.container)?;
                let helper =
                    inject_helper(self.vars, self.usage, HelperKind::Get, &container, index.span)?;
                self.usage.mark_used(helper, index.span);
                index.helper = Some(helper);
                self.process_expr(&mut index.index)?;
                self.process_expr(&mut index.container)
            }
            Expr::Call(call) => {
                self.process_exprs(&mut call.args)?;
                self.process_expr(&mut call.callee)
            }
            Expr::Binary(binary) => {
                self.process_expr(&mut binary.right)?;
                self.process_expr(&mut binary.left)
            }
            Expr::Unary(unary) => self.process_expr(&mut unary.operand),
            Expr::Paren(inner, _) => self.process_expr(inner),
        }
    }
}
