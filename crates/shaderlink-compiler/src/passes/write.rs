//! Write Pass - emit source text for one module.
//!
//! Names are read from the arena at write time, so renamed variables, struct
//! types and helpers are printed under their final identifiers. Module-level
//! declarations that liveness found dead are dropped. `nl` and `tab` are
//! inserted inside blocks; empty strings produce minified output.

use shaderlink_ast::{CallExpr, Expr, Ident, InterfaceDecl, Param, Stmt};
use shaderlink_core::{InternalError, ShaderError};

use crate::passes::dynamic_index::write_helper;
use crate::passes::is_emitted;
use crate::passes::resolve::bound;
use crate::usage::Usage;
use crate::variable::VarArena;

type Result<T> = std::result::Result<T, ShaderError>;

pub struct Writer<'a> {
    vars: &'a VarArena,
    usage: &'a Usage,
    nl: &'a str,
    tab: &'a str,
}

impl<'a> Writer<'a> {
    pub fn new(vars: &'a VarArena, usage: &'a Usage, nl: &'a str, tab: &'a str) -> Self {
        Self {
            vars,
            usage,
            nl,
            tab,
        }
    }

    /// One chunk of text per emitted module-level statement.
    pub fn write_module(&self, statements: &[Stmt]) -> Result<Vec<String>> {
        let mut chunks = Vec::new();
        for stmt in statements {
            if !is_emitted(stmt, self.usage, true) {
                continue;
            }
            let mut out = String::new();
            self.write_stmt(&mut out, stmt, 0)?;
            if !out.is_empty() {
                chunks.push(out);
            }
        }
        Ok(chunks)
    }

    fn name(&self, ident: &Ident) -> Result<&'a str> {
        Ok(self.vars.name(bound(ident)?))
    }

    /// Type names may refer to renamed structs.
    fn type_name(&self, ident: &Ident) -> &'a str {
        match ident.var {
            Some(id) => self.vars.name(id),
            None => "",
        }
    }

    fn array_suffix(length: Option<usize>) -> String {
        length.map(|len| format!("[{len}]")).unwrap_or_default()
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn write_block(&self, out: &mut String, statements: &[Stmt], depth: usize) -> Result<()> {
        for stmt in statements {
            if is_emitted(stmt, self.usage, false) {
                out.push_str(&self.tab.repeat(depth));
                self.write_stmt(out, stmt, depth)?;
                out.push_str(self.nl);
            }
        }
        Ok(())
    }

    fn write_braced(&self, out: &mut String, statements: &[Stmt], depth: usize) -> Result<()> {
        out.push('{');
        out.push_str(self.nl);
        self.write_block(out, statements, depth + 1)?;
        out.push_str(&self.tab.repeat(depth));
        out.push('}');
        Ok(())
    }

    fn write_interface(&self, keyword: &str, decl: &InterfaceDecl) -> Result<String> {
        let precision = decl
            .precision
            .map(|p| format!("{p} "))
            .unwrap_or_default();
        Ok(format!(
            "{keyword} {precision}{} {}{};",
            self.type_name(&decl.ty),
            self.name(&decl.name)?,
            Self::array_suffix(decl.length)
        ))
    }

    fn write_param(&self, param: &Param) -> Result<String> {
        Ok(format!(
            "{}{} {}{}",
            param.qualifier.prefix(),
            self.type_name(&param.ty),
            self.name(&param.name)?,
            Self::array_suffix(param.length)
        ))
    }

    /// Statements that also appear in `for` headers, without the `;`.
    fn write_simple(&self, stmt: &Stmt) -> Result<String> {
        match stmt {
            Stmt::Var(d) => {
                let mut text = format!(
                    "{} {}{}",
                    self.type_name(&d.ty),
                    self.name(&d.name)?,
                    Self::array_suffix(d.length)
                );
                if let Some(init) = &d.init {
                    text.push('=');
                    text.push_str(&self.expr(init)?);
                }
                Ok(text)
            }
            Stmt::Assign(s) => Ok(format!(
                "{}{}{}",
                self.expr(&s.target)?,
                s.op,
                self.expr(&s.value)?
            )),
            Stmt::Update(s) => Ok(format!("{}{}", self.expr(&s.target)?, s.op)),
            other => Err(InternalError::Unresolved {
                name: "for-loop clause".to_string(),
                span: other.span(),
            }
            .into()),
        }
    }

    fn write_stmt(&self, out: &mut String, stmt: &Stmt, depth: usize) -> Result<()> {
        match stmt {
            Stmt::Version(_) | Stmt::Import(_) | Stmt::Reexport(_) | Stmt::Export(_) => {}
            Stmt::Extension(s) => out.push_str(&format!("#extension {} : {}", s.name, s.behavior)),
            Stmt::Precision(s) => out.push_str(&format!(
                "precision {} {};",
                s.precision,
                self.type_name(&s.ty)
            )),
            Stmt::Attribute(d) => out.push_str(&self.write_interface("attribute", d)?),
            Stmt::Uniform(d) => out.push_str(&self.write_interface("uniform", d)?),
            Stmt::Varying(d) => out.push_str(&self.write_interface("varying", d)?),
            Stmt::Const(d) => {
                out.push_str(&format!(
                    "const {} {}{}",
                    self.type_name(&d.ty),
                    self.name(&d.name)?,
                    Self::array_suffix(d.length)
                ));
                match (&d.injected, &d.init) {
                    (Some(text), _) => out.push_str(&format!("={text}")),
                    (None, Some(init)) => out.push_str(&format!("={}", self.expr(init)?)),
                    (None, None) => {}
                }
                out.push(';');
            }
            Stmt::Var(_) | Stmt::Assign(_) | Stmt::Update(_) => {
                out.push_str(&self.write_simple(stmt)?);
                out.push(';');
            }
            Stmt::Struct(d) => {
                out.push_str(&format!("struct {}{{{}", self.name(&d.name)?, self.nl));
                let indent = self.tab.repeat(depth + 1);
                for member in &d.members {
                    out.push_str(&format!(
                        "{indent}{} {}{};{}",
                        self.type_name(&member.ty),
                        member.name,
                        Self::array_suffix(member.length),
                        self.nl
                    ));
                }
                out.push_str("};");
            }
            Stmt::Function(d) => {
                let ret = d.ret.as_ref().map_or("void", |ty| self.type_name(ty));
                let params = d
                    .params
                    .iter()
                    .map(|param| self.write_param(param))
                    .collect::<Result<Vec<_>>>()?
                    .join(",");
                out.push_str(&format!("{ret} {}({params})", self.name(&d.name)?));
                self.write_braced(out, &d.body, depth)?;
            }
            Stmt::If(s) => {
                for (i, branch) in s.branches.iter().enumerate() {
                    if i > 0 {
                        out.push_str("else");
                    }
                    if let Some(cond) = &branch.cond {
                        if i > 0 {
                            out.push(' ');
                        }
                        out.push_str(&format!("if({})", self.expr(cond)?));
                    }
                    self.write_braced(out, &branch.body, depth)?;
                }
            }
            Stmt::For(s) => {
                out.push_str(&format!(
                    "for({};{};{})",
                    self.write_simple(&s.init)?,
                    self.expr(&s.cond)?,
                    self.write_simple(&s.step)?
                ));
                self.write_braced(out, &s.body, depth)?;
            }
            Stmt::Return(s) => match &s.value {
                Some(value) => out.push_str(&format!("return {};", self.expr(value)?)),
                None => out.push_str("return;"),
            },
            Stmt::Call(call) => {
                out.push_str(&self.call(call)?);
                out.push(';');
            }
            Stmt::SetIndex(s) => {
                let helper = s.helper.ok_or_else(|| InternalError::Unresolved {
                    name: "setIndex".to_string(),
                    span: s.span,
                })?;
                out.push_str(&format!(
                    "{}({},{},{});",
                    self.vars.name(helper),
                    self.expr(&s.container)?,
                    self.expr(&s.index)?,
                    self.expr(&s.value)?
                ));
            }
            Stmt::Helper(helper) => write_helper(out, helper, self.vars, self.nl, self.tab),
        }
        Ok(())
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn expr(&self, expr: &Expr) -> Result<String> {
        Ok(match expr {
            Expr::Int(value, _) => value.to_string(),
            Expr::Float(value, _) => format!("{:?}", value.into_inner()),
            Expr::Bool(value, _) => value.to_string(),
            Expr::Var(ident) => self.name(ident)?.to_string(),
            Expr::Member(member) => match member.package_member {
                Some(id) => self.vars.name(id).to_string(),
                None => format!("{}.{}", self.expr(&member.object)?, member.key),
            },
            Expr::Index(index) => {
                format!("{}[{}]", self.expr(&index.container)?, self.expr(&index.index)?)
            }
            Expr::GetIndex(index) => {
                let helper = index.helper.ok_or_else(|| InternalError::Unresolved {
                    name: "getIndex".to_string(),
                    span: index.span,
                })?;
                format!(
                    "{}({},{})",
                    self.vars.name(helper),
                    self.expr(&index.container)?,
                    self.expr(&index.index)?
                )
            }
            Expr::Call(call) => self.call(call)?,
            Expr::Binary(binary) => format!(
                "{}{}",
                self.expr(&binary.left)?,
                operator_then(binary.op.as_str(), &self.expr(&binary.right)?)
            ),
            Expr::Unary(unary) => operator_then(unary.op.as_str(), &self.expr(&unary.operand)?),
            Expr::Paren(inner, _) => format!("({})", self.expr(inner)?),
        })
    }

    fn call(&self, call: &CallExpr) -> Result<String> {
        let args = call
            .args
            .iter()
            .map(|arg| self.expr(arg))
            .collect::<Result<Vec<_>>>()?
            .join(",");
        Ok(format!("{}({args})", self.expr(&call.callee)?))
    }
}

/// `op` followed by `operand`, spaced when they would fuse into `++`/`--`.
fn operator_then(op: &str, operand: &str) -> String {
    let fuses = matches!(op, "+" | "-") && operand.starts_with(op);
    if fuses {
        format!("{op} {operand}")
    } else {
        format!("{op}{operand}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signs_never_fuse_into_updates() {
        assert_eq!(operator_then("-", "-b"), "- -b");
        assert_eq!(operator_then("+", "+b"), "+ +b");
        assert_eq!(operator_then("-", "+b"), "-+b");
        assert_eq!(operator_then("*", "-b"), "*-b");
    }
}
