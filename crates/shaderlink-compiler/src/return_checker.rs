//! Return path verification for non-void functions.
//!
//! Only the last statement of a body is inspected: it must be a `return`,
//! or an `if` chain with an `else` whose every branch ends the same way.
//! Loops never count as returning.

use shaderlink_ast::{FunctionDecl, Stmt};
use shaderlink_core::ControlFlowError;

pub struct ReturnChecker;

impl ReturnChecker {
    pub fn new() -> Self {
        Self
    }

    /// Check that every path through `function` ends in a `return`.
    pub fn check(&self, function: &FunctionDecl) -> Result<(), ControlFlowError> {
        match function.body.last() {
            Some(last) => self.ends_with_return(last),
            None => Err(ControlFlowError::ExpectedReturn {
                name: function.name.name.clone(),
                span: function.span,
            }),
        }
    }

    fn ends_with_return(&self, stmt: &Stmt) -> Result<(), ControlFlowError> {
        match stmt {
            Stmt::Return(_) => Ok(()),
            Stmt::If(chain) if !chain.has_else() => {
                Err(ControlFlowError::BranchWithoutReturn { span: chain.span })
            }
            Stmt::If(chain) => {
                for branch in &chain.branches {
                    match branch.body.last() {
                        Some(last) => self.ends_with_return(last)?,
                        None => {
                            return Err(ControlFlowError::MissingReturn { span: branch.span });
                        }
                    }
                }
                Ok(())
            }
            other => Err(ControlFlowError::MissingReturn { span: other.span() }),
        }
    }
}

impl Default for ReturnChecker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shaderlink_ast::BinaryOp;
    use shaderlink_ast::builder::*;

    fn float_fn(body: Vec<Stmt>) -> FunctionDecl {
        match function(Some("float"), "f", vec![], body) {
            Stmt::Function(decl) => decl,
            _ => unreachable!(),
        }
    }

    #[test]
    fn trailing_return_passes() {
        let f = float_fn(vec![local("float", "x", Some(float(1.0))), ret(var("x"))]);
        assert!(ReturnChecker::new().check(&f).is_ok());
    }

    #[test]
    fn empty_body_expects_return() {
        let err = ReturnChecker::new().check(&float_fn(vec![])).unwrap_err();
        assert!(matches!(err, ControlFlowError::ExpectedReturn { name, .. } if name == "f"));
    }

    #[test]
    fn if_without_else_is_rejected() {
        let f = float_fn(vec![if_then(boolean(true), vec![ret(float(1.0))])]);
        assert!(matches!(
            ReturnChecker::new().check(&f),
            Err(ControlFlowError::BranchWithoutReturn { .. })
        ));
    }

    #[test]
    fn every_branch_must_return() {
        let ok = float_fn(vec![if_else(
            boolean(true),
            vec![ret(float(1.0))],
            vec![ret(float(2.0))],
        )]);
        assert!(ReturnChecker::new().check(&ok).is_ok());

        let missing = float_fn(vec![if_else(
            boolean(true),
            vec![ret(float(1.0))],
            vec![local("float", "y", None)],
        )]);
        assert!(matches!(
            ReturnChecker::new().check(&missing),
            Err(ControlFlowError::MissingReturn { .. })
        ));

        let empty = float_fn(vec![if_else(boolean(true), vec![ret(float(1.0))], vec![])]);
        assert!(matches!(
            ReturnChecker::new().check(&empty),
            Err(ControlFlowError::MissingReturn { .. })
        ));
    }

    #[test]
    fn loops_do_not_count() {
        let f = float_fn(vec![for_loop(
            local("int", "i", Some(int(0))),
            binary(BinaryOp::Less, var("i"), int(4)),
            increment(var("i")),
            vec![ret(float(1.0))],
        )]);
        assert!(matches!(
            ReturnChecker::new().check(&f),
            Err(ControlFlowError::MissingReturn { .. })
        ));
    }
}
