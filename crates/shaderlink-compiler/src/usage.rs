//! Liveness tracking and the queue of synthesized helper statements.
//!
//! Activity analysis walks blocks backwards: reads mark variables used
//! ([`Usage::mark_used`]), and variable declarations are tracked afterwards
//! ([`Usage::track`]) without clearing an earlier mark. A tracked variable
//! nothing marked is reported by [`Usage::detect_unused`].

use rustc_hash::FxHashMap;
use shaderlink_ast::Stmt;
use shaderlink_core::{ControlFlowError, InternalError, ShaderError, Span, VarId};

use crate::variable::VarArena;

/// A helper waiting to be spliced into a module.
#[derive(Debug, Clone)]
pub struct InjectedStatement {
    pub name: String,
    pub var: VarId,
    /// Declarations that must be emitted before the helper.
    pub deps: Vec<VarId>,
    pub stmt: Stmt,
}

#[derive(Debug, Clone, Copy)]
struct UsageEntry {
    used: bool,
    span: Span,
}

#[derive(Debug, Default)]
pub struct Usage {
    vars: FxHashMap<VarId, UsageEntry>,
    injected: Vec<InjectedStatement>,
}

impl Usage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a read of `var`.
    pub fn mark_used(&mut self, var: VarId, span: Span) {
        self.vars.insert(var, UsageEntry { used: true, span });
    }

    /// Track a declaration; keeps an existing entry untouched.
    pub fn track(&mut self, var: VarId, span: Span) {
        self.vars
            .entry(var)
            .or_insert(UsageEntry { used: false, span });
    }

    pub fn is_used(&self, var: VarId) -> bool {
        self.vars.get(&var).is_some_and(|entry| entry.used)
    }

    /// An already injected helper with this name and dependency.
    pub fn find_injected(&self, name: &str, dep: Option<VarId>) -> Option<VarId> {
        self.injected
            .iter()
            .find(|st| st.name == name && st.deps.as_slice() == dep.as_slice())
            .map(|st| st.var)
    }

    pub fn inject(&mut self, statement: InjectedStatement) {
        self.injected.push(statement);
    }

    /// Release `dep` and take every helper with no remaining dependencies.
    ///
    /// With `None` only helpers that never had dependencies are taken.
    pub fn pop_injected(&mut self, dep: Option<VarId>) -> Vec<Stmt> {
        if let Some(dep) = dep {
            for st in &mut self.injected {
                st.deps.retain(|&d| d != dep);
            }
        }
        let (ready, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.injected)
            .into_iter()
            .partition(|st| st.deps.is_empty());
        self.injected = waiting;
        ready.into_iter().map(|st| st.stmt).collect()
    }

    pub fn pending_injected(&self) -> usize {
        self.injected.len()
    }

    /// Fail on tracked declarations never read, then on unplaced helpers.
    pub fn detect_unused(&self, vars: &VarArena) -> Result<(), ShaderError> {
        let unused = self
            .vars
            .iter()
            .filter(|(_, entry)| !entry.used)
            .min_by_key(|(id, _)| **id);
        if let Some((&id, entry)) = unused {
            return Err(ControlFlowError::UnusedDeclaration {
                name: vars.name(id).to_string(),
                span: entry.span,
            }
            .into());
        }
        if let Some(st) = self.injected.first() {
            return Err(InternalError::UnconsumedHelper {
                name: st.name.clone(),
                span: st.stmt.span(),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variable::{DeclKind, Variable};
    use shaderlink_ast::builder::ret_void;

    fn helper(name: &str, var: u32, deps: Vec<VarId>) -> InjectedStatement {
        InjectedStatement {
            name: name.to_string(),
            var: VarId::new(var),
            deps,
            stmt: ret_void(),
        }
    }

    #[test]
    fn tracking_keeps_earlier_use() {
        let mut usage = Usage::new();
        let v = VarId::new(0);
        usage.mark_used(v, Span::default());
        usage.track(v, Span::default());
        assert!(usage.is_used(v));

        let w = VarId::new(1);
        usage.track(w, Span::default());
        assert!(!usage.is_used(w));
        usage.mark_used(w, Span::default());
        assert!(usage.is_used(w));
    }

    #[test]
    fn unused_tracked_declaration_is_reported() {
        let mut vars = VarArena::new();
        let id = vars.alloc(Variable::new("tmp", DeclKind::Local, Span::new(3, 5, 3)));
        let mut usage = Usage::new();
        usage.track(id, Span::new(3, 5, 3));

        let err = usage.detect_unused(&vars).unwrap_err();
        assert_eq!(
            err,
            ShaderError::ControlFlow(ControlFlowError::UnusedDeclaration {
                name: "tmp".to_string(),
                span: Span::new(3, 5, 3),
            })
        );
    }

    #[test]
    fn lookup_distinguishes_dependencies() {
        let mut usage = Usage::new();
        let light = VarId::new(7);
        usage.inject(helper("getIndex_float_4", 1, vec![]));
        usage.inject(helper("getIndex_Light_4", 2, vec![light]));

        assert_eq!(usage.find_injected("getIndex_float_4", None), Some(VarId::new(1)));
        assert_eq!(usage.find_injected("getIndex_float_4", Some(light)), None);
        assert_eq!(
            usage.find_injected("getIndex_Light_4", Some(light)),
            Some(VarId::new(2))
        );
    }

    #[test]
    fn popping_releases_dependencies() {
        let mut usage = Usage::new();
        let light = VarId::new(7);
        usage.inject(helper("a", 1, vec![]));
        usage.inject(helper("b", 2, vec![light]));

        assert_eq!(usage.pop_injected(None).len(), 1);
        assert_eq!(usage.pending_injected(), 1);
        assert_eq!(usage.pop_injected(Some(VarId::new(99))).len(), 0);
        assert_eq!(usage.pop_injected(Some(light)).len(), 1);
        assert_eq!(usage.pending_injected(), 0);
        assert!(usage.detect_unused(&VarArena::new()).is_ok());
    }

    #[test]
    fn leftover_helper_is_internal_error() {
        let mut usage = Usage::new();
        usage.inject(helper("getIndex_Light_4", 1, vec![VarId::new(3)]));
        let err = usage.detect_unused(&VarArena::new()).unwrap_err();
        assert!(err.is_internal());
    }
}
