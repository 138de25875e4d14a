//! Lexical scopes for name resolution.
//!
//! [`ScopeStack`] is a stack of frames: the bundle-wide global frame seeded
//! with built-ins, one module frame, then function and block frames pushed
//! while walking a module. Lookup walks the frames outward.

use rustc_hash::FxHashMap;
use shaderlink_core::{NameError, Span, VarId};

use crate::variable::VarArena;

// ============================================================================
// Types
// ============================================================================

/// What opened a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Global,
    Module,
    /// A function body; remembers the function for `return` validation.
    Function(VarId),
    Block,
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    bindings: FxHashMap<String, VarId>,
}

impl Frame {
    fn new(kind: FrameKind) -> Self {
        Self {
            kind,
            bindings: FxHashMap::default(),
        }
    }
}

// ============================================================================
// ScopeStack
// ============================================================================

#[derive(Debug)]
pub struct ScopeStack {
    frames: Vec<Frame>,
}

impl ScopeStack {
    /// A stack holding `globals` and an empty module frame.
    pub fn new(globals: FxHashMap<String, VarId>) -> Self {
        Self {
            frames: vec![
                Frame {
                    kind: FrameKind::Global,
                    bindings: globals,
                },
                Frame::new(FrameKind::Module),
            ],
        }
    }

    pub fn push_block(&mut self) {
        self.frames.push(Frame::new(FrameKind::Block));
    }

    pub fn push_function(&mut self, function: VarId) {
        self.frames.push(Frame::new(FrameKind::Function(function)));
    }

    /// Leave the innermost function or block frame.
    pub fn pop(&mut self) {
        if self.frames.len() > 2 {
            self.frames.pop();
        }
    }

    /// Number of frames above the module frame.
    pub fn depth(&self) -> usize {
        self.frames.len() - 2
    }

    pub fn lookup(&self, name: &str) -> Option<VarId> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.bindings.get(name).copied())
    }

    /// Look `name` up in the innermost frame only.
    pub fn lookup_local(&self, name: &str) -> Option<VarId> {
        self.frames
            .last()
            .and_then(|frame| frame.bindings.get(name).copied())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Bind `name` in the innermost frame.
    ///
    /// Rebinding a name in the same frame is allowed unless the existing
    /// binding is constant.
    pub fn declare(
        &mut self,
        name: &str,
        var: VarId,
        vars: &VarArena,
        span: Span,
    ) -> Result<(), NameError> {
        let Some(frame) = self.frames.last_mut() else {
            return Ok(());
        };
        if let Some(&existing) = frame.bindings.get(name) {
            let previous = vars.get(existing);
            if previous.constant {
                return Err(NameError::ConstRedeclaration {
                    name: name.to_string(),
                    span,
                    previous: previous.span,
                });
            }
        }
        frame.bindings.insert(name.to_string(), var);
        Ok(())
    }

    /// The function whose body is being resolved, if any.
    pub fn enclosing_function(&self) -> Option<VarId> {
        self.frames.iter().rev().find_map(|frame| match frame.kind {
            FrameKind::Function(function) => Some(function),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variable::{DeclKind, Variable};

    fn alloc(vars: &mut VarArena, name: &str, constant: bool) -> VarId {
        let var = Variable::new(name, DeclKind::Local, Span::new(1, 1, 1));
        vars.alloc(if constant { var.constant() } else { var })
    }

    #[test]
    fn lookup_walks_outward() {
        let mut vars = VarArena::new();
        let global = alloc(&mut vars, "sin", true);
        let mut globals = FxHashMap::default();
        globals.insert("sin".to_string(), global);

        let mut scopes = ScopeStack::new(globals);
        let x = alloc(&mut vars, "x", false);
        scopes.push_block();
        scopes.declare("x", x, &vars, Span::default()).unwrap();

        assert_eq!(scopes.lookup("x"), Some(x));
        assert_eq!(scopes.lookup("sin"), Some(global));
        scopes.pop();
        assert_eq!(scopes.lookup("x"), None);
    }

    #[test]
    fn inner_frames_shadow_outer_bindings() {
        let mut vars = VarArena::new();
        let mut scopes = ScopeStack::new(FxHashMap::default());
        let outer = alloc(&mut vars, "x", true);
        let inner = alloc(&mut vars, "x", false);
        scopes.declare("x", outer, &vars, Span::default()).unwrap();
        scopes.push_block();
        scopes.declare("x", inner, &vars, Span::default()).unwrap();
        assert_eq!(scopes.lookup("x"), Some(inner));
    }

    #[test]
    fn constant_rebinding_in_same_frame_fails() {
        let mut vars = VarArena::new();
        let mut scopes = ScopeStack::new(FxHashMap::default());
        let first = alloc(&mut vars, "N", true);
        let second = alloc(&mut vars, "N", false);
        scopes.declare("N", first, &vars, Span::default()).unwrap();

        let err = scopes
            .declare("N", second, &vars, Span::new(5, 1, 1))
            .unwrap_err();
        assert_eq!(
            err,
            NameError::ConstRedeclaration {
                name: "N".to_string(),
                span: Span::new(5, 1, 1),
                previous: Span::new(1, 1, 1),
            }
        );
    }

    #[test]
    fn non_constant_rebinding_overwrites() {
        let mut vars = VarArena::new();
        let mut scopes = ScopeStack::new(FxHashMap::default());
        let first = alloc(&mut vars, "x", false);
        let second = alloc(&mut vars, "x", false);
        scopes.declare("x", first, &vars, Span::default()).unwrap();
        scopes.declare("x", second, &vars, Span::default()).unwrap();
        assert_eq!(scopes.lookup("x"), Some(second));
    }

    #[test]
    fn function_frames_are_found_through_blocks() {
        let mut vars = VarArena::new();
        let f = alloc(&mut vars, "f", true);
        let mut scopes = ScopeStack::new(FxHashMap::default());
        assert_eq!(scopes.enclosing_function(), None);
        scopes.push_function(f);
        scopes.push_block();
        assert_eq!(scopes.enclosing_function(), Some(f));
        assert_eq!(scopes.depth(), 2);
    }
}
