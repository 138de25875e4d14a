//! Variable records and the arena that owns them.
//!
//! Scopes, the namespace, usage tracking and the AST all refer to variables
//! by [`VarId`]. Only a record's name and value change after allocation.

use std::collections::BTreeMap;

use shaderlink_core::{InternalError, Span, Value, VarId};

/// What declared a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
    /// Entry of the built-in symbol table.
    Builtin,
    Function,
    Param,
    /// Variable declared inside a function body.
    Local,
    /// Non-const variable declared at module level.
    Global,
    Const { exported: bool },
    Uniform,
    Attribute,
    Varying,
    Struct,
    /// `import * as name` binding.
    Package,
    /// Synthesized dynamic-index accessor.
    Helper,
}

impl DeclKind {
    /// Declarations whose emitted name must match the source name.
    pub fn keeps_name(self) -> bool {
        matches!(
            self,
            DeclKind::Builtin
                | DeclKind::Const { exported: true }
                | DeclKind::Uniform
                | DeclKind::Attribute
                | DeclKind::Varying
                | DeclKind::Helper
        )
    }
}

/// A named storage location, function, type or package.
#[derive(Debug, Clone)]
pub struct Variable {
    pub name: String,
    pub constant: bool,
    pub value: Option<Value>,
    pub decl: DeclKind,
    /// Members of a package, keyed by exported name.
    pub package: Option<BTreeMap<String, VarId>>,
    pub span: Span,
}

impl Variable {
    pub fn new(name: impl Into<String>, decl: DeclKind, span: Span) -> Self {
        Self {
            name: name.into(),
            constant: false,
            value: None,
            decl,
            package: None,
            span,
        }
    }

    pub fn constant(mut self) -> Self {
        self.constant = true;
        self
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    pub fn is_package(&self) -> bool {
        self.package.is_some()
    }
}

/// Owner of every variable record of one bundle build.
#[derive(Debug, Default)]
pub struct VarArena {
    vars: Vec<Variable>,
}

impl VarArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, var: Variable) -> VarId {
        let id = VarId::new(self.vars.len() as u32);
        self.vars.push(var);
        id
    }

    pub fn get(&self, id: VarId) -> &Variable {
        &self.vars[id.index()]
    }

    pub fn get_mut(&mut self, id: VarId) -> &mut Variable {
        &mut self.vars[id.index()]
    }

    pub fn name(&self, id: VarId) -> &str {
        &self.vars[id.index()].name
    }

    pub fn rename(&mut self, id: VarId, name: String) {
        self.vars[id.index()].name = name;
    }

    /// The variable's current value, which an earlier pass must have set.
    pub fn value(&self, id: VarId, span: Span) -> Result<&Value, InternalError> {
        let var = self.get(id);
        var.value.as_ref().ok_or_else(|| InternalError::ValueNotSet {
            name: var.name.clone(),
            span,
        })
    }

    pub fn set_value(&mut self, id: VarId, value: Value) {
        self.vars[id.index()].value = Some(value);
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (VarId, &Variable)> {
        self.vars
            .iter()
            .enumerate()
            .map(|(i, var)| (VarId::new(i as u32), var))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_stay_stable_across_renames() {
        let mut vars = VarArena::new();
        let a = vars.alloc(Variable::new("light", DeclKind::Local, Span::default()));
        let b = vars.alloc(Variable::new("color", DeclKind::Local, Span::default()));
        vars.rename(a, "x".to_string());
        assert_eq!(vars.name(a), "x");
        assert_eq!(vars.name(b), "color");
        assert_eq!(vars.len(), 2);
    }

    #[test]
    fn reading_unset_value_is_internal_error() {
        let mut vars = VarArena::new();
        let id = vars.alloc(Variable::new("n", DeclKind::Local, Span::default()));
        assert!(vars.value(id, Span::default()).is_err());
        vars.set_value(id, Value::INT);
        assert_eq!(vars.value(id, Span::default()).unwrap(), &Value::INT);
    }
}
