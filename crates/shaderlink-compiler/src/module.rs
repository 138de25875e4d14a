//! One shader source file: its statements and export table.

use std::collections::BTreeMap;

use shaderlink_ast::{ConstDecl, Stmt};
use shaderlink_core::{ShaderError, SourceId, Span, VarId};

use crate::passes::Writer;
use crate::usage::Usage;
use crate::variable::VarArena;

/// An exported variable and the statement that exported it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Export {
    pub var: VarId,
    pub span: Span,
}

/// Exported names, ordered for deterministic package binding.
pub type ExportTable = BTreeMap<String, Export>;

#[derive(Debug, Clone)]
pub struct ShaderModule {
    /// Absolute path identifying the module.
    pub path: String,
    pub source: SourceId,
    pub statements: Vec<Stmt>,
    pub exports: ExportTable,
    /// Entry modules must define `main`.
    pub entry: bool,
    pub main: Option<VarId>,
}

impl ShaderModule {
    pub fn new(path: impl Into<String>, statements: Vec<Stmt>) -> Self {
        Self {
            path: path.into(),
            source: SourceId::default(),
            statements,
            exports: ExportTable::new(),
            entry: false,
            main: None,
        }
    }

    pub fn with_source(mut self, source: SourceId) -> Self {
        self.source = source;
        self
    }

    /// Import paths in statement order, each listed once.
    pub fn dependencies(&self) -> Vec<(String, Span)> {
        let mut deps: Vec<(String, Span)> = Vec::new();
        for stmt in &self.statements {
            let (path, span) = match stmt {
                Stmt::Import(s) => (&s.path, s.span),
                Stmt::Reexport(s) => (&s.path, s.span),
                _ => continue,
            };
            if !deps.iter().any(|(p, _)| p == path) {
                deps.push((path.clone(), span));
            }
        }
        deps
    }

    /// Splice pending helpers into the statement list.
    ///
    /// Helpers over struct elements follow their struct. When `first` is set
    /// the remaining helpers go after the leading pragmas and precision
    /// statements.
    pub fn finalize_injected(&mut self, usage: &mut Usage, first: bool) {
        let old = std::mem::take(&mut self.statements);
        let mut statements = Vec::with_capacity(old.len() + usage.pending_injected());
        let mut placed = !first;
        for stmt in old {
            if !placed && !stmt.is_prologue() {
                statements.extend(usage.pop_injected(None));
                placed = true;
            }
            let released = match &stmt {
                Stmt::Struct(decl) => decl.name.var,
                _ => None,
            };
            statements.push(stmt);
            if let Some(var) = released {
                statements.extend(usage.pop_injected(Some(var)));
            }
        }
        if !placed {
            statements.extend(usage.pop_injected(None));
        }
        self.statements = statements;
    }

    /// The `#version` argument and where it was declared.
    pub fn collect_version(&self) -> Option<(String, Span)> {
        self.statements.iter().find_map(|stmt| match stmt {
            Stmt::Version(s) => Some((s.text(), s.span)),
            _ => None,
        })
    }

    /// Varying name to type name.
    pub fn collect_varyings(&self, vars: &VarArena) -> BTreeMap<String, String> {
        self.statements
            .iter()
            .filter_map(|stmt| match stmt {
                Stmt::Varying(decl) => decl.name.var,
                _ => None,
            })
            .map(|id| {
                let record = vars.get(id);
                let ty = record
                    .value
                    .as_ref()
                    .map(|value| value.type_name())
                    .unwrap_or_default();
                (record.name.clone(), ty)
            })
            .collect()
    }

    pub fn find_exported_const(&mut self, name: &str) -> Option<&mut ConstDecl> {
        self.statements.iter_mut().find_map(|stmt| match stmt {
            Stmt::Const(decl) if decl.exported && decl.name.name == name => Some(decl),
            _ => None,
        })
    }

    pub fn write(
        &self,
        vars: &VarArena,
        usage: &Usage,
        nl: &str,
        tab: &str,
    ) -> Result<Vec<String>, ShaderError> {
        Writer::new(vars, usage, nl, tab).write_module(&self.statements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shaderlink_ast::builder::*;

    #[test]
    fn dependencies_are_listed_once_in_order() {
        let module = ShaderModule::new(
            "/a.glsl",
            vec![
                import("f", "f", "/b.glsl"),
                import_all("c", "/c.glsl"),
                import("g", "g", "/b.glsl"),
                reexport("h", "h", "/d.glsl"),
            ],
        );
        let paths: Vec<String> = module.dependencies().into_iter().map(|(p, _)| p).collect();
        assert_eq!(paths, ["/b.glsl", "/c.glsl", "/d.glsl"]);
    }

    #[test]
    fn version_is_collected() {
        let module = ShaderModule::new("/a.glsl", vec![version(300, Some("es")), function(None, "main", vec![], vec![])]);
        assert_eq!(module.collect_version().map(|(v, _)| v), Some("300 es".to_string()));
        assert_eq!(ShaderModule::new("/b.glsl", vec![]).collect_version(), None);
    }

    #[test]
    fn exported_consts_are_found_by_source_name() {
        let mut module = ShaderModule::new(
            "/a.glsl",
            vec![
                constant("float", "SCALE", float(1.0)),
                export_const("float", "GAIN", float(2.0)),
            ],
        );
        assert!(module.find_exported_const("SCALE").is_none());
        assert!(module.find_exported_const("GAIN").is_some());
    }
}
