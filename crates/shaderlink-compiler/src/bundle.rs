//! Bundle orchestration: one stage's modules through every pass.
//!
//! A [`ShaderBundle`] owns the variable arena, the usage map and the
//! namespace for one build, so independent bundles can be compiled on
//! separate threads. [`ShaderBundle::finalize`] runs, in order:
//!
//! 1. dependency discovery and topological placement
//! 2. name resolution
//! 3. type checking
//! 4. activity analysis
//! 5. helper placement and liveness errors
//! 6. unique naming
//! 7. version collection
//!
//! after which [`ShaderBundle::write`] emits the stage source.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use rustc_hash::{FxHashMap, FxHashSet};
use shaderlink_core::{
    ModuleError, NameError, ScalarKind, ShaderError, Span, TypeError, Value, VarId,
};
use tracing::debug;

use crate::builtins::register_builtins;
use crate::config::CompileConfig;
use crate::loader::ModuleLoader;
use crate::module::{ExportTable, ShaderModule};
use crate::namespace::Namespace;
use crate::passes::eval::check_main;
use crate::passes::{ActivityPass, NameResolutionPass, NamingPass, TypeCheckPass};
use crate::usage::Usage;
use crate::variable::VarArena;

type Result<T> = std::result::Result<T, ShaderError>;

/// A scalar substituted for an exported const after compilation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConstValue {
    Float(f64),
    Int(i64),
    Bool(bool),
}

impl ConstValue {
    fn kind(self) -> ScalarKind {
        match self {
            ConstValue::Float(_) => ScalarKind::Float,
            ConstValue::Int(_) => ScalarKind::Int,
            ConstValue::Bool(_) => ScalarKind::Bool,
        }
    }
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::Float(value) => write!(f, "{value:?}"),
            ConstValue::Int(value) => write!(f, "{value}"),
            ConstValue::Bool(value) => write!(f, "{value}"),
        }
    }
}

#[derive(Debug)]
pub struct ShaderBundle {
    config: CompileConfig,
    modules: Vec<ShaderModule>,
    vars: VarArena,
    globals: FxHashMap<String, VarId>,
    usage: Usage,
    version: Option<String>,
    finalized: bool,
}

impl ShaderBundle {
    pub fn new(config: CompileConfig) -> Self {
        let mut vars = VarArena::new();
        let globals = register_builtins(config.stage, &mut vars);
        Self {
            config,
            modules: Vec::new(),
            vars,
            globals,
            usage: Usage::new(),
            version: None,
            finalized: false,
        }
    }

    pub fn config(&self) -> &CompileConfig {
        &self.config
    }

    /// Add an entry module; it must define `main`.
    pub fn append(&mut self, mut module: ShaderModule) {
        module.entry = true;
        self.modules.push(module);
    }

    /// Modules in bundle order.
    pub fn modules(&self) -> &[ShaderModule] {
        &self.modules
    }

    pub fn vars(&self) -> &VarArena {
        &self.vars
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Run every pass; the bundle is ready to [`write`](Self::write) after.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn finalize(&mut self, loader: &mut dyn ModuleLoader) -> Result<()> {
        self.resolve_dependencies(loader)?;
        self.resolve_names()?;
        self.eval_types()?;
        self.resolve_activity()?;
        self.finalize_injected()?;
        self.unique_names()?;
        self.collect_version()?;
        self.finalized = true;
        Ok(())
    }

    // ========================================================================
    // Dependencies
    // ========================================================================

    /// Discover imported modules and order every module after its imports.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn resolve_dependencies(&mut self, loader: &mut dyn ModuleLoader) -> Result<()> {
        let mut entries = std::mem::take(&mut self.modules);
        entries.sort_by(|a, b| a.path.cmp(&b.path));

        let mut known: FxHashSet<String> = entries.iter().map(|m| m.path.clone()).collect();
        let mut discovered: BTreeMap<String, ShaderModule> = BTreeMap::new();
        let mut queue: VecDeque<(String, Vec<(String, Span)>)> = entries
            .iter()
            .map(|m| (m.path.clone(), m.dependencies()))
            .collect();

        while let Some((from, deps)) = queue.pop_front() {
            for (path, span) in deps {
                if !known.insert(path.clone()) {
                    continue;
                }
                let module = loader.load(&path)?.ok_or_else(|| ModuleError::NotFound {
                    path: path.clone(),
                    from: from.clone(),
                    span,
                })?;
                debug!(path = %path, from = %from, "discovered dependency");
                queue.push_back((path.clone(), module.dependencies()));
                discovered.insert(path, module);
            }
        }

        let mut pending: Vec<ShaderModule> = entries;
        pending.extend(discovered.into_values());
        let mut placed: Vec<ShaderModule> = Vec::with_capacity(pending.len());
        let mut placed_paths: FxHashSet<String> = FxHashSet::default();

        while !pending.is_empty() {
            let before = pending.len();
            let mut waiting = Vec::with_capacity(pending.len());
            for module in pending {
                let ready = module
                    .dependencies()
                    .iter()
                    .all(|(path, _)| placed_paths.contains(path));
                if ready {
                    placed_paths.insert(module.path.clone());
                    placed.push(module);
                } else {
                    waiting.push(module);
                }
            }
            if waiting.len() == before {
                return Err(Self::circular_dependency(&waiting, &placed_paths).into());
            }
            pending = waiting;
        }

        debug!(
            modules = placed.len(),
            order = ?placed.iter().map(|m| m.path.as_str()).collect::<Vec<_>>(),
            "resolved dependencies"
        );
        self.modules = placed;
        Ok(())
    }

    /// Follow unplaced imports from the first waiting module until a module
    /// on the path repeats; the trace starts at the repeated module.
    fn circular_dependency(waiting: &[ShaderModule], placed: &FxHashSet<String>) -> ModuleError {
        let by_path: FxHashMap<&str, &ShaderModule> =
            waiting.iter().map(|m| (m.path.as_str(), m)).collect();
        let mut path: Vec<&str> = Vec::new();
        let mut span = Span::default();
        let mut current = waiting.first().map(|m| m.path.as_str());

        while let Some(node) = current {
            if let Some(start) = path.iter().position(|&p| p == node) {
                path.drain(..start);
                path.push(node);
                break;
            }
            path.push(node);
            current = by_path.get(node).and_then(|module| {
                module
                    .dependencies()
                    .into_iter()
                    .find(|(dep, _)| !placed.contains(dep))
                    .and_then(|(dep, dep_span)| {
                        span = dep_span;
                        by_path.get(dep.as_str()).map(|m| m.path.as_str())
                    })
            });
        }

        let trace = path
            .iter()
            .map(|p| format!("\n -> {p}"))
            .collect::<String>();
        ModuleError::CircularDependency { trace, span }
    }

    // ========================================================================
    // Passes
    // ========================================================================

    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn resolve_names(&mut self) -> Result<()> {
        let mut registry: FxHashMap<String, ExportTable> = FxHashMap::default();
        for module in &mut self.modules {
            let output = NameResolutionPass::new(
                &mut self.vars,
                self.globals.clone(),
                &registry,
                self.config.stage,
                &module.path,
            )
            .run(&mut module.statements)?;
            debug!(
                path = %module.path,
                declarations = output.declarations,
                exports = output.exports.len(),
                "resolved names"
            );

            if module.entry && output.main.is_none() {
                return Err(NameError::MissingMain {
                    path: module.path.clone(),
                    span: Span::default().in_source(module.source),
                }
                .into());
            }
            module.main = output.main;
            module.exports = output.exports;
            registry.insert(module.path.clone(), module.exports.clone());
        }
        Ok(())
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn eval_types(&mut self) -> Result<()> {
        for module in &self.modules {
            TypeCheckPass::new(&mut self.vars).run(&module.statements)?;
            if let (true, Some(main)) = (module.entry, module.main) {
                check_main(&self.vars, main)?;
            }
            debug!(path = %module.path, "checked types");
        }
        Ok(())
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn resolve_activity(&mut self) -> Result<()> {
        self.usage = Usage::new();
        for module in &self.modules {
            if let (true, Some(main)) = (module.entry, module.main) {
                self.usage.mark_used(main, self.vars.get(main).span);
            }
        }
        for module in self.modules.iter_mut().rev() {
            ActivityPass::new(&mut self.vars, &mut self.usage, self.config.stage)
                .run(&mut module.statements)?;
        }
        debug!(helpers = self.usage.pending_injected(), "resolved activity");
        Ok(())
    }

    /// Place injected helpers, then report unused declarations.
    pub fn finalize_injected(&mut self) -> Result<()> {
        for (i, module) in self.modules.iter_mut().enumerate() {
            module.finalize_injected(&mut self.usage, i == 0);
        }
        self.usage.detect_unused(&self.vars)
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn unique_names(&mut self) -> Result<()> {
        let mut namespace = Namespace::new(self.config.naming, self.globals.keys().cloned());
        for module in &self.modules {
            NamingPass::new(&mut self.vars, &mut namespace, &self.usage)
                .preserve(&module.statements, module.main)?;
        }
        for module in &self.modules {
            NamingPass::new(&mut self.vars, &mut namespace, &self.usage)
                .assign(&module.statements)?;
        }
        Ok(())
    }

    /// Every module's `#version` must agree.
    pub fn collect_version(&mut self) -> Result<()> {
        let mut found: Option<(String, Span)> = None;
        for module in &self.modules {
            let Some((version, span)) = module.collect_version() else {
                continue;
            };
            match &found {
                Some((expected, previous)) if *expected != version => {
                    return Err(ModuleError::VersionMismatch {
                        found: version,
                        expected: expected.clone(),
                        span,
                        previous: *previous,
                    }
                    .into());
                }
                Some(_) => {}
                None => found = Some((version, span)),
            }
        }
        self.version = found.map(|(version, _)| version);
        Ok(())
    }

    // ========================================================================
    // Output
    // ========================================================================

    /// Replace the emitted initializer of an exported const.
    ///
    /// The bundle must be finalized so the const's type is known.
    pub fn inject_const(&mut self, name: &str, value: ConstValue) -> Result<()> {
        for module in &mut self.modules {
            let Some(decl) = module.find_exported_const(name) else {
                continue;
            };
            let id = crate::passes::resolve::bound(&decl.name)?;
            let declared = self.vars.value(id, decl.span)?;
            if declared.scalar_kind() != Some(value.kind()) || decl.length.is_some() {
                return Err(TypeError::ConstInjection {
                    name: name.to_string(),
                    value: value.to_string(),
                    ty: declared.type_name(),
                    span: decl.span,
                }
                .into());
            }
            if let ConstValue::Int(payload) = value {
                self.vars.set_value(id, Value::LiteralInt(payload));
            }
            decl.injected = Some(value.to_string());
            debug!(name, value = %value, "injected constant");
            return Ok(());
        }
        Err(ModuleError::ConstNotFound {
            name: name.to_string(),
        }
        .into())
    }

    /// Varying name to type name across all modules.
    pub fn varyings(&self) -> BTreeMap<String, String> {
        self.modules
            .iter()
            .flat_map(|module| module.collect_varyings(&self.vars))
            .collect()
    }

    /// Emit the stage source. Top-level statements are separated by line
    /// breaks so pragmas stay on their own lines.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn write(&self, nl: &str, tab: &str) -> Result<String> {
        let mut chunks = Vec::new();
        for module in &self.modules {
            chunks.extend(module.write(&self.vars, &self.usage, nl, tab)?);
        }
        let mut out = String::new();
        if let Some(version) = &self.version {
            out.push_str(&format!("#version {version}\n"));
        }
        out.push_str(&chunks.join("\n"));
        Ok(out)
    }

    /// Render an error prefixed with the path of the module it points into.
    pub fn describe(&self, error: &ShaderError) -> String {
        let module = error
            .span()
            .and_then(|span| self.modules.iter().find(|m| m.source == span.source));
        match module {
            Some(module) => format!("{}: {error}", module.path),
            None => error.to_string(),
        }
    }
}
