//! Final identifier assignment.
//!
//! The namespace tree mirrors lexical scoping but outlives name resolution.
//! Uses `petgraph::DiGraph` with:
//! - Nodes: [`NamespaceData`] (the names claimed at that level)
//! - Edges: parent to child, one child per function body or block
//!
//! Preserved names are claimed verbatim and must be unique along the chain.
//! Every other variable takes the first generated candidate that is free in
//! its function namespace and every ancestor, and is renamed in place. The
//! claim is recorded on the function namespace, so sibling blocks never
//! reuse a name.

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::{FxHashMap, FxHashSet};
use shaderlink_core::{NameError, VarId};

use crate::config::Naming;
use crate::variable::VarArena;

/// GLSL ES keywords and reserved words never produced by the generator.
const RESERVED_WORDS: &[&str] = &[
    "attribute", "const", "uniform", "varying", "break", "continue", "do", "for", "while", "if",
    "else", "in", "out", "inout", "float", "int", "void", "bool", "true", "false", "lowp",
    "mediump", "highp", "precision", "invariant", "discard", "return", "mat2", "mat3", "mat4",
    "vec2", "vec3", "vec4", "ivec2", "ivec3", "ivec4", "bvec2", "bvec3", "bvec4", "sampler2D",
    "samplerCube", "struct", "asm", "class", "union", "enum", "typedef", "template", "this",
    "packed", "goto", "switch", "default", "inline", "noinline", "volatile", "public", "static",
    "extern", "external", "interface", "flat", "long", "short", "double", "half", "fixed",
    "unsigned", "superp", "input", "output", "hvec2", "hvec3", "hvec4", "dvec2", "dvec3",
    "dvec4", "fvec2", "fvec3", "fvec4", "sampler1D", "sampler3D", "sampler1DShadow",
    "sampler2DShadow", "sampler2DRect", "sampler3DRect", "sampler2DRectShadow", "sizeof",
    "cast", "namespace", "using", "main",
];

// ============================================================================
// Name generation
// ============================================================================

/// Endless, deterministic sequence of candidate names for one variable.
#[derive(Debug, Clone)]
pub struct NameGenerator {
    naming: Naming,
    base: String,
    next: usize,
}

impl NameGenerator {
    pub fn new(naming: Naming, base: impl Into<String>) -> Self {
        Self {
            naming,
            base: base.into(),
            next: 0,
        }
    }
}

impl Iterator for NameGenerator {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let n = self.next;
        self.next += 1;
        Some(match self.naming {
            Naming::Readable if n == 0 => self.base.clone(),
            Naming::Readable => format!("{}_{}", self.base, n),
            Naming::Minify => short_name(n),
        })
    }
}

/// `a`..`z`, `A`..`Z`, `aa`, `ab`, ...
fn short_name(mut n: usize) -> String {
    const ALPHABET: &[u8; 52] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
    let mut out = Vec::new();
    loop {
        out.push(ALPHABET[n % 52] as char);
        if n < 52 {
            break;
        }
        n = n / 52 - 1;
    }
    out.iter().rev().collect()
}

// ============================================================================
// Namespace tree
// ============================================================================

/// Names claimed at one level of the tree.
#[derive(Debug, Default)]
pub struct NamespaceData {
    is_function: bool,
    var_names: FxHashMap<VarId, String>,
    name_vars: FxHashMap<String, VarId>,
}

pub struct Namespace {
    graph: DiGraph<NamespaceData, ()>,
    root: NodeIndex,
    naming: Naming,
    reserved: FxHashSet<String>,
}

impl Namespace {
    /// An empty tree. `builtins` are never handed out as generated names.
    pub fn new(naming: Naming, builtins: impl IntoIterator<Item = String>) -> Self {
        let mut graph = DiGraph::new();
        let root = graph.add_node(NamespaceData::default());
        let mut reserved: FxHashSet<String> =
            RESERVED_WORDS.iter().map(|word| word.to_string()).collect();
        reserved.extend(builtins);
        Self {
            graph,
            root,
            naming,
            reserved,
        }
    }

    pub fn root(&self) -> NodeIndex {
        self.root
    }

    pub fn new_block(&mut self, parent: NodeIndex) -> NodeIndex {
        self.add_child(parent, false)
    }

    pub fn new_function(&mut self, parent: NodeIndex) -> NodeIndex {
        self.add_child(parent, true)
    }

    fn add_child(&mut self, parent: NodeIndex, is_function: bool) -> NodeIndex {
        let node = self.graph.add_node(NamespaceData {
            is_function,
            ..NamespaceData::default()
        });
        self.graph.add_edge(parent, node, ());
        node
    }

    fn parent(&self, node: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .neighbors_directed(node, Direction::Incoming)
            .next()
    }

    fn ancestors(&self, node: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        std::iter::successors(Some(node), move |&n| self.parent(n))
    }

    /// Nearest enclosing function namespace, or the root.
    pub fn function_scope(&self, node: NodeIndex) -> NodeIndex {
        self.ancestors(node)
            .find(|&n| self.graph[n].is_function)
            .unwrap_or(self.root)
    }

    pub fn has_name(&self, node: NodeIndex, name: &str) -> bool {
        self.owner_of(node, name).is_some()
    }

    pub fn has_var(&self, node: NodeIndex, var: VarId) -> bool {
        self.ancestors(node)
            .any(|n| self.graph[n].var_names.contains_key(&var))
    }

    fn owner_of(&self, node: NodeIndex, name: &str) -> Option<VarId> {
        self.ancestors(node)
            .find_map(|n| self.graph[n].name_vars.get(name).copied())
    }

    fn claim(&mut self, node: NodeIndex, var: VarId, name: String) {
        let data = &mut self.graph[node];
        data.name_vars.insert(name.clone(), var);
        data.var_names.insert(var, name);
    }

    /// Claim the variable's current name unchanged.
    pub fn preserve(&mut self, node: NodeIndex, var: VarId, vars: &VarArena) -> Result<(), NameError> {
        if self.has_var(node, var) {
            return Ok(());
        }
        let record = vars.get(var);
        if let Some(other) = self.owner_of(node, &record.name) {
            return Err(NameError::NotUnique {
                name: record.name.clone(),
                span: record.span,
                previous: vars.get(other).span,
            });
        }
        self.claim(node, var, record.name.clone());
        Ok(())
    }

    /// Give the variable the first free generated name and rename it.
    pub fn assign(&mut self, node: NodeIndex, var: VarId, vars: &mut VarArena) {
        if self.has_var(node, var) {
            return;
        }
        let scope = self.function_scope(node);
        let candidate = NameGenerator::new(self.naming, vars.name(var)).find(|name| {
            !self.reserved.contains(name)
                && !name.starts_with("gl_")
                && !self.has_name(scope, name)
                && !self.has_name(node, name)
        });
        if let Some(name) = candidate {
            self.claim(scope, var, name.clone());
            vars.rename(var, name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variable::{DeclKind, Variable};
    use shaderlink_core::Span;

    fn alloc(vars: &mut VarArena, name: &str, line: u32) -> VarId {
        vars.alloc(Variable::new(name, DeclKind::Local, Span::new(line, 1, 1)))
    }

    #[test]
    fn short_names_are_bijective_base_52() {
        let names: Vec<String> = NameGenerator::new(Naming::Minify, "ignored")
            .take(55)
            .collect();
        assert_eq!(names[0], "a");
        assert_eq!(names[25], "z");
        assert_eq!(names[26], "A");
        assert_eq!(names[51], "Z");
        assert_eq!(names[52], "aa");
        assert_eq!(names[54], "ac");
    }

    #[test]
    fn readable_names_suffix_on_collision() {
        let names: Vec<String> = NameGenerator::new(Naming::Readable, "color")
            .take(3)
            .collect();
        assert_eq!(names, ["color", "color_1", "color_2"]);
    }

    #[test]
    fn minified_names_skip_reserved_words() {
        let mut vars = VarArena::new();
        let mut ns = Namespace::new(Naming::Minify, Vec::new());
        let root = ns.root();
        let ids: Vec<VarId> = (0..60).map(|i| alloc(&mut vars, "v", i)).collect();
        for &id in &ids {
            ns.assign(root, id, &mut vars);
        }
        assert!(ids.iter().all(|&id| vars.name(id) != "do" && vars.name(id) != "in"));
        assert_eq!(vars.name(ids[0]), "a");
    }

    #[test]
    fn sibling_blocks_never_share_names() {
        let mut vars = VarArena::new();
        let mut ns = Namespace::new(Naming::Readable, Vec::new());
        let function = ns.new_function(ns.root());
        let first = ns.new_block(function);
        let second = ns.new_block(function);
        let a = alloc(&mut vars, "x", 1);
        let b = alloc(&mut vars, "x", 2);
        ns.assign(first, a, &mut vars);
        ns.assign(second, b, &mut vars);
        assert_eq!(vars.name(a), "x");
        assert_eq!(vars.name(b), "x_1");
    }

    #[test]
    fn generated_names_avoid_ancestors() {
        let mut vars = VarArena::new();
        let mut ns = Namespace::new(Naming::Readable, Vec::new());
        let root = ns.root();
        let global = alloc(&mut vars, "t", 1);
        ns.preserve(root, global, &vars).unwrap();

        let function = ns.new_function(root);
        let local = alloc(&mut vars, "t", 2);
        ns.assign(function, local, &mut vars);
        assert_eq!(vars.name(local), "t_1");
    }

    #[test]
    fn preserved_names_must_be_unique() {
        let mut vars = VarArena::new();
        let mut ns = Namespace::new(Naming::Readable, Vec::new());
        let root = ns.root();
        let a = alloc(&mut vars, "main", 1);
        let b = alloc(&mut vars, "main", 7);
        ns.preserve(root, a, &vars).unwrap();
        ns.preserve(root, a, &vars).unwrap();

        let err = ns.preserve(root, b, &vars).unwrap_err();
        assert_eq!(
            err,
            NameError::NotUnique {
                name: "main".to_string(),
                span: Span::new(7, 1, 1),
                previous: Span::new(1, 1, 1),
            }
        );
    }

    #[test]
    fn assignment_is_idempotent() {
        let mut vars = VarArena::new();
        let mut ns = Namespace::new(Naming::Minify, Vec::new());
        let root = ns.root();
        let a = alloc(&mut vars, "light", 1);
        ns.assign(root, a, &mut vars);
        ns.assign(root, a, &mut vars);
        assert_eq!(vars.name(a), "a");
    }
}
