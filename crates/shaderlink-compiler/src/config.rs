//! Compile configuration threaded through a bundle build.

/// Shader stage a bundle is compiled for. Selects the built-in symbol table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Stage {
    #[default]
    Vertex,
    Fragment,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Vertex => "vertex",
            Stage::Fragment => "fragment",
        }
    }
}

/// How non-preserved identifiers are renamed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Naming {
    /// Keep source names, suffixing `_1`, `_2`, ... on collision.
    #[default]
    Readable,
    /// Shortest free names: `a`..`z`, `A`..`Z`, `aa`, ...
    Minify,
}

/// Settings for one bundle build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompileConfig {
    pub stage: Stage,
    pub naming: Naming,
}

impl CompileConfig {
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            naming: Naming::default(),
        }
    }

    pub fn with_naming(mut self, naming: Naming) -> Self {
        self.naming = naming;
        self
    }
}
