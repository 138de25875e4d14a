//! Module loading for dependency discovery.
//!
//! The compiler never touches the file system: an embedder hands the bundle
//! a [`ModuleLoader`] that parses modules by absolute path on demand.

use rustc_hash::FxHashMap;
use shaderlink_core::ShaderError;

use crate::module::ShaderModule;

pub trait ModuleLoader {
    /// Produce a fresh, unresolved module; `Ok(None)` if `path` is unknown.
    fn load(&mut self, path: &str) -> Result<Option<ShaderModule>, ShaderError>;
}

/// Serves clones of modules registered up front.
#[derive(Debug, Default, Clone)]
pub struct MemoryLoader {
    modules: FxHashMap<String, ShaderModule>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, module: ShaderModule) {
        self.modules.insert(module.path.clone(), module);
    }

    pub fn with(mut self, module: ShaderModule) -> Self {
        self.insert(module);
        self
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl ModuleLoader for MemoryLoader {
    fn load(&mut self, path: &str) -> Result<Option<ShaderModule>, ShaderError> {
        Ok(self.modules.get(path).cloned())
    }
}

impl<L: ModuleLoader + ?Sized> ModuleLoader for &mut L {
    fn load(&mut self, path: &str) -> Result<Option<ShaderModule>, ShaderError> {
        (**self).load(path)
    }
}
