//! Shaderlink Compiler
//!
//! Compiles a graph of shader modules into one source text per stage and
//! links a vertex/fragment pair.
//!
//! ## Architecture
//!
//! A [`ShaderBundle`] runs its modules through the passes in [`passes`]:
//! name resolution, type checking, activity (liveness) analysis with
//! dynamic-index helper injection, unique naming and emission. Variables
//! live in a [`VarArena`] and are referred to by handle everywhere else.
//!
//! ## Modules
//!
//! - [`builtins`]: stage-dependent built-in types, functions and variables
//! - [`bundle`]: pass orchestration and constant injection
//! - [`config`]: compile configuration (stage, naming)
//! - [`link`]: vertex/fragment linking
//! - [`loader`]: on-demand module loading
//! - [`module`]: one shader file and its exports
//! - [`namespace`]: final identifier assignment
//! - [`return_checker`]: must-return verification
//! - [`scope`]: lexical scopes for name resolution
//! - [`usage`]: liveness map and injected statements
//! - [`variable`]: variable records and the arena

pub mod builtins;
pub mod bundle;
pub mod config;
pub mod link;
pub mod loader;
pub mod module;
pub mod namespace;
pub mod passes;
pub mod return_checker;
pub mod scope;
pub mod usage;
pub mod variable;

pub use bundle::{ConstValue, ShaderBundle};
pub use config::{CompileConfig, Naming, Stage};
pub use link::{LinkOptions, LinkedProgram, link_program};
pub use loader::{MemoryLoader, ModuleLoader};
pub use module::{Export, ExportTable, ShaderModule};
pub use namespace::{NameGenerator, Namespace};
pub use return_checker::ReturnChecker;
pub use scope::ScopeStack;
pub use usage::{InjectedStatement, Usage};
pub use variable::{DeclKind, VarArena, Variable};

pub use shaderlink_core::ShaderError;
