//! Shaderlink: a module-aware shader compiler and linker.
//!
//! Modules arrive as ready-made ASTs (see [`ast`] and its
//! [`builder`](ast::builder) constructors), are compiled per stage by a
//! [`ShaderBundle`], and a vertex/fragment pair is linked by
//! [`link_program`] into two self-contained sources with matching varyings.
//!
//! ```
//! use shaderlink::ast::Precision;
//! use shaderlink::ast::builder::*;
//! use shaderlink::{LinkOptions, MemoryLoader, ShaderModule, link_program};
//!
//! let vertex = ShaderModule::new(
//!     "/vertex.glsl",
//!     vec![
//!         attribute("vec3", "position"),
//!         varying("vec3", "vColor"),
//!         function(None, "main", vec![], vec![
//!             assign(var("vColor"), var("position")),
//!             assign(var("gl_Position"), call("vec4", vec![var("position"), float(1.0)])),
//!         ]),
//!     ],
//! );
//! let fragment = ShaderModule::new(
//!     "/fragment.glsl",
//!     vec![
//!         precision(Precision::Medium, "float"),
//!         varying("vec3", "vColor"),
//!         function(None, "main", vec![], vec![
//!             assign(var("gl_FragColor"), call("vec4", vec![var("vColor"), float(1.0)])),
//!         ]),
//!     ],
//! );
//!
//! let mut loader = MemoryLoader::new().with(vertex).with(fragment);
//! let program = link_program(
//!     &mut loader,
//!     "/vertex.glsl",
//!     "/fragment.glsl",
//!     &LinkOptions::default(),
//! )
//! .unwrap();
//! assert!(program.fragment.contains("varying vec3 vColor;"));
//! ```

pub use shaderlink_ast as ast;
pub use shaderlink_compiler as compiler;
pub use shaderlink_core as core;

pub use shaderlink_compiler::{
    CompileConfig, ConstValue, LinkOptions, LinkedProgram, MemoryLoader, ModuleLoader, Naming,
    ShaderBundle, ShaderModule, Stage, link_program,
};
pub use shaderlink_core::{
    ControlFlowError, InternalError, ModuleError, NameError, ShaderError, Span, TypeError,
};

pub mod prelude {
    pub use crate::ast::builder::*;
    pub use crate::ast::{AssignOp, BinaryOp, Precision, Stmt, UnaryOp};
    pub use crate::{
        CompileConfig, ConstValue, LinkOptions, MemoryLoader, ModuleLoader, Naming, ShaderBundle,
        ShaderError, ShaderModule, Stage, link_program,
    };
}
