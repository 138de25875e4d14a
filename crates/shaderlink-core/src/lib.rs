//! Core types shared across the shaderlink crates.
//!
//! - [`Span`] and the handle types [`SourceId`] and [`VarId`]
//! - The error taxonomy rooted at [`ShaderError`]
//! - Operator enums in [`ops`]
//! - The structural [`Value`] model used for type checking

pub mod error;
pub mod ids;
pub mod ops;
pub mod span;
pub mod values;

pub use error::{ControlFlowError, InternalError, ModuleError, NameError, ShaderError, TypeError};
pub use ids::{SourceId, VarId};
pub use ops::{AssignOp, BinaryOp, UnaryOp, UpdateOp};
pub use span::Span;
pub use values::{
    FunctionValue, Overload, SamplerKind, ScalarKind, StructField, StructLayout, Value,
};
