//! Error types for every compilation phase.
//!
//! ## Error Hierarchy
//!
//! ```text
//! ShaderError (top-level wrapper)
//! ├── NameError        - identifier binding, exports, must-keep names
//! ├── TypeError        - type checking, overloads, constructors
//! ├── ControlFlowError - return analysis and liveness
//! ├── ModuleError      - dependencies, versions, stage linking
//! └── InternalError    - states well-formed input can never reach
//! ```
//!
//! Every error carries the [`Span`] it originates from. Conflicts also carry
//! the span of the earlier declaration as `previous`.

use thiserror::Error;

use crate::Span;

// ============================================================================
// Name Errors
// ============================================================================

/// Errors raised while binding identifiers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NameError {
    /// An identifier has no binding in any enclosing scope.
    #[error("'{name}' undefined at {span}")]
    Undefined { name: String, span: Span },

    /// A function name is already bound in an enclosing scope.
    #[error("\"{name}\" already defined at {span} (previous definition at {previous})")]
    AlreadyDefined {
        name: String,
        span: Span,
        previous: Span,
    },

    /// A constant binding was redeclared in the same scope.
    #[error("'{name}' previously set as const at {span} (defined at {previous})")]
    ConstRedeclaration {
        name: String,
        span: Span,
        previous: Span,
    },

    /// The same external name was exported twice by one module.
    #[error("name '{name}' already exported at {span} (first export at {previous})")]
    DuplicateExport {
        name: String,
        span: Span,
        previous: Span,
    },

    /// An import asked for a name the imported module does not export.
    #[error("'{name}' not exported by '{path}' at {span}")]
    NotExported {
        name: String,
        path: String,
        span: Span,
    },

    /// A must-keep identifier collides with a name already in use.
    #[error("name '{name}' must be unique at {span} (previous usage at {previous})")]
    NotUnique {
        name: String,
        span: Span,
        previous: Span,
    },

    /// A package has no member with this name.
    #[error("'{package}.{name}' undefined at {span}")]
    UnknownPackageMember {
        package: String,
        name: String,
        span: Span,
    },

    /// A package name was used where a value is expected.
    #[error("package '{name}' can't be used as a value at {span}")]
    PackageAsValue { name: String, span: Span },

    /// Package members are read-only.
    #[error("can't set package member at {span}")]
    PackageMemberAssignment { span: Span },

    /// A `return` statement outside any function body.
    #[error("return not inside function at {span}")]
    ReturnOutsideFunction { span: Span },

    /// An entry module without a `main` function.
    #[error("no main function found in '{path}'")]
    MissingMain { path: String, span: Span },
}

impl NameError {
    /// Get the span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            NameError::Undefined { span, .. }
            | NameError::AlreadyDefined { span, .. }
            | NameError::ConstRedeclaration { span, .. }
            | NameError::DuplicateExport { span, .. }
            | NameError::NotExported { span, .. }
            | NameError::NotUnique { span, .. }
            | NameError::UnknownPackageMember { span, .. }
            | NameError::PackageAsValue { span, .. }
            | NameError::PackageMemberAssignment { span }
            | NameError::ReturnOutsideFunction { span }
            | NameError::MissingMain { span, .. } => *span,
        }
    }

    /// Span of the conflicting earlier declaration, if any.
    pub fn previous_span(&self) -> Option<Span> {
        match self {
            NameError::AlreadyDefined { previous, .. }
            | NameError::ConstRedeclaration { previous, .. }
            | NameError::DuplicateExport { previous, .. }
            | NameError::NotUnique { previous, .. } => Some(*previous),
            _ => None,
        }
    }
}

// ============================================================================
// Type Errors
// ============================================================================

/// Errors raised while evaluating types.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TypeError {
    /// A value does not have the expected type.
    #[error("expected {expected}, got {got} at {span}")]
    Mismatch {
        expected: String,
        got: String,
        span: Span,
    },

    /// Wrong number of arguments for a single-signature callable.
    #[error("expected {expected} args, got {got} args at {span}")]
    ArgCount {
        expected: usize,
        got: usize,
        span: Span,
    },

    /// No overload of a multi-signature function accepts the arguments.
    #[error("expected other arg types for '{name}' at {span}")]
    NoMatchingOverload { name: String, span: Span },

    /// A call target that is neither a function nor a constructible type.
    #[error("{ty} is not callable at {span}")]
    NotCallable { ty: String, span: Span },

    /// A type position names something that is not a type.
    #[error("'{name}' is not a type at {span}")]
    NotAType { name: String, span: Span },

    /// The type cannot be built with a constructor call.
    #[error("{ty} can't be constructed at {span}")]
    NotConstructible { ty: String, span: Span },

    /// Member access on a type without that member.
    #[error("{ty}.{key} not found at {span}")]
    UnknownMember {
        ty: String,
        key: String,
        span: Span,
    },

    /// A swizzle that is not valid for the vector.
    #[error("invalid swizzle '{key}' on {ty} at {span}")]
    InvalidSwizzle {
        key: String,
        ty: String,
        span: Span,
    },

    /// Index access on a type that is neither an array nor a vector.
    #[error("{ty} can't be indexed at {span}")]
    NotIndexable { ty: String, span: Span },

    /// A constant index outside the container.
    #[error("index {index} out of range for length {len} at {span}")]
    IndexOutOfRange { index: i64, len: usize, span: Span },

    /// Indexing with an expression whose value is not known at compile time.
    #[error("expected literal int index at {span} (hint: use {hint})")]
    NonConstantIndex { hint: String, span: Span },

    /// Arrays must hold at least two elements.
    #[error("invalid array length {len} at {span}")]
    InvalidArrayLength { len: usize, span: Span },

    /// Two struct fields share a name.
    #[error("duplicate struct entry name '{name}' at {span} (first declared at {previous})")]
    DuplicateField {
        name: String,
        span: Span,
        previous: Span,
    },

    /// A binary operator applied to unsupported operand types.
    #[error("invalid operands for '{op}': {left} and {right} at {span}")]
    InvalidOperands {
        op: String,
        left: String,
        right: String,
        span: Span,
    },

    /// A unary operator applied to an unsupported operand type.
    #[error("invalid operand for '{op}': {ty} at {span}")]
    InvalidOperand { op: String, ty: String, span: Span },

    /// Assignment to a constant variable.
    #[error("can't assign to const '{name}' at {span}")]
    AssignToConst { name: String, span: Span },

    /// The left-hand side of an assignment is not a storage location.
    #[error("lhs not assignable at {span}")]
    NotAssignable { span: Span },

    /// A void call used as a value.
    #[error("function returns void at {span}")]
    VoidValue { span: Span },

    /// A non-void call used as a statement.
    #[error("function doesn't return void at {span}")]
    DiscardedValue { span: Span },

    /// A return value that does not match the function's declared type.
    #[error("function expects {expected} return, got {got} at {span}")]
    ReturnMismatch {
        expected: String,
        got: String,
        span: Span,
    },

    /// A sampler declared anywhere but a uniform or parameter.
    #[error("{ty} only available as uniform at {span}")]
    SamplerNotUniform { ty: String, span: Span },

    /// Varyings and attributes must be scalars or vectors.
    #[error("expected simple type, got {ty} at {span}")]
    ExpectedSimple { ty: String, span: Span },

    /// `main` must take no arguments and return void.
    #[error("main must be declared as 'void main()' at {span}")]
    InvalidMain { span: Span },

    /// A constant injection whose value does not fit the declared type.
    #[error("can't inject {value} into const '{name}' of type {ty} at {span}")]
    ConstInjection {
        name: String,
        value: String,
        ty: String,
        span: Span,
    },
}

impl TypeError {
    /// Get the span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            TypeError::Mismatch { span, .. }
            | TypeError::ArgCount { span, .. }
            | TypeError::NoMatchingOverload { span, .. }
            | TypeError::NotCallable { span, .. }
            | TypeError::NotAType { span, .. }
            | TypeError::NotConstructible { span, .. }
            | TypeError::UnknownMember { span, .. }
            | TypeError::InvalidSwizzle { span, .. }
            | TypeError::NotIndexable { span, .. }
            | TypeError::IndexOutOfRange { span, .. }
            | TypeError::NonConstantIndex { span, .. }
            | TypeError::InvalidArrayLength { span, .. }
            | TypeError::DuplicateField { span, .. }
            | TypeError::InvalidOperands { span, .. }
            | TypeError::InvalidOperand { span, .. }
            | TypeError::AssignToConst { span, .. }
            | TypeError::NotAssignable { span }
            | TypeError::VoidValue { span }
            | TypeError::DiscardedValue { span }
            | TypeError::ReturnMismatch { span, .. }
            | TypeError::SamplerNotUniform { span, .. }
            | TypeError::ExpectedSimple { span, .. }
            | TypeError::InvalidMain { span }
            | TypeError::ConstInjection { span, .. } => *span,
        }
    }
}

// ============================================================================
// Control Flow Errors
// ============================================================================

/// Errors from return analysis and liveness.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ControlFlowError {
    /// A non-void function with an empty body.
    #[error("expected return statement in '{name}' at {span}")]
    ExpectedReturn { name: String, span: Span },

    /// An `if` without a final `else` ends a non-void function.
    #[error("not every branch returns a value at {span}")]
    BranchWithoutReturn { span: Span },

    /// A non-void function path ends without a `return`.
    #[error("missing return statement at {span} (hint: return statement must come last in every branch)")]
    MissingReturn { span: Span },

    /// A statement follows a `return` in the same block.
    #[error("unreachable statement after return statement at {span}")]
    Unreachable { span: Span },

    /// A tracked declaration is never read.
    #[error("'{name}' declared but not used at {span}")]
    UnusedDeclaration { name: String, span: Span },
}

impl ControlFlowError {
    /// Get the span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            ControlFlowError::ExpectedReturn { span, .. }
            | ControlFlowError::BranchWithoutReturn { span }
            | ControlFlowError::MissingReturn { span }
            | ControlFlowError::Unreachable { span }
            | ControlFlowError::UnusedDeclaration { span, .. } => *span,
        }
    }
}

// ============================================================================
// Module Errors
// ============================================================================

/// Errors raised while assembling modules into a program.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModuleError {
    /// The import graph contains a cycle.
    #[error("circular dependency found:{trace}")]
    CircularDependency { trace: String, span: Span },

    /// An imported module could not be loaded.
    #[error("'{path}' not found (from '{from}') at {span}")]
    NotFound {
        path: String,
        from: String,
        span: Span,
    },

    /// Two modules declare different `#version` pragmas.
    #[error("version mismatch: {found} vs {expected} at {span} (version declared at {previous})")]
    VersionMismatch {
        found: String,
        expected: String,
        span: Span,
        previous: Span,
    },

    /// A varying declared by one stage only.
    #[error("varying {name} not found in {stage} shader")]
    VaryingMissing { name: String, stage: &'static str },

    /// A varying declared with different types in the two stages.
    #[error("varying {name} has different type in {stage} shader")]
    VaryingType { name: String, stage: &'static str },

    /// The two stages declare a different number of varyings.
    #[error("varyings differ: vertex declares {vertex}, fragment declares {fragment}")]
    VaryingsDiffer { vertex: usize, fragment: usize },

    /// Constant injection named a const no module exports.
    #[error("exported const '{name}' not found")]
    ConstNotFound { name: String },
}

impl ModuleError {
    /// Get the span where this error occurred, if it has one.
    pub fn span(&self) -> Option<Span> {
        match self {
            ModuleError::CircularDependency { span, .. }
            | ModuleError::NotFound { span, .. }
            | ModuleError::VersionMismatch { span, .. } => Some(*span),
            ModuleError::VaryingMissing { .. }
            | ModuleError::VaryingType { .. }
            | ModuleError::VaryingsDiffer { .. }
            | ModuleError::ConstNotFound { .. } => None,
        }
    }
}

// ============================================================================
// Internal Errors
// ============================================================================

/// States that well-formed input can never reach.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InternalError {
    /// A synthesized helper was never placed into a module.
    #[error("internal error: unused injected statement '{name}' at {span}")]
    UnconsumedHelper { name: String, span: Span },

    /// A variable was read before any pass assigned it a value.
    #[error("internal error: value of '{name}' not set at {span}")]
    ValueNotSet { name: String, span: Span },

    /// An identifier reached a later pass without being resolved.
    #[error("internal error: '{name}' not resolved at {span}")]
    Unresolved { name: String, span: Span },
}

impl InternalError {
    /// Get the span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            InternalError::UnconsumedHelper { span, .. }
            | InternalError::ValueNotSet { span, .. }
            | InternalError::Unresolved { span, .. } => *span,
        }
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// The unified error type for every bundle operation.
///
/// Each variant uses `#[from]` so phase code can return its own error type
/// through `?`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShaderError {
    /// A name resolution error.
    #[error(transparent)]
    Name(#[from] NameError),

    /// A type error.
    #[error(transparent)]
    Type(#[from] TypeError),

    /// A control flow or liveness error.
    #[error(transparent)]
    ControlFlow(#[from] ControlFlowError),

    /// A module graph or linking error.
    #[error(transparent)]
    Module(#[from] ModuleError),

    /// An internal consistency failure.
    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl ShaderError {
    /// Where the error originates, if it is tied to a source position.
    pub fn span(&self) -> Option<Span> {
        match self {
            ShaderError::Name(e) => Some(e.span()),
            ShaderError::Type(e) => Some(e.span()),
            ShaderError::ControlFlow(e) => Some(e.span()),
            ShaderError::Module(e) => e.span(),
            ShaderError::Internal(e) => Some(e.span()),
        }
    }

    /// Secondary position of a conflicting earlier declaration.
    pub fn previous_span(&self) -> Option<Span> {
        match self {
            ShaderError::Name(e) => e.previous_span(),
            ShaderError::Type(TypeError::DuplicateField { previous, .. }) => Some(*previous),
            ShaderError::Module(ModuleError::VersionMismatch { previous, .. }) => Some(*previous),
            _ => None,
        }
    }

    /// Check if this is a name resolution error.
    pub fn is_name(&self) -> bool {
        matches!(self, ShaderError::Name(_))
    }

    /// Check if this is a type error.
    pub fn is_type(&self) -> bool {
        matches!(self, ShaderError::Type(_))
    }

    /// Check if this is a control flow error.
    pub fn is_control_flow(&self) -> bool {
        matches!(self, ShaderError::ControlFlow(_))
    }

    /// Check if this is a module error.
    pub fn is_module(&self) -> bool {
        matches!(self, ShaderError::Module(_))
    }

    /// Check if this is an internal error.
    pub fn is_internal(&self) -> bool {
        matches!(self, ShaderError::Internal(_))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_error_display() {
        let err = NameError::Undefined {
            name: "foo".to_string(),
            span: Span::new(2, 7, 3),
        };
        assert_eq!(err.to_string(), "'foo' undefined at 2:7");
    }

    #[test]
    fn conflicts_expose_previous_span() {
        let err: ShaderError = NameError::NotUnique {
            name: "main".to_string(),
            span: Span::new(9, 1, 4),
            previous: Span::new(1, 1, 4),
        }
        .into();
        assert!(err.is_name());
        assert_eq!(err.span(), Some(Span::new(9, 1, 4)));
        assert_eq!(err.previous_span(), Some(Span::new(1, 1, 4)));
    }

    #[test]
    fn overload_errors_keep_generic_wording() {
        let err = TypeError::NoMatchingOverload {
            name: "max".to_string(),
            span: Span::new(1, 1, 3),
        };
        assert!(err.to_string().starts_with("expected other arg types"));
    }

    #[test]
    fn varying_errors_have_no_span() {
        let err: ShaderError = ModuleError::VaryingsDiffer {
            vertex: 2,
            fragment: 1,
        }
        .into();
        assert!(err.is_module());
        assert_eq!(err.span(), None);
    }
}
