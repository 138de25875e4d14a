//! Structural values used both as type descriptors and typed placeholders.
//!
//! A declaration such as `vec3` is bound to `Value::Type(Vec(Float, 3))`;
//! instantiating it yields the placeholder `Vec(Float, 3)` that flows through
//! expression evaluation. Comparison always goes through [`Value::check`],
//! which looks through [`Value::Context`] wrappers first.

mod construct;
mod function;
mod ops;
mod structs;

use std::fmt;
use std::sync::Arc;

use crate::{Span, TypeError};

pub use function::{FunctionValue, Overload};
pub use ops::{binary, unary, update};
pub use structs::{StructField, StructLayout};

/// Component kind of scalars and vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Float,
    Int,
    Bool,
}

impl ScalarKind {
    /// GLSL spelling of the scalar type.
    pub fn name(self) -> &'static str {
        match self {
            ScalarKind::Float => "float",
            ScalarKind::Int => "int",
            ScalarKind::Bool => "bool",
        }
    }

    /// Prefix of the matching vector type (`vec`, `ivec`, `bvec`).
    pub fn vec_prefix(self) -> &'static str {
        match self {
            ScalarKind::Float => "",
            ScalarKind::Int => "i",
            ScalarKind::Bool => "b",
        }
    }
}

/// Opaque texture handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SamplerKind {
    Sampler2D,
    SamplerCube,
}

impl SamplerKind {
    /// GLSL spelling of the sampler type.
    pub fn name(self) -> &'static str {
        match self {
            SamplerKind::Sampler2D => "sampler2D",
            SamplerKind::SamplerCube => "samplerCube",
        }
    }
}

/// A value or type in the structural type system.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A `float`, `int` or `bool`.
    Scalar(ScalarKind),
    /// An `int` whose value is known at compile time.
    LiteralInt(i64),
    /// A vector with 2 to 4 components.
    Vec(ScalarKind, u8),
    /// A fixed-length array; the length is always at least 2.
    Array(Box<Value>, usize),
    /// An instance of a user struct.
    Struct(Arc<StructLayout>),
    /// A function with one or more fixed signatures.
    Function(Arc<FunctionValue>),
    /// A texture sampler.
    Sampler(SamplerKind),
    /// A type descriptor; instantiating it yields the wrapped placeholder.
    Type(Box<Value>),
    /// A value re-attributed to the expression it was read at.
    Context(Box<Value>, Span),
}

impl Value {
    pub const FLOAT: Value = Value::Scalar(ScalarKind::Float);
    pub const INT: Value = Value::Scalar(ScalarKind::Int);
    pub const BOOL: Value = Value::Scalar(ScalarKind::Bool);

    /// A vector placeholder.
    pub fn vec(kind: ScalarKind, arity: u8) -> Value {
        Value::Vec(kind, arity)
    }

    /// An array placeholder, rejecting lengths below two.
    pub fn array(element: Value, len: usize, span: Span) -> Result<Value, TypeError> {
        if len < 2 {
            return Err(TypeError::InvalidArrayLength { len, span });
        }
        Ok(Value::Array(
            Box::new(element.unwrap_context().clone()),
            len,
        ))
    }

    /// The type descriptor whose instances look like `instance`.
    pub fn type_of(instance: Value) -> Value {
        Value::Type(Box::new(instance))
    }

    /// Attribute this value to `span`, replacing any earlier attribution.
    pub fn with_context(self, span: Span) -> Value {
        match self {
            Value::Context(inner, _) => Value::Context(inner, span),
            other => Value::Context(Box::new(other), span),
        }
    }

    /// Look through every context wrapper.
    pub fn unwrap_context(&self) -> &Value {
        let mut value = self;
        while let Value::Context(inner, _) = value {
            value = inner;
        }
        value
    }

    /// Where the value was last read, if it carries a context.
    pub fn context_span(&self) -> Option<Span> {
        match self {
            Value::Context(_, span) => Some(*span),
            _ => None,
        }
    }

    /// GLSL spelling of the value's type.
    pub fn type_name(&self) -> String {
        match self {
            Value::Scalar(kind) => kind.name().to_string(),
            Value::LiteralInt(_) => "int".to_string(),
            Value::Vec(kind, n) => format!("{}vec{}", kind.vec_prefix(), n),
            Value::Array(element, len) => format!("{}[{}]", element.type_name(), len),
            Value::Struct(layout) => layout.name.clone(),
            Value::Function(function) => format!("function {}", function.name),
            Value::Sampler(kind) => kind.name().to_string(),
            Value::Type(inner) => format!("type {}", inner.type_name()),
            Value::Context(inner, _) => inner.type_name(),
        }
    }

    /// Component kind and count of scalars and vectors.
    pub fn shape(&self) -> Option<(ScalarKind, u8)> {
        match self.unwrap_context() {
            Value::Scalar(kind) => Some((*kind, 1)),
            Value::LiteralInt(_) => Some((ScalarKind::Int, 1)),
            Value::Vec(kind, n) => Some((*kind, *n)),
            _ => None,
        }
    }

    /// Kind of a scalar value.
    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        match self.shape() {
            Some((kind, 1)) => Some(kind),
            _ => None,
        }
    }

    pub fn is_int(&self) -> bool {
        self.scalar_kind() == Some(ScalarKind::Int)
    }

    pub fn is_float(&self) -> bool {
        self.scalar_kind() == Some(ScalarKind::Float)
    }

    pub fn is_bool(&self) -> bool {
        self.scalar_kind() == Some(ScalarKind::Bool)
    }

    /// Scalars and vectors, the only types allowed across stage interfaces.
    pub fn is_simple(&self) -> bool {
        self.shape().is_some()
    }

    pub fn is_sampler(&self) -> bool {
        matches!(self.unwrap_context(), Value::Sampler(_))
    }

    /// The compile-time payload of an int, if known.
    pub fn literal_int(&self) -> Option<i64> {
        match self.unwrap_context() {
            Value::LiteralInt(value) => Some(*value),
            _ => None,
        }
    }

    /// Element count of arrays and vectors.
    pub fn length(&self) -> Option<usize> {
        match self.unwrap_context() {
            Value::Array(_, len) => Some(*len),
            Value::Vec(_, n) => Some(*n as usize),
            _ => None,
        }
    }

    /// Structural compatibility: `other` may be used where `self` is expected.
    pub fn check(&self, other: &Value, span: Span) -> Result<(), TypeError> {
        let expected = self.unwrap_context();
        let got = other.unwrap_context();
        let compatible = match (expected, got) {
            (Value::Scalar(a), Value::Scalar(b)) => a == b,
            (Value::Scalar(ScalarKind::Int) | Value::LiteralInt(_), Value::LiteralInt(_))
            | (Value::LiteralInt(_), Value::Scalar(ScalarKind::Int)) => true,
            (Value::Vec(a, n), Value::Vec(b, m)) => a == b && n == m,
            (Value::Array(a, n), Value::Array(b, m)) => n == m && a.check(b, span).is_ok(),
            (Value::Struct(a), Value::Struct(b)) => a.var == b.var,
            (Value::Function(a), Value::Function(b)) => {
                Arc::ptr_eq(a, b) || (a.origin.is_some() && a.origin == b.origin)
            }
            (Value::Sampler(a), Value::Sampler(b)) => a == b,
            (Value::Type(a), Value::Type(b)) => a.check(b, span).is_ok(),
            _ => false,
        };
        if compatible {
            Ok(())
        } else {
            Err(TypeError::Mismatch {
                expected: expected.type_name(),
                got: got.type_name(),
                span: other.context_span().unwrap_or(span),
            })
        }
    }

    /// Turn a type descriptor into a placeholder of that type.
    pub fn instantiate(&self, name: &str, span: Span) -> Result<Value, TypeError> {
        match self.unwrap_context() {
            Value::Type(instance) => Ok((**instance).clone()),
            _ => Err(TypeError::NotAType {
                name: name.to_string(),
                span,
            }),
        }
    }

    /// Call a function or construct a type. `None` is a void result.
    pub fn call(&self, args: &[Value], span: Span) -> Result<Option<Value>, TypeError> {
        match self.unwrap_context() {
            Value::Function(function) => function.resolve(args, span),
            Value::Type(instance) => construct::construct(instance, args, span).map(Some),
            other => Err(TypeError::NotCallable {
                ty: other.type_name(),
                span,
            }),
        }
    }

    /// Swizzle a vector or read a struct field.
    pub fn member(&self, key: &str, span: Span) -> Result<Value, TypeError> {
        match self.unwrap_context() {
            Value::Vec(kind, n) => {
                let len = swizzle_len(key, *n).ok_or_else(|| TypeError::InvalidSwizzle {
                    key: key.to_string(),
                    ty: self.type_name(),
                    span,
                })?;
                if len == 1 {
                    Ok(Value::Scalar(*kind))
                } else {
                    Ok(Value::Vec(*kind, len))
                }
            }
            Value::Struct(layout) => layout
                .field(key)
                .map(|field| field.value.clone())
                .ok_or_else(|| TypeError::UnknownMember {
                    ty: layout.name.clone(),
                    key: key.to_string(),
                    span,
                }),
            other => Err(TypeError::UnknownMember {
                ty: other.type_name(),
                key: key.to_string(),
                span,
            }),
        }
    }

    /// Check an assignment to a member; vector swizzles may not repeat components.
    pub fn set_member(&self, key: &str, value: &Value, span: Span) -> Result<(), TypeError> {
        let target = self.member(key, span)?;
        if matches!(self.unwrap_context(), Value::Vec(..)) {
            let mut seen = [false; 4];
            for c in key.chars() {
                let slot = component_index(c).unwrap_or(0);
                if seen[slot] {
                    return Err(TypeError::InvalidSwizzle {
                        key: key.to_string(),
                        ty: self.type_name(),
                        span,
                    });
                }
                seen[slot] = true;
            }
        }
        target.check(value, span)
    }

    /// Read an element at a compile-time index.
    pub fn index(&self, index: i64, span: Span) -> Result<Value, TypeError> {
        let (element, len) = match self.unwrap_context() {
            Value::Array(element, len) => ((**element).clone(), *len),
            Value::Vec(kind, n) => (Value::Scalar(*kind), *n as usize),
            other => {
                return Err(TypeError::NotIndexable {
                    ty: other.type_name(),
                    span,
                });
            }
        };
        if index < 0 || index as usize >= len {
            return Err(TypeError::IndexOutOfRange { index, len, span });
        }
        Ok(element)
    }

    /// Check an assignment to an element at a compile-time index.
    pub fn set_index(&self, index: i64, value: &Value, span: Span) -> Result<(), TypeError> {
        self.index(index, span)?.check(value, span)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.type_name())
    }
}

fn component_index(c: char) -> Option<usize> {
    match c {
        'x' => Some(0),
        'y' => Some(1),
        'z' => Some(2),
        'w' => Some(3),
        _ => None,
    }
}

/// Length of a valid swizzle for a vector of `arity` components.
fn swizzle_len(key: &str, arity: u8) -> Option<u8> {
    if key.is_empty() || key.len() > 4 {
        return None;
    }
    for c in key.chars() {
        if component_index(c)? >= arity as usize {
            return None;
        }
    }
    Some(key.len() as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span() -> Span {
        Span::default()
    }

    #[test]
    fn literal_int_checks_as_int() {
        assert!(Value::INT.check(&Value::LiteralInt(3), span()).is_ok());
        assert!(Value::LiteralInt(1).check(&Value::INT, span()).is_ok());
        assert!(Value::FLOAT.check(&Value::LiteralInt(3), span()).is_err());
    }

    #[test]
    fn check_looks_through_context() {
        let wrapped = Value::vec(ScalarKind::Float, 3).with_context(Span::new(4, 2, 1));
        assert!(Value::vec(ScalarKind::Float, 3).check(&wrapped, span()).is_ok());

        let err = Value::FLOAT.check(&wrapped, span()).unwrap_err();
        assert_eq!(
            err,
            TypeError::Mismatch {
                expected: "float".to_string(),
                got: "vec3".to_string(),
                span: Span::new(4, 2, 1),
            }
        );
    }

    #[test]
    fn arrays_need_two_elements() {
        assert!(Value::array(Value::FLOAT, 1, span()).is_err());
        let arr = Value::array(Value::FLOAT, 4, span()).unwrap();
        assert_eq!(arr.type_name(), "float[4]");
        assert_eq!(arr.length(), Some(4));
    }

    #[test]
    fn swizzles_are_bounded_by_arity() {
        let v2 = Value::vec(ScalarKind::Float, 2);
        assert_eq!(v2.member("x", span()).unwrap(), Value::FLOAT);
        assert_eq!(
            v2.member("yx", span()).unwrap(),
            Value::vec(ScalarKind::Float, 2)
        );
        assert!(v2.member("z", span()).is_err());

        let v4 = Value::vec(ScalarKind::Int, 4);
        assert_eq!(
            v4.member("wzy", span()).unwrap(),
            Value::vec(ScalarKind::Int, 3)
        );
        assert!(v4.member("xyzwx", span()).is_err());
        assert!(v4.member("q", span()).is_err());
    }

    #[test]
    fn swizzle_assignment_rejects_repeats() {
        let v3 = Value::vec(ScalarKind::Float, 3);
        let v2 = Value::vec(ScalarKind::Float, 2);
        assert!(v3.set_member("xy", &v2, span()).is_ok());
        assert!(v3.set_member("xx", &v2, span()).is_err());
    }

    #[test]
    fn constant_indexing_is_range_checked() {
        let arr = Value::array(Value::FLOAT, 3, span()).unwrap();
        assert_eq!(arr.index(2, span()).unwrap(), Value::FLOAT);
        assert!(matches!(
            arr.index(3, span()),
            Err(TypeError::IndexOutOfRange { index: 3, len: 3, .. })
        ));
        assert!(arr.index(-1, span()).is_err());

        let v = Value::vec(ScalarKind::Bool, 2);
        assert_eq!(v.index(1, span()).unwrap(), Value::BOOL);
        assert!(Value::FLOAT.index(0, span()).is_err());
    }

    #[test]
    fn instantiate_requires_type() {
        let ty = Value::type_of(Value::FLOAT);
        assert_eq!(ty.instantiate("float", span()).unwrap(), Value::FLOAT);
        assert!(Value::FLOAT.instantiate("x", span()).is_err());
        assert_eq!(ty.type_name(), "type float");
    }
}
