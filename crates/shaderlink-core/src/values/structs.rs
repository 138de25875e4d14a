//! Struct layouts backing struct values.

use rustc_hash::FxHashMap;

use super::Value;
use crate::{Span, TypeError, VarId};

/// One field of a struct layout.
#[derive(Debug, Clone, PartialEq)]
pub struct StructField {
    pub name: String,
    pub value: Value,
    pub span: Span,
}

/// Field table of a user struct, identified by the struct's variable.
#[derive(Debug, Clone, PartialEq)]
pub struct StructLayout {
    pub var: VarId,
    pub name: String,
    pub fields: Vec<StructField>,
}

impl StructLayout {
    /// Build a layout, rejecting duplicate field names.
    pub fn new(var: VarId, name: impl Into<String>, fields: Vec<StructField>) -> Result<Self, TypeError> {
        let mut seen: FxHashMap<&str, Span> = FxHashMap::default();
        for field in &fields {
            if let Some(previous) = seen.insert(field.name.as_str(), field.span) {
                return Err(TypeError::DuplicateField {
                    name: field.name.clone(),
                    span: field.span,
                    previous,
                });
            }
        }
        Ok(Self {
            var,
            name: name.into(),
            fields,
        })
    }

    pub fn field(&self, name: &str) -> Option<&StructField> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Constructor calls take one argument per field, in declaration order.
    pub fn check_construction(&self, args: &[Value], span: Span) -> Result<(), TypeError> {
        if args.len() != self.fields.len() {
            return Err(TypeError::ArgCount {
                expected: self.fields.len(),
                got: args.len(),
                span,
            });
        }
        for (field, arg) in self.fields.iter().zip(args) {
            field.value.check(arg, span)?;
        }
        Ok(())
    }
}
