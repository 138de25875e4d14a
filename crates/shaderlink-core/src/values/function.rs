//! Function values and overload resolution.

use super::Value;
use crate::{Span, TypeError, VarId};

/// One fixed signature of a function. A `None` return is void.
#[derive(Debug, Clone, PartialEq)]
pub struct Overload {
    pub params: Vec<Value>,
    pub ret: Option<Value>,
}

impl Overload {
    pub fn new(params: Vec<Value>, ret: Option<Value>) -> Self {
        Self { params, ret }
    }
}

/// A built-in or user function with its overload set.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionValue {
    pub name: String,
    /// The declaring variable of user functions.
    pub origin: Option<VarId>,
    pub overloads: Vec<Overload>,
}

impl FunctionValue {
    pub fn builtin(name: impl Into<String>, overloads: Vec<Overload>) -> Self {
        Self {
            name: name.into(),
            origin: None,
            overloads,
        }
    }

    pub fn user(name: impl Into<String>, origin: VarId, overload: Overload) -> Self {
        Self {
            name: name.into(),
            origin: Some(origin),
            overloads: vec![overload],
        }
    }

    /// Pick the first overload whose parameters accept `args`.
    ///
    /// A function with a single signature reports exactly why it did not
    /// match; with several signatures only a generic error is raised.
    pub fn resolve(&self, args: &[Value], span: Span) -> Result<Option<Value>, TypeError> {
        let single = self.overloads.len() == 1;
        'overloads: for overload in &self.overloads {
            if overload.params.len() != args.len() {
                if single {
                    return Err(TypeError::ArgCount {
                        expected: overload.params.len(),
                        got: args.len(),
                        span,
                    });
                }
                continue;
            }
            for (param, arg) in overload.params.iter().zip(args) {
                if let Err(err) = param.check(arg, span) {
                    if single {
                        return Err(err);
                    }
                    continue 'overloads;
                }
            }
            return Ok(overload.ret.clone());
        }
        Err(TypeError::NoMatchingOverload {
            name: self.name.clone(),
            span,
        })
    }
}
