//! Constructor calls on type descriptors.

use super::{ScalarKind, Value};
use crate::{Span, TypeError};

/// Type-check `T(args...)` where `proto` is the placeholder of `T`.
pub(super) fn construct(proto: &Value, args: &[Value], span: Span) -> Result<Value, TypeError> {
    match proto {
        Value::Scalar(kind) => {
            if args.len() != 1 {
                return Err(TypeError::ArgCount {
                    expected: 1,
                    got: args.len(),
                    span,
                });
            }
            expect_shape(&args[0], span)?;
            Ok(Value::Scalar(*kind))
        }
        Value::Vec(kind, arity) => construct_vec(*kind, *arity, args, span),
        Value::Struct(layout) => {
            layout.check_construction(args, span)?;
            Ok(proto.clone())
        }
        other => Err(TypeError::NotConstructible {
            ty: other.type_name(),
            span,
        }),
    }
}

/// A single scalar fills every component; otherwise components must add up.
fn construct_vec(kind: ScalarKind, arity: u8, args: &[Value], span: Span) -> Result<Value, TypeError> {
    let mut components = 0usize;
    for arg in args {
        components += expect_shape(arg, span)?.1 as usize;
    }
    let splat = args.len() == 1 && components == 1;
    if !splat && components != arity as usize {
        return Err(TypeError::ArgCount {
            expected: arity as usize,
            got: components,
            span,
        });
    }
    Ok(Value::Vec(kind, arity))
}

fn expect_shape(arg: &Value, span: Span) -> Result<(ScalarKind, u8), TypeError> {
    arg.shape().ok_or_else(|| TypeError::Mismatch {
        expected: "scalar or vector".to_string(),
        got: arg.type_name(),
        span: arg.context_span().unwrap_or(span),
    })
}
