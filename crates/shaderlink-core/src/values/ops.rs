//! Operator typing rules.

use super::{ScalarKind, Value};
use crate::ops::{BinaryOp, UnaryOp, UpdateOp};
use crate::{Span, TypeError};

/// Result type of `left op right`.
///
/// Arithmetic needs operands of one numeric family, and vectors combine only
/// with vectors of the same arity. `/` is float-only. Sums,
/// differences and products of known ints stay known.
pub fn binary(op: BinaryOp, left: &Value, right: &Value, span: Span) -> Result<Value, TypeError> {
    let invalid = || TypeError::InvalidOperands {
        op: op.to_string(),
        left: left.type_name(),
        right: right.type_name(),
        span,
    };
    match op {
        BinaryOp::And | BinaryOp::Or | BinaryOp::Xor => {
            if left.is_bool() && right.is_bool() {
                Ok(Value::BOOL)
            } else {
                Err(invalid())
            }
        }
        BinaryOp::Equal | BinaryOp::NotEqual => {
            left.check(right, span)?;
            Ok(Value::BOOL)
        }
        BinaryOp::Less | BinaryOp::LessEqual | BinaryOp::Greater | BinaryOp::GreaterEqual => {
            match (left.scalar_kind(), right.scalar_kind()) {
                (Some(a), Some(b)) if a == b && a != ScalarKind::Bool => Ok(Value::BOOL),
                _ => Err(invalid()),
            }
        }
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => {
            arithmetic(op, left, right).ok_or_else(invalid)
        }
    }
}

fn arithmetic(op: BinaryOp, left: &Value, right: &Value) -> Option<Value> {
    let (kind, left_n) = left.shape()?;
    let (right_kind, right_n) = right.shape()?;
    if kind != right_kind || kind == ScalarKind::Bool {
        return None;
    }
    if op == BinaryOp::Div && kind != ScalarKind::Float {
        return None;
    }
    if let (Some(a), Some(b)) = (left.literal_int(), right.literal_int()) {
        let folded = match op {
            BinaryOp::Add => a.checked_add(b),
            BinaryOp::Sub => a.checked_sub(b),
            BinaryOp::Mul => a.checked_mul(b),
            _ => None,
        };
        if let Some(value) = folded {
            return Some(Value::LiteralInt(value));
        }
    }
    match (left_n, right_n) {
        (1, 1) => Some(Value::Scalar(kind)),
        (n, m) if n == m => Some(Value::Vec(kind, n)),
        _ => None,
    }
}

/// Result type of a prefix operator.
pub fn unary(op: UnaryOp, operand: &Value, span: Span) -> Result<Value, TypeError> {
    let invalid = || TypeError::InvalidOperand {
        op: op.to_string(),
        ty: operand.type_name(),
        span,
    };
    match op {
        UnaryOp::Not => {
            if operand.is_bool() {
                Ok(Value::BOOL)
            } else {
                Err(invalid())
            }
        }
        UnaryOp::Neg | UnaryOp::Pos => {
            let (kind, _) = operand.shape().ok_or_else(invalid)?;
            if kind == ScalarKind::Bool {
                return Err(invalid());
            }
            match (op, operand.literal_int()) {
                (UnaryOp::Neg, Some(value)) => Ok(value
                    .checked_neg()
                    .map(Value::LiteralInt)
                    .unwrap_or(Value::INT)),
                _ => Ok(operand.unwrap_context().clone()),
            }
        }
    }
}

/// `++`/`--` apply to ints only.
pub fn update(op: UpdateOp, target: &Value, span: Span) -> Result<(), TypeError> {
    if target.is_int() {
        Ok(())
    } else {
        Err(TypeError::InvalidOperand {
            op: op.to_string(),
            ty: target.type_name(),
            span,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span() -> Span {
        Span::default()
    }

    fn vec3() -> Value {
        Value::vec(ScalarKind::Float, 3)
    }

    #[test]
    fn arithmetic_requires_one_family() {
        assert_eq!(
            binary(BinaryOp::Add, &Value::INT, &Value::INT, span()).unwrap(),
            Value::INT
        );
        assert!(binary(BinaryOp::Add, &Value::INT, &Value::FLOAT, span()).is_err());
        assert!(binary(BinaryOp::Add, &Value::BOOL, &Value::BOOL, span()).is_err());
    }

    #[test]
    fn vectors_match_by_arity() {
        assert_eq!(binary(BinaryOp::Sub, &vec3(), &vec3(), span()).unwrap(), vec3());
        let v2 = Value::vec(ScalarKind::Float, 2);
        assert!(binary(BinaryOp::Add, &vec3(), &v2, span()).is_err());
    }

    #[test]
    fn scalars_do_not_scale_vectors() {
        assert!(binary(BinaryOp::Mul, &vec3(), &Value::FLOAT, span()).is_err());
        assert!(binary(BinaryOp::Mul, &Value::FLOAT, &vec3(), span()).is_err());
        assert!(binary(BinaryOp::Add, &vec3(), &Value::FLOAT, span()).is_err());
    }

    #[test]
    fn division_is_float_only() {
        assert!(binary(BinaryOp::Div, &Value::FLOAT, &Value::FLOAT, span()).is_ok());
        assert!(binary(BinaryOp::Div, &Value::INT, &Value::INT, span()).is_err());
    }

    #[test]
    fn known_ints_fold() {
        let sum = binary(
            BinaryOp::Add,
            &Value::LiteralInt(2),
            &Value::LiteralInt(3),
            span(),
        )
        .unwrap();
        assert_eq!(sum, Value::LiteralInt(5));
        assert_eq!(
            unary(UnaryOp::Neg, &Value::LiteralInt(4), span()).unwrap(),
            Value::LiteralInt(-4)
        );
    }

    #[test]
    fn comparisons_yield_bool() {
        assert_eq!(
            binary(BinaryOp::Less, &Value::INT, &Value::LiteralInt(4), span()).unwrap(),
            Value::BOOL
        );
        assert!(binary(BinaryOp::Less, &Value::INT, &Value::FLOAT, span()).is_err());
        assert!(binary(BinaryOp::Less, &vec3(), &vec3(), span()).is_err());
        assert_eq!(
            binary(BinaryOp::Equal, &vec3(), &vec3(), span()).unwrap(),
            Value::BOOL
        );
        assert!(binary(BinaryOp::NotEqual, &vec3(), &Value::FLOAT, span()).is_err());
    }

    #[test]
    fn logical_operators_need_bools() {
        assert!(binary(BinaryOp::Xor, &Value::BOOL, &Value::BOOL, span()).is_ok());
        assert!(binary(BinaryOp::And, &Value::BOOL, &Value::INT, span()).is_err());
        assert!(unary(UnaryOp::Not, &Value::INT, span()).is_err());
    }

    #[test]
    fn update_requires_int() {
        assert!(update(UpdateOp::Increment, &Value::INT, span()).is_ok());
        assert!(update(UpdateOp::Decrement, &Value::FLOAT, span()).is_err());
    }
}
