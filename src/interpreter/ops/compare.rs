//! Equality, ordering, identity and membership

use crate::interpreter::errors::RuntimeError;
use crate::memory::value::{float_to_int, HashKey, Value, MAX_FORMAT_DEPTH};
use crate::parser::ast::CmpOp;
use std::cmp::Ordering;
use std::rc::Rc;

/// Evaluate one link of a comparison chain
pub(crate) fn compare(op: CmpOp, left: &Value, right: &Value) -> Result<bool, RuntimeError> {
    match op {
        CmpOp::Eq => Ok(values_equal(left, right)),
        CmpOp::Ne => Ok(!values_equal(left, right)),
        CmpOp::Is => Ok(is_same(left, right)),
        CmpOp::IsNot => Ok(!is_same(left, right)),
        CmpOp::In => contains(right, left),
        CmpOp::NotIn => contains(right, left).map(|found| !found),
        CmpOp::Lt | CmpOp::Le | CmpOp::Gt | CmpOp::Ge => {
            let ordering = order(left, right, op, 0)?;
            Ok(match ordering {
                None => false,
                Some(ordering) => match op {
                    CmpOp::Lt => ordering.is_lt(),
                    CmpOp::Le => ordering.is_le(),
                    CmpOp::Gt => ordering.is_gt(),
                    _ => ordering.is_ge(),
                },
            })
        }
    }
}

/// `left < right`, as used by sorting, `min` and `max`
pub(crate) fn less_than(left: &Value, right: &Value) -> Result<bool, RuntimeError> {
    compare(CmpOp::Lt, left, right)
}

/// Python `==`
pub(crate) fn values_equal(left: &Value, right: &Value) -> bool {
    equal_at(left, right, 0)
}

fn equal_at(left: &Value, right: &Value, depth: usize) -> bool {
    if let (Some(a), Some(b)) = (left.identity(), right.identity()) {
        if a == b {
            return true;
        }
    }
    if depth > MAX_FORMAT_DEPTH {
        return false;
    }

    match (left, right) {
        (Value::None, Value::None) => true,
        (Value::Str(a), Value::Str(b)) => a == b,
        (Value::List(a), Value::List(b)) => {
            let (a, b) = (a.borrow().clone(), b.borrow().clone());
            sequences_equal(&a, &b, depth)
        }
        (Value::Tuple(a), Value::Tuple(b)) => sequences_equal(a, b, depth),
        (Value::Dict(a), Value::Dict(b)) => {
            let a: Vec<(Value, Value)> = a
                .borrow()
                .items()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            let b = b.borrow().clone();
            a.len() == b.len()
                && a.iter().all(|(key, value)| {
                    HashKey::from_value(key)
                        .ok()
                        .and_then(|hash| b.get(&hash).cloned())
                        .is_some_and(|other| equal_at(value, &other, depth + 1))
                })
        }
        (Value::Range(a), Value::Range(b)) => {
            let len = a.len();
            len == b.len() && (len == 0 || (a.start == b.start && (len == 1 || a.step == b.step)))
        }
        (Value::Builtin(a), Value::Builtin(b)) => a == b,
        _ => match (numeric(left), numeric(right)) {
            (Some(Number::Int(a)), Some(Number::Int(b))) => a == b,
            (Some(a), Some(b)) => a.as_f64() == b.as_f64(),
            _ => false,
        },
    }
}

fn sequences_equal(a: &[Value], b: &[Value], depth: usize) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| equal_at(x, y, depth + 1))
}

/// Python `is`
pub(crate) fn is_same(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::None, Value::None) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Int(a), Value::Int(b)) => a == b,
        (Value::Builtin(a), Value::Builtin(b)) => a == b,
        (Value::Str(a), Value::Str(b)) => Rc::ptr_eq(a, b),
        _ => match (left.identity(), right.identity()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },
    }
}

/// Python `item in container`
pub(crate) fn contains(container: &Value, item: &Value) -> Result<bool, RuntimeError> {
    match container {
        Value::Str(haystack) => match item {
            Value::Str(needle) => Ok(haystack.contains(needle.as_ref())),
            other => Err(RuntimeError::type_error(format!(
                "'in <string>' requires string as left operand, not {}",
                other.type_name()
            ))),
        },
        Value::List(items) => {
            let items = items.borrow().clone();
            Ok(items.iter().any(|x| values_equal(x, item)))
        }
        Value::Tuple(items) => Ok(items.iter().any(|x| values_equal(x, item))),
        Value::Dict(dict) => {
            let key = HashKey::from_value(item)?;
            Ok(dict.borrow().contains(&key))
        }
        Value::Range(range) => Ok(match numeric(item) {
            Some(Number::Int(n)) => range.contains(n),
            Some(Number::Float(x)) if x.fract() == 0.0 => float_to_int(x).is_some_and(|n| range.contains(n)),
            _ => false,
        }),
        other => Err(RuntimeError::type_error(format!(
            "argument of type '{}' is not iterable",
            other.type_name()
        ))),
    }
}

/// Ordering for `<`-family operators; `None` when unordered (NaN)
fn order(
    left: &Value,
    right: &Value,
    op: CmpOp,
    depth: usize,
) -> Result<Option<Ordering>, RuntimeError> {
    match (left, right) {
        (Value::Str(a), Value::Str(b)) => Ok(Some(a.cmp(b))),
        (Value::List(a), Value::List(b)) => {
            let (a, b) = (a.borrow().clone(), b.borrow().clone());
            order_sequences(&a, &b, op, depth)
        }
        (Value::Tuple(a), Value::Tuple(b)) => order_sequences(a, b, op, depth),
        _ => match (numeric(left), numeric(right)) {
            (Some(Number::Int(a)), Some(Number::Int(b))) => Ok(Some(a.cmp(&b))),
            (Some(a), Some(b)) => Ok(a.as_f64().partial_cmp(&b.as_f64())),
            _ => Err(RuntimeError::type_error(format!(
                "'{}' not supported between instances of '{}' and '{}'",
                op.symbol(),
                left.type_name(),
                right.type_name()
            ))),
        },
    }
}

fn order_sequences(
    a: &[Value],
    b: &[Value],
    op: CmpOp,
    depth: usize,
) -> Result<Option<Ordering>, RuntimeError> {
    if depth > MAX_FORMAT_DEPTH {
        return Err(RuntimeError::recursion());
    }
    for (x, y) in a.iter().zip(b) {
        if !values_equal(x, y) {
            return order(x, y, op, depth + 1);
        }
    }
    Ok(Some(a.len().cmp(&b.len())))
}

/// A value viewed as a number (`bool` counts as `int`)
#[derive(Debug, Clone, Copy)]
pub(crate) enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub(crate) fn as_f64(self) -> f64 {
        match self {
            Number::Int(n) => n as f64,
            Number::Float(x) => x,
        }
    }
}

pub(crate) fn numeric(value: &Value) -> Option<Number> {
    match value {
        Value::Int(n) => Some(Number::Int(*n)),
        Value::Bool(b) => Some(Number::Int(*b as i64)),
        Value::Float(x) => Some(Number::Float(*x)),
        _ => None,
    }
}
