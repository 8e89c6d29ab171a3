//! Arithmetic and sequence operators

use crate::interpreter::constants::{MAX_COLLECTION_LEN, MAX_STRING_LEN};
use crate::interpreter::context::StepHook;
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::{ExceptionKind, RuntimeError};
use crate::interpreter::ops::compare::{numeric, Number};
use crate::memory::value::Value;
use crate::parser::ast::BinOp;

impl<H: StepHook> Interpreter<H> {
    /// Apply a binary operator; `str % args` is formatting rather than arithmetic
    pub(crate) fn evaluate_binary_op(
        &mut self,
        op: BinOp,
        left: &Value,
        right: &Value,
    ) -> Result<Value, RuntimeError> {
        if op == BinOp::Mod {
            if let Value::Str(template) = left {
                let text = self.percent_format(template, right)?;
                return Ok(Value::str(&text));
            }
        }
        arithmetic(op, left, right)
    }
}

/// Operators that never run guest code
pub(crate) fn arithmetic(op: BinOp, left: &Value, right: &Value) -> Result<Value, RuntimeError> {
    if let (Some(a), Some(b)) = (numeric(left), numeric(right)) {
        return match (a, b) {
            (Number::Int(a), Number::Int(b)) => int_arithmetic(op, a, b),
            _ => float_arithmetic(op, a.as_f64(), b.as_f64()),
        };
    }

    match (op, left, right) {
        (BinOp::Add, Value::Str(a), Value::Str(b)) => {
            check_string_len(a.len() + b.len())?;
            let mut joined = String::with_capacity(a.len() + b.len());
            joined.push_str(a);
            joined.push_str(b);
            Ok(Value::str(&joined))
        }
        (BinOp::Add, Value::List(a), Value::List(b)) => {
            let mut joined = a.borrow().clone();
            joined.extend(b.borrow().iter().cloned());
            check_collection_len(joined.len())?;
            Ok(Value::list(joined))
        }
        (BinOp::Add, Value::Tuple(a), Value::Tuple(b)) => {
            let mut joined = a.to_vec();
            joined.extend(b.iter().cloned());
            check_collection_len(joined.len())?;
            Ok(Value::tuple(joined))
        }
        (BinOp::Add, Value::Str(_), other)
        | (BinOp::Add, Value::List(_), other)
        | (BinOp::Add, Value::Tuple(_), other) => Err(RuntimeError::type_error(format!(
            "can only concatenate {} (not \"{}\") to {}",
            left.type_name(),
            other.type_name(),
            left.type_name()
        ))),
        (BinOp::Mul, seq, count) | (BinOp::Mul, count, seq)
            if is_sequence(seq) && matches!(count, Value::Int(_) | Value::Bool(_)) =>
        {
            repeat(seq, count.as_int().unwrap_or_default())
        }
        _ => Err(unsupported(op, left, right)),
    }
}

fn int_arithmetic(op: BinOp, a: i64, b: i64) -> Result<Value, RuntimeError> {
    let overflow = || RuntimeError::overflow("integer result too large");
    match op {
        BinOp::Add => a.checked_add(b).map(Value::Int).ok_or_else(overflow),
        BinOp::Sub => a.checked_sub(b).map(Value::Int).ok_or_else(overflow),
        BinOp::Mul => a.checked_mul(b).map(Value::Int).ok_or_else(overflow),
        BinOp::Div => {
            if b == 0 {
                return Err(RuntimeError::zero_division("division by zero"));
            }
            Ok(Value::Float(a as f64 / b as f64))
        }
        BinOp::FloorDiv => {
            if b == 0 {
                return Err(RuntimeError::zero_division(
                    "integer division or modulo by zero",
                ));
            }
            floor_div(a, b).map(Value::Int).ok_or_else(overflow)
        }
        BinOp::Mod => {
            if b == 0 {
                return Err(RuntimeError::zero_division("integer modulo by zero"));
            }
            Ok(Value::Int(floor_mod(a, b)))
        }
        BinOp::Pow => {
            if b < 0 {
                if a == 0 {
                    return Err(RuntimeError::zero_division(
                        "0.0 cannot be raised to a negative power",
                    ));
                }
                return Ok(Value::Float((a as f64).powf(b as f64)));
            }
            u32::try_from(b)
                .ok()
                .and_then(|exp| a.checked_pow(exp))
                .map(Value::Int)
                .ok_or_else(overflow)
        }
    }
}

fn float_arithmetic(op: BinOp, a: f64, b: f64) -> Result<Value, RuntimeError> {
    let result = match op {
        BinOp::Add => a + b,
        BinOp::Sub => a - b,
        BinOp::Mul => a * b,
        BinOp::Div => {
            if b == 0.0 {
                return Err(RuntimeError::zero_division("float division by zero"));
            }
            a / b
        }
        BinOp::FloorDiv => {
            if b == 0.0 {
                return Err(RuntimeError::zero_division("float floor division by zero"));
            }
            (a / b).floor()
        }
        BinOp::Mod => {
            if b == 0.0 {
                return Err(RuntimeError::zero_division("float modulo by zero"));
            }
            let r = a % b;
            if r != 0.0 && (r < 0.0) != (b < 0.0) {
                r + b
            } else {
                r
            }
        }
        BinOp::Pow => {
            if a == 0.0 && b < 0.0 {
                return Err(RuntimeError::zero_division(
                    "0.0 cannot be raised to a negative power",
                ));
            }
            if a < 0.0 && b.fract() != 0.0 {
                return Err(RuntimeError::value_error(
                    "negative number cannot be raised to a fractional power",
                ));
            }
            let result = a.powf(b);
            if result.is_infinite() && a.is_finite() && b.is_finite() {
                return Err(RuntimeError::overflow("(34, 'Numerical result out of range')"));
            }
            result
        }
    };
    Ok(Value::Float(result))
}

/// Floor division rounding toward negative infinity
pub(crate) fn floor_div(a: i64, b: i64) -> Option<i64> {
    let q = a.checked_div(b)?;
    if a % b != 0 && ((a < 0) != (b < 0)) {
        q.checked_sub(1)
    } else {
        Some(q)
    }
}

/// Remainder with the sign of the divisor
pub(crate) fn floor_mod(a: i64, b: i64) -> i64 {
    let r = a.wrapping_rem(b);
    if r != 0 && ((r < 0) != (b < 0)) {
        r + b
    } else {
        r
    }
}

fn is_sequence(value: &Value) -> bool {
    matches!(value, Value::Str(_) | Value::List(_) | Value::Tuple(_))
}

fn repeat(seq: &Value, count: i64) -> Result<Value, RuntimeError> {
    let count = usize::try_from(count).unwrap_or(0);
    match seq {
        Value::Str(s) => {
            check_string_len(s.len().saturating_mul(count))?;
            Ok(Value::str(&s.repeat(count)))
        }
        Value::List(items) => {
            let items = items.borrow();
            check_collection_len(items.len().saturating_mul(count))?;
            Ok(Value::list(repeat_items(&items, count)))
        }
        Value::Tuple(items) => {
            check_collection_len(items.len().saturating_mul(count))?;
            Ok(Value::tuple(repeat_items(items, count)))
        }
        other => Err(unsupported(BinOp::Mul, other, &Value::Int(count as i64))),
    }
}

fn repeat_items(items: &[Value], count: usize) -> Vec<Value> {
    let mut out = Vec::with_capacity(items.len() * count);
    for _ in 0..count {
        out.extend(items.iter().cloned());
    }
    out
}

pub(crate) fn check_collection_len(len: usize) -> Result<(), RuntimeError> {
    if len > MAX_COLLECTION_LEN {
        return Err(RuntimeError::memory_error());
    }
    Ok(())
}

pub(crate) fn check_string_len(len: usize) -> Result<(), RuntimeError> {
    if len > MAX_STRING_LEN {
        return Err(RuntimeError::memory_error());
    }
    Ok(())
}

fn unsupported(op: BinOp, left: &Value, right: &Value) -> RuntimeError {
    RuntimeError::new(
        ExceptionKind::TypeError,
        format!(
            "unsupported operand type(s) for {}: '{}' and '{}'",
            op.symbol(),
            left.type_name(),
            right.type_name()
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(op: BinOp, a: Value, b: Value) -> String {
        match arithmetic(op, &a, &b) {
            Ok(v) => v.repr(),
            Err(e) => e.to_string(),
        }
    }

    #[test]
    fn test_floor_division_and_modulo_signs() {
        assert_eq!(eval(BinOp::FloorDiv, Value::Int(-7), Value::Int(2)), "-4");
        assert_eq!(eval(BinOp::Mod, Value::Int(-7), Value::Int(2)), "1");
        assert_eq!(eval(BinOp::Mod, Value::Int(7), Value::Int(-2)), "-1");
        assert_eq!(eval(BinOp::Mod, Value::Float(-7.5), Value::Int(2)), "0.5");
        assert_eq!(eval(BinOp::FloorDiv, Value::Float(7.0), Value::Int(2)), "3.0");
    }

    #[test]
    fn test_true_division_is_float() {
        assert_eq!(eval(BinOp::Div, Value::Int(6), Value::Int(3)), "2.0");
        assert_eq!(eval(BinOp::Div, Value::Int(1), Value::Int(4)), "0.25");
    }

    #[test]
    fn test_zero_division_messages() {
        assert_eq!(
            eval(BinOp::Div, Value::Int(1), Value::Int(0)),
            "ZeroDivisionError: division by zero"
        );
        assert_eq!(
            eval(BinOp::FloorDiv, Value::Int(1), Value::Int(0)),
            "ZeroDivisionError: integer division or modulo by zero"
        );
        assert_eq!(
            eval(BinOp::Div, Value::Float(1.0), Value::Float(0.0)),
            "ZeroDivisionError: float division by zero"
        );
    }

    #[test]
    fn test_power() {
        assert_eq!(eval(BinOp::Pow, Value::Int(2), Value::Int(10)), "1024");
        assert_eq!(eval(BinOp::Pow, Value::Int(2), Value::Int(-1)), "0.5");
        assert!(eval(BinOp::Pow, Value::Int(10), Value::Int(40)).starts_with("OverflowError"));
    }

    #[test]
    fn test_sequence_operators() {
        assert_eq!(eval(BinOp::Add, Value::str("ab"), Value::str("cd")), "'abcd'");
        assert_eq!(eval(BinOp::Mul, Value::str("ab"), Value::Int(3)), "'ababab'");
        assert_eq!(eval(BinOp::Mul, Value::Int(2), Value::list(vec![Value::Int(0)])), "[0, 0]");
        assert_eq!(eval(BinOp::Mul, Value::str("x"), Value::Int(-1)), "''");
        assert_eq!(
            eval(BinOp::Add, Value::tuple(vec![Value::Int(1)]), Value::tuple(vec![Value::Int(2)])),
            "(1, 2)"
        );
    }

    #[test]
    fn test_type_errors() {
        assert_eq!(
            eval(BinOp::Add, Value::str("a"), Value::Int(1)),
            "TypeError: can only concatenate str (not \"int\") to str"
        );
        assert_eq!(
            eval(BinOp::Add, Value::Int(1), Value::str("a")),
            "TypeError: unsupported operand type(s) for +: 'int' and 'str'"
        );
        assert_eq!(
            eval(BinOp::Mul, Value::str("a"), Value::Float(2.0)),
            "TypeError: unsupported operand type(s) for *: 'str' and 'float'"
        );
    }

    #[test]
    fn test_huge_repetition_is_memory_error() {
        let result = eval(BinOp::Mul, Value::list(vec![Value::Int(0)]), Value::Int(10_000_000));
        assert_eq!(result, "MemoryError");
    }

    #[test]
    fn test_bool_arithmetic() {
        assert_eq!(eval(BinOp::Add, Value::Bool(true), Value::Bool(true)), "2");
    }
}
