//! Unary operator evaluation

use crate::interpreter::errors::RuntimeError;
use crate::memory::value::Value;
use crate::parser::ast::UnOp;

pub(crate) fn unary(op: UnOp, operand: &Value) -> Result<Value, RuntimeError> {
    match op {
        UnOp::Not => Ok(Value::Bool(!operand.is_truthy())),
        UnOp::Neg => match operand {
            Value::Int(n) => n
                .checked_neg()
                .map(Value::Int)
                .ok_or_else(|| RuntimeError::overflow("integer result too large")),
            Value::Bool(b) => Ok(Value::Int(-(*b as i64))),
            Value::Float(x) => Ok(Value::Float(-x)),
            other => Err(bad_operand("-", other)),
        },
        UnOp::Pos => match operand {
            Value::Int(_) | Value::Float(_) => Ok(operand.clone()),
            Value::Bool(b) => Ok(Value::Int(*b as i64)),
            other => Err(bad_operand("+", other)),
        },
    }
}

fn bad_operand(symbol: &str, operand: &Value) -> RuntimeError {
    RuntimeError::type_error(format!(
        "bad operand type for unary {}: '{}'",
        symbol,
        operand.type_name()
    ))
}
