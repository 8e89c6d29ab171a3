//! Attribute access, subscripting and slicing

use crate::interpreter::errors::{ExceptionKind, RuntimeError};
use crate::interpreter::methods::native_method;
use crate::memory::value::{HashKey, Method, RangeValue, Value};
use std::rc::Rc;

/// `object.name`
pub(crate) fn get_attribute(object: &Value, name: &str) -> Result<Value, RuntimeError> {
    match object {
        Value::Instance(instance) => {
            if let Some(value) = instance.attributes.borrow().get(name) {
                return Ok(value.clone());
            }
            if name == "__class__" {
                return Ok(Value::Class(instance.class.clone()));
            }
            match instance.class.lookup(name) {
                Some(Value::Function(function)) => Ok(Value::Method(Rc::new(Method::Bound {
                    receiver: object.clone(),
                    function,
                }))),
                Some(value) => Ok(value),
                None => Err(no_attribute(object, name)),
            }
        }
        Value::Class(class) => {
            if name == "__name__" {
                return Ok(Value::str(&class.name));
            }
            class.lookup(name).ok_or_else(|| {
                RuntimeError::attribute_error(format!(
                    "type object '{}' has no attribute '{}'",
                    class.name, name
                ))
            })
        }
        Value::Function(function) if name == "__name__" => Ok(Value::str(&function.decl.name)),
        Value::Builtin(builtin) if name == "__name__" => Ok(Value::str(builtin.name())),
        Value::Exception(exc) if name == "args" => Ok(Value::tuple(exc.args.clone())),
        Value::Range(range) => match name {
            "start" => Ok(Value::Int(range.start)),
            "stop" => Ok(Value::Int(range.stop)),
            "step" => Ok(Value::Int(range.step)),
            _ => Err(no_attribute(object, name)),
        },
        _ => match native_method(object, name) {
            Some(method) => Ok(Value::Method(Rc::new(Method::Native {
                receiver: object.clone(),
                name: method,
            }))),
            None => Err(no_attribute(object, name)),
        },
    }
}

/// `object.name = value`
pub(crate) fn set_attribute(object: &Value, name: &str, value: Value) -> Result<(), RuntimeError> {
    match object {
        Value::Instance(instance) => {
            instance
                .attributes
                .borrow_mut()
                .insert(name.to_string(), value);
            Ok(())
        }
        Value::Class(class) => {
            class.namespace.borrow_mut().insert(name.to_string(), value);
            Ok(())
        }
        _ => Err(no_attribute(object, name)),
    }
}

/// `del object.name`
pub(crate) fn delete_attribute(object: &Value, name: &str) -> Result<(), RuntimeError> {
    let removed = match object {
        Value::Instance(instance) => instance.attributes.borrow_mut().remove(name),
        Value::Class(class) => class.namespace.borrow_mut().remove(name),
        _ => None,
    };
    removed.map(|_| ()).ok_or_else(|| no_attribute(object, name))
}

fn no_attribute(object: &Value, name: &str) -> RuntimeError {
    RuntimeError::attribute_error(format!(
        "'{}' object has no attribute '{}'",
        object.type_name(),
        name
    ))
}

/// `object[index]`
pub(crate) fn get_item(object: &Value, index: &Value) -> Result<Value, RuntimeError> {
    match object {
        Value::List(items) => {
            let items = items.borrow();
            let i = sequence_index(index, items.len(), "list")?;
            items
                .get(i)
                .cloned()
                .ok_or_else(|| RuntimeError::index_error("list index out of range"))
        }
        Value::Tuple(items) => {
            let i = sequence_index(index, items.len(), "tuple")?;
            items
                .get(i)
                .cloned()
                .ok_or_else(|| RuntimeError::index_error("tuple index out of range"))
        }
        Value::Str(s) => {
            let Some(n) = index.as_int() else {
                return Err(RuntimeError::type_error(format!(
                    "string indices must be integers, not '{}'",
                    index.type_name()
                )));
            };
            let len = s.chars().count();
            normalize(n, len)
                .and_then(|i| s.chars().nth(i))
                .map(|c| Value::str(c.encode_utf8(&mut [0; 4])))
                .ok_or_else(|| RuntimeError::index_error("string index out of range"))
        }
        Value::Range(range) => {
            let i = sequence_index(index, range.len(), "range")?;
            if i >= range.len() {
                return Err(RuntimeError::index_error("range object index out of range"));
            }
            Ok(Value::Int(range.get(i)))
        }
        Value::Dict(dict) => {
            let key = HashKey::from_value(index)?;
            dict.borrow()
                .get(&key)
                .cloned()
                .ok_or_else(|| RuntimeError::new(ExceptionKind::KeyError, index.repr()))
        }
        other => Err(RuntimeError::type_error(format!(
            "'{}' object is not subscriptable",
            other.type_name()
        ))),
    }
}

/// `object[index] = value`
pub(crate) fn set_item(object: &Value, index: &Value, value: Value) -> Result<(), RuntimeError> {
    match object {
        Value::List(items) => {
            let mut items = items.borrow_mut();
            let i = sequence_index(index, items.len(), "list")?;
            match items.get_mut(i) {
                Some(slot) => {
                    *slot = value;
                    Ok(())
                }
                None => Err(RuntimeError::index_error("list assignment index out of range")),
            }
        }
        Value::Dict(dict) => {
            let key = HashKey::from_value(index)?;
            dict.borrow_mut().insert(key, index.clone(), value);
            Ok(())
        }
        other => Err(RuntimeError::type_error(format!(
            "'{}' object does not support item assignment",
            other.type_name()
        ))),
    }
}

/// `del object[index]`
pub(crate) fn delete_item(object: &Value, index: &Value) -> Result<(), RuntimeError> {
    match object {
        Value::List(items) => {
            let mut items = items.borrow_mut();
            let i = sequence_index(index, items.len(), "list")?;
            if i >= items.len() {
                return Err(RuntimeError::index_error("list assignment index out of range"));
            }
            items.remove(i);
            Ok(())
        }
        Value::Dict(dict) => {
            let key = HashKey::from_value(index)?;
            dict.borrow_mut()
                .remove(&key)
                .map(|_| ())
                .ok_or_else(|| RuntimeError::new(ExceptionKind::KeyError, index.repr()))
        }
        other => Err(RuntimeError::type_error(format!(
            "'{}' object doesn't support item deletion",
            other.type_name()
        ))),
    }
}

/// Resolve a possibly negative index; out-of-range indices map to `len`
fn sequence_index(index: &Value, len: usize, type_name: &str) -> Result<usize, RuntimeError> {
    match index {
        Value::Int(_) | Value::Bool(_) => {
            let n = index.as_int().unwrap_or_default();
            Ok(normalize(n, len).unwrap_or(len))
        }
        other => Err(RuntimeError::type_error(format!(
            "{} indices must be integers or slices, not {}",
            type_name,
            other.type_name()
        ))),
    }
}

fn normalize(n: i64, len: usize) -> Option<usize> {
    // A range may hold more than i64::MAX items
    let len = len as i128;
    let adjusted = if n < 0 { n as i128 + len } else { n as i128 };
    (0..len).contains(&adjusted).then_some(adjusted as usize)
}

/// Evaluated `lower:upper:step` of a subscript
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SliceSpec {
    pub lower: Option<i64>,
    pub upper: Option<i64>,
    pub step: i64,
}

impl SliceSpec {
    pub(crate) fn from_values(
        lower: Option<Value>,
        upper: Option<Value>,
        step: Option<Value>,
    ) -> Result<SliceSpec, RuntimeError> {
        let step = slice_bound(step)?.unwrap_or(1);
        if step == 0 {
            return Err(RuntimeError::value_error("slice step cannot be zero"));
        }
        Ok(SliceSpec {
            lower: slice_bound(lower)?,
            upper: slice_bound(upper)?,
            step,
        })
    }

    /// Clamped start and stop for a sequence of `len` items
    pub(crate) fn bounds(&self, len: usize) -> (i128, i128) {
        let len = len as i128;
        let clamp = |bound: i64, low: i128, high: i128| {
            let bound = bound as i128;
            let bound = if bound < 0 { bound + len } else { bound };
            bound.clamp(low, high)
        };
        if self.step > 0 {
            let start = self.lower.map_or(0, |b| clamp(b, 0, len));
            let stop = self.upper.map_or(len, |b| clamp(b, 0, len));
            (start, stop)
        } else {
            let start = self.lower.map_or(len - 1, |b| clamp(b, -1, len - 1));
            let stop = self.upper.map_or(-1, |b| clamp(b, -1, len - 1));
            (start, stop)
        }
    }

    /// Positions selected in a sequence of `len` items
    pub(crate) fn indices(&self, len: usize) -> Vec<usize> {
        let (start, stop) = self.bounds(len);
        let mut out = Vec::new();
        let mut i = start;
        while (self.step > 0 && i < stop) || (self.step < 0 && i > stop) {
            out.push(i as usize);
            i += self.step as i128;
        }
        out
    }
}

fn slice_bound(value: Option<Value>) -> Result<Option<i64>, RuntimeError> {
    match value {
        None | Some(Value::None) => Ok(None),
        Some(v @ (Value::Int(_) | Value::Bool(_))) => Ok(v.as_int()),
        Some(_) => Err(RuntimeError::type_error(
            "slice indices must be integers or None or have an __index__ method",
        )),
    }
}

/// `object[lower:upper:step]`
pub(crate) fn get_slice(object: &Value, spec: SliceSpec) -> Result<Value, RuntimeError> {
    match object {
        Value::List(items) => {
            let items = items.borrow();
            Ok(Value::list(pick(&items, &spec)))
        }
        Value::Tuple(items) => Ok(Value::tuple(pick(items, &spec))),
        Value::Str(s) => {
            let chars: Vec<char> = s.chars().collect();
            let text: String = spec.indices(chars.len()).into_iter().map(|i| chars[i]).collect();
            Ok(Value::str(&text))
        }
        Value::Range(range) => {
            let (start, stop) = spec.bounds(range.len());
            let at = |i: i128| {
                (range.start as i128 + i * range.step as i128).clamp(i64::MIN as i128, i64::MAX as i128)
                    as i64
            };
            Ok(Value::Range(RangeValue {
                start: at(start),
                stop: at(stop),
                step: range.step.saturating_mul(spec.step),
            }))
        }
        other => Err(RuntimeError::type_error(format!(
            "'{}' object is not subscriptable",
            other.type_name()
        ))),
    }
}

fn pick(items: &[Value], spec: &SliceSpec) -> Vec<Value> {
    spec.indices(items.len())
        .into_iter()
        .map(|i| items[i].clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i64]) -> Value {
        Value::list(values.iter().copied().map(Value::Int).collect())
    }

    fn slice(lower: Option<i64>, upper: Option<i64>, step: i64) -> SliceSpec {
        SliceSpec { lower, upper, step }
    }

    #[test]
    fn test_negative_indexing() {
        let list = ints(&[1, 2, 3]);
        assert_eq!(get_item(&list, &Value::Int(-1)).unwrap().repr(), "3");
        let err = get_item(&list, &Value::Int(3)).unwrap_err();
        assert_eq!(err.to_string(), "IndexError: list index out of range");
        assert_eq!(get_item(&Value::str("héllo"), &Value::Int(1)).unwrap().repr(), "'é'");
    }

    #[test]
    fn test_slices() {
        let list = ints(&[0, 1, 2, 3, 4, 5]);
        assert_eq!(get_slice(&list, slice(Some(1), Some(4), 1)).unwrap().repr(), "[1, 2, 3]");
        assert_eq!(get_slice(&list, slice(None, None, -1)).unwrap().repr(), "[5, 4, 3, 2, 1, 0]");
        assert_eq!(get_slice(&list, slice(None, None, 2)).unwrap().repr(), "[0, 2, 4]");
        assert_eq!(get_slice(&list, slice(Some(-2), None, 1)).unwrap().repr(), "[4, 5]");
        assert_eq!(get_slice(&list, slice(Some(10), Some(20), 1)).unwrap().repr(), "[]");
        assert_eq!(get_slice(&Value::str("hello"), slice(Some(1), Some(3), 1)).unwrap().repr(), "'el'");
    }

    #[test]
    fn test_range_slice_is_range() {
        let range = Value::Range(RangeValue { start: 0, stop: 10, step: 1 });
        assert_eq!(get_slice(&range, slice(Some(2), Some(8), 2)).unwrap().repr(), "range(2, 8, 2)");
    }

    #[test]
    fn test_index_range_longer_than_i64() {
        let range = Value::Range(RangeValue { start: i64::MIN, stop: i64::MAX, step: 1 });
        assert_eq!(get_item(&range, &Value::Int(5)).unwrap().repr(), "-9223372036854775803");
        assert_eq!(get_item(&range, &Value::Int(-1)).unwrap().repr(), "9223372036854775806");

        let evens = Value::Range(RangeValue { start: i64::MIN, stop: i64::MAX, step: 2 });
        assert_eq!(get_item(&evens, &Value::Int(5)).unwrap().repr(), "-9223372036854775798");
        assert_eq!(
            get_slice(&range, slice(Some(-3), None, 1)).unwrap().repr(),
            "range(9223372036854775804, 9223372036854775807)"
        );
    }

    #[test]
    fn test_zero_step() {
        let err = SliceSpec::from_values(None, None, Some(Value::Int(0))).unwrap_err();
        assert_eq!(err.to_string(), "ValueError: slice step cannot be zero");
    }

    #[test]
    fn test_missing_key() {
        let dict = Value::dict(Default::default());
        let err = get_item(&dict, &Value::str("k")).unwrap_err();
        assert_eq!(err.to_string(), "KeyError: 'k'");
    }

    #[test]
    fn test_tuple_is_immutable() {
        let tuple = Value::tuple(vec![Value::Int(1)]);
        let err = set_item(&tuple, &Value::Int(0), Value::Int(2)).unwrap_err();
        assert_eq!(err.to_string(), "TypeError: 'tuple' object does not support item assignment");
    }
}
