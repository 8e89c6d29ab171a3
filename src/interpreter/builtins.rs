//! Built-in function implementations
//!
//! Built-ins are resolved by name after globals (see
//! [`Interpreter::lookup_name`]) and dispatched here. Those that iterate call
//! [`Interpreter::tick`] so a long `sum(range(...))` still honors the time
//! budget even though it runs no statements.
//!
//! # Implementation Notes
//!
//! - `print` and `input` write to the run's [`crate::snapshot::OutputBuffer`]
//!   rather than the process's stdout
//! - `input` reads from the queued stdin lines and raises `EOFError` when
//!   none are left
//! - `reversed`, `enumerate`, `zip`, `map` and `filter` return lists
//! - `round` rounds half to even, as Python does

use crate::interpreter::context::StepHook;
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::{ExceptionKind, RuntimeError};
use crate::interpreter::loops::Items;
use crate::interpreter::methods::{dict_from_entries, sort_options};
use crate::interpreter::ops::binary::{arithmetic, check_collection_len};
use crate::interpreter::ops::compare::less_than;
use crate::memory::value::{float_to_int, Builtin, Class, ExceptionValue, Instance, RangeValue, Value};
use crate::parser::ast::BinOp;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::rc::Rc;

/// Check a built-in's positional argument count
fn arity(name: &str, args: &[Value], min: usize, max: usize) -> Result<(), RuntimeError> {
    let given = args.len();
    if given >= min && given <= max {
        return Ok(());
    }
    let message = match (min, max) {
        (1, 1) => format!("{}() takes exactly one argument ({} given)", name, given),
        _ if given < min => format!(
            "{} expected at least {} argument{}, got {}",
            name,
            min,
            if min == 1 { "" } else { "s" },
            given
        ),
        _ => format!(
            "{} expected at most {} argument{}, got {}",
            name,
            max,
            if max == 1 { "" } else { "s" },
            given
        ),
    };
    Err(RuntimeError::type_error(message))
}

fn integer_arg(value: &Value) -> Result<i64, RuntimeError> {
    match value {
        Value::Int(_) | Value::Bool(_) => Ok(value.as_int().unwrap_or_default()),
        other => Err(RuntimeError::type_error(format!(
            "'{}' object cannot be interpreted as an integer",
            other.type_name()
        ))),
    }
}

/// Pull a keyword argument out of `kwargs`
fn take_keyword(kwargs: &mut Vec<(String, Value)>, name: &str) -> Option<Value> {
    let position = kwargs.iter().position(|(key, _)| key == name)?;
    Some(kwargs.remove(position).1)
}

fn reject_keywords(name: &str, kwargs: &[(String, Value)]) -> Result<(), RuntimeError> {
    match kwargs.first() {
        None => Ok(()),
        Some((key, _)) => Err(RuntimeError::type_error(format!(
            "{}() got an unexpected keyword argument '{}'",
            name, key
        ))),
    }
}

impl<H: StepHook> Interpreter<H> {
    /// Call a built-in function or type
    pub(crate) fn call_builtin(
        &mut self,
        builtin: Builtin,
        mut args: Vec<Value>,
        mut kwargs: Vec<(String, Value)>,
    ) -> Result<Value, RuntimeError> {
        let name = builtin.name();

        match builtin {
            Builtin::Print => {
                let sep = self.text_keyword(&mut kwargs, "sep", " ")?;
                let end = self.text_keyword(&mut kwargs, "end", "\n")?;
                reject_keywords(name, &kwargs)?;
                let mut line = String::new();
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        line.push_str(&sep);
                    }
                    line.push_str(&self.str_value(arg)?);
                }
                line.push_str(&end);
                self.ctx.output.write(&line);
                Ok(Value::None)
            }

            Builtin::Input => {
                reject_keywords(name, &kwargs)?;
                arity(name, &args, 0, 1)?;
                if let Some(prompt) = args.first() {
                    let prompt = self.str_value(prompt)?;
                    self.ctx.output.write(&prompt);
                }
                match self.ctx.stdin.pop_front() {
                    Some(line) => Ok(Value::str(&line)),
                    None => Err(RuntimeError::new(
                        ExceptionKind::EOFError,
                        "EOF when reading a line",
                    )),
                }
            }

            Builtin::Len => {
                reject_keywords(name, &kwargs)?;
                arity(name, &args, 1, 1)?;
                let len = match &args[0] {
                    Value::Str(s) => s.chars().count(),
                    Value::List(items) => items.borrow().len(),
                    Value::Tuple(items) => items.len(),
                    Value::Dict(dict) => dict.borrow().len(),
                    Value::Range(range) => range.len(),
                    other => {
                        return Err(RuntimeError::type_error(format!(
                            "object of type '{}' has no len()",
                            other.type_name()
                        )))
                    }
                };
                // Only a range can be longer than an i64 can count
                i64::try_from(len)
                    .map(Value::Int)
                    .map_err(|_| RuntimeError::overflow("Python int too large to convert to C ssize_t"))
            }

            Builtin::Repr => {
                reject_keywords(name, &kwargs)?;
                arity(name, &args, 1, 1)?;
                Ok(Value::str(&self.repr_value(&args[0])?))
            }

            Builtin::Abs => {
                reject_keywords(name, &kwargs)?;
                arity(name, &args, 1, 1)?;
                match &args[0] {
                    Value::Int(n) => n
                        .checked_abs()
                        .map(Value::Int)
                        .ok_or_else(|| RuntimeError::overflow("integer result too large")),
                    Value::Bool(b) => Ok(Value::Int(*b as i64)),
                    Value::Float(x) => Ok(Value::Float(x.abs())),
                    other => Err(RuntimeError::type_error(format!(
                        "bad operand type for abs(): '{}'",
                        other.type_name()
                    ))),
                }
            }

            Builtin::Min | Builtin::Max => self.builtin_extreme(builtin, args, kwargs),

            Builtin::Sum => {
                let start = take_keyword(&mut kwargs, "start");
                reject_keywords(name, &kwargs)?;
                arity(name, &args, 1, 2)?;
                let mut total = args.get(1).cloned().or(start).unwrap_or(Value::Int(0));
                if matches!(total, Value::Str(_)) {
                    return Err(RuntimeError::type_error(
                        "sum() can't sum strings [use ''.join(seq) instead]",
                    ));
                }
                for item in self.items(&args[0])? {
                    self.tick()?;
                    total = self.evaluate_binary_op(BinOp::Add, &total, &item)?;
                }
                Ok(total)
            }

            Builtin::Sorted => {
                let (key, reverse) = sort_options(kwargs)?;
                arity(name, &args, 1, 1)?;
                let items = self.iterate(&args[0])?;
                Ok(Value::list(self.sort_values(items, key.as_ref(), reverse)?))
            }

            Builtin::Reversed => {
                reject_keywords(name, &kwargs)?;
                arity(name, &args, 1, 1)?;
                match &args[0] {
                    Value::List(_) | Value::Tuple(_) | Value::Str(_) | Value::Range(_) | Value::Dict(_) => {
                        let mut items = self.iterate(&args[0])?;
                        items.reverse();
                        Ok(Value::list(items))
                    }
                    other => Err(RuntimeError::type_error(format!(
                        "'{}' object is not reversible",
                        other.type_name()
                    ))),
                }
            }

            Builtin::Enumerate => {
                let start = take_keyword(&mut kwargs, "start");
                reject_keywords(name, &kwargs)?;
                arity(name, &args, 1, 2)?;
                let start = match args.get(1).or(start.as_ref()) {
                    Some(value) => integer_arg(value)?,
                    None => 0,
                };
                let items = self.iterate(&args[0])?;
                let mut pairs = Vec::with_capacity(items.len());
                let mut counter = Some(start);
                for item in items {
                    let index = counter.ok_or_else(|| RuntimeError::overflow("integer result too large"))?;
                    pairs.push(Value::tuple(vec![Value::Int(index), item]));
                    counter = index.checked_add(1);
                }
                Ok(Value::list(pairs))
            }

            Builtin::Zip => {
                reject_keywords(name, &kwargs)?;
                let columns = args
                    .iter()
                    .map(|arg| self.iterate(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                let rows = columns.iter().map(Vec::len).min().unwrap_or(0);
                let zipped = (0..rows)
                    .map(|row| Value::tuple(columns.iter().map(|column| column[row].clone()).collect()))
                    .collect();
                Ok(Value::list(zipped))
            }

            Builtin::Map => {
                reject_keywords(name, &kwargs)?;
                if args.len() < 2 {
                    return Err(RuntimeError::type_error("map() must have at least two arguments."));
                }
                let function = args.remove(0);
                let columns = args
                    .iter()
                    .map(|arg| self.iterate(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                let rows = columns.iter().map(Vec::len).min().unwrap_or(0);
                let mut results = Vec::with_capacity(rows);
                for row in 0..rows {
                    self.tick()?;
                    let call_args = columns.iter().map(|column| column[row].clone()).collect();
                    results.push(self.call_value(&function, call_args, Vec::new())?);
                }
                Ok(Value::list(results))
            }

            Builtin::Filter => {
                reject_keywords(name, &kwargs)?;
                arity(name, &args, 2, 2)?;
                let mut kept = Vec::new();
                for item in self.items(&args[1])? {
                    self.tick()?;
                    let keep = match &args[0] {
                        Value::None => item.is_truthy(),
                        function => self.call_value(function, vec![item.clone()], Vec::new())?.is_truthy(),
                    };
                    if keep {
                        kept.push(item);
                        check_collection_len(kept.len())?;
                    }
                }
                Ok(Value::list(kept))
            }

            Builtin::Any | Builtin::All => {
                reject_keywords(name, &kwargs)?;
                arity(name, &args, 1, 1)?;
                // Both stop at the first item that settles the answer
                let wanted = builtin == Builtin::Any;
                for item in self.items(&args[0])? {
                    self.tick()?;
                    if item.is_truthy() == wanted {
                        return Ok(Value::Bool(wanted));
                    }
                }
                Ok(Value::Bool(!wanted))
            }

            Builtin::Round => {
                let ndigits = take_keyword(&mut kwargs, "ndigits");
                reject_keywords(name, &kwargs)?;
                arity(name, &args, 1, 2)?;
                let ndigits = match args.get(1).or(ndigits.as_ref()) {
                    None | Some(Value::None) => None,
                    Some(value) => Some(integer_arg(value)?),
                };
                round(&args[0], ndigits)
            }

            Builtin::Divmod => {
                reject_keywords(name, &kwargs)?;
                arity(name, &args, 2, 2)?;
                let quotient = arithmetic(BinOp::FloorDiv, &args[0], &args[1])?;
                let remainder = arithmetic(BinOp::Mod, &args[0], &args[1])?;
                Ok(Value::tuple(vec![quotient, remainder]))
            }

            Builtin::Pow => {
                reject_keywords(name, &kwargs)?;
                arity(name, &args, 2, 3)?;
                match args.get(2) {
                    None => arithmetic(BinOp::Pow, &args[0], &args[1]),
                    Some(modulus) => modular_pow(&args[0], &args[1], modulus),
                }
            }

            Builtin::Chr => {
                reject_keywords(name, &kwargs)?;
                arity(name, &args, 1, 1)?;
                let code = integer_arg(&args[0])?;
                u32::try_from(code)
                    .ok()
                    .and_then(char::from_u32)
                    .map(|c| Value::str(c.encode_utf8(&mut [0; 4])))
                    .ok_or_else(|| RuntimeError::value_error("chr() arg not in range(0x110000)"))
            }

            Builtin::Ord => {
                reject_keywords(name, &kwargs)?;
                arity(name, &args, 1, 1)?;
                match &args[0] {
                    Value::Str(s) => {
                        let mut chars = s.chars();
                        match (chars.next(), chars.next()) {
                            (Some(c), None) => Ok(Value::Int(c as i64)),
                            _ => Err(RuntimeError::type_error(format!(
                                "ord() expected a character, but string of length {} found",
                                s.chars().count()
                            ))),
                        }
                    }
                    other => Err(RuntimeError::type_error(format!(
                        "ord() expected string of length 1, but {} found",
                        other.type_name()
                    ))),
                }
            }

            Builtin::Isinstance => {
                reject_keywords(name, &kwargs)?;
                arity(name, &args, 2, 2)?;
                let classes = match &args[1] {
                    Value::Tuple(items) => items.to_vec(),
                    other => vec![other.clone()],
                };
                for class in &classes {
                    if is_instance(&args[0], class)? {
                        return Ok(Value::Bool(true));
                    }
                }
                Ok(Value::Bool(false))
            }

            Builtin::Type => {
                reject_keywords(name, &kwargs)?;
                if args.len() != 1 {
                    return Err(RuntimeError::type_error("type() takes 1 argument"));
                }
                Ok(type_of(&args[0]))
            }

            Builtin::Object => {
                reject_keywords(name, &kwargs)?;
                arity(name, &args, 0, 0)
                    .map_err(|_| RuntimeError::type_error("object() takes no arguments"))?;
                let class = Rc::new(Class {
                    name: "object".to_string(),
                    base: None,
                    exception_base: None,
                    namespace: RefCell::new(FxHashMap::default()),
                });
                Ok(Value::Instance(Rc::new(Instance {
                    class,
                    attributes: RefCell::new(FxHashMap::default()),
                })))
            }

            Builtin::Str => {
                reject_keywords(name, &kwargs)?;
                arity(name, &args, 0, 1)?;
                match args.first() {
                    Some(value) => Ok(Value::str(&self.str_value(value)?)),
                    None => Ok(Value::str("")),
                }
            }

            Builtin::Int => {
                let base = take_keyword(&mut kwargs, "base");
                reject_keywords(name, &kwargs)?;
                arity(name, &args, 0, 2)?;
                let base = match args.get(1).or(base.as_ref()) {
                    Some(value) => Some(integer_arg(value)?),
                    None => None,
                };
                match args.first() {
                    None => Ok(Value::Int(0)),
                    Some(value) => to_int(value, base),
                }
            }

            Builtin::Float => {
                reject_keywords(name, &kwargs)?;
                arity(name, &args, 0, 1)?;
                match args.first() {
                    None => Ok(Value::Float(0.0)),
                    Some(value) => to_float(value),
                }
            }

            Builtin::Bool => {
                reject_keywords(name, &kwargs)?;
                arity(name, &args, 0, 1)?;
                Ok(Value::Bool(args.first().is_some_and(Value::is_truthy)))
            }

            Builtin::List | Builtin::Tuple => {
                reject_keywords(name, &kwargs)?;
                arity(name, &args, 0, 1)?;
                let items = match args.first() {
                    Some(value) => self.iterate(value)?,
                    None => Vec::new(),
                };
                check_collection_len(items.len())?;
                Ok(if builtin == Builtin::List {
                    Value::list(items)
                } else {
                    Value::tuple(items)
                })
            }

            Builtin::Dict => {
                arity(name, &args, 0, 1)?;
                let mut entries = match args.first() {
                    Some(source) => self.dict_entries(source)?,
                    None => Vec::new(),
                };
                entries.extend(kwargs.into_iter().map(|(key, value)| (Value::str(&key), value)));
                dict_from_entries(entries)
            }

            Builtin::Range => {
                reject_keywords(name, &kwargs)?;
                arity(name, &args, 1, 3)?;
                let numbers = args.iter().map(integer_arg).collect::<Result<Vec<_>, _>>()?;
                let (start, stop, step) = match numbers.as_slice() {
                    [stop] => (0, *stop, 1),
                    [start, stop] => (*start, *stop, 1),
                    [start, stop, step] => (*start, *stop, *step),
                    _ => (0, 0, 1),
                };
                if step == 0 {
                    return Err(RuntimeError::value_error("range() arg 3 must not be zero"));
                }
                Ok(Value::Range(RangeValue { start, stop, step }))
            }

            Builtin::ExceptionType(kind) => {
                reject_keywords(name, &kwargs)?;
                Ok(Value::Exception(Rc::new(ExceptionValue { kind, args })))
            }

            Builtin::TypeObject(type_name) => Err(RuntimeError::type_error(format!(
                "cannot create '{}' instances",
                type_name
            ))),
        }
    }

    /// `sep=` / `end=` of `print`: a string, or `None` for the default
    fn text_keyword(
        &mut self,
        kwargs: &mut Vec<(String, Value)>,
        name: &str,
        default: &str,
    ) -> Result<String, RuntimeError> {
        match take_keyword(kwargs, name) {
            None | Some(Value::None) => Ok(default.to_string()),
            Some(Value::Str(s)) => Ok(s.to_string()),
            Some(other) => Err(RuntimeError::type_error(format!(
                "{} must be None or a string, not {}",
                name,
                other.type_name()
            ))),
        }
    }

    /// `min()` and `max()`; the first of several equal extremes wins
    fn builtin_extreme(
        &mut self,
        builtin: Builtin,
        args: Vec<Value>,
        mut kwargs: Vec<(String, Value)>,
    ) -> Result<Value, RuntimeError> {
        let name = builtin.name();
        let key = take_keyword(&mut kwargs, "key").filter(|k| !matches!(k, Value::None));
        let default = take_keyword(&mut kwargs, "default");
        reject_keywords(name, &kwargs)?;

        let items = match args.len() {
            0 => {
                return Err(RuntimeError::type_error(format!(
                    "{} expected at least 1 argument, got 0",
                    name
                )))
            }
            1 => self.items(&args[0])?,
            _ => Items::Values(args.into_iter()),
        };

        let mut best: Option<(Value, Value)> = None;
        for item in items {
            self.tick()?;
            let item_key = match &key {
                Some(function) => self.call_value(function, vec![item.clone()], Vec::new())?,
                None => item.clone(),
            };
            let replace = match &best {
                None => true,
                Some((best_key, _)) if builtin == Builtin::Min => less_than(&item_key, best_key)?,
                Some((best_key, _)) => less_than(best_key, &item_key)?,
            };
            if replace {
                best = Some((item_key, item));
            }
        }

        match (best, default) {
            (Some((_, item)), _) => Ok(item),
            (None, Some(default)) => Ok(default),
            (None, None) => Err(RuntimeError::value_error(format!(
                "{}() iterable argument is empty",
                name
            ))),
        }
    }
}

fn round(value: &Value, ndigits: Option<i64>) -> Result<Value, RuntimeError> {
    match (value, ndigits) {
        (Value::Int(_) | Value::Bool(_), None) => Ok(Value::Int(value.as_int().unwrap_or_default())),
        (Value::Int(_) | Value::Bool(_), Some(digits)) => {
            let n = value.as_int().unwrap_or_default();
            if digits >= 0 {
                return Ok(Value::Int(n));
            }
            let factor = u32::try_from(-digits)
                .ok()
                .and_then(|exp| 10i64.checked_pow(exp));
            let Some(factor) = factor else {
                return Ok(Value::Int(0));
            };
            let rounded = (n as f64 / factor as f64).round_ties_even() as i64;
            rounded
                .checked_mul(factor)
                .map(Value::Int)
                .ok_or_else(|| RuntimeError::overflow("integer result too large"))
        }
        (Value::Float(x), None) => {
            if x.is_nan() {
                return Err(RuntimeError::value_error("cannot convert float NaN to integer"));
            }
            if x.is_infinite() {
                return Err(RuntimeError::overflow("cannot convert float infinity to integer"));
            }
            float_to_int(x.round_ties_even())
                .map(Value::Int)
                .ok_or_else(|| RuntimeError::overflow("integer result too large"))
        }
        (Value::Float(x), Some(digits)) => {
            if !x.is_finite() {
                return Ok(Value::Float(*x));
            }
            if digits >= 0 {
                // Decimal formatting rounds the exact binary value, as Python does
                let text = format!("{:.*}", digits.min(300) as usize, x);
                Ok(Value::Float(text.parse().unwrap_or(*x)))
            } else {
                let factor = 10f64.powi((-digits).min(308) as i32);
                Ok(Value::Float((x / factor).round_ties_even() * factor))
            }
        }
        (other, _) => Err(RuntimeError::type_error(format!(
            "type {} doesn't define __round__ method",
            other.type_name()
        ))),
    }
}

fn modular_pow(base: &Value, exponent: &Value, modulus: &Value) -> Result<Value, RuntimeError> {
    let (base, exponent, modulus) = match (base.as_int(), exponent.as_int(), modulus.as_int()) {
        (Some(b), Some(e), Some(m))
            if !matches!(base, Value::Float(_))
                && !matches!(exponent, Value::Float(_))
                && !matches!(modulus, Value::Float(_)) =>
        {
            (b, e, m)
        }
        _ => {
            return Err(RuntimeError::type_error(
                "pow() 3rd argument not allowed unless all arguments are integers",
            ))
        }
    };
    if modulus == 0 {
        return Err(RuntimeError::value_error("pow() 3rd argument cannot be 0"));
    }
    if exponent < 0 {
        return Err(RuntimeError::value_error(
            "pow() 2nd argument cannot be negative when 3rd argument specified",
        ));
    }

    let m = modulus as i128;
    let mut result: i128 = 1;
    let mut b = (base as i128).rem_euclid(m);
    let mut e = exponent;
    while e > 0 {
        if e & 1 == 1 {
            result = (result * b).rem_euclid(m);
        }
        b = (b * b).rem_euclid(m);
        e >>= 1;
    }
    // Python gives the result the sign of the modulus
    if m < 0 && result > 0 {
        result += m;
    }
    Ok(Value::Int(result as i64))
}

fn to_int(value: &Value, base: Option<i64>) -> Result<Value, RuntimeError> {
    match (value, base) {
        (Value::Str(s), base) => parse_int(s, base.unwrap_or(10)).map(Value::Int),
        (_, Some(_)) => Err(RuntimeError::type_error(
            "int() can't convert non-string with explicit base",
        )),
        (Value::Int(n), None) => Ok(Value::Int(*n)),
        (Value::Bool(b), None) => Ok(Value::Int(*b as i64)),
        (Value::Float(x), None) => {
            if x.is_nan() {
                return Err(RuntimeError::value_error("cannot convert float NaN to integer"));
            }
            if x.is_infinite() {
                return Err(RuntimeError::overflow("cannot convert float infinity to integer"));
            }
            float_to_int(*x)
                .map(Value::Int)
                .ok_or_else(|| RuntimeError::overflow("integer result too large"))
        }
        (other, None) => Err(RuntimeError::type_error(format!(
            "int() argument must be a string, a bytes-like object or a real number, not '{}'",
            other.type_name()
        ))),
    }
}

fn parse_int(text: &str, base: i64) -> Result<i64, RuntimeError> {
    let invalid = || {
        RuntimeError::value_error(format!(
            "invalid literal for int() with base {}: {}",
            base,
            Value::str(text).repr()
        ))
    };
    if base != 0 && !(2..=36).contains(&base) {
        return Err(RuntimeError::value_error("int() base must be >= 2 and <= 36, or 0"));
    }

    let trimmed = text.trim();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let lower = digits.to_ascii_lowercase();
    let (radix, digits) = match (base, lower.get(..2)) {
        (0 | 16, Some("0x")) => (16, &digits[2..]),
        (0 | 8, Some("0o")) => (8, &digits[2..]),
        (0 | 2, Some("0b")) => (2, &digits[2..]),
        (0, _) => (10, digits),
        (b, _) => (b as u32, digits),
    };

    if digits.is_empty()
        || digits.starts_with('_')
        || digits.ends_with('_')
        || digits.contains("__")
    {
        return Err(invalid());
    }
    let cleaned: String = digits.chars().filter(|&c| c != '_').collect();
    let magnitude = u64::from_str_radix(&cleaned, radix).map_err(|_| invalid())?;

    if negative {
        0i64.checked_sub_unsigned(magnitude)
            .ok_or_else(|| RuntimeError::overflow("integer result too large"))
    } else {
        i64::try_from(magnitude).map_err(|_| RuntimeError::overflow("integer result too large"))
    }
}

fn to_float(value: &Value) -> Result<Value, RuntimeError> {
    match value {
        Value::Float(x) => Ok(Value::Float(*x)),
        Value::Int(_) | Value::Bool(_) => Ok(Value::Float(value.as_float().unwrap_or_default())),
        Value::Str(s) => {
            let trimmed = s.trim();
            let lower = trimmed.to_ascii_lowercase();
            let unsigned = lower.trim_start_matches(['+', '-']);
            let parsed = match unsigned {
                "inf" | "infinity" | "nan" => lower.parse::<f64>().ok(),
                _ if unsigned.contains("inf") || unsigned.contains("nan") => None,
                _ if trimmed.contains('_') => None,
                _ => trimmed.parse::<f64>().ok(),
            };
            parsed.map(Value::Float).ok_or_else(|| {
                RuntimeError::value_error(format!(
                    "could not convert string to float: {}",
                    value.repr()
                ))
            })
        }
        other => Err(RuntimeError::type_error(format!(
            "float() argument must be a string or a real number, not '{}'",
            other.type_name()
        ))),
    }
}

/// `type(value)`
fn type_of(value: &Value) -> Value {
    let builtin = match value {
        Value::None => Builtin::TypeObject("NoneType"),
        Value::Bool(_) => Builtin::Bool,
        Value::Int(_) => Builtin::Int,
        Value::Float(_) => Builtin::Float,
        Value::Str(_) => Builtin::Str,
        Value::List(_) => Builtin::List,
        Value::Tuple(_) => Builtin::Tuple,
        Value::Dict(_) => Builtin::Dict,
        Value::Range(_) => Builtin::Range,
        Value::Function(_) => Builtin::TypeObject("function"),
        Value::Builtin(b) if b.is_type() => Builtin::Type,
        Value::Builtin(_) => Builtin::TypeObject("builtin_function_or_method"),
        Value::Class(_) => Builtin::Type,
        Value::Instance(instance) => return Value::Class(instance.class.clone()),
        Value::Method(_) => Builtin::TypeObject("method"),
        Value::Exception(exc) => Builtin::ExceptionType(exc.kind),
    };
    Value::Builtin(builtin)
}

/// `isinstance(value, class)` for a single class
fn is_instance(value: &Value, class: &Value) -> Result<bool, RuntimeError> {
    Ok(match class {
        Value::Class(class) => match value {
            Value::Instance(instance) => instance.class.is_subclass_of(class),
            _ => false,
        },
        Value::Builtin(builtin) => match builtin {
            Builtin::Object => true,
            Builtin::Int => matches!(value, Value::Int(_) | Value::Bool(_)),
            Builtin::Bool => matches!(value, Value::Bool(_)),
            Builtin::Float => matches!(value, Value::Float(_)),
            Builtin::Str => matches!(value, Value::Str(_)),
            Builtin::List => matches!(value, Value::List(_)),
            Builtin::Tuple => matches!(value, Value::Tuple(_)),
            Builtin::Dict => matches!(value, Value::Dict(_)),
            Builtin::Range => matches!(value, Value::Range(_)),
            Builtin::Type => matches!(value, Value::Class(_))
                || matches!(value, Value::Builtin(b) if b.is_type()),
            Builtin::ExceptionType(kind) => match value {
                Value::Exception(exc) => exc.kind.is_subkind_of(*kind),
                Value::Instance(instance) => instance
                    .class
                    .exception_base
                    .is_some_and(|base| base.is_subkind_of(*kind)),
                _ => false,
            },
            Builtin::TypeObject(name) => value.type_name() == *name,
            _ => {
                return Err(RuntimeError::type_error(
                    "isinstance() arg 2 must be a type, a tuple of types, or a union",
                ))
            }
        },
        _ => {
            return Err(RuntimeError::type_error(
                "isinstance() arg 2 must be a type, a tuple of types, or a union",
            ))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::context::{ExecutionContext, ExecutionLimits, NoopHook};
    use crate::parser;

    fn run_with_stdin(source: &str, stdin: &[&str]) -> (String, Result<(), RuntimeError>) {
        let program = parser::parse(source).unwrap();
        let ctx = ExecutionContext::new(NoopHook, ExecutionLimits::default())
            .with_stdin(stdin.iter().copied());
        let mut interp = Interpreter::new(ctx);
        let result = interp.run(&program);
        let (_, output) = interp.into_context().into_parts();
        (output.into_string(), result)
    }

    fn eval(expr: &str) -> String {
        let program = parser::parse(&format!("result = {}\n", expr)).unwrap();
        let mut interp = Interpreter::new(ExecutionContext::new(NoopHook, ExecutionLimits::default()));
        match interp.run(&program) {
            Ok(()) => interp.globals().get("result").map(Value::repr).unwrap_or_default(),
            Err(err) => err.to_string(),
        }
    }

    #[test]
    fn test_print_separators() {
        let (output, result) = run_with_stdin("print(1, 'a', [2])\nprint('x', 'y', sep='-', end='!')\n", &[]);
        assert!(result.is_ok());
        assert_eq!(output, "1 a [2]\nx-y!");
    }

    #[test]
    fn test_input_reads_queue_then_eof() {
        let (output, result) = run_with_stdin("name = input('Name? ')\nprint('hi', name)\ninput()\n", &["Ada"]);
        assert_eq!(output, "Name? hi Ada\n");
        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "EOFError: EOF when reading a line");
        assert_eq!(err.location().line, 3);
    }

    #[test]
    fn test_numeric_builtins() {
        assert_eq!(eval("abs(-3)"), "3");
        assert_eq!(eval("round(2.5)"), "2");
        assert_eq!(eval("round(3.5)"), "4");
        assert_eq!(eval("round(2.675, 2)"), "2.67");
        assert_eq!(eval("round(1234, -2)"), "1200");
        assert_eq!(eval("divmod(-7, 2)"), "(-4, 1)");
        assert_eq!(eval("pow(3, 4, 5)"), "1");
        assert_eq!(eval("sum([1, 2, 3], 10)"), "16");
        assert_eq!(eval("sum([0.5, 0.25])"), "0.75");
    }

    #[test]
    fn test_min_max() {
        assert_eq!(eval("max(3, 9, 2)"), "9");
        assert_eq!(eval("min([4, 1, 7])"), "1");
        assert_eq!(eval("max(['a', 'ccc', 'bb'], key=len)"), "'ccc'");
        assert_eq!(eval("min([], default=0)"), "0");
        assert_eq!(eval("max([])"), "ValueError: max() iterable argument is empty");
    }

    #[test]
    fn test_conversions() {
        assert_eq!(eval("int('  42 ')"), "42");
        assert_eq!(eval("int('-1_000')"), "-1000");
        assert_eq!(eval("int('ff', 16)"), "255");
        assert_eq!(eval("int(3.9)"), "3");
        assert_eq!(eval("int('abc')"), "ValueError: invalid literal for int() with base 10: 'abc'");
        assert_eq!(eval("float('2.5')"), "2.5");
        assert_eq!(eval("float('-inf')"), "-inf");
        assert_eq!(eval("float('x')"), "ValueError: could not convert string to float: 'x'");
        assert_eq!(eval("str(12)"), "'12'");
        assert_eq!(eval("bool('')"), "False");
        assert_eq!(eval("list('ab')"), "['a', 'b']");
        assert_eq!(eval("tuple([1])"), "(1,)");
        assert_eq!(eval("dict([('a', 1)], b=2)"), "{'a': 1, 'b': 2}");
    }

    #[test]
    fn test_sequence_builtins_return_lists() {
        assert_eq!(eval("reversed([1, 2, 3])"), "[3, 2, 1]");
        assert_eq!(eval("enumerate(['a', 'b'], 1)"), "[(1, 'a'), (2, 'b')]");
        assert_eq!(eval("zip([1, 2, 3], 'ab')"), "[(1, 'a'), (2, 'b')]");
        assert_eq!(eval("map(str, [1, 2])"), "['1', '2']");
        assert_eq!(eval("filter(None, [0, 1, '', 'x'])"), "[1, 'x']");
        assert_eq!(eval("len(range(0, 10, 3))"), "4");
    }

    #[test]
    fn test_type_and_isinstance() {
        assert_eq!(eval("type(1)"), "<class 'int'>");
        assert_eq!(eval("type(None)"), "<class 'NoneType'>");
        assert_eq!(eval("isinstance(True, int)"), "True");
        assert_eq!(eval("isinstance(1, (str, float))"), "False");
        assert_eq!(eval("isinstance(ValueError('x'), Exception)"), "True");
    }

    #[test]
    fn test_chr_ord() {
        assert_eq!(eval("chr(65)"), "'A'");
        assert_eq!(eval("ord('a')"), "97");
        assert_eq!(
            eval("ord('ab')"),
            "TypeError: ord() expected a character, but string of length 2 found"
        );
    }

    #[test]
    fn test_range_errors() {
        assert_eq!(eval("range(1, 2, 0)"), "ValueError: range() arg 3 must not be zero");
        assert_eq!(
            eval("range(1.5)"),
            "TypeError: 'float' object cannot be interpreted as an integer"
        );
        assert_eq!(eval("list(range(10 ** 9))"), "MemoryError");
    }

    #[test]
    fn test_len_errors() {
        assert_eq!(eval("len(5)"), "TypeError: object of type 'int' has no len()");
        assert_eq!(eval("len('héllo')"), "5");
    }
}
