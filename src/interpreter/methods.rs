//! Built-in methods of `list`, `dict` and `str`

use crate::interpreter::context::StepHook;
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::{ExceptionKind, RuntimeError};
use crate::interpreter::ops::binary::{check_collection_len, check_string_len};
use crate::interpreter::ops::compare::{less_than, values_equal};
use crate::memory::value::{Dict, HashKey, Value};

const LIST_METHODS: &[&str] = &[
    "append", "extend", "insert", "pop", "remove", "index", "count", "sort", "reverse", "clear",
    "copy",
];

const DICT_METHODS: &[&str] = &[
    "get", "keys", "values", "items", "pop", "update", "setdefault", "clear", "copy",
];

const STR_METHODS: &[&str] = &[
    "upper", "lower", "strip", "lstrip", "rstrip", "split", "join", "replace", "startswith",
    "endswith", "find", "index", "count", "title", "capitalize", "isdigit", "isalpha", "isalnum",
    "isspace", "isupper", "islower", "format", "ljust", "rjust", "center", "zfill",
];

/// The static name of a native method of `receiver`, if it has one called `name`
pub(crate) fn native_method(receiver: &Value, name: &str) -> Option<&'static str> {
    let table = match receiver {
        Value::List(_) => LIST_METHODS,
        Value::Dict(_) => DICT_METHODS,
        Value::Str(_) => STR_METHODS,
        _ => return None,
    };
    table.iter().find(|method| **method == name).copied()
}

/// Check a method's positional argument count
fn arity(name: &str, args: &[Value], min: usize, max: usize) -> Result<(), RuntimeError> {
    let given = args.len();
    if given >= min && given <= max {
        return Ok(());
    }
    let message = if min == max {
        match min {
            0 => format!("{}() takes no arguments ({} given)", name, given),
            1 => format!("{}() takes exactly one argument ({} given)", name, given),
            n => format!("{}() takes exactly {} arguments ({} given)", name, n, given),
        }
    } else if given < min {
        format!(
            "{} expected at least {} argument{}, got {}",
            name,
            min,
            if min == 1 { "" } else { "s" },
            given
        )
    } else {
        format!(
            "{} expected at most {} argument{}, got {}",
            name,
            max,
            if max == 1 { "" } else { "s" },
            given
        )
    };
    Err(RuntimeError::type_error(message))
}

fn expect_str<'a>(value: &'a Value, context: &str) -> Result<&'a str, RuntimeError> {
    value.as_str().ok_or_else(|| {
        RuntimeError::type_error(format!(
            "{} must be str, not {}",
            context,
            value.type_name()
        ))
    })
}

fn expect_int(value: &Value) -> Result<i64, RuntimeError> {
    match value {
        Value::Int(_) | Value::Bool(_) => Ok(value.as_int().unwrap_or_default()),
        other => Err(RuntimeError::type_error(format!(
            "'{}' object cannot be interpreted as an integer",
            other.type_name()
        ))),
    }
}

impl<H: StepHook> Interpreter<H> {
    /// Call a native method on its receiver
    pub(crate) fn call_method(
        &mut self,
        receiver: &Value,
        name: &str,
        args: Vec<Value>,
        kwargs: Vec<(String, Value)>,
    ) -> Result<Value, RuntimeError> {
        let takes_keywords = matches!((receiver, name), (Value::List(_), "sort") | (Value::Str(_), "format") | (Value::Dict(_), "update"));
        if !kwargs.is_empty() && !takes_keywords {
            return Err(RuntimeError::type_error(format!(
                "{}.{}() takes no keyword arguments",
                receiver.type_name(),
                name
            )));
        }

        match receiver {
            Value::List(_) => self.call_list_method(receiver, name, args, kwargs),
            Value::Dict(_) => self.call_dict_method(receiver, name, args, kwargs),
            Value::Str(s) => self.call_str_method(s, name, args, kwargs),
            other => Err(RuntimeError::attribute_error(format!(
                "'{}' object has no attribute '{}'",
                other.type_name(),
                name
            ))),
        }
    }

    fn call_list_method(
        &mut self,
        receiver: &Value,
        name: &str,
        args: Vec<Value>,
        kwargs: Vec<(String, Value)>,
    ) -> Result<Value, RuntimeError> {
        let Value::List(list) = receiver else {
            return Err(RuntimeError::type_error("expected a list"));
        };

        match name {
            "append" => {
                arity("list.append", &args, 1, 1)?;
                check_collection_len(list.borrow().len() + 1)?;
                list.borrow_mut().extend(args);
                Ok(Value::None)
            }
            "extend" => {
                arity("list.extend", &args, 1, 1)?;
                let extra = self.iterate(&args[0])?;
                check_collection_len(list.borrow().len() + extra.len())?;
                list.borrow_mut().extend(extra);
                Ok(Value::None)
            }
            "insert" => {
                arity("insert", &args, 2, 2)?;
                let index = expect_int(&args[0])?;
                let mut items = list.borrow_mut();
                let len = items.len() as i64;
                let position = if index < 0 { (index + len).max(0) } else { index.min(len) };
                items.insert(position as usize, args[1].clone());
                Ok(Value::None)
            }
            "pop" => {
                arity("pop", &args, 0, 1)?;
                let mut items = list.borrow_mut();
                if items.is_empty() {
                    return Err(RuntimeError::index_error("pop from empty list"));
                }
                let len = items.len() as i64;
                let index = match args.first() {
                    Some(value) => expect_int(value)?,
                    None => -1,
                };
                let position = if index < 0 { index + len } else { index };
                if !(0..len).contains(&position) {
                    return Err(RuntimeError::index_error("pop index out of range"));
                }
                Ok(items.remove(position as usize))
            }
            "remove" => {
                arity("list.remove", &args, 1, 1)?;
                let position = list.borrow().iter().position(|x| values_equal(x, &args[0]));
                match position {
                    Some(position) => {
                        list.borrow_mut().remove(position);
                        Ok(Value::None)
                    }
                    None => Err(RuntimeError::value_error("list.remove(x): x not in list")),
                }
            }
            "index" => {
                arity("index", &args, 1, 1)?;
                let position = list.borrow().iter().position(|x| values_equal(x, &args[0]));
                match position {
                    Some(position) => Ok(Value::Int(position as i64)),
                    None => Err(RuntimeError::value_error(format!(
                        "{} is not in list",
                        self.repr_value(&args[0])?
                    ))),
                }
            }
            "count" => {
                arity("list.count", &args, 1, 1)?;
                let count = list.borrow().iter().filter(|x| values_equal(x, &args[0])).count();
                Ok(Value::Int(count as i64))
            }
            "sort" => {
                if !args.is_empty() {
                    return Err(RuntimeError::type_error("sort() takes no positional arguments"));
                }
                let (key, reverse) = sort_options(kwargs)?;
                let items = list.borrow().clone();
                let sorted = self.sort_values(items, key.as_ref(), reverse)?;
                *list.borrow_mut() = sorted;
                Ok(Value::None)
            }
            "reverse" => {
                arity("list.reverse", &args, 0, 0)?;
                list.borrow_mut().reverse();
                Ok(Value::None)
            }
            "clear" => {
                arity("list.clear", &args, 0, 0)?;
                list.borrow_mut().clear();
                Ok(Value::None)
            }
            "copy" => {
                arity("list.copy", &args, 0, 0)?;
                Ok(Value::list(list.borrow().clone()))
            }
            other => Err(RuntimeError::attribute_error(format!(
                "'list' object has no attribute '{}'",
                other
            ))),
        }
    }

    fn call_dict_method(
        &mut self,
        receiver: &Value,
        name: &str,
        args: Vec<Value>,
        kwargs: Vec<(String, Value)>,
    ) -> Result<Value, RuntimeError> {
        let Value::Dict(dict) = receiver else {
            return Err(RuntimeError::type_error("expected a dict"));
        };

        match name {
            "get" => {
                arity("get", &args, 1, 2)?;
                let key = HashKey::from_value(&args[0])?;
                let found = dict.borrow().get(&key).cloned();
                Ok(found.unwrap_or_else(|| args.get(1).cloned().unwrap_or_default()))
            }
            "keys" => {
                arity("dict.keys", &args, 0, 0)?;
                Ok(Value::list(dict.borrow().keys().cloned().collect()))
            }
            "values" => {
                arity("dict.values", &args, 0, 0)?;
                Ok(Value::list(dict.borrow().values().cloned().collect()))
            }
            "items" => {
                arity("dict.items", &args, 0, 0)?;
                let items = dict
                    .borrow()
                    .items()
                    .map(|(k, v)| Value::tuple(vec![k.clone(), v.clone()]))
                    .collect();
                Ok(Value::list(items))
            }
            "pop" => {
                arity("pop", &args, 1, 2)?;
                let key = HashKey::from_value(&args[0])?;
                let removed = dict.borrow_mut().remove(&key);
                match (removed, args.get(1)) {
                    (Some((_, value)), _) => Ok(value),
                    (None, Some(default)) => Ok(default.clone()),
                    (None, None) => Err(RuntimeError::new(
                        ExceptionKind::KeyError,
                        self.repr_value(&args[0])?,
                    )),
                }
            }
            "update" => {
                arity("update", &args, 0, 1)?;
                if let Some(other) = args.first() {
                    let entries = self.dict_entries(other)?;
                    let mut target = dict.borrow_mut();
                    for (key, value) in entries {
                        target.insert(HashKey::from_value(&key)?, key, value);
                    }
                }
                let mut target = dict.borrow_mut();
                for (key, value) in kwargs {
                    target.insert(HashKey::Str(key.as_str().into()), Value::str(&key), value);
                }
                Ok(Value::None)
            }
            "setdefault" => {
                arity("setdefault", &args, 1, 2)?;
                let key = HashKey::from_value(&args[0])?;
                let existing = dict.borrow().get(&key).cloned();
                match existing {
                    Some(value) => Ok(value),
                    None => {
                        let default = args.get(1).cloned().unwrap_or_default();
                        dict.borrow_mut().insert(key, args[0].clone(), default.clone());
                        Ok(default)
                    }
                }
            }
            "clear" => {
                arity("dict.clear", &args, 0, 0)?;
                dict.borrow_mut().clear();
                Ok(Value::None)
            }
            "copy" => {
                arity("dict.copy", &args, 0, 0)?;
                Ok(Value::dict(dict.borrow().clone()))
            }
            other => Err(RuntimeError::attribute_error(format!(
                "'dict' object has no attribute '{}'",
                other
            ))),
        }
    }

    /// Key/value pairs from a dict or an iterable of pairs
    pub(crate) fn dict_entries(&mut self, source: &Value) -> Result<Vec<(Value, Value)>, RuntimeError> {
        if let Value::Dict(dict) = source {
            return Ok(dict
                .borrow()
                .items()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect());
        }

        let mut entries = Vec::new();
        for (index, item) in self.iterate(source)?.into_iter().enumerate() {
            let pair = match &item {
                Value::List(_) | Value::Tuple(_) | Value::Str(_) => self.iterate(&item)?,
                _ => {
                    return Err(RuntimeError::type_error(format!(
                        "cannot convert dictionary update sequence element #{} to a sequence",
                        index
                    )))
                }
            };
            match <[Value; 2]>::try_from(pair) {
                Ok([key, value]) => entries.push((key, value)),
                Err(pair) => {
                    return Err(RuntimeError::value_error(format!(
                        "dictionary update sequence element #{} has length {}; 2 is required",
                        index,
                        pair.len()
                    )))
                }
            }
        }
        Ok(entries)
    }

    fn call_str_method(
        &mut self,
        s: &str,
        name: &str,
        args: Vec<Value>,
        kwargs: Vec<(String, Value)>,
    ) -> Result<Value, RuntimeError> {
        let text = |t: String| -> Result<Value, RuntimeError> { Ok(Value::str(&t)) };
        let flag = |b: bool| -> Result<Value, RuntimeError> { Ok(Value::Bool(b)) };

        match name {
            "upper" => {
                arity("str.upper", &args, 0, 0)?;
                text(s.to_uppercase())
            }
            "lower" => {
                arity("str.lower", &args, 0, 0)?;
                text(s.to_lowercase())
            }
            "strip" | "lstrip" | "rstrip" => {
                arity(name, &args, 0, 1)?;
                let chars: Option<Vec<char>> = match args.first() {
                    None | Some(Value::None) => None,
                    Some(value) => Some(expect_str(value, "strip arg")?.chars().collect()),
                };
                let matches = |c: char| match &chars {
                    Some(set) => set.contains(&c),
                    None => c.is_whitespace(),
                };
                let stripped = match name {
                    "strip" => s.trim_matches(matches),
                    "lstrip" => s.trim_start_matches(matches),
                    _ => s.trim_end_matches(matches),
                };
                text(stripped.to_string())
            }
            "split" => {
                arity("split", &args, 0, 2)?;
                let limit = match args.get(1) {
                    Some(value) => expect_int(value)?,
                    None => -1,
                };
                let parts: Vec<Value> = match args.first() {
                    None | Some(Value::None) => split_whitespace(s, limit),
                    Some(value) => {
                        let separator = expect_str(value, "separator")?;
                        if separator.is_empty() {
                            return Err(RuntimeError::value_error("empty separator"));
                        }
                        if limit < 0 {
                            s.split(separator).map(Value::str).collect()
                        } else {
                            s.splitn(limit as usize + 1, separator).map(Value::str).collect()
                        }
                    }
                };
                Ok(Value::list(parts))
            }
            "join" => {
                arity("str.join", &args, 1, 1)?;
                let items = self.iterate(&args[0])?;
                let mut pieces = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    match item {
                        Value::Str(piece) => pieces.push(piece.to_string()),
                        other => {
                            return Err(RuntimeError::type_error(format!(
                                "sequence item {}: expected str instance, {} found",
                                index,
                                other.type_name()
                            )))
                        }
                    }
                }
                let joined = pieces.join(s);
                check_string_len(joined.len())?;
                text(joined)
            }
            "replace" => {
                arity("replace", &args, 2, 3)?;
                let old = expect_str(&args[0], "replace() argument 1")?;
                let new = expect_str(&args[1], "replace() argument 2")?;
                let replaced = match args.get(2) {
                    Some(count) if expect_int(count)? >= 0 => {
                        s.replacen(old, new, expect_int(count)? as usize)
                    }
                    _ => s.replace(old, new),
                };
                check_string_len(replaced.len())?;
                text(replaced)
            }
            "startswith" | "endswith" => {
                arity(name, &args, 1, 1)?;
                let candidates: Vec<Value> = match &args[0] {
                    Value::Tuple(items) => items.to_vec(),
                    other => vec![other.clone()],
                };
                let mut found = false;
                for candidate in &candidates {
                    let affix = candidate.as_str().ok_or_else(|| {
                        RuntimeError::type_error(format!(
                            "{} first arg must be str or a tuple of str, not {}",
                            name,
                            candidate.type_name()
                        ))
                    })?;
                    found |= if name == "startswith" {
                        s.starts_with(affix)
                    } else {
                        s.ends_with(affix)
                    };
                }
                flag(found)
            }
            "find" | "index" => {
                arity(name, &args, 1, 1)?;
                let needle = expect_str(&args[0], "must be str")?;
                match s.find(needle) {
                    Some(byte) => Ok(Value::Int(s[..byte].chars().count() as i64)),
                    None if name == "find" => Ok(Value::Int(-1)),
                    None => Err(RuntimeError::value_error("substring not found")),
                }
            }
            "count" => {
                arity("count", &args, 1, 1)?;
                let needle = expect_str(&args[0], "must be str")?;
                let count = if needle.is_empty() {
                    s.chars().count() + 1
                } else {
                    s.matches(needle).count()
                };
                Ok(Value::Int(count as i64))
            }
            "title" => {
                arity("str.title", &args, 0, 0)?;
                let mut out = String::with_capacity(s.len());
                let mut previous_cased = false;
                for c in s.chars() {
                    if previous_cased {
                        out.extend(c.to_lowercase());
                    } else {
                        out.extend(c.to_uppercase());
                    }
                    previous_cased = c.is_alphabetic();
                }
                text(out)
            }
            "capitalize" => {
                arity("str.capitalize", &args, 0, 0)?;
                let mut chars = s.chars();
                let out = match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars.as_str().to_lowercase().chars()).collect(),
                    None => String::new(),
                };
                text(out)
            }
            "isdigit" => flag(!s.is_empty() && s.chars().all(|c| c.is_ascii_digit())),
            "isalpha" => flag(!s.is_empty() && s.chars().all(char::is_alphabetic)),
            "isalnum" => flag(!s.is_empty() && s.chars().all(char::is_alphanumeric)),
            "isspace" => flag(!s.is_empty() && s.chars().all(char::is_whitespace)),
            "isupper" => flag(
                s.chars().any(char::is_alphabetic)
                    && !s.chars().any(char::is_lowercase),
            ),
            "islower" => flag(
                s.chars().any(char::is_alphabetic)
                    && !s.chars().any(char::is_uppercase),
            ),
            "format" => {
                let formatted = self.str_format(s, &args, &kwargs)?;
                text(formatted)
            }
            "ljust" | "rjust" | "center" => {
                arity(name, &args, 1, 2)?;
                let width = expect_int(&args[0])?.max(0) as usize;
                let fill = match args.get(1) {
                    Some(value) => {
                        let fill = expect_str(value, "fill character")?;
                        let mut chars = fill.chars();
                        match (chars.next(), chars.next()) {
                            (Some(c), None) => c,
                            _ => {
                                return Err(RuntimeError::type_error(
                                    "The fill character must be exactly one character long",
                                ))
                            }
                        }
                    }
                    None => ' ',
                };
                let len = s.chars().count();
                if len >= width {
                    return text(s.to_string());
                }
                check_string_len(width)?;
                let padding = width - len;
                let (left, right) = match name {
                    "ljust" => (0, padding),
                    "rjust" => (padding, 0),
                    // Odd padding with an odd width puts the extra fill on the left
                    _ => {
                        let left = padding / 2 + (padding & width & 1);
                        (left, padding - left)
                    }
                };
                let fill = fill.to_string();
                text(format!("{}{}{}", fill.repeat(left), s, fill.repeat(right)))
            }
            "zfill" => {
                arity("zfill", &args, 1, 1)?;
                let width = expect_int(&args[0])?.max(0) as usize;
                let len = s.chars().count();
                if len >= width {
                    return text(s.to_string());
                }
                check_string_len(width)?;
                let zeros = "0".repeat(width - len);
                let out = match s.strip_prefix(['+', '-']) {
                    Some(rest) => format!("{}{}{}", &s[..1], zeros, rest),
                    None => format!("{}{}", zeros, s),
                };
                text(out)
            }
            other => Err(RuntimeError::attribute_error(format!(
                "'str' object has no attribute '{}'",
                other
            ))),
        }
    }
}

fn split_whitespace(s: &str, limit: i64) -> Vec<Value> {
    if limit < 0 {
        return s.split_whitespace().map(Value::str).collect();
    }
    let mut parts = Vec::new();
    let mut rest = s.trim_start();
    while !rest.is_empty() {
        if parts.len() as i64 == limit {
            parts.push(Value::str(rest));
            break;
        }
        match rest.find(char::is_whitespace) {
            Some(end) => {
                parts.push(Value::str(&rest[..end]));
                rest = rest[end..].trim_start();
            }
            None => {
                parts.push(Value::str(rest));
                break;
            }
        }
    }
    parts
}

/// `key=` and `reverse=` of `sorted()` and `list.sort()`
pub(crate) fn sort_options(kwargs: Vec<(String, Value)>) -> Result<(Option<Value>, bool), RuntimeError> {
    let mut key = None;
    let mut reverse = false;
    for (name, value) in kwargs {
        match name.as_str() {
            "key" => key = (!matches!(value, Value::None)).then_some(value),
            "reverse" => reverse = value.is_truthy(),
            other => {
                return Err(RuntimeError::type_error(format!(
                    "'{}' is an invalid keyword argument for sort()",
                    other
                )))
            }
        }
    }
    Ok((key, reverse))
}

impl<H: StepHook> Interpreter<H> {
    /// Stable sort by `<`, optionally through a key function
    pub(crate) fn sort_values(
        &mut self,
        items: Vec<Value>,
        key: Option<&Value>,
        reverse: bool,
    ) -> Result<Vec<Value>, RuntimeError> {
        let mut keyed = Vec::with_capacity(items.len());
        for item in items {
            let sort_key = match key {
                Some(function) => self.call_value(function, vec![item.clone()], Vec::new())?,
                None => item.clone(),
            };
            keyed.push((sort_key, item));
        }

        // Reversing before and after a stable sort keeps equal elements in order
        if reverse {
            keyed.reverse();
        }
        let mut sorted = merge_sort(keyed, &mut less_than)?;
        if reverse {
            sorted.reverse();
        }
        Ok(sorted.into_iter().map(|(_, item)| item).collect())
    }
}

/// Stable merge sort with a fallible `less than`
fn merge_sort<F>(items: Vec<(Value, Value)>, less: &mut F) -> Result<Vec<(Value, Value)>, RuntimeError>
where
    F: FnMut(&Value, &Value) -> Result<bool, RuntimeError>,
{
    if items.len() <= 1 {
        return Ok(items);
    }
    let mut left = items;
    let right = left.split_off(left.len() / 2);
    let left = merge_sort(left, less)?;
    let right = merge_sort(right, less)?;

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    loop {
        let take_right = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => less(&r.0, &l.0)?,
            (Some(_), None) => false,
            (None, Some(_)) => true,
            (None, None) => break,
        };
        let next = if take_right { right.next() } else { left.next() };
        merged.extend(next);
    }
    Ok(merged)
}

/// Build a dict value from key/value pairs
pub(crate) fn dict_from_entries(entries: Vec<(Value, Value)>) -> Result<Value, RuntimeError> {
    let mut dict = Dict::new();
    for (key, value) in entries {
        dict.insert(HashKey::from_value(&key)?, key, value);
    }
    Ok(Value::dict(dict))
}

#[cfg(test)]
mod tests {
    use crate::interpreter::context::{ExecutionContext, ExecutionLimits, NoopHook};
    use crate::interpreter::engine::Interpreter;
    use crate::memory::value::Value;
    use crate::parser;

    fn eval(expr: &str) -> String {
        let program = parser::parse(&format!("result = {}\n", expr)).unwrap();
        let mut interp = Interpreter::new(ExecutionContext::new(NoopHook, ExecutionLimits::default()));
        match interp.run(&program) {
            Ok(()) => interp.globals().get("result").map(Value::repr).unwrap_or_default(),
            Err(err) => err.to_string(),
        }
    }

    #[test]
    fn test_list_methods() {
        assert_eq!(eval("[3, 1, 2].copy()"), "[3, 1, 2]");
        assert_eq!(eval("[1, 2, 3].pop()"), "3");
        assert_eq!(eval("[1, 2, 3].index(2)"), "1");
        assert_eq!(eval("[].pop()"), "IndexError: pop from empty list");
        assert_eq!(eval("[1].remove(5)"), "ValueError: list.remove(x): x not in list");
        assert_eq!(eval("[1, 2].index(9)"), "ValueError: 9 is not in list");
        assert_eq!(eval("[1, 1, 2].count(1)"), "2");
    }

    #[test]
    fn test_sorting() {
        assert_eq!(eval("sorted([3, 1, 2])"), "[1, 2, 3]");
        assert_eq!(eval("sorted(['bb', 'a', 'ccc'], key=len, reverse=True)"), "['ccc', 'bb', 'a']");
        assert_eq!(
            eval("sorted([(1, 'b'), (0, 'z'), (1, 'a')])"),
            "[(0, 'z'), (1, 'a'), (1, 'b')]"
        );
        assert_eq!(
            eval("sorted([1, 'a'])"),
            "TypeError: '<' not supported between instances of 'str' and 'int'"
        );
    }

    #[test]
    fn test_dict_methods() {
        assert_eq!(eval("{'a': 1}.get('b', 0)"), "0");
        assert_eq!(eval("{'a': 1, 'b': 2}.items()"), "[('a', 1), ('b', 2)]");
        assert_eq!(eval("{'a': 1}.pop('z')"), "KeyError: 'z'");
        assert_eq!(eval("{'a': 1}.setdefault('b', [])"), "[]");
    }

    #[test]
    fn test_str_methods() {
        assert_eq!(eval("'  hi  '.strip()"), "'hi'");
        assert_eq!(eval("'a,b,,c'.split(',')"), "['a', 'b', '', 'c']");
        assert_eq!(eval("'  a  b '.split()"), "['a', 'b']");
        assert_eq!(eval("'a b c'.split(None, 1)"), "['a', 'b c']");
        assert_eq!(eval("'-'.join(['x', 'y'])"), "'x-y'");
        assert_eq!(eval("'-'.join([1])"), "TypeError: sequence item 0: expected str instance, int found");
        assert_eq!(eval("'hello world'.title()"), "'Hello World'");
        assert_eq!(eval("'héllo'.find('l')"), "2");
        assert_eq!(eval("'42'.zfill(5)"), "'00042'");
        assert_eq!(eval("'-42'.zfill(5)"), "'-0042'");
        assert_eq!(eval("'ab'.center(5, '*')"), "'**ab*'");
        assert_eq!(eval("'{} + {} = {total}'.format(1, 2, total=3)"), "'1 + 2 = 3'");
        assert_eq!(eval("'ABC'.isupper()"), "True");
    }

    #[test]
    fn test_keyword_arguments_rejected() {
        assert_eq!(
            eval("[].append(x=1)"),
            "TypeError: list.append() takes no keyword arguments"
        );
    }
}
