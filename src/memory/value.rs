//! Runtime value representation
//!
//! This module defines the [`Value`] enum, which represents all possible runtime values
//! of the guest language. Scalars are stored inline; containers and objects are
//! reference-counted so that aliasing (`b = a; b.append(1)`) behaves as learners
//! expect, and mutable containers sit behind a [`RefCell`].
//!
//! # Value Types
//!
//! - [`Value::None`], [`Value::Bool`], [`Value::Int`] (64-bit), [`Value::Float`]
//! - [`Value::Str`]: immutable text
//! - [`Value::List`], [`Value::Dict`]: shared, mutable containers
//! - [`Value::Tuple`], [`Value::Range`]: immutable sequences
//! - [`Value::Function`], [`Value::Builtin`], [`Value::Method`]: callables
//! - [`Value::Class`], [`Value::Instance`]: user-defined types and their objects
//! - [`Value::Exception`]: an instance of a built-in exception type
//!
//! # Printable forms
//!
//! [`repr_with`] and [`str_with`] produce Python-compatible printable text. They
//! detect reference cycles (`[[...]]`) and are parameterised by a [`ReprHook`]
//! that decides how user-defined instances print. [`Value::repr`] uses the
//! built-in object form and never runs guest code.

use crate::interpreter::errors::{ExceptionKind, RuntimeError};
use crate::parser::ast::FunctionDecl;
use indexmap::IndexMap;
use rustc_hash::{FxBuildHasher, FxHashMap, FxHashSet};
use std::cell::RefCell;
use std::convert::Infallible;
use std::fmt::{self, Write as _};
use std::rc::Rc;

/// Nesting depth at which printable conversion stops descending
pub const MAX_FORMAT_DEPTH: usize = 200;

pub type ListRef = Rc<RefCell<Vec<Value>>>;
pub type DictRef = Rc<RefCell<Dict>>;

/// Runtime values in the interpreter
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    List(ListRef),
    Tuple(Rc<Vec<Value>>),
    Dict(DictRef),
    Range(RangeValue),
    Function(Rc<Function>),
    Builtin(Builtin),
    Class(Rc<Class>),
    Instance(Rc<Instance>),
    Method(Rc<Method>),
    Exception(Rc<ExceptionValue>),
}

/// A lazily evaluated `range(start, stop, step)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeValue {
    pub start: i64,
    pub stop: i64,
    pub step: i64,
}

impl RangeValue {
    pub fn len(&self) -> usize {
        let span = if self.step > 0 {
            (self.stop as i128 - self.start as i128 + self.step as i128 - 1) / self.step as i128
        } else {
            (self.start as i128 - self.stop as i128 - self.step as i128 - 1) / (-(self.step as i128))
        };
        span.max(0) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The `index`-th element, assuming `index < len()`
    pub fn get(&self, index: usize) -> i64 {
        // In range for any valid index, even when `index * step` alone is not
        (self.start as i128 + index as i128 * self.step as i128) as i64
    }

    pub fn contains(&self, n: i64) -> bool {
        let in_bounds = if self.step > 0 {
            n >= self.start && n < self.stop
        } else {
            n <= self.start && n > self.stop
        };
        in_bounds && (n as i128 - self.start as i128) % self.step as i128 == 0
    }
}

/// The integer part of `x`, or `None` when it does not fit an `i64`
pub fn float_to_int(x: f64) -> Option<i64> {
    let truncated = x.trunc();
    // 2^63 is exact as an f64; NaN fails both comparisons
    (truncated >= -9_223_372_036_854_775_808.0 && truncated < 9_223_372_036_854_775_808.0)
        .then_some(truncated as i64)
}

/// A user-defined function with its evaluated defaults
#[derive(Debug)]
pub struct Function {
    pub decl: Rc<FunctionDecl>,
    /// Default values of the trailing parameters that declare one
    pub defaults: Vec<Value>,
    /// `Class.method` for methods, plain name otherwise
    pub qualname: String,
    /// Names bound anywhere in the body (parameters included)
    pub local_names: FxHashSet<String>,
    /// Names the body declares `global`
    pub global_names: FxHashSet<String>,
}

/// A user-defined class
#[derive(Debug)]
pub struct Class {
    pub name: String,
    pub base: Option<Rc<Class>>,
    /// Built-in exception type at the root of the class's ancestry, if any
    pub exception_base: Option<ExceptionKind>,
    pub namespace: RefCell<FxHashMap<String, Value>>,
}

impl Class {
    /// Look up an attribute on this class or its bases
    pub fn lookup(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.namespace.borrow().get(name) {
            return Some(value.clone());
        }
        self.base.as_ref().and_then(|base| base.lookup(name))
    }

    pub fn is_subclass_of(self: &Rc<Self>, other: &Rc<Class>) -> bool {
        let mut current = Some(self.clone());
        while let Some(class) = current {
            if Rc::ptr_eq(&class, other) {
                return true;
            }
            current = class.base.clone();
        }
        false
    }

    pub fn is_exception(&self) -> bool {
        self.exception_base.is_some()
    }
}

/// An object created by calling a class
#[derive(Debug)]
pub struct Instance {
    pub class: Rc<Class>,
    pub attributes: RefCell<FxHashMap<String, Value>>,
}

/// A callable bound to its receiver
#[derive(Debug)]
pub enum Method {
    /// A user-defined method looked up through an instance
    Bound {
        receiver: Value,
        function: Rc<Function>,
    },
    /// A built-in method of a list, dict or str
    Native {
        receiver: Value,
        name: &'static str,
    },
}

/// An instance of a built-in exception type
#[derive(Debug)]
pub struct ExceptionValue {
    pub kind: ExceptionKind,
    pub args: Vec<Value>,
}

/// Built-in functions and types reachable by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Print,
    Input,
    Len,
    Repr,
    Abs,
    Min,
    Max,
    Sum,
    Sorted,
    Reversed,
    Enumerate,
    Zip,
    Map,
    Filter,
    Any,
    All,
    Round,
    Divmod,
    Pow,
    Chr,
    Ord,
    Isinstance,
    // Types that are also constructors
    Type,
    Object,
    Str,
    Int,
    Float,
    Bool,
    List,
    Tuple,
    Dict,
    Range,
    ExceptionType(ExceptionKind),
    /// A type object with no constructor (`type(None)`, `type(len)`)
    TypeObject(&'static str),
}

impl Builtin {
    const NAMED: [Builtin; 32] = [
        Builtin::Print,
        Builtin::Input,
        Builtin::Len,
        Builtin::Repr,
        Builtin::Abs,
        Builtin::Min,
        Builtin::Max,
        Builtin::Sum,
        Builtin::Sorted,
        Builtin::Reversed,
        Builtin::Enumerate,
        Builtin::Zip,
        Builtin::Map,
        Builtin::Filter,
        Builtin::Any,
        Builtin::All,
        Builtin::Round,
        Builtin::Divmod,
        Builtin::Pow,
        Builtin::Chr,
        Builtin::Ord,
        Builtin::Isinstance,
        Builtin::Type,
        Builtin::Object,
        Builtin::Str,
        Builtin::Int,
        Builtin::Float,
        Builtin::Bool,
        Builtin::List,
        Builtin::Tuple,
        Builtin::Dict,
        Builtin::Range,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Print => "print",
            Builtin::Input => "input",
            Builtin::Len => "len",
            Builtin::Repr => "repr",
            Builtin::Abs => "abs",
            Builtin::Min => "min",
            Builtin::Max => "max",
            Builtin::Sum => "sum",
            Builtin::Sorted => "sorted",
            Builtin::Reversed => "reversed",
            Builtin::Enumerate => "enumerate",
            Builtin::Zip => "zip",
            Builtin::Map => "map",
            Builtin::Filter => "filter",
            Builtin::Any => "any",
            Builtin::All => "all",
            Builtin::Round => "round",
            Builtin::Divmod => "divmod",
            Builtin::Pow => "pow",
            Builtin::Chr => "chr",
            Builtin::Ord => "ord",
            Builtin::Isinstance => "isinstance",
            Builtin::Type => "type",
            Builtin::Object => "object",
            Builtin::Str => "str",
            Builtin::Int => "int",
            Builtin::Float => "float",
            Builtin::Bool => "bool",
            Builtin::List => "list",
            Builtin::Tuple => "tuple",
            Builtin::Dict => "dict",
            Builtin::Range => "range",
            Builtin::ExceptionType(kind) => kind.name(),
            Builtin::TypeObject(name) => name,
        }
    }

    /// Resolve a global name to a built-in
    pub fn from_name(name: &str) -> Option<Builtin> {
        Self::NAMED
            .into_iter()
            .find(|b| b.name() == name)
            .or_else(|| ExceptionKind::from_name(name).map(Builtin::ExceptionType))
    }

    /// Whether this built-in is a type object (prints as `<class '...'>`)
    pub fn is_type(self) -> bool {
        matches!(
            self,
            Builtin::Type
                | Builtin::Object
                | Builtin::Str
                | Builtin::Int
                | Builtin::Float
                | Builtin::Bool
                | Builtin::List
                | Builtin::Tuple
                | Builtin::Dict
                | Builtin::Range
                | Builtin::ExceptionType(_)
                | Builtin::TypeObject(_)
        )
    }
}

/// Dictionary key: the hashable projection of a value
///
/// Numbers that compare equal hash equal (`1`, `1.0` and `True` are one key).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HashKey {
    None,
    Int(i64),
    Float(u64),
    Str(Rc<str>),
    Tuple(Vec<HashKey>),
    Range(i64, i64, i64),
    Builtin(Builtin),
    Identity(usize),
}

impl HashKey {
    pub fn from_value(value: &Value) -> Result<HashKey, RuntimeError> {
        Ok(match value {
            Value::None => HashKey::None,
            Value::Bool(b) => HashKey::Int(*b as i64),
            Value::Int(n) => HashKey::Int(*n),
            Value::Float(x) => {
                if x.fract() == 0.0 && x.abs() < 9.2e18 {
                    HashKey::Int(*x as i64)
                } else {
                    HashKey::Float(x.to_bits())
                }
            }
            Value::Str(s) => HashKey::Str(s.clone()),
            Value::Tuple(items) => HashKey::Tuple(
                items
                    .iter()
                    .map(HashKey::from_value)
                    .collect::<Result<_, _>>()?,
            ),
            Value::Range(r) => HashKey::Range(r.start, r.stop, r.step),
            Value::Builtin(b) => HashKey::Builtin(*b),
            Value::List(_) | Value::Dict(_) => {
                return Err(RuntimeError::type_error(format!(
                    "unhashable type: '{}'",
                    value.type_name()
                )))
            }
            Value::Function(_)
            | Value::Class(_)
            | Value::Instance(_)
            | Value::Method(_)
            | Value::Exception(_) => HashKey::Identity(value.identity().unwrap_or_default()),
        })
    }
}

/// Insertion-ordered dictionary storing each entry's original key
#[derive(Debug, Clone, Default)]
pub struct Dict {
    entries: IndexMap<HashKey, (Value, Value), FxBuildHasher>,
}

impl Dict {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &HashKey) -> Option<&Value> {
        self.entries.get(key).map(|(_, v)| v)
    }

    pub fn contains(&self, key: &HashKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert or update; an existing entry keeps its position and original key
    pub fn insert(&mut self, hash: HashKey, key: Value, value: Value) {
        match self.entries.get_mut(&hash) {
            Some(entry) => entry.1 = value,
            None => {
                self.entries.insert(hash, (key, value));
            }
        }
    }

    pub fn remove(&mut self, key: &HashKey) -> Option<(Value, Value)> {
        self.entries.shift_remove(key)
    }

    pub fn pop_last(&mut self) -> Option<(Value, Value)> {
        self.entries.pop().map(|(_, entry)| entry)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.entries.values().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.values().map(|(_, v)| v)
    }

    pub fn items(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.values().map(|(k, v)| (k, v))
    }
}

impl Value {
    pub fn str(text: &str) -> Value {
        Value::Str(Rc::from(text))
    }

    pub fn list(items: Vec<Value>) -> Value {
        Value::List(Rc::new(RefCell::new(items)))
    }

    pub fn tuple(items: Vec<Value>) -> Value {
        Value::Tuple(Rc::new(items))
    }

    pub fn dict(dict: Dict) -> Value {
        Value::Dict(Rc::new(RefCell::new(dict)))
    }

    /// Python's `type(value).__name__`
    pub fn type_name(&self) -> String {
        match self {
            Value::None => "NoneType".to_string(),
            Value::Bool(_) => "bool".to_string(),
            Value::Int(_) => "int".to_string(),
            Value::Float(_) => "float".to_string(),
            Value::Str(_) => "str".to_string(),
            Value::List(_) => "list".to_string(),
            Value::Tuple(_) => "tuple".to_string(),
            Value::Dict(_) => "dict".to_string(),
            Value::Range(_) => "range".to_string(),
            Value::Function(_) => "function".to_string(),
            Value::Builtin(b) if b.is_type() => "type".to_string(),
            Value::Builtin(_) => "builtin_function_or_method".to_string(),
            Value::Class(_) => "type".to_string(),
            Value::Instance(instance) => instance.class.name.clone(),
            Value::Method(method) => match method.as_ref() {
                Method::Bound { .. } => "method".to_string(),
                Method::Native { .. } => "builtin_function_or_method".to_string(),
            },
            Value::Exception(exc) => exc.kind.name().to_string(),
        }
    }

    /// Python truthiness
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(x) => *x != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.borrow().is_empty(),
            Value::Tuple(items) => !items.is_empty(),
            Value::Dict(dict) => !dict.borrow().is_empty(),
            Value::Range(r) => !r.is_empty(),
            _ => true,
        }
    }

    /// Address of the shared allocation behind reference values
    pub fn identity(&self) -> Option<usize> {
        match self {
            Value::Str(s) => Some(Rc::as_ptr(s) as *const u8 as usize),
            Value::List(items) => Some(Rc::as_ptr(items) as usize),
            Value::Tuple(items) => Some(Rc::as_ptr(items) as usize),
            Value::Dict(dict) => Some(Rc::as_ptr(dict) as usize),
            Value::Function(f) => Some(Rc::as_ptr(f) as usize),
            Value::Class(c) => Some(Rc::as_ptr(c) as usize),
            Value::Instance(i) => Some(Rc::as_ptr(i) as usize),
            Value::Method(m) => Some(Rc::as_ptr(m) as usize),
            Value::Exception(e) => Some(Rc::as_ptr(e) as usize),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Bool(b) => Some(*b as i64),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(x) => Some(*x),
            Value::Int(n) => Some(*n as f64),
            Value::Bool(b) => Some(*b as i64 as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Built-in printable form; never runs guest code
    pub fn repr(&self) -> String {
        match repr_with(self, &mut PlainRepr) {
            Ok(text) => text,
            Err(never) => match never {},
        }
    }

    /// Built-in `str()` form; never runs guest code
    pub fn to_display_string(&self) -> String {
        match str_with(self, &mut PlainRepr) {
            Ok(text) => text,
            Err(never) => match never {},
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repr())
    }
}

/// Decides how instances of user classes print
pub trait ReprHook {
    type Error;

    /// `Some(text)` to override the default `<__main__.C object at ...>` form
    fn instance_repr(&mut self, instance: &Value) -> Result<Option<String>, Self::Error>;

    /// Like `instance_repr`, for `str()` at the top level
    fn instance_str(&mut self, instance: &Value) -> Result<Option<String>, Self::Error>;

    /// Text (or failure) for structures nested deeper than [`MAX_FORMAT_DEPTH`]
    fn too_deep(&mut self) -> Result<String, Self::Error>;
}

/// Built-in object forms only
pub struct PlainRepr;

impl ReprHook for PlainRepr {
    type Error = Infallible;

    fn instance_repr(&mut self, _instance: &Value) -> Result<Option<String>, Infallible> {
        Ok(None)
    }

    fn instance_str(&mut self, _instance: &Value) -> Result<Option<String>, Infallible> {
        Ok(None)
    }

    fn too_deep(&mut self) -> Result<String, Infallible> {
        Ok("...".to_string())
    }
}

/// Python `repr()`
pub fn repr_with<R: ReprHook>(value: &Value, hook: &mut R) -> Result<String, R::Error> {
    let mut out = String::new();
    let mut active = Vec::new();
    write_repr(value, &mut out, &mut active, hook)?;
    Ok(out)
}

/// Python `str()`: strings print raw, everything else falls back to `repr()`
pub fn str_with<R: ReprHook>(value: &Value, hook: &mut R) -> Result<String, R::Error> {
    match value {
        Value::Str(s) => Ok(s.to_string()),
        Value::Instance(instance) => {
            if let Some(text) = hook.instance_str(value)? {
                return Ok(text);
            }
            if instance.class.is_exception() {
                let args = instance_args(instance);
                return exception_message(&args, hook);
            }
            repr_with(value, hook)
        }
        Value::Exception(exc) => exception_message(&exc.args, hook),
        _ => repr_with(value, hook),
    }
}

fn exception_message<R: ReprHook>(args: &[Value], hook: &mut R) -> Result<String, R::Error> {
    match args {
        [] => Ok(String::new()),
        [single] => str_with(single, hook),
        many => repr_with(&Value::tuple(many.to_vec()), hook),
    }
}

/// `args` attribute of an exception instance, as a plain vector
pub fn instance_args(instance: &Instance) -> Vec<Value> {
    match instance.attributes.borrow().get("args") {
        Some(Value::Tuple(items)) => items.to_vec(),
        _ => Vec::new(),
    }
}

fn write_repr<R: ReprHook>(
    value: &Value,
    out: &mut String,
    active: &mut Vec<usize>,
    hook: &mut R,
) -> Result<(), R::Error> {
    if active.len() >= MAX_FORMAT_DEPTH {
        out.push_str(&hook.too_deep()?);
        return Ok(());
    }

    match value {
        Value::None => out.push_str("None"),
        Value::Bool(true) => out.push_str("True"),
        Value::Bool(false) => out.push_str("False"),
        Value::Int(n) => {
            let _ = write!(out, "{}", n);
        }
        Value::Float(x) => out.push_str(&format_float(*x)),
        Value::Str(s) => out.push_str(&quote_str(s)),
        Value::List(items) => {
            let id = Rc::as_ptr(items) as usize;
            if active.contains(&id) {
                out.push_str("[...]");
                return Ok(());
            }
            let snapshot = items.borrow().clone();
            active.push(id);
            out.push('[');
            write_items(&snapshot, out, active, hook)?;
            out.push(']');
            active.pop();
        }
        Value::Tuple(items) => {
            out.push('(');
            write_items(items, out, active, hook)?;
            if items.len() == 1 {
                out.push(',');
            }
            out.push(')');
        }
        Value::Dict(dict) => {
            let id = Rc::as_ptr(dict) as usize;
            if active.contains(&id) {
                out.push_str("{...}");
                return Ok(());
            }
            let entries: Vec<(Value, Value)> = dict
                .borrow()
                .items()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            active.push(id);
            out.push('{');
            for (i, (key, val)) in entries.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_repr(key, out, active, hook)?;
                out.push_str(": ");
                write_repr(val, out, active, hook)?;
            }
            out.push('}');
            active.pop();
        }
        Value::Range(r) => {
            if r.step == 1 {
                let _ = write!(out, "range({}, {})", r.start, r.stop);
            } else {
                let _ = write!(out, "range({}, {}, {})", r.start, r.stop, r.step);
            }
        }
        Value::Function(f) => {
            let _ = write!(out, "<function {} at {}>", f.qualname, address(value));
        }
        Value::Builtin(b) => {
            if b.is_type() {
                let _ = write!(out, "<class '{}'>", b.name());
            } else {
                let _ = write!(out, "<built-in function {}>", b.name());
            }
        }
        Value::Class(class) => {
            let _ = write!(out, "<class '__main__.{}'>", class.name);
        }
        Value::Instance(instance) => {
            if let Some(text) = hook.instance_repr(value)? {
                out.push_str(&text);
            } else if instance.class.is_exception() {
                let args = instance_args(instance);
                out.push_str(&instance.class.name);
                write_call_args(&args, out, active, hook)?;
            } else {
                let _ = write!(
                    out,
                    "<__main__.{} object at {}>",
                    instance.class.name,
                    address(value)
                );
            }
        }
        Value::Method(method) => match method.as_ref() {
            Method::Bound { receiver, function } => {
                let _ = write!(out, "<bound method {} of ", function.qualname);
                active.push(address_of(value));
                write_repr(receiver, out, active, hook)?;
                active.pop();
                out.push('>');
            }
            Method::Native { receiver, name } => {
                let _ = write!(
                    out,
                    "<built-in method {} of {} object at {}>",
                    name,
                    receiver.type_name(),
                    address(receiver)
                );
            }
        },
        Value::Exception(exc) => {
            out.push_str(exc.kind.name());
            write_call_args(&exc.args, out, active, hook)?;
        }
    }

    Ok(())
}

fn write_items<R: ReprHook>(
    items: &[Value],
    out: &mut String,
    active: &mut Vec<usize>,
    hook: &mut R,
) -> Result<(), R::Error> {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_repr(item, out, active, hook)?;
    }
    Ok(())
}

fn write_call_args<R: ReprHook>(
    args: &[Value],
    out: &mut String,
    active: &mut Vec<usize>,
    hook: &mut R,
) -> Result<(), R::Error> {
    out.push('(');
    write_items(args, out, active, hook)?;
    out.push(')');
    Ok(())
}

fn address_of(value: &Value) -> usize {
    value.identity().unwrap_or_default()
}

fn address(value: &Value) -> String {
    format!("0x{:012x}", address_of(value))
}

/// Python's `repr()` of a string: single quotes unless only double quotes avoid escaping
pub fn quote_str(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// Python's `repr()` of a float: shortest round-trip digits, exponent outside 1e-4..1e16
pub fn format_float(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if x == 0.0 {
        return if x.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }

    let scientific = format!("{:e}", x);
    let (mantissa, exponent) = scientific
        .split_once('e')
        .map(|(m, e)| (m.to_string(), e.parse::<i32>().unwrap_or(0)))
        .unwrap_or((scientific.clone(), 0));

    if !(-4..16).contains(&exponent) {
        let sign = if exponent < 0 { '-' } else { '+' };
        return format!("{}e{}{:02}", mantissa, sign, exponent.abs());
    }

    let plain = format!("{}", x);
    if plain.contains('.') {
        plain
    } else {
        format!("{}.0", plain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_repr() {
        assert_eq!(Value::None.repr(), "None");
        assert_eq!(Value::Bool(true).repr(), "True");
        assert_eq!(Value::Int(-7).repr(), "-7");
        assert_eq!(Value::str("hi").repr(), "'hi'");
        assert_eq!(Value::str("it's").repr(), "\"it's\"");
        assert_eq!(Value::str("a\nb").repr(), "'a\\nb'");
    }

    #[test]
    fn test_float_repr_matches_python() {
        assert_eq!(format_float(150.0), "150.0");
        assert_eq!(format_float(0.1), "0.1");
        assert_eq!(format_float(1e20), "1e+20");
        assert_eq!(format_float(1.5e-7), "1.5e-07");
        assert_eq!(format_float(1e16), "1e+16");
        assert_eq!(format_float(123456789012345.0), "123456789012345.0");
        assert_eq!(format_float(0.0001), "0.0001");
        assert_eq!(format_float(-0.0), "-0.0");
        assert_eq!(format_float(f64::INFINITY), "inf");
    }

    #[test]
    fn test_container_repr() {
        let list = Value::list(vec![Value::Int(1), Value::str("a")]);
        assert_eq!(list.repr(), "[1, 'a']");
        assert_eq!(Value::tuple(vec![Value::Int(1)]).repr(), "(1,)");
        assert_eq!(Value::tuple(vec![]).repr(), "()");

        let mut dict = Dict::new();
        dict.insert(HashKey::Int(1), Value::Int(1), Value::str("one"));
        assert_eq!(Value::dict(dict).repr(), "{1: 'one'}");
    }

    #[test]
    fn test_cyclic_list_repr() {
        let list = Value::list(vec![Value::Int(1)]);
        if let Value::List(items) = &list {
            items.borrow_mut().push(list.clone());
        }
        assert_eq!(list.repr(), "[1, [...]]");
        if let Value::List(items) = &list {
            items.borrow_mut().clear();
        }
    }

    #[test]
    fn test_range() {
        let r = RangeValue { start: 0, stop: 10, step: 3 };
        assert_eq!(r.len(), 4);
        assert!(r.contains(9));
        assert!(!r.contains(10));
        let back = RangeValue { start: 5, stop: 0, step: -2 };
        assert_eq!(back.len(), 3);
        assert_eq!(back.get(2), 1);
        assert_eq!(Value::Range(r).repr(), "range(0, 10, 3)");
    }

    #[test]
    fn test_range_spanning_all_of_i64() {
        let wide = RangeValue { start: i64::MIN, stop: i64::MAX, step: 1 << 62 };
        assert_eq!(wide.len(), 4);
        assert_eq!(wide.get(3), (i64::MIN as i128 + 3 * (1i128 << 62)) as i64);
        assert!(wide.contains(0));

        let full = RangeValue { start: i64::MIN, stop: i64::MAX, step: 1 };
        assert_eq!(full.len(), u64::MAX as usize);
        assert_eq!(full.get(full.len() - 1), i64::MAX - 1);
    }

    #[test]
    fn test_float_to_int_bounds() {
        assert_eq!(float_to_int(-2.5), Some(-2));
        assert_eq!(float_to_int(-9_223_372_036_854_775_808.0), Some(i64::MIN));
        assert_eq!(float_to_int(9_223_372_036_854_775_808.0), None);
        assert_eq!(float_to_int(1e300), None);
        assert_eq!(float_to_int(f64::NAN), None);
    }

    #[test]
    fn test_equal_numbers_share_a_key() {
        let one = HashKey::from_value(&Value::Int(1)).unwrap();
        assert_eq!(HashKey::from_value(&Value::Bool(true)).unwrap(), one);
        assert_eq!(HashKey::from_value(&Value::Float(1.0)).unwrap(), one);
        assert!(HashKey::from_value(&Value::list(vec![])).is_err());
    }

    #[test]
    fn test_dict_keeps_insertion_order() {
        let mut dict = Dict::new();
        for (i, name) in ["b", "a", "c"].iter().enumerate() {
            dict.insert(HashKey::Str(Rc::from(*name)), Value::str(name), Value::Int(i as i64));
        }
        dict.remove(&HashKey::Str(Rc::from("a")));
        dict.insert(HashKey::Str(Rc::from("b")), Value::str("b"), Value::Int(9));
        let keys: Vec<String> = dict.keys().map(Value::to_display_string).collect();
        assert_eq!(keys, vec!["b", "c"]);
        assert_eq!(dict.get(&HashKey::Str(Rc::from("b"))).and_then(Value::as_int), Some(9));
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::None.is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(!Value::str("").is_truthy());
        assert!(Value::list(vec![Value::None]).is_truthy());
        assert!(!Value::Range(RangeValue { start: 3, stop: 3, step: 1 }).is_truthy());
    }
}
