// Execution engine for the guest interpreter

use crate::interpreter::constants::{CAPTURE_STEP_BUDGET, TIME_CHECK_INTERVAL};
use crate::interpreter::context::{Binding, ExecutionContext, StepEvent, StepHook};
use crate::interpreter::errors::{ExceptionKind, RuntimeError};
use crate::memory::stack::{FrameKind, Stack, StackFrame};
use crate::memory::value::{
    repr_with, str_with, Builtin, Class, Function, Instance, Method, ReprHook, Value,
};
use crate::parser::ast::{Program, SourceLocation};
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;

/// How a statement finished
#[derive(Debug)]
pub(crate) enum Flow {
    Normal,
    Break,
    Continue,
    Return(Value),
}

/// The interpreter that executes one submission under a step hook
pub struct Interpreter<H: StepHook> {
    /// Hook, output, stdin and budgets for this run
    pub(crate) ctx: ExecutionContext<H>,

    /// Call stack; frame 0 holds the globals
    pub(crate) stack: Stack,

    /// While non-zero, the hook is not called and steps are charged to
    /// `capture_steps` instead of the run's budget. Raised while printing
    /// bindings, which may run a guest `__repr__`.
    hook_suspended: usize,

    /// Statements run while capturing the current binding
    capture_steps: u64,

    /// Source location of the statement being executed
    pub(crate) current_location: SourceLocation,

    /// Iterations since the last wall-clock check
    ticks: u32,
}

impl<H: StepHook> Interpreter<H> {
    /// Create an interpreter with a fresh module frame
    pub fn new(ctx: ExecutionContext<H>) -> Self {
        Interpreter {
            ctx,
            stack: Stack::new(),
            hook_suspended: 0,
            capture_steps: 0,
            current_location: SourceLocation::default(),
            ticks: 0,
        }
    }

    /// Run the program from start to finish
    pub fn run(&mut self, program: &Program) -> Result<(), RuntimeError> {
        debug!(statements = program.body.len(), "executing program");
        let result = self.execute_block(&program.body).map(|_| ());
        debug!(
            steps = self.ctx.steps(),
            ok = result.is_ok(),
            "program finished"
        );
        result
    }

    pub fn context(&self) -> &ExecutionContext<H> {
        &self.ctx
    }

    pub fn into_context(self) -> ExecutionContext<H> {
        self.ctx
    }

    /// Global bindings (the module frame)
    pub fn globals(&self) -> &StackFrame {
        self.stack.globals()
    }

    /// Count a statement, enforce budgets, and notify the hook
    pub(crate) fn fire_step(&mut self, location: SourceLocation) -> Result<(), RuntimeError> {
        self.current_location = location;

        if self.hook_suspended > 0 {
            self.capture_steps += 1;
            if self.capture_steps > CAPTURE_STEP_BUDGET {
                return Err(RuntimeError::StepLimitExceeded {
                    limit: CAPTURE_STEP_BUDGET,
                    location,
                    scope: None,
                });
            }
            return self.ctx.check_time(location);
        }

        self.ctx.count_step(location)?;

        let bindings = if self.ctx.hook.wants_bindings() {
            self.collect_bindings(location)
        } else {
            Vec::new()
        };

        let event = StepEvent {
            line: location.line,
            bindings: &bindings,
            output_len: self.ctx.output.len(),
            depth: self.stack.depth(),
        };
        self.ctx.hook.on_step(&event);
        Ok(())
    }

    /// Snapshot the executing frame's bindings with their printable forms.
    /// A `__repr__` that fails or outruns its budget leaves an `Err` printable.
    fn collect_bindings(&mut self, location: SourceLocation) -> Vec<Binding> {
        let visible: Vec<(String, Value)> = self
            .stack
            .current_frame()
            .bindings()
            .filter(|(name, _)| !name.starts_with("__"))
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect();

        self.hook_suspended += 1;
        let bindings = visible
            .into_iter()
            .map(|(name, value)| {
                self.capture_steps = 0;
                let printable = self.repr_value(&value);
                Binding {
                    name,
                    value,
                    printable,
                }
            })
            .collect();
        self.hook_suspended -= 1;
        // The statement that was about to run still starts here
        self.current_location = location;

        bindings
    }

    /// Periodic wall-clock check for loops that run no statements
    pub(crate) fn tick(&mut self) -> Result<(), RuntimeError> {
        self.ticks += 1;
        if self.ticks >= TIME_CHECK_INTERVAL {
            self.ticks = 0;
            self.ctx.check_time(self.current_location)?;
        }
        Ok(())
    }

    // Name resolution

    /// Resolve a name: frame locals, then globals, then built-ins
    pub(crate) fn lookup_name(&self, name: &str) -> Result<Value, RuntimeError> {
        let frame = self.stack.current_frame();

        if !frame.declares_global(name) {
            if let Some(value) = frame.get(name) {
                return Ok(value.clone());
            }
            if frame.is_local_name(name) {
                return Err(RuntimeError::new(
                    ExceptionKind::UnboundLocalError,
                    format!(
                        "cannot access local variable '{}' where it is not associated with a value",
                        name
                    ),
                ));
            }
        }

        if let Some(value) = self.stack.globals().get(name) {
            return Ok(value.clone());
        }

        Builtin::from_name(name).map(Value::Builtin).ok_or_else(|| {
            RuntimeError::new(
                ExceptionKind::NameError,
                format!("name '{}' is not defined", name),
            )
        })
    }

    pub(crate) fn store_name(&mut self, name: &str, value: Value) {
        if self.stack.current_frame().declares_global(name) {
            self.stack.globals_mut().set(name, value);
        } else {
            self.stack.current_frame_mut().set(name, value);
        }
    }

    pub(crate) fn delete_name(&mut self, name: &str) -> Result<(), RuntimeError> {
        let removed = if self.stack.current_frame().declares_global(name) {
            self.stack.globals_mut().remove(name)
        } else {
            self.stack.current_frame_mut().remove(name)
        };

        removed.map(|_| ()).ok_or_else(|| {
            RuntimeError::new(
                ExceptionKind::NameError,
                format!("name '{}' is not defined", name),
            )
        })
    }

    /// Qualified-name prefix for functions and classes defined in the current frame
    pub(crate) fn qualname_prefix(&self) -> Option<String> {
        let frame = self.stack.current_frame();
        match &frame.kind {
            FrameKind::Module => None,
            FrameKind::Function(function) => Some(format!("{}.<locals>", function.qualname)),
            FrameKind::ClassBody => Some(frame.name.clone()),
        }
    }

    // Calls

    /// Call any callable value
    pub(crate) fn call_value(
        &mut self,
        callee: &Value,
        args: Vec<Value>,
        kwargs: Vec<(String, Value)>,
    ) -> Result<Value, RuntimeError> {
        match callee {
            Value::Function(function) => self.call_function(function, args, kwargs),
            Value::Builtin(builtin) => self.call_builtin(*builtin, args, kwargs),
            Value::Method(method) => match method.as_ref() {
                Method::Bound { receiver, function } => {
                    let mut full = Vec::with_capacity(args.len() + 1);
                    full.push(receiver.clone());
                    full.extend(args);
                    self.call_function(function, full, kwargs)
                }
                Method::Native { receiver, name } => self.call_method(receiver, name, args, kwargs),
            },
            Value::Class(class) => self.instantiate(class, args, kwargs),
            other => Err(RuntimeError::type_error(format!(
                "'{}' object is not callable",
                other.type_name()
            ))),
        }
    }

    /// Call a user-defined function in a new frame
    pub(crate) fn call_function(
        &mut self,
        function: &Rc<Function>,
        args: Vec<Value>,
        kwargs: Vec<(String, Value)>,
    ) -> Result<Value, RuntimeError> {
        if self.stack.depth() >= self.ctx.limits().max_call_depth {
            return Err(RuntimeError::recursion());
        }

        let frame = bind_arguments(function, args, kwargs)?;
        self.stack.push_frame(frame);
        let result = self.execute_block(&function.decl.body);
        self.stack.pop_frame();

        match result {
            Ok(Flow::Return(value)) => Ok(value),
            Ok(_) => Ok(Value::None),
            Err(err) => Err(err.in_scope(&function.decl.name)),
        }
    }

    /// Create an instance and run its `__init__`
    fn instantiate(
        &mut self,
        class: &Rc<Class>,
        args: Vec<Value>,
        kwargs: Vec<(String, Value)>,
    ) -> Result<Value, RuntimeError> {
        let instance = Rc::new(Instance {
            class: class.clone(),
            attributes: RefCell::new(FxHashMap::default()),
        });
        let value = Value::Instance(instance.clone());

        if class.is_exception() {
            instance
                .attributes
                .borrow_mut()
                .insert("args".to_string(), Value::tuple(args.clone()));
        }

        match class.lookup("__init__") {
            Some(Value::Function(init)) => {
                let mut full = Vec::with_capacity(args.len() + 1);
                full.push(value.clone());
                full.extend(args);
                let returned = self.call_function(&init, full, kwargs)?;
                if !matches!(returned, Value::None) {
                    return Err(RuntimeError::type_error(format!(
                        "__init__() should return None, not '{}'",
                        returned.type_name()
                    )));
                }
            }
            Some(other) => {
                self.call_value(&other, args, kwargs)?;
            }
            None => {
                if !class.is_exception() && (!args.is_empty() || !kwargs.is_empty()) {
                    return Err(RuntimeError::type_error(format!(
                        "{}() takes no arguments",
                        class.name
                    )));
                }
            }
        }

        Ok(value)
    }

    // Printable forms

    /// `repr()`, honoring a class's `__repr__`
    pub(crate) fn repr_value(&mut self, value: &Value) -> Result<String, RuntimeError> {
        repr_with(value, &mut GuestRepr { interpreter: self })
    }

    /// `str()`, honoring a class's `__str__` and `__repr__`
    pub(crate) fn str_value(&mut self, value: &Value) -> Result<String, RuntimeError> {
        str_with(value, &mut GuestRepr { interpreter: self })
    }

    /// Call a text-returning dunder such as `__repr__` if the instance's class defines one
    fn call_text_dunder(
        &mut self,
        value: &Value,
        name: &str,
    ) -> Result<Option<String>, RuntimeError> {
        let Value::Instance(instance) = value else {
            return Ok(None);
        };
        let Some(Value::Function(method)) = instance.class.lookup(name) else {
            return Ok(None);
        };

        match self.call_function(&method, vec![value.clone()], Vec::new())? {
            Value::Str(text) => Ok(Some(text.to_string())),
            other => Err(RuntimeError::type_error(format!(
                "{}() returned non-string (type {})",
                name,
                other.type_name()
            ))),
        }
    }
}

/// Printable conversion that may run guest dunder methods
struct GuestRepr<'a, H: StepHook> {
    interpreter: &'a mut Interpreter<H>,
}

impl<H: StepHook> ReprHook for GuestRepr<'_, H> {
    type Error = RuntimeError;

    fn instance_repr(&mut self, instance: &Value) -> Result<Option<String>, RuntimeError> {
        self.interpreter.call_text_dunder(instance, "__repr__")
    }

    fn instance_str(&mut self, instance: &Value) -> Result<Option<String>, RuntimeError> {
        match self.interpreter.call_text_dunder(instance, "__str__")? {
            Some(text) => Ok(Some(text)),
            None => self.instance_repr(instance),
        }
    }

    fn too_deep(&mut self) -> Result<String, RuntimeError> {
        Err(RuntimeError::new(
            ExceptionKind::RecursionError,
            "maximum recursion depth exceeded while getting the repr of an object",
        ))
    }
}

/// Match call arguments to parameters and build the callee's frame
fn bind_arguments(
    function: &Rc<Function>,
    args: Vec<Value>,
    kwargs: Vec<(String, Value)>,
) -> Result<StackFrame, RuntimeError> {
    let params = &function.decl.params;
    let name = &function.qualname;

    if args.len() > params.len() {
        return Err(RuntimeError::type_error(format!(
            "{}() takes {} positional argument{} but {} {} given",
            name,
            params.len(),
            if params.len() == 1 { "" } else { "s" },
            args.len(),
            if args.len() == 1 { "was" } else { "were" }
        )));
    }

    let mut slots: Vec<Option<Value>> = args.into_iter().map(Some).collect();
    slots.resize(params.len(), None);

    for (keyword, value) in kwargs {
        match params.iter().position(|p| p.name == keyword) {
            None => {
                return Err(RuntimeError::type_error(format!(
                    "{}() got an unexpected keyword argument '{}'",
                    name, keyword
                )))
            }
            Some(index) if slots[index].is_some() => {
                return Err(RuntimeError::type_error(format!(
                    "{}() got multiple values for argument '{}'",
                    name, keyword
                )))
            }
            Some(index) => slots[index] = Some(value),
        }
    }

    let first_default = params.len() - function.defaults.len();
    let mut missing = Vec::new();
    for (index, slot) in slots.iter_mut().enumerate() {
        if slot.is_some() {
            continue;
        }
        if index >= first_default {
            *slot = Some(function.defaults[index - first_default].clone());
        } else {
            missing.push(format!("'{}'", params[index].name));
        }
    }

    if !missing.is_empty() {
        return Err(RuntimeError::type_error(format!(
            "{}() missing {} required positional argument{}: {}",
            name,
            missing.len(),
            if missing.len() == 1 { "" } else { "s" },
            join_names(&missing)
        )));
    }

    let mut frame = StackFrame::new(function.qualname.clone(), FrameKind::Function(function.clone()));
    for (param, value) in params.iter().zip(slots) {
        frame.set(&param.name, value.unwrap_or_default());
    }
    Ok(frame)
}

/// `'a'`, `'a' and 'b'`, `'a', 'b' and 'c'`
fn join_names(names: &[String]) -> String {
    match names {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::context::{ExecutionLimits, NoopHook};
    use crate::parser;

    fn run(source: &str) -> (Interpreter<NoopHook>, Result<(), RuntimeError>) {
        let program = parser::parse(source).unwrap();
        let ctx = ExecutionContext::new(NoopHook, ExecutionLimits::default());
        let mut interpreter = Interpreter::new(ctx);
        let result = interpreter.run(&program);
        (interpreter, result)
    }

    fn global(interpreter: &Interpreter<NoopHook>, name: &str) -> String {
        interpreter.globals().get(name).map(Value::repr).unwrap_or_default()
    }

    #[test]
    fn test_function_call_and_defaults() {
        let (interp, result) = run("def add(a, b=10):\n    return a + b\nx = add(1)\ny = add(1, b=2)\n");
        assert!(result.is_ok());
        assert_eq!(global(&interp, "x"), "11");
        assert_eq!(global(&interp, "y"), "3");
    }

    #[test]
    fn test_missing_argument_message() {
        let (_, result) = run("def f(a, b):\n    pass\nf()\n");
        let err = result.unwrap_err();
        assert_eq!(
            err.to_string(),
            "TypeError: f() missing 2 required positional arguments: 'a' and 'b'"
        );
        assert_eq!(err.location().line, 3);
    }

    #[test]
    fn test_unbound_local() {
        let (_, result) = run("x = 1\ndef f():\n    x = x + 1\nf()\n");
        let err = result.unwrap_err();
        assert!(err.is_kind(ExceptionKind::UnboundLocalError));
        assert_eq!(err.location().line, 3);
        assert_eq!(err.scope(), Some("f"));
    }

    #[test]
    fn test_global_declaration() {
        let (interp, result) = run("count = 0\ndef bump():\n    global count\n    count += 1\nbump()\nbump()\n");
        assert!(result.is_ok());
        assert_eq!(global(&interp, "count"), "2");
    }

    #[test]
    fn test_recursion_limit() {
        let limits = ExecutionLimits {
            max_call_depth: 20,
            ..ExecutionLimits::default()
        };
        let program = parser::parse("def f(n):\n    return f(n + 1)\nf(0)\n").unwrap();
        let mut interp = Interpreter::new(ExecutionContext::new(NoopHook, limits));
        let err = interp.run(&program).unwrap_err();
        assert!(err.is_kind(ExceptionKind::RecursionError));
    }

    #[test]
    fn test_class_with_repr() {
        let (interp, result) = run(
            "class Card:\n    def __init__(self, name):\n        self.name = name\n    def __repr__(self):\n        return 'Card(' + self.name + ')'\nc = Card('ace')\ntext = repr(c)\n",
        );
        assert!(result.is_ok());
        assert_eq!(global(&interp, "text"), "'Card(ace)'");
    }

    #[test]
    fn test_hook_sees_bindings_before_each_statement() {
        let program = parser::parse("x = 1\ny = x + 1\n").unwrap();
        let mut seen: Vec<(usize, Vec<String>)> = Vec::new();
        let hook = |event: &StepEvent<'_>| {
            seen.push((
                event.line,
                event.bindings.iter().map(|b| b.name.clone()).collect(),
            ));
        };
        let mut interp = Interpreter::new(ExecutionContext::new(hook, ExecutionLimits::default()));
        interp.run(&program).unwrap();
        drop(interp);
        assert_eq!(seen, vec![(1, vec![]), (2, vec!["x".to_string()])]);
    }

    #[test]
    fn test_join_names() {
        let names = vec!["'a'".to_string(), "'b'".to_string(), "'c'".to_string()];
        assert_eq!(join_names(&names), "'a', 'b' and 'c'");
    }
}
