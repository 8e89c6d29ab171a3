// Statement execution

use crate::interpreter::context::StepHook;
use crate::interpreter::engine::{Flow, Interpreter};
use crate::interpreter::errors::{ExceptionKind, RuntimeError};
use crate::memory::stack::{FrameKind, StackFrame};
use crate::memory::value::{Builtin, Class, Function, Value};
use crate::parser::ast::{Expr, FunctionDecl, Stmt};
use rustc_hash::{FxHashMap, FxHashSet};
use std::cell::RefCell;
use std::rc::Rc;

impl<H: StepHook> Interpreter<H> {
    /// Execute statements in order until one transfers control
    pub(crate) fn execute_block(&mut self, body: &[Stmt]) -> Result<Flow, RuntimeError> {
        for stmt in body {
            match self.execute_statement(stmt)? {
                Flow::Normal => {}
                flow => return Ok(flow),
            }
        }
        Ok(Flow::Normal)
    }

    /// Fire the step for `stmt`, run it, and pin any error to its line
    pub(crate) fn execute_statement(&mut self, stmt: &Stmt) -> Result<Flow, RuntimeError> {
        let location = stmt.location();
        self.fire_step(location)?;
        self.dispatch_statement(stmt).map_err(|err| err.at(location))
    }

    fn dispatch_statement(&mut self, stmt: &Stmt) -> Result<Flow, RuntimeError> {
        match stmt {
            Stmt::Expr { expr, .. } => {
                self.eval_expr(expr)?;
                Ok(Flow::Normal)
            }

            Stmt::Assign { targets, value, .. } => {
                let value = self.eval_expr(value)?;
                for target in targets {
                    self.assign_target(target, value.clone())?;
                }
                Ok(Flow::Normal)
            }

            Stmt::AugAssign { target, op, value, .. } => {
                self.execute_aug_assign(target, *op, value)?;
                Ok(Flow::Normal)
            }

            Stmt::If {
                condition,
                body,
                orelse,
                ..
            } => {
                if self.eval_expr(condition)?.is_truthy() {
                    self.execute_block(body)
                } else {
                    self.execute_block(orelse)
                }
            }

            Stmt::While {
                condition,
                body,
                orelse,
                ..
            } => self.execute_while(condition, body, orelse),

            Stmt::For {
                target,
                iter,
                body,
                orelse,
                ..
            } => self.execute_for(target, iter, body, orelse),

            Stmt::Break { .. } => Ok(Flow::Break),
            Stmt::Continue { .. } => Ok(Flow::Continue),
            Stmt::Pass { .. } | Stmt::Global { .. } => Ok(Flow::Normal),

            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.eval_expr(expr)?,
                    None => Value::None,
                };
                Ok(Flow::Return(value))
            }

            Stmt::FunctionDef(decl) => {
                self.define_function(decl)?;
                Ok(Flow::Normal)
            }

            Stmt::ClassDef {
                name, base, body, ..
            } => {
                self.define_class(name, base.as_ref(), body)?;
                Ok(Flow::Normal)
            }

            Stmt::Delete { targets, .. } => {
                for target in targets {
                    self.delete_target(target)?;
                }
                Ok(Flow::Normal)
            }

            Stmt::Assert {
                condition, message, ..
            } => {
                if self.eval_expr(condition)?.is_truthy() {
                    return Ok(Flow::Normal);
                }
                let message = match message {
                    Some(expr) => {
                        let value = self.eval_expr(expr)?;
                        self.str_value(&value)?
                    }
                    None => String::new(),
                };
                Err(RuntimeError::new(ExceptionKind::AssertionError, message))
            }

            Stmt::Raise { exception, .. } => match exception {
                Some(expr) => {
                    let value = self.eval_expr(expr)?;
                    Err(self.exception_from_value(value)?)
                }
                None => Err(RuntimeError::new(
                    ExceptionKind::RuntimeError,
                    "No active exception to reraise",
                )),
            },
        }
    }

    fn define_function(&mut self, decl: &Rc<FunctionDecl>) -> Result<(), RuntimeError> {
        let defaults = decl
            .params
            .iter()
            .filter_map(|param| param.default.as_ref())
            .map(|expr| self.eval_expr(expr))
            .collect::<Result<Vec<_>, _>>()?;

        let (local_names, global_names) = collect_scope_names(decl);
        let qualname = match self.qualname_prefix() {
            Some(prefix) => format!("{}.{}", prefix, decl.name),
            None => decl.name.clone(),
        };

        let function = Function {
            decl: decl.clone(),
            defaults,
            qualname,
            local_names,
            global_names,
        };
        self.store_name(&decl.name, Value::Function(Rc::new(function)));
        Ok(())
    }

    fn define_class(
        &mut self,
        name: &str,
        base: Option<&Expr>,
        body: &[Stmt],
    ) -> Result<(), RuntimeError> {
        let (base_class, exception_base) = match base {
            None => (None, None),
            Some(expr) => match self.eval_expr(expr)? {
                Value::Class(class) => {
                    let exception_base = class.exception_base;
                    (Some(class), exception_base)
                }
                Value::Builtin(Builtin::Object) => (None, None),
                Value::Builtin(Builtin::ExceptionType(kind)) => (None, Some(kind)),
                other => {
                    return Err(RuntimeError::type_error(format!(
                        "cannot inherit from '{}' object",
                        other.type_name()
                    )))
                }
            },
        };

        let frame_name = match self.qualname_prefix() {
            Some(prefix) => format!("{}.{}", prefix, name),
            None => name.to_string(),
        };
        self.stack
            .push_frame(StackFrame::new(frame_name, FrameKind::ClassBody));
        let result = self.execute_block(body);
        let frame = self.stack.pop_frame();
        result?;

        let namespace: FxHashMap<String, Value> = frame
            .map(|frame| frame.into_bindings().into_iter().collect())
            .unwrap_or_default();

        let class = Class {
            name: name.to_string(),
            base: base_class,
            exception_base,
            namespace: RefCell::new(namespace),
        };
        self.store_name(name, Value::Class(Rc::new(class)));
        Ok(())
    }

    /// Turn the operand of `raise` into the error that propagates
    fn exception_from_value(&mut self, value: Value) -> Result<RuntimeError, RuntimeError> {
        match &value {
            Value::Exception(exc) => {
                let message = match (exc.kind, exc.args.as_slice()) {
                    (ExceptionKind::KeyError, [key]) => self.repr_value(key)?,
                    _ => self.str_value(&value)?,
                };
                Ok(RuntimeError::new(exc.kind, message))
            }
            Value::Builtin(Builtin::ExceptionType(kind)) => Ok(RuntimeError::new(*kind, "")),
            Value::Class(class) if class.is_exception() => {
                let instance = self.call_value(&value, Vec::new(), Vec::new())?;
                self.exception_from_value(instance)
            }
            Value::Instance(instance) if instance.class.is_exception() => {
                let message = self.str_value(&value)?;
                Ok(RuntimeError::Raised {
                    class_name: instance.class.name.clone(),
                    message,
                    location: Default::default(),
                    scope: None,
                })
            }
            _ => Err(RuntimeError::type_error(
                "exceptions must derive from BaseException",
            )),
        }
    }
}

/// Names a function body binds and names it declares global
///
/// A name assigned anywhere in the body is local for the whole body, so a read
/// before the first assignment is an `UnboundLocalError` rather than a global
/// lookup. Nested `def` and `class` bodies are separate scopes.
pub(crate) fn collect_scope_names(decl: &FunctionDecl) -> (FxHashSet<String>, FxHashSet<String>) {
    let mut locals: FxHashSet<String> = decl.params.iter().map(|p| p.name.clone()).collect();
    let mut globals = FxHashSet::default();
    collect_block(&decl.body, &mut locals, &mut globals);
    locals.retain(|name| !globals.contains(name));
    (locals, globals)
}

fn collect_block(body: &[Stmt], locals: &mut FxHashSet<String>, globals: &mut FxHashSet<String>) {
    for stmt in body {
        match stmt {
            Stmt::Assign { targets, .. } => {
                for target in targets {
                    collect_target(target, locals);
                }
            }
            Stmt::AugAssign { target, .. } => collect_target(target, locals),
            Stmt::For {
                target,
                body,
                orelse,
                ..
            } => {
                collect_target(target, locals);
                collect_block(body, locals, globals);
                collect_block(orelse, locals, globals);
            }
            Stmt::If { body, orelse, .. } | Stmt::While { body, orelse, .. } => {
                collect_block(body, locals, globals);
                collect_block(orelse, locals, globals);
            }
            Stmt::Delete { targets, .. } => {
                for target in targets {
                    collect_target(target, locals);
                }
            }
            Stmt::FunctionDef(inner) => {
                locals.insert(inner.name.clone());
            }
            Stmt::ClassDef { name, .. } => {
                locals.insert(name.clone());
            }
            Stmt::Global { names, .. } => {
                globals.extend(names.iter().cloned());
            }
            _ => {}
        }
    }
}

fn collect_target(target: &Expr, locals: &mut FxHashSet<String>) {
    match target {
        Expr::Name(name, _) => {
            locals.insert(name.clone());
        }
        Expr::Tuple(items, _) | Expr::List(items, _) => {
            for item in items {
                collect_target(item, locals);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::context::{ExecutionContext, ExecutionLimits, NoopHook};
    use crate::parser;

    fn run(source: &str) -> (Interpreter<NoopHook>, Result<(), RuntimeError>) {
        let program = parser::parse(source).unwrap();
        let mut interp = Interpreter::new(ExecutionContext::new(NoopHook, ExecutionLimits::default()));
        let result = interp.run(&program);
        (interp, result)
    }

    fn global(interp: &Interpreter<NoopHook>, name: &str) -> String {
        interp.globals().get(name).map(Value::repr).unwrap_or_default()
    }

    #[test]
    fn test_scope_names() {
        let program = parser::parse(
            "def f(a):\n    global g\n    b = 1\n    for i, j in []:\n        pass\n    g = 2\n    def inner():\n        c = 3\n",
        )
        .unwrap();
        let Stmt::FunctionDef(decl) = &program.body[0] else {
            panic!("Expected function");
        };
        let (locals, globals) = collect_scope_names(decl);
        for name in ["a", "b", "i", "j", "inner"] {
            assert!(locals.contains(name), "missing {}", name);
        }
        assert!(!locals.contains("g"));
        assert!(!locals.contains("c"));
        assert!(globals.contains("g"));
    }

    #[test]
    fn test_if_elif_else() {
        let (interp, result) = run("x = 5\nif x < 3:\n    y = 'low'\nelif x < 10:\n    y = 'mid'\nelse:\n    y = 'high'\n");
        assert!(result.is_ok());
        assert_eq!(global(&interp, "y"), "'mid'");
    }

    #[test]
    fn test_assert_failure() {
        let (_, result) = run("x = 1\nassert x > 2, 'x too small'\n");
        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "AssertionError: x too small");
        assert_eq!(err.location().line, 2);
    }

    #[test]
    fn test_raise_builtin_and_user_exceptions() {
        let (_, result) = run("raise ValueError('bad value')\n");
        assert_eq!(result.unwrap_err().to_string(), "ValueError: bad value");

        let (_, result) = run("class Oops(Exception):\n    pass\nraise Oops('custom')\n");
        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "Oops: custom");
        assert_eq!(err.location().line, 3);

        let (_, result) = run("raise KeyError('k')\n");
        assert_eq!(result.unwrap_err().to_string(), "KeyError: 'k'");

        let (_, result) = run("raise 5\n");
        assert_eq!(
            result.unwrap_err().to_string(),
            "TypeError: exceptions must derive from BaseException"
        );
    }

    #[test]
    fn test_class_inheritance() {
        let (interp, result) = run(
            "class Animal:\n    def speak(self):\n        return 'generic'\n    def name(self):\n        return 'animal'\nclass Dog(Animal):\n    def speak(self):\n        return 'woof'\nd = Dog()\ns = d.speak()\nn = d.name()\n",
        );
        assert!(result.is_ok());
        assert_eq!(global(&interp, "s"), "'woof'");
        assert_eq!(global(&interp, "n"), "'animal'");
    }

    #[test]
    fn test_method_qualname() {
        let (interp, result) = run("class A:\n    def m(self):\n        pass\nf = A.m\n");
        assert!(result.is_ok());
        assert!(global(&interp, "f").starts_with("<function A.m at "));
    }

    #[test]
    fn test_delete_name() {
        let (interp, result) = run("x = 1\ndel x\n");
        assert!(result.is_ok());
        assert!(interp.globals().get("x").is_none());

        let (_, result) = run("del y\n");
        assert!(result.unwrap_err().is_kind(ExceptionKind::NameError));
    }
}
