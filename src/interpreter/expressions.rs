//! Expression evaluation
//!
//! Every expression form the parser produces is evaluated here. Operators
//! delegate to [`crate::interpreter::ops`]; calls go through
//! [`Interpreter::call_value`], which may re-enter statement execution for
//! user-defined functions.
//!
//! List comprehensions bind their loop variable in the current frame while
//! they run and restore the previous binding (or its absence) afterwards, so
//! the variable never leaks into the enclosing scope.

use crate::interpreter::context::StepHook;
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::loops::Items;
use crate::interpreter::ops::access::{get_attribute, get_item, get_slice, SliceSpec};
use crate::interpreter::ops::binary::check_collection_len;
use crate::interpreter::ops::compare::compare;
use crate::interpreter::ops::unary::unary;
use crate::memory::value::{Dict, HashKey, Value};
use crate::parser::ast::{BoolOp, Expr, FStringPart};

impl<H: StepHook> Interpreter<H> {
    /// Evaluate an expression and return its value
    pub(crate) fn eval_expr(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Int(n, _) => Ok(Value::Int(*n)),
            Expr::Float(x, _) => Ok(Value::Float(*x)),
            Expr::Str(s, _) => Ok(Value::str(s)),
            Expr::Bool(b, _) => Ok(Value::Bool(*b)),
            Expr::None(_) => Ok(Value::None),
            Expr::FString(parts, _) => self.eval_fstring(parts),
            Expr::Name(name, _) => self.lookup_name(name),

            Expr::List(items, _) => Ok(Value::list(self.eval_exprs(items)?)),
            Expr::Tuple(items, _) => Ok(Value::tuple(self.eval_exprs(items)?)),
            Expr::Dict(entries, _) => {
                let mut dict = Dict::new();
                for (key_expr, value_expr) in entries {
                    let key = self.eval_expr(key_expr)?;
                    let value = self.eval_expr(value_expr)?;
                    dict.insert(HashKey::from_value(&key)?, key, value);
                }
                Ok(Value::dict(dict))
            }

            Expr::ListComp {
                element,
                target,
                iter,
                condition,
                ..
            } => self.eval_list_comp(element, target, iter, condition.as_deref()),

            Expr::Binary {
                op, left, right, ..
            } => {
                let left = self.eval_expr(left)?;
                let right = self.eval_expr(right)?;
                self.evaluate_binary_op(*op, &left, &right)
            }

            Expr::Unary { op, operand, .. } => {
                let operand = self.eval_expr(operand)?;
                unary(*op, &operand)
            }

            Expr::Logical {
                op, left, right, ..
            } => {
                let left = self.eval_expr(left)?;
                let short_circuits = match op {
                    BoolOp::And => !left.is_truthy(),
                    BoolOp::Or => left.is_truthy(),
                };
                if short_circuits {
                    Ok(left)
                } else {
                    self.eval_expr(right)
                }
            }

            Expr::Compare {
                left, comparisons, ..
            } => {
                let mut current = self.eval_expr(left)?;
                for (op, right) in comparisons {
                    let right = self.eval_expr(right)?;
                    if !compare(*op, &current, &right)? {
                        return Ok(Value::Bool(false));
                    }
                    current = right;
                }
                Ok(Value::Bool(true))
            }

            Expr::Conditional {
                condition,
                then_value,
                else_value,
                ..
            } => {
                if self.eval_expr(condition)?.is_truthy() {
                    self.eval_expr(then_value)
                } else {
                    self.eval_expr(else_value)
                }
            }

            Expr::Call {
                func,
                args,
                keywords,
                ..
            } => {
                let callee = self.eval_expr(func)?;
                let args = self.eval_exprs(args)?;
                let mut kwargs = Vec::with_capacity(keywords.len());
                for (name, value) in keywords {
                    kwargs.push((name.clone(), self.eval_expr(value)?));
                }
                self.call_value(&callee, args, kwargs)
            }

            Expr::Attribute { object, name, .. } => {
                let object = self.eval_expr(object)?;
                get_attribute(&object, name)
            }

            Expr::Subscript { object, index, .. } => {
                let object = self.eval_expr(object)?;
                if let Expr::Slice {
                    lower, upper, step, ..
                } = index.as_ref()
                {
                    let spec = self.eval_slice(lower, upper, step)?;
                    return get_slice(&object, spec);
                }
                let index = self.eval_expr(index)?;
                get_item(&object, &index)
            }

            Expr::Slice { .. } => Err(RuntimeError::type_error(
                "slices are only supported inside subscripts",
            )),
        }
    }

    pub(crate) fn eval_exprs(&mut self, exprs: &[Expr]) -> Result<Vec<Value>, RuntimeError> {
        exprs.iter().map(|expr| self.eval_expr(expr)).collect()
    }

    pub(crate) fn eval_slice(
        &mut self,
        lower: &Option<Box<Expr>>,
        upper: &Option<Box<Expr>>,
        step: &Option<Box<Expr>>,
    ) -> Result<SliceSpec, RuntimeError> {
        let lower = lower.as_deref().map(|e| self.eval_expr(e)).transpose()?;
        let upper = upper.as_deref().map(|e| self.eval_expr(e)).transpose()?;
        let step = step.as_deref().map(|e| self.eval_expr(e)).transpose()?;
        SliceSpec::from_values(lower, upper, step)
    }

    fn eval_fstring(&mut self, parts: &[FStringPart]) -> Result<Value, RuntimeError> {
        let mut out = String::new();
        for part in parts {
            match part {
                FStringPart::Literal(text) => out.push_str(text),
                FStringPart::Interpolation { expr, spec } => {
                    let value = self.eval_expr(expr)?;
                    let text = match spec {
                        Some(spec) => self.format_value(&value, spec)?,
                        None => self.str_value(&value)?,
                    };
                    out.push_str(&text);
                }
            }
        }
        Ok(Value::str(&out))
    }

    fn eval_list_comp(
        &mut self,
        element: &Expr,
        target: &Expr,
        iter: &Expr,
        condition: Option<&Expr>,
    ) -> Result<Value, RuntimeError> {
        let iterable = self.eval_expr(iter)?;
        let items = self.items(&iterable)?;

        let mut names = Vec::new();
        target_names(target, &mut names);
        let saved: Vec<(String, Option<Value>)> = names
            .into_iter()
            .map(|name| {
                let previous = self.stack.current_frame().get(&name).cloned();
                (name, previous)
            })
            .collect();

        let result = self.comprehension_loop(element, target, items, condition);

        let frame = self.stack.current_frame_mut();
        for (name, previous) in saved {
            match previous {
                Some(value) => frame.set(&name, value),
                None => {
                    frame.remove(&name);
                }
            }
        }

        result
    }

    fn comprehension_loop(
        &mut self,
        element: &Expr,
        target: &Expr,
        items: Items,
        condition: Option<&Expr>,
    ) -> Result<Value, RuntimeError> {
        let mut results = Vec::new();
        for item in items {
            self.tick()?;
            self.assign_target(target, item)?;
            if let Some(condition) = condition {
                if !self.eval_expr(condition)?.is_truthy() {
                    continue;
                }
            }
            results.push(self.eval_expr(element)?);
            check_collection_len(results.len())?;
        }
        Ok(Value::list(results))
    }
}

fn target_names(target: &Expr, names: &mut Vec<String>) {
    match target {
        Expr::Name(name, _) => names.push(name.clone()),
        Expr::Tuple(items, _) | Expr::List(items, _) => {
            for item in items {
                target_names(item, names);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use crate::interpreter::context::{ExecutionContext, ExecutionLimits, NoopHook};
    use crate::interpreter::engine::Interpreter;
    use crate::interpreter::errors::RuntimeError;
    use crate::memory::value::Value;
    use crate::parser;

    fn run(source: &str) -> (Interpreter<NoopHook>, Result<(), RuntimeError>) {
        let program = parser::parse(source).unwrap();
        let mut interp = Interpreter::new(ExecutionContext::new(NoopHook, ExecutionLimits::default()));
        let result = interp.run(&program);
        (interp, result)
    }

    fn eval(expr: &str) -> String {
        let (interp, result) = run(&format!("result = {}\n", expr));
        match result {
            Ok(()) => interp.globals().get("result").map(Value::repr).unwrap_or_default(),
            Err(err) => err.to_string(),
        }
    }

    #[test]
    fn test_arithmetic_precedence() {
        assert_eq!(eval("2 + 3 * 4"), "14");
        assert_eq!(eval("-2 ** 2"), "-4");
        assert_eq!(eval("(1 + 2) * 3"), "9");
        assert_eq!(eval("7 // 2 + 7 % 2"), "4");
    }

    #[test]
    fn test_short_circuit_returns_operand() {
        assert_eq!(eval("0 or 'default'"), "'default'");
        assert_eq!(eval("[] and 1"), "[]");
        assert_eq!(eval("1 and 2"), "2");
        assert_eq!(eval("False or undefined_name"), "NameError: name 'undefined_name' is not defined");
        assert_eq!(eval("True or undefined_name"), "True");
    }

    #[test]
    fn test_comparison_chain() {
        assert_eq!(eval("1 < 2 < 3"), "True");
        assert_eq!(eval("1 < 3 < 2"), "False");
        assert_eq!(eval("3 not in [1, 2]"), "True");
        assert_eq!(eval("None is None"), "True");
    }

    #[test]
    fn test_list_comprehension_does_not_leak() {
        let (interp, result) = run("x = 'kept'\nsquares = [x * x for x in range(4) if x % 2 == 0]\n");
        assert!(result.is_ok());
        assert_eq!(interp.globals().get("squares").map(Value::repr).unwrap(), "[0, 4]");
        assert_eq!(interp.globals().get("x").map(Value::repr).unwrap(), "'kept'");

        let (interp, _) = run("ys = [y for y in [1]]\n");
        assert!(interp.globals().get("y").is_none());
    }

    #[test]
    fn test_fstrings() {
        assert_eq!(eval("f'{1 + 1} items'"), "'2 items'");
        assert_eq!(eval("f'{3.14159:.2f}'"), "'3.14'");
        assert_eq!(eval("f'{\"a\"!r}'"), "\"'a'\"");
        assert_eq!(eval("f'{{literal}}'"), "'{literal}'");
    }

    #[test]
    fn test_subscripts_and_slices() {
        assert_eq!(eval("[1, 2, 3][-1]"), "3");
        assert_eq!(eval("'hello'[1:4]"), "'ell'");
        assert_eq!(eval("(1, 2, 3)[::-1]"), "(3, 2, 1)");
        assert_eq!(eval("{'a': 1}['a']"), "1");
    }

    #[test]
    fn test_conditional_expression() {
        assert_eq!(eval("'yes' if 1 > 0 else 'no'"), "'yes'");
    }

    #[test]
    fn test_not_callable() {
        assert_eq!(eval("5()"), "TypeError: 'int' object is not callable");
    }
}
