//! Assignment targets, augmented assignment and `del`

use crate::interpreter::context::StepHook;
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::ops::access::{
    delete_attribute, delete_item, get_attribute, get_item, set_attribute, set_item, SliceSpec,
};
use crate::interpreter::ops::binary::check_collection_len;
use crate::memory::value::Value;
use crate::parser::ast::{BinOp, Expr};

impl<H: StepHook> Interpreter<H> {
    /// Bind `value` to an assignment target
    pub(crate) fn assign_target(&mut self, target: &Expr, value: Value) -> Result<(), RuntimeError> {
        match target {
            Expr::Name(name, _) => {
                self.store_name(name, value);
                Ok(())
            }
            Expr::Attribute { object, name, .. } => {
                let object = self.eval_expr(object)?;
                set_attribute(&object, name, value)
            }
            Expr::Subscript { object, index, .. } => {
                let object = self.eval_expr(object)?;
                if let Expr::Slice {
                    lower, upper, step, ..
                } = index.as_ref()
                {
                    let spec = self.eval_slice(lower, upper, step)?;
                    return self.assign_slice(&object, spec, &value);
                }
                let index = self.eval_expr(index)?;
                set_item(&object, &index, value)
            }
            Expr::Tuple(targets, _) | Expr::List(targets, _) => {
                let items = match &value {
                    Value::List(_)
                    | Value::Tuple(_)
                    | Value::Str(_)
                    | Value::Dict(_)
                    | Value::Range(_) => self.iterate(&value)?,
                    other => {
                        return Err(RuntimeError::type_error(format!(
                            "cannot unpack non-iterable {} object",
                            other.type_name()
                        )))
                    }
                };
                if items.len() > targets.len() {
                    return Err(RuntimeError::value_error(format!(
                        "too many values to unpack (expected {})",
                        targets.len()
                    )));
                }
                if items.len() < targets.len() {
                    return Err(RuntimeError::value_error(format!(
                        "not enough values to unpack (expected {}, got {})",
                        targets.len(),
                        items.len()
                    )));
                }
                for (target, item) in targets.iter().zip(items) {
                    self.assign_target(target, item)?;
                }
                Ok(())
            }
            _ => Err(RuntimeError::type_error("cannot assign to expression")),
        }
    }

    /// `xs[a:b] = items` and `xs[a:b:k] = items`
    fn assign_slice(&mut self, object: &Value, spec: SliceSpec, value: &Value) -> Result<(), RuntimeError> {
        let Value::List(list) = object else {
            return Err(RuntimeError::type_error(format!(
                "'{}' object does not support item assignment",
                object.type_name()
            )));
        };
        let replacement = self.iterate(value)?;
        let mut items = list.borrow_mut();

        if spec.step == 1 {
            let (start, stop) = spec.bounds(items.len());
            let (start, stop) = (start as usize, stop.max(start) as usize);
            check_collection_len(items.len() - (stop - start) + replacement.len())?;
            items.splice(start..stop, replacement);
            return Ok(());
        }

        let indices = spec.indices(items.len());
        if indices.len() != replacement.len() {
            return Err(RuntimeError::value_error(format!(
                "attempt to assign sequence of size {} to extended slice of size {}",
                replacement.len(),
                indices.len()
            )));
        }
        for (i, item) in indices.into_iter().zip(replacement) {
            items[i] = item;
        }
        Ok(())
    }

    /// `target op= value`; the target expression is evaluated once
    pub(crate) fn execute_aug_assign(
        &mut self,
        target: &Expr,
        op: BinOp,
        value: &Expr,
    ) -> Result<(), RuntimeError> {
        match target {
            Expr::Name(name, _) => {
                let current = self.lookup_name(name)?;
                let rhs = self.eval_expr(value)?;
                let result = self.inplace_op(op, current, &rhs)?;
                self.store_name(name, result);
                Ok(())
            }
            Expr::Attribute { object, name, .. } => {
                let object = self.eval_expr(object)?;
                let current = get_attribute(&object, name)?;
                let rhs = self.eval_expr(value)?;
                let result = self.inplace_op(op, current, &rhs)?;
                set_attribute(&object, name, result)
            }
            Expr::Subscript { object, index, .. } => {
                let object = self.eval_expr(object)?;
                let index = self.eval_expr(index)?;
                let current = get_item(&object, &index)?;
                let rhs = self.eval_expr(value)?;
                let result = self.inplace_op(op, current, &rhs)?;
                set_item(&object, &index, result)
            }
            _ => Err(RuntimeError::type_error(
                "illegal expression for augmented assignment",
            )),
        }
    }

    /// Lists extend in place under `+=`; everything else rebinds
    fn inplace_op(&mut self, op: BinOp, current: Value, rhs: &Value) -> Result<Value, RuntimeError> {
        if let (BinOp::Add, Value::List(items)) = (op, &current) {
            let extra = self.iterate(rhs)?;
            check_collection_len(items.borrow().len() + extra.len())?;
            items.borrow_mut().extend(extra);
            return Ok(current);
        }
        self.evaluate_binary_op(op, &current, rhs)
    }

    /// `del target`
    pub(crate) fn delete_target(&mut self, target: &Expr) -> Result<(), RuntimeError> {
        match target {
            Expr::Name(name, _) => self.delete_name(name),
            Expr::Attribute { object, name, .. } => {
                let object = self.eval_expr(object)?;
                delete_attribute(&object, name)
            }
            Expr::Subscript { object, index, .. } => {
                let object = self.eval_expr(object)?;
                if let Expr::Slice {
                    lower, upper, step, ..
                } = index.as_ref()
                {
                    let spec = self.eval_slice(lower, upper, step)?;
                    return delete_slice(&object, spec);
                }
                let index = self.eval_expr(index)?;
                delete_item(&object, &index)
            }
            Expr::Tuple(targets, _) | Expr::List(targets, _) => {
                for target in targets {
                    self.delete_target(target)?;
                }
                Ok(())
            }
            _ => Err(RuntimeError::type_error("cannot delete expression")),
        }
    }
}

fn delete_slice(object: &Value, spec: SliceSpec) -> Result<(), RuntimeError> {
    let Value::List(list) = object else {
        return Err(RuntimeError::type_error(format!(
            "'{}' object doesn't support item deletion",
            object.type_name()
        )));
    };
    let mut items = list.borrow_mut();
    let mut indices = spec.indices(items.len());
    indices.sort_unstable();
    for i in indices.into_iter().rev() {
        items.remove(i);
    }
    Ok(())
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

    fn global(interp: &Interpreter<NoopHook>, name: &str) -> String {
        interp.globals().get(name).map(Value::repr).unwrap_or_default()
    }

    #[test]
    fn test_tuple_unpacking_and_swap() {
        let (interp, result) = run("a, b = 1, 2\na, b = b, a\n");
        assert!(result.is_ok());
        assert_eq!(global(&interp, "a"), "2");
        assert_eq!(global(&interp, "b"), "1");
    }

    #[test]
    fn test_unpacking_errors() {
        let (_, result) = run("a, b = [1, 2, 3]\n");
        assert_eq!(
            result.unwrap_err().to_string(),
            "ValueError: too many values to unpack (expected 2)"
        );
        let (_, result) = run("a, b, c = (1, 2)\n");
        assert_eq!(
            result.unwrap_err().to_string(),
            "ValueError: not enough values to unpack (expected 3, got 2)"
        );
        let (_, result) = run("a, b = 5\n");
        assert_eq!(
            result.unwrap_err().to_string(),
            "TypeError: cannot unpack non-iterable int object"
        );
    }

    #[test]
    fn test_list_plus_equals_is_in_place() {
        let (interp, result) = run("a = [1]\nb = a\na += [2]\n");
        assert!(result.is_ok());
        assert_eq!(global(&interp, "b"), "[1, 2]");
    }

    #[test]
    fn test_subscript_and_attribute_aug_assign() {
        let (interp, result) = run(
            "counts = {'a': 1}\ncounts['a'] += 5\nclass P:\n    pass\np = P()\np.x = 1\np.x *= 3\nx = p.x\n",
        );
        assert!(result.is_ok());
        assert_eq!(global(&interp, "counts"), "{'a': 6}");
        assert_eq!(global(&interp, "x"), "3");
    }

    #[test]
    fn test_slice_assignment_and_deletion() {
        let (interp, result) = run("xs = [0, 1, 2, 3, 4]\nxs[1:3] = ['a']\ndel xs[::2]\n");
        assert!(result.is_ok());
        assert_eq!(global(&interp, "xs"), "['a', 4]");
    }

    #[test]
    fn test_chained_assignment_shares_value() {
        let (interp, result) = run("a = b = []\na.append(1)\n");
        assert!(result.is_ok());
        assert_eq!(global(&interp, "b"), "[1]");
    }
}
