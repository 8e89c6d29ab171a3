// Loop execution (while, for)

use crate::interpreter::constants::MAX_COLLECTION_LEN;
use crate::interpreter::context::StepHook;
use crate::interpreter::engine::{Flow, Interpreter};
use crate::interpreter::errors::{ExceptionKind, RuntimeError};
use crate::memory::value::{RangeValue, Value};
use crate::parser::ast::{Expr, Stmt};

impl<H: StepHook> Interpreter<H> {
    /// Execute a while loop; `orelse` runs when the condition turns false
    pub(crate) fn execute_while(
        &mut self,
        condition: &Expr,
        body: &[Stmt],
        orelse: &[Stmt],
    ) -> Result<Flow, RuntimeError> {
        loop {
            if !self.eval_expr(condition)?.is_truthy() {
                return self.execute_block(orelse);
            }
            match self.execute_block(body)? {
                Flow::Break => return Ok(Flow::Normal),
                Flow::Return(value) => return Ok(Flow::Return(value)),
                Flow::Normal | Flow::Continue => {}
            }
        }
    }

    /// Execute a for loop; `orelse` runs when the iterable is exhausted
    pub(crate) fn execute_for(
        &mut self,
        target: &Expr,
        iter: &Expr,
        body: &[Stmt],
        orelse: &[Stmt],
    ) -> Result<Flow, RuntimeError> {
        let iterable = self.eval_expr(iter)?;

        match &iterable {
            // Lists are indexed live so appends made by the body are visited
            Value::List(items) => {
                let mut index = 0;
                loop {
                    let item = match items.borrow().get(index) {
                        Some(item) => item.clone(),
                        None => break,
                    };
                    index += 1;
                    if let Some(flow) = self.run_loop_body(target, item, body)? {
                        return Ok(flow);
                    }
                }
            }
            Value::Range(range) => {
                for index in 0..range.len() {
                    let item = Value::Int(range.get(index));
                    if let Some(flow) = self.run_loop_body(target, item, body)? {
                        return Ok(flow);
                    }
                }
            }
            Value::Dict(dict) => {
                let keys: Vec<Value> = dict.borrow().keys().cloned().collect();
                let size = keys.len();
                for key in keys {
                    if let Some(flow) = self.run_loop_body(target, key, body)? {
                        return Ok(flow);
                    }
                    if dict.borrow().len() != size {
                        return Err(RuntimeError::new(
                            ExceptionKind::RuntimeError,
                            "dictionary changed size during iteration",
                        ));
                    }
                }
            }
            _ => {
                for item in self.items(&iterable)? {
                    if let Some(flow) = self.run_loop_body(target, item, body)? {
                        return Ok(flow);
                    }
                }
            }
        }

        self.execute_block(orelse)
    }

    /// Bind the loop target and run one iteration.
    /// Returns `Some(flow)` when the loop must stop without running `orelse`.
    fn run_loop_body(
        &mut self,
        target: &Expr,
        item: Value,
        body: &[Stmt],
    ) -> Result<Option<Flow>, RuntimeError> {
        self.assign_target(target, item)?;
        match self.execute_block(body)? {
            Flow::Break => Ok(Some(Flow::Normal)),
            Flow::Return(value) => Ok(Some(Flow::Return(value))),
            Flow::Normal | Flow::Continue => Ok(None),
        }
    }

    /// Items of an iterable; ranges are walked without being materialized
    pub(crate) fn items(&mut self, iterable: &Value) -> Result<Items, RuntimeError> {
        match iterable {
            Value::Range(range) => Ok(Items::Range {
                range: *range,
                next: 0,
                len: range.len(),
            }),
            other => Ok(Items::Values(self.iterate(other)?.into_iter())),
        }
    }

    /// Materialize the items of an iterable
    pub(crate) fn iterate(&mut self, iterable: &Value) -> Result<Vec<Value>, RuntimeError> {
        match iterable {
            Value::List(items) => Ok(items.borrow().clone()),
            Value::Tuple(items) => Ok(items.to_vec()),
            Value::Str(s) => Ok(s
                .chars()
                .map(|c| Value::str(c.encode_utf8(&mut [0; 4])))
                .collect()),
            Value::Dict(dict) => Ok(dict.borrow().keys().cloned().collect()),
            Value::Range(range) => {
                if range.len() > MAX_COLLECTION_LEN {
                    return Err(RuntimeError::memory_error());
                }
                Ok((0..range.len()).map(|i| Value::Int(range.get(i))).collect())
            }
            other => Err(RuntimeError::type_error(format!(
                "'{}' object is not iterable",
                other.type_name()
            ))),
        }
    }
}

/// Lazily produced items of an iterable
pub(crate) enum Items {
    Values(std::vec::IntoIter<Value>),
    Range {
        range: RangeValue,
        next: usize,
        len: usize,
    },
}

impl Iterator for Items {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        match self {
            Items::Values(values) => values.next(),
            Items::Range { range, next, len } => {
                if *next >= *len {
                    return None;
                }
                let item = Value::Int(range.get(*next));
                *next += 1;
                Some(item)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::interpreter::context::{ExecutionContext, ExecutionLimits, NoopHook};
    use crate::interpreter::engine::Interpreter;
    use crate::interpreter::errors::RuntimeError;
    use crate::memory::value::{RangeValue, Value};
    use crate::parser;
    use std::time::Duration;

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
    fn test_for_range_sum() {
        let (interp, result) = run("total = 0\nfor i in range(5):\n    total += i\n");
        assert!(result.is_ok());
        assert_eq!(global(&interp, "total"), "10");
        assert_eq!(global(&interp, "i"), "4");
    }

    #[test]
    fn test_while_break_skips_else() {
        let (interp, result) = run(
            "n = 0\nflag = 'none'\nwhile n < 10:\n    n += 1\n    if n == 3:\n        break\nelse:\n    flag = 'else'\n",
        );
        assert!(result.is_ok());
        assert_eq!(global(&interp, "n"), "3");
        assert_eq!(global(&interp, "flag"), "'none'");
    }

    #[test]
    fn test_for_else_runs_on_exhaustion() {
        let (interp, result) = run("found = False\nfor x in [1, 2]:\n    pass\nelse:\n    found = True\n");
        assert!(result.is_ok());
        assert_eq!(global(&interp, "found"), "True");
    }

    #[test]
    fn test_continue() {
        let (interp, result) = run("odds = []\nfor x in range(6):\n    if x % 2 == 0:\n        continue\n    odds.append(x)\n");
        assert!(result.is_ok());
        assert_eq!(global(&interp, "odds"), "[1, 3, 5]");
    }

    #[test]
    fn test_list_grows_while_iterating() {
        let (interp, result) = run("xs = [1]\nfor x in xs:\n    if x < 4:\n        xs.append(x + 1)\n");
        assert!(result.is_ok());
        assert_eq!(global(&interp, "xs"), "[1, 2, 3, 4]");
    }

    #[test]
    fn test_dict_size_change_during_iteration() {
        let (_, result) = run("d = {1: 1}\nfor k in d:\n    d[k + 1] = 0\n");
        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "RuntimeError: dictionary changed size during iteration");
        assert_eq!(err.location().line, 2);
    }

    #[test]
    fn test_tuple_unpacking_loop() {
        let (interp, result) = run("pairs = []\nfor k, v in {'a': 1, 'b': 2}.items():\n    pairs.append(k * v)\n");
        assert!(result.is_ok());
        assert_eq!(global(&interp, "pairs"), "['a', 'bb']");
    }

    #[test]
    fn test_range_near_i64_bounds() {
        let (interp, result) = run(
            "seen = []\nfor x in range(-9223372036854775807 - 1, 9223372036854775807, 4611686018427387904):\n    seen.append(x)\n",
        );
        assert!(result.is_ok());
        assert_eq!(
            global(&interp, "seen"),
            "[-9223372036854775808, -4611686018427387904, 0, 4611686018427387904]"
        );
    }

    #[test]
    fn test_long_range_is_not_materialized() {
        // Each range is longer than the collection cap
        let program = parser::parse(
            "total = sum(range(1500000))\nhit = any(range(0, 1500000))\nlow = min(range(1500000, 0, -1))\nodd = [x for x in range(1500000) if x % 500000 == 1]\n",
        )
        .unwrap();
        let limits = ExecutionLimits {
            timeout: Duration::from_secs(120),
            ..ExecutionLimits::default()
        };
        let mut interp = Interpreter::new(ExecutionContext::new(NoopHook, limits));
        assert!(interp.run(&program).is_ok());
        assert_eq!(global(&interp, "total"), "1124999250000");
        assert_eq!(global(&interp, "hit"), "True");
        assert_eq!(global(&interp, "low"), "1");
        assert_eq!(global(&interp, "odd"), "[1, 500001, 1000001]");
    }

    #[test]
    fn test_not_iterable() {
        let (_, result) = run("for x in 5:\n    pass\n");
        assert_eq!(result.unwrap_err().to_string(), "TypeError: 'int' object is not iterable");
    }
}
