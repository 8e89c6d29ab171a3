//! Per-run execution context
//!
//! An [`ExecutionContext`] owns everything a single run needs besides the
//! program itself: the step hook, the captured output, the queued stdin lines
//! and the budgets. It is created for one run and dropped with it, so
//! concurrent runs never observe each other's steps.

use crate::interpreter::constants::{DEFAULT_MAX_CALL_DEPTH, DEFAULT_MAX_STEPS, DEFAULT_TIMEOUT_MS};
use crate::interpreter::errors::RuntimeError;
use crate::memory::value::Value;
use crate::parser::ast::SourceLocation;
use crate::snapshot::OutputBuffer;
use serde::Deserialize;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Budgets that end a run early
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExecutionLimits {
    /// Statements that may run before `StepLimitExceeded`
    pub max_steps: u64,
    /// Wall-clock time before `TimeLimitExceeded`
    pub timeout: Duration,
    /// Nested frames (module frame included) before `RecursionError`
    pub max_call_depth: usize,
}

impl Default for ExecutionLimits {
    fn default() -> Self {
        ExecutionLimits {
            max_steps: DEFAULT_MAX_STEPS,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

/// One live binding of the executing frame
#[derive(Debug, Clone)]
pub struct Binding {
    pub name: String,
    pub value: Value,
    /// `repr()` of the value, or the error raised while producing it
    pub printable: Result<String, RuntimeError>,
}

/// What the hook sees immediately before a statement runs
#[derive(Debug)]
pub struct StepEvent<'a> {
    pub line: usize,
    /// Bindings of the executing frame, reserved `__` names excluded.
    /// Empty when the hook does not want bindings.
    pub bindings: &'a [Binding],
    /// Bytes of output written so far
    pub output_len: usize,
    /// Number of frames on the stack (1 at module level)
    pub depth: usize,
}

/// Receives a callback before every statement of the submission
pub trait StepHook {
    /// Whether step events should carry the frame's bindings
    fn wants_bindings(&self) -> bool {
        true
    }

    fn on_step(&mut self, event: &StepEvent<'_>);
}

/// Runs untraced
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHook;

impl StepHook for NoopHook {
    fn wants_bindings(&self) -> bool {
        false
    }

    fn on_step(&mut self, _event: &StepEvent<'_>) {}
}

impl<F> StepHook for F
where
    F: FnMut(&StepEvent<'_>),
{
    fn on_step(&mut self, event: &StepEvent<'_>) {
        self(event)
    }
}

/// Everything one run owns besides the program
pub struct ExecutionContext<H: StepHook> {
    pub(crate) hook: H,
    pub(crate) output: OutputBuffer,
    pub(crate) stdin: VecDeque<String>,
    limits: ExecutionLimits,
    steps: u64,
    started: Instant,
}

impl<H: StepHook> ExecutionContext<H> {
    pub fn new(hook: H, limits: ExecutionLimits) -> Self {
        ExecutionContext {
            hook,
            output: OutputBuffer::new(),
            stdin: VecDeque::new(),
            limits,
            steps: 0,
            started: Instant::now(),
        }
    }

    /// Queue lines that `input()` will return in order
    pub fn with_stdin<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stdin = lines.into_iter().map(Into::into).collect();
        self
    }

    pub fn hook(&self) -> &H {
        &self.hook
    }

    pub fn output(&self) -> &OutputBuffer {
        &self.output
    }

    pub fn limits(&self) -> &ExecutionLimits {
        &self.limits
    }

    /// Statements executed so far
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn into_parts(self) -> (H, OutputBuffer) {
        (self.hook, self.output)
    }

    /// Count one statement and enforce the step and time budgets
    pub(crate) fn count_step(&mut self, location: SourceLocation) -> Result<(), RuntimeError> {
        self.steps += 1;
        if self.steps > self.limits.max_steps {
            return Err(RuntimeError::StepLimitExceeded {
                limit: self.limits.max_steps,
                location,
                scope: None,
            });
        }
        self.check_time(location)
    }

    pub(crate) fn check_time(&self, location: SourceLocation) -> Result<(), RuntimeError> {
        if self.started.elapsed() > self.limits.timeout {
            return Err(RuntimeError::TimeLimitExceeded {
                limit: self.limits.timeout,
                location,
                scope: None,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_budget() {
        let limits = ExecutionLimits {
            max_steps: 2,
            ..ExecutionLimits::default()
        };
        let mut ctx = ExecutionContext::new(NoopHook, limits);
        let loc = SourceLocation::new(1, 1);
        assert!(ctx.count_step(loc).is_ok());
        assert!(ctx.count_step(loc).is_ok());
        let err = ctx.count_step(loc).unwrap_err();
        assert!(matches!(err, RuntimeError::StepLimitExceeded { limit: 2, .. }));
    }

    #[test]
    fn test_time_budget() {
        let limits = ExecutionLimits {
            timeout: Duration::ZERO,
            ..ExecutionLimits::default()
        };
        let ctx = ExecutionContext::new(NoopHook, limits);
        std::thread::sleep(Duration::from_millis(2));
        assert!(ctx.check_time(SourceLocation::new(1, 1)).is_err());
    }

    #[test]
    fn test_limits_deserialize_with_defaults() {
        let limits: ExecutionLimits = serde_json::from_str(r#"{"max_steps": 10}"#).unwrap();
        assert_eq!(limits.max_steps, 10);
        assert_eq!(limits.max_call_depth, DEFAULT_MAX_CALL_DEPTH);
    }

    #[test]
    fn test_stdin_queue() {
        let ctx = ExecutionContext::new(NoopHook, ExecutionLimits::default()).with_stdin(["a", "b"]);
        assert_eq!(ctx.stdin.len(), 2);
    }
}
