//! Instrumented execution of a submission
//!
//! [`Tracer::run`] parses a submission, executes it under a
//! [`TraceRecorder`], and folds the outcome into a [`RunResult`]. It never
//! fails: syntax errors, runtime errors, exhausted budgets and even a panic
//! inside the interpreter all become the `error` summary, with whatever trace
//! and output were produced before the failure.
//!
//! Each run executes on its own worker thread with a large fixed stack, so
//! deeply recursive guest programs hit the call-depth budget long before the
//! host stack. Nothing is shared between runs: the recorder and output buffer
//! live in the run's [`ExecutionContext`] and are dropped with it.
//!
//! A panic inside the interpreter is caught around the program's execution,
//! so the steps and output recorded before it survive. The worker-thread join
//! only catches what escapes that boundary, such as a panic in the parser.

pub mod recorder;

pub use recorder::TraceRecorder;

use crate::interpreter::constants::SUBMISSION_FILE;
use crate::interpreter::context::{ExecutionContext, ExecutionLimits, StepHook};
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::parser::ast::Program;
use crate::parser::{self, ParseError};
use crate::serialize::SerializeLimits;
use crate::snapshot::{OutputBuffer, RunResult};
use serde::Deserialize;
use std::any::Any;
use std::fmt::Write as _;
use std::panic::{self, AssertUnwindSafe};
use std::thread;
use tracing::{debug, warn};

/// Stack size of the worker thread that runs the interpreter
const WORKER_STACK_SIZE: usize = 64 * 1024 * 1024;

/// Everything configurable about a traced run
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TracerConfig {
    pub limits: ExecutionLimits,
    pub serialize: SerializeLimits,
    /// Lines returned by successive `input()` calls
    pub stdin: Vec<String>,
}

/// Runs submissions and records their traces
#[derive(Debug, Clone, Default)]
pub struct Tracer {
    config: TracerConfig,
}

impl Tracer {
    pub fn new(config: TracerConfig) -> Self {
        Tracer { config }
    }

    pub fn config(&self) -> &TracerConfig {
        &self.config
    }

    /// Trace `source` on a dedicated worker thread
    pub fn run(&self, source: &str) -> RunResult {
        debug!(bytes = source.len(), "tracing submission");

        let outcome = thread::scope(|scope| {
            let worker = thread::Builder::new()
                .name("stepwise-worker".to_string())
                .stack_size(WORKER_STACK_SIZE)
                .spawn_scoped(scope, || self.run_here(source));
            match worker {
                Ok(handle) => handle.join().map_err(|payload| panic_message(payload.as_ref())),
                Err(err) => Err(format!("could not start worker thread: {}", err)),
            }
        });

        match outcome {
            Ok(result) => result,
            Err(message) => {
                warn!(%message, "worker thread panicked");
                RunResult {
                    trace: Vec::new(),
                    output: String::new(),
                    error: internal_summary(&message),
                }
            }
        }
    }

    /// Trace `source` on the calling thread
    fn run_here(&self, source: &str) -> RunResult {
        let program = match parser::parse(source) {
            Ok(program) => program,
            Err(err) => {
                debug!(line = err.location.line, "submission failed to parse");
                return RunResult {
                    trace: Vec::new(),
                    output: String::new(),
                    error: syntax_summary(&err, source),
                };
            }
        };

        let recorder = TraceRecorder::new(source, &self.config.serialize);
        let ctx = ExecutionContext::new(recorder, self.config.limits.clone())
            .with_stdin(self.config.stdin.iter().cloned());
        let (recorder, output, error) = execute(&program, ctx);

        let trace = recorder.into_steps();
        debug!(steps = trace.len(), "trace recorded");
        RunResult {
            trace,
            output: output.into_string(),
            error,
        }
    }
}

/// Run a parsed program to completion and render how it ended.
///
/// The hook and output are returned even when the interpreter panics.
fn execute<H: StepHook>(program: &Program, ctx: ExecutionContext<H>) -> (H, OutputBuffer, String) {
    let mut interpreter = Interpreter::new(ctx);
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| interpreter.run(program)));

    let (hook, output) = interpreter.into_context().into_parts();
    let error = match outcome {
        Ok(Ok(())) => String::new(),
        Ok(Err(err)) => {
            if err.is_limit() {
                warn!(error = %err, "run stopped by a budget");
            } else {
                debug!(error = %err, "run raised");
            }
            runtime_summary(&err)
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            warn!(%message, "interpreter panicked");
            internal_summary(&message)
        }
    };
    (hook, output, error)
}

/// Trace `source` with the default configuration
pub fn run(source: &str) -> RunResult {
    Tracer::default().run(source)
}

/// Single-frame traceback for a runtime failure
pub fn runtime_summary(err: &RuntimeError) -> String {
    format!(
        "Traceback (most recent call last):\n  File \"{}\", line {}, in {}\n{}\n",
        SUBMISSION_FILE,
        err.location().line,
        err.scope().unwrap_or("<module>"),
        err
    )
}

/// Python-style report of a syntax or indentation error, caret included
pub fn syntax_summary(err: &ParseError, source: &str) -> String {
    let line = err.location.line;
    let mut out = format!("  File \"{}\", line {}\n", SUBMISSION_FILE, line);

    let raw = line
        .checked_sub(1)
        .and_then(|index| source.lines().nth(index))
        .unwrap_or("");
    let code = raw.trim();
    if !code.is_empty() {
        let indent = raw.chars().take_while(|c| c.is_whitespace()).count();
        let caret = err
            .location
            .column
            .saturating_sub(1 + indent)
            .min(code.chars().count());
        let _ = writeln!(out, "    {}", code);
        let _ = writeln!(out, "    {}^", " ".repeat(caret));
    }

    let _ = writeln!(out, "{}: {}", err.kind, err.message);
    out
}

fn internal_summary(message: &str) -> String {
    format!("InternalError: {}\n", message)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        text.to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "interpreter panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::context::StepEvent;
    use crate::parser::ast::SourceLocation;
    use crate::parser::lexer::SyntaxErrorKind;

    #[test]
    fn test_runtime_summary_names_scope() {
        let err = RuntimeError::zero_division("division by zero")
            .at(SourceLocation::new(2, 5))
            .in_scope("divide");
        assert_eq!(
            runtime_summary(&err),
            "Traceback (most recent call last):\n  File \"<submission>\", line 2, in divide\nZeroDivisionError: division by zero\n"
        );
    }

    #[test]
    fn test_syntax_summary_points_at_column() {
        let err = ParseError {
            kind: SyntaxErrorKind::Syntax,
            message: "invalid syntax".to_string(),
            location: SourceLocation::new(2, 9),
        };
        let summary = syntax_summary(&err, "x = 1\n    y = = 2\n");
        assert_eq!(
            summary,
            "  File \"<submission>\", line 2\n    y = = 2\n        ^\nSyntaxError: invalid syntax\n"
        );
    }

    #[test]
    fn test_stdin_is_fed_to_input() {
        let tracer = Tracer::new(TracerConfig {
            stdin: vec!["Ada".to_string()],
            ..TracerConfig::default()
        });
        let result = tracer.run("name = input('? ')\nprint(name)\n");
        assert_eq!(result.output, "? Ada\n");
        assert!(result.is_success());
    }

    #[test]
    fn test_panic_keeps_partial_trace_and_output() {
        let program = parser::parse("print('before')\nx = 1\ny = 2\n").unwrap();
        let mut lines = Vec::new();
        let hook = |event: &StepEvent<'_>| {
            if event.line == 3 {
                panic!("hook failed on line 3");
            }
            lines.push(event.line);
        };
        let (_, output, error) = execute(&program, ExecutionContext::new(hook, ExecutionLimits::default()));

        assert_eq!(output.contents(), "before\n");
        assert_eq!(error, "InternalError: hook failed on line 3\n");
        assert_eq!(lines, vec![1, 2]);
    }

    #[test]
    fn test_config_deserializes_partially() {
        let config: TracerConfig =
            serde_json::from_str(r#"{"limits": {"max_steps": 5}, "stdin": ["1"]}"#).unwrap();
        assert_eq!(config.limits.max_steps, 5);
        assert_eq!(config.serialize, SerializeLimits::default());
        assert_eq!(config.stdin, vec!["1"]);
    }
}
