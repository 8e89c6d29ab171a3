//! Guest interpreter execution engine
//!
//! This module provides the core execution logic:
//! - [`engine`]: The [`Interpreter`] itself, name resolution and calls
//! - [`context`]: Per-run state: step hook, captured output, stdin, budgets
//! - [`errors`]: Runtime error types
//! - [`builtins`]: Built-in functions and type constructors
//! - [`ops`]: Operators, item and attribute access, assignment targets
//!
//! # Execution Model
//!
//! The interpreter walks the AST and executes statements one at a time.
//! Immediately before each statement it notifies the [`StepHook`] held by the
//! run's [`ExecutionContext`] with the executing frame's bindings. The hook
//! is owned by the context, and the context by a single run, so runs on
//! different threads never share a hook.
//!
//! Budgets from [`ExecutionLimits`] are enforced as statements are counted;
//! a run that exceeds one stops with a limit error and keeps the steps
//! recorded so far.

pub mod builtins;
pub mod constants;
pub mod context;
pub mod engine;
pub mod errors;
mod expressions;
mod format;
mod loops;
pub(crate) mod methods;
pub mod ops;
mod statements;

pub use context::{Binding, ExecutionContext, ExecutionLimits, NoopHook, StepEvent, StepHook};
pub use engine::Interpreter;
pub use errors::{ExceptionKind, RuntimeError};
