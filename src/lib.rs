//! # Introduction
//!
//! stepwise runs a short program written in a teaching subset of Python and
//! records, for every executed statement, the live variables of the executing
//! frame together with a plain-language hint. The recorded trace can be
//! emitted as JSON or stepped through in a terminal viewer built with
//! [ratatui](https://docs.rs/ratatui).
//!
//! ## Execution pipeline
//!
//! ```text
//! Source → Lexer → Parser → AST → Interpreter (+ step hook) → Trace → JSON / TUI
//! ```
//!
//! 1. [`parser`]: tokenises the indentation-sensitive source and builds an AST.
//! 2. [`interpreter`]: walks the AST and calls a [`interpreter::StepHook`]
//!    immediately before each statement.
//! 3. [`memory`]: the runtime value model and the call stack.
//! 4. [`serialize`]: bounded, JSON-ready description of a value.
//! 5. [`analysis`]: static line classification, hints and the source outline.
//! 6. [`tracer`]: drives a run and records a [`TraceStep`] per statement.
//! 7. [`snapshot`]: trace data model and the captured output buffer.
//! 8. [`ui`]: ratatui-based viewer; not part of the stable library API.
//!
//! ## Example
//!
//! ```
//! let result = stepwise::run("x = 1\nprint(x)\n");
//! assert_eq!(result.trace.len(), 2);
//! assert_eq!(result.output, "1\n");
//! assert!(result.error.is_empty());
//! ```

pub mod analysis;
pub mod interpreter;
pub mod memory;
pub mod parser;
pub mod serialize;
pub mod snapshot;
pub mod tracer;
pub mod ui;

pub use analysis::{extract_steps, AlgorithmStep};
pub use serialize::{serialize, SerializeLimits, SerializedValue};
pub use snapshot::{Report, RunResult, TraceStep};
pub use tracer::{run, Tracer, TracerConfig};
