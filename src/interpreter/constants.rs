// Constants for the guest interpreter

/// File name reported in tracebacks
pub const SUBMISSION_FILE: &str = "<submission>";

/// Text shown in place of a binding whose printable form could not be produced
pub const UNREPRABLE_PLACEHOLDER: &str = "<unrepr-able>";

/// Largest list, tuple or string a single operation may materialize
pub const MAX_COLLECTION_LEN: usize = 1_000_000;

/// How many comprehension or built-in iterations run between wall-clock checks
pub const TIME_CHECK_INTERVAL: u32 = 4096;

/// Default step budget per run
pub const DEFAULT_MAX_STEPS: u64 = 100_000;

/// Default wall-clock budget per run, in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

/// Default maximum number of nested calls (module frame included)
pub const DEFAULT_MAX_CALL_DEPTH: usize = 200;

/// Largest string, in bytes, a single operation may build
pub const MAX_STRING_LEN: usize = 10_000_000;

/// Largest precision a format spec may request
pub const MAX_FORMAT_PRECISION: usize = u16::MAX as usize;

/// Statements a hidden `__repr__` may run while one binding is captured
pub const CAPTURE_STEP_BUDGET: u64 = 10_000;
