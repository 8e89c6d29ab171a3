//! Runtime error types for the guest interpreter
//!
//! This module defines [`RuntimeError`], which represents every failure that can
//! end a run after parsing succeeded: guest exceptions (named after the Python
//! exception they mimic), exceptions raised by user-defined classes, and the
//! engine's own step and time budgets.
//!
//! All runtime errors are fatal. The guest subset has no `try`/`except`, so the
//! first error halts execution and is rendered into a short traceback summary.
//!
//! Errors are usually created deep inside value operations that do not know
//! where they are in the source. Those carry a default location and are pinned
//! to the executing statement with [`RuntimeError::at`] as they propagate.

use crate::parser::ast::SourceLocation;
use std::time::Duration;

/// Built-in exception kinds the engine can raise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExceptionKind {
    Exception,
    ArithmeticError,
    LookupError,
    NameError,
    UnboundLocalError,
    TypeError,
    ValueError,
    ZeroDivisionError,
    IndexError,
    KeyError,
    AttributeError,
    OverflowError,
    RecursionError,
    EOFError,
    AssertionError,
    MemoryError,
    RuntimeError,
    NotImplementedError,
}

impl ExceptionKind {
    pub const ALL: [ExceptionKind; 18] = [
        ExceptionKind::Exception,
        ExceptionKind::ArithmeticError,
        ExceptionKind::LookupError,
        ExceptionKind::NameError,
        ExceptionKind::UnboundLocalError,
        ExceptionKind::TypeError,
        ExceptionKind::ValueError,
        ExceptionKind::ZeroDivisionError,
        ExceptionKind::IndexError,
        ExceptionKind::KeyError,
        ExceptionKind::AttributeError,
        ExceptionKind::OverflowError,
        ExceptionKind::RecursionError,
        ExceptionKind::EOFError,
        ExceptionKind::AssertionError,
        ExceptionKind::MemoryError,
        ExceptionKind::RuntimeError,
        ExceptionKind::NotImplementedError,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ExceptionKind::Exception => "Exception",
            ExceptionKind::ArithmeticError => "ArithmeticError",
            ExceptionKind::LookupError => "LookupError",
            ExceptionKind::NameError => "NameError",
            ExceptionKind::UnboundLocalError => "UnboundLocalError",
            ExceptionKind::TypeError => "TypeError",
            ExceptionKind::ValueError => "ValueError",
            ExceptionKind::ZeroDivisionError => "ZeroDivisionError",
            ExceptionKind::IndexError => "IndexError",
            ExceptionKind::KeyError => "KeyError",
            ExceptionKind::AttributeError => "AttributeError",
            ExceptionKind::OverflowError => "OverflowError",
            ExceptionKind::RecursionError => "RecursionError",
            ExceptionKind::EOFError => "EOFError",
            ExceptionKind::AssertionError => "AssertionError",
            ExceptionKind::MemoryError => "MemoryError",
            ExceptionKind::RuntimeError => "RuntimeError",
            ExceptionKind::NotImplementedError => "NotImplementedError",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Direct parent in the exception hierarchy (`None` for `Exception`)
    pub fn parent(self) -> Option<Self> {
        match self {
            ExceptionKind::Exception => None,
            ExceptionKind::ZeroDivisionError | ExceptionKind::OverflowError => {
                Some(ExceptionKind::ArithmeticError)
            }
            ExceptionKind::IndexError | ExceptionKind::KeyError => Some(ExceptionKind::LookupError),
            ExceptionKind::UnboundLocalError => Some(ExceptionKind::NameError),
            ExceptionKind::RecursionError | ExceptionKind::NotImplementedError => {
                Some(ExceptionKind::RuntimeError)
            }
            _ => Some(ExceptionKind::Exception),
        }
    }

    /// Whether `self` is `ancestor` or derives from it
    pub fn is_subkind_of(self, ancestor: ExceptionKind) -> bool {
        let mut current = Some(self);
        while let Some(kind) = current {
            if kind == ancestor {
                return true;
            }
            current = kind.parent();
        }
        false
    }
}

/// Runtime errors that can occur during execution
#[derive(Debug, Clone, thiserror::Error)]
pub enum RuntimeError {
    /// A built-in exception, raised by the engine or by `raise ValueError(...)`
    #[error("{}", exception_line(.kind.name(), .message))]
    Exception {
        kind: ExceptionKind,
        message: String,
        location: SourceLocation,
        /// Innermost function the error escaped from (`None` at module level)
        scope: Option<String>,
    },

    /// An instance of a user-defined exception class was raised
    #[error("{}", exception_line(.class_name, .message))]
    Raised {
        class_name: String,
        message: String,
        location: SourceLocation,
        scope: Option<String>,
    },

    /// The configured step budget ran out
    #[error("StepLimitExceeded: execution stopped after {limit} steps")]
    StepLimitExceeded {
        limit: u64,
        location: SourceLocation,
        scope: Option<String>,
    },

    /// The configured wall-clock budget ran out
    #[error("TimeLimitExceeded: execution stopped after {} ms", .limit.as_millis())]
    TimeLimitExceeded {
        limit: Duration,
        location: SourceLocation,
        scope: Option<String>,
    },
}

fn exception_line(kind: &str, message: &str) -> String {
    if message.is_empty() {
        kind.to_string()
    } else {
        format!("{}: {}", kind, message)
    }
}

impl RuntimeError {
    pub fn new(kind: ExceptionKind, message: impl Into<String>) -> Self {
        RuntimeError::Exception {
            kind,
            message: message.into(),
            location: SourceLocation::default(),
            scope: None,
        }
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ExceptionKind::TypeError, message)
    }

    pub fn value_error(message: impl Into<String>) -> Self {
        Self::new(ExceptionKind::ValueError, message)
    }

    pub fn index_error(message: impl Into<String>) -> Self {
        Self::new(ExceptionKind::IndexError, message)
    }

    pub fn zero_division(message: impl Into<String>) -> Self {
        Self::new(ExceptionKind::ZeroDivisionError, message)
    }

    pub fn overflow(message: impl Into<String>) -> Self {
        Self::new(ExceptionKind::OverflowError, message)
    }

    pub fn attribute_error(message: impl Into<String>) -> Self {
        Self::new(ExceptionKind::AttributeError, message)
    }

    pub fn recursion() -> Self {
        Self::new(ExceptionKind::RecursionError, "maximum recursion depth exceeded")
    }

    pub fn memory_error() -> Self {
        Self::new(ExceptionKind::MemoryError, "")
    }

    /// The exception kind name as it appears in the summary
    pub fn kind_name(&self) -> &str {
        match self {
            RuntimeError::Exception { kind, .. } => kind.name(),
            RuntimeError::Raised { class_name, .. } => class_name,
            RuntimeError::StepLimitExceeded { .. } => "StepLimitExceeded",
            RuntimeError::TimeLimitExceeded { .. } => "TimeLimitExceeded",
        }
    }

    pub fn location(&self) -> SourceLocation {
        match self {
            RuntimeError::Exception { location, .. }
            | RuntimeError::Raised { location, .. }
            | RuntimeError::StepLimitExceeded { location, .. }
            | RuntimeError::TimeLimitExceeded { location, .. } => *location,
        }
    }

    fn location_mut(&mut self) -> &mut SourceLocation {
        match self {
            RuntimeError::Exception { location, .. }
            | RuntimeError::Raised { location, .. }
            | RuntimeError::StepLimitExceeded { location, .. }
            | RuntimeError::TimeLimitExceeded { location, .. } => location,
        }
    }

    /// Name of the function the error escaped from, `None` for module level
    pub fn scope(&self) -> Option<&str> {
        match self {
            RuntimeError::Exception { scope, .. }
            | RuntimeError::Raised { scope, .. }
            | RuntimeError::StepLimitExceeded { scope, .. }
            | RuntimeError::TimeLimitExceeded { scope, .. } => scope.as_deref(),
        }
    }

    fn scope_mut(&mut self) -> &mut Option<String> {
        match self {
            RuntimeError::Exception { scope, .. }
            | RuntimeError::Raised { scope, .. }
            | RuntimeError::StepLimitExceeded { scope, .. }
            | RuntimeError::TimeLimitExceeded { scope, .. } => scope,
        }
    }

    /// Pin the error to `location` unless an inner statement already did
    pub fn at(mut self, location: SourceLocation) -> Self {
        let current = self.location_mut();
        if current.line == 0 {
            *current = location;
        }
        self
    }

    /// Record the innermost function the error escaped from
    pub fn in_scope(mut self, name: &str) -> Self {
        let scope = self.scope_mut();
        if scope.is_none() {
            *scope = Some(name.to_string());
        }
        self
    }

    /// Whether this error is an engine budget rather than a guest fault
    pub fn is_limit(&self) -> bool {
        matches!(
            self,
            RuntimeError::StepLimitExceeded { .. } | RuntimeError::TimeLimitExceeded { .. }
        )
    }

    /// Whether this is the given built-in exception (or a subclass of it)
    pub fn is_kind(&self, expected: ExceptionKind) -> bool {
        matches!(self, RuntimeError::Exception { kind, .. } if kind.is_subkind_of(expected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_kind_and_message() {
        let err = RuntimeError::zero_division("division by zero");
        assert_eq!(err.to_string(), "ZeroDivisionError: division by zero");
    }

    #[test]
    fn test_display_without_message() {
        let err = RuntimeError::new(ExceptionKind::AssertionError, "");
        assert_eq!(err.to_string(), "AssertionError");
    }

    #[test]
    fn test_at_keeps_innermost_location() {
        let err = RuntimeError::type_error("bad")
            .at(SourceLocation::new(3, 1))
            .at(SourceLocation::new(7, 1));
        assert_eq!(err.location().line, 3);
    }

    #[test]
    fn test_in_scope_keeps_innermost_function() {
        let err = RuntimeError::recursion().in_scope("inner").in_scope("outer");
        assert_eq!(err.scope(), Some("inner"));
    }

    #[test]
    fn test_hierarchy() {
        assert!(ExceptionKind::KeyError.is_subkind_of(ExceptionKind::LookupError));
        assert!(ExceptionKind::ZeroDivisionError.is_subkind_of(ExceptionKind::Exception));
        assert!(!ExceptionKind::ValueError.is_subkind_of(ExceptionKind::LookupError));
        assert_eq!(ExceptionKind::from_name("EOFError"), Some(ExceptionKind::EOFError));
    }
}
