use backtrace::Backtrace;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;

use crate::common::{atomic, Atomic, ReadExecutor};

/// Error kinds for registry operations.
///
/// Every failure in this crate is synchronous and final: registration happens
/// during program initialization over static program state, so no kind is
/// transient or worth retrying. A failed registration means the registry is
/// incomplete and no migration execution should proceed against it.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    /// The source identifier yields no parseable leading numeric component.
    ///
    /// This is a caller error detected at startup. It is never folded into a
    /// version of `0`, which would silently collide every unversioned
    /// migration in a scope.
    UnversionedSource,
    /// Two registrations in the same scope resolved to the same version.
    ///
    /// Carries both source identifiers for diagnostics. Never resolved by
    /// overwriting: silently replacing a migration could corrupt an already
    /// applied deployment's notion of what the version means.
    VersionConflict {
        version: i64,
        existing_source: String,
        new_source: String,
    },
    /// A procedure's capability shape contradicts the declared transaction
    /// mode (a transactional procedure registered as no-tx, or vice versa).
    ProcedureMismatch,
    /// The operation is not valid in the current context.
    InvalidOperation,
    /// Internal error (usually indicates a bug).
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::UnversionedSource => write!(f, "Unversioned source"),
            ErrorKind::VersionConflict { version, .. } => {
                write!(f, "Version conflict at {}", version)
            }
            ErrorKind::ProcedureMismatch => write!(f, "Procedure mismatch"),
            ErrorKind::InvalidOperation => write!(f, "Invalid operation"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Custom error type for registry operations.
///
/// `RookeryError` carries the error message, its [`ErrorKind`], an optional
/// cause for error chaining, and a backtrace captured at construction.
///
/// # Examples
///
/// ```rust
/// use rookery::errors::{ErrorKind, RookeryError};
///
/// let err = RookeryError::new("no version number in source", ErrorKind::UnversionedSource);
/// assert_eq!(*err.kind(), ErrorKind::UnversionedSource);
/// ```
#[derive(Clone)]
pub struct RookeryError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<RookeryError>>,
    backtrace: Atomic<Backtrace>,
}

impl RookeryError {
    /// Creates a new `RookeryError` with the specified message and kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        RookeryError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: atomic(Backtrace::new()),
        }
    }

    /// Creates a new `RookeryError` chained onto an underlying cause.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: RookeryError) -> Self {
        RookeryError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: atomic(Backtrace::new()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&RookeryError> {
        self.cause.as_deref()
    }
}

impl Display for RookeryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for RookeryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // print error message with stack trace followed by cause
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => self
                .backtrace
                .read_with(|trace| write!(f, "{}\n{:?}", self.message, trace)),
        }
    }
}

impl Error for RookeryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for registry operations.
///
/// `RookeryResult<T>` is shorthand for `Result<T, RookeryError>`.
pub type RookeryResult<T> = Result<T, RookeryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_uses_message() {
        let err = RookeryError::new("version 3 conflicts", ErrorKind::InternalError);
        assert_eq!(format!("{}", err), "version 3 conflicts");
    }

    #[test]
    fn test_cause_chain_preserved() {
        let root = RookeryError::new("out of range", ErrorKind::UnversionedSource);
        let err = RookeryError::new_with_cause(
            "registration failed",
            ErrorKind::InvalidOperation,
            root,
        );
        let cause = err.cause().expect("cause should be present");
        assert_eq!(*cause.kind(), ErrorKind::UnversionedSource);
        assert!(err.source().is_some());
    }

    #[test]
    fn test_version_conflict_kind_carries_sources() {
        let kind = ErrorKind::VersionConflict {
            version: 1,
            existing_source: "1_create_users.go".to_string(),
            new_source: "1_create_orders.go".to_string(),
        };
        assert_eq!(format!("{}", kind), "Version conflict at 1");
        match kind {
            ErrorKind::VersionConflict {
                existing_source,
                new_source,
                ..
            } => {
                assert_eq!(existing_source, "1_create_users.go");
                assert_eq!(new_source, "1_create_orders.go");
            }
            _ => panic!("expected version conflict"),
        }
    }
}
