//! # ad_error - Shared error taxonomy
//!
//! Every fallible operation in the workspace reports one of five failure kinds.
//! All of them are unrecoverable at the point of detection: the operation aborts
//! and the error carries the operation name plus the violated condition.
//!
//! | Kind | Raised when |
//! |------|-------------|
//! | [`ErrorKind::Shape`] | rank mismatch, element-count mismatch, operand shape mismatch |
//! | [`ErrorKind::Range`] | index or dimension out of range |
//! | [`ErrorKind::Precondition`] | non-contiguous reshape, unsupported rank |
//! | [`ErrorKind::Domain`] | zero-sized dimension, stride/index count mismatch in `linear_index`, logarithm of a non-positive value |
//! | [`ErrorKind::State`] | gradient accessed before it was allocated |
//!
//! ```
//! use ad_error::{ensure, Error, ErrorKind, Result};
//!
//! fn checked_div(a: f64, b: f64) -> Result<f64> {
//!     ensure!(b != 0.0, Domain, "checked_div", "divisor must be non-zero");
//!     Ok(a / b)
//! }
//!
//! let err = checked_div(1.0, 0.0).unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::Domain);
//! assert_eq!(err.op(), "checked_div");
//! ```

use std::fmt;

/// Category of a failure, independent of where it was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Shape,
    Range,
    Precondition,
    Domain,
    State,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Shape => "shape error",
            ErrorKind::Range => "range error",
            ErrorKind::Precondition => "precondition error",
            ErrorKind::Domain => "domain error",
            ErrorKind::State => "state error",
        };
        f.write_str(name)
    }
}

/// Error type used across the workspace.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Rank or element-count mismatch.
    #[error("shape error in {op}(): {message}")]
    Shape { op: &'static str, message: String },

    /// Index, dimension or slice bound out of range.
    #[error("range error in {op}(): {message}")]
    Range { op: &'static str, message: String },

    /// Operation is not supported for the given tensor layout or rank.
    #[error("precondition error in {op}(): {message}")]
    Precondition { op: &'static str, message: String },

    /// Value outside the mathematical or supported domain.
    #[error("domain error in {op}(): {message}")]
    Domain { op: &'static str, message: String },

    /// Object is not in the state the operation requires.
    #[error("state error in {op}(): {message}")]
    State { op: &'static str, message: String },
}

impl Error {
    /// Build an error of the given kind for operation `op`.
    pub fn new(kind: ErrorKind, op: &'static str, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            ErrorKind::Shape => Error::Shape { op, message },
            ErrorKind::Range => Error::Range { op, message },
            ErrorKind::Precondition => Error::Precondition { op, message },
            ErrorKind::Domain => Error::Domain { op, message },
            ErrorKind::State => Error::State { op, message },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Shape { .. } => ErrorKind::Shape,
            Error::Range { .. } => ErrorKind::Range,
            Error::Precondition { .. } => ErrorKind::Precondition,
            Error::Domain { .. } => ErrorKind::Domain,
            Error::State { .. } => ErrorKind::State,
        }
    }

    /// Name of the operation that failed.
    pub fn op(&self) -> &'static str {
        match self {
            Error::Shape { op, .. }
            | Error::Range { op, .. }
            | Error::Precondition { op, .. }
            | Error::Domain { op, .. }
            | Error::State { op, .. } => op,
        }
    }

    /// The violated condition, without the kind/op prefix.
    pub fn message(&self) -> &str {
        match self {
            Error::Shape { message, .. }
            | Error::Range { message, .. }
            | Error::Precondition { message, .. }
            | Error::Domain { message, .. }
            | Error::State { message, .. } => message,
        }
    }
}

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Return early with an [`Error`] of the given kind unless `cond` holds.
///
/// `ensure!(cond, Kind, "op", "format", args...)`
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $kind:ident, $op:expr, $($fmt:tt)+) => {
        if !($cond) {
            return Err($crate::Error::new(
                $crate::ErrorKind::$kind,
                $op,
                format!($($fmt)+),
            ));
        }
    };
}
