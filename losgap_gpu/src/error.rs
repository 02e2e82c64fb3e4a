//! Error types for the LOSGAP GPU layer
//!
//! This module defines the error taxonomy used throughout the resource and
//! device layer: usage violations, precondition (assurance) failures, invalid
//! construction arguments, hardware enumeration failures and backend errors.

use std::fmt;

/// Result type for LOSGAP GPU operations
pub type Result<T> = std::result::Result<T, Error>;

/// LOSGAP GPU layer errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The resource's usage does not permit the requested operation.
    ///
    /// Always enforced, regardless of the validation layer.
    ResourceOperationUnavailable(String),

    /// A range or precondition check of the validation layer failed
    /// (out-of-range mip, write bounds, malformed builder combination...)
    AssuranceFailed(String),

    /// Construction parameters incompatible with the resource kind
    InvalidArgument(String),

    /// Hardware enumeration produced no usable device or output
    HardwareEnumeration(String),

    /// Operation not legal in the current state (wrong thread, running system...)
    InvalidOperation(String),

    /// Backend-specific error
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Initialization failed (system, device, subsystems)
    InitializationFailed(String),
}

impl Error {
    /// Build a usage violation for `operation` on a resource of the given usage
    pub(crate) fn usage_violation(operation: &str, usage: impl fmt::Display) -> Self {
        Error::ResourceOperationUnavailable(
            format!("Can not {} resource with usage '{}'.", operation, usage)
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ResourceOperationUnavailable(msg) => write!(f, "Resource operation unavailable: {}", msg),
            Error::AssuranceFailed(msg) => write!(f, "Assurance failed: {}", msg),
            Error::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            Error::HardwareEnumeration(msg) => write!(f, "Hardware enumeration failed: {}", msg),
            Error::InvalidOperation(msg) => write!(f, "Invalid operation: {}", msg),
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ===== ERROR MACROS =====

/// Log an error message and build an `Error::BackendError` from it
///
/// # Example
///
/// ```no_run
/// # use losgap_gpu::losgap_err;
/// let error = losgap_err!("losgap::soft", "Unknown resource handle {}", 42);
/// ```
#[macro_export]
macro_rules! losgap_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::losgap_error!($source, "{}", message);
        $crate::losgap::Error::BackendError(message)
    }};
}

/// Log an error message and return early with an `Error::BackendError`
///
/// # Example
///
/// ```no_run
/// # use losgap_gpu::{losgap_bail, losgap::Result};
/// fn check(ok: bool) -> Result<()> {
///     if !ok {
///         losgap_bail!("losgap::soft", "Check failed");
///     }
///     Ok(())
/// }
/// ```
#[macro_export]
macro_rules! losgap_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::losgap_err!($source, $($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
