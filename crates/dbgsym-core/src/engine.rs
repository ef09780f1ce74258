//! # Engine failures
//!
//! Typed failures reported by the debugging engine, keyed by the engine's
//! HRESULT-style status code.
//!
//! Every failure carries the status code, a human message, a stable
//! machine-readable identifier and an [`ErrorCategory`]. Callers dispatch on
//! the category (or on [`EngineErrorKind`]) and translate into user-facing
//! output; nothing here retries or recovers.
//!
//! ```rust
//! use dbgsym_core::engine::{EngineErrorKind, ErrorCategory, StatusCode};
//!
//! let err = StatusCode::ERROR_BUSY.check().unwrap_err();
//! assert_eq!(err.kind(), EngineErrorKind::AlreadyRunning);
//! assert_eq!(err.category(), ErrorCategory::ResourceBusy);
//! assert!(StatusCode::S_OK.check().is_ok());
//! ```

use std::fmt;

use thiserror::Error;

/// HRESULT-style status code returned by engine calls.
///
/// Negative values are failures; zero and positive values are successes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCode(pub i32);

#[allow(clippy::cast_possible_wrap)]
impl StatusCode
{
    pub const S_OK: Self = Self(0);
    pub const S_FALSE: Self = Self(1);
    pub const E_NOTIMPL: Self = Self(0x8000_4001_u32 as i32);
    pub const E_NOINTERFACE: Self = Self(0x8000_4002_u32 as i32);
    pub const E_FAIL: Self = Self(0x8000_4005_u32 as i32);
    pub const E_PENDING: Self = Self(0x8000_000A_u32 as i32);
    pub const E_UNEXPECTED: Self = Self(0x8000_FFFF_u32 as i32);
    pub const E_ACCESSDENIED: Self = Self(0x8007_0005_u32 as i32);
    pub const E_OUTOFMEMORY: Self = Self(0x8007_000E_u32 as i32);
    pub const E_INVALIDARG: Self = Self(0x8007_0057_u32 as i32);
    /// `HRESULT_FROM_WIN32(ERROR_BUSY)`
    pub const ERROR_BUSY: Self = Self(0x8007_00AA_u32 as i32);
    /// `HRESULT_FROM_WIN32(ERROR_TIMEOUT)`
    pub const ERROR_TIMEOUT: Self = Self(0x8007_05B4_u32 as i32);

    pub const fn is_success(self) -> bool
    {
        self.0 >= 0
    }

    pub const fn is_failure(self) -> bool
    {
        self.0 < 0
    }

    /// Status as the unsigned value engines print (`0x80004005`).
    #[allow(clippy::cast_sign_loss)]
    pub const fn as_u32(self) -> u32
    {
        self.0 as u32
    }

    /// `Ok(())` for success codes, otherwise the [`EngineError`] the code maps to.
    ///
    /// ## Errors
    ///
    /// Returns the failure with the kind registered for the code, or
    /// [`EngineErrorKind::Failure`] for unrecognised codes.
    pub fn check(self) -> Result<(), EngineError>
    {
        if self.is_success() {
            return Ok(());
        }
        let kind = match self {
            Self::ERROR_BUSY => EngineErrorKind::AlreadyRunning,
            Self::ERROR_TIMEOUT => EngineErrorKind::Timeout,
            _ => EngineErrorKind::Failure,
        };
        Err(EngineError::new(kind, self))
    }

    /// Short symbolic name for well-known codes.
    pub fn name(self) -> Option<&'static str>
    {
        let name = match self {
            Self::S_OK => "S_OK",
            Self::S_FALSE => "S_FALSE",
            Self::E_NOTIMPL => "E_NOTIMPL",
            Self::E_NOINTERFACE => "E_NOINTERFACE",
            Self::E_FAIL => "E_FAIL",
            Self::E_PENDING => "E_PENDING",
            Self::E_UNEXPECTED => "E_UNEXPECTED",
            Self::E_ACCESSDENIED => "E_ACCESSDENIED",
            Self::E_OUTOFMEMORY => "E_OUTOFMEMORY",
            Self::E_INVALIDARG => "E_INVALIDARG",
            Self::ERROR_BUSY => "ERROR_BUSY",
            Self::ERROR_TIMEOUT => "ERROR_TIMEOUT",
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Display for StatusCode
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "0x{:08x}", self.as_u32())?;
        if let Some(name) = self.name() {
            write!(f, " ({name})")?;
        }
        Ok(())
    }
}

impl From<i32> for StatusCode
{
    fn from(value: i32) -> Self
    {
        Self(value)
    }
}

/// Broad class of a failure, for callers that report errors in a structured
/// way (scripting hosts, JSON output).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory
{
    NotSpecified,
    InvalidArgument,
    InvalidOperation,
    ResourceBusy,
    ResourceUnavailable,
    OperationTimeout,
    PermissionDenied,
    ObjectNotFound,
}

impl ErrorCategory
{
    pub const fn as_str(self) -> &'static str
    {
        match self {
            Self::NotSpecified => "NotSpecified",
            Self::InvalidArgument => "InvalidArgument",
            Self::InvalidOperation => "InvalidOperation",
            Self::ResourceBusy => "ResourceBusy",
            Self::ResourceUnavailable => "ResourceUnavailable",
            Self::OperationTimeout => "OperationTimeout",
            Self::PermissionDenied => "PermissionDenied",
            Self::ObjectNotFound => "ObjectNotFound",
        }
    }
}

impl fmt::Display for ErrorCategory
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(self.as_str())
    }
}

/// Which engine failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineErrorKind
{
    /// Any engine call failure without a more specific kind.
    Failure,
    /// The target is already running, so the request cannot be serviced now.
    AlreadyRunning,
    /// A privileged sub-debugger session (e.g. a kernel debugger) was started
    /// inside another session that does not allow nesting.
    IllegalNesting,
    /// The engine did not answer within the allotted time.
    Timeout,
}

impl EngineErrorKind
{
    /// Stable identifier for this kind.
    pub const fn identifier(self) -> &'static str
    {
        match self {
            Self::Failure => "EngineFailure",
            Self::AlreadyRunning => "EngineAlreadyRunning",
            Self::IllegalNesting => "IllegalNestedSession",
            Self::Timeout => "EngineTimeout",
        }
    }

    /// Category used unless overridden.
    pub const fn default_category(self) -> ErrorCategory
    {
        match self {
            Self::Failure => ErrorCategory::NotSpecified,
            Self::AlreadyRunning => ErrorCategory::ResourceBusy,
            Self::IllegalNesting => ErrorCategory::InvalidOperation,
            Self::Timeout => ErrorCategory::OperationTimeout,
        }
    }

    fn default_message(self, status: StatusCode) -> String
    {
        match self {
            Self::Failure => format!("debugger engine call failed with {status}"),
            Self::AlreadyRunning => "the target is already running".to_string(),
            Self::IllegalNesting => "a privileged debugger session cannot be nested inside the current session".to_string(),
            Self::Timeout => "the debugger engine did not respond in time".to_string(),
        }
    }
}

/// A failure reported by the debugging engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} [{identifier}, status {status}]")]
pub struct EngineError
{
    kind: EngineErrorKind,
    status: StatusCode,
    message: String,
    identifier: String,
    category: ErrorCategory,
}

impl EngineError
{
    /// Failure of `kind` with the kind's default message, identifier and category.
    pub fn new(kind: EngineErrorKind, status: StatusCode) -> Self
    {
        Self {
            kind,
            status,
            message: kind.default_message(status),
            identifier: kind.identifier().to_string(),
            category: kind.default_category(),
        }
    }

    pub fn failure(status: StatusCode) -> Self
    {
        Self::new(EngineErrorKind::Failure, status)
    }

    pub fn already_running(status: StatusCode) -> Self
    {
        Self::new(EngineErrorKind::AlreadyRunning, status)
    }

    pub fn illegal_nesting(status: StatusCode) -> Self
    {
        Self::new(EngineErrorKind::IllegalNesting, status)
    }

    pub fn timeout(status: StatusCode) -> Self
    {
        Self::new(EngineErrorKind::Timeout, status)
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self
    {
        self.message = message.into();
        self
    }

    #[must_use]
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self
    {
        self.identifier = identifier.into();
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: ErrorCategory) -> Self
    {
        self.category = category;
        self
    }

    #[must_use]
    pub fn kind(&self) -> EngineErrorKind
    {
        self.kind
    }

    #[must_use]
    pub fn status(&self) -> StatusCode
    {
        self.status
    }

    #[must_use]
    pub fn message(&self) -> &str
    {
        &self.message
    }

    #[must_use]
    pub fn identifier(&self) -> &str
    {
        &self.identifier
    }

    #[must_use]
    pub fn category(&self) -> ErrorCategory
    {
        self.category
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_success_codes_pass()
    {
        assert!(StatusCode::S_OK.check().is_ok());
        assert!(StatusCode::S_FALSE.check().is_ok());
    }

    #[test]
    fn test_unknown_failure_maps_to_generic_kind()
    {
        let err = StatusCode(0x8765_4321_u32 as i32).check().unwrap_err();
        assert_eq!(err.kind(), EngineErrorKind::Failure);
        assert_eq!(err.category(), ErrorCategory::NotSpecified);
        assert!(err.message().contains("0x87654321"));
    }

    #[test]
    fn test_timeout_mapping()
    {
        let err = StatusCode::ERROR_TIMEOUT.check().unwrap_err();
        assert_eq!(err.kind(), EngineErrorKind::Timeout);
        assert_eq!(err.identifier(), "EngineTimeout");
    }

    #[test]
    fn test_illegal_nesting_defaults()
    {
        let err = EngineError::illegal_nesting(StatusCode::E_UNEXPECTED);
        assert_eq!(err.status(), StatusCode::E_UNEXPECTED);
        assert_eq!(err.identifier(), "IllegalNestedSession");
        assert_eq!(err.category(), ErrorCategory::InvalidOperation);
    }

    #[test]
    fn test_overrides()
    {
        let err = EngineError::already_running(StatusCode::E_FAIL)
            .with_message("process 12 is running")
            .with_identifier("TargetRunning")
            .with_category(ErrorCategory::InvalidOperation);
        assert_eq!(err.kind(), EngineErrorKind::AlreadyRunning);
        assert_eq!(err.to_string(), "process 12 is running [TargetRunning, status 0x80004005 (E_FAIL)]");
    }

    #[test]
    fn test_status_display()
    {
        assert_eq!(StatusCode::E_INVALIDARG.to_string(), "0x80070057 (E_INVALIDARG)");
        assert_eq!(StatusCode(0x8000_1234_u32 as i32).to_string(), "0x80001234");
    }
}
