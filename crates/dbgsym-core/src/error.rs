//! # Error Types
//!
//! General error handling for symbol resolution and rendering.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages.

use thiserror::Error;

use crate::engine::{EngineError, ErrorCategory};
use crate::types::Address;

/// Main error type for dbgsym operations
///
/// ## Error Categories
///
/// 1. **Precondition violations**: `InvalidArgument` (zero address, empty
///    mnemonic, missing symbol or rendering). Raised at construction time and
///    fixable by the caller.
/// 2. **Lookup misses**: `SymbolNotFound`
/// 3. **Engine failures**: `Engine`, carrying the engine's status code
/// 4. **Input errors**: `ObjectParse`, `Io`
///
/// Near-symbol inconsistencies are not errors; they are reported as a flag on
/// [`crate::symbols::NearSymbol`].
#[derive(Error, Debug)]
pub enum DebuggerError
{
    /// A required value was missing or out of range
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No symbol is known at or before the address
    #[error("No symbol found near address {0}")]
    SymbolNotFound(Address),

    /// The debugging engine reported a failure
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// An object file could not be parsed
    #[error("Failed to parse object file: {0}")]
    ObjectParse(String),

    /// I/O error (reading images from disk, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DebuggerError
{
    /// Stable identifier for structured error reporting.
    #[must_use]
    pub fn identifier(&self) -> &str
    {
        match self {
            DebuggerError::InvalidArgument(_) => "InvalidArgument",
            DebuggerError::SymbolNotFound(_) => "SymbolNotFound",
            DebuggerError::Engine(err) => err.identifier(),
            DebuggerError::ObjectParse(_) => "ObjectParseFailed",
            DebuggerError::Io(_) => "IoFailed",
        }
    }

    /// Category for structured error reporting.
    #[must_use]
    pub fn category(&self) -> ErrorCategory
    {
        match self {
            DebuggerError::InvalidArgument(_) => ErrorCategory::InvalidArgument,
            DebuggerError::SymbolNotFound(_) => ErrorCategory::ObjectNotFound,
            DebuggerError::Engine(err) => err.category(),
            DebuggerError::ObjectParse(_) => ErrorCategory::InvalidArgument,
            DebuggerError::Io(err) if err.kind() == std::io::ErrorKind::PermissionDenied => ErrorCategory::PermissionDenied,
            DebuggerError::Io(err) if err.kind() == std::io::ErrorKind::NotFound => ErrorCategory::ObjectNotFound,
            DebuggerError::Io(_) => ErrorCategory::ResourceUnavailable,
        }
    }
}

/// Convenience type alias for `Result<T, DebuggerError>`
///
/// ```rust
/// use dbgsym_core::error::Result;
/// fn foo() -> Result<()>
/// {
///     Ok(())
/// }
/// ```
pub type Result<T> = std::result::Result<T, DebuggerError>;
