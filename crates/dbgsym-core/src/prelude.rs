//! Common module for library exports

pub use crate::color::{ColorString, RunStyle};
pub use crate::disasm::{DisassemblyLine, DisassemblyLineBuilder};
pub use crate::engine::{EngineError, EngineErrorKind, ErrorCategory, StatusCode};
pub use crate::error::{DebuggerError, Result};
pub use crate::events::{EventFilterDescriptor, EventFilterRegistry};
pub use crate::symbols::{NearSymbol, SymbolSource, SymbolTable};
pub use crate::types::{Address, ExecutionContext, Function, Module, ProcessContext, SourceLineMapping, Symbol};
