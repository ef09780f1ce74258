//! # Types
//!
//! Value types shared by the resolution and rendering layers: addresses,
//! execution contexts, symbols, modules and stack frames. All of them are
//! immutable once built.

pub mod address;
pub mod module;
pub mod process;
pub mod stack;
pub mod symbols;

// Re-export all public types
pub use address::Address;
pub use module::{qualified_name, Function, Module, ModuleMap};
pub use process::{ExecutionContext, FrameIndex, ProcessContext, ProcessId, SystemId, ThreadId};
pub use stack::StackFrame;
pub use symbols::{SourceLineMapping, Symbol, SymbolLanguage, SymbolName};
