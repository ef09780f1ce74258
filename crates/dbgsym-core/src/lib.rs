//! # dbgsym-core
//!
//! Symbol resolution and instruction-listing primitives for dbgsym.
//!
//! This crate provides the value types a debugger front end passes around when
//! it turns raw addresses into something a person can read:
//! - Near-symbol resolution with exact-match and consistency flags
//! - Colourised disassembly lines with a standard column layout
//! - Source line mappings with a validity window
//! - Execution and process contexts, modules and qualified function names
//! - Debug event filter descriptors
//! - The engine failure taxonomy
//!
//! Symbols come from a [`symbols::SymbolSource`]; the bundled
//! [`symbols::SymbolTable`] is built from an object file's symbol table.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use dbgsym_core::symbols::NearSymbol;
//! use dbgsym_core::types::{Address, Symbol};
//!
//! let symbol = Arc::new(Symbol::new(Address::from(0x1000), "main"));
//! let near = NearSymbol::resolve(Address::from(0x1010), Address::from(0x1010), -0x10, Some(symbol)).unwrap();
//! assert!(!near.is_exact_match());
//! assert_eq!(near.to_string(), "main+0x10");
//! ```

pub mod color;
pub mod disasm;
pub mod engine;
pub mod error;
pub mod events;
pub mod prelude;
pub mod symbols;
pub mod types;

// Re-export commonly used types
pub use error::{DebuggerError, Result};
