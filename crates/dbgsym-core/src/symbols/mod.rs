//! # Symbols
//!
//! Address-to-symbol resolution.
//!
//! - [`near`]: validated near-symbol results and their consistency check
//! - [`table`]: the [`SymbolSource`] seam and an in-memory [`SymbolTable`]
//! - [`image`]: symbol tables read from object files
//! - `demangle`: linkage-name classification

pub(crate) mod demangle;
pub mod image;
pub mod near;
pub mod table;

pub use image::{load_symbol_table, symbol_table_from_bytes, ImageDescriptor};
pub use near::NearSymbol;
pub use table::{SymbolSource, SymbolTable};
