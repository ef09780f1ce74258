//! # Disassembly
//!
//! Value types for decoded instructions. Decoding itself happens elsewhere;
//! this module validates what a decoder hands over and renders it.

pub mod builder;
pub mod line;

pub use builder::DisassemblyLineBuilder;
pub use line::{CodeBytes, DisassemblyLine, BYTE_COLUMN_WIDTH};
