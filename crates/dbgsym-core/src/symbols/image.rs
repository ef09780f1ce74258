//! Symbol-table loading from object files.
//!
//! Reads the linker symbol table (not debug information) of an ELF, Mach-O or
//! PE image with the `object` crate and turns it into a [`SymbolTable`]
//! relocated to where the image is loaded in the debuggee.

use std::fs;
use std::path::{Path, PathBuf};

use object::{Object, ObjectSegment, ObjectSymbol, SymbolKind};
use tracing::debug;

use super::table::SymbolTable;
use crate::error::{DebuggerError, Result};
use crate::types::{Address, Symbol};

/// Describes a binary image mapped in the debuggee.
#[derive(Debug, Clone)]
pub struct ImageDescriptor
{
    pub path: PathBuf,
    /// Runtime address of the image's text segment (`__TEXT` on Mach-O, else
    /// the lowest segment backed by file contents); `None` keeps link-time
    /// addresses.
    pub load_address: Option<u64>,
}

impl ImageDescriptor
{
    pub fn new(path: impl Into<PathBuf>) -> Self
    {
        Self {
            path: path.into(),
            load_address: None,
        }
    }

    #[must_use]
    pub fn with_load_address(mut self, load_address: u64) -> Self
    {
        self.load_address = Some(load_address);
        self
    }

    /// Module name used for qualified names: the file stem of the path.
    #[must_use]
    pub fn module_name(&self) -> String
    {
        module_name_from_path(&self.path)
    }
}

/// Read the image from disk and build its symbol table.
///
/// ## Errors
///
/// Returns [`DebuggerError::Io`] when the file cannot be read and
/// [`DebuggerError::ObjectParse`] when it is not a recognised object format.
pub fn load_symbol_table(descriptor: &ImageDescriptor) -> Result<SymbolTable>
{
    let bytes = fs::read(&descriptor.path)?;
    symbol_table_from_bytes(&descriptor.module_name(), &bytes, descriptor.load_address)
}

/// Build a symbol table from object file bytes already in memory.
///
/// Code and data symbols that are defined in the image are kept; undefined
/// imports, section and file symbols are skipped. When the static symbol table
/// is empty (stripped binaries) the dynamic symbol table is used instead.
///
/// ## Errors
///
/// Returns [`DebuggerError::ObjectParse`] when `data` is not a recognised
/// object format.
pub fn symbol_table_from_bytes(module: &str, data: &[u8], load_address: Option<u64>) -> Result<SymbolTable>
{
    let file = object::File::parse(data).map_err(|err| DebuggerError::ObjectParse(format!("{module}: {err}")))?;

    let link_base = link_base(file.segments().map(|segment| {
        let name = segment.name().ok().flatten().map(str::to_string);
        (name, segment.address(), segment.file_range().1)
    }));
    let slide = load_address.map_or(0, |load| load.wrapping_sub(link_base));

    let mut symbols = collect_symbols(file.symbols(), slide);
    if symbols.is_empty() {
        symbols = collect_symbols(file.dynamic_symbols(), slide);
    }

    debug!(
        module,
        link_base = format_args!("0x{link_base:x}"),
        slide = format_args!("0x{slide:x}"),
        count = symbols.len(),
        "loaded symbol table"
    );

    Ok(SymbolTable::from_symbols(module, symbols))
}

/// Link-time address that a load address refers to.
///
/// The `__TEXT` (Mach-O) or `.text` segment when present, otherwise the
/// lowest segment with file contents. `__PAGEZERO` and other reservations
/// without file contents never count.
fn link_base(segments: impl Iterator<Item = (Option<String>, u64, u64)>) -> u64
{
    let mut lowest_mapped: Option<u64> = None;
    for (name, address, file_size) in segments {
        if matches!(name.as_deref(), Some("__TEXT" | ".text")) {
            return address;
        }
        if file_size > 0 {
            lowest_mapped = Some(lowest_mapped.map_or(address, |lowest| lowest.min(address)));
        }
    }
    lowest_mapped.unwrap_or(0)
}

fn collect_symbols<'data, S, I>(iter: I, slide: u64) -> Vec<Symbol>
where
    S: ObjectSymbol<'data>,
    I: Iterator<Item = S>,
{
    iter.filter(|symbol| symbol.is_definition() && matches!(symbol.kind(), SymbolKind::Text | SymbolKind::Data))
        .filter_map(|symbol| {
            let name = symbol.name().ok().filter(|name| !name.is_empty())?;
            let address = Address::from(symbol.address().wrapping_add(slide));
            Some(Symbol::new(address, name).with_size(symbol.size()))
        })
        .collect()
}

fn module_name_from_path(path: &Path) -> String
{
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
