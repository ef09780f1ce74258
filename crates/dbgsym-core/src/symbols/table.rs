//! # Symbol Table
//!
//! In-memory symbol backend: a list of symbols sorted by address, answering
//! "which symbol is closest at or before this address?".
//!
//! ## Usage
//!
//! ```rust
//! use dbgsym_core::symbols::{SymbolSource, SymbolTable};
//! use dbgsym_core::types::{Address, Symbol};
//!
//! let table = SymbolTable::from_symbols("app", vec![
//!     Symbol::new(Address::from(0x1000), "main"),
//!     Symbol::new(Address::from(0x1040), "DoWork"),
//! ]);
//!
//! let near = table.near_symbol(Address::from(0x1048)).expect("symbol");
//! assert_eq!(near.to_string(), "DoWork+0x8");
//! ```

use std::sync::Arc;

use tracing::trace;

use super::near::NearSymbol;
use crate::types::{Address, Symbol};

/// A symbol backend that can label addresses.
///
/// Implementations own their symbols; results hand out shared references.
pub trait SymbolSource
{
    /// Closest symbol at or before `address`, if any.
    fn near_symbol(&self, address: Address) -> Option<NearSymbol>;

    /// Symbol starting exactly at `address`.
    fn symbol_at(&self, address: Address) -> Option<Arc<Symbol>>
    {
        self.near_symbol(address)
            .filter(NearSymbol::is_exact_match)
            .map(|near| near.symbol_handle())
    }
}

/// Sorted, immutable symbol table for one module.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable
{
    module: String,
    symbols: Vec<Arc<Symbol>>,
}

impl SymbolTable
{
    /// Build a table from unsorted symbols.
    ///
    /// Symbols sharing an address keep their input order; lookups return the
    /// first of them.
    pub fn from_symbols(module: impl Into<String>, symbols: impl IntoIterator<Item = Symbol>) -> Self
    {
        let mut symbols: Vec<Arc<Symbol>> = symbols.into_iter().map(Arc::new).collect();
        symbols.sort_by_key(|symbol| symbol.address());
        Self {
            module: module.into(),
            symbols,
        }
    }

    /// Name of the module the symbols belong to.
    #[must_use]
    pub fn module(&self) -> &str
    {
        &self.module
    }

    #[must_use]
    pub fn len(&self) -> usize
    {
        self.symbols.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool
    {
        self.symbols.is_empty()
    }

    /// Iterate symbols in address order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Symbol>>
    {
        self.symbols.iter()
    }

    /// Look a symbol up by raw or demangled name.
    pub fn find_by_name(&self, name: &str) -> Option<Arc<Symbol>>
    {
        self.symbols
            .iter()
            .find(|symbol| symbol.name().raw() == name || symbol.name().demangled() == Some(name))
            .cloned()
    }

    fn closest_at_or_before(&self, address: Address) -> Option<&Arc<Symbol>>
    {
        let after = self.symbols.partition_point(|symbol| symbol.address() <= address);
        let index = after.checked_sub(1)?;
        let target = self.symbols[index].address();
        // Step back to the first symbol at that address.
        let first = self.symbols[..=index].partition_point(|symbol| symbol.address() < target);
        self.symbols.get(first)
    }
}

impl SymbolSource for SymbolTable
{
    fn near_symbol(&self, address: Address) -> Option<NearSymbol>
    {
        let symbol = self.closest_at_or_before(address)?;
        let displacement = symbol.address().offset_from(address);
        trace!(%address, symbol = %symbol.name(), displacement, "symbol table lookup");
        // Consistent by construction: address + (symbol - address) == symbol.
        NearSymbol::resolve(address, address, displacement, Some(Arc::clone(symbol))).ok()
    }
}
