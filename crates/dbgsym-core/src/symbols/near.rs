//! # Near-symbol resolution
//!
//! Labels an arbitrary address with the closest known symbol and the byte
//! displacement between them.
//!
//! The symbol backend supplies a candidate base and a signed displacement
//! alongside the symbol it picked. Those three values must agree:
//! `candidate_base + displacement == symbol.address`, computed with 64-bit
//! two's-complement wraparound. When they do not, the binary was most likely
//! rewritten by a post-link layout optimiser after its symbols were emitted.
//! The result is still returned (a best-effort name beats no name) but is
//! flagged with [`NearSymbol::is_inconsistent`] so the caller can warn.
//!
//! Inputs are preserved as given. A displacement with an inverted sign (one
//! where `candidate_base - displacement` would have matched) is reported as an
//! ordinary inconsistency and not corrected.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::{DebuggerError, Result};
use crate::types::{Address, Symbol};

/// An address labelled with a nearby symbol.
///
/// Holds a shared reference to the symbol so the symbol outlives the result
/// regardless of what the backend does with its own copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NearSymbol
{
    queried_address: Address,
    queried_base: Address,
    displacement: i64,
    symbol: Arc<Symbol>,
    is_exact_match: bool,
    is_inconsistent: bool,
}

impl NearSymbol
{
    /// Validate a backend answer and build the result.
    ///
    /// ## Errors
    ///
    /// Returns [`DebuggerError::InvalidArgument`] when `symbol` is `None`. An
    /// arithmetic mismatch is *not* an error; see [`NearSymbol::is_inconsistent`].
    ///
    /// ## Example
    ///
    /// ```rust
    /// use std::sync::Arc;
    ///
    /// use dbgsym_core::symbols::NearSymbol;
    /// use dbgsym_core::types::{Address, Symbol};
    ///
    /// let foo = Arc::new(Symbol::new(Address::from(0x1004), "Foo"));
    /// let near = NearSymbol::resolve(Address::from(0x1000), Address::from(0x1000), 4, Some(foo))?;
    /// assert!(!near.is_exact_match());
    /// assert!(!near.is_inconsistent());
    /// # Ok::<(), dbgsym_core::error::DebuggerError>(())
    /// ```
    pub fn resolve(
        queried_address: Address,
        candidate_base: Address,
        displacement: i64,
        symbol: Option<Arc<Symbol>>,
    ) -> Result<Self>
    {
        let symbol = symbol.ok_or_else(|| {
            DebuggerError::InvalidArgument(format!("no symbol supplied for address {queried_address}"))
        })?;

        let expected = candidate_base.wrapping_offset(displacement);
        let is_inconsistent = expected != symbol.address();
        if is_inconsistent {
            debug!(
                queried = %queried_address,
                base = %candidate_base,
                displacement,
                expected = %expected,
                symbol_address = %symbol.address(),
                symbol = %symbol.name(),
                "near symbol arithmetic does not match the symbol table"
            );
        }

        Ok(Self {
            queried_address,
            queried_base: candidate_base,
            displacement,
            symbol,
            is_exact_match: displacement == 0,
            is_inconsistent,
        })
    }

    /// The address the caller asked about.
    #[must_use]
    pub fn queried_address(&self) -> Address
    {
        self.queried_address
    }

    /// The base the backend measured the displacement from.
    #[must_use]
    pub fn queried_base(&self) -> Address
    {
        self.queried_base
    }

    /// Signed displacement as reported by the backend.
    #[must_use]
    pub fn displacement(&self) -> i64
    {
        self.displacement
    }

    #[must_use]
    pub fn symbol(&self) -> &Symbol
    {
        &self.symbol
    }

    /// Shared handle to the symbol, for callers that keep it past this result.
    #[must_use]
    pub fn symbol_handle(&self) -> Arc<Symbol>
    {
        Arc::clone(&self.symbol)
    }

    /// `true` exactly when the displacement is zero.
    #[must_use]
    pub fn is_exact_match(&self) -> bool
    {
        self.is_exact_match
    }

    /// `true` when `queried_base + displacement` misses the symbol's address.
    #[must_use]
    pub fn is_inconsistent(&self) -> bool
    {
        self.is_inconsistent
    }

    /// Offset of the queried address from the start of the symbol.
    ///
    /// Computed from the symbol's own address rather than the backend's
    /// displacement, so it stays meaningful for inconsistent results.
    #[must_use]
    pub fn offset_into_symbol(&self) -> i64
    {
        self.queried_address.offset_from(self.symbol.address())
    }
}

impl fmt::Display for NearSymbol
{
    /// `name`, `name+0x10` or `name-0x10`, followed by ` (?)` when inconsistent.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}", self.symbol.name())?;
        let offset = self.offset_into_symbol();
        if offset > 0 {
            write!(f, "+0x{offset:x}")?;
        } else if offset < 0 {
            write!(f, "-0x{:x}", offset.unsigned_abs())?;
        }
        if self.is_inconsistent {
            write!(f, " (?)")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn symbol(address: u64, name: &str) -> Option<Arc<Symbol>>
    {
        Some(Arc::new(Symbol::new(Address::from(address), name)))
    }

    #[test]
    fn test_consistent_displacement()
    {
        let near = NearSymbol::resolve(Address::from(0x1000), Address::from(0x1000), 4, symbol(0x1004, "Foo")).unwrap();
        assert!(!near.is_exact_match());
        assert!(!near.is_inconsistent());
        assert_eq!(near.queried_base(), Address::from(0x1000));
        assert_eq!(near.displacement(), 4);
    }

    #[test]
    fn test_inconsistent_displacement_is_not_an_error()
    {
        let near = NearSymbol::resolve(Address::from(0x1000), Address::from(0x1000), 4, symbol(0x2000, "Foo")).unwrap();
        assert!(!near.is_exact_match());
        assert!(near.is_inconsistent());
        // Inputs are kept as given.
        assert_eq!(near.displacement(), 4);
        assert_eq!(near.symbol().address(), Address::from(0x2000));
    }

    #[test]
    fn test_exact_match()
    {
        let near = NearSymbol::resolve(Address::from(0x4000), Address::from(0x4000), 0, symbol(0x4000, "main")).unwrap();
        assert!(near.is_exact_match());
        assert!(!near.is_inconsistent());
        assert_eq!(near.to_string(), "main");
    }

    #[test]
    fn test_zero_displacement_against_other_address_is_exact_but_inconsistent()
    {
        let near = NearSymbol::resolve(Address::from(0x4000), Address::from(0x4000), 0, symbol(0x4010, "main")).unwrap();
        assert!(near.is_exact_match());
        assert!(near.is_inconsistent());
    }

    #[test]
    fn test_missing_symbol_is_rejected()
    {
        let err = NearSymbol::resolve(Address::from(0x1000), Address::from(0x1000), 0, None).unwrap_err();
        assert!(matches!(err, DebuggerError::InvalidArgument(_)));
    }

    #[test]
    fn test_wraparound_arithmetic()
    {
        let near = NearSymbol::resolve(Address::from(u64::MAX), Address::from(u64::MAX), 2, symbol(1, "low")).unwrap();
        assert!(!near.is_inconsistent());

        let near = NearSymbol::resolve(Address::from(0x10), Address::from(0x10), -0x20, symbol(u64::MAX - 0xf, "high")).unwrap();
        assert!(!near.is_inconsistent());
    }

    #[test]
    fn test_inverted_sign_is_reported_as_inconsistent()
    {
        // base - displacement would match; the resolver does not try that.
        let near = NearSymbol::resolve(Address::from(0x1010), Address::from(0x1010), 0x10, symbol(0x1000, "f")).unwrap();
        assert!(near.is_inconsistent());
    }

    #[test]
    fn test_display_offsets()
    {
        let after = NearSymbol::resolve(Address::from(0x1010), Address::from(0x1010), -0x10, symbol(0x1000, "f")).unwrap();
        assert_eq!(after.to_string(), "f+0x10");
        assert_eq!(after.offset_into_symbol(), 0x10);

        let before = NearSymbol::resolve(Address::from(0x1000), Address::from(0x1000), 4, symbol(0x1004, "g")).unwrap();
        assert_eq!(before.to_string(), "g-0x4");

        let bad = NearSymbol::resolve(Address::from(0x1010), Address::from(0x1010), 8, symbol(0x1000, "h")).unwrap();
        assert_eq!(bad.to_string(), "h+0x10 (?)");
    }

    #[test]
    fn test_symbol_outlives_backend_copy()
    {
        let shared = symbol(0x1000, "kept");
        let near = NearSymbol::resolve(Address::from(0x1000), Address::from(0x1000), 0, shared.clone()).unwrap();
        drop(shared);
        assert_eq!(near.symbol().name().display_name(), "kept");
        assert_eq!(Arc::strong_count(&near.symbol_handle()), 2);
    }
}
