//! Tests for near-symbol resolution through the public API

use std::sync::Arc;

use dbgsym_core::error::DebuggerError;
use dbgsym_core::symbols::{NearSymbol, SymbolSource, SymbolTable};
use dbgsym_core::types::{Address, Symbol};

fn foo_at(address: u64) -> Option<Arc<Symbol>>
{
    Some(Arc::new(Symbol::new(Address::from(address), "Foo")))
}

#[test]
fn test_consistent_non_exact_result()
{
    let near = NearSymbol::resolve(Address::from(0x1000), Address::from(0x1000), 4, foo_at(0x1004)).unwrap();
    assert!(!near.is_exact_match());
    assert!(!near.is_inconsistent());
    assert_eq!(near.symbol().name().raw(), "Foo");
}

#[test]
fn test_inconsistent_result_is_flagged_not_rejected()
{
    let near = NearSymbol::resolve(Address::from(0x1000), Address::from(0x1000), 4, foo_at(0x2000)).unwrap();
    assert!(!near.is_exact_match());
    assert!(near.is_inconsistent());
    assert!(near.to_string().ends_with("(?)"));
}

#[test]
fn test_exact_match_iff_zero_displacement()
{
    for displacement in [-16_i64, -1, 0, 1, 16, 0x1000] {
        let base = Address::from(0x8000);
        let near = NearSymbol::resolve(base, base, displacement, foo_at(base.wrapping_offset(displacement).value())).unwrap();
        assert_eq!(near.is_exact_match(), displacement == 0, "displacement {displacement}");
        assert!(!near.is_inconsistent());
    }
}

#[test]
fn test_consistency_uses_wrapping_arithmetic()
{
    let base = Address::from(u64::MAX - 1);
    let near = NearSymbol::resolve(base, base, 4, foo_at(2)).unwrap();
    assert!(!near.is_inconsistent());
}

#[test]
fn test_missing_symbol_is_invalid_argument()
{
    let err = NearSymbol::resolve(Address::from(0x1000), Address::from(0x1000), 0, None).unwrap_err();
    assert!(matches!(err, DebuggerError::InvalidArgument(_)));
    assert_eq!(err.identifier(), "InvalidArgument");
}

#[test]
fn test_symbol_is_shared_not_copied()
{
    let symbol = Arc::new(Symbol::new(Address::from(0x4000), "shared"));
    let near = NearSymbol::resolve(Address::from(0x4000), Address::from(0x4000), 0, Some(Arc::clone(&symbol))).unwrap();
    assert!(Arc::ptr_eq(&symbol, &near.symbol_handle()));
}

#[test]
fn test_table_lookup_is_consistent_by_construction()
{
    let table = SymbolTable::from_symbols(
        "app",
        vec![
            Symbol::new(Address::from(0x2000), "second"),
            Symbol::new(Address::from(0x1000), "first"),
        ],
    );

    assert!(table.near_symbol(Address::from(0x0fff)).is_none());

    let near = table.near_symbol(Address::from(0x1fff)).unwrap();
    assert_eq!(near.symbol().name().raw(), "first");
    assert!(!near.is_inconsistent());
    assert_eq!(near.offset_into_symbol(), 0xfff);

    let exact = table.symbol_at(Address::from(0x2000)).unwrap();
    assert_eq!(exact.name().raw(), "second");
    assert!(table.symbol_at(Address::from(0x2001)).is_none());
}
