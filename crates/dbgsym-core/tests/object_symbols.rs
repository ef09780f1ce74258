//! Tests for loading symbol tables from object files

use dbgsym_core::error::DebuggerError;
use dbgsym_core::symbols::{load_symbol_table, symbol_table_from_bytes, ImageDescriptor, SymbolSource};
use dbgsym_core::types::{Address, SymbolLanguage};
use object::write::{Object, StandardSection, Symbol as WriteSymbol, SymbolSection};
use object::{Architecture, BinaryFormat, Endianness, SymbolFlags, SymbolKind, SymbolScope};

/// Relocatable x86-64 ELF with `start` at 0x0 (16 bytes) and a mangled Rust
/// function at 0x10 (8 bytes).
fn build_elf() -> Vec<u8>
{
    let mut obj = Object::new(BinaryFormat::Elf, Architecture::X86_64, Endianness::Little);
    let text = obj.section_id(StandardSection::Text);

    let start = obj.append_section_data(text, &[0x90; 16], 16);
    let work = obj.append_section_data(text, &[0xc3; 8], 16);

    for (name, value, size) in [
        ("start", start, 16),
        ("_ZN4demo4work17h0123456789abcdefE", work, 8),
    ] {
        obj.add_symbol(WriteSymbol {
            name: name.as_bytes().to_vec(),
            value,
            size,
            kind: SymbolKind::Text,
            scope: SymbolScope::Linkage,
            weak: false,
            section: SymbolSection::Section(text),
            flags: SymbolFlags::None,
        });
    }

    obj.write().unwrap()
}

#[test]
fn test_symbols_from_elf()
{
    let table = symbol_table_from_bytes("demo", &build_elf(), None).unwrap();
    assert_eq!(table.module(), "demo");
    assert_eq!(table.len(), 2);

    let start = table.find_by_name("start").unwrap();
    assert_eq!(start.address(), Address::from(0));
    assert_eq!(start.size(), Some(16));

    let work = table.find_by_name("demo::work").unwrap();
    assert_eq!(work.address(), Address::from(0x10));
    assert_eq!(work.name().language(), SymbolLanguage::Rust);
}

#[test]
fn test_load_address_slides_symbols()
{
    let table = symbol_table_from_bytes("demo", &build_elf(), Some(0x40_0000)).unwrap();
    let near = table.near_symbol(Address::from(0x40_0014)).unwrap();
    assert_eq!(near.symbol().name().display_name(), "demo::work");
    assert_eq!(near.offset_into_symbol(), 4);
    assert!(!near.is_inconsistent());
}

#[test]
fn test_load_from_disk()
{
    let path = std::env::temp_dir().join(format!("dbgsym-object-test-{}.o", std::process::id()));
    std::fs::write(&path, build_elf()).unwrap();

    let table = load_symbol_table(&ImageDescriptor::new(&path).with_load_address(0x1000)).unwrap();
    assert_eq!(table.find_by_name("start").unwrap().address(), Address::from(0x1000));

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_missing_file_is_io_error()
{
    let err = load_symbol_table(&ImageDescriptor::new("/nonexistent/dbgsym/image.so")).unwrap_err();
    assert!(matches!(err, DebuggerError::Io(_)));
}
