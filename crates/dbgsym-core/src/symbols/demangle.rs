//! Symbol demangling utilities.
//!
//! Symbol tables hand out linkage names. This module turns them into
//! [`SymbolName`] values carrying a demangled form (when one can be produced)
//! and a language classification:
//!
//! - Rust: `_R` (v0), legacy `_ZN…17h<hash>E`, or names containing `::`
//! - C++: other Itanium `_Z` names and MSVC-decorated `?` names
//! - C: plain identifiers
//!
//! Only Rust names are demangled; C++ names keep their linkage form.

use rustc_demangle::try_demangle;

use crate::types::{SymbolLanguage, SymbolName};

/// Create a `SymbolName` from a raw linkage name.
pub(crate) fn make_symbol_name(raw: String) -> SymbolName
{
    // `{:#}` drops the trailing hash of legacy Rust symbols.
    let demangled = try_demangle(&raw).ok().map(|d| format!("{d:#}"));
    let language = classify(&raw, demangled.is_some());

    SymbolName::new(raw, demangled, language)
}

fn classify(raw: &str, rust_demangled: bool) -> SymbolLanguage
{
    if raw.starts_with("_R") || raw.contains("::") || (raw.starts_with("_ZN") && rust_demangled && is_legacy_rust(raw)) {
        SymbolLanguage::Rust
    } else if raw.starts_with("_Z") || raw.starts_with('?') {
        SymbolLanguage::Cpp
    } else if is_c_identifier(raw) {
        SymbolLanguage::C
    } else {
        SymbolLanguage::Unknown
    }
}

/// Legacy Rust symbols end in a `17h<16 hex digits>E` hash segment.
fn is_legacy_rust(raw: &str) -> bool
{
    let Some(body) = raw.strip_suffix('E') else {
        return false;
    };
    body.len() > 19 && body[body.len() - 19..].starts_with("17h") && body[body.len() - 16..].bytes().all(|b| b.is_ascii_hexdigit())
}

fn is_c_identifier(raw: &str) -> bool
{
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) if first == '_' || first.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c == '.' || c == '$' || c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_rust_legacy_symbol()
    {
        let name = make_symbol_name("_ZN4core3fmt5write17h0123456789abcdefE".to_string());
        assert_eq!(name.language(), SymbolLanguage::Rust);
        assert_eq!(name.display_name(), "core::fmt::write");
    }

    #[test]
    fn test_cpp_symbol_keeps_raw_name()
    {
        let name = make_symbol_name("_ZN3foo3barEv".to_string());
        assert_eq!(name.language(), SymbolLanguage::Cpp);
        assert_eq!(name.display_name(), name.raw());
    }

    #[test]
    fn test_msvc_decorated_is_cpp()
    {
        let name = make_symbol_name("?DoWork@@YAXXZ".to_string());
        assert_eq!(name.language(), SymbolLanguage::Cpp);
    }

    #[test]
    fn test_c_symbol()
    {
        let name = make_symbol_name("DoWork".to_string());
        assert_eq!(name.language(), SymbolLanguage::C);
        assert_eq!(name.demangled(), None);
        assert_eq!(name.display_name(), "DoWork");
    }
}
