//! Symbol and source-line types.

use std::fmt;

use super::Address;

/// Programming language associated with a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolLanguage
{
    /// Rust symbol (detected via mangling or namespace patterns).
    Rust,
    /// C++ symbol (Itanium mangling without Rust extensions, or MSVC `?` names).
    Cpp,
    /// C symbol or unmangled global.
    C,
    /// Unknown or mixed language.
    Unknown,
}

impl fmt::Display for SymbolLanguage
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let label = match self {
            SymbolLanguage::Rust => "rust",
            SymbolLanguage::Cpp => "c++",
            SymbolLanguage::C => "c",
            SymbolLanguage::Unknown => "unknown",
        };
        f.pad(label)
    }
}

/// A function or data name with demangling metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolName
{
    raw: String,
    demangled: Option<String>,
    language: SymbolLanguage,
}

impl SymbolName
{
    /// Construct from a raw linkage name.
    pub fn new(raw: String, demangled: Option<String>, language: SymbolLanguage) -> Self
    {
        Self {
            raw,
            demangled,
            language,
        }
    }

    /// Raw (mangled) name emitted in the object file.
    #[must_use]
    pub fn raw(&self) -> &str
    {
        &self.raw
    }

    /// Demangled human-friendly name if available.
    #[must_use]
    pub fn demangled(&self) -> Option<&str>
    {
        self.demangled.as_deref()
    }

    /// Preferred presentation (demangled fallback to raw).
    #[must_use]
    pub fn display_name(&self) -> &str
    {
        self.demangled.as_deref().unwrap_or(&self.raw)
    }

    /// Language classification for the symbol.
    #[must_use]
    pub fn language(&self) -> SymbolLanguage
    {
        self.language
    }
}

impl fmt::Display for SymbolName
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}", self.display_name())
    }
}

/// A named location supplied by a symbol backend
///
/// Symbols are created once by the backend and shared read-only afterwards
/// (usually behind an `Arc`); nothing in this crate mutates them.
///
/// ```rust
/// use dbgsym_core::types::{Address, Symbol};
///
/// let symbol = Symbol::new(Address::from(0x1004), "Foo");
/// assert_eq!(symbol.address(), Address::from(0x1004));
/// assert_eq!(symbol.name().display_name(), "Foo");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol
{
    address: Address,
    name: SymbolName,
    size: Option<u64>,
}

impl Symbol
{
    /// Build a symbol from a raw linkage name, demangling it when possible.
    pub fn new(address: Address, raw_name: impl Into<String>) -> Self
    {
        Self {
            address,
            name: crate::symbols::demangle::make_symbol_name(raw_name.into()),
            size: None,
        }
    }

    /// Build a symbol from an already classified name.
    pub fn with_name(address: Address, name: SymbolName) -> Self
    {
        Self {
            address,
            name,
            size: None,
        }
    }

    /// Attach the symbol's extent in bytes, when the backend knows it.
    #[must_use]
    pub fn with_size(mut self, size: u64) -> Self
    {
        self.size = (size != 0).then_some(size);
        self
    }

    #[must_use]
    pub fn address(&self) -> Address
    {
        self.address
    }

    #[must_use]
    pub fn name(&self) -> &SymbolName
    {
        &self.name
    }

    #[must_use]
    pub fn size(&self) -> Option<u64>
    {
        self.size
    }

    /// Returns `true` when the symbol has a known size that covers `address`.
    pub fn contains(&self, address: Address) -> bool
    {
        match self.size {
            Some(size) => address >= self.address && address.value() - self.address.value() < size,
            None => address == self.address,
        }
    }
}

impl fmt::Display for Symbol
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}", self.name)
    }
}

/// One address-to-source mapping with the byte range it stays valid for
///
/// `validity_window` counts how many bytes past `address` still map to the
/// same `file:line`.
///
/// ```rust
/// use dbgsym_core::types::{Address, SourceLineMapping};
///
/// let mapping = SourceLineMapping::new(Address::from(0x1000), "foo.c", 42, 10);
/// assert_eq!(mapping.to_string(), "foo.c:42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLineMapping
{
    address: Address,
    file: String,
    line: u32,
    validity_window: u64,
}

impl SourceLineMapping
{
    pub fn new(address: Address, file: impl Into<String>, line: u32, validity_window: u64) -> Self
    {
        Self {
            address,
            file: file.into(),
            line,
            validity_window,
        }
    }

    #[must_use]
    pub fn address(&self) -> Address
    {
        self.address
    }

    /// Absolute or workspace-relative path of the source file.
    #[must_use]
    pub fn file(&self) -> &str
    {
        &self.file
    }

    #[must_use]
    pub fn line(&self) -> u32
    {
        self.line
    }

    #[must_use]
    pub fn validity_window(&self) -> u64
    {
        self.validity_window
    }

    /// Returns `true` when `address` still maps to this `file:line`.
    pub fn covers(&self, address: Address) -> bool
    {
        address >= self.address && address.value() - self.address.value() <= self.validity_window
    }
}

impl fmt::Display for SourceLineMapping
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}:{}", self.file, self.line)
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_symbol_contains_with_size()
    {
        let symbol = Symbol::new(Address::from(0x1000), "do_work").with_size(0x20);
        assert!(symbol.contains(Address::from(0x1000)));
        assert!(symbol.contains(Address::from(0x101f)));
        assert!(!symbol.contains(Address::from(0x1020)));
        assert!(!symbol.contains(Address::from(0xfff)));
    }

    #[test]
    fn test_symbol_zero_size_is_unknown()
    {
        let symbol = Symbol::new(Address::from(0x1000), "do_work").with_size(0);
        assert_eq!(symbol.size(), None);
        assert!(symbol.contains(Address::from(0x1000)));
        assert!(!symbol.contains(Address::from(0x1001)));
    }

    #[test]
    fn test_source_line_covers_window()
    {
        let mapping = SourceLineMapping::new(Address::from(0x2000), "main.rs", 7, 4);
        assert!(mapping.covers(Address::from(0x2000)));
        assert!(mapping.covers(Address::from(0x2004)));
        assert!(!mapping.covers(Address::from(0x2005)));
        assert!(!mapping.covers(Address::from(0x1fff)));
    }
}
