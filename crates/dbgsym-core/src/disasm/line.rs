//! A single decoded instruction, ready for display.

use std::fmt;

use crossterm::style::Color;
use smallvec::SmallVec;

use crate::color::{ColorString, RunStyle};
use crate::error::{DebuggerError, Result};
use crate::types::Address;

/// Inline storage for instruction bytes (x86 tops out at 15).
pub type CodeBytes = SmallVec<[u8; 16]>;

/// Width, in bytes, that the hex column of [`DisassemblyLine::standard_rendering`]
/// is padded to.
pub const BYTE_COLUMN_WIDTH: usize = 8;

const ADDRESS_STYLE: RunStyle = RunStyle::fg(Color::DarkGrey);
const BYTES_STYLE: RunStyle = RunStyle::fg(Color::DarkYellow);
const MNEMONIC_STYLE: RunStyle = RunStyle::fg(Color::Cyan).bold();
const ARGUMENTS_STYLE: RunStyle = RunStyle::fg(Color::White);
const TAG_STYLE: RunStyle = RunStyle::fg(Color::Magenta);

/// One disassembled instruction
///
/// Immutable once built. The address is never zero, the mnemonic is never
/// empty, and optional text fields are either absent or hold something other
/// than whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisassemblyLine
{
    address: Address,
    code_bytes: CodeBytes,
    instruction: String,
    arguments: Option<String>,
    block_tag: Option<ColorString>,
    rendering: ColorString,
}

impl DisassemblyLine
{
    /// Build a line from decoder output.
    ///
    /// Empty or whitespace-only `arguments` and `block_tag` are stored as
    /// `None`.
    ///
    /// ## Errors
    ///
    /// [`DebuggerError::InvalidArgument`] when `address` is zero or
    /// `instruction` is empty.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use dbgsym_core::color::ColorString;
    /// use dbgsym_core::disasm::DisassemblyLine;
    /// use dbgsym_core::types::Address;
    ///
    /// let line = DisassemblyLine::new(Address::from(0x1000), &[0xc3], "ret", Some(""), None, ColorString::plain("ret"))?;
    /// assert_eq!(line.arguments(), None);
    /// # Ok::<(), dbgsym_core::error::DebuggerError>(())
    /// ```
    pub fn new(
        address: Address,
        code_bytes: &[u8],
        instruction: &str,
        arguments: Option<&str>,
        block_tag: Option<ColorString>,
        rendering: ColorString,
    ) -> Result<Self>
    {
        if address.is_null() {
            return Err(DebuggerError::InvalidArgument(
                "disassembly line address must be non-zero: no valid code exists at address zero".to_string(),
            ));
        }
        if instruction.is_empty() {
            return Err(DebuggerError::InvalidArgument(format!(
                "disassembly line at {address} has an empty instruction"
            )));
        }

        Ok(Self {
            address,
            code_bytes: CodeBytes::from_slice(code_bytes),
            instruction: instruction.to_string(),
            arguments: arguments.filter(|args| !args.trim().is_empty()).map(str::to_string),
            block_tag: block_tag.filter(|tag| !tag.is_blank()),
            rendering,
        })
    }

    /// Build a line whose rendering is [`DisassemblyLine::standard_rendering`].
    ///
    /// ## Errors
    ///
    /// Same preconditions as [`DisassemblyLine::new`].
    pub fn with_standard_rendering(
        address: Address,
        code_bytes: &[u8],
        instruction: &str,
        arguments: Option<&str>,
        block_tag: Option<ColorString>,
    ) -> Result<Self>
    {
        let rendering = Self::standard_rendering(address, code_bytes, instruction, arguments, block_tag.as_ref());
        Self::new(address, code_bytes, instruction, arguments, block_tag, rendering)
    }

    /// Conventional colorized layout of an instruction
    ///
    /// ```text
    /// <tag>:
    /// 00000000`00401000 4889e5           mov     rbp,rsp
    /// ```
    ///
    /// The tag line appears only when a non-blank tag is given. Bytes are hex,
    /// padded to [`BYTE_COLUMN_WIDTH`] bytes; the mnemonic is padded to seven
    /// columns when arguments follow.
    pub fn standard_rendering(
        address: Address,
        code_bytes: &[u8],
        instruction: &str,
        arguments: Option<&str>,
        block_tag: Option<&ColorString>,
    ) -> ColorString
    {
        let mut out = ColorString::new();

        if let Some(tag) = block_tag.filter(|tag| !tag.is_blank()) {
            for run in tag.runs() {
                let style = if run.style().is_plain() { TAG_STYLE } else { run.style() };
                out.push(run.text(), style);
            }
            out.push(":\n", TAG_STYLE);
        }

        let value = address.value();
        out.push(&format!("{:08x}`{:08x}", value >> 32, value & 0xffff_ffff), ADDRESS_STYLE);
        out.push_plain(" ");

        let hex = hex_bytes(code_bytes);
        out.push(&hex, BYTES_STYLE);
        let pad = (BYTE_COLUMN_WIDTH * 2).saturating_sub(hex.len()) + 1;
        out.push_plain(&" ".repeat(pad));

        match arguments.map(str::trim).filter(|args| !args.is_empty()) {
            Some(args) => {
                out.push(&format!("{instruction:<7}"), MNEMONIC_STYLE);
                out.push_plain(" ");
                out.push(args, ARGUMENTS_STYLE);
            }
            None => {
                out.push(instruction, MNEMONIC_STYLE);
            }
        }
        out
    }

    #[must_use]
    pub fn address(&self) -> Address
    {
        self.address
    }

    /// Raw instruction bytes; may be empty when the decoder did not supply them.
    #[must_use]
    pub fn code_bytes(&self) -> &[u8]
    {
        &self.code_bytes
    }

    /// Mnemonic.
    #[must_use]
    pub fn instruction(&self) -> &str
    {
        &self.instruction
    }

    /// Operand text, absent when the instruction has none.
    #[must_use]
    pub fn arguments(&self) -> Option<&str>
    {
        self.arguments.as_deref()
    }

    /// Basic-block or EH-region label preceding the instruction.
    #[must_use]
    pub fn block_tag(&self) -> Option<&ColorString>
    {
        self.block_tag.as_ref()
    }

    /// The stored colorized rendering.
    #[must_use]
    pub fn to_colorized(&self) -> &ColorString
    {
        &self.rendering
    }

    /// The rendering as a non-colour terminal would show it.
    #[must_use]
    pub fn to_plain_text(&self) -> String
    {
        self.rendering.to_plain_text()
    }

    /// Length of the instruction in bytes, when the bytes are known.
    #[must_use]
    pub fn len(&self) -> usize
    {
        self.code_bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool
    {
        self.code_bytes.is_empty()
    }
}

impl fmt::Display for DisassemblyLine
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}", self.rendering)
    }
}

fn hex_bytes(bytes: &[u8]) -> String
{
    use std::fmt::Write;

    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn render(text: &str) -> ColorString
    {
        ColorString::plain(text)
    }

    #[test]
    fn test_zero_address_rejected()
    {
        let err = DisassemblyLine::new(Address::ZERO, &[0x90], "nop", None, None, render("nop")).unwrap_err();
        assert!(matches!(err, DebuggerError::InvalidArgument(_)));
    }

    #[test]
    fn test_zero_address_rejected_even_when_other_fields_are_bad()
    {
        let err = DisassemblyLine::new(Address::ZERO, &[], "", None, None, ColorString::new()).unwrap_err();
        assert!(err.to_string().contains("address zero"));
    }

    #[test]
    fn test_empty_instruction_rejected()
    {
        let result = DisassemblyLine::new(Address::from(0x1000), &[0x90], "", None, None, render("nop"));
        assert!(matches!(result, Err(DebuggerError::InvalidArgument(_))));
    }

    #[test]
    fn test_blank_arguments_normalized()
    {
        for args in [Some(""), Some("   "), Some("\t"), None] {
            let line = DisassemblyLine::new(Address::from(0x1000), &[0xc3], "ret", args, None, render("ret")).unwrap();
            assert_eq!(line.arguments(), None);
        }
    }

    #[test]
    fn test_arguments_kept()
    {
        let line =
            DisassemblyLine::new(Address::from(0x1000), &[0x48, 0x89, 0xe5], "mov", Some("rbp,rsp"), None, render("mov rbp,rsp"))
                .unwrap();
        assert_eq!(line.arguments(), Some("rbp,rsp"));
        assert_eq!(line.code_bytes(), &[0x48, 0x89, 0xe5]);
        assert_eq!(line.len(), 3);
    }

    #[test]
    fn test_blank_block_tag_normalized()
    {
        let tag = ColorString::styled("  ", RunStyle::fg(Color::Magenta));
        let line = DisassemblyLine::new(Address::from(0x1000), &[0xc3], "ret", None, Some(tag), render("ret")).unwrap();
        assert!(line.block_tag().is_none());

        let line =
            DisassemblyLine::new(Address::from(0x1000), &[0xc3], "ret", None, Some(ColorString::new()), render("ret")).unwrap();
        assert!(line.block_tag().is_none());
    }

    #[test]
    fn test_empty_code_bytes_allowed()
    {
        let line = DisassemblyLine::new(Address::from(0x1000), &[], "ret", None, None, render("ret")).unwrap();
        assert!(line.is_empty());
    }

    #[test]
    fn test_standard_rendering_layout()
    {
        let line =
            DisassemblyLine::with_standard_rendering(Address::from(0x401000), &[0x48, 0x89, 0xe5], "mov", Some("rbp,rsp"), None)
                .unwrap();
        assert_eq!(line.to_plain_text(), "00000000`00401000 4889e5           mov     rbp,rsp");
    }

    #[test]
    fn test_standard_rendering_with_tag()
    {
        let tag = ColorString::plain("$LN3");
        let line = DisassemblyLine::with_standard_rendering(Address::from(0x7ff6_1234_5678), &[0xc3], "ret", None, Some(tag)).unwrap();
        assert_eq!(line.to_plain_text(), "$LN3:\n00007ff6`12345678 c3               ret");
        assert_eq!(line.block_tag().unwrap().to_plain_text(), "$LN3");
    }

    #[test]
    fn test_colorized_is_stored_rendering()
    {
        let rendering = ColorString::styled("custom", RunStyle::fg(Color::Red));
        let line = DisassemblyLine::new(Address::from(0x1000), &[0xc3], "ret", None, None, rendering.clone()).unwrap();
        assert_eq!(line.to_colorized(), &rendering);
        assert_eq!(line.to_plain_text(), "custom");
    }

    #[test]
    fn test_plain_text_has_no_control_sequences()
    {
        let rendering = ColorString::from_ansi("\u{1b}[36mnop\u{1b}[0m");
        let line = DisassemblyLine::new(Address::from(0x1000), &[0x90], "nop", Some("\u{1b}[1m"), None, rendering).unwrap();
        assert!(!line.to_plain_text().contains('\u{1b}'));
    }
}
