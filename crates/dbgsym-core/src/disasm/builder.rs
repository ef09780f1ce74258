//! # Disassembly Line Builder
//!
//! Fluent construction of [`DisassemblyLine`] values from decoder output that
//! arrives field by field.
//!
//! Unlike [`DisassemblyLine::new`], the builder can express a missing
//! instruction or rendering; [`DisassemblyLineBuilder::build`] rejects both.

use super::line::{CodeBytes, DisassemblyLine};
use crate::color::ColorString;
use crate::error::{DebuggerError, Result};
use crate::types::Address;

/// Builder for [`DisassemblyLine`].
///
/// ## Example
///
/// ```rust
/// use dbgsym_core::disasm::DisassemblyLineBuilder;
/// use dbgsym_core::types::Address;
///
/// let line = DisassemblyLineBuilder::new(Address::from(0x1000))
///     .with_code_bytes(&[0x55])
///     .with_instruction("push")
///     .with_arguments("rbp")
///     .with_standard_rendering()
///     .build()?;
/// assert_eq!(line.arguments(), Some("rbp"));
/// # Ok::<(), dbgsym_core::error::DebuggerError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct DisassemblyLineBuilder
{
    address: Address,
    code_bytes: CodeBytes,
    instruction: Option<String>,
    arguments: Option<String>,
    block_tag: Option<ColorString>,
    rendering: Option<ColorString>,
    standard_rendering: bool,
}

impl DisassemblyLineBuilder
{
    /// Start a line at `address`.
    pub fn new(address: Address) -> Self
    {
        Self {
            address,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_code_bytes(mut self, bytes: &[u8]) -> Self
    {
        self.code_bytes = CodeBytes::from_slice(bytes);
        self
    }

    #[must_use]
    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self
    {
        self.instruction = Some(instruction.into());
        self
    }

    #[must_use]
    pub fn with_arguments(mut self, arguments: impl Into<String>) -> Self
    {
        self.arguments = Some(arguments.into());
        self
    }

    #[must_use]
    pub fn with_block_tag(mut self, tag: impl Into<ColorString>) -> Self
    {
        self.block_tag = Some(tag.into());
        self
    }

    /// Use an explicit rendering produced by the caller.
    #[must_use]
    pub fn with_rendering(mut self, rendering: ColorString) -> Self
    {
        self.rendering = Some(rendering);
        self.standard_rendering = false;
        self
    }

    /// Render with [`DisassemblyLine::standard_rendering`] at build time.
    #[must_use]
    pub fn with_standard_rendering(mut self) -> Self
    {
        self.rendering = None;
        self.standard_rendering = true;
        self
    }

    /// Validate and build the line.
    ///
    /// ## Errors
    ///
    /// [`DebuggerError::InvalidArgument`] when the address is zero, the
    /// instruction is missing or empty, or no rendering was supplied.
    pub fn build(self) -> Result<DisassemblyLine>
    {
        let instruction = self.instruction.unwrap_or_default();
        let rendering = match (self.rendering, self.standard_rendering) {
            (Some(rendering), _) => Some(rendering),
            (None, true) => Some(DisassemblyLine::standard_rendering(
                self.address,
                &self.code_bytes,
                &instruction,
                self.arguments.as_deref(),
                self.block_tag.as_ref(),
            )),
            (None, false) => None,
        };

        // Address and instruction checks come first so a zero address is
        // always reported as such.
        let Some(rendering) = rendering else {
            DisassemblyLine::new(self.address, &self.code_bytes, &instruction, None, None, ColorString::new())?;
            return Err(DebuggerError::InvalidArgument(format!(
                "disassembly line at {} has no rendering",
                self.address
            )));
        };

        DisassemblyLine::new(
            self.address,
            &self.code_bytes,
            &instruction,
            self.arguments.as_deref(),
            self.block_tag,
            rendering,
        )
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_missing_rendering_rejected()
    {
        let err = DisassemblyLineBuilder::new(Address::from(0x1000))
            .with_instruction("nop")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("no rendering"));
    }

    #[test]
    fn test_missing_instruction_rejected()
    {
        let err = DisassemblyLineBuilder::new(Address::from(0x1000))
            .with_rendering(ColorString::plain("nop"))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("empty instruction"));
    }

    #[test]
    fn test_zero_address_reported_first()
    {
        let err = DisassemblyLineBuilder::new(Address::ZERO).build().unwrap_err();
        assert!(err.to_string().contains("address zero"));
    }

    #[test]
    fn test_explicit_rendering_wins()
    {
        let line = DisassemblyLineBuilder::new(Address::from(0x1000))
            .with_instruction("int3")
            .with_standard_rendering()
            .with_rendering(ColorString::plain("breakpoint"))
            .build()
            .unwrap();
        assert_eq!(line.to_plain_text(), "breakpoint");
    }

    #[test]
    fn test_block_tag_flows_into_rendering()
    {
        let line = DisassemblyLineBuilder::new(Address::from(0x1000))
            .with_instruction("ret")
            .with_block_tag("__finally")
            .with_standard_rendering()
            .build()
            .unwrap();
        assert!(line.to_plain_text().starts_with("__finally:\n"));
        assert_eq!(line.block_tag().map(ColorString::to_plain_text).as_deref(), Some("__finally"));
    }
}
