//! Stack frame types.

use std::fmt;

use super::{Address, ExecutionContext, Function, FrameIndex};
use crate::symbols::NearSymbol;

/// One entry of a call-stack listing.
#[derive(Debug, Clone)]
pub struct StackFrame
{
    /// Thread and frame the entry belongs to.
    pub context: ExecutionContext,
    /// Program counter (return address for outer frames).
    pub pc: Address,
    /// Function containing `pc`, when known.
    pub function: Option<Function>,
    /// Nearest symbol to `pc`, used when no function is known.
    pub near: Option<NearSymbol>,
}

impl StackFrame
{
    /// Frame position, taken from the context.
    #[must_use]
    pub fn index(&self) -> Option<FrameIndex>
    {
        self.context.frame()
    }

    /// Label for the frame's code location.
    ///
    /// Prefers the function's qualified name (with the offset of `pc` into it),
    /// then the near symbol, then the raw address.
    #[must_use]
    pub fn location(&self) -> String
    {
        if let Some(function) = &self.function {
            let offset = self.pc.offset_from(function.address());
            return match offset {
                0 => function.qualified_name(),
                o if o > 0 => format!("{}+0x{o:x}", function.qualified_name()),
                o => format!("{}-0x{:x}", function.qualified_name(), o.unsigned_abs()),
            };
        }
        match &self.near {
            Some(near) => near.to_string(),
            None => self.pc.to_string(),
        }
    }
}

impl fmt::Display for StackFrame
{
    /// `#02 0x00000000004010a0 app!DoWork+0x10`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let depth = self.index().map_or(0, |index| index.depth);
        write!(f, "#{depth:02} {} {}", self.pc, self.location())
    }
}

#[cfg(test)]
mod tests
{
    use std::sync::Arc;

    use super::*;
    use crate::types::{Module, ProcessId, Symbol, SystemId, ThreadId};

    fn context(depth: u32) -> ExecutionContext
    {
        ExecutionContext::new(SystemId(0), ProcessId(1))
            .with_thread(ThreadId(7))
            .with_frame(FrameIndex::physical(depth))
    }

    #[test]
    fn test_frame_with_function()
    {
        let module = Arc::new(Module::new("mymodule", Address::from(0x1000), 0x1000));
        let function = Function::new(&context(0), "DoWork", Address::from(0x1100), Some(module));
        let frame = StackFrame {
            context: context(2),
            pc: Address::from(0x1110),
            function: Some(function),
            near: None,
        };
        assert_eq!(frame.to_string(), "#02 0x0000000000001110 mymodule!DoWork+0x10");
    }

    #[test]
    fn test_frame_with_unattributed_function()
    {
        let function = Function::new(&context(0), "DoWork", Address::from(0x1100), None);
        let frame = StackFrame {
            context: context(0),
            pc: Address::from(0x1100),
            function: Some(function),
            near: None,
        };
        assert_eq!(frame.location(), "DoWork");
    }

    #[test]
    fn test_frame_falls_back_to_near_symbol_then_address()
    {
        let symbol = Arc::new(Symbol::new(Address::from(0x2000), "helper"));
        let near = NearSymbol::resolve(Address::from(0x2008), Address::from(0x2008), -8, Some(symbol)).unwrap();
        let frame = StackFrame {
            context: context(1),
            pc: Address::from(0x2008),
            function: None,
            near: Some(near),
        };
        assert_eq!(frame.location(), "helper+0x8");

        let bare = StackFrame { near: None, ..frame };
        assert_eq!(bare.location(), "0x0000000000002008");
    }
}
