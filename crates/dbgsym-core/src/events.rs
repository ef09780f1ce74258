//! Debug event filters.
//!
//! An event filter says what the debugger does when the target raises a debug
//! event: break into the debugger, print a line, or keep going. Exception
//! filters also say whether the exception counts as handled when execution
//! continues. The registry lists the well-known events with their default
//! policies; descriptors are plain immutable configuration.

use std::fmt;

use once_cell::sync::Lazy;

/// What happens when the event fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionPolicy
{
    /// Break into the debugger (first chance, for exceptions).
    Break,
    /// Break only on the second chance, when no handler took the exception.
    SecondChanceBreak,
    /// Print a notification and continue.
    Output,
    /// Continue silently.
    Ignore,
}

impl ExecutionPolicy
{
    /// Short form used in filter listings.
    pub const fn short_name(self) -> &'static str
    {
        match self {
            Self::Break => "break",
            Self::SecondChanceBreak => "second-chance break",
            Self::Output => "output",
            Self::Ignore => "ignore",
        }
    }
}

impl fmt::Display for ExecutionPolicy
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(self.short_name())
    }
}

/// How an exception is reported back to the target on continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContinuePolicy
{
    /// Mark the exception handled.
    Handled,
    /// Pass the exception on to the target's handlers.
    NotHandled,
}

impl ContinuePolicy
{
    pub const fn short_name(self) -> &'static str
    {
        match self {
            Self::Handled => "handled",
            Self::NotHandled => "not handled",
        }
    }
}

impl fmt::Display for ContinuePolicy
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(self.short_name())
    }
}

/// Whether a filter matches a specific debug event or an exception code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventFilterKind
{
    /// Non-exception debug event (thread/process/module lifecycle, output, ...).
    Specific,
    /// Exception with the given NTSTATUS-style code.
    Exception
    {
        /// Exception code as raised by the target (`0xC0000005` for an access violation).
        code: u32,
    },
}

/// Configuration for one debug event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFilterDescriptor
{
    friendly_name: String,
    code_name: Option<String>,
    kind: EventFilterKind,
    execution: ExecutionPolicy,
    continue_policy: ContinuePolicy,
    command: Option<String>,
}

impl EventFilterDescriptor
{
    /// Descriptor with the given policies.
    ///
    /// A missing `friendly_name` becomes the empty string; a blank
    /// `code_name` or `command` is stored as `None`.
    ///
    /// ```rust
    /// use dbgsym_core::events::{ContinuePolicy, EventFilterDescriptor, EventFilterKind, ExecutionPolicy};
    ///
    /// let filter = EventFilterDescriptor::new(
    ///     None,
    ///     Some("ld"),
    ///     EventFilterKind::Specific,
    ///     ExecutionPolicy::Output,
    ///     ContinuePolicy::NotHandled,
    ///     None,
    /// );
    /// assert_eq!(filter.friendly_name(), "");
    /// ```
    pub fn new(
        friendly_name: Option<&str>,
        code_name: Option<&str>,
        kind: EventFilterKind,
        execution: ExecutionPolicy,
        continue_policy: ContinuePolicy,
        command: Option<&str>,
    ) -> Self
    {
        let non_blank = |s: &str| (!s.trim().is_empty()).then(|| s.to_string());
        Self {
            friendly_name: friendly_name.unwrap_or_default().to_string(),
            code_name: code_name.and_then(non_blank),
            kind,
            execution,
            continue_policy,
            command: command.and_then(non_blank),
        }
    }

    fn specific(friendly_name: &str, code_name: &str, execution: ExecutionPolicy) -> Self
    {
        Self::new(
            Some(friendly_name),
            Some(code_name),
            EventFilterKind::Specific,
            execution,
            ContinuePolicy::NotHandled,
            None,
        )
    }

    fn exception(friendly_name: &str, code_name: &str, code: u32, execution: ExecutionPolicy, continue_policy: ContinuePolicy) -> Self
    {
        Self::new(
            Some(friendly_name),
            Some(code_name),
            EventFilterKind::Exception { code },
            execution,
            continue_policy,
            None,
        )
    }

    /// Copy of this descriptor that runs `command` when the event fires.
    #[must_use]
    pub fn with_command(&self, command: &str) -> Self
    {
        Self {
            command: (!command.trim().is_empty()).then(|| command.to_string()),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn friendly_name(&self) -> &str
    {
        &self.friendly_name
    }

    /// Short code name used by `sx`-style commands (`ld`, `av`, ...).
    #[must_use]
    pub fn code_name(&self) -> Option<&str>
    {
        self.code_name.as_deref()
    }

    #[must_use]
    pub fn kind(&self) -> EventFilterKind
    {
        self.kind
    }

    #[must_use]
    pub fn exception_code(&self) -> Option<u32>
    {
        match self.kind {
            EventFilterKind::Exception { code } => Some(code),
            EventFilterKind::Specific => None,
        }
    }

    #[must_use]
    pub fn execution(&self) -> ExecutionPolicy
    {
        self.execution
    }

    #[must_use]
    pub fn continue_policy(&self) -> ContinuePolicy
    {
        self.continue_policy
    }

    /// Debugger command run when the event fires.
    #[must_use]
    pub fn command(&self) -> Option<&str>
    {
        self.command.as_deref()
    }
}

impl fmt::Display for EventFilterDescriptor
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{:>5} - {}", self.code_name().unwrap_or(""), self.friendly_name)?;
        if let Some(code) = self.exception_code() {
            write!(f, " (0x{code:08x})")?;
        }
        write!(f, " - {}", self.execution)?;
        if self.exception_code().is_some() {
            write!(f, ", {}", self.continue_policy)?;
        }
        if let Some(command) = &self.command {
            write!(f, " - command: \"{command}\"")?;
        }
        Ok(())
    }
}

static WELL_KNOWN: Lazy<EventFilterRegistry> = Lazy::new(|| {
    use ContinuePolicy::{Handled, NotHandled};
    use ExecutionPolicy::{Break, Ignore, Output, SecondChanceBreak};

    EventFilterRegistry::new(vec![
        EventFilterDescriptor::specific("Create thread", "ct", Ignore),
        EventFilterDescriptor::specific("Exit thread", "et", Ignore),
        EventFilterDescriptor::specific("Create process", "cpr", Ignore),
        EventFilterDescriptor::specific("Exit process", "epr", Ignore),
        EventFilterDescriptor::specific("Load module", "ld", Output),
        EventFilterDescriptor::specific("Unload module", "ud", Output),
        EventFilterDescriptor::specific("System error", "ser", Ignore),
        EventFilterDescriptor::specific("Initial breakpoint", "ibp", Break),
        EventFilterDescriptor::specific("Initial module load", "iml", Ignore),
        EventFilterDescriptor::specific("Debuggee output", "out", Output),
        EventFilterDescriptor::exception("Access violation", "av", 0xC000_0005, Break, NotHandled),
        EventFilterDescriptor::exception("Assertion failure", "asrt", 0xC000_0420, Break, NotHandled),
        EventFilterDescriptor::exception("Application hang", "aph", 0xCFFF_FFFF, Break, NotHandled),
        EventFilterDescriptor::exception("Break instruction exception", "bpe", 0x8000_0003, Break, Handled),
        EventFilterDescriptor::exception("C++ EH exception", "eh", 0xE06D_7363, SecondChanceBreak, NotHandled),
        EventFilterDescriptor::exception("CLR exception", "clr", 0xE043_4352, SecondChanceBreak, NotHandled),
        EventFilterDescriptor::exception("Control-Break exception", "cce", 0x4001_0008, Break, Handled),
        EventFilterDescriptor::exception("Control-C exception", "cc", 0x4001_0005, Break, Handled),
        EventFilterDescriptor::exception("Data misaligned", "dm", 0x8000_0002, Break, NotHandled),
        EventFilterDescriptor::exception("Guard page violation", "gp", 0x8000_0001, Break, NotHandled),
        EventFilterDescriptor::exception("Illegal instruction", "ii", 0xC000_001D, SecondChanceBreak, NotHandled),
        EventFilterDescriptor::exception("In-page I/O error", "ip", 0xC000_0006, Break, NotHandled),
        EventFilterDescriptor::exception("Integer divide-by-zero", "dz", 0xC000_0094, Break, NotHandled),
        EventFilterDescriptor::exception("Integer overflow", "iov", 0xC000_0095, Break, NotHandled),
        EventFilterDescriptor::exception("Invalid handle", "ch", 0xC000_0008, Break, NotHandled),
        EventFilterDescriptor::exception("Single step exception", "sse", 0x8000_0004, Break, Handled),
        EventFilterDescriptor::exception("Stack buffer overflow", "sbo", 0xC000_0409, Break, NotHandled),
        EventFilterDescriptor::exception("Stack overflow", "sov", 0xC000_00FD, Break, NotHandled),
        EventFilterDescriptor::exception("Unknown exception", "*", 0, SecondChanceBreak, NotHandled),
    ])
});

/// Lookup table of event filters.
#[derive(Debug, Clone, Default)]
pub struct EventFilterRegistry
{
    filters: Vec<EventFilterDescriptor>,
}

impl EventFilterRegistry
{
    pub fn new(filters: Vec<EventFilterDescriptor>) -> Self
    {
        Self { filters }
    }

    /// The built-in filters with their default policies.
    pub fn well_known() -> &'static EventFilterRegistry
    {
        &WELL_KNOWN
    }

    pub fn iter(&self) -> impl Iterator<Item = &EventFilterDescriptor>
    {
        self.filters.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize
    {
        self.filters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool
    {
        self.filters.is_empty()
    }

    /// Filter by code name, case-insensitively.
    pub fn find(&self, code_name: &str) -> Option<&EventFilterDescriptor>
    {
        self.filters
            .iter()
            .find(|filter| filter.code_name().is_some_and(|name| name.eq_ignore_ascii_case(code_name)))
    }

    /// Filter for an exception code, falling back to the catch-all `*`
    /// filter when one is registered.
    pub fn find_exception(&self, code: u32) -> Option<&EventFilterDescriptor>
    {
        self.filters
            .iter()
            .find(|filter| code != 0 && filter.exception_code() == Some(code))
            .or_else(|| self.find("*"))
    }

    /// Specific (non-exception) filters only.
    pub fn specific(&self) -> impl Iterator<Item = &EventFilterDescriptor>
    {
        self.filters.iter().filter(|filter| filter.kind() == EventFilterKind::Specific)
    }

    /// Exception filters only.
    pub fn exceptions(&self) -> impl Iterator<Item = &EventFilterDescriptor>
    {
        self.filters.iter().filter(|filter| filter.exception_code().is_some())
    }
}
