//! Process, thread and execution-context types.
//!
//! A debugger front end can be attached to several targets at once, so every
//! named entity it shows is scoped by an [`ExecutionContext`]. Functions,
//! modules and symbols only mean something per process; the thread and frame
//! parts of a context are dropped with [`ExecutionContext::process_scope`]
//! before a context is attached to such an entity.

use std::fmt;

/// Process identifier (PID)
///
/// ## Example
///
/// ```rust
/// use dbgsym_core::types::ProcessId;
///
/// let pid = ProcessId::from(4242);
/// assert_eq!(u32::from(pid), 4242);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProcessId(pub u32);

impl From<u32> for ProcessId
{
    fn from(pid: u32) -> Self
    {
        ProcessId(pid)
    }
}

impl From<ProcessId> for u32
{
    fn from(pid: ProcessId) -> Self
    {
        pid.0
    }
}

/// Thread identifier
///
/// Stored as a `u64` so that Mach thread ports, Linux TIDs and Windows thread
/// ids all fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ThreadId(pub u64);

impl ThreadId
{
    /// Raw `u64` representation of the thread identifier.
    ///
    /// ```rust
    /// use dbgsym_core::types::ThreadId;
    ///
    /// let thread = ThreadId::from(12345);
    /// assert_eq!(thread.raw(), 12345);
    /// ```
    #[must_use]
    pub fn raw(&self) -> u64
    {
        self.0
    }
}

impl From<u64> for ThreadId
{
    fn from(value: u64) -> Self
    {
        Self(value)
    }
}

/// Index of a debugging target ("system") inside one engine session.
///
/// Live user-mode targets, dump files and kernel connections each get their
/// own system index; two processes with the same PID on different systems are
/// different processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SystemId(pub u32);

impl From<u32> for SystemId
{
    fn from(value: u32) -> Self
    {
        Self(value)
    }
}

/// Position of a frame in a call stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameIndex
{
    /// Physical frame depth (0 = innermost).
    pub depth: u32,
    /// Depth inside the inline chain of that physical frame (0 = not inlined).
    pub inline_depth: u8,
}

impl FrameIndex
{
    /// Physical frame at `depth` with no inline component.
    pub const fn physical(depth: u32) -> Self
    {
        Self { depth, inline_depth: 0 }
    }
}

/// Full execution context: system, process, and optionally thread and frame.
///
/// Immutable; narrowing is done by projection, never by mutation.
///
/// ```rust
/// use dbgsym_core::types::{ExecutionContext, ProcessId, SystemId, ThreadId};
///
/// let a = ExecutionContext::new(SystemId(0), ProcessId(10)).with_thread(ThreadId(1));
/// let b = ExecutionContext::new(SystemId(0), ProcessId(10)).with_thread(ThreadId(2));
/// assert_ne!(a, b);
/// assert_eq!(a.process_scope(), b.process_scope());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExecutionContext
{
    system: SystemId,
    process: ProcessId,
    thread: Option<ThreadId>,
    frame: Option<FrameIndex>,
}

impl ExecutionContext
{
    /// Context naming a whole process.
    pub const fn new(system: SystemId, process: ProcessId) -> Self
    {
        Self {
            system,
            process,
            thread: None,
            frame: None,
        }
    }

    /// Copy of this context narrowed to `thread`.
    #[must_use]
    pub const fn with_thread(self, thread: ThreadId) -> Self
    {
        Self {
            thread: Some(thread),
            ..self
        }
    }

    /// Copy of this context narrowed to `frame`.
    ///
    /// A frame only makes sense on a thread; callers set the thread first.
    #[must_use]
    pub const fn with_frame(self, frame: FrameIndex) -> Self
    {
        Self {
            frame: Some(frame),
            ..self
        }
    }

    #[must_use]
    pub const fn system(&self) -> SystemId
    {
        self.system
    }

    #[must_use]
    pub const fn process(&self) -> ProcessId
    {
        self.process
    }

    #[must_use]
    pub const fn thread(&self) -> Option<ThreadId>
    {
        self.thread
    }

    #[must_use]
    pub const fn frame(&self) -> Option<FrameIndex>
    {
        self.frame
    }

    /// Reduce this context to process granularity.
    ///
    /// A function does not move when the current thread or frame changes, so
    /// anything that identifies code or data keys on the result of this call.
    #[must_use]
    pub const fn process_scope(&self) -> ProcessContext
    {
        ProcessContext {
            system: self.system,
            process: self.process,
        }
    }
}

impl From<ProcessContext> for ExecutionContext
{
    fn from(context: ProcessContext) -> Self
    {
        ExecutionContext::new(context.system, context.process)
    }
}

impl fmt::Display for ExecutionContext
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}:{}", self.system.0, self.process.0)?;
        if let Some(thread) = self.thread {
            write!(f, ":{}", thread.0)?;
            if let Some(frame) = self.frame {
                write!(f, ":{}", frame.depth)?;
                if frame.inline_depth != 0 {
                    write!(f, ".{}", frame.inline_depth)?;
                }
            }
        }
        Ok(())
    }
}

/// Execution context reduced to the owning process.
///
/// Two execution contexts that differ only in thread or frame produce equal
/// `ProcessContext` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProcessContext
{
    system: SystemId,
    process: ProcessId,
}

impl ProcessContext
{
    pub const fn new(system: SystemId, process: ProcessId) -> Self
    {
        Self { system, process }
    }

    #[must_use]
    pub const fn system(&self) -> SystemId
    {
        self.system
    }

    #[must_use]
    pub const fn process(&self) -> ProcessId
    {
        self.process
    }
}

impl From<&ExecutionContext> for ProcessContext
{
    fn from(context: &ExecutionContext) -> Self
    {
        context.process_scope()
    }
}

impl fmt::Display for ProcessContext
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}:{}", self.system.0, self.process.0)
    }
}
