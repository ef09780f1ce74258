//! Modules and functions scoped to a process.

use std::fmt;
use std::sync::Arc;

use super::{Address, ExecutionContext, ProcessContext, SymbolName};

/// A loaded image in a debuggee process.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Module
{
    name: String,
    base: Address,
    size: u64,
}

impl Module
{
    pub fn new(name: impl Into<String>, base: Address, size: u64) -> Self
    {
        Self {
            name: name.into(),
            base,
            size,
        }
    }

    /// Short module name (e.g. `ntdll`, `libc`), used as the `!` qualifier.
    #[must_use]
    pub fn name(&self) -> &str
    {
        &self.name
    }

    #[must_use]
    pub fn base(&self) -> Address
    {
        self.base
    }

    #[must_use]
    pub fn size(&self) -> u64
    {
        self.size
    }

    /// Returns `true` if `address` lies in `[base, base + size)`.
    pub fn contains(&self, address: Address) -> bool
    {
        address >= self.base && address.value() - self.base.value() < self.size
    }
}

/// Modules of one process, for attributing addresses to their owning image.
#[derive(Debug, Clone, Default)]
pub struct ModuleMap
{
    modules: Vec<Arc<Module>>,
}

impl ModuleMap
{
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Add a module; the map stays sorted by base address.
    pub fn insert(&mut self, module: Module) -> Arc<Module>
    {
        let module = Arc::new(module);
        let index = self.modules.partition_point(|m| m.base() <= module.base());
        self.modules.insert(index, Arc::clone(&module));
        module
    }

    /// Module whose range covers `address`.
    pub fn module_for(&self, address: Address) -> Option<Arc<Module>>
    {
        let index = self.modules.partition_point(|m| m.base() <= address).checked_sub(1)?;
        let module = &self.modules[index];
        module.contains(address).then(|| Arc::clone(module))
    }

    pub fn find_by_name(&self, name: &str) -> Option<Arc<Module>>
    {
        self.modules
            .iter()
            .find(|module| module.name().eq_ignore_ascii_case(name))
            .cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize
    {
        self.modules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool
    {
        self.modules.is_empty()
    }
}

/// A function in a debuggee process
///
/// Scoped to a [`ProcessContext`]: the same function reached from two threads
/// is one function.
///
/// ```rust
/// use std::sync::Arc;
///
/// use dbgsym_core::types::{Address, ExecutionContext, Function, Module, ProcessId, SystemId};
///
/// let context = ExecutionContext::new(SystemId(0), ProcessId(1));
/// let module = Arc::new(Module::new("mymodule", Address::from(0x1000), 0x1000));
/// let qualified = Function::new(&context, "DoWork", Address::from(0x1010), Some(module));
/// let bare = Function::new(&context, "DoWork", Address::from(0x9010), None);
///
/// assert_eq!(qualified.qualified_name(), "mymodule!DoWork");
/// assert_eq!(bare.qualified_name(), "DoWork");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function
{
    context: ProcessContext,
    name: SymbolName,
    address: Address,
    module: Option<Arc<Module>>,
}

impl Function
{
    /// Create a function, narrowing `context` to its process.
    pub fn new(context: &ExecutionContext, raw_name: impl Into<String>, address: Address, module: Option<Arc<Module>>) -> Self
    {
        Self {
            context: context.process_scope(),
            name: crate::symbols::demangle::make_symbol_name(raw_name.into()),
            address,
            module,
        }
    }

    /// Create a function and attribute it to the module covering `address`.
    pub fn in_modules(context: &ExecutionContext, raw_name: impl Into<String>, address: Address, modules: &ModuleMap) -> Self
    {
        Self::new(context, raw_name, address, modules.module_for(address))
    }

    #[must_use]
    pub fn context(&self) -> ProcessContext
    {
        self.context
    }

    #[must_use]
    pub fn name(&self) -> &SymbolName
    {
        &self.name
    }

    #[must_use]
    pub fn address(&self) -> Address
    {
        self.address
    }

    #[must_use]
    pub fn module(&self) -> Option<&Module>
    {
        self.module.as_deref()
    }

    /// `module!name` when the owning module is known, otherwise the bare name.
    ///
    /// A bare name in a stack listing is deliberate: it marks code that could
    /// not be attributed to any module.
    #[must_use]
    pub fn qualified_name(&self) -> String
    {
        qualified_name(self.module(), self.name.display_name())
    }
}

impl fmt::Display for Function
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(&self.qualified_name())
    }
}

/// `module!name`, or `name` alone when there is no module.
pub fn qualified_name(module: Option<&Module>, name: &str) -> String
{
    match module {
        Some(module) => format!("{}!{name}", module.name()),
        None => name.to_string(),
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::types::{ProcessId, SystemId, ThreadId};

    fn modules() -> ModuleMap
    {
        let mut map = ModuleMap::new();
        map.insert(Module::new("kernel32", Address::from(0x7000_0000), 0x10_0000));
        map.insert(Module::new("app", Address::from(0x40_0000), 0x2000));
        map
    }

    #[test]
    fn test_module_for_address()
    {
        let map = modules();
        assert_eq!(map.module_for(Address::from(0x40_1234)).unwrap().name(), "app");
        assert_eq!(map.module_for(Address::from(0x7000_0000)).unwrap().name(), "kernel32");
        assert!(map.module_for(Address::from(0x40_2000)).is_none());
        assert!(map.module_for(Address::from(0x10)).is_none());
    }

    #[test]
    fn test_find_module_by_name()
    {
        assert_eq!(modules().find_by_name("KERNEL32").unwrap().base(), Address::from(0x7000_0000));
    }

    #[test]
    fn test_function_attributed_to_module()
    {
        let context = ExecutionContext::new(SystemId(0), ProcessId(4));
        let map = modules();
        assert_eq!(Function::in_modules(&context, "DoWork", Address::from(0x40_0010), &map).qualified_name(), "app!DoWork");
        assert_eq!(Function::in_modules(&context, "DoWork", Address::from(0x9000_0000), &map).qualified_name(), "DoWork");
    }

    #[test]
    fn test_function_identity_ignores_thread()
    {
        let map = modules();
        let base = ExecutionContext::new(SystemId(0), ProcessId(4));
        let on_t1 = Function::in_modules(&base.with_thread(ThreadId(1)), "DoWork", Address::from(0x40_0010), &map);
        let on_t2 = Function::in_modules(&base.with_thread(ThreadId(2)), "DoWork", Address::from(0x40_0010), &map);
        assert_eq!(on_t1, on_t2);
        assert_eq!(on_t1.context(), base.process_scope());
    }

    #[test]
    fn test_qualified_name_uses_demangled_form()
    {
        let context = ExecutionContext::new(SystemId(0), ProcessId(4));
        let module = Arc::new(Module::new("app", Address::from(0x1000), 0x1000));
        let function = Function::new(&context, "_ZN3app4main17h0123456789abcdefE", Address::from(0x1010), Some(module));
        assert_eq!(function.to_string(), "app!app::main");
    }
}
