use std::path::PathBuf;
use std::{env, process};

use clap::{Parser, Subcommand};
use dbgsym_core::disasm::DisassemblyLineBuilder;
use dbgsym_core::events::EventFilterRegistry;
use dbgsym_core::symbols::{load_symbol_table, ImageDescriptor, NearSymbol, SymbolSource, SymbolTable};
use dbgsym_core::types::{qualified_name, Address, Module, SourceLineMapping, Symbol};
use dbgsym_core::{color::ColorString, DebuggerError, Result as DebuggerResult};
use dbgsym_utils::{debug, info, init_logging, LogFormat, LogLevel, LoggingConfig};

/// Near-symbol resolution and disassembly line rendering.
#[derive(Parser, Debug)]
#[command(name = "dbgsym")]
#[command(version)]
#[command(about = "Resolve addresses to symbols and render disassembly lines", long_about = None)]
struct Cli
{
    /// Log level (overrides RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    /// Log format: pretty or json (overrides DBGSYM_LOG_FORMAT)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    /// Disable colour output (also disabled when NO_COLOR is set)
    #[arg(long, global = true, default_value_t = false)]
    plain: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands
{
    /// Find the symbol closest to an address in a binary
    Resolve
    {
        /// Path to an ELF, Mach-O or PE image
        binary: PathBuf,
        /// Address to resolve (hex 0x1000 or decimal)
        #[arg(value_parser = parse_address)]
        address: u64,
        /// Runtime address of the image's text segment (__TEXT on Mach-O)
        #[arg(long, value_parser = parse_address)]
        load_address: Option<u64>,
    },
    /// List the symbol table of a binary
    Symbols
    {
        /// Path to an ELF, Mach-O or PE image
        binary: PathBuf,
        /// Runtime address of the image's text segment (__TEXT on Mach-O)
        #[arg(long, value_parser = parse_address)]
        load_address: Option<u64>,
    },
    /// Validate a near-symbol result reported by a symbol engine
    Check
    {
        /// Address that was queried
        #[arg(value_parser = parse_address)]
        address: u64,
        /// Base the engine reported for the query
        #[arg(value_parser = parse_address)]
        base: u64,
        /// Displacement the engine reported (may be negative)
        #[arg(value_parser = parse_displacement, allow_hyphen_values = true)]
        displacement: i64,
        /// Address of the symbol the engine returned
        #[arg(value_parser = parse_address)]
        symbol_address: u64,
        /// Name of the symbol the engine returned
        #[arg(long, default_value = "<symbol>")]
        name: String,
    },
    /// Render one disassembly line
    Line
    {
        /// Instruction address
        #[arg(value_parser = parse_address)]
        address: u64,
        /// Mnemonic
        instruction: String,
        /// Code bytes as hex (e.g. 4889e5 or "48 89 e5")
        #[arg(long, value_parser = parse_code_bytes, default_value = "")]
        bytes: CodeBytesArg,
        /// Operands
        #[arg(long = "args", allow_hyphen_values = true)]
        arguments: Option<String>,
        /// Block tag printed on its own line above the instruction
        #[arg(long)]
        tag: Option<String>,
    },
    /// Print a source line mapping
    SourceLine
    {
        /// Address of the first byte of the line
        #[arg(value_parser = parse_address)]
        address: u64,
        /// Source file
        file: String,
        /// Line number
        line: u32,
        /// Bytes beyond the address that map to the same line
        #[arg(long, default_value_t = 0)]
        window: u64,
        /// Check whether this address is covered by the mapping
        #[arg(long, value_parser = parse_address)]
        probe: Option<u64>,
    },
    /// List the well-known debug event filters
    Filters
    {
        /// Show one filter by code name (ld, av, ...) or exception code (0xc0000005)
        #[arg(long)]
        code: Option<String>,
    },
}

#[derive(Debug, Clone, Default)]
struct CodeBytesArg(Vec<u8>);

fn main()
{
    let cli = Cli::parse();
    let color = !cli.plain && env::var_os("NO_COLOR").is_none();

    let config = LoggingConfig::from_env()
        .with_level(cli.log_level)
        .with_format(cli.log_format)
        .with_ansi(color);

    let _guard = match init_logging(&config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, color) {
        eprintln!("Error: {e}");
        eprintln!("  [{}: {}]", e.category(), e.identifier());
        process::exit(1);
    }
}

fn run_command(command: Commands, color: bool) -> DebuggerResult<()>
{
    match command {
        Commands::Resolve {
            binary,
            address,
            load_address,
        } => {
            let (table, module) = open_image(binary, load_address)?;
            let address = Address::from(address);
            let near = table.near_symbol(address).ok_or(DebuggerError::SymbolNotFound(address))?;
            print_near(&near, Some(&module));
            Ok(())
        }
        Commands::Symbols { binary, load_address } => {
            let (table, _) = open_image(binary, load_address)?;
            for symbol in table.iter() {
                let size = symbol.size().map_or_else(|| "-".to_string(), |size| format!("0x{size:x}"));
                println!(
                    "{} {size:>8} {:<7} {}",
                    symbol.address(),
                    symbol.name().language(),
                    symbol.name().display_name()
                );
            }
            info!(module = table.module(), count = table.len(), "listed symbols");
            Ok(())
        }
        Commands::Check {
            address,
            base,
            displacement,
            symbol_address,
            name,
        } => {
            let symbol = Symbol::new(Address::from(symbol_address), name);
            let near = NearSymbol::resolve(Address::from(address), Address::from(base), displacement, Some(symbol.into()))?;
            print_near(&near, None);
            println!("  exact match:  {}", near.is_exact_match());
            println!("  inconsistent: {}", near.is_inconsistent());
            Ok(())
        }
        Commands::Line {
            address,
            instruction,
            bytes,
            arguments,
            tag,
        } => {
            let mut builder = DisassemblyLineBuilder::new(Address::from(address))
                .with_code_bytes(&bytes.0)
                .with_instruction(instruction);
            if let Some(arguments) = arguments {
                builder = builder.with_arguments(arguments);
            }
            if let Some(tag) = tag {
                builder = builder.with_block_tag(ColorString::from_ansi(&tag));
            }
            let line = builder.with_standard_rendering().build()?;
            print_colored(line.to_colorized(), color);
            Ok(())
        }
        Commands::SourceLine {
            address,
            file,
            line,
            window,
            probe,
        } => {
            let mapping = SourceLineMapping::new(Address::from(address), file, line, window);
            println!("{mapping}");
            if let Some(probe) = probe {
                let probe = Address::from(probe);
                println!("  {probe} covered: {}", mapping.covers(probe));
            }
            Ok(())
        }
        Commands::Filters { code } => {
            let registry = EventFilterRegistry::well_known();
            match code {
                Some(code) => {
                    let filter = match parse_address(&code) {
                        Ok(exception) => u32::try_from(exception).ok().and_then(|c| registry.find_exception(c)),
                        Err(_) => registry.find(&code),
                    };
                    let filter = filter.ok_or_else(|| DebuggerError::InvalidArgument(format!("unknown event filter: {code}")))?;
                    println!("{filter}");
                }
                None => {
                    for filter in registry.iter() {
                        println!("{filter}");
                    }
                }
            }
            Ok(())
        }
    }
}

fn open_image(binary: PathBuf, load_address: Option<u64>) -> DebuggerResult<(SymbolTable, Module)>
{
    let mut descriptor = ImageDescriptor::new(binary);
    if let Some(load_address) = load_address {
        descriptor = descriptor.with_load_address(load_address);
    }
    info!(path = %descriptor.path.display(), "loading symbols");
    let table = load_symbol_table(&descriptor)?;

    let base = table.iter().next().map_or(Address::ZERO, |symbol| symbol.address());
    let end = table
        .iter()
        .map(|symbol| symbol.address().value().saturating_add(symbol.size().unwrap_or(1)))
        .max()
        .unwrap_or(0);
    let module = Module::new(table.module(), base, end.saturating_sub(base.value()));
    debug!(module = module.name(), base = %module.base(), size = module.size(), "image extent");
    Ok((table, module))
}

fn print_near(near: &NearSymbol, module: Option<&Module>)
{
    println!("{} {}", near.queried_address(), qualified_name(module, &near.to_string()));
}

fn print_colored(text: &ColorString, color: bool)
{
    if color {
        println!("{}", text.to_ansi());
    } else {
        println!("{}", text.to_plain_text());
    }
}

/// Parse `0x`-prefixed hex, split hex (`00007ff6`12345678`) or decimal.
fn parse_address(s: &str) -> Result<u64, String>
{
    let split = s.contains('`');
    let s = s.trim().replace(['_', '`'], "");
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None if split => u64::from_str_radix(&s, 16),
        None => s.parse::<u64>(),
    };
    parsed.map_err(|e| format!("invalid address '{s}': {e}"))
}

fn parse_displacement(s: &str) -> Result<i64, String>
{
    let (negative, magnitude) = match s.trim().strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.trim().trim_start_matches('+')),
    };
    let value = parse_address(magnitude)?;
    let signed = if negative {
        0_i64.checked_sub_unsigned(value)
    } else {
        i64::try_from(value).ok()
    };
    signed.ok_or_else(|| format!("displacement out of range: {s}"))
}

fn parse_code_bytes(s: &str) -> Result<CodeBytesArg, String>
{
    let digits: Vec<u8> = s.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
    if !digits.iter().all(u8::is_ascii_hexdigit) {
        return Err(format!("code bytes must be hex digits: '{s}'"));
    }
    if digits.len() % 2 != 0 {
        return Err(format!("odd number of hex digits in '{s}'"));
    }
    digits
        .chunks(2)
        .map(|pair| {
            let pair = std::str::from_utf8(pair).map_err(|e| e.to_string())?;
            u8::from_str_radix(pair, 16).map_err(|e| format!("invalid byte '{pair}': {e}"))
        })
        .collect::<Result<Vec<u8>, String>>()
        .map(CodeBytesArg)
}
