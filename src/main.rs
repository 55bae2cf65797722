use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use procmem::config::{Config, ConfigLoader, DEFAULT_CONFIG_FILE};
use procmem::{
    Address, MemoryEngine, ModuleInfo, Pattern, ProcessHandle, ProcessId, RegionInfo, ScanDirective,
    ScanMode, ValueType,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "procmem", version)]
#[command(about = "Inspect and scan the memory of running processes")]
struct Cli {
    /// Configuration file (defaults to procmem.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List running processes
    Ps {
        /// Only show processes with this name
        #[arg(short, long)]
        name: Option<String>,
    },
    /// List the modules loaded in a process
    Modules { pid: ProcessId },
    /// List the committed memory regions of a process
    Regions { pid: ProcessId },
    /// Read one typed value
    Read {
        pid: ProcessId,
        address: Address,
        value_type: ValueType,
    },
    /// Hex dump a block of memory
    Dump {
        pid: ProcessId,
        address: Address,
        size: usize,
    },
    /// Find a signature in a module, e.g. "48 8B 05 ?? ?? ?? ??"
    Scan {
        pid: ProcessId,
        module: String,
        pattern: Pattern,
        #[arg(long, default_value = "normal")]
        mode: ScanMode,
        #[arg(long, default_value_t = 0)]
        pattern_offset: usize,
        #[arg(long, default_value_t = 0)]
        address_offset: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;
    init_logging(&config.logging.level)?;

    info!("procmem v{}", env!("CARGO_PKG_VERSION"));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .max_blocking_threads(config.dispatch.worker_threads)
        .enable_all()
        .build()
        .context("failed to start runtime")?;

    runtime.block_on(run(cli.command, cli.json, MemoryEngine::new(config)))
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    let config = match path {
        Some(path) => ConfigLoader::new(path)
            .load()
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => ConfigLoader::new(DEFAULT_CONFIG_FILE).load_or_default()?,
    };
    Ok(config)
}

fn init_logging(level: &str) -> Result<()> {
    // RUST_LOG wins over the configured level
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

async fn run(command: Command, json: bool, engine: MemoryEngine) -> Result<()> {
    let deferred = engine.deferred();

    match command {
        Command::Ps { name } => {
            let processes = match name {
                Some(name) => deferred.find_processes_by_name(name).await?,
                None => deferred.list_processes().await?,
            };
            if json {
                return print_json(&processes);
            }
            println!("{:>8} {:>8} {:>7}  NAME", "PID", "PPID", "THREADS");
            for p in &processes {
                let ppid = p.parent_pid.map(|v| v.to_string()).unwrap_or_default();
                println!("{:>8} {:>8} {:>7}  {}", p.pid, ppid, p.thread_count, p.name);
            }
        }
        Command::Modules { pid } => {
            let handle = open(&engine, pid).await?;
            let modules = deferred.list_modules(handle).await?;
            if json {
                return print_json(&modules);
            }
            print_modules(&modules);
        }
        Command::Regions { pid } => {
            let handle = open(&engine, pid).await?;
            let regions: Vec<RegionInfo> = deferred
                .list_regions(handle)
                .await?
                .into_iter()
                .filter(RegionInfo::is_committed)
                .collect();
            if json {
                return print_json(&regions);
            }
            for r in &regions {
                println!(
                    "{}-{} {:>10x} prot={:#06x} type={:#x}",
                    r.base_address,
                    r.end_address(),
                    r.size,
                    r.protection,
                    r.region_type
                );
            }
        }
        Command::Read {
            pid,
            address,
            value_type,
        } => {
            let handle = open(&engine, pid).await?;
            let value = deferred.read(handle, address, value_type).await?;
            if json {
                return print_json(&value);
            }
            println!("{} = {}", address, value);
        }
        Command::Dump { pid, address, size } => {
            let handle = open(&engine, pid).await?;
            let bytes = deferred.read_buffer(handle, address, size).await?;
            if json {
                return print_json(&hex::encode_upper(&bytes));
            }
            print_hex_dump(address, &bytes)?;
        }
        Command::Scan {
            pid,
            module,
            pattern,
            mode,
            pattern_offset,
            address_offset,
        } => {
            let handle = open(&engine, pid).await?;
            let directive = ScanDirective::new(pattern_offset, address_offset, mode);
            debug!(%pattern, ?directive, "Starting scan");
            let address = deferred
                .find_pattern(handle, module, pattern, directive)
                .await?;
            if json {
                return print_json(&address);
            }
            println!("{}", address);
        }
    }

    Ok(())
}

async fn open(engine: &MemoryEngine, pid: ProcessId) -> Result<Arc<ProcessHandle>> {
    let handle = engine
        .deferred()
        .open(pid, None)
        .await
        .with_context(|| format!("failed to open process {}", pid))?;
    Ok(Arc::new(handle))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_modules(modules: &[ModuleInfo]) {
    for m in modules {
        println!(
            "{}-{} {:>10x}  {}",
            m.base_address,
            m.end_address(),
            m.size,
            m.name
        );
    }
}

fn print_hex_dump(start: Address, bytes: &[u8]) -> Result<()> {
    for (row, chunk) in bytes.chunks(16).enumerate() {
        let address = start.add(row * 16)?;
        let hex: Vec<String> = chunk.iter().map(|b| format!("{:02X}", b)).collect();
        let ascii: String = chunk
            .iter()
            .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
            .collect();
        println!("{}  {:<47}  {}", address, hex.join(" "), ascii);
    }
    Ok(())
}
