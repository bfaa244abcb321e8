//! Statically maps a dynamically linked ELF64 x86-64 executable's imported
//! libc syscall wrappers to the kernel syscalls they dispatch.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use sysmap::catalog::SyscallCatalog;
use sysmap::config::Config;
use sysmap::elf_reader::ElfImage;
use sysmap::persistence::RedisSink;
use sysmap::{cli, error, filter, resolver};

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = cli::Cli::parse();
    run(&cli)
}

fn run(cli: &cli::Cli) -> Result<ExitCode> {
    let config = Config::from_env();

    let target = ElfImage::open(&cli.target)
        .with_context(|| format!("opening target ELF at {}", cli.target.display()))?;
    let libc = ElfImage::open(&config.libc_path)
        .with_context(|| format!("opening C library at {}", config.libc_path.display()))?;

    let dynamic_symbols = match target.dynamic_symbols() {
        Ok(symbols) => symbols,
        Err(error::SysmapError::NoDynamicSymbols) => {
            tracing::info!(target = %cli.target.display(), "no dynamic symbol table, nothing to analyze");
            println!("{{}}");
            return Ok(ExitCode::SUCCESS);
        }
        Err(e) => return Err(anyhow::Error::new(e).context("reading target's dynamic symbols")),
    };

    let catalog = SyscallCatalog::init();
    let wrappers = filter::candidate_wrappers(&dynamic_symbols, &catalog);
    tracing::info!(candidates = wrappers.len(), "filtered wrapper candidates");

    let (resolution, summary) = resolver::resolve_all(&libc, &wrappers);
    tracing::info!(
        considered = summary.considered,
        resolved = summary.resolved,
        filtered = summary.filtered,
        unresolved = summary.unresolved,
        "resolution complete"
    );

    let json = serde_json::to_string_pretty(&resolution).context("serializing resolution map")?;
    println!("{json}");

    match RedisSink::connect(&config) {
        Ok(sink) => {
            if let Err(e) = sink.persist(&resolution) {
                tracing::warn!(error = %e, "persistence failed");
            }
        }
        Err(e) => tracing::warn!(error = %e, "could not connect to Redis"),
    }

    Ok(ExitCode::SUCCESS)
}
