//! Command-line interface definition.

use std::path::PathBuf;

use clap::Parser;

/// Maps a dynamically linked ELF64 executable's imported syscall wrappers to
/// the kernel syscalls they dispatch.
#[derive(Parser)]
#[command(name = "sysmap", version, about)]
pub struct Cli {
    /// Path to the target ELF64 executable to analyze.
    pub target: PathBuf,
}
