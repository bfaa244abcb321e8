//! Error taxonomy for the wrapper-to-syscall resolver.
//!
//! Most variants here are recovered locally by the resolver loop (logged via
//! `tracing` and the offending wrapper dropped); only [`SysmapError::OpenFailed`]
//! and [`SysmapError::PersistenceFailed`] ever escape to the caller.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while analyzing a target binary.
#[derive(Debug, Error)]
pub enum SysmapError {
    /// An ELF path was unreadable or malformed.
    #[error("failed to open ELF image at {path}: {source}")]
    OpenFailed {
        /// Path that failed to open.
        path: PathBuf,
        /// Underlying I/O or ELF-parse error.
        #[source]
        source: anyhow::Error,
    },

    /// The target has no dynamic symbol table.
    #[error("target has no dynamic symbol table")]
    NoDynamicSymbols,

    /// A wrapper name was not present in the C library, even after the `64` retry.
    #[error("symbol '{wrapper}' not found in C library")]
    SymbolNotFound {
        /// Wrapper name that could not be located.
        wrapper: String,
    },

    /// A symbol's address fell outside the `.text` section.
    #[error("symbol '{symbol}' at address {address:#x} lies outside .text")]
    SymbolOutOfRange {
        /// Symbol name.
        symbol: String,
        /// Symbol's virtual address.
        address: u64,
    },

    /// The decoder rejected the byte range for a symbol.
    #[error("disassembly of '{symbol}' failed: {reason}")]
    DisassemblyFailed {
        /// Symbol name.
        symbol: String,
        /// Decoder-reported reason.
        reason: String,
    },

    /// A recovered syscall number has no name in the embedded table.
    #[error("syscall number {number} has no known name")]
    UnknownSyscallNumber {
        /// The unrecognized syscall number.
        number: i64,
    },

    /// A resolved kernel syscall name has no tracepoint on this host.
    #[error("syscall '{name}' has no tracepoint on this host")]
    NoTracepoint {
        /// Kernel syscall name.
        name: String,
    },

    /// The persistence collaborator rejected the batch.
    #[error("failed to persist results: {0}")]
    PersistenceFailed(#[source] anyhow::Error),
}
