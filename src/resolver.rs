//! Resolver: the core analysis loop. For each wrapper candidate, locates its
//! definition in the C library, disassembles it, tracks `last_rax` across a
//! linear instruction sweep, and translates recovered syscall numbers into
//! kernel names gated by tracepoint availability.

use crate::catalog::SyscallCatalog;
use crate::decode::{self, DecodedMnemonic, Operand, RegClass};
use crate::elf_reader::ElfImage;
use crate::error::SysmapError;

/// One `{address, number}` observation at a `syscall` instruction.
/// `number` is `-1` when `last_rax` was unknown at that point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyscallPattern {
    /// Virtual address of the `syscall` instruction.
    pub address: u64,
    /// The tracked `last_rax` value, or `-1` for unknown.
    pub number: i64,
}

/// The terminal outcome of resolving one wrapper candidate.
#[derive(Debug)]
pub enum Outcome {
    /// A kernel syscall was recovered and has a tracepoint on this host.
    Resolved { kernel_name: String },
    /// A kernel syscall was recovered but has no tracepoint on this host.
    Filtered { kernel_name: String },
    /// No usable syscall number could be recovered.
    Unresolved { reason: SysmapError },
}

/// Walks `insns` in order, tracking `last_rax` and emitting a pattern at
/// every `syscall` instruction, per the register-tracking state machine.
fn track_patterns(insns: &[decode::DecodedInsn]) -> Vec<SyscallPattern> {
    let mut last_rax: i64 = -1;
    let mut patterns = Vec::new();

    for insn in insns {
        match insn.mnemonic {
            DecodedMnemonic::Mov => {
                if insn.operands.len() == 2 {
                    if let (Operand::Register(dst), Operand::Immediate(imm)) =
                        (insn.operands[0], insn.operands[1])
                    {
                        if matches!(dst, RegClass::Rax | RegClass::Eax) {
                            last_rax = imm;
                        }
                    }
                }
            }
            DecodedMnemonic::Xor => {
                if insn.operands.len() == 2 {
                    if let (Operand::Register(RegClass::Eax), Operand::Register(RegClass::Eax)) =
                        (insn.operands[0], insn.operands[1])
                    {
                        last_rax = 0;
                    }
                }
            }
            DecodedMnemonic::Syscall => {
                patterns.push(SyscallPattern {
                    address: insn.address,
                    number: last_rax,
                });
            }
            DecodedMnemonic::Other => {}
        }
    }

    patterns
}

/// Disassembles the code for `wrapper` in `libc` and returns its syscall
/// patterns, in instruction order.
fn patterns_for_symbol(
    libc: &ElfImage,
    wrapper: &str,
) -> Result<Vec<SyscallPattern>, SysmapError> {
    let symbol = libc
        .dynamic_symbols()?
        .into_iter()
        .find(|s| s.name == wrapper)
        .ok_or_else(|| SysmapError::SymbolNotFound {
            wrapper: wrapper.to_string(),
        })?;

    let code = libc.code_slice(&symbol)?;
    let insns = decode::decode(&code, symbol.addr);
    if insns.is_empty() && !code.is_empty() {
        return Err(SysmapError::DisassemblyFailed {
            symbol: wrapper.to_string(),
            reason: "no valid instructions decoded".to_string(),
        });
    }
    Ok(track_patterns(&insns))
}

/// Picks the first non-negative recovered number out of `patterns` and
/// translates it into a kernel syscall name.
fn number_and_name(patterns: &[SyscallPattern]) -> Result<(i64, &'static str), SysmapError> {
    let number = patterns
        .iter()
        .map(|p| p.number)
        .find(|n| *n >= 0)
        .ok_or(SysmapError::UnknownSyscallNumber { number: -1 })?;
    let name = SyscallCatalog::name_for_number(number)
        .ok_or(SysmapError::UnknownSyscallNumber { number })?;
    Ok((number, name))
}

/// Resolves a single wrapper candidate against the C library, per the
/// §4.4 state machine: symbol lookup with `64`-suffix retry, code
/// extraction, disassembly, pattern-to-name translation (itself retried
/// under the `64`-suffixed name when the primary symbol's patterns yield no
/// usable number), and the tracepoint gate.
#[must_use]
pub fn resolve_wrapper(libc: &ElfImage, wrapper: &str) -> Outcome {
    let retry_name = format!("{wrapper}64");

    let primary = match patterns_for_symbol(libc, wrapper) {
        Ok(patterns) => Ok(patterns),
        Err(SysmapError::SymbolNotFound { .. }) => match patterns_for_symbol(libc, &retry_name) {
            Ok(patterns) => Ok(patterns),
            Err(_) => Err(SysmapError::SymbolNotFound {
                wrapper: wrapper.to_string(),
            }),
        },
        Err(err) => return Outcome::Unresolved { reason: err },
    };

    let resolved = match primary {
        Ok(patterns) => number_and_name(&patterns),
        Err(err) => Err(err),
    };

    let (_number, kernel_name) = match resolved {
        Ok(pair) => pair,
        Err(_) => match patterns_for_symbol(libc, &retry_name)
            .and_then(|patterns| number_and_name(&patterns))
        {
            Ok(pair) => pair,
            Err(reason) => return Outcome::Unresolved { reason },
        },
    };

    if SyscallCatalog::is_tracepoint_available(kernel_name) {
        Outcome::Resolved {
            kernel_name: kernel_name.to_string(),
        }
    } else {
        Outcome::Filtered {
            kernel_name: kernel_name.to_string(),
        }
    }
}

/// Aggregate counts over one run, for human-facing reporting only — never
/// part of the JSON output contract.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Total candidates considered.
    pub considered: usize,
    /// Resolved and emitted into the final map.
    pub resolved: usize,
    /// Recovered but dropped for lack of a tracepoint.
    pub filtered: usize,
    /// Could not be resolved at all.
    pub unresolved: usize,
}

/// Resolves every candidate in `wrappers`, returning the emitted resolution
/// map (wrapper name -> kernel syscall name) and a run summary. Per-wrapper
/// failures are logged and never abort the loop.
#[must_use]
pub fn resolve_all(
    libc: &ElfImage,
    wrappers: &[String],
) -> (std::collections::HashMap<String, String>, RunSummary) {
    let mut map = std::collections::HashMap::new();
    let mut summary = RunSummary {
        considered: wrappers.len(),
        ..RunSummary::default()
    };

    for wrapper in wrappers {
        match resolve_wrapper(libc, wrapper) {
            Outcome::Resolved { kernel_name } => {
                tracing::debug!(wrapper, kernel_name, "resolved");
                map.insert(wrapper.clone(), kernel_name);
                summary.resolved += 1;
            }
            Outcome::Filtered { kernel_name } => {
                tracing::info!(wrapper, kernel_name, "no tracepoint, dropping");
                summary.filtered += 1;
            }
            Outcome::Unresolved { reason } => {
                tracing::debug!(wrapper, error = %reason, "unresolved");
                summary.unresolved += 1;
            }
        }
    }

    (map, summary)
}
