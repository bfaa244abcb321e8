//! Wrapper Filter: narrows a target's dynamic symbols to the ones worth
//! resolving — known syscall-wrapper names, version-suffix collapsed,
//! de-duplicated, order preserved.

use crate::catalog::SyscallCatalog;
use crate::elf_reader::{DynamicSymbol, SymbolKind};

/// Strips a GNU symbol-versioning suffix (`@GLIBC_2.2.5`, `@@GLIBC_2.2.5`).
#[must_use]
pub fn strip_version_suffix(name: &str) -> &str {
    name.split('@').next().unwrap_or(name)
}

/// Filters `symbols` down to the ordered, de-duplicated set of candidate
/// syscall wrapper names.
///
/// A symbol is kept when it is a function and its version-stripped name is
/// a member of `catalog`. Order follows the input symbol table; repeats of
/// the same stripped name (common across symbol-versioned libc builds) keep
/// only the first occurrence.
#[must_use]
pub fn candidate_wrappers(symbols: &[DynamicSymbol], catalog: &SyscallCatalog) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();

    for sym in symbols {
        if sym.kind != SymbolKind::Function {
            continue;
        }
        let stripped = strip_version_suffix(&sym.name);
        if stripped.is_empty() || !catalog.is_syscall_name(stripped) {
            continue;
        }
        if seen.insert(stripped.to_string()) {
            out.push(stripped.to_string());
        }
    }

    out
}
