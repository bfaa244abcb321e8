//! Binary Reader: owns an opened ELF image and exposes the narrow surface
//! the rest of the pipeline needs (imported libraries, dynamic symbols,
//! sections, relocations, code bytes).
//!
//! Grounded in `tools/gluon`'s `hbtf::generate_hbtf` / `SymbolResolver::from_kernel_elf`:
//! read the file into an owned buffer once, then re-parse a borrowing
//! [`sysmap_elf::ElfFile`] view on demand rather than storing a self-referential
//! struct.

use std::path::{Path, PathBuf};

use sysmap_elf::{ElfFile, SHT_DYNSYM, STT_FUNC};

use crate::error::SysmapError;

/// The kind of a dynamic symbol, per its ELF symbol type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// `STT_FUNC`.
    Function,
    /// Any other defined type (object, section, etc.).
    Other,
}

/// A dynamic symbol exported or imported by an ELF image.
#[derive(Debug, Clone)]
pub struct DynamicSymbol {
    /// Symbol name (may carry an `@VERSION` suffix).
    pub name: String,
    /// Virtual address (0 for undefined/imported symbols).
    pub addr: u64,
    /// Declared size in bytes (may be 0).
    pub size: u64,
    /// Symbol kind.
    pub kind: SymbolKind,
}

/// A `SHT_RELA` relocation entry, decoded into its logical fields.
#[derive(Debug, Clone, Copy)]
pub struct RelaEntry {
    /// Address to be relocated.
    pub offset: u64,
    /// Relocation type (low 32 bits of `r_info`).
    pub reloc_type: u32,
    /// Symbol table index (high 32 bits of `r_info`).
    pub symbol_index: u32,
    /// Constant addend.
    pub addend: i64,
}

/// An opened ELF file, owning its raw bytes.
pub struct ElfImage {
    path: PathBuf,
    data: Vec<u8>,
}

impl ElfImage {
    /// Open and validate an ELF file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SysmapError::OpenFailed`] if the path is unreadable or the
    /// file is not a valid ELF64 x86-64 image.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SysmapError> {
        let path = path.as_ref().to_path_buf();
        let data = std::fs::read(&path).map_err(|e| SysmapError::OpenFailed {
            path: path.clone(),
            source: e.into(),
        })?;

        // Validate eagerly so malformed input is reported at open time.
        ElfFile::parse(&data).map_err(|e| SysmapError::OpenFailed {
            path: path.clone(),
            source: anyhow::anyhow!("{e}"),
        })?;

        Ok(Self { path, data })
    }

    /// Returns the path this image was opened from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parse(&self) -> ElfFile<'_> {
        ElfFile::parse(&self.data).expect("validated at open()")
    }

    /// Returns the ordered list of imported shared library SONAMEs.
    #[must_use]
    pub fn imported_libraries(&self) -> Vec<String> {
        self.parse()
            .imported_libraries()
            .into_iter()
            .flatten()
            .map(str::to_string)
            .collect()
    }

    /// Returns the target's dynamic symbols, in table order.
    ///
    /// # Errors
    ///
    /// Returns [`SysmapError::NoDynamicSymbols`] if the image has no
    /// `SHT_DYNSYM` section.
    pub fn dynamic_symbols(&self) -> Result<Vec<DynamicSymbol>, SysmapError> {
        let elf = self.parse();
        let dynsym = elf
            .find_section_by_type(SHT_DYNSYM)
            .ok_or(SysmapError::NoDynamicSymbols)?;
        let strtab = elf
            .linked_strtab(&dynsym)
            .ok_or(SysmapError::NoDynamicSymbols)?;
        let symbols = elf
            .symbols(&dynsym)
            .ok_or(SysmapError::NoDynamicSymbols)?;

        Ok(symbols
            .map(|sym| DynamicSymbol {
                name: strtab.get(sym.st_name).unwrap_or("").to_string(),
                addr: sym.st_value,
                size: sym.st_size,
                kind: if sym.sym_type() == STT_FUNC {
                    SymbolKind::Function
                } else {
                    SymbolKind::Other
                },
            })
            .collect())
    }

    /// Returns the `{virtual address, raw bytes}` pair for a named section, if present.
    #[must_use]
    pub fn section(&self, name: &str) -> Option<(u64, Vec<u8>)> {
        let elf = self.parse();
        let shdr = elf.find_section_by_name(name)?;
        let data = elf.section_data(&shdr)?;
        Some((shdr.sh_addr, data.to_vec()))
    }

    /// Returns the decoded `SHT_RELA` entries of the `.rela.dyn` section, if present.
    ///
    /// Only `R_X86_64_GLOB_DAT` entries are meaningful to the historical
    /// GOT-lookup path this system does not currently exercise (§9); exposed
    /// for completeness and future use.
    #[must_use]
    pub fn relocations_rela_dyn(&self) -> Vec<RelaEntry> {
        let elf = self.parse();
        let Some(shdr) = elf.find_section_by_name(".rela.dyn") else {
            return Vec::new();
        };
        let Some(iter) = elf.rela_entries(&shdr) else {
            return Vec::new();
        };
        iter.map(|rela| RelaEntry {
            offset: rela.r_offset,
            reloc_type: rela.r_type,
            symbol_index: rela.r_sym,
            addend: rela.r_addend,
        })
        .collect()
    }

    /// Returns the `.text` bytes for `symbol`, starting at its virtual address.
    ///
    /// Falls back to a bounded 4096-byte window when `symbol.size == 0`
    /// (stripped wrappers commonly omit size; a typical wrapper is well under
    /// this bound).
    ///
    /// # Errors
    ///
    /// Returns [`SysmapError::SymbolOutOfRange`] if `symbol.addr` does not
    /// fall inside `.text`, or `.text` is absent.
    pub fn code_slice(&self, symbol: &DynamicSymbol) -> Result<Vec<u8>, SysmapError> {
        const FALLBACK_SIZE: u64 = 4096;

        let elf = self.parse();
        let text = elf
            .find_section_by_name(".text")
            .ok_or_else(|| SysmapError::SymbolOutOfRange {
                symbol: symbol.name.clone(),
                address: symbol.addr,
            })?;
        let data = elf
            .section_data(&text)
            .ok_or_else(|| SysmapError::SymbolOutOfRange {
                symbol: symbol.name.clone(),
                address: symbol.addr,
            })?;

        if symbol.addr < text.sh_addr || symbol.addr >= text.sh_addr + data.len() as u64 {
            return Err(SysmapError::SymbolOutOfRange {
                symbol: symbol.name.clone(),
                address: symbol.addr,
            });
        }

        #[expect(
            clippy::cast_possible_truncation,
            reason = "already bounds-checked against data.len() above"
        )]
        let start = (symbol.addr - text.sh_addr) as usize;
        let want = if symbol.size == 0 {
            FALLBACK_SIZE
        } else {
            symbol.size
        };
        #[expect(
            clippy::cast_possible_truncation,
            reason = "clamped to data.len() immediately below"
        )]
        let end = (start + want as usize).min(data.len());

        Ok(data[start..end].to_vec())
    }
}
