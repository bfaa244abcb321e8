//! ELF64 header parsing.
//!
//! Parses the ELF64 file header and program headers from raw byte slices
//! using safe field extraction via `from_le_bytes()`.

use core::fmt;

/// ELF magic bytes: `\x7fELF`.
const ELF_MAGIC: [u8; 4] = [0x7f, b'E', b'L', b'F'];

/// ELF class: 64-bit.
const ELFCLASS64: u8 = 2;

/// ELF data encoding: little-endian.
const ELFDATA2LSB: u8 = 1;

/// ELF type: executable.
const ET_EXEC: u16 = 2;

/// ELF type: shared object (PIE).
const ET_DYN: u16 = 3;

/// ELF machine: x86-64.
const EM_X86_64: u16 = 62;

/// Program header type: loadable segment.
pub(crate) const PT_LOAD: u32 = 1;

/// The ELF type of a parsed file: a statically linked executable or a
/// position-independent / dynamically linked one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElfType {
    /// `ET_EXEC` — a non-PIE executable.
    Executable,
    /// `ET_DYN` — a shared object or PIE executable.
    SharedOrPie,
}

/// Minimum size of an ELF64 file header (64 bytes).
const ELF64_EHDR_SIZE: usize = 64;

/// Size of an ELF64 program header entry (56 bytes).
pub(crate) const ELF64_PHDR_SIZE: usize = 56;

/// Size of an ELF64 section header entry (64 bytes).
pub(crate) const ELF64_SHDR_SIZE: usize = 64;

/// Read a little-endian `u16` from `data` at byte offset `off`.
///
/// # Panics
///
/// Panics if `off + 2 > data.len()`. Callers must bounds-check first.
pub(crate) fn le_u16(data: &[u8], off: usize) -> u16 {
    u16::from_le_bytes(*data[off..].first_chunk().unwrap())
}

/// Read a little-endian `u32` from `data` at byte offset `off`.
pub(crate) fn le_u32(data: &[u8], off: usize) -> u32 {
    u32::from_le_bytes(*data[off..].first_chunk().unwrap())
}

/// Read a little-endian `u64` from `data` at byte offset `off`.
pub(crate) fn le_u64(data: &[u8], off: usize) -> u64 {
    u64::from_le_bytes(*data[off..].first_chunk().unwrap())
}

/// Read a little-endian signed `i64` from `data` at byte offset `off`.
pub(crate) fn le_i64(data: &[u8], off: usize) -> i64 {
    i64::from_le_bytes(*data[off..].first_chunk().unwrap())
}

/// Errors that can occur when parsing an ELF file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElfError {
    /// The file does not start with the ELF magic bytes.
    BadMagic,
    /// The ELF file is not 64-bit (`ELFCLASS64`).
    UnsupportedClass,
    /// The ELF file is not little-endian.
    UnsupportedEncoding,
    /// The ELF machine type is not `EM_X86_64`.
    UnsupportedMachine,
    /// The ELF type is not `ET_EXEC` or `ET_DYN`.
    UnsupportedType,
    /// The input data is too short for the declared structure.
    Truncated,
    /// A header offset or size is out of bounds.
    InvalidOffset,
}

impl fmt::Display for ElfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadMagic => write!(f, "invalid ELF magic bytes"),
            Self::UnsupportedClass => write!(f, "unsupported ELF class (expected ELFCLASS64)"),
            Self::UnsupportedEncoding => {
                write!(f, "unsupported data encoding (expected little-endian)")
            }
            Self::UnsupportedMachine => {
                write!(f, "unsupported machine type (expected EM_X86_64)")
            }
            Self::UnsupportedType => write!(f, "unsupported ELF type (expected ET_EXEC or ET_DYN)"),
            Self::Truncated => write!(f, "input data truncated"),
            Self::InvalidOffset => write!(f, "invalid header offset or size"),
        }
    }
}

/// Parsed ELF64 file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Elf64Header {
    /// ELF type (`ET_EXEC` or `ET_DYN`).
    pub e_type: u16,
    /// Target machine architecture.
    pub e_machine: u16,
    /// Virtual address of the entry point.
    pub e_entry: u64,
    /// Offset of the program header table in the file.
    pub e_phoff: u64,
    /// Number of program header entries.
    pub e_phnum: u16,
    /// Size of each program header entry.
    pub e_phentsize: u16,
    /// Offset of the section header table in the file.
    pub e_shoff: u64,
    /// Size of each section header entry.
    pub e_shentsize: u16,
    /// Number of section header entries.
    pub e_shnum: u16,
    /// Section header string table index.
    pub e_shstrndx: u16,
}

impl Elf64Header {
    /// Parse an ELF64 file header from raw bytes.
    #[expect(clippy::similar_names, reason = "ELF spec naming convention")]
    ///
    /// Validates the magic, class, encoding, machine type, ELF type,
    /// and that the program header table fits within `data`.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError`] if validation fails or the data is too short.
    pub fn parse(data: &[u8]) -> Result<Self, ElfError> {
        if data.len() < ELF64_EHDR_SIZE {
            return Err(ElfError::Truncated);
        }

        // Validate magic
        if data[..4] != ELF_MAGIC {
            return Err(ElfError::BadMagic);
        }

        // Validate class (byte 4) — must be ELFCLASS64
        if data[4] != ELFCLASS64 {
            return Err(ElfError::UnsupportedClass);
        }

        // Validate data encoding (byte 5) — must be little-endian
        if data[5] != ELFDATA2LSB {
            return Err(ElfError::UnsupportedEncoding);
        }

        // Parse fields — offsets are safe because we checked len >= 64 above
        let e_type = le_u16(data, 16);
        if e_type != ET_EXEC && e_type != ET_DYN {
            return Err(ElfError::UnsupportedType);
        }

        let e_machine = le_u16(data, 18);
        if e_machine != EM_X86_64 {
            return Err(ElfError::UnsupportedMachine);
        }

        let e_entry = le_u64(data, 24);
        let e_phoff = le_u64(data, 32);
        let e_shoff = le_u64(data, 40);
        let e_phentsize = le_u16(data, 54);
        let e_phnum = le_u16(data, 56);
        let e_shentsize = le_u16(data, 58);
        let e_shnum = le_u16(data, 60);
        let e_shstrndx = le_u16(data, 62);

        // Validate program header table bounds
        let ph_end = e_phoff
            .checked_add(u64::from(e_phnum) * u64::from(e_phentsize))
            .ok_or(ElfError::InvalidOffset)?;

        if ph_end > data.len() as u64 {
            return Err(ElfError::InvalidOffset);
        }

        // Validate program header entry size
        if e_phnum > 0 && (e_phentsize as usize) < ELF64_PHDR_SIZE {
            return Err(ElfError::InvalidOffset);
        }

        // Validate section header table bounds (if present)
        if e_shnum > 0 {
            if (e_shentsize as usize) < ELF64_SHDR_SIZE {
                return Err(ElfError::InvalidOffset);
            }
            let sh_end = e_shoff
                .checked_add(u64::from(e_shnum) * u64::from(e_shentsize))
                .ok_or(ElfError::InvalidOffset)?;
            if sh_end > data.len() as u64 {
                return Err(ElfError::InvalidOffset);
            }
        }

        Ok(Self {
            e_type,
            e_machine,
            e_entry,
            e_phoff,
            e_phnum,
            e_phentsize,
            e_shoff,
            e_shentsize,
            e_shnum,
            e_shstrndx,
        })
    }

    /// Returns whether this file is a non-PIE executable or a shared/PIE one.
    #[must_use]
    pub fn elf_type(&self) -> ElfType {
        if self.e_type == ET_DYN {
            ElfType::SharedOrPie
        } else {
            ElfType::Executable
        }
    }
}

/// Parsed ELF64 program header entry.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Elf64ProgramHeader {
    /// Segment type.
    pub seg_type: u32,
    /// Segment flags (read/write/execute).
    pub flags: u32,
    /// Offset of the segment data in the file.
    pub offset: u64,
    /// Virtual address of the segment.
    pub vaddr: u64,
    /// Size of the segment data in the file.
    pub filesz: u64,
    /// Size of the segment in memory.
    pub memsz: u64,
}

impl Elf64ProgramHeader {
    /// Parse a program header entry from raw bytes at the given file offset.
    ///
    /// The caller must ensure `file_offset + ELF64_PHDR_SIZE <= data.len()`.
    pub(crate) fn parse(data: &[u8], file_offset: usize) -> Self {
        let b = &data[file_offset..];
        Self {
            seg_type: le_u32(b, 0),
            flags: le_u32(b, 4),
            offset: le_u64(b, 8),
            vaddr: le_u64(b, 16),
            // p_paddr at 24..32 — skipped
            filesz: le_u64(b, 32),
            memsz: le_u64(b, 40),
        }
    }
}
