//! `.dynamic` section parsing: imported shared library names (`DT_NEEDED`).
//!
//! Zero-copy, zero-allocation, matching the style of [`crate::section`] and
//! [`crate::reloc`]: a typed entry, an iterator over raw bytes, and a
//! convenience method on [`crate::segment::ElfFile`].

use crate::header::{le_i64, le_u64};
use crate::section::{SHT_DYNAMIC, StringTable};
use crate::segment::ElfFile;

/// Dynamic section entry tag: marks the end of the table.
pub const DT_NULL: i64 = 0;

/// Dynamic section entry tag: a required shared library (SONAME string offset in `d_val`).
pub const DT_NEEDED: i64 = 1;

/// Size of one `Elf64_Dyn` entry (tag + value, both 8 bytes).
const ELF64_DYN_SIZE: usize = 16;

/// A single `.dynamic` section entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DynEntry {
    /// Entry tag (`DT_NEEDED`, `DT_NULL`, ...).
    pub tag: i64,
    /// Entry value; interpretation depends on `tag` (here, a string table offset for `DT_NEEDED`).
    pub val: u64,
}

impl DynEntry {
    fn parse(data: &[u8], offset: usize) -> Self {
        let b = &data[offset..];
        Self {
            tag: le_i64(b, 0),
            val: le_u64(b, 8),
        }
    }
}

/// An iterator over `.dynamic` section entries, stopping at `DT_NULL`.
pub struct DynIter<'a> {
    data: &'a [u8],
    offset: usize,
    end: usize,
    done: bool,
}

impl Iterator for DynIter<'_> {
    type Item = DynEntry;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.offset + ELF64_DYN_SIZE > self.end {
            return None;
        }
        let entry = DynEntry::parse(self.data, self.offset);
        self.offset += ELF64_DYN_SIZE;
        if entry.tag == DT_NULL {
            self.done = true;
        }
        Some(entry)
    }
}

/// An iterator over the SONAMEs named by `DT_NEEDED` entries.
pub struct NeededIter<'a> {
    entries: DynIter<'a>,
    strtab: StringTable<'a>,
}

impl<'a> Iterator for NeededIter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        for entry in self.entries.by_ref() {
            if entry.tag == DT_NEEDED {
                #[expect(
                    clippy::cast_possible_truncation,
                    reason = "SONAME string table offsets fit in 32 bits"
                )]
                let offset = entry.val as u32;
                if let Some(name) = self.strtab.get(offset) {
                    return Some(name);
                }
            }
        }
        None
    }
}

impl<'a> ElfFile<'a> {
    /// Returns an iterator over the raw `.dynamic` section entries, if present.
    #[must_use]
    pub fn dynamic_entries(&self) -> Option<DynIter<'a>> {
        let shdr = self.find_section_by_type(SHT_DYNAMIC)?;
        let data = self.section_data(&shdr)?;
        let base = self.raw_data().as_ptr() as usize;
        let off = data.as_ptr() as usize - base;
        Some(DynIter {
            data: self.raw_data(),
            offset: off,
            end: off + data.len(),
            done: false,
        })
    }

    /// Returns an iterator over the imported shared library names (SONAMEs),
    /// i.e. the `DT_NEEDED` entries of the `.dynamic` section, resolved
    /// against the section's linked string table (conventionally `.dynstr`).
    #[must_use]
    pub fn imported_libraries(&self) -> Option<NeededIter<'a>> {
        let shdr = self.find_section_by_type(SHT_DYNAMIC)?;
        let strtab = self.linked_strtab(&shdr)?;
        Some(NeededIter {
            entries: self.dynamic_entries()?,
            strtab,
        })
    }
}
