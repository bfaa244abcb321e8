//! Hand-assembled ELF64 byte buffers for integration tests.
//!
//! Built byte-by-byte in the same style as `sysmap-elf`'s own `header.rs`/
//! `section.rs` test fixtures, but independent of them: integration tests
//! are a separate crate and cannot reach the library's `pub(crate)` helpers.

const SHT_PROGBITS: u32 = 1;
const SHT_STRTAB: u32 = 3;
const SHT_DYNSYM: u32 = 11;

const STB_GLOBAL_SHIFT: u8 = 4;
const STT_FUNC: u8 = 2;
const STT_OBJECT: u8 = 1;

/// One dynamic symbol to place in the synthetic library/executable.
pub struct SymSpec {
    pub name: &'static str,
    pub addr: u64,
    pub size: u64,
    pub is_func: bool,
}

impl SymSpec {
    pub fn func(name: &'static str, addr: u64, size: u64) -> Self {
        Self { name, addr, size, is_func: true }
    }
}

fn section_header(
    name_off: u32,
    sh_type: u32,
    sh_flags: u64,
    sh_addr: u64,
    sh_offset: u64,
    sh_size: u64,
    sh_link: u32,
    sh_info: u32,
    sh_addralign: u64,
    sh_entsize: u64,
) -> [u8; 64] {
    let mut b = [0u8; 64];
    b[0..4].copy_from_slice(&name_off.to_le_bytes());
    b[4..8].copy_from_slice(&sh_type.to_le_bytes());
    b[8..16].copy_from_slice(&sh_flags.to_le_bytes());
    b[16..24].copy_from_slice(&sh_addr.to_le_bytes());
    b[24..32].copy_from_slice(&sh_offset.to_le_bytes());
    b[32..40].copy_from_slice(&sh_size.to_le_bytes());
    b[40..44].copy_from_slice(&sh_link.to_le_bytes());
    b[44..48].copy_from_slice(&sh_info.to_le_bytes());
    b[48..56].copy_from_slice(&sh_addralign.to_le_bytes());
    b[56..64].copy_from_slice(&sh_entsize.to_le_bytes());
    b
}

fn symbol_entry(st_name: u32, st_info: u8, st_value: u64, st_size: u64) -> [u8; 24] {
    let mut b = [0u8; 24];
    b[0..4].copy_from_slice(&st_name.to_le_bytes());
    b[4] = st_info;
    b[5] = 0; // st_other
    b[6..8].copy_from_slice(&1u16.to_le_bytes()); // st_shndx, arbitrary non-zero
    b[8..16].copy_from_slice(&st_value.to_le_bytes());
    b[16..24].copy_from_slice(&st_size.to_le_bytes());
    b
}

/// Assembles a minimal ELF64 x86-64 executable with a `.dynsym`/`.dynstr`
/// pair describing `symbols`, and a `.text` section at `text_vaddr`
/// containing `text`.
#[must_use]
pub fn build_elf(symbols: &[SymSpec], text_vaddr: u64, text: &[u8]) -> Vec<u8> {
    const EHDR_SIZE: u64 = 64;
    const SHDR_SIZE: u64 = 64;
    const SECTION_COUNT: u16 = 5; // NULL, .dynstr, .dynsym, .text, .shstrtab

    let mut dynstr = vec![0u8]; // index 0 is the empty string
    let mut name_offsets = Vec::with_capacity(symbols.len());
    for sym in symbols {
        name_offsets.push(dynstr.len() as u32);
        dynstr.extend_from_slice(sym.name.as_bytes());
        dynstr.push(0);
    }

    let mut dynsym = Vec::new();
    dynsym.extend_from_slice(&symbol_entry(0, 0, 0, 0)); // null symbol
    for (sym, name_off) in symbols.iter().zip(&name_offsets) {
        let st_type = if sym.is_func { STT_FUNC } else { STT_OBJECT };
        let info = (1 << STB_GLOBAL_SHIFT) | st_type; // STB_GLOBAL
        dynsym.extend_from_slice(&symbol_entry(*name_off, info, sym.addr, sym.size));
    }

    let shstrtab = b"\0.dynstr\0.dynsym\0.text\0.shstrtab\0".to_vec();
    let dynstr_name = 1u32;
    let dynsym_name = 9u32;
    let text_name = 17u32;
    let shstrtab_name = 23u32;

    let shdr_start = EHDR_SIZE;
    let dynstr_off = shdr_start + u64::from(SECTION_COUNT) * SHDR_SIZE;
    let dynsym_off = dynstr_off + dynstr.len() as u64;
    let text_off = dynsym_off + dynsym.len() as u64;
    let shstrtab_off = text_off + text.len() as u64;

    let mut buf = vec![0u8; EHDR_SIZE as usize];
    buf[0..4].copy_from_slice(&[0x7f, b'E', b'L', b'F']);
    buf[4] = 2; // ELFCLASS64
    buf[5] = 1; // ELFDATA2LSB
    buf[6] = 1; // EI_VERSION
    buf[16..18].copy_from_slice(&2u16.to_le_bytes()); // ET_EXEC
    buf[18..20].copy_from_slice(&62u16.to_le_bytes()); // EM_X86_64
    buf[20..24].copy_from_slice(&1u32.to_le_bytes()); // e_version
    buf[24..32].copy_from_slice(&text_vaddr.to_le_bytes()); // e_entry
    buf[32..40].copy_from_slice(&0u64.to_le_bytes()); // e_phoff
    buf[40..48].copy_from_slice(&shdr_start.to_le_bytes()); // e_shoff
    buf[52..54].copy_from_slice(&(EHDR_SIZE as u16).to_le_bytes()); // e_ehsize
    buf[54..56].copy_from_slice(&56u16.to_le_bytes()); // e_phentsize
    buf[56..58].copy_from_slice(&0u16.to_le_bytes()); // e_phnum
    buf[58..60].copy_from_slice(&(SHDR_SIZE as u16).to_le_bytes()); // e_shentsize
    buf[60..62].copy_from_slice(&SECTION_COUNT.to_le_bytes()); // e_shnum
    buf[62..64].copy_from_slice(&4u16.to_le_bytes()); // e_shstrndx -> .shstrtab

    buf.extend_from_slice(&section_header(0, 0, 0, 0, 0, 0, 0, 0, 0, 0));
    buf.extend_from_slice(&section_header(
        dynstr_name, SHT_STRTAB, 0, 0, dynstr_off, dynstr.len() as u64, 0, 0, 1, 0,
    ));
    buf.extend_from_slice(&section_header(
        dynsym_name, SHT_DYNSYM, 0, 0, dynsym_off, dynsym.len() as u64, 1, 1, 8, 24,
    ));
    buf.extend_from_slice(&section_header(
        text_name, SHT_PROGBITS, 0, text_vaddr, text_off, text.len() as u64, 0, 0, 16, 0,
    ));
    buf.extend_from_slice(&section_header(
        shstrtab_name, SHT_STRTAB, 0, 0, shstrtab_off, shstrtab.len() as u64, 0, 0, 1, 0,
    ));

    buf.extend_from_slice(&dynstr);
    buf.extend_from_slice(&dynsym);
    buf.extend_from_slice(text);
    buf.extend_from_slice(&shstrtab);

    buf
}

/// An ELF64 header with no section headers at all (`e_shnum == 0`), used to
/// exercise the "no dynamic symbol table" path.
#[must_use]
pub fn build_elf_without_sections() -> Vec<u8> {
    build_elf(&[], 0, &[])
        .iter()
        .take(64)
        .copied()
        .collect::<Vec<u8>>()
        .into_iter()
        .enumerate()
        .map(|(i, b)| if (60..64).contains(&i) { 0 } else { b })
        .collect()
}

/// Writes `data` to a uniquely named file under the OS temp directory and
/// returns its path.
pub fn write_temp_file(label: &str, data: &[u8]) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(format!(
        "sysmap-test-{label}-{}-{:?}",
        std::process::id(),
        std::thread::current().id()
    ));
    std::fs::write(&path, data).expect("write temp fixture");
    path
}
