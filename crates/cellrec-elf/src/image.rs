//! ELF image with memory segments.

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::constants::*;
use crate::file::{ElfFile, segment_bytes};
use crate::header::{ProgramHeader, Symbol};
use crate::{ElfError, Result};

/// A memory segment with virtual address and data.
///
/// `data` holds only the file image (filesz bytes); bytes from `data.len()`
/// up to `virtual_end` are zero-initialized.
#[derive(Clone, Debug)]
pub struct MemorySegment {
    pub virtual_start: u64,
    pub virtual_end: u64,
    pub data: Vec<u8>,
    pub flags: u32,
}

impl MemorySegment {
    /// Size of file data (non-BSS).
    pub fn filesz(&self) -> u64 {
        self.data.len() as u64
    }

    /// Total memory size including BSS.
    pub const fn memsz(&self) -> u64 {
        self.virtual_end - self.virtual_start
    }

    pub const fn is_readonly(&self) -> bool {
        (self.flags & PF_W) == 0
    }

    pub const fn is_executable(&self) -> bool {
        (self.flags & PF_X) != 0
    }

    pub const fn contains(&self, address: u64) -> bool {
        address >= self.virtual_start && address < self.virtual_end
    }

    /// Big-endian doubleword at `address`, if it lies in the file image.
    pub fn read_u64(&self, address: u64) -> Option<u64> {
        let offset = usize::try_from(address.checked_sub(self.virtual_start)?).ok()?;
        let bytes = self.data.get(offset..offset.checked_add(8)?)?;
        Some(u64::from_be_bytes(bytes.try_into().ok()?))
    }
}

/// ELF image ready for loading into memory.
#[derive(Clone, Debug)]
pub struct ElfImage {
    pub entry_point: u64,
    pub segments: Vec<MemorySegment>,
    pub symbols: Vec<Symbol>,
}

impl ElfImage {
    /// Parse a big-endian ELF64 PowerPC image.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let elf = ElfFile::parse(data)?;
        let loadable = Self::validate_segments(&elf)?;
        let segments = loadable
            .iter()
            .map(|phdr| {
                Ok(MemorySegment {
                    virtual_start: phdr.vaddr,
                    virtual_end: phdr.vaddr + phdr.memsz,
                    data: segment_bytes(data, phdr)?.to_vec(),
                    flags: phdr.flags,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            entry = format_args!("{:#x}", elf.entry_point),
            segments = segments.len(),
            symbols = elf.symbols.len(),
            "parsed ELF image"
        );
        Ok(Self {
            entry_point: elf.entry_point,
            segments,
            symbols: elf.symbols,
        })
    }

    /// Wrap raw code (not an ELF file) as a single executable segment.
    pub fn from_bytecode(code: Vec<u8>, base: u64) -> Self {
        let segment = MemorySegment {
            virtual_start: base,
            virtual_end: base + code.len() as u64,
            data: code,
            flags: PF_X | PF_R,
        };
        Self {
            entry_point: base,
            segments: vec![segment],
            symbols: Vec::new(),
        }
    }

    pub fn executable_segments(&self) -> impl Iterator<Item = &MemorySegment> {
        self.segments.iter().filter(|s| s.is_executable())
    }

    pub fn segment_containing(&self, address: u64) -> Option<&MemorySegment> {
        self.segments.iter().find(|s| s.contains(address))
    }

    /// Code address named by the function descriptor at `address`.
    ///
    /// PPU executables point their entry and function symbols at descriptors
    /// whose first doubleword is the code address.
    pub fn resolve_descriptor(&self, address: u64) -> Option<u64> {
        self.segment_containing(address)?.read_u64(address)
    }

    /// Function symbols located in executable segments, one per address,
    /// sorted by address.
    pub fn function_symbols(&self) -> Vec<&Symbol> {
        let mut seen = FxHashSet::default();
        let mut functions: Vec<&Symbol> = self
            .symbols
            .iter()
            .filter(|s| s.is_function())
            .filter(|s| self.executable_segments().any(|seg| seg.contains(s.value)))
            .filter(|s| seen.insert(s.value))
            .collect();
        functions.sort_by_key(|s| s.value);
        functions
    }

    fn validate_segments(elf: &ElfFile) -> Result<Vec<ProgramHeader>> {
        let mut loadable = Vec::new();
        for phdr in &elf.program_headers {
            if phdr.p_type == PT_LOAD && phdr.memsz > 0 {
                if phdr.filesz > phdr.memsz {
                    return Err(ElfError::SegmentBeyondFile);
                }
                if phdr.vaddr.checked_add(phdr.memsz).is_none() {
                    return Err(ElfError::VirtualAddressOverflow);
                }
                loadable.push(phdr.clone());
            }
        }

        if loadable.is_empty() {
            return Err(ElfError::NoLoadableSegments);
        }
        if loadable.len() > MAX_SEGMENTS {
            return Err(ElfError::TooManySegments);
        }

        for (i, a) in loadable.iter().enumerate() {
            for b in loadable.iter().skip(i + 1) {
                if a.vaddr < b.vaddr + b.memsz && b.vaddr < a.vaddr + a.memsz {
                    return Err(ElfError::OverlappingSegments);
                }
            }
        }
        Ok(loadable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal ELF64 big-endian PPC64 writer: one PT_LOAD segment holding
    /// `code` at `base`, plus `.symtab`/`.strtab` for `symbols`.
    fn build_elf(base: u64, code: &[u8], symbols: &[(&str, u64, u8)]) -> Vec<u8> {
        fn put16(v: &mut Vec<u8>, x: u16) {
            v.extend_from_slice(&x.to_be_bytes());
        }
        fn put32(v: &mut Vec<u8>, x: u32) {
            v.extend_from_slice(&x.to_be_bytes());
        }
        fn put64(v: &mut Vec<u8>, x: u64) {
            v.extend_from_slice(&x.to_be_bytes());
        }

        let code_off = 0x100u64;
        let mut strtab = vec![0u8];
        let mut names = Vec::new();
        for (name, _, _) in symbols {
            names.push(strtab.len() as u32);
            strtab.extend_from_slice(name.as_bytes());
            strtab.push(0);
        }
        let symtab_off = (code_off + code.len() as u64).next_multiple_of(8);
        let symtab_size = (symbols.len() as u64 + 1) * SYM_SIZE as u64;
        let strtab_off = symtab_off + symtab_size;
        let shoff = (strtab_off + strtab.len() as u64).next_multiple_of(8);

        let mut v = Vec::new();
        v.extend_from_slice(&ELF_MAGIC);
        v.extend_from_slice(&[ELF_CLASS_64, ELF_DATA_MSB, 1, 0]);
        v.resize(16, 0);
        put16(&mut v, 2);
        put16(&mut v, ELF_MACHINE_PPC64);
        put32(&mut v, 1);
        put64(&mut v, base);
        put64(&mut v, EHDR_SIZE as u64);
        put64(&mut v, shoff);
        put32(&mut v, 0);
        put16(&mut v, EHDR_SIZE as u16);
        put16(&mut v, PHDR_SIZE as u16);
        put16(&mut v, 1);
        put16(&mut v, SHDR_SIZE as u16);
        put16(&mut v, 3);
        put16(&mut v, 0);

        put32(&mut v, PT_LOAD);
        put32(&mut v, PF_R | PF_X);
        put64(&mut v, code_off);
        put64(&mut v, base);
        put64(&mut v, base);
        put64(&mut v, code.len() as u64);
        put64(&mut v, code.len() as u64);
        put64(&mut v, 0x1_0000);

        v.resize(code_off as usize, 0);
        v.extend_from_slice(code);
        v.resize(symtab_off as usize, 0);
        v.resize(v.len() + SYM_SIZE, 0);
        for ((_, value, kind), name) in symbols.iter().zip(&names) {
            put32(&mut v, *name);
            v.push((STB_GLOBAL << 4) | kind);
            v.push(0);
            put16(&mut v, 1);
            put64(&mut v, *value);
            put64(&mut v, 4);
        }
        v.extend_from_slice(&strtab);
        v.resize(shoff as usize, 0);

        // null, .symtab, .strtab
        v.resize(v.len() + SHDR_SIZE, 0);
        for (kind, off, size, link, entsize) in [
            (SHT_SYMTAB, symtab_off, symtab_size, 2, SYM_SIZE as u64),
            (SHT_STRTAB, strtab_off, strtab.len() as u64, 0, 0),
        ] {
            put32(&mut v, 0);
            put32(&mut v, kind);
            put64(&mut v, 0);
            put64(&mut v, 0);
            put64(&mut v, off);
            put64(&mut v, size);
            put32(&mut v, link);
            put32(&mut v, 0);
            put64(&mut v, 8);
            put64(&mut v, entsize);
        }
        v
    }

    #[test]
    fn test_parse_image() {
        let code = [0x38, 0x60, 0x00, 0x2A, 0x4E, 0x80, 0x00, 0x20];
        let data = build_elf(
            0x1_0000,
            &code,
            &[("main", 0x1_0000, STT_FUNC), ("table", 0x1_0004, STT_OBJECT)],
        );
        let image = ElfImage::parse(&data).unwrap();

        assert_eq!(image.entry_point, 0x1_0000);
        assert_eq!(image.segments.len(), 1);
        assert_eq!(image.segments[0].data, code);
        assert!(image.segments[0].is_executable());
        assert_eq!(image.symbols.len(), 3);

        let functions = image.function_symbols();
        assert_eq!(functions.len(), 1);
        assert_eq!(functions[0].name, "main");
    }

    #[test]
    fn test_rejects_foreign_images() {
        let mut data = build_elf(0x1_0000, &[0; 4], &[]);
        data[5] = 1;
        assert!(matches!(ElfImage::parse(&data), Err(ElfError::NotBigEndian)));

        let mut data = build_elf(0x1_0000, &[0; 4], &[]);
        data[19] = 62;
        assert!(matches!(
            ElfImage::parse(&data),
            Err(ElfError::UnsupportedMachine(62))
        ));

        assert!(matches!(ElfImage::parse(&[0x7F]), Err(ElfError::TooSmall)));
        assert!(matches!(
            ElfImage::parse(&[0u8; 64]),
            Err(ElfError::InvalidMagic)
        ));
    }

    #[test]
    fn test_segment_beyond_file() {
        let mut data = build_elf(0x1_0000, &[0; 8], &[]);
        // Inflate p_filesz and p_memsz of the only program header.
        let phdr = EHDR_SIZE;
        data[phdr + 32..phdr + 40].copy_from_slice(&0x10_0000u64.to_be_bytes());
        data[phdr + 40..phdr + 48].copy_from_slice(&0x10_0000u64.to_be_bytes());
        assert!(matches!(
            ElfImage::parse(&data),
            Err(ElfError::SegmentBeyondFile)
        ));
    }

    #[test]
    fn test_descriptor_resolution() {
        let mut code = vec![0u8; 16];
        code[..8].copy_from_slice(&0x1_0008u64.to_be_bytes());
        let image = ElfImage::from_bytecode(code, 0x1_0000);
        assert_eq!(image.resolve_descriptor(0x1_0000), Some(0x1_0008));
        assert_eq!(image.resolve_descriptor(0x1_000C), None);
        assert_eq!(image.resolve_descriptor(0x2_0000), None);
    }

    #[test]
    fn test_segment_properties() {
        let segment = MemorySegment {
            virtual_start: 0x1000,
            virtual_end: 0x2000,
            data: vec![0; 0x800],
            flags: PF_R | PF_X,
        };
        assert_eq!(segment.filesz(), 0x800);
        assert_eq!(segment.memsz(), 0x1000);
        assert!(segment.is_readonly());
        assert!(segment.is_executable());
        assert!(segment.contains(0x1FFF) && !segment.contains(0x2000));
    }
}
