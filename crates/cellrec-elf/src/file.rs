//! ELF64 big-endian file parser.

use crate::constants::*;
use crate::header::*;
use crate::{ElfError, Result};

#[inline]
fn read_be16(data: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([data[offset], data[offset + 1]])
}

#[inline]
fn read_be32(data: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

#[inline]
fn read_be64(data: &[u8], offset: usize) -> u64 {
    (u64::from(read_be32(data, offset)) << 32) | u64::from(read_be32(data, offset + 4))
}

/// `offset + len` as a checked byte range end inside `data`.
fn fits(data: &[u8], offset: u64, len: u64) -> Option<(usize, usize)> {
    let start = usize::try_from(offset).ok()?;
    let end = start.checked_add(usize::try_from(len).ok()?)?;
    (end <= data.len()).then_some((start, end))
}

/// Parsed ELF file.
#[derive(Clone, Debug)]
pub struct ElfFile {
    pub entry_point: u64,
    pub e_flags: u32,
    pub program_headers: Vec<ProgramHeader>,
    pub symbols: Vec<Symbol>,
}

impl ElfFile {
    /// Parse ELF file from raw bytes.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let header = Self::parse_header(data)?;
        let program_headers = Self::parse_program_headers(data, &header)?;
        let sections = Self::parse_all_sections(data, &header)?;
        let symbols = Self::parse_symbols(data, &sections);

        Ok(Self {
            entry_point: header.entry,
            e_flags: header.flags,
            program_headers,
            symbols,
        })
    }

    /// Look up a function symbol by name.
    pub fn lookup_function(&self, name: &str) -> Option<u64> {
        self.symbols
            .iter()
            .find(|s| s.name == name && s.is_function())
            .map(|s| s.value)
    }

    fn parse_header(data: &[u8]) -> Result<ElfHeader> {
        if data.len() < EHDR_SIZE {
            return Err(ElfError::TooSmall);
        }
        if data[0..4] != ELF_MAGIC {
            return Err(ElfError::InvalidMagic);
        }

        let class = data[4];
        if class != ELF_CLASS_64 {
            return Err(ElfError::UnsupportedClass(class));
        }
        if data[5] != ELF_DATA_MSB {
            return Err(ElfError::NotBigEndian);
        }
        let machine = read_be16(data, 18);
        if machine != ELF_MACHINE_PPC64 {
            return Err(ElfError::UnsupportedMachine(machine));
        }

        Ok(ElfHeader {
            class,
            data: data[5],
            machine,
            entry: read_be64(data, 24),
            phoff: read_be64(data, 32),
            shoff: read_be64(data, 40),
            flags: read_be32(data, 48),
            phentsize: read_be16(data, 54),
            phnum: read_be16(data, 56),
            shentsize: read_be16(data, 58),
            shnum: read_be16(data, 60),
            shstrndx: read_be16(data, 62),
        })
    }

    fn parse_program_headers(data: &[u8], header: &ElfHeader) -> Result<Vec<ProgramHeader>> {
        (0..u64::from(header.phnum))
            .map(|i| {
                let offset = header.phoff + i * u64::from(header.phentsize);
                let (at, _) =
                    fits(data, offset, PHDR_SIZE as u64).ok_or(ElfError::ProgramOutOfBounds)?;
                Ok(ProgramHeader {
                    p_type: read_be32(data, at),
                    flags: read_be32(data, at + 4),
                    offset: read_be64(data, at + 8),
                    vaddr: read_be64(data, at + 16),
                    filesz: read_be64(data, at + 32),
                    memsz: read_be64(data, at + 40),
                })
            })
            .collect()
    }

    fn parse_all_sections(data: &[u8], header: &ElfHeader) -> Result<Vec<SectionHeader>> {
        (0..u64::from(header.shnum))
            .map(|i| {
                let offset = header.shoff + i * u64::from(header.shentsize);
                let (at, _) =
                    fits(data, offset, SHDR_SIZE as u64).ok_or(ElfError::SectionOutOfBounds)?;
                Ok(SectionHeader {
                    name: read_be32(data, at),
                    sh_type: read_be32(data, at + 4),
                    flags: read_be64(data, at + 8),
                    addr: read_be64(data, at + 16),
                    offset: read_be64(data, at + 24),
                    size: read_be64(data, at + 32),
                    link: read_be32(data, at + 40),
                    entsize: read_be64(data, at + 56),
                })
            })
            .collect()
    }

    fn extract_string(data: &[u8], strtab: &SectionHeader, index: u32) -> String {
        let Some((start, end)) = fits(data, strtab.offset, strtab.size) else {
            return String::new();
        };
        let table = &data[start..end];
        let Some(tail) = table.get(index as usize..) else {
            return String::new();
        };
        let len = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
        String::from_utf8_lossy(&tail[..len]).into_owned()
    }

    /// Symbols of the first `.symtab`; malformed entries are skipped.
    fn parse_symbols(data: &[u8], sections: &[SectionHeader]) -> Vec<Symbol> {
        let Some(symtab) = sections.iter().find(|s| s.sh_type == SHT_SYMTAB) else {
            return Vec::new();
        };
        let Some(strtab) = sections
            .get(symtab.link as usize)
            .filter(|s| s.sh_type == SHT_STRTAB)
        else {
            return Vec::new();
        };
        if symtab.entsize < SYM_SIZE as u64 {
            return Vec::new();
        }

        let count = symtab.size / symtab.entsize;
        (0..count)
            .filter_map(|i| {
                let (at, _) = fits(data, symtab.offset + i * symtab.entsize, SYM_SIZE as u64)?;
                let info = data[at + 4];
                Some(Symbol {
                    name: Self::extract_string(data, strtab, read_be32(data, at)),
                    value: read_be64(data, at + 8),
                    size: read_be64(data, at + 16),
                    sym_type: info & 0xf,
                    binding: info >> 4,
                    shndx: read_be16(data, at + 6),
                })
            })
            .collect()
    }
}

/// Slice of `data` covered by a program header's file image.
pub(crate) fn segment_bytes<'a>(data: &'a [u8], phdr: &ProgramHeader) -> Result<&'a [u8]> {
    let (start, end) = fits(data, phdr.offset, phdr.filesz).ok_or(ElfError::SegmentBeyondFile)?;
    Ok(&data[start..end])
}
