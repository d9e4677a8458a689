//! ELF loader for PPU executables (ELF64, big-endian, `EM_PPC64`).

mod constants;
mod file;
mod header;
mod image;

pub use constants::*;
pub use file::ElfFile;
pub use header::*;
pub use image::*;

use thiserror::Error;

/// ELF parsing errors.
#[derive(Error, Debug)]
pub enum ElfError {
    #[error("ELF data too small")]
    TooSmall,
    #[error("Invalid ELF magic number")]
    InvalidMagic,
    #[error("Only big-endian ELF supported")]
    NotBigEndian,
    #[error("Unsupported ELF class: {0}")]
    UnsupportedClass(u8),
    #[error("Unsupported ELF machine: {0}")]
    UnsupportedMachine(u16),
    #[error("Section header out of bounds")]
    SectionOutOfBounds,
    #[error("Program header out of bounds")]
    ProgramOutOfBounds,
    #[error("Segment extends beyond file")]
    SegmentBeyondFile,
    #[error("Virtual address overflow")]
    VirtualAddressOverflow,
    #[error("No loadable segments found")]
    NoLoadableSegments,
    #[error("Too many loadable segments")]
    TooManySegments,
    #[error("Overlapping virtual address ranges")]
    OverlappingSegments,
}

pub type Result<T> = std::result::Result<T, ElfError>;
