//! Cell Broadband Engine instruction set definitions and decoder.
//!
//! This crate provides the 32-bit instruction words of the PPU (64-bit
//! PowerPC) and SPU cores, their named bit-field accessors, and decoders
//! to [`PpuOpcode`] and [`SpuOpcode`]. Every opcode carries static metadata
//! (mnemonic and class) in a table indexed by the opcode discriminant.

pub mod ppu;
pub mod spu;
mod types;

pub use ppu::{PpuInstr, PpuOpcode, decode_ppu, disasm_ppu};
pub use spu::{SpuInstr, SpuOpcode, decode_spu};
pub use types::*;

/// Fetch a big-endian instruction word at `offset` of `code`.
#[inline]
pub fn fetch_word(code: &[u8], offset: usize) -> Option<u32> {
    let bytes = code.get(offset..offset + 4)?;
    Some(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}
