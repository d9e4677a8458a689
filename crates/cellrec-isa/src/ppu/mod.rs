//! PPU (64-bit PowerPC with VMX) instruction set.

mod decode;
mod disasm;
mod instr;
mod opcode;

pub use decode::decode_ppu;
pub use disasm::disasm_ppu;
pub use instr::PpuInstr;
pub use opcode::{PPU_OP_INFO, PpuOpcode};
