//! SPU (Synergistic Processor Unit) instruction set.

mod decode;
mod instr;
mod opcode;

pub use decode::decode_spu;
pub use instr::SpuInstr;
pub use opcode::{SPU_OP_INFO, SpuOpcode};
