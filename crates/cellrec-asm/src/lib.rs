//! Instruction encoders for the Cell PPU and SPU, and for the AArch64 host.
//!
//! Each assembler writes instruction words into a caller-owned byte slice
//! through a [`CodeBuffer`]: big-endian for the guest instruction sets,
//! little-endian for AArch64. Instructions can be emitted through typed
//! methods (`asm.addi(3, 1, -16)`) or by mnemonic from a static table
//! (`asm.emit("addi", &[...])`). Branches may target a [`Label`]; labels are
//! patched when the assembler is finalized.
//!
//! Every operand is range checked. A failed instruction writes nothing and
//! leaves the buffer cursor where it was.

pub mod arm;
mod buffer;
mod emitter;
mod error;
mod forms;
mod label;
pub mod ppc;
pub mod spu;
mod table;

pub use arm::{ARM_OPS, ArmAssembler};
pub use buffer::{ByteOrder, CodeBuffer};
pub use error::{EncodeError, Result};
pub use forms::Form;
pub use label::{Fixup, FixupKind, Label, LabelArena};
pub use ppc::{PPC_OPS, PpcAssembler};
pub use spu::{SPU_OPS, SpuAssembler};
pub use table::{Field, OpDef, Operand, Target};
