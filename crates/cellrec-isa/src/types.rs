//! Core types shared by the PPU and SPU definitions.

use thiserror::Error;

/// Coarse classification of an opcode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpClass {
    /// Integer arithmetic, logical, rotate, and compare.
    Integer,
    /// Branches and condition-register logic.
    Branch,
    /// Loads, stores, reservations, and cache hints.
    Memory,
    /// Floating-point arithmetic and status register.
    Float,
    /// AltiVec / VMX.
    Vector,
    /// Special-purpose registers, barriers, traps, system calls.
    System,
}

/// Static metadata for one opcode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpInfo<Op: 'static> {
    pub opcode: Op,
    pub mnemonic: &'static str,
    pub class: OpClass,
}

/// Decoding errors.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unknown instruction word {0:#010x}")]
    Unknown(u32),
}

/// Number of PPU general-purpose, floating-point, and vector registers.
pub const PPU_NUM_REGS: usize = 32;

/// Number of PPU condition-register fields.
pub const PPU_NUM_CR_FIELDS: usize = 8;

/// Number of SPU registers.
pub const SPU_NUM_REGS: usize = 128;

/// Special-purpose register numbers used by the PPU translator.
pub mod spr {
    pub const XER: u32 = 1;
    pub const LR: u32 = 8;
    pub const CTR: u32 = 9;
    pub const VRSAVE: u32 = 256;
    pub const TBL: u32 = 268;
    pub const TBU: u32 = 269;
}

/// Condition-register bit positions inside a 4-bit field.
pub mod crbit {
    pub const LT: u32 = 0;
    pub const GT: u32 = 1;
    pub const EQ: u32 = 2;
    pub const SO: u32 = 3;
}
