//! SPU register state shared between translated code and the host.
//!
//! Registers are held as native `u128` values whose most significant byte
//! is byte 0 of the architectural quadword, so the preferred slot (word 0)
//! is bits 127..96.
//!
//! # Layout
//!
//! ```text
//! offset 0:     gpr[128]     u128
//! offset 2048:  pc           u32, local-store address of the last stop
//! offset 2052:  stop_signal  u32
//! ```

use std::mem::offset_of;

use cellrec_ir::{Endian, Memory, Type};
use cellrec_isa::SPU_NUM_REGS;

/// Local-store size in bytes.
pub const LOCAL_STORE_SIZE: u32 = 0x4_0000;

/// Local-store limit mask applied to every effective address.
pub const LSLR: u32 = LOCAL_STORE_SIZE - 1;

/// SPU machine state.
#[repr(C)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpuState {
    pub gpr: [u128; SPU_NUM_REGS],
    pub pc: u32,
    /// Signal type of the last `stop`.
    pub stop_signal: u32,
}

impl Default for SpuState {
    fn default() -> Self {
        Self {
            gpr: [0; SPU_NUM_REGS],
            pc: 0,
            stop_signal: 0,
        }
    }
}

/// Byte offsets of state fields.
pub mod offsets {
    use super::{SpuState, offset_of};

    pub const GPR: usize = offset_of!(SpuState, gpr);
    pub const PC: usize = offset_of!(SpuState, pc);
    pub const STOP_SIGNAL: usize = offset_of!(SpuState, stop_signal);

    /// Offset of register `n`.
    pub const fn gpr(n: usize) -> usize {
        GPR + n * 16
    }
}

impl SpuState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preferred-slot word of register `n`.
    #[allow(clippy::cast_possible_truncation)]
    pub const fn preferred(&self, n: usize) -> u32 {
        (self.gpr[n] >> 96) as u32
    }

    /// Set the preferred slot of register `n`, clearing the other words.
    pub fn set_preferred(&mut self, n: usize, word: u32) {
        self.gpr[n] = u128::from(word) << 96;
    }

    pub fn store_into(&self, memory: &mut Memory, base: u64) {
        let at = |offset: usize| base + offset as u64;
        for (i, &r) in self.gpr.iter().enumerate() {
            memory.store(at(offsets::gpr(i)), Type::I128, Endian::Native, r);
        }
        memory.store(at(offsets::PC), Type::I32, Endian::Native, u128::from(self.pc));
        memory.store(
            at(offsets::STOP_SIGNAL),
            Type::I32,
            Endian::Native,
            u128::from(self.stop_signal),
        );
    }

    #[allow(clippy::cast_possible_truncation)]
    pub fn load_from(memory: &Memory, base: u64) -> Self {
        let at = |offset: usize| base + offset as u64;
        let mut state = Self::default();
        for (i, r) in state.gpr.iter_mut().enumerate() {
            *r = memory.load(at(offsets::gpr(i)), Type::I128, Endian::Native);
        }
        state.pc = memory.load(at(offsets::PC), Type::I32, Endian::Native) as u32;
        state.stop_signal = memory.load(at(offsets::STOP_SIGNAL), Type::I32, Endian::Native) as u32;
        state
    }
}
