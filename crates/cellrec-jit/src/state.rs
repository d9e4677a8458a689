//! PPU register state shared between translated code and the host.
//!
//! Translated functions reach this structure through the get-state thunk and
//! address its fields with the offsets below, so the layout is fixed.
//!
//! # Layout
//!
//! ```text
//! offset 0:     r[32]        u64
//! offset 256:   f[32]        f64
//! offset 512:   v[32]        u128
//! offset 1024:  cr[8]        4 bytes each (LT, GT, EQ, SO)
//! offset 1056:  xer          so, ov, ca, bc
//! offset 1060:  fpscr        u32
//! offset 1064:  vscr         u32
//! offset 1072:  lr, ctr, tb, reserve_addr, reserve_value, pc
//! offset 1120:  reserved     u8, nonzero while a reservation is held
//! ```

use std::mem::offset_of;

use cellrec_ir::{Endian, Memory, Type};

/// One 4-bit condition-register field, a byte per bit.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CrField {
    pub lt: u8,
    pub gt: u8,
    pub eq: u8,
    pub so: u8,
}

impl CrField {
    /// Pack into the 4-bit `mfcr` nibble (LT in the high bit).
    pub const fn nibble(self) -> u32 {
        ((self.lt as u32) << 3)
            | ((self.gt as u32) << 2)
            | ((self.eq as u32) << 1)
            | self.so as u32
    }

    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_nibble(nibble: u32) -> Self {
        Self {
            lt: ((nibble >> 3) & 1) as u8,
            gt: ((nibble >> 2) & 1) as u8,
            eq: ((nibble >> 1) & 1) as u8,
            so: (nibble & 1) as u8,
        }
    }
}

/// Fixed-point exception register, a byte per field.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Xer {
    pub so: u8,
    pub ov: u8,
    pub ca: u8,
    /// Byte count of string instructions (low 7 bits).
    pub bc: u8,
}

impl Xer {
    /// Architectural 32-bit image as read by `mfxer`.
    pub const fn to_bits(self) -> u64 {
        ((self.so as u64) << 31)
            | ((self.ov as u64) << 30)
            | ((self.ca as u64) << 29)
            | (self.bc as u64 & 0x7F)
    }
}

/// PPU machine state.
#[repr(C)]
#[derive(Clone, Debug, PartialEq)]
pub struct PpuState {
    pub r: [u64; 32],
    pub f: [f64; 32],
    pub v: [u128; 32],
    pub cr: [CrField; 8],
    pub xer: Xer,
    pub fpscr: u32,
    pub vscr: u32,
    pub lr: u64,
    pub ctr: u64,
    /// Time base, read by `mftb`.
    pub tb: u64,
    /// Address reserved by the last `lwarx`/`ldarx`. Only meaningful
    /// while `reserved` is set.
    pub reserve_addr: u64,
    pub reserve_value: u64,
    pub pc: u64,
    /// Nonzero while a reservation is held.
    pub reserved: u8,
}

impl Default for PpuState {
    fn default() -> Self {
        Self {
            r: [0; 32],
            f: [0.0; 32],
            v: [0; 32],
            cr: [CrField::default(); 8],
            xer: Xer::default(),
            fpscr: 0,
            vscr: 0,
            lr: 0,
            ctr: 0,
            tb: 0,
            reserve_addr: 0,
            reserve_value: 0,
            pc: 0,
            reserved: 0,
        }
    }
}

/// Byte offsets of state fields.
pub mod offsets {
    use super::{CrField, PpuState, Xer, offset_of};

    pub const R: usize = offset_of!(PpuState, r);
    pub const F: usize = offset_of!(PpuState, f);
    pub const V: usize = offset_of!(PpuState, v);
    pub const CR: usize = offset_of!(PpuState, cr);
    pub const XER: usize = offset_of!(PpuState, xer);
    pub const XER_SO: usize = XER + offset_of!(Xer, so);
    pub const XER_OV: usize = XER + offset_of!(Xer, ov);
    pub const XER_CA: usize = XER + offset_of!(Xer, ca);
    pub const XER_BC: usize = XER + offset_of!(Xer, bc);
    pub const FPSCR: usize = offset_of!(PpuState, fpscr);
    pub const VSCR: usize = offset_of!(PpuState, vscr);
    pub const LR: usize = offset_of!(PpuState, lr);
    pub const CTR: usize = offset_of!(PpuState, ctr);
    pub const TB: usize = offset_of!(PpuState, tb);
    pub const RESERVE_ADDR: usize = offset_of!(PpuState, reserve_addr);
    pub const RESERVE_VALUE: usize = offset_of!(PpuState, reserve_value);
    pub const PC: usize = offset_of!(PpuState, pc);
    pub const RESERVED: usize = offset_of!(PpuState, reserved);

    /// Size of one CR field.
    pub const CR_FIELD: usize = size_of::<CrField>();
}

impl PpuState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Image of the whole condition register as read by `mfcr`.
    pub fn cr_bits(&self) -> u32 {
        self.cr
            .iter()
            .fold(0, |acc, field| (acc << 4) | field.nibble())
    }

    /// Copy this state into `memory` at `base`, field by field in host order.
    pub fn store_into(&self, memory: &mut Memory, base: u64) {
        let at = |offset: usize| base + offset as u64;
        for (i, &r) in self.r.iter().enumerate() {
            memory.store(at(offsets::R + i * 8), Type::I64, Endian::Native, u128::from(r));
        }
        for (i, f) in self.f.iter().enumerate() {
            memory.store(at(offsets::F + i * 8), Type::I64, Endian::Native, u128::from(f.to_bits()));
        }
        for (i, &v) in self.v.iter().enumerate() {
            memory.store(at(offsets::V + i * 16), Type::I128, Endian::Native, v);
        }
        for (i, field) in self.cr.iter().enumerate() {
            let bytes = [field.lt, field.gt, field.eq, field.so];
            memory.write(at(offsets::CR + i * offsets::CR_FIELD), &bytes);
        }
        let xer = [self.xer.so, self.xer.ov, self.xer.ca, self.xer.bc];
        memory.write(at(offsets::XER), &xer);
        memory.store(at(offsets::FPSCR), Type::I32, Endian::Native, u128::from(self.fpscr));
        memory.store(at(offsets::VSCR), Type::I32, Endian::Native, u128::from(self.vscr));
        for (offset, value) in [
            (offsets::LR, self.lr),
            (offsets::CTR, self.ctr),
            (offsets::TB, self.tb),
            (offsets::RESERVE_ADDR, self.reserve_addr),
            (offsets::RESERVE_VALUE, self.reserve_value),
            (offsets::PC, self.pc),
        ] {
            memory.store(at(offset), Type::I64, Endian::Native, u128::from(value));
        }
        memory.write(at(offsets::RESERVED), &[self.reserved]);
    }

    /// Read a state previously laid out at `base`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn load_from(memory: &Memory, base: u64) -> Self {
        let at = |offset: usize| base + offset as u64;
        let u64_at = |offset: usize| memory.load(at(offset), Type::I64, Endian::Native) as u64;
        let u32_at = |offset: usize| memory.load(at(offset), Type::I32, Endian::Native) as u32;
        let mut state = Self::default();
        for (i, r) in state.r.iter_mut().enumerate() {
            *r = u64_at(offsets::R + i * 8);
        }
        for (i, f) in state.f.iter_mut().enumerate() {
            *f = f64::from_bits(u64_at(offsets::F + i * 8));
        }
        for (i, v) in state.v.iter_mut().enumerate() {
            *v = memory.load(at(offsets::V + i * 16), Type::I128, Endian::Native);
        }
        for (i, field) in state.cr.iter_mut().enumerate() {
            let mut bytes = [0u8; 4];
            memory.read(at(offsets::CR + i * offsets::CR_FIELD), &mut bytes);
            *field = CrField {
                lt: bytes[0],
                gt: bytes[1],
                eq: bytes[2],
                so: bytes[3],
            };
        }
        let mut xer = [0u8; 4];
        memory.read(at(offsets::XER), &mut xer);
        state.xer = Xer {
            so: xer[0],
            ov: xer[1],
            ca: xer[2],
            bc: xer[3],
        };
        state.fpscr = u32_at(offsets::FPSCR);
        state.vscr = u32_at(offsets::VSCR);
        state.lr = u64_at(offsets::LR);
        state.ctr = u64_at(offsets::CTR);
        state.tb = u64_at(offsets::TB);
        state.reserve_addr = u64_at(offsets::RESERVE_ADDR);
        state.reserve_value = u64_at(offsets::RESERVE_VALUE);
        state.pc = u64_at(offsets::PC);
        let mut reserved = [0u8];
        memory.read(at(offsets::RESERVED), &mut reserved);
        state.reserved = reserved[0];
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_layout() {
        assert_eq!(offsets::R, 0);
        assert_eq!(offsets::F, 256);
        assert_eq!(offsets::V, 512);
        assert_eq!(offsets::CR, 1024);
        assert_eq!(offsets::XER, 1056);
        assert_eq!(offsets::XER_CA, 1058);
        assert_eq!(offsets::FPSCR, 1060);
        assert_eq!(offsets::VSCR, 1064);
        assert_eq!(offsets::LR, 1072);
        assert_eq!(offsets::PC, 1112);
        assert_eq!(offsets::RESERVED, 1120);
    }

    #[test]
    fn test_cr_and_xer_images() {
        let mut state = PpuState::new();
        state.cr[0] = CrField::from_nibble(0b0010);
        state.cr[7] = CrField::from_nibble(0b1001);
        assert_eq!(state.cr_bits(), 0x2000_0009);

        state.xer.so = 1;
        state.xer.ca = 1;
        state.xer.bc = 0xFF;
        assert_eq!(state.xer.to_bits(), 0xA000_007F);
    }

    #[test]
    fn test_memory_image_preserves_fields() {
        let mut state = PpuState::new();
        state.r[14] = 0xDEAD_BEEF;
        state.f[1] = 2.5;
        state.v[2] = u128::MAX - 1;
        state.cr[3].eq = 1;
        state.xer.ov = 1;
        state.fpscr = 0x8000_0000;
        state.lr = 0x1_0000;
        state.reserve_addr = 0x2000;
        state.reserved = 1;

        let mut memory = Memory::new();
        state.store_into(&mut memory, 0x4000);
        assert_eq!(PpuState::load_from(&memory, 0x4000), state);
    }
}
