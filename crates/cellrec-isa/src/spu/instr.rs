//! SPU instruction word and field accessors.
//!
//! SPU opcodes occupy the top 4, 7, 8, 9, or 11 bits depending on the form.
//! Registers are 7 bits wide (128 registers).

use std::fmt;

/// A 32-bit SPU instruction word.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SpuInstr(pub u32);

impl fmt::Debug for SpuInstr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SpuInstr({:#010x})", self.0)
    }
}

#[inline]
const fn sext(value: u32, bits: u32) -> i32 {
    let shift = 32 - bits;
    ((value << shift) as i32) >> shift
}

impl SpuInstr {
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    // ===== Opcode fields =====

    #[inline]
    pub const fn op4(self) -> u32 {
        self.0 >> 28
    }

    #[inline]
    pub const fn op7(self) -> u32 {
        self.0 >> 25
    }

    #[inline]
    pub const fn op8(self) -> u32 {
        self.0 >> 24
    }

    #[inline]
    pub const fn op9(self) -> u32 {
        self.0 >> 23
    }

    #[inline]
    pub const fn op11(self) -> u32 {
        self.0 >> 21
    }

    // ===== Registers =====

    /// Target register of all forms except RRR.
    #[inline]
    pub const fn rt(self) -> usize {
        (self.0 & 0x7F) as usize
    }

    #[inline]
    pub const fn ra(self) -> usize {
        ((self.0 >> 7) & 0x7F) as usize
    }

    #[inline]
    pub const fn rb(self) -> usize {
        ((self.0 >> 14) & 0x7F) as usize
    }

    /// Third source of RRR forms (low 7 bits).
    #[inline]
    pub const fn rc(self) -> usize {
        (self.0 & 0x7F) as usize
    }

    /// Target register of RRR forms.
    #[inline]
    pub const fn rt_rrr(self) -> usize {
        ((self.0 >> 21) & 0x7F) as usize
    }

    // ===== Immediates =====

    #[inline]
    pub const fn i7(self) -> i32 {
        sext((self.0 >> 14) & 0x7F, 7)
    }

    #[inline]
    pub const fn i8(self) -> u32 {
        (self.0 >> 14) & 0xFF
    }

    #[inline]
    pub const fn i10(self) -> i32 {
        sext((self.0 >> 14) & 0x3FF, 10)
    }

    #[inline]
    pub const fn i16(self) -> i32 {
        sext((self.0 >> 7) & 0xFFFF, 16)
    }

    /// The RI16 immediate without sign extension (`ilhu`, `iohl`).
    #[inline]
    pub const fn u16(self) -> u32 {
        (self.0 >> 7) & 0xFFFF
    }

    #[inline]
    pub const fn i18(self) -> u32 {
        (self.0 >> 7) & 0x3_FFFF
    }
}
