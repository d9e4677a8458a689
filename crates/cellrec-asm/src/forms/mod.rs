//! Instruction forms and the checked field packers shared by every target.
//!
//! Every operand is validated against its field width before it is shifted
//! into place. Nothing is ever masked into range.

pub mod arm;
pub mod ppc;
pub mod spu;

use std::fmt;

use crate::error::{EncodeError, Result};

/// Bit layout of an instruction word.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Form {
    // PPC
    I,
    B,
    SC,
    D,
    DS,
    X,
    XL,
    XFX,
    XO,
    A,
    M,
    MD,
    XS,
    VA,
    VX,
    // SPU
    RR,
    RRR,
    RI7,
    RI8,
    RI10,
    RI16,
    RI18,
    // AArch64 encoding classes
    AddSubImm,
    AddSubReg,
    LogicImm,
    LogicReg,
    MoveWide,
    Bitfield,
    CondSelect,
    DataProc1,
    DataProc2,
    DataProc3,
    LoadStore,
    LoadStorePair,
    BranchImm,
    CondBranch,
    CompareBranch,
    BranchReg,
    Exception,
    Hint,
    FpDataProc1,
    FpDataProc2,
    FpDataProc3,
    FpCompare,
    FpInt,
}

impl Form {
    pub const fn name(self) -> &'static str {
        match self {
            Self::I => "I",
            Self::B => "B",
            Self::SC => "SC",
            Self::D => "D",
            Self::DS => "DS",
            Self::X => "X",
            Self::XL => "XL",
            Self::XFX => "XFX",
            Self::XO => "XO",
            Self::A => "A",
            Self::M => "M",
            Self::MD => "MD",
            Self::XS => "XS",
            Self::VA => "VA",
            Self::VX => "VX",
            Self::RR => "RR",
            Self::RRR => "RRR",
            Self::RI7 => "RI7",
            Self::RI8 => "RI8",
            Self::RI10 => "RI10",
            Self::RI16 => "RI16",
            Self::RI18 => "RI18",
            Self::AddSubImm => "add/sub (immediate)",
            Self::AddSubReg => "add/sub (shifted register)",
            Self::LogicImm => "logical (immediate)",
            Self::LogicReg => "logical (shifted register)",
            Self::MoveWide => "move wide",
            Self::Bitfield => "bitfield",
            Self::CondSelect => "conditional select",
            Self::DataProc1 => "data processing (1 source)",
            Self::DataProc2 => "data processing (2 source)",
            Self::DataProc3 => "data processing (3 source)",
            Self::LoadStore => "load/store (unsigned offset)",
            Self::LoadStorePair => "load/store pair",
            Self::BranchImm => "branch (immediate)",
            Self::CondBranch => "conditional branch",
            Self::CompareBranch => "compare and branch",
            Self::BranchReg => "branch (register)",
            Self::Exception => "exception generation",
            Self::Hint => "hint",
            Self::FpDataProc1 => "floating-point (1 source)",
            Self::FpDataProc2 => "floating-point (2 source)",
            Self::FpDataProc3 => "floating-point (3 source)",
            Self::FpCompare => "floating-point compare",
            Self::FpInt => "floating-point/integer conversion",
        }
    }
}

impl fmt::Display for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Check a register index against `max`.
pub(crate) const fn reg(index: u32, max: u32) -> Result<u32> {
    if index > max {
        Err(EncodeError::RegisterOutOfRange { index, max })
    } else {
        Ok(index)
    }
}

/// Check an unsigned field of `bits` width.
pub(crate) const fn uimm(value: i64, bits: u32) -> Result<u32> {
    if value < 0 || value >= (1i64 << bits) {
        Err(EncodeError::ImmediateOutOfRange { value, bits })
    } else {
        Ok(value as u32)
    }
}

/// Check a signed field of `bits` width, returning it in two's complement
/// truncated to the field.
pub(crate) const fn simm(value: i64, bits: u32) -> Result<u32> {
    let min = -(1i64 << (bits - 1));
    let max = (1i64 << (bits - 1)) - 1;
    if value < min || value > max {
        Err(EncodeError::ImmediateOutOfRange { value, bits })
    } else {
        Ok((value as u32) & ((1u32 << bits) - 1))
    }
}

/// Check a word-aligned signed byte displacement whose field, including
/// the two implied zero bits, is `bits` wide.
pub(crate) const fn disp(value: i64, bits: u32) -> Result<u32> {
    if value & 3 != 0 {
        return Err(EncodeError::MisalignedDisplacement(value));
    }
    simm(value, bits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_bounds() {
        assert_eq!(simm(-1, 16), Ok(0xFFFF));
        assert_eq!(simm(32767, 16), Ok(0x7FFF));
        assert!(simm(32768, 16).is_err());
        assert!(simm(-32769, 16).is_err());
    }

    #[test]
    fn test_unsigned_bounds() {
        assert_eq!(uimm(0xFFFF, 16), Ok(0xFFFF));
        assert!(uimm(0x1_0000, 16).is_err());
        assert!(uimm(-1, 5).is_err());
    }

    #[test]
    fn test_displacement_alignment() {
        assert_eq!(disp(-4, 16), Ok(0xFFFC));
        assert_eq!(disp(6, 16), Err(EncodeError::MisalignedDisplacement(6)));
        assert!(disp(1 << 25, 26).is_err());
    }

    #[test]
    fn test_register_bounds() {
        assert_eq!(reg(31, 31), Ok(31));
        assert_eq!(
            reg(32, 31),
            Err(EncodeError::RegisterOutOfRange { index: 32, max: 31 })
        );
        assert_eq!(reg(127, 127), Ok(127));
    }
}
