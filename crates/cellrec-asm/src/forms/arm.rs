//! AArch64 form emitters.
//!
//! Opcodes passed in already carry the width bits (`sf`, and `N` for
//! bitfield moves). Register fields are 5 bits; index 31 is `sp` or the
//! zero register depending on the instruction.

use super::{reg, simm, uimm};
use crate::error::{EncodeError, Result};

const MAX_REG: u32 = 31;
const SF: u32 = 1 << 31;

#[inline]
const fn r(index: u32) -> Result<u32> {
    reg(index, MAX_REG)
}

#[inline]
const fn is_64(op: u32) -> bool {
    op & SF != 0
}

/// Word offset of a branch, `bits` wide. `bytes` must be word aligned.
pub const fn branch_offset(bytes: i64, bits: u32) -> Result<u32> {
    if bytes & 3 != 0 {
        return Err(EncodeError::MisalignedDisplacement(bytes));
    }
    simm(bytes >> 2, bits)
}

/// `op rn` into bits 5..10 and `rd` into 0..5.
pub fn rr(op: u32, rd: u32, rn: u32) -> Result<u32> {
    Ok(op | r(rn)? << 5 | r(rd)?)
}

pub fn rrr(op: u32, rd: u32, rn: u32, rm: u32) -> Result<u32> {
    Ok(op | r(rm)? << 16 | r(rn)? << 5 | r(rd)?)
}

/// Three sources: `ra` is the addend of `madd`/`fmadd`.
pub fn rrrr(op: u32, rd: u32, rn: u32, rm: u32, ra: u32) -> Result<u32> {
    Ok(op | r(rm)? << 16 | r(ra)? << 10 | r(rn)? << 5 | r(rd)?)
}

/// Add/sub with a 12-bit unsigned immediate, optionally shifted left by 12.
pub fn add_sub_imm(op: u32, rd: u32, rn: u32, imm: i64) -> Result<u32> {
    let (field, shift) = if imm & 0xFFF == 0 && imm > 0xFFF {
        (uimm(imm >> 12, 12).map_err(|_| out_of_range(imm, 24))?, 1)
    } else {
        (uimm(imm, 12)?, 0)
    };
    Ok(op | shift << 22 | field << 10 | r(rn)? << 5 | r(rd)?)
}

const fn out_of_range(value: i64, bits: u32) -> EncodeError {
    EncodeError::ImmediateOutOfRange { value, bits }
}

/// Logical operation with a bitmask immediate.
pub fn logic_imm(op: u32, rd: u32, rn: u32, value: u64) -> Result<u32> {
    Ok(op | bitmask(value, is_64(op))? | r(rn)? << 5 | r(rd)?)
}

/// Encode `value` as the `N:immr:imms` fields of a logical immediate.
///
/// The value must be a rotated run of ones replicated across 2, 4, 8, 16,
/// 32 or 64 bit elements. Zero and all-ones are not encodable.
pub fn bitmask(value: u64, wide: bool) -> Result<u32> {
    let invalid = EncodeError::InvalidBitmask { value };
    let value = if wide {
        value
    } else if value >> 32 == 0 {
        value | value << 32
    } else {
        return Err(invalid);
    };
    if value == 0 || value == u64::MAX {
        return Err(invalid);
    }

    let mut size = 64u32;
    while size > 2 {
        let half = size / 2;
        let mask = (1u64 << half) - 1;
        if value & mask != (value >> half) & mask {
            break;
        }
        size = half;
    }
    let mask = if size == 64 { u64::MAX } else { (1u64 << size) - 1 };
    let element = value & mask;
    let ones = element.count_ones();
    let run = if ones == 64 { u64::MAX } else { (1u64 << ones) - 1 };

    let rotate_left = |x: u64, n: u32| {
        if n == 0 {
            x
        } else {
            (x << n | x >> (size - n)) & mask
        }
    };
    let immr = (0..size)
        .find(|&n| rotate_left(element, n) == run)
        .ok_or(invalid)?;
    let n = u32::from(size == 64);
    let imms = (!(size * 2 - 1) & 0x3F) | (ones - 1);
    Ok(n << 22 | immr << 16 | imms << 10)
}

/// `movz`/`movn`/`movk` with a 16-bit chunk at `shift` (0, 16, 32 or 48).
pub fn move_wide(op: u32, rd: u32, imm: i64, shift: u32) -> Result<u32> {
    let max_shift = if is_64(op) { 48 } else { 16 };
    if shift & 15 != 0 || shift > max_shift {
        return Err(out_of_range(i64::from(shift), 6));
    }
    Ok(op | (shift / 16) << 21 | uimm(imm, 16)? << 5 | r(rd)?)
}

pub fn bitfield(op: u32, rd: u32, rn: u32, immr: u32, imms: u32) -> Result<u32> {
    let bits = if is_64(op) { 6 } else { 5 };
    let immr = uimm(i64::from(immr), bits)?;
    let imms = uimm(i64::from(imms), bits)?;
    Ok(op | immr << 16 | imms << 10 | r(rn)? << 5 | r(rd)?)
}

pub fn cond_select(op: u32, rd: u32, rn: u32, rm: u32, cond: u32) -> Result<u32> {
    Ok(op | r(rm)? << 16 | uimm(i64::from(cond), 4)? << 12 | r(rn)? << 5 | r(rd)?)
}

/// Unsigned scaled offset; the access size comes from bits 30..32.
pub fn load_store(op: u32, rt: u32, rn: u32, offset: i64) -> Result<u32> {
    let scale = op >> 30;
    if offset & ((1 << scale) - 1) != 0 {
        return Err(EncodeError::MisalignedDisplacement(offset));
    }
    Ok(op | uimm(offset >> scale, 12)? << 10 | r(rn)? << 5 | r(rt)?)
}

/// Signed scaled 7-bit pair offset.
pub fn load_store_pair(op: u32, rt: u32, rt2: u32, rn: u32, offset: i64) -> Result<u32> {
    let scale = 2 + (op >> 31);
    if offset & ((1 << scale) - 1) != 0 {
        return Err(EncodeError::MisalignedDisplacement(offset));
    }
    Ok(op | simm(offset >> scale, 7)? << 15 | r(rt2)? << 10 | r(rn)? << 5 | r(rt)?)
}

pub fn branch_imm(op: u32, bytes: i64) -> Result<u32> {
    match branch_offset(bytes, 26) {
        Ok(field) => Ok(op | field),
        Err(err) => Err(err),
    }
}

/// `b.cond`; the condition is already in `op`.
pub fn cond_branch(op: u32, bytes: i64) -> Result<u32> {
    match branch_offset(bytes, 19) {
        Ok(field) => Ok(op | field << 5),
        Err(err) => Err(err),
    }
}

pub fn compare_branch(op: u32, rt: u32, bytes: i64) -> Result<u32> {
    Ok(op | branch_offset(bytes, 19)? << 5 | r(rt)?)
}

pub fn branch_reg(op: u32, rn: u32) -> Result<u32> {
    Ok(op | r(rn)? << 5)
}

/// `brk`/`svc` with a 16-bit comment.
pub fn exception(op: u32, imm: i64) -> Result<u32> {
    Ok(op | uimm(imm, 16)? << 5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_sub_immediate_shift() {
        // add x0, x1, #1
        assert_eq!(add_sub_imm(0x9100_0000, 0, 1, 1), Ok(0x9100_0420));
        // sub sp, sp, #16
        assert_eq!(add_sub_imm(0xD100_0000, 31, 31, 16), Ok(0xD100_43FF));
        // add x0, x1, #1, lsl #12
        assert_eq!(add_sub_imm(0x9100_0000, 0, 1, 0x1000), Ok(0x9140_0420));
        assert!(add_sub_imm(0x9100_0000, 0, 1, 0x1001).is_err());
        assert!(add_sub_imm(0x9100_0000, 0, 1, -1).is_err());
    }

    #[test]
    fn test_bitmask_patterns() {
        assert_eq!(bitmask(0xFF, true), Ok(1 << 22 | 7 << 10));
        assert_eq!(bitmask(1, false), Ok(0));
        assert_eq!(bitmask(0xFFFF_FFFF_0000_0000, true), Ok(1 << 22 | 32 << 16 | 31 << 10));
        assert_eq!(bitmask(0x5555_5555_5555_5555, true), Ok(0x3C << 10));
        assert_eq!(bitmask(0, true), Err(EncodeError::InvalidBitmask { value: 0 }));
        assert_eq!(
            bitmask(u64::MAX, true),
            Err(EncodeError::InvalidBitmask { value: u64::MAX })
        );
        assert!(bitmask(0b101, true).is_err());
        assert!(bitmask(1 << 32, false).is_err());
    }

    #[test]
    fn test_scaled_offsets() {
        // ldr x0, [x1, #8]
        assert_eq!(load_store(0xF940_0000, 0, 1, 8), Ok(0xF940_0420));
        assert_eq!(
            load_store(0xF940_0000, 0, 1, 4),
            Err(EncodeError::MisalignedDisplacement(4))
        );
        assert!(load_store(0xF940_0000, 0, 1, 8 * 4096).is_err());
        // ldrb has no scaling
        assert_eq!(load_store(0x3940_0000, 0, 1, 3), Ok(0x3940_0C20));
    }

    #[test]
    fn test_move_wide_shift() {
        assert_eq!(move_wide(0xD280_0000, 0, 1, 0), Ok(0xD280_0020));
        assert_eq!(move_wide(0xF280_0000, 0, 0x1234, 32), Ok(0xF2C2_4680));
        assert!(move_wide(0x5280_0000, 0, 1, 32).is_err());
        assert!(move_wide(0xD280_0000, 0, 1, 8).is_err());
    }

    #[test]
    fn test_branch_ranges() {
        assert_eq!(branch_imm(0x1400_0000, -4), Ok(0x17FF_FFFF));
        assert_eq!(cond_branch(0x5400_0001, 8), Ok(0x5400_0041));
        assert!(compare_branch(0xB400_0000, 0, 1 << 20).is_err());
        assert_eq!(
            branch_imm(0x1400_0000, 2),
            Err(EncodeError::MisalignedDisplacement(2))
        );
    }
}
