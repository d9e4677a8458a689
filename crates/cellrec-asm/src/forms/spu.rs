//! SPU form emitters. Registers are 0..=127.

use super::{reg, simm, uimm};
use crate::error::{EncodeError, Result};

const MAX_REG: u32 = 127;

#[inline]
const fn r(index: u32) -> Result<u32> {
    reg(index, MAX_REG)
}

pub fn rr(op: u32, rt: u32, ra: u32, rb: u32) -> Result<u32> {
    Ok(op | r(rb)? << 14 | r(ra)? << 7 | r(rt)?)
}

/// RRR-form: the destination sits in the top field.
pub fn rrr(op: u32, rt: u32, ra: u32, rb: u32, rc: u32) -> Result<u32> {
    Ok(op | r(rt)? << 21 | r(rb)? << 14 | r(ra)? << 7 | r(rc)?)
}

/// RI7-form with a signed 7-bit immediate (shift and rotate counts).
pub fn ri7(op: u32, rt: u32, ra: u32, i7: i64) -> Result<u32> {
    Ok(op | simm(i7, 7)? << 14 | r(ra)? << 7 | r(rt)?)
}

/// RI8-form with an unsigned 8-bit scale.
pub fn ri8(op: u32, rt: u32, ra: u32, i8: i64) -> Result<u32> {
    Ok(op | uimm(i8, 8)? << 14 | r(ra)? << 7 | r(rt)?)
}

/// RI10-form with a signed 10-bit immediate.
pub fn ri10(op: u32, rt: u32, ra: u32, i10: i64) -> Result<u32> {
    Ok(op | simm(i10, 10)? << 14 | r(ra)? << 7 | r(rt)?)
}

/// RI16-form with a signed 16-bit immediate (branch word offsets, `il`).
pub fn ri16(op: u32, rt: u32, i16: i64) -> Result<u32> {
    Ok(op | simm(i16, 16)? << 7 | r(rt)?)
}

/// RI16-form branch. `bytes` is a word-aligned byte offset (or address);
/// the field holds it in words.
pub fn ri16_branch(op: u32, rt: u32, bytes: i64) -> Result<u32> {
    if bytes & 3 != 0 {
        return Err(EncodeError::MisalignedDisplacement(bytes));
    }
    Ok(op | simm(bytes >> 2, 16)? << 7 | r(rt)?)
}

/// RI16-form with an unsigned 16-bit immediate (`ilhu`, `iohl`, `fsmbi`).
pub fn ri16_unsigned(op: u32, rt: u32, u16: i64) -> Result<u32> {
    Ok(op | uimm(u16, 16)? << 7 | r(rt)?)
}

/// RI18-form with an unsigned 18-bit immediate.
pub fn ri18(op: u32, rt: u32, i18: i64) -> Result<u32> {
    Ok(op | uimm(i18, 18)? << 7 | r(rt)?)
}

/// `stop` with its 14-bit signal type.
pub fn stop(op: u32, signal: i64) -> Result<u32> {
    Ok(op | uimm(signal, 14)?)
}
