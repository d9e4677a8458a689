//! PPC form emitters.
//!
//! Each function takes a base opcode (primary opcode plus extended opcode,
//! `Rc`/`OE`/`AA`/`LK` already folded in) and ORs the checked fields into
//! it. Registers are 0..=31.

use super::{disp, reg, simm, uimm};
use crate::error::Result;

const MAX_REG: u32 = 31;

#[inline]
const fn r(index: u32) -> Result<u32> {
    reg(index, MAX_REG)
}

/// I-form: `li` is a byte displacement (or absolute address), word aligned,
/// within ±32 MiB.
pub fn i(op: u32, li: i64) -> Result<u32> {
    match disp(li, 26) {
        Ok(li) => Ok(op | li),
        Err(e) => Err(e),
    }
}

/// B-form conditional branch with a 16-bit word-aligned displacement.
pub fn b(op: u32, bo: u32, bi: u32, bd: i64) -> Result<u32> {
    let bo = uimm(i64::from(bo), 5)?;
    let bi = uimm(i64::from(bi), 5)?;
    Ok(op | bo << 21 | bi << 16 | disp(bd, 16)?)
}

pub const fn sc(op: u32) -> u32 {
    op
}

/// D-form with a signed 16-bit immediate (arithmetic, loads, stores).
pub fn d_signed(op: u32, d: u32, a: u32, imm: i64) -> Result<u32> {
    Ok(op | r(d)? << 21 | r(a)? << 16 | simm(imm, 16)?)
}

/// D-form with an unsigned 16-bit immediate (logical immediates).
pub fn d_unsigned(op: u32, d: u32, a: u32, imm: i64) -> Result<u32> {
    Ok(op | r(d)? << 21 | r(a)? << 16 | uimm(imm, 16)?)
}

/// D-form whose first field is not a register (`twi`, `tdi`, compares).
pub fn d_field(op: u32, field: u32, a: u32, imm: u32) -> Result<u32> {
    Ok(op | uimm(i64::from(field), 5)? << 21 | r(a)? << 16 | imm)
}

/// DS-form: 16-bit signed byte displacement with the low two bits zero.
pub fn ds(op: u32, d: u32, a: u32, offset: i64) -> Result<u32> {
    Ok(op | r(d)? << 21 | r(a)? << 16 | disp(offset, 16)?)
}

/// X-form over three register fields.
pub fn x(op: u32, d: u32, a: u32, b: u32) -> Result<u32> {
    Ok(op | r(d)? << 21 | r(a)? << 16 | r(b)? << 11)
}

/// X-form over raw 5-bit fields that are not registers (shift amounts,
/// sync level, trap conditions, CR field pairs).
pub fn x_fields(op: u32, d: u32, a: u32, b: u32) -> Result<u32> {
    let d = uimm(i64::from(d), 5)?;
    let a = uimm(i64::from(a), 5)?;
    let b = uimm(i64::from(b), 5)?;
    Ok(op | d << 21 | a << 16 | b << 11)
}

/// Compare in X or D layout: `crfD` in bits 6..8, `L` in bit 10.
pub fn cmp_field(crfd: u32, l: u32) -> Result<u32> {
    let crfd = uimm(i64::from(crfd), 3)?;
    let l = uimm(i64::from(l), 1)?;
    Ok(crfd << 2 | l)
}

/// XL-form: branch-to-register and CR logical operations.
pub fn xl(op: u32, d: u32, a: u32, b: u32) -> Result<u32> {
    x_fields(op, d, a, b)
}

/// XFX-form: `spr` is stored with its two 5-bit halves swapped.
pub fn xfx(op: u32, d: u32, spr: u32) -> Result<u32> {
    let spr = uimm(i64::from(spr), 10)?;
    let swapped = ((spr & 0x1F) << 5) | ((spr >> 5) & 0x1F);
    Ok(op | r(d)? << 21 | swapped << 11)
}

/// XFX-form `mtcrf`: 8-bit field mask in bits 12..19.
pub fn xfx_crm(op: u32, crm: u32, s: u32) -> Result<u32> {
    let crm = uimm(i64::from(crm), 8)?;
    Ok(op | r(s)? << 21 | crm << 12)
}

/// XO-form: the `OE` and `Rc` bits are part of `op`.
pub fn xo(op: u32, d: u32, a: u32, b: u32) -> Result<u32> {
    x(op, d, a, b)
}

/// A-form floating-point: `frC` in bits 21..25.
pub fn a(op: u32, d: u32, a: u32, b: u32, c: u32) -> Result<u32> {
    Ok(op | r(d)? << 21 | r(a)? << 16 | r(b)? << 11 | r(c)? << 6)
}

/// M-form rotate word: `b` is a register (`rlwnm`) or a shift amount.
pub fn m(op: u32, s: u32, a: u32, b: u32, mb: u32, me: u32) -> Result<u32> {
    let b = uimm(i64::from(b), 5)?;
    let mb = uimm(i64::from(mb), 5)?;
    let me = uimm(i64::from(me), 5)?;
    Ok(op | r(s)? << 21 | r(a)? << 16 | b << 11 | mb << 6 | me << 1)
}

/// M-form with a register shift amount (`rlwnm`).
pub fn m_reg(op: u32, s: u32, a: u32, b: u32, mb: u32, me: u32) -> Result<u32> {
    m(op, s, a, r(b)?, mb, me)
}

/// MD-form rotate doubleword: 6-bit `sh` and `mb`/`me` split across the
/// word.
pub fn md(op: u32, s: u32, a: u32, sh: u32, mb: u32) -> Result<u32> {
    let sh = uimm(i64::from(sh), 6)?;
    let mb = uimm(i64::from(mb), 6)?;
    Ok(op
        | r(s)? << 21
        | r(a)? << 16
        | (sh & 0x1F) << 11
        | (mb & 0x1F) << 6
        | (mb >> 5) << 5
        | (sh >> 5) << 1)
}

/// XS-form `sradi`: 6-bit shift with its high bit at bit 30.
pub fn xs(op: u32, s: u32, a: u32, sh: u32) -> Result<u32> {
    let sh = uimm(i64::from(sh), 6)?;
    Ok(op | r(s)? << 21 | r(a)? << 16 | (sh & 0x1F) << 11 | (sh >> 5) << 1)
}

/// VA-form: three sources and a destination, `vC` in bits 21..25.
pub fn va(op: u32, d: u32, a: u32, b: u32, c: u32) -> Result<u32> {
    self::a(op, d, a, b, c)
}

/// VX-form.
pub fn vx(op: u32, d: u32, a: u32, b: u32) -> Result<u32> {
    x(op, d, a, b)
}

/// VX-form with a signed 5-bit immediate in the `vA` slot (`vspltis*`).
pub fn vx_simm(op: u32, d: u32, imm: i64) -> Result<u32> {
    Ok(op | r(d)? << 21 | simm(imm, 5)? << 16)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EncodeError;

    #[test]
    fn test_d_form() {
        // addi r3, r1, -16
        assert_eq!(d_signed(0x3800_0000, 3, 1, -16), Ok(0x3861_FFF0));
        // ori r0, r0, 0xFFFF
        assert_eq!(d_unsigned(0x6000_0000, 0, 0, 0xFFFF), Ok(0x6000_FFFF));
        assert!(d_signed(0x3800_0000, 3, 1, 0x8000).is_err());
    }

    #[test]
    fn test_xfx_swaps_spr_halves() {
        // mflr r0
        assert_eq!(xfx(0x7C00_02A6, 0, 8), Ok(0x7C08_02A6));
        // mfctr r12
        assert_eq!(xfx(0x7C00_02A6, 12, 9), Ok(0x7D89_02A6));
    }

    #[test]
    fn test_branch_forms() {
        // b +8
        assert_eq!(i(0x4800_0000, 8), Ok(0x4800_0008));
        // b -4
        assert_eq!(i(0x4800_0000, -4), Ok(0x4BFF_FFFC));
        assert_eq!(i(0x4800_0000, 2), Err(EncodeError::MisalignedDisplacement(2)));
        // beq cr0, +16
        assert_eq!(b(0x4000_0000, 12, 2, 16), Ok(0x4182_0010));
        assert!(b(0x4000_0000, 32, 0, 0).is_err());
    }

    #[test]
    fn test_md_splits_fields() {
        // rldicl r3, r4, 32, 32
        assert_eq!(md(0x7800_0000, 4, 3, 32, 32), Ok(0x7883_0022));
    }

    #[test]
    fn test_rejects_register_32() {
        assert_eq!(
            x(0x7C00_0214, 32, 0, 0),
            Err(EncodeError::RegisterOutOfRange { index: 32, max: 31 })
        );
    }
}
