//! Extended mnemonics. Each is a single base instruction with some
//! operands fixed.

use super::PpcAssembler;
use crate::error::{EncodeError, Result};
use crate::forms::uimm;
use crate::table::Target;

/// `BO` value: branch if the CR bit is set.
const BO_TRUE: u32 = 12;
/// `BO` value: branch if the CR bit is clear.
const BO_FALSE: u32 = 4;
/// `BO` value: branch always.
const BO_ALWAYS: u32 = 20;

const SPR_XER: u32 = 1;
const SPR_LR: u32 = 8;
const SPR_CTR: u32 = 9;

/// CR bit index of `bit` in field `cr`.
fn cr_bit(cr: u32, bit: u32) -> Result<u32> {
    Ok(uimm(i64::from(cr), 3)? * 4 + bit)
}

/// Conditional branch family: plain, `a`, `l`, `la`.
macro_rules! cond_branch {
    ($($name:ident, $a:ident, $l:ident, $la:ident = $bo:expr, $bit:expr;)*) => {$(
        pub fn $name(&mut self, cr: u32, target: impl Into<Target>) -> Result<()> {
            self.bc($bo, cr_bit(cr, $bit)?, target)
        }
        pub fn $a(&mut self, cr: u32, target: impl Into<Target>) -> Result<()> {
            self.bca($bo, cr_bit(cr, $bit)?, target)
        }
        pub fn $l(&mut self, cr: u32, target: impl Into<Target>) -> Result<()> {
            self.bcl($bo, cr_bit(cr, $bit)?, target)
        }
        pub fn $la(&mut self, cr: u32, target: impl Into<Target>) -> Result<()> {
            self.bcla($bo, cr_bit(cr, $bit)?, target)
        }
    )*};
}

impl PpcAssembler<'_> {
    // ===== Loads and moves =====

    /// `li rD, imm` is `addi rD, 0, imm`.
    pub fn li(&mut self, rd: u32, imm: i64) -> Result<()> {
        self.addi(rd, 0, imm)
    }

    /// `lis rD, imm` is `addis rD, 0, imm`.
    pub fn lis(&mut self, rd: u32, imm: i64) -> Result<()> {
        self.addis(rd, 0, imm)
    }

    /// `mr rA, rS` is `or rA, rS, rS`.
    pub fn mr(&mut self, ra: u32, rs: u32) -> Result<()> {
        self.or(ra, rs, rs)
    }

    pub fn mr_rc(&mut self, ra: u32, rs: u32) -> Result<()> {
        self.or_rc(ra, rs, rs)
    }

    /// `nop` is `ori 0, 0, 0`.
    pub fn nop(&mut self) -> Result<()> {
        self.ori(0, 0, 0)
    }

    /// `not rA, rS` is `nor rA, rS, rS`.
    pub fn not(&mut self, ra: u32, rs: u32) -> Result<()> {
        self.nor(ra, rs, rs)
    }

    /// `subi rD, rA, imm` is `addi rD, rA, -imm`.
    pub fn subi(&mut self, rd: u32, ra: u32, imm: i64) -> Result<()> {
        let negated = imm
            .checked_neg()
            .ok_or(EncodeError::ImmediateOutOfRange {
                value: imm,
                bits: 16,
            })?;
        self.addi(rd, ra, negated)
    }

    /// `sub rD, rA, rB` is `subf rD, rB, rA`.
    pub fn sub(&mut self, rd: u32, ra: u32, rb: u32) -> Result<()> {
        self.subf(rd, rb, ra)
    }

    pub fn sub_rc(&mut self, rd: u32, ra: u32, rb: u32) -> Result<()> {
        self.subf_rc(rd, rb, ra)
    }

    // ===== Special registers =====

    pub fn mflr(&mut self, rd: u32) -> Result<()> {
        self.mfspr(rd, SPR_LR)
    }

    pub fn mtlr(&mut self, rs: u32) -> Result<()> {
        self.mtspr(SPR_LR, rs)
    }

    pub fn mfctr(&mut self, rd: u32) -> Result<()> {
        self.mfspr(rd, SPR_CTR)
    }

    pub fn mtctr(&mut self, rs: u32) -> Result<()> {
        self.mtspr(SPR_CTR, rs)
    }

    pub fn mfxer(&mut self, rd: u32) -> Result<()> {
        self.mfspr(rd, SPR_XER)
    }

    pub fn mtxer(&mut self, rs: u32) -> Result<()> {
        self.mtspr(SPR_XER, rs)
    }

    /// Move to all eight CR fields.
    pub fn mtcr(&mut self, rs: u32) -> Result<()> {
        self.mtcrf(0xFF, rs)
    }

    /// `sync 1`.
    pub fn lwsync(&mut self) -> Result<()> {
        self.e.put(super::opcodes::SYNC | 1 << 21)
    }

    // ===== Rotates =====

    pub fn slwi(&mut self, ra: u32, rs: u32, n: u32) -> Result<()> {
        let n = uimm(i64::from(n), 5)?;
        self.rlwinm(ra, rs, n, 0, 31 - n)
    }

    pub fn srwi(&mut self, ra: u32, rs: u32, n: u32) -> Result<()> {
        let n = uimm(i64::from(n), 5)?;
        self.rlwinm(ra, rs, (32 - n) % 32, n, 31)
    }

    pub fn clrlwi(&mut self, ra: u32, rs: u32, n: u32) -> Result<()> {
        self.rlwinm(ra, rs, 0, n, 31)
    }

    pub fn rotlwi(&mut self, ra: u32, rs: u32, n: u32) -> Result<()> {
        self.rlwinm(ra, rs, n, 0, 31)
    }

    /// Extract `n` bits starting at bit `b`, left justified.
    pub fn extlwi(&mut self, ra: u32, rs: u32, n: u32, b: u32) -> Result<()> {
        let n = uimm(i64::from(n) - 1, 5)?;
        self.rlwinm(ra, rs, b, 0, n)
    }

    pub fn sldi(&mut self, ra: u32, rs: u32, n: u32) -> Result<()> {
        let n = uimm(i64::from(n), 6)?;
        self.rldicr(ra, rs, n, 63 - n)
    }

    pub fn srdi(&mut self, ra: u32, rs: u32, n: u32) -> Result<()> {
        let n = uimm(i64::from(n), 6)?;
        self.rldicl(ra, rs, (64 - n) % 64, n)
    }

    pub fn clrldi(&mut self, ra: u32, rs: u32, n: u32) -> Result<()> {
        self.rldicl(ra, rs, 0, n)
    }

    // ===== Compares =====

    pub fn cmpw(&mut self, crfd: u32, ra: u32, rb: u32) -> Result<()> {
        self.cmp(crfd, 0, ra, rb)
    }

    pub fn cmpwi(&mut self, crfd: u32, ra: u32, imm: i64) -> Result<()> {
        self.cmpi(crfd, 0, ra, imm)
    }

    pub fn cmplw(&mut self, crfd: u32, ra: u32, rb: u32) -> Result<()> {
        self.cmpl(crfd, 0, ra, rb)
    }

    pub fn cmplwi(&mut self, crfd: u32, ra: u32, imm: i64) -> Result<()> {
        self.cmpli(crfd, 0, ra, imm)
    }

    pub fn cmpd(&mut self, crfd: u32, ra: u32, rb: u32) -> Result<()> {
        self.cmp(crfd, 1, ra, rb)
    }

    pub fn cmpdi(&mut self, crfd: u32, ra: u32, imm: i64) -> Result<()> {
        self.cmpi(crfd, 1, ra, imm)
    }

    pub fn cmpld(&mut self, crfd: u32, ra: u32, rb: u32) -> Result<()> {
        self.cmpl(crfd, 1, ra, rb)
    }

    pub fn cmpldi(&mut self, crfd: u32, ra: u32, imm: i64) -> Result<()> {
        self.cmpli(crfd, 1, ra, imm)
    }

    // ===== Branches =====

    pub fn blr(&mut self) -> Result<()> {
        self.bclr(BO_ALWAYS, 0, 0)
    }

    pub fn blrl(&mut self) -> Result<()> {
        self.bclrl(BO_ALWAYS, 0, 0)
    }

    pub fn bctr(&mut self) -> Result<()> {
        self.bcctr(BO_ALWAYS, 0, 0)
    }

    pub fn bctrl(&mut self) -> Result<()> {
        self.bcctrl(BO_ALWAYS, 0, 0)
    }

    cond_branch! {
        blt, blta, bltl, bltla = BO_TRUE, 0;
        ble, blea, blel, blela = BO_FALSE, 1;
        beq, beqa, beql, beqla = BO_TRUE, 2;
        bge, bgea, bgel, bgela = BO_FALSE, 0;
        bgt, bgta, bgtl, bgtla = BO_TRUE, 1;
        bne, bnea, bnel, bnela = BO_FALSE, 2;
        bso, bsoa, bsol, bsola = BO_TRUE, 3;
    }
}
