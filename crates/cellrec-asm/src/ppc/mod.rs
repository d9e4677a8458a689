//! PowerPC (PPU) assembler.
//!
//! Typed methods are named after their mnemonics. Record forms take an
//! `_rc` suffix (`add_rc` is `add.`), overflow-enable forms an `o`
//! (`addo`, `addo_rc`). Operands follow assembly order: for logical
//! operations that is `rA, rS, rB`, for D-form memory access
//! `rD, d, rA`.

pub mod opcodes;
mod pseudo;
mod table;

use tracing::trace;

use self::opcodes::*;
use crate::buffer::CodeBuffer;
use crate::emitter::Emitter;
use crate::error::Result;
use crate::forms::{ppc, simm, uimm};
use crate::label::{FixupKind, Label};
use crate::table::{Operand, Target, assign, lookup};

pub use self::table::PPC_OPS;

pub struct PpcAssembler<'a> {
    e: Emitter<'a>,
}

// ===== Instruction families =====

/// XO-form `rD, rA, rB` with `.`, `o`, `o.` variants.
macro_rules! xo3 {
    ($($name:ident, $rc:ident, $o:ident, $o_rc:ident = $op:expr;)*) => {$(
        pub fn $name(&mut self, rd: u32, ra: u32, rb: u32) -> Result<()> {
            self.e.put(ppc::xo($op, rd, ra, rb)?)
        }
        pub fn $rc(&mut self, rd: u32, ra: u32, rb: u32) -> Result<()> {
            self.e.put(ppc::xo($op | RC, rd, ra, rb)?)
        }
        pub fn $o(&mut self, rd: u32, ra: u32, rb: u32) -> Result<()> {
            self.e.put(ppc::xo($op | OE, rd, ra, rb)?)
        }
        pub fn $o_rc(&mut self, rd: u32, ra: u32, rb: u32) -> Result<()> {
            self.e.put(ppc::xo($op | OE | RC, rd, ra, rb)?)
        }
    )*};
}

/// XO-form `rD, rA` with `.`, `o`, `o.` variants.
macro_rules! xo2 {
    ($($name:ident, $rc:ident, $o:ident, $o_rc:ident = $op:expr;)*) => {$(
        pub fn $name(&mut self, rd: u32, ra: u32) -> Result<()> {
            self.e.put(ppc::xo($op, rd, ra, 0)?)
        }
        pub fn $rc(&mut self, rd: u32, ra: u32) -> Result<()> {
            self.e.put(ppc::xo($op | RC, rd, ra, 0)?)
        }
        pub fn $o(&mut self, rd: u32, ra: u32) -> Result<()> {
            self.e.put(ppc::xo($op | OE, rd, ra, 0)?)
        }
        pub fn $o_rc(&mut self, rd: u32, ra: u32) -> Result<()> {
            self.e.put(ppc::xo($op | OE | RC, rd, ra, 0)?)
        }
    )*};
}

/// Three-register form with a `.` variant. `$d, $a, $b` name the
/// operands in assembly order; they are packed into the D, A, B slots in
/// the order given by `=> ($x, $y, $z)`.
macro_rules! rrr_rc {
    ($($name:ident, $rc:ident = $op:expr, $pack:ident ($d:ident, $a:ident, $b:ident) => ($x:ident, $y:ident, $z:ident);)*) => {$(
        pub fn $name(&mut self, $d: u32, $a: u32, $b: u32) -> Result<()> {
            self.e.put(ppc::$pack($op, $x, $y, $z)?)
        }
        pub fn $rc(&mut self, $d: u32, $a: u32, $b: u32) -> Result<()> {
            self.e.put(ppc::$pack($op | RC, $x, $y, $z)?)
        }
    )*};
}

/// Two-register form with a `.` variant.
macro_rules! rr_rc {
    ($($name:ident, $rc:ident = $op:expr, ($d:ident, $s:ident) => ($x:ident, $z:ident);)*) => {$(
        pub fn $name(&mut self, $d: u32, $s: u32) -> Result<()> {
            self.e.put(ppc::x($op, $x, 0, $z)?)
        }
        pub fn $rc(&mut self, $d: u32, $s: u32) -> Result<()> {
            self.e.put(ppc::x($op | RC, $x, 0, $z)?)
        }
    )*};
}

/// Register-only form without variants.
macro_rules! rrr {
    ($($name:ident = $op:expr, $pack:ident;)*) => {$(
        pub fn $name(&mut self, d: u32, a: u32, b: u32) -> Result<()> {
            self.e.put(ppc::$pack($op, d, a, b)?)
        }
    )*};
}

/// D-form memory access `rD, d(rA)`.
macro_rules! mem_d {
    ($($name:ident = $op:expr;)*) => {$(
        pub fn $name(&mut self, rd: u32, offset: i64, ra: u32) -> Result<()> {
            self.e.put(ppc::d_signed($op, rd, ra, offset)?)
        }
    )*};
}

/// DS-form memory access `rD, ds(rA)`.
macro_rules! mem_ds {
    ($($name:ident = $op:expr;)*) => {$(
        pub fn $name(&mut self, rd: u32, offset: i64, ra: u32) -> Result<()> {
            self.e.put(ppc::ds($op, rd, ra, offset)?)
        }
    )*};
}

/// A-form float with a `.` variant; arguments in assembly order, packed
/// into `(frD, frA, frB, frC)`.
macro_rules! fp_a {
    ($($name:ident, $rc:ident = $op:expr, ($($arg:ident),*) => ($d:expr, $a:expr, $b:expr, $c:expr);)*) => {$(
        pub fn $name(&mut self, $($arg: u32),*) -> Result<()> {
            self.e.put(ppc::a($op, $d, $a, $b, $c)?)
        }
        pub fn $rc(&mut self, $($arg: u32),*) -> Result<()> {
            self.e.put(ppc::a($op | RC, $d, $a, $b, $c)?)
        }
    )*};
}

/// Branch with `l`, `a`, `la` variants. Conditional forms prepend `bo, bi`.
macro_rules! branch_i {
    ($($name:ident = $op:expr;)*) => {$(
        pub fn $name(&mut self, target: impl Into<Target>) -> Result<()> {
            self.branch_i($op, target.into())
        }
    )*};
}

macro_rules! branch_b {
    ($($name:ident = $op:expr;)*) => {$(
        pub fn $name(&mut self, bo: u32, bi: u32, target: impl Into<Target>) -> Result<()> {
            self.branch_b($op, bo, bi, target.into())
        }
    )*};
}

impl<'a> PpcAssembler<'a> {
    /// Assemble into `data`, addressing it from zero.
    pub const fn new(data: &'a mut [u8]) -> Self {
        Self::from_buffer(CodeBuffer::new(data))
    }

    pub const fn from_buffer(buf: CodeBuffer<'a>) -> Self {
        Self {
            e: Emitter::new(buf),
        }
    }

    pub const fn current_size(&self) -> usize {
        self.e.buf.current_size()
    }

    pub const fn current_address(&self) -> u64 {
        self.e.buf.current_address()
    }

    /// Bytes emitted so far.
    pub fn code(&self) -> &[u8] {
        self.e.buf.as_bytes()
    }

    pub fn new_label(&mut self) -> Label {
        self.e.new_label()
    }

    /// Bind `label` to the current position.
    pub fn bind(&mut self, label: Label) -> Result<()> {
        self.e.bind(label)
    }

    pub fn label_position(&self, label: Label) -> Option<usize> {
        self.e.label_position(label)
    }

    /// Patch all label references. Returns the final code size.
    pub fn finalize(&mut self) -> Result<usize> {
        self.e.finalize()
    }

    /// Encode and emit `mnemonic` from the instruction table.
    ///
    /// Pseudo-mnemonics (`li`, `mr`, `blr`, ...) are not in the table; use
    /// the typed wrappers for those.
    pub fn emit(&mut self, mnemonic: &str, operands: &[Operand]) -> Result<u32> {
        let def = lookup(PPC_OPS, mnemonic)?;
        let slots = assign(def, operands)?;
        let word = table::encode(def, &slots)?;
        match slots.label {
            Some((label, kind)) => self.e.put_with_fixup(word, label, kind)?,
            None => self.e.put(word)?,
        }
        trace!(mnemonic, word = format_args!("{word:#010x}"), "emit");
        Ok(word)
    }

    fn branch_i(&mut self, op: u32, target: Target) -> Result<()> {
        let kind = if op & AA == 0 {
            FixupKind::PpcRel24
        } else {
            FixupKind::PpcAbs24
        };
        self.e.put_target(target, kind, |li| ppc::i(op, li))?;
        Ok(())
    }

    fn branch_b(&mut self, op: u32, bo: u32, bi: u32, target: Target) -> Result<()> {
        let kind = if op & AA == 0 {
            FixupKind::PpcRel14
        } else {
            FixupKind::PpcAbs14
        };
        self.e.put_target(target, kind, |bd| ppc::b(op, bo, bi, bd))?;
        Ok(())
    }

    // ===== Integer arithmetic =====

    xo3! {
        add, add_rc, addo, addo_rc = ADD;
        addc, addc_rc, addco, addco_rc = ADDC;
        adde, adde_rc, addeo, addeo_rc = ADDE;
        divd, divd_rc, divdo, divdo_rc = DIVD;
        divdu, divdu_rc, divduo, divduo_rc = DIVDU;
        divw, divw_rc, divwo, divwo_rc = DIVW;
        divwu, divwu_rc, divwuo, divwuo_rc = DIVWU;
        mulld, mulld_rc, mulldo, mulldo_rc = MULLD;
        mullw, mullw_rc, mullwo, mullwo_rc = MULLW;
        subf, subf_rc, subfo, subfo_rc = SUBF;
        subfc, subfc_rc, subfco, subfco_rc = SUBFC;
        subfe, subfe_rc, subfeo, subfeo_rc = SUBFE;
    }

    xo2! {
        addme, addme_rc, addmeo, addmeo_rc = ADDME;
        addze, addze_rc, addzeo, addzeo_rc = ADDZE;
        neg, neg_rc, nego, nego_rc = NEG;
        subfme, subfme_rc, subfmeo, subfmeo_rc = SUBFME;
        subfze, subfze_rc, subfzeo, subfzeo_rc = SUBFZE;
    }

    rrr_rc! {
        mulhd, mulhd_rc = MULHD, xo(rd, ra, rb) => (rd, ra, rb);
        mulhdu, mulhdu_rc = MULHDU, xo(rd, ra, rb) => (rd, ra, rb);
        mulhw, mulhw_rc = MULHW, xo(rd, ra, rb) => (rd, ra, rb);
        mulhwu, mulhwu_rc = MULHWU, xo(rd, ra, rb) => (rd, ra, rb);
    }

    pub fn addi(&mut self, rd: u32, ra: u32, imm: i64) -> Result<()> {
        self.e.put(ppc::d_signed(ADDI, rd, ra, imm)?)
    }

    pub fn addic(&mut self, rd: u32, ra: u32, imm: i64) -> Result<()> {
        self.e.put(ppc::d_signed(ADDIC, rd, ra, imm)?)
    }

    pub fn addic_rc(&mut self, rd: u32, ra: u32, imm: i64) -> Result<()> {
        self.e.put(ppc::d_signed(ADDIC_RC, rd, ra, imm)?)
    }

    pub fn addis(&mut self, rd: u32, ra: u32, imm: i64) -> Result<()> {
        self.e.put(ppc::d_signed(ADDIS, rd, ra, imm)?)
    }

    pub fn mulli(&mut self, rd: u32, ra: u32, imm: i64) -> Result<()> {
        self.e.put(ppc::d_signed(MULLI, rd, ra, imm)?)
    }

    pub fn subfic(&mut self, rd: u32, ra: u32, imm: i64) -> Result<()> {
        self.e.put(ppc::d_signed(SUBFIC, rd, ra, imm)?)
    }

    // ===== Logical =====

    rrr_rc! {
        and, and_rc = AND, x(ra, rs, rb) => (rs, ra, rb);
        andc, andc_rc = ANDC, x(ra, rs, rb) => (rs, ra, rb);
        eqv, eqv_rc = EQV, x(ra, rs, rb) => (rs, ra, rb);
        nand, nand_rc = NAND, x(ra, rs, rb) => (rs, ra, rb);
        nor, nor_rc = NOR, x(ra, rs, rb) => (rs, ra, rb);
        or, or_rc = OR, x(ra, rs, rb) => (rs, ra, rb);
        orc, orc_rc = ORC, x(ra, rs, rb) => (rs, ra, rb);
        xor, xor_rc = XOR, x(ra, rs, rb) => (rs, ra, rb);
        sld, sld_rc = SLD, x(ra, rs, rb) => (rs, ra, rb);
        slw, slw_rc = SLW, x(ra, rs, rb) => (rs, ra, rb);
        srad, srad_rc = SRAD, x(ra, rs, rb) => (rs, ra, rb);
        sraw, sraw_rc = SRAW, x(ra, rs, rb) => (rs, ra, rb);
        srd, srd_rc = SRD, x(ra, rs, rb) => (rs, ra, rb);
        srw, srw_rc = SRW, x(ra, rs, rb) => (rs, ra, rb);
    }

    pub fn cntlzd(&mut self, ra: u32, rs: u32) -> Result<()> {
        self.e.put(ppc::x(CNTLZD, rs, ra, 0)?)
    }

    pub fn cntlzd_rc(&mut self, ra: u32, rs: u32) -> Result<()> {
        self.e.put(ppc::x(CNTLZD | RC, rs, ra, 0)?)
    }

    pub fn cntlzw(&mut self, ra: u32, rs: u32) -> Result<()> {
        self.e.put(ppc::x(CNTLZW, rs, ra, 0)?)
    }

    pub fn cntlzw_rc(&mut self, ra: u32, rs: u32) -> Result<()> {
        self.e.put(ppc::x(CNTLZW | RC, rs, ra, 0)?)
    }

    pub fn extsb(&mut self, ra: u32, rs: u32) -> Result<()> {
        self.e.put(ppc::x(EXTSB, rs, ra, 0)?)
    }

    pub fn extsb_rc(&mut self, ra: u32, rs: u32) -> Result<()> {
        self.e.put(ppc::x(EXTSB | RC, rs, ra, 0)?)
    }

    pub fn extsh(&mut self, ra: u32, rs: u32) -> Result<()> {
        self.e.put(ppc::x(EXTSH, rs, ra, 0)?)
    }

    pub fn extsh_rc(&mut self, ra: u32, rs: u32) -> Result<()> {
        self.e.put(ppc::x(EXTSH | RC, rs, ra, 0)?)
    }

    pub fn extsw(&mut self, ra: u32, rs: u32) -> Result<()> {
        self.e.put(ppc::x(EXTSW, rs, ra, 0)?)
    }

    pub fn extsw_rc(&mut self, ra: u32, rs: u32) -> Result<()> {
        self.e.put(ppc::x(EXTSW | RC, rs, ra, 0)?)
    }

    pub fn andi_rc(&mut self, ra: u32, rs: u32, imm: i64) -> Result<()> {
        self.e.put(ppc::d_unsigned(ANDI_RC, rs, ra, imm)?)
    }

    pub fn andis_rc(&mut self, ra: u32, rs: u32, imm: i64) -> Result<()> {
        self.e.put(ppc::d_unsigned(ANDIS_RC, rs, ra, imm)?)
    }

    pub fn ori(&mut self, ra: u32, rs: u32, imm: i64) -> Result<()> {
        self.e.put(ppc::d_unsigned(ORI, rs, ra, imm)?)
    }

    pub fn oris(&mut self, ra: u32, rs: u32, imm: i64) -> Result<()> {
        self.e.put(ppc::d_unsigned(ORIS, rs, ra, imm)?)
    }

    pub fn xori(&mut self, ra: u32, rs: u32, imm: i64) -> Result<()> {
        self.e.put(ppc::d_unsigned(XORI, rs, ra, imm)?)
    }

    pub fn xoris(&mut self, ra: u32, rs: u32, imm: i64) -> Result<()> {
        self.e.put(ppc::d_unsigned(XORIS, rs, ra, imm)?)
    }

    // ===== Rotate and shift =====

    pub fn rlwinm(&mut self, ra: u32, rs: u32, sh: u32, mb: u32, me: u32) -> Result<()> {
        self.e.put(ppc::m(RLWINM, rs, ra, sh, mb, me)?)
    }

    pub fn rlwinm_rc(&mut self, ra: u32, rs: u32, sh: u32, mb: u32, me: u32) -> Result<()> {
        self.e.put(ppc::m(RLWINM | RC, rs, ra, sh, mb, me)?)
    }

    pub fn rlwimi(&mut self, ra: u32, rs: u32, sh: u32, mb: u32, me: u32) -> Result<()> {
        self.e.put(ppc::m(RLWIMI, rs, ra, sh, mb, me)?)
    }

    pub fn rlwimi_rc(&mut self, ra: u32, rs: u32, sh: u32, mb: u32, me: u32) -> Result<()> {
        self.e.put(ppc::m(RLWIMI | RC, rs, ra, sh, mb, me)?)
    }

    pub fn rlwnm(&mut self, ra: u32, rs: u32, rb: u32, mb: u32, me: u32) -> Result<()> {
        self.e.put(ppc::m_reg(RLWNM, rs, ra, rb, mb, me)?)
    }

    pub fn rlwnm_rc(&mut self, ra: u32, rs: u32, rb: u32, mb: u32, me: u32) -> Result<()> {
        self.e.put(ppc::m_reg(RLWNM | RC, rs, ra, rb, mb, me)?)
    }

    pub fn rldicl(&mut self, ra: u32, rs: u32, sh: u32, mb: u32) -> Result<()> {
        self.e.put(ppc::md(RLDICL, rs, ra, sh, mb)?)
    }

    pub fn rldicl_rc(&mut self, ra: u32, rs: u32, sh: u32, mb: u32) -> Result<()> {
        self.e.put(ppc::md(RLDICL | RC, rs, ra, sh, mb)?)
    }

    pub fn rldicr(&mut self, ra: u32, rs: u32, sh: u32, me: u32) -> Result<()> {
        self.e.put(ppc::md(RLDICR, rs, ra, sh, me)?)
    }

    pub fn rldicr_rc(&mut self, ra: u32, rs: u32, sh: u32, me: u32) -> Result<()> {
        self.e.put(ppc::md(RLDICR | RC, rs, ra, sh, me)?)
    }

    pub fn rldic(&mut self, ra: u32, rs: u32, sh: u32, mb: u32) -> Result<()> {
        self.e.put(ppc::md(RLDIC, rs, ra, sh, mb)?)
    }

    pub fn rldimi(&mut self, ra: u32, rs: u32, sh: u32, mb: u32) -> Result<()> {
        self.e.put(ppc::md(RLDIMI, rs, ra, sh, mb)?)
    }

    pub fn sradi(&mut self, ra: u32, rs: u32, sh: u32) -> Result<()> {
        self.e.put(ppc::xs(SRADI, rs, ra, sh)?)
    }

    pub fn sradi_rc(&mut self, ra: u32, rs: u32, sh: u32) -> Result<()> {
        self.e.put(ppc::xs(SRADI | RC, rs, ra, sh)?)
    }

    pub fn srawi(&mut self, ra: u32, rs: u32, sh: u32) -> Result<()> {
        self.e.put(ppc::x(SRAWI, rs, ra, uimm(i64::from(sh), 5)?)?)
    }

    pub fn srawi_rc(&mut self, ra: u32, rs: u32, sh: u32) -> Result<()> {
        self.e.put(ppc::x(SRAWI | RC, rs, ra, uimm(i64::from(sh), 5)?)?)
    }

    // ===== Compare and trap =====

    pub fn cmp(&mut self, crfd: u32, l: u32, ra: u32, rb: u32) -> Result<()> {
        self.e.put(ppc::x(CMP, ppc::cmp_field(crfd, l)?, ra, rb)?)
    }

    pub fn cmpl(&mut self, crfd: u32, l: u32, ra: u32, rb: u32) -> Result<()> {
        self.e.put(ppc::x(CMPL, ppc::cmp_field(crfd, l)?, ra, rb)?)
    }

    pub fn cmpi(&mut self, crfd: u32, l: u32, ra: u32, imm: i64) -> Result<()> {
        let field = ppc::cmp_field(crfd, l)?;
        self.e.put(ppc::d_field(CMPI, field, ra, simm(imm, 16)?)?)
    }

    pub fn cmpli(&mut self, crfd: u32, l: u32, ra: u32, imm: i64) -> Result<()> {
        let field = ppc::cmp_field(crfd, l)?;
        self.e.put(ppc::d_field(CMPLI, field, ra, uimm(imm, 16)?)?)
    }

    pub fn td(&mut self, to: u32, ra: u32, rb: u32) -> Result<()> {
        self.e.put(ppc::x(TD, uimm(i64::from(to), 5)?, ra, rb)?)
    }

    pub fn tdi(&mut self, to: u32, ra: u32, imm: i64) -> Result<()> {
        self.e.put(ppc::d_field(TDI, to, ra, simm(imm, 16)?)?)
    }

    pub fn tw(&mut self, to: u32, ra: u32, rb: u32) -> Result<()> {
        self.e.put(ppc::x(TW, uimm(i64::from(to), 5)?, ra, rb)?)
    }

    pub fn twi(&mut self, to: u32, ra: u32, imm: i64) -> Result<()> {
        self.e.put(ppc::d_field(TWI, to, ra, simm(imm, 16)?)?)
    }

    // ===== Branch and condition register =====

    branch_i! {
        b = B;
        bl = B | LK;
        ba = B | AA;
        bla = B | AA | LK;
    }

    branch_b! {
        bc = BC;
        bcl = BC | LK;
        bca = BC | AA;
        bcla = BC | AA | LK;
    }

    pub fn bclr(&mut self, bo: u32, bi: u32, bh: u32) -> Result<()> {
        self.e.put(ppc::xl(BCLR, bo, bi, uimm(i64::from(bh), 2)?)?)
    }

    pub fn bclrl(&mut self, bo: u32, bi: u32, bh: u32) -> Result<()> {
        self.e.put(ppc::xl(BCLR | LK, bo, bi, uimm(i64::from(bh), 2)?)?)
    }

    pub fn bcctr(&mut self, bo: u32, bi: u32, bh: u32) -> Result<()> {
        self.e.put(ppc::xl(BCCTR, bo, bi, uimm(i64::from(bh), 2)?)?)
    }

    pub fn bcctrl(&mut self, bo: u32, bi: u32, bh: u32) -> Result<()> {
        self.e.put(ppc::xl(BCCTR | LK, bo, bi, uimm(i64::from(bh), 2)?)?)
    }

    rrr! {
        crand = CRAND, xl;
        crandc = CRANDC, xl;
        creqv = CREQV, xl;
        crnand = CRNAND, xl;
        crnor = CRNOR, xl;
        cror = CROR, xl;
        crorc = CRORC, xl;
        crxor = CRXOR, xl;
    }

    pub fn mcrf(&mut self, crfd: u32, crfs: u32) -> Result<()> {
        let d = uimm(i64::from(crfd), 3)? << 2;
        let s = uimm(i64::from(crfs), 3)? << 2;
        self.e.put(ppc::xl(MCRF, d, s, 0)?)
    }

    // ===== System =====

    pub fn sc(&mut self) -> Result<()> {
        self.e.put(ppc::sc(SC))
    }

    pub fn sync(&mut self) -> Result<()> {
        self.e.put(SYNC)
    }

    pub fn eieio(&mut self) -> Result<()> {
        self.e.put(EIEIO)
    }

    pub fn isync(&mut self) -> Result<()> {
        self.e.put(ISYNC)
    }

    pub fn mfspr(&mut self, rd: u32, spr: u32) -> Result<()> {
        self.e.put(ppc::xfx(MFSPR, rd, spr)?)
    }

    pub fn mtspr(&mut self, spr: u32, rs: u32) -> Result<()> {
        self.e.put(ppc::xfx(MTSPR, rs, spr)?)
    }

    pub fn mftb(&mut self, rd: u32, tbr: u32) -> Result<()> {
        self.e.put(ppc::xfx(MFTB, rd, tbr)?)
    }

    pub fn mfcr(&mut self, rd: u32) -> Result<()> {
        self.e.put(ppc::x(MFCR, rd, 0, 0)?)
    }

    pub fn mtcrf(&mut self, crm: u32, rs: u32) -> Result<()> {
        self.e.put(ppc::xfx_crm(MTCRF, crm, rs)?)
    }

    pub fn dcbf(&mut self, ra: u32, rb: u32) -> Result<()> {
        self.e.put(ppc::x(DCBF, 0, ra, rb)?)
    }

    pub fn dcbst(&mut self, ra: u32, rb: u32) -> Result<()> {
        self.e.put(ppc::x(DCBST, 0, ra, rb)?)
    }

    pub fn dcbt(&mut self, ra: u32, rb: u32) -> Result<()> {
        self.e.put(ppc::x(DCBT, 0, ra, rb)?)
    }

    pub fn dcbtst(&mut self, ra: u32, rb: u32) -> Result<()> {
        self.e.put(ppc::x(DCBTST, 0, ra, rb)?)
    }

    pub fn dcbz(&mut self, ra: u32, rb: u32) -> Result<()> {
        self.e.put(ppc::x(DCBZ, 0, ra, rb)?)
    }

    pub fn icbi(&mut self, ra: u32, rb: u32) -> Result<()> {
        self.e.put(ppc::x(ICBI, 0, ra, rb)?)
    }

    // ===== Load and store =====

    mem_d! {
        lbz = LBZ;
        lbzu = LBZU;
        lha = LHA;
        lhau = LHAU;
        lhz = LHZ;
        lhzu = LHZU;
        lmw = LMW;
        lwz = LWZ;
        lwzu = LWZU;
        stb = STB;
        stbu = STBU;
        sth = STH;
        sthu = STHU;
        stmw = STMW;
        stw = STW;
        stwu = STWU;
        lfd = LFD;
        lfdu = LFDU;
        lfs = LFS;
        lfsu = LFSU;
        stfd = STFD;
        stfdu = STFDU;
        stfs = STFS;
        stfsu = STFSU;
    }

    mem_ds! {
        ld = LD;
        ldu = LDU;
        lwa = LWA;
        std = STD;
        stdu = STDU;
    }

    rrr! {
        lbzx = LBZX, x;
        ldarx = LDARX, x;
        ldx = LDX, x;
        lhax = LHAX, x;
        lhzx = LHZX, x;
        lwarx = LWARX, x;
        lwax = LWAX, x;
        lwbrx = LWBRX, x;
        lwzx = LWZX, x;
        stbx = STBX, x;
        stdcx_rc = STDCX_RC, x;
        stdx = STDX, x;
        sthx = STHX, x;
        stwbrx = STWBRX, x;
        stwcx_rc = STWCX_RC, x;
        stwx = STWX, x;
        lfdx = LFDX, x;
        lfsx = LFSX, x;
        stfdx = STFDX, x;
        stfsx = STFSX, x;
        lvx = LVX, x;
        stvx = STVX, x;
    }

    // ===== Floating point =====

    fp_a! {
        fadd, fadd_rc = FADD, (frd, fra, frb) => (frd, fra, frb, 0);
        fadds, fadds_rc = FADDS, (frd, fra, frb) => (frd, fra, frb, 0);
        fsub, fsub_rc = FSUB, (frd, fra, frb) => (frd, fra, frb, 0);
        fsubs, fsubs_rc = FSUBS, (frd, fra, frb) => (frd, fra, frb, 0);
        fdiv, fdiv_rc = FDIV, (frd, fra, frb) => (frd, fra, frb, 0);
        fdivs, fdivs_rc = FDIVS, (frd, fra, frb) => (frd, fra, frb, 0);
        fmul, fmul_rc = FMUL, (frd, fra, frc) => (frd, fra, 0, frc);
        fmuls, fmuls_rc = FMULS, (frd, fra, frc) => (frd, fra, 0, frc);
        fmadd, fmadd_rc = FMADD, (frd, fra, frc, frb) => (frd, fra, frb, frc);
        fmsub, fmsub_rc = FMSUB, (frd, fra, frc, frb) => (frd, fra, frb, frc);
        fnmadd, fnmadd_rc = FNMADD, (frd, fra, frc, frb) => (frd, fra, frb, frc);
        fnmsub, fnmsub_rc = FNMSUB, (frd, fra, frc, frb) => (frd, fra, frb, frc);
        fsel, fsel_rc = FSEL, (frd, fra, frc, frb) => (frd, fra, frb, frc);
        fsqrt, fsqrt_rc = FSQRT, (frd, frb) => (frd, 0, frb, 0);
    }

    rr_rc! {
        fabs, fabs_rc = FABS, (frd, frb) => (frd, frb);
        fcfid, fcfid_rc = FCFID, (frd, frb) => (frd, frb);
        fctid, fctid_rc = FCTID, (frd, frb) => (frd, frb);
        fctidz, fctidz_rc = FCTIDZ, (frd, frb) => (frd, frb);
        fctiw, fctiw_rc = FCTIW, (frd, frb) => (frd, frb);
        fctiwz, fctiwz_rc = FCTIWZ, (frd, frb) => (frd, frb);
        fmr, fmr_rc = FMR, (frd, frb) => (frd, frb);
        fnabs, fnabs_rc = FNABS, (frd, frb) => (frd, frb);
        fneg, fneg_rc = FNEG, (frd, frb) => (frd, frb);
        frsp, frsp_rc = FRSP, (frd, frb) => (frd, frb);
    }

    pub fn fcmpu(&mut self, crfd: u32, fra: u32, frb: u32) -> Result<()> {
        self.e.put(ppc::x(FCMPU, ppc::cmp_field(crfd, 0)?, fra, frb)?)
    }

    pub fn fcmpo(&mut self, crfd: u32, fra: u32, frb: u32) -> Result<()> {
        self.e.put(ppc::x(FCMPO, ppc::cmp_field(crfd, 0)?, fra, frb)?)
    }

    pub fn mffs(&mut self, frd: u32) -> Result<()> {
        self.e.put(ppc::x(MFFS, frd, 0, 0)?)
    }

    // ===== Vector =====

    rrr! {
        vaddubm = VADDUBM, vx;
        vadduhm = VADDUHM, vx;
        vadduwm = VADDUWM, vx;
        vand = VAND, vx;
        vandc = VANDC, vx;
        vnor = VNOR, vx;
        vor = VOR, vx;
        vsubuwm = VSUBUWM, vx;
        vxor = VXOR, vx;
    }

    pub fn vperm(&mut self, vd: u32, va: u32, vb: u32, vc: u32) -> Result<()> {
        self.e.put(ppc::va(VPERM, vd, va, vb, vc)?)
    }

    pub fn vsel(&mut self, vd: u32, va: u32, vb: u32, vc: u32) -> Result<()> {
        self.e.put(ppc::va(VSEL, vd, va, vb, vc)?)
    }

    pub fn vmaddfp(&mut self, vd: u32, va: u32, vc: u32, vb: u32) -> Result<()> {
        self.e.put(ppc::va(VMADDFP, vd, va, vb, vc)?)
    }

    pub fn vspltisw(&mut self, vd: u32, imm: i64) -> Result<()> {
        self.e.put(ppc::vx_simm(VSPLTISW, vd, imm)?)
    }
}

#[cfg(test)]
mod tests;
