//! SPU assembler.
//!
//! Registers are `0..=127`. Immediates are raw field values (quadword
//! units for `lqd`/`stqd`, words for `lqa`), except branch targets, which
//! are byte displacements or byte addresses like on the PPC side.

pub mod opcodes;
mod table;

use tracing::trace;

use self::opcodes::*;
use crate::buffer::CodeBuffer;
use crate::emitter::Emitter;
use crate::error::Result;
use crate::forms::spu;
use crate::label::{FixupKind, Label};
use crate::table::{Operand, Target, assign, lookup};

pub use self::table::SPU_OPS;

pub struct SpuAssembler<'a> {
    e: Emitter<'a>,
}

macro_rules! rr {
    ($($name:ident = $op:expr;)*) => {$(
        pub fn $name(&mut self, rt: u32, ra: u32, rb: u32) -> Result<()> {
            self.e.put(spu::rr($op, rt, ra, rb)?)
        }
    )*};
}

macro_rules! rrr {
    ($($name:ident = $op:expr;)*) => {$(
        pub fn $name(&mut self, rt: u32, ra: u32, rb: u32, rc: u32) -> Result<()> {
            self.e.put(spu::rrr($op, rt, ra, rb, rc)?)
        }
    )*};
}

macro_rules! ri {
    ($($name:ident = $op:expr, $form:ident;)*) => {$(
        pub fn $name(&mut self, rt: u32, ra: u32, imm: i64) -> Result<()> {
            self.e.put(spu::$form($op, rt, ra, imm)?)
        }
    )*};
}

/// RI16 forms without a source register.
macro_rules! ri16 {
    ($($name:ident = $op:expr, $form:ident;)*) => {$(
        pub fn $name(&mut self, rt: u32, imm: i64) -> Result<()> {
            self.e.put(spu::$form($op, rt, imm)?)
        }
    )*};
}

/// Branches testing or linking through `rt`.
macro_rules! branch {
    ($($name:ident = $op:expr, $kind:ident;)*) => {$(
        pub fn $name(&mut self, rt: u32, target: impl Into<Target>) -> Result<()> {
            self.branch($op, rt, target.into(), FixupKind::$kind)
        }
    )*};
}

impl<'a> SpuAssembler<'a> {
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

    pub fn code(&self) -> &[u8] {
        self.e.buf.as_bytes()
    }

    pub fn new_label(&mut self) -> Label {
        self.e.new_label()
    }

    pub fn bind(&mut self, label: Label) -> Result<()> {
        self.e.bind(label)
    }

    /// Offset `label` was bound at, if any.
    pub fn label_position(&self, label: Label) -> Option<usize> {
        self.e.label_position(label)
    }

    pub fn finalize(&mut self) -> Result<usize> {
        self.e.finalize()
    }

    /// Encode and emit `mnemonic` from the SPU instruction table.
    pub fn emit(&mut self, mnemonic: &str, operands: &[Operand]) -> Result<u32> {
        let def = lookup(SPU_OPS, mnemonic)?;
        let slots = assign(def, operands)?;
        let word = table::encode(def, &slots)?;
        match slots.label {
            Some((label, kind)) => self.e.put_with_fixup(word, label, kind)?,
            None => self.e.put(word)?,
        }
        trace!(mnemonic, word = format_args!("{word:#010x}"), "emit");
        Ok(word)
    }

    fn branch(&mut self, op: u32, rt: u32, target: Target, kind: FixupKind) -> Result<()> {
        self.e
            .put_target(target, kind, |bytes| spu::ri16_branch(op, rt, bytes))?;
        Ok(())
    }

    // ===== Integer and logical =====

    rr! {
        a = A;
        ah = AH;
        and = AND;
        andc = ANDC;
        bg = BG;
        ceq = CEQ;
        ceqb = CEQB;
        ceqh = CEQH;
        cg = CG;
        cgt = CGT;
        clgt = CLGT;
        eqv = EQV;
        mpy = MPY;
        mpyu = MPYU;
        nand = NAND;
        nor = NOR;
        or = OR;
        orc = ORC;
        rot = ROT;
        sf = SF;
        sfh = SFH;
        shl = SHL;
        xor = XOR;
        lqx = LQX;
        stqx = STQX;
        fa = FA;
        fm = FM;
        fs = FS;
    }

    pub fn clz(&mut self, rt: u32, ra: u32) -> Result<()> {
        self.e.put(spu::rr(CLZ, rt, ra, 0)?)
    }

    rrr! {
        fma = FMA;
        fms = FMS;
        fnms = FNMS;
        mpya = MPYA;
        selb = SELB;
        shufb = SHUFB;
    }

    ri! {
        roti = ROTI, ri7;
        rotmai = ROTMAI, ri7;
        rotmi = ROTMI, ri7;
        rotqbyi = ROTQBYI, ri7;
        shli = SHLI, ri7;
        shlqbyi = SHLQBYI, ri7;
        cflts = CFLTS, ri8;
        cfltu = CFLTU, ri8;
        csflt = CSFLT, ri8;
        cuflt = CUFLT, ri8;
        ahi = AHI, ri10;
        ai = AI, ri10;
        andbi = ANDBI, ri10;
        andhi = ANDHI, ri10;
        andi = ANDI, ri10;
        ceqbi = CEQBI, ri10;
        ceqhi = CEQHI, ri10;
        ceqi = CEQI, ri10;
        cgti = CGTI, ri10;
        clgti = CLGTI, ri10;
        mpyi = MPYI, ri10;
        mpyui = MPYUI, ri10;
        orbi = ORBI, ri10;
        orhi = ORHI, ri10;
        ori = ORI, ri10;
        sfhi = SFHI, ri10;
        sfi = SFI, ri10;
        xori = XORI, ri10;
    }

    // ===== Shuffle-mask generation: `c?d rt, i7(ra)` =====

    pub fn cbd(&mut self, rt: u32, offset: i64, ra: u32) -> Result<()> {
        self.e.put(spu::ri7(CBD, rt, ra, offset)?)
    }

    pub fn chd(&mut self, rt: u32, offset: i64, ra: u32) -> Result<()> {
        self.e.put(spu::ri7(CHD, rt, ra, offset)?)
    }

    pub fn cwd(&mut self, rt: u32, offset: i64, ra: u32) -> Result<()> {
        self.e.put(spu::ri7(CWD, rt, ra, offset)?)
    }

    pub fn cdd(&mut self, rt: u32, offset: i64, ra: u32) -> Result<()> {
        self.e.put(spu::ri7(CDD, rt, ra, offset)?)
    }

    // ===== Local store =====

    /// `lqd rt, qw(ra)` where `qw` counts quadwords.
    pub fn lqd(&mut self, rt: u32, qw: i64, ra: u32) -> Result<()> {
        self.e.put(spu::ri10(LQD, rt, ra, qw)?)
    }

    pub fn stqd(&mut self, rt: u32, qw: i64, ra: u32) -> Result<()> {
        self.e.put(spu::ri10(STQD, rt, ra, qw)?)
    }

    // ===== Immediate loads =====

    ri16! {
        il = IL, ri16;
        lqa = LQA, ri16;
        lqr = LQR, ri16;
        stqa = STQA, ri16;
        stqr = STQR, ri16;
        ilh = ILH, ri16_unsigned;
        ilhu = ILHU, ri16_unsigned;
        iohl = IOHL, ri16_unsigned;
        fsmbi = FSMBI, ri16_unsigned;
    }

    pub fn ila(&mut self, rt: u32, imm: i64) -> Result<()> {
        self.e.put(spu::ri18(ILA, rt, imm)?)
    }

    // ===== Branches =====

    pub fn br(&mut self, target: impl Into<Target>) -> Result<()> {
        self.branch(BR, 0, target.into(), FixupKind::SpuRel16)
    }

    pub fn bra(&mut self, target: impl Into<Target>) -> Result<()> {
        self.branch(BRA, 0, target.into(), FixupKind::SpuAbs16)
    }

    branch! {
        brsl = BRSL, SpuRel16;
        brasl = BRASL, SpuAbs16;
        brz = BRZ, SpuRel16;
        brnz = BRNZ, SpuRel16;
        brhz = BRHZ, SpuRel16;
        brhnz = BRHNZ, SpuRel16;
    }

    pub fn bi(&mut self, ra: u32) -> Result<()> {
        self.e.put(spu::rr(BI, 0, ra, 0)?)
    }

    pub fn bisl(&mut self, rt: u32, ra: u32) -> Result<()> {
        self.e.put(spu::rr(BISL, rt, ra, 0)?)
    }

    pub fn biz(&mut self, rt: u32, ra: u32) -> Result<()> {
        self.e.put(spu::rr(BIZ, rt, ra, 0)?)
    }

    pub fn binz(&mut self, rt: u32, ra: u32) -> Result<()> {
        self.e.put(spu::rr(BINZ, rt, ra, 0)?)
    }

    // ===== Pseudo-mnemonics =====

    /// `lr rt, ra` is `ori rt, ra, 0`.
    pub fn lr(&mut self, rt: u32, ra: u32) -> Result<()> {
        self.ori(rt, ra, 0)
    }

    /// Even-pipeline no-op.
    pub fn nop(&mut self) -> Result<()> {
        self.e.put(NOP)
    }

    /// Odd-pipeline no-op.
    pub fn lnop(&mut self) -> Result<()> {
        self.e.put(LNOP)
    }

    /// Stop and signal the host with `signal`.
    pub fn stop(&mut self, signal: i64) -> Result<()> {
        self.e.put(spu::stop(STOP, signal)?)
    }

    /// Return through the link register `r0`.
    pub fn ret(&mut self) -> Result<()> {
        self.bi(0)
    }
}

#[cfg(test)]
mod tests;
