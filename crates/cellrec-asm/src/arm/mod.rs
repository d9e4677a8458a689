//! AArch64 assembler for host code.
//!
//! Words are little-endian. Integer registers carry their width: mixing
//! [`Reg::x`] and [`Reg::w`] operands where the instruction needs one width
//! fails with [`EncodeError::WidthMismatch`]. Double-precision registers are
//! plain indices `0..=31`. Load/store offsets are byte offsets; branch
//! targets are byte displacements, as on the PPC side.

pub mod opcodes;
mod table;

use tracing::trace;

use self::opcodes::*;
use crate::buffer::{ByteOrder, CodeBuffer};
use crate::emitter::Emitter;
use crate::error::{EncodeError, Result};
use crate::forms::arm;
use crate::label::{FixupKind, Label};
use crate::table::{Operand, Target, assign};

pub use self::table::ARM_OPS;

/// Operand size of an integer register.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Width {
    /// `w` registers.
    W,
    /// `x` registers.
    X,
}

/// An integer register. Index 31 is `sp` or the zero register, depending on
/// the instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Reg {
    pub index: u32,
    pub width: Width,
}

impl Reg {
    pub const SP: Self = Self::x(31);
    pub const XZR: Self = Self::x(31);
    pub const WZR: Self = Self::w(31);
    /// Frame pointer.
    pub const FP: Self = Self::x(29);
    /// Link register.
    pub const LR: Self = Self::x(30);

    pub const fn x(index: u32) -> Self {
        Self {
            index,
            width: Width::X,
        }
    }

    pub const fn w(index: u32) -> Self {
        Self {
            index,
            width: Width::W,
        }
    }

    const fn zero(width: Width) -> Self {
        Self { index: 31, width }
    }
}

/// Condition codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Cond {
    Eq = 0,
    Ne,
    Hs,
    Lo,
    Mi,
    Pl,
    Vs,
    Vc,
    Hi,
    Ls,
    Ge,
    Lt,
    Gt,
    Le,
    Al,
}

impl Cond {
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// The opposite condition. `Al` has none and maps to itself.
    pub const fn invert(self) -> Self {
        match self {
            Self::Eq => Self::Ne,
            Self::Ne => Self::Eq,
            Self::Hs => Self::Lo,
            Self::Lo => Self::Hs,
            Self::Mi => Self::Pl,
            Self::Pl => Self::Mi,
            Self::Vs => Self::Vc,
            Self::Vc => Self::Vs,
            Self::Hi => Self::Ls,
            Self::Ls => Self::Hi,
            Self::Ge => Self::Lt,
            Self::Lt => Self::Ge,
            Self::Gt => Self::Le,
            Self::Le => Self::Gt,
            Self::Al => Self::Al,
        }
    }
}

/// Addressing mode of `ldp`/`stp`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PairMode {
    /// `[xn, #off]`
    Offset,
    /// `[xn, #off]!`
    PreIndex,
    /// `[xn], #off`
    PostIndex,
}

/// Size bits for `width`: `op` is the 64-bit opcode.
const fn sized(op: u32, width: Width) -> u32 {
    match width {
        Width::X => op,
        Width::W => op & !SF,
    }
}

/// The shared width of `regs`.
fn same_width(mnemonic: &'static str, regs: &[Reg]) -> Result<Width> {
    let width = regs.first().map_or(Width::X, |r| r.width);
    if regs.iter().any(|r| r.width != width) {
        return Err(EncodeError::WidthMismatch(mnemonic));
    }
    Ok(width)
}

fn require(mnemonic: &'static str, reg: Reg, width: Width) -> Result<u32> {
    if reg.width == width {
        Ok(reg.index)
    } else {
        Err(EncodeError::WidthMismatch(mnemonic))
    }
}

pub struct ArmAssembler<'a> {
    e: Emitter<'a>,
}

/// `rd, rn, rm` with matching widths.
macro_rules! rrr {
    ($($name:ident = $op:expr;)*) => {$(
        pub fn $name(&mut self, rd: Reg, rn: Reg, rm: Reg) -> Result<()> {
            let width = same_width(stringify!($name), &[rd, rn, rm])?;
            self.e.put(arm::rrr(sized($op, width), rd.index, rn.index, rm.index)?)
        }
    )*};
}

/// `rd, rn, #imm` add/sub forms.
macro_rules! add_sub_imm {
    ($($name:ident = $op:expr;)*) => {$(
        pub fn $name(&mut self, rd: Reg, rn: Reg, imm: i64) -> Result<()> {
            let width = same_width(stringify!($name), &[rd, rn])?;
            self.e.put(arm::add_sub_imm(sized($op, width), rd.index, rn.index, imm)?)
        }
    )*};
}

/// `rd, rn, #bitmask` logical forms.
macro_rules! logic_imm {
    ($($name:ident = $op:expr;)*) => {$(
        pub fn $name(&mut self, rd: Reg, rn: Reg, value: u64) -> Result<()> {
            let width = same_width(stringify!($name), &[rd, rn])?;
            self.e.put(arm::logic_imm(sized($op, width), rd.index, rn.index, value)?)
        }
    )*};
}

/// Double-precision `dd, dn, dm`.
macro_rules! fp2 {
    ($($name:ident = $op:expr;)*) => {$(
        pub fn $name(&mut self, dd: u32, dn: u32, dm: u32) -> Result<()> {
            self.e.put(arm::rrr($op, dd, dn, dm)?)
        }
    )*};
}

/// Double-precision `dd, dn`.
macro_rules! fp1 {
    ($($name:ident = $op:expr;)*) => {$(
        pub fn $name(&mut self, dd: u32, dn: u32) -> Result<()> {
            self.e.put(arm::rr($op, dd, dn)?)
        }
    )*};
}

impl<'a> ArmAssembler<'a> {
    pub const fn new(data: &'a mut [u8]) -> Self {
        Self::from_buffer(CodeBuffer::new(data))
    }

    /// Use `buf`, switching it to little-endian.
    pub const fn from_buffer(buf: CodeBuffer<'a>) -> Self {
        Self {
            e: Emitter::new(buf.with_byte_order(ByteOrder::Little)),
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

    pub fn label_position(&self, label: Label) -> Option<usize> {
        self.e.label_position(label)
    }

    pub fn finalize(&mut self) -> Result<usize> {
        self.e.finalize()
    }

    /// Encode and emit `mnemonic` from the AArch64 table. Registers are
    /// 64-bit `x` (or `d`) registers.
    pub fn emit(&mut self, mnemonic: &str, operands: &[Operand]) -> Result<u32> {
        let mut mismatch = None;
        for def in ARM_OPS
            .iter()
            .flat_map(|group| group.iter())
            .filter(|def| def.mnemonic == mnemonic)
        {
            let slots = match assign(def, operands) {
                Ok(slots) => slots,
                Err(
                    err @ (EncodeError::OperandCount { .. } | EncodeError::OperandMismatch { .. }),
                ) => {
                    mismatch = Some(err);
                    continue;
                }
                Err(err) => return Err(err),
            };
            let word = table::encode(def, &slots)?;
            match slots.label {
                Some((label, kind)) => self.e.put_with_fixup(word, label, kind)?,
                None => self.e.put(word)?,
            }
            trace!(mnemonic, word = format_args!("{word:#010x}"), "emit");
            return Ok(word);
        }
        Err(mismatch.unwrap_or_else(|| EncodeError::UnknownMnemonic(mnemonic.to_string())))
    }

    // ===== Integer arithmetic =====

    rrr! {
        add = ADD;
        adds = ADDS;
        sub = SUB;
        subs = SUBS;
        and = AND;
        ands = ANDS;
        bic = BIC;
        orr = ORR;
        orn = ORN;
        eor = EOR;
        lslv = LSLV;
        lsrv = LSRV;
        asrv = ASRV;
        rorv = RORV;
        sdiv = SDIV;
        udiv = UDIV;
        mul = MUL;
    }

    add_sub_imm! {
        add_imm = ADD_IMM;
        adds_imm = ADDS_IMM;
        sub_imm = SUB_IMM;
        subs_imm = SUBS_IMM;
    }

    logic_imm! {
        and_imm = AND_IMM;
        ands_imm = ANDS_IMM;
        orr_imm = ORR_IMM;
        eor_imm = EOR_IMM;
    }

    pub fn madd(&mut self, rd: Reg, rn: Reg, rm: Reg, ra: Reg) -> Result<()> {
        let width = same_width("madd", &[rd, rn, rm, ra])?;
        self.e
            .put(arm::rrrr(sized(MADD, width), rd.index, rn.index, rm.index, ra.index)?)
    }

    pub fn msub(&mut self, rd: Reg, rn: Reg, rm: Reg, ra: Reg) -> Result<()> {
        let width = same_width("msub", &[rd, rn, rm, ra])?;
        self.e
            .put(arm::rrrr(sized(MSUB, width), rd.index, rn.index, rm.index, ra.index)?)
    }

    /// High 64 bits of the signed 128-bit product.
    pub fn smulh(&mut self, rd: Reg, rn: Reg, rm: Reg) -> Result<()> {
        self.high_multiply("smulh", SMULH, rd, rn, rm)
    }

    pub fn umulh(&mut self, rd: Reg, rn: Reg, rm: Reg) -> Result<()> {
        self.high_multiply("umulh", UMULH, rd, rn, rm)
    }

    fn high_multiply(
        &mut self,
        mnemonic: &'static str,
        op: u32,
        rd: Reg,
        rn: Reg,
        rm: Reg,
    ) -> Result<()> {
        let (rd, rn, rm) = (
            require(mnemonic, rd, Width::X)?,
            require(mnemonic, rn, Width::X)?,
            require(mnemonic, rm, Width::X)?,
        );
        self.e.put(arm::rrr(op, rd, rn, rm)?)
    }

    /// `cmp rn, rm` is `subs zr, rn, rm`.
    pub fn cmp(&mut self, rn: Reg, rm: Reg) -> Result<()> {
        self.subs(Reg::zero(rn.width), rn, rm)
    }

    pub fn cmp_imm(&mut self, rn: Reg, imm: i64) -> Result<()> {
        self.subs_imm(Reg::zero(rn.width), rn, imm)
    }

    /// `neg rd, rm` is `sub rd, zr, rm`.
    pub fn neg(&mut self, rd: Reg, rm: Reg) -> Result<()> {
        self.sub(rd, Reg::zero(rd.width), rm)
    }

    /// Register move through `orr`. `sp` cannot be moved this way.
    pub fn mov(&mut self, rd: Reg, rm: Reg) -> Result<()> {
        self.orr(rd, Reg::zero(rd.width), rm)
    }

    // ===== Move wide =====

    pub fn movz(&mut self, rd: Reg, imm: i64, shift: u32) -> Result<()> {
        self.move_wide(MOVZ, rd, imm, shift)
    }

    pub fn movn(&mut self, rd: Reg, imm: i64, shift: u32) -> Result<()> {
        self.move_wide(MOVN, rd, imm, shift)
    }

    pub fn movk(&mut self, rd: Reg, imm: i64, shift: u32) -> Result<()> {
        self.move_wide(MOVK, rd, imm, shift)
    }

    fn move_wide(&mut self, op: u32, rd: Reg, imm: i64, shift: u32) -> Result<()> {
        self.e.put(arm::move_wide(sized(op, rd.width), rd.index, imm, shift)?)
    }

    /// Load an arbitrary constant: `movz` for the lowest nonzero chunk and
    /// `movk` for each other nonzero chunk.
    pub fn mov_imm(&mut self, rd: Reg, value: u64) -> Result<()> {
        let chunks = match rd.width {
            Width::X => 4,
            Width::W if value >> 32 == 0 => 2,
            Width::W => {
                return Err(EncodeError::ImmediateOutOfRange {
                    value: value as i64,
                    bits: 32,
                });
            }
        };
        if value == 0 {
            return self.movz(rd, 0, 0);
        }
        let mut first = true;
        for chunk in 0..chunks {
            let shift = chunk * 16;
            let part = ((value >> shift) & 0xFFFF) as i64;
            if part == 0 {
                continue;
            }
            if first {
                self.movz(rd, part, shift)?;
                first = false;
            } else {
                self.movk(rd, part, shift)?;
            }
        }
        Ok(())
    }

    // ===== Bitfield moves and shifts =====

    pub fn ubfm(&mut self, rd: Reg, rn: Reg, immr: u32, imms: u32) -> Result<()> {
        self.bitfield("ubfm", UBFM, rd, rn, immr, imms)
    }

    pub fn sbfm(&mut self, rd: Reg, rn: Reg, immr: u32, imms: u32) -> Result<()> {
        self.bitfield("sbfm", SBFM, rd, rn, immr, imms)
    }

    pub fn bfm(&mut self, rd: Reg, rn: Reg, immr: u32, imms: u32) -> Result<()> {
        self.bitfield("bfm", BFM, rd, rn, immr, imms)
    }

    fn bitfield(
        &mut self,
        mnemonic: &'static str,
        op: u32,
        rd: Reg,
        rn: Reg,
        immr: u32,
        imms: u32,
    ) -> Result<()> {
        let width = same_width(mnemonic, &[rd, rn])?;
        let op = match width {
            Width::X => op,
            Width::W => op & !(SF | N),
        };
        self.e.put(arm::bitfield(op, rd.index, rn.index, immr, imms)?)
    }

    const fn bits(width: Width) -> u32 {
        match width {
            Width::X => 64,
            Width::W => 32,
        }
    }

    fn shift_amount(rd: Reg, shift: u32) -> Result<u32> {
        if shift >= Self::bits(rd.width) {
            return Err(EncodeError::ImmediateOutOfRange {
                value: i64::from(shift),
                bits: Self::bits(rd.width).trailing_zeros(),
            });
        }
        Ok(shift)
    }

    pub fn lsl(&mut self, rd: Reg, rn: Reg, shift: u32) -> Result<()> {
        let bits = Self::bits(rd.width);
        let shift = Self::shift_amount(rd, shift)?;
        self.ubfm(rd, rn, (bits - shift) % bits, bits - 1 - shift)
    }

    pub fn lsr(&mut self, rd: Reg, rn: Reg, shift: u32) -> Result<()> {
        let shift = Self::shift_amount(rd, shift)?;
        self.ubfm(rd, rn, shift, Self::bits(rd.width) - 1)
    }

    pub fn asr(&mut self, rd: Reg, rn: Reg, shift: u32) -> Result<()> {
        let shift = Self::shift_amount(rd, shift)?;
        self.sbfm(rd, rn, shift, Self::bits(rd.width) - 1)
    }

    /// Sign-extend the low byte of `rn`; `rn` has the width of `rd`.
    pub fn sxtb(&mut self, rd: Reg, rn: Reg) -> Result<()> {
        self.sbfm(rd, Reg { width: rd.width, ..rn }, 0, 7)
    }

    pub fn sxth(&mut self, rd: Reg, rn: Reg) -> Result<()> {
        self.sbfm(rd, Reg { width: rd.width, ..rn }, 0, 15)
    }

    /// `sxtw xd, wn`
    pub fn sxtw(&mut self, rd: Reg, rn: Reg) -> Result<()> {
        require("sxtw", rd, Width::X)?;
        require("sxtw", rn, Width::W)?;
        self.sbfm(rd, Reg::x(rn.index), 0, 31)
    }

    /// `uxtb wd, wn`
    pub fn uxtb(&mut self, rd: Reg, rn: Reg) -> Result<()> {
        require("uxtb", rd, Width::W)?;
        self.ubfm(rd, rn, 0, 7)
    }

    pub fn uxth(&mut self, rd: Reg, rn: Reg) -> Result<()> {
        require("uxth", rd, Width::W)?;
        self.ubfm(rd, rn, 0, 15)
    }

    // ===== One-source =====

    /// Reverse the bytes of the whole register.
    pub fn rev(&mut self, rd: Reg, rn: Reg) -> Result<()> {
        let width = same_width("rev", &[rd, rn])?;
        let op = match width {
            Width::X => REV,
            Width::W => REV32 & !SF,
        };
        self.e.put(arm::rr(op, rd.index, rn.index)?)
    }

    pub fn rev16(&mut self, rd: Reg, rn: Reg) -> Result<()> {
        let width = same_width("rev16", &[rd, rn])?;
        self.e.put(arm::rr(sized(REV16, width), rd.index, rn.index)?)
    }

    pub fn clz(&mut self, rd: Reg, rn: Reg) -> Result<()> {
        let width = same_width("clz", &[rd, rn])?;
        self.e.put(arm::rr(sized(CLZ, width), rd.index, rn.index)?)
    }

    pub fn rbit(&mut self, rd: Reg, rn: Reg) -> Result<()> {
        let width = same_width("rbit", &[rd, rn])?;
        self.e.put(arm::rr(sized(RBIT, width), rd.index, rn.index)?)
    }

    // ===== Conditional select =====

    pub fn csel(&mut self, rd: Reg, rn: Reg, rm: Reg, cond: Cond) -> Result<()> {
        self.cond_select("csel", CSEL, rd, rn, rm, cond)
    }

    pub fn csinc(&mut self, rd: Reg, rn: Reg, rm: Reg, cond: Cond) -> Result<()> {
        self.cond_select("csinc", CSINC, rd, rn, rm, cond)
    }

    pub fn csneg(&mut self, rd: Reg, rn: Reg, rm: Reg, cond: Cond) -> Result<()> {
        self.cond_select("csneg", CSNEG, rd, rn, rm, cond)
    }

    fn cond_select(
        &mut self,
        mnemonic: &'static str,
        op: u32,
        rd: Reg,
        rn: Reg,
        rm: Reg,
        cond: Cond,
    ) -> Result<()> {
        let width = same_width(mnemonic, &[rd, rn, rm])?;
        self.e.put(arm::cond_select(
            sized(op, width),
            rd.index,
            rn.index,
            rm.index,
            cond.code(),
        )?)
    }

    /// `rd = cond ? 1 : 0`
    pub fn cset(&mut self, rd: Reg, cond: Cond) -> Result<()> {
        if cond == Cond::Al {
            return self.movz(rd, 1, 0);
        }
        let zero = Reg::zero(rd.width);
        self.csinc(rd, zero, zero, cond.invert())
    }

    // ===== Loads and stores =====

    /// `ldr rt, [xn, #offset]`; the width of `rt` picks the access size.
    pub fn ldr(&mut self, rt: Reg, rn: Reg, offset: i64) -> Result<()> {
        let op = match rt.width {
            Width::X => LDR_X,
            Width::W => LDR_W,
        };
        self.load_store("ldr", op, rt.index, rn, offset)
    }

    pub fn str(&mut self, rt: Reg, rn: Reg, offset: i64) -> Result<()> {
        let op = match rt.width {
            Width::X => STR_X,
            Width::W => STR_W,
        };
        self.load_store("str", op, rt.index, rn, offset)
    }

    pub fn ldrb(&mut self, rt: Reg, rn: Reg, offset: i64) -> Result<()> {
        let rt = require("ldrb", rt, Width::W)?;
        self.load_store("ldrb", LDRB, rt, rn, offset)
    }

    pub fn strb(&mut self, rt: Reg, rn: Reg, offset: i64) -> Result<()> {
        let rt = require("strb", rt, Width::W)?;
        self.load_store("strb", STRB, rt, rn, offset)
    }

    pub fn ldrh(&mut self, rt: Reg, rn: Reg, offset: i64) -> Result<()> {
        let rt = require("ldrh", rt, Width::W)?;
        self.load_store("ldrh", LDRH, rt, rn, offset)
    }

    pub fn strh(&mut self, rt: Reg, rn: Reg, offset: i64) -> Result<()> {
        let rt = require("strh", rt, Width::W)?;
        self.load_store("strh", STRH, rt, rn, offset)
    }

    pub fn ldrsw(&mut self, rt: Reg, rn: Reg, offset: i64) -> Result<()> {
        let rt = require("ldrsw", rt, Width::X)?;
        self.load_store("ldrsw", LDRSW, rt, rn, offset)
    }

    pub fn ldr_d(&mut self, dt: u32, rn: Reg, offset: i64) -> Result<()> {
        self.load_store("ldr", LDR_D, dt, rn, offset)
    }

    pub fn str_d(&mut self, dt: u32, rn: Reg, offset: i64) -> Result<()> {
        self.load_store("str", STR_D, dt, rn, offset)
    }

    fn load_store(
        &mut self,
        mnemonic: &'static str,
        op: u32,
        rt: u32,
        rn: Reg,
        offset: i64,
    ) -> Result<()> {
        let rn = require(mnemonic, rn, Width::X)?;
        self.e.put(arm::load_store(op, rt, rn, offset)?)
    }

    pub fn stp(&mut self, rt: Reg, rt2: Reg, rn: Reg, offset: i64, mode: PairMode) -> Result<()> {
        let op = match mode {
            PairMode::Offset => STP,
            PairMode::PreIndex => STP_PRE,
            PairMode::PostIndex => STP_POST,
        };
        self.pair("stp", op, rt, rt2, rn, offset)
    }

    pub fn ldp(&mut self, rt: Reg, rt2: Reg, rn: Reg, offset: i64, mode: PairMode) -> Result<()> {
        let op = match mode {
            PairMode::Offset => LDP,
            PairMode::PreIndex => LDP_PRE,
            PairMode::PostIndex => LDP_POST,
        };
        self.pair("ldp", op, rt, rt2, rn, offset)
    }

    fn pair(
        &mut self,
        mnemonic: &'static str,
        op: u32,
        rt: Reg,
        rt2: Reg,
        rn: Reg,
        offset: i64,
    ) -> Result<()> {
        let width = same_width(mnemonic, &[rt, rt2])?;
        let rn = require(mnemonic, rn, Width::X)?;
        self.e.put(arm::load_store_pair(
            sized(op, width),
            rt.index,
            rt2.index,
            rn,
            offset,
        )?)
    }

    // ===== Branches =====

    pub fn b(&mut self, target: impl Into<Target>) -> Result<()> {
        self.e
            .put_target(target.into(), FixupKind::ArmRel26, |bytes| arm::branch_imm(B, bytes))?;
        Ok(())
    }

    pub fn bl(&mut self, target: impl Into<Target>) -> Result<()> {
        self.e
            .put_target(target.into(), FixupKind::ArmRel26, |bytes| arm::branch_imm(BL, bytes))?;
        Ok(())
    }

    pub fn b_cond(&mut self, cond: Cond, target: impl Into<Target>) -> Result<()> {
        let op = B_COND | cond.code();
        self.e
            .put_target(target.into(), FixupKind::ArmRel19, |bytes| arm::cond_branch(op, bytes))?;
        Ok(())
    }

    pub fn cbz(&mut self, rt: Reg, target: impl Into<Target>) -> Result<()> {
        self.compare_branch(CBZ, rt, target.into())
    }

    pub fn cbnz(&mut self, rt: Reg, target: impl Into<Target>) -> Result<()> {
        self.compare_branch(CBNZ, rt, target.into())
    }

    fn compare_branch(&mut self, op: u32, rt: Reg, target: Target) -> Result<()> {
        let op = sized(op, rt.width);
        self.e.put_target(target, FixupKind::ArmRel19, |bytes| {
            arm::compare_branch(op, rt.index, bytes)
        })?;
        Ok(())
    }

    pub fn br(&mut self, rn: Reg) -> Result<()> {
        let rn = require("br", rn, Width::X)?;
        self.e.put(arm::branch_reg(BR, rn)?)
    }

    pub fn blr(&mut self, rn: Reg) -> Result<()> {
        let rn = require("blr", rn, Width::X)?;
        self.e.put(arm::branch_reg(BLR, rn)?)
    }

    /// Return through `x30`.
    pub fn ret(&mut self) -> Result<()> {
        self.e.put(arm::branch_reg(RET, Reg::LR.index)?)
    }

    // ===== System =====

    pub fn nop(&mut self) -> Result<()> {
        self.e.put(NOP)
    }

    pub fn brk(&mut self, imm: i64) -> Result<()> {
        self.e.put(arm::exception(BRK, imm)?)
    }

    pub fn svc(&mut self, imm: i64) -> Result<()> {
        self.e.put(arm::exception(SVC, imm)?)
    }

    // ===== Floating point =====

    fp2! {
        fadd = FADD;
        fsub = FSUB;
        fmul = FMUL;
        fdiv = FDIV;
    }

    fp1! {
        fmov = FMOV;
        fabs = FABS;
        fneg = FNEG;
        fsqrt = FSQRT;
    }

    /// `dd = da + dn * dm`
    pub fn fmadd(&mut self, dd: u32, dn: u32, dm: u32, da: u32) -> Result<()> {
        self.e.put(arm::rrrr(FMADD, dd, dn, dm, da)?)
    }

    /// `dd = da - dn * dm`
    pub fn fmsub(&mut self, dd: u32, dn: u32, dm: u32, da: u32) -> Result<()> {
        self.e.put(arm::rrrr(FMSUB, dd, dn, dm, da)?)
    }

    pub fn fcmp(&mut self, dn: u32, dm: u32) -> Result<()> {
        self.e.put(arm::rrr(FCMP, 0, dn, dm)?)
    }

    /// Bit copy `xd = dn`.
    pub fn fmov_to_gpr(&mut self, rd: Reg, dn: u32) -> Result<()> {
        let rd = require("fmov", rd, Width::X)?;
        self.e.put(arm::rr(FMOV_TO_GPR, rd, dn)?)
    }

    /// Bit copy `dd = xn`.
    pub fn fmov_from_gpr(&mut self, dd: u32, rn: Reg) -> Result<()> {
        let rn = require("fmov", rn, Width::X)?;
        self.e.put(arm::rr(FMOV_FROM_GPR, dd, rn)?)
    }

    /// Convert to signed integer, rounding toward zero.
    pub fn fcvtzs(&mut self, rd: Reg, dn: u32) -> Result<()> {
        self.e.put(arm::rr(sized(FCVTZS, rd.width), rd.index, dn)?)
    }

    pub fn fcvtzu(&mut self, rd: Reg, dn: u32) -> Result<()> {
        self.e.put(arm::rr(sized(FCVTZU, rd.width), rd.index, dn)?)
    }

    pub fn scvtf(&mut self, dd: u32, rn: Reg) -> Result<()> {
        self.e.put(arm::rr(sized(SCVTF, rn.width), dd, rn.index)?)
    }

    pub fn ucvtf(&mut self, dd: u32, rn: Reg) -> Result<()> {
        self.e.put(arm::rr(sized(UCVTF, rn.width), dd, rn.index)?)
    }
}

#[cfg(test)]
mod tests;
