//! AArch64 mnemonic table and form dispatch for [`ArmAssembler::emit`].
//!
//! Entries cover the 64-bit integer and double-precision forms. A mnemonic
//! may appear more than once with different syntax (`add` with a register
//! or an immediate); the first entry whose operands fit is used.
//!
//! [`ArmAssembler::emit`]: super::ArmAssembler::emit

use super::opcodes::*;
use crate::error::{EncodeError, Result};
use crate::forms::{Form, arm};
use crate::table::{Field, OpDef, Slots};

macro_rules! ops {
    ($($m:literal, $form:ident, $op:expr, [$($f:ident),*];)*) => {
        &[$(OpDef::new($m, Form::$form, $op, &[$(Field::$f),*]),)*]
    };
}

pub static ARM_OPS: &[&[OpDef]] = &[
    ops! {
        "add", AddSubReg, ADD, [Xd, Xn, Xm];
        "adds", AddSubReg, ADDS, [Xd, Xn, Xm];
        "sub", AddSubReg, SUB, [Xd, Xn, Xm];
        "subs", AddSubReg, SUBS, [Xd, Xn, Xm];
        "add", AddSubImm, ADD_IMM, [Xd, Xn, Imm12];
        "adds", AddSubImm, ADDS_IMM, [Xd, Xn, Imm12];
        "sub", AddSubImm, SUB_IMM, [Xd, Xn, Imm12];
        "subs", AddSubImm, SUBS_IMM, [Xd, Xn, Imm12];
    },
    ops! {
        "and", LogicReg, AND, [Xd, Xn, Xm];
        "ands", LogicReg, ANDS, [Xd, Xn, Xm];
        "bic", LogicReg, BIC, [Xd, Xn, Xm];
        "eor", LogicReg, EOR, [Xd, Xn, Xm];
        "orn", LogicReg, ORN, [Xd, Xn, Xm];
        "orr", LogicReg, ORR, [Xd, Xn, Xm];
        "and", LogicImm, AND_IMM, [Xd, Xn, Bitmask];
        "ands", LogicImm, ANDS_IMM, [Xd, Xn, Bitmask];
        "eor", LogicImm, EOR_IMM, [Xd, Xn, Bitmask];
        "orr", LogicImm, ORR_IMM, [Xd, Xn, Bitmask];
    },
    ops! {
        "movn", MoveWide, MOVN, [Xd, Imm16, Hw];
        "movz", MoveWide, MOVZ, [Xd, Imm16, Hw];
        "movk", MoveWide, MOVK, [Xd, Imm16, Hw];
        "sbfm", Bitfield, SBFM, [Xd, Xn, Immr, Imms];
        "bfm", Bitfield, BFM, [Xd, Xn, Immr, Imms];
        "ubfm", Bitfield, UBFM, [Xd, Xn, Immr, Imms];
        "csel", CondSelect, CSEL, [Xd, Xn, Xm, Cond];
        "csinc", CondSelect, CSINC, [Xd, Xn, Xm, Cond];
        "csinv", CondSelect, CSINV, [Xd, Xn, Xm, Cond];
        "csneg", CondSelect, CSNEG, [Xd, Xn, Xm, Cond];
    },
    ops! {
        "clz", DataProc1, CLZ, [Xd, Xn];
        "rbit", DataProc1, RBIT, [Xd, Xn];
        "rev", DataProc1, REV, [Xd, Xn];
        "rev16", DataProc1, REV16, [Xd, Xn];
        "rev32", DataProc1, REV32, [Xd, Xn];
        "asrv", DataProc2, ASRV, [Xd, Xn, Xm];
        "lslv", DataProc2, LSLV, [Xd, Xn, Xm];
        "lsrv", DataProc2, LSRV, [Xd, Xn, Xm];
        "rorv", DataProc2, RORV, [Xd, Xn, Xm];
        "sdiv", DataProc2, SDIV, [Xd, Xn, Xm];
        "udiv", DataProc2, UDIV, [Xd, Xn, Xm];
        "mul", DataProc2, MUL, [Xd, Xn, Xm];
        "smulh", DataProc2, SMULH, [Xd, Xn, Xm];
        "umulh", DataProc2, UMULH, [Xd, Xn, Xm];
        "madd", DataProc3, MADD, [Xd, Xn, Xm, Xa];
        "msub", DataProc3, MSUB, [Xd, Xn, Xm, Xa];
    },
    ops! {
        "ldr", LoadStore, LDR_X, [Xd, Xn, MemOff];
        "str", LoadStore, STR_X, [Xd, Xn, MemOff];
        "ldrsw", LoadStore, LDRSW, [Xd, Xn, MemOff];
        "ldp", LoadStorePair, LDP, [Xd, Xt2, Xn, MemOff];
        "stp", LoadStorePair, STP, [Xd, Xt2, Xn, MemOff];
    },
    ops! {
        "b", BranchImm, B, [Rel26];
        "bl", BranchImm, BL, [Rel26];
        "b.eq", CondBranch, B_COND, [Rel19];
        "b.ne", CondBranch, B_COND | 0x1, [Rel19];
        "b.hs", CondBranch, B_COND | 0x2, [Rel19];
        "b.lo", CondBranch, B_COND | 0x3, [Rel19];
        "b.mi", CondBranch, B_COND | 0x4, [Rel19];
        "b.pl", CondBranch, B_COND | 0x5, [Rel19];
        "b.vs", CondBranch, B_COND | 0x6, [Rel19];
        "b.vc", CondBranch, B_COND | 0x7, [Rel19];
        "b.hi", CondBranch, B_COND | 0x8, [Rel19];
        "b.ls", CondBranch, B_COND | 0x9, [Rel19];
        "b.ge", CondBranch, B_COND | 0xA, [Rel19];
        "b.lt", CondBranch, B_COND | 0xB, [Rel19];
        "b.gt", CondBranch, B_COND | 0xC, [Rel19];
        "b.le", CondBranch, B_COND | 0xD, [Rel19];
        "cbz", CompareBranch, CBZ, [Xd, Rel19];
        "cbnz", CompareBranch, CBNZ, [Xd, Rel19];
        "br", BranchReg, BR, [Xn];
        "blr", BranchReg, BLR, [Xn];
        "ret", BranchReg, RET, [Xn];
        "ret", BranchReg, RET | 30 << 5, [];
        "brk", Exception, BRK, [Imm16];
        "svc", Exception, SVC, [Imm16];
        "nop", Hint, NOP, [];
    },
    ops! {
        "fadd", FpDataProc2, FADD, [Xd, Xn, Xm];
        "fsub", FpDataProc2, FSUB, [Xd, Xn, Xm];
        "fmul", FpDataProc2, FMUL, [Xd, Xn, Xm];
        "fdiv", FpDataProc2, FDIV, [Xd, Xn, Xm];
        "fmadd", FpDataProc3, FMADD, [Xd, Xn, Xm, Xa];
        "fmsub", FpDataProc3, FMSUB, [Xd, Xn, Xm, Xa];
        "fabs", FpDataProc1, FABS, [Xd, Xn];
        "fneg", FpDataProc1, FNEG, [Xd, Xn];
        "fsqrt", FpDataProc1, FSQRT, [Xd, Xn];
        "fcmp", FpCompare, FCMP, [Xn, Xm];
        "fcvtzs", FpInt, FCVTZS, [Xd, Xn];
        "fcvtzu", FpInt, FCVTZU, [Xd, Xn];
        "scvtf", FpInt, SCVTF, [Xd, Xn];
        "ucvtf", FpInt, UCVTF, [Xd, Xn];
    },
];

/// Call the form emitter for `def` with the gathered slots.
pub(super) fn encode(def: &OpDef, s: &Slots) -> Result<u32> {
    let op = def.opcode;
    match def.form {
        Form::AddSubImm => arm::add_sub_imm(op, s.d, s.a, s.imm),
        Form::LogicImm => arm::logic_imm(op, s.d, s.a, s.imm as u64),
        Form::AddSubReg | Form::LogicReg | Form::DataProc2 | Form::FpDataProc2 => {
            arm::rrr(op, s.d, s.a, s.b)
        }
        Form::MoveWide => arm::move_wide(op, s.d, s.imm, s.sh),
        Form::Bitfield => arm::bitfield(op, s.d, s.a, s.mb, s.me),
        Form::CondSelect => arm::cond_select(op, s.d, s.a, s.b, s.cond),
        Form::DataProc1 | Form::FpDataProc1 | Form::FpInt => arm::rr(op, s.d, s.a),
        Form::DataProc3 | Form::FpDataProc3 => arm::rrrr(op, s.d, s.a, s.b, s.c),
        Form::FpCompare => arm::rrr(op, 0, s.a, s.b),
        Form::LoadStore => arm::load_store(op, s.d, s.a, s.imm),
        Form::LoadStorePair => arm::load_store_pair(op, s.d, s.b, s.a, s.imm),
        Form::BranchImm => arm::branch_imm(op, s.imm),
        Form::CondBranch => arm::cond_branch(op, s.imm),
        Form::CompareBranch => arm::compare_branch(op, s.d, s.imm),
        Form::BranchReg => arm::branch_reg(op, s.a),
        Form::Exception => arm::exception(op, s.imm),
        Form::Hint => Ok(op),
        _ => Err(EncodeError::UnknownMnemonic(def.mnemonic.to_string())),
    }
}
