//! PPC mnemonic table and form dispatch for [`PpcAssembler::emit`].
//!
//! [`PpcAssembler::emit`]: super::PpcAssembler::emit

use super::opcodes::*;
use crate::error::{EncodeError, Result};
use crate::forms::{Form, ppc};
use crate::table::{Field, OpDef, Slots};

macro_rules! def {
    ($m:expr, $form:ident, $op:expr, [$($f:ident),*]) => {
        OpDef::new($m, Form::$form, $op, &[$(Field::$f),*])
    };
}

/// Single mnemonic.
macro_rules! one {
    ($m:literal, $form:ident, $op:expr, [$($f:ident),*]) => {
        &[def!($m, $form, $op, [$($f),*])]
    };
}

/// Mnemonic and its record form `m.`.
macro_rules! rc {
    ($m:literal, $form:ident, $op:expr, [$($f:ident),*]) => {
        &[
            def!($m, $form, $op, [$($f),*]),
            def!(concat!($m, "."), $form, $op | RC, [$($f),*]),
        ]
    };
}

/// XO-form mnemonic with `.`, `o`, and `o.` variants.
macro_rules! xo {
    ($m:literal, $op:expr, [$($f:ident),*]) => {
        &[
            def!($m, XO, $op, [$($f),*]),
            def!(concat!($m, "."), XO, $op | RC, [$($f),*]),
            def!(concat!($m, "o"), XO, $op | OE, [$($f),*]),
            def!(concat!($m, "o."), XO, $op | OE | RC, [$($f),*]),
        ]
    };
}

/// Branch mnemonic with `l`, `a`, and `la` variants.
macro_rules! branch {
    ($m:literal, $form:ident, $op:expr, [$($f:ident),*]) => {
        &[
            def!($m, $form, $op, [$($f),*]),
            def!(concat!($m, "l"), $form, $op | LK, [$($f),*]),
            def!(concat!($m, "a"), $form, $op | AA, [$($f),*]),
            def!(concat!($m, "la"), $form, $op | AA | LK, [$($f),*]),
        ]
    };
}

pub static PPC_OPS: &[&[OpDef]] = &[
    // Integer arithmetic
    xo!("add", ADD, [Rd, Ra, Rb]),
    xo!("addc", ADDC, [Rd, Ra, Rb]),
    xo!("adde", ADDE, [Rd, Ra, Rb]),
    one!("addi", D, ADDI, [Rd, Ra, Simm]),
    one!("addic", D, ADDIC, [Rd, Ra, Simm]),
    one!("addic.", D, ADDIC_RC, [Rd, Ra, Simm]),
    one!("addis", D, ADDIS, [Rd, Ra, Simm]),
    xo!("addme", ADDME, [Rd, Ra]),
    xo!("addze", ADDZE, [Rd, Ra]),
    xo!("divd", DIVD, [Rd, Ra, Rb]),
    xo!("divdu", DIVDU, [Rd, Ra, Rb]),
    xo!("divw", DIVW, [Rd, Ra, Rb]),
    xo!("divwu", DIVWU, [Rd, Ra, Rb]),
    rc!("mulhd", XO, MULHD, [Rd, Ra, Rb]),
    rc!("mulhdu", XO, MULHDU, [Rd, Ra, Rb]),
    rc!("mulhw", XO, MULHW, [Rd, Ra, Rb]),
    rc!("mulhwu", XO, MULHWU, [Rd, Ra, Rb]),
    xo!("mulld", MULLD, [Rd, Ra, Rb]),
    one!("mulli", D, MULLI, [Rd, Ra, Simm]),
    xo!("mullw", MULLW, [Rd, Ra, Rb]),
    xo!("neg", NEG, [Rd, Ra]),
    xo!("subf", SUBF, [Rd, Ra, Rb]),
    xo!("subfc", SUBFC, [Rd, Ra, Rb]),
    xo!("subfe", SUBFE, [Rd, Ra, Rb]),
    one!("subfic", D, SUBFIC, [Rd, Ra, Simm]),
    xo!("subfme", SUBFME, [Rd, Ra]),
    xo!("subfze", SUBFZE, [Rd, Ra]),
    // Logical (destination is rA, source rS sits in the D slot)
    rc!("and", X, AND, [Ra, Rd, Rb]),
    rc!("andc", X, ANDC, [Ra, Rd, Rb]),
    one!("andi.", D, ANDI_RC, [Ra, Rd, Uimm]),
    one!("andis.", D, ANDIS_RC, [Ra, Rd, Uimm]),
    rc!("cntlzd", X, CNTLZD, [Ra, Rd]),
    rc!("cntlzw", X, CNTLZW, [Ra, Rd]),
    rc!("eqv", X, EQV, [Ra, Rd, Rb]),
    rc!("extsb", X, EXTSB, [Ra, Rd]),
    rc!("extsh", X, EXTSH, [Ra, Rd]),
    rc!("extsw", X, EXTSW, [Ra, Rd]),
    rc!("nand", X, NAND, [Ra, Rd, Rb]),
    rc!("nor", X, NOR, [Ra, Rd, Rb]),
    rc!("or", X, OR, [Ra, Rd, Rb]),
    rc!("orc", X, ORC, [Ra, Rd, Rb]),
    one!("ori", D, ORI, [Ra, Rd, Uimm]),
    one!("oris", D, ORIS, [Ra, Rd, Uimm]),
    rc!("xor", X, XOR, [Ra, Rd, Rb]),
    one!("xori", D, XORI, [Ra, Rd, Uimm]),
    one!("xoris", D, XORIS, [Ra, Rd, Uimm]),
    // Shift and rotate
    rc!("rldic", MD, RLDIC, [Ra, Rd, Sh6, Mb6]),
    rc!("rldicl", MD, RLDICL, [Ra, Rd, Sh6, Mb6]),
    rc!("rldicr", MD, RLDICR, [Ra, Rd, Sh6, Mb6]),
    rc!("rldimi", MD, RLDIMI, [Ra, Rd, Sh6, Mb6]),
    rc!("rlwimi", M, RLWIMI, [Ra, Rd, Sh, Mb, Me]),
    rc!("rlwinm", M, RLWINM, [Ra, Rd, Sh, Mb, Me]),
    rc!("rlwnm", M, RLWNM, [Ra, Rd, Rb, Mb, Me]),
    rc!("sld", X, SLD, [Ra, Rd, Rb]),
    rc!("slw", X, SLW, [Ra, Rd, Rb]),
    rc!("srad", X, SRAD, [Ra, Rd, Rb]),
    rc!("sradi", XS, SRADI, [Ra, Rd, Sh6]),
    rc!("sraw", X, SRAW, [Ra, Rd, Rb]),
    rc!("srawi", X, SRAWI, [Ra, Rd, Sh]),
    rc!("srd", X, SRD, [Ra, Rd, Rb]),
    rc!("srw", X, SRW, [Ra, Rd, Rb]),
    // Compare and trap
    one!("cmp", X, CMP, [Crfd, L, Ra, Rb]),
    one!("cmpi", D, CMPI, [Crfd, L, Ra, Simm]),
    one!("cmpl", X, CMPL, [Crfd, L, Ra, Rb]),
    one!("cmpli", D, CMPLI, [Crfd, L, Ra, Uimm]),
    one!("td", X, TD, [To, Ra, Rb]),
    one!("tdi", D, TDI, [To, Ra, Simm]),
    one!("tw", X, TW, [To, Ra, Rb]),
    one!("twi", D, TWI, [To, Ra, Simm]),
    // Branch and condition register
    branch!("b", I, B, [Li]),
    branch!("bc", B, BC, [Bo, Bi, Bd]),
    &[
        def!("bcctr", XL, BCCTR, [Bo, Bi, Bh]),
        def!("bcctrl", XL, BCCTR | LK, [Bo, Bi, Bh]),
        def!("bclr", XL, BCLR, [Bo, Bi, Bh]),
        def!("bclrl", XL, BCLR | LK, [Bo, Bi, Bh]),
    ],
    one!("crand", XL, CRAND, [Crbd, Crba, Crbb]),
    one!("crandc", XL, CRANDC, [Crbd, Crba, Crbb]),
    one!("creqv", XL, CREQV, [Crbd, Crba, Crbb]),
    one!("crnand", XL, CRNAND, [Crbd, Crba, Crbb]),
    one!("crnor", XL, CRNOR, [Crbd, Crba, Crbb]),
    one!("cror", XL, CROR, [Crbd, Crba, Crbb]),
    one!("crorc", XL, CRORC, [Crbd, Crba, Crbb]),
    one!("crxor", XL, CRXOR, [Crbd, Crba, Crbb]),
    one!("mcrf", XL, MCRF, [Crfd, Crfs]),
    // System
    one!("dcbf", X, DCBF, [Ra, Rb]),
    one!("dcbst", X, DCBST, [Ra, Rb]),
    one!("dcbt", X, DCBT, [Ra, Rb]),
    one!("dcbtst", X, DCBTST, [Ra, Rb]),
    one!("dcbz", X, DCBZ, [Ra, Rb]),
    one!("eieio", X, EIEIO, []),
    one!("icbi", X, ICBI, [Ra, Rb]),
    one!("isync", XL, ISYNC, []),
    one!("mfcr", X, MFCR, [Rd]),
    one!("mfspr", XFX, MFSPR, [Rd, Spr]),
    one!("mftb", XFX, MFTB, [Rd, Spr]),
    one!("mtcrf", XFX, MTCRF, [Crm, Rd]),
    one!("mtspr", XFX, MTSPR, [Spr, Rd]),
    one!("sc", SC, SC, []),
    one!("sync", X, SYNC, []),
    // Load and store
    one!("lbz", D, LBZ, [Rd, Disp, Ra]),
    one!("lbzu", D, LBZU, [Rd, Disp, Ra]),
    one!("lbzx", X, LBZX, [Rd, Ra, Rb]),
    one!("ld", DS, LD, [Rd, Ds, Ra]),
    one!("ldarx", X, LDARX, [Rd, Ra, Rb]),
    one!("ldu", DS, LDU, [Rd, Ds, Ra]),
    one!("ldx", X, LDX, [Rd, Ra, Rb]),
    one!("lha", D, LHA, [Rd, Disp, Ra]),
    one!("lhau", D, LHAU, [Rd, Disp, Ra]),
    one!("lhax", X, LHAX, [Rd, Ra, Rb]),
    one!("lhz", D, LHZ, [Rd, Disp, Ra]),
    one!("lhzu", D, LHZU, [Rd, Disp, Ra]),
    one!("lhzx", X, LHZX, [Rd, Ra, Rb]),
    one!("lmw", D, LMW, [Rd, Disp, Ra]),
    one!("lwa", DS, LWA, [Rd, Ds, Ra]),
    one!("lwarx", X, LWARX, [Rd, Ra, Rb]),
    one!("lwax", X, LWAX, [Rd, Ra, Rb]),
    one!("lwbrx", X, LWBRX, [Rd, Ra, Rb]),
    one!("lwz", D, LWZ, [Rd, Disp, Ra]),
    one!("lwzu", D, LWZU, [Rd, Disp, Ra]),
    one!("lwzx", X, LWZX, [Rd, Ra, Rb]),
    one!("stb", D, STB, [Rd, Disp, Ra]),
    one!("stbu", D, STBU, [Rd, Disp, Ra]),
    one!("stbx", X, STBX, [Rd, Ra, Rb]),
    one!("std", DS, STD, [Rd, Ds, Ra]),
    one!("stdcx.", X, STDCX_RC, [Rd, Ra, Rb]),
    one!("stdu", DS, STDU, [Rd, Ds, Ra]),
    one!("stdx", X, STDX, [Rd, Ra, Rb]),
    one!("sth", D, STH, [Rd, Disp, Ra]),
    one!("sthu", D, STHU, [Rd, Disp, Ra]),
    one!("sthx", X, STHX, [Rd, Ra, Rb]),
    one!("stmw", D, STMW, [Rd, Disp, Ra]),
    one!("stw", D, STW, [Rd, Disp, Ra]),
    one!("stwbrx", X, STWBRX, [Rd, Ra, Rb]),
    one!("stwcx.", X, STWCX_RC, [Rd, Ra, Rb]),
    one!("stwu", D, STWU, [Rd, Disp, Ra]),
    one!("stwx", X, STWX, [Rd, Ra, Rb]),
    // Floating point
    rc!("fabs", X, FABS, [Rd, Rb]),
    rc!("fadd", A, FADD, [Rd, Ra, Rb]),
    rc!("fadds", A, FADDS, [Rd, Ra, Rb]),
    rc!("fcfid", X, FCFID, [Rd, Rb]),
    one!("fcmpo", X, FCMPO, [Crfd, Ra, Rb]),
    one!("fcmpu", X, FCMPU, [Crfd, Ra, Rb]),
    rc!("fctid", X, FCTID, [Rd, Rb]),
    rc!("fctidz", X, FCTIDZ, [Rd, Rb]),
    rc!("fctiw", X, FCTIW, [Rd, Rb]),
    rc!("fctiwz", X, FCTIWZ, [Rd, Rb]),
    rc!("fdiv", A, FDIV, [Rd, Ra, Rb]),
    rc!("fdivs", A, FDIVS, [Rd, Ra, Rb]),
    rc!("fmadd", A, FMADD, [Rd, Ra, Rc, Rb]),
    rc!("fmr", X, FMR, [Rd, Rb]),
    rc!("fmsub", A, FMSUB, [Rd, Ra, Rc, Rb]),
    rc!("fmul", A, FMUL, [Rd, Ra, Rc]),
    rc!("fmuls", A, FMULS, [Rd, Ra, Rc]),
    rc!("fnabs", X, FNABS, [Rd, Rb]),
    rc!("fneg", X, FNEG, [Rd, Rb]),
    rc!("fnmadd", A, FNMADD, [Rd, Ra, Rc, Rb]),
    rc!("fnmsub", A, FNMSUB, [Rd, Ra, Rc, Rb]),
    rc!("frsp", X, FRSP, [Rd, Rb]),
    rc!("fsel", A, FSEL, [Rd, Ra, Rc, Rb]),
    rc!("fsqrt", A, FSQRT, [Rd, Rb]),
    rc!("fsub", A, FSUB, [Rd, Ra, Rb]),
    rc!("fsubs", A, FSUBS, [Rd, Ra, Rb]),
    one!("lfd", D, LFD, [Rd, Disp, Ra]),
    one!("lfdu", D, LFDU, [Rd, Disp, Ra]),
    one!("lfdx", X, LFDX, [Rd, Ra, Rb]),
    one!("lfs", D, LFS, [Rd, Disp, Ra]),
    one!("lfsu", D, LFSU, [Rd, Disp, Ra]),
    one!("lfsx", X, LFSX, [Rd, Ra, Rb]),
    rc!("mffs", X, MFFS, [Rd]),
    one!("stfd", D, STFD, [Rd, Disp, Ra]),
    one!("stfdu", D, STFDU, [Rd, Disp, Ra]),
    one!("stfdx", X, STFDX, [Rd, Ra, Rb]),
    one!("stfs", D, STFS, [Rd, Disp, Ra]),
    one!("stfsu", D, STFSU, [Rd, Disp, Ra]),
    one!("stfsx", X, STFSX, [Rd, Ra, Rb]),
    // Vector
    one!("lvx", X, LVX, [Rd, Ra, Rb]),
    one!("stvx", X, STVX, [Rd, Ra, Rb]),
    one!("vaddubm", VX, VADDUBM, [Rd, Ra, Rb]),
    one!("vadduhm", VX, VADDUHM, [Rd, Ra, Rb]),
    one!("vadduwm", VX, VADDUWM, [Rd, Ra, Rb]),
    one!("vand", VX, VAND, [Rd, Ra, Rb]),
    one!("vandc", VX, VANDC, [Rd, Ra, Rb]),
    one!("vmaddfp", VA, VMADDFP, [Rd, Ra, Rc, Rb]),
    one!("vnor", VX, VNOR, [Rd, Ra, Rb]),
    one!("vor", VX, VOR, [Rd, Ra, Rb]),
    one!("vperm", VA, VPERM, [Rd, Ra, Rb, Rc]),
    one!("vsel", VA, VSEL, [Rd, Ra, Rb, Rc]),
    one!("vspltisw", VX, VSPLTISW, [Rd, Vsimm]),
    one!("vsubuwm", VX, VSUBUWM, [Rd, Ra, Rb]),
    one!("vxor", VX, VXOR, [Rd, Ra, Rb]),
];

/// Call the form emitter for `def` with the gathered slots.
pub(super) fn encode(def: &OpDef, s: &Slots) -> Result<u32> {
    let op = def.opcode;
    match def.form {
        Form::I => ppc::i(op, s.imm),
        Form::B => ppc::b(op, s.d, s.a, s.imm),
        Form::SC => Ok(ppc::sc(op)),
        Form::D if def.has(Field::Uimm) => ppc::d_unsigned(op, s.d, s.a, s.imm),
        Form::D => ppc::d_signed(op, s.d, s.a, s.imm),
        Form::DS => ppc::ds(op, s.d, s.a, s.imm),
        Form::X if def.has(Field::Sh) => ppc::x(op, s.d, s.a, s.sh),
        Form::X => ppc::x(op, s.d, s.a, s.b),
        Form::XO => ppc::xo(op, s.d, s.a, s.b),
        Form::XL => ppc::xl(op, s.d, s.a, s.b),
        Form::XFX if def.has(Field::Crm) => ppc::xfx_crm(op, s.crm, s.d),
        Form::XFX => ppc::xfx(op, s.d, s.spr),
        Form::A => ppc::a(op, s.d, s.a, s.b, s.c),
        Form::M if def.has(Field::Rb) => ppc::m_reg(op, s.d, s.a, s.b, s.mb, s.me),
        Form::M => ppc::m(op, s.d, s.a, s.sh, s.mb, s.me),
        Form::MD => ppc::md(op, s.d, s.a, s.sh, s.mb),
        Form::XS => ppc::xs(op, s.d, s.a, s.sh),
        Form::VA => ppc::va(op, s.d, s.a, s.b, s.c),
        Form::VX if def.has(Field::Vsimm) => ppc::vx_simm(op, s.d, s.imm),
        Form::VX => ppc::vx(op, s.d, s.a, s.b),
        _ => Err(EncodeError::UnknownMnemonic(def.mnemonic.to_string())),
    }
}
