//! SPU mnemonic table and form dispatch for [`SpuAssembler::emit`].
//!
//! [`SpuAssembler::emit`]: super::SpuAssembler::emit

use super::opcodes::*;
use crate::error::{EncodeError, Result};
use crate::forms::{Form, spu};
use crate::table::{Field, OpDef, Slots};

macro_rules! ops {
    ($($m:literal, $form:ident, $op:expr, [$($f:ident),*];)*) => {
        &[$(OpDef::new($m, Form::$form, $op, &[$(Field::$f),*]),)*]
    };
}

pub static SPU_OPS: &[&[OpDef]] = &[
    ops! {
        "a", RR, A, [Rt, SpuRa, SpuRb];
        "ah", RR, AH, [Rt, SpuRa, SpuRb];
        "and", RR, AND, [Rt, SpuRa, SpuRb];
        "andc", RR, ANDC, [Rt, SpuRa, SpuRb];
        "bg", RR, BG, [Rt, SpuRa, SpuRb];
        "ceq", RR, CEQ, [Rt, SpuRa, SpuRb];
        "ceqb", RR, CEQB, [Rt, SpuRa, SpuRb];
        "ceqh", RR, CEQH, [Rt, SpuRa, SpuRb];
        "cg", RR, CG, [Rt, SpuRa, SpuRb];
        "cgt", RR, CGT, [Rt, SpuRa, SpuRb];
        "clgt", RR, CLGT, [Rt, SpuRa, SpuRb];
        "clz", RR, CLZ, [Rt, SpuRa];
        "eqv", RR, EQV, [Rt, SpuRa, SpuRb];
        "fa", RR, FA, [Rt, SpuRa, SpuRb];
        "fm", RR, FM, [Rt, SpuRa, SpuRb];
        "fs", RR, FS, [Rt, SpuRa, SpuRb];
        "lqx", RR, LQX, [Rt, SpuRa, SpuRb];
        "mpy", RR, MPY, [Rt, SpuRa, SpuRb];
        "mpyu", RR, MPYU, [Rt, SpuRa, SpuRb];
        "nand", RR, NAND, [Rt, SpuRa, SpuRb];
        "nor", RR, NOR, [Rt, SpuRa, SpuRb];
        "or", RR, OR, [Rt, SpuRa, SpuRb];
        "orc", RR, ORC, [Rt, SpuRa, SpuRb];
        "rot", RR, ROT, [Rt, SpuRa, SpuRb];
        "sf", RR, SF, [Rt, SpuRa, SpuRb];
        "sfh", RR, SFH, [Rt, SpuRa, SpuRb];
        "shl", RR, SHL, [Rt, SpuRa, SpuRb];
        "stqx", RR, STQX, [Rt, SpuRa, SpuRb];
        "xor", RR, XOR, [Rt, SpuRa, SpuRb];
        "bi", RR, BI, [SpuRa];
        "bisl", RR, BISL, [Rt, SpuRa];
        "biz", RR, BIZ, [Rt, SpuRa];
        "binz", RR, BINZ, [Rt, SpuRa];
        "lnop", RR, LNOP, [];
        "nop", RR, NOP, [];
    },
    ops! {
        "fma", RRR, FMA, [Rt, SpuRa, SpuRb, SpuRc];
        "fms", RRR, FMS, [Rt, SpuRa, SpuRb, SpuRc];
        "fnms", RRR, FNMS, [Rt, SpuRa, SpuRb, SpuRc];
        "mpya", RRR, MPYA, [Rt, SpuRa, SpuRb, SpuRc];
        "selb", RRR, SELB, [Rt, SpuRa, SpuRb, SpuRc];
        "shufb", RRR, SHUFB, [Rt, SpuRa, SpuRb, SpuRc];
    },
    ops! {
        "cbd", RI7, CBD, [Rt, I7, SpuRa];
        "cdd", RI7, CDD, [Rt, I7, SpuRa];
        "chd", RI7, CHD, [Rt, I7, SpuRa];
        "cwd", RI7, CWD, [Rt, I7, SpuRa];
        "roti", RI7, ROTI, [Rt, SpuRa, I7];
        "rotmai", RI7, ROTMAI, [Rt, SpuRa, I7];
        "rotmi", RI7, ROTMI, [Rt, SpuRa, I7];
        "rotqbyi", RI7, ROTQBYI, [Rt, SpuRa, I7];
        "shli", RI7, SHLI, [Rt, SpuRa, I7];
        "shlqbyi", RI7, SHLQBYI, [Rt, SpuRa, I7];
    },
    ops! {
        "cflts", RI8, CFLTS, [Rt, SpuRa, I8];
        "cfltu", RI8, CFLTU, [Rt, SpuRa, I8];
        "csflt", RI8, CSFLT, [Rt, SpuRa, I8];
        "cuflt", RI8, CUFLT, [Rt, SpuRa, I8];
    },
    ops! {
        "ahi", RI10, AHI, [Rt, SpuRa, I10];
        "ai", RI10, AI, [Rt, SpuRa, I10];
        "andbi", RI10, ANDBI, [Rt, SpuRa, I10];
        "andhi", RI10, ANDHI, [Rt, SpuRa, I10];
        "andi", RI10, ANDI, [Rt, SpuRa, I10];
        "ceqbi", RI10, CEQBI, [Rt, SpuRa, I10];
        "ceqhi", RI10, CEQHI, [Rt, SpuRa, I10];
        "ceqi", RI10, CEQI, [Rt, SpuRa, I10];
        "cgti", RI10, CGTI, [Rt, SpuRa, I10];
        "clgti", RI10, CLGTI, [Rt, SpuRa, I10];
        "lqd", RI10, LQD, [Rt, I10, SpuRa];
        "mpyi", RI10, MPYI, [Rt, SpuRa, I10];
        "mpyui", RI10, MPYUI, [Rt, SpuRa, I10];
        "orbi", RI10, ORBI, [Rt, SpuRa, I10];
        "orhi", RI10, ORHI, [Rt, SpuRa, I10];
        "ori", RI10, ORI, [Rt, SpuRa, I10];
        "sfhi", RI10, SFHI, [Rt, SpuRa, I10];
        "sfi", RI10, SFI, [Rt, SpuRa, I10];
        "stqd", RI10, STQD, [Rt, I10, SpuRa];
        "xori", RI10, XORI, [Rt, SpuRa, I10];
    },
    ops! {
        "br", RI16, BR, [Rel16];
        "bra", RI16, BRA, [Abs16];
        "brsl", RI16, BRSL, [Rt, Rel16];
        "brasl", RI16, BRASL, [Rt, Abs16];
        "brz", RI16, BRZ, [Rt, Rel16];
        "brnz", RI16, BRNZ, [Rt, Rel16];
        "brhz", RI16, BRHZ, [Rt, Rel16];
        "brhnz", RI16, BRHNZ, [Rt, Rel16];
        "fsmbi", RI16, FSMBI, [Rt, U16];
        "il", RI16, IL, [Rt, I16];
        "ilh", RI16, ILH, [Rt, U16];
        "ilhu", RI16, ILHU, [Rt, U16];
        "iohl", RI16, IOHL, [Rt, U16];
        "lqa", RI16, LQA, [Rt, I16];
        "lqr", RI16, LQR, [Rt, I16];
        "stqa", RI16, STQA, [Rt, I16];
        "stqr", RI16, STQR, [Rt, I16];
        "ila", RI18, ILA, [Rt, I18];
    },
];

pub(super) fn encode(def: &OpDef, s: &Slots) -> Result<u32> {
    let op = def.opcode;
    match def.form {
        Form::RR => spu::rr(op, s.d, s.a, s.b),
        Form::RRR => spu::rrr(op, s.d, s.a, s.b, s.c),
        Form::RI7 => spu::ri7(op, s.d, s.a, s.imm),
        Form::RI8 => spu::ri8(op, s.d, s.a, s.imm),
        Form::RI10 => spu::ri10(op, s.d, s.a, s.imm),
        Form::RI16 if def.has(Field::Rel16) || def.has(Field::Abs16) => {
            spu::ri16_branch(op, s.d, s.imm)
        }
        Form::RI16 if def.has(Field::U16) => spu::ri16_unsigned(op, s.d, s.imm),
        Form::RI16 => spu::ri16(op, s.d, s.imm),
        Form::RI18 => spu::ri18(op, s.d, s.imm),
        _ => Err(EncodeError::UnknownMnemonic(def.mnemonic.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::lookup;

    #[test]
    fn test_mnemonics_unique() {
        let mut seen = std::collections::HashSet::new();
        for def in SPU_OPS.iter().flat_map(|g| g.iter()) {
            assert!(seen.insert(def.mnemonic), "duplicate {}", def.mnemonic);
        }
    }

    #[test]
    fn test_ppc_forms_rejected() {
        let def = OpDef::new("addi", Form::D, 0x3800_0000, &[]);
        assert!(encode(&def, &Slots::default()).is_err());
        assert!(lookup(SPU_OPS, "lr").is_err());
    }
}
