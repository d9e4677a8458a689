//! PPU instruction decoder.
//!
//! Dispatch is on the primary opcode, then on the extended-opcode field the
//! primary opcode's form defines. XO-form extended opcodes (9 bits, with the
//! overflow-enable bit above them) are checked before X-form ones on
//! primary opcode 31.

use super::{PpuInstr, PpuOpcode};
use crate::DecodeError;

use PpuOpcode as Op;

/// Decode a PPU instruction word.
pub fn decode_ppu(instr: PpuInstr) -> Result<PpuOpcode, DecodeError> {
    let op = match instr.opcd() {
        2 => Some(Op::Tdi),
        3 => Some(Op::Twi),
        4 => decode_vector(instr),
        7 => Some(Op::Mulli),
        8 => Some(Op::Subfic),
        10 => Some(Op::Cmpli),
        11 => Some(Op::Cmpi),
        12 => Some(Op::Addic),
        13 => Some(Op::AddicRc),
        14 => Some(Op::Addi),
        15 => Some(Op::Addis),
        16 => Some(Op::Bc),
        17 if instr.bits(30, 30) == 1 => Some(Op::Sc),
        18 => Some(Op::B),
        19 => decode_19(instr),
        20 => Some(Op::Rlwimi),
        21 => Some(Op::Rlwinm),
        23 => Some(Op::Rlwnm),
        24 => Some(Op::Ori),
        25 => Some(Op::Oris),
        26 => Some(Op::Xori),
        27 => Some(Op::Xoris),
        28 => Some(Op::AndiRc),
        29 => Some(Op::AndisRc),
        30 => decode_30(instr),
        31 => decode_31(instr),
        32 => Some(Op::Lwz),
        33 => Some(Op::Lwzu),
        34 => Some(Op::Lbz),
        35 => Some(Op::Lbzu),
        36 => Some(Op::Stw),
        37 => Some(Op::Stwu),
        38 => Some(Op::Stb),
        39 => Some(Op::Stbu),
        40 => Some(Op::Lhz),
        41 => Some(Op::Lhzu),
        42 => Some(Op::Lha),
        43 => Some(Op::Lhau),
        44 => Some(Op::Sth),
        45 => Some(Op::Sthu),
        46 => Some(Op::Lmw),
        47 => Some(Op::Stmw),
        48 => Some(Op::Lfs),
        49 => Some(Op::Lfsu),
        50 => Some(Op::Lfd),
        51 => Some(Op::Lfdu),
        52 => Some(Op::Stfs),
        53 => Some(Op::Stfsu),
        54 => Some(Op::Stfd),
        55 => Some(Op::Stfdu),
        58 => match instr.xo_ds() {
            0 => Some(Op::Ld),
            1 => Some(Op::Ldu),
            2 => Some(Op::Lwa),
            _ => None,
        },
        59 => decode_59(instr),
        62 => match instr.xo_ds() {
            0 => Some(Op::Std),
            1 => Some(Op::Stdu),
            _ => None,
        },
        63 => decode_63(instr),
        _ => None,
    };
    op.ok_or(DecodeError::Unknown(instr.raw()))
}

fn decode_19(instr: PpuInstr) -> Option<PpuOpcode> {
    Some(match instr.xo10() {
        0 => Op::Mcrf,
        16 => Op::Bclr,
        33 => Op::Crnor,
        129 => Op::Crandc,
        150 => Op::Isync,
        193 => Op::Crxor,
        225 => Op::Crnand,
        257 => Op::Crand,
        289 => Op::Creqv,
        417 => Op::Crorc,
        449 => Op::Cror,
        528 => Op::Bcctr,
        _ => return None,
    })
}

fn decode_30(instr: PpuInstr) -> Option<PpuOpcode> {
    match instr.xo_md() {
        0 => Some(Op::Rldicl),
        1 => Some(Op::Rldicr),
        2 => Some(Op::Rldic),
        3 => Some(Op::Rldimi),
        4 => match instr.xo_mds() {
            8 => Some(Op::Rldcl),
            9 => Some(Op::Rldcr),
            _ => None,
        },
        _ => None,
    }
}

fn decode_31(instr: PpuInstr) -> Option<PpuOpcode> {
    let xo = match instr.xo9() {
        266 => Some(Op::Add),
        10 => Some(Op::Addc),
        138 => Some(Op::Adde),
        234 => Some(Op::Addme),
        202 => Some(Op::Addze),
        489 => Some(Op::Divd),
        457 => Some(Op::Divdu),
        491 => Some(Op::Divw),
        459 => Some(Op::Divwu),
        73 => Some(Op::Mulhd),
        9 => Some(Op::Mulhdu),
        75 => Some(Op::Mulhw),
        11 => Some(Op::Mulhwu),
        233 => Some(Op::Mulld),
        235 => Some(Op::Mullw),
        104 => Some(Op::Neg),
        40 => Some(Op::Subf),
        8 => Some(Op::Subfc),
        136 => Some(Op::Subfe),
        232 => Some(Op::Subfme),
        200 => Some(Op::Subfze),
        _ => None,
    };
    if xo.is_some() {
        return xo;
    }

    Some(match instr.xo10() {
        0 => Op::Cmp,
        4 => Op::Tw,
        19 => Op::Mfcr,
        20 => Op::Lwarx,
        21 => Op::Ldx,
        23 => Op::Lwzx,
        24 => Op::Slw,
        26 => Op::Cntlzw,
        27 => Op::Sld,
        28 => Op::And,
        32 => Op::Cmpl,
        53 => Op::Ldux,
        54 => Op::Dcbst,
        55 => Op::Lwzux,
        58 => Op::Cntlzd,
        60 => Op::Andc,
        68 => Op::Td,
        83 => Op::Mfmsr,
        84 => Op::Ldarx,
        86 => Op::Dcbf,
        87 => Op::Lbzx,
        103 => Op::Lvx,
        119 => Op::Lbzux,
        124 => Op::Nor,
        144 => Op::Mtcrf,
        149 => Op::Stdx,
        150 if instr.rc() => Op::StwcxRc,
        151 => Op::Stwx,
        181 => Op::Stdux,
        183 => Op::Stwux,
        214 if instr.rc() => Op::StdcxRc,
        215 => Op::Stbx,
        231 => Op::Stvx,
        246 => Op::Dcbtst,
        247 => Op::Stbux,
        278 => Op::Dcbt,
        279 => Op::Lhzx,
        284 => Op::Eqv,
        311 => Op::Lhzux,
        316 => Op::Xor,
        339 => Op::Mfspr,
        341 => Op::Lwax,
        343 => Op::Lhax,
        371 => Op::Mftb,
        373 => Op::Lwaux,
        375 => Op::Lhaux,
        407 => Op::Sthx,
        412 => Op::Orc,
        439 => Op::Sthux,
        444 => Op::Or,
        467 => Op::Mtspr,
        476 => Op::Nand,
        532 => Op::Ldbrx,
        534 => Op::Lwbrx,
        535 => Op::Lfsx,
        536 => Op::Srw,
        539 => Op::Srd,
        567 => Op::Lfsux,
        598 => Op::Sync,
        599 => Op::Lfdx,
        631 => Op::Lfdux,
        660 => Op::Stdbrx,
        662 => Op::Stwbrx,
        663 => Op::Stfsx,
        695 => Op::Stfsux,
        727 => Op::Stfdx,
        759 => Op::Stfdux,
        790 => Op::Lhbrx,
        792 => Op::Sraw,
        794 => Op::Srad,
        824 => Op::Srawi,
        826 | 827 => Op::Sradi,
        854 => Op::Eieio,
        918 => Op::Sthbrx,
        922 => Op::Extsh,
        954 => Op::Extsb,
        982 => Op::Icbi,
        983 => Op::Stfiwx,
        986 => Op::Extsw,
        1014 => Op::Dcbz,
        _ => return None,
    })
}

fn decode_59(instr: PpuInstr) -> Option<PpuOpcode> {
    Some(match instr.xo5() {
        18 => Op::Fdivs,
        20 => Op::Fsubs,
        21 => Op::Fadds,
        22 => Op::Fsqrts,
        24 => Op::Fres,
        25 => Op::Fmuls,
        28 => Op::Fmsubs,
        29 => Op::Fmadds,
        30 => Op::Fnmsubs,
        31 => Op::Fnmadds,
        _ => return None,
    })
}

fn decode_63(instr: PpuInstr) -> Option<PpuOpcode> {
    let a_form = match instr.xo5() {
        18 => Some(Op::Fdiv),
        20 => Some(Op::Fsub),
        21 => Some(Op::Fadd),
        22 => Some(Op::Fsqrt),
        23 => Some(Op::Fsel),
        25 => Some(Op::Fmul),
        26 => Some(Op::Frsqrte),
        28 => Some(Op::Fmsub),
        29 => Some(Op::Fmadd),
        30 => Some(Op::Fnmsub),
        31 => Some(Op::Fnmadd),
        _ => None,
    };
    if a_form.is_some() {
        return a_form;
    }

    Some(match instr.xo10() {
        0 => Op::Fcmpu,
        12 => Op::Frsp,
        14 => Op::Fctiw,
        15 => Op::Fctiwz,
        32 => Op::Fcmpo,
        38 => Op::Mtfsb1,
        40 => Op::Fneg,
        64 => Op::Mcrfs,
        70 => Op::Mtfsb0,
        72 => Op::Fmr,
        134 => Op::Mtfsfi,
        136 => Op::Fnabs,
        264 => Op::Fabs,
        583 => Op::Mffs,
        711 => Op::Mtfsf,
        814 => Op::Fctid,
        815 => Op::Fctidz,
        846 => Op::Fcfid,
        _ => return None,
    })
}

fn decode_vector(instr: PpuInstr) -> Option<PpuOpcode> {
    let va = match instr.xo_va() {
        42 => Some(Op::Vsel),
        43 => Some(Op::Vperm),
        46 => Some(Op::Vmaddfp),
        _ => None,
    };
    if va.is_some() {
        return va;
    }

    Some(match instr.xo_vx() {
        0 => Op::Vaddubm,
        64 => Op::Vadduhm,
        128 => Op::Vadduwm,
        908 => Op::Vspltisw,
        1028 => Op::Vand,
        1092 => Op::Vandc,
        1152 => Op::Vsubuwm,
        1156 => Op::Vor,
        1220 => Op::Vxor,
        1284 => Op::Vnor,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(raw: u32) -> Result<PpuOpcode, DecodeError> {
        decode_ppu(PpuInstr(raw))
    }

    #[test]
    fn test_decode_integer() {
        assert_eq!(dec(0x7C6E_7A15), Ok(Op::Add));
        assert_eq!(dec(0x7C6E_7E15), Ok(Op::Add)); // addo.
        assert_eq!(dec(0x3861_FFF0), Ok(Op::Addi));
        assert_eq!(dec(0x7C83_2378), Ok(Op::Or));
        assert_eq!(dec(0x5463_103A), Ok(Op::Rlwinm));
        assert_eq!(dec(0x7883_F842), Ok(Op::Rldicl));
        assert_eq!(dec(0x7C03_2000), Ok(Op::Cmp));
        assert_eq!(dec(0x2803_0000), Ok(Op::Cmpli));
    }

    #[test]
    fn test_decode_branch_and_system() {
        assert_eq!(dec(0x4E80_0020), Ok(Op::Bclr));
        assert_eq!(dec(0x4E80_0420), Ok(Op::Bcctr));
        assert_eq!(dec(0x4BFF_FFF8), Ok(Op::B));
        assert_eq!(dec(0x4182_000C), Ok(Op::Bc));
        assert_eq!(dec(0x4400_0002), Ok(Op::Sc));
        assert_eq!(dec(0x7C08_02A6), Ok(Op::Mfspr));
        assert_eq!(dec(0x7C08_03A6), Ok(Op::Mtspr));
        assert_eq!(dec(0x7C00_04AC), Ok(Op::Sync));
        assert_eq!(dec(0x4C00_012C), Ok(Op::Isync));
    }

    #[test]
    fn test_decode_memory() {
        assert_eq!(dec(0x8061_0008), Ok(Op::Lwz));
        assert_eq!(dec(0xF821_FF91), Ok(Op::Stdu));
        assert_eq!(dec(0xE861_0000), Ok(Op::Ld));
        assert_eq!(dec(0xE861_0002), Ok(Op::Lwa));
        assert_eq!(dec(0x7C60_2028), Ok(Op::Lwarx));
        assert_eq!(dec(0x7C60_212D), Ok(Op::StwcxRc));
        assert_eq!(dec(0x7C60_212C), Err(DecodeError::Unknown(0x7C60_212C)));
    }

    #[test]
    fn test_decode_float_and_vector() {
        assert_eq!(dec(0xFC21_102A), Ok(Op::Fadd));
        assert_eq!(dec(0xEC21_102A), Ok(Op::Fadds));
        assert_eq!(dec(0xFC20_0890), Ok(Op::Fmr));
        assert_eq!(dec(0xFC01_1000), Ok(Op::Fcmpu));
        assert_eq!(dec(0x1021_1484), Ok(Op::Vor));
        assert_eq!(dec(0x1021_14C4), Ok(Op::Vxor));
        assert_eq!(dec(0x1021_10EB), Ok(Op::Vperm));
    }

    #[test]
    fn test_unknown_primary() {
        assert_eq!(dec(0), Err(DecodeError::Unknown(0)));
        assert_eq!(dec(0x0400_0000), Err(DecodeError::Unknown(0x0400_0000)));
    }
}
