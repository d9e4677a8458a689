//! SPU instruction decoder.
//!
//! SPU opcodes are prefix codes of different lengths, so the decoder tries
//! each form's opcode field from the shortest (RRR, 4 bits) to the longest
//! (RR and RI7, 11 bits). No opcode of one length is a prefix of another.

use super::{SpuInstr, SpuOpcode};
use crate::DecodeError;

use SpuOpcode as Op;

/// Decode an SPU instruction word.
pub fn decode_spu(instr: SpuInstr) -> Result<SpuOpcode, DecodeError> {
    decode_rrr(instr)
        .or_else(|| decode_ri18(instr))
        .or_else(|| decode_ri10(instr))
        .or_else(|| decode_ri16(instr))
        .or_else(|| decode_rr(instr))
        .ok_or(DecodeError::Unknown(instr.raw()))
}

const fn decode_rrr(instr: SpuInstr) -> Option<SpuOpcode> {
    match instr.op4() {
        0x8 => Some(Op::Selb),
        _ => None,
    }
}

const fn decode_ri18(instr: SpuInstr) -> Option<SpuOpcode> {
    match instr.op7() {
        0x08 => Some(Op::Hbra),
        0x09 => Some(Op::Hbrr),
        0x21 => Some(Op::Ila),
        _ => None,
    }
}

const fn decode_ri10(instr: SpuInstr) -> Option<SpuOpcode> {
    Some(match instr.op8() {
        0x04 => Op::Ori,
        0x0C => Op::Sfi,
        0x14 => Op::Andi,
        0x1C => Op::Ai,
        0x24 => Op::Stqd,
        0x34 => Op::Lqd,
        0x4C => Op::Cgti,
        0x5C => Op::Clgti,
        0x7C => Op::Ceqi,
        _ => return None,
    })
}

const fn decode_ri16(instr: SpuInstr) -> Option<SpuOpcode> {
    Some(match instr.op9() {
        0x40 => Op::Brz,
        0x41 => Op::Stqa,
        0x42 => Op::Brnz,
        0x60 => Op::Bra,
        0x61 => Op::Lqa,
        0x62 => Op::Brasl,
        0x64 => Op::Br,
        0x66 => Op::Brsl,
        0x81 => Op::Il,
        0x82 => Op::Ilhu,
        0x83 => Op::Ilh,
        0xC1 => Op::Iohl,
        _ => return None,
    })
}

const fn decode_rr(instr: SpuInstr) -> Option<SpuOpcode> {
    Some(match instr.op11() {
        0x000 => Op::Stop,
        0x001 => Op::Lnop,
        0x040 => Op::Sf,
        0x041 => Op::Or,
        0x049 => Op::Nor,
        0x07B => Op::Shli,
        0x0C0 => Op::A,
        0x0C1 => Op::And,
        0x128 => Op::Biz,
        0x129 => Op::Binz,
        0x144 => Op::Stqx,
        0x1A8 => Op::Bi,
        0x1A9 => Op::Bisl,
        0x1AC => Op::Hbr,
        0x1C4 => Op::Lqx,
        0x201 => Op::Nop,
        0x240 => Op::Cgt,
        0x241 => Op::Xor,
        0x2C0 => Op::Clgt,
        0x2C1 => Op::Andc,
        0x3C0 => Op::Ceq,
        _ => return None,
    })
}
