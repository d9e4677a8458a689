use super::*;
use crate::error::EncodeError;

fn assemble(f: impl FnOnce(&mut ArmAssembler<'_>) -> Result<()>) -> Vec<u32> {
    let mut mem = [0u8; 128];
    let mut asm = ArmAssembler::new(&mut mem);
    f(&mut asm).unwrap();
    let size = asm.finalize().unwrap();
    asm.code()[..size]
        .chunks_exact(4)
        .map(|w| u32::from_le_bytes([w[0], w[1], w[2], w[3]]))
        .collect()
}

fn one(f: impl FnOnce(&mut ArmAssembler<'_>) -> Result<()>) -> u32 {
    let words = assemble(f);
    assert_eq!(words.len(), 1);
    words[0]
}

const X0: Reg = Reg::x(0);
const X1: Reg = Reg::x(1);
const X2: Reg = Reg::x(2);
const W0: Reg = Reg::w(0);
const W1: Reg = Reg::w(1);
const W2: Reg = Reg::w(2);

#[test]
fn test_known_encodings() {
    assert_eq!(one(|a| a.add_imm(X0, X1, 1)), 0x9100_0420);
    assert_eq!(one(|a| a.sub_imm(Reg::SP, Reg::SP, 16)), 0xD100_43FF);
    assert_eq!(one(|a| a.add(X0, X1, X2)), 0x8B02_0020);
    assert_eq!(one(|a| a.mov(X0, X1)), 0xAA01_03E0);
    assert_eq!(one(|a| a.neg(X0, X1)), 0xCB01_03E0);
    assert_eq!(one(|a| a.cmp_imm(X0, 5)), 0xF100_141F);
    assert_eq!(one(|a| a.movz(X0, 1, 0)), 0xD280_0020);
    assert_eq!(one(|a| a.mul(X0, X1, X2)), 0x9B02_7C20);
    assert_eq!(one(|a| a.sdiv(X0, X1, X2)), 0x9AC2_0C20);
    assert_eq!(one(|a| a.and_imm(X0, X1, 0xFF)), 0x9240_1C20);
    assert_eq!(one(|a| a.rev(X0, X1)), 0xDAC0_0C20);
    assert_eq!(one(|a| a.cset(X0, Cond::Eq)), 0x9A9F_17E0);
    assert_eq!(one(|a| a.lsl(X0, X1, 4)), 0xD37C_EC20);
    assert_eq!(one(|a| a.lsr(X0, X1, 4)), 0xD344_FC20);
    assert_eq!(one(|a| a.asr(X0, X1, 4)), 0x9344_FC20);
    assert_eq!(one(|a| a.sxtw(X0, W1)), 0x9340_7C20);
    assert_eq!(one(|a| a.uxtb(W0, W1)), 0x5300_1C20);
    assert_eq!(one(|a| a.ldr(X0, X1, 8)), 0xF940_0420);
    assert_eq!(
        one(|a| a.stp(Reg::FP, Reg::LR, Reg::SP, -16, PairMode::PreIndex)),
        0xA9BF_7BFD
    );
    assert_eq!(
        one(|a| a.ldp(Reg::FP, Reg::LR, Reg::SP, 16, PairMode::PostIndex)),
        0xA8C1_7BFD
    );
    assert_eq!(one(|a| a.blr(Reg::x(16))), 0xD63F_0200);
    assert_eq!(one(|a| a.ret()), 0xD65F_03C0);
    assert_eq!(one(|a| a.nop()), 0xD503_201F);
    assert_eq!(one(|a| a.svc(0)), 0xD400_0001);
    assert_eq!(one(|a| a.brk(1)), 0xD420_0020);
}

#[test]
fn test_32bit_forms() {
    assert_eq!(one(|a| a.add(W0, W1, W2)), 0x0B02_0020);
    assert_eq!(one(|a| a.lsl(W0, W1, 4)), 0x531C_6C20);
    assert_eq!(one(|a| a.rev(W0, W1)), 0x5AC0_0820);
    assert_eq!(one(|a| a.ldr(W0, X1, 4)), 0xB940_0420);
    assert_eq!(one(|a| a.movz(W0, 1, 0)), 0x5280_0020);
    assert_eq!(one(|a| a.orr_imm(W0, W1, 1)), 0x3200_0020);
}

#[test]
fn test_floating_point() {
    assert_eq!(one(|a| a.fadd(0, 1, 2)), 0x1E62_2820);
    assert_eq!(one(|a| a.fmadd(0, 1, 2, 3)), 0x1F42_0C20);
    assert_eq!(one(|a| a.fcmp(0, 1)), 0x1E61_2000);
    assert_eq!(one(|a| a.fmov_to_gpr(X0, 1)), 0x9E66_0020);
    assert_eq!(one(|a| a.fmov_from_gpr(0, X1)), 0x9E67_0020);
    assert_eq!(one(|a| a.fcvtzs(X0, 1)), 0x9E78_0020);
    assert_eq!(one(|a| a.scvtf(0, X1)), 0x9E62_0020);
    assert_eq!(one(|a| a.ldr_d(0, X1, 8)), 0xFD40_0420);
}

#[test]
fn test_words_are_little_endian() {
    let mut mem = [0u8; 4];
    let mut asm = ArmAssembler::new(&mut mem);
    asm.add_imm(X0, X1, 1).unwrap();
    assert_eq!(asm.code(), &[0x20, 0x04, 0x00, 0x91]);
}

#[test]
fn test_mov_imm_chunks() {
    assert_eq!(
        assemble(|a| a.mov_imm(X0, 0x1234_0000_5678)),
        [0xD28A_CF00, 0xF2C2_4680]
    );
    assert_eq!(assemble(|a| a.mov_imm(X0, 0)), [0xD280_0000]);
    assert_eq!(assemble(|a| a.mov_imm(X0, 0x1_0000)), [0xD2A0_0020]);

    let mut mem = [0u8; 16];
    let mut asm = ArmAssembler::new(&mut mem);
    assert!(asm.mov_imm(W0, 1 << 32).is_err());
}

#[test]
fn test_label_branches() {
    let words = assemble(|a| {
        let top = a.new_label();
        let end = a.new_label();
        a.bind(top)?;
        a.nop()?;
        a.b_cond(Cond::Ne, top)?;
        a.cbz(Reg::x(3), end)?;
        a.b(end)?;
        a.bind(end)?;
        a.ret()
    });
    assert_eq!(
        words,
        [0xD503_201F, 0x54FF_FFE1, 0xB400_0043, 0x1400_0001, 0xD65F_03C0]
    );
}

#[test]
fn test_table_matches_typed_methods() {
    let mut mem = [0u8; 64];
    let mut asm = ArmAssembler::new(&mut mem);
    let r = Operand::Reg;
    let i = Operand::Imm;
    assert_eq!(asm.emit("add", &[r(0), r(1), i(1)]), Ok(0x9100_0420));
    assert_eq!(asm.emit("add", &[r(0), r(1), r(2)]), Ok(0x8B02_0020));
    assert_eq!(asm.emit("and", &[r(0), r(1), i(0xFF)]), Ok(0x9240_1C20));
    assert_eq!(asm.emit("ubfm", &[r(0), r(1), i(60), i(59)]), Ok(0xD37C_EC20));
    assert_eq!(asm.emit("csinc", &[r(0), r(31), r(31), i(1)]), Ok(0x9A9F_17E0));
    assert_eq!(asm.emit("stp", &[r(29), r(30), r(31), i(16)]), Ok(0xA901_7BFD));
    assert_eq!(asm.emit("ret", &[]), Ok(0xD65F_03C0));
    assert_eq!(asm.emit("fadd", &[r(0), r(1), r(2)]), Ok(0x1E62_2820));

    let end = asm.new_label();
    asm.emit("b.eq", &[end.into()]).unwrap();
    asm.bind(end).unwrap();
    asm.finalize().unwrap();
    let size = asm.current_size();
    let last = &asm.code()[size - 4..];
    assert_eq!(u32::from_le_bytes([last[0], last[1], last[2], last[3]]), 0x5400_0020);
}

#[test]
fn test_table_errors() {
    let mut mem = [0u8; 16];
    let mut asm = ArmAssembler::new(&mut mem);
    let r = Operand::Reg;
    assert_eq!(
        asm.emit("mov.x", &[]),
        Err(EncodeError::UnknownMnemonic("mov.x".to_string()))
    );
    assert!(matches!(
        asm.emit("add", &[r(0), Operand::Imm(1)]),
        Err(EncodeError::OperandCount { found: 2, .. })
    ));
    assert_eq!(
        asm.emit("and", &[r(0), r(1), Operand::Imm(0)]),
        Err(EncodeError::InvalidBitmask { value: 0 })
    );
    assert_eq!(asm.current_size(), 0);
}

#[test]
fn test_range_rejection() {
    let mut mem = [0u8; 16];
    let mut asm = ArmAssembler::new(&mut mem);
    assert_eq!(asm.add(X0, W1, X2), Err(EncodeError::WidthMismatch("add")));
    assert_eq!(asm.ldr(X0, W1, 8), Err(EncodeError::WidthMismatch("ldr")));
    assert_eq!(
        asm.ldr(X0, X1, 4),
        Err(EncodeError::MisalignedDisplacement(4))
    );
    assert!(asm.add_imm(X0, X1, 0x100_0000).is_err());
    assert!(asm.lsl(X0, X1, 64).is_err());
    assert!(asm.brk(0x1_0000).is_err());
    assert!(asm.add(Reg::x(32), X1, X2).is_err());
    assert_eq!(asm.b(2), Err(EncodeError::MisalignedDisplacement(2)));
    assert_eq!(asm.current_size(), 0);
}
