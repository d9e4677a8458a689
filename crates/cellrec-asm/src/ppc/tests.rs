use cellrec_isa::{PpuInstr, PpuOpcode, decode_ppu};

use super::*;
use crate::error::EncodeError;

fn assemble(f: impl FnOnce(&mut PpcAssembler<'_>) -> Result<()>) -> Vec<u32> {
    let mut mem = [0u8; 256];
    let mut asm = PpcAssembler::new(&mut mem);
    f(&mut asm).unwrap();
    let size = asm.finalize().unwrap();
    asm.code()[..size]
        .chunks_exact(4)
        .map(|w| u32::from_be_bytes([w[0], w[1], w[2], w[3]]))
        .collect()
}

fn one(f: impl FnOnce(&mut PpcAssembler<'_>) -> Result<()>) -> PpuInstr {
    let words = assemble(f);
    assert_eq!(words.len(), 1);
    PpuInstr(words[0])
}

fn opcode(instr: PpuInstr) -> PpuOpcode {
    decode_ppu(instr).unwrap()
}

// ===== Round trips through the decoder =====

#[test]
fn test_xo_form_round_trip() {
    let i = one(|a| a.addo_rc(3, 14, 15));
    assert_eq!(opcode(i), PpuOpcode::Add);
    assert_eq!((i.rd(), i.ra(), i.rb()), (3, 14, 15));
    assert!(i.oe());
    assert!(i.rc());

    let i = one(|a| a.neg(5, 6));
    assert_eq!(opcode(i), PpuOpcode::Neg);
    assert_eq!((i.rd(), i.ra()), (5, 6));
    assert!(!i.oe());
}

#[test]
fn test_d_form_round_trip() {
    let i = one(|a| a.addi(3, 1, -16));
    assert_eq!(opcode(i), PpuOpcode::Addi);
    assert_eq!((i.rd(), i.ra(), i.simm()), (3, 1, -16));

    let i = one(|a| a.ori(4, 5, 0xBEEF));
    assert_eq!(opcode(i), PpuOpcode::Ori);
    assert_eq!((i.ra(), i.rs(), i.uimm()), (4, 5, 0xBEEF));

    let i = one(|a| a.lwz(9, -8, 1));
    assert_eq!(opcode(i), PpuOpcode::Lwz);
    assert_eq!((i.rd(), i.ra(), i.simm()), (9, 1, -8));
}

#[test]
fn test_ds_form_round_trip() {
    let i = one(|a| a.std(31, -16, 1));
    assert_eq!(opcode(i), PpuOpcode::Std);
    assert_eq!((i.rs(), i.ra(), i.ds()), (31, 1, -16));

    let i = one(|a| a.ldu(3, 8, 4));
    assert_eq!(opcode(i), PpuOpcode::Ldu);
    assert_eq!(i.ds(), 8);
}

#[test]
fn test_x_form_round_trip() {
    let i = one(|a| a.and_rc(3, 4, 5));
    assert_eq!(opcode(i), PpuOpcode::And);
    assert_eq!((i.ra(), i.rs(), i.rb()), (3, 4, 5));
    assert!(i.rc());

    let i = one(|a| a.stwcx_rc(3, 4, 5));
    assert_eq!(opcode(i), PpuOpcode::StwcxRc);

    let i = one(|a| a.cmpl(6, 1, 3, 4));
    assert_eq!(opcode(i), PpuOpcode::Cmpl);
    assert_eq!(i.crfd(), 6);
    assert!(i.l10());

    let i = one(|a| a.srawi(3, 4, 31));
    assert_eq!(opcode(i), PpuOpcode::Srawi);
    assert_eq!(i.sh(), 31);
}

#[test]
fn test_xfx_form_round_trip() {
    let i = one(|a| a.mfspr(0, 8));
    assert_eq!(opcode(i), PpuOpcode::Mfspr);
    assert_eq!(i.spr(), 8);

    let i = one(|a| a.mtspr(269, 7));
    assert_eq!(opcode(i), PpuOpcode::Mtspr);
    assert_eq!((i.spr(), i.rs()), (269, 7));

    let i = one(|a| a.mtcrf(0x81, 12));
    assert_eq!(opcode(i), PpuOpcode::Mtcrf);
    assert_eq!(i.crm(), 0x81);
}

#[test]
fn test_rotate_forms_round_trip() {
    let i = one(|a| a.rlwinm(3, 4, 5, 6, 7));
    assert_eq!(opcode(i), PpuOpcode::Rlwinm);
    assert_eq!((i.ra(), i.rs(), i.sh(), i.mb(), i.me()), (3, 4, 5, 6, 7));

    let i = one(|a| a.rldicl(3, 4, 48, 33));
    assert_eq!(opcode(i), PpuOpcode::Rldicl);
    assert_eq!((i.sh64(), i.mb64()), (48, 33));

    let i = one(|a| a.sradi(3, 4, 40));
    assert_eq!(opcode(i), PpuOpcode::Sradi);
    assert_eq!(i.sh64(), 40);
}

#[test]
fn test_a_form_round_trip() {
    let i = one(|a| a.fmadd(1, 2, 3, 4));
    assert_eq!(opcode(i), PpuOpcode::Fmadd);
    assert_eq!((i.rd(), i.ra(), i.rc_reg(), i.rb()), (1, 2, 3, 4));

    let i = one(|a| a.fmul(1, 2, 3));
    assert_eq!(opcode(i), PpuOpcode::Fmul);
    assert_eq!((i.ra(), i.rc_reg(), i.rb()), (2, 3, 0));
}

#[test]
fn test_vector_forms_round_trip() {
    let i = one(|a| a.vperm(2, 3, 4, 5));
    assert_eq!(opcode(i), PpuOpcode::Vperm);
    assert_eq!((i.rd(), i.ra(), i.rb(), i.rc_reg()), (2, 3, 4, 5));

    let i = one(|a| a.vxor(0, 0, 0));
    assert_eq!(opcode(i), PpuOpcode::Vxor);

    let i = one(|a| a.vspltisw(7, -3));
    assert_eq!(opcode(i), PpuOpcode::Vspltisw);
    assert_eq!(i.vsimm(), -3);
}

#[test]
fn test_branch_forms_round_trip() {
    let i = one(|a| a.bl(-0x100));
    assert_eq!(opcode(i), PpuOpcode::B);
    assert_eq!(i.li(), -0x100);
    assert!(i.lk());
    assert!(!i.aa());

    let i = one(|a| a.bca(4, 10, 0x40));
    assert_eq!(opcode(i), PpuOpcode::Bc);
    assert_eq!((i.bo(), i.bi(), i.bd()), (4, 10, 0x40));
    assert!(i.aa());

    let i = one(|a| a.bcctrl(20, 0, 0));
    assert_eq!(opcode(i), PpuOpcode::Bcctr);
    assert!(i.lk());
}

// ===== Range rejection =====

#[test]
fn test_rejects_misaligned_branch() {
    let mut mem = [0u8; 16];
    let mut asm = PpcAssembler::new(&mut mem);
    assert_eq!(asm.b(6), Err(EncodeError::MisalignedDisplacement(6)));
    assert_eq!(asm.current_size(), 0);
}

#[test]
fn test_rejects_out_of_range() {
    let mut mem = [0u8; 16];
    let mut asm = PpcAssembler::new(&mut mem);
    assert_eq!(
        asm.addi(3, 1, 0x8000),
        Err(EncodeError::ImmediateOutOfRange {
            value: 0x8000,
            bits: 16
        })
    );
    assert_eq!(
        asm.add(32, 0, 0),
        Err(EncodeError::RegisterOutOfRange { index: 32, max: 31 })
    );
    assert!(asm.b(1 << 25).is_err());
    assert!(asm.ld(3, 6, 1).is_err());
    assert!(asm.slwi(3, 4, 32).is_err());
    assert!(asm.beq(8, 0).is_err());
    assert_eq!(asm.current_size(), 0);
}

#[test]
fn test_add_immediate_edges() {
    assert_eq!(assemble(|a| a.addi(3, 4, -0x8000)), [0x3864_8000]);
    assert_eq!(assemble(|a| a.addi(3, 4, 0x7FFF)), [0x3864_7FFF]);
    assert_eq!(assemble(|a| a.subi(3, 4, 0x8000)), [0x3864_8000]);
    assert_eq!(assemble(|a| a.subi(3, 4, -0x7FFF)), [0x3864_7FFF]);

    let mut mem = [0u8; 16];
    let mut asm = PpcAssembler::new(&mut mem);
    assert_eq!(
        asm.subi(3, 4, -0x8000),
        Err(EncodeError::ImmediateOutOfRange {
            value: 0x8000,
            bits: 16
        })
    );
    assert_eq!(
        asm.subi(3, 4, i64::MIN),
        Err(EncodeError::ImmediateOutOfRange {
            value: i64::MIN,
            bits: 16
        })
    );
    assert_eq!(
        asm.addi(3, 4, -0x8001),
        Err(EncodeError::ImmediateOutOfRange {
            value: -0x8001,
            bits: 16
        })
    );
    assert_eq!(asm.current_size(), 0);
}

#[test]
fn test_buffer_overflow() {
    let mut mem = [0u8; 4];
    let mut asm = PpcAssembler::new(&mut mem);
    asm.nop().unwrap();
    assert!(matches!(
        asm.nop(),
        Err(EncodeError::BufferOverflow { .. })
    ));
    assert_eq!(asm.current_size(), 4);
}

// ===== Pseudo-mnemonics =====

#[test]
fn test_alias_equivalence() {
    let pairs: [(Vec<u32>, Vec<u32>); 12] = [
        (assemble(|a| a.mr(3, 4)), assemble(|a| a.or(3, 4, 4))),
        (assemble(|a| a.li(3, -1)), assemble(|a| a.addi(3, 0, -1))),
        (assemble(|a| a.lis(3, 0x7FFF)), assemble(|a| a.addis(3, 0, 0x7FFF))),
        (assemble(|a| a.nop()), assemble(|a| a.ori(0, 0, 0))),
        (assemble(|a| a.not(3, 4)), assemble(|a| a.nor(3, 4, 4))),
        (assemble(|a| a.slwi(3, 4, 8)), assemble(|a| a.rlwinm(3, 4, 8, 0, 23))),
        (assemble(|a| a.rotlwi(3, 4, 8)), assemble(|a| a.rlwinm(3, 4, 8, 0, 31))),
        (assemble(|a| a.srwi(3, 4, 8)), assemble(|a| a.rlwinm(3, 4, 24, 8, 31))),
        (assemble(|a| a.beq(1, 16)), assemble(|a| a.bc(12, 6, 16))),
        (assemble(|a| a.bne(0, 16)), assemble(|a| a.bc(4, 2, 16))),
        (assemble(|a| a.sub(3, 4, 5)), assemble(|a| a.subf(3, 5, 4))),
        (assemble(|a| a.mtcr(3)), assemble(|a| a.mtcrf(0xFF, 3))),
    ];
    for (alias, base) in pairs {
        assert_eq!(alias, base);
    }
}

#[test]
fn test_well_known_encodings() {
    assert_eq!(assemble(|a| a.nop()), [0x6000_0000]);
    assert_eq!(assemble(|a| a.blr()), [0x4E80_0020]);
    assert_eq!(assemble(|a| a.bctrl()), [0x4E80_0421]);
    assert_eq!(assemble(|a| a.mflr(0)), [0x7C08_02A6]);
    assert_eq!(assemble(|a| a.mtctr(12)), [0x7D89_03A6]);
    assert_eq!(assemble(|a| a.add_rc(3, 14, 15)), [0x7C6E_7A15]);
    assert_eq!(assemble(|a| a.sync()), [0x7C00_04AC]);
    assert_eq!(assemble(|a| a.lwsync()), [0x7C20_04AC]);
    assert_eq!(assemble(|a| a.stdu(1, -128, 1)), [0xF821_FF81]);
    assert_eq!(assemble(|a| a.cmpwi(7, 3, 0)), [0x2F83_0000]);
}

#[test]
fn test_compare_aliases_decode() {
    let i = one(|a| a.cmpdi(2, 5, -7));
    assert_eq!(opcode(i), PpuOpcode::Cmpi);
    assert_eq!((i.crfd(), i.ra(), i.simm()), (2, 5, -7));
    assert!(i.l10());

    let i = one(|a| a.cmplwi(0, 5, 0xFFFF));
    assert_eq!(opcode(i), PpuOpcode::Cmpli);
    assert!(!i.l10());
    assert_eq!(i.uimm(), 0xFFFF);
}

// ===== Labels =====

#[test]
fn test_forward_and_backward_labels() {
    let words = assemble(|a| {
        let top = a.new_label();
        let out = a.new_label();
        a.bind(top)?;
        a.addi(3, 3, -1)?;
        a.cmpwi(0, 3, 0)?;
        a.beq(0, out)?;
        a.b(top)?;
        a.bind(out)?;
        a.blr()
    });
    // beq at 8 jumps to 16; b at 12 jumps back to 0.
    assert_eq!(PpuInstr(words[2]).bd(), 8);
    assert_eq!(PpuInstr(words[3]).li(), -12);
}

#[test]
fn test_absolute_label_uses_base_address() {
    let mut mem = [0u8; 16];
    let buf = CodeBuffer::new(&mut mem).with_base_address(0x1_0000);
    let mut asm = PpcAssembler::from_buffer(buf);
    let target = asm.new_label();
    asm.nop().unwrap();
    asm.bind(target).unwrap();
    asm.bla(target).unwrap();
    asm.finalize().unwrap();
    let word = u32::from_be_bytes(asm.code()[4..8].try_into().unwrap());
    assert_eq!(PpuInstr(word).li(), 0x1_0004);
    assert_eq!(asm.current_address(), 0x1_0008);
}

#[test]
fn test_unbound_label() {
    let mut mem = [0u8; 16];
    let mut asm = PpcAssembler::new(&mut mem);
    let never = asm.new_label();
    asm.b(never).unwrap();
    assert_eq!(asm.finalize(), Err(EncodeError::UnboundLabel(never.id())));
}

#[test]
fn test_label_out_of_range_for_bc() {
    let mut mem = vec![0u8; 0x9000];
    let mut asm = PpcAssembler::new(&mut mem);
    let far = asm.new_label();
    asm.beq(0, far).unwrap();
    for _ in 0..0x2000 {
        asm.nop().unwrap();
    }
    asm.bind(far).unwrap();
    assert!(matches!(
        asm.finalize(),
        Err(EncodeError::ImmediateOutOfRange { bits: 16, .. })
    ));
}

// ===== Table-driven emit =====

#[test]
fn test_emit_matches_typed_methods() {
    let mut mem = [0u8; 64];
    let mut asm = PpcAssembler::new(&mut mem);
    use Operand::{Imm, Reg};
    let pairs = [
        (
            asm.emit("add.", &[Reg(3), Reg(14), Reg(15)]).unwrap(),
            assemble(|a| a.add_rc(3, 14, 15))[0],
        ),
        (
            asm.emit("lwz", &[Reg(3), Imm(8), Reg(1)]).unwrap(),
            assemble(|a| a.lwz(3, 8, 1))[0],
        ),
        (
            asm.emit("rlwinm", &[Reg(3), Reg(4), Imm(2), Imm(0), Imm(29)]).unwrap(),
            assemble(|a| a.rlwinm(3, 4, 2, 0, 29))[0],
        ),
        (
            asm.emit("cmpli", &[Imm(1), Imm(1), Reg(3), Imm(10)]).unwrap(),
            assemble(|a| a.cmpldi(1, 3, 10))[0],
        ),
        (
            asm.emit("mfspr", &[Reg(0), Imm(8)]).unwrap(),
            assemble(|a| a.mflr(0))[0],
        ),
        (
            asm.emit("mtcrf", &[Imm(0xFF), Reg(3)]).unwrap(),
            assemble(|a| a.mtcr(3))[0],
        ),
        (
            asm.emit("fmadd", &[Reg(1), Reg(2), Reg(3), Reg(4)]).unwrap(),
            assemble(|a| a.fmadd(1, 2, 3, 4))[0],
        ),
        (
            asm.emit("bclr", &[Imm(20), Imm(0), Imm(0)]).unwrap(),
            assemble(|a| a.blr())[0],
        ),
    ];
    for (table, typed) in pairs {
        assert_eq!(table, typed, "{table:#010x} != {typed:#010x}");
    }
    assert_eq!(asm.current_size(), 32);
}

#[test]
fn test_emit_with_label() {
    let mut mem = [0u8; 16];
    let mut asm = PpcAssembler::new(&mut mem);
    let skip = asm.new_label();
    asm.emit("bc", &[Operand::Imm(12), Operand::Imm(2), skip.into()])
        .unwrap();
    asm.nop().unwrap();
    asm.bind(skip).unwrap();
    asm.finalize().unwrap();
    let word = u32::from_be_bytes(asm.code()[0..4].try_into().unwrap());
    assert_eq!(PpuInstr(word).bd(), 8);
}

#[test]
fn test_emit_errors() {
    let mut mem = [0u8; 16];
    let mut asm = PpcAssembler::new(&mut mem);
    assert_eq!(
        asm.emit("li", &[]),
        Err(EncodeError::UnknownMnemonic("li".into()))
    );
    assert!(matches!(
        asm.emit("add", &[Operand::Reg(1)]),
        Err(EncodeError::OperandCount { expected: 3, .. })
    ));
    assert!(matches!(
        asm.emit("addi", &[Operand::Reg(1), Operand::Reg(1), Operand::Reg(1)]),
        Err(EncodeError::OperandMismatch { index: 2, .. })
    ));
    assert_eq!(asm.current_size(), 0);
}
