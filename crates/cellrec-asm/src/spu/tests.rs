use cellrec_isa::SpuInstr;

use super::*;
use crate::error::EncodeError;

fn assemble(f: impl FnOnce(&mut SpuAssembler<'_>) -> Result<()>) -> Vec<SpuInstr> {
    let mut mem = [0u8; 128];
    let mut asm = SpuAssembler::new(&mut mem);
    f(&mut asm).unwrap();
    let size = asm.finalize().unwrap();
    asm.code()[..size]
        .chunks_exact(4)
        .map(|w| SpuInstr(u32::from_be_bytes([w[0], w[1], w[2], w[3]])))
        .collect()
}

fn one(f: impl FnOnce(&mut SpuAssembler<'_>) -> Result<()>) -> SpuInstr {
    let words = assemble(f);
    assert_eq!(words.len(), 1);
    words[0]
}

#[test]
fn test_rr_fields() {
    let i = one(|a| a.a(3, 4, 5));
    assert_eq!(i.raw(), 0x1801_4203);
    assert_eq!((i.rt(), i.ra(), i.rb()), (3, 4, 5));
    assert_eq!(i.op11(), A >> 21);

    let i = one(|a| a.xor(127, 126, 125));
    assert_eq!((i.rt(), i.ra(), i.rb()), (127, 126, 125));
}

#[test]
fn test_rrr_fields() {
    let i = one(|a| a.shufb(10, 11, 12, 13));
    assert_eq!(i.op4(), SHUFB >> 28);
    assert_eq!((i.rt_rrr(), i.ra(), i.rb(), i.rc()), (10, 11, 12, 13));
}

#[test]
fn test_immediate_fields() {
    assert_eq!(one(|a| a.ai(1, 1, -1)).raw(), 0x1CFF_C081);
    assert_eq!(one(|a| a.shli(2, 3, -64)).i7(), -64);
    assert_eq!(one(|a| a.cflts(2, 3, 173)).i8(), 173);
    assert_eq!(one(|a| a.il(5, -2)).i16(), -2);
    assert_eq!(one(|a| a.iohl(5, 0xFFFF)).i16(), -1);
    assert_eq!(one(|a| a.ila(5, 0x3_FFFF)).i18(), 0x3_FFFF);

    let i = one(|a| a.lqd(4, 3, 1));
    assert_eq!((i.rt(), i.ra(), i.i10()), (4, 1, 3));
}

#[test]
fn test_pseudo_mnemonics() {
    assert_eq!(assemble(|a| a.lr(3, 4)), assemble(|a| a.ori(3, 4, 0)));
    assert_eq!(one(|a| a.nop()).raw(), NOP);
    assert_eq!(one(|a| a.lnop()).raw(), LNOP);
    assert_eq!(one(|a| a.ret()).raw(), BI);
    assert_eq!(one(|a| a.stop(0x2000)).raw(), 0x2000);
}

#[test]
fn test_range_rejection() {
    let mut mem = [0u8; 16];
    let mut asm = SpuAssembler::new(&mut mem);
    assert_eq!(
        asm.a(128, 0, 0),
        Err(EncodeError::RegisterOutOfRange {
            index: 128,
            max: 127
        })
    );
    assert!(asm.ai(1, 1, 512).is_err());
    assert!(asm.shli(1, 1, 64).is_err());
    assert!(asm.ilhu(1, -1).is_err());
    assert!(asm.stop(0x4000).is_err());
    assert_eq!(asm.br(6), Err(EncodeError::MisalignedDisplacement(6)));
    assert_eq!(asm.current_size(), 0);
}

#[test]
fn test_branch_labels() {
    let words = assemble(|a| {
        let top = a.new_label();
        let done = a.new_label();
        a.bind(top)?;
        a.ai(3, 3, -1)?;
        a.brz(3, done)?;
        a.br(top)?;
        a.bind(done)?;
        a.ret()
    });
    assert_eq!(words[1].i16(), 2);
    assert_eq!(words[1].rt(), 3);
    assert_eq!(words[2].i16(), -2);
}

#[test]
fn test_absolute_branch_label() {
    let mut mem = [0u8; 16];
    let buf = CodeBuffer::new(&mut mem).with_base_address(0x3_0000);
    let mut asm = SpuAssembler::from_buffer(buf);
    let entry = asm.new_label();
    asm.nop().unwrap();
    asm.bind(entry).unwrap();
    asm.brasl(0, entry).unwrap();
    assert_eq!(asm.label_position(entry), Some(4));
    assert!(matches!(
        asm.finalize(),
        Err(EncodeError::ImmediateOutOfRange { bits: 16, .. })
    ));

    let mut mem = [0u8; 16];
    let buf = CodeBuffer::new(&mut mem).with_base_address(0x100);
    let mut asm = SpuAssembler::from_buffer(buf);
    let entry = asm.new_label();
    asm.bind(entry).unwrap();
    asm.brasl(0, entry).unwrap();
    asm.finalize().unwrap();
    let word = u32::from_be_bytes(asm.code()[0..4].try_into().unwrap());
    assert_eq!(SpuInstr(word).i16(), 0x40);
}

#[test]
fn test_emit_matches_typed_methods() {
    use Operand::{Imm, Reg};
    let mut mem = [0u8; 64];
    let mut asm = SpuAssembler::new(&mut mem);
    let pairs = [
        (
            asm.emit("a", &[Reg(3), Reg(4), Reg(5)]).unwrap(),
            one(|a| a.a(3, 4, 5)),
        ),
        (
            asm.emit("selb", &[Reg(1), Reg(2), Reg(3), Reg(4)]).unwrap(),
            one(|a| a.selb(1, 2, 3, 4)),
        ),
        (
            asm.emit("lqd", &[Reg(4), Imm(3), Reg(1)]).unwrap(),
            one(|a| a.lqd(4, 3, 1)),
        ),
        (
            asm.emit("ilhu", &[Reg(9), Imm(0x8000)]).unwrap(),
            one(|a| a.ilhu(9, 0x8000)),
        ),
        (
            asm.emit("brnz", &[Reg(3), Imm(-8)]).unwrap(),
            one(|a| a.brnz(3, -8)),
        ),
        (asm.emit("bi", &[Reg(0)]).unwrap(), one(|a| a.ret())),
    ];
    for (table, typed) in pairs {
        assert_eq!(table, typed.raw());
    }
}

#[test]
fn test_emit_branch_to_label() {
    let mut mem = [0u8; 16];
    let mut asm = SpuAssembler::new(&mut mem);
    let out = asm.new_label();
    asm.emit("br", &[out.into()]).unwrap();
    asm.lnop().unwrap();
    asm.bind(out).unwrap();
    asm.finalize().unwrap();
    let word = u32::from_be_bytes(asm.code()[0..4].try_into().unwrap());
    assert_eq!(SpuInstr(word).i16(), 2);
}
