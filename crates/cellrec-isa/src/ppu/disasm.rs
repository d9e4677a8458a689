//! Textual rendering of decoded PPU instructions.

use std::fmt::Write;

use super::{PpuInstr, PpuOpcode, decode_ppu};

use PpuOpcode as Op;

/// Render one instruction word at `address`.
///
/// Unknown words render as `.long 0x...`.
pub fn disasm_ppu(instr: PpuInstr, address: u64) -> String {
    let Ok(op) = decode_ppu(instr) else {
        return format!(".long {:#010x}", instr.raw());
    };

    let mut text = String::from(op.mnemonic());
    if has_oe(op) && instr.oe() {
        text.push('o');
    }
    if has_rc(op) && instr.rc() {
        text.push('.');
    }
    if op.is_branch() {
        if instr.lk() {
            text.push('l');
        }
        if matches!(op, Op::B | Op::Bc) && instr.aa() {
            text.push('a');
        }
    }

    let operands = operands(op, instr, address);
    if !operands.is_empty() {
        let _ = write!(text, " {operands}");
    }
    text
}

fn has_oe(op: PpuOpcode) -> bool {
    matches!(
        op,
        Op::Add
            | Op::Addc
            | Op::Adde
            | Op::Addme
            | Op::Addze
            | Op::Divd
            | Op::Divdu
            | Op::Divw
            | Op::Divwu
            | Op::Mulld
            | Op::Mullw
            | Op::Neg
            | Op::Subf
            | Op::Subfc
            | Op::Subfe
            | Op::Subfme
            | Op::Subfze
    )
}

fn has_rc(op: PpuOpcode) -> bool {
    use crate::OpClass;
    match op.class() {
        OpClass::Integer => !matches!(
            op,
            Op::Addi
                | Op::Addic
                | Op::AddicRc
                | Op::Addis
                | Op::AndiRc
                | Op::AndisRc
                | Op::Cmp
                | Op::Cmpi
                | Op::Cmpl
                | Op::Cmpli
                | Op::Mulli
                | Op::Ori
                | Op::Oris
                | Op::Subfic
                | Op::Xori
                | Op::Xoris
        ),
        OpClass::Float => !matches!(op, Op::Fcmpu | Op::Fcmpo | Op::Mcrfs),
        _ => false,
    }
}

fn target(base: u64, disp: i64, absolute: bool) -> u64 {
    if absolute {
        disp as u64
    } else {
        base.wrapping_add(disp as u64)
    }
}

fn operands(op: PpuOpcode, i: PpuInstr, address: u64) -> String {
    let (d, a, b) = (i.rd(), i.ra(), i.rb());
    match op {
        Op::B => format!("{:#x}", target(address, i.li(), i.aa())),
        Op::Bc => format!("{}, {}, {:#x}", i.bo(), i.bi(), target(address, i.bd(), i.aa())),
        Op::Bclr | Op::Bcctr => format!("{}, {}", i.bo(), i.bi()),
        Op::Sc | Op::Isync | Op::Eieio => String::new(),
        Op::Sync => {
            if i.sync_l() == 0 {
                String::new()
            } else {
                i.sync_l().to_string()
            }
        }
        Op::Mcrf => format!("cr{}, cr{}", i.crfd(), i.crfs()),
        Op::Crand | Op::Crandc | Op::Creqv | Op::Crnand | Op::Crnor | Op::Cror | Op::Crorc
        | Op::Crxor => format!("{}, {}, {}", i.crbd(), i.crba(), i.crbb()),

        Op::Cmp | Op::Cmpl => format!("cr{}, {}, r{a}, r{b}", i.crfd(), u8::from(i.l10())),
        Op::Cmpi => format!("cr{}, {}, r{a}, {}", i.crfd(), u8::from(i.l10()), i.simm()),
        Op::Cmpli => format!("cr{}, {}, r{a}, {}", i.crfd(), u8::from(i.l10()), i.uimm()),
        Op::Addi | Op::Addic | Op::AddicRc | Op::Addis | Op::Mulli | Op::Subfic => {
            format!("r{d}, r{a}, {}", i.simm())
        }
        Op::Ori | Op::Oris | Op::Xori | Op::Xoris | Op::AndiRc | Op::AndisRc => {
            format!("r{a}, r{d}, {:#x}", i.uimm())
        }
        Op::Twi | Op::Tdi => format!("{}, r{a}, {}", i.to(), i.simm()),
        Op::Tw | Op::Td => format!("{}, r{a}, r{b}", i.to()),
        Op::Rlwinm => format!("r{a}, r{d}, {}, {}, {}", i.sh(), i.mb(), i.me()),
        Op::Rlwimi => format!("r{a}, r{d}, {}, {}, {}", i.sh(), i.mb(), i.me()),
        Op::Rlwnm => format!("r{a}, r{d}, r{b}, {}, {}", i.mb(), i.me()),
        Op::Rldicl | Op::Rldicr | Op::Rldic | Op::Rldimi => {
            format!("r{a}, r{d}, {}, {}", i.sh64(), i.mb64())
        }
        Op::Rldcl | Op::Rldcr => format!("r{a}, r{d}, r{b}, {}", i.mb64()),
        Op::Srawi => format!("r{a}, r{d}, {}", i.sh()),
        Op::Sradi => format!("r{a}, r{d}, {}", i.sh64()),
        Op::Neg | Op::Addme | Op::Addze | Op::Subfme | Op::Subfze => format!("r{d}, r{a}"),
        Op::Cntlzw | Op::Cntlzd | Op::Extsb | Op::Extsh | Op::Extsw => format!("r{a}, r{d}"),
        Op::And | Op::Andc | Op::Eqv | Op::Nand | Op::Nor | Op::Or | Op::Orc | Op::Xor
        | Op::Slw | Op::Srw | Op::Sraw | Op::Sld | Op::Srd | Op::Srad => {
            format!("r{a}, r{d}, r{b}")
        }

        Op::Mfspr => format!("r{d}, {}", i.spr()),
        Op::Mtspr => format!("{}, r{d}", i.spr()),
        Op::Mftb => format!("r{d}, {}", i.spr()),
        Op::Mfcr | Op::Mfmsr => format!("r{d}"),
        Op::Mtcrf => format!("{:#x}, r{d}", i.crm()),

        Op::Dcbf | Op::Dcbst | Op::Dcbt | Op::Dcbtst | Op::Dcbz | Op::Icbi => {
            format!("r{a}, r{b}")
        }
        Op::Ld | Op::Ldu | Op::Lwa | Op::Std | Op::Stdu => format!("r{d}, {}(r{a})", i.ds()),
        Op::Lfs | Op::Lfsu | Op::Lfd | Op::Lfdu | Op::Stfs | Op::Stfsu | Op::Stfd | Op::Stfdu => {
            format!("f{d}, {}(r{a})", i.simm())
        }
        Op::Lfsx | Op::Lfsux | Op::Lfdx | Op::Lfdux | Op::Stfsx | Op::Stfsux | Op::Stfdx
        | Op::Stfdux | Op::Stfiwx => format!("f{d}, r{a}, r{b}"),
        Op::Lvx | Op::Stvx => format!("v{d}, r{a}, r{b}"),

        Op::Fcmpu | Op::Fcmpo => format!("cr{}, f{a}, f{b}", i.crfd()),
        Op::Fmadd | Op::Fmadds | Op::Fmsub | Op::Fmsubs | Op::Fnmadd | Op::Fnmadds
        | Op::Fnmsub | Op::Fnmsubs | Op::Fsel => {
            format!("f{d}, f{a}, f{}, f{b}", i.rc_reg())
        }
        Op::Fmul | Op::Fmuls => format!("f{d}, f{a}, f{}", i.rc_reg()),
        Op::Fadd | Op::Fadds | Op::Fsub | Op::Fsubs | Op::Fdiv | Op::Fdivs => {
            format!("f{d}, f{a}, f{b}")
        }
        Op::Mffs => format!("f{d}"),
        Op::Mtfsf => format!("{:#x}, f{b}", i.fm()),
        Op::Mtfsb0 | Op::Mtfsb1 => format!("{d}"),
        Op::Mtfsfi => format!("cr{}, {}", i.crfd(), i.bits(16, 19)),
        Op::Mcrfs => format!("cr{}, cr{}", i.crfd(), i.crfs()),

        Op::Vspltisw => format!("v{d}, {}", i.vsimm()),
        Op::Vsel | Op::Vperm | Op::Vmaddfp => format!("v{d}, v{a}, v{b}, v{}", i.rc_reg()),

        _ => match op.class() {
            crate::OpClass::Float => format!("f{d}, f{b}"),
            crate::OpClass::Vector => format!("v{d}, v{a}, v{b}"),
            _ if is_d_form(i) => format!("r{d}, {}(r{a})", i.simm()),
            _ => format!("r{d}, r{a}, r{b}"),
        },
    }
}

fn is_d_form(instr: PpuInstr) -> bool {
    (32..=47).contains(&instr.opcd())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disasm_common_forms() {
        assert_eq!(disasm_ppu(PpuInstr(0x7C6E_7A15), 0), "add. r3, r14, r15");
        assert_eq!(disasm_ppu(PpuInstr(0x3861_FFF0), 0), "addi r3, r1, -16");
        assert_eq!(disasm_ppu(PpuInstr(0x8061_0008), 0), "lwz r3, 8(r1)");
        assert_eq!(disasm_ppu(PpuInstr(0x4E80_0020), 0), "bclr 20, 0");
        assert_eq!(disasm_ppu(PpuInstr(0x4BFF_FFF8), 0x1000), "b 0xff8");
        assert_eq!(disasm_ppu(PpuInstr(0x4800_0011), 0x1000), "bl 0x1010");
    }

    #[test]
    fn test_disasm_unknown() {
        assert_eq!(disasm_ppu(PpuInstr(0), 0), ".long 0x00000000");
    }
}
