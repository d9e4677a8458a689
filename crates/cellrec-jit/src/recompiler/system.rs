//! System calls, special-purpose registers, and barriers.

use cellrec_ir::{Barrier, BinaryOp, IrBuilder, Type};
use cellrec_isa::{PpuOpcode, spr};

use super::Translator;
use crate::error::Result;
use crate::registers::{RegClass, xer};
use crate::state::offsets;

impl<B: IrBuilder> Translator<'_, B> {
    pub(super) fn system(&mut self, op: PpuOpcode) -> Result<()> {
        use PpuOpcode::*;

        let i = self.instr;
        match op {
            Sc => self.syscall(),
            Mfcr => {
                let mut word = self.i64c(0);
                for bit in 0..32 {
                    let value = self.cr_bit(bit);
                    let value = self.zext(value, Type::I64);
                    let value = self.bin_imm(BinaryOp::Shl, value, 31 - bit as u64);
                    word = self.bin(BinaryOp::Or, word, value);
                }
                self.set_gpr(i.rd(), word);
            }
            Mtcrf => {
                let rs = self.gpr(i.rs());
                for field in 0..8 {
                    if i.crm() & (0x80 >> field) == 0 {
                        continue;
                    }
                    for bit in field * 4..field * 4 + 4 {
                        let shifted = self.bin_imm(BinaryOp::LShr, rs, 31 - bit as u64);
                        let value = self.bin_imm(BinaryOp::And, shifted, 1);
                        let value = self.trunc(value, Type::I8);
                        self.set_cr_bit(bit, value);
                    }
                }
            }
            Mfspr => {
                let value = match i.spr() {
                    spr::XER => self.read_xer(),
                    spr::LR => self.spr(RegClass::Lr),
                    spr::CTR => self.spr(RegClass::Ctr),
                    spr::TBL | spr::TBU => self.time_base(i.spr() == spr::TBU),
                    _ => return Err(self.unimplemented(op)),
                };
                self.set_gpr(i.rd(), value);
            }
            Mtspr => {
                let value = self.gpr(i.rs());
                match i.spr() {
                    spr::XER => self.write_xer(value),
                    spr::LR => self.set_spr(RegClass::Lr, value),
                    spr::CTR => self.set_spr(RegClass::Ctr, value),
                    _ => return Err(self.unimplemented(op)),
                }
            }
            Mftb => {
                let value = self.time_base(i.spr() == spr::TBU);
                self.set_gpr(i.rd(), value);
            }
            Sync => {
                let kind = if i.sync_l() == 1 {
                    Barrier::Lightweight
                } else {
                    Barrier::Full
                };
                self.b.barrier(kind);
            }
            Isync => self.b.barrier(Barrier::Instruction),
            Eieio => self.b.barrier(Barrier::Io),
            _ => return Err(self.unimplemented(op)),
        }
        Ok(())
    }

    /// `sc`: the handler sees r3-r10 in the state and leaves its result in
    /// r3. r11 (the call number) is never shadowed.
    fn syscall(&mut self) {
        for index in 3..=10 {
            self.regs.spill(self.b, RegClass::Gpr, index);
        }
        let segment = self.segment;
        let pc = self.i64c(self.pc);
        self.call_extern(&segment.thunks.syscall, &[pc], None);
        self.regs.reload(self.b, RegClass::Gpr, 3);
    }

    /// Time base, or its upper word.
    fn time_base(&mut self, upper: bool) -> B::Value {
        let tb = self.load_state(offsets::TB, Type::I64);
        if upper {
            self.bin_imm(BinaryOp::LShr, tb, 32)
        } else {
            tb
        }
    }

    /// Architectural XER: SO, OV, CA in bits 31-29 and the byte count in
    /// the low seven bits.
    fn read_xer(&mut self) -> B::Value {
        let mut word = self.i64c(0);
        for (field, shift) in [(xer::SO, 31), (xer::OV, 30), (xer::CA, 29)] {
            let flag = self.xer(field);
            let flag = self.zext(flag, Type::I64);
            let flag = self.bin_imm(BinaryOp::Shl, flag, shift);
            word = self.bin(BinaryOp::Or, word, flag);
        }
        let count = self.xer(xer::BC);
        let count = self.zext(count, Type::I64);
        let count = self.bin_imm(BinaryOp::And, count, 0x7F);
        self.bin(BinaryOp::Or, word, count)
    }

    fn write_xer(&mut self, value: B::Value) {
        for (field, shift) in [(xer::SO, 31), (xer::OV, 30), (xer::CA, 29)] {
            let flag = self.bin_imm(BinaryOp::LShr, value, shift);
            let flag = self.bin_imm(BinaryOp::And, flag, 1);
            let flag = self.trunc(flag, Type::I8);
            self.set_xer(field, flag);
        }
        let count = self.bin_imm(BinaryOp::And, value, 0x7F);
        let count = self.trunc(count, Type::I8);
        self.set_xer(xer::BC, count);
    }
}
