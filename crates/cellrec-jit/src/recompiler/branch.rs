//! Branches, calls, and condition-register logic.
//!
//! In-function branches become IR branches between leader blocks. Branches
//! leaving the function are tail calls: the target is called and control
//! goes to the epilog. Linking branches are calls that fall through.

use cellrec_ir::{BinaryOp, Callee, CmpOp, IrBuilder, UnaryOp};
use cellrec_isa::PpuOpcode;

use super::{Translator, branch_target};
use crate::error::Result;
use crate::registers::RegClass;

/// Bits of the BO field.
mod options {
    /// Ignore the CR condition.
    pub const NO_COND: u32 = 0x10;
    /// Branch when the CR bit is set.
    pub const COND_TRUE: u32 = 0x08;
    /// Do not decrement CTR.
    pub const NO_CTR: u32 = 0x04;
    /// Branch when the decremented CTR is zero.
    pub const CTR_ZERO: u32 = 0x02;
}

impl<B: IrBuilder> Translator<'_, B> {
    pub(super) fn branch(&mut self, op: PpuOpcode) -> Result<()> {
        use PpuOpcode::*;

        let i = self.instr;
        match op {
            B => {
                let target = branch_target(self.pc, i.li(), i.aa());
                if i.lk() {
                    self.link();
                    if target != self.pc + 4 {
                        self.call_guest(target)?;
                    }
                } else if let Some(&block) = self.blocks.get(&target) {
                    self.b.br(block);
                } else {
                    self.call_guest(target)?;
                    self.b.br(self.epilog);
                }
            }
            Bc => self.branch_conditional()?,
            Bclr => self.branch_to_lr(),
            Bcctr => self.branch_to_ctr()?,
            Crand | Crandc | Creqv | Crnand | Crnor | Cror | Crorc | Crxor => {
                self.cr_logical(op);
            }
            Mcrf => {
                let (dst, src) = (i.crfd(), i.crfs());
                for bit in 0..4 {
                    let value = self.cr_bit(src * 4 + bit);
                    self.set_cr_bit(dst * 4 + bit, value);
                }
            }
            _ => return Err(self.unimplemented(op)),
        }
        Ok(())
    }

    /// LR = address of the next instruction.
    fn link(&mut self) {
        let next = self.i64c(self.pc + 4);
        self.set_spr(RegClass::Lr, next);
    }

    /// Branch condition of `bc*` forms as an `I1`, or `None` when the
    /// branch is unconditional. Decrements CTR when `decrement` is set and
    /// BO asks for it.
    fn branch_condition(&mut self, decrement: bool) -> Option<B::Value> {
        let (bo, bi) = (self.instr.bo(), self.instr.bi());
        let mut cond = None;
        if decrement && bo & options::NO_CTR == 0 {
            let ctr = self.spr(RegClass::Ctr);
            let ctr = self.bin_imm(BinaryOp::Sub, ctr, 1);
            self.set_spr(RegClass::Ctr, ctr);
            let op = if bo & options::CTR_ZERO != 0 { CmpOp::Eq } else { CmpOp::Ne };
            cond = Some(self.cmp_imm(op, ctr, 0));
        }
        if bo & options::NO_COND == 0 {
            let bit = self.cr_bit(bi);
            let op = if bo & options::COND_TRUE != 0 { CmpOp::Ne } else { CmpOp::Eq };
            let cr_ok = self.cmp_imm(op, bit, 0);
            cond = Some(match cond {
                Some(ctr_ok) => self.bin(BinaryOp::And, ctr_ok, cr_ok),
                None => cr_ok,
            });
        }
        cond
    }

    /// Branch to `taken` when `cond` holds, else to the next instruction.
    fn branch_if(&mut self, cond: Option<B::Value>, taken: B::Block) {
        match cond {
            Some(cond) => {
                let next = self.next_block();
                self.b.br_cond(cond, taken, next);
            }
            None => self.b.br(taken),
        }
    }

    /// Fill a fresh side block with `body` and return it; the insert point
    /// is left where it was.
    fn side_block(
        &mut self,
        name: &str,
        body: impl FnOnce(&mut Self) -> Result<()>,
    ) -> Result<B::Block> {
        let resume = self.b.insert_block();
        let block = self.b.create_block(&format!("{name}_{:x}", self.pc));
        self.b.set_insert_point(block);
        body(self)?;
        if let Some(resume) = resume {
            self.b.set_insert_point(resume);
        }
        Ok(block)
    }

    fn branch_conditional(&mut self) -> Result<()> {
        let i = self.instr;
        let target = branch_target(self.pc, i.bd(), i.aa());
        let cond = self.branch_condition(true);

        if i.lk() {
            self.link();
            if target == self.pc + 4 {
                // `bcl 20,31,$+4` reads the PC into LR.
                return Ok(());
            }
            let next = self.next_block();
            let call = self.side_block("call", |t| {
                t.call_guest(target)?;
                t.b.br(next);
                Ok(())
            })?;
            self.branch_if(cond, call);
            return Ok(());
        }

        let taken = match self.blocks.get(&target) {
            Some(&block) => block,
            None => {
                let epilog = self.epilog;
                self.side_block("tail", |t| {
                    t.call_guest(target)?;
                    t.b.br(epilog);
                    Ok(())
                })?
            }
        };
        self.branch_if(cond, taken);
        Ok(())
    }

    fn branch_to_lr(&mut self) {
        let target = self.spr(RegClass::Lr);
        let cond = self.branch_condition(true);
        if self.instr.lk() {
            self.link();
            self.indirect_call(cond, target);
        } else {
            let epilog = self.epilog;
            self.branch_if(cond, epilog);
        }
    }

    /// `bcctr` never decrements CTR.
    fn branch_to_ctr(&mut self) -> Result<()> {
        let target = self.spr(RegClass::Ctr);
        let cond = self.branch_condition(false);
        if self.instr.lk() {
            self.link();
            self.indirect_call(cond, target);
        } else {
            let epilog = self.epilog;
            let block = self.side_block("indirect", |t| {
                t.call_indirect(target);
                t.b.br(epilog);
                Ok(())
            })?;
            self.branch_if(cond, block);
        }
        Ok(())
    }

    /// Indirect call to `target` under `cond`, continuing at the next
    /// instruction either way.
    fn indirect_call(&mut self, cond: Option<B::Value>, target: B::Value) {
        match cond {
            Some(cond) => {
                let segment = self.segment;
                let callee = Callee::Extern(segment.thunks.indirect_call.clone());
                self.spill_arguments();
                self.b.call_cond(cond, callee, &[target]);
                self.reload_results();
            }
            None => self.call_indirect(target),
        }
    }

    fn cr_logical(&mut self, op: PpuOpcode) {
        use PpuOpcode::*;

        let i = self.instr;
        let a = self.cr_bit(i.crba());
        let b = self.cr_bit(i.crbb());
        let value = match op {
            Crand => self.bin(BinaryOp::And, a, b),
            Cror => self.bin(BinaryOp::Or, a, b),
            Crxor => self.bin(BinaryOp::Xor, a, b),
            Crandc | Crorc => {
                let not_b = self.un(UnaryOp::Not, b);
                let kind = if op == Crandc { BinaryOp::And } else { BinaryOp::Or };
                self.bin(kind, a, not_b)
            }
            _ => {
                let kind = match op {
                    Crnand => BinaryOp::And,
                    Crnor => BinaryOp::Or,
                    _ => BinaryOp::Xor,
                };
                let value = self.bin(kind, a, b);
                self.un(UnaryOp::Not, value)
            }
        };
        let bit = self.bin_imm(BinaryOp::And, value, 1);
        self.set_cr_bit(i.crbd(), bit);
    }
}
