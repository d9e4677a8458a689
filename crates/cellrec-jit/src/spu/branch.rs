//! Branches, calls, `stop`, and the no-op and hint instructions.

use cellrec_ir::{BinaryOp, Callee, CastOp, CmpOp, IrBuilder, Type};
use cellrec_isa::SpuOpcode;

use super::state::offsets;
use super::{LSLR, SpuTranslator, ri16_target};
use crate::error::Result;

/// Register `bi` returns through.
const LINK_REGISTER: usize = 0;

impl<B: IrBuilder> SpuTranslator<'_, B> {
    pub(super) fn branch(&mut self, op: SpuOpcode) -> Result<()> {
        use SpuOpcode::*;

        let i = self.instr;
        let (rt, ra) = (i.rt(), i.ra());
        match op {
            Nop | Lnop | Hbr | Hbra | Hbrr => {}
            Br | Bra => {
                let target = ri16_target(self.pc, i, op == Bra);
                match self.blocks.get(&target) {
                    Some(&block) => self.b.br(block),
                    None => self.tail_call(target),
                }
            }
            Brz | Brnz => {
                let cmp = if op == Brz { CmpOp::Eq } else { CmpOp::Ne };
                let word = self.reg_word(rt);
                let zero = self.b.const_int(Type::I32, 0);
                let cond = self.b.cmp(cmp, word, zero);
                let taken = self.target_block(ri16_target(self.pc, i, false));
                let next = self.next_block();
                self.b.br_cond(cond, taken, next);
            }
            Brsl | Brasl => {
                let target = ri16_target(self.pc, i, op == Brasl);
                self.set_link(rt);
                self.b.call(Callee::Guest(target), &[], None);
            }
            Bi => self.indirect_jump(ra),
            Bisl => {
                let target = self.indirect_target(ra);
                self.set_link(rt);
                let thunk = self.thunks.indirect_call.clone();
                self.b.call(Callee::Extern(thunk), &[target], None);
            }
            Biz | Binz => {
                let cmp = if op == Biz { CmpOp::Eq } else { CmpOp::Ne };
                let word = self.reg_word(rt);
                let zero = self.b.const_int(Type::I32, 0);
                let cond = self.b.cmp(cmp, word, zero);
                let taken = self.b.create_block(&format!("indirect_{:x}", self.pc));
                let next = self.next_block();
                self.b.br_cond(cond, taken, next);
                self.b.set_insert_point(taken);
                self.indirect_jump(ra);
            }
            Stop => self.stop(),
            _ => return Err(self.unimplemented(op)),
        }
        Ok(())
    }

    /// Block a conditional branch to `target` jumps to. Targets outside the
    /// function get a block holding a tail call.
    fn target_block(&mut self, target: u64) -> B::Block {
        if let Some(&block) = self.blocks.get(&target) {
            return block;
        }
        let current = self.b.insert_block();
        let block = self.b.create_block(&format!("tail_{target:x}"));
        self.b.set_insert_point(block);
        self.tail_call(target);
        if let Some(current) = current {
            self.b.set_insert_point(current);
        }
        block
    }

    fn tail_call(&mut self, target: u64) {
        self.b.call(Callee::Guest(target), &[], None);
        let epilog = self.epilog;
        self.b.br(epilog);
    }

    /// `bi ra`: a return through the link register, otherwise a tail call
    /// through the indirect-call thunk.
    fn indirect_jump(&mut self, ra: usize) {
        if ra != LINK_REGISTER {
            let target = self.indirect_target(ra);
            let thunk = self.thunks.indirect_call.clone();
            self.b.call(Callee::Extern(thunk), &[target], None);
        }
        let epilog = self.epilog;
        self.b.br(epilog);
    }

    /// Word-aligned local-store address in the preferred slot of `ra`, as
    /// an `I64` thunk argument.
    fn indirect_target(&mut self, ra: usize) -> B::Value {
        let word = self.reg_word(ra);
        let mask = self.b.const_int(Type::I32, u64::from(LSLR & !3));
        let target = self.bin(BinaryOp::And, word, mask);
        self.b.cast(CastOp::ZExt, target, Type::I64)
    }

    /// Write the address of the next instruction to the preferred slot of
    /// `rt`, clearing the other words.
    fn set_link(&mut self, rt: usize) {
        let link = (self.pc + 4) & u64::from(LSLR);
        let value = self.u128c(u128::from(link) << 96);
        self.set_reg(rt, value);
    }

    /// Record the stop address and signal, notify the host, and return.
    #[allow(clippy::cast_possible_truncation)]
    fn stop(&mut self) {
        let signal = self.instr.raw() & 0x3FFF;
        self.store_state_word(offsets::PC, self.pc as u32);
        self.store_state_word(offsets::STOP_SIGNAL, signal);
        let signal = self.b.const_int(Type::I64, u64::from(signal));
        let thunk = self.thunks.stop.clone();
        self.b.call(Callee::Extern(thunk), &[signal], None);
        let epilog = self.epilog;
        self.b.br(epilog);
    }
}
