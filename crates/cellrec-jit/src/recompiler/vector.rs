//! AltiVec integer and logical operations on 128-bit registers.

use cellrec_ir::{BinaryOp, IrBuilder, UnaryOp};
use cellrec_isa::PpuOpcode;

use super::Translator;
use crate::error::Result;
use crate::swar::{lane_add, lane_sub, splat32};

impl<B: IrBuilder> Translator<'_, B> {
    pub(super) fn vector(&mut self, op: PpuOpcode) -> Result<()> {
        use PpuOpcode::*;

        let i = self.instr;
        let (d, a, b, c) = (i.rd(), i.ra(), i.rb(), i.rc_reg());
        let result = match op {
            Vand | Vor | Vxor => {
                let kind = match op {
                    Vand => BinaryOp::And,
                    Vor => BinaryOp::Or,
                    _ => BinaryOp::Xor,
                };
                let (va, vb) = (self.vr(a), self.vr(b));
                self.bin(kind, va, vb)
            }
            Vandc => {
                let (va, vb) = (self.vr(a), self.vr(b));
                let not_b = self.un(UnaryOp::Not, vb);
                self.bin(BinaryOp::And, va, not_b)
            }
            Vnor => {
                let (va, vb) = (self.vr(a), self.vr(b));
                let or = self.bin(BinaryOp::Or, va, vb);
                self.un(UnaryOp::Not, or)
            }
            Vsel => {
                let (va, vb, vc) = (self.vr(a), self.vr(b), self.vr(c));
                let not_c = self.un(UnaryOp::Not, vc);
                let from_a = self.bin(BinaryOp::And, va, not_c);
                let from_b = self.bin(BinaryOp::And, vb, vc);
                self.bin(BinaryOp::Or, from_a, from_b)
            }
            Vspltisw => {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let word = i.vsimm() as u32;
                self.u128c(splat32(word))
            }
            Vaddubm | Vadduhm | Vadduwm => {
                let lane = match op {
                    Vaddubm => 8,
                    Vadduhm => 16,
                    _ => 32,
                };
                let (va, vb) = (self.vr(a), self.vr(b));
                lane_add(self.b, va, vb, lane)
            }
            Vsubuwm => {
                let (va, vb) = (self.vr(a), self.vr(b));
                lane_sub(self.b, va, vb, 32)
            }
            _ => return Err(self.unimplemented(op)),
        };
        self.set_vr(d, result);
        Ok(())
    }
}

