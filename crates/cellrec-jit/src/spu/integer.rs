//! Constant formation, word arithmetic, logic, shifts, and compares.
//!
//! Unless noted, operations act on the four 32-bit words independently.

use cellrec_ir::{BinaryOp, CmpOp, IrBuilder, Type, UnaryOp};
use cellrec_isa::SpuOpcode;

use super::SpuTranslator;
use crate::error::Result;
use crate::swar::{lane_add, lane_sub};

impl<B: IrBuilder> SpuTranslator<'_, B> {
    pub(super) fn integer(&mut self, op: SpuOpcode) -> Result<()> {
        use SpuOpcode::*;

        let i = self.instr;
        #[allow(clippy::cast_sign_loss)]
        let (i10, i16) = (i.i10() as u32, i.i16() as u32);
        let (rt, ra, rb) = (i.rt(), i.ra(), i.rb());
        let result = match op {
            Il => self.splat(i16),
            Ilh => self.splat(i.u16() << 16 | i.u16()),
            Ilhu => self.splat(i.u16() << 16),
            Ila => self.splat(i.i18()),
            Iohl => {
                let low = self.splat(i.u16());
                let t = self.reg(rt);
                self.bin(BinaryOp::Or, t, low)
            }
            A => {
                let (a, b) = (self.reg(ra), self.reg(rb));
                lane_add(self.b, a, b, 32)
            }
            Ai => {
                let (a, imm) = (self.reg(ra), self.splat(i10));
                lane_add(self.b, a, imm, 32)
            }
            // Subtract from: rb - ra.
            Sf => {
                let (a, b) = (self.reg(ra), self.reg(rb));
                lane_sub(self.b, b, a, 32)
            }
            Sfi => {
                let (a, imm) = (self.reg(ra), self.splat(i10));
                lane_sub(self.b, imm, a, 32)
            }
            And | Or | Xor => {
                let kind = match op {
                    And => BinaryOp::And,
                    Or => BinaryOp::Or,
                    _ => BinaryOp::Xor,
                };
                let (a, b) = (self.reg(ra), self.reg(rb));
                self.bin(kind, a, b)
            }
            Andc => {
                let (a, b) = (self.reg(ra), self.reg(rb));
                let not_b = self.b.unary(UnaryOp::Not, b);
                self.bin(BinaryOp::And, a, not_b)
            }
            Nor => {
                let (a, b) = (self.reg(ra), self.reg(rb));
                let or = self.bin(BinaryOp::Or, a, b);
                self.b.unary(UnaryOp::Not, or)
            }
            Andi | Ori => {
                let kind = if op == Andi { BinaryOp::And } else { BinaryOp::Or };
                let (a, imm) = (self.reg(ra), self.splat(i10));
                self.bin(kind, a, imm)
            }
            // RRR form: rt_rrr = (rc & rb) | (!rc & ra).
            Selb => {
                let (a, b, c) = (self.reg(ra), self.reg(rb), self.reg(i.rc()));
                let not_c = self.b.unary(UnaryOp::Not, c);
                let from_a = self.bin(BinaryOp::And, a, not_c);
                let from_b = self.bin(BinaryOp::And, b, c);
                let value = self.bin(BinaryOp::Or, from_a, from_b);
                self.set_reg(i.rt_rrr(), value);
                return Ok(());
            }
            Shli => {
                #[allow(clippy::cast_sign_loss)]
                let count = (i.i7() & 0x3F) as u32;
                if count > 31 {
                    self.u128c(0)
                } else {
                    let a = self.reg(ra);
                    let amount = self.b.const_int(Type::I128, u64::from(count));
                    let shifted = self.bin(BinaryOp::Shl, a, amount);
                    let keep = self.splat(u32::MAX << count);
                    self.bin(BinaryOp::And, shifted, keep)
                }
            }
            Ceq | Cgt | Clgt => {
                let cmp = match op {
                    Ceq => CmpOp::Eq,
                    Cgt => CmpOp::Sgt,
                    _ => CmpOp::Ugt,
                };
                let (a, b) = (self.reg(ra), self.reg(rb));
                self.lane_cmp(cmp, a, b)
            }
            Ceqi | Cgti | Clgti => {
                let cmp = match op {
                    Ceqi => CmpOp::Eq,
                    Cgti => CmpOp::Sgt,
                    _ => CmpOp::Ugt,
                };
                let (a, imm) = (self.reg(ra), self.splat(i10));
                self.lane_cmp(cmp, a, imm)
            }
            _ => return Err(self.unimplemented(op)),
        };
        self.set_reg(rt, result);
        Ok(())
    }
}
