//! Floating-point arithmetic, conversion, comparison, and FPSCR access.
//!
//! FPRs hold `F64`. Single-precision forms compute in double and round the
//! result through `F32`. Fused multiply-adds are emitted as a multiply
//! followed by an add.

use cellrec_ir::{BinaryOp, CastOp, CmpOp, IrBuilder, Type, UnaryOp};
use cellrec_isa::PpuOpcode;

use super::{CompareMode, Translator};
use crate::error::Result;
use crate::registers::RegClass;

/// FPSCR mask covering field `field` (0 is the most significant nibble).
const fn fpscr_field_mask(field: u32) -> u64 {
    0xF << (28 - 4 * field)
}

impl<B: IrBuilder> Translator<'_, B> {
    pub(super) fn float(&mut self, op: PpuOpcode) -> Result<()> {
        use PpuOpcode::*;

        let i = self.instr;
        let (d, a, b, c) = (i.rd(), i.ra(), i.rb(), i.rc_reg());
        match op {
            Fadd | Fadds | Fsub | Fsubs | Fdiv | Fdivs => {
                let kind = match op {
                    Fadd | Fadds => BinaryOp::FAdd,
                    Fsub | Fsubs => BinaryOp::FSub,
                    _ => BinaryOp::FDiv,
                };
                let (fa, fb) = (self.fpr(a), self.fpr(b));
                let result = self.bin(kind, fa, fb);
                self.set_float_result(op, result);
            }
            Fmul | Fmuls => {
                let (fa, fc) = (self.fpr(a), self.fpr(c));
                let result = self.bin(BinaryOp::FMul, fa, fc);
                self.set_float_result(op, result);
            }
            Fmadd | Fmadds | Fmsub | Fmsubs | Fnmadd | Fnmadds | Fnmsub | Fnmsubs => {
                let (fa, fb, fc) = (self.fpr(a), self.fpr(b), self.fpr(c));
                let product = self.bin(BinaryOp::FMul, fa, fc);
                let kind = if matches!(op, Fmadd | Fmadds | Fnmadd | Fnmadds) {
                    BinaryOp::FAdd
                } else {
                    BinaryOp::FSub
                };
                let mut result = self.bin(kind, product, fb);
                if matches!(op, Fnmadd | Fnmadds | Fnmsub | Fnmsubs) {
                    result = self.un(UnaryOp::FNeg, result);
                }
                self.set_float_result(op, result);
            }
            Fsqrt | Fsqrts => {
                let fb = self.fpr(b);
                let result = self.un(UnaryOp::FSqrt, fb);
                self.set_float_result(op, result);
            }
            Fres => {
                let fb = self.fpr(b);
                let one = self.b.const_float(Type::F64, 1.0);
                let result = self.bin(BinaryOp::FDiv, one, fb);
                self.set_float_result(op, result);
            }
            Frsqrte => {
                let fb = self.fpr(b);
                let root = self.un(UnaryOp::FSqrt, fb);
                let one = self.b.const_float(Type::F64, 1.0);
                let result = self.bin(BinaryOp::FDiv, one, root);
                self.set_float_result(op, result);
            }
            Frsp => {
                let fb = self.fpr(b);
                let result = self.round_single(fb);
                self.set_fpr(d, result);
            }
            Fsel => {
                let (fa, fb, fc) = (self.fpr(a), self.fpr(b), self.fpr(c));
                let zero = self.b.const_float(Type::F64, 0.0);
                let gt = self.cmp(CmpOp::FGt, fa, zero);
                let eq = self.cmp(CmpOp::FEq, fa, zero);
                let ge = self.bin(BinaryOp::Or, gt, eq);
                let result = self.b.select(ge, fc, fb);
                self.set_fpr(d, result);
            }
            Fmr | Fabs | Fneg | Fnabs => {
                let fb = self.fpr(b);
                let result = match op {
                    Fmr => fb,
                    Fabs => self.un(UnaryOp::FAbs, fb),
                    Fneg => self.un(UnaryOp::FNeg, fb),
                    _ => {
                        let abs = self.un(UnaryOp::FAbs, fb);
                        self.un(UnaryOp::FNeg, abs)
                    }
                };
                self.set_fpr(d, result);
            }

            // ===== Conversions =====
            Fctiwz => {
                let fb = self.fpr(b);
                let word = self.cast(CastOp::FpToSi, fb, Type::I32);
                let word = self.nan_to_min(fb, word, Type::I32);
                let bits = self.zext(word, Type::I64);
                let result = self.cast(CastOp::Bitcast, bits, Type::F64);
                self.set_fpr(d, result);
            }
            Fctidz => {
                let fb = self.fpr(b);
                let bits = self.cast(CastOp::FpToSi, fb, Type::I64);
                let bits = self.nan_to_min(fb, bits, Type::I64);
                let result = self.cast(CastOp::Bitcast, bits, Type::F64);
                self.set_fpr(d, result);
            }
            Fcfid => {
                let fb = self.fpr(b);
                let bits = self.cast(CastOp::Bitcast, fb, Type::I64);
                let result = self.cast(CastOp::SiToFp, bits, Type::F64);
                self.set_fpr(d, result);
            }

            // ===== Comparison =====
            Fcmpu | Fcmpo => {
                let (fa, fb) = (self.fpr(a), self.fpr(b));
                self.update_cr(i.crfd(), fa, fb, CompareMode::Float);
            }

            // ===== FPSCR =====
            Mffs => {
                let fpscr = self.spr(RegClass::Fpscr);
                let bits = self.zext(fpscr, Type::I64);
                let result = self.cast(CastOp::Bitcast, bits, Type::F64);
                self.set_fpr(d, result);
            }
            Mtfsf => {
                let mask = (0..8)
                    .filter(|field| i.fm() & (0x80 >> field) != 0)
                    .fold(0, |mask, field| mask | fpscr_field_mask(field));
                let fb = self.fpr(b);
                let bits = self.cast(CastOp::Bitcast, fb, Type::I64);
                let bits = self.trunc(bits, Type::I32);
                self.write_fpscr(bits, mask);
            }
            Mtfsfi => {
                #[allow(clippy::cast_possible_truncation)]
                let field = i.crfd() as u32;
                let imm = u64::from(i.bits(16, 19)) << (28 - 4 * field);
                let bits = self.int(Type::I32, imm);
                self.write_fpscr(bits, fpscr_field_mask(field));
            }
            Mtfsb0 | Mtfsb1 => {
                let bit = 1u64 << (31 - i.crbd());
                let value = if op == Mtfsb1 { bit } else { 0 };
                let bits = self.int(Type::I32, value);
                self.write_fpscr(bits, bit);
            }
            _ => return Err(self.unimplemented(op)),
        }
        if i.rc() {
            self.update_cr1();
        }
        Ok(())
    }

    /// Conversions saturate out-of-range inputs; a NaN input converts to
    /// the most negative integer of `ty`.
    fn nan_to_min(&mut self, input: B::Value, converted: B::Value, ty: Type) -> B::Value {
        let nan = self.cmp(CmpOp::FUno, input, input);
        let min = self.int(ty, 1u64 << (ty.bits() - 1));
        self.b.select(nan, min, converted)
    }

    /// Round a double to single precision and widen it back.
    fn round_single(&mut self, value: B::Value) -> B::Value {
        let single = self.cast(CastOp::FpTrunc, value, Type::F32);
        self.cast(CastOp::FpExt, single, Type::F64)
    }

    /// Write an arithmetic result to frD, rounding single-precision forms.
    fn set_float_result(&mut self, op: PpuOpcode, result: B::Value) {
        use PpuOpcode::*;

        let single = matches!(
            op,
            Fadds | Fsubs | Fmuls | Fdivs | Fmadds | Fmsubs | Fnmadds | Fnmsubs | Fsqrts | Fres
        );
        let result = if single {
            self.round_single(result)
        } else {
            result
        };
        self.set_fpr(self.instr.rd(), result);
    }

    /// FPSCR = (FPSCR & !mask) | (bits & mask).
    fn write_fpscr(&mut self, bits: B::Value, mask: u64) {
        let fpscr = self.spr(RegClass::Fpscr);
        let kept = self.bin_imm(BinaryOp::And, fpscr, !mask);
        let new = self.bin_imm(BinaryOp::And, bits, mask);
        let value = self.bin(BinaryOp::Or, kept, new);
        self.set_spr(RegClass::Fpscr, value);
    }
}
