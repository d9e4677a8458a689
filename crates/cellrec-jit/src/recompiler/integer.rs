//! Fixed-point arithmetic, logical, rotate, and compare instructions.

use cellrec_ir::{BinaryOp, CmpOp, IrBuilder, Type, UnaryOp};
use cellrec_isa::PpuOpcode;

use super::{CompareMode, Translator, rotate_mask};
use crate::error::Result;
use crate::registers::xer;

/// Carry input of the add/subtract family.
#[derive(Clone, Copy)]
enum CarryIn {
    Zero,
    One,
    Xer,
}

impl<B: IrBuilder> Translator<'_, B> {
    pub(super) fn integer(&mut self, op: PpuOpcode) -> Result<()> {
        use PpuOpcode::*;

        let i = self.instr;
        match op {
            Add | Addc | Adde | Addme | Addze | Neg | Subf | Subfc | Subfe | Subfme | Subfze => {
                self.add_family(op);
            }
            Addi | Addis => {
                let base = self.gpr_or_zero(i.ra());
                let imm = if op == Addis { i.simm() << 16 } else { i.simm() };
                let result = self.bin_imm(BinaryOp::Add, base, imm.cast_unsigned());
                self.set_gpr(i.rd(), result);
            }
            Addic | AddicRc => {
                let ra = self.gpr(i.ra());
                let imm = self.i64c(i.simm().cast_unsigned());
                let (sum, carry) = self.add_carry(ra, imm, CarryIn::Zero);
                self.set_ca(carry);
                self.set_gpr(i.rd(), sum);
                if op == AddicRc {
                    self.update_cr0(sum);
                }
            }
            Subfic => {
                let ra = self.gpr(i.ra());
                let not_ra = self.un(UnaryOp::Not, ra);
                let imm = self.i64c(i.simm().cast_unsigned());
                let (diff, carry) = self.add_carry(not_ra, imm, CarryIn::One);
                self.set_ca(carry);
                self.set_gpr(i.rd(), diff);
            }
            Mulli => {
                let ra = self.gpr(i.ra());
                let product = self.bin_imm(BinaryOp::Mul, ra, i.simm().cast_unsigned());
                self.set_gpr(i.rd(), product);
            }
            Mulhd | Mulhdu | Mulhw | Mulhwu | Mulld | Mullw | Divd | Divdu | Divw | Divwu => {
                self.mul_div(op);
            }
            And | Andc | Eqv | Nand | Nor | Or | Orc | Xor => {
                let rs = self.gpr(i.rs());
                let rb = self.gpr(i.rb());
                let result = self.logical(op, rs, rb);
                self.set_gpr(i.ra(), result);
                self.record(result);
            }
            AndiRc | AndisRc | Ori | Oris | Xori | Xoris => {
                let rs = self.gpr(i.rs());
                let shift = if matches!(op, AndisRc | Oris | Xoris) { 16 } else { 0 };
                let op_kind = match op {
                    AndiRc | AndisRc => BinaryOp::And,
                    Ori | Oris => BinaryOp::Or,
                    _ => BinaryOp::Xor,
                };
                let result = self.bin_imm(op_kind, rs, i.uimm() << shift);
                self.set_gpr(i.ra(), result);
                if matches!(op, AndiRc | AndisRc) {
                    self.update_cr0(result);
                }
            }
            Cntlzw | Cntlzd | Extsb | Extsh | Extsw => {
                let rs = self.gpr(i.rs());
                let result = match op {
                    Cntlzd => self.un(UnaryOp::Clz, rs),
                    Cntlzw => {
                        let word = self.trunc(rs, Type::I32);
                        let count = self.un(UnaryOp::Clz, word);
                        self.zext(count, Type::I64)
                    }
                    _ => {
                        let ty = match op {
                            Extsb => Type::I8,
                            Extsh => Type::I16,
                            _ => Type::I32,
                        };
                        let narrow = self.trunc(rs, ty);
                        self.sext(narrow, Type::I64)
                    }
                };
                self.set_gpr(i.ra(), result);
                self.record(result);
            }
            Slw | Srw | Sld | Srd | Sraw | Srad | Srawi | Sradi => self.shift(op),
            Rlwinm | Rlwnm | Rlwimi | Rldicl | Rldicr | Rldic | Rldimi | Rldcl | Rldcr => {
                self.rotate(op);
            }
            Cmp | Cmpl | Cmpi | Cmpli => self.compare(op),
            _ => return Err(self.unimplemented(op)),
        }
        Ok(())
    }

    /// CR0 update of record (`.`) forms.
    fn record(&mut self, result: B::Value) {
        if self.instr.rc() {
            self.update_cr0(result);
        }
    }

    /// `x + y + carry_in` on 64 bits, returning the sum and the carry out.
    fn add_carry(&mut self, x: B::Value, y: B::Value, carry_in: CarryIn) -> (B::Value, B::Value) {
        let wide_x = self.zext(x, Type::I128);
        let wide_y = self.zext(y, Type::I128);
        let mut wide = self.bin(BinaryOp::Add, wide_x, wide_y);
        let cin = match carry_in {
            CarryIn::Zero => None,
            CarryIn::One => Some(self.int(Type::I128, 1)),
            CarryIn::Xer => {
                let ca = self.xer(xer::CA);
                Some(self.zext(ca, Type::I128))
            }
        };
        if let Some(cin) = cin {
            wide = self.bin(BinaryOp::Add, wide, cin);
        }
        let sum = self.trunc(wide, Type::I64);
        let high = self.bin_imm(BinaryOp::LShr, wide, 64);
        let carry = self.trunc(high, Type::I1);
        (sum, carry)
    }

    /// Add, subtract-from, and negate, all expressed as `x + y + cin`.
    fn add_family(&mut self, op: PpuOpcode) {
        use PpuOpcode::*;

        let i = self.instr;
        let ra = self.gpr(i.ra());
        let x = if matches!(op, Subf | Subfc | Subfe | Subfme | Subfze | Neg) {
            self.un(UnaryOp::Not, ra)
        } else {
            ra
        };
        let y = match op {
            Add | Addc | Adde | Subf | Subfc | Subfe => self.gpr(i.rb()),
            Addme | Subfme => self.i64c(u64::MAX),
            _ => self.i64c(0),
        };
        let carry_in = match op {
            Add | Addc => CarryIn::Zero,
            Subf | Subfc | Neg => CarryIn::One,
            _ => CarryIn::Xer,
        };
        let (sum, carry) = self.add_carry(x, y, carry_in);
        if !matches!(op, Add | Subf | Neg) {
            self.set_ca(carry);
        }
        if i.oe() {
            // Signed overflow: both inputs share a sign the result lacks.
            let xs = self.bin(BinaryOp::Xor, x, sum);
            let ys = self.bin(BinaryOp::Xor, y, sum);
            let both = self.bin(BinaryOp::And, xs, ys);
            let ov = self.cmp_imm(CmpOp::Slt, both, 0);
            self.set_ov(ov);
        }
        self.set_gpr(i.rd(), sum);
        self.record(sum);
    }

    fn mul_div(&mut self, op: PpuOpcode) {
        use PpuOpcode::*;

        let i = self.instr;
        let ra = self.gpr(i.ra());
        let rb = self.gpr(i.rb());
        let (result, overflow) = match op {
            Mulld => {
                let lo = self.bin(BinaryOp::Mul, ra, rb);
                let hi = self.bin(BinaryOp::MulHiS, ra, rb);
                let sign = self.bin_imm(BinaryOp::AShr, lo, 63);
                let ov = self.cmp(CmpOp::Ne, hi, sign);
                (lo, Some(ov))
            }
            Mullw => {
                let a = self.low_word(ra, true);
                let b = self.low_word(rb, true);
                let product = self.bin(BinaryOp::Mul, a, b);
                let fits = self.low_word(product, true);
                let ov = self.cmp(CmpOp::Ne, product, fits);
                (product, Some(ov))
            }
            Mulhd => (self.bin(BinaryOp::MulHiS, ra, rb), None),
            Mulhdu => (self.bin(BinaryOp::MulHiU, ra, rb), None),
            Mulhw | Mulhwu => {
                let signed = op == Mulhw;
                let a = self.low_word(ra, signed);
                let b = self.low_word(rb, signed);
                let product = self.bin(BinaryOp::Mul, a, b);
                let shift = if signed { BinaryOp::AShr } else { BinaryOp::LShr };
                (self.bin_imm(shift, product, 32), None)
            }
            Divd | Divdu => {
                let signed = op == Divd;
                let quotient = self.bin(if signed { BinaryOp::SDiv } else { BinaryOp::UDiv }, ra, rb);
                let ov = self.div_overflow(ra, rb, signed, i64::MIN.cast_unsigned());
                (quotient, Some(ov))
            }
            _ => {
                let signed = op == Divw;
                let a = self.trunc(ra, Type::I32);
                let b = self.trunc(rb, Type::I32);
                let op = if signed { BinaryOp::SDiv } else { BinaryOp::UDiv };
                let quotient = self.bin(op, a, b);
                let ov = self.div_overflow(a, b, signed, u64::from(i32::MIN.cast_unsigned()));
                let quotient = if signed {
                    self.sext(quotient, Type::I64)
                } else {
                    self.zext(quotient, Type::I64)
                };
                (quotient, Some(ov))
            }
        };
        if i.oe()
            && let Some(ov) = overflow
        {
            self.set_ov(ov);
        }
        self.set_gpr(i.rd(), result);
        self.record(result);
    }

    /// Low 32 bits of `value`, extended back to 64.
    fn low_word(&mut self, value: B::Value, signed: bool) -> B::Value {
        let word = self.trunc(value, Type::I32);
        if signed {
            self.sext(word, Type::I64)
        } else {
            self.zext(word, Type::I64)
        }
    }

    /// Division overflow: zero divisor, or `MIN / -1` when signed.
    fn div_overflow(&mut self, a: B::Value, b: B::Value, signed: bool, min: u64) -> B::Value {
        let by_zero = self.cmp_imm(CmpOp::Eq, b, 0);
        if !signed {
            return by_zero;
        }
        let is_min = self.cmp_imm(CmpOp::Eq, a, min);
        let minus_one = self.cmp_imm(CmpOp::Eq, b, u64::MAX);
        let both = self.bin(BinaryOp::And, is_min, minus_one);
        self.bin(BinaryOp::Or, by_zero, both)
    }

    fn logical(&mut self, op: PpuOpcode, rs: B::Value, rb: B::Value) -> B::Value {
        use PpuOpcode::*;

        match op {
            And => self.bin(BinaryOp::And, rs, rb),
            Or => self.bin(BinaryOp::Or, rs, rb),
            Xor => self.bin(BinaryOp::Xor, rs, rb),
            Andc | Orc => {
                let not_rb = self.un(UnaryOp::Not, rb);
                let kind = if op == Andc { BinaryOp::And } else { BinaryOp::Or };
                self.bin(kind, rs, not_rb)
            }
            _ => {
                let kind = match op {
                    Eqv => BinaryOp::Xor,
                    Nand => BinaryOp::And,
                    _ => BinaryOp::Or,
                };
                let value = self.bin(kind, rs, rb);
                self.un(UnaryOp::Not, value)
            }
        }
    }

    fn shift(&mut self, op: PpuOpcode) {
        use PpuOpcode::*;

        let i = self.instr;
        let rs = self.gpr(i.rs());
        let result = match op {
            Slw | Srw => {
                let rb = self.gpr(i.rb());
                let amount = self.bin_imm(BinaryOp::And, rb, 0x3F);
                let word = self.low_word(rs, false);
                let kind = if op == Slw { BinaryOp::Shl } else { BinaryOp::LShr };
                let shifted = self.bin(kind, word, amount);
                self.bin_imm(BinaryOp::And, shifted, 0xFFFF_FFFF)
            }
            Sld | Srd => {
                let rb = self.gpr(i.rb());
                let amount = self.bin_imm(BinaryOp::And, rb, 0x7F);
                let kind = if op == Sld { BinaryOp::Shl } else { BinaryOp::LShr };
                let shifted = self.bin(kind, rs, amount);
                let out_of_range = self.cmp_imm(CmpOp::Uge, amount, 64);
                let zero = self.i64c(0);
                self.b.select(out_of_range, zero, shifted)
            }
            Sraw | Srawi => {
                let amount = if op == Sraw {
                    let rb = self.gpr(i.rb());
                    self.bin_imm(BinaryOp::And, rb, 0x3F)
                } else {
                    self.i64c(u64::from(i.sh()))
                };
                // The sign-extended word saturates at 32+ bit shifts.
                let word = self.low_word(rs, true);
                let result = self.bin(BinaryOp::AShr, word, amount);
                let lost = self.shifted_out(word, result, amount);
                self.set_arith_carry(word, lost);
                result
            }
            _ => {
                let (amount, saturated) = if op == Srad {
                    let rb = self.gpr(i.rb());
                    let n = self.bin_imm(BinaryOp::And, rb, 0x7F);
                    let saturated = self.cmp_imm(CmpOp::Uge, n, 64);
                    let max = self.i64c(63);
                    let amount = self.b.select(saturated, max, n);
                    (amount, Some(saturated))
                } else {
                    (self.i64c(u64::from(i.sh64())), None)
                };
                let result = self.bin(BinaryOp::AShr, rs, amount);
                let mut lost = self.shifted_out(rs, result, amount);
                if let Some(saturated) = saturated {
                    lost = self.bin(BinaryOp::Or, lost, saturated);
                }
                self.set_arith_carry(rs, lost);
                result
            }
        };
        self.set_gpr(i.ra(), result);
        self.record(result);
    }

    /// Whether shifting `value` right by `amount` into `result` dropped one bits.
    fn shifted_out(&mut self, value: B::Value, result: B::Value, amount: B::Value) -> B::Value {
        let back = self.bin(BinaryOp::Shl, result, amount);
        self.cmp(CmpOp::Ne, back, value)
    }

    /// CA of algebraic right shifts: negative source and lost one bits.
    fn set_arith_carry(&mut self, value: B::Value, lost: B::Value) {
        let negative = self.cmp_imm(CmpOp::Slt, value, 0);
        let carry = self.bin(BinaryOp::And, negative, lost);
        self.set_ca(carry);
    }

    /// Low word rotated left by `amount` and replicated into both halves.
    fn rotate_word(&mut self, rs: B::Value, amount: B::Value) -> B::Value {
        let word = self.trunc(rs, Type::I32);
        let rotated = self.bin(BinaryOp::Rotl, word, amount);
        let low = self.zext(rotated, Type::I64);
        let high = self.bin_imm(BinaryOp::Shl, low, 32);
        self.bin(BinaryOp::Or, high, low)
    }

    /// `(rotated & mask) | (ra & !mask)`
    fn insert(&mut self, rotated: B::Value, ra: B::Value, mask: u64) -> B::Value {
        let inserted = self.bin_imm(BinaryOp::And, rotated, mask);
        let kept = self.bin_imm(BinaryOp::And, ra, !mask);
        self.bin(BinaryOp::Or, inserted, kept)
    }

    fn rotate(&mut self, op: PpuOpcode) {
        use PpuOpcode::*;

        let i = self.instr;
        let rs = self.gpr(i.rs());
        let result = match op {
            Rlwinm | Rlwimi | Rlwnm => {
                let amount = if op == Rlwnm {
                    let rb = self.gpr(i.rb());
                    self.trunc(rb, Type::I32)
                } else {
                    self.int(Type::I32, u64::from(i.sh()))
                };
                let rotated = self.rotate_word(rs, amount);
                let mask = rotate_mask(i.mb() + 32, i.me() + 32);
                if op == Rlwimi {
                    let ra = self.gpr(i.ra());
                    self.insert(rotated, ra, mask)
                } else {
                    self.bin_imm(BinaryOp::And, rotated, mask)
                }
            }
            Rldicl | Rldicr | Rldic | Rldimi => {
                let sh = i.sh64();
                let rotated = self.bin_imm(BinaryOp::Rotl, rs, u64::from(sh));
                let mask = match op {
                    Rldicl => rotate_mask(i.mb64(), 63),
                    Rldicr => rotate_mask(0, i.mb64()),
                    _ => rotate_mask(i.mb64(), 63 - sh),
                };
                if op == Rldimi {
                    let ra = self.gpr(i.ra());
                    self.insert(rotated, ra, mask)
                } else {
                    self.bin_imm(BinaryOp::And, rotated, mask)
                }
            }
            _ => {
                let rb = self.gpr(i.rb());
                let rotated = self.bin(BinaryOp::Rotl, rs, rb);
                let mask = if op == Rldcl {
                    rotate_mask(i.mb64(), 63)
                } else {
                    rotate_mask(0, i.mb64())
                };
                self.bin_imm(BinaryOp::And, rotated, mask)
            }
        };
        self.set_gpr(i.ra(), result);
        self.record(result);
    }

    fn compare(&mut self, op: PpuOpcode) {
        use PpuOpcode::*;

        let i = self.instr;
        let wide = i.l10();
        let ty = if wide { Type::I64 } else { Type::I32 };
        let mode = if matches!(op, Cmp | Cmpi) {
            CompareMode::Signed
        } else {
            CompareMode::Unsigned
        };
        let ra = self.gpr(i.ra());
        let lhs = if wide { ra } else { self.trunc(ra, ty) };
        let rhs = match op {
            Cmp | Cmpl => {
                let rb = self.gpr(i.rb());
                if wide { rb } else { self.trunc(rb, ty) }
            }
            Cmpi => self.int(ty, i.simm().cast_unsigned()),
            _ => self.int(ty, i.uimm()),
        };
        self.update_cr(i.crfd(), lhs, rhs, mode);
    }
}
