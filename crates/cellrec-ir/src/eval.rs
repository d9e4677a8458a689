//! Constant evaluation of IR operations.
//!
//! Values are carried as `u128` bit patterns masked to their type. Shared by
//! the interpreter and constant folding so both agree on semantics.

use crate::{BinaryOp, CastOp, CmpOp, Type, UnaryOp};

#[inline]
fn sext(bits: u128, ty: Type) -> i128 {
    let shift = 128 - ty.bits();
    ((bits << shift) as i128) >> shift
}

#[inline]
#[allow(clippy::cast_possible_truncation)]
fn as_f64(bits: u128, ty: Type) -> f64 {
    match ty {
        Type::F32 => f64::from(f32::from_bits(bits as u32)),
        _ => f64::from_bits(bits as u64),
    }
}

#[inline]
#[allow(clippy::cast_possible_truncation)]
fn from_f64(value: f64, ty: Type) -> u128 {
    match ty {
        Type::F32 => u128::from((value as f32).to_bits()),
        _ => u128::from(value.to_bits()),
    }
}

/// Evaluate a binary operation.
pub fn binary(op: BinaryOp, ty: Type, lhs: u128, rhs: u128) -> u128 {
    let width = ty.bits();
    let mask = ty.mask();
    let (a, b) = (lhs & mask, rhs & mask);
    let amount = if width == 1 { 0 } else { (b % u128::from(width)) as u32 };
    let result = match op {
        BinaryOp::Add => a.wrapping_add(b),
        BinaryOp::Sub => a.wrapping_sub(b),
        BinaryOp::Mul => a.wrapping_mul(b),
        BinaryOp::MulHiS => mul_hi(sext(a, ty), sext(b, ty), width, true),
        BinaryOp::MulHiU => mul_hi(a as i128, b as i128, width, false),
        BinaryOp::SDiv => {
            let (x, y) = (sext(a, ty), sext(b, ty));
            let min = if width == 128 { i128::MIN } else { -(1i128 << (width - 1)) };
            if y == 0 || (x == min && y == -1) { 0 } else { x.wrapping_div(y) as u128 }
        }
        BinaryOp::UDiv => a.checked_div(b).unwrap_or(0),
        BinaryOp::And => a & b,
        BinaryOp::Or => a | b,
        BinaryOp::Xor => a ^ b,
        BinaryOp::Shl => a << amount,
        BinaryOp::LShr => a >> amount,
        BinaryOp::AShr => (sext(a, ty) >> amount) as u128,
        BinaryOp::Rotl => {
            if amount == 0 {
                a
            } else {
                (a << amount) | (a >> (width - amount))
            }
        }
        BinaryOp::FAdd => from_f64(as_f64(a, ty) + as_f64(b, ty), ty),
        BinaryOp::FSub => from_f64(as_f64(a, ty) - as_f64(b, ty), ty),
        BinaryOp::FMul => from_f64(as_f64(a, ty) * as_f64(b, ty), ty),
        BinaryOp::FDiv => from_f64(as_f64(a, ty) / as_f64(b, ty), ty),
    };
    result & mask
}

/// High half of a double-width product; widths above 64 fall back to 0.
fn mul_hi(a: i128, b: i128, width: u32, signed: bool) -> u128 {
    if width > 64 {
        return 0;
    }
    let product = if signed {
        a.wrapping_mul(b) as u128
    } else {
        (a as u128).wrapping_mul(b as u128)
    };
    product >> width
}

/// Evaluate a unary operation.
pub fn unary(op: UnaryOp, ty: Type, arg: u128) -> u128 {
    let mask = ty.mask();
    let a = arg & mask;
    let result = match op {
        UnaryOp::Not => !a,
        UnaryOp::Neg => a.wrapping_neg(),
        UnaryOp::Clz => u128::from(a.leading_zeros() - (128 - ty.bits())),
        UnaryOp::Bswap => a.swap_bytes() >> (128 - ty.bits()),
        UnaryOp::FNeg => from_f64(-as_f64(a, ty), ty),
        UnaryOp::FAbs => from_f64(as_f64(a, ty).abs(), ty),
        UnaryOp::FSqrt => from_f64(as_f64(a, ty).sqrt(), ty),
    };
    result & mask
}

/// Evaluate a comparison of two operands of type `ty`.
pub fn cmp(op: CmpOp, ty: Type, lhs: u128, rhs: u128) -> bool {
    let mask = ty.mask();
    let (a, b) = (lhs & mask, rhs & mask);
    match op {
        CmpOp::Eq => a == b,
        CmpOp::Ne => a != b,
        CmpOp::Slt => sext(a, ty) < sext(b, ty),
        CmpOp::Sgt => sext(a, ty) > sext(b, ty),
        CmpOp::Sle => sext(a, ty) <= sext(b, ty),
        CmpOp::Sge => sext(a, ty) >= sext(b, ty),
        CmpOp::Ult => a < b,
        CmpOp::Ugt => a > b,
        CmpOp::Ule => a <= b,
        CmpOp::Uge => a >= b,
        CmpOp::FEq => as_f64(a, ty) == as_f64(b, ty),
        CmpOp::FLt => as_f64(a, ty) < as_f64(b, ty),
        CmpOp::FGt => as_f64(a, ty) > as_f64(b, ty),
        CmpOp::FUno => as_f64(a, ty).is_nan() || as_f64(b, ty).is_nan(),
    }
}

/// Evaluate a conversion from `from` to `to`.
#[allow(clippy::cast_possible_truncation)]
pub fn cast(op: CastOp, from: Type, to: Type, arg: u128) -> u128 {
    let a = arg & from.mask();
    let result = match op {
        CastOp::Trunc | CastOp::ZExt | CastOp::Bitcast => a,
        CastOp::SExt => sext(a, from) as u128,
        CastOp::FpToSi => {
            let value = as_f64(a, from);
            match to.bits() {
                8 => (value as i8) as u128,
                16 => (value as i16) as u128,
                32 => (value as i32) as u128,
                64 => (value as i64) as u128,
                _ => (value as i128) as u128,
            }
        }
        CastOp::SiToFp => from_f64(sext(a, from) as f64, to),
        CastOp::FpExt | CastOp::FpTrunc => from_f64(as_f64(a, from), to),
    };
    result & to.mask()
}

/// Encode a float constant of type `ty`.
pub fn float_bits(value: f64, ty: Type) -> u128 {
    from_f64(value, ty)
}

/// Decode a float value of type `ty`.
pub fn float_value(bits: u128, ty: Type) -> f64 {
    as_f64(bits, ty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapping_arithmetic() {
        assert_eq!(binary(BinaryOp::Add, Type::I64, 1, u128::from(u64::MAX)), 0);
        assert_eq!(binary(BinaryOp::Sub, Type::I32, 0, 1), 0xFFFF_FFFF);
        assert_eq!(binary(BinaryOp::Mul, Type::I8, 16, 16), 0);
    }

    #[test]
    fn test_division_edge_cases() {
        assert_eq!(binary(BinaryOp::UDiv, Type::I64, 10, 0), 0);
        assert_eq!(binary(BinaryOp::SDiv, Type::I32, 0x8000_0000, 0xFFFF_FFFF), 0);
        assert_eq!(binary(BinaryOp::SDiv, Type::I32, 0xFFFF_FFF6, 2), 0xFFFF_FFFB);
    }

    #[test]
    fn test_shifts_and_rotates() {
        assert_eq!(binary(BinaryOp::Shl, Type::I32, 1, 33), 2);
        assert_eq!(binary(BinaryOp::AShr, Type::I32, 0x8000_0000, 4), 0xF800_0000);
        assert_eq!(binary(BinaryOp::Rotl, Type::I32, 0x8000_0001, 1), 3);
        assert_eq!(binary(BinaryOp::Rotl, Type::I64, 5, 0), 5);
    }

    #[test]
    fn test_mul_high() {
        let max = u128::from(u64::MAX);
        assert_eq!(binary(BinaryOp::MulHiU, Type::I64, max, max), max - 1);
        assert_eq!(binary(BinaryOp::MulHiS, Type::I64, max, max), 0);
        assert_eq!(binary(BinaryOp::MulHiS, Type::I32, 0xFFFF_FFFF, 2), 0xFFFF_FFFF);
    }

    #[test]
    fn test_unary() {
        assert_eq!(unary(UnaryOp::Clz, Type::I32, 1), 31);
        assert_eq!(unary(UnaryOp::Clz, Type::I64, 0), 64);
        assert_eq!(unary(UnaryOp::Bswap, Type::I32, 0x1122_3344), 0x4433_2211);
        assert_eq!(unary(UnaryOp::Not, Type::I8, 0), 0xFF);
    }

    #[test]
    fn test_signed_vs_unsigned_compare() {
        let all_ones = u128::from(u64::MAX);
        assert!(cmp(CmpOp::Slt, Type::I64, all_ones, 1));
        assert!(cmp(CmpOp::Ugt, Type::I64, all_ones, 1));
    }

    #[test]
    fn test_float_ops() {
        let a = float_bits(1.5, Type::F64);
        let b = float_bits(2.0, Type::F64);
        assert_eq!(float_value(binary(BinaryOp::FMul, Type::F64, a, b), Type::F64), 3.0);
        let nan = float_bits(f64::NAN, Type::F64);
        assert!(cmp(CmpOp::FUno, Type::F64, nan, a));
        assert!(!cmp(CmpOp::FEq, Type::F64, nan, nan));
    }

    #[test]
    fn test_casts() {
        assert_eq!(cast(CastOp::SExt, Type::I16, Type::I64, 0x8000), 0xFFFF_FFFF_FFFF_8000);
        assert_eq!(cast(CastOp::Trunc, Type::I64, Type::I32, 0x1_0000_0002), 2);
        let f = float_bits(-3.7, Type::F64);
        assert_eq!(cast(CastOp::FpToSi, Type::F64, Type::I32, f), 0xFFFF_FFFD);
        let single = cast(CastOp::FpTrunc, Type::F64, Type::F32, float_bits(0.5, Type::F64));
        assert_eq!(float_value(single, Type::F32), 0.5);
    }
}
