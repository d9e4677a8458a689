//! Lane-wise arithmetic on `I128` values.
//!
//! Adds and subtracts run as SWAR arithmetic on the whole register so no
//! lane carry crosses into its neighbour. Used by the PPU vector unit and
//! by the SPU, whose registers are all 128 bits wide.

use cellrec_ir::{BinaryOp, CastOp, IrBuilder, Type, UnaryOp};

/// Mask of the top bit of every lane of `lane_bits` width.
pub(crate) const fn lane_high_bits(lane_bits: u32) -> u128 {
    let mut mask = 0u128;
    let mut bit = lane_bits - 1;
    while bit < 128 {
        mask |= 1 << bit;
        bit += lane_bits;
    }
    mask
}

/// `word` in all four 32-bit lanes.
pub(crate) const fn splat32(word: u32) -> u128 {
    let word = word as u128;
    word | (word << 32) | (word << 64) | (word << 96)
}

/// 128-bit constant assembled from two 64-bit halves.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn const_u128<B: IrBuilder>(b: &mut B, value: u128) -> B::Value {
    let lo = b.const_int(Type::I64, value as u64);
    let lo = b.cast(CastOp::ZExt, lo, Type::I128);
    let hi = (value >> 64) as u64;
    if hi == 0 {
        return lo;
    }
    let hi = b.const_int(Type::I64, hi);
    let hi = b.cast(CastOp::ZExt, hi, Type::I128);
    let shift = b.const_int(Type::I128, 64);
    let hi = b.binary(BinaryOp::Shl, hi, shift);
    b.binary(BinaryOp::Or, hi, lo)
}

/// Modular lane add: `((a & L) + (b & L)) ^ ((a ^ b) & H)`.
pub(crate) fn lane_add<B: IrBuilder>(b: &mut B, x: B::Value, y: B::Value, lane_bits: u32) -> B::Value {
    let high = lane_high_bits(lane_bits);
    let h = const_u128(b, high);
    let l = const_u128(b, !high);
    let x_low = b.binary(BinaryOp::And, x, l);
    let y_low = b.binary(BinaryOp::And, y, l);
    let sum = b.binary(BinaryOp::Add, x_low, y_low);
    let diff = b.binary(BinaryOp::Xor, x, y);
    let top = b.binary(BinaryOp::And, diff, h);
    b.binary(BinaryOp::Xor, sum, top)
}

/// Modular lane subtract: `((a | H) - (b & L)) ^ ((a ^ !b) & H)`.
pub(crate) fn lane_sub<B: IrBuilder>(b: &mut B, x: B::Value, y: B::Value, lane_bits: u32) -> B::Value {
    let high = lane_high_bits(lane_bits);
    let h = const_u128(b, high);
    let l = const_u128(b, !high);
    let x_high = b.binary(BinaryOp::Or, x, h);
    let y_low = b.binary(BinaryOp::And, y, l);
    let diff = b.binary(BinaryOp::Sub, x_high, y_low);
    let not_y = b.unary(UnaryOp::Not, y);
    let eqv = b.binary(BinaryOp::Xor, x, not_y);
    let top = b.binary(BinaryOp::And, eqv, h);
    b.binary(BinaryOp::Xor, diff, top)
}
