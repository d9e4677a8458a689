//! Scalar types and operation kinds of the IR.

use std::fmt;

/// IR value type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    I1,
    I8,
    I16,
    I32,
    I64,
    I128,
    F32,
    F64,
}

impl Type {
    /// Width in bits.
    pub const fn bits(self) -> u32 {
        match self {
            Self::I1 => 1,
            Self::I8 => 8,
            Self::I16 => 16,
            Self::I32 | Self::F32 => 32,
            Self::I64 | Self::F64 => 64,
            Self::I128 => 128,
        }
    }

    /// Width in bytes as stored in memory (`I1` occupies one byte).
    pub const fn bytes(self) -> usize {
        match self {
            Self::I1 | Self::I8 => 1,
            Self::I16 => 2,
            Self::I32 | Self::F32 => 4,
            Self::I64 | Self::F64 => 8,
            Self::I128 => 16,
        }
    }

    pub const fn is_int(self) -> bool {
        !self.is_float()
    }

    pub const fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    /// Mask selecting the significant bits of a value of this type.
    pub const fn mask(self) -> u128 {
        match self.bits() {
            128 => u128::MAX,
            n => (1u128 << n) - 1,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::I1 => "i1",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::I128 => "i128",
            Self::F32 => "f32",
            Self::F64 => "f64",
        };
        f.write_str(name)
    }
}

/// Byte order of a memory access.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Endian {
    /// Host byte order.
    #[default]
    Native,
    /// Big-endian regardless of host.
    Big,
}

/// Two-operand operations. Both operands share the result type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    /// High half of the signed double-width product.
    MulHiS,
    /// High half of the unsigned double-width product.
    MulHiU,
    /// Signed division. Division by zero and `MIN / -1` yield 0.
    SDiv,
    /// Unsigned division. Division by zero yields 0.
    UDiv,
    And,
    Or,
    Xor,
    /// Shifts take the amount modulo the type width.
    Shl,
    LShr,
    AShr,
    Rotl,
    FAdd,
    FSub,
    FMul,
    FDiv,
}

impl BinaryOp {
    pub const fn is_float(self) -> bool {
        matches!(self, Self::FAdd | Self::FSub | Self::FMul | Self::FDiv)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::MulHiS => "mulhs",
            Self::MulHiU => "mulhu",
            Self::SDiv => "sdiv",
            Self::UDiv => "udiv",
            Self::And => "and",
            Self::Or => "or",
            Self::Xor => "xor",
            Self::Shl => "shl",
            Self::LShr => "lshr",
            Self::AShr => "ashr",
            Self::Rotl => "rotl",
            Self::FAdd => "fadd",
            Self::FSub => "fsub",
            Self::FMul => "fmul",
            Self::FDiv => "fdiv",
        }
    }
}

/// One-operand operations. The result type equals the operand type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    Neg,
    /// Count leading zeros within the type width.
    Clz,
    /// Byte swap.
    Bswap,
    FNeg,
    FAbs,
    FSqrt,
}

impl UnaryOp {
    pub const fn is_float(self) -> bool {
        matches!(self, Self::FNeg | Self::FAbs | Self::FSqrt)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Not => "not",
            Self::Neg => "neg",
            Self::Clz => "clz",
            Self::Bswap => "bswap",
            Self::FNeg => "fneg",
            Self::FAbs => "fabs",
            Self::FSqrt => "fsqrt",
        }
    }
}

/// Comparisons. The result is always `I1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CmpOp {
    Eq,
    Ne,
    Slt,
    Sgt,
    Sle,
    Sge,
    Ult,
    Ugt,
    Ule,
    Uge,
    /// Ordered float equality.
    FEq,
    /// Ordered float less-than.
    FLt,
    /// Ordered float greater-than.
    FGt,
    /// Either operand is NaN.
    FUno,
}

impl CmpOp {
    pub const fn is_float(self) -> bool {
        matches!(self, Self::FEq | Self::FLt | Self::FGt | Self::FUno)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Slt => "slt",
            Self::Sgt => "sgt",
            Self::Sle => "sle",
            Self::Sge => "sge",
            Self::Ult => "ult",
            Self::Ugt => "ugt",
            Self::Ule => "ule",
            Self::Uge => "uge",
            Self::FEq => "feq",
            Self::FLt => "flt",
            Self::FGt => "fgt",
            Self::FUno => "funo",
        }
    }
}

/// Type conversions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CastOp {
    Trunc,
    ZExt,
    SExt,
    /// Reinterpret bits between equally wide types.
    Bitcast,
    /// Float to signed integer, saturating; NaN converts to the minimum.
    FpToSi,
    SiToFp,
    FpExt,
    FpTrunc,
}

impl CastOp {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Trunc => "trunc",
            Self::ZExt => "zext",
            Self::SExt => "sext",
            Self::Bitcast => "bitcast",
            Self::FpToSi => "fptosi",
            Self::SiToFp => "sitofp",
            Self::FpExt => "fpext",
            Self::FpTrunc => "fptrunc",
        }
    }
}

/// Memory ordering barriers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Barrier {
    /// Full memory barrier (`sync`).
    Full,
    /// Lightweight barrier (`lwsync`).
    Lightweight,
    /// Ordering of I/O accesses (`eieio`).
    Io,
    /// Instruction fetch synchronization (`isync`).
    Instruction,
}

impl Barrier {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Lightweight => "lightweight",
            Self::Io => "io",
            Self::Instruction => "instruction",
        }
    }
}

/// Target of a call.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Callee {
    /// Another translated guest function, by guest address.
    Guest(u64),
    /// A host symbol resolved at emission.
    Extern(String),
}

impl fmt::Display for Callee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Guest(addr) => write!(f, "@guest_{addr:#x}"),
            Self::Extern(name) => write!(f, "@{name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_widths() {
        assert_eq!(Type::I1.bits(), 1);
        assert_eq!(Type::I1.bytes(), 1);
        assert_eq!(Type::F64.bytes(), 8);
        assert_eq!(Type::I32.mask(), 0xFFFF_FFFF);
        assert_eq!(Type::I128.mask(), u128::MAX);
        assert!(Type::F32.is_float());
        assert!(Type::I128.is_int());
    }

    #[test]
    fn test_callee_display() {
        assert_eq!(Callee::Guest(0x1_0000).to_string(), "@guest_0x10000");
        assert_eq!(Callee::Extern("sys".into()).to_string(), "@sys");
    }
}
