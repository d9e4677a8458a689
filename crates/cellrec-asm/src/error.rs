//! Encoder errors.

use thiserror::Error;

/// Encoding failed. Nothing is written for the offending instruction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("register index {index} out of range (max {max})")]
    RegisterOutOfRange { index: u32, max: u32 },

    #[error("immediate {value} does not fit in {bits} bits")]
    ImmediateOutOfRange { value: i64, bits: u32 },

    #[error("displacement {0:#x} is not word aligned")]
    MisalignedDisplacement(i64),

    #[error("`{0}` mixes 32-bit and 64-bit registers")]
    WidthMismatch(&'static str),

    #[error("{value:#x} is not encodable as a bitmask immediate")]
    InvalidBitmask { value: u64 },

    #[error("code buffer overflow: need {needed} bytes, {remaining} remaining")]
    BufferOverflow { needed: usize, remaining: usize },

    #[error("label {0} was never bound")]
    UnboundLabel(u32),

    #[error("label {0} bound twice")]
    LabelRebound(u32),

    #[error("unknown mnemonic `{0}`")]
    UnknownMnemonic(String),

    #[error("`{mnemonic}` expects {expected} operands, got {found}")]
    OperandCount {
        mnemonic: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("`{mnemonic}` operand {index}: expected {expected}")]
    OperandMismatch {
        mnemonic: &'static str,
        index: usize,
        expected: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, EncodeError>;
