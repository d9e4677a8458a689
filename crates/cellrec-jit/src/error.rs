//! Error types of the translator.

use cellrec_ir::BuildError;
use thiserror::Error;

use crate::function::FunctionState;

/// Errors raised while translating a guest function.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslateError {
    #[error("unimplemented instruction `{mnemonic}` ({raw:#010x}) at {address:#x}")]
    Unimplemented {
        address: u64,
        raw: u32,
        mnemonic: &'static str,
    },

    #[error("unknown instruction {raw:#010x} at {address:#x}")]
    UnknownInstruction { address: u64, raw: u32 },

    #[error("function {0:#x} takes a vector parameter")]
    VectorParameter(u64),

    #[error("function {0:#x} returns multiple floating-point values")]
    MultiFloatReturn(u64),

    #[error("function {address:#x} is outside the segment")]
    OutOfSegment { address: u64 },

    #[error("no function at {0:#x}")]
    UnknownFunction(u64),

    #[error("call to `{0}` produced no value")]
    MissingResult(String),

    #[error(transparent)]
    Build(#[from] BuildError),
}

/// Errors raised by the register analyzer.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyzeError {
    #[error("unknown instruction word {0:#010x}")]
    Unknown(u32),
}

/// Illegal lifecycle transition of a function.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("illegal transition {from:?} -> {to:?}")]
pub struct StateError {
    pub from: FunctionState,
    pub to: FunctionState,
}

pub type Result<T, E = TranslateError> = std::result::Result<T, E>;
