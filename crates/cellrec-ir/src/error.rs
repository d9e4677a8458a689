//! Error types of the IR crate.

use thiserror::Error;

use crate::Type;

/// Errors detected while finishing a built function.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("instruction emitted with no insert point")]
    NoInsertPoint,

    #[error("instruction emitted after terminator of block `{0}`")]
    AfterTerminator(String),

    #[error("block `{0}` has no terminator")]
    Unterminated(String),
}

/// Errors raised by the reference interpreter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InterpError {
    #[error("no guest function at {0:#x}")]
    UnknownGuestFunction(u64),

    #[error("extern `{0}` is not handled")]
    UnknownExtern(String),

    #[error("parameter {0} out of range")]
    MissingParameter(usize),

    #[error("value v{0} used before definition")]
    UndefinedValue(u32),

    #[error("block `{0}` fell off without a terminator")]
    Unterminated(String),

    #[error("branch to missing block b{0}")]
    MissingBlock(u32),

    #[error("step limit of {0} exceeded")]
    StepLimit(u64),
}

/// Errors reported by a pass.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PassError {
    #[error("block `{block}`: {message}")]
    Invalid { block: String, message: String },

    #[error("no register set accepts type {0}")]
    NoRegisterSet(Type),
}

/// A pass failure with the name of the pass that produced it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("pass `{pass}` failed: {error}")]
pub struct PassFailure {
    pub pass: &'static str,
    #[source]
    pub error: PassError,
}

pub type Result<T, E = BuildError> = std::result::Result<T, E>;
