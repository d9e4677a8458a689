use cellrec_ir::PassFailure;
use cellrec_jit::{AnalyzeError, StateError, TranslateError};
use thiserror::Error;

/// Recompiler errors.
#[derive(Error, Debug)]
pub enum Error {
    #[error("ELF error: {0}")]
    Elf(#[from] cellrec_elf::ElfError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Translation failed: {0}")]
    Translate(#[from] TranslateError),
    #[error("Analysis failed: {0}")]
    Analyze(#[from] AnalyzeError),
    #[error("{0}")]
    Pass(#[from] PassFailure),
    #[error("Function lifecycle: {0}")]
    State(#[from] StateError),
    #[error("Thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("Backend library {path}: {source}")]
    BackendLoad {
        path: String,
        #[source]
        source: libloading::Error,
    },
    #[error("Backend ABI mismatch: expected {expected}, got {actual}")]
    AbiMismatch { expected: u32, actual: u32 },
    #[error("Backend rejected function 0x{address:x} with status {status}")]
    BackendRejected { address: u64, status: i32 },
    #[error("No function at 0x{0:x}")]
    UnknownFunction(u64),
    #[error("No code segment containing 0x{0:x}")]
    NoCodeSegment(u64),
}

pub type Result<T> = std::result::Result<T, Error>;
