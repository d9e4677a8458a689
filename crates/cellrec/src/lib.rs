//! cellrec - Cell PPU recompiler
//!
//! Translates PowerPC functions of PPU executables into IR, runs the pass
//! pipeline over them, and hands them to a host code generator.
//!
//! # Example
//!
//! ```ignore
//! use cellrec::{Compiler, CompilerConfig, Program, SegmentThunks};
//!
//! let program = Program::load("game.elf".as_ref(), 0, &SegmentThunks::default())?;
//! let compiler = Compiler::new(CompilerConfig::default().with_jobs(4));
//! for segment in &program.segments {
//!     let report = compiler.compile_segment(segment)?;
//!     println!("{} functions emitted", report.functions.len());
//! }
//! ```

// Re-export from sub-crates
pub use cellrec_elf::{ElfError, ElfImage, MemorySegment};
pub use cellrec_ir::{PassFailure, PassKind, Pipeline, TargetInfo};
pub use cellrec_isa::{PpuInstr, PpuOpcode, decode_ppu, disasm_ppu};
pub use cellrec_jit::{
    AccessSet, Function, FunctionState, ParamType, Recompiler, ReturnType, Segment,
    SegmentThunks, Signature, analyze, infer_signature,
};

mod backend;
mod compiler;
mod config;
mod error;
pub mod metrics;
mod program;

pub use backend::{BACKEND_ABI_VERSION, Backend, CodeGenerator};
pub use compiler::{Compiler, Diagnostic, EmittedFunction, SegmentReport};
pub use config::{CompilerConfig, DEFAULT_PASSES};
pub use error::{Error, Result};
pub use program::Program;
