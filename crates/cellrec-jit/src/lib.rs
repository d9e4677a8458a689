//! Guest translation: register analysis, signature inference, register
//! routing, and the [`Recompiler`] that lowers PPU functions onto any
//! [`cellrec_ir::IrBuilder`]. The [`spu`] module does the same for SPU
//! programs running out of local store.

pub mod analyzer;
mod error;
mod function;
mod recompiler;
pub mod registers;
mod segment;
pub mod signature;
pub mod spu;
pub mod state;
mod swar;

pub use analyzer::{Access, AccessSet, Reg, analyze};
pub use error::{AnalyzeError, Result, StateError, TranslateError};
pub use function::{Function, FunctionState, ParamType, ReturnType};
pub use recompiler::{CompareMode, Recompiler, translate_function};
pub use registers::{RegClass, RegisterFile};
pub use segment::{Segment, SegmentThunks};
pub use signature::{Signature, infer_signature};
pub use spu::{SpuRecompiler, SpuState, SpuThunks, translate_spu_function};
pub use state::PpuState;
