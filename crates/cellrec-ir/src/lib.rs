//! Intermediate representation for the Cell recompiler.
//!
//! Translators target the [`IrBuilder`] trait. This crate also ships a
//! reference IR ([`Function`], built by [`FunctionBuilder`]), a textual
//! printer, an interpreter for testing translated code end to end, and the
//! pass [`Pipeline`] run over functions before emission.

mod builder;
mod display;
mod error;
pub mod eval;
mod function;
pub mod interp;
pub mod passes;
mod types;

pub use builder::*;
pub use error::*;
pub use function::*;
pub use interp::{ExternHandler, Interpreter, Memory, NoExterns};
pub use passes::{Pass, PassKind, Pipeline, TargetInfo};
pub use types::*;
