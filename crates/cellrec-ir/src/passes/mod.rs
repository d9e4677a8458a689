//! Compiler passes over translated functions.
//!
//! A [`Pipeline`] runs its passes in order and stops at the first failure,
//! reporting which pass failed.

mod const_fold;
mod dce;
mod regalloc;
mod verify;

use std::fmt;
use std::str::FromStr;

use tracing::{debug, error};

use crate::error::{PassError, PassFailure};
use crate::function::Function;

pub use const_fold::ConstantFoldPass;
pub use dce::DeadCodePass;
pub use regalloc::{RegisterAllocationPass, RegisterSet, TargetInfo};
pub use verify::VerifyPass;

/// A transformation or check over one function.
pub trait Pass: Send + Sync {
    /// Name reported on failure.
    fn name(&self) -> &'static str;

    fn run(&self, func: &mut Function) -> Result<(), PassError>;
}

/// Bundled passes, selectable by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PassKind {
    Verify,
    ConstantFold,
    DeadCode,
    RegisterAllocation,
}

impl PassKind {
    pub const ALL: [Self; 4] = [
        Self::Verify,
        Self::ConstantFold,
        Self::DeadCode,
        Self::RegisterAllocation,
    ];

    /// Short configuration name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Verify => "verify",
            Self::ConstantFold => "const-fold",
            Self::DeadCode => "dce",
            Self::RegisterAllocation => "regalloc",
        }
    }

    /// Instantiate the pass.
    pub fn build(self, target: &TargetInfo) -> Box<dyn Pass> {
        match self {
            Self::Verify => Box::new(VerifyPass),
            Self::ConstantFold => Box::new(ConstantFoldPass),
            Self::DeadCode => Box::new(DeadCodePass),
            Self::RegisterAllocation => Box::new(RegisterAllocationPass::new(target.clone())),
        }
    }
}

impl fmt::Display for PassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PassKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown pass: {s}"))
    }
}

/// Ordered list of passes, fixed at construction.
pub struct Pipeline {
    passes: Vec<Box<dyn Pass>>,
}

impl Pipeline {
    pub fn new(passes: Vec<Box<dyn Pass>>) -> Self {
        Self { passes }
    }

    /// Build a pipeline from pass kinds, in the given order.
    pub fn from_kinds(kinds: &[PassKind], target: &TargetInfo) -> Self {
        Self::new(kinds.iter().map(|kind| kind.build(target)).collect())
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    /// Run every pass in order, stopping at the first failure.
    pub fn run(&self, func: &mut Function) -> Result<(), PassFailure> {
        for pass in &self.passes {
            debug!(function = %func.name, pass = pass.name(), "running pass");
            if let Err(err) = pass.run(func) {
                error!(function = %func.name, pass = pass.name(), error = %err, "could not run pass");
                return Err(PassFailure {
                    pass: pass.name(),
                    error: err,
                });
            }
        }
        Ok(())
    }
}

impl Default for Pipeline {
    /// Verify, fold, clean up, verify again, allocate.
    fn default() -> Self {
        Self::from_kinds(
            &[
                PassKind::Verify,
                PassKind::ConstantFold,
                PassKind::DeadCode,
                PassKind::Verify,
                PassKind::RegisterAllocation,
            ],
            &TargetInfo::default(),
        )
    }
}
