//! Compiler configuration.

use cellrec_ir::{PassKind, TargetInfo};
use cellrec_jit::SegmentThunks;

/// Passes run when none are configured: verify, fold, clean up, verify
/// again, allocate.
pub const DEFAULT_PASSES: [PassKind; 5] = [
    PassKind::Verify,
    PassKind::ConstantFold,
    PassKind::DeadCode,
    PassKind::Verify,
    PassKind::RegisterAllocation,
];

/// Options for translating segments.
#[derive(Clone, Debug)]
pub struct CompilerConfig {
    /// Passes run over every translated function, in order.
    pub passes: Vec<PassKind>,
    /// Host register sets used by register allocation.
    pub target: TargetInfo,
    /// Number of parallel translation jobs (0 = one per CPU).
    pub jobs: usize,
    /// Host services called by translated code.
    pub thunks: SegmentThunks,
    /// Call the log-state thunk on function entry.
    pub log_states: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            passes: DEFAULT_PASSES.to_vec(),
            target: TargetInfo::default(),
            jobs: 0,
            thunks: SegmentThunks::default(),
            log_states: true,
        }
    }
}

impl CompilerConfig {
    /// Create default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pass list. An empty list skips the pipeline.
    #[must_use]
    pub fn with_passes(mut self, passes: Vec<PassKind>) -> Self {
        self.passes = passes;
        self
    }

    #[must_use]
    pub fn with_target(mut self, target: TargetInfo) -> Self {
        self.target = target;
        self
    }

    /// Set parallel job count (0 = auto).
    #[must_use]
    pub const fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    #[must_use]
    pub fn with_thunks(mut self, thunks: SegmentThunks) -> Self {
        self.thunks = thunks;
        self
    }

    #[must_use]
    pub const fn with_log_states(mut self, enabled: bool) -> Self {
        self.log_states = enabled;
        self
    }

    /// Effective thread count.
    pub fn thread_count(&self) -> usize {
        if self.jobs == 0 {
            num_cpus::get()
        } else {
            self.jobs
        }
    }
}
