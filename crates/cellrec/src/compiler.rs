//! The compiler driver: translate, run passes, emit.

use std::fmt;
use std::path::Path;

use cellrec_ir::Pipeline;
use cellrec_jit::{Function, FunctionState, Segment, translate_function};
use parking_lot::Mutex;
use rayon::prelude::*;
use tracing::{debug, debug_span, error, info, warn};

use crate::backend::{Backend, CodeGenerator};
use crate::config::CompilerConfig;
use crate::metrics;
use crate::{Error, Result};

/// A function that went through every stage.
#[derive(Clone, Debug)]
pub struct EmittedFunction {
    pub address: u64,
    pub name: String,
    /// IR after the pipeline.
    pub function: cellrec_ir::Function,
    /// Always [`FunctionState::Emitted`].
    pub state: FunctionState,
}

/// A function that stopped before emission.
#[derive(Debug)]
pub struct Diagnostic {
    pub address: u64,
    pub name: String,
    /// Stage reached when the error occurred.
    pub state: FunctionState,
    pub error: Error,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({:#x}) [{}]: {}",
            self.name, self.address, self.state, self.error
        )
    }
}

/// Outcome of compiling a whole segment.
#[derive(Debug, Default)]
pub struct SegmentReport {
    /// Emitted functions by address.
    pub functions: Vec<EmittedFunction>,
    /// Failures by address.
    pub diagnostics: Vec<Diagnostic>,
}

impl SegmentReport {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Translates guest functions, runs the configured passes over them, and
/// hands the result to the code generator.
///
/// The compiler is shared by the translation workers; each function gets
/// its own builder.
pub struct Compiler {
    config: CompilerConfig,
    pipeline: Pipeline,
    generator: Option<Box<dyn CodeGenerator>>,
}

impl Compiler {
    pub fn new(config: CompilerConfig) -> Self {
        let pipeline = Pipeline::from_kinds(&config.passes, &config.target);
        Self {
            config,
            pipeline,
            generator: None,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(CompilerConfig::default())
    }

    /// Load a host code generator library. Fails when the library cannot be
    /// loaded or speaks another ABI version.
    pub fn with_backend_library(self, path: &Path) -> Result<Self> {
        Ok(self.with_code_generator(Backend::load(path)?))
    }

    /// Hand every function that completes the pipeline to `generator`.
    #[must_use]
    pub fn with_code_generator(mut self, generator: impl CodeGenerator + 'static) -> Self {
        self.generator = Some(Box::new(generator));
        self
    }

    pub const fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub const fn has_code_generator(&self) -> bool {
        self.generator.is_some()
    }

    /// Translate the function at `address` and run the pipeline over it.
    pub fn translate(&self, segment: &Segment, address: u64) -> Result<EmittedFunction> {
        let function = segment
            .function(address)
            .cloned()
            .ok_or(Error::UnknownFunction(address))?;
        self.compile(segment, function).map_err(|d| d.error)
    }

    /// Translate every function of `segment` in parallel.
    ///
    /// Failures are collected per function and never abort siblings.
    pub fn compile_segment(&self, segment: &Segment) -> Result<SegmentReport> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.thread_count())
            .build()?;
        let diagnostics = Mutex::new(Vec::new());

        let functions: Vec<EmittedFunction> = pool.install(|| {
            segment
                .functions
                .par_iter()
                .filter_map(|(_, function)| match self.compile(segment, function.clone()) {
                    Ok(emitted) => Some(emitted),
                    Err(diagnostic) => {
                        diagnostics.lock().push(diagnostic);
                        None
                    }
                })
                .collect()
        });

        let mut diagnostics = diagnostics.into_inner();
        diagnostics.sort_by_key(|d| d.address);
        info!(
            base = format_args!("{:#x}", segment.base),
            emitted = functions.len(),
            failed = diagnostics.len(),
            "compiled segment"
        );
        Ok(SegmentReport {
            functions,
            diagnostics,
        })
    }

    /// Drive one function through its lifecycle.
    fn compile(
        &self,
        segment: &Segment,
        mut function: Function,
    ) -> std::result::Result<EmittedFunction, Diagnostic> {
        let address = function.address;
        let span = debug_span!("translate", addr = format_args!("{address:#x}"));
        let _enter = span.enter();

        let fail = |function: &Function, error: Error| {
            metrics::record_failed();
            Diagnostic {
                address,
                name: function.name.clone(),
                state: function.state(),
                error,
            }
        };

        let mut ir = match translate_function(segment, &function, self.config.log_states) {
            Ok(ir) => ir,
            Err(err) => {
                warn!(function = %function.name, error = %err, "translation failed");
                return Err(fail(&function, err.into()));
            }
        };
        let advance = |function: &mut Function, to| function.advance(to).map_err(Error::from);
        if let Err(err) = advance(&mut function, FunctionState::Translated)
            .and_then(|()| advance(&mut function, FunctionState::PassesRunning))
        {
            return Err(fail(&function, err));
        }

        if let Err(failure) = self.pipeline.run(&mut ir) {
            error!(function = %function.name, pass = failure.pass, "function failed a pass");
            metrics::record_pass_failure(failure.pass);
            if let Err(err) = advance(&mut function, FunctionState::PassFailed) {
                return Err(fail(&function, err));
            }
            return Err(fail(&function, failure.into()));
        }

        if let Err(err) = advance(&mut function, FunctionState::PassesComplete) {
            return Err(fail(&function, err));
        }
        if let Some(generator) = &self.generator
            && let Err(err) = generator.emit(address, &ir)
        {
            error!(function = %function.name, error = %err, "code generation failed");
            return Err(fail(&function, err));
        }
        if let Err(err) = advance(&mut function, FunctionState::Emitted) {
            return Err(fail(&function, err));
        }

        let instructions = function.size / 4;
        metrics::record_translated(instructions);
        debug!(
            function = %function.name,
            instructions,
            blocks = ir.blocks.len(),
            "emitted"
        );
        let state = function.state();
        Ok(EmittedFunction {
            address,
            name: function.name,
            function: ir,
            state,
        })
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::with_defaults()
    }
}
