//! `translate` command.

use std::path::Path;

use cellrec::{Compiler, CompilerConfig, PassKind, Program, SegmentReport};
use tracing::{error, info, warn};

use crate::cli::{EXIT_FAILURE, EXIT_SUCCESS};

pub struct TranslateArgs<'a> {
    pub input: &'a Path,
    pub base: u64,
    pub entry: Option<u64>,
    pub passes: Option<&'a [PassKind]>,
    pub jobs: usize,
    pub log_states: bool,
    pub backend: Option<&'a Path>,
}

/// Handle the `translate` command.
pub fn cmd_translate(args: &TranslateArgs<'_>) -> i32 {
    info!(input = %args.input.display(), "translating");

    let mut config = CompilerConfig::default()
        .with_jobs(args.jobs)
        .with_log_states(args.log_states);
    if let Some(passes) = args.passes {
        config = config.with_passes(passes.to_vec());
    }

    let mut compiler = Compiler::new(config);
    if let Some(path) = args.backend {
        compiler = match compiler.with_backend_library(path) {
            Ok(compiler) => compiler,
            Err(e) => {
                error!(error = %e, "failed to load backend");
                return EXIT_FAILURE;
            }
        };
    }

    let mut program = match Program::load(args.input, args.base, &compiler.config().thunks) {
        Ok(program) => program,
        Err(e) => {
            error!(error = %e, "failed to load input");
            return EXIT_FAILURE;
        }
    };

    let reports = match args.entry {
        Some(entry) => translate_one(&compiler, &mut program, entry),
        None => translate_all(&compiler, &program),
    };
    let reports = match reports {
        Ok(reports) => reports,
        Err(e) => {
            error!(error = %e, "translation failed");
            return EXIT_FAILURE;
        }
    };

    let mut failed = 0;
    for report in &reports {
        for emitted in &report.functions {
            println!("{}", emitted.function);
        }
        for diagnostic in &report.diagnostics {
            warn!("{diagnostic}");
        }
        failed += report.diagnostics.len();
    }
    if failed == 0 {
        EXIT_SUCCESS
    } else {
        error!(failed, "some functions were not emitted");
        EXIT_FAILURE
    }
}

fn translate_one(
    compiler: &Compiler,
    program: &mut Program,
    entry: u64,
) -> cellrec::Result<Vec<SegmentReport>> {
    program.ensure_function(entry, &format!("func_{entry:08x}"))?;
    let segment = program
        .segment_containing(entry)
        .ok_or(cellrec::Error::NoCodeSegment(entry))?;
    let emitted = compiler.translate(segment, entry)?;
    Ok(vec![SegmentReport {
        functions: vec![emitted],
        diagnostics: Vec::new(),
    }])
}

fn translate_all(compiler: &Compiler, program: &Program) -> cellrec::Result<Vec<SegmentReport>> {
    info!(functions = program.function_count(), "translating all functions");
    program
        .segments
        .iter()
        .map(|segment| compiler.compile_segment(segment))
        .collect()
}
