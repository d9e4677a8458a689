//! Command implementations.

mod disasm;
mod translate;

use crate::cli::{Cli, Commands};

/// Dispatch CLI command to the appropriate handler.
pub fn run_command(cli: &Cli) -> i32 {
    match &cli.command {
        Commands::Disasm { input, base } => disasm::cmd_disasm(input, *base),
        Commands::Translate {
            input,
            base,
            entry,
            passes,
            jobs,
            no_log_states,
            backend,
        } => translate::cmd_translate(&translate::TranslateArgs {
            input,
            base: *base,
            entry: *entry,
            passes: passes.as_deref(),
            jobs: *jobs,
            log_states: !*no_log_states,
            backend: backend.as_deref(),
        }),
    }
}
