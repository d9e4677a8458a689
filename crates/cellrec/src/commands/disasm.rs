//! `disasm` command.

use std::fmt::Write;
use std::path::Path;

use cellrec::{Program, Segment, SegmentThunks, analyze, disasm_ppu};
use tracing::{error, info};

use crate::cli::{EXIT_FAILURE, EXIT_SUCCESS};

/// Handle the `disasm` command.
pub fn cmd_disasm(input: &Path, base: u64) -> i32 {
    info!(input = %input.display(), "disassembling");
    let program = match Program::load(input, base, &SegmentThunks::default()) {
        Ok(program) => program,
        Err(e) => {
            error!(error = %e, "failed to load input");
            return EXIT_FAILURE;
        }
    };
    for segment in &program.segments {
        print!("{}", render_segment(segment));
    }
    EXIT_SUCCESS
}

/// One line per instruction word: address, raw word, disassembly, and the
/// registers it reads and writes. Function starts get a label line.
fn render_segment(segment: &Segment) -> String {
    let mut out = String::new();
    let mut address = segment.base;
    while let Some(instr) = segment.fetch(address) {
        if let Some(function) = segment.function(address) {
            let _ = writeln!(out, "\n{}:", function.name);
        }
        let access = analyze(instr).map_or_else(|_| "?".to_string(), |set| set.to_string());
        let _ = writeln!(
            out,
            "{address:08x}:  {:08x}  {:<32} {access}",
            instr.raw(),
            disasm_ppu(instr, address)
        );
        address += 4;
    }
    out
}

#[cfg(test)]
mod tests {
    use cellrec::Function;

    use super::*;

    #[test]
    fn test_render_segment() {
        // add. r3,r14,r15; blr; .long 0
        let words: [u32; 3] = [0x7C6E_7A15, 0x4E80_0020, 0];
        let code = words.iter().flat_map(|w| w.to_be_bytes()).collect();
        let mut segment = Segment::new(0x1_0000, code);
        segment.add_function(Function::new(0x1_0000, 8).with_name("start"));

        let text = render_segment(&segment);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "start:");
        assert!(lines[2].starts_with("00010000:  7c6e7a15  add."), "{}", lines[2]);
        assert!(lines[2].contains("r14:r"), "{}", lines[2]);
        assert!(lines[3].contains("bclr 20, 0"), "{}", lines[3]);
        assert!(lines[4].ends_with('?'), "{}", lines[4]);
    }
}
