//! The `cellrec` binary on files written to a temporary directory.

mod common;

use std::path::Path;
use std::process::{Command, Output};

use common::{CODE_BASE, assemble, build_elf};

fn cellrec(args: &[&str], input: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cellrec"))
        .args(args)
        .arg(input)
        .env("RUST_LOG", "off")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_disasm_raw_code() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("code.bin");
    std::fs::write(
        &input,
        assemble(|a| {
            a.add_rc(3, 14, 15)?;
            a.blr()
        }),
    )
    .unwrap();

    let output = cellrec(&["disasm", "--base", "0x10000"], &input);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("entry:"), "{text}");
    assert!(text.contains("00010000:  7c6e7a15  add. r3, r14, r15"), "{text}");
    assert!(text.contains("r3:w"), "{text}");
}

#[test]
fn test_translate_elf_prints_ir() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("program.elf");
    let code = assemble(|a| {
        a.li(3, 5)?;
        a.blr()
    });
    std::fs::write(&input, build_elf(CODE_BASE, CODE_BASE, &code, &[("start", CODE_BASE, 8)])).unwrap();

    let output = cellrec(&["translate", "-j", "2", "--passes", "verify,dce"], &input);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let text = stdout(&output);
    assert!(text.contains("start"), "{text}");
    assert!(text.contains("prolog"), "{text}");
    assert!(text.contains("cellrec_get_state"), "{text}");
}

#[test]
fn test_translate_single_entry() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("code.bin");
    let code = assemble(|a| {
        a.li(3, 1)?;
        a.blr()?;
        a.li(3, 2)?;
        a.blr()
    });
    std::fs::write(&input, code).unwrap();

    let output = cellrec(&["translate", "--entry", "0x10008", "--no-log-states"], &input);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let text = stdout(&output);
    assert!(text.contains("func_00010008"), "{text}");
    assert!(!text.contains("cellrec_log_state"), "{text}");
}

#[test]
fn test_translate_failure_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("zeros.bin");
    std::fs::write(&input, [0u8; 8]).unwrap();
    let output = cellrec(&["translate"], &input);
    assert_eq!(output.status.code(), Some(1));

    let output = cellrec(&["disasm"], &dir.path().join("missing.bin"));
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_bad_backend_library() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("code.bin");
    std::fs::write(&input, assemble(|a| a.blr())).unwrap();
    let backend = dir.path().join("libmissing.so");
    let output = cellrec(
        &["translate", "--backend", backend.to_str().unwrap()],
        &input,
    );
    assert_eq!(output.status.code(), Some(1));
}
