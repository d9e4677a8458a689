//! Translate → passes → emit, checked by running the emitted IR.

mod common;

use cellrec::{
    Compiler, CompilerConfig, DEFAULT_PASSES, Error, Function, FunctionState, PassKind, Program,
    ReturnType, Segment, SegmentThunks, TargetInfo,
};
use cellrec_ir::Type;
use cellrec_ir::passes::RegisterSet;
use cellrec_jit::state::{CrField, PpuState, Xer};

use common::{CODE_BASE, assemble, run};

fn raw_program(code: Vec<u8>) -> Program {
    Program::from_raw(code, CODE_BASE, &SegmentThunks::default())
}

#[test]
fn test_add_record_form_end_to_end() {
    let program = raw_program(assemble(|a| {
        a.add_rc(3, 14, 15)?;
        a.blr()
    }));
    let compiler = Compiler::with_defaults();
    let emitted = compiler.translate(&program.segments[0], CODE_BASE).unwrap();
    assert_eq!(emitted.state, FunctionState::Emitted);
    assert_eq!(emitted.name, "entry");

    let mut state = PpuState::new();
    state.r[14] = 1;
    state.r[15] = !0;
    let (ret, host) = run(&[emitted], CODE_BASE, &mut state);

    assert_eq!(ret, Some(0));
    assert_eq!(state.r[3], 0);
    assert_eq!(state.cr[0], CrField::from_nibble(0b0010));
    assert_eq!(state.xer, Xer::default());
    assert_eq!(host.logged, vec![CODE_BASE]);
}

#[test]
fn test_passes_keep_semantics() {
    // Sum 1..=10 with a CTR loop.
    let code = assemble(|a| {
        let top = a.new_label();
        a.li(3, 0)?;
        a.li(4, 10)?;
        a.mtctr(4)?;
        a.bind(top)?;
        a.add(3, 3, 4)?;
        a.addi(4, 4, -1)?;
        a.bc(16, 0, top)?;
        a.blr()
    });
    let program = raw_program(code);
    let segment = &program.segments[0];

    for passes in [vec![], DEFAULT_PASSES.to_vec()] {
        let compiler = Compiler::new(CompilerConfig::default().with_passes(passes));
        let emitted = compiler.translate(segment, CODE_BASE).unwrap();
        let mut state = PpuState::new();
        let (ret, _) = run(&[emitted], CODE_BASE, &mut state);
        assert_eq!(ret, Some(55));
        assert_eq!(state.ctr, 0);
    }
}

#[test]
fn test_without_log_states() {
    let program = raw_program(assemble(|a| {
        a.li(3, 7)?;
        a.blr()
    }));
    let compiler = Compiler::new(CompilerConfig::default().with_log_states(false));
    let emitted = compiler.translate(&program.segments[0], CODE_BASE).unwrap();
    let (ret, host) = run(&[emitted], CODE_BASE, &mut PpuState::new());
    assert_eq!(ret, Some(7));
    assert!(host.logged.is_empty());
}

#[test]
fn test_register_allocation_failure_is_reported() {
    let program = raw_program(assemble(|a| {
        a.li(3, 1)?;
        a.blr()
    }));
    // Integers only: the f64 return value has no register set.
    let target = TargetInfo::new(vec![RegisterSet::new("gpr", 8, &[Type::I1, Type::I8, Type::I64])]);
    let config = CompilerConfig::default()
        .with_passes(vec![PassKind::Verify, PassKind::RegisterAllocation])
        .with_target(target);
    let compiler = Compiler::new(config);

    let mut segment = program.segments[0].clone();
    segment.add_function(Function::new(CODE_BASE, 8).with_ret(ReturnType::Float));
    let report = compiler.compile_segment(&segment).unwrap();
    assert!(report.functions.is_empty());
    let diagnostic = &report.diagnostics[0];
    assert_eq!(diagnostic.state, FunctionState::PassFailed);
    match &diagnostic.error {
        Error::Pass(failure) => assert_eq!(failure.pass, "Register Allocation"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_unknown_function() {
    let program = raw_program(assemble(|a| a.blr()));
    let err = Compiler::with_defaults()
        .translate(&program.segments[0], CODE_BASE + 4)
        .unwrap_err();
    assert!(matches!(err, Error::UnknownFunction(a) if a == CODE_BASE + 4), "{err}");
}

#[test]
fn test_parallel_compilation_is_deterministic() {
    let code = assemble(|a| {
        for n in 0..8 {
            a.li(3, n)?;
            a.addi(3, 3, n)?;
            a.blr()?;
        }
        Ok(())
    });
    let mut segment = Segment::new(CODE_BASE, code);
    for n in 0..8 {
        segment.add_function(Function::new(CODE_BASE + n * 12, 12));
    }

    let serial = Compiler::new(CompilerConfig::default().with_jobs(1))
        .compile_segment(&segment)
        .unwrap();
    let parallel = Compiler::new(CompilerConfig::default().with_jobs(4))
        .compile_segment(&segment)
        .unwrap();

    assert!(serial.is_clean() && parallel.is_clean());
    assert_eq!(serial.functions.len(), 8);
    for (a, b) in serial.functions.iter().zip(&parallel.functions) {
        assert_eq!(a.address, b.address);
        assert_eq!(a.function, b.function);
    }
    for (n, emitted) in (0u128..).zip(&parallel.functions) {
        let (ret, _) = run(std::slice::from_ref(emitted), emitted.address, &mut PpuState::new());
        assert_eq!(ret, Some(2 * n));
    }
}
