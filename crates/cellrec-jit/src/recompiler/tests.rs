use cellrec_asm::PpcAssembler;
use cellrec_ir::{Callee, Endian, ExternHandler, InstKind, InterpError, Interpreter, Memory, Type};

use super::*;
use crate::state::{CrField, PpuState, Xer, offsets};

const CODE_BASE: u64 = 0x1_0000;
const STATE_BASE: u64 = 0x10_0000;
const MEM_BASE: u64 = 0x2000_0000;

/// Host side of the thunks: fixed state and memory bases, recording every
/// logged entry, indirect call, and system call.
#[derive(Default)]
struct Host {
    logged: Vec<u64>,
    /// Target and the r3 the callee saw in the state.
    indirect: Vec<(u64, u64)>,
    syscalls: Vec<u64>,
}

fn gpr_addr(n: usize) -> u64 {
    STATE_BASE + (offsets::R + n * 8) as u64
}

fn read_gpr(memory: &Memory, n: usize) -> u64 {
    u64::try_from(memory.load(gpr_addr(n), Type::I64, Endian::Native)).unwrap()
}

fn write_gpr(memory: &mut Memory, n: usize, value: u64) {
    memory.store(gpr_addr(n), Type::I64, Endian::Native, u128::from(value));
}

impl ExternHandler for Host {
    fn call(&mut self, name: &str, args: &[u128], memory: &mut Memory) -> Result<Option<u128>, InterpError> {
        let arg = args.first().map_or(0, |&a| u64::try_from(a).unwrap());
        match name {
            "cellrec_get_state" => Ok(Some(u128::from(STATE_BASE))),
            "cellrec_memory_base" => Ok(Some(u128::from(MEM_BASE))),
            "cellrec_log_state" => {
                self.logged.push(arg);
                Ok(None)
            }
            "cellrec_indirect_call" => {
                self.indirect.push((arg, read_gpr(memory, 3)));
                write_gpr(memory, 3, 77);
                Ok(None)
            }
            "cellrec_syscall" => {
                self.syscalls.push(arg);
                let result = read_gpr(memory, 3) + read_gpr(memory, 11);
                write_gpr(memory, 3, result);
                Ok(None)
            }
            _ => Err(InterpError::UnknownExtern(name.to_string())),
        }
    }
}

fn assemble(f: impl FnOnce(&mut PpcAssembler<'_>) -> cellrec_asm::Result<()>) -> Vec<u8> {
    let mut mem = [0u8; 1024];
    let mut asm = PpcAssembler::new(&mut mem);
    f(&mut asm).unwrap();
    let size = asm.finalize().unwrap();
    asm.code()[..size].to_vec()
}

fn segment_with(code: Vec<u8>, functions: Vec<Function>) -> Segment {
    let mut seg = Segment::new(CODE_BASE, code);
    for function in functions {
        seg.add_function(function);
    }
    seg
}

/// Segment with a single function spanning all of `code`.
fn segment(code: Vec<u8>) -> Segment {
    let size = code.len() as u64;
    segment_with(code, vec![Function::new(CODE_BASE, size)])
}

struct Outcome {
    ret: Option<u128>,
    host: Host,
    memory: Memory,
}

/// Translate every function of `seg`, run the one at `CODE_BASE` against
/// `state`, and write the final state back.
fn execute(seg: &Segment, state: &mut PpuState, init: impl FnOnce(&mut Memory)) -> Outcome {
    let functions: Vec<_> = seg
        .functions
        .values()
        .map(|f| (f.address, translate_function(seg, f, true).unwrap()))
        .collect();
    let mut interp = Interpreter::new();
    for (address, func) in &functions {
        interp.add_guest_function(*address, func);
    }
    state.store_into(&mut interp.memory, STATE_BASE);
    init(&mut interp.memory);

    let (_, entry) = functions.iter().find(|(a, _)| *a == CODE_BASE).unwrap();
    let mut host = Host::default();
    let ret = interp.run(entry, &[], &mut host).unwrap();
    *state = PpuState::load_from(&interp.memory, STATE_BASE);
    Outcome {
        ret,
        host,
        memory: interp.memory,
    }
}

fn guest_bytes(memory: &Memory, ea: u64, len: usize) -> Vec<u8> {
    let mut buf = vec![0; len];
    memory.read(MEM_BASE + ea, &mut buf);
    buf
}

// ===== Integer =====

#[test]
fn test_add_record_form() {
    let seg = segment(assemble(|a| {
        a.add_rc(3, 14, 15)?;
        a.blr()
    }));

    let mut state = PpuState::new();
    state.r[14] = 20;
    state.r[15] = 22;
    let out = execute(&seg, &mut state, |_| {});
    assert_eq!(out.ret, Some(42));
    assert_eq!(state.r[3], 42);
    assert_eq!(state.cr[0], CrField::from_nibble(0b0100));
    assert_eq!(out.host.logged, vec![CODE_BASE]);

    let mut state = PpuState::new();
    state.r[14] = (-5i64).cast_unsigned();
    execute(&seg, &mut state, |_| {});
    assert_eq!(state.cr[0], CrField::from_nibble(0b1000));
}

#[test]
fn test_carry_and_overflow() {
    let seg = segment(assemble(|a| {
        a.addc(3, 4, 5)?;
        a.adde(6, 7, 8)?;
        a.addo(9, 10, 11)?;
        a.blr()
    }));

    let mut state = PpuState::new();
    state.r[4] = u64::MAX;
    state.r[5] = 1;
    state.r[7] = 1;
    state.r[8] = 2;
    state.r[10] = i64::MAX.cast_unsigned();
    state.r[11] = 1;
    execute(&seg, &mut state, |_| {});

    assert_eq!(state.r[3], 0);
    assert_eq!(state.r[6], 4);
    assert_eq!(state.r[9], i64::MIN.cast_unsigned());
    assert_eq!(state.xer.ca, 0);
    assert_eq!((state.xer.ov, state.xer.so), (1, 1));
}

#[test]
fn test_compare_signedness() {
    let seg = segment(assemble(|a| {
        a.cmpd(0, 3, 4)?;
        a.cmpld(1, 3, 4)?;
        a.cmpwi(2, 3, 1)?;
        a.blr()
    }));

    let mut state = PpuState::new();
    state.r[3] = 1;
    state.r[4] = u64::MAX;
    execute(&seg, &mut state, |_| {});
    assert_eq!(state.cr[0], CrField::from_nibble(0b0100));
    assert_eq!(state.cr[1], CrField::from_nibble(0b1000));
    assert_eq!(state.cr[2], CrField::from_nibble(0b0010));
}

#[test]
fn test_rotates() {
    let seg = segment(assemble(|a| {
        a.rlwinm(3, 4, 8, 24, 31)?;
        a.rldicr(5, 4, 32, 31)?;
        a.rlwimi(6, 4, 16, 0, 15)?;
        a.blr()
    }));

    let mut state = PpuState::new();
    state.r[4] = 0x1234_5678;
    state.r[6] = 0xAAAA_BBBB;
    execute(&seg, &mut state, |_| {});
    assert_eq!(state.r[3], 0x12);
    assert_eq!(state.r[5], 0x1234_5678_0000_0000);
    assert_eq!(state.r[6], 0x5678_BBBB);
}

#[test]
fn test_rotate_mask() {
    assert_eq!(rotate_mask(0, 63), u64::MAX);
    assert_eq!(rotate_mask(32, 63), 0xFFFF_FFFF);
    assert_eq!(rotate_mask(63, 0), 0x8000_0000_0000_0001);
}

// ===== Control flow =====

#[test]
fn test_counted_loop() {
    let seg = segment(assemble(|a| {
        a.li(3, 0)?;
        a.li(5, 1)?;
        a.li(4, 10)?;
        a.mtctr(4)?;
        let top = a.new_label();
        a.bind(top)?;
        a.add(3, 3, 5)?;
        a.addi(5, 5, 1)?;
        a.bc(16, 0, top)?;
        a.blr()
    }));

    let mut state = PpuState::new();
    let out = execute(&seg, &mut state, |_| {});
    assert_eq!(out.ret, Some(55));
    assert_eq!(state.ctr, 0);
}

#[test]
fn test_conditional_skip() {
    let seg = segment(assemble(|a| {
        a.cmpdi(0, 3, 0)?;
        let done = a.new_label();
        a.bge(0, done)?;
        a.neg(3, 3)?;
        a.bind(done)?;
        a.blr()
    }));

    for input in [-7i64, 7] {
        let mut state = PpuState::new();
        state.r[3] = input.cast_unsigned();
        let out = execute(&seg, &mut state, |_| {});
        assert_eq!(out.ret, Some(7));
    }
}

#[test]
fn test_guest_call() {
    let code = assemble(|a| {
        let callee = a.new_label();
        a.li(3, 20)?;
        a.bl(callee)?;
        a.addi(3, 3, 1)?;
        a.blr()?;
        a.bind(callee)?;
        a.add(3, 3, 3)?;
        a.blr()
    });
    let seg = segment_with(
        code,
        vec![
            Function::new(CODE_BASE, 16),
            Function::new(CODE_BASE + 16, 8).with_params(vec![ParamType::Integer]),
        ],
    );

    let mut state = PpuState::new();
    let out = execute(&seg, &mut state, |_| {});
    assert_eq!(out.ret, Some(41));
    assert_eq!(state.lr, CODE_BASE + 8);
    assert_eq!(out.host.logged, vec![CODE_BASE, CODE_BASE + 16]);
}

#[test]
fn test_guest_call_with_default_signature() {
    let code = assemble(|a| {
        let callee = a.new_label();
        a.li(3, 20)?;
        a.bl(callee)?;
        a.addi(3, 3, 1)?;
        a.fadd(2, 1, 1)?;
        a.blr()?;
        a.bind(callee)?;
        a.add(3, 3, 3)?;
        a.fadd(1, 1, 1)?;
        a.blr()
    });
    let seg = segment_with(
        code,
        vec![Function::new(CODE_BASE, 20), Function::new(CODE_BASE + 20, 12)],
    );

    let mut state = PpuState::new();
    state.f[1] = 1.5;
    let out = execute(&seg, &mut state, |_| {});
    assert_eq!(out.ret, Some(41));
    assert_eq!(state.r[3], 41);
    assert_eq!(state.f[1], 3.0);
    assert_eq!(state.f[2], 6.0);
}

#[test]
fn test_indirect_call_through_ctr() {
    let seg = segment(assemble(|a| {
        a.li(3, 9)?;
        a.li(12, 0x5000)?;
        a.mtctr(12)?;
        a.bctrl()?;
        a.addi(3, 3, 1)?;
        a.blr()
    }));

    let mut state = PpuState::new();
    let out = execute(&seg, &mut state, |_| {});
    assert_eq!(out.host.indirect, vec![(0x5000, 9)]);
    assert_eq!(out.ret, Some(78));
    assert_eq!(state.lr, CODE_BASE + 16);
}

#[test]
fn test_syscall_sees_arguments() {
    let seg = segment(assemble(|a| {
        a.li(3, 5)?;
        a.li(11, 100)?;
        a.sc()?;
        a.addi(3, 3, 1)?;
        a.blr()
    }));

    let mut state = PpuState::new();
    let out = execute(&seg, &mut state, |_| {});
    assert_eq!(out.host.syscalls, vec![CODE_BASE + 8]);
    assert_eq!(out.ret, Some(106));
}

// ===== Memory =====

#[test]
fn test_memory_is_big_endian() {
    let seg = segment(assemble(|a| {
        a.lwz(3, 0, 4)?;
        a.lhz(5, 2, 4)?;
        a.lbz(6, 3, 4)?;
        a.lha(10, 0x20, 9)?;
        a.lwbrx(8, 0, 9)?;
        a.stw(3, 8, 4)?;
        a.stwu(3, 16, 4)?;
        a.blr()
    }));

    let mut state = PpuState::new();
    state.r[4] = 0x1000;
    state.r[9] = 0x1000;
    let out = execute(&seg, &mut state, |m| {
        m.write(MEM_BASE + 0x1000, &[0x11, 0x22, 0x33, 0x44]);
        m.write(MEM_BASE + 0x1020, &[0xFF, 0xFE]);
    });

    assert_eq!(state.r[3], 0x1122_3344);
    assert_eq!(state.r[5], 0x3344);
    assert_eq!(state.r[6], 0x44);
    assert_eq!(state.r[10], 0xFFFF_FFFF_FFFF_FFFE);
    assert_eq!(state.r[8], 0x4433_2211);
    assert_eq!(state.r[4], 0x1010);
    assert_eq!(guest_bytes(&out.memory, 0x1008, 4), [0x11, 0x22, 0x33, 0x44]);
    assert_eq!(guest_bytes(&out.memory, 0x1010, 4), [0x11, 0x22, 0x33, 0x44]);
}

#[test]
fn test_reservation_pair() {
    let seg = segment(assemble(|a| {
        a.lwarx(3, 0, 4)?;
        a.addi(3, 3, 1)?;
        a.stwcx_rc(3, 0, 4)?;
        a.mfcr(5)?;
        a.stwcx_rc(3, 0, 4)?;
        a.mfcr(6)?;
        a.blr()
    }));

    let mut state = PpuState::new();
    state.r[4] = 0x2000;
    let out = execute(&seg, &mut state, |m| m.write(MEM_BASE + 0x2000, &[0, 0, 0, 7]));

    assert_eq!(guest_bytes(&out.memory, 0x2000, 4), [0, 0, 0, 8]);
    assert_eq!(state.r[5], 0x2000_0000);
    assert_eq!(state.r[6], 0);
    assert_eq!(state.reserved, 0);
}

#[test]
fn test_store_conditional_without_reservation_fails() {
    let seg = segment(assemble(|a| {
        a.li(3, 0x55)?;
        a.stwcx_rc(3, 0, 4)?;
        a.mfcr(5)?;
        a.stdcx_rc(3, 0, 4)?;
        a.mfcr(6)?;
        a.blr()
    }));

    // Address and value both match the zeroed reservation fields.
    let mut state = PpuState::new();
    state.r[4] = 0;
    let out = execute(&seg, &mut state, |_| {});

    assert_eq!(guest_bytes(&out.memory, 0, 8), [0; 8]);
    assert_eq!(state.r[5], 0);
    assert_eq!(state.r[6], 0);
    assert_eq!(state.reserved, 0);
}

#[test]
fn test_dcbz_clears_one_line() {
    let seg = segment(assemble(|a| {
        a.dcbz(0, 4)?;
        a.blr()
    }));

    let mut state = PpuState::new();
    state.r[4] = 0x3050;
    let out = execute(&seg, &mut state, |m| m.write(MEM_BASE + 0x3000, &[0xAA; 0x100]));
    assert_eq!(guest_bytes(&out.memory, 0x3000, 0x80), vec![0; 0x80]);
    assert_eq!(guest_bytes(&out.memory, 0x3080, 4), [0xAA; 4]);
}

// ===== Floating point and vector =====

#[test]
fn test_float_arithmetic() {
    let seg = segment(assemble(|a| {
        a.fmadd(1, 2, 3, 4)?;
        a.fdivs(5, 10, 6)?;
        a.fcmpu(7, 1, 2)?;
        a.fctiwz(8, 1)?;
        a.fsel(9, 2, 3, 4)?;
        a.blr()
    }));

    let mut state = PpuState::new();
    state.f[2] = 1.5;
    state.f[3] = 2.0;
    state.f[4] = 0.25;
    state.f[6] = 3.0;
    state.f[10] = 1.0;
    execute(&seg, &mut state, |_| {});

    assert_eq!(state.f[1], 3.25);
    assert_eq!(state.f[5], f64::from((1.0f64 / 3.0) as f32));
    assert_eq!(state.cr[7], CrField::from_nibble(0b0100));
    assert_eq!(state.f[8].to_bits(), 3);
    assert_eq!(state.f[9], 2.0);
}

#[test]
fn test_float_to_integer_edges() {
    let seg = segment(assemble(|a| {
        a.fctiwz(10, 1)?;
        a.fctiwz(11, 2)?;
        a.fctiwz(12, 3)?;
        a.fctiwz(13, 4)?;
        a.fctidz(14, 1)?;
        a.fctidz(15, 2)?;
        a.fctiwz(16, 5)?;
        a.blr()
    }));

    let mut state = PpuState::new();
    state.f[1] = f64::NAN;
    state.f[2] = 3.0e10;
    state.f[3] = -3.0e10;
    state.f[4] = f64::NEG_INFINITY;
    state.f[5] = -2.75;
    execute(&seg, &mut state, |_| {});

    assert_eq!(state.f[10].to_bits(), 0x8000_0000);
    assert_eq!(state.f[11].to_bits(), 0x7FFF_FFFF);
    assert_eq!(state.f[12].to_bits(), 0x8000_0000);
    assert_eq!(state.f[13].to_bits(), 0x8000_0000);
    assert_eq!(state.f[14].to_bits(), 0x8000_0000_0000_0000);
    assert_eq!(state.f[15].to_bits(), 30_000_000_000);
    assert_eq!(state.f[16].to_bits(), 0xFFFF_FFFE);
}

#[test]
fn test_vector_lanes() {
    let seg = segment(assemble(|a| {
        a.vspltisw(1, -1)?;
        a.vspltisw(2, 1)?;
        a.vadduwm(3, 1, 2)?;
        a.vaddubm(4, 2, 2)?;
        a.vsubuwm(5, 3, 2)?;
        a.vxor(6, 1, 2)?;
        a.blr()
    }));

    let mut state = PpuState::new();
    execute(&seg, &mut state, |_| {});
    assert_eq!(state.v[1], u128::MAX);
    assert_eq!(state.v[3], 0);
    assert_eq!(state.v[4], 0x0000_0002_0000_0002_0000_0002_0000_0002);
    assert_eq!(state.v[5], u128::MAX);
    assert_eq!(state.v[6], 0xFFFF_FFFE_FFFF_FFFE_FFFF_FFFE_FFFF_FFFE);
}

// ===== Special registers =====

#[test]
fn test_xer_and_cr_moves() {
    let seg = segment(assemble(|a| {
        a.mtxer(3)?;
        a.mfxer(4)?;
        a.mtcrf(0xFF, 5)?;
        a.mfcr(6)?;
        a.blr()
    }));

    let mut state = PpuState::new();
    state.r[3] = 0xE000_0005;
    state.r[5] = 0x1234_5678;
    execute(&seg, &mut state, |_| {});
    assert_eq!(
        state.xer,
        Xer {
            so: 1,
            ov: 1,
            ca: 1,
            bc: 5
        }
    );
    assert_eq!(state.r[4], 0xE000_0005);
    assert_eq!(state.cr_bits(), 0x1234_5678);
    assert_eq!(state.r[6], 0x1234_5678);
}

// ===== Errors and structure =====

#[test]
fn test_unimplemented_instruction() {
    let seg = segment(assemble(|a| {
        a.vperm(1, 2, 3, 4)?;
        a.blr()
    }));
    let func = seg.function(CODE_BASE).unwrap();
    assert!(matches!(
        translate_function(&seg, func, false),
        Err(TranslateError::Unimplemented {
            address: CODE_BASE,
            mnemonic: "vperm",
            ..
        })
    ));
}

#[test]
fn test_unknown_instruction() {
    let mut code = vec![0, 0, 0, 0];
    code.extend(assemble(|a| a.blr()));
    let seg = segment(code);
    let func = seg.function(CODE_BASE).unwrap();
    assert_eq!(
        translate_function(&seg, func, false),
        Err(TranslateError::UnknownInstruction {
            address: CODE_BASE,
            raw: 0
        })
    );
}

#[test]
fn test_rejected_signatures() {
    let seg = segment(assemble(|a| a.blr()));
    let func = Function::new(CODE_BASE, 4).with_ret(ReturnType::FloatX2);
    assert_eq!(
        translate_function(&seg, &func, false),
        Err(TranslateError::MultiFloatReturn(CODE_BASE))
    );
    let func = Function::new(CODE_BASE, 4).with_params(vec![ParamType::Vector]);
    assert_eq!(
        translate_function(&seg, &func, false),
        Err(TranslateError::VectorParameter(CODE_BASE))
    );
    let func = Function::new(CODE_BASE, 8);
    assert_eq!(
        translate_function(&seg, &func, false),
        Err(TranslateError::OutOfSegment { address: CODE_BASE })
    );
}

#[test]
fn test_function_shape() {
    let seg = segment(assemble(|a| {
        a.add(3, 4, 5)?;
        a.blr()
    }));
    let func = seg.function(CODE_BASE).unwrap();
    let ir = translate_function(&seg, func, false).unwrap();

    let names: Vec<_> = ir.blocks.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, ["prolog", "seed", "epilog", "block_10000"]);

    let loads = ir.blocks[1]
        .insts
        .iter()
        .filter(|inst| matches!(inst.kind, InstKind::Load { .. }))
        .count();
    assert_eq!(loads, 3);
    assert_eq!(ir.locals.len(), 3);

    let calls: Vec<_> = ir.blocks[0]
        .insts
        .iter()
        .filter_map(|inst| match &inst.kind {
            InstKind::Call { callee, .. } => Some(callee.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(calls, [Callee::Extern("cellrec_get_state".into())]);
}

#[test]
fn test_parameters_bind_registers() {
    let seg = segment(assemble(|a| {
        a.fadd(1, 1, 2)?;
        a.add(3, 3, 4)?;
        a.blr()
    }));
    let func = Function::new(CODE_BASE, 12).with_params(vec![
        ParamType::Integer,
        ParamType::Float,
        ParamType::Integer,
        ParamType::Float,
    ]);
    let ir = translate_function(&seg, &func, false).unwrap();

    let mut interp = Interpreter::new();
    PpuState::new().store_into(&mut interp.memory, STATE_BASE);
    let args = [
        40,
        u128::from(1.25f64.to_bits()),
        2,
        u128::from(2.5f64.to_bits()),
    ];
    let ret = interp.run(&ir, &args, &mut Host::default()).unwrap();
    assert_eq!(ret, Some(42));
    let state = PpuState::load_from(&interp.memory, STATE_BASE);
    assert_eq!(state.f[1], 3.75);
}
