//! Shared helpers: a guest-code assembler, an ELF writer, and a host that
//! runs emitted IR in the interpreter.

#![allow(dead_code)]

use cellrec::{EmittedFunction, SegmentReport};
use cellrec_asm::PpcAssembler;
use cellrec_elf::{
    EHDR_SIZE, ELF_CLASS_64, ELF_DATA_MSB, ELF_MACHINE_PPC64, ELF_MAGIC, PF_R, PF_X, PHDR_SIZE,
    PT_LOAD, SHDR_SIZE, SHT_STRTAB, SHT_SYMTAB, STB_GLOBAL, STT_FUNC, SYM_SIZE,
};
use cellrec_ir::{ExternHandler, InterpError, Interpreter, Memory};
use cellrec_jit::PpuState;

pub const CODE_BASE: u64 = 0x1_0000;
pub const STATE_BASE: u64 = 0x10_0000;
pub const MEM_BASE: u64 = 0x2000_0000;

pub fn assemble(f: impl FnOnce(&mut PpcAssembler<'_>) -> cellrec_asm::Result<()>) -> Vec<u8> {
    let mut mem = [0u8; 1024];
    let mut asm = PpcAssembler::new(&mut mem);
    f(&mut asm).unwrap();
    let size = asm.finalize().unwrap();
    asm.code()[..size].to_vec()
}

/// Host side of the state and memory thunks.
#[derive(Default)]
pub struct Host {
    pub logged: Vec<u64>,
}

impl ExternHandler for Host {
    fn call(
        &mut self,
        name: &str,
        args: &[u128],
        _memory: &mut Memory,
    ) -> Result<Option<u128>, InterpError> {
        match name {
            "cellrec_get_state" => Ok(Some(u128::from(STATE_BASE))),
            "cellrec_memory_base" => Ok(Some(u128::from(MEM_BASE))),
            "cellrec_log_state" => {
                self.logged.push(args.first().map_or(0, |&a| u64::try_from(a).unwrap()));
                Ok(None)
            }
            _ => Err(InterpError::UnknownExtern(name.to_string())),
        }
    }
}

/// Run `entry` with every function of `functions` callable, starting from
/// `state`. Returns the result and writes the final state back.
pub fn run(
    functions: &[EmittedFunction],
    entry: u64,
    state: &mut PpuState,
) -> (Option<u128>, Host) {
    let mut interp = Interpreter::new().with_step_limit(100_000);
    for emitted in functions {
        interp.add_guest_function(emitted.address, &emitted.function);
    }
    state.store_into(&mut interp.memory, STATE_BASE);

    let main = functions.iter().find(|f| f.address == entry).unwrap();
    let mut host = Host::default();
    let ret = interp.run(&main.function, &[], &mut host).unwrap();
    *state = PpuState::load_from(&interp.memory, STATE_BASE);
    (ret, host)
}

/// Emitted functions of every report.
pub fn emitted(reports: &[SegmentReport]) -> Vec<EmittedFunction> {
    reports.iter().flat_map(|r| r.functions.iter().cloned()).collect()
}

fn put16(v: &mut Vec<u8>, x: u16) {
    v.extend_from_slice(&x.to_be_bytes());
}

fn put32(v: &mut Vec<u8>, x: u32) {
    v.extend_from_slice(&x.to_be_bytes());
}

fn put64(v: &mut Vec<u8>, x: u64) {
    v.extend_from_slice(&x.to_be_bytes());
}

/// Minimal big-endian PPC64 executable: `code` loaded at `base` as the
/// only segment, `entry` as the entry point, and one `STT_FUNC` symbol
/// per `(name, address, size)`.
pub fn build_elf(base: u64, entry: u64, code: &[u8], functions: &[(&str, u64, u64)]) -> Vec<u8> {
    let code_off = 0x100u64;
    let mut strtab = vec![0u8];
    let mut names = Vec::new();
    for (name, _, _) in functions {
        names.push(u32::try_from(strtab.len()).unwrap());
        strtab.extend_from_slice(name.as_bytes());
        strtab.push(0);
    }
    let symtab_off = (code_off + code.len() as u64).next_multiple_of(8);
    let symtab_size = (functions.len() as u64 + 1) * SYM_SIZE as u64;
    let strtab_off = symtab_off + symtab_size;
    let shoff = (strtab_off + strtab.len() as u64).next_multiple_of(8);

    let mut v = Vec::new();
    v.extend_from_slice(&ELF_MAGIC);
    v.extend_from_slice(&[ELF_CLASS_64, ELF_DATA_MSB, 1, 0]);
    v.resize(16, 0);
    put16(&mut v, 2);
    put16(&mut v, ELF_MACHINE_PPC64);
    put32(&mut v, 1);
    put64(&mut v, entry);
    put64(&mut v, EHDR_SIZE as u64);
    put64(&mut v, shoff);
    put32(&mut v, 0);
    put16(&mut v, EHDR_SIZE as u16);
    put16(&mut v, PHDR_SIZE as u16);
    put16(&mut v, 1);
    put16(&mut v, SHDR_SIZE as u16);
    put16(&mut v, 3);
    put16(&mut v, 0);

    put32(&mut v, PT_LOAD);
    put32(&mut v, PF_R | PF_X);
    put64(&mut v, code_off);
    put64(&mut v, base);
    put64(&mut v, base);
    put64(&mut v, code.len() as u64);
    put64(&mut v, code.len() as u64);
    put64(&mut v, 0x1_0000);

    v.resize(code_off as usize, 0);
    v.extend_from_slice(code);
    v.resize(symtab_off as usize, 0);
    v.resize(v.len() + SYM_SIZE, 0);
    for ((_, value, size), name) in functions.iter().zip(&names) {
        put32(&mut v, *name);
        v.push((STB_GLOBAL << 4) | STT_FUNC);
        v.push(0);
        put16(&mut v, 1);
        put64(&mut v, *value);
        put64(&mut v, *size);
    }
    v.extend_from_slice(&strtab);
    v.resize(shoff as usize, 0);

    v.resize(v.len() + SHDR_SIZE, 0);
    for (kind, off, size, link, entsize) in [
        (SHT_SYMTAB, symtab_off, symtab_size, 2, SYM_SIZE as u64),
        (SHT_STRTAB, strtab_off, strtab.len() as u64, 0, 0),
    ] {
        put32(&mut v, 0);
        put32(&mut v, kind);
        put64(&mut v, 0);
        put64(&mut v, 0);
        put64(&mut v, off);
        put64(&mut v, size);
        put32(&mut v, link);
        put32(&mut v, 0);
        put64(&mut v, 8);
        put64(&mut v, entsize);
    }
    v
}
