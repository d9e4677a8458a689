//! Reference interpreter for the IR.
//!
//! Executes a [`Function`] over a sparse byte-addressed memory. Guest calls
//! dispatch to registered functions; extern calls go to an [`ExternHandler`].

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::error::InterpError;
use crate::eval;
use crate::function::{BlockId, Function, Inst, InstKind, Terminator, ValueId};
use crate::{Callee, Endian, Type};

const PAGE_SHIFT: u32 = 12;
const PAGE_SIZE: usize = 1 << PAGE_SHIFT;

/// Default number of instructions executed before giving up.
pub const DEFAULT_STEP_LIMIT: u64 = 1 << 24;

/// Sparse paged memory. Unwritten bytes read as zero.
#[derive(Default)]
pub struct Memory {
    pages: FxHashMap<u64, Box<[u8; PAGE_SIZE]>>,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&self, addr: u64, buf: &mut [u8]) {
        for (i, byte) in buf.iter_mut().enumerate() {
            let a = addr.wrapping_add(i as u64);
            *byte = self
                .pages
                .get(&(a >> PAGE_SHIFT))
                .map_or(0, |page| page[(a as usize) & (PAGE_SIZE - 1)]);
        }
    }

    pub fn write(&mut self, addr: u64, data: &[u8]) {
        for (i, byte) in data.iter().enumerate() {
            let a = addr.wrapping_add(i as u64);
            let page = self
                .pages
                .entry(a >> PAGE_SHIFT)
                .or_insert_with(|| Box::new([0; PAGE_SIZE]));
            page[(a as usize) & (PAGE_SIZE - 1)] = *byte;
        }
    }

    /// Load a value of type `ty`.
    pub fn load(&self, addr: u64, ty: Type, endian: Endian) -> u128 {
        let mut buf = [0u8; 16];
        let bytes = &mut buf[..ty.bytes()];
        self.read(addr, bytes);
        if is_big(endian) {
            bytes.iter().fold(0, |acc, &b| (acc << 8) | u128::from(b))
        } else {
            bytes.iter().rev().fold(0, |acc, &b| (acc << 8) | u128::from(b))
        }
    }

    /// Store the low bytes of `bits` as a value of type `ty`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn store(&mut self, addr: u64, ty: Type, endian: Endian, bits: u128) {
        let len = ty.bytes();
        let mut buf = [0u8; 16];
        for (i, byte) in buf[..len].iter_mut().enumerate() {
            let shift = if is_big(endian) { (len - 1 - i) * 8 } else { i * 8 };
            *byte = (bits >> shift) as u8;
        }
        self.write(addr, &buf[..len]);
    }
}

const fn is_big(endian: Endian) -> bool {
    match endian {
        Endian::Big => true,
        Endian::Native => cfg!(target_endian = "big"),
    }
}

/// Host functions reachable through [`Callee::Extern`].
pub trait ExternHandler {
    fn call(
        &mut self,
        name: &str,
        args: &[u128],
        memory: &mut Memory,
    ) -> Result<Option<u128>, InterpError>;
}

/// Handler that rejects every extern call.
pub struct NoExterns;

impl ExternHandler for NoExterns {
    fn call(&mut self, name: &str, _: &[u128], _: &mut Memory) -> Result<Option<u128>, InterpError> {
        Err(InterpError::UnknownExtern(name.to_string()))
    }
}

/// IR interpreter.
pub struct Interpreter<'f> {
    pub memory: Memory,
    functions: FxHashMap<u64, &'f Function>,
    step_limit: u64,
    steps: u64,
}

impl Default for Interpreter<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'f> Interpreter<'f> {
    pub fn new() -> Self {
        Self {
            memory: Memory::new(),
            functions: FxHashMap::default(),
            step_limit: DEFAULT_STEP_LIMIT,
            steps: 0,
        }
    }

    #[must_use]
    pub const fn with_step_limit(mut self, limit: u64) -> Self {
        self.step_limit = limit;
        self
    }

    /// Register a function as the target of `Callee::Guest(addr)`.
    pub fn add_guest_function(&mut self, addr: u64, func: &'f Function) {
        self.functions.insert(addr, func);
    }

    /// Instructions executed so far.
    pub const fn steps(&self) -> u64 {
        self.steps
    }

    /// Run `func` with `args` until it returns.
    pub fn run(
        &mut self,
        func: &Function,
        args: &[u128],
        externs: &mut dyn ExternHandler,
    ) -> Result<Option<u128>, InterpError> {
        let mut frame = Frame {
            values: vec![None; func.value_types.len()],
            locals: vec![0; func.locals.len()],
            args,
        };
        let mut current = BlockId(0);

        loop {
            let block = func
                .blocks
                .get(current.index())
                .ok_or(InterpError::MissingBlock(current.0))?;
            trace!(function = %func.name, block = %block.name, "enter block");

            for inst in &block.insts {
                self.steps += 1;
                if self.steps > self.step_limit {
                    return Err(InterpError::StepLimit(self.step_limit));
                }
                let result = self.exec(func, inst, &mut frame, externs)?;
                if let (Some(id), Some(bits)) = (inst.result, result) {
                    frame.values[id.index()] = Some(bits);
                }
            }

            match &block.terminator {
                None => return Err(InterpError::Unterminated(block.name.clone())),
                Some(Terminator::Br(target)) => current = *target,
                Some(Terminator::BrCond {
                    cond,
                    then_block,
                    else_block,
                }) => {
                    current = if frame.get(*cond)? & 1 == 1 {
                        *then_block
                    } else {
                        *else_block
                    };
                }
                Some(Terminator::Ret(value)) => {
                    return value.map(|v| frame.get(v)).transpose();
                }
            }
        }
    }

    fn exec(
        &mut self,
        func: &Function,
        inst: &Inst,
        frame: &mut Frame<'_>,
        externs: &mut dyn ExternHandler,
    ) -> Result<Option<u128>, InterpError> {
        let value = match &inst.kind {
            InstKind::Const { bits, .. } => *bits,
            InstKind::Param { index, ty } => {
                let arg = frame
                    .args
                    .get(*index)
                    .ok_or(InterpError::MissingParameter(*index))?;
                arg & ty.mask()
            }
            InstKind::Binary { op, lhs, rhs } => {
                eval::binary(*op, func.value_type(*lhs), frame.get(*lhs)?, frame.get(*rhs)?)
            }
            InstKind::Unary { op, arg } => eval::unary(*op, func.value_type(*arg), frame.get(*arg)?),
            InstKind::Cmp { op, lhs, rhs } => u128::from(eval::cmp(
                *op,
                func.value_type(*lhs),
                frame.get(*lhs)?,
                frame.get(*rhs)?,
            )),
            InstKind::Cast { op, arg, ty } => {
                eval::cast(*op, func.value_type(*arg), *ty, frame.get(*arg)?)
            }
            InstKind::Select {
                cond,
                if_true,
                if_false,
            } => {
                if frame.get(*cond)? & 1 == 1 {
                    frame.get(*if_true)?
                } else {
                    frame.get(*if_false)?
                }
            }
            InstKind::Load { addr, ty, endian } => {
                self.memory.load(addr_of(frame.get(*addr)?), *ty, *endian)
            }
            InstKind::Store {
                addr,
                value,
                endian,
            } => {
                let ty = func.value_type(*value);
                let bits = frame.get(*value)?;
                self.memory.store(addr_of(frame.get(*addr)?), ty, *endian, bits);
                return Ok(None);
            }
            InstKind::LoadLocal { local } => frame.locals[local.index()],
            InstKind::StoreLocal { local, value } => {
                frame.locals[local.index()] = frame.get(*value)?;
                return Ok(None);
            }
            InstKind::Call { callee, args, ret } => {
                let args = frame.get_all(args)?;
                let result = self.call(callee, &args, externs)?;
                return Ok(ret.map(|ty| result.unwrap_or(0) & ty.mask()));
            }
            InstKind::CallCond { cond, callee, args } => {
                if frame.get(*cond)? & 1 == 1 {
                    let args = frame.get_all(args)?;
                    self.call(callee, &args, externs)?;
                }
                return Ok(None);
            }
            InstKind::Barrier(_) => return Ok(None),
        };
        Ok(Some(value))
    }

    fn call(
        &mut self,
        callee: &Callee,
        args: &[u128],
        externs: &mut dyn ExternHandler,
    ) -> Result<Option<u128>, InterpError> {
        match callee {
            Callee::Guest(addr) => {
                let target = *self
                    .functions
                    .get(addr)
                    .ok_or(InterpError::UnknownGuestFunction(*addr))?;
                self.run(target, args, externs)
            }
            Callee::Extern(name) => externs.call(name, args, &mut self.memory),
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
const fn addr_of(bits: u128) -> u64 {
    bits as u64
}

struct Frame<'a> {
    values: Vec<Option<u128>>,
    locals: Vec<u128>,
    args: &'a [u128],
}

impl Frame<'_> {
    fn get(&self, value: ValueId) -> Result<u128, InterpError> {
        self.values
            .get(value.index())
            .copied()
            .flatten()
            .ok_or(InterpError::UndefinedValue(value.0))
    }

    fn get_all(&self, values: &[ValueId]) -> Result<Vec<u128>, InterpError> {
        values.iter().map(|v| self.get(*v)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BinaryOp, CmpOp, FunctionBuilder, IrBuilder};

    #[test]
    fn test_memory_endianness() {
        let mut mem = Memory::new();
        mem.store(0x1000, Type::I32, Endian::Big, 0x1122_3344);
        let mut bytes = [0u8; 4];
        mem.read(0x1000, &mut bytes);
        assert_eq!(bytes, [0x11, 0x22, 0x33, 0x44]);
        assert_eq!(mem.load(0x1000, Type::I32, Endian::Big), 0x1122_3344);
        assert_eq!(mem.load(0x1000, Type::I8, Endian::Native), 0x11);
        assert_eq!(mem.load(0x9000, Type::I64, Endian::Big), 0);
    }

    #[test]
    fn test_memory_crosses_pages() {
        let mut mem = Memory::new();
        mem.store(0x0FFE, Type::I32, Endian::Big, 0xAABB_CCDD);
        assert_eq!(mem.load(0x0FFE, Type::I32, Endian::Big), 0xAABB_CCDD);
    }

    #[test]
    fn test_loop_sums_to_n() {
        // sum = 0; i = n; while i != 0 { sum += i; i -= 1 }
        let mut b = FunctionBuilder::new("sum", vec![Type::I64], Some(Type::I64));
        let entry = b.create_block("entry");
        let head = b.create_block("head");
        let body = b.create_block("body");
        let exit = b.create_block("exit");
        let sum = b.create_local(Type::I64);
        let i = b.create_local(Type::I64);

        b.set_insert_point(entry);
        let n = b.param(0, Type::I64);
        let zero = b.const_int(Type::I64, 0);
        b.store_local(sum, zero);
        b.store_local(i, n);
        b.br(head);

        b.set_insert_point(head);
        let iv = b.load_local(i);
        let zero = b.const_int(Type::I64, 0);
        let done = b.cmp(CmpOp::Eq, iv, zero);
        b.br_cond(done, exit, body);

        b.set_insert_point(body);
        let iv = b.load_local(i);
        let sv = b.load_local(sum);
        let next = b.binary(BinaryOp::Add, sv, iv);
        b.store_local(sum, next);
        let one = b.const_int(Type::I64, 1);
        let dec = b.binary(BinaryOp::Sub, iv, one);
        b.store_local(i, dec);
        b.br(head);

        b.set_insert_point(exit);
        let result = b.load_local(sum);
        b.ret(Some(result));

        let func = b.finish().unwrap();
        let mut interp = Interpreter::new();
        let out = interp.run(&func, &[10], &mut NoExterns).unwrap();
        assert_eq!(out, Some(55));
    }

    #[test]
    fn test_guest_and_extern_calls() {
        let mut callee = FunctionBuilder::new("double", vec![Type::I64], Some(Type::I64));
        let entry = callee.create_block("entry");
        callee.set_insert_point(entry);
        let x = callee.param(0, Type::I64);
        let y = callee.binary(BinaryOp::Add, x, x);
        callee.ret(Some(y));
        let callee = callee.finish().unwrap();

        let mut caller = FunctionBuilder::new("caller", vec![], Some(Type::I64));
        let entry = caller.create_block("entry");
        caller.set_insert_point(entry);
        let base = caller
            .call(Callee::Extern("base".into()), &[], Some(Type::I64))
            .unwrap();
        let r = caller
            .call(Callee::Guest(0x100), &[base], Some(Type::I64))
            .unwrap();
        caller.ret(Some(r));
        let caller = caller.finish().unwrap();

        struct Base;
        impl ExternHandler for Base {
            fn call(
                &mut self,
                name: &str,
                _: &[u128],
                _: &mut Memory,
            ) -> Result<Option<u128>, InterpError> {
                assert_eq!(name, "base");
                Ok(Some(21))
            }
        }

        let mut interp = Interpreter::new();
        interp.add_guest_function(0x100, &callee);
        assert_eq!(interp.run(&caller, &[], &mut Base).unwrap(), Some(42));
    }

    #[test]
    fn test_step_limit() {
        let mut b = FunctionBuilder::new("spin", vec![], None);
        let entry = b.create_block("entry");
        b.set_insert_point(entry);
        b.const_int(Type::I32, 0);
        b.br(entry);
        let func = b.finish().unwrap();

        let mut interp = Interpreter::new().with_step_limit(100);
        assert_eq!(
            interp.run(&func, &[], &mut NoExterns),
            Err(InterpError::StepLimit(100))
        );
    }

    #[test]
    fn test_unknown_extern() {
        let mut b = FunctionBuilder::new("f", vec![], None);
        let entry = b.create_block("entry");
        b.set_insert_point(entry);
        b.call(Callee::Extern("missing".into()), &[], None);
        b.ret(None);
        let func = b.finish().unwrap();
        assert_eq!(
            Interpreter::new().run(&func, &[], &mut NoExterns),
            Err(InterpError::UnknownExtern("missing".into()))
        );
    }
}
