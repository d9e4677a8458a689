//! Translation of PPU functions into IR.
//!
//! A translated function has a fixed shape:
//!
//! ```text
//! prolog:  state = get_state(); [log_state(addr)]; bind params; br seed
//! seed:    seeding loads of every shadowed register; br block_<entry>
//! block_*: one block per leader address
//! epilog:  read return register; flush shadows; ret
//! ```
//!
//! Leaders are the entry, every in-function branch target, and every
//! address following a branch. The seed block is terminated last, once the
//! body has materialized all shadow locals.

mod branch;
mod float;
mod integer;
mod memory;
mod system;
mod vector;

#[cfg(test)]
mod tests;

use std::collections::BTreeSet;
use std::iter::StepBy;
use std::ops::{Range, RangeInclusive};

use cellrec_ir::{
    BinaryOp, Callee, CastOp, CmpOp, Endian, FunctionBuilder, IrBuilder, Type, UnaryOp,
};
use cellrec_isa::{OpClass, PpuInstr, PpuOpcode, decode_ppu, disasm_ppu};
use rustc_hash::FxHashMap;
use tracing::{debug, trace, trace_span, warn};

use crate::error::{Result, TranslateError};
use crate::function::{Function, ParamType, ReturnType};
use crate::registers::{RegClass, RegisterFile, xer};
use crate::segment::Segment;

/// How `update_cr` orders its operands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompareMode {
    Signed,
    Unsigned,
    /// Ordered float compare; the fourth bit records "unordered".
    Float,
}

/// Translates one guest function through an [`IrBuilder`].
pub struct Recompiler<'a, B: IrBuilder> {
    builder: &'a mut B,
    segment: &'a Segment,
    function: &'a Function,
    log_states: bool,
}

impl<'a, B: IrBuilder> Recompiler<'a, B> {
    pub fn new(builder: &'a mut B, segment: &'a Segment, function: &'a Function) -> Self {
        Self {
            builder,
            segment,
            function,
            log_states: true,
        }
    }

    /// Emit a call to the log-state thunk on entry (on by default).
    #[must_use]
    pub const fn with_log_states(mut self, enabled: bool) -> Self {
        self.log_states = enabled;
        self
    }

    /// Emit the whole function at the builder's current state.
    pub fn translate(self) -> Result<()> {
        let Self {
            builder: b,
            segment,
            function: func,
            log_states,
        } = self;
        let _span = trace_span!("translate", function = %func.name).entered();

        if func.ret.is_multi_float() {
            warn!(
                address = format_args!("{:#x}", func.address),
                ret = ?func.ret,
                "multi-value float returns are not supported"
            );
            return Err(TranslateError::MultiFloatReturn(func.address));
        }
        if func.params.contains(&ParamType::Vector) {
            return Err(TranslateError::VectorParameter(func.address));
        }
        if func.size == 0 || !segment.contains(func.address) || func.end() > segment.end() {
            return Err(TranslateError::OutOfSegment {
                address: func.address,
            });
        }

        let prolog = b.create_block("prolog");
        let seed = b.create_block("seed");
        let epilog = b.create_block("epilog");

        b.set_insert_point(prolog);
        let thunks = &segment.thunks;
        let state = b
            .call(Callee::Extern(thunks.get_state.clone()), &[], Some(Type::I64))
            .ok_or_else(|| TranslateError::MissingResult(thunks.get_state.clone()))?;
        if log_states {
            let addr = b.const_int(Type::I64, func.address);
            b.call(Callee::Extern(thunks.log_state.clone()), &[addr], None);
        }

        let mut regs = RegisterFile::new(state, seed);
        let (mut ints, mut floats) = (0, 0);
        for (index, param) in func.params.iter().enumerate() {
            let value = b.param(index, param.ir_type());
            match param {
                ParamType::Integer => {
                    regs.bind(b, RegClass::Gpr, 3 + ints, value);
                    ints += 1;
                }
                ParamType::Float => {
                    regs.bind(b, RegClass::Fpr, 1 + floats, value);
                    floats += 1;
                }
                ParamType::Vector => return Err(TranslateError::VectorParameter(func.address)),
            }
        }
        b.br(seed);

        let mut t = Translator {
            b,
            segment,
            func,
            regs,
            epilog,
            blocks: FxHashMap::default(),
            pc: func.address,
            instr: PpuInstr(0),
        };
        let entry = t.create_blocks()?;
        t.translate_body(entry)?;
        t.emit_epilog();

        t.b.set_insert_point(seed);
        t.b.br(entry);
        debug!(
            function = %func.name,
            blocks = t.blocks.len(),
            shadows = t.regs.shadow_count(),
            "translated"
        );
        Ok(())
    }
}

/// Translate `function` into a fresh reference IR function.
pub fn translate_function(
    segment: &Segment,
    function: &Function,
    log_states: bool,
) -> Result<cellrec_ir::Function> {
    let mut b = FunctionBuilder::new(
        function.name.clone(),
        function.ir_params(),
        function.ret.ir_type(),
    );
    Recompiler::new(&mut b, segment, function)
        .with_log_states(log_states)
        .translate()?;
    Ok(b.finish()?)
}

/// Per-function translation state.
pub(crate) struct Translator<'a, B: IrBuilder> {
    b: &'a mut B,
    segment: &'a Segment,
    func: &'a Function,
    regs: RegisterFile<B>,
    epilog: B::Block,
    blocks: FxHashMap<u64, B::Block>,
    /// Address of the instruction being translated.
    pc: u64,
    instr: PpuInstr,
}

impl<B: IrBuilder> Translator<'_, B> {
    // ===== Function structure =====

    fn decode_at(&self, pc: u64) -> Result<(PpuInstr, PpuOpcode)> {
        let instr = self
            .segment
            .fetch(pc)
            .ok_or(TranslateError::OutOfSegment { address: pc })?;
        let op = decode_ppu(instr).map_err(|_| TranslateError::UnknownInstruction {
            address: pc,
            raw: instr.raw(),
        })?;
        Ok((instr, op))
    }

    fn addresses(&self) -> StepBy<Range<u64>> {
        (self.func.address..self.func.end()).step_by(4)
    }

    /// Create one block per leader and return the entry block.
    fn create_blocks(&mut self) -> Result<B::Block> {
        let mut leaders = BTreeSet::from([self.func.address]);
        for pc in self.addresses() {
            let (instr, op) = self.decode_at(pc)?;
            if !op.is_branch() {
                continue;
            }
            leaders.insert(pc + 4);
            let target = match op {
                PpuOpcode::B if !instr.lk() => Some(branch_target(pc, instr.li(), instr.aa())),
                PpuOpcode::Bc if !instr.lk() => Some(branch_target(pc, instr.bd(), instr.aa())),
                _ => None,
            };
            if let Some(target) = target.filter(|&t| self.func.contains(t)) {
                leaders.insert(target);
            }
        }
        for addr in leaders.into_iter().filter(|&a| self.func.contains(a)) {
            let block = self.b.create_block(&format!("block_{addr:x}"));
            self.blocks.insert(addr, block);
        }
        Ok(self.blocks[&self.func.address])
    }

    fn translate_body(&mut self, entry: B::Block) -> Result<()> {
        self.b.set_insert_point(entry);
        for pc in self.addresses() {
            if pc != self.func.address
                && let Some(&block) = self.blocks.get(&pc)
            {
                self.fall_through(block);
                self.b.set_insert_point(block);
            }
            let (instr, op) = self.decode_at(pc)?;
            self.pc = pc;
            self.instr = instr;
            trace!(address = format_args!("{pc:#x}"), "{}", disasm_ppu(instr, pc));
            self.translate_instr(op)?;
        }
        let epilog = self.epilog;
        self.fall_through(epilog);
        Ok(())
    }

    fn translate_instr(&mut self, op: PpuOpcode) -> Result<()> {
        match op.class() {
            OpClass::Integer => self.integer(op),
            OpClass::Branch => self.branch(op),
            OpClass::Memory => self.memory(op),
            OpClass::Float => self.float(op),
            OpClass::Vector => self.vector(op),
            OpClass::System => self.system(op),
        }
    }

    fn emit_epilog(&mut self) {
        self.b.set_insert_point(self.epilog);
        let value = match self.func.ret {
            ReturnType::Integer => Some(self.gpr(3)),
            ReturnType::Float => Some(self.fpr(1)),
            ReturnType::Vector => Some(self.vr(2)),
            _ => None,
        };
        self.regs.flush(self.b);
        self.b.ret(value);
    }

    /// Branch to `target` unless the current block already ended.
    fn fall_through(&mut self, target: B::Block) {
        if let Some(current) = self.b.insert_block()
            && !self.b.is_terminated(current)
        {
            self.b.br(target);
        }
    }

    /// Block of the instruction after the current one, or the epilog at the
    /// end of the function.
    fn next_block(&self) -> B::Block {
        self.blocks
            .get(&(self.pc + 4))
            .copied()
            .unwrap_or(self.epilog)
    }

    fn unimplemented(&self, op: PpuOpcode) -> TranslateError {
        TranslateError::Unimplemented {
            address: self.pc,
            raw: self.instr.raw(),
            mnemonic: op.mnemonic(),
        }
    }

    // ===== Values =====

    fn int(&mut self, ty: Type, value: u64) -> B::Value {
        self.b.const_int(ty, value)
    }

    fn i64c(&mut self, value: u64) -> B::Value {
        self.b.const_int(Type::I64, value)
    }

    fn u128c(&mut self, value: u128) -> B::Value {
        crate::swar::const_u128(self.b, value)
    }

    fn bin(&mut self, op: BinaryOp, lhs: B::Value, rhs: B::Value) -> B::Value {
        self.b.binary(op, lhs, rhs)
    }

    fn un(&mut self, op: UnaryOp, arg: B::Value) -> B::Value {
        self.b.unary(op, arg)
    }

    fn cmp(&mut self, op: CmpOp, lhs: B::Value, rhs: B::Value) -> B::Value {
        self.b.cmp(op, lhs, rhs)
    }

    fn cast(&mut self, op: CastOp, arg: B::Value, ty: Type) -> B::Value {
        self.b.cast(op, arg, ty)
    }

    fn trunc(&mut self, arg: B::Value, ty: Type) -> B::Value {
        self.cast(CastOp::Trunc, arg, ty)
    }

    fn zext(&mut self, arg: B::Value, ty: Type) -> B::Value {
        self.cast(CastOp::ZExt, arg, ty)
    }

    fn sext(&mut self, arg: B::Value, ty: Type) -> B::Value {
        self.cast(CastOp::SExt, arg, ty)
    }

    /// Binary op with an integer constant of the same type as `lhs`.
    fn bin_imm(&mut self, op: BinaryOp, lhs: B::Value, imm: u64) -> B::Value {
        let ty = self.b.value_type(lhs);
        let rhs = self.int(ty, imm);
        self.bin(op, lhs, rhs)
    }

    /// Comparison against an integer constant of the same type as `lhs`.
    fn cmp_imm(&mut self, op: CmpOp, lhs: B::Value, imm: u64) -> B::Value {
        let ty = self.b.value_type(lhs);
        let rhs = self.int(ty, imm);
        self.cmp(op, lhs, rhs)
    }

    fn call_extern(&mut self, name: &str, args: &[B::Value], ret: Option<Type>) -> Option<B::Value> {
        self.b.call(Callee::Extern(name.to_string()), args, ret)
    }

    fn extern_value(&mut self, name: &str) -> Result<B::Value> {
        self.call_extern(name, &[], Some(Type::I64))
            .ok_or_else(|| TranslateError::MissingResult(name.to_string()))
    }

    // ===== Registers =====

    fn gpr(&mut self, n: usize) -> B::Value {
        self.regs.read(self.b, RegClass::Gpr, n)
    }

    fn set_gpr(&mut self, n: usize, value: B::Value) {
        self.regs.write(self.b, RegClass::Gpr, n, value);
    }

    /// `rA|0` operand.
    fn gpr_or_zero(&mut self, n: usize) -> B::Value {
        if n == 0 { self.i64c(0) } else { self.gpr(n) }
    }

    fn fpr(&mut self, n: usize) -> B::Value {
        self.regs.read(self.b, RegClass::Fpr, n)
    }

    fn set_fpr(&mut self, n: usize, value: B::Value) {
        self.regs.write(self.b, RegClass::Fpr, n, value);
    }

    fn vr(&mut self, n: usize) -> B::Value {
        self.regs.read(self.b, RegClass::Vr, n)
    }

    fn set_vr(&mut self, n: usize, value: B::Value) {
        self.regs.write(self.b, RegClass::Vr, n, value);
    }

    fn spr(&mut self, class: RegClass) -> B::Value {
        self.regs.read(self.b, class, 0)
    }

    fn set_spr(&mut self, class: RegClass, value: B::Value) {
        self.regs.write(self.b, class, 0, value);
    }

    /// CR bit as an `I8` holding 0 or 1.
    fn cr_bit(&mut self, bit: usize) -> B::Value {
        self.regs.read(self.b, RegClass::Cr, bit)
    }

    fn set_cr_bit(&mut self, bit: usize, value: B::Value) {
        self.regs.write(self.b, RegClass::Cr, bit, value);
    }

    fn xer(&mut self, field: usize) -> B::Value {
        self.regs.read(self.b, RegClass::Xer, field)
    }

    fn set_xer(&mut self, field: usize, value: B::Value) {
        self.regs.write(self.b, RegClass::Xer, field, value);
    }

    fn flag_byte(&mut self, flag: B::Value) -> B::Value {
        self.zext(flag, Type::I8)
    }

    fn set_ca(&mut self, flag: B::Value) {
        let byte = self.flag_byte(flag);
        self.set_xer(xer::CA, byte);
    }

    /// Set OV to `flag` and accumulate it into SO.
    fn set_ov(&mut self, flag: B::Value) {
        let byte = self.flag_byte(flag);
        self.set_xer(xer::OV, byte);
        let so = self.xer(xer::SO);
        let so = self.bin(BinaryOp::Or, so, byte);
        self.set_xer(xer::SO, so);
    }

    /// Write CR field `field` from four `I8` bits (LT, GT, EQ, SO).
    fn set_cr_field(&mut self, field: usize, bits: [B::Value; 4]) {
        for (i, bit) in bits.into_iter().enumerate() {
            self.set_cr_bit(field * 4 + i, bit);
        }
    }

    /// Compare `lhs` with `rhs` into CR field `field`.
    pub(crate) fn update_cr(&mut self, field: usize, lhs: B::Value, rhs: B::Value, mode: CompareMode) {
        let (lt, gt, eq) = match mode {
            CompareMode::Signed => (CmpOp::Slt, CmpOp::Sgt, CmpOp::Eq),
            CompareMode::Unsigned => (CmpOp::Ult, CmpOp::Ugt, CmpOp::Eq),
            CompareMode::Float => (CmpOp::FLt, CmpOp::FGt, CmpOp::FEq),
        };
        let lt = self.cmp(lt, lhs, rhs);
        let lt = self.flag_byte(lt);
        let gt = self.cmp(gt, lhs, rhs);
        let gt = self.flag_byte(gt);
        let eq = self.cmp(eq, lhs, rhs);
        let eq = self.flag_byte(eq);
        let fourth = if mode == CompareMode::Float {
            let uno = self.cmp(CmpOp::FUno, lhs, rhs);
            self.flag_byte(uno)
        } else {
            self.xer(xer::SO)
        };
        self.set_cr_field(field, [lt, gt, eq, fourth]);
    }

    /// Record form: signed compare of the full result against zero.
    fn update_cr0(&mut self, result: B::Value) {
        let zero = self.i64c(0);
        self.update_cr(0, result, zero, CompareMode::Signed);
    }

    /// Float record form: CR1 takes FPSCR bits 0-3 (FX, FEX, VX, OX).
    fn update_cr1(&mut self) {
        let fpscr = self.spr(RegClass::Fpscr);
        let bits = std::array::from_fn(|i| {
            let shifted = self.bin_imm(BinaryOp::LShr, fpscr, 31 - i as u64);
            let bit = self.bin_imm(BinaryOp::And, shifted, 1);
            self.trunc(bit, Type::I8)
        });
        self.set_cr_field(1, bits);
    }

    // ===== Guest memory =====

    /// Host address of guest address `ea`.
    fn host_addr(&mut self, ea: B::Value) -> Result<B::Value> {
        let segment = self.segment;
        let base = self.extern_value(&segment.thunks.memory_base)?;
        Ok(self.bin(BinaryOp::Add, base, ea))
    }

    fn load_mem(&mut self, ea: B::Value, ty: Type) -> Result<B::Value> {
        let addr = self.host_addr(ea)?;
        Ok(self.b.load(addr, ty, guest_endian(ty)))
    }

    fn store_mem(&mut self, ea: B::Value, value: B::Value) -> Result<()> {
        let ty = self.b.value_type(value);
        let addr = self.host_addr(ea)?;
        self.b.store(addr, value, guest_endian(ty));
        Ok(())
    }

    fn load_state(&mut self, offset: usize, ty: Type) -> B::Value {
        self.regs.load_state(self.b, offset, ty)
    }

    fn store_state(&mut self, offset: usize, value: B::Value) {
        self.regs.store_state(self.b, offset, value);
    }

    // ===== Calls =====

    /// Call the guest function at `target`, passing arguments from and
    /// returning results into the ABI registers of its signature. Argument
    /// registers are also spilled, and result registers reloaded, so a
    /// callee reading or writing them through the state sees current
    /// values.
    fn call_guest(&mut self, target: u64) -> Result<()> {
        let segment = self.segment;
        let (params, ret) = match segment.function(target) {
            Some(callee) => (callee.params.as_slice(), callee.ret),
            None => (&[][..], ReturnType::Integer),
        };
        if ret.is_multi_float() {
            return Err(TranslateError::MultiFloatReturn(target));
        }
        let (mut ints, mut floats, mut vectors) = (0, 0, 0);
        let mut args = Vec::with_capacity(params.len());
        for param in params {
            let value = match param {
                ParamType::Integer => {
                    ints += 1;
                    self.gpr(2 + ints)
                }
                ParamType::Float => {
                    floats += 1;
                    self.fpr(floats)
                }
                ParamType::Vector => {
                    vectors += 1;
                    self.vr(1 + vectors)
                }
            };
            args.push(value);
        }
        self.spill_arguments();
        let result = self.b.call(Callee::Guest(target), &args, ret.ir_type());
        self.reload_results();
        match (ret, result) {
            (ReturnType::Integer, Some(v)) => self.set_gpr(3, v),
            (ReturnType::Float, Some(v)) => self.set_fpr(1, v),
            (ReturnType::Vector, Some(v)) => self.set_vr(2, v),
            _ => {}
        }
        Ok(())
    }

    /// Call through the indirect-call thunk. The callee's signature is
    /// unknown, so arguments and results travel through the state.
    fn call_indirect(&mut self, target: B::Value) {
        let segment = self.segment;
        self.spill_arguments();
        self.call_extern(&segment.thunks.indirect_call, &[target], None);
        self.reload_results();
    }

    fn spill_arguments(&mut self) {
        for (class, range) in ARGUMENT_REGISTERS {
            for index in range {
                self.regs.spill(self.b, class, index);
            }
        }
    }

    fn reload_results(&mut self) {
        for (class, index) in RESULT_REGISTERS {
            self.regs.reload(self.b, class, index);
        }
    }
}

/// Registers that carry arguments of a call.
const ARGUMENT_REGISTERS: [(RegClass, RangeInclusive<usize>); 3] = [
    (RegClass::Gpr, 3..=10),
    (RegClass::Fpr, 1..=13),
    (RegClass::Vr, 2..=13),
];

/// Registers that carry the result of a call.
const RESULT_REGISTERS: [(RegClass, usize); 3] =
    [(RegClass::Gpr, 3), (RegClass::Fpr, 1), (RegClass::Vr, 2)];

/// Absolute target of a relative or absolute branch at `pc`.
#[allow(clippy::cast_sign_loss)]
const fn branch_target(pc: u64, displacement: i64, absolute: bool) -> u64 {
    if absolute {
        displacement as u64
    } else {
        pc.wrapping_add_signed(displacement)
    }
}

/// Guest memory is big-endian; single bytes need no swap.
const fn guest_endian(ty: Type) -> Endian {
    if ty.bytes() == 1 {
        Endian::Native
    } else {
        Endian::Big
    }
}

/// PowerPC rotate mask with big-endian bit numbering; wraps when `mb > me`.
pub(crate) const fn rotate_mask(mb: u32, me: u32) -> u64 {
    let begin = u64::MAX >> mb;
    let end = u64::MAX << (63 - me);
    if mb <= me { begin & end } else { begin | end }
}
