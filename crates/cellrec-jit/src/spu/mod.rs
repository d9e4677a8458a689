//! Translation of SPU programs into IR.
//!
//! SPU code runs out of a 256 KiB local store. A translated function takes
//! no parameters and returns nothing; every register lives in the
//! [`SpuState`] and is read and written there directly.
//!
//! ```text
//! prolog:  state = get_state(); ls = local_store(); br block_<entry>
//! block_*: one block per leader address
//! epilog:  ret
//! ```
//!
//! Branches inside the function become IR branches. Branches out of it
//! become tail calls, `brsl`/`brasl` become guest calls, and branches
//! through a register other than the link register go through the
//! indirect-call thunk.

mod branch;
mod integer;
mod memory;
pub mod state;


use std::collections::BTreeSet;
use std::iter::StepBy;
use std::ops::Range;

use cellrec_ir::{BinaryOp, Callee, CastOp, CmpOp, Endian, FunctionBuilder, IrBuilder, Type};
use cellrec_isa::{OpClass, SpuInstr, SpuOpcode, decode_spu, fetch_word};
use rustc_hash::FxHashMap;
use tracing::{debug, trace, trace_span};

use crate::error::{Result, TranslateError};
use crate::function::Function;
use crate::segment::Segment;
use crate::swar::{const_u128, splat32};

pub use state::{LOCAL_STORE_SIZE, LSLR, SpuState};

/// Extern symbol names of the host services SPU code calls.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpuThunks {
    /// `() -> i64`: address of the `SpuState`.
    pub get_state: String,
    /// `() -> i64`: host address of local-store address zero.
    pub local_store: String,
    /// `(i64)`: the SPU stopped with the given signal type.
    pub stop: String,
    /// `(i64)`: run the SPU code at the given local-store address.
    pub indirect_call: String,
}

impl Default for SpuThunks {
    fn default() -> Self {
        Self {
            get_state: "cellrec_spu_get_state".into(),
            local_store: "cellrec_spu_local_store".into(),
            stop: "cellrec_spu_stop".into(),
            indirect_call: "cellrec_spu_indirect_call".into(),
        }
    }
}

/// Translates one SPU function through an [`IrBuilder`].
///
/// The segment's base and function addresses are local-store addresses.
pub struct SpuRecompiler<'a, B: IrBuilder> {
    builder: &'a mut B,
    segment: &'a Segment,
    function: &'a Function,
    thunks: &'a SpuThunks,
}

impl<'a, B: IrBuilder> SpuRecompiler<'a, B> {
    pub const fn new(
        builder: &'a mut B,
        segment: &'a Segment,
        function: &'a Function,
        thunks: &'a SpuThunks,
    ) -> Self {
        Self {
            builder,
            segment,
            function,
            thunks,
        }
    }

    pub fn translate(self) -> Result<()> {
        let Self {
            builder: b,
            segment,
            function: func,
            thunks,
        } = self;
        let _span = trace_span!("translate_spu", function = %func.name).entered();

        if func.size == 0 || !segment.contains(func.address) || func.end() > segment.end() {
            return Err(TranslateError::OutOfSegment {
                address: func.address,
            });
        }

        let prolog = b.create_block("prolog");
        let epilog = b.create_block("epilog");
        b.set_insert_point(prolog);
        let state = thunk_value(b, &thunks.get_state)?;
        let local_store = thunk_value(b, &thunks.local_store)?;

        let mut t = SpuTranslator {
            b,
            segment,
            func,
            thunks,
            state,
            local_store,
            epilog,
            blocks: FxHashMap::default(),
            pc: func.address,
            instr: SpuInstr(0),
        };
        let entry = t.create_blocks()?;
        t.b.br(entry);
        t.translate_body(entry)?;

        t.b.set_insert_point(epilog);
        t.b.ret(None);
        debug!(function = %func.name, blocks = t.blocks.len(), "translated");
        Ok(())
    }
}

/// Translate `function` into a fresh reference IR function.
pub fn translate_spu_function(
    segment: &Segment,
    function: &Function,
    thunks: &SpuThunks,
) -> Result<cellrec_ir::Function> {
    let mut b = FunctionBuilder::new(function.name.clone(), Vec::new(), None);
    SpuRecompiler::new(&mut b, segment, function, thunks).translate()?;
    Ok(b.finish()?)
}

fn thunk_value<B: IrBuilder>(b: &mut B, name: &str) -> Result<B::Value> {
    b.call(Callee::Extern(name.to_string()), &[], Some(Type::I64))
        .ok_or_else(|| TranslateError::MissingResult(name.to_string()))
}

/// Per-function translation state.
pub(crate) struct SpuTranslator<'a, B: IrBuilder> {
    b: &'a mut B,
    segment: &'a Segment,
    func: &'a Function,
    thunks: &'a SpuThunks,
    state: B::Value,
    local_store: B::Value,
    epilog: B::Block,
    blocks: FxHashMap<u64, B::Block>,
    pc: u64,
    instr: SpuInstr,
}

impl<B: IrBuilder> SpuTranslator<'_, B> {
    // ===== Function structure =====

    fn decode_at(&self, pc: u64) -> Result<(SpuInstr, SpuOpcode)> {
        let word = usize::try_from(pc - self.segment.base)
            .ok()
            .and_then(|offset| fetch_word(&self.segment.code, offset))
            .ok_or(TranslateError::OutOfSegment { address: pc })?;
        let instr = SpuInstr(word);
        let op = decode_spu(instr).map_err(|_| TranslateError::UnknownInstruction {
            address: pc,
            raw: word,
        })?;
        Ok((instr, op))
    }

    fn addresses(&self) -> StepBy<Range<u64>> {
        (self.func.address..self.func.end()).step_by(4)
    }

    fn create_blocks(&mut self) -> Result<B::Block> {
        let mut leaders = BTreeSet::from([self.func.address]);
        for pc in self.addresses() {
            let (instr, op) = self.decode_at(pc)?;
            if !op.is_branch() {
                continue;
            }
            leaders.insert(pc + 4);
            if let Some(target) = local_target(pc, instr, op).filter(|&t| self.func.contains(t)) {
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
            trace!(
                address = format_args!("{pc:#x}"),
                word = format_args!("{:#010x}", instr.raw()),
                "{}",
                op.mnemonic()
            );
            match op.class() {
                OpClass::Integer => self.integer(op)?,
                OpClass::Memory => self.memory(op)?,
                OpClass::Branch | OpClass::System => self.branch(op)?,
                OpClass::Float | OpClass::Vector => return Err(self.unimplemented(op)),
            }
        }
        let epilog = self.epilog;
        self.fall_through(epilog);
        Ok(())
    }

    fn fall_through(&mut self, target: B::Block) {
        if let Some(current) = self.b.insert_block()
            && !self.b.is_terminated(current)
        {
            self.b.br(target);
        }
    }

    fn next_block(&self) -> B::Block {
        self.blocks
            .get(&(self.pc + 4))
            .copied()
            .unwrap_or(self.epilog)
    }

    fn unimplemented(&self, op: SpuOpcode) -> TranslateError {
        TranslateError::Unimplemented {
            address: self.pc,
            raw: self.instr.raw(),
            mnemonic: op.mnemonic(),
        }
    }

    // ===== Values =====

    fn bin(&mut self, op: BinaryOp, lhs: B::Value, rhs: B::Value) -> B::Value {
        self.b.binary(op, lhs, rhs)
    }

    fn u128c(&mut self, value: u128) -> B::Value {
        const_u128(self.b, value)
    }

    /// `word` in every 32-bit lane.
    fn splat(&mut self, word: u32) -> B::Value {
        self.u128c(splat32(word))
    }

    /// Preferred-slot word of `value`.
    fn preferred(&mut self, value: B::Value) -> B::Value {
        let shift = self.b.const_int(Type::I128, 96);
        let high = self.bin(BinaryOp::LShr, value, shift);
        self.b.cast(CastOp::Trunc, high, Type::I32)
    }

    /// Compare each 32-bit lane, yielding all ones where `op` holds.
    fn lane_cmp(&mut self, op: CmpOp, lhs: B::Value, rhs: B::Value) -> B::Value {
        let mut result = self.u128c(0);
        for lane in 0..4u64 {
            let shift = self.b.const_int(Type::I128, lane * 32);
            let l = self.bin(BinaryOp::LShr, lhs, shift);
            let l = self.b.cast(CastOp::Trunc, l, Type::I32);
            let r = self.bin(BinaryOp::LShr, rhs, shift);
            let r = self.b.cast(CastOp::Trunc, r, Type::I32);
            let flag = self.b.cmp(op, l, r);
            let mask = self.b.cast(CastOp::SExt, flag, Type::I32);
            let mask = self.b.cast(CastOp::ZExt, mask, Type::I128);
            let mask = self.bin(BinaryOp::Shl, mask, shift);
            result = self.bin(BinaryOp::Or, result, mask);
        }
        result
    }

    // ===== Registers =====

    fn state_addr(&mut self, offset: usize) -> B::Value {
        let offset = self.b.const_int(Type::I64, offset as u64);
        self.bin(BinaryOp::Add, self.state, offset)
    }

    fn reg(&mut self, n: usize) -> B::Value {
        let addr = self.state_addr(state::offsets::gpr(n));
        self.b.load(addr, Type::I128, Endian::Native)
    }

    fn set_reg(&mut self, n: usize, value: B::Value) {
        let addr = self.state_addr(state::offsets::gpr(n));
        self.b.store(addr, value, Endian::Native);
    }

    /// Preferred-slot word of register `n`.
    fn reg_word(&mut self, n: usize) -> B::Value {
        let value = self.reg(n);
        self.preferred(value)
    }

    fn store_state_word(&mut self, offset: usize, word: u32) {
        let addr = self.state_addr(offset);
        let value = self.b.const_int(Type::I32, u64::from(word));
        self.b.store(addr, value, Endian::Native);
    }
}

/// Local-store address a relative or absolute RI16 branch lands on.
#[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
const fn ri16_target(pc: u64, instr: SpuInstr, absolute: bool) -> u64 {
    let offset = (instr.i16() << 2) as u32;
    let base = if absolute { 0 } else { pc as u32 };
    (base.wrapping_add(offset) & LSLR & !3) as u64
}

/// Direct jump target of a branch that stays in the caller, if any.
const fn local_target(pc: u64, instr: SpuInstr, op: SpuOpcode) -> Option<u64> {
    match op {
        SpuOpcode::Br | SpuOpcode::Brz | SpuOpcode::Brnz => Some(ri16_target(pc, instr, false)),
        SpuOpcode::Bra => Some(ri16_target(pc, instr, true)),
        _ => None,
    }
}
