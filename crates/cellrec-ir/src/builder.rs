//! The IR-builder contract and the reference builder.
//!
//! Translators are written against [`IrBuilder`] so they can target any
//! backend. [`FunctionBuilder`] builds the reference [`Function`].

use std::fmt;
use std::hash::Hash;

use crate::error::{BuildError, Result};
use crate::function::{Block, BlockId, Function, Inst, InstKind, LocalId, Terminator, ValueId};
use crate::{Barrier, BinaryOp, Callee, CastOp, CmpOp, Endian, Type, UnaryOp};

/// Capability a translator needs from an IR backend.
///
/// Instructions are appended at the current insert point. Binary operands
/// share one type; comparisons produce `I1`.
pub trait IrBuilder {
    type Value: Copy + fmt::Debug;
    type Block: Copy + fmt::Debug + Eq + Hash;
    type Local: Copy + fmt::Debug;

    // ===== Blocks =====

    fn create_block(&mut self, name: &str) -> Self::Block;
    fn set_insert_point(&mut self, block: Self::Block);
    fn insert_block(&self) -> Option<Self::Block>;
    /// Whether `block` already ends in a terminator.
    fn is_terminated(&self, block: Self::Block) -> bool;

    // ===== Values =====

    fn param(&mut self, index: usize, ty: Type) -> Self::Value;
    fn const_int(&mut self, ty: Type, value: u64) -> Self::Value;
    fn const_float(&mut self, ty: Type, value: f64) -> Self::Value;
    fn binary(&mut self, op: BinaryOp, lhs: Self::Value, rhs: Self::Value) -> Self::Value;
    fn unary(&mut self, op: UnaryOp, arg: Self::Value) -> Self::Value;
    fn cmp(&mut self, op: CmpOp, lhs: Self::Value, rhs: Self::Value) -> Self::Value;
    fn cast(&mut self, op: CastOp, arg: Self::Value, ty: Type) -> Self::Value;
    fn select(
        &mut self,
        cond: Self::Value,
        if_true: Self::Value,
        if_false: Self::Value,
    ) -> Self::Value;
    fn value_type(&self, value: Self::Value) -> Type;

    // ===== Memory =====

    fn load(&mut self, addr: Self::Value, ty: Type, endian: Endian) -> Self::Value;
    fn store(&mut self, addr: Self::Value, value: Self::Value, endian: Endian);

    // ===== Locals =====

    fn create_local(&mut self, ty: Type) -> Self::Local;
    fn load_local(&mut self, local: Self::Local) -> Self::Value;
    fn store_local(&mut self, local: Self::Local, value: Self::Value);

    // ===== Calls and side effects =====

    fn call(&mut self, callee: Callee, args: &[Self::Value], ret: Option<Type>)
    -> Option<Self::Value>;
    fn call_cond(&mut self, cond: Self::Value, callee: Callee, args: &[Self::Value]);
    fn barrier(&mut self, kind: Barrier);

    // ===== Control flow =====

    fn br(&mut self, target: Self::Block);
    fn br_cond(&mut self, cond: Self::Value, then_block: Self::Block, else_block: Self::Block);
    fn ret(&mut self, value: Option<Self::Value>);
}

/// Builds a reference [`Function`].
///
/// Misuse (emitting with no insert point or after a terminator) is recorded
/// and reported by [`FunctionBuilder::finish`].
pub struct FunctionBuilder {
    func: Function,
    current: Option<BlockId>,
    error: Option<BuildError>,
}

impl FunctionBuilder {
    pub fn new(name: impl Into<String>, params: Vec<Type>, ret: Option<Type>) -> Self {
        Self {
            func: Function::new(name, params, ret),
            current: None,
            error: None,
        }
    }

    /// The function built so far.
    pub const fn function(&self) -> &Function {
        &self.func
    }

    /// Finish building, checking that every block is terminated.
    pub fn finish(self) -> Result<Function> {
        if let Some(error) = self.error {
            return Err(error);
        }
        if let Some(block) = self.func.blocks.iter().find(|b| b.terminator.is_none()) {
            return Err(BuildError::Unterminated(block.name.clone()));
        }
        Ok(self.func)
    }

    fn record(&mut self, error: BuildError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    fn current_block(&mut self) -> Option<&mut Block> {
        let Some(id) = self.current else {
            self.record(BuildError::NoInsertPoint);
            return None;
        };
        let block = &self.func.blocks[id.index()];
        if block.terminator.is_some() {
            let name = block.name.clone();
            self.record(BuildError::AfterTerminator(name));
            return None;
        }
        Some(&mut self.func.blocks[id.index()])
    }

    fn new_value(&mut self, ty: Type) -> ValueId {
        let id = ValueId(self.func.value_types.len() as u32);
        self.func.value_types.push(ty);
        id
    }

    fn push(&mut self, kind: InstKind, ty: Option<Type>) -> Option<ValueId> {
        let result = ty.map(|ty| self.new_value(ty));
        if let Some(block) = self.current_block() {
            block.insts.push(Inst { result, kind });
        }
        result
    }

    fn push_value(&mut self, kind: InstKind, ty: Type) -> ValueId {
        let result = self.new_value(ty);
        if let Some(block) = self.current_block() {
            block.insts.push(Inst {
                result: Some(result),
                kind,
            });
        }
        result
    }

    fn terminate(&mut self, term: Terminator) {
        if let Some(block) = self.current_block() {
            block.terminator = Some(term);
        }
    }
}

impl IrBuilder for FunctionBuilder {
    type Value = ValueId;
    type Block = BlockId;
    type Local = LocalId;

    fn create_block(&mut self, name: &str) -> BlockId {
        let id = BlockId(self.func.blocks.len() as u32);
        self.func.blocks.push(Block::new(name));
        id
    }

    fn set_insert_point(&mut self, block: BlockId) {
        self.current = Some(block);
    }

    fn insert_block(&self) -> Option<BlockId> {
        self.current
    }

    fn is_terminated(&self, block: BlockId) -> bool {
        self.func
            .blocks
            .get(block.index())
            .is_some_and(|b| b.terminator.is_some())
    }

    fn param(&mut self, index: usize, ty: Type) -> ValueId {
        self.push_value(InstKind::Param { index, ty }, ty)
    }

    fn const_int(&mut self, ty: Type, value: u64) -> ValueId {
        let bits = u128::from(value) & ty.mask();
        self.push_value(InstKind::Const { ty, bits }, ty)
    }

    fn const_float(&mut self, ty: Type, value: f64) -> ValueId {
        #[allow(clippy::cast_possible_truncation)]
        let bits = match ty {
            Type::F32 => u128::from((value as f32).to_bits()),
            _ => u128::from(value.to_bits()),
        };
        self.push_value(InstKind::Const { ty, bits }, ty)
    }

    fn binary(&mut self, op: BinaryOp, lhs: ValueId, rhs: ValueId) -> ValueId {
        let ty = self.value_type(lhs);
        self.push_value(InstKind::Binary { op, lhs, rhs }, ty)
    }

    fn unary(&mut self, op: UnaryOp, arg: ValueId) -> ValueId {
        let ty = self.value_type(arg);
        self.push_value(InstKind::Unary { op, arg }, ty)
    }

    fn cmp(&mut self, op: CmpOp, lhs: ValueId, rhs: ValueId) -> ValueId {
        self.push_value(InstKind::Cmp { op, lhs, rhs }, Type::I1)
    }

    fn cast(&mut self, op: CastOp, arg: ValueId, ty: Type) -> ValueId {
        self.push_value(InstKind::Cast { op, arg, ty }, ty)
    }

    fn select(&mut self, cond: ValueId, if_true: ValueId, if_false: ValueId) -> ValueId {
        let ty = self.value_type(if_true);
        self.push_value(
            InstKind::Select {
                cond,
                if_true,
                if_false,
            },
            ty,
        )
    }

    fn value_type(&self, value: ValueId) -> Type {
        self.func.value_type(value)
    }

    fn load(&mut self, addr: ValueId, ty: Type, endian: Endian) -> ValueId {
        self.push_value(InstKind::Load { addr, ty, endian }, ty)
    }

    fn store(&mut self, addr: ValueId, value: ValueId, endian: Endian) {
        self.push(InstKind::Store { addr, value, endian }, None);
    }

    fn create_local(&mut self, ty: Type) -> LocalId {
        let id = LocalId(self.func.locals.len() as u32);
        self.func.locals.push(ty);
        id
    }

    fn load_local(&mut self, local: LocalId) -> ValueId {
        let ty = self.func.locals[local.index()];
        self.push_value(InstKind::LoadLocal { local }, ty)
    }

    fn store_local(&mut self, local: LocalId, value: ValueId) {
        self.push(InstKind::StoreLocal { local, value }, None);
    }

    fn call(&mut self, callee: Callee, args: &[ValueId], ret: Option<Type>) -> Option<ValueId> {
        let kind = InstKind::Call {
            callee,
            args: args.to_vec(),
            ret,
        };
        self.push(kind, ret)
    }

    fn call_cond(&mut self, cond: ValueId, callee: Callee, args: &[ValueId]) {
        let kind = InstKind::CallCond {
            cond,
            callee,
            args: args.to_vec(),
        };
        self.push(kind, None);
    }

    fn barrier(&mut self, kind: Barrier) {
        self.push(InstKind::Barrier(kind), None);
    }

    fn br(&mut self, target: BlockId) {
        self.terminate(Terminator::Br(target));
    }

    fn br_cond(&mut self, cond: ValueId, then_block: BlockId, else_block: BlockId) {
        self.terminate(Terminator::BrCond {
            cond,
            then_block,
            else_block,
        });
    }

    fn ret(&mut self, value: Option<ValueId>) {
        self.terminate(Terminator::Ret(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_simple_function() {
        let mut b = FunctionBuilder::new("f", vec![Type::I64], Some(Type::I64));
        let entry = b.create_block("entry");
        b.set_insert_point(entry);
        let x = b.param(0, Type::I64);
        let one = b.const_int(Type::I64, 1);
        let sum = b.binary(BinaryOp::Add, x, one);
        b.ret(Some(sum));

        let func = b.finish().unwrap();
        assert_eq!(func.blocks.len(), 1);
        assert_eq!(func.inst_count(), 3);
        assert_eq!(func.value_type(sum), Type::I64);
    }

    #[test]
    fn test_const_masks_to_type() {
        let mut b = FunctionBuilder::new("f", vec![], None);
        let entry = b.create_block("entry");
        b.set_insert_point(entry);
        b.const_int(Type::I8, 0x1FF);
        b.ret(None);
        let func = b.finish().unwrap();
        assert_eq!(
            func.blocks[0].insts[0].kind,
            InstKind::Const {
                ty: Type::I8,
                bits: 0xFF
            }
        );
    }

    #[test]
    fn test_unterminated_block_rejected() {
        let mut b = FunctionBuilder::new("f", vec![], None);
        let entry = b.create_block("entry");
        b.create_block("dangling");
        b.set_insert_point(entry);
        b.ret(None);
        assert_eq!(
            b.finish(),
            Err(BuildError::Unterminated("dangling".to_string()))
        );
    }

    #[test]
    fn test_emit_after_terminator_rejected() {
        let mut b = FunctionBuilder::new("f", vec![], None);
        let entry = b.create_block("entry");
        b.set_insert_point(entry);
        b.ret(None);
        b.barrier(Barrier::Full);
        assert_eq!(
            b.finish(),
            Err(BuildError::AfterTerminator("entry".to_string()))
        );
    }

    #[test]
    fn test_no_insert_point_rejected() {
        let mut b = FunctionBuilder::new("f", vec![], None);
        b.const_int(Type::I32, 0);
        assert_eq!(b.finish(), Err(BuildError::NoInsertPoint));
    }
}
