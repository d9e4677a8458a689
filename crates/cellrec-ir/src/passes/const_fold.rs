//! Constant folding, copy propagation, and algebraic simplification.
//!
//! Single forward pass in block order. Instructions whose operands are all
//! constant become constants; identities (`x + 0`, `x & -1`, a select on a
//! constant condition) forward their surviving operand; conditional branches
//! on constants become unconditional.

use rustc_hash::FxHashMap;

use super::Pass;
use crate::error::PassError;
use crate::eval;
use crate::function::{Function, InstKind, Terminator, ValueId};
use crate::{BinaryOp, Type};

pub struct ConstantFoldPass;

impl Pass for ConstantFoldPass {
    fn name(&self) -> &'static str {
        "Constant Folding"
    }

    fn run(&self, func: &mut Function) -> Result<(), PassError> {
        let mut folder = Folder::default();
        let value_types = func.value_types.clone();

        for block in &mut func.blocks {
            for inst in &mut block.insts {
                for op in inst.kind.operands_mut() {
                    *op = folder.resolve(*op);
                }
                let Some(result) = inst.result else {
                    continue;
                };
                let ty = value_types[result.index()];
                match folder.fold(&inst.kind, ty, &value_types) {
                    Some(Folded::Const(bits)) => {
                        inst.kind = InstKind::Const { ty, bits };
                        folder.consts.insert(result, bits);
                    }
                    Some(Folded::Copy(source)) => {
                        folder.copies.insert(result, source);
                    }
                    None => {
                        if let InstKind::Const { bits, .. } = inst.kind {
                            folder.consts.insert(result, bits);
                        }
                    }
                }
            }

            if let Some(term) = &mut block.terminator {
                for op in term.operands_mut() {
                    *op = folder.resolve(*op);
                }
                if let Terminator::BrCond {
                    cond,
                    then_block,
                    else_block,
                } = *term
                {
                    if let Some(bits) = folder.consts.get(&cond) {
                        let target = if bits & 1 == 1 { then_block } else { else_block };
                        *term = Terminator::Br(target);
                    }
                }
            }
        }

        // Uses that precede their definition in block order (loops).
        for block in &mut func.blocks {
            for inst in &mut block.insts {
                for op in inst.kind.operands_mut() {
                    *op = folder.resolve(*op);
                }
            }
            if let Some(term) = &mut block.terminator {
                for op in term.operands_mut() {
                    *op = folder.resolve(*op);
                }
            }
        }
        Ok(())
    }
}

enum Folded {
    Const(u128),
    Copy(ValueId),
}

#[derive(Default)]
struct Folder {
    consts: FxHashMap<ValueId, u128>,
    copies: FxHashMap<ValueId, ValueId>,
}

impl Folder {
    fn resolve(&self, mut value: ValueId) -> ValueId {
        while let Some(&source) = self.copies.get(&value) {
            value = source;
        }
        value
    }

    fn konst(&self, value: ValueId) -> Option<u128> {
        self.consts.get(&value).copied()
    }

    fn fold(&self, kind: &InstKind, ty: Type, types: &[Type]) -> Option<Folded> {
        match kind {
            InstKind::Binary { op, lhs, rhs } => {
                match (self.konst(*lhs), self.konst(*rhs)) {
                    (Some(a), Some(b)) => Some(Folded::Const(eval::binary(*op, ty, a, b))),
                    (None, Some(b)) => simplify_rhs(*op, ty, *lhs, b),
                    (Some(a), None) => simplify_lhs(*op, ty, a, *rhs),
                    (None, None) => None,
                }
            }
            InstKind::Unary { op, arg } => {
                let a = self.konst(*arg)?;
                Some(Folded::Const(eval::unary(*op, ty, a)))
            }
            InstKind::Cmp { op, lhs, rhs } => {
                let (a, b) = (self.konst(*lhs)?, self.konst(*rhs)?);
                let operand_ty = types[lhs.index()];
                Some(Folded::Const(u128::from(eval::cmp(*op, operand_ty, a, b))))
            }
            InstKind::Cast { op, arg, ty: to } => {
                let a = self.konst(*arg)?;
                Some(Folded::Const(eval::cast(*op, types[arg.index()], *to, a)))
            }
            InstKind::Select {
                cond,
                if_true,
                if_false,
            } => {
                if if_true == if_false {
                    return Some(Folded::Copy(*if_true));
                }
                let c = self.konst(*cond)?;
                let chosen = if c & 1 == 1 { *if_true } else { *if_false };
                Some(
                    self.konst(chosen)
                        .map_or(Folded::Copy(chosen), Folded::Const),
                )
            }
            _ => None,
        }
    }
}

fn simplify_rhs(op: BinaryOp, ty: Type, lhs: ValueId, b: u128) -> Option<Folded> {
    if ty.is_float() {
        return None;
    }
    match op {
        BinaryOp::Add
        | BinaryOp::Sub
        | BinaryOp::Or
        | BinaryOp::Xor
        | BinaryOp::Shl
        | BinaryOp::LShr
        | BinaryOp::AShr
        | BinaryOp::Rotl
            if b == 0 =>
        {
            Some(Folded::Copy(lhs))
        }
        BinaryOp::Mul | BinaryOp::UDiv | BinaryOp::SDiv if b == 1 => Some(Folded::Copy(lhs)),
        BinaryOp::And if b == ty.mask() => Some(Folded::Copy(lhs)),
        BinaryOp::And | BinaryOp::Mul if b == 0 => Some(Folded::Const(0)),
        BinaryOp::Or if b == ty.mask() => Some(Folded::Const(ty.mask())),
        _ => None,
    }
}

fn simplify_lhs(op: BinaryOp, ty: Type, a: u128, rhs: ValueId) -> Option<Folded> {
    if ty.is_float() {
        return None;
    }
    match op {
        BinaryOp::Add | BinaryOp::Or | BinaryOp::Xor if a == 0 => Some(Folded::Copy(rhs)),
        BinaryOp::Mul if a == 1 => Some(Folded::Copy(rhs)),
        BinaryOp::And if a == ty.mask() => Some(Folded::Copy(rhs)),
        BinaryOp::And | BinaryOp::Mul | BinaryOp::Shl | BinaryOp::LShr if a == 0 => {
            Some(Folded::Const(0))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::Terminator;
    use crate::{CmpOp, FunctionBuilder, IrBuilder};

    #[test]
    fn test_folds_constant_arithmetic() {
        let mut b = FunctionBuilder::new("f", vec![], Some(Type::I32));
        let entry = b.create_block("entry");
        b.set_insert_point(entry);
        let x = b.const_int(Type::I32, 6);
        let y = b.const_int(Type::I32, 7);
        let z = b.binary(BinaryOp::Mul, x, y);
        b.ret(Some(z));
        let mut func = b.finish().unwrap();

        ConstantFoldPass.run(&mut func).unwrap();
        assert_eq!(
            func.blocks[0].insts[2].kind,
            InstKind::Const {
                ty: Type::I32,
                bits: 42
            }
        );
    }

    #[test]
    fn test_forwards_identities() {
        let mut b = FunctionBuilder::new("f", vec![Type::I64], Some(Type::I64));
        let entry = b.create_block("entry");
        b.set_insert_point(entry);
        let x = b.param(0, Type::I64);
        let zero = b.const_int(Type::I64, 0);
        let y = b.binary(BinaryOp::Add, x, zero);
        b.ret(Some(y));
        let mut func = b.finish().unwrap();

        ConstantFoldPass.run(&mut func).unwrap();
        assert_eq!(func.blocks[0].terminator, Some(Terminator::Ret(Some(x))));
    }

    #[test]
    fn test_folds_constant_branch() {
        let mut b = FunctionBuilder::new("f", vec![], None);
        let entry = b.create_block("entry");
        let yes = b.create_block("yes");
        let no = b.create_block("no");
        b.set_insert_point(entry);
        let one = b.const_int(Type::I64, 1);
        let two = b.const_int(Type::I64, 2);
        let lt = b.cmp(CmpOp::Ult, one, two);
        b.br_cond(lt, yes, no);
        for block in [yes, no] {
            b.set_insert_point(block);
            b.ret(None);
        }
        let mut func = b.finish().unwrap();

        ConstantFoldPass.run(&mut func).unwrap();
        assert_eq!(func.blocks[0].terminator, Some(Terminator::Br(yes)));
    }

    #[test]
    fn test_leaves_float_identities() {
        let mut b = FunctionBuilder::new("f", vec![Type::F64], Some(Type::F64));
        let entry = b.create_block("entry");
        b.set_insert_point(entry);
        let x = b.param(0, Type::F64);
        let zero = b.const_float(Type::F64, 0.0);
        let y = b.binary(BinaryOp::FAdd, x, zero);
        b.ret(Some(y));
        let mut func = b.finish().unwrap();

        ConstantFoldPass.run(&mut func).unwrap();
        assert_eq!(func.blocks[0].terminator, Some(Terminator::Ret(Some(y))));
    }
}
