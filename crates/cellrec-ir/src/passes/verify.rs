//! Structural and type checks.

use rustc_hash::FxHashSet;

use super::Pass;
use crate::Type;
use crate::error::PassError;
use crate::function::{Block, Function, InstKind, Terminator, ValueId};

/// Checks terminators, operand definitions, and type agreement.
pub struct VerifyPass;

impl Pass for VerifyPass {
    fn name(&self) -> &'static str {
        "Verify"
    }

    fn run(&self, func: &mut Function) -> Result<(), PassError> {
        if func.blocks.is_empty() {
            return Err(PassError::Invalid {
                block: String::new(),
                message: "function has no blocks".into(),
            });
        }

        let mut defined = FxHashSet::default();
        for block in &func.blocks {
            for inst in &block.insts {
                if let Some(result) = inst.result {
                    if !defined.insert(result) {
                        return Err(invalid(block, format!("v{} defined twice", result.0)));
                    }
                }
            }
        }

        let checker = Checker { func, defined };
        for block in &func.blocks {
            checker.check_block(block)?;
        }
        Ok(())
    }
}

fn invalid(block: &Block, message: String) -> PassError {
    PassError::Invalid {
        block: block.name.clone(),
        message,
    }
}

struct Checker<'a> {
    func: &'a Function,
    defined: FxHashSet<ValueId>,
}

impl Checker<'_> {
    fn ty(&self, block: &Block, value: ValueId) -> Result<Type, PassError> {
        if !self.defined.contains(&value) {
            return Err(invalid(block, format!("v{} is not defined", value.0)));
        }
        self.func
            .value_types
            .get(value.index())
            .copied()
            .ok_or_else(|| invalid(block, format!("v{} has no type", value.0)))
    }

    fn expect(&self, block: &Block, value: ValueId, ty: Type) -> Result<(), PassError> {
        let actual = self.ty(block, value)?;
        if actual == ty {
            Ok(())
        } else {
            Err(invalid(
                block,
                format!("v{} has type {actual}, expected {ty}", value.0),
            ))
        }
    }

    fn check_block(&self, block: &Block) -> Result<(), PassError> {
        for inst in &block.insts {
            let result_ty = inst.result.map(|r| self.func.value_type(r));
            match &inst.kind {
                InstKind::Const { .. } | InstKind::Param { .. } | InstKind::Barrier(_) => {}
                InstKind::Binary { op, lhs, rhs } => {
                    let ty = self.ty(block, *lhs)?;
                    self.expect(block, *rhs, ty)?;
                    if op.is_float() != ty.is_float() {
                        return Err(invalid(block, format!("{} on {ty}", op.name())));
                    }
                }
                InstKind::Unary { op, arg } => {
                    let ty = self.ty(block, *arg)?;
                    if op.is_float() != ty.is_float() {
                        return Err(invalid(block, format!("{} on {ty}", op.name())));
                    }
                }
                InstKind::Cmp { op, lhs, rhs } => {
                    let ty = self.ty(block, *lhs)?;
                    self.expect(block, *rhs, ty)?;
                    if op.is_float() != ty.is_float() {
                        return Err(invalid(block, format!("cmp.{} on {ty}", op.name())));
                    }
                }
                InstKind::Cast { arg, .. } => {
                    self.ty(block, *arg)?;
                }
                InstKind::Select {
                    cond,
                    if_true,
                    if_false,
                } => {
                    self.expect(block, *cond, Type::I1)?;
                    let ty = self.ty(block, *if_true)?;
                    self.expect(block, *if_false, ty)?;
                }
                InstKind::Load { addr, .. } => self.expect(block, *addr, Type::I64)?,
                InstKind::Store { addr, value, .. } => {
                    self.expect(block, *addr, Type::I64)?;
                    self.ty(block, *value)?;
                }
                InstKind::LoadLocal { local } => {
                    if local.index() >= self.func.locals.len() {
                        return Err(invalid(block, format!("l{} is not declared", local.0)));
                    }
                }
                InstKind::StoreLocal { local, value } => {
                    let Some(&ty) = self.func.locals.get(local.index()) else {
                        return Err(invalid(block, format!("l{} is not declared", local.0)));
                    };
                    self.expect(block, *value, ty)?;
                }
                InstKind::Call { args, .. } => {
                    for arg in args {
                        self.ty(block, *arg)?;
                    }
                }
                InstKind::CallCond { cond, args, .. } => {
                    self.expect(block, *cond, Type::I1)?;
                    for arg in args {
                        self.ty(block, *arg)?;
                    }
                }
            }
            if let (InstKind::Cmp { .. }, Some(ty)) = (&inst.kind, result_ty) {
                if ty != Type::I1 {
                    return Err(invalid(block, "comparison result is not i1".into()));
                }
            }
        }

        let Some(term) = &block.terminator else {
            return Err(invalid(block, "missing terminator".into()));
        };
        for target in term.successors() {
            if target.index() >= self.func.blocks.len() {
                return Err(invalid(block, format!("branch to missing block b{}", target.0)));
            }
        }
        match term {
            Terminator::Br(_) => {}
            Terminator::BrCond { cond, .. } => self.expect(block, *cond, Type::I1)?,
            Terminator::Ret(value) => match (value, self.func.ret) {
                (None, None) => {}
                (Some(v), Some(ty)) => self.expect(block, *v, ty)?,
                (Some(_), None) => return Err(invalid(block, "value returned from void function".into())),
                (None, Some(ty)) => return Err(invalid(block, format!("missing {ty} return value"))),
            },
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::{Inst, LocalId};
    use crate::{BinaryOp, FunctionBuilder, IrBuilder};

    #[test]
    fn test_accepts_well_formed() {
        let mut b = FunctionBuilder::new("f", vec![Type::I32], Some(Type::I32));
        let entry = b.create_block("entry");
        b.set_insert_point(entry);
        let x = b.param(0, Type::I32);
        let y = b.binary(BinaryOp::Mul, x, x);
        b.ret(Some(y));
        let mut func = b.finish().unwrap();
        VerifyPass.run(&mut func).unwrap();
    }

    #[test]
    fn test_rejects_mismatched_operands() {
        let mut b = FunctionBuilder::new("f", vec![], None);
        let entry = b.create_block("entry");
        b.set_insert_point(entry);
        let x = b.const_int(Type::I32, 1);
        let y = b.const_int(Type::I64, 1);
        b.binary(BinaryOp::Add, x, y);
        b.ret(None);
        let mut func = b.finish().unwrap();
        let err = VerifyPass.run(&mut func).unwrap_err();
        assert!(err.to_string().contains("expected i32"), "{err}");
    }

    #[test]
    fn test_rejects_wrong_return_type() {
        let mut b = FunctionBuilder::new("f", vec![], Some(Type::I64));
        let entry = b.create_block("entry");
        b.set_insert_point(entry);
        b.ret(None);
        let mut func = b.finish().unwrap();
        assert!(VerifyPass.run(&mut func).is_err());
    }

    #[test]
    fn test_rejects_undefined_operand() {
        let mut b = FunctionBuilder::new("f", vec![], None);
        let entry = b.create_block("entry");
        b.set_insert_point(entry);
        let local = b.create_local(Type::I64);
        let v = b.const_int(Type::I64, 7);
        b.store_local(local, v);
        b.ret(None);
        let mut func = b.finish().unwrap();
        // Drop the defining instruction.
        func.blocks[0].insts.remove(0);
        let err = VerifyPass.run(&mut func).unwrap_err();
        assert!(err.to_string().contains("v0 is not defined"), "{err}");
    }

    #[test]
    fn test_rejects_undeclared_local() {
        let mut b = FunctionBuilder::new("f", vec![], None);
        let entry = b.create_block("entry");
        b.set_insert_point(entry);
        b.ret(None);
        let mut func = b.finish().unwrap();
        func.value_types.push(Type::I64);
        func.blocks[0].insts.push(Inst {
            result: Some(ValueId(0)),
            kind: InstKind::LoadLocal { local: LocalId(3) },
        });
        assert!(VerifyPass.run(&mut func).is_err());
    }
}
