//! Textual listing of reference IR functions.

use std::fmt::{self, Display, Formatter};

use crate::eval;
use crate::function::{Function, Inst, InstKind, Location, Terminator, ValueId};
use crate::{Endian, Type};

struct Args<'a>(&'a [ValueId]);

impl Display for Args<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, arg) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "v{}", arg.0)?;
        }
        Ok(())
    }
}

const fn endian_suffix(endian: Endian) -> &'static str {
    match endian {
        Endian::Native => "",
        Endian::Big => ".be",
    }
}

fn fmt_const(f: &mut Formatter<'_>, ty: Type, bits: u128) -> fmt::Result {
    if ty.is_float() {
        write!(f, "const.{ty} {:?}", eval::float_value(bits, ty))
    } else {
        write!(f, "const.{ty} {bits:#x}")
    }
}

fn fmt_inst(func: &Function, inst: &Inst, f: &mut Formatter<'_>) -> fmt::Result {
    f.write_str("    ")?;
    if let Some(result) = inst.result {
        write!(f, "v{}: {} = ", result.0, func.value_type(result))?;
    }
    match &inst.kind {
        InstKind::Const { ty, bits } => fmt_const(f, *ty, *bits)?,
        InstKind::Param { index, .. } => write!(f, "param {index}")?,
        InstKind::Binary { op, lhs, rhs } => write!(f, "{} v{}, v{}", op.name(), lhs.0, rhs.0)?,
        InstKind::Unary { op, arg } => write!(f, "{} v{}", op.name(), arg.0)?,
        InstKind::Cmp { op, lhs, rhs } => write!(f, "cmp.{} v{}, v{}", op.name(), lhs.0, rhs.0)?,
        InstKind::Cast { op, arg, .. } => write!(f, "{} v{}", op.name(), arg.0)?,
        InstKind::Select {
            cond,
            if_true,
            if_false,
        } => write!(f, "select v{}, v{}, v{}", cond.0, if_true.0, if_false.0)?,
        InstKind::Load { addr, endian, .. } => {
            write!(f, "load{} [v{}]", endian_suffix(*endian), addr.0)?;
        }
        InstKind::Store {
            addr,
            value,
            endian,
        } => write!(f, "store{} [v{}], v{}", endian_suffix(*endian), addr.0, value.0)?,
        InstKind::LoadLocal { local } => write!(f, "local.get l{}", local.0)?,
        InstKind::StoreLocal { local, value } => write!(f, "local.set l{}, v{}", local.0, value.0)?,
        InstKind::Call { callee, args, .. } => write!(f, "call {callee}({})", Args(args))?,
        InstKind::CallCond { cond, callee, args } => {
            write!(f, "call.if v{} {callee}({})", cond.0, Args(args))?;
        }
        InstKind::Barrier(kind) => write!(f, "barrier {}", kind.name())?,
    }
    if let Some(Some(location)) = inst.result.and_then(|r| func.locations.get(r.index())) {
        match location {
            Location::Reg { set, index } => write!(f, "  ; r{set}.{index}")?,
            Location::Stack(slot) => write!(f, "  ; stack{slot}")?,
        }
    }
    writeln!(f)
}

impl Display for Function {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "fn {}(", self.name)?;
        for (i, ty) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{ty}")?;
        }
        f.write_str(")")?;
        if let Some(ret) = self.ret {
            write!(f, " -> {ret}")?;
        }
        writeln!(f, " {{")?;
        for (i, ty) in self.locals.iter().enumerate() {
            writeln!(f, "  l{i}: {ty}")?;
        }
        for (i, block) in self.blocks.iter().enumerate() {
            writeln!(f, "b{i} {}:", block.name)?;
            for inst in &block.insts {
                fmt_inst(self, inst, f)?;
            }
            match &block.terminator {
                Some(Terminator::Br(target)) => writeln!(f, "    br b{}", target.0)?,
                Some(Terminator::BrCond {
                    cond,
                    then_block,
                    else_block,
                }) => writeln!(f, "    br v{}, b{}, b{}", cond.0, then_block.0, else_block.0)?,
                Some(Terminator::Ret(Some(value))) => writeln!(f, "    ret v{}", value.0)?,
                Some(Terminator::Ret(None)) => writeln!(f, "    ret")?,
                None => writeln!(f, "    <unterminated>")?,
            }
        }
        writeln!(f, "}}")
    }
}
