//! Reference IR: a function is a list of blocks of typed SSA instructions.

use crate::{Barrier, BinaryOp, Callee, CastOp, CmpOp, Endian, Type, UnaryOp};

/// SSA value handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueId(pub u32);

/// Block handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub u32);

/// Mutable stack slot handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocalId(pub u32);

impl ValueId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl BlockId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl LocalId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Instruction payload.
#[derive(Clone, Debug, PartialEq)]
pub enum InstKind {
    /// Constant; floats are stored as their bit pattern.
    Const { ty: Type, bits: u128 },
    Param { index: usize, ty: Type },
    Binary { op: BinaryOp, lhs: ValueId, rhs: ValueId },
    Unary { op: UnaryOp, arg: ValueId },
    Cmp { op: CmpOp, lhs: ValueId, rhs: ValueId },
    Cast { op: CastOp, arg: ValueId, ty: Type },
    Select { cond: ValueId, if_true: ValueId, if_false: ValueId },
    Load { addr: ValueId, ty: Type, endian: Endian },
    Store { addr: ValueId, value: ValueId, endian: Endian },
    LoadLocal { local: LocalId },
    StoreLocal { local: LocalId, value: ValueId },
    Call { callee: Callee, args: Vec<ValueId>, ret: Option<Type> },
    /// Call only when `cond` is true.
    CallCond { cond: ValueId, callee: Callee, args: Vec<ValueId> },
    Barrier(Barrier),
}

impl InstKind {
    /// Operands read by this instruction.
    pub fn operands(&self) -> Vec<ValueId> {
        match self {
            Self::Const { .. } | Self::Param { .. } | Self::LoadLocal { .. } | Self::Barrier(_) => {
                Vec::new()
            }
            Self::Binary { lhs, rhs, .. } | Self::Cmp { lhs, rhs, .. } => vec![*lhs, *rhs],
            Self::Unary { arg, .. } | Self::Cast { arg, .. } => vec![*arg],
            Self::Select { cond, if_true, if_false } => vec![*cond, *if_true, *if_false],
            Self::Load { addr, .. } => vec![*addr],
            Self::Store { addr, value, .. } => vec![*addr, *value],
            Self::StoreLocal { value, .. } => vec![*value],
            Self::Call { args, .. } => args.clone(),
            Self::CallCond { cond, args, .. } => {
                let mut ops = vec![*cond];
                ops.extend(args.iter().copied());
                ops
            }
        }
    }

    /// Mutable references to the operands read by this instruction.
    pub fn operands_mut(&mut self) -> Vec<&mut ValueId> {
        match self {
            Self::Const { .. } | Self::Param { .. } | Self::LoadLocal { .. } | Self::Barrier(_) => {
                Vec::new()
            }
            Self::Binary { lhs, rhs, .. } | Self::Cmp { lhs, rhs, .. } => vec![lhs, rhs],
            Self::Unary { arg, .. } | Self::Cast { arg, .. } => vec![arg],
            Self::Select { cond, if_true, if_false } => vec![cond, if_true, if_false],
            Self::Load { addr, .. } => vec![addr],
            Self::Store { addr, value, .. } => vec![addr, value],
            Self::StoreLocal { value, .. } => vec![value],
            Self::Call { args, .. } => args.iter_mut().collect(),
            Self::CallCond { cond, args, .. } => {
                let mut ops = vec![cond];
                ops.extend(args.iter_mut());
                ops
            }
        }
    }

    /// Whether removing an unused instance would change behavior.
    pub const fn has_side_effects(&self) -> bool {
        matches!(
            self,
            Self::Load { .. }
                | Self::Store { .. }
                | Self::StoreLocal { .. }
                | Self::Call { .. }
                | Self::CallCond { .. }
                | Self::Barrier(_)
        )
    }
}

/// One instruction with its optional result.
#[derive(Clone, Debug, PartialEq)]
pub struct Inst {
    pub result: Option<ValueId>,
    pub kind: InstKind,
}

/// Block terminator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Terminator {
    Br(BlockId),
    BrCond { cond: ValueId, then_block: BlockId, else_block: BlockId },
    Ret(Option<ValueId>),
}

impl Terminator {
    pub fn successors(&self) -> Vec<BlockId> {
        match self {
            Self::Br(target) => vec![*target],
            Self::BrCond { then_block, else_block, .. } => vec![*then_block, *else_block],
            Self::Ret(_) => Vec::new(),
        }
    }

    pub fn operands(&self) -> Vec<ValueId> {
        match self {
            Self::Br(_) | Self::Ret(None) => Vec::new(),
            Self::BrCond { cond, .. } => vec![*cond],
            Self::Ret(Some(value)) => vec![*value],
        }
    }

    pub fn operands_mut(&mut self) -> Vec<&mut ValueId> {
        match self {
            Self::Br(_) | Self::Ret(None) => Vec::new(),
            Self::BrCond { cond, .. } => vec![cond],
            Self::Ret(Some(value)) => vec![value],
        }
    }
}

/// Basic block.
#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    pub name: String,
    pub insts: Vec<Inst>,
    pub terminator: Option<Terminator>,
}

impl Block {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            insts: Vec::new(),
            terminator: None,
        }
    }
}

/// Where the register allocator placed a value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Location {
    /// Register `index` of register set `set`.
    Reg { set: usize, index: u32 },
    /// Spill slot.
    Stack(u32),
}

/// A function in the reference IR.
///
/// The first block is the entry block.
#[derive(Clone, Debug, PartialEq)]
pub struct Function {
    pub name: String,
    pub params: Vec<Type>,
    pub ret: Option<Type>,
    pub blocks: Vec<Block>,
    /// Type of each value, indexed by `ValueId`.
    pub value_types: Vec<Type>,
    /// Type of each local, indexed by `LocalId`.
    pub locals: Vec<Type>,
    /// Value placement, filled by register allocation.
    pub locations: Vec<Option<Location>>,
    /// Number of spill slots used by register allocation.
    pub spill_slots: u32,
    /// Set once register allocation has placed every value.
    pub allocated: bool,
}

impl Function {
    pub fn new(name: impl Into<String>, params: Vec<Type>, ret: Option<Type>) -> Self {
        Self {
            name: name.into(),
            params,
            ret,
            blocks: Vec::new(),
            value_types: Vec::new(),
            locals: Vec::new(),
            locations: Vec::new(),
            spill_slots: 0,
            allocated: false,
        }
    }

    #[inline]
    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id.index()]
    }

    #[inline]
    pub fn value_type(&self, value: ValueId) -> Type {
        self.value_types[value.index()]
    }

    /// Total number of instructions across all blocks.
    pub fn inst_count(&self) -> usize {
        self.blocks.iter().map(|b| b.insts.len()).sum()
    }

    /// Whether register allocation has run.
    pub const fn is_allocated(&self) -> bool {
        self.allocated
    }

    /// Count uses of every value, including terminator operands.
    pub fn use_counts(&self) -> Vec<u32> {
        let mut counts = vec![0u32; self.value_types.len()];
        for block in &self.blocks {
            for inst in &block.insts {
                for op in inst.kind.operands() {
                    if let Some(count) = counts.get_mut(op.index()) {
                        *count += 1;
                    }
                }
            }
            if let Some(term) = &block.terminator {
                for op in term.operands() {
                    if let Some(count) = counts.get_mut(op.index()) {
                        *count += 1;
                    }
                }
            }
        }
        counts
    }
}
