//! Linear register allocation over target register sets.
//!
//! Values are visited in block order. A value's register is released after
//! its last use; values used outside their defining block stay live until
//! the end of the function. When every register of the accepting set is
//! taken the value is spilled to a fresh stack slot.

use rustc_hash::FxHashMap;

use super::Pass;
use crate::Type;
use crate::error::PassError;
use crate::function::{Function, Location, ValueId};

/// A named bank of interchangeable registers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisterSet {
    pub name: String,
    pub count: u32,
    pub types: Vec<Type>,
}

impl RegisterSet {
    pub fn new(name: &str, count: u32, types: &[Type]) -> Self {
        Self {
            name: name.to_string(),
            count,
            types: types.to_vec(),
        }
    }

    pub fn accepts(&self, ty: Type) -> bool {
        self.types.contains(&ty)
    }
}

/// Register sets of the host target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TargetInfo {
    pub register_sets: Vec<RegisterSet>,
}

impl TargetInfo {
    pub const fn new(register_sets: Vec<RegisterSet>) -> Self {
        Self { register_sets }
    }

    /// Index of the first set accepting `ty`.
    pub fn set_for(&self, ty: Type) -> Option<usize> {
        self.register_sets.iter().position(|set| set.accepts(ty))
    }
}

impl Default for TargetInfo {
    /// A generic 64-bit host: 16 integer, 16 float, 16 vector registers.
    fn default() -> Self {
        Self::new(vec![
            RegisterSet::new("gpr", 16, &[Type::I1, Type::I8, Type::I16, Type::I32, Type::I64]),
            RegisterSet::new("fpr", 16, &[Type::F32, Type::F64]),
            RegisterSet::new("vec", 16, &[Type::I128]),
        ])
    }
}

pub struct RegisterAllocationPass {
    target: TargetInfo,
}

impl RegisterAllocationPass {
    pub const fn new(target: TargetInfo) -> Self {
        Self { target }
    }
}

/// Position of an instruction (or terminator) in linear block order.
type Position = usize;

impl Pass for RegisterAllocationPass {
    fn name(&self) -> &'static str {
        "Register Allocation"
    }

    fn run(&self, func: &mut Function) -> Result<(), PassError> {
        let last_use = live_ends(func);

        let mut free: Vec<Vec<u32>> = self
            .target
            .register_sets
            .iter()
            .map(|set| (0..set.count).rev().collect())
            .collect();
        let mut expiring: FxHashMap<Position, Vec<(usize, u32)>> = FxHashMap::default();
        let mut locations = vec![None; func.value_types.len()];
        let mut spill_slots = 0u32;

        let mut pos: Position = 0;
        for block in &func.blocks {
            for inst in &block.insts {
                release(&mut expiring, &mut free, pos);
                if let Some(result) = inst.result {
                    let ty = func.value_type(result);
                    let set = self.target.set_for(ty).ok_or(PassError::NoRegisterSet(ty))?;
                    let end = last_use.get(&result).copied().unwrap_or(pos);
                    let location = if let Some(index) = free[set].pop() {
                        expiring.entry(end.max(pos)).or_default().push((set, index));
                        Location::Reg { set, index }
                    } else {
                        spill_slots += 1;
                        Location::Stack(spill_slots - 1)
                    };
                    locations[result.index()] = Some(location);
                }
                pos += 1;
            }
            release(&mut expiring, &mut free, pos);
            pos += 1;
        }

        func.locations = locations;
        func.spill_slots = spill_slots;
        func.allocated = true;
        Ok(())
    }
}

/// Return registers whose live range ended before `pos`.
fn release(
    expiring: &mut FxHashMap<Position, Vec<(usize, u32)>>,
    free: &mut [Vec<u32>],
    pos: Position,
) {
    if pos == 0 {
        return;
    }
    if let Some(regs) = expiring.remove(&(pos - 1)) {
        for (set, index) in regs {
            free[set].push(index);
        }
    }
}

/// Last position at which each value is live.
fn live_ends(func: &Function) -> FxHashMap<ValueId, Position> {
    let mut def_block = FxHashMap::default();
    for (b, block) in func.blocks.iter().enumerate() {
        for inst in &block.insts {
            if let Some(result) = inst.result {
                def_block.insert(result, b);
            }
        }
    }

    let total: Position = func.blocks.iter().map(|b| b.insts.len() + 1).sum();
    let mut ends = FxHashMap::default();
    let mut pos: Position = 0;
    for (b, block) in func.blocks.iter().enumerate() {
        let mut note = |value: ValueId, at: Position| {
            let end = if def_block.get(&value) == Some(&b) { at } else { total };
            let entry = ends.entry(value).or_insert(end);
            *entry = (*entry).max(end);
        };
        for inst in &block.insts {
            for op in inst.kind.operands() {
                note(op, pos);
            }
            pos += 1;
        }
        if let Some(term) = &block.terminator {
            for op in term.operands() {
                note(op, pos);
            }
        }
        pos += 1;
    }
    ends
}
