//! Signature inference for guest functions.
//!
//! [`infer_signature`] walks the instructions reachable from a function's
//! entry, builds their control-flow graph, and runs a forward must-write
//! dataflow over it. A GPR, FPR, or VR read before any path has written it
//! is an incoming argument; a result register written anywhere makes the
//! return type.
//!
//! Calls to functions of the same segment use the callee's current
//! signature, so [`Segment::infer_signatures`] iterates to a fixpoint.
//!
//! [`Segment::infer_signatures`]: crate::Segment::infer_signatures

use std::collections::BTreeMap;

use cellrec_isa::{PpuInstr, PpuOpcode, decode_ppu};

use crate::analyzer::{Reg, analyze};
use crate::error::AnalyzeError;
use crate::function::{Function, ParamType, ReturnType};
use crate::segment::Segment;

/// Inferred parameters and return type of a function.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Signature {
    pub params: Vec<ParamType>,
    pub ret: ReturnType,
}

impl Signature {
    pub fn of(function: &Function) -> Self {
        Self {
            params: function.params.clone(),
            ret: function.ret,
        }
    }
}

/// One bit per GPR, FPR, and VR.
type RegMask = u128;

const fn gpr(n: u32) -> RegMask {
    1 << n
}

const fn fpr(n: u32) -> RegMask {
    1 << (32 + n)
}

const fn vr(n: u32) -> RegMask {
    1 << (64 + n)
}

const fn mask_of(reg: Reg) -> RegMask {
    match reg {
        Reg::Gpr(n) => gpr(n as u32),
        Reg::Fpr(n) => fpr(n as u32),
        Reg::Vr(n) => vr(n as u32),
        _ => 0,
    }
}

/// Highest argument register exposed in `exposed`, counted from `first`.
fn highest(exposed: RegMask, bit: fn(u32) -> RegMask, first: u32, last: u32) -> u32 {
    (first..=last)
        .rev()
        .find(|&n| exposed & bit(n) != 0)
        .map_or(0, |n| n - first + 1)
}

/// Register effects of one instruction and where control goes next.
#[derive(Clone, Debug, Default)]
struct Node {
    reads: RegMask,
    /// Written on every execution.
    writes: RegMask,
    /// Written on some execution.
    may_write: RegMask,
    successors: Vec<u64>,
}

impl Node {
    /// Effect of calling a function with signature `sig`. A conditional
    /// call only may write its results.
    fn call(&mut self, sig: &Signature, conditional: bool) {
        let (mut ints, mut floats) = (0, 0);
        for param in &sig.params {
            match param {
                ParamType::Integer => {
                    self.reads |= gpr(3 + ints);
                    ints += 1;
                }
                ParamType::Float => {
                    floats += 1;
                    self.reads |= fpr(floats);
                }
                // Vectors travel through the state.
                ParamType::Vector => {}
            }
        }
        let results = match sig.ret {
            ReturnType::Void => 0,
            ReturnType::Integer => gpr(3),
            ReturnType::Float => fpr(1),
            ReturnType::FloatX2 => fpr(1) | fpr(2),
            ReturnType::FloatX3 => fpr(1) | fpr(2) | fpr(3),
            ReturnType::FloatX4 => fpr(1) | fpr(2) | fpr(3) | fpr(4),
            ReturnType::Vector => vr(2),
        };
        self.written(results, conditional);
    }

    /// Indirect calls and system calls leave their result in r3; their
    /// arguments are read from the state.
    fn opaque_call(&mut self, conditional: bool) {
        self.written(gpr(3), conditional);
    }

    fn written(&mut self, mask: RegMask, conditional: bool) {
        if !conditional {
            self.writes |= mask;
        }
        self.may_write |= mask;
    }
}

/// Branch target of a relative or absolute branch at `pc`.
#[allow(clippy::cast_sign_loss)]
const fn target(pc: u64, displacement: i64, absolute: bool) -> u64 {
    if absolute {
        displacement as u64
    } else {
        pc.wrapping_add_signed(displacement)
    }
}

/// BO with both "ignore CR" and "ignore CTR" set.
const fn always(bo: u32) -> bool {
    bo & 0x14 == 0x14
}

struct Walker<'a> {
    segment: &'a Segment,
    function: &'a Function,
}

impl Walker<'_> {
    fn callee(&self, address: u64) -> Signature {
        self.segment
            .function(address)
            .map_or_else(Signature::default, Signature::of)
    }

    fn inside(&self, address: u64) -> bool {
        self.function.contains(address)
    }

    fn node(&self, pc: u64, instr: PpuInstr) -> Result<Node, AnalyzeError> {
        use PpuOpcode::*;

        let op = decode_ppu(instr).map_err(|_| AnalyzeError::Unknown(instr.raw()))?;
        let mut node = Node::default();
        let next = pc + 4;

        if op == Sc {
            node.opaque_call(false);
            node.successors.push(next);
            return Ok(node);
        }
        for (reg, access) in analyze(instr)?.iter() {
            if access.is_read() {
                node.reads |= mask_of(reg);
            }
            if access.is_write() {
                node.written(mask_of(reg), false);
            }
        }

        match op {
            B => {
                let to = target(pc, instr.li(), instr.aa());
                if instr.lk() {
                    if to != next {
                        node.call(&self.callee(to), false);
                    }
                    node.successors.push(next);
                } else if self.inside(to) {
                    node.successors.push(to);
                } else {
                    node.call(&self.callee(to), false);
                }
            }
            Bc => {
                let to = target(pc, instr.bd(), instr.aa());
                let conditional = !always(instr.bo());
                if instr.lk() {
                    if to != next {
                        node.call(&self.callee(to), conditional);
                    }
                    node.successors.push(next);
                } else {
                    if self.inside(to) {
                        node.successors.push(to);
                    } else {
                        node.call(&self.callee(to), conditional);
                    }
                    if conditional {
                        node.successors.push(next);
                    }
                }
            }
            Bclr | Bcctr => {
                let conditional = !always(instr.bo());
                if instr.lk() {
                    node.opaque_call(conditional);
                    node.successors.push(next);
                } else {
                    if op == Bcctr {
                        node.opaque_call(true);
                    }
                    if conditional {
                        node.successors.push(next);
                    }
                }
            }
            _ => node.successors.push(next),
        }
        node.successors.retain(|&a| self.inside(a));
        Ok(node)
    }

    /// Every instruction reachable from the entry.
    fn graph(&self) -> Result<BTreeMap<u64, Node>, AnalyzeError> {
        let mut nodes = BTreeMap::new();
        let mut worklist = vec![self.function.address];
        while let Some(pc) = worklist.pop() {
            if nodes.contains_key(&pc) {
                continue;
            }
            let Some(instr) = self.segment.fetch(pc) else {
                continue;
            };
            let node = self.node(pc, instr)?;
            worklist.extend(node.successors.iter().copied());
            nodes.insert(pc, node);
        }
        Ok(nodes)
    }
}

/// Infer the signature of `function` from its code.
///
/// Integer arguments are r3-r10 and floating-point arguments f1-f13; a
/// read of the n-th argument register makes every lower one a parameter
/// too. Vector arguments stay in the state and are never inferred. The
/// return type follows the result registers written: r3 gives an integer,
/// v2 a vector, and f1 a float, later ones taking precedence.
pub fn infer_signature(segment: &Segment, function: &Function) -> Result<Signature, AnalyzeError> {
    let walker = Walker { segment, function };
    let nodes = walker.graph()?;
    let entry = function.address;
    if !nodes.contains_key(&entry) {
        return Ok(Signature {
            params: Vec::new(),
            ret: ReturnType::Void,
        });
    }

    let mut predecessors: BTreeMap<u64, Vec<u64>> = BTreeMap::new();
    for (&pc, node) in &nodes {
        for &succ in &node.successors {
            predecessors.entry(succ).or_default().push(pc);
        }
    }

    // Registers written on every path into each instruction.
    let mut written_in: BTreeMap<u64, RegMask> = nodes
        .keys()
        .map(|&pc| (pc, if pc == entry { 0 } else { RegMask::MAX }))
        .collect();
    let mut changed = true;
    while changed {
        changed = false;
        for &pc in nodes.keys() {
            if pc == entry {
                continue;
            }
            let incoming = predecessors.get(&pc).map_or(0, |preds| {
                preds
                    .iter()
                    .map(|p| written_in[p] | nodes[p].writes)
                    .fold(RegMask::MAX, |acc, out| acc & out)
            });
            if written_in[&pc] != incoming {
                written_in.insert(pc, incoming);
                changed = true;
            }
        }
    }

    let (mut exposed, mut may_write) = (0, 0);
    for (pc, node) in &nodes {
        exposed |= node.reads & !written_in[pc];
        may_write |= node.may_write;
    }

    let ints = highest(exposed, gpr, 3, 10);
    let floats = highest(exposed, fpr, 1, 13);
    let mut params = Vec::new();
    for n in 0..ints.max(floats) {
        if n < ints {
            params.push(ParamType::Integer);
        }
        if n < floats {
            params.push(ParamType::Float);
        }
    }

    let mut ret = ReturnType::Void;
    if may_write & gpr(3) != 0 {
        ret = ReturnType::Integer;
    }
    if may_write & vr(2) != 0 {
        ret = ReturnType::Vector;
    }
    if may_write & fpr(1) != 0 {
        ret = ReturnType::Float;
    }
    Ok(Signature { params, ret })
}
