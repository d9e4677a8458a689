//! Dead code elimination.

use super::Pass;
use crate::error::PassError;
use crate::function::{BlockId, Function, Terminator};

/// Removes side-effect-free instructions whose results are unused, and
/// empties blocks unreachable from the entry.
pub struct DeadCodePass;

impl Pass for DeadCodePass {
    fn name(&self) -> &'static str {
        "Dead Code Elimination"
    }

    fn run(&self, func: &mut Function) -> Result<(), PassError> {
        clear_unreachable(func);
        loop {
            let uses = func.use_counts();
            let mut removed = 0usize;
            for block in &mut func.blocks {
                let before = block.insts.len();
                block.insts.retain(|inst| {
                    inst.kind.has_side_effects()
                        || inst
                            .result
                            .is_some_and(|r| uses.get(r.index()).copied().unwrap_or(0) > 0)
                });
                removed += before - block.insts.len();
            }
            if removed == 0 {
                return Ok(());
            }
        }
    }
}

/// Unreachable blocks keep their slot (block ids are indices) but lose
/// every instruction. Void functions end them in a bare return; the rest
/// branch to themselves so no new value is needed.
fn clear_unreachable(func: &mut Function) {
    if func.blocks.is_empty() {
        return;
    }
    let mut reachable = vec![false; func.blocks.len()];
    let mut worklist = vec![BlockId(0)];
    while let Some(id) = worklist.pop() {
        let Some(seen) = reachable.get_mut(id.index()) else {
            continue;
        };
        if *seen {
            continue;
        }
        *seen = true;
        if let Some(term) = &func.blocks[id.index()].terminator {
            worklist.extend(term.successors());
        }
    }

    let returns_value = func.ret.is_some();
    for (index, live) in reachable.into_iter().enumerate() {
        if live {
            continue;
        }
        let block = &mut func.blocks[index];
        block.insts.clear();
        block.terminator = Some(if returns_value {
            Terminator::Br(BlockId(index as u32))
        } else {
            Terminator::Ret(None)
        });
    }
}
