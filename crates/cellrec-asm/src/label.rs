//! Branch labels and deferred displacement fixups.
//!
//! A branch to a label is emitted with a zero displacement and a [`Fixup`]
//! remembering where it was. Once every label is bound, [`LabelArena::resolve`]
//! computes the displacements and ORs them into the emitted words.

use tracing::trace;

use crate::buffer::CodeBuffer;
use crate::error::{EncodeError, Result};
use crate::forms;

/// Handle to a label allocated by an assembler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Label(pub(crate) u32);

impl Label {
    pub const fn id(self) -> u32 {
        self.0
    }
}

/// How a fixup's displacement is stored in the instruction word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FixupKind {
    /// PPC I-form, relative to the branch.
    PpcRel24,
    /// PPC I-form with `AA` set.
    PpcAbs24,
    /// PPC B-form, relative to the branch.
    PpcRel14,
    /// PPC B-form with `AA` set.
    PpcAbs14,
    /// SPU RI16 word offset, relative to the branch.
    SpuRel16,
    /// SPU RI16 absolute word address.
    SpuAbs16,
    /// AArch64 `b`/`bl` word offset in bits 0..26.
    ArmRel26,
    /// AArch64 `b.cond`/`cbz` word offset in bits 5..24.
    ArmRel19,
}

impl FixupKind {
    /// Field bits for a branch at `position` to `target` (both absolute
    /// addresses).
    fn field(self, position: u64, target: u64) -> Result<u32> {
        let relative = target.wrapping_sub(position) as i64;
        let absolute = target as i64;
        match self {
            Self::PpcRel24 => forms::disp(relative, 26),
            Self::PpcAbs24 => forms::disp(absolute, 26),
            Self::PpcRel14 => forms::disp(relative, 16),
            Self::PpcAbs14 => forms::disp(absolute, 16),
            Self::SpuRel16 => forms::spu::ri16_branch(0, 0, relative),
            Self::SpuAbs16 => forms::spu::ri16_branch(0, 0, absolute),
            Self::ArmRel26 => forms::arm::branch_offset(relative, 26),
            Self::ArmRel19 => Ok(forms::arm::branch_offset(relative, 19)? << 5),
        }
    }
}

/// A branch waiting for its label's position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fixup {
    /// Buffer offset of the branch word.
    pub position: usize,
    pub label: Label,
    pub kind: FixupKind,
}

#[derive(Debug, Default)]
pub struct LabelArena {
    positions: Vec<Option<usize>>,
    fixups: Vec<Fixup>,
}

impl LabelArena {
    pub const fn new() -> Self {
        Self {
            positions: Vec::new(),
            fixups: Vec::new(),
        }
    }

    pub fn new_label(&mut self) -> Label {
        self.positions.push(None);
        Label(self.positions.len() as u32 - 1)
    }

    /// Record `position` as the label's buffer offset.
    pub fn bind(&mut self, label: Label, position: usize) -> Result<()> {
        let slot = self
            .positions
            .get_mut(label.0 as usize)
            .ok_or(EncodeError::UnboundLabel(label.0))?;
        if slot.is_some() {
            return Err(EncodeError::LabelRebound(label.0));
        }
        *slot = Some(position);
        Ok(())
    }

    pub fn position(&self, label: Label) -> Option<usize> {
        self.positions.get(label.0 as usize).copied().flatten()
    }

    pub fn add_fixup(&mut self, fixup: Fixup) {
        self.fixups.push(fixup);
    }

    pub fn pending(&self) -> &[Fixup] {
        &self.fixups
    }

    /// Patch every pending fixup. On error, already patched words stay
    /// patched and the remaining fixups are kept.
    pub fn resolve(&mut self, buf: &mut CodeBuffer<'_>) -> Result<()> {
        let base = buf.base_address();
        let mut pending = std::mem::take(&mut self.fixups).into_iter();
        while let Some(fixup) = pending.next() {
            if let Err(err) = Self::patch(&self.positions, buf, base, fixup) {
                self.fixups.push(fixup);
                self.fixups.extend(pending);
                return Err(err);
            }
        }
        Ok(())
    }

    fn patch(
        positions: &[Option<usize>],
        buf: &mut CodeBuffer<'_>,
        base: u64,
        fixup: Fixup,
    ) -> Result<()> {
        let target = positions
            .get(fixup.label.0 as usize)
            .copied()
            .flatten()
            .ok_or(EncodeError::UnboundLabel(fixup.label.0))?;
        let field = fixup
            .kind
            .field(base + fixup.position as u64, base + target as u64)?;
        let word = buf.read_u32(fixup.position)?;
        buf.patch_u32(fixup.position, word | field)?;
        trace!(
            position = fixup.position,
            label = fixup.label.0,
            "patched fixup"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_twice() {
        let mut arena = LabelArena::new();
        let l = arena.new_label();
        arena.bind(l, 0).unwrap();
        assert_eq!(arena.bind(l, 4), Err(EncodeError::LabelRebound(0)));
    }

    #[test]
    fn test_resolve_backward_branch() {
        let mut mem = [0u8; 16];
        let mut buf = CodeBuffer::new(&mut mem);
        let mut arena = LabelArena::new();
        let top = arena.new_label();
        arena.bind(top, 0).unwrap();
        buf.emit_u32(0x6000_0000).unwrap();
        arena.add_fixup(Fixup {
            position: buf.current_size(),
            label: top,
            kind: FixupKind::PpcRel24,
        });
        buf.emit_u32(0x4800_0000).unwrap();
        arena.resolve(&mut buf).unwrap();
        assert_eq!(buf.read_u32(4).unwrap(), 0x4BFF_FFFC);
        assert!(arena.pending().is_empty());
    }

    #[test]
    fn test_unbound_label_fails() {
        let mut mem = [0u8; 4];
        let mut buf = CodeBuffer::new(&mut mem);
        let mut arena = LabelArena::new();
        let l = arena.new_label();
        buf.emit_u32(0x4800_0000).unwrap();
        arena.add_fixup(Fixup {
            position: 0,
            label: l,
            kind: FixupKind::PpcRel24,
        });
        assert_eq!(arena.resolve(&mut buf), Err(EncodeError::UnboundLabel(0)));
        assert_eq!(arena.pending().len(), 1);
    }

    #[test]
    fn test_failed_resolve_keeps_unpatched_fixups() {
        let mut mem = [0u8; 12];
        let mut buf = CodeBuffer::new(&mut mem);
        let mut arena = LabelArena::new();
        let bound = arena.new_label();
        let unbound = arena.new_label();
        for _ in 0..3 {
            buf.emit_u32(0x4800_0000).unwrap();
        }
        arena.bind(bound, 8).unwrap();
        for (position, label) in [(0, bound), (4, unbound), (8, bound)] {
            arena.add_fixup(Fixup {
                position,
                label,
                kind: FixupKind::PpcRel24,
            });
        }
        assert_eq!(arena.resolve(&mut buf), Err(EncodeError::UnboundLabel(1)));
        assert_eq!(buf.read_u32(0).unwrap(), 0x4800_0008);
        let left: Vec<usize> = arena.pending().iter().map(|f| f.position).collect();
        assert_eq!(left, [4, 8]);

        arena.bind(unbound, 0).unwrap();
        arena.resolve(&mut buf).unwrap();
        assert!(arena.pending().is_empty());
        assert_eq!(buf.read_u32(4).unwrap(), 0x4BFF_FFFC);
        assert_eq!(buf.read_u32(8).unwrap(), 0x4800_0000);
    }

    #[test]
    fn test_arm_offsets_count_words() {
        assert_eq!(FixupKind::ArmRel26.field(0x100, 0xF8), Ok(0x3FF_FFFE));
        assert_eq!(FixupKind::ArmRel19.field(0x100, 0x110), Ok(4 << 5));
        assert_eq!(
            FixupKind::ArmRel19.field(0, 1 << 20),
            Err(EncodeError::ImmediateOutOfRange {
                value: 1 << 18,
                bits: 19
            })
        );
    }

    #[test]
    fn test_spu_word_offset() {
        assert_eq!(FixupKind::SpuRel16.field(0x100, 0x110), Ok(4 << 7));
        assert_eq!(
            FixupKind::SpuRel16.field(0x100, 0x102),
            Err(EncodeError::MisalignedDisplacement(2))
        );
    }
}
