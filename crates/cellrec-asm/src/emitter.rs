//! Buffer plus label bookkeeping shared by both assemblers.

use tracing::debug;

use crate::buffer::CodeBuffer;
use crate::error::Result;
use crate::label::{Fixup, FixupKind, Label, LabelArena};
use crate::table::Target;

pub struct Emitter<'a> {
    pub buf: CodeBuffer<'a>,
    labels: LabelArena,
}

impl<'a> Emitter<'a> {
    pub const fn new(buf: CodeBuffer<'a>) -> Self {
        Self {
            buf,
            labels: LabelArena::new(),
        }
    }

    #[inline]
    pub fn put(&mut self, word: u32) -> Result<()> {
        self.buf.emit_u32(word)
    }

    /// Emit a word whose displacement field is `target`. A label emits a
    /// zero displacement and records a fixup.
    pub fn put_target(
        &mut self,
        target: Target,
        kind: FixupKind,
        encode: impl FnOnce(i64) -> Result<u32>,
    ) -> Result<u32> {
        match target {
            Target::Imm(value) => {
                let word = encode(value)?;
                self.put(word)?;
                Ok(word)
            }
            Target::Label(label) => {
                let word = encode(0)?;
                self.put_with_fixup(word, label, kind)?;
                Ok(word)
            }
        }
    }

    pub fn put_with_fixup(&mut self, word: u32, label: Label, kind: FixupKind) -> Result<()> {
        let position = self.buf.current_size();
        self.put(word)?;
        self.labels.add_fixup(Fixup {
            position,
            label,
            kind,
        });
        Ok(())
    }

    pub fn new_label(&mut self) -> Label {
        self.labels.new_label()
    }

    pub fn bind(&mut self, label: Label) -> Result<()> {
        self.labels.bind(label, self.buf.current_size())
    }

    pub fn label_position(&self, label: Label) -> Option<usize> {
        self.labels.position(label)
    }

    pub fn finalize(&mut self) -> Result<usize> {
        let pending = self.labels.pending().len();
        self.labels.resolve(&mut self.buf)?;
        debug!(
            size = self.buf.current_size(),
            fixups = pending,
            "finalized code buffer"
        );
        Ok(self.buf.current_size())
    }
}
