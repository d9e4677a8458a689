//! Guest programs: executable segments and their entry point.

use std::path::Path;

use cellrec_elf::{ELF_MAGIC, ElfImage};
use cellrec_jit::{Function, Segment, SegmentThunks};
use tracing::{debug, warn};

use crate::{Error, Result};

/// Executable segments of a loaded program.
#[derive(Clone, Debug)]
pub struct Program {
    /// Code address of the entry function.
    pub entry: u64,
    pub segments: Vec<Segment>,
}

impl Program {
    /// Load an ELF file, or raw code placed at `base` when the file is not
    /// an ELF image.
    pub fn load(path: &Path, base: u64, thunks: &SegmentThunks) -> Result<Self> {
        let data = std::fs::read(path)?;
        if data.starts_with(&ELF_MAGIC) {
            Self::from_elf(&data, thunks)
        } else {
            debug!(path = %path.display(), base = format_args!("{base:#x}"), "loading raw code");
            Ok(Self::from_raw(data, base, thunks))
        }
    }

    /// Executable segments of an ELF image, with one function per function
    /// symbol and one at the entry point. Signatures are inferred from the
    /// code.
    ///
    /// An entry point outside the code is treated as a function descriptor.
    pub fn from_elf(data: &[u8], thunks: &SegmentThunks) -> Result<Self> {
        let image = ElfImage::parse(data)?;
        let segments: Vec<Segment> = image
            .executable_segments()
            .map(|seg| {
                let mut segment =
                    Segment::from_image_segment(seg, &image.symbols).with_thunks(thunks.clone());
                segment.infer_signatures();
                segment
            })
            .collect();

        let mut entry = image.entry_point;
        if !segments.iter().any(|s| s.contains(entry)) {
            entry = image
                .resolve_descriptor(entry)
                .ok_or(Error::NoCodeSegment(entry))?;
        }
        let mut program = Self { entry, segments };
        program.ensure_function(entry, "entry")?;
        Ok(program)
    }

    /// A single segment of raw code at `base`, entered at `base`.
    pub fn from_raw(code: Vec<u8>, base: u64, thunks: &SegmentThunks) -> Self {
        let mut segment = Segment::new(base, code).with_thunks(thunks.clone());
        if !segment.code.is_empty() {
            segment.add_function(Function::new(base, segment.end() - base).with_name("entry"));
            segment.infer_signatures();
        }
        Self {
            entry: base,
            segments: vec![segment],
        }
    }

    pub fn segment_containing(&self, address: u64) -> Option<&Segment> {
        self.segments.iter().find(|s| s.contains(address))
    }

    /// Make sure a function starts at `address`.
    ///
    /// A new function extends to the next known function or the end of
    /// its segment. An existing function covering `address` is truncated
    /// so the two do not overlap. Signatures of the segment are inferred
    /// again afterwards.
    pub fn ensure_function(&mut self, address: u64, name: &str) -> Result<()> {
        let segment = self
            .segments
            .iter_mut()
            .find(|s| s.contains(address))
            .ok_or(Error::NoCodeSegment(address))?;
        if segment.function(address).is_some() {
            return Ok(());
        }

        let end = segment
            .functions
            .range(address..)
            .next()
            .map_or(segment.end(), |(&start, _)| start);
        if let Some((_, outer)) = segment.functions.range_mut(..address).next_back()
            && outer.contains(address)
        {
            warn!(
                function = %outer.name,
                split = format_args!("{address:#x}"),
                "splitting function at new entry"
            );
            outer.size = address - outer.address;
        }
        segment.add_function(Function::new(address, end - address).with_name(name));
        segment.infer_signatures();
        Ok(())
    }

    /// Number of known functions over all segments.
    pub fn function_count(&self) -> usize {
        self.segments.iter().map(|s| s.functions.len()).sum()
    }
}
