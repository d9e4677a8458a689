//! Executable segments and the host thunks their functions call.

use std::collections::BTreeMap;

use cellrec_elf::{MemorySegment, Symbol};
use cellrec_isa::{PpuInstr, fetch_word};

use tracing::{debug, warn};

use crate::function::Function;
use crate::signature::{Signature, infer_signature};

/// Extern symbol names of the host services translated code calls.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SegmentThunks {
    /// `() -> i64`: address of the `PpuState`.
    pub get_state: String,
    /// `(i64)`: record entry into the function at the given address.
    pub log_state: String,
    /// `() -> i64`: host address of guest address zero.
    pub memory_base: String,
    /// `(i64)`: call the guest code at the given address.
    pub indirect_call: String,
    /// `(i64)`: handle a system call; the argument is the `sc` address.
    pub syscall: String,
}

impl Default for SegmentThunks {
    fn default() -> Self {
        Self {
            get_state: "cellrec_get_state".into(),
            log_state: "cellrec_log_state".into(),
            memory_base: "cellrec_memory_base".into(),
            indirect_call: "cellrec_indirect_call".into(),
            syscall: "cellrec_syscall".into(),
        }
    }
}

/// A contiguous range of guest code and the functions found in it.
#[derive(Clone, Debug, Default)]
pub struct Segment {
    pub base: u64,
    pub code: Vec<u8>,
    pub functions: BTreeMap<u64, Function>,
    pub thunks: SegmentThunks,
}

impl Segment {
    pub fn new(base: u64, code: Vec<u8>) -> Self {
        Self {
            base,
            code,
            functions: BTreeMap::new(),
            thunks: SegmentThunks::default(),
        }
    }

    /// Build a segment from a loaded ELF segment, seeding one function per
    /// `STT_FUNC` symbol inside it.
    ///
    /// Symbols without a size extend to the next function or the end of the
    /// segment.
    pub fn from_image_segment(segment: &MemorySegment, symbols: &[Symbol]) -> Self {
        let mut this = Self::new(segment.virtual_start, segment.data.clone());
        let end = this.end();
        let mut starts: Vec<&Symbol> = symbols
            .iter()
            .filter(|s| s.is_function() && s.value >= this.base && s.value < end)
            .collect();
        starts.sort_by_key(|s| s.value);
        starts.dedup_by_key(|s| s.value);

        for (i, symbol) in starts.iter().enumerate() {
            let next = starts.get(i + 1).map_or(end, |s| s.value);
            let size = if symbol.size == 0 {
                next - symbol.value
            } else {
                symbol.size.min(end - symbol.value)
            };
            let name = if symbol.name.is_empty() {
                format!("func_{:08x}", symbol.value)
            } else {
                symbol.name.clone()
            };
            this.add_function(Function::new(symbol.value, size).with_name(name));
        }
        this
    }

    #[must_use]
    pub fn with_thunks(mut self, thunks: SegmentThunks) -> Self {
        self.thunks = thunks;
        self
    }

    /// Register `function`, replacing any previous one at the same address.
    pub fn add_function(&mut self, function: Function) {
        self.functions.insert(function.address, function);
    }

    pub fn function(&self, address: u64) -> Option<&Function> {
        self.functions.get(&address)
    }

    /// First address past the code.
    pub fn end(&self) -> u64 {
        self.base + self.code.len() as u64
    }

    pub fn contains(&self, address: u64) -> bool {
        address >= self.base && address < self.end()
    }

    /// Replace every function's signature with the one inferred from its
    /// code, repeating until callers agree with their callees. A function
    /// whose code cannot be analyzed keeps its signature.
    pub fn infer_signatures(&mut self) {
        let rounds = self.functions.len() + 1;
        for round in 1..=rounds {
            let inferred: Vec<(u64, Signature)> = self
                .functions
                .values()
                .filter_map(|function| match infer_signature(self, function) {
                    Ok(sig) => Some((function.address, sig)),
                    Err(err) => {
                        debug!(function = %function.name, error = %err, "keeping declared signature");
                        None
                    }
                })
                .collect();

            let mut changed = false;
            for (address, sig) in inferred {
                if let Some(function) = self.functions.get_mut(&address)
                    && Signature::of(function) != sig
                {
                    function.params = sig.params;
                    function.ret = sig.ret;
                    changed = true;
                }
            }
            if !changed {
                debug!(base = format_args!("{:#x}", self.base), rounds = round, "signatures inferred");
                return;
            }
        }
        warn!(base = format_args!("{:#x}", self.base), "signature inference did not settle");
    }

    /// Instruction word at `address`.
    pub fn fetch(&self, address: u64) -> Option<PpuInstr> {
        let offset = usize::try_from(address.checked_sub(self.base)?).ok()?;
        fetch_word(&self.code, offset).map(PpuInstr)
    }
}

#[cfg(test)]
mod tests {
    use cellrec_elf::{PF_R, PF_X, STT_FUNC, STT_OBJECT};

    use cellrec_asm::PpcAssembler;

    use super::*;
    use crate::function::{ParamType, ReturnType};

    fn symbol(name: &str, value: u64, size: u64, sym_type: u8) -> Symbol {
        Symbol {
            name: name.into(),
            value,
            size,
            sym_type,
            binding: 1,
            shndx: 1,
        }
    }

    #[test]
    fn test_fetch_big_endian_words() {
        let seg = Segment::new(0x1000, vec![0x4E, 0x80, 0x00, 0x20, 0x60]);
        assert_eq!(seg.fetch(0x1000), Some(PpuInstr(0x4E80_0020)));
        assert_eq!(seg.fetch(0x1004), None);
        assert_eq!(seg.fetch(0xFFC), None);
        assert!(seg.contains(0x1004) && !seg.contains(0x1005));
    }

    #[test]
    fn test_functions_from_symbols() {
        let image = MemorySegment {
            virtual_start: 0x1_0000,
            virtual_end: 0x1_0040,
            data: vec![0; 0x40],
            flags: PF_R | PF_X,
        };
        let symbols = [
            symbol("entry", 0x1_0000, 0, STT_FUNC),
            symbol("helper", 0x1_0020, 8, STT_FUNC),
            symbol("alias", 0x1_0020, 8, STT_FUNC),
            symbol("data", 0x1_0030, 4, STT_OBJECT),
            symbol("elsewhere", 0x2_0000, 4, STT_FUNC),
        ];
        let seg = Segment::from_image_segment(&image, &symbols);

        assert_eq!(seg.functions.len(), 2);
        let entry = seg.function(0x1_0000).unwrap();
        assert_eq!((entry.name.as_str(), entry.size), ("entry", 0x20));
        let helper = seg.function(0x1_0020).unwrap();
        assert_eq!(helper.size, 8);
        assert!(helper.params.is_empty());
        assert_eq!(seg.thunks, SegmentThunks::default());
    }

    fn code(f: impl FnOnce(&mut PpcAssembler<'_>) -> cellrec_asm::Result<()>) -> Vec<u8> {
        let mut mem = [0u8; 256];
        let mut asm = PpcAssembler::new(&mut mem);
        f(&mut asm).unwrap();
        let size = asm.finalize().unwrap();
        asm.code()[..size].to_vec()
    }

    #[test]
    fn test_infer_signatures_follows_call_chain() {
        // f0: li r3, 1; bl f1; blr
        // f1: bl f2; blr
        // f2: add r3, r3, r4; blr
        let words = code(|a| {
            let (f1, f2) = (a.new_label(), a.new_label());
            a.li(3, 1)?;
            a.bl(f1)?;
            a.blr()?;
            a.bind(f1)?;
            a.bl(f2)?;
            a.blr()?;
            a.bind(f2)?;
            a.add(3, 3, 4)?;
            a.blr()
        });
        let mut seg = Segment::new(0x1000, words);
        seg.add_function(Function::new(0x1000, 12));
        seg.add_function(Function::new(0x100C, 8));
        seg.add_function(Function::new(0x1014, 8));
        seg.infer_signatures();

        let two_ints = [ParamType::Integer, ParamType::Integer];
        assert_eq!(seg.function(0x1014).unwrap().params, two_ints);
        assert_eq!(seg.function(0x100C).unwrap().params, two_ints);
        // r3 is set before the call; r4 still reaches f2.
        assert_eq!(seg.function(0x1000).unwrap().params, two_ints);
        assert!(seg.functions.values().all(|f| f.ret == ReturnType::Integer));
    }

    #[test]
    fn test_unanalyzable_function_keeps_signature() {
        let mut words = code(|a| a.blr());
        words.extend([0; 4]);
        let mut seg = Segment::new(0x1000, words);
        seg.add_function(Function::new(0x1000, 4));
        seg.add_function(Function::new(0x1004, 4).with_params(vec![ParamType::Float]));
        seg.infer_signatures();

        assert_eq!(seg.function(0x1000).unwrap().ret, ReturnType::Void);
        assert_eq!(seg.function(0x1004).unwrap().params, [ParamType::Float]);
    }
}
