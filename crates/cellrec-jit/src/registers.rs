//! Guest register routing.
//!
//! Every register read and write of translated code goes through
//! [`RegisterFile`]. Shadowed registers live in IR locals for the whole
//! function: the first access materializes the local and appends its seeding
//! load to the seed block, and the epilog flushes every materialized local
//! back to the state. Volatile registers are loaded from and stored to the
//! state on every access.

use cellrec_ir::{BinaryOp, Endian, IrBuilder, Type};
use rustc_hash::FxHashMap;

use crate::state::offsets;

/// Register classes of the PPU state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RegClass {
    Gpr,
    Fpr,
    Vr,
    /// One condition bit, indexed `field * 4 + bit`.
    Cr,
    /// One XER byte, indexed by [`xer`] constants.
    Xer,
    Lr,
    Ctr,
    Fpscr,
}

/// Indices of the XER bytes.
pub mod xer {
    pub const SO: usize = 0;
    pub const OV: usize = 1;
    pub const CA: usize = 2;
    pub const BC: usize = 3;
}

impl RegClass {
    /// Whether `index` of this class is held in a shadow local.
    ///
    /// Parameter/return registers and the non-volatile ranges are shadowed;
    /// condition, XER, link, count, and status registers never are.
    pub const fn is_shadowed(self, index: usize) -> bool {
        match self {
            Self::Gpr => matches!(index, 3..=10 | 14..=31),
            Self::Fpr => matches!(index, 1..=31),
            Self::Vr => matches!(index, 2..=13 | 20..=31),
            Self::Cr | Self::Xer | Self::Lr | Self::Ctr | Self::Fpscr => false,
        }
    }

    /// IR type of one register of this class.
    pub const fn ty(self) -> Type {
        match self {
            Self::Gpr | Self::Lr | Self::Ctr => Type::I64,
            Self::Fpr => Type::F64,
            Self::Vr => Type::I128,
            Self::Cr | Self::Xer => Type::I8,
            Self::Fpscr => Type::I32,
        }
    }

    /// Byte offset of register `index` inside `PpuState`.
    pub const fn offset(self, index: usize) -> usize {
        match self {
            Self::Gpr => offsets::R + index * 8,
            Self::Fpr => offsets::F + index * 8,
            Self::Vr => offsets::V + index * 16,
            Self::Cr => offsets::CR + (index / 4) * offsets::CR_FIELD + index % 4,
            Self::Xer => offsets::XER + index,
            Self::Lr => offsets::LR,
            Self::Ctr => offsets::CTR,
            Self::Fpscr => offsets::FPSCR,
        }
    }
}

/// Per-function register routing over an [`IrBuilder`].
pub struct RegisterFile<B: IrBuilder> {
    state: B::Value,
    seed: B::Block,
    shadows: FxHashMap<(RegClass, usize), B::Local>,
}

impl<B: IrBuilder> RegisterFile<B> {
    /// `state` is the state pointer defined in the prolog; `seed` is the
    /// block run between prolog and body that receives seeding loads.
    pub fn new(state: B::Value, seed: B::Block) -> Self {
        Self {
            state,
            seed,
            shadows: FxHashMap::default(),
        }
    }

    pub const fn state(&self) -> B::Value {
        self.state
    }

    /// Address of the state byte at `offset`.
    pub fn state_addr(&self, b: &mut B, offset: usize) -> B::Value {
        let offset = b.const_int(Type::I64, offset as u64);
        b.binary(BinaryOp::Add, self.state, offset)
    }

    pub fn load_state(&self, b: &mut B, offset: usize, ty: Type) -> B::Value {
        let addr = self.state_addr(b, offset);
        b.load(addr, ty, Endian::Native)
    }

    pub fn store_state(&self, b: &mut B, offset: usize, value: B::Value) {
        let addr = self.state_addr(b, offset);
        b.store(addr, value, Endian::Native);
    }

    pub fn read(&mut self, b: &mut B, class: RegClass, index: usize) -> B::Value {
        if class.is_shadowed(index) {
            let local = self.shadow(b, class, index);
            b.load_local(local)
        } else {
            self.load_state(b, class.offset(index), class.ty())
        }
    }

    pub fn write(&mut self, b: &mut B, class: RegClass, index: usize, value: B::Value) {
        if class.is_shadowed(index) {
            let local = self.shadow(b, class, index);
            b.store_local(local, value);
        } else {
            self.store_state(b, class.offset(index), value);
        }
    }

    /// Write an incoming parameter from the prolog. A shadowed register bound
    /// this way is never seeded from the state.
    pub fn bind(&mut self, b: &mut B, class: RegClass, index: usize, value: B::Value) {
        if class.is_shadowed(index) {
            let local = *self
                .shadows
                .entry((class, index))
                .or_insert_with(|| b.create_local(class.ty()));
            b.store_local(local, value);
        } else {
            self.store_state(b, class.offset(index), value);
        }
    }

    /// Store every materialized shadow back to the state, in register order.
    pub fn flush(&self, b: &mut B) {
        let mut shadows: Vec<_> = self.shadows.iter().map(|(&k, &l)| (k, l)).collect();
        shadows.sort_unstable_by_key(|&(key, _)| key);
        for ((class, index), local) in shadows {
            let value = b.load_local(local);
            self.store_state(b, class.offset(index), value);
        }
    }

    /// Copy a materialized shadow to the state ahead of a call that reads
    /// it there. Volatile and untouched registers are already in place.
    pub fn spill(&self, b: &mut B, class: RegClass, index: usize) {
        if let Some(&local) = self.shadows.get(&(class, index)) {
            let value = b.load_local(local);
            self.store_state(b, class.offset(index), value);
        }
    }

    /// Refresh a shadowed register from the state after a host call that
    /// may have written it.
    pub fn reload(&mut self, b: &mut B, class: RegClass, index: usize) {
        if class.is_shadowed(index) {
            let value = self.load_state(b, class.offset(index), class.ty());
            self.write(b, class, index, value);
        }
    }

    pub fn shadow_count(&self) -> usize {
        self.shadows.len()
    }

    fn shadow(&mut self, b: &mut B, class: RegClass, index: usize) -> B::Local {
        if let Some(&local) = self.shadows.get(&(class, index)) {
            return local;
        }
        let local = b.create_local(class.ty());
        let resume = b.insert_block();
        b.set_insert_point(self.seed);
        let value = self.load_state(b, class.offset(index), class.ty());
        b.store_local(local, value);
        if let Some(block) = resume {
            b.set_insert_point(block);
        }
        self.shadows.insert((class, index), local);
        local
    }
}

#[cfg(test)]
mod tests {
    use cellrec_ir::{
        Callee, ExternHandler, FunctionBuilder, InstKind, InterpError, Interpreter, Memory,
    };

    use super::*;
    use crate::state::PpuState;

    const STATE: u64 = 0x8000;

    struct StateOnly;

    impl ExternHandler for StateOnly {
        fn call(&mut self, name: &str, _: &[u128], _: &mut Memory) -> Result<Option<u128>, InterpError> {
            assert_eq!(name, "state");
            Ok(Some(u128::from(STATE)))
        }
    }

    fn loads_in(func: &cellrec_ir::Function, block: usize) -> usize {
        func.blocks[block]
            .insts
            .iter()
            .filter(|i| matches!(i.kind, InstKind::Load { .. }))
            .count()
    }

    #[test]
    fn test_classification() {
        assert!(!RegClass::Gpr.is_shadowed(0));
        assert!(!RegClass::Gpr.is_shadowed(1));
        assert!(RegClass::Gpr.is_shadowed(3));
        assert!(RegClass::Gpr.is_shadowed(10));
        assert!(!RegClass::Gpr.is_shadowed(11));
        assert!(!RegClass::Gpr.is_shadowed(13));
        assert!(RegClass::Gpr.is_shadowed(14));
        assert!(!RegClass::Fpr.is_shadowed(0));
        assert!(RegClass::Fpr.is_shadowed(13));
        assert!(RegClass::Fpr.is_shadowed(31));
        assert!(!RegClass::Vr.is_shadowed(1));
        assert!(RegClass::Vr.is_shadowed(2));
        assert!(!RegClass::Vr.is_shadowed(19));
        assert!(RegClass::Vr.is_shadowed(20));
        assert!(!RegClass::Cr.is_shadowed(0));
        assert!(!RegClass::Lr.is_shadowed(0));
    }

    #[test]
    fn test_offsets() {
        assert_eq!(RegClass::Gpr.offset(3), 24);
        assert_eq!(RegClass::Vr.offset(1), offsets::V + 16);
        assert_eq!(RegClass::Cr.offset(6), offsets::CR + 4 + 2);
        assert_eq!(RegClass::Xer.offset(xer::CA), offsets::XER_CA);
    }

    /// Builds `prolog -> seed -> body -> exit`, runs `body` inside, and
    /// returns the finished function.
    fn build(body: impl FnOnce(&mut FunctionBuilder, &mut RegisterFile<FunctionBuilder>)) -> cellrec_ir::Function {
        let mut b = FunctionBuilder::new("f", vec![], None);
        let prolog = b.create_block("prolog");
        let seed = b.create_block("seed");
        let entry = b.create_block("entry");
        b.set_insert_point(prolog);
        let state = b
            .call(Callee::Extern("state".into()), &[], Some(Type::I64))
            .unwrap();
        b.br(seed);
        let mut regs = RegisterFile::new(state, seed);
        b.set_insert_point(entry);
        body(&mut b, &mut regs);
        regs.flush(&mut b);
        b.ret(None);
        b.set_insert_point(seed);
        b.br(entry);
        b.finish().unwrap()
    }

    #[test]
    fn test_shadowed_access_is_idempotent() {
        let func = build(|b, regs| {
            let x = regs.read(b, RegClass::Gpr, 14);
            let y = regs.read(b, RegClass::Gpr, 14);
            let sum = b.binary(BinaryOp::Add, x, y);
            regs.write(b, RegClass::Gpr, 14, sum);
            regs.write(b, RegClass::Gpr, 14, sum);
            assert_eq!(regs.shadow_count(), 1);
        });
        assert_eq!(func.locals.len(), 1);
        assert_eq!(loads_in(&func, 1), 1);
        assert_eq!(loads_in(&func, 2), 0);

        let mut state = PpuState::new();
        state.r[14] = 21;
        let mut interp = Interpreter::new();
        state.store_into(&mut interp.memory, STATE);
        interp.run(&func, &[], &mut StateOnly).unwrap();
        assert_eq!(PpuState::load_from(&interp.memory, STATE).r[14], 42);
    }

    #[test]
    fn test_volatile_access_goes_to_state() {
        let func = build(|b, regs| {
            let x = regs.read(b, RegClass::Gpr, 0);
            regs.write(b, RegClass::Gpr, 12, x);
            let y = regs.read(b, RegClass::Gpr, 12);
            regs.write(b, RegClass::Ctr, 0, y);
            assert_eq!(regs.shadow_count(), 0);
        });
        assert!(func.locals.is_empty());
        assert_eq!(loads_in(&func, 1), 0);
        assert_eq!(loads_in(&func, 2), 2);

        let mut state = PpuState::new();
        state.r[0] = 7;
        let mut interp = Interpreter::new();
        state.store_into(&mut interp.memory, STATE);
        interp.run(&func, &[], &mut StateOnly).unwrap();
        let after = PpuState::load_from(&interp.memory, STATE);
        assert_eq!((after.r[12], after.ctr), (7, 7));
    }

    #[test]
    fn test_spill_touches_only_materialized_shadows() {
        let func = build(|b, regs| {
            let five = b.const_int(Type::I64, 5);
            regs.write(b, RegClass::Gpr, 4, five);
            regs.spill(b, RegClass::Gpr, 3);
            regs.spill(b, RegClass::Gpr, 4);
            assert_eq!(regs.shadow_count(), 1);
        });
        assert_eq!(loads_in(&func, 2), 0);

        let mut state = PpuState::new();
        state.r[3] = 9;
        let mut interp = Interpreter::new();
        state.store_into(&mut interp.memory, STATE);
        interp.run(&func, &[], &mut StateOnly).unwrap();
        let after = PpuState::load_from(&interp.memory, STATE);
        assert_eq!((after.r[3], after.r[4]), (9, 5));
    }

    #[test]
    fn test_bound_parameter_is_not_seeded() {
        let func = build(|b, regs| {
            let one = b.const_int(Type::I64, 1);
            regs.bind(b, RegClass::Gpr, 3, one);
            let x = regs.read(b, RegClass::Gpr, 3);
            regs.write(b, RegClass::Gpr, 4, x);
        });
        // Only r4 is seeded.
        assert_eq!(loads_in(&func, 1), 1);
        assert_eq!(func.locals.len(), 2);
    }
}
