//! Per-instruction register access analysis.
//!
//! [`analyze`] reports which registers an instruction reads and writes,
//! including implicit effects: XER carry and overflow, CR0/CR1 record forms,
//! CTR decrement, and link register updates. CR effects are tracked per
//! 4-bit field.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use cellrec_isa::{OpClass, PpuInstr, PpuOpcode, decode_ppu, spr};

use crate::error::AnalyzeError;

/// A register or register group an instruction can touch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Reg {
    Gpr(u8),
    Fpr(u8),
    Vr(u8),
    /// One CR field.
    Cr(u8),
    Xer,
    Lr,
    Ctr,
    Fpscr,
    /// Guest memory as a whole.
    Memory,
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gpr(n) => write!(f, "r{n}"),
            Self::Fpr(n) => write!(f, "f{n}"),
            Self::Vr(n) => write!(f, "v{n}"),
            Self::Cr(n) => write!(f, "cr{n}"),
            Self::Xer => f.write_str("xer"),
            Self::Lr => f.write_str("lr"),
            Self::Ctr => f.write_str("ctr"),
            Self::Fpscr => f.write_str("fpscr"),
            Self::Memory => f.write_str("mem"),
        }
    }
}

/// Read/write bit set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Access(u8);

impl Access {
    pub const READ: Self = Self(1);
    pub const WRITE: Self = Self(2);
    pub const READ_WRITE: Self = Self(3);

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_read(self) -> bool {
        self.contains(Self::READ)
    }

    pub const fn is_write(self) -> bool {
        self.contains(Self::WRITE)
    }
}

impl BitOr for Access {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Access {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_read() {
            f.write_str("r")?;
        }
        if self.is_write() {
            f.write_str("w")?;
        }
        Ok(())
    }
}

/// Registers touched by one instruction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccessSet {
    regs: BTreeMap<Reg, Access>,
}

impl AccessSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, reg: Reg, access: Access) {
        *self.regs.entry(reg).or_default() |= access;
    }

    pub fn get(&self, reg: Reg) -> Access {
        self.regs.get(&reg).copied().unwrap_or_default()
    }

    pub fn reads(&self, reg: Reg) -> bool {
        self.get(reg).is_read()
    }

    pub fn writes(&self, reg: Reg) -> bool {
        self.get(reg).is_write()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Reg, Access)> + '_ {
        self.regs.iter().map(|(&r, &a)| (r, a))
    }

    pub fn len(&self) -> usize {
        self.regs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regs.is_empty()
    }

    fn read(&mut self, reg: Reg) {
        self.add(reg, Access::READ);
    }

    fn write(&mut self, reg: Reg) {
        self.add(reg, Access::WRITE);
    }

    fn read_write(&mut self, reg: Reg) {
        self.add(reg, Access::READ_WRITE);
    }

    /// `rA|0` base operand: register 0 reads as zero.
    fn read_base(&mut self, ra: usize) {
        if ra != 0 {
            self.read(gpr(ra));
        }
    }

    /// Record form of integer instructions: CR0 gets a copy of XER[SO].
    fn record_cr0(&mut self) {
        self.write(Reg::Cr(0));
        self.read(Reg::Xer);
    }
}

impl fmt::Display for AccessSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (reg, access)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{reg}:{access}")?;
        }
        Ok(())
    }
}

#[allow(clippy::cast_possible_truncation)]
const fn gpr(n: usize) -> Reg {
    Reg::Gpr(n as u8)
}

#[allow(clippy::cast_possible_truncation)]
const fn fpr(n: usize) -> Reg {
    Reg::Fpr(n as u8)
}

#[allow(clippy::cast_possible_truncation)]
const fn vr(n: usize) -> Reg {
    Reg::Vr(n as u8)
}

#[allow(clippy::cast_possible_truncation)]
const fn cr(field: usize) -> Reg {
    Reg::Cr(field as u8)
}

/// Registers read and written by the instruction word `instr`.
pub fn analyze(instr: PpuInstr) -> Result<AccessSet, AnalyzeError> {
    let op = decode_ppu(instr).map_err(|_| AnalyzeError::Unknown(instr.raw()))?;
    let mut set = AccessSet::new();
    match op.class() {
        OpClass::Integer => integer(op, instr, &mut set),
        OpClass::Branch => branch(op, instr, &mut set),
        OpClass::Memory => memory(op, instr, &mut set),
        OpClass::Float => float(op, instr, &mut set),
        OpClass::Vector => vector(op, instr, &mut set),
        OpClass::System => system(op, instr, &mut set),
    }
    Ok(set)
}

fn integer(op: PpuOpcode, i: PpuInstr, set: &mut AccessSet) {
    use PpuOpcode::*;

    let xo_form = matches!(
        op,
        Add | Addc | Adde | Addme | Addze | Divd | Divdu | Divw | Divwu | Mulld | Mullw | Neg
            | Subf | Subfc | Subfe | Subfme | Subfze
    );
    match op {
        Add | Addc | Adde | Divd | Divdu | Divw | Divwu | Mulhd | Mulhdu | Mulhw | Mulhwu
        | Mulld | Mullw | Subf | Subfc | Subfe => {
            set.read(gpr(i.ra()));
            set.read(gpr(i.rb()));
            set.write(gpr(i.rd()));
        }
        Addme | Addze | Neg | Subfme | Subfze => {
            set.read(gpr(i.ra()));
            set.write(gpr(i.rd()));
        }
        Addi | Addis => {
            set.read_base(i.ra());
            set.write(gpr(i.rd()));
        }
        Addic | AddicRc | Mulli | Subfic => {
            set.read(gpr(i.ra()));
            set.write(gpr(i.rd()));
        }
        And | Andc | Eqv | Nand | Nor | Or | Orc | Xor | Slw | Srw | Sld | Srd | Sraw | Srad
        | Rlwnm | Rldcl | Rldcr => {
            set.read(gpr(i.rs()));
            set.read(gpr(i.rb()));
            set.write(gpr(i.ra()));
        }
        Srawi | Sradi | Cntlzw | Cntlzd | Extsb | Extsh | Extsw | AndiRc | AndisRc | Ori
        | Oris | Xori | Xoris | Rlwinm | Rldicl | Rldicr | Rldic => {
            set.read(gpr(i.rs()));
            set.write(gpr(i.ra()));
        }
        Rlwimi | Rldimi => {
            set.read(gpr(i.rs()));
            set.read_write(gpr(i.ra()));
        }
        Cmp | Cmpl => {
            set.read(gpr(i.ra()));
            set.read(gpr(i.rb()));
            set.write(cr(i.crfd()));
            set.read(Reg::Xer);
        }
        Cmpi | Cmpli => {
            set.read(gpr(i.ra()));
            set.write(cr(i.crfd()));
            set.read(Reg::Xer);
        }
        _ => {}
    }

    match op {
        Adde | Addme | Addze | Subfe | Subfme | Subfze => set.read_write(Reg::Xer),
        Addc | Subfc | Addic | AddicRc | Subfic | Sraw | Srawi | Srad | Sradi => {
            set.write(Reg::Xer);
        }
        _ => {}
    }
    if xo_form && i.oe() {
        // OV is set and SO accumulates.
        set.read_write(Reg::Xer);
    }
    // D-form immediates have no Rc bit.
    let d_form = matches!(
        op,
        Addi | Addis | Addic | Mulli | Subfic | Ori | Oris | Xori | Xoris | Cmpi | Cmpli
    );
    let records = matches!(op, AddicRc | AndiRc | AndisRc)
        || (i.rc() && !d_form && !matches!(op, Cmp | Cmpl));
    if records {
        set.record_cr0();
    }
}

fn branch_condition(i: PpuInstr, set: &mut AccessSet, decrements: bool) {
    if decrements && i.bo() & 0x04 == 0 {
        set.read_write(Reg::Ctr);
    }
    if i.bo() & 0x10 == 0 {
        set.read(cr(i.bi() / 4));
    }
}

fn branch(op: PpuOpcode, i: PpuInstr, set: &mut AccessSet) {
    use PpuOpcode::*;

    match op {
        B => {}
        Bc => branch_condition(i, set, true),
        Bclr => {
            set.read(Reg::Lr);
            branch_condition(i, set, true);
        }
        Bcctr => {
            set.read(Reg::Ctr);
            branch_condition(i, set, false);
        }
        Crand | Crandc | Creqv | Crnand | Crnor | Cror | Crorc | Crxor => {
            set.read(cr(i.crba() / 4));
            set.read(cr(i.crbb() / 4));
            // Single bit of the destination field changes.
            set.read_write(cr(i.crbd() / 4));
        }
        Mcrf => {
            set.read(cr(i.crfs()));
            set.write(cr(i.crfd()));
        }
        _ => {}
    }
    if op.is_branch() && i.lk() {
        set.write(Reg::Lr);
    }
}

fn memory(op: PpuOpcode, i: PpuInstr, set: &mut AccessSet) {
    use PpuOpcode::*;

    let (ra, rb) = (i.ra(), i.rb());
    let (x_form, update) = match op {
        Lbz | Lha | Lhz | Lwz | Lwa | Ld | Lfd | Lfs | Stb | Sth | Stw | Std | Stfd | Stfs
        | Lmw | Stmw => (false, false),
        Lbzu | Lhau | Lhzu | Lwzu | Ldu | Lfdu | Lfsu | Stbu | Sthu | Stwu | Stdu | Stfdu
        | Stfsu => (false, true),
        Lbzux | Lhaux | Lhzux | Lwaux | Lwzux | Ldux | Lfdux | Lfsux | Stbux | Sthux | Stwux
        | Stdux | Stfdux | Stfsux => (true, true),
        _ => (true, false),
    };
    if update {
        set.read_write(gpr(ra));
    } else {
        set.read_base(ra);
    }
    if x_form {
        set.read(gpr(rb));
    }

    match op {
        Lbz | Lbzu | Lbzux | Lbzx | Lha | Lhau | Lhaux | Lhax | Lhbrx | Lhz | Lhzu | Lhzux
        | Lhzx | Lwa | Lwaux | Lwax | Lwbrx | Lwz | Lwzu | Lwzux | Lwzx | Ld | Ldbrx | Ldu
        | Ldux | Ldx => {
            set.read(Reg::Memory);
            set.write(gpr(i.rd()));
        }
        Lwarx | Ldarx => {
            set.read(Reg::Memory);
            set.write(gpr(i.rd()));
        }
        Lmw => {
            set.read(Reg::Memory);
            for r in i.rd()..32 {
                set.write(gpr(r));
            }
        }
        Stb | Stbu | Stbux | Stbx | Sth | Sthbrx | Sthu | Sthux | Sthx | Stw | Stwbrx | Stwu
        | Stwux | Stwx | Std | Stdbrx | Stdu | Stdux | Stdx => {
            set.read(gpr(i.rs()));
            set.write(Reg::Memory);
        }
        Stmw => {
            for r in i.rs()..32 {
                set.read(gpr(r));
            }
            set.write(Reg::Memory);
        }
        StwcxRc | StdcxRc => {
            set.read(gpr(i.rs()));
            set.read_write(Reg::Memory);
            set.record_cr0();
        }
        Lfd | Lfdu | Lfdux | Lfdx | Lfs | Lfsu | Lfsux | Lfsx => {
            set.read(Reg::Memory);
            set.write(fpr(i.rd()));
        }
        Stfd | Stfdu | Stfdux | Stfdx | Stfiwx | Stfs | Stfsu | Stfsux | Stfsx => {
            set.read(fpr(i.rs()));
            set.write(Reg::Memory);
        }
        Lvx => {
            set.read(Reg::Memory);
            set.write(vr(i.rd()));
        }
        Stvx => {
            set.read(vr(i.rs()));
            set.write(Reg::Memory);
        }
        Dcbz => set.write(Reg::Memory),
        _ => {}
    }
}

fn float(op: PpuOpcode, i: PpuInstr, set: &mut AccessSet) {
    use PpuOpcode::*;

    let (fra, frb, frc) = (fpr(i.ra()), fpr(i.rb()), fpr(i.rc_reg()));
    match op {
        Fadd | Fadds | Fsub | Fsubs | Fdiv | Fdivs => {
            set.read(fra);
            set.read(frb);
        }
        Fmul | Fmuls => {
            set.read(fra);
            set.read(frc);
        }
        Fmadd | Fmadds | Fmsub | Fmsubs | Fnmadd | Fnmadds | Fnmsub | Fnmsubs | Fsel => {
            set.read(fra);
            set.read(frb);
            set.read(frc);
        }
        Fabs | Fcfid | Fctid | Fctidz | Fctiw | Fctiwz | Fmr | Fnabs | Fneg | Fres | Frsp
        | Frsqrte | Fsqrt | Fsqrts => set.read(frb),
        Fcmpu | Fcmpo => {
            set.read(fra);
            set.read(frb);
            set.write(cr(i.crfd()));
        }
        Mffs => set.read(Reg::Fpscr),
        Mtfsf => {
            set.read(frb);
            set.read_write(Reg::Fpscr);
        }
        Mtfsfi | Mtfsb0 | Mtfsb1 => set.read_write(Reg::Fpscr),
        Mcrfs => {
            set.read_write(Reg::Fpscr);
            set.write(cr(i.crfd()));
        }
        _ => {}
    }
    if !matches!(op, Fcmpu | Fcmpo | Mtfsf | Mtfsfi | Mtfsb0 | Mtfsb1 | Mcrfs) {
        set.write(fpr(i.rd()));
    }
    if i.rc() && !matches!(op, Fcmpu | Fcmpo | Mcrfs) {
        set.write(Reg::Cr(1));
        set.read(Reg::Fpscr);
    }
}

fn vector(op: PpuOpcode, i: PpuInstr, set: &mut AccessSet) {
    use PpuOpcode::*;

    match op {
        Vmaddfp | Vperm | Vsel => {
            set.read(vr(i.ra()));
            set.read(vr(i.rb()));
            set.read(vr(i.rc_reg()));
        }
        Vspltisw => {}
        _ => {
            set.read(vr(i.ra()));
            set.read(vr(i.rb()));
        }
    }
    set.write(vr(i.rd()));
}

fn system(op: PpuOpcode, i: PpuInstr, set: &mut AccessSet) {
    use PpuOpcode::*;

    match op {
        Sc => {
            set.read(Reg::Gpr(11));
            for r in 3..=10 {
                set.read(Reg::Gpr(r));
            }
            set.write(Reg::Gpr(3));
            set.read_write(Reg::Memory);
        }
        Td | Tw => {
            set.read(gpr(i.ra()));
            set.read(gpr(i.rb()));
        }
        Tdi | Twi => set.read(gpr(i.ra())),
        Mfcr => {
            for field in 0..8 {
                set.read(Reg::Cr(field));
            }
            set.write(gpr(i.rd()));
        }
        Mtcrf => {
            set.read(gpr(i.rs()));
            for field in 0..8 {
                if i.crm() & (0x80 >> field) != 0 {
                    set.write(cr(field));
                }
            }
        }
        Mfspr => {
            if let Some(reg) = spr_reg(i.spr()) {
                set.read(reg);
            }
            set.write(gpr(i.rd()));
        }
        Mtspr => {
            set.read(gpr(i.rs()));
            if let Some(reg) = spr_reg(i.spr()) {
                set.write(reg);
            }
        }
        Mftb | Mfmsr => set.write(gpr(i.rd())),
        _ => {}
    }
}

const fn spr_reg(n: u32) -> Option<Reg> {
    match n {
        spr::XER => Some(Reg::Xer),
        spr::LR => Some(Reg::Lr),
        spr::CTR => Some(Reg::Ctr),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use cellrec_asm::PpcAssembler;

    use super::*;

    fn one(f: impl FnOnce(&mut PpcAssembler<'_>) -> cellrec_asm::Result<()>) -> AccessSet {
        let mut mem = [0u8; 4];
        let mut asm = PpcAssembler::new(&mut mem);
        f(&mut asm).unwrap();
        asm.finalize().unwrap();
        let word = u32::from_be_bytes(mem);
        analyze(PpuInstr(word)).unwrap()
    }

    #[test]
    fn test_plain_add() {
        let set = one(|a| a.add(3, 4, 5));
        assert_eq!(set.to_string(), "r3:w r4:r r5:r");
    }

    #[test]
    fn test_record_and_overflow_forms() {
        let set = one(|a| a.addo_rc(3, 4, 5));
        assert!(set.writes(Reg::Cr(0)));
        assert_eq!(set.get(Reg::Xer), Access::READ_WRITE);

        let set = one(|a| a.adde(3, 4, 5));
        assert_eq!(set.get(Reg::Xer), Access::READ_WRITE);
        assert!(!set.writes(Reg::Cr(0)));

        let set = one(|a| a.andi_rc(3, 4, 0xFF));
        assert!(set.writes(Reg::Cr(0)));
        assert!(set.reads(Reg::Gpr(4)) && set.writes(Reg::Gpr(3)));
    }

    #[test]
    fn test_addi_reads_zero_not_r0() {
        let set = one(|a| a.li(3, 5));
        assert_eq!(set.to_string(), "r3:w");
        let set = one(|a| a.addi(3, 1, -16));
        assert!(set.reads(Reg::Gpr(1)));
    }

    #[test]
    fn test_insert_reads_destination() {
        let set = one(|a| a.rlwimi(3, 4, 8, 0, 23));
        assert_eq!(set.get(Reg::Gpr(3)), Access::READ_WRITE);
    }

    #[test]
    fn test_branch_effects() {
        let set = one(|a| a.bl(0x100));
        assert_eq!(set.to_string(), "lr:w");

        // bdnz: decrements CTR, ignores CR.
        let set = one(|a| a.bc(16, 0, 8));
        assert_eq!(set.get(Reg::Ctr), Access::READ_WRITE);
        assert!(!set.reads(Reg::Cr(0)));

        let set = one(|a| a.beq(6, 8));
        assert!(set.reads(Reg::Cr(6)));
        assert!(!set.reads(Reg::Ctr));

        let set = one(|a| a.blr());
        assert!(set.reads(Reg::Lr) && !set.writes(Reg::Lr));

        let set = one(|a| a.bctrl());
        assert!(set.reads(Reg::Ctr) && set.writes(Reg::Lr));
    }

    #[test]
    fn test_memory_effects() {
        let set = one(|a| a.stwu(1, -32, 1));
        assert_eq!(set.get(Reg::Gpr(1)), Access::READ_WRITE);
        assert!(set.writes(Reg::Memory));

        let set = one(|a| a.lwzx(3, 0, 5));
        assert!(!set.reads(Reg::Gpr(0)));
        assert!(set.reads(Reg::Gpr(5)) && set.reads(Reg::Memory));

        let set = one(|a| a.lmw(29, 8, 1));
        assert!(set.writes(Reg::Gpr(29)) && set.writes(Reg::Gpr(31)));
        assert!(!set.writes(Reg::Gpr(28)));

        let set = one(|a| a.stwcx_rc(3, 4, 5));
        assert!(set.writes(Reg::Cr(0)));
        assert_eq!(set.get(Reg::Memory), Access::READ_WRITE);
    }

    #[test]
    fn test_float_and_vector_effects() {
        let set = one(|a| a.fmadd_rc(1, 2, 3, 4));
        assert!(set.reads(Reg::Fpr(2)) && set.reads(Reg::Fpr(3)) && set.reads(Reg::Fpr(4)));
        assert!(set.writes(Reg::Fpr(1)));
        assert!(set.writes(Reg::Cr(1)));

        let set = one(|a| a.fcmpu(7, 1, 2));
        assert!(set.writes(Reg::Cr(7)));
        assert!(!set.writes(Reg::Fpr(0)));

        let set = one(|a| a.vsel(2, 3, 4, 5));
        assert_eq!(set.len(), 4);
        let set = one(|a| a.vspltisw(2, -1));
        assert_eq!(set.to_string(), "v2:w");
    }

    #[test]
    fn test_spr_moves() {
        let set = one(|a| a.mflr(0));
        assert_eq!(set.to_string(), "r0:w lr:r");
        let set = one(|a| a.mtctr(9));
        assert_eq!(set.to_string(), "r9:r ctr:w");
        let set = one(|a| a.mtcrf(0x81, 3));
        assert!(set.writes(Reg::Cr(0)) && set.writes(Reg::Cr(7)));
        assert!(!set.writes(Reg::Cr(1)));
    }

    #[test]
    fn test_unknown_word() {
        assert_eq!(analyze(PpuInstr(0)), Err(AnalyzeError::Unknown(0)));
    }
}
