//! PPU opcode enumeration and its static metadata table.

use crate::types::{OpClass, OpInfo};

macro_rules! ppu_opcodes {
    ($($variant:ident => $mnemonic:literal, $class:ident;)*) => {
        /// Decoded PPU opcode.
        ///
        /// Record (`.`) and overflow (`o`) variants share one opcode; the
        /// instruction's `rc`/`oe` bits select the behavior.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u16)]
        pub enum PpuOpcode {
            $($variant,)*
        }

        /// Opcode metadata, indexed by the `PpuOpcode` discriminant.
        pub static PPU_OP_INFO: &[OpInfo<PpuOpcode>] = &[
            $(OpInfo {
                opcode: PpuOpcode::$variant,
                mnemonic: $mnemonic,
                class: OpClass::$class,
            },)*
        ];
    };
}

ppu_opcodes! {
    // ===== Integer =====
    Add => "add", Integer;
    Addc => "addc", Integer;
    Adde => "adde", Integer;
    Addi => "addi", Integer;
    Addic => "addic", Integer;
    AddicRc => "addic.", Integer;
    Addis => "addis", Integer;
    Addme => "addme", Integer;
    Addze => "addze", Integer;
    And => "and", Integer;
    Andc => "andc", Integer;
    AndiRc => "andi.", Integer;
    AndisRc => "andis.", Integer;
    Cmp => "cmp", Integer;
    Cmpi => "cmpi", Integer;
    Cmpl => "cmpl", Integer;
    Cmpli => "cmpli", Integer;
    Cntlzd => "cntlzd", Integer;
    Cntlzw => "cntlzw", Integer;
    Divd => "divd", Integer;
    Divdu => "divdu", Integer;
    Divw => "divw", Integer;
    Divwu => "divwu", Integer;
    Eqv => "eqv", Integer;
    Extsb => "extsb", Integer;
    Extsh => "extsh", Integer;
    Extsw => "extsw", Integer;
    Mulhd => "mulhd", Integer;
    Mulhdu => "mulhdu", Integer;
    Mulhw => "mulhw", Integer;
    Mulhwu => "mulhwu", Integer;
    Mulld => "mulld", Integer;
    Mulli => "mulli", Integer;
    Mullw => "mullw", Integer;
    Nand => "nand", Integer;
    Neg => "neg", Integer;
    Nor => "nor", Integer;
    Or => "or", Integer;
    Orc => "orc", Integer;
    Ori => "ori", Integer;
    Oris => "oris", Integer;
    Rldcl => "rldcl", Integer;
    Rldcr => "rldcr", Integer;
    Rldic => "rldic", Integer;
    Rldicl => "rldicl", Integer;
    Rldicr => "rldicr", Integer;
    Rldimi => "rldimi", Integer;
    Rlwimi => "rlwimi", Integer;
    Rlwinm => "rlwinm", Integer;
    Rlwnm => "rlwnm", Integer;
    Sld => "sld", Integer;
    Slw => "slw", Integer;
    Srad => "srad", Integer;
    Sradi => "sradi", Integer;
    Sraw => "sraw", Integer;
    Srawi => "srawi", Integer;
    Srd => "srd", Integer;
    Srw => "srw", Integer;
    Subf => "subf", Integer;
    Subfc => "subfc", Integer;
    Subfe => "subfe", Integer;
    Subfic => "subfic", Integer;
    Subfme => "subfme", Integer;
    Subfze => "subfze", Integer;
    Xor => "xor", Integer;
    Xori => "xori", Integer;
    Xoris => "xoris", Integer;

    // ===== Branch and condition register =====
    B => "b", Branch;
    Bc => "bc", Branch;
    Bcctr => "bcctr", Branch;
    Bclr => "bclr", Branch;
    Crand => "crand", Branch;
    Crandc => "crandc", Branch;
    Creqv => "creqv", Branch;
    Crnand => "crnand", Branch;
    Crnor => "crnor", Branch;
    Cror => "cror", Branch;
    Crorc => "crorc", Branch;
    Crxor => "crxor", Branch;
    Mcrf => "mcrf", Branch;

    // ===== System =====
    Sc => "sc", System;
    Td => "td", System;
    Tdi => "tdi", System;
    Tw => "tw", System;
    Twi => "twi", System;
    Mfcr => "mfcr", System;
    Mtcrf => "mtcrf", System;
    Mfspr => "mfspr", System;
    Mtspr => "mtspr", System;
    Mftb => "mftb", System;
    Mfmsr => "mfmsr", System;
    Sync => "sync", System;
    Isync => "isync", System;
    Eieio => "eieio", System;

    // ===== Memory =====
    Lbz => "lbz", Memory;
    Lbzu => "lbzu", Memory;
    Lbzux => "lbzux", Memory;
    Lbzx => "lbzx", Memory;
    Lha => "lha", Memory;
    Lhau => "lhau", Memory;
    Lhaux => "lhaux", Memory;
    Lhax => "lhax", Memory;
    Lhbrx => "lhbrx", Memory;
    Lhz => "lhz", Memory;
    Lhzu => "lhzu", Memory;
    Lhzux => "lhzux", Memory;
    Lhzx => "lhzx", Memory;
    Lwa => "lwa", Memory;
    Lwaux => "lwaux", Memory;
    Lwax => "lwax", Memory;
    Lwbrx => "lwbrx", Memory;
    Lwz => "lwz", Memory;
    Lwzu => "lwzu", Memory;
    Lwzux => "lwzux", Memory;
    Lwzx => "lwzx", Memory;
    Ld => "ld", Memory;
    Ldbrx => "ldbrx", Memory;
    Ldu => "ldu", Memory;
    Ldux => "ldux", Memory;
    Ldx => "ldx", Memory;
    Lmw => "lmw", Memory;
    Lwarx => "lwarx", Memory;
    Ldarx => "ldarx", Memory;
    Stb => "stb", Memory;
    Stbu => "stbu", Memory;
    Stbux => "stbux", Memory;
    Stbx => "stbx", Memory;
    Sth => "sth", Memory;
    Sthbrx => "sthbrx", Memory;
    Sthu => "sthu", Memory;
    Sthux => "sthux", Memory;
    Sthx => "sthx", Memory;
    Stw => "stw", Memory;
    Stwbrx => "stwbrx", Memory;
    Stwu => "stwu", Memory;
    Stwux => "stwux", Memory;
    Stwx => "stwx", Memory;
    Std => "std", Memory;
    Stdbrx => "stdbrx", Memory;
    Stdu => "stdu", Memory;
    Stdux => "stdux", Memory;
    Stdx => "stdx", Memory;
    Stmw => "stmw", Memory;
    StwcxRc => "stwcx.", Memory;
    StdcxRc => "stdcx.", Memory;
    Dcbf => "dcbf", Memory;
    Dcbst => "dcbst", Memory;
    Dcbt => "dcbt", Memory;
    Dcbtst => "dcbtst", Memory;
    Dcbz => "dcbz", Memory;
    Icbi => "icbi", Memory;
    Lfd => "lfd", Memory;
    Lfdu => "lfdu", Memory;
    Lfdux => "lfdux", Memory;
    Lfdx => "lfdx", Memory;
    Lfs => "lfs", Memory;
    Lfsu => "lfsu", Memory;
    Lfsux => "lfsux", Memory;
    Lfsx => "lfsx", Memory;
    Stfd => "stfd", Memory;
    Stfdu => "stfdu", Memory;
    Stfdux => "stfdux", Memory;
    Stfdx => "stfdx", Memory;
    Stfiwx => "stfiwx", Memory;
    Stfs => "stfs", Memory;
    Stfsu => "stfsu", Memory;
    Stfsux => "stfsux", Memory;
    Stfsx => "stfsx", Memory;
    Lvx => "lvx", Memory;
    Stvx => "stvx", Memory;

    // ===== Floating point =====
    Fabs => "fabs", Float;
    Fadd => "fadd", Float;
    Fadds => "fadds", Float;
    Fcfid => "fcfid", Float;
    Fcmpo => "fcmpo", Float;
    Fcmpu => "fcmpu", Float;
    Fctid => "fctid", Float;
    Fctidz => "fctidz", Float;
    Fctiw => "fctiw", Float;
    Fctiwz => "fctiwz", Float;
    Fdiv => "fdiv", Float;
    Fdivs => "fdivs", Float;
    Fmadd => "fmadd", Float;
    Fmadds => "fmadds", Float;
    Fmr => "fmr", Float;
    Fmsub => "fmsub", Float;
    Fmsubs => "fmsubs", Float;
    Fmul => "fmul", Float;
    Fmuls => "fmuls", Float;
    Fnabs => "fnabs", Float;
    Fneg => "fneg", Float;
    Fnmadd => "fnmadd", Float;
    Fnmadds => "fnmadds", Float;
    Fnmsub => "fnmsub", Float;
    Fnmsubs => "fnmsubs", Float;
    Fres => "fres", Float;
    Frsp => "frsp", Float;
    Frsqrte => "frsqrte", Float;
    Fsel => "fsel", Float;
    Fsqrt => "fsqrt", Float;
    Fsqrts => "fsqrts", Float;
    Fsub => "fsub", Float;
    Fsubs => "fsubs", Float;
    Mcrfs => "mcrfs", Float;
    Mffs => "mffs", Float;
    Mtfsb0 => "mtfsb0", Float;
    Mtfsb1 => "mtfsb1", Float;
    Mtfsf => "mtfsf", Float;
    Mtfsfi => "mtfsfi", Float;

    // ===== Vector =====
    Vaddubm => "vaddubm", Vector;
    Vadduhm => "vadduhm", Vector;
    Vadduwm => "vadduwm", Vector;
    Vand => "vand", Vector;
    Vandc => "vandc", Vector;
    Vmaddfp => "vmaddfp", Vector;
    Vnor => "vnor", Vector;
    Vor => "vor", Vector;
    Vperm => "vperm", Vector;
    Vsel => "vsel", Vector;
    Vspltisw => "vspltisw", Vector;
    Vsubuwm => "vsubuwm", Vector;
    Vxor => "vxor", Vector;
}

impl PpuOpcode {
    /// Static metadata for this opcode.
    #[inline]
    pub fn info(self) -> &'static OpInfo<Self> {
        &PPU_OP_INFO[self as usize]
    }

    /// Base mnemonic (without `.`/`o` suffixes).
    #[inline]
    pub fn mnemonic(self) -> &'static str {
        self.info().mnemonic
    }

    /// Opcode class.
    #[inline]
    pub fn class(self) -> OpClass {
        self.info().class
    }

    /// Whether this opcode writes the link register or ends a block.
    pub const fn is_branch(self) -> bool {
        matches!(self, Self::B | Self::Bc | Self::Bclr | Self::Bcctr)
    }

    /// Look up an opcode by its base mnemonic.
    pub fn from_mnemonic(mnemonic: &str) -> Option<Self> {
        PPU_OP_INFO
            .iter()
            .find(|info| info.mnemonic == mnemonic)
            .map(|info| info.opcode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_indexed_by_discriminant() {
        for (i, info) in PPU_OP_INFO.iter().enumerate() {
            assert_eq!(info.opcode as usize, i, "{} out of order", info.mnemonic);
        }
    }

    #[test]
    fn test_mnemonic_lookup() {
        assert_eq!(PpuOpcode::from_mnemonic("rlwinm"), Some(PpuOpcode::Rlwinm));
        assert_eq!(PpuOpcode::from_mnemonic("stwcx."), Some(PpuOpcode::StwcxRc));
        assert_eq!(PpuOpcode::from_mnemonic("bogus"), None);
        assert_eq!(PpuOpcode::Lwz.class(), OpClass::Memory);
    }
}
