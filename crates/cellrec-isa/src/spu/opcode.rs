//! SPU opcode enumeration and its static metadata table.

use crate::types::{OpClass, OpInfo};

macro_rules! spu_opcodes {
    ($($variant:ident => $mnemonic:literal, $class:ident;)*) => {
        /// Decoded SPU opcode.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u16)]
        pub enum SpuOpcode {
            $($variant,)*
        }

        /// Opcode metadata, indexed by the `SpuOpcode` discriminant.
        pub static SPU_OP_INFO: &[OpInfo<SpuOpcode>] = &[
            $(OpInfo {
                opcode: SpuOpcode::$variant,
                mnemonic: $mnemonic,
                class: OpClass::$class,
            },)*
        ];
    };
}

spu_opcodes! {
    // ===== Constant formation =====
    Il => "il", Integer;
    Ilh => "ilh", Integer;
    Ilhu => "ilhu", Integer;
    Ila => "ila", Integer;
    Iohl => "iohl", Integer;

    // ===== Integer and logical =====
    A => "a", Integer;
    Ai => "ai", Integer;
    Sf => "sf", Integer;
    Sfi => "sfi", Integer;
    And => "and", Integer;
    Andc => "andc", Integer;
    Andi => "andi", Integer;
    Or => "or", Integer;
    Ori => "ori", Integer;
    Xor => "xor", Integer;
    Nor => "nor", Integer;
    Selb => "selb", Integer;
    Shli => "shli", Integer;
    Ceq => "ceq", Integer;
    Ceqi => "ceqi", Integer;
    Cgt => "cgt", Integer;
    Cgti => "cgti", Integer;
    Clgt => "clgt", Integer;
    Clgti => "clgti", Integer;

    // ===== Local store =====
    Lqd => "lqd", Memory;
    Lqx => "lqx", Memory;
    Lqa => "lqa", Memory;
    Stqd => "stqd", Memory;
    Stqx => "stqx", Memory;
    Stqa => "stqa", Memory;

    // ===== Branches =====
    Br => "br", Branch;
    Bra => "bra", Branch;
    Brsl => "brsl", Branch;
    Brasl => "brasl", Branch;
    Brz => "brz", Branch;
    Brnz => "brnz", Branch;
    Bi => "bi", Branch;
    Bisl => "bisl", Branch;
    Biz => "biz", Branch;
    Binz => "binz", Branch;

    // ===== Control =====
    Stop => "stop", System;
    Nop => "nop", System;
    Lnop => "lnop", System;
    Hbr => "hbr", System;
    Hbra => "hbra", System;
    Hbrr => "hbrr", System;
}

impl SpuOpcode {
    /// Static metadata for this opcode.
    #[inline]
    pub fn info(self) -> &'static OpInfo<Self> {
        &SPU_OP_INFO[self as usize]
    }

    #[inline]
    pub fn mnemonic(self) -> &'static str {
        self.info().mnemonic
    }

    #[inline]
    pub fn class(self) -> OpClass {
        self.info().class
    }

    /// Whether this opcode transfers control or stops the SPU.
    pub const fn is_branch(self) -> bool {
        matches!(
            self,
            Self::Br
                | Self::Bra
                | Self::Brsl
                | Self::Brasl
                | Self::Brz
                | Self::Brnz
                | Self::Bi
                | Self::Bisl
                | Self::Biz
                | Self::Binz
                | Self::Stop
        )
    }

    pub fn from_mnemonic(mnemonic: &str) -> Option<Self> {
        SPU_OP_INFO
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
        for (i, info) in SPU_OP_INFO.iter().enumerate() {
            assert_eq!(info.opcode as usize, i, "{} out of order", info.mnemonic);
        }
    }

    #[test]
    fn test_mnemonic_lookup() {
        assert_eq!(SpuOpcode::from_mnemonic("selb"), Some(SpuOpcode::Selb));
        assert_eq!(SpuOpcode::from_mnemonic("lqd"), Some(SpuOpcode::Lqd));
        assert_eq!(SpuOpcode::from_mnemonic("bogus"), None);
        assert_eq!(SpuOpcode::Stqx.class(), OpClass::Memory);
        assert!(SpuOpcode::Stop.is_branch());
        assert_eq!(SpuOpcode::Brsl.class(), OpClass::Branch);
    }
}
