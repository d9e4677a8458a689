//! Quadword loads and stores. Local-store addresses wrap at the limit and
//! ignore their low four bits.

use cellrec_ir::{BinaryOp, CastOp, Endian, IrBuilder, Type};
use cellrec_isa::SpuOpcode;

use super::{LSLR, SpuTranslator};
use crate::error::Result;

/// Mask applied to quadword effective addresses.
const QUADWORD_MASK: u32 = LSLR & !0xF;

impl<B: IrBuilder> SpuTranslator<'_, B> {
    pub(super) fn memory(&mut self, op: SpuOpcode) -> Result<()> {
        use SpuOpcode::*;

        let i = self.instr;
        let (rt, ra, rb) = (i.rt(), i.ra(), i.rb());
        let ea = match op {
            Lqd | Stqd => {
                #[allow(clippy::cast_sign_loss)]
                let offset = (i.i10() << 4) as u32;
                let base = self.reg_word(ra);
                let offset = self.b.const_int(Type::I32, u64::from(offset));
                self.bin(BinaryOp::Add, base, offset)
            }
            Lqx | Stqx => {
                let (a, b) = (self.reg_word(ra), self.reg_word(rb));
                self.bin(BinaryOp::Add, a, b)
            }
            Lqa | Stqa => {
                #[allow(clippy::cast_sign_loss)]
                let addr = (i.i16() << 2) as u32;
                self.b.const_int(Type::I32, u64::from(addr))
            }
            _ => return Err(self.unimplemented(op)),
        };
        let addr = self.ls_addr(ea);
        if matches!(op, Lqd | Lqx | Lqa) {
            let value = self.b.load(addr, Type::I128, Endian::Big);
            self.set_reg(rt, value);
        } else {
            let value = self.reg(rt);
            self.b.store(addr, value, Endian::Big);
        }
        Ok(())
    }

    /// Host address of the quadword holding the `I32` local-store address `ea`.
    fn ls_addr(&mut self, ea: B::Value) -> B::Value {
        let mask = self.b.const_int(Type::I32, u64::from(QUADWORD_MASK));
        let ea = self.bin(BinaryOp::And, ea, mask);
        let ea = self.b.cast(CastOp::ZExt, ea, Type::I64);
        self.bin(BinaryOp::Add, self.local_store, ea)
    }
}
