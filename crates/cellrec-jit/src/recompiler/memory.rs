//! Loads, stores, reservations, and cache control.

use cellrec_ir::{BinaryOp, CastOp, CmpOp, IrBuilder, Type, UnaryOp};
use cellrec_isa::PpuOpcode;

use super::Translator;
use crate::error::Result;
use crate::state::offsets;

/// Effective-address form of a memory instruction.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Addressing {
    /// `rA|0 + d`
    D,
    /// `rA|0 + ds`
    Ds,
    /// `rA|0 + rB`
    X,
}

/// Data cache line size cleared by `dcbz`.
const CACHE_LINE: u64 = 128;

/// Shape of an integer load.
struct Load {
    ty: Type,
    signed: bool,
    reversed: bool,
}

const fn load(ty: Type, signed: bool) -> Load {
    Load {
        ty,
        signed,
        reversed: false,
    }
}

const fn load_reversed(ty: Type) -> Load {
    Load {
        ty,
        signed: false,
        reversed: true,
    }
}

impl<B: IrBuilder> Translator<'_, B> {
    pub(super) fn memory(&mut self, op: PpuOpcode) -> Result<()> {
        use Addressing::{D, Ds, X};
        use PpuOpcode::*;

        let i = self.instr;
        match op {
            // ===== Integer loads =====
            Lbz => self.load_int(D, false, &load(Type::I8, false))?,
            Lbzu => self.load_int(D, true, &load(Type::I8, false))?,
            Lbzx => self.load_int(X, false, &load(Type::I8, false))?,
            Lbzux => self.load_int(X, true, &load(Type::I8, false))?,
            Lhz => self.load_int(D, false, &load(Type::I16, false))?,
            Lhzu => self.load_int(D, true, &load(Type::I16, false))?,
            Lhzx => self.load_int(X, false, &load(Type::I16, false))?,
            Lhzux => self.load_int(X, true, &load(Type::I16, false))?,
            Lha => self.load_int(D, false, &load(Type::I16, true))?,
            Lhau => self.load_int(D, true, &load(Type::I16, true))?,
            Lhax => self.load_int(X, false, &load(Type::I16, true))?,
            Lhaux => self.load_int(X, true, &load(Type::I16, true))?,
            Lwz => self.load_int(D, false, &load(Type::I32, false))?,
            Lwzu => self.load_int(D, true, &load(Type::I32, false))?,
            Lwzx => self.load_int(X, false, &load(Type::I32, false))?,
            Lwzux => self.load_int(X, true, &load(Type::I32, false))?,
            Lwa => self.load_int(Ds, false, &load(Type::I32, true))?,
            Lwax => self.load_int(X, false, &load(Type::I32, true))?,
            Lwaux => self.load_int(X, true, &load(Type::I32, true))?,
            Ld => self.load_int(Ds, false, &load(Type::I64, false))?,
            Ldu => self.load_int(Ds, true, &load(Type::I64, false))?,
            Ldx => self.load_int(X, false, &load(Type::I64, false))?,
            Ldux => self.load_int(X, true, &load(Type::I64, false))?,
            Lhbrx => self.load_int(X, false, &load_reversed(Type::I16))?,
            Lwbrx => self.load_int(X, false, &load_reversed(Type::I32))?,
            Ldbrx => self.load_int(X, false, &load_reversed(Type::I64))?,

            // ===== Integer stores =====
            Stb => self.store_int(D, false, Type::I8, false)?,
            Stbu => self.store_int(D, true, Type::I8, false)?,
            Stbx => self.store_int(X, false, Type::I8, false)?,
            Stbux => self.store_int(X, true, Type::I8, false)?,
            Sth => self.store_int(D, false, Type::I16, false)?,
            Sthu => self.store_int(D, true, Type::I16, false)?,
            Sthx => self.store_int(X, false, Type::I16, false)?,
            Sthux => self.store_int(X, true, Type::I16, false)?,
            Stw => self.store_int(D, false, Type::I32, false)?,
            Stwu => self.store_int(D, true, Type::I32, false)?,
            Stwx => self.store_int(X, false, Type::I32, false)?,
            Stwux => self.store_int(X, true, Type::I32, false)?,
            Std => self.store_int(Ds, false, Type::I64, false)?,
            Stdu => self.store_int(Ds, true, Type::I64, false)?,
            Stdx => self.store_int(X, false, Type::I64, false)?,
            Stdux => self.store_int(X, true, Type::I64, false)?,
            Sthbrx => self.store_int(X, false, Type::I16, true)?,
            Stwbrx => self.store_int(X, false, Type::I32, true)?,
            Stdbrx => self.store_int(X, false, Type::I64, true)?,

            Lmw => {
                let ea = self.effective_address(D, false);
                for (k, r) in (i.rd()..32).enumerate() {
                    let addr = self.bin_imm(BinaryOp::Add, ea, 4 * k as u64);
                    let word = self.load_mem(addr, Type::I32)?;
                    let value = self.zext(word, Type::I64);
                    self.set_gpr(r, value);
                }
            }
            Stmw => {
                let ea = self.effective_address(D, false);
                for (k, r) in (i.rs()..32).enumerate() {
                    let addr = self.bin_imm(BinaryOp::Add, ea, 4 * k as u64);
                    let value = self.gpr(r);
                    let word = self.trunc(value, Type::I32);
                    self.store_mem(addr, word)?;
                }
            }

            // ===== Reservations =====
            Lwarx | Ldarx => {
                let ty = if op == Lwarx { Type::I32 } else { Type::I64 };
                let ea = self.effective_address(X, false);
                let value = self.load_mem(ea, ty)?;
                let value = if ty == Type::I64 { value } else { self.zext(value, Type::I64) };
                self.store_state(offsets::RESERVE_ADDR, ea);
                self.store_state(offsets::RESERVE_VALUE, value);
                let held = self.int(Type::I8, 1);
                self.store_state(offsets::RESERVED, held);
                self.set_gpr(i.rd(), value);
            }
            StwcxRc | StdcxRc => {
                let ty = if op == StwcxRc { Type::I32 } else { Type::I64 };
                self.store_conditional(ty)?;
            }

            // ===== Cache control =====
            Dcbf | Dcbst | Dcbt | Dcbtst | Icbi => {}
            Dcbz => {
                let ea = self.effective_address(X, false);
                let line = self.bin_imm(BinaryOp::And, ea, !(CACHE_LINE - 1));
                let zero = self.int(Type::I128, 0);
                for offset in (0..CACHE_LINE).step_by(16) {
                    let addr = self.bin_imm(BinaryOp::Add, line, offset);
                    self.store_mem(addr, zero)?;
                }
            }

            // ===== Floating point =====
            Lfs | Lfsu | Lfsx | Lfsux | Lfd | Lfdu | Lfdx | Lfdux => {
                let single = matches!(op, Lfs | Lfsu | Lfsx | Lfsux);
                let mode = if matches!(op, Lfsx | Lfsux | Lfdx | Lfdux) { X } else { D };
                let update = matches!(op, Lfsu | Lfsux | Lfdu | Lfdux);
                let ea = self.effective_address(mode, update);
                let value = if single {
                    let value = self.load_mem(ea, Type::F32)?;
                    self.cast(CastOp::FpExt, value, Type::F64)
                } else {
                    self.load_mem(ea, Type::F64)?
                };
                self.set_fpr(i.rd(), value);
                self.write_back(update, ea);
            }
            Stfs | Stfsu | Stfsx | Stfsux | Stfd | Stfdu | Stfdx | Stfdux => {
                let single = matches!(op, Stfs | Stfsu | Stfsx | Stfsux);
                let mode = if matches!(op, Stfsx | Stfsux | Stfdx | Stfdux) { X } else { D };
                let update = matches!(op, Stfsu | Stfsux | Stfdu | Stfdux);
                let ea = self.effective_address(mode, update);
                let value = self.fpr(i.rs());
                let value = if single {
                    self.cast(CastOp::FpTrunc, value, Type::F32)
                } else {
                    value
                };
                self.store_mem(ea, value)?;
                self.write_back(update, ea);
            }
            Stfiwx => {
                let ea = self.effective_address(X, false);
                let value = self.fpr(i.rs());
                let bits = self.cast(CastOp::Bitcast, value, Type::I64);
                let word = self.trunc(bits, Type::I32);
                self.store_mem(ea, word)?;
            }

            // ===== Vector =====
            Lvx | Stvx => {
                let ea = self.effective_address(X, false);
                let aligned = self.bin_imm(BinaryOp::And, ea, !0xF);
                if op == Lvx {
                    let value = self.load_mem(aligned, Type::I128)?;
                    self.set_vr(i.rd(), value);
                } else {
                    let value = self.vr(i.rs());
                    self.store_mem(aligned, value)?;
                }
            }
            _ => return Err(self.unimplemented(op)),
        }
        Ok(())
    }

    /// Effective address of the current instruction. Update forms use `rA`
    /// itself as the base, never zero.
    fn effective_address(&mut self, mode: Addressing, update: bool) -> B::Value {
        let i = self.instr;
        let base = if update {
            self.gpr(i.ra())
        } else {
            self.gpr_or_zero(i.ra())
        };
        let offset = match mode {
            Addressing::D => self.i64c(i.simm().cast_unsigned()),
            Addressing::Ds => self.i64c(i.ds().cast_unsigned()),
            Addressing::X => self.gpr(i.rb()),
        };
        self.bin(BinaryOp::Add, base, offset)
    }

    fn write_back(&mut self, update: bool, ea: B::Value) {
        if update {
            self.set_gpr(self.instr.ra(), ea);
        }
    }

    fn load_int(&mut self, mode: Addressing, update: bool, shape: &Load) -> Result<()> {
        let ea = self.effective_address(mode, update);
        let mut value = self.load_mem(ea, shape.ty)?;
        if shape.reversed {
            value = self.un(UnaryOp::Bswap, value);
        }
        if shape.ty != Type::I64 {
            value = if shape.signed {
                self.sext(value, Type::I64)
            } else {
                self.zext(value, Type::I64)
            };
        }
        self.set_gpr(self.instr.rd(), value);
        self.write_back(update, ea);
        Ok(())
    }

    fn store_int(&mut self, mode: Addressing, update: bool, ty: Type, reversed: bool) -> Result<()> {
        let ea = self.effective_address(mode, update);
        let mut value = self.gpr(self.instr.rs());
        if ty != Type::I64 {
            value = self.trunc(value, ty);
        }
        if reversed {
            value = self.un(UnaryOp::Bswap, value);
        }
        self.store_mem(ea, value)?;
        self.write_back(update, ea);
        Ok(())
    }

    /// `stwcx.`/`stdcx.`: store only while a reservation is held, covers
    /// the address, and memory holds the reserved value. The reservation
    /// is released either way and CR0[EQ] reports success.
    fn store_conditional(&mut self, ty: Type) -> Result<()> {
        let ea = self.effective_address(Addressing::X, false);
        let held = self.load_state(offsets::RESERVED, Type::I8);
        let none = self.int(Type::I8, 0);
        let held = self.cmp(CmpOp::Ne, held, none);
        let reserved_addr = self.load_state(offsets::RESERVE_ADDR, Type::I64);
        let reserved_value = self.load_state(offsets::RESERVE_VALUE, Type::I64);
        let current = self.load_mem(ea, ty)?;
        let current = if ty == Type::I64 { current } else { self.zext(current, Type::I64) };

        let same_addr = self.cmp(CmpOp::Eq, reserved_addr, ea);
        let same_value = self.cmp(CmpOp::Eq, reserved_value, current);
        let matches = self.bin(BinaryOp::And, same_addr, same_value);
        let success = self.bin(BinaryOp::And, held, matches);

        let value = self.gpr(self.instr.rs());
        let value = if ty == Type::I64 { value } else { self.trunc(value, ty) };
        let store = self.b.create_block(&format!("stcx_store_{:x}", self.pc));
        let done = self.b.create_block(&format!("stcx_done_{:x}", self.pc));
        self.b.br_cond(success, store, done);

        self.b.set_insert_point(store);
        self.store_mem(ea, value)?;
        self.b.br(done);

        self.b.set_insert_point(done);
        let released = self.int(Type::I8, 0);
        self.store_state(offsets::RESERVED, released);
        let lt = self.int(Type::I8, 0);
        let gt = self.int(Type::I8, 0);
        let eq = self.flag_byte(success);
        let so = self.xer(crate::registers::xer::SO);
        self.set_cr_field(0, [lt, gt, eq, so]);
        Ok(())
    }
}
