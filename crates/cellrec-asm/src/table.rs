//! Mnemonic table types and operand assignment for [`emit`] surfaces.
//!
//! An [`OpDef`] pairs a mnemonic with its form, base opcode, and the
//! ordered list of [`Field`]s its assembly syntax names. Operands are
//! checked against their field and collected into [`Slots`], which the
//! target's form dispatcher hands to the form emitter.
//!
//! [`emit`]: crate::PpcAssembler::emit

use crate::error::{EncodeError, Result};
use crate::forms::{Form, uimm};
use crate::label::{FixupKind, Label};

/// One assembly operand.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operand {
    Reg(u32),
    Imm(i64),
    Label(Label),
}

impl From<Label> for Operand {
    fn from(label: Label) -> Self {
        Self::Label(label)
    }
}

/// Branch destination for typed branch methods. Immediates are byte
/// displacements, or byte addresses for absolute forms.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    Imm(i64),
    Label(Label),
}

impl From<Label> for Target {
    fn from(label: Label) -> Self {
        Self::Label(label)
    }
}

impl From<i64> for Target {
    fn from(value: i64) -> Self {
        Self::Imm(value)
    }
}

/// A syntax position and the instruction field it fills.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    // PPC registers (GPR, FPR, VR share the 5-bit slots).
    Rd,
    Ra,
    Rb,
    Rc,
    // PPC immediates
    Simm,
    Uimm,
    /// D-form displacement in `d(rA)` syntax.
    Disp,
    /// DS-form displacement, word aligned.
    Ds,
    Li,
    Bd,
    Bo,
    Bi,
    Bh,
    Crfd,
    Crfs,
    L,
    To,
    Crbd,
    Crba,
    Crbb,
    Spr,
    Crm,
    Sh,
    Mb,
    Me,
    Sh6,
    Mb6,
    Vsimm,
    // SPU
    Rt,
    SpuRa,
    SpuRb,
    SpuRc,
    I7,
    I8,
    I10,
    I16,
    U16,
    I18,
    /// RI16 branch target, relative.
    Rel16,
    /// RI16 branch target, absolute.
    Abs16,
    // AArch64 (index 31 is `sp` or the zero register)
    Xd,
    Xn,
    Xm,
    Xa,
    /// Second register of a pair.
    Xt2,
    /// Add/sub immediate, optionally a multiple of 4096.
    Imm12,
    /// Logical bitmask immediate.
    Bitmask,
    Imm16,
    /// Move-wide `lsl` amount.
    Hw,
    Immr,
    Imms,
    Cond,
    /// Byte offset of `[xn, #off]`.
    MemOff,
    /// `b`/`bl` target.
    Rel26,
    /// `b.cond`/`cbz` target.
    Rel19,
}

impl Field {
    const fn expects(self) -> &'static str {
        match self {
            Self::Rd
            | Self::Ra
            | Self::Rb
            | Self::Rc
            | Self::Rt
            | Self::SpuRa
            | Self::SpuRb
            | Self::SpuRc
            | Self::Xd
            | Self::Xn
            | Self::Xm
            | Self::Xa
            | Self::Xt2 => "a register",
            Self::Li | Self::Bd | Self::Rel16 | Self::Abs16 | Self::Rel26 | Self::Rel19 => {
                "a label or displacement"
            }
            _ => "an immediate",
        }
    }

    const fn is_register(self) -> bool {
        matches!(
            self,
            Self::Rd
                | Self::Ra
                | Self::Rb
                | Self::Rc
                | Self::Rt
                | Self::SpuRa
                | Self::SpuRb
                | Self::SpuRc
                | Self::Xd
                | Self::Xn
                | Self::Xm
                | Self::Xa
                | Self::Xt2
        )
    }
}

/// Static description of one mnemonic.
#[derive(Clone, Copy, Debug)]
pub struct OpDef {
    pub mnemonic: &'static str,
    pub form: Form,
    pub opcode: u32,
    pub syntax: &'static [Field],
}

impl OpDef {
    pub const fn new(
        mnemonic: &'static str,
        form: Form,
        opcode: u32,
        syntax: &'static [Field],
    ) -> Self {
        Self {
            mnemonic,
            form,
            opcode,
            syntax,
        }
    }

    pub fn has(&self, field: Field) -> bool {
        self.syntax.contains(&field)
    }
}

/// Operand values gathered by field, ready for a form emitter.
///
/// `d`, `a`, `b`, `c` are the four 5-bit PPC slots (SPU `rt`, `ra`, `rb`,
/// `rc`; AArch64 `rd`, `rn`, `rm` or `rt2`, `ra`); composite fields such as
/// `crfD`/`L` are merged into them.
#[derive(Clone, Copy, Debug, Default)]
pub struct Slots {
    pub d: u32,
    pub a: u32,
    pub b: u32,
    pub c: u32,
    pub imm: i64,
    pub spr: u32,
    pub crm: u32,
    pub mb: u32,
    pub me: u32,
    pub sh: u32,
    pub cond: u32,
    pub label: Option<(Label, FixupKind)>,
}

/// Check operand kinds and small fields, and collect them into slots.
/// Register and immediate widths owned by the form emitters are checked
/// there.
pub fn assign(def: &OpDef, operands: &[Operand]) -> Result<Slots> {
    if operands.len() != def.syntax.len() {
        return Err(EncodeError::OperandCount {
            mnemonic: def.mnemonic,
            expected: def.syntax.len(),
            found: operands.len(),
        });
    }

    let mut slots = Slots::default();
    for (index, (&field, &operand)) in def.syntax.iter().zip(operands).enumerate() {
        let mismatch = || EncodeError::OperandMismatch {
            mnemonic: def.mnemonic,
            index,
            expected: field.expects(),
        };
        let value = match (operand, field.is_register()) {
            (Operand::Reg(r), true) => i64::from(r),
            (Operand::Imm(v), false) => v,
            (Operand::Label(label), false) => {
                let kind = fixup_kind(def, field).ok_or_else(mismatch)?;
                slots.label = Some((label, kind));
                0
            }
            _ => return Err(mismatch()),
        };
        place(&mut slots, field, value)?;
    }
    Ok(slots)
}

fn fixup_kind(def: &OpDef, field: Field) -> Option<FixupKind> {
    let absolute = def.opcode & 2 != 0;
    match field {
        Field::Li if absolute => Some(FixupKind::PpcAbs24),
        Field::Li => Some(FixupKind::PpcRel24),
        Field::Bd if absolute => Some(FixupKind::PpcAbs14),
        Field::Bd => Some(FixupKind::PpcRel14),
        Field::Rel16 => Some(FixupKind::SpuRel16),
        Field::Abs16 => Some(FixupKind::SpuAbs16),
        Field::Rel26 => Some(FixupKind::ArmRel26),
        Field::Rel19 => Some(FixupKind::ArmRel19),
        _ => None,
    }
}

fn place(slots: &mut Slots, field: Field, value: i64) -> Result<()> {
    // Registers are range-checked by the form emitters.
    let register = |v: i64| u32::try_from(v).unwrap_or(u32::MAX);
    match field {
        Field::Rd | Field::Rt | Field::Xd => slots.d = register(value),
        Field::Ra | Field::SpuRa | Field::Xn => slots.a = register(value),
        Field::Rb | Field::SpuRb | Field::Xm | Field::Xt2 => slots.b = register(value),
        Field::Rc | Field::SpuRc | Field::Xa => slots.c = register(value),
        Field::Simm
        | Field::Uimm
        | Field::Disp
        | Field::Ds
        | Field::Li
        | Field::Bd
        | Field::Vsimm
        | Field::I7
        | Field::I8
        | Field::I10
        | Field::I16
        | Field::U16
        | Field::I18
        | Field::Rel16
        | Field::Abs16
        | Field::Imm12
        | Field::Bitmask
        | Field::Imm16
        | Field::MemOff
        | Field::Rel26
        | Field::Rel19 => slots.imm = value,
        Field::Hw => slots.sh = uimm(value, 6)?,
        Field::Immr => slots.mb = uimm(value, 6)?,
        Field::Imms => slots.me = uimm(value, 6)?,
        Field::Cond => slots.cond = uimm(value, 4)?,
        Field::Bo | Field::To | Field::Crbd => slots.d = uimm(value, 5)?,
        Field::Bi | Field::Crba => slots.a = uimm(value, 5)?,
        Field::Crbb => slots.b = uimm(value, 5)?,
        Field::Bh => slots.b = uimm(value, 2)?,
        Field::Crfd => slots.d |= uimm(value, 3)? << 2,
        Field::Crfs => slots.a = uimm(value, 3)? << 2,
        Field::L => slots.d |= uimm(value, 1)?,
        Field::Spr => slots.spr = uimm(value, 10)?,
        Field::Crm => slots.crm = uimm(value, 8)?,
        Field::Sh => slots.sh = uimm(value, 5)?,
        Field::Mb => slots.mb = uimm(value, 5)?,
        Field::Me => slots.me = uimm(value, 5)?,
        Field::Sh6 => slots.sh = uimm(value, 6)?,
        Field::Mb6 => slots.mb = uimm(value, 6)?,
    }
    Ok(())
}

/// Find `mnemonic` in `table`.
pub fn lookup<'t>(table: &'t [&'t [OpDef]], mnemonic: &str) -> Result<&'t OpDef> {
    table
        .iter()
        .flat_map(|group| group.iter())
        .find(|def| def.mnemonic == mnemonic)
        .ok_or_else(|| EncodeError::UnknownMnemonic(mnemonic.to_string()))
}
