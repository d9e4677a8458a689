//! PPU instruction word and field accessors.
//!
//! PowerPC numbers bits big-endian: bit 0 is the most significant bit of
//! the word. Accessors below take field ranges in that numbering.

use std::fmt;

/// A 32-bit PPU instruction word.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PpuInstr(pub u32);

impl fmt::Debug for PpuInstr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PpuInstr({:#010x})", self.0)
    }
}

impl From<u32> for PpuInstr {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

/// Sign-extend the low `bits` bits of `value`.
#[inline]
const fn sext(value: u32, bits: u32) -> i64 {
    let shift = 64 - bits;
    ((value as i64) << shift) >> shift
}

impl PpuInstr {
    /// Raw instruction bits.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Extract bits `from..=to` (big-endian numbering).
    #[inline]
    pub const fn bits(self, from: u32, to: u32) -> u32 {
        let width = to - from + 1;
        (self.0 >> (31 - to)) & ((1u32 << width) - 1)
    }

    #[inline]
    const fn bit(self, n: u32) -> bool {
        self.bits(n, n) != 0
    }

    // ===== Opcode fields =====

    /// Primary opcode (bits 0-5).
    #[inline]
    pub const fn opcd(self) -> u32 {
        self.bits(0, 5)
    }

    /// Extended opcode of X/XL/XFX forms (bits 21-30).
    #[inline]
    pub const fn xo10(self) -> u32 {
        self.bits(21, 30)
    }

    /// Extended opcode of XO forms (bits 22-30).
    #[inline]
    pub const fn xo9(self) -> u32 {
        self.bits(22, 30)
    }

    /// Extended opcode of A forms (bits 26-30).
    #[inline]
    pub const fn xo5(self) -> u32 {
        self.bits(26, 30)
    }

    /// Extended opcode of MD forms (bits 27-29).
    #[inline]
    pub const fn xo_md(self) -> u32 {
        self.bits(27, 29)
    }

    /// Extended opcode of MDS forms (bits 27-30).
    #[inline]
    pub const fn xo_mds(self) -> u32 {
        self.bits(27, 30)
    }

    /// Extended opcode of DS forms (bits 30-31).
    #[inline]
    pub const fn xo_ds(self) -> u32 {
        self.bits(30, 31)
    }

    /// Extended opcode of VX forms (bits 21-31).
    #[inline]
    pub const fn xo_vx(self) -> u32 {
        self.bits(21, 31)
    }

    /// Extended opcode of VA forms (bits 26-31).
    #[inline]
    pub const fn xo_va(self) -> u32 {
        self.bits(26, 31)
    }

    // ===== Register fields =====

    /// Destination register (bits 6-10).
    #[inline]
    pub const fn rd(self) -> usize {
        self.bits(6, 10) as usize
    }

    /// Source register in the destination slot (bits 6-10).
    #[inline]
    pub const fn rs(self) -> usize {
        self.rd()
    }

    /// Register A (bits 11-15).
    #[inline]
    pub const fn ra(self) -> usize {
        self.bits(11, 15) as usize
    }

    /// Register B (bits 16-20).
    #[inline]
    pub const fn rb(self) -> usize {
        self.bits(16, 20) as usize
    }

    /// Register C of A/VA forms (bits 21-25).
    #[inline]
    pub const fn rc_reg(self) -> usize {
        self.bits(21, 25) as usize
    }

    /// Condition-register field destination (bits 6-8).
    #[inline]
    pub const fn crfd(self) -> usize {
        self.bits(6, 8) as usize
    }

    /// Condition-register field source (bits 11-13).
    #[inline]
    pub const fn crfs(self) -> usize {
        self.bits(11, 13) as usize
    }

    /// Condition-register bit operands of XL logic forms.
    #[inline]
    pub const fn crbd(self) -> usize {
        self.rd()
    }

    #[inline]
    pub const fn crba(self) -> usize {
        self.ra()
    }

    #[inline]
    pub const fn crbb(self) -> usize {
        self.rb()
    }

    // ===== Flag bits =====

    /// Record bit (bit 31).
    #[inline]
    pub const fn rc(self) -> bool {
        self.bit(31)
    }

    /// Overflow-enable bit of XO forms (bit 21).
    #[inline]
    pub const fn oe(self) -> bool {
        self.bit(21)
    }

    /// Absolute-address bit of branches (bit 30).
    #[inline]
    pub const fn aa(self) -> bool {
        self.bit(30)
    }

    /// Link bit of branches (bit 31).
    #[inline]
    pub const fn lk(self) -> bool {
        self.bit(31)
    }

    /// 64-bit compare selector (bit 10).
    #[inline]
    pub const fn l10(self) -> bool {
        self.bit(10)
    }

    /// Single-field form of `mfcr`/`mtcrf` (bit 11).
    #[inline]
    pub const fn l11(self) -> bool {
        self.bit(11)
    }

    // ===== Branch fields =====

    /// Branch options (bits 6-10).
    #[inline]
    pub const fn bo(self) -> u32 {
        self.bits(6, 10)
    }

    /// Condition bit index (bits 11-15).
    #[inline]
    pub const fn bi(self) -> usize {
        self.bits(11, 15) as usize
    }

    /// Conditional branch displacement, already scaled by 4.
    #[inline]
    pub const fn bd(self) -> i64 {
        sext(self.bits(16, 29), 14) << 2
    }

    /// Unconditional branch displacement, already scaled by 4.
    #[inline]
    pub const fn li(self) -> i64 {
        sext(self.bits(6, 29), 24) << 2
    }

    /// Branch hint of XL branches (bits 19-20).
    #[inline]
    pub const fn bh(self) -> u32 {
        self.bits(19, 20)
    }

    // ===== Immediates =====

    /// Signed 16-bit immediate (bits 16-31).
    #[inline]
    pub const fn simm(self) -> i64 {
        sext(self.bits(16, 31), 16)
    }

    /// Unsigned 16-bit immediate (bits 16-31).
    #[inline]
    pub const fn uimm(self) -> u64 {
        self.bits(16, 31) as u64
    }

    /// Signed DS displacement, already scaled by 4.
    #[inline]
    pub const fn ds(self) -> i64 {
        sext(self.bits(16, 29), 14) << 2
    }

    /// Special-purpose register number with its two halves swapped back.
    #[inline]
    pub const fn spr(self) -> u32 {
        self.bits(11, 15) | (self.bits(16, 20) << 5)
    }

    /// CR field mask of `mtcrf` (bits 12-19).
    #[inline]
    pub const fn crm(self) -> u32 {
        self.bits(12, 19)
    }

    /// FPSCR field mask of `mtfsf` (bits 7-14).
    #[inline]
    pub const fn fm(self) -> u32 {
        self.bits(7, 14)
    }

    /// Shift amount of 32-bit rotates (bits 16-20).
    #[inline]
    pub const fn sh(self) -> u32 {
        self.bits(16, 20)
    }

    /// Mask begin of M forms (bits 21-25).
    #[inline]
    pub const fn mb(self) -> u32 {
        self.bits(21, 25)
    }

    /// Mask end of M forms (bits 26-30).
    #[inline]
    pub const fn me(self) -> u32 {
        self.bits(26, 30)
    }

    /// 6-bit shift of MD/XS forms: `sh[0:4]` in bits 16-20, `sh[5]` in bit 30.
    #[inline]
    pub const fn sh64(self) -> u32 {
        self.bits(16, 20) | (self.bits(30, 30) << 5)
    }

    /// 6-bit mask of MD forms: `mb[0:4]` in bits 21-25, `mb[5]` in bit 26.
    #[inline]
    pub const fn mb64(self) -> u32 {
        self.bits(21, 25) | (self.bits(26, 26) << 5)
    }

    /// Trap condition (bits 6-10).
    #[inline]
    pub const fn to(self) -> u32 {
        self.bits(6, 10)
    }

    /// Barrier kind of `sync` (bits 9-10): 0 = sync, 1 = lwsync, 2 = ptesync.
    #[inline]
    pub const fn sync_l(self) -> u32 {
        self.bits(9, 10)
    }

    /// Signed 5-bit vector immediate (bits 11-15).
    #[inline]
    pub const fn vsimm(self) -> i64 {
        sext(self.bits(11, 15), 5)
    }

    /// Unsigned 5-bit vector immediate (bits 11-15).
    #[inline]
    pub const fn vuimm(self) -> u32 {
        self.bits(11, 15)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xo_form_fields() {
        // add. r3, r14, r15
        let instr = PpuInstr(0x7C6E_7A15);
        assert_eq!(instr.opcd(), 31);
        assert_eq!(instr.rd(), 3);
        assert_eq!(instr.ra(), 14);
        assert_eq!(instr.rb(), 15);
        assert_eq!(instr.xo9(), 266);
        assert!(instr.rc());
        assert!(!instr.oe());
    }

    #[test]
    fn test_d_form_immediates() {
        // addi r3, r1, -16
        let instr = PpuInstr(0x3861_FFF0);
        assert_eq!(instr.opcd(), 14);
        assert_eq!(instr.simm(), -16);
        assert_eq!(instr.uimm(), 0xFFF0);
    }

    #[test]
    fn test_branch_displacements() {
        // b -8
        let instr = PpuInstr(0x4BFF_FFF8);
        assert_eq!(instr.li(), -8);
        assert!(!instr.aa());
        assert!(!instr.lk());

        // beq cr0, +12
        let instr = PpuInstr(0x4182_000C);
        assert_eq!(instr.bo(), 12);
        assert_eq!(instr.bi(), 2);
        assert_eq!(instr.bd(), 12);
    }

    #[test]
    fn test_spr_halves() {
        // mflr r0
        let instr = PpuInstr(0x7C08_02A6);
        assert_eq!(instr.spr(), 8);
        // mfctr r0
        let instr = PpuInstr(0x7C09_02A6);
        assert_eq!(instr.spr(), 9);
    }

    #[test]
    fn test_md_form_fields() {
        // rldicl r3, r4, 63, 1 -> sh = 63, mb = 1
        let instr = PpuInstr(0x7883_F842);
        assert_eq!(instr.sh64(), 63);
        assert_eq!(instr.mb64(), 1);
    }
}
