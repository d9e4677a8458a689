//! AArch64 base opcodes in their 64-bit (`sf = 1`) or double-precision
//! variants, with every operand field zero.

/// 64-bit operand size.
pub const SF: u32 = 1 << 31;
/// Bitfield `N`, set together with `SF`.
pub const N: u32 = 1 << 22;

// ===== Add/sub =====
pub const ADD_IMM: u32 = 0x9100_0000;
pub const ADDS_IMM: u32 = 0xB100_0000;
pub const SUB_IMM: u32 = 0xD100_0000;
pub const SUBS_IMM: u32 = 0xF100_0000;
pub const ADD: u32 = 0x8B00_0000;
pub const ADDS: u32 = 0xAB00_0000;
pub const SUB: u32 = 0xCB00_0000;
pub const SUBS: u32 = 0xEB00_0000;

// ===== Logical =====
pub const AND: u32 = 0x8A00_0000;
pub const BIC: u32 = 0x8A20_0000;
pub const ORR: u32 = 0xAA00_0000;
pub const ORN: u32 = 0xAA20_0000;
pub const EOR: u32 = 0xCA00_0000;
pub const ANDS: u32 = 0xEA00_0000;
pub const AND_IMM: u32 = 0x9200_0000;
pub const ORR_IMM: u32 = 0xB200_0000;
pub const EOR_IMM: u32 = 0xD200_0000;
pub const ANDS_IMM: u32 = 0xF200_0000;

// ===== Move wide =====
pub const MOVN: u32 = 0x9280_0000;
pub const MOVZ: u32 = 0xD280_0000;
pub const MOVK: u32 = 0xF280_0000;

// ===== Bitfield =====
pub const SBFM: u32 = 0x9340_0000;
pub const BFM: u32 = 0xB340_0000;
pub const UBFM: u32 = 0xD340_0000;

// ===== Conditional select =====
pub const CSEL: u32 = 0x9A80_0000;
pub const CSINC: u32 = 0x9A80_0400;
pub const CSINV: u32 = 0xDA80_0000;
pub const CSNEG: u32 = 0xDA80_0400;

// ===== Data processing =====
pub const RBIT: u32 = 0xDAC0_0000;
pub const REV16: u32 = 0xDAC0_0400;
/// Byte reverse within words; `rev` for 32-bit registers.
pub const REV32: u32 = 0xDAC0_0800;
pub const REV: u32 = 0xDAC0_0C00;
pub const CLZ: u32 = 0xDAC0_1000;
pub const UDIV: u32 = 0x9AC0_0800;
pub const SDIV: u32 = 0x9AC0_0C00;
pub const LSLV: u32 = 0x9AC0_2000;
pub const LSRV: u32 = 0x9AC0_2400;
pub const ASRV: u32 = 0x9AC0_2800;
pub const RORV: u32 = 0x9AC0_2C00;
pub const MADD: u32 = 0x9B00_0000;
pub const MSUB: u32 = 0x9B00_8000;
/// `madd` with the zero register as addend.
pub const MUL: u32 = 0x9B00_7C00;
pub const SMULH: u32 = 0x9B40_7C00;
pub const UMULH: u32 = 0x9BC0_7C00;

// ===== Loads and stores, unsigned offset =====
pub const LDR_X: u32 = 0xF940_0000;
pub const STR_X: u32 = 0xF900_0000;
pub const LDR_W: u32 = 0xB940_0000;
pub const STR_W: u32 = 0xB900_0000;
pub const LDRSW: u32 = 0xB980_0000;
pub const LDRH: u32 = 0x7940_0000;
pub const STRH: u32 = 0x7900_0000;
pub const LDRB: u32 = 0x3940_0000;
pub const STRB: u32 = 0x3900_0000;
pub const LDR_D: u32 = 0xFD40_0000;
pub const STR_D: u32 = 0xFD00_0000;

// ===== Pairs =====
pub const STP: u32 = 0xA900_0000;
pub const LDP: u32 = 0xA940_0000;
pub const STP_PRE: u32 = 0xA980_0000;
pub const LDP_PRE: u32 = 0xA9C0_0000;
pub const STP_POST: u32 = 0xA880_0000;
pub const LDP_POST: u32 = 0xA8C0_0000;

// ===== Branches =====
pub const B: u32 = 0x1400_0000;
pub const BL: u32 = 0x9400_0000;
pub const B_COND: u32 = 0x5400_0000;
pub const CBZ: u32 = 0xB400_0000;
pub const CBNZ: u32 = 0xB500_0000;
pub const BR: u32 = 0xD61F_0000;
pub const BLR: u32 = 0xD63F_0000;
pub const RET: u32 = 0xD65F_0000;

// ===== System =====
pub const BRK: u32 = 0xD420_0000;
pub const SVC: u32 = 0xD400_0001;
pub const NOP: u32 = 0xD503_201F;

// ===== Floating point, double precision =====
pub const FADD: u32 = 0x1E60_2800;
pub const FSUB: u32 = 0x1E60_3800;
pub const FMUL: u32 = 0x1E60_0800;
pub const FDIV: u32 = 0x1E60_1800;
pub const FMADD: u32 = 0x1F40_0000;
pub const FMSUB: u32 = 0x1F40_8000;
pub const FMOV: u32 = 0x1E60_4000;
pub const FABS: u32 = 0x1E60_C000;
pub const FNEG: u32 = 0x1E61_4000;
pub const FSQRT: u32 = 0x1E61_C000;
pub const FCMP: u32 = 0x1E60_2000;
/// `fmov xd, dn`
pub const FMOV_TO_GPR: u32 = 0x9E66_0000;
/// `fmov dd, xn`
pub const FMOV_FROM_GPR: u32 = 0x9E67_0000;
pub const FCVTZS: u32 = 0x9E78_0000;
pub const FCVTZU: u32 = 0x9E79_0000;
pub const SCVTF: u32 = 0x9E62_0000;
pub const UCVTF: u32 = 0x9E63_0000;
