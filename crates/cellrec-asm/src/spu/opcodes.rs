//! SPU base opcodes, with every operand field zero.

// ===== RR =====
pub const A: u32 = 0x1800_0000;
pub const AH: u32 = 0x1900_0000;
pub const AND: u32 = 0x1820_0000;
pub const ANDC: u32 = 0x5820_0000;
pub const BG: u32 = 0x0840_0000;
pub const CEQ: u32 = 0x7800_0000;
pub const CEQB: u32 = 0x7A00_0000;
pub const CEQH: u32 = 0x7900_0000;
pub const CG: u32 = 0x1840_0000;
pub const CGT: u32 = 0x4800_0000;
pub const CLGT: u32 = 0x5800_0000;
pub const CLZ: u32 = 0x54A0_0000;
pub const EQV: u32 = 0x4920_0000;
pub const FA: u32 = 0x5880_0000;
pub const FM: u32 = 0x58C0_0000;
pub const FS: u32 = 0x58A0_0000;
pub const LQX: u32 = 0x3880_0000;
pub const MPY: u32 = 0x7880_0000;
pub const MPYU: u32 = 0x7980_0000;
pub const NAND: u32 = 0x1920_0000;
pub const NOR: u32 = 0x0920_0000;
pub const OR: u32 = 0x0820_0000;
pub const ORC: u32 = 0x5920_0000;
pub const ROT: u32 = 0x0B00_0000;
pub const SF: u32 = 0x0800_0000;
pub const SFH: u32 = 0x0900_0000;
pub const SHL: u32 = 0x0B60_0000;
pub const STQX: u32 = 0x2880_0000;
pub const XOR: u32 = 0x4820_0000;

// Branch indirect and no-ops
pub const BI: u32 = 0x3500_0000;
pub const BINZ: u32 = 0x2520_0000;
pub const BISL: u32 = 0x3520_0000;
pub const BIZ: u32 = 0x2500_0000;
pub const LNOP: u32 = 0x0020_0000;
pub const NOP: u32 = 0x4020_0000;
pub const STOP: u32 = 0x0000_0000;

// ===== RRR =====
pub const FMA: u32 = 0xE000_0000;
pub const FMS: u32 = 0xF000_0000;
pub const FNMS: u32 = 0xD000_0000;
pub const MPYA: u32 = 0xC000_0000;
pub const SELB: u32 = 0x8000_0000;
pub const SHUFB: u32 = 0xB000_0000;

// ===== RI7 =====
pub const CBD: u32 = 0x3E80_0000;
pub const CDD: u32 = 0x3EE0_0000;
pub const CHD: u32 = 0x3EA0_0000;
pub const CWD: u32 = 0x3EC0_0000;
pub const ROTI: u32 = 0x0F00_0000;
pub const ROTMAI: u32 = 0x0F40_0000;
pub const ROTMI: u32 = 0x0F20_0000;
pub const ROTQBYI: u32 = 0x3F80_0000;
pub const SHLI: u32 = 0x0F60_0000;
pub const SHLQBYI: u32 = 0x3FE0_0000;

// ===== RI8 =====
pub const CFLTS: u32 = 0x7600_0000;
pub const CFLTU: u32 = 0x7640_0000;
pub const CSFLT: u32 = 0x7680_0000;
pub const CUFLT: u32 = 0x76C0_0000;

// ===== RI10 =====
pub const AHI: u32 = 0x1D00_0000;
pub const AI: u32 = 0x1C00_0000;
pub const ANDBI: u32 = 0x1600_0000;
pub const ANDHI: u32 = 0x1500_0000;
pub const ANDI: u32 = 0x1400_0000;
pub const CEQBI: u32 = 0x7E00_0000;
pub const CEQHI: u32 = 0x7D00_0000;
pub const CEQI: u32 = 0x7C00_0000;
pub const CGTI: u32 = 0x4C00_0000;
pub const CLGTI: u32 = 0x5C00_0000;
pub const LQD: u32 = 0x3400_0000;
pub const MPYI: u32 = 0x7400_0000;
pub const MPYUI: u32 = 0x7500_0000;
pub const ORBI: u32 = 0x0600_0000;
pub const ORHI: u32 = 0x0500_0000;
pub const ORI: u32 = 0x0400_0000;
pub const SFHI: u32 = 0x0D00_0000;
pub const SFI: u32 = 0x0C00_0000;
pub const STQD: u32 = 0x2400_0000;
pub const XORI: u32 = 0x4400_0000;

// ===== RI16 =====
pub const BR: u32 = 0x3200_0000;
pub const BRA: u32 = 0x3000_0000;
pub const BRASL: u32 = 0x3100_0000;
pub const BRHNZ: u32 = 0x2300_0000;
pub const BRHZ: u32 = 0x2200_0000;
pub const BRNZ: u32 = 0x2100_0000;
pub const BRSL: u32 = 0x3300_0000;
pub const BRZ: u32 = 0x2000_0000;
pub const FSMBI: u32 = 0x3280_0000;
pub const IL: u32 = 0x4080_0000;
pub const ILH: u32 = 0x4180_0000;
pub const ILHU: u32 = 0x4100_0000;
pub const IOHL: u32 = 0x6080_0000;
pub const LQA: u32 = 0x3080_0000;
pub const LQR: u32 = 0x3380_0000;
pub const STQA: u32 = 0x2080_0000;
pub const STQR: u32 = 0x2380_0000;

// ===== RI18 =====
pub const ILA: u32 = 0x4200_0000;
