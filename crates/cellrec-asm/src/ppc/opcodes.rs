//! PPC base opcodes: primary and extended opcode bits with every variable
//! field, `Rc`, `OE`, `AA`, and `LK` cleared.

/// Record bit.
pub const RC: u32 = 0x0000_0001;
/// Overflow-enable bit of XO-form.
pub const OE: u32 = 0x0000_0400;
/// Absolute-address bit of I- and B-form.
pub const AA: u32 = 0x0000_0002;
/// Link bit of I-, B- and XL-form branches.
pub const LK: u32 = 0x0000_0001;

// ===== Integer arithmetic =====

pub const ADD: u32 = 0x7C00_0214;
pub const ADDC: u32 = 0x7C00_0014;
pub const ADDE: u32 = 0x7C00_0114;
pub const ADDI: u32 = 0x3800_0000;
pub const ADDIC: u32 = 0x3000_0000;
pub const ADDIC_RC: u32 = 0x3400_0000;
pub const ADDIS: u32 = 0x3C00_0000;
pub const ADDME: u32 = 0x7C00_01D4;
pub const ADDZE: u32 = 0x7C00_0194;
pub const DIVD: u32 = 0x7C00_03D2;
pub const DIVDU: u32 = 0x7C00_0392;
pub const DIVW: u32 = 0x7C00_03D6;
pub const DIVWU: u32 = 0x7C00_0396;
pub const MULHD: u32 = 0x7C00_0092;
pub const MULHDU: u32 = 0x7C00_0012;
pub const MULHW: u32 = 0x7C00_0096;
pub const MULHWU: u32 = 0x7C00_0016;
pub const MULLD: u32 = 0x7C00_01D2;
pub const MULLI: u32 = 0x1C00_0000;
pub const MULLW: u32 = 0x7C00_01D6;
pub const NEG: u32 = 0x7C00_00D0;
pub const SUBF: u32 = 0x7C00_0050;
pub const SUBFC: u32 = 0x7C00_0010;
pub const SUBFE: u32 = 0x7C00_0110;
pub const SUBFIC: u32 = 0x2000_0000;
pub const SUBFME: u32 = 0x7C00_01D0;
pub const SUBFZE: u32 = 0x7C00_0190;

// ===== Logical, shift, rotate =====

pub const AND: u32 = 0x7C00_0038;
pub const ANDC: u32 = 0x7C00_0078;
pub const ANDI_RC: u32 = 0x7000_0000;
pub const ANDIS_RC: u32 = 0x7400_0000;
pub const CNTLZD: u32 = 0x7C00_0074;
pub const CNTLZW: u32 = 0x7C00_0034;
pub const EQV: u32 = 0x7C00_0238;
pub const EXTSB: u32 = 0x7C00_0774;
pub const EXTSH: u32 = 0x7C00_0734;
pub const EXTSW: u32 = 0x7C00_07B4;
pub const NAND: u32 = 0x7C00_03B8;
pub const NOR: u32 = 0x7C00_00F8;
pub const OR: u32 = 0x7C00_0378;
pub const ORC: u32 = 0x7C00_0338;
pub const ORI: u32 = 0x6000_0000;
pub const ORIS: u32 = 0x6400_0000;
pub const XOR: u32 = 0x7C00_0278;
pub const XORI: u32 = 0x6800_0000;
pub const XORIS: u32 = 0x6C00_0000;
pub const RLDIC: u32 = 0x7800_0008;
pub const RLDICL: u32 = 0x7800_0000;
pub const RLDICR: u32 = 0x7800_0004;
pub const RLDIMI: u32 = 0x7800_000C;
pub const RLWIMI: u32 = 0x5000_0000;
pub const RLWINM: u32 = 0x5400_0000;
pub const RLWNM: u32 = 0x5C00_0000;
pub const SLD: u32 = 0x7C00_0036;
pub const SLW: u32 = 0x7C00_0030;
pub const SRAD: u32 = 0x7C00_0634;
pub const SRADI: u32 = 0x7C00_0674;
pub const SRAW: u32 = 0x7C00_0630;
pub const SRAWI: u32 = 0x7C00_0670;
pub const SRD: u32 = 0x7C00_0436;
pub const SRW: u32 = 0x7C00_0430;

// ===== Compare and trap =====

pub const CMP: u32 = 0x7C00_0000;
pub const CMPI: u32 = 0x2C00_0000;
pub const CMPL: u32 = 0x7C00_0040;
pub const CMPLI: u32 = 0x2800_0000;
pub const TD: u32 = 0x7C00_0088;
pub const TDI: u32 = 0x0800_0000;
pub const TW: u32 = 0x7C00_0008;
pub const TWI: u32 = 0x0C00_0000;

// ===== Branch and condition register =====

pub const B: u32 = 0x4800_0000;
pub const BC: u32 = 0x4000_0000;
pub const BCCTR: u32 = 0x4C00_0420;
pub const BCLR: u32 = 0x4C00_0020;
pub const CRAND: u32 = 0x4C00_0202;
pub const CRANDC: u32 = 0x4C00_0102;
pub const CREQV: u32 = 0x4C00_0242;
pub const CRNAND: u32 = 0x4C00_01C2;
pub const CRNOR: u32 = 0x4C00_0042;
pub const CROR: u32 = 0x4C00_0382;
pub const CRORC: u32 = 0x4C00_0342;
pub const CRXOR: u32 = 0x4C00_0182;
pub const MCRF: u32 = 0x4C00_0000;

// ===== System =====

pub const DCBF: u32 = 0x7C00_00AC;
pub const DCBST: u32 = 0x7C00_006C;
pub const DCBT: u32 = 0x7C00_022C;
pub const DCBTST: u32 = 0x7C00_01EC;
pub const DCBZ: u32 = 0x7C00_07EC;
pub const EIEIO: u32 = 0x7C00_06AC;
pub const ICBI: u32 = 0x7C00_07AC;
pub const ISYNC: u32 = 0x4C00_012C;
pub const MFCR: u32 = 0x7C00_0026;
pub const MFSPR: u32 = 0x7C00_02A6;
pub const MFTB: u32 = 0x7C00_02E6;
pub const MTCRF: u32 = 0x7C00_0120;
pub const MTSPR: u32 = 0x7C00_03A6;
pub const SC: u32 = 0x4400_0002;
pub const SYNC: u32 = 0x7C00_04AC;

// ===== Load and store =====

pub const LBZ: u32 = 0x8800_0000;
pub const LBZU: u32 = 0x8C00_0000;
pub const LBZX: u32 = 0x7C00_00AE;
pub const LD: u32 = 0xE800_0000;
pub const LDARX: u32 = 0x7C00_00A8;
pub const LDU: u32 = 0xE800_0001;
pub const LDX: u32 = 0x7C00_002A;
pub const LHA: u32 = 0xA800_0000;
pub const LHAU: u32 = 0xAC00_0000;
pub const LHAX: u32 = 0x7C00_02AE;
pub const LHZ: u32 = 0xA000_0000;
pub const LHZU: u32 = 0xA400_0000;
pub const LHZX: u32 = 0x7C00_022E;
pub const LMW: u32 = 0xB800_0000;
pub const LWA: u32 = 0xE800_0002;
pub const LWARX: u32 = 0x7C00_0028;
pub const LWAX: u32 = 0x7C00_02AA;
pub const LWBRX: u32 = 0x7C00_042C;
pub const LWZ: u32 = 0x8000_0000;
pub const LWZU: u32 = 0x8400_0000;
pub const LWZX: u32 = 0x7C00_002E;
pub const STB: u32 = 0x9800_0000;
pub const STBU: u32 = 0x9C00_0000;
pub const STBX: u32 = 0x7C00_01AE;
pub const STD: u32 = 0xF800_0000;
pub const STDCX_RC: u32 = 0x7C00_01AD;
pub const STDU: u32 = 0xF800_0001;
pub const STDX: u32 = 0x7C00_012A;
pub const STH: u32 = 0xB000_0000;
pub const STHU: u32 = 0xB400_0000;
pub const STHX: u32 = 0x7C00_032E;
pub const STMW: u32 = 0xBC00_0000;
pub const STW: u32 = 0x9000_0000;
pub const STWBRX: u32 = 0x7C00_052C;
pub const STWCX_RC: u32 = 0x7C00_012D;
pub const STWU: u32 = 0x9400_0000;
pub const STWX: u32 = 0x7C00_012E;

// ===== Floating point =====

pub const FABS: u32 = 0xFC00_0210;
pub const FADD: u32 = 0xFC00_002A;
pub const FADDS: u32 = 0xEC00_002A;
pub const FCFID: u32 = 0xFC00_069C;
pub const FCMPO: u32 = 0xFC00_0040;
pub const FCMPU: u32 = 0xFC00_0000;
pub const FCTID: u32 = 0xFC00_065C;
pub const FCTIDZ: u32 = 0xFC00_065E;
pub const FCTIW: u32 = 0xFC00_001C;
pub const FCTIWZ: u32 = 0xFC00_001E;
pub const FDIV: u32 = 0xFC00_0024;
pub const FDIVS: u32 = 0xEC00_0024;
pub const FMADD: u32 = 0xFC00_003A;
pub const FMR: u32 = 0xFC00_0090;
pub const FMSUB: u32 = 0xFC00_0038;
pub const FMUL: u32 = 0xFC00_0032;
pub const FMULS: u32 = 0xEC00_0032;
pub const FNABS: u32 = 0xFC00_0110;
pub const FNEG: u32 = 0xFC00_0050;
pub const FNMADD: u32 = 0xFC00_003E;
pub const FNMSUB: u32 = 0xFC00_003C;
pub const FRSP: u32 = 0xFC00_0018;
pub const FSEL: u32 = 0xFC00_002E;
pub const FSQRT: u32 = 0xFC00_002C;
pub const FSUB: u32 = 0xFC00_0028;
pub const FSUBS: u32 = 0xEC00_0028;
pub const LFD: u32 = 0xC800_0000;
pub const LFDU: u32 = 0xCC00_0000;
pub const LFDX: u32 = 0x7C00_04AE;
pub const LFS: u32 = 0xC000_0000;
pub const LFSU: u32 = 0xC400_0000;
pub const LFSX: u32 = 0x7C00_042E;
pub const MFFS: u32 = 0xFC00_048E;
pub const STFD: u32 = 0xD800_0000;
pub const STFDU: u32 = 0xDC00_0000;
pub const STFDX: u32 = 0x7C00_05AE;
pub const STFS: u32 = 0xD000_0000;
pub const STFSU: u32 = 0xD400_0000;
pub const STFSX: u32 = 0x7C00_052E;

// ===== Vector =====

pub const LVX: u32 = 0x7C00_00CE;
pub const STVX: u32 = 0x7C00_01CE;
pub const VADDUBM: u32 = 0x1000_0000;
pub const VADDUHM: u32 = 0x1000_0040;
pub const VADDUWM: u32 = 0x1000_0080;
pub const VAND: u32 = 0x1000_0404;
pub const VANDC: u32 = 0x1000_0444;
pub const VMADDFP: u32 = 0x1000_002E;
pub const VNOR: u32 = 0x1000_0504;
pub const VOR: u32 = 0x1000_0484;
pub const VPERM: u32 = 0x1000_002B;
pub const VSEL: u32 = 0x1000_002A;
pub const VSPLTISW: u32 = 0x1000_038C;
pub const VSUBUWM: u32 = 0x1000_0480;
pub const VXOR: u32 = 0x1000_04C4;
