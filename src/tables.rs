//! decode tables: mask/value patterns grouped by major opcode, with per-field
//! operand descriptions. the decoder core never names individual encodings;
//! everything it needs is data in this module.

use crate::{Features, Opcode};

/// How a field's raw bits become an operand.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum OperandClass {
    Gpr,
    /// Base-register position: index 0 denotes the literal zero.
    GprNoR0,
    Gpr64,
    /// Single-precision floating-point register.
    Fpr4,
    /// Double-precision floating-point register.
    Fpr8,
    Vec,
    Vsx,
    /// Vsx register viewed as a scalar float.
    VsxFpr,
    QuadFpr,
    Cr,
    CrBit,
    UImm,
    SImm,
    /// Combined base+displacement field of D-form memory accesses.
    MemRI,
    /// Combined base+displacement field of DS-form memory accesses.
    MemRIX,
    /// One-hot mask naming a single cr field.
    CrBitMask,
}

/// One operand field of an encoding. `ext_*` describes a second, discontiguous
/// run of bits concatenated above the first (vsx registers split their high
/// bit off from the rest of the number).
#[derive(Debug)]
pub(crate) struct Field {
    pub lo: u8,
    pub len: u8,
    pub ext_lo: u8,
    pub ext_len: u8,
    pub class: OperandClass,
}

#[derive(Debug)]
pub(crate) struct Pattern {
    pub mask: u32,
    pub value: u32,
    pub opcode: Opcode,
    pub features: Features,
    pub fields: &'static [Field],
}

/// Patterns grouped by major opcode (the top six bits), groups sorted
/// ascending so lookup can bisect.
pub(crate) struct DecodeTable {
    pub groups: &'static [(u8, &'static [Pattern])],
}

impl DecodeTable {
    pub fn lookup(&self, word: u32, features: Features) -> Option<&'static Pattern> {
        let major = (word >> 26) as u8;
        let idx = self.groups.binary_search_by_key(&major, |&(m, _)| m).ok()?;
        let (_, patterns) = self.groups[idx];
        patterns.iter().find(|p| {
            word & p.mask == p.value && features.contains(p.features)
        })
    }
}

const fn field(lo: u8, len: u8, class: OperandClass) -> Field {
    Field { lo, len, ext_lo: 0, ext_len: 0, class }
}

const fn split_field(lo: u8, len: u8, ext_lo: u8, ext_len: u8, class: OperandClass) -> Field {
    Field { lo, len, ext_lo, ext_len, class }
}

const fn pat(mask: u32, value: u32, opcode: Opcode, features: Features, fields: &'static [Field]) -> Pattern {
    Pattern { mask, value, opcode, features, fields }
}

// field lists shared between patterns. operand order is assembly order; the
// tied operand of update forms is synthesized by the memory decoders, not
// listed here.

static RT_RA0_SIMM: [Field; 3] = [
    field(21, 5, OperandClass::Gpr),
    field(16, 5, OperandClass::GprNoR0),
    field(0, 16, OperandClass::SImm),
];

static RT_RA_SIMM: [Field; 3] = [
    field(21, 5, OperandClass::Gpr),
    field(16, 5, OperandClass::Gpr),
    field(0, 16, OperandClass::SImm),
];

static CR_RA_SIMM: [Field; 3] = [
    field(23, 3, OperandClass::Cr),
    field(16, 5, OperandClass::Gpr),
    field(0, 16, OperandClass::SImm),
];

static CR_RA_UIMM: [Field; 3] = [
    field(23, 3, OperandClass::Cr),
    field(16, 5, OperandClass::Gpr),
    field(0, 16, OperandClass::UImm),
];

// logical immediates write rA from rS; destination first in assembly.
static RA_RS_UIMM: [Field; 3] = [
    field(16, 5, OperandClass::Gpr),
    field(21, 5, OperandClass::Gpr),
    field(0, 16, OperandClass::UImm),
];

static RT_RA_RB: [Field; 3] = [
    field(21, 5, OperandClass::Gpr),
    field(16, 5, OperandClass::Gpr),
    field(11, 5, OperandClass::Gpr),
];

static RT_RA: [Field; 2] = [
    field(21, 5, OperandClass::Gpr),
    field(16, 5, OperandClass::Gpr),
];

static RA_RS_RB: [Field; 3] = [
    field(16, 5, OperandClass::Gpr),
    field(21, 5, OperandClass::Gpr),
    field(11, 5, OperandClass::Gpr),
];

static CR_CR: [Field; 2] = [
    field(23, 3, OperandClass::Cr),
    field(18, 3, OperandClass::Cr),
];

static CRB_CRB_CRB: [Field; 3] = [
    field(21, 5, OperandClass::CrBit),
    field(16, 5, OperandClass::CrBit),
    field(11, 5, OperandClass::CrBit),
];

static CRM_RS: [Field; 2] = [
    field(12, 8, OperandClass::CrBitMask),
    field(21, 5, OperandClass::Gpr),
];

static RT_CRM: [Field; 2] = [
    field(21, 5, OperandClass::Gpr),
    field(12, 8, OperandClass::CrBitMask),
];

static GPR_MEMRI: [Field; 2] = [
    field(21, 5, OperandClass::Gpr),
    field(0, 21, OperandClass::MemRI),
];

static FPR4_MEMRI: [Field; 2] = [
    field(21, 5, OperandClass::Fpr4),
    field(0, 21, OperandClass::MemRI),
];

static FPR8_MEMRI: [Field; 2] = [
    field(21, 5, OperandClass::Fpr8),
    field(0, 21, OperandClass::MemRI),
];

static G8_MEMRIX: [Field; 2] = [
    field(21, 5, OperandClass::Gpr64),
    field(2, 19, OperandClass::MemRIX),
];

static VSX_RA0_RB: [Field; 3] = [
    split_field(21, 5, 0, 1, OperandClass::Vsx),
    field(16, 5, OperandClass::GprNoR0),
    field(11, 5, OperandClass::Gpr),
];

static G8_VSFPR: [Field; 2] = [
    field(16, 5, OperandClass::Gpr64),
    split_field(21, 5, 0, 1, OperandClass::VsxFpr),
];

static VEC_VEC_VEC: [Field; 3] = [
    field(21, 5, OperandClass::Vec),
    field(16, 5, OperandClass::Vec),
    field(11, 5, OperandClass::Vec),
];

static QF_QF_QF: [Field; 3] = [
    field(21, 5, OperandClass::QuadFpr),
    field(16, 5, OperandClass::QuadFpr),
    field(11, 5, OperandClass::QuadFpr),
];

// the primary table. within a group, patterns are checked in order; put more
// specific masks before broader ones.
pub(crate) static PRIMARY32: DecodeTable = DecodeTable {
    groups: &[
        (4, &[
            pat(0xfc0007ff, 0x10000000, Opcode::VADDUBM, Features::ALTIVEC, &VEC_VEC_VEC),
            pat(0xfc0007ff, 0x10000400, Opcode::VSUBUBM, Features::ALTIVEC, &VEC_VEC_VEC),
            pat(0xfc0007ff, 0x10000484, Opcode::VOR, Features::ALTIVEC, &VEC_VEC_VEC),
        ]),
        (7, &[
            pat(0xfc000000, 0x1c000000, Opcode::MULLI, Features::NONE, &RT_RA_SIMM),
        ]),
        (8, &[
            pat(0xfc000000, 0x20000000, Opcode::SUBFIC, Features::NONE, &RT_RA_SIMM),
        ]),
        (10, &[
            pat(0xfc600000, 0x28000000, Opcode::CMPLWI, Features::NONE, &CR_RA_UIMM),
        ]),
        (11, &[
            pat(0xfc600000, 0x2c000000, Opcode::CMPWI, Features::NONE, &CR_RA_SIMM),
        ]),
        (12, &[
            pat(0xfc000000, 0x30000000, Opcode::ADDIC, Features::NONE, &RT_RA_SIMM),
        ]),
        (14, &[
            pat(0xfc000000, 0x38000000, Opcode::ADDI, Features::NONE, &RT_RA0_SIMM),
        ]),
        (15, &[
            pat(0xfc000000, 0x3c000000, Opcode::ADDIS, Features::NONE, &RT_RA0_SIMM),
        ]),
        (19, &[
            pat(0xfc63ffff, 0x4c000000, Opcode::MCRF, Features::NONE, &CR_CR),
            pat(0xfc0007ff, 0x4c000202, Opcode::CRAND, Features::NONE, &CRB_CRB_CRB),
            pat(0xfc0007ff, 0x4c000182, Opcode::CRXOR, Features::NONE, &CRB_CRB_CRB),
            pat(0xfc0007ff, 0x4c000382, Opcode::CROR, Features::NONE, &CRB_CRB_CRB),
        ]),
        (24, &[
            pat(0xfc000000, 0x60000000, Opcode::ORI, Features::NONE, &RA_RS_UIMM),
        ]),
        (25, &[
            pat(0xfc000000, 0x64000000, Opcode::ORIS, Features::NONE, &RA_RS_UIMM),
        ]),
        (26, &[
            pat(0xfc000000, 0x68000000, Opcode::XORI, Features::NONE, &RA_RS_UIMM),
        ]),
        (27, &[
            pat(0xfc000000, 0x6c000000, Opcode::XORIS, Features::NONE, &RA_RS_UIMM),
        ]),
        (31, &[
            pat(0xfc0007ff, 0x7c000214, Opcode::ADD, Features::NONE, &RT_RA_RB),
            pat(0xfc0007ff, 0x7c000050, Opcode::SUBF, Features::NONE, &RT_RA_RB),
            pat(0xfc00ffff, 0x7c0000d0, Opcode::NEG, Features::NONE, &RT_RA),
            pat(0xfc0007ff, 0x7c000038, Opcode::AND, Features::NONE, &RA_RS_RB),
            pat(0xfc0007ff, 0x7c000378, Opcode::OR, Features::NONE, &RA_RS_RB),
            pat(0xfc0007ff, 0x7c000278, Opcode::XOR, Features::NONE, &RA_RS_RB),
            pat(0xfc100fff, 0x7c100026, Opcode::MFOCRF, Features::NONE, &RT_CRM),
            pat(0xfc100fff, 0x7c100120, Opcode::MTOCRF, Features::NONE, &CRM_RS),
            pat(0xfc00fffe, 0x7c000066, Opcode::MFVSRD, Features::VSX.with(Features::PPC64), &G8_VSFPR),
            pat(0xfc0007fe, 0x7c000698, Opcode::LXVD2X, Features::VSX, &VSX_RA0_RB),
            pat(0xfc0007fe, 0x7c000798, Opcode::STXVD2X, Features::VSX, &VSX_RA0_RB),
        ]),
        (32, &[
            pat(0xfc000000, 0x80000000, Opcode::LWZ, Features::NONE, &GPR_MEMRI),
        ]),
        (33, &[
            pat(0xfc000000, 0x84000000, Opcode::LWZU, Features::NONE, &GPR_MEMRI),
        ]),
        (34, &[
            pat(0xfc000000, 0x88000000, Opcode::LBZ, Features::NONE, &GPR_MEMRI),
        ]),
        (35, &[
            pat(0xfc000000, 0x8c000000, Opcode::LBZU, Features::NONE, &GPR_MEMRI),
        ]),
        (36, &[
            pat(0xfc000000, 0x90000000, Opcode::STW, Features::NONE, &GPR_MEMRI),
        ]),
        (37, &[
            pat(0xfc000000, 0x94000000, Opcode::STWU, Features::NONE, &GPR_MEMRI),
        ]),
        (38, &[
            pat(0xfc000000, 0x98000000, Opcode::STB, Features::NONE, &GPR_MEMRI),
        ]),
        (39, &[
            pat(0xfc000000, 0x9c000000, Opcode::STBU, Features::NONE, &GPR_MEMRI),
        ]),
        (40, &[
            pat(0xfc000000, 0xa0000000, Opcode::LHZ, Features::NONE, &GPR_MEMRI),
        ]),
        (41, &[
            pat(0xfc000000, 0xa4000000, Opcode::LHZU, Features::NONE, &GPR_MEMRI),
        ]),
        (42, &[
            pat(0xfc000000, 0xa8000000, Opcode::LHA, Features::NONE, &GPR_MEMRI),
        ]),
        (43, &[
            pat(0xfc000000, 0xac000000, Opcode::LHAU, Features::NONE, &GPR_MEMRI),
        ]),
        (44, &[
            pat(0xfc000000, 0xb0000000, Opcode::STH, Features::NONE, &GPR_MEMRI),
        ]),
        (45, &[
            pat(0xfc000000, 0xb4000000, Opcode::STHU, Features::NONE, &GPR_MEMRI),
        ]),
        (48, &[
            pat(0xfc000000, 0xc0000000, Opcode::LFS, Features::NONE, &FPR4_MEMRI),
        ]),
        (49, &[
            pat(0xfc000000, 0xc4000000, Opcode::LFSU, Features::NONE, &FPR4_MEMRI),
        ]),
        (50, &[
            pat(0xfc000000, 0xc8000000, Opcode::LFD, Features::NONE, &FPR8_MEMRI),
        ]),
        (51, &[
            pat(0xfc000000, 0xcc000000, Opcode::LFDU, Features::NONE, &FPR8_MEMRI),
        ]),
        (52, &[
            pat(0xfc000000, 0xd0000000, Opcode::STFS, Features::NONE, &FPR4_MEMRI),
        ]),
        (53, &[
            pat(0xfc000000, 0xd4000000, Opcode::STFSU, Features::NONE, &FPR4_MEMRI),
        ]),
        (54, &[
            pat(0xfc000000, 0xd8000000, Opcode::STFD, Features::NONE, &FPR8_MEMRI),
        ]),
        (55, &[
            pat(0xfc000000, 0xdc000000, Opcode::STFDU, Features::NONE, &FPR8_MEMRI),
        ]),
        (58, &[
            pat(0xfc000003, 0xe8000000, Opcode::LD, Features::PPC64, &G8_MEMRIX),
            pat(0xfc000003, 0xe8000001, Opcode::LDU, Features::PPC64, &G8_MEMRIX),
            pat(0xfc000003, 0xe8000002, Opcode::LWA, Features::PPC64, &G8_MEMRIX),
        ]),
        (62, &[
            pat(0xfc000003, 0xf8000000, Opcode::STD, Features::PPC64, &G8_MEMRIX),
            pat(0xfc000003, 0xf8000001, Opcode::STDU, Features::PPC64, &G8_MEMRIX),
        ]),
    ],
};

// qpx shares major opcode 4 with altivec; this table is consulted first so
// qpx encodings win when the feature is enabled.
pub(crate) static QPX32: DecodeTable = DecodeTable {
    groups: &[
        (4, &[
            pat(0xfc0007ff, 0x10000028, Opcode::QVFSUB, Features::QPX, &QF_QF_QF),
            pat(0xfc0007ff, 0x1000002a, Opcode::QVFADD, Features::QPX, &QF_QF_QF),
        ]),
    ],
};
