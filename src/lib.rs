//! powerpc decoder. instruction words are a fixed four bytes; byte order and
//! enabled instruction-set extensions are properties of the `InstDecoder`.

#![no_std]

#[cfg(feature="use-serde")]
#[macro_use] extern crate serde_derive;
#[cfg(feature="use-serde")]
extern crate serde;
extern crate yaxpeax_arch;

mod tables;

use core::fmt::{self, Display, Formatter};

use yaxpeax_arch::{Arch, AddressDiff, Decoder, LengthedInstruction, Reader, ReadError};

use crate::tables::{OperandClass, Pattern};

#[derive(Debug, PartialEq, Copy, Clone)]
pub enum DecodeError {
    ExhaustedInput,
    InvalidOpcode,
    InvalidOperand,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use yaxpeax_arch::DecodeError;
        f.write_str(self.description())
    }
}

#[cfg(feature = "std")]
extern crate std;
#[cfg(feature = "std")]
impl std::error::Error for DecodeError {
    fn description(&self) -> &str {
        <Self as yaxpeax_arch::DecodeError>::description(self)
    }
}

impl From<ReadError> for DecodeError {
    fn from(_e: ReadError) -> DecodeError {
        DecodeError::ExhaustedInput
    }
}

impl yaxpeax_arch::DecodeError for DecodeError {
    fn data_exhausted(&self) -> bool { self == &DecodeError::ExhaustedInput }
    fn bad_opcode(&self) -> bool { self == &DecodeError::InvalidOpcode }
    fn bad_operand(&self) -> bool { self == &DecodeError::InvalidOperand }
    fn description(&self) -> &'static str {
        match self {
            DecodeError::ExhaustedInput => "exhausted input",
            DecodeError::InvalidOpcode => "invalid opcode",
            DecodeError::InvalidOperand => "invalid operand",
        }
    }
}

#[cfg(feature="use-serde")]
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct PPC { }

#[cfg(not(feature="use-serde"))]
#[derive(Copy, Clone, Debug)]
pub struct PPC { }

impl Arch for PPC {
    type Word = u8;
    type Address = u64;
    type Instruction = Instruction;
    type DecodeError = DecodeError;
    type Decoder = InstDecoder;
    type Operand = Operand;
}

/// A register, qualified by the bank it lives in. The same five-bit encoding
/// index names different registers depending on which bank the field refers
/// to.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Reg {
    /// 32-bit general-purpose register.
    Gpr(u8),
    /// 64-bit general-purpose register.
    Gpr64(u8),
    /// The hard-wired zero that index 0 denotes in base-register positions.
    Zero,
    /// Floating-point register.
    Fpr(u8),
    /// Upper-half vector alias of a vsx register, viewed as a scalar float.
    VecFpr(u8),
    /// Vector (altivec) register.
    Vec(u8),
    /// Low half (vs0-vs31) of the vsx bank.
    VsxLow(u8),
    /// High half (vs32-vs63) of the vsx bank.
    VsxHigh(u8),
    /// Condition register field cr0-cr7.
    Cr(u8),
    /// One of the 32 condition register bits.
    CrBit(u8),
    /// Quad-precision (qpx) register.
    QuadFpr(u8),
}

impl Display for Reg {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        match self {
            Reg::Gpr(n) => write!(fmt, "r{}", n),
            Reg::Gpr64(n) => write!(fmt, "r{}", n),
            Reg::Zero => write!(fmt, "0"),
            Reg::Fpr(n) => write!(fmt, "f{}", n),
            Reg::VecFpr(n) => write!(fmt, "vf{}", n),
            Reg::Vec(n) => write!(fmt, "v{}", n),
            Reg::VsxLow(n) => write!(fmt, "vs{}", n),
            Reg::VsxHigh(n) => write!(fmt, "vs{}", *n as u16 + 32),
            Reg::Cr(n) => write!(fmt, "cr{}", n),
            Reg::CrBit(n) => {
                write!(fmt, "cr{}{}", n >> 2, ["lt", "gt", "eq", "un"][(n & 3) as usize])
            }
            Reg::QuadFpr(n) => write!(fmt, "qf{}", n),
        }
    }
}

// one fixed table per register bank, indexed by the field's encoding value.
// banks that differ only in what index 0 means (a real register vs. the
// hard-wired zero) are distinct tables.

pub(crate) static GP_REGS: [Reg; 32] = [
    Reg::Gpr(0), Reg::Gpr(1), Reg::Gpr(2), Reg::Gpr(3),
    Reg::Gpr(4), Reg::Gpr(5), Reg::Gpr(6), Reg::Gpr(7),
    Reg::Gpr(8), Reg::Gpr(9), Reg::Gpr(10), Reg::Gpr(11),
    Reg::Gpr(12), Reg::Gpr(13), Reg::Gpr(14), Reg::Gpr(15),
    Reg::Gpr(16), Reg::Gpr(17), Reg::Gpr(18), Reg::Gpr(19),
    Reg::Gpr(20), Reg::Gpr(21), Reg::Gpr(22), Reg::Gpr(23),
    Reg::Gpr(24), Reg::Gpr(25), Reg::Gpr(26), Reg::Gpr(27),
    Reg::Gpr(28), Reg::Gpr(29), Reg::Gpr(30), Reg::Gpr(31),
];

pub(crate) static GP0_REGS: [Reg; 32] = [
    Reg::Zero, Reg::Gpr(1), Reg::Gpr(2), Reg::Gpr(3),
    Reg::Gpr(4), Reg::Gpr(5), Reg::Gpr(6), Reg::Gpr(7),
    Reg::Gpr(8), Reg::Gpr(9), Reg::Gpr(10), Reg::Gpr(11),
    Reg::Gpr(12), Reg::Gpr(13), Reg::Gpr(14), Reg::Gpr(15),
    Reg::Gpr(16), Reg::Gpr(17), Reg::Gpr(18), Reg::Gpr(19),
    Reg::Gpr(20), Reg::Gpr(21), Reg::Gpr(22), Reg::Gpr(23),
    Reg::Gpr(24), Reg::Gpr(25), Reg::Gpr(26), Reg::Gpr(27),
    Reg::Gpr(28), Reg::Gpr(29), Reg::Gpr(30), Reg::Gpr(31),
];

pub(crate) static G8_REGS: [Reg; 32] = [
    Reg::Gpr64(0), Reg::Gpr64(1), Reg::Gpr64(2), Reg::Gpr64(3),
    Reg::Gpr64(4), Reg::Gpr64(5), Reg::Gpr64(6), Reg::Gpr64(7),
    Reg::Gpr64(8), Reg::Gpr64(9), Reg::Gpr64(10), Reg::Gpr64(11),
    Reg::Gpr64(12), Reg::Gpr64(13), Reg::Gpr64(14), Reg::Gpr64(15),
    Reg::Gpr64(16), Reg::Gpr64(17), Reg::Gpr64(18), Reg::Gpr64(19),
    Reg::Gpr64(20), Reg::Gpr64(21), Reg::Gpr64(22), Reg::Gpr64(23),
    Reg::Gpr64(24), Reg::Gpr64(25), Reg::Gpr64(26), Reg::Gpr64(27),
    Reg::Gpr64(28), Reg::Gpr64(29), Reg::Gpr64(30), Reg::Gpr64(31),
];

pub(crate) static F_REGS: [Reg; 32] = [
    Reg::Fpr(0), Reg::Fpr(1), Reg::Fpr(2), Reg::Fpr(3),
    Reg::Fpr(4), Reg::Fpr(5), Reg::Fpr(6), Reg::Fpr(7),
    Reg::Fpr(8), Reg::Fpr(9), Reg::Fpr(10), Reg::Fpr(11),
    Reg::Fpr(12), Reg::Fpr(13), Reg::Fpr(14), Reg::Fpr(15),
    Reg::Fpr(16), Reg::Fpr(17), Reg::Fpr(18), Reg::Fpr(19),
    Reg::Fpr(20), Reg::Fpr(21), Reg::Fpr(22), Reg::Fpr(23),
    Reg::Fpr(24), Reg::Fpr(25), Reg::Fpr(26), Reg::Fpr(27),
    Reg::Fpr(28), Reg::Fpr(29), Reg::Fpr(30), Reg::Fpr(31),
];

pub(crate) static V_REGS: [Reg; 32] = [
    Reg::Vec(0), Reg::Vec(1), Reg::Vec(2), Reg::Vec(3),
    Reg::Vec(4), Reg::Vec(5), Reg::Vec(6), Reg::Vec(7),
    Reg::Vec(8), Reg::Vec(9), Reg::Vec(10), Reg::Vec(11),
    Reg::Vec(12), Reg::Vec(13), Reg::Vec(14), Reg::Vec(15),
    Reg::Vec(16), Reg::Vec(17), Reg::Vec(18), Reg::Vec(19),
    Reg::Vec(20), Reg::Vec(21), Reg::Vec(22), Reg::Vec(23),
    Reg::Vec(24), Reg::Vec(25), Reg::Vec(26), Reg::Vec(27),
    Reg::Vec(28), Reg::Vec(29), Reg::Vec(30), Reg::Vec(31),
];

// the 64-entry vsx bank; the two halves are one architectural numbering,
// vs0-vs63.
pub(crate) static VS_REGS: [Reg; 64] = [
    Reg::VsxLow(0), Reg::VsxLow(1), Reg::VsxLow(2), Reg::VsxLow(3),
    Reg::VsxLow(4), Reg::VsxLow(5), Reg::VsxLow(6), Reg::VsxLow(7),
    Reg::VsxLow(8), Reg::VsxLow(9), Reg::VsxLow(10), Reg::VsxLow(11),
    Reg::VsxLow(12), Reg::VsxLow(13), Reg::VsxLow(14), Reg::VsxLow(15),
    Reg::VsxLow(16), Reg::VsxLow(17), Reg::VsxLow(18), Reg::VsxLow(19),
    Reg::VsxLow(20), Reg::VsxLow(21), Reg::VsxLow(22), Reg::VsxLow(23),
    Reg::VsxLow(24), Reg::VsxLow(25), Reg::VsxLow(26), Reg::VsxLow(27),
    Reg::VsxLow(28), Reg::VsxLow(29), Reg::VsxLow(30), Reg::VsxLow(31),
    Reg::VsxHigh(0), Reg::VsxHigh(1), Reg::VsxHigh(2), Reg::VsxHigh(3),
    Reg::VsxHigh(4), Reg::VsxHigh(5), Reg::VsxHigh(6), Reg::VsxHigh(7),
    Reg::VsxHigh(8), Reg::VsxHigh(9), Reg::VsxHigh(10), Reg::VsxHigh(11),
    Reg::VsxHigh(12), Reg::VsxHigh(13), Reg::VsxHigh(14), Reg::VsxHigh(15),
    Reg::VsxHigh(16), Reg::VsxHigh(17), Reg::VsxHigh(18), Reg::VsxHigh(19),
    Reg::VsxHigh(20), Reg::VsxHigh(21), Reg::VsxHigh(22), Reg::VsxHigh(23),
    Reg::VsxHigh(24), Reg::VsxHigh(25), Reg::VsxHigh(26), Reg::VsxHigh(27),
    Reg::VsxHigh(28), Reg::VsxHigh(29), Reg::VsxHigh(30), Reg::VsxHigh(31),
];

// scalar-float view of the vsx bank: the low half aliases the fp registers,
// the high half the vector registers' upper doublewords.
pub(crate) static VSF_REGS: [Reg; 64] = [
    Reg::Fpr(0), Reg::Fpr(1), Reg::Fpr(2), Reg::Fpr(3),
    Reg::Fpr(4), Reg::Fpr(5), Reg::Fpr(6), Reg::Fpr(7),
    Reg::Fpr(8), Reg::Fpr(9), Reg::Fpr(10), Reg::Fpr(11),
    Reg::Fpr(12), Reg::Fpr(13), Reg::Fpr(14), Reg::Fpr(15),
    Reg::Fpr(16), Reg::Fpr(17), Reg::Fpr(18), Reg::Fpr(19),
    Reg::Fpr(20), Reg::Fpr(21), Reg::Fpr(22), Reg::Fpr(23),
    Reg::Fpr(24), Reg::Fpr(25), Reg::Fpr(26), Reg::Fpr(27),
    Reg::Fpr(28), Reg::Fpr(29), Reg::Fpr(30), Reg::Fpr(31),
    Reg::VecFpr(0), Reg::VecFpr(1), Reg::VecFpr(2), Reg::VecFpr(3),
    Reg::VecFpr(4), Reg::VecFpr(5), Reg::VecFpr(6), Reg::VecFpr(7),
    Reg::VecFpr(8), Reg::VecFpr(9), Reg::VecFpr(10), Reg::VecFpr(11),
    Reg::VecFpr(12), Reg::VecFpr(13), Reg::VecFpr(14), Reg::VecFpr(15),
    Reg::VecFpr(16), Reg::VecFpr(17), Reg::VecFpr(18), Reg::VecFpr(19),
    Reg::VecFpr(20), Reg::VecFpr(21), Reg::VecFpr(22), Reg::VecFpr(23),
    Reg::VecFpr(24), Reg::VecFpr(25), Reg::VecFpr(26), Reg::VecFpr(27),
    Reg::VecFpr(28), Reg::VecFpr(29), Reg::VecFpr(30), Reg::VecFpr(31),
];

pub(crate) static CR_REGS: [Reg; 8] = [
    Reg::Cr(0), Reg::Cr(1), Reg::Cr(2), Reg::Cr(3),
    Reg::Cr(4), Reg::Cr(5), Reg::Cr(6), Reg::Cr(7),
];

pub(crate) static CRBIT_REGS: [Reg; 32] = [
    Reg::CrBit(0), Reg::CrBit(1), Reg::CrBit(2), Reg::CrBit(3),
    Reg::CrBit(4), Reg::CrBit(5), Reg::CrBit(6), Reg::CrBit(7),
    Reg::CrBit(8), Reg::CrBit(9), Reg::CrBit(10), Reg::CrBit(11),
    Reg::CrBit(12), Reg::CrBit(13), Reg::CrBit(14), Reg::CrBit(15),
    Reg::CrBit(16), Reg::CrBit(17), Reg::CrBit(18), Reg::CrBit(19),
    Reg::CrBit(20), Reg::CrBit(21), Reg::CrBit(22), Reg::CrBit(23),
    Reg::CrBit(24), Reg::CrBit(25), Reg::CrBit(26), Reg::CrBit(27),
    Reg::CrBit(28), Reg::CrBit(29), Reg::CrBit(30), Reg::CrBit(31),
];

pub(crate) static QF_REGS: [Reg; 32] = [
    Reg::QuadFpr(0), Reg::QuadFpr(1), Reg::QuadFpr(2), Reg::QuadFpr(3),
    Reg::QuadFpr(4), Reg::QuadFpr(5), Reg::QuadFpr(6), Reg::QuadFpr(7),
    Reg::QuadFpr(8), Reg::QuadFpr(9), Reg::QuadFpr(10), Reg::QuadFpr(11),
    Reg::QuadFpr(12), Reg::QuadFpr(13), Reg::QuadFpr(14), Reg::QuadFpr(15),
    Reg::QuadFpr(16), Reg::QuadFpr(17), Reg::QuadFpr(18), Reg::QuadFpr(19),
    Reg::QuadFpr(20), Reg::QuadFpr(21), Reg::QuadFpr(22), Reg::QuadFpr(23),
    Reg::QuadFpr(24), Reg::QuadFpr(25), Reg::QuadFpr(26), Reg::QuadFpr(27),
    Reg::QuadFpr(28), Reg::QuadFpr(29), Reg::QuadFpr(30), Reg::QuadFpr(31),
];

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Operand {
    Nothing,
    Reg(Reg),
    Imm(i64),
}

impl Display for Operand {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        match self {
            Operand::Nothing => {
                unreachable!();
            }
            Operand::Reg(reg) => {
                write!(fmt, "{}", reg)
            }
            Operand::Imm(imm) => {
                if *imm < 0 {
                    write!(fmt, "-{:#x}", imm.wrapping_neg())
                } else {
                    write!(fmt, "{:#x}", imm)
                }
            }
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
#[repr(u8)]
pub enum Opcode {
    Invalid,
    ADDI,
    ADDIS,
    ADDIC,
    SUBFIC,
    MULLI,
    CMPWI,
    CMPLWI,
    ORI,
    ORIS,
    XORI,
    XORIS,
    ADD,
    SUBF,
    NEG,
    AND,
    OR,
    XOR,
    MCRF,
    CRAND,
    CRXOR,
    CROR,
    MTOCRF,
    MFOCRF,
    MFVSRD,
    LBZ,
    LBZU,
    LHZ,
    LHZU,
    LHA,
    LHAU,
    LWZ,
    LWZU,
    LD,
    LDU,
    LWA,
    STB,
    STBU,
    STH,
    STHU,
    STW,
    STWU,
    STD,
    STDU,
    LFS,
    LFSU,
    LFD,
    LFDU,
    STFS,
    STFSU,
    STFD,
    STFDU,
    LXVD2X,
    STXVD2X,
    VADDUBM,
    VSUBUBM,
    VOR,
    QVFADD,
    QVFSUB,
}

impl Display for Opcode {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        fmt.write_str(match self {
            Opcode::Invalid => "invalid",
            Opcode::ADDI => "addi",
            Opcode::ADDIS => "addis",
            Opcode::ADDIC => "addic",
            Opcode::SUBFIC => "subfic",
            Opcode::MULLI => "mulli",
            Opcode::CMPWI => "cmpwi",
            Opcode::CMPLWI => "cmplwi",
            Opcode::ORI => "ori",
            Opcode::ORIS => "oris",
            Opcode::XORI => "xori",
            Opcode::XORIS => "xoris",
            Opcode::ADD => "add",
            Opcode::SUBF => "subf",
            Opcode::NEG => "neg",
            Opcode::AND => "and",
            Opcode::OR => "or",
            Opcode::XOR => "xor",
            Opcode::MCRF => "mcrf",
            Opcode::CRAND => "crand",
            Opcode::CRXOR => "crxor",
            Opcode::CROR => "cror",
            Opcode::MTOCRF => "mtocrf",
            Opcode::MFOCRF => "mfocrf",
            Opcode::MFVSRD => "mfvsrd",
            Opcode::LBZ => "lbz",
            Opcode::LBZU => "lbzu",
            Opcode::LHZ => "lhz",
            Opcode::LHZU => "lhzu",
            Opcode::LHA => "lha",
            Opcode::LHAU => "lhau",
            Opcode::LWZ => "lwz",
            Opcode::LWZU => "lwzu",
            Opcode::LD => "ld",
            Opcode::LDU => "ldu",
            Opcode::LWA => "lwa",
            Opcode::STB => "stb",
            Opcode::STBU => "stbu",
            Opcode::STH => "sth",
            Opcode::STHU => "sthu",
            Opcode::STW => "stw",
            Opcode::STWU => "stwu",
            Opcode::STD => "std",
            Opcode::STDU => "stdu",
            Opcode::LFS => "lfs",
            Opcode::LFSU => "lfsu",
            Opcode::LFD => "lfd",
            Opcode::LFDU => "lfdu",
            Opcode::STFS => "stfs",
            Opcode::STFSU => "stfsu",
            Opcode::STFD => "stfd",
            Opcode::STFDU => "stfdu",
            Opcode::LXVD2X => "lxvd2x",
            Opcode::STXVD2X => "stxvd2x",
            Opcode::VADDUBM => "vaddubm",
            Opcode::VSUBUBM => "vsububm",
            Opcode::VOR => "vor",
            Opcode::QVFADD => "qvfadd",
            Opcode::QVFSUB => "qvfsub",
        })
    }
}

/// How a load/store's update (writeback) form alters the operand list: the
/// base register is also written, and the decoder synthesizes that tied
/// operand instead of reading it from a distinct field.
#[derive(Copy, Clone, Debug, PartialEq)]
enum UpdateForm {
    None,
    /// The tied base follows the data register already in the list.
    Load,
    /// The tied base is inserted ahead of every other operand.
    Store,
}

// new update-form opcodes are added here; the memory operand decoders
// themselves never name specific opcodes.
fn update_form(opcode: Opcode) -> UpdateForm {
    match opcode {
        Opcode::LBZU |
        Opcode::LHAU |
        Opcode::LHZU |
        Opcode::LWZU |
        Opcode::LFSU |
        Opcode::LFDU |
        Opcode::LDU => UpdateForm::Load,
        Opcode::STBU |
        Opcode::STHU |
        Opcode::STWU |
        Opcode::STFSU |
        Opcode::STFDU |
        Opcode::STDU => UpdateForm::Store,
        _ => UpdateForm::None,
    }
}

// opcodes whose last two operands are a displacement and a base register,
// rendered as `disp(base)`.
fn is_mem_form(opcode: Opcode) -> bool {
    match opcode {
        Opcode::LBZ | Opcode::LBZU |
        Opcode::LHZ | Opcode::LHZU |
        Opcode::LHA | Opcode::LHAU |
        Opcode::LWZ | Opcode::LWZU |
        Opcode::LD | Opcode::LDU | Opcode::LWA |
        Opcode::STB | Opcode::STBU |
        Opcode::STH | Opcode::STHU |
        Opcode::STW | Opcode::STWU |
        Opcode::STD | Opcode::STDU |
        Opcode::LFS | Opcode::LFSU |
        Opcode::LFD | Opcode::LFDU |
        Opcode::STFS | Opcode::STFSU |
        Opcode::STFD | Opcode::STFDU => true,
        _ => false,
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Instruction {
    pub opcode: Opcode,
    pub operands: [Operand; 4],
}

impl Default for Instruction {
    fn default() -> Self {
        Instruction {
            opcode: Opcode::Invalid,
            operands: [Operand::Nothing, Operand::Nothing, Operand::Nothing, Operand::Nothing],
        }
    }
}

impl Instruction {
    fn push_operand(&mut self, operand: Operand) -> Result<(), DecodeError> {
        for slot in self.operands.iter_mut() {
            if *slot == Operand::Nothing {
                *slot = operand;
                return Ok(());
            }
        }
        // the table promised more operands than an instruction can hold
        Err(DecodeError::InvalidOperand)
    }

    fn insert_operand(&mut self, index: usize, operand: Operand) -> Result<(), DecodeError> {
        let last = self.operands.len() - 1;
        if index > last || self.operands[last] != Operand::Nothing {
            return Err(DecodeError::InvalidOperand);
        }
        let mut i = last;
        while i > index {
            self.operands[i] = self.operands[i - 1];
            i -= 1;
        }
        self.operands[index] = operand;
        Ok(())
    }
}

impl Display for Instruction {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        write!(fmt, "{}", self.opcode)?;
        if is_mem_form(self.opcode) {
            // update forms carry a tied copy of the base register that is
            // not shown in assembly.
            let (target, disp, base) = match update_form(self.opcode) {
                UpdateForm::Load => (0, 2, 3),
                UpdateForm::Store => (1, 2, 3),
                UpdateForm::None => (0, 1, 2),
            };
            return write!(
                fmt, " {}, {}({})",
                self.operands[target], self.operands[disp], self.operands[base]
            );
        }
        let mut sep = " ";
        for operand in self.operands.iter() {
            if let Operand::Nothing = operand {
                break;
            }
            write!(fmt, "{}{}", sep, operand)?;
            sep = ", ";
        }
        Ok(())
    }
}

impl yaxpeax_arch::Instruction for Instruction {
    fn well_defined(&self) -> bool { self.opcode != Opcode::Invalid }
}

impl LengthedInstruction for Instruction {
    type Unit = AddressDiff<<PPC as Arch>::Address>;
    fn min_size() -> Self::Unit {
        AddressDiff::from_const(4)
    }
    fn len(&self) -> Self::Unit {
        AddressDiff::from_const(4)
    }
}

/// Enabled instruction-set extensions. Patterns in the decode tables name
/// the feature they require; a decoder only matches patterns whose features
/// are all enabled.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Features(u16);

impl Features {
    pub const NONE: Features = Features(0);
    pub const ALTIVEC: Features = Features(1 << 0);
    pub const PPC64: Features = Features(1 << 1);
    pub const VSX: Features = Features(1 << 2);
    pub const QPX: Features = Features(1 << 3);
    pub const ALL: Features = Features(0b1111);

    pub const fn with(self, other: Features) -> Features {
        Features(self.0 | other.0)
    }

    pub const fn without(self, other: Features) -> Features {
        Features(self.0 & !other.0)
    }

    pub const fn contains(self, other: Features) -> bool {
        self.0 & other.0 == other.0
    }
}

fn word_field(word: u32, lo: u8, len: u8) -> u32 {
    (word >> lo) & ((1u32 << len) - 1)
}

fn sign_extend(value: u64, width: u8) -> i64 {
    let shift = 64 - width;
    ((value << shift) as i64) >> shift
}

fn decode_register_operand(inst: &mut Instruction, bank: &[Reg], index: u32) -> Result<(), DecodeError> {
    let reg = *bank.get(index as usize).ok_or(DecodeError::InvalidOperand)?;
    inst.push_operand(Operand::Reg(reg))
}

// the memri field packs a 16-bit displacement in the low bits with the base
// register number in the five bits above it.
fn decode_mem_ri(inst: &mut Instruction, raw: u32) -> Result<(), DecodeError> {
    let base = *GP0_REGS.get((raw >> 16) as usize).ok_or(DecodeError::InvalidOperand)?;
    let disp = raw & 0xffff;
    match update_form(inst.opcode) {
        UpdateForm::Load => { inst.push_operand(Operand::Reg(base))?; }
        UpdateForm::Store => { inst.insert_operand(0, Operand::Reg(base))?; }
        UpdateForm::None => {}
    }
    inst.push_operand(Operand::Imm(sign_extend(disp as u64, 16)))?;
    inst.push_operand(Operand::Reg(base))
}

// the memrix field is the doubleword variant: a 14-bit displacement, scaled
// by four, below the base register number.
fn decode_mem_rix(inst: &mut Instruction, raw: u32) -> Result<(), DecodeError> {
    let base = *GP0_REGS.get((raw >> 14) as usize).ok_or(DecodeError::InvalidOperand)?;
    let disp = raw & 0x3fff;
    match update_form(inst.opcode) {
        UpdateForm::Load => { inst.push_operand(Operand::Reg(base))?; }
        UpdateForm::Store => { inst.insert_operand(0, Operand::Reg(base))?; }
        UpdateForm::None => {}
    }
    inst.push_operand(Operand::Imm(sign_extend((disp << 2) as u64, 16)))?;
    inst.push_operand(Operand::Reg(base))
}

// a condition register field encoded as the one-hot mask `0x80 >> crN`.
fn decode_cr_bit_mask(inst: &mut Instruction, raw: u32) -> Result<(), DecodeError> {
    if raw == 0 || raw & (raw - 1) != 0 {
        return Err(DecodeError::InvalidOperand);
    }
    let zeros = raw.trailing_zeros();
    if zeros > 7 {
        return Err(DecodeError::InvalidOperand);
    }
    inst.push_operand(Operand::Reg(CR_REGS[(7 - zeros) as usize]))
}

fn decode_operand(inst: &mut Instruction, class: OperandClass, raw: u32, width: u8) -> Result<(), DecodeError> {
    match class {
        OperandClass::Gpr => decode_register_operand(inst, &GP_REGS, raw),
        OperandClass::GprNoR0 => decode_register_operand(inst, &GP0_REGS, raw),
        OperandClass::Gpr64 => decode_register_operand(inst, &G8_REGS, raw),
        OperandClass::Fpr4 => decode_register_operand(inst, &F_REGS, raw),
        OperandClass::Fpr8 => decode_register_operand(inst, &F_REGS, raw),
        OperandClass::Vec => decode_register_operand(inst, &V_REGS, raw),
        OperandClass::Vsx => decode_register_operand(inst, &VS_REGS, raw),
        OperandClass::VsxFpr => decode_register_operand(inst, &VSF_REGS, raw),
        OperandClass::QuadFpr => decode_register_operand(inst, &QF_REGS, raw),
        OperandClass::Cr => decode_register_operand(inst, &CR_REGS, raw),
        OperandClass::CrBit => decode_register_operand(inst, &CRBIT_REGS, raw),
        OperandClass::UImm => inst.push_operand(Operand::Imm(raw as i64)),
        OperandClass::SImm => inst.push_operand(Operand::Imm(sign_extend(raw as u64, width))),
        OperandClass::MemRI => decode_mem_ri(inst, raw),
        OperandClass::MemRIX => decode_mem_rix(inst, raw),
        OperandClass::CrBitMask => decode_cr_bit_mask(inst, raw),
    }
}

fn decode_pattern(inst: &mut Instruction, word: u32, pattern: &Pattern) -> Result<(), DecodeError> {
    inst.opcode = pattern.opcode;
    for field in pattern.fields.iter() {
        let mut raw = word_field(word, field.lo, field.len);
        if field.ext_len != 0 {
            raw |= word_field(word, field.ext_lo, field.ext_len) << field.len;
        }
        decode_operand(inst, field.class, raw, field.len + field.ext_len)?;
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstDecoder {
    big_endian: bool,
    features: Features,
}

impl Default for InstDecoder {
    fn default() -> Self {
        InstDecoder {
            big_endian: true,
            features: Features::ALL,
        }
    }
}

impl InstDecoder {
    pub fn set_little_endian(&mut self, little_endian: bool) {
        self.big_endian = !little_endian;
    }

    pub fn set_features(&mut self, features: Features) {
        self.features = features;
    }

    pub fn features(&self) -> Features {
        self.features
    }
}

impl Decoder<PPC> for InstDecoder {
    fn decode_into<T: Reader<<PPC as Arch>::Address, <PPC as Arch>::Word>>(&self, inst: &mut Instruction, words: &mut T) -> Result<(), <PPC as Arch>::DecodeError> {
        let mut word_bytes = [0u8; 4];
        words.next_n(&mut word_bytes)?;
        let word = if self.big_endian {
            u32::from_be_bytes(word_bytes)
        } else {
            u32::from_le_bytes(word_bytes)
        };

        if self.features.contains(Features::QPX) {
            if let Some(pattern) = tables::QPX32.lookup(word, self.features) {
                *inst = Instruction::default();
                if decode_pattern(inst, word, pattern).is_ok() {
                    return Ok(());
                }
            }
        }

        // a failed attempt against an earlier table must leave nothing
        // behind; operand positions are opcode-dependent.
        *inst = Instruction::default();
        match tables::PRIMARY32.lookup(word, self.features) {
            Some(pattern) => decode_pattern(inst, word, pattern),
            None => Err(DecodeError::InvalidOpcode),
        }
    }
}
