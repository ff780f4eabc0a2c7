use yaxpeax_arch::{Decoder, U8Reader};
use yaxpeax_ppc::{DecodeError, Features, InstDecoder, Instruction, Opcode, Operand, Reg};

fn test_decode(data: [u8; 4], expected: Instruction) {
    let decoder = InstDecoder::default();
    let mut reader = U8Reader::new(&data[..]);
    match decoder.decode(&mut reader) {
        Ok(inst) => {
            assert!(
                inst == expected,
                "decode error for {:02x}{:02x}{:02x}{:02x}:\n  decoded: {:?}\n expected: {:?}\n",
                data[0], data[1], data[2], data[3],
                inst, expected
            );
        }
        Err(e) => {
            panic!("decode error ({}) for {:02x}{:02x}{:02x}{:02x}", e, data[0], data[1], data[2], data[3]);
        }
    }
}

fn test_display(data: [u8; 4], expected: &'static str) {
    let decoder = InstDecoder::default();
    let mut reader = U8Reader::new(&data[..]);
    match decoder.decode(&mut reader) {
        Ok(inst) => {
            let text = inst.to_string();
            assert!(
                text == expected,
                "display error for {:02x}{:02x}{:02x}{:02x}:\n  decoded: {:?}\n displayed: {}\n  expected: {}\n",
                data[0], data[1], data[2], data[3],
                inst, text, expected
            );
        }
        Err(e) => {
            panic!("decode error ({}) for {:02x}{:02x}{:02x}{:02x}", e, data[0], data[1], data[2], data[3]);
        }
    }
}

fn test_invalid(data: [u8; 4], expected: DecodeError) {
    let decoder = InstDecoder::default();
    let mut reader = U8Reader::new(&data[..]);
    match decoder.decode(&mut reader) {
        Ok(inst) => {
            panic!(
                "decoded {:02x}{:02x}{:02x}{:02x} to {} but expected {}",
                data[0], data[1], data[2], data[3], inst, expected
            );
        }
        Err(e) => {
            assert_eq!(e, expected);
        }
    }
}

fn instr(opcode: Opcode, operands: [Operand; 4]) -> Instruction {
    Instruction { opcode, operands }
}

#[test]
fn test_d_form_arithmetic() {
    // addi r3, 0, 16
    test_decode(0x38600010u32.to_be_bytes(), instr(Opcode::ADDI, [
        Operand::Reg(Reg::Gpr(3)), Operand::Reg(Reg::Zero), Operand::Imm(0x10), Operand::Nothing,
    ]));
    test_display(0x38600010u32.to_be_bytes(), "addi r3, 0, 0x10");
    // addi r4, r5, -1
    test_decode(0x3885ffffu32.to_be_bytes(), instr(Opcode::ADDI, [
        Operand::Reg(Reg::Gpr(4)), Operand::Reg(Reg::Gpr(5)), Operand::Imm(-1), Operand::Nothing,
    ]));
    // addi r0, r1, -32768
    test_decode(0x38018000u32.to_be_bytes(), instr(Opcode::ADDI, [
        Operand::Reg(Reg::Gpr(0)), Operand::Reg(Reg::Gpr(1)), Operand::Imm(-32768), Operand::Nothing,
    ]));
    // cmpwi cr7, r3, 100
    test_decode(0x2f830064u32.to_be_bytes(), instr(Opcode::CMPWI, [
        Operand::Reg(Reg::Cr(7)), Operand::Reg(Reg::Gpr(3)), Operand::Imm(100), Operand::Nothing,
    ]));
    // ori r4, r3, 0xffff
    test_decode(0x6064ffffu32.to_be_bytes(), instr(Opcode::ORI, [
        Operand::Reg(Reg::Gpr(4)), Operand::Reg(Reg::Gpr(3)), Operand::Imm(0xffff), Operand::Nothing,
    ]));
}

#[test]
fn test_x_form_arithmetic() {
    // add r7, r8, r9
    test_decode(0x7ce84a14u32.to_be_bytes(), instr(Opcode::ADD, [
        Operand::Reg(Reg::Gpr(7)), Operand::Reg(Reg::Gpr(8)), Operand::Reg(Reg::Gpr(9)), Operand::Nothing,
    ]));
    // neg r3, r4
    test_decode(0x7c6400d0u32.to_be_bytes(), instr(Opcode::NEG, [
        Operand::Reg(Reg::Gpr(3)), Operand::Reg(Reg::Gpr(4)), Operand::Nothing, Operand::Nothing,
    ]));
}

#[test]
fn test_memri_loads_stores() {
    // lwz r3, 16(r5)
    test_decode(0x80650010u32.to_be_bytes(), instr(Opcode::LWZ, [
        Operand::Reg(Reg::Gpr(3)), Operand::Imm(0x10), Operand::Reg(Reg::Gpr(5)), Operand::Nothing,
    ]));
    test_display(0x80650010u32.to_be_bytes(), "lwz r3, 0x10(r5)");
    // lwz r3, 16(0): base index 0 is the literal zero
    test_decode(0x80600010u32.to_be_bytes(), instr(Opcode::LWZ, [
        Operand::Reg(Reg::Gpr(3)), Operand::Imm(0x10), Operand::Reg(Reg::Zero), Operand::Nothing,
    ]));
    test_display(0x80600010u32.to_be_bytes(), "lwz r3, 0x10(0)");
}

#[test]
fn test_update_forms() {
    // stwu r1, 16(r5): tied base leads the operand list
    test_decode(0x94250010u32.to_be_bytes(), instr(Opcode::STWU, [
        Operand::Reg(Reg::Gpr(5)), Operand::Reg(Reg::Gpr(1)), Operand::Imm(0x10), Operand::Reg(Reg::Gpr(5)),
    ]));
    test_display(0x94250010u32.to_be_bytes(), "stwu r1, 0x10(r5)");
    // lwzu r3, -4(r9): tied base follows the destination
    test_decode(0x8469fffcu32.to_be_bytes(), instr(Opcode::LWZU, [
        Operand::Reg(Reg::Gpr(3)), Operand::Reg(Reg::Gpr(9)), Operand::Imm(-4), Operand::Reg(Reg::Gpr(9)),
    ]));
    test_display(0x8469fffcu32.to_be_bytes(), "lwzu r3, -0x4(r9)");
    // lfdu f2, 8(r3)
    test_decode(0xcc430008u32.to_be_bytes(), instr(Opcode::LFDU, [
        Operand::Reg(Reg::Fpr(2)), Operand::Reg(Reg::Gpr(3)), Operand::Imm(8), Operand::Reg(Reg::Gpr(3)),
    ]));
    // stfsu f1, 4(r9)
    test_decode(0xd4290004u32.to_be_bytes(), instr(Opcode::STFSU, [
        Operand::Reg(Reg::Gpr(9)), Operand::Reg(Reg::Fpr(1)), Operand::Imm(4), Operand::Reg(Reg::Gpr(9)),
    ]));
}

#[test]
fn test_memrix_loads_stores() {
    // ld r5, 32(r2)
    test_decode(0xe8a20020u32.to_be_bytes(), instr(Opcode::LD, [
        Operand::Reg(Reg::Gpr64(5)), Operand::Imm(0x20), Operand::Reg(Reg::Gpr(2)), Operand::Nothing,
    ]));
    // ldu r4, 8(r3)
    test_decode(0xe8830009u32.to_be_bytes(), instr(Opcode::LDU, [
        Operand::Reg(Reg::Gpr64(4)), Operand::Reg(Reg::Gpr(3)), Operand::Imm(8), Operand::Reg(Reg::Gpr(3)),
    ]));
    // stdu r1, -16(r1)
    test_decode(0xf821fff1u32.to_be_bytes(), instr(Opcode::STDU, [
        Operand::Reg(Reg::Gpr(1)), Operand::Reg(Reg::Gpr64(1)), Operand::Imm(-0x10), Operand::Reg(Reg::Gpr(1)),
    ]));
    test_display(0xf821fff1u32.to_be_bytes(), "stdu r1, -0x10(r1)");
}

#[test]
fn test_cr_field_moves() {
    // mtocrf 0x80, r2: one-hot mask names cr0
    test_decode(0x7c580120u32.to_be_bytes(), instr(Opcode::MTOCRF, [
        Operand::Reg(Reg::Cr(0)), Operand::Reg(Reg::Gpr(2)), Operand::Nothing, Operand::Nothing,
    ]));
    // mfocrf r3, 0x01: one-hot mask names cr7
    test_decode(0x7c701026u32.to_be_bytes(), instr(Opcode::MFOCRF, [
        Operand::Reg(Reg::Gpr(3)), Operand::Reg(Reg::Cr(7)), Operand::Nothing, Operand::Nothing,
    ]));
    // zero mask
    test_invalid(0x7c500120u32.to_be_bytes(), DecodeError::InvalidOperand);
    // two bits set
    test_invalid(0x7c581120u32.to_be_bytes(), DecodeError::InvalidOperand);
}

#[test]
fn test_cr_logic() {
    // crand 4, 5, 6
    test_decode(0x4c853202u32.to_be_bytes(), instr(Opcode::CRAND, [
        Operand::Reg(Reg::CrBit(4)), Operand::Reg(Reg::CrBit(5)), Operand::Reg(Reg::CrBit(6)), Operand::Nothing,
    ]));
    test_display(0x4c853202u32.to_be_bytes(), "crand cr1lt, cr1gt, cr1eq");
    // mcrf cr7, cr2
    test_decode(0x4f880000u32.to_be_bytes(), instr(Opcode::MCRF, [
        Operand::Reg(Reg::Cr(7)), Operand::Reg(Reg::Cr(2)), Operand::Nothing, Operand::Nothing,
    ]));
}

#[test]
fn test_vector() {
    // vaddubm v1, v2, v3
    test_decode(0x10221800u32.to_be_bytes(), instr(Opcode::VADDUBM, [
        Operand::Reg(Reg::Vec(1)), Operand::Reg(Reg::Vec(2)), Operand::Reg(Reg::Vec(3)), Operand::Nothing,
    ]));
}

#[test]
fn test_vsx_split_fields() {
    // lxvd2x vs34, r4, r5: register number's high bit rides in bit 0
    test_decode(0x7c442e99u32.to_be_bytes(), instr(Opcode::LXVD2X, [
        Operand::Reg(Reg::VsxHigh(2)), Operand::Reg(Reg::Gpr(4)), Operand::Reg(Reg::Gpr(5)), Operand::Nothing,
    ]));
    test_display(0x7c442e99u32.to_be_bytes(), "lxvd2x vs34, r4, r5");
    // mfvsrd r3, f5 (sx = 0)
    test_decode(0x7ca30066u32.to_be_bytes(), instr(Opcode::MFVSRD, [
        Operand::Reg(Reg::Gpr64(3)), Operand::Reg(Reg::Fpr(5)), Operand::Nothing, Operand::Nothing,
    ]));
    // mfvsrd r3, vs37 (sx = 1) is the scalar view of v5
    test_decode(0x7ca30067u32.to_be_bytes(), instr(Opcode::MFVSRD, [
        Operand::Reg(Reg::Gpr64(3)), Operand::Reg(Reg::VecFpr(5)), Operand::Nothing, Operand::Nothing,
    ]));
    test_display(0x7ca30067u32.to_be_bytes(), "mfvsrd r3, vf5");
}

#[test]
fn test_qpx() {
    // qvfadd qf1, qf2, qf3: extension table is consulted before the primary
    test_decode(0x1022182au32.to_be_bytes(), instr(Opcode::QVFADD, [
        Operand::Reg(Reg::QuadFpr(1)), Operand::Reg(Reg::QuadFpr(2)), Operand::Reg(Reg::QuadFpr(3)), Operand::Nothing,
    ]));

    let mut decoder = InstDecoder::default();
    decoder.set_features(Features::ALL.without(Features::QPX));
    let data = 0x1022182au32.to_be_bytes();
    let mut reader = U8Reader::new(&data[..]);
    assert_eq!(decoder.decode(&mut reader), Err(DecodeError::InvalidOpcode));
}

#[test]
fn test_qpx_fallthrough_leaves_no_residue() {
    // an altivec word misses the extension table; the fallback decode must
    // look exactly like a decode with qpx disabled
    let data = 0x10221800u32.to_be_bytes();

    let with_qpx = InstDecoder::default();
    let mut reader = U8Reader::new(&data[..]);
    let a = with_qpx.decode(&mut reader);

    let mut without_qpx = InstDecoder::default();
    without_qpx.set_features(Features::ALL.without(Features::QPX));
    let mut reader = U8Reader::new(&data[..]);
    let b = without_qpx.decode(&mut reader);

    assert_eq!(a, b);
    assert_eq!(a.map(|inst| inst.opcode), Ok(Opcode::VADDUBM));
}

#[test]
fn test_feature_gating() {
    let mut decoder = InstDecoder::default();
    decoder.set_features(Features::NONE);

    // ld needs ppc64
    let data = 0xe8a20020u32.to_be_bytes();
    let mut reader = U8Reader::new(&data[..]);
    assert_eq!(decoder.decode(&mut reader), Err(DecodeError::InvalidOpcode));

    // add is base-isa and still decodes
    let data = 0x7ce84a14u32.to_be_bytes();
    let mut reader = U8Reader::new(&data[..]);
    assert_eq!(decoder.decode(&mut reader).map(|inst| inst.opcode), Ok(Opcode::ADD));
}

#[test]
fn test_endianness() {
    let be = [0x94u8, 0x25, 0x00, 0x10];
    let le = [0x10u8, 0x00, 0x25, 0x94];

    let be_decoder = InstDecoder::default();
    let mut reader = U8Reader::new(&be[..]);
    let a = be_decoder.decode(&mut reader);

    let mut le_decoder = InstDecoder::default();
    le_decoder.set_little_endian(true);
    let mut reader = U8Reader::new(&le[..]);
    let b = le_decoder.decode(&mut reader);

    assert_eq!(a, b);
    assert_eq!(a.map(|inst| inst.opcode), Ok(Opcode::STWU));
}

#[test]
fn test_short_input() {
    let decoder = InstDecoder::default();
    let data = [0x7cu8, 0x00, 0x12];
    let mut reader = U8Reader::new(&data[..]);
    assert_eq!(decoder.decode(&mut reader), Err(DecodeError::ExhaustedInput));
}

#[test]
fn test_undefined_word() {
    let decoder = InstDecoder::default();
    let data = [0x00u8, 0x00, 0x00, 0x00];
    let mut reader = U8Reader::new(&data[..]);
    assert_eq!(decoder.decode(&mut reader), Err(DecodeError::InvalidOpcode));
}
