//! Hand-checked ALU vectors loaded from `tests/data/alu_vectors.json`.
//!
//! Numbers are hex strings so the file reads like a datasheet table.

use serde::Deserialize;
use sharp_sm83::Registers;

#[derive(Deserialize)]
struct Vector {
    name: String,
    op: String,
    #[serde(default)]
    a: Option<String>,
    #[serde(default)]
    hl: Option<String>,
    operand: String,
    f: String,
    #[serde(default)]
    expect_a: Option<String>,
    #[serde(default)]
    expect_hl: Option<String>,
    expect_f: String,
}

fn hex(s: &str) -> u16 {
    u16::from_str_radix(s.trim_start_matches("0x"), 16).expect("hex number")
}

fn hex8(s: &str) -> u8 {
    u8::try_from(hex(s)).expect("byte")
}

#[test]
fn alu_vectors() {
    let text = include_str!("data/alu_vectors.json");
    let vectors: Vec<Vector> = serde_json::from_str(text).expect("valid vector file");
    assert!(!vectors.is_empty());

    for v in &vectors {
        let mut regs = Registers::new();
        regs.set_f(hex8(&v.f));
        if let Some(a) = &v.a {
            regs.a = hex8(a);
        }
        if let Some(hl) = &v.hl {
            regs.hl.set(hex(hl));
        }

        let operand = hex(&v.operand);
        let byte = operand as u8;
        match v.op.as_str() {
            "add" => regs.add_a(byte),
            "adc" => regs.adc_a(byte),
            "sub" => regs.sub_a(byte),
            "sbc" => regs.sbc_a(byte),
            "cp" => regs.cp_a(byte),
            "and" => regs.and_a(byte),
            "or" => regs.or_a(byte),
            "xor" => regs.xor_a(byte),
            "inc" => regs.a = regs.inc(regs.a),
            "dec" => regs.a = regs.dec(regs.a),
            "rlca" => regs.rlca(),
            "rrca" => regs.rrca(),
            "rla" => regs.rla(),
            "rra" => regs.rra(),
            "cpl" => regs.cpl(),
            "scf" => regs.scf(),
            "ccf" => regs.ccf(),
            "add_hl" => regs.add_hl(operand),
            other => panic!("{}: unknown op {other}", v.name),
        }

        if let Some(expect_a) = &v.expect_a {
            assert_eq!(regs.a, hex8(expect_a), "{}: A", v.name);
        }
        if let Some(expect_hl) = &v.expect_hl {
            assert_eq!(regs.hl.get(), hex(expect_hl), "{}: HL", v.name);
        }
        assert_eq!(regs.f(), hex8(&v.expect_f), "{}: F", v.name);
    }
}
