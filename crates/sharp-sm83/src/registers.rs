//! SM83 register file.

use emu_core::{Observable, Value};

use crate::flags::{CF, FLAG_MASK, HF, NF, ZF};

/// A 16-bit register pair whose halves are also addressable as bytes.
///
/// There is one stored word. Writing either half is immediately visible
/// through the word view and vice versa.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegisterPair(u16);

impl RegisterPair {
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn get(self) -> u16 {
        self.0
    }

    pub fn set(&mut self, value: u16) {
        self.0 = value;
    }

    /// High byte (B, D or H).
    #[must_use]
    pub const fn hi(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Low byte (C, E or L).
    #[must_use]
    pub const fn lo(self) -> u8 {
        self.0 as u8
    }

    pub fn set_hi(&mut self, value: u8) {
        self.0 = (self.0 & 0x00FF) | (u16::from(value) << 8);
    }

    pub fn set_lo(&mut self, value: u8) {
        self.0 = (self.0 & 0xFF00) | u16::from(value);
    }
}

/// SM83 registers.
///
/// F is private so its unused low nibble can never hold a set bit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Registers {
    pub a: u8,
    f: u8,
    pub bc: RegisterPair,
    pub de: RegisterPair,
    pub hl: RegisterPair,
    pub sp: u16,
    pub pc: u16,
}

impl Registers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flag register.
    #[must_use]
    pub const fn f(&self) -> u8 {
        self.f
    }

    /// Set the flag register. Bits 3-0 are discarded.
    pub fn set_f(&mut self, value: u8) {
        self.f = value & FLAG_MASK;
    }

    /// Get AF register pair.
    #[must_use]
    pub const fn af(&self) -> u16 {
        (self.a as u16) << 8 | self.f as u16
    }

    /// Set AF register pair. Bits 3-0 of F are discarded.
    pub fn set_af(&mut self, value: u16) {
        self.a = (value >> 8) as u8;
        self.set_f(value as u8);
    }

    #[must_use]
    pub const fn zero(&self) -> bool {
        self.f & ZF != 0
    }

    #[must_use]
    pub const fn subtract(&self) -> bool {
        self.f & NF != 0
    }

    #[must_use]
    pub const fn half_carry(&self) -> bool {
        self.f & HF != 0
    }

    #[must_use]
    pub const fn carry(&self) -> bool {
        self.f & CF != 0
    }
}

const QUERY_PATHS: &[&str] = &[
    "a", "f", "bc", "de", "hl", "sp", "pc", "flags.z", "flags.n", "flags.h", "flags.c",
];

impl Observable for Registers {
    fn query(&self, path: &str) -> Option<Value> {
        let value = match path {
            "a" => self.a.into(),
            "f" => self.f.into(),
            "bc" => self.bc.get().into(),
            "de" => self.de.get().into(),
            "hl" => self.hl.get().into(),
            "sp" => self.sp.into(),
            "pc" => self.pc.into(),
            "flags.z" => self.zero().into(),
            "flags.n" => self.subtract().into(),
            "flags.h" => self.half_carry().into(),
            "flags.c" => self.carry().into(),
            _ => return None,
        };
        Some(value)
    }

    fn query_paths(&self) -> &'static [&'static str] {
        QUERY_PATHS
    }
}
