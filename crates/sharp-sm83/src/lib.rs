//! ALU and flag engine for the Sharp SM83, the Z80 derivative in the Game Boy.
//!
//! Instruction decode and timing live elsewhere. This crate reproduces the
//! exact result and flag bits of every arithmetic, logic and rotate
//! primitive the decoder dispatches to.

pub mod alu;
mod flags;
mod registers;

pub use alu::AluResult;
pub use flags::{CF, FLAG_MASK, HF, NF, ZF};
pub use registers::{RegisterPair, Registers};
