//! SM83 flag register bits.
//!
//! Unlike the Z80 there are no sign, parity or undocumented copy bits. The
//! low nibble of F does not exist in hardware and always reads as zero.

/// Zero flag (bit 7) - set if result is zero.
pub const ZF: u8 = 0b1000_0000;

/// Subtract flag (bit 6) - set if last operation was a subtraction.
pub const NF: u8 = 0b0100_0000;

/// Half-carry flag (bit 5) - carry from bit 3 to bit 4.
pub const HF: u8 = 0b0010_0000;

/// Carry flag (bit 4) - carry out of bit 7.
pub const CF: u8 = 0b0001_0000;

/// Bits of F that exist.
pub const FLAG_MASK: u8 = ZF | NF | HF | CF;

/// Zero flag for a result byte.
#[must_use]
pub(crate) const fn zero(value: u8) -> u8 {
    if value == 0 { ZF } else { 0 }
}

/// Carry flag from a boolean.
#[must_use]
pub(crate) const fn carry(set: bool) -> u8 {
    if set { CF } else { 0 }
}
