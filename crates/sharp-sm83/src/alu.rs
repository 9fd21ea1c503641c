//! ALU operations for the SM83.
//!
//! Each function takes the operands plus the incoming flag byte where some
//! flags survive the operation, and returns the result with a fully
//! recomputed flag byte. The unused low nibble of F is always zero.
//!
//! Half-carry for add and subtract uses the XOR test: bit 4 of
//! `a ^ b ^ result` is the carry (or borrow) that crossed from bit 3.

#![allow(clippy::verbose_bit_mask)] // Clearer to read mask comparisons.

use crate::flags::{CF, HF, NF, ZF, carry, zero};
use crate::registers::Registers;

/// Result of an ALU operation with flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AluResult {
    pub value: u8,
    pub flags: u8,
}

/// Half-carry from the XOR of operands and result, bit 4 moved to bit 5.
const fn half_carry8(a: u16, b: u16, result: u16) -> u8 {
    (((a ^ b ^ result) & 0x10) << 1) as u8
}

/// Increment byte. Carry is the only flag carried over from `flags`.
#[must_use]
pub fn inc8(value: u8, flags: u8) -> AluResult {
    let old_carry = flags & CF;
    let result = value.wrapping_add(1);

    let mut f = old_carry | zero(result);
    if result & 0x0F == 0x00 {
        f |= HF;
    }

    AluResult { value: result, flags: f }
}

/// Decrement byte. Carry is the only flag carried over from `flags`.
#[must_use]
pub fn dec8(value: u8, flags: u8) -> AluResult {
    let old_carry = flags & CF;
    let result = value.wrapping_sub(1);

    let mut f = old_carry | NF | zero(result);
    if result & 0x0F == 0x0F {
        f |= HF;
    }

    AluResult { value: result, flags: f }
}

/// Add with optional carry-in (ADD, ADC).
#[must_use]
pub fn add8(a: u8, b: u8, carry_in: bool) -> AluResult {
    let (a, b) = (u16::from(a), u16::from(b));
    let result = a + b + u16::from(carry_in);
    let value = result as u8;

    let flags = zero(value) | half_carry8(a, b, result) | carry(result & 0x100 != 0);

    AluResult { value, flags }
}

/// Subtract with optional borrow-in (SUB, SBC).
#[must_use]
pub fn sub8(a: u8, b: u8, carry_in: bool) -> AluResult {
    let (a, b) = (u16::from(a), u16::from(b));
    // Wrapping in 16 bits leaves the borrow out of bit 7 in bit 8.
    let result = a.wrapping_sub(b).wrapping_sub(u16::from(carry_in));
    let value = result as u8;

    let flags = NF | zero(value) | half_carry8(a, b, result) | carry(result & 0x100 != 0);

    AluResult { value, flags }
}

/// Compare: the flags of `a - b`, with `a` returned untouched.
#[must_use]
pub fn cp8(a: u8, b: u8) -> AluResult {
    AluResult {
        value: a,
        flags: sub8(a, b, false).flags,
    }
}

/// AND. H is always set; the hardware does this for every AND.
#[must_use]
pub fn and8(a: u8, b: u8) -> AluResult {
    let value = a & b;
    AluResult {
        value,
        flags: zero(value) | HF,
    }
}

/// OR.
#[must_use]
pub fn or8(a: u8, b: u8) -> AluResult {
    let value = a | b;
    AluResult {
        value,
        flags: zero(value),
    }
}

/// XOR.
#[must_use]
pub fn xor8(a: u8, b: u8) -> AluResult {
    let value = a ^ b;
    AluResult {
        value,
        flags: zero(value),
    }
}

/// RLCA: rotate A left, bit 7 to carry and bit 0. Z is kept.
#[must_use]
pub fn rlca(a: u8, flags: u8) -> AluResult {
    let out = a >> 7;
    AluResult {
        value: (a << 1) | out,
        flags: (flags & ZF) | carry(out != 0),
    }
}

/// RRCA: rotate A right, bit 0 to carry and bit 7. Z is kept.
#[must_use]
pub fn rrca(a: u8, flags: u8) -> AluResult {
    let out = a & 1;
    AluResult {
        value: (a >> 1) | (out << 7),
        flags: (flags & ZF) | carry(out != 0),
    }
}

/// RLA: rotate A left through carry. Z is kept.
#[must_use]
pub fn rla(a: u8, flags: u8) -> AluResult {
    let carry_in = u8::from(flags & CF != 0);
    AluResult {
        value: (a << 1) | carry_in,
        flags: (flags & ZF) | carry(a & 0x80 != 0),
    }
}

/// RRA: rotate A right through carry. Z is kept.
#[must_use]
pub fn rra(a: u8, flags: u8) -> AluResult {
    let carry_in = u8::from(flags & CF != 0);
    AluResult {
        value: (a >> 1) | (carry_in << 7),
        flags: (flags & ZF) | carry(a & 1 != 0),
    }
}

/// CPL: complement A. Sets N and H, keeps Z and C.
#[must_use]
pub fn cpl(a: u8, flags: u8) -> AluResult {
    AluResult {
        value: !a,
        flags: (flags & (ZF | CF)) | NF | HF,
    }
}

/// SCF: set carry, clear N and H, keep Z.
#[must_use]
pub fn scf(flags: u8) -> u8 {
    (flags & ZF) | CF
}

/// CCF: flip carry, clear N, H takes the old carry, keep Z.
#[must_use]
pub fn ccf(flags: u8) -> u8 {
    let old_carry = flags & CF;
    let half = if old_carry != 0 { HF } else { 0 };
    (flags & ZF) | half | (old_carry ^ CF)
}

/// 16-bit add for HL. Z is kept; H is the carry out of bit 11.
#[must_use]
pub fn add16(hl: u16, value: u16, flags: u8) -> (u16, u8) {
    let (hl, value) = (u32::from(hl), u32::from(value));
    let result = hl + value;

    let mut f = flags & ZF;
    if (hl ^ value ^ result) & 0x1000 != 0 {
        f |= HF;
    }
    if result & 0x1_0000 != 0 {
        f |= CF;
    }

    (result as u16, f)
}

/// ADD SP,e8 and LD HL,SP+e8.
///
/// Z and N are cleared. H and C come from the unsigned add of the low
/// byte of SP and the offset byte, regardless of the offset's sign.
#[must_use]
pub fn add_sp_offset(sp: u16, offset: i8) -> (u16, u8) {
    let operand = offset as u8;
    let result = sp.wrapping_add_signed(i16::from(offset));

    let low = u16::from(sp as u8) + u16::from(operand);
    let mut f = 0;
    if (sp & 0x0F) + u16::from(operand & 0x0F) > 0x0F {
        f |= HF;
    }
    if low > 0xFF {
        f |= CF;
    }

    (result, f)
}

/// DAA: decimal adjust A after a BCD add or subtract.
///
/// N is kept, H is cleared, C is set when the high-digit correction
/// applies (and stays set after a subtract that borrowed).
#[must_use]
pub fn daa(a: u8, flags: u8) -> AluResult {
    let subtract = flags & NF != 0;
    let mut correction = 0u8;
    let mut carry_out = false;

    if flags & HF != 0 || (!subtract && a & 0x0F > 0x09) {
        correction |= 0x06;
    }
    if flags & CF != 0 || (!subtract && a > 0x99) {
        correction |= 0x60;
        carry_out = true;
    }

    let value = if subtract {
        a.wrapping_sub(correction)
    } else {
        a.wrapping_add(correction)
    };

    AluResult {
        value,
        flags: (flags & NF) | zero(value) | carry(carry_out),
    }
}

/// Flags shared by the CB-prefix shifts: Z from result, C from the bit out.
const fn shift_flags(value: u8, out: u8) -> u8 {
    zero(value) | carry(out != 0)
}

/// RLC r: rotate left circular.
#[must_use]
pub fn rlc8(v: u8) -> AluResult {
    let out = v >> 7;
    let value = (v << 1) | out;
    AluResult { value, flags: shift_flags(value, out) }
}

/// RRC r: rotate right circular.
#[must_use]
pub fn rrc8(v: u8) -> AluResult {
    let out = v & 1;
    let value = (v >> 1) | (out << 7);
    AluResult { value, flags: shift_flags(value, out) }
}

/// RL r: rotate left through carry.
#[must_use]
pub fn rl8(v: u8, carry_in: bool) -> AluResult {
    let value = (v << 1) | u8::from(carry_in);
    AluResult { value, flags: shift_flags(value, v >> 7) }
}

/// RR r: rotate right through carry.
#[must_use]
pub fn rr8(v: u8, carry_in: bool) -> AluResult {
    let value = (v >> 1) | (u8::from(carry_in) << 7);
    AluResult { value, flags: shift_flags(value, v & 1) }
}

/// SLA r: shift left, bit 0 = 0.
#[must_use]
pub fn sla8(v: u8) -> AluResult {
    let value = v << 1;
    AluResult { value, flags: shift_flags(value, v >> 7) }
}

/// SRA r: shift right, bit 7 preserved.
#[must_use]
pub fn sra8(v: u8) -> AluResult {
    let value = (v >> 1) | (v & 0x80);
    AluResult { value, flags: shift_flags(value, v & 1) }
}

/// SRL r: shift right, bit 7 = 0.
#[must_use]
pub fn srl8(v: u8) -> AluResult {
    let value = v >> 1;
    AluResult { value, flags: shift_flags(value, v & 1) }
}

/// SWAP r: exchange nibbles. C is cleared.
#[must_use]
pub fn swap8(v: u8) -> AluResult {
    let value = v.rotate_left(4);
    AluResult { value, flags: zero(value) }
}

/// BIT n,r: Z set when the bit is clear. H set, N cleared, C kept.
#[must_use]
pub fn bit(n: u8, v: u8, flags: u8) -> u8 {
    let tested = v & (1 << (n & 7));
    (flags & CF) | HF | zero(tested)
}

impl Registers {
    fn apply(&mut self, result: AluResult) -> u8 {
        self.set_f(result.flags);
        result.value
    }

    /// INC r on any 8-bit operand. Returns the new value.
    pub fn inc(&mut self, value: u8) -> u8 {
        let result = inc8(value, self.f());
        self.apply(result)
    }

    /// DEC r on any 8-bit operand. Returns the new value.
    pub fn dec(&mut self, value: u8) -> u8 {
        let result = dec8(value, self.f());
        self.apply(result)
    }

    /// ADD A,n
    pub fn add_a(&mut self, value: u8) {
        self.a = self.apply(add8(self.a, value, false));
    }

    /// ADC A,n
    pub fn adc_a(&mut self, value: u8) {
        let carry_in = self.carry();
        self.a = self.apply(add8(self.a, value, carry_in));
    }

    /// SUB n
    pub fn sub_a(&mut self, value: u8) {
        self.a = self.apply(sub8(self.a, value, false));
    }

    /// SBC A,n
    pub fn sbc_a(&mut self, value: u8) {
        let carry_in = self.carry();
        self.a = self.apply(sub8(self.a, value, carry_in));
    }

    /// CP n. A is not written.
    pub fn cp_a(&mut self, value: u8) {
        self.set_f(cp8(self.a, value).flags);
    }

    /// AND n
    pub fn and_a(&mut self, value: u8) {
        self.a = self.apply(and8(self.a, value));
    }

    /// OR n
    pub fn or_a(&mut self, value: u8) {
        self.a = self.apply(or8(self.a, value));
    }

    /// XOR n
    pub fn xor_a(&mut self, value: u8) {
        self.a = self.apply(xor8(self.a, value));
    }

    pub fn rlca(&mut self) {
        self.a = self.apply(rlca(self.a, self.f()));
    }

    pub fn rrca(&mut self) {
        self.a = self.apply(rrca(self.a, self.f()));
    }

    pub fn rla(&mut self) {
        self.a = self.apply(rla(self.a, self.f()));
    }

    pub fn rra(&mut self) {
        self.a = self.apply(rra(self.a, self.f()));
    }

    pub fn cpl(&mut self) {
        self.a = self.apply(cpl(self.a, self.f()));
    }

    pub fn scf(&mut self) {
        self.set_f(scf(self.f()));
    }

    pub fn ccf(&mut self) {
        self.set_f(ccf(self.f()));
    }

    pub fn daa(&mut self) {
        self.a = self.apply(daa(self.a, self.f()));
    }

    /// ADD HL,rr. Z is left as it was.
    pub fn add_hl(&mut self, value: u16) {
        let (result, flags) = add16(self.hl.get(), value, self.f());
        self.hl.set(result);
        self.set_f(flags);
    }

    /// ADD SP,e8
    pub fn add_sp(&mut self, offset: i8) {
        let (result, flags) = add_sp_offset(self.sp, offset);
        self.sp = result;
        self.set_f(flags);
    }

    /// LD HL,SP+e8
    pub fn ld_hl_sp(&mut self, offset: i8) {
        let (result, flags) = add_sp_offset(self.sp, offset);
        self.hl.set(result);
        self.set_f(flags);
    }
}
