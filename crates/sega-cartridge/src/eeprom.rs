//! Serial EEPROM (93C46-class) as seen from the cartridge address space.
//!
//! The chip's bit-level command protocol lives with the device. The mapper
//! only forwards data-in bits and control-line writes, reads the data-out
//! bit, and gives the CPU byte access to the word array while the device
//! is enabled.

/// Number of 16-bit words in the EEPROM array.
pub const EEPROM_WORDS: usize = 64;

/// Full EEPROM state. The mapper reads `enabled` and `words`; the protocol
/// fields are opaque here and only travel through save states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EepromState {
    /// Chip select is routed to the device and its window is live.
    pub enabled: bool,
    /// Erase/write enable latch.
    pub write_enabled: bool,
    /// Protocol state machine position.
    pub mode: u8,
    /// Last control-line levels (chip select, clock, data in).
    pub lines: u16,
    /// Opcode being shifted in.
    pub opcode: u16,
    /// Pending data-in shift register.
    pub input: u16,
    /// Bits shifted in or out of the current command.
    pub bit_count: u16,
    /// Persisted memory array.
    pub words: [u16; EEPROM_WORDS],
}

impl Default for EepromState {
    /// An erased, disabled chip. Erased cells read as all ones.
    fn default() -> Self {
        Self {
            enabled: false,
            write_enabled: false,
            mode: 0,
            lines: 0,
            opcode: 0,
            input: 0,
            bit_count: 0,
            words: [0xFFFF; EEPROM_WORDS],
        }
    }
}

impl EepromState {
    /// Byte view of the word array. Even offsets are the low byte of word
    /// `offset / 2`, odd offsets the high byte.
    #[must_use]
    pub fn read_byte(&self, offset: u16) -> u8 {
        let word = self.words[usize::from(offset >> 1)];
        if offset & 1 == 0 {
            word as u8
        } else {
            (word >> 8) as u8
        }
    }

    /// Merge one byte into the word array, keeping the other half.
    pub fn write_byte(&mut self, offset: u16, value: u8) {
        let word = &mut self.words[usize::from(offset >> 1)];
        if offset & 1 == 0 {
            *word = (*word & 0xFF00) | u16::from(value);
        } else {
            *word = (*word & 0x00FF) | (u16::from(value) << 8);
        }
    }
}

/// A serial EEPROM wired to the cartridge.
///
/// Implementations own the protocol. The mapper calls these methods from
/// its read and write paths and never interprets the bits itself.
pub trait SerialEeprom {
    /// Current data-out line (0 or 1).
    fn read_bit(&mut self) -> u8;

    /// Clock a data-in bit from a write to the data address.
    fn write_bit(&mut self, bit: u8);

    /// Control-line write (chip select, clock, data in) from $FFFC.
    fn write_control(&mut self, value: u8);

    fn state(&self) -> &EepromState;

    fn state_mut(&mut self) -> &mut EepromState;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_chip_is_erased_and_disabled() {
        let state = EepromState::default();
        assert!(!state.enabled);
        assert!(state.words.iter().all(|&w| w == 0xFFFF));
    }

    #[test]
    fn byte_view_splits_words_little_endian() {
        let mut state = EepromState::default();
        state.words[0] = 0x1234;
        state.words[63] = 0xABCD;
        assert_eq!(state.read_byte(0), 0x34);
        assert_eq!(state.read_byte(1), 0x12);
        assert_eq!(state.read_byte(126), 0xCD);
        assert_eq!(state.read_byte(127), 0xAB);
    }

    #[test]
    fn byte_writes_merge_into_one_half() {
        let mut state = EepromState::default();
        state.words[5] = 0x1234;
        state.write_byte(10, 0xEF);
        assert_eq!(state.words[5], 0x12EF);
        state.write_byte(11, 0xBE);
        assert_eq!(state.words[5], 0xBEEF);
        assert_eq!(state.words[4], 0xFFFF);
        assert_eq!(state.words[6], 0xFFFF);
    }
}
