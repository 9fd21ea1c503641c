//! Save-state blocks for the mapper and its EEPROM.
//!
//! Every block is a 16-byte header followed by a fixed-size body. All
//! fields are little-endian.
//!
//! | Offset | Size | Field                         |
//! |--------|------|-------------------------------|
//! | 0      | 4    | tag                           |
//! | 4      | 4    | body length                   |
//! | 8      | 2    | version (1)                   |
//! | 10     | 2    | flags                         |
//! | 12     | 4    | child pointer (must be zero)  |
//!
//! `MPRG` (28 bytes): paging registers 0-3, then 24 reserved bytes.
//!
//! `EEPR` (144 bytes): enabled, write-enable latch, mode, pad, control
//! lines, opcode, input shift register, bit count, 4 reserved bytes, then
//! the 64 words.
//!
//! Decoding checks the whole header before reading the body, and
//! [`Mapper::load_state`] decodes every block before touching live state.

use std::io::Read;

use tracing::{debug, warn};

use crate::eeprom::{EEPROM_WORDS, EepromState};
use crate::error::{Result, SaveStateError};
use crate::io::ReadLeExt;
use crate::mapper::Mapper;
use crate::paging::{PAGING_REGISTERS, PagingRegisters};

/// The only format version this crate reads or writes.
pub const BLOCK_VERSION: u16 = 1;

pub const HEADER_LEN: usize = 16;

pub const PAGING_TAG: [u8; 4] = *b"MPRG";
pub const PAGING_BODY_LEN: u32 = 28;

pub const EEPROM_TAG: [u8; 4] = *b"EEPR";
pub const EEPROM_BODY_LEN: u32 = 144;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    pub tag: [u8; 4],
    pub length: u32,
    pub version: u16,
    pub flags: u16,
    pub child: u32,
}

impl BlockHeader {
    /// Header for a freshly encoded block.
    #[must_use]
    pub const fn new(tag: [u8; 4], length: u32) -> Self {
        Self {
            tag,
            length,
            version: BLOCK_VERSION,
            flags: 0,
            child: 0,
        }
    }

    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.tag);
        out.extend_from_slice(&self.length.to_le_bytes());
        out.extend_from_slice(&self.version.to_le_bytes());
        out.extend_from_slice(&self.flags.to_le_bytes());
        out.extend_from_slice(&self.child.to_le_bytes());
    }

    pub fn read_from<R: Read + ?Sized>(r: &mut R) -> Result<Self> {
        Ok(Self {
            tag: r.read_array::<4>()?,
            length: r.read_u32_le()?,
            version: r.read_u16_le()?,
            flags: r.read_u16_le()?,
            child: r.read_u32_le()?,
        })
    }

    /// Check a decoded header against the block kind the caller expects.
    pub fn validate(&self, tag: [u8; 4], length: u32) -> Result<()> {
        if self.tag != tag {
            return Err(SaveStateError::TagMismatch {
                expected: tag,
                found: self.tag,
            });
        }
        if self.length != length {
            return Err(SaveStateError::LengthMismatch {
                expected: length,
                found: self.length,
            });
        }
        if self.version != BLOCK_VERSION {
            return Err(SaveStateError::UnsupportedVersion(self.version));
        }
        if self.child != 0 {
            return Err(SaveStateError::NonZeroChild(self.child));
        }
        Ok(())
    }
}

/// Split one validated block off the front of `bytes`. Returns the body and
/// the total number of bytes the block occupies.
fn take_block(bytes: &[u8], tag: [u8; 4], length: u32) -> Result<(&[u8], usize)> {
    if bytes.len() < HEADER_LEN {
        return Err(SaveStateError::Truncated {
            expected: HEADER_LEN,
            found: bytes.len(),
        });
    }
    let mut cursor = bytes;
    let header = BlockHeader::read_from(&mut cursor)?;
    header.validate(tag, length)?;

    let total = HEADER_LEN + length as usize;
    if bytes.len() < total {
        return Err(SaveStateError::Truncated {
            expected: total,
            found: bytes.len(),
        });
    }
    Ok((&bytes[HEADER_LEN..total], total))
}

#[must_use]
pub fn encode_paging(registers: &PagingRegisters) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + PAGING_BODY_LEN as usize);
    BlockHeader::new(PAGING_TAG, PAGING_BODY_LEN).write_to(&mut out);
    out.extend_from_slice(&registers.values());
    out.resize(HEADER_LEN + PAGING_BODY_LEN as usize, 0);
    out
}

/// Decode a paging block from the front of `bytes`, returning the registers
/// and the number of bytes consumed.
pub fn decode_paging(bytes: &[u8]) -> Result<(PagingRegisters, usize)> {
    let (mut body, used) = take_block(bytes, PAGING_TAG, PAGING_BODY_LEN)?;
    let values = body.read_array::<PAGING_REGISTERS>()?;
    Ok((PagingRegisters::new(values), used))
}

#[must_use]
pub fn encode_eeprom(state: &EepromState) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + EEPROM_BODY_LEN as usize);
    BlockHeader::new(EEPROM_TAG, EEPROM_BODY_LEN).write_to(&mut out);

    out.push(u8::from(state.enabled));
    out.push(u8::from(state.write_enabled));
    out.push(state.mode);
    out.push(0);
    out.extend_from_slice(&state.lines.to_le_bytes());
    out.extend_from_slice(&state.opcode.to_le_bytes());
    out.extend_from_slice(&state.input.to_le_bytes());
    out.extend_from_slice(&state.bit_count.to_le_bytes());
    out.extend_from_slice(&[0; 4]);

    for word in &state.words {
        out.extend_from_slice(&word.to_le_bytes());
    }
    out
}

/// Decode an EEPROM block from the front of `bytes`, returning the state and
/// the number of bytes consumed.
pub fn decode_eeprom(bytes: &[u8]) -> Result<(EepromState, usize)> {
    let (mut body, used) = take_block(bytes, EEPROM_TAG, EEPROM_BODY_LEN)?;

    let enabled = body.read_u8()? != 0;
    let write_enabled = body.read_u8()? != 0;
    let mode = body.read_u8()?;
    let _pad = body.read_u8()?;
    let lines = body.read_u16_le()?;
    let opcode = body.read_u16_le()?;
    let input = body.read_u16_le()?;
    let bit_count = body.read_u16_le()?;
    let _reserved = body.read_array::<4>()?;

    let mut words = [0u16; EEPROM_WORDS];
    for word in &mut words {
        *word = body.read_u16_le()?;
    }

    Ok((
        EepromState {
            enabled,
            write_enabled,
            mode,
            lines,
            opcode,
            input,
            bit_count,
            words,
        },
        used,
    ))
}

impl Mapper {
    /// Serialise the paging registers, followed by the EEPROM block when an
    /// EEPROM is attached.
    #[must_use]
    pub fn save_state(&self) -> Vec<u8> {
        let mut out = encode_paging(&self.registers);
        if let Some(eeprom) = self.eeprom.as_deref() {
            out.extend_from_slice(&encode_eeprom(eeprom.state()));
        }
        debug!(bytes = out.len(), "mapper state saved");
        out
    }

    /// Restore state produced by [`Mapper::save_state`].
    ///
    /// An EEPROM block is expected exactly when an EEPROM is attached. If
    /// any block is rejected, nothing changes. On success every remap
    /// callback fires once so the page tables follow the restored
    /// registers.
    pub fn load_state(&mut self, bytes: &[u8]) -> Result<()> {
        let decoded = Self::decode_state(bytes, self.eeprom.is_some())
            .inspect_err(|err| warn!(%err, "save state rejected"))?;
        let (registers, eeprom_state, used) = decoded;

        self.registers = registers;
        if let (Some(eeprom), Some(state)) = (self.eeprom.as_deref_mut(), eeprom_state) {
            *eeprom.state_mut() = state;
        }
        self.remap_all();
        debug!(bytes = used, registers = ?self.registers.values(), "mapper state loaded");
        Ok(())
    }

    fn decode_state(
        bytes: &[u8],
        with_eeprom: bool,
    ) -> Result<(PagingRegisters, Option<EepromState>, usize)> {
        let (registers, mut used) = decode_paging(bytes)?;
        let eeprom_state = if with_eeprom {
            let (state, n) = decode_eeprom(&bytes[used..])?;
            used += n;
            Some(state)
        } else {
            None
        };
        Ok((registers, eeprom_state, used))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state() -> EepromState {
        let mut state = EepromState {
            enabled: true,
            write_enabled: true,
            mode: 3,
            lines: 0x0007,
            opcode: 0x0180,
            input: 0xBEEF,
            bit_count: 9,
            ..EepromState::default()
        };
        for (i, word) in state.words.iter_mut().enumerate() {
            *word = (i as u16) * 0x0101;
        }
        state
    }

    #[test]
    fn paging_block_layout() {
        let bytes = encode_paging(&PagingRegisters::new([0x00, 0x11, 0x22, 0x33]));
        assert_eq!(bytes.len(), HEADER_LEN + 28);
        assert_eq!(&bytes[0..4], b"MPRG");
        assert_eq!(&bytes[4..8], &[28, 0, 0, 0]);
        assert_eq!(&bytes[8..10], &[1, 0]);
        assert_eq!(&bytes[10..16], &[0; 6]);
        assert_eq!(&bytes[16..20], &[0x00, 0x11, 0x22, 0x33]);
        assert!(bytes[20..].iter().all(|&b| b == 0));
    }

    #[test]
    fn eeprom_block_layout() {
        let bytes = encode_eeprom(&sample_state());
        assert_eq!(bytes.len(), HEADER_LEN + 144);
        assert_eq!(&bytes[0..4], b"EEPR");
        assert_eq!(&bytes[4..8], &[144, 0, 0, 0]);

        let body = &bytes[HEADER_LEN..];
        assert_eq!(&body[0..4], &[1, 1, 3, 0]);
        assert_eq!(&body[4..6], &[0x07, 0x00]);
        assert_eq!(&body[6..8], &[0x80, 0x01]);
        assert_eq!(&body[8..10], &[0xEF, 0xBE]);
        assert_eq!(&body[10..12], &[9, 0]);
        assert_eq!(&body[12..16], &[0; 4]);
        // Word 1 = 0x0101, word 63 = 0x3F3F.
        assert_eq!(&body[18..20], &[1, 1]);
        assert_eq!(&body[142..144], &[0x3F, 0x3F]);
    }

    #[test]
    fn blocks_decode_what_they_encode() {
        let regs = PagingRegisters::new([9, 8, 7, 6]);
        let (decoded, used) = decode_paging(&encode_paging(&regs)).expect("paging");
        assert_eq!(decoded, regs);
        assert_eq!(used, 44);

        let state = sample_state();
        let (decoded, used) = decode_eeprom(&encode_eeprom(&state)).expect("eeprom");
        assert_eq!(decoded, state);
        assert_eq!(used, 160);
    }

    #[test]
    fn reserved_paging_bytes_are_ignored() {
        let mut bytes = encode_paging(&PagingRegisters::new([1, 2, 3, 4]));
        bytes[30] = 0xAA;
        let (regs, _) = decode_paging(&bytes).expect("paging");
        assert_eq!(regs.values(), [1, 2, 3, 4]);
    }

    #[test]
    fn header_checks() {
        let good = encode_paging(&PagingRegisters::default());

        let mut bad = good.clone();
        bad[4] = 29;
        assert!(matches!(
            decode_paging(&bad),
            Err(SaveStateError::LengthMismatch { expected: 28, found: 29 })
        ));

        let mut bad = good.clone();
        bad[8] = 2;
        assert!(matches!(
            decode_paging(&bad),
            Err(SaveStateError::UnsupportedVersion(2))
        ));

        let mut bad = good.clone();
        bad[15] = 0x80;
        assert!(matches!(
            decode_paging(&bad),
            Err(SaveStateError::NonZeroChild(0x8000_0000))
        ));

        let mut bad = good.clone();
        bad[0] = b'X';
        assert!(matches!(
            decode_paging(&bad),
            Err(SaveStateError::TagMismatch { .. })
        ));
    }

    #[test]
    fn short_input_is_truncated() {
        let good = encode_eeprom(&EepromState::default());
        assert!(matches!(
            decode_eeprom(&good[..10]),
            Err(SaveStateError::Truncated { expected: 16, found: 10 })
        ));
        assert!(matches!(
            decode_eeprom(&good[..good.len() - 1]),
            Err(SaveStateError::Truncated { expected: 160, found: 159 })
        ));
    }

    #[test]
    fn flags_field_is_not_checked() {
        let mut bytes = encode_paging(&PagingRegisters::new([0, 1, 2, 3]));
        bytes[10] = 0xFF;
        assert!(decode_paging(&bytes).is_ok());
    }
}
