//! Banked address-space mapper.
//!
//! Address decode for a Sega-style cartridge with a serial EEPROM:
//!
//! - $8000: EEPROM data line (read data-out, write data-in)
//! - $8008-$8087: byte view of the 64 EEPROM words
//! - $FFFC: EEPROM control lines
//! - $FFFD-$FFFF: paging registers 1-3
//!
//! The EEPROM window only decodes while the device reports itself enabled.
//! Everything else goes through the page tables.
//!
//! Word accesses are not two byte accesses. They splice EEPROM and backing
//! store across the window edges, and word writes store and remap paging
//! registers unconditionally where byte writes skip unchanged values.

use std::ops::RangeInclusive;

use emu_core::{Bus, Observable, Value};
use tracing::trace;

use crate::eeprom::SerialEeprom;
use crate::memory::PagedMemory;
use crate::paging::{PAGING_REGISTERS, PagingRegisters, RemapCallback, slot_for};

/// Range decoded by the EEPROM while it is enabled.
pub const EEPROM_WINDOW: RangeInclusive<u16> = 0x8000..=0x8FFF;

/// Serial data in/out.
pub const EEPROM_DATA: u16 = 0x8000;

/// First byte of the word array view.
pub const EEPROM_WORDS_START: u16 = 0x8008;

/// Last byte of the word array view (high byte of word 63).
pub const EEPROM_WORDS_END: u16 = 0x8087;

/// Control-line register.
pub const EEPROM_CONTROL: u16 = 0xFFFC;

/// How a paging register write reached the mapper.
#[derive(Debug, Clone, Copy)]
enum WritePath {
    Byte,
    Word,
}

pub struct Mapper {
    pub(crate) memory: PagedMemory,
    pub(crate) registers: PagingRegisters,
    remaps: [RemapCallback; PAGING_REGISTERS],
    pub(crate) eeprom: Option<Box<dyn SerialEeprom>>,
}

impl Mapper {
    /// Build a mapper over caller-laid-out memory. Registers start at zero
    /// and no callback fires until a register is written or
    /// [`Mapper::remap_all`] is called.
    #[must_use]
    pub fn new(
        memory: PagedMemory,
        remaps: [RemapCallback; PAGING_REGISTERS],
        eeprom: Option<Box<dyn SerialEeprom>>,
    ) -> Self {
        Self {
            memory,
            registers: PagingRegisters::default(),
            remaps,
            eeprom,
        }
    }

    #[must_use]
    pub fn memory(&self) -> &PagedMemory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut PagedMemory {
        &mut self.memory
    }

    #[must_use]
    pub fn registers(&self) -> PagingRegisters {
        self.registers
    }

    #[must_use]
    pub fn eeprom(&self) -> Option<&dyn SerialEeprom> {
        self.eeprom.as_deref()
    }

    pub fn eeprom_mut(&mut self) -> Option<&mut (dyn SerialEeprom + 'static)> {
        self.eeprom.as_deref_mut()
    }

    /// The attached EEPROM, if it is currently decoding its window.
    fn enabled_eeprom(&mut self) -> Option<&mut (dyn SerialEeprom + 'static)> {
        self.eeprom.as_deref_mut().filter(|e| e.state().enabled)
    }

    /// Read the backing store without any device side effects.
    #[must_use]
    pub fn peek(&self, address: u16) -> u8 {
        self.memory.read(address)
    }

    /// Fire every register's callback once, in slot order.
    pub fn remap_all(&mut self) {
        for slot in 0..PAGING_REGISTERS {
            (self.remaps[slot])(&self.registers, &mut self.memory);
        }
    }

    fn remap(&mut self, slot: usize, path: WritePath) {
        trace!(slot, value = self.registers.get(slot), ?path, "remap");
        (self.remaps[slot])(&self.registers, &mut self.memory);
    }

    fn write_control(&mut self, value: u8) {
        if let Some(eeprom) = self.eeprom.as_deref_mut() {
            trace!(value, "eeprom control");
            eeprom.write_control(value);
        }
    }
}

impl Bus for Mapper {
    fn read(&mut self, address: u16) -> u8 {
        if EEPROM_WINDOW.contains(&address)
            && let Some(eeprom) = self.enabled_eeprom()
        {
            match address {
                EEPROM_DATA => return eeprom.read_bit(),
                EEPROM_WORDS_START..=EEPROM_WORDS_END => {
                    return eeprom.state().read_byte(address - EEPROM_WORDS_START);
                }
                _ => {}
            }
        }
        self.memory.read(address)
    }

    fn write(&mut self, address: u16, value: u8) {
        // The store always happens; device side effects come after it.
        self.memory.write(address, value);

        match address {
            EEPROM_DATA => {
                if let Some(eeprom) = self.enabled_eeprom() {
                    eeprom.write_bit(value & 1);
                }
            }
            EEPROM_WORDS_START..=EEPROM_WORDS_END => {
                if let Some(eeprom) = self.enabled_eeprom() {
                    eeprom
                        .state_mut()
                        .write_byte(address - EEPROM_WORDS_START, value);
                }
            }
            EEPROM_CONTROL => self.write_control(value),
            0xFFFD..=0xFFFF => {
                let slot = slot_for(address);
                if self.registers.get(slot) != value {
                    self.registers.set(slot, value);
                    self.remap(slot, WritePath::Byte);
                }
            }
            _ => {}
        }
    }

    fn read_word(&mut self, address: u16) -> u16 {
        let next = address.wrapping_add(1);

        if let Some(eeprom) = self.enabled_eeprom() {
            match address {
                EEPROM_DATA => {
                    let lo = eeprom.read_bit();
                    return u16::from_le_bytes([lo, self.memory.read(next)]);
                }
                0x7FFF => {
                    let hi = eeprom.read_bit();
                    return u16::from_le_bytes([self.memory.read(address), hi]);
                }
                EEPROM_WORDS_START..=EEPROM_WORDS_END => {
                    let offset = address - EEPROM_WORDS_START;
                    let index = usize::from(offset >> 1);
                    let words = &eeprom.state().words;
                    let word = words[index];
                    if offset & 1 == 0 {
                        return word;
                    }
                    // Odd address: high byte of this word, low byte of the
                    // next. The last word has no neighbour in the array.
                    let following = words.get(index + 1).copied();
                    let [_, lo] = word.to_le_bytes();
                    let hi = match following {
                        Some(following) => following.to_le_bytes()[0],
                        None => self.memory.read(next),
                    };
                    return u16::from_le_bytes([lo, hi]);
                }
                _ => {}
            }
        }

        u16::from_le_bytes([self.memory.read(address), self.memory.read(next)])
    }

    fn write_word(&mut self, address: u16, value: u16) {
        let next = address.wrapping_add(1);
        let [lo, hi] = value.to_le_bytes();
        self.memory.write(address, lo);
        self.memory.write(next, hi);

        for (addr, byte) in [(address, lo), (next, hi)] {
            match addr {
                EEPROM_CONTROL => self.write_control(byte),
                0xFFFD..=0xFFFF => {
                    let slot = slot_for(addr);
                    self.registers.set(slot, byte);
                    self.remap(slot, WritePath::Word);
                }
                _ => {}
            }
        }
    }
}

const QUERY_PATHS: &[&str] = &[
    "paging",
    "paging.0",
    "paging.1",
    "paging.2",
    "paging.3",
    "eeprom.attached",
    "eeprom.enabled",
];

impl Observable for Mapper {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "paging" => Some(Value::from(&self.registers.values()[..])),
            "eeprom.attached" => Some(self.eeprom.is_some().into()),
            "eeprom.enabled" => Some(self.eeprom().is_some_and(|e| e.state().enabled).into()),
            _ => {
                let slot: usize = path.strip_prefix("paging.")?.parse().ok()?;
                (slot < PAGING_REGISTERS).then(|| self.registers.get(slot).into())
            }
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        QUERY_PATHS
    }
}
