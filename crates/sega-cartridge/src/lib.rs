//! Banked cartridge address space for Sega 8-bit boards with a serial EEPROM.
//!
//! The [`Mapper`] sits between the CPU and the cartridge. It routes every
//! byte and word access to a 256-byte page of backing store, exposes the
//! EEPROM's data window at $8000-$8FFF and its control line at $FFFC, and
//! fires a remap callback when a paging register at $FFFD-$FFFF changes.
//!
//! [`savestate`] persists the paging registers and the EEPROM contents as
//! versioned, length-prefixed blocks.

mod config;
mod eeprom;
mod error;
mod io;
mod mapper;
mod memory;
mod paging;
pub mod savestate;

pub use config::{BANK_SIZE, CartridgeConfig, RAM_SIZE};
pub use eeprom::{EEPROM_WORDS, EepromState, SerialEeprom};
pub use error::{Result, SaveStateError};
pub use mapper::{
    EEPROM_CONTROL, EEPROM_DATA, EEPROM_WINDOW, EEPROM_WORDS_END, EEPROM_WORDS_START, Mapper,
};
pub use memory::{PAGE_COUNT, PAGE_SIZE, PagedMemory};
pub use paging::{PAGING_REGISTERS, PagingRegisters, RemapCallback, noop_remap};
