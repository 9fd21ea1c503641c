//! Cartridge configuration and the standard Sega paging layout.
//!
//! Backing store layout: ROM (padded to whole banks), system RAM, then one
//! discard page that absorbs writes to ROM.
//!
//! | CPU range   | Pages     | Source                                  |
//! |-------------|-----------|-----------------------------------------|
//! | $0000-$03FF | $00-$03   | ROM bank 0, fixed                       |
//! | $0400-$3FFF | $04-$3F   | ROM bank selected by register 1         |
//! | $4000-$7FFF | $40-$7F   | ROM bank selected by register 2         |
//! | $8000-$BFFF | $80-$BF   | ROM bank selected by register 3         |
//! | $C000-$FFFF | $C0-$FF   | system RAM, mirrored                    |
//!
//! Register 0 sits at $FFFC, which these boards give to the EEPROM control
//! line, so its callback does nothing.

use crate::eeprom::SerialEeprom;
use crate::mapper::Mapper;
use crate::memory::{PAGE_SIZE, PagedMemory};
use crate::paging::{PagingRegisters, RemapCallback, noop_remap};

/// Size of one switchable ROM bank.
pub const BANK_SIZE: usize = 0x4000;

/// Default system RAM size.
pub const RAM_SIZE: usize = 0x2000;

const PAGES_PER_BANK: usize = BANK_SIZE / PAGE_SIZE;

/// Registers after power-on: banks 0, 1, 2 in slots 1-3.
const POWER_ON_REGISTERS: [u8; 4] = [0x00, 0x00, 0x01, 0x02];

/// Cartridge configuration.
pub struct CartridgeConfig {
    /// Raw ROM image. Padded with $FF to a whole number of banks.
    pub rom_data: Vec<u8>,
    /// System RAM in bytes, mirrored across $C000-$FFFF. Must be a
    /// non-zero multiple of 256.
    pub ram_size: usize,
}

impl CartridgeConfig {
    #[must_use]
    pub fn new(rom_data: Vec<u8>) -> Self {
        Self {
            rom_data,
            ram_size: RAM_SIZE,
        }
    }
}

/// A callback that points the pages of one 16K CPU window (minus `skip`
/// leading pages) at the bank held in `slot`.
fn bank_remap(slot: usize, first_page: u8, skip: usize, bank_count: usize) -> RemapCallback {
    Box::new(move |registers: &PagingRegisters, memory: &mut PagedMemory| {
        let bank = usize::from(registers.get(slot)) % bank_count;
        let base = bank * BANK_SIZE + skip * PAGE_SIZE;
        memory.map_read_range(first_page + skip as u8, PAGES_PER_BANK - skip, base);
    })
}

impl Mapper {
    /// Build a mapper with the standard Sega layout and power-on registers.
    ///
    /// # Panics
    ///
    /// Panics if `config.ram_size` is zero or not a multiple of 256.
    #[must_use]
    pub fn sega(config: CartridgeConfig, eeprom: Option<Box<dyn SerialEeprom>>) -> Self {
        assert!(
            config.ram_size != 0 && config.ram_size % PAGE_SIZE == 0,
            "RAM size must be a non-zero multiple of {PAGE_SIZE}, got {}",
            config.ram_size
        );

        let bank_count = config.rom_data.len().div_ceil(BANK_SIZE).max(1);
        let rom_len = bank_count * BANK_SIZE;
        let ram_base = rom_len;
        let discard = ram_base + config.ram_size;

        let mut data = config.rom_data;
        data.resize(rom_len, 0xFF);
        data.resize(discard + PAGE_SIZE, 0);

        let mut memory = PagedMemory::new(data);
        for page in 0x00..=0xBF {
            memory.map_write(page, discard);
        }
        memory.map_read_range(0x00, 4, 0);

        let ram_pages = config.ram_size / PAGE_SIZE;
        for (i, page) in (0xC0..=0xFF).enumerate() {
            memory.map_range(page, 1, ram_base + (i % ram_pages) * PAGE_SIZE);
        }

        let remaps = [
            noop_remap(),
            bank_remap(1, 0x00, 4, bank_count),
            bank_remap(2, 0x40, 0, bank_count),
            bank_remap(3, 0x80, 0, bank_count),
        ];

        let mut mapper = Self::new(memory, remaps, eeprom);
        mapper.registers = PagingRegisters::new(POWER_ON_REGISTERS);
        mapper.remap_all();
        mapper
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn banked_rom(banks: usize) -> Vec<u8> {
        (0..banks).flat_map(|b| vec![b as u8; BANK_SIZE]).collect()
    }

    #[test]
    fn short_rom_is_padded_to_one_bank() {
        let mapper = Mapper::sega(CartridgeConfig::new(vec![0x3E; 10]), None);
        assert_eq!(mapper.peek(0x0000), 0x3E);
        assert_eq!(mapper.peek(0x000A), 0xFF);
        assert_eq!(mapper.memory().data().len(), BANK_SIZE + RAM_SIZE + PAGE_SIZE);
    }

    #[test]
    fn power_on_maps_banks_in_order() {
        let mapper = Mapper::sega(CartridgeConfig::new(banked_rom(4)), None);
        assert_eq!(mapper.registers().values(), POWER_ON_REGISTERS);
        assert_eq!(mapper.peek(0x0400), 0);
        assert_eq!(mapper.peek(0x4000), 1);
        assert_eq!(mapper.peek(0x8000), 2);
    }

    #[test]
    fn bank_numbers_wrap_at_bank_count() {
        let mut memory = PagedMemory::new(vec![0; 3 * BANK_SIZE]);
        let mut remap = bank_remap(2, 0x40, 0, 3);
        remap(&PagingRegisters::new([0, 0, 5, 0]), &mut memory);
        assert_eq!(memory.read_page(0x40), 2 * BANK_SIZE);
        assert_eq!(memory.read_page(0x7F), 2 * BANK_SIZE + 0x3F00);
    }

    #[test]
    fn ram_is_mirrored() {
        let config = CartridgeConfig {
            rom_data: banked_rom(1),
            ram_size: 0x400,
        };
        let mapper = Mapper::sega(config, None);
        assert_eq!(mapper.memory().read_page(0xC0), mapper.memory().read_page(0xC4));
        assert_eq!(mapper.memory().write_page(0xFF), mapper.memory().read_page(0xC3));
    }

    #[test]
    #[should_panic(expected = "RAM size")]
    fn odd_ram_size_panics() {
        let config = CartridgeConfig {
            rom_data: Vec::new(),
            ram_size: 0x123,
        };
        let _ = Mapper::sega(config, None);
    }
}
