//! Memory bus interface.

/// Memory bus interface.
///
/// The CPU core issues every memory access through this trait. The bus
/// handles address decoding and routing to backing pages or devices.
///
/// Word accesses are little-endian. The default word methods compose two
/// byte accesses at `address` and `address + 1` (wrapping at 64K); buses
/// whose wide accesses have different side effects override them.
pub trait Bus {
    /// Read a byte from the given address.
    fn read(&mut self, address: u16) -> u8;

    /// Write a byte to the given address.
    fn write(&mut self, address: u16, value: u8);

    /// Read a little-endian word starting at the given address.
    fn read_word(&mut self, address: u16) -> u16 {
        let lo = self.read(address);
        let hi = self.read(address.wrapping_add(1));
        u16::from_le_bytes([lo, hi])
    }

    /// Write a little-endian word starting at the given address.
    fn write_word(&mut self, address: u16, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.write(address, lo);
        self.write(address.wrapping_add(1), hi);
    }
}

/// Flat 64K RAM with no decoding, for tests and tooling.
pub struct FlatBus {
    ram: Box<[u8; 0x1_0000]>,
}

impl FlatBus {
    #[must_use]
    pub fn new() -> Self {
        Self {
            ram: Box::new([0; 0x1_0000]),
        }
    }

    /// Copy `data` into RAM starting at `address`, wrapping at 64K.
    pub fn load(&mut self, address: u16, data: &[u8]) {
        for (offset, &byte) in data.iter().enumerate() {
            let addr = address.wrapping_add(offset as u16);
            self.ram[addr as usize] = byte;
        }
    }
}

impl Default for FlatBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for FlatBus {
    fn read(&mut self, address: u16) -> u8 {
        self.ram[address as usize]
    }

    fn write(&mut self, address: u16, value: u8) {
        self.ram[address as usize] = value;
    }
}
