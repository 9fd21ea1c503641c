//! Paging registers and their remap callbacks.

use crate::memory::PagedMemory;

/// Number of paging registers, at $FFFC-$FFFF.
pub const PAGING_REGISTERS: usize = 4;

/// The four paging registers, indexed by the low two address bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PagingRegisters([u8; PAGING_REGISTERS]);

impl PagingRegisters {
    #[must_use]
    pub const fn new(values: [u8; PAGING_REGISTERS]) -> Self {
        Self(values)
    }

    /// Value of register `slot` (0-3).
    #[must_use]
    pub const fn get(&self, slot: usize) -> u8 {
        self.0[slot]
    }

    #[must_use]
    pub const fn values(&self) -> [u8; PAGING_REGISTERS] {
        self.0
    }

    pub(crate) fn set(&mut self, slot: usize, value: u8) {
        self.0[slot] = value;
    }
}

/// Called when a paging register is written.
///
/// The callback sees the registers read-only and may repoint any page table
/// entry. It cannot reach back into the mapper.
pub type RemapCallback = Box<dyn FnMut(&PagingRegisters, &mut PagedMemory)>;

/// A callback that leaves the page tables alone.
#[must_use]
pub fn noop_remap() -> RemapCallback {
    Box::new(|_: &PagingRegisters, _: &mut PagedMemory| {})
}

/// Register slot addressed by a write above $FFFC.
#[must_use]
pub(crate) const fn slot_for(address: u16) -> usize {
    (address & 0x03) as usize
}
