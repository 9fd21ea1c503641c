#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use sega_cartridge::{
    EepromState, Mapper, PAGING_REGISTERS, PagedMemory, PagingRegisters, RemapCallback,
    SerialEeprom,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    ReadBit,
    WriteBit(u8),
    Control(u8),
}

pub type EventLog = Rc<RefCell<Vec<Event>>>;

/// Records every call the mapper makes and returns a fixed data-out bit.
pub struct FakeEeprom {
    pub state: EepromState,
    pub data_out: u8,
    pub log: EventLog,
}

impl FakeEeprom {
    pub fn new(enabled: bool) -> (Self, EventLog) {
        let log = EventLog::default();
        let eeprom = Self {
            state: EepromState {
                enabled,
                ..EepromState::default()
            },
            data_out: 1,
            log: Rc::clone(&log),
        };
        (eeprom, log)
    }
}

impl SerialEeprom for FakeEeprom {
    fn read_bit(&mut self) -> u8 {
        self.log.borrow_mut().push(Event::ReadBit);
        self.data_out
    }

    fn write_bit(&mut self, bit: u8) {
        self.log.borrow_mut().push(Event::WriteBit(bit));
    }

    fn write_control(&mut self, value: u8) {
        self.log.borrow_mut().push(Event::Control(value));
    }

    fn state(&self) -> &EepromState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut EepromState {
        &mut self.state
    }
}

/// (slot, register value) for every callback invocation, in order.
pub type RemapLog = Rc<RefCell<Vec<(usize, u8)>>>;

pub fn recording_remaps() -> ([RemapCallback; PAGING_REGISTERS], RemapLog) {
    let log = RemapLog::default();
    let remaps = std::array::from_fn(|slot| {
        let log = Rc::clone(&log);
        Box::new(move |regs: &PagingRegisters, _: &mut PagedMemory| {
            log.borrow_mut().push((slot, regs.get(slot)));
        }) as RemapCallback
    });
    (remaps, log)
}

/// Flat 64K mapper with recording callbacks and an optional fake EEPROM.
pub fn flat_mapper(eeprom: Option<FakeEeprom>) -> (Mapper, RemapLog) {
    let (remaps, log) = recording_remaps();
    let eeprom = eeprom.map(|e| Box::new(e) as Box<dyn SerialEeprom>);
    (Mapper::new(PagedMemory::flat(), remaps, eeprom), log)
}

/// Flat mapper with an enabled fake EEPROM.
pub fn mapper_with_eeprom() -> (Mapper, RemapLog, EventLog) {
    let (eeprom, events) = FakeEeprom::new(true);
    let (mapper, remaps) = flat_mapper(Some(eeprom));
    (mapper, remaps, events)
}
