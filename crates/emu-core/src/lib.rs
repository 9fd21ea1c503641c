//! Core traits shared by the CPU and cartridge crates.
//!
//! The CPU core reaches memory only through [`Bus`], and every component
//! exposes its state through [`Observable`] without side effects.

mod bus;
mod observable;

pub use bus::{Bus, FlatBus};
pub use observable::{Observable, Value};
