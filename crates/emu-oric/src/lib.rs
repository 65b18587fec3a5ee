//! Oric-1 / Atmos emulator.
//!
//! The machine wires the Oric ULA to 64K of RAM, a 16K ROM overlay and
//! the I/O page. Everything runs off the 1 MHz system clock: each cycle the
//! ULA scans screen memory, then the processor gets the bus.

mod bus;
pub mod capture;
mod config;
mod cpu;
mod error;
mod memory;
mod oric;

pub use bus::{IoPage, OricBus};
pub use config::{OricConfig, OricModel};
pub use cpu::IdleCpu;
pub use error::OricError;
pub use memory::{OricMemory, ROM_SIZE, RamSize};
pub use oric::Oric;
