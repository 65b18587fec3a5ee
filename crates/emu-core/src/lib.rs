//! Core traits for cycle-stepped emulation.
//!
//! Components are advanced one clock cycle at a time by the machine that owns
//! them. Memory is shared through narrow capability traits: processors get
//! the full read/write [`Bus`], video chips only ever see a [`MemoryView`].

mod bus;
mod cpu;
mod observable;
mod tickable;

pub use bus::{Bus, MemoryView};
pub use cpu::Cpu;
pub use observable::{Observable, Value, parse_address};
pub use tickable::Tickable;
