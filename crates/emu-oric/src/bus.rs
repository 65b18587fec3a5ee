//! Oric bus: routes CPU accesses to memory and the I/O page.
//!
//! The I/O page ($0300-$03FF) is where the VIA and expansion devices live.
//! They are attached as an [`IoPage`]; without one the page floats high.

use emu_core::{Bus, MemoryView};

use crate::memory::OricMemory;

/// First address of the I/O page.
const IO_PAGE: u16 = 0x0300;

/// A device decoding the I/O page.
pub trait IoPage {
    /// Read register `offset` (low byte of the address).
    fn read(&mut self, offset: u8) -> u8;

    /// Write register `offset`.
    fn write(&mut self, offset: u8, value: u8);

    /// Whether the device is pulling the CPU's IRQ line low.
    fn irq(&self) -> bool {
        false
    }
}

pub struct OricBus {
    pub memory: OricMemory,
    io: Option<Box<dyn IoPage>>,
}

impl OricBus {
    #[must_use]
    pub fn new(memory: OricMemory) -> Self {
        Self { memory, io: None }
    }

    /// Attach the device decoding $0300-$03FF, replacing any previous one.
    pub fn attach_io(&mut self, io: Box<dyn IoPage>) {
        self.io = Some(io);
    }

    /// IRQ line state from the I/O page.
    #[must_use]
    pub fn irq(&self) -> bool {
        self.io.as_ref().is_some_and(|io| io.irq())
    }

    /// CPU-side read without I/O side effects (I/O reads as $FF).
    #[must_use]
    pub fn peek(&self, address: u16) -> u8 {
        if is_io(address) {
            0xFF
        } else {
            self.memory.read(address)
        }
    }
}

fn is_io(address: u16) -> bool {
    address & 0xFF00 == IO_PAGE
}

impl Bus for OricBus {
    fn read(&mut self, address: u16) -> u8 {
        if is_io(address) {
            match self.io.as_mut() {
                Some(io) => io.read(address as u8),
                None => 0xFF,
            }
        } else {
            self.memory.read(address)
        }
    }

    fn write(&mut self, address: u16, value: u8) {
        if is_io(address) {
            if let Some(io) = self.io.as_mut() {
                io.write(address as u8, value);
            }
        } else {
            self.memory.write(address, value);
        }
    }
}

/// The ULA's view: raw RAM, no I/O decoding.
impl MemoryView for OricBus {
    fn peek(&self, address: u16) -> u8 {
        self.memory.vram_peek(address)
    }
}
