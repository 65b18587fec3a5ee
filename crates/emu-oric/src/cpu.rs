//! Processor stand-in.

use emu_core::{Bus, Cpu};

/// 6502 reset vector.
const RESET_VECTOR: u16 = 0xFFFC;

/// A processor that fetches the reset vector and then does nothing.
///
/// Lets the machine run the video chip over a prepared memory image
/// without a 6502 core attached.
#[derive(Debug, Default)]
pub struct IdleCpu {
    pc: u16,
    irq: bool,
    cycles: u64,
}

impl IdleCpu {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cycles ticked since power-on.
    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    #[must_use]
    pub fn irq(&self) -> bool {
        self.irq
    }
}

impl Cpu for IdleCpu {
    fn tick<B: Bus>(&mut self, _bus: &mut B) {
        self.cycles += 1;
    }

    fn pc(&self) -> u16 {
        self.pc
    }

    fn set_irq(&mut self, asserted: bool) {
        self.irq = asserted;
    }

    fn reset<B: Bus>(&mut self, bus: &mut B) {
        let lo = bus.read(RESET_VECTOR);
        let hi = bus.read(RESET_VECTOR.wrapping_add(1));
        self.pc = u16::from_le_bytes([lo, hi]);
    }
}
