//! Processor collaborator trait.

use crate::Bus;

/// A processor core driven one clock cycle at a time.
///
/// The bus is passed in, not owned, so the machine can share its memory
/// with the video chip between processor cycles.
pub trait Cpu {
    /// Advance the processor by one clock cycle.
    fn tick<B: Bus>(&mut self, bus: &mut B);

    /// Returns the current program counter.
    fn pc(&self) -> u16;

    /// Drive the level-sensitive IRQ line.
    fn set_irq(&mut self, asserted: bool);

    /// Reset the processor, fetching the reset vector through `bus`.
    fn reset<B: Bus>(&mut self, bus: &mut B);
}
