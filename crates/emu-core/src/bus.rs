//! Memory bus capabilities.

/// Read/write access to the 64K address space, as seen by a processor.
///
/// The bus handles address decoding and routing to RAM, ROM and I/O.
pub trait Bus {
    /// Read a byte from the given address. May have side effects on I/O.
    fn read(&mut self, address: u16) -> u8;

    /// Write a byte to the given address. ROM writes are ignored.
    fn write(&mut self, address: u16, value: u8);
}

/// Side-effect-free read access to shared memory.
///
/// Video chips scan memory through this trait. They never write, so a
/// shared borrow of the owner's memory is enough.
pub trait MemoryView {
    /// Read a byte without side effects.
    fn peek(&self, address: u16) -> u8;
}

impl<F> MemoryView for F
where
    F: Fn(u16) -> u8,
{
    fn peek(&self, address: u16) -> u8 {
        self(address)
    }
}
