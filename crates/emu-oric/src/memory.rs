//! Oric memory map.
//!
//! Layout as seen by the CPU:
//! - $0000-$02FF: RAM (zero page, stack, page 2)
//! - $0300-$03FF: I/O page (decoded by the bus, not here)
//! - $0400-$BFFF: RAM, including the hires screen at $A000 and the text
//!   screen at $BB80
//! - $C000-$FFFF: 16K ROM, or the overlay RAM underneath it when the ROM
//!   is disabled
//!
//! The ULA always sees the raw 64K RAM, whatever the CPU's view is.

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::OricError;

/// Size of the full RAM array.
const RAM_SIZE: usize = 0x1_0000;
/// Size of a ROM image.
pub const ROM_SIZE: usize = 0x4000;
/// First address covered by the ROM.
const ROM_BASE: u16 = 0xC000;

/// Installed RAM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RamSize {
    /// $0000-$3FFF only.
    #[serde(rename = "16K")]
    Ram16K,
    /// $0000-$BFFF, no overlay RAM.
    #[serde(rename = "48K")]
    #[default]
    Ram48K,
    /// Full 64K, with overlay RAM under the ROM.
    #[serde(rename = "64K")]
    Ram64K,
}

impl RamSize {
    /// Whether the CPU can reach RAM at `addr` (ignoring the ROM overlay).
    #[must_use]
    pub fn covers(self, addr: u16) -> bool {
        match self {
            Self::Ram16K => addr < 0x4000,
            Self::Ram48K => addr < ROM_BASE,
            Self::Ram64K => true,
        }
    }
}

/// Oric RAM plus ROM overlay.
pub struct OricMemory {
    ram: Vec<u8>,
    rom: Vec<u8>,
    rom_enabled: bool,
    ram_size: RamSize,
}

impl OricMemory {
    /// Power-on memory with no ROM installed (ROM reads return $FF).
    ///
    /// RAM comes up in the pattern the real machine shows: $FF where
    /// address bit 7 is set, $00 elsewhere.
    #[must_use]
    pub fn new(ram_size: RamSize) -> Self {
        let ram = (0..RAM_SIZE)
            .map(|addr| if addr & 0x80 != 0 { 0xFF } else { 0x00 })
            .collect();
        Self {
            ram,
            rom: vec![0xFF; ROM_SIZE],
            rom_enabled: true,
            ram_size,
        }
    }

    /// Install a 16K ROM image at $C000.
    pub fn install_rom(&mut self, rom: &[u8]) -> Result<(), OricError> {
        if rom.len() != ROM_SIZE {
            return Err(OricError::RomSize(rom.len()));
        }
        self.rom.copy_from_slice(rom);
        info!("installed {} byte ROM at ${ROM_BASE:04X}", rom.len());
        Ok(())
    }

    /// Copy a raw image into RAM at `address`, bypassing the CPU's view.
    pub fn load_ram(&mut self, address: u16, data: &[u8]) -> Result<(), OricError> {
        let start = usize::from(address);
        let end = start + data.len();
        if end > RAM_SIZE {
            return Err(OricError::RamImage {
                address,
                len: data.len(),
            });
        }
        self.ram[start..end].copy_from_slice(data);
        Ok(())
    }

    /// CPU read. No side effects.
    #[must_use]
    pub fn read(&self, addr: u16) -> u8 {
        if addr >= ROM_BASE && self.rom_enabled {
            self.rom[usize::from(addr - ROM_BASE)]
        } else if self.ram_size.covers(addr) {
            self.ram[usize::from(addr)]
        } else {
            0xFF
        }
    }

    /// CPU write. Ignored for ROM and for RAM that is not fitted.
    pub fn write(&mut self, addr: u16, value: u8) {
        if addr >= ROM_BASE && self.rom_enabled {
            return;
        }
        if self.ram_size.covers(addr) {
            self.ram[usize::from(addr)] = value;
        }
    }

    /// Raw RAM read for the video chip.
    #[must_use]
    pub fn vram_peek(&self, addr: u16) -> u8 {
        self.ram[usize::from(addr)]
    }

    /// Switch between ROM and overlay RAM at $C000-$FFFF.
    pub fn set_rom_enabled(&mut self, enabled: bool) {
        self.rom_enabled = enabled;
    }

    #[must_use]
    pub fn rom_enabled(&self) -> bool {
        self.rom_enabled
    }

    #[must_use]
    pub fn ram_size(&self) -> RamSize {
        self.ram_size
    }

    /// The raw 64K RAM.
    #[must_use]
    pub fn ram(&self) -> &[u8] {
        &self.ram
    }
}
