//! Oric model configuration.

use std::fs;
use std::path::{Path, PathBuf};

use oric_ula::{PixelFormat, ScreenGeometry, TimingProfile, UlaConfig};
use serde::{Deserialize, Serialize};

use crate::error::OricError;
use crate::memory::RamSize;

/// Supported Oric models. Both share the same ULA; they differ in ROM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OricModel {
    Oric1,
    #[default]
    Atmos,
}

/// Configuration for creating an Oric instance.
///
/// Every field has a default (Atmos, 48K, 50 Hz, RGBA), so a config file
/// only needs the fields it changes:
///
/// ```json
/// { "model": "Oric1", "ram": "16K", "timing": 264, "rom": "roms/basic10.rom" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OricConfig {
    pub model: OricModel,
    pub ram: RamSize,
    /// Lines per frame at power-on: 312 (50 Hz) or 264 (60 Hz).
    pub timing: TimingProfile,
    pub pixel_format: PixelFormat,
    /// ROM image to install at $C000.
    pub rom: Option<PathBuf>,
}

impl OricConfig {
    pub fn from_json_str(text: &str) -> Result<Self, OricError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, OricError> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }

    /// Chip settings for this machine. The frame buffer is the bare window.
    #[must_use]
    pub fn ula_config(&self) -> UlaConfig {
        UlaConfig {
            timing: self.timing,
            geometry: ScreenGeometry::default(),
            format: self.pixel_format,
        }
    }
}
