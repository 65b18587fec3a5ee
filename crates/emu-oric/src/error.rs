//! Machine construction and configuration errors.

use std::fmt;
use std::io;

use oric_ula::UlaError;

#[derive(Debug)]
pub enum OricError {
    /// ROM images are exactly 16K.
    RomSize(usize),
    /// A RAM image would run past the top of memory.
    RamImage { address: u16, len: usize },
    /// Reading a config or image file failed.
    Io(io::Error),
    /// The config file is not valid JSON for [`crate::OricConfig`].
    Config(serde_json::Error),
    /// The video settings were rejected by the chip.
    Video(UlaError),
}

impl fmt::Display for OricError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RomSize(len) => write!(f, "ROM must be exactly 16384 bytes, got {len}"),
            Self::RamImage { address, len } => write!(
                f,
                "RAM image of {len} bytes at ${address:04X} runs past $FFFF"
            ),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Config(e) => write!(f, "bad config: {e}"),
            Self::Video(e) => write!(f, "bad video settings: {e}"),
        }
    }
}

impl std::error::Error for OricError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Video(e) => Some(e),
            Self::RomSize(_) | Self::RamImage { .. } => None,
        }
    }
}

impl From<io::Error> for OricError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for OricError {
    fn from(e: serde_json::Error) -> Self {
        Self::Config(e)
    }
}

impl From<UlaError> for OricError {
    fn from(e: UlaError) -> Self {
        Self::Video(e)
    }
}
