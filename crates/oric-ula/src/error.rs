//! Construction-time configuration errors.

use std::fmt;

use crate::config::{WINDOW_HEIGHT, WINDOW_WIDTH};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UlaError {
    /// Width or height is zero.
    ZeroDimension { width: u32, height: u32 },
    /// The buffer cannot hold the 240x224 raster window.
    GeometryTooSmall { width: u32, height: u32 },
    /// Only 312-line (50 Hz) and 264-line (60 Hz) timing exist.
    InvalidLineCount(u16),
}

impl fmt::Display for UlaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroDimension { width, height } => {
                write!(f, "screen geometry {width}x{height} has a zero dimension")
            }
            Self::GeometryTooSmall { width, height } => write!(
                f,
                "screen geometry {width}x{height} is smaller than the {WINDOW_WIDTH}x{WINDOW_HEIGHT} raster window",
            ),
            Self::InvalidLineCount(lines) => write!(
                f,
                "invalid timing profile: {lines} lines per frame (expected 312 or 264)",
            ),
        }
    }
}

impl std::error::Error for UlaError {}
