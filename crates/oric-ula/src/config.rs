//! Chip configuration: timing profile, buffer geometry, pixel encoding.

use crate::error::UlaError;
use crate::palette::PixelFormat;

/// Character columns in the raster window.
pub const WINDOW_COLUMNS: u32 = 40;
/// Dots emitted per column (one per cell bit 5..0).
pub const DOTS_PER_COLUMN: u32 = 6;
/// Window width in dots.
pub const WINDOW_WIDTH: u32 = WINDOW_COLUMNS * DOTS_PER_COLUMN;
/// Window height in scanlines.
pub const WINDOW_HEIGHT: u32 = 224;
/// Dots written per frame.
pub const WINDOW_PIXELS: usize = (WINDOW_WIDTH * WINDOW_HEIGHT) as usize;
/// 1 MHz chip cycles per scanline (64 us).
pub const CYCLES_PER_LINE: u32 = 64;

/// Frame timing. The chip switches between these at run time through the
/// mode attribute; the profile only chooses the power-on state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "u16", into = "u16")
)]
pub enum TimingProfile {
    /// 312 lines, 50 Hz.
    #[default]
    Pal,
    /// 264 lines, 60 Hz.
    Hz60,
}

impl TimingProfile {
    #[must_use]
    pub const fn lines_per_frame(self) -> u16 {
        match self {
            Self::Pal => 312,
            Self::Hz60 => 264,
        }
    }

    /// Chip cycles in one frame.
    #[must_use]
    pub const fn cycles_per_frame(self) -> u32 {
        self.lines_per_frame() as u32 * CYCLES_PER_LINE
    }

    /// Nominal refresh rate, for host pacing.
    #[must_use]
    pub const fn frames_per_second(self) -> u32 {
        match self {
            Self::Pal => 50,
            Self::Hz60 => 60,
        }
    }
}

impl TryFrom<u16> for TimingProfile {
    type Error = UlaError;

    fn try_from(lines: u16) -> Result<Self, Self::Error> {
        match lines {
            312 => Ok(Self::Pal),
            264 => Ok(Self::Hz60),
            other => Err(UlaError::InvalidLineCount(other)),
        }
    }
}

impl From<TimingProfile> for u16 {
    fn from(timing: TimingProfile) -> Self {
        timing.lines_per_frame()
    }
}

/// Frame buffer dimensions in pixels.
///
/// The raster window is placed at the top-left of the buffer; any area
/// beyond 240x224 stays at its initial colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenGeometry {
    width: u32,
    height: u32,
}

impl ScreenGeometry {
    pub fn new(width: u32, height: u32) -> Result<Self, UlaError> {
        if width == 0 || height == 0 {
            return Err(UlaError::ZeroDimension { width, height });
        }
        if width < WINDOW_WIDTH || height < WINDOW_HEIGHT {
            return Err(UlaError::GeometryTooSmall { width, height });
        }
        Ok(Self { width, height })
    }

    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Total pixels in a buffer of this geometry.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Map a window-linear dot offset to a buffer index.
    #[must_use]
    pub const fn index(&self, offset: usize) -> usize {
        let row = offset / WINDOW_WIDTH as usize;
        let x = offset % WINDOW_WIDTH as usize;
        row * self.width as usize + x
    }
}

impl Default for ScreenGeometry {
    fn default() -> Self {
        Self {
            width: WINDOW_WIDTH,
            height: WINDOW_HEIGHT,
        }
    }
}

/// Everything needed to build a chip with a double-buffered sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UlaConfig {
    pub timing: TimingProfile,
    pub geometry: ScreenGeometry,
    pub format: PixelFormat,
}

impl UlaConfig {
    pub fn new(
        lines_per_frame: u16,
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> Result<Self, UlaError> {
        Ok(Self {
            timing: TimingProfile::try_from(lines_per_frame)?,
            geometry: ScreenGeometry::new(width, height)?,
            format,
        })
    }
}
