//! Oric 8-colour palette and pixel encodings.
//!
//! The ULA drives each RGB gun fully on or off, giving the eight corners of
//! the colour cube. The chip works in palette indices; sinks encode them into
//! whatever pixel format the display wants.

/// Palette index constants.
pub const BLACK: u8 = 0;
pub const RED: u8 = 1;
pub const GREEN: u8 = 2;
pub const YELLOW: u8 = 3;
pub const BLUE: u8 = 4;
pub const MAGENTA: u8 = 5;
pub const CYAN: u8 = 6;
pub const WHITE: u8 = 7;

/// ARGB32 palette, indexed by `blue << 2 | green << 1 | red`.
pub const PALETTE: [u32; 8] = [
    0xFF00_0000, // 0: Black
    0xFFFF_0000, // 1: Red
    0xFF00_FF00, // 2: Green
    0xFFFF_FF00, // 3: Yellow
    0xFF00_00FF, // 4: Blue
    0xFFFF_00FF, // 5: Magenta
    0xFF00_FFFF, // 6: Cyan
    0xFFFF_FFFF, // 7: White
];

/// The RGB complement of a palette colour, used for reverse video.
///
/// Every gun is either off or full on, so complementing RGB is the same as
/// flipping all three index bits.
#[must_use]
pub const fn inverse(colour: u8) -> u8 {
    colour ^ 0x07
}

/// Pixel encoding written into frame buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PixelFormat {
    /// `0xRRGGBBAA`, the layout GPU texture uploads expect.
    #[default]
    Rgba8888,
    /// `0xAARRGGBB`, the layout most software framebuffers use.
    Argb8888,
    /// 16-bit `RRRRRGGGGGGBBBBB` in the low half of each word.
    Rgb565,
}

impl PixelFormat {
    /// Encode a palette index.
    #[must_use]
    pub const fn encode(self, colour: u8) -> u32 {
        let argb = PALETTE[(colour & 0x07) as usize];
        let r = (argb >> 16) & 0xFF;
        let g = (argb >> 8) & 0xFF;
        let b = argb & 0xFF;
        match self {
            Self::Rgba8888 => (r << 24) | (g << 16) | (b << 8) | 0xFF,
            Self::Argb8888 => argb,
            Self::Rgb565 => ((r >> 3) << 11) | ((g >> 2) << 5) | (b >> 3),
        }
    }

    /// All eight colours in this encoding, for table lookups per dot.
    #[must_use]
    pub const fn table(self) -> [u32; 8] {
        let mut table = [0; 8];
        let mut i = 0;
        while i < 8 {
            table[i] = self.encode(i as u8);
            i += 1;
        }
        table
    }

    /// Decode an encoded pixel to RGBA bytes (for PNG capture).
    #[must_use]
    pub const fn to_rgba(self, pixel: u32) -> [u8; 4] {
        match self {
            Self::Rgba8888 => [
                (pixel >> 24) as u8,
                (pixel >> 16) as u8,
                (pixel >> 8) as u8,
                pixel as u8,
            ],
            Self::Argb8888 => [
                (pixel >> 16) as u8,
                (pixel >> 8) as u8,
                pixel as u8,
                (pixel >> 24) as u8,
            ],
            Self::Rgb565 => {
                let r5 = ((pixel >> 11) & 0x1F) as u8;
                let g6 = ((pixel >> 5) & 0x3F) as u8;
                let b5 = (pixel & 0x1F) as u8;
                [
                    (r5 << 3) | (r5 >> 2),
                    (g6 << 2) | (g6 >> 4),
                    (b5 << 3) | (b5 >> 2),
                    0xFF,
                ]
            }
        }
    }
}
