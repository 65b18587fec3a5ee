//! Oric HCS10017 ULA: video generation.
//!
//! The ULA scans RAM in lock-step with the 1 MHz system clock and produces a
//! 240x224 raster. Colours and modes are not held in registers the CPU can
//! write; they are changed by *serial attributes*, bytes in the screen data
//! itself that the chip decodes as it reaches them.
//!
//! # Standalone IC
//!
//! The chip reads memory through [`emu_core::MemoryView`] and writes dots to
//! a [`FrameSink`]. It never writes memory and owns no RAM.
//!
//! # Timing
//!
//! - 64 cycles per line (64 us), one column of 6 dots per cycle
//! - cycles 0-11 horizontal blanking, 12-51 the 40-column window, 52-63
//!   blanking
//! - lines 0-8 vertical blanking, 9-232 the 224-line window, then blanking
//!   up to 312 lines (50 Hz) or 264 lines (60 Hz)
//!
//! # Screen memory
//!
//! | Mode  | Screen                            | Glyphs                  |
//! |-------|-----------------------------------|-------------------------|
//! | Text  | $BB80, 40 bytes per 8-line row    | $B400 (alt set $B800)   |
//! | Hires | $A000, 40 bytes per line, 200 lines | $9800 (alt set $9C00) |
//!
//! Hires covers the first 200 lines only; the last 24 lines of the window are
//! always text, read from $BF68 onwards.
//!
//! # Serial attributes
//!
//! A byte with bits 6 and 5 both clear is an attribute. It draws as a blank
//! cell in the current paper colour and, by bits 4-3:
//!
//! | Bits 4-3 | Effect                                                   |
//! |----------|----------------------------------------------------------|
//! | 00       | ink = bits 2-0                                           |
//! | 01       | bit 0 alternate charset, bit 1 double height, bit 2 blink|
//! | 10       | paper = bits 2-0                                         |
//! | 11       | bit 1 50 Hz, bit 2 hires                                 |
//!
//! Ink, paper and the charset attributes reset to white-on-black at the
//! start of every line. Bit 7 of any byte draws that cell in inverse video.

mod config;
mod error;
mod palette;
mod sink;

use std::fmt;

use emu_core::{MemoryView, Observable, Value};
use log::{debug, trace};

pub use config::{
    CYCLES_PER_LINE, DOTS_PER_COLUMN, ScreenGeometry, TimingProfile, UlaConfig, WINDOW_COLUMNS,
    WINDOW_HEIGHT, WINDOW_PIXELS, WINDOW_WIDTH,
};
pub use error::UlaError;
pub use palette::{
    BLACK, BLUE, CYAN, GREEN, MAGENTA, PALETTE, PixelFormat, RED, WHITE, YELLOW, inverse,
};
pub use sink::{CallbackSink, DoubleBufferSink, FrameReader, FrameSink, double_buffer};

/// Lines of vertical blanking before the window.
const VERTICAL_BLANK_LINES: u16 = 9;
/// Cycles of horizontal blanking before the window.
const HORIZONTAL_BLANK_CYCLES: u8 = 12;
const LINE_CYCLES: u8 = CYCLES_PER_LINE as u8;
const WINDOW_LINES: i16 = WINDOW_HEIGHT as i16;
/// Lines covered by the hires bitmap.
const HIRES_LINES: i16 = 200;

const TEXT_SCREEN: u16 = 0xBB80;
const HIRES_SCREEN: u16 = 0xA000;
const TEXT_CHARSET: u16 = 0xB400;
const HIRES_CHARSET: u16 = 0x9800;
/// Distance from the standard to the alternate glyph table.
const CHARSET_SIZE: u16 = 0x0400;
const BYTES_PER_ROW: i32 = 40;

/// Frame-counter bit that selects the blink-off phase (16 frames on, 16 off).
const BLINK_PHASE_BIT: u32 = 16;
/// Blink mask letting all 6 dots through.
const DOTS_ALL: u8 = 0x3F;

/// A decoded serial attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    Ink(u8),
    Style {
        alternate_charset: bool,
        double_height: bool,
        blink: bool,
    },
    Paper(u8),
    Mode {
        fifty_hz: bool,
        hires: bool,
    },
}

impl Attribute {
    /// Decode a screen byte. Returns `None` for data bytes.
    #[must_use]
    pub const fn decode(code: u8) -> Option<Self> {
        if code & 0x60 != 0 {
            return None;
        }
        let low = code & 0x07;
        Some(match (code >> 3) & 0x03 {
            0 => Self::Ink(low),
            1 => Self::Style {
                alternate_charset: code & 0x01 != 0,
                double_height: code & 0x02 != 0,
                blink: code & 0x04 != 0,
            },
            2 => Self::Paper(low),
            _ => Self::Mode {
                fifty_hz: code & 0x02 != 0,
                hires: code & 0x04 != 0,
            },
        })
    }
}

/// Read-only counter snapshot for debugging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UlaDump {
    pub frame_count: u32,
    pub hcount: u8,
    pub vcount: u16,
}

impl fmt::Display for UlaDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ULA: frame {}, line {}, cycle {}",
            self.frame_count, self.vcount, self.hcount
        )
    }
}

/// The Oric ULA.
pub struct Ula<S: FrameSink> {
    /// Cycle within the line (0-63).
    hcount: u8,
    /// Line within the frame (0 to total_lines - 1).
    vcount: u16,
    /// `vcount - 9`; negative during top blanking.
    window_line: i16,
    /// Next dot offset in the frame being drawn.
    pixel_counter: usize,
    fifty_hz: bool,
    total_lines: u16,
    hires: bool,
    /// Text fetch in effect (not hires, or below line 200).
    text_mode: bool,
    charset: u8,
    charset_base: u16,
    charset_addr: u16,
    /// Glyph row for text fetches.
    charline: u8,
    double_height: bool,
    blink: bool,
    /// `DOTS_ALL`, or 0 while blinking cells are hidden.
    blink_mask: u8,
    ink: u8,
    paper: u8,
    /// Address of column 0 of the current line's screen bytes.
    line_addr: u16,
    frame_count: u32,
    sink: S,
}

impl Ula<DoubleBufferSink> {
    /// Build a chip drawing into a double buffer, plus the reader for it.
    #[must_use]
    pub fn with_double_buffer(config: &UlaConfig) -> (Self, FrameReader) {
        let (sink, reader) = double_buffer(config.geometry, config.format);
        (Self::new(config.timing, sink), reader)
    }
}

impl<S: FrameSink> Ula<S> {
    /// Power-on state: text mode, at the top of a fresh frame.
    #[must_use]
    pub fn new(timing: TimingProfile, sink: S) -> Self {
        let mut ula = Self {
            hcount: 0,
            vcount: 0,
            window_line: 0,
            pixel_counter: 0,
            fifty_hz: timing == TimingProfile::Pal,
            total_lines: timing.lines_per_frame(),
            hires: false,
            text_mode: true,
            charset: 0,
            charset_base: TEXT_CHARSET,
            charset_addr: TEXT_CHARSET,
            charline: 0,
            double_height: false,
            blink: false,
            blink_mask: DOTS_ALL,
            ink: WHITE,
            paper: BLACK,
            line_addr: TEXT_SCREEN,
            frame_count: 0,
            sink,
        };
        ula.reset_frame();
        ula
    }

    /// Advance one 1 MHz cycle. Returns true on the cycle that completes a
    /// frame; by then the sink has already published it.
    pub fn step(&mut self, memory: &impl MemoryView) -> bool {
        if self.in_window() {
            self.render_column(memory);
        }

        self.hcount += 1;
        if self.hcount < LINE_CYCLES {
            return false;
        }

        self.hcount = 0;
        self.vcount += 1;
        self.window_line = self.vcount as i16 - VERTICAL_BLANK_LINES as i16;

        if self.window_line < WINDOW_LINES {
            self.start_line();
            false
        } else if self.vcount >= self.total_lines {
            self.finish_frame();
            true
        } else {
            false
        }
    }

    /// Select 50 Hz or 60 Hz timing, as the mode attribute would.
    pub fn set_timing(&mut self, timing: TimingProfile) {
        self.fifty_hz = timing == TimingProfile::Pal;
        self.total_lines = timing.lines_per_frame();
    }

    #[must_use]
    pub fn timing(&self) -> TimingProfile {
        if self.fifty_hz {
            TimingProfile::Pal
        } else {
            TimingProfile::Hz60
        }
    }

    #[must_use]
    pub fn dump(&self) -> UlaDump {
        UlaDump {
            frame_count: self.frame_count,
            hcount: self.hcount,
            vcount: self.vcount,
        }
    }

    /// Cycle within the current line (0-63).
    #[must_use]
    pub fn hcount(&self) -> u8 {
        self.hcount
    }

    /// Line within the current frame.
    #[must_use]
    pub fn vcount(&self) -> u16 {
        self.vcount
    }

    /// Line within the raster window; negative during top blanking.
    #[must_use]
    pub fn window_line(&self) -> i16 {
        self.window_line
    }

    /// Dots written so far in the current frame.
    #[must_use]
    pub fn pixel_counter(&self) -> usize {
        self.pixel_counter
    }

    #[must_use]
    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    #[must_use]
    pub fn total_lines(&self) -> u16 {
        self.total_lines
    }

    #[must_use]
    pub fn hires_mode(&self) -> bool {
        self.hires
    }

    #[must_use]
    pub fn text_mode(&self) -> bool {
        self.text_mode
    }

    #[must_use]
    pub fn ink(&self) -> u8 {
        self.ink
    }

    #[must_use]
    pub fn paper(&self) -> u8 {
        self.paper
    }

    #[must_use]
    pub fn charline(&self) -> u8 {
        self.charline
    }

    #[must_use]
    pub fn charset_addr(&self) -> u16 {
        self.charset_addr
    }

    #[must_use]
    pub fn line_addr(&self) -> u16 {
        self.line_addr
    }

    #[must_use]
    pub fn blink_mask(&self) -> u8 {
        self.blink_mask
    }

    #[must_use]
    pub fn double_height(&self) -> bool {
        self.double_height
    }

    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Position the beam at a specific line and cycle (for testing).
    ///
    /// Per-line state is reinitialised as if the line had just started.
    #[doc(hidden)]
    pub fn set_position(&mut self, vcount: u16, hcount: u8) {
        self.vcount = vcount;
        self.hcount = hcount % LINE_CYCLES;
        self.window_line = vcount as i16 - VERTICAL_BLANK_LINES as i16;
        if self.window_line < WINDOW_LINES {
            self.start_line();
        }
        // Keep dot offsets in step with the beam.
        let lines_done = self.window_line.clamp(0, WINDOW_LINES) as usize;
        let columns_done = if (0..WINDOW_LINES).contains(&self.window_line) {
            usize::from(self.hcount.saturating_sub(HORIZONTAL_BLANK_CYCLES))
                .min(WINDOW_COLUMNS as usize)
        } else {
            0
        };
        self.pixel_counter =
            lines_done * WINDOW_WIDTH as usize + columns_done * DOTS_PER_COLUMN as usize;
    }

    /// Set the frame counter (for testing blink phases).
    #[doc(hidden)]
    pub fn set_frame_count(&mut self, frame_count: u32) {
        self.frame_count = frame_count;
    }

    // === Internal helpers ===

    fn in_window(&self) -> bool {
        (0..WINDOW_LINES).contains(&self.window_line)
            && (HORIZONTAL_BLANK_CYCLES..HORIZONTAL_BLANK_CYCLES + WINDOW_COLUMNS as u8)
                .contains(&self.hcount)
    }

    /// Fetch, decode and draw the column under the beam.
    fn render_column(&mut self, memory: &impl MemoryView) {
        let column = u16::from(self.hcount - HORIZONTAL_BLANK_CYCLES);
        let screen_code = memory.peek(offset_address(self.line_addr, column));

        let mut cell = if self.text_mode {
            let glyph = u16::from(screen_code & 0x7F) << 3;
            memory.peek(offset_address(self.charset_addr, glyph + u16::from(self.charline)))
        } else {
            screen_code
        };

        if let Some(attribute) = Attribute::decode(screen_code) {
            cell = 0;
            self.apply(attribute);
        } else {
            cell &= self.blink_mask;
        }

        let (ink, paper) = if screen_code & 0x80 != 0 {
            (inverse(self.ink), inverse(self.paper))
        } else {
            (self.ink, self.paper)
        };

        for bit in (0..DOTS_PER_COLUMN).rev() {
            let colour = if cell & (1 << bit) != 0 { ink } else { paper };
            self.sink.put_pixel(self.pixel_counter, colour);
            self.pixel_counter += 1;
        }
    }

    fn apply(&mut self, attribute: Attribute) {
        match attribute {
            Attribute::Ink(colour) => self.ink = colour,
            Attribute::Style {
                alternate_charset,
                double_height,
                blink,
            } => {
                self.charset = u8::from(alternate_charset);
                self.charset_addr = self.charset_base + u16::from(self.charset) * CHARSET_SIZE;
                self.double_height = double_height;
                self.charline = self.glyph_row();
                self.blink = blink;
                // Evaluated here, not per frame: a line that never repeats
                // the attribute keeps whatever phase it last saw.
                self.blink_mask = if blink && self.frame_count & BLINK_PHASE_BIT != 0 {
                    0
                } else {
                    DOTS_ALL
                };
            }
            Attribute::Paper(colour) => self.paper = colour,
            Attribute::Mode { fifty_hz, hires } => {
                if fifty_hz != self.fifty_hz || hires != self.hires {
                    trace!(
                        "ULA mode at line {}: {} Hz, {}",
                        self.window_line,
                        if fifty_hz { 50 } else { 60 },
                        if hires { "hires" } else { "text" }
                    );
                }
                self.fifty_hz = fifty_hz;
                self.total_lines = if fifty_hz {
                    TimingProfile::Pal.lines_per_frame()
                } else {
                    TimingProfile::Hz60.lines_per_frame()
                };
                self.hires = hires;
                self.charset_base = if hires { HIRES_CHARSET } else { TEXT_CHARSET };
                self.charset_addr = self.charset_base + u16::from(self.charset) * CHARSET_SIZE;
                self.text_mode = !hires || self.window_line >= HIRES_LINES;
                self.line_addr = self.screen_line_address();
            }
        }
    }

    fn glyph_row(&self) -> u8 {
        if self.double_height {
            ((self.window_line & 0x0F) >> 1) as u8
        } else {
            (self.window_line & 0x07) as u8
        }
    }

    fn screen_line_address(&self) -> u16 {
        let line = i32::from(self.window_line);
        let address = if self.text_mode {
            i32::from(TEXT_SCREEN) + (line >> 3) * BYTES_PER_ROW
        } else {
            i32::from(HIRES_SCREEN) + line * BYTES_PER_ROW
        };
        assert!(
            (0..=0xFFFF).contains(&address),
            "scanline address {address:#X} outside the 64K bus"
        );
        address as u16
    }

    /// Per-line reset at the start of every line above the bottom blanking.
    fn start_line(&mut self) {
        self.double_height = false;
        self.charline = self.glyph_row();
        self.ink = WHITE;
        self.paper = BLACK;
        self.blink = false;
        self.blink_mask = DOTS_ALL;
        self.charset = 0;
        self.charset_addr = self.charset_base;
        if self.window_line == HIRES_LINES {
            self.text_mode = true;
        }
        self.line_addr = self.screen_line_address();
    }

    fn finish_frame(&mut self) {
        debug!(
            "ULA frame {} complete: {} dots, {} lines",
            self.frame_count, self.pixel_counter, self.total_lines
        );
        self.frame_count = self.frame_count.wrapping_add(1);
        self.reset_frame();
        self.sink.end_frame();
    }

    /// State at the top of every frame. Timing and hires persist.
    fn reset_frame(&mut self) {
        self.hcount = 0;
        self.vcount = 0;
        self.window_line = -(VERTICAL_BLANK_LINES as i16);
        self.pixel_counter = 0;
        self.total_lines = self.timing().lines_per_frame();
        self.charset_base = if self.hires { HIRES_CHARSET } else { TEXT_CHARSET };
        self.charset = 0;
        self.charset_addr = self.charset_base;
        self.charline = 0;
        self.double_height = false;
        self.blink = false;
        self.blink_mask = DOTS_ALL;
        self.ink = WHITE;
        self.paper = BLACK;
        self.text_mode = !self.hires;
        self.line_addr = if self.text_mode { TEXT_SCREEN } else { HIRES_SCREEN };
    }
}

/// `base + offset`, failing fast if the sum leaves the 64K bus.
fn offset_address(base: u16, offset: u16) -> u16 {
    let address = u32::from(base) + u32::from(offset);
    assert!(address <= 0xFFFF, "computed address {address:#X} outside the 64K bus");
    address as u16
}

impl<S: FrameSink> fmt::Display for Ula<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.dump().fmt(f)
    }
}

impl<S: FrameSink> Observable for Ula<S> {
    fn query(&self, path: &str) -> Option<Value> {
        Some(match path {
            "frame_count" => self.frame_count.into(),
            "hcount" => self.hcount.into(),
            "vcount" => self.vcount.into(),
            "window_line" => self.window_line.into(),
            "pixel_counter" => (self.pixel_counter as u32).into(),
            "total_lines" => self.total_lines.into(),
            "pal" => self.fifty_hz.into(),
            "hires" => self.hires.into(),
            "text_mode" => self.text_mode.into(),
            "ink" => self.ink.into(),
            "paper" => self.paper.into(),
            "line_addr" => self.line_addr.into(),
            "charset_addr" => self.charset_addr.into(),
            _ => return None,
        })
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "frame_count",
            "hcount",
            "vcount",
            "window_line",
            "pixel_counter",
            "total_lines",
            "pal",
            "hires",
            "text_mode",
            "ink",
            "paper",
            "line_addr",
            "charset_addr",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Flat 64K memory for tests.
    struct TestMemory {
        data: Vec<u8>,
    }

    impl TestMemory {
        fn new() -> Self {
            Self {
                data: vec![0; 0x10000],
            }
        }

        /// Text screen full of spaces (data bytes with blank glyphs).
        fn blank_text() -> Self {
            let mut mem = Self::new();
            mem.data[0xBB80..0xC000].fill(0x20);
            mem
        }

        fn write(&mut self, addr: u16, val: u8) {
            self.data[addr as usize] = val;
        }

        fn set_glyph_row(&mut self, base: u16, code: u8, row: u16, bits: u8) {
            self.write(base + u16::from(code) * 8 + row, bits);
        }
    }

    impl MemoryView for TestMemory {
        fn peek(&self, address: u16) -> u8 {
            self.data[address as usize]
        }
    }

    /// Records the palette index at every window offset.
    struct RecordingSink {
        dots: Vec<u8>,
        writes: usize,
        frames: u32,
    }

    impl RecordingSink {
        fn new() -> Self {
            Self {
                dots: vec![0xFF; WINDOW_PIXELS],
                writes: 0,
                frames: 0,
            }
        }

        fn cell(&self, line: usize, column: usize) -> &[u8] {
            let start = line * WINDOW_WIDTH as usize + column * DOTS_PER_COLUMN as usize;
            &self.dots[start..start + DOTS_PER_COLUMN as usize]
        }

        fn line(&self, line: usize) -> &[u8] {
            let start = line * WINDOW_WIDTH as usize;
            &self.dots[start..start + WINDOW_WIDTH as usize]
        }
    }

    impl FrameSink for RecordingSink {
        fn put_pixel(&mut self, offset: usize, colour: u8) {
            self.dots[offset] = colour;
            self.writes += 1;
        }

        fn end_frame(&mut self) {
            self.frames += 1;
        }
    }

    fn make_ula() -> Ula<RecordingSink> {
        Ula::new(TimingProfile::Pal, RecordingSink::new())
    }

    /// Step until a frame completes; returns the cycles taken.
    fn run_frame(ula: &mut Ula<RecordingSink>, mem: &TestMemory) -> u32 {
        let mut cycles = 1;
        while !ula.step(mem) {
            cycles += 1;
        }
        cycles
    }

    /// Step through the rest of the current line.
    fn finish_line(ula: &mut Ula<RecordingSink>, mem: &TestMemory) {
        let line = ula.vcount();
        while ula.vcount() == line {
            ula.step(mem);
        }
    }

    /// Run one frame with a hires mode attribute at the top of the text
    /// screen, so the next frame starts in hires.
    fn enter_hires(ula: &mut Ula<RecordingSink>, mem: &mut TestMemory) {
        let saved = mem.data[0xBB80];
        mem.write(0xBB80, 0x1E);
        run_frame(ula, mem);
        mem.write(0xBB80, saved);
        assert!(ula.hires_mode());
    }

    const DOTS_101010: [u8; 6] = [RED, BLUE, RED, BLUE, RED, BLUE];

    // === Attribute decoding ===

    #[test]
    fn decode_each_attribute_group() {
        assert_eq!(Attribute::decode(0x03), Some(Attribute::Ink(YELLOW)));
        assert_eq!(
            Attribute::decode(0x0D),
            Some(Attribute::Style {
                alternate_charset: true,
                double_height: false,
                blink: true,
            })
        );
        assert_eq!(Attribute::decode(0x16), Some(Attribute::Paper(CYAN)));
        assert_eq!(
            Attribute::decode(0x1A),
            Some(Attribute::Mode {
                fifty_hz: true,
                hires: false,
            })
        );
    }

    #[test]
    fn decode_ignores_inverse_bit() {
        for code in 0x00..0x20u8 {
            assert_eq!(Attribute::decode(code | 0x80), Attribute::decode(code));
        }
    }

    #[test]
    fn decode_rejects_data_bytes() {
        for code in [0x20u8, 0x40, 0x60, 0x41, 0x7F, 0xA0, 0xFF] {
            assert_eq!(Attribute::decode(code), None, "{code:#04X}");
        }
    }

    // === Timing ===

    #[test]
    fn counters_stay_in_range() {
        for timing in [TimingProfile::Pal, TimingProfile::Hz60] {
            let mut ula = Ula::new(timing, RecordingSink::new());
            let mem = TestMemory::blank_text();
            for _ in 0..timing.cycles_per_frame() * 3 {
                ula.step(&mem);
                assert!(ula.hcount() < 64);
                assert!(ula.vcount() < ula.total_lines());
            }
            assert_eq!(ula.frame_count(), 3);
        }
    }

    #[test]
    fn frame_completes_on_last_cycle_only() {
        for timing in [TimingProfile::Pal, TimingProfile::Hz60] {
            let mut ula = Ula::new(timing, RecordingSink::new());
            let mem = TestMemory::blank_text();
            let total = timing.cycles_per_frame();
            for cycle in 1..=total {
                assert_eq!(ula.step(&mem), cycle == total, "cycle {cycle}");
            }
            assert_eq!(ula.sink().frames, 1);
            assert_eq!(ula.vcount(), 0);
            assert_eq!(ula.pixel_counter(), 0);
        }
    }

    #[test]
    fn one_frame_writes_53760_dots() {
        for timing in [TimingProfile::Pal, TimingProfile::Hz60] {
            let mut ula = Ula::new(timing, RecordingSink::new());
            let mem = TestMemory::blank_text();
            run_frame(&mut ula, &mem);
            assert_eq!(ula.sink().writes, WINDOW_PIXELS);
            run_frame(&mut ula, &mem);
            assert_eq!(ula.sink().writes, 2 * WINDOW_PIXELS);
        }
    }

    #[test]
    fn no_dots_during_blanking() {
        let mut ula = make_ula();
        let mem = TestMemory::blank_text();

        // Top blanking: 9 lines.
        for _ in 0..9 * 64 {
            ula.step(&mem);
        }
        assert_eq!(ula.sink().writes, 0);
        assert_eq!(ula.window_line(), 0);

        // Horizontal blanking: 12 cycles.
        for _ in 0..12 {
            ula.step(&mem);
        }
        assert_eq!(ula.sink().writes, 0);
        ula.step(&mem);
        assert_eq!(ula.sink().writes, 6);

        // Rest of the window columns, then right blanking.
        for _ in 0..39 {
            ula.step(&mem);
        }
        assert_eq!(ula.sink().writes, 240);
        for _ in 0..12 {
            ula.step(&mem);
        }
        assert_eq!(ula.sink().writes, 240);
        assert_eq!(ula.window_line(), 1);
    }

    #[test]
    fn frequency_attribute_sets_line_count() {
        let mut ula = make_ula();
        let mut mem = TestMemory::blank_text();

        mem.write(0xBB80, 0x18);
        ula.set_position(9, 12);
        ula.step(&mem);
        assert_eq!(ula.total_lines(), 264);
        assert_eq!(ula.timing(), TimingProfile::Hz60);

        mem.write(0xBB80, 0x1A);
        ula.set_position(9, 12);
        ula.step(&mem);
        assert_eq!(ula.total_lines(), 312);
        assert_eq!(ula.timing(), TimingProfile::Pal);
    }

    #[test]
    fn switch_to_60hz_shortens_current_frame() {
        let mut ula = make_ula();
        let mut mem = TestMemory::blank_text();
        mem.write(0xBB80, 0x18);

        assert_eq!(run_frame(&mut ula, &mem), 264 * 64);
        assert_eq!(ula.sink().writes, WINDOW_PIXELS);
        assert_eq!(run_frame(&mut ula, &mem), 264 * 64, "timing persists across frames");
    }

    // === Rendering ===

    #[test]
    fn line_of_zero_bytes_is_all_paper() {
        let mut ula = make_ula();
        let mem = TestMemory::new();
        run_frame(&mut ula, &mem);
        for line in 0..224 {
            assert!(ula.sink().line(line).iter().all(|&c| c == BLACK), "line {line}");
        }
    }

    #[test]
    fn text_cell_uses_glyph_row() {
        let mut ula = make_ula();
        let mut mem = TestMemory::blank_text();
        mem.write(0xBB80, 0x41);
        mem.set_glyph_row(0xB400, 0x41, 3, 0b10_0100);

        run_frame(&mut ula, &mem);
        assert_eq!(
            ula.sink().cell(3, 0),
            &[WHITE, BLACK, BLACK, WHITE, BLACK, BLACK]
        );
        // Other rows of the glyph are empty.
        assert!(ula.sink().cell(2, 0).iter().all(|&c| c == BLACK));
    }

    #[test]
    fn ink_and_paper_attributes_colour_following_cells() {
        let mut ula = make_ula();
        let mut mem = TestMemory::new();
        enter_hires(&mut ula, &mut mem);

        mem.write(0xA000, 0x01); // ink red
        mem.write(0xA001, 0x14); // paper blue
        mem.write(0xA002, 0x2A); // dots 101010
        run_frame(&mut ula, &mem);

        let sink = ula.sink();
        assert!(sink.cell(0, 0).iter().all(|&c| c == BLACK), "attribute cell shows paper");
        assert!(sink.cell(0, 1).iter().all(|&c| c == BLUE));
        assert_eq!(sink.cell(0, 2), &DOTS_101010);
    }

    #[test]
    fn colours_reset_at_start_of_line() {
        let mut ula = make_ula();
        let mut mem = TestMemory::new();
        enter_hires(&mut ula, &mut mem);

        mem.write(0xA000, 0x01);
        mem.write(0xA001, 0x14);
        // Line 1: two empty data bytes, then all dots.
        mem.write(0xA028, 0x40);
        mem.write(0xA029, 0x40);
        mem.write(0xA02A, 0x3F);
        run_frame(&mut ula, &mem);
        assert!(ula.sink().cell(1, 2).iter().all(|&c| c == WHITE));
    }

    #[test]
    fn inverse_bit_swaps_default_colours_for_one_cell() {
        let mut ula = make_ula();
        let mut mem = TestMemory::blank_text();
        mem.write(0xBB80, 0xC1);
        mem.write(0xBB81, 0x41);
        mem.set_glyph_row(0xB400, 0x41, 0, 0b10_1010);

        run_frame(&mut ula, &mem);
        let sink = ula.sink();
        assert_eq!(
            sink.cell(0, 0),
            &[BLACK, WHITE, BLACK, WHITE, BLACK, WHITE]
        );
        assert_eq!(
            sink.cell(0, 1),
            &[WHITE, BLACK, WHITE, BLACK, WHITE, BLACK]
        );
        assert!(sink.cell(0, 2).iter().all(|&c| c == BLACK));
    }

    #[test]
    fn inverse_complements_rather_than_swaps() {
        let mut ula = make_ula();
        let mut mem = TestMemory::new();
        enter_hires(&mut ula, &mut mem);

        mem.write(0xA000, 0x01);
        mem.write(0xA001, 0x14);
        mem.write(0xA002, 0xAA);
        mem.write(0xA003, 0x2A);
        run_frame(&mut ula, &mem);

        let sink = ula.sink();
        assert_eq!(sink.cell(0, 2), &[CYAN, YELLOW, CYAN, YELLOW, CYAN, YELLOW]);
        assert_eq!(sink.cell(0, 3), &DOTS_101010);
    }

    #[test]
    fn inverse_attribute_cell_shows_inverted_paper() {
        let mut ula = make_ula();
        let mut mem = TestMemory::blank_text();
        mem.write(0xBB80, 0x81); // ink red, inverse
        run_frame(&mut ula, &mem);
        assert!(ula.sink().cell(0, 0).iter().all(|&c| c == WHITE));
    }

    // === Blink ===

    #[test]
    fn blink_visible_16_frames_then_hidden_16() {
        let mut ula = make_ula();
        let mut mem = TestMemory::blank_text();
        mem.write(0xBB80, 0x0C); // blink on
        mem.write(0xBB81, 0x41);
        mem.set_glyph_row(0xB400, 0x41, 0, 0x3F);

        for frame in 0..64u32 {
            run_frame(&mut ula, &mem);
            let visible = ula.sink().cell(0, 1).iter().all(|&c| c == WHITE);
            let hidden = ula.sink().cell(0, 1).iter().all(|&c| c == BLACK);
            if frame & 16 == 0 {
                assert!(visible, "frame {frame} should show the cell");
            } else {
                assert!(hidden, "frame {frame} should hide the cell");
            }
        }
    }

    #[test]
    fn blink_mask_follows_each_occurrence() {
        let mut ula = make_ula();
        let mut mem = TestMemory::blank_text();
        mem.write(0xBB80, 0x0C); // blink on
        mem.write(0xBB81, 0x41);
        mem.write(0xBB82, 0x08); // blink off again
        mem.write(0xBB83, 0x41);
        mem.set_glyph_row(0xB400, 0x41, 0, 0x3F);
        mem.set_glyph_row(0xB400, 0x41, 1, 0x3F);

        ula.set_frame_count(16);
        ula.set_position(9, 0);
        finish_line(&mut ula, &mem);
        assert_eq!(ula.blink_mask(), DOTS_ALL, "mask resets at line start");
        finish_line(&mut ula, &mem);

        let sink = ula.sink();
        for line in 0..2 {
            assert!(sink.cell(line, 1).iter().all(|&c| c == BLACK), "line {line}");
            assert!(sink.cell(line, 3).iter().all(|&c| c == WHITE), "line {line}");
        }
    }

    // === Charset, double height ===

    #[test]
    fn double_height_recomputes_glyph_row_immediately() {
        let mut ula = make_ula();
        let mut mem = TestMemory::blank_text();
        // Window line 11 lives in text row 1.
        mem.write(0xBB80 + 40, 0x0A);

        ula.set_position(9 + 11, 12);
        assert_eq!(ula.charline(), 3);
        ula.step(&mem);
        assert!(ula.double_height());
        assert_eq!(ula.charline(), 5);

        finish_line(&mut ula, &mem);
        assert!(!ula.double_height());
        assert_eq!(ula.charline(), 4);
    }

    #[test]
    fn double_height_draws_glyph_rows_twice() {
        let mut ula = make_ula();
        let mut mem = TestMemory::blank_text();
        for text_row in 0..3u16 {
            let row = 0xBB80 + text_row * 40;
            mem.write(row, 0x0A);
            mem.write(row + 1, 0x41);
        }
        for row in 0..8u16 {
            mem.set_glyph_row(0xB400, 0x41, row, 0x20u8 >> row.min(5));
        }

        run_frame(&mut ula, &mem);
        let sink = ula.sink();
        assert_eq!(sink.cell(0, 1), sink.cell(1, 1));
        assert_eq!(sink.cell(2, 1), sink.cell(3, 1));
        assert_ne!(sink.cell(1, 1), sink.cell(2, 1));
        assert_eq!(sink.cell(8, 1), sink.cell(9, 1));
        assert_eq!(sink.cell(16, 1), sink.cell(0, 1), "pattern repeats every 16 lines");
    }

    #[test]
    fn alternate_charset_moves_glyph_table() {
        let mut ula = make_ula();
        let mut mem = TestMemory::blank_text();
        mem.write(0xBB80, 0x09);
        mem.write(0xBB81, 0x41);
        mem.set_glyph_row(0xB800, 0x41, 0, 0x3F);

        ula.set_position(9, 12);
        ula.step(&mem);
        assert_eq!(ula.charset_addr(), 0xB800);
        ula.step(&mem);
        assert!(ula.sink().cell(0, 1).iter().all(|&c| c == WHITE));

        finish_line(&mut ula, &mem);
        assert_eq!(ula.charset_addr(), 0xB400, "charset resets at line start");
    }

    // === Modes ===

    #[test]
    fn hires_attribute_above_line_200_selects_bitmap() {
        let mut ula = make_ula();
        let mut mem = TestMemory::blank_text();
        mem.write(0xBB80 + 6 * 40, 0x1E);

        ula.set_position(9 + 50, 12);
        ula.step(&mem);
        assert!(ula.hires_mode());
        assert!(!ula.text_mode());
        assert_eq!(ula.line_addr(), 0xA000 + 50 * 40);
        assert_eq!(ula.charset_addr(), 0x9800);
    }

    #[test]
    fn hires_attribute_below_line_200_stays_text() {
        let mut ula = make_ula();
        let mut mem = TestMemory::blank_text();
        mem.write(0xBB80 + 26 * 40, 0x1E);

        ula.set_position(9 + 210, 12);
        ula.step(&mem);
        assert!(ula.hires_mode());
        assert!(ula.text_mode());
        assert_eq!(ula.line_addr(), 0xBB80 + 26 * 40);
    }

    #[test]
    fn hires_frame_switches_to_text_at_line_200() {
        let mut ula = make_ula();
        let mut mem = TestMemory::blank_text();
        enter_hires(&mut ula, &mut mem);
        assert_eq!(ula.line_addr(), 0xA000);

        while ula.window_line() < 199 {
            ula.step(&mem);
        }
        assert!(!ula.text_mode());
        assert_eq!(ula.line_addr(), 0xA000 + 199 * 40);

        finish_line(&mut ula, &mem);
        assert_eq!(ula.window_line(), 200);
        assert!(ula.text_mode());
        assert_eq!(ula.line_addr(), 0xBF68);

        run_frame(&mut ula, &mem);
        assert!(!ula.text_mode(), "next frame starts in hires again");
    }

    #[test]
    fn text_attribute_leaves_hires() {
        let mut ula = make_ula();
        let mut mem = TestMemory::new();
        enter_hires(&mut ula, &mut mem);

        mem.write(0xA000, 0x1A);
        ula.set_position(9, 12);
        ula.step(&mem);
        assert!(!ula.hires_mode());
        assert!(ula.text_mode());
        assert_eq!(ula.line_addr(), 0xBB80);
        assert_eq!(ula.charset_addr(), 0xB400);
    }

    // === Diagnostics ===

    #[test]
    fn dump_reports_counters() {
        let mut ula = make_ula();
        let mem = TestMemory::blank_text();
        for _ in 0..64 * 10 + 5 {
            ula.step(&mem);
        }
        let dump = ula.dump();
        assert_eq!(dump, UlaDump { frame_count: 0, hcount: 5, vcount: 10 });
        assert_eq!(ula.to_string(), "ULA: frame 0, line 10, cycle 5");
    }

    #[test]
    fn observable_paths() {
        let ula = make_ula();
        assert_eq!(ula.query("window_line"), Some(Value::I16(-9)));
        assert_eq!(ula.query("line_addr"), Some(Value::U16(0xBB80)));
        assert_eq!(ula.query("pal"), Some(Value::Bool(true)));
        assert_eq!(ula.query("nonsense"), None);
        for path in ula.query_paths() {
            assert!(ula.query(path).is_some(), "{path}");
        }
    }
}
