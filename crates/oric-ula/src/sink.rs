//! Frame sinks: where the ULA's dots go.
//!
//! The chip writes dots in raster order and signals the end of each frame.
//! A sink must never let a display observe a frame that is still being
//! drawn. Two implementations are provided:
//!
//! - [`DoubleBufferSink`] + [`FrameReader`]: the producer draws into a
//!   private buffer and publishes it at the frame boundary by swapping it
//!   into a shared slot. A reader on any thread polls the slot. If the reader
//!   falls behind, the unread frame is replaced by the newer one: the chip
//!   never waits for a display.
//! - [`CallbackSink`]: forwards every dot and every frame boundary to host
//!   closures, for hosts that stage dots themselves and present on
//!   end-of-frame.

use std::sync::Arc;

use log::debug;
use parking_lot::Mutex;

use crate::config::{ScreenGeometry, WINDOW_PIXELS};
use crate::palette::PixelFormat;

/// Receiver of the chip's dot stream.
pub trait FrameSink {
    /// Write one dot. `offset` is the window-linear position
    /// (`line * 240 + dot`), `colour` a palette index 0-7.
    fn put_pixel(&mut self, offset: usize, colour: u8);

    /// The frame that was being drawn is complete.
    fn end_frame(&mut self);
}

/// The slot shared between producer and reader.
struct Exchange {
    pixels: Vec<u32>,
    /// True while `pixels` holds a published frame nobody has polled.
    ready: bool,
    published: u64,
    dropped: u64,
}

/// Create a connected producer/reader pair.
#[must_use]
pub fn double_buffer(
    geometry: ScreenGeometry,
    format: PixelFormat,
) -> (DoubleBufferSink, FrameReader) {
    let blank = vec![format.encode(0); geometry.len()];
    let exchange = Arc::new(Mutex::new(Exchange {
        pixels: blank.clone(),
        ready: false,
        published: 0,
        dropped: 0,
    }));
    let sink = DoubleBufferSink {
        active: blank.clone(),
        geometry,
        colours: format.table(),
        exchange: Arc::clone(&exchange),
    };
    let reader = FrameReader {
        display: blank,
        geometry,
        format,
        exchange,
    };
    (sink, reader)
}

/// Producer half of the double buffer. Owned by the chip.
pub struct DoubleBufferSink {
    /// The frame being drawn. Only the producer ever touches it.
    active: Vec<u32>,
    geometry: ScreenGeometry,
    colours: [u32; 8],
    exchange: Arc<Mutex<Exchange>>,
}

impl DoubleBufferSink {
    #[must_use]
    pub fn geometry(&self) -> ScreenGeometry {
        self.geometry
    }
}

impl FrameSink for DoubleBufferSink {
    fn put_pixel(&mut self, offset: usize, colour: u8) {
        debug_assert!(offset < WINDOW_PIXELS, "dot offset {offset} outside the window");
        self.active[self.geometry.index(offset)] = self.colours[usize::from(colour & 0x07)];
    }

    fn end_frame(&mut self) {
        let (published, overwritten) = {
            let mut exchange = self.exchange.lock();
            let overwritten = exchange.ready;
            if overwritten {
                exchange.dropped += 1;
            }
            std::mem::swap(&mut self.active, &mut exchange.pixels);
            exchange.ready = true;
            exchange.published += 1;
            (exchange.published, overwritten)
        };
        if overwritten {
            debug!("frame {} replaced an unread frame", published);
        }
    }
}

/// Consumer half of the double buffer. `Send`, so it can live on the
/// display thread.
pub struct FrameReader {
    /// The last frame handed out by `poll_frame`.
    display: Vec<u32>,
    geometry: ScreenGeometry,
    format: PixelFormat,
    exchange: Arc<Mutex<Exchange>>,
}

impl FrameReader {
    /// Take the most recently completed frame, if one arrived since the
    /// last poll. Never blocks beyond the slot swap.
    pub fn poll_frame(&mut self) -> Option<&[u32]> {
        let fresh = {
            let mut exchange = self.exchange.lock();
            let fresh = exchange.ready;
            if fresh {
                exchange.ready = false;
                std::mem::swap(&mut self.display, &mut exchange.pixels);
            }
            fresh
        };
        fresh.then_some(self.display.as_slice())
    }

    /// The last frame returned by `poll_frame` (blank before the first).
    #[must_use]
    pub fn last_frame(&self) -> &[u32] {
        &self.display
    }

    #[must_use]
    pub fn geometry(&self) -> ScreenGeometry {
        self.geometry
    }

    #[must_use]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Frames completed by the producer so far.
    #[must_use]
    pub fn frames_published(&self) -> u64 {
        self.exchange.lock().published
    }

    /// Frames replaced before anyone polled them.
    #[must_use]
    pub fn frames_dropped(&self) -> u64 {
        self.exchange.lock().dropped
    }
}

/// A sink that hands every dot to a closure.
///
/// `on_pixel` receives the window-linear offset and palette index;
/// `on_frame` runs once per completed frame, after its last dot.
pub struct CallbackSink<P, F>
where
    P: FnMut(usize, u8),
    F: FnMut(),
{
    on_pixel: P,
    on_frame: F,
}

impl<P, F> CallbackSink<P, F>
where
    P: FnMut(usize, u8),
    F: FnMut(),
{
    pub fn new(on_pixel: P, on_frame: F) -> Self {
        Self { on_pixel, on_frame }
    }
}

impl<P, F> FrameSink for CallbackSink<P, F>
where
    P: FnMut(usize, u8),
    F: FnMut(),
{
    fn put_pixel(&mut self, offset: usize, colour: u8) {
        (self.on_pixel)(offset, colour);
    }

    fn end_frame(&mut self) {
        (self.on_frame)();
    }
}
