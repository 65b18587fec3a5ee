//! Headless capture: PNG screenshots and frame sequences.

use std::error::Error;
use std::fs;
use std::io::BufWriter;
use std::path::Path;

use oric_ula::{FrameReader, PixelFormat, ScreenGeometry};

use crate::Oric;

/// Write one encoded frame as an RGBA PNG.
pub fn save_png(
    pixels: &[u32],
    geometry: ScreenGeometry,
    format: PixelFormat,
    path: &Path,
) -> Result<(), Box<dyn Error>> {
    let file = fs::File::create(path)?;
    let w = BufWriter::new(file);
    let mut encoder = png::Encoder::new(w, geometry.width(), geometry.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;

    let rgba: Vec<u8> = pixels.iter().flat_map(|&p| format.to_rgba(p)).collect();
    writer.write_image_data(&rgba)?;
    Ok(())
}

/// Save the most recent frame the reader has seen as a PNG.
///
/// Polls first, so a frame completed since the last poll is the one saved.
pub fn save_screenshot(reader: &mut FrameReader, path: &Path) -> Result<(), Box<dyn Error>> {
    reader.poll_frame();
    save_png(reader.last_frame(), reader.geometry(), reader.format(), path)
}

/// Run `num_frames` frames, saving each as a numbered PNG in `dir`.
///
/// Creates `dir/000001.png`, `dir/000002.png`, etc.
pub fn save_frame_sequence(
    oric: &mut Oric,
    reader: &mut FrameReader,
    dir: &Path,
    num_frames: u32,
) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(dir)?;

    for i in 1..=num_frames {
        oric.run_frame();
        let filename = dir.join(format!("{i:06}.png"));
        save_screenshot(reader, &filename)?;
    }

    Ok(())
}
