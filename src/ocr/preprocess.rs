//! Screenshot preprocessing before OCR.
//!
//! Phone screenshots are large; OCR time and memory scale with pixels.
//! Downscale so the longest side fits `max_dim`, then hand the engine an
//! in-memory PNG. Bounding boxes come back in the downscaled space, so the
//! width used for side detection is the downscaled width too.

use super::OcrError;
use image::imageops::FilterType;
use image::ImageFormat;

/// Longest side, in pixels, fed to the OCR engine.
pub const DEFAULT_MAX_DIM: u32 = 1024;

/// A screenshot ready for OCR.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub original_width: u32,
    pub original_height: u32,
}

/// Target size that fits within `max_dim` on the longest side.
/// Never upscales; aspect ratio preserved; never returns a zero side.
pub fn fit_within(width: u32, height: u32, max_dim: u32) -> (u32, u32) {
    if width.max(height) <= max_dim || max_dim == 0 {
        return (width, height);
    }
    let scale = |side: u32, long: u32| -> u32 {
        ((side as f64 * max_dim as f64 / long as f64).round() as u32).max(1)
    };
    if width > height {
        (max_dim, scale(height, width))
    } else {
        (scale(width, height), max_dim)
    }
}

/// Decode any supported image format, downscale, and re-encode as PNG.
pub fn prepare_screenshot(bytes: &[u8], max_dim: u32) -> Result<PreparedImage, OcrError> {
    let start = std::time::Instant::now();
    let img = image::load_from_memory(bytes)?;
    let (original_width, original_height) = (img.width(), img.height());
    let (width, height) = fit_within(original_width, original_height, max_dim);

    let img = if (width, height) != (original_width, original_height) {
        img.resize_exact(width, height, FilterType::Triangle)
    } else {
        img
    };

    let mut png = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut png), ImageFormat::Png)?;

    log::info!(
        "[OCR] Prepared screenshot {}x{} → {}x{} ({} bytes) in {}ms",
        original_width,
        original_height,
        width,
        height,
        png.len(),
        start.elapsed().as_millis()
    );

    Ok(PreparedImage {
        png,
        width,
        height,
        original_width,
        original_height,
    })
}
