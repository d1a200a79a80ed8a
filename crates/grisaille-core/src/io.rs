use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result};
use image::ImageFormat;
use tracing::{debug, info};

use crate::image_buf::ImageBuf;

/// Decode a PNG or JPEG file into an RGBA8 ImageBuf.
pub fn load_image(path: &Path) -> Result<ImageBuf> {
    info!(?path, "loading image file");
    let t0 = std::time::Instant::now();

    let img =
        image::open(path).with_context(|| format!("failed to open image: {}", path.display()))?;
    debug!(
        elapsed_ms = t0.elapsed().as_millis(),
        width = img.width(),
        height = img.height(),
        "image decode"
    );

    Ok(ImageBuf::from_dynamic(img))
}

/// Decode an in-memory PNG or JPEG byte stream, guessing the format.
pub fn decode_image(bytes: &[u8]) -> Result<ImageBuf> {
    let img = image::load_from_memory(bytes).context("failed to decode image bytes")?;
    Ok(ImageBuf::from_dynamic(img))
}

/// Encode as PNG into memory.
pub fn encode_png(buf: &ImageBuf) -> Result<Vec<u8>> {
    let img = buf.to_rgba_image()?;
    let mut png_bytes = Vec::new();
    let mut cursor = Cursor::new(&mut png_bytes);
    img.write_to(&mut cursor, ImageFormat::Png)
        .context("encode image as PNG")?;

    debug!(size = png_bytes.len(), "encoded png");
    Ok(png_bytes)
}

/// Encode as PNG and write to `path`.
pub fn save_png(buf: &ImageBuf, path: &Path) -> Result<()> {
    info!(?path, "writing image file");
    let img = buf.to_rgba_image()?;
    img.save_with_format(path, ImageFormat::Png)
        .with_context(|| format!("failed to write image: {}", path.display()))
}
