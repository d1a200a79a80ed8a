use anyhow::Result;

use crate::color;
use crate::image_buf::{CHANNELS, ImageBuf};
use crate::pipeline::stage::Stage;

/// Replaces every pixel with its opaque luminance-equivalent gray.
pub struct Grayscale;

impl Stage for Grayscale {
    fn name(&self) -> &str {
        "grayscale"
    }

    fn apply(&self, input: ImageBuf) -> Result<ImageBuf> {
        let mut data = Vec::with_capacity(input.data.len());
        for pixel in input.data.chunks_exact(CHANNELS) {
            data.extend_from_slice(&color::to_gray_rgba([
                pixel[0], pixel[1], pixel[2], pixel[3],
            ]));
        }
        ImageBuf::from_data(input.width, input.height, data)
    }
}
