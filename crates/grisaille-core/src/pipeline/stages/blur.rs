use anyhow::Result;

use crate::config::DEFAULT_BLUR_RADIUS;
use crate::image_buf::{CHANNELS, ImageBuf};
use crate::pipeline::stage::Stage;

/// Separable Gaussian blur over a square neighborhood.
///
/// The kernel spans `radius` pixels on each side of the center (2r+1 taps per
/// axis) with sigma = r/2, normalized to sum to one. Samples past the image
/// edge are clamped to the nearest edge pixel, so a uniform image comes back
/// unchanged at any size. All four channels are blurred independently.
/// Both passes accumulate in f32; the result is rounded once at the end.
pub struct Blur {
    radius: u32,
    kernel: Vec<f32>,
}

impl Blur {
    pub fn new(radius: u32) -> Self {
        Self {
            radius,
            kernel: gaussian_kernel(radius),
        }
    }
}

impl Default for Blur {
    fn default() -> Self {
        Self::new(DEFAULT_BLUR_RADIUS)
    }
}

fn gaussian_kernel(radius: u32) -> Vec<f32> {
    if radius == 0 {
        return vec![1.0];
    }
    let sigma = radius as f32 / 2.0;
    let denom = 2.0 * sigma * sigma;
    let r = radius as i64;
    let mut kernel: Vec<f32> = (-r..=r)
        .map(|k| (-((k * k) as f32) / denom).exp())
        .collect();
    let sum: f32 = kernel.iter().sum();
    for w in &mut kernel {
        *w /= sum;
    }
    kernel
}

/// Source index for kernel tap `tap` around `center`, clamped to `0..len`.
fn clamp_tap(center: usize, tap: usize, radius: usize, len: usize) -> usize {
    (center + tap).saturating_sub(radius).min(len - 1)
}

impl Stage for Blur {
    fn name(&self) -> &str {
        "blur"
    }

    fn apply(&self, input: ImageBuf) -> Result<ImageBuf> {
        if self.radius == 0 || input.is_empty() {
            return Ok(input);
        }

        let width = input.width as usize;
        let height = input.height as usize;
        let radius = self.radius as usize;

        // Horizontal pass: u8 -> f32.
        let mut horizontal = vec![0.0_f32; width * height * CHANNELS];
        for y in 0..height {
            let row = &input.data[y * width * CHANNELS..(y + 1) * width * CHANNELS];
            for x in 0..width {
                let mut acc = [0.0_f32; CHANNELS];
                for (tap, &weight) in self.kernel.iter().enumerate() {
                    let sx = clamp_tap(x, tap, radius, width) * CHANNELS;
                    for c in 0..CHANNELS {
                        acc[c] += weight * row[sx + c] as f32;
                    }
                }
                let idx = (y * width + x) * CHANNELS;
                horizontal[idx..idx + CHANNELS].copy_from_slice(&acc);
            }
        }

        // Vertical pass: f32 -> u8.
        let mut data = vec![0_u8; width * height * CHANNELS];
        for y in 0..height {
            for x in 0..width {
                let mut acc = [0.0_f32; CHANNELS];
                for (tap, &weight) in self.kernel.iter().enumerate() {
                    let sy = clamp_tap(y, tap, radius, height);
                    let idx = (sy * width + x) * CHANNELS;
                    for c in 0..CHANNELS {
                        acc[c] += weight * horizontal[idx + c];
                    }
                }
                let idx = (y * width + x) * CHANNELS;
                for c in 0..CHANNELS {
                    data[idx + c] = acc[c].round().clamp(0.0, 255.0) as u8;
                }
            }
        }

        ImageBuf::from_data(input.width, input.height, data)
    }
}
