use anyhow::Result;

use crate::image_buf::ImageBuf;

/// A single image-to-image transformation in the pipeline.
///
/// Implementations are stateless and must return an image with the same
/// dimensions as their input.
pub trait Stage: Send + Sync {
    fn name(&self) -> &str;
    fn apply(&self, input: ImageBuf) -> Result<ImageBuf>;
}
