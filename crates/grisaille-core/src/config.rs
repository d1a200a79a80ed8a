use serde::{Deserialize, Serialize};

pub const DEFAULT_BLUR_RADIUS: u32 = 5;

/// Parameters for the standard grayscale -> blur pipeline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Blur neighborhood half-width in pixels.
    pub blur_radius: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            blur_radius: DEFAULT_BLUR_RADIUS,
        }
    }
}
