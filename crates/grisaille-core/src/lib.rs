pub mod color;
pub mod config;
pub mod error;
pub mod image_buf;
pub mod io;
pub mod pipeline;

pub use config::PipelineConfig;
pub use error::PipelineError;
pub use image_buf::ImageBuf;
pub use pipeline::{Pipeline, PipelineOutput, StageTiming};
