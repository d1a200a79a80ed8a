mod blur;
mod grayscale;

pub use blur::Blur;
pub use grayscale::Grayscale;
