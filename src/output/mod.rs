mod format;
mod loopback;
mod preview;

pub use format::{letterbox, PixelLayout};
pub use loopback::V4L2Output;
pub use preview::PreviewWindow;

use anyhow::Result;
use image::RgbImage;

/// Trait for output destinations
pub trait OutputSink {
    /// Write a frame to the output
    fn write_frame(&mut self, frame: &RgbImage) -> Result<()>;

    /// Get the expected output resolution
    fn resolution(&self) -> (u32, u32);
}

/// Trait for on-screen debug views of the composite
pub trait Preview {
    fn show(&mut self, frame: &RgbImage) -> Result<()>;
}
