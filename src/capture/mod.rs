mod disparity;
mod webcam;

pub use disparity::DisparityCapture;
pub use webcam::WebcamCapture;

use anyhow::{Context, Result};
use image::{GrayImage, RgbImage};
use std::path::Path;

/// One color frame and the disparity frame aligned to it
pub struct FramePair {
    pub color: RgbImage,
    pub disparity: GrayImage,
}

/// Trait for depth camera sources
pub trait DepthSource {
    /// Block until the next color/disparity pair is available
    fn next_pair(&mut self) -> Result<FramePair>;

    /// Get the resolution of captured color frames
    fn resolution(&self) -> (u32, u32);
}

/// Color and disparity streams of a single depth camera
///
/// Both streams are released when this is dropped.
pub struct DepthCapture {
    color: WebcamCapture,
    disparity: DisparityCapture,
}

impl DepthCapture {
    pub fn new<P: AsRef<Path>>(color_index: u32, disparity_path: P) -> Result<Self> {
        let color = WebcamCapture::new(color_index).context("Failed to open color stream")?;
        let disparity =
            DisparityCapture::new(disparity_path).context("Failed to open disparity stream")?;

        let (cw, ch) = color.resolution();
        let (dw, dh) = disparity.resolution();
        if cw * dh != dw * ch {
            tracing::warn!(
                "Color {}x{} and disparity {}x{} differ in aspect; frames will not line up",
                cw,
                ch,
                dw,
                dh
            );
        }

        Ok(Self { color, disparity })
    }
}

impl DepthSource for DepthCapture {
    fn next_pair(&mut self) -> Result<FramePair> {
        let color = self.color.capture_frame()?;
        let disparity = self.disparity.capture_frame()?;
        Ok(FramePair { color, disparity })
    }

    fn resolution(&self) -> (u32, u32) {
        self.color.resolution()
    }
}
