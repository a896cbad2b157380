use super::format::PixelLayout;
use super::OutputSink;
use crate::error::PipelineError;
use anyhow::{Context, Result};
use image::RgbImage;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use v4l::video::Output;
use v4l::{Device, Format, FourCC};

/// Virtual camera backed by a v4l2loopback device
pub struct V4L2Output {
    file: File,
    path: PathBuf,
    layout: PixelLayout,
    width: u32,
    height: u32,
}

impl V4L2Output {
    pub fn new<P: AsRef<Path>>(
        device_path: P,
        width: u32,
        height: u32,
        layout: PixelLayout,
    ) -> Result<Self> {
        let path = device_path.as_ref();
        tracing::info!(
            "Opening v4l2loopback device at {} ({}x{}, {:?})",
            path.display(),
            width,
            height,
            layout
        );

        let device = Device::with_path(path)
            .with_context(|| format!("Failed to open v4l2loopback device at {}", path.display()))?;
        let requested = Format::new(width, height, FourCC::new(&layout.fourcc()));
        let actual = Output::set_format(&device, &requested)
            .context("Failed to set v4l2loopback output format")?;
        if actual.width != width || actual.height != height || actual.fourcc != requested.fourcc {
            anyhow::bail!(
                "v4l2loopback device accepted {}x{} {} instead of {}x{} {}",
                actual.width,
                actual.height,
                actual.fourcc,
                width,
                height,
                requested.fourcc
            );
        }

        // v4l2loopback accepts raw frame data written to the device file
        let file = File::options()
            .write(true)
            .open(path)
            .with_context(|| format!("Failed to open v4l2loopback device at {}", path.display()))?;

        tracing::info!("v4l2loopback device opened successfully");

        Ok(Self {
            file,
            path: path.to_path_buf(),
            layout,
            width,
            height,
        })
    }
}

impl OutputSink for V4L2Output {
    fn write_frame(&mut self, frame: &RgbImage) -> Result<()> {
        if frame.dimensions() != (self.width, self.height) {
            return Err(PipelineError::DimensionMismatch {
                what: "virtual camera frame",
                expected: (self.width, self.height),
                actual: frame.dimensions(),
            }
            .into());
        }

        let data = self.layout.encode(frame);
        self.file
            .write_all(&data)
            .map_err(|e| PipelineError::Sink(e.to_string()))
            .context("Failed to write frame to v4l2loopback device")?;

        Ok(())
    }

    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl Drop for V4L2Output {
    fn drop(&mut self) {
        tracing::info!("Closing v4l2loopback device {}", self.path.display());
    }
}
