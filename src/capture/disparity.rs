use crate::error::PipelineError;
use anyhow::{Context, Result};
use image::GrayImage;
use std::path::Path;
use v4l::buffer::Type;
use v4l::io::mmap::Stream;
use v4l::io::traits::CaptureStream;
use v4l::video::Capture;
use v4l::{Device, FourCC};

const BUFFER_COUNT: u32 = 4;

/// Disparity stream of the depth camera, exposed as an 8-bit `GREY` v4l node
///
/// The device is expected to deliver disparity already aligned to the
/// color viewpoint, one byte per pixel in [0, 95].
pub struct DisparityCapture {
    stream: Stream<'static>,
    width: u32,
    height: u32,
    stride: u32,
}

impl DisparityCapture {
    pub fn new<P: AsRef<Path>>(device_path: P) -> Result<Self> {
        let path = device_path.as_ref();
        tracing::info!("Opening disparity stream at {}", path.display());

        let device = Device::with_path(path)
            .with_context(|| format!("Failed to open disparity device at {}", path.display()))?;

        let mut format = Capture::format(&device).context("Failed to query disparity format")?;
        format.fourcc = FourCC::new(b"GREY");
        let format =
            Capture::set_format(&device, &format).context("Failed to set disparity format")?;
        if format.fourcc != FourCC::new(b"GREY") {
            anyhow::bail!(
                "Disparity device offers {} instead of 8-bit GREY",
                format.fourcc
            );
        }

        let stream = Stream::with_buffers(&device, Type::VideoCapture, BUFFER_COUNT)
            .context("Failed to start disparity stream")?;

        tracing::info!(
            "Disparity stream at {}x{} (stride {})",
            format.width,
            format.height,
            format.stride
        );

        Ok(Self {
            stream,
            width: format.width,
            height: format.height,
            stride: format.stride.max(format.width),
        })
    }

    pub fn capture_frame(&mut self) -> Result<GrayImage> {
        let (buffer, _meta) = self
            .stream
            .next()
            .context("Failed to capture disparity frame")?;

        Ok(decode_grey(buffer, self.width, self.height, self.stride)?)
    }

    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl Drop for DisparityCapture {
    fn drop(&mut self) {
        tracing::info!("Disparity stream released");
    }
}

/// Copy a strided 8-bit buffer into a tightly packed image
fn decode_grey(
    buffer: &[u8],
    width: u32,
    height: u32,
    stride: u32,
) -> Result<GrayImage, PipelineError> {
    let needed = if height == 0 {
        0
    } else {
        (stride as usize) * (height as usize - 1) + width as usize
    };
    if buffer.len() < needed {
        return Err(PipelineError::Acquisition(format!(
            "disparity buffer holds {} bytes, {}x{} needs {}",
            buffer.len(),
            width,
            height,
            needed
        )));
    }

    let mut pixels = Vec::with_capacity((width * height) as usize);
    for row in 0..height as usize {
        let start = row * stride as usize;
        pixels.extend_from_slice(&buffer[start..start + width as usize]);
    }

    GrayImage::from_raw(width, height, pixels)
        .ok_or_else(|| PipelineError::Acquisition("disparity frame size mismatch".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stride_padding_is_skipped() {
        let buffer = [1, 2, 3, 0xEE, 4, 5, 6, 0xEE];
        let image = decode_grey(&buffer, 3, 2, 4).unwrap();
        assert_eq!(image.as_raw(), &vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn last_row_may_omit_padding() {
        let buffer = [1, 2, 3, 0xEE, 4, 5, 6];
        let image = decode_grey(&buffer, 3, 2, 4).unwrap();
        assert_eq!(image.get_pixel(2, 1)[0], 6);
    }

    #[test]
    fn short_buffer_is_an_acquisition_failure() {
        let err = decode_grey(&[0; 5], 3, 2, 4).unwrap_err();
        assert!(matches!(err, PipelineError::Acquisition(_)));
    }
}
