use crate::error::{PipelineError, Result};
use image::{imageops, ImageBuffer, Pixel};

/// Brings frames of any landscape aspect into the square working space
pub struct Preprocessor {
    target_size: u32,
}

impl Preprocessor {
    pub fn new(target_size: u32) -> Self {
        Self { target_size }
    }

    /// Crop a centered square and resize it to the working resolution
    ///
    /// Steps:
    /// 1. Drop `(w - h) / 2` columns from the left and keep `h` columns
    /// 2. Resize the `h x h` square to `target_size x target_size`
    ///
    /// Color frames, disparity frames and the static background all pass
    /// through here so that downstream stages share one coordinate space.
    pub fn normalize<P>(
        &self,
        image: &ImageBuffer<P, Vec<P::Subpixel>>,
    ) -> Result<ImageBuffer<P, Vec<P::Subpixel>>>
    where
        P: Pixel + 'static,
    {
        let _span = tracing::debug_span!("normalize").entered();

        let (width, height) = image.dimensions();
        if height > width {
            return Err(PipelineError::PortraitFrame { width, height });
        }

        if width == height && width == self.target_size {
            return Ok(image.clone());
        }

        let margin = (width - height) / 2;
        let square = imageops::crop_imm(image, margin, 0, height, height).to_image();
        if height == self.target_size {
            return Ok(square);
        }

        Ok(imageops::resize(
            &square,
            self.target_size,
            self.target_size,
            imageops::FilterType::Triangle,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    #[test]
    fn wide_frame_becomes_working_square() {
        let frame = RgbImage::new(1920, 1080);
        let normalized = Preprocessor::new(360).normalize(&frame).unwrap();
        assert_eq!(normalized.dimensions(), (360, 360));
    }

    #[test]
    fn side_margins_are_cropped_away() {
        // Red margins of 20 px around a green 40x40 center
        let frame = RgbImage::from_fn(80, 40, |x, _| {
            if (20..60).contains(&x) {
                Rgb([0, 255, 0])
            } else {
                Rgb([255, 0, 0])
            }
        });

        let normalized = Preprocessor::new(40).normalize(&frame).unwrap();
        assert!(normalized.pixels().all(|p| *p == Rgb([0, 255, 0])));
    }

    #[test]
    fn square_input_is_only_resized() {
        let frame = GrayImage::from_pixel(720, 720, Luma([42]));
        let normalized = Preprocessor::new(360).normalize(&frame).unwrap();
        assert_eq!(normalized.dimensions(), (360, 360));
        assert!(normalized.pixels().all(|p| p[0] == 42));
    }

    #[test]
    fn portrait_input_is_rejected() {
        let frame = GrayImage::new(300, 400);
        let err = Preprocessor::new(360).normalize(&frame).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::PortraitFrame {
                width: 300,
                height: 400
            }
        ));
    }
}
