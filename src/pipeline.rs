use crate::capture::FramePair;
use crate::compositing::{composite, BackgroundProvider};
use crate::control::Params;
use crate::error::Result;
use crate::segmentation::{disparity_to_mask, Mask, Preprocessor};
use image::RgbImage;

/// Result of one pipeline iteration, before letterboxing
pub struct ProcessedFrame {
    /// Composited frame at working resolution
    pub composite: RgbImage,
    /// Background weight used for the blend
    pub mask: Mask,
}

/// Per-frame work: normalize, mask, composite
pub struct FramePipeline {
    preprocessor: Preprocessor,
    background: BackgroundProvider,
}

impl FramePipeline {
    pub fn new(preprocessor: Preprocessor, background: BackgroundProvider) -> Self {
        if background.is_static() {
            tracing::debug!("Compositing over a static background");
        } else {
            tracing::debug!("Compositing over the blurred camera frame");
        }
        Self {
            preprocessor,
            background,
        }
    }

    /// Run every stage on one frame pair
    ///
    /// `params` is read once here, so a command applied between frames
    /// takes effect on the next call. Any failure drops the whole frame.
    pub fn process(&self, pair: &FramePair, params: &Params) -> Result<ProcessedFrame> {
        let color = self.preprocessor.normalize(&pair.color)?;
        let disparity = self.preprocessor.normalize(&pair.disparity)?;

        let mask = disparity_to_mask(&disparity, params);
        let background = self.background.background(&color);
        let composite = composite(&color, &mask, &background, params.mirror)?;

        Ok(ProcessedFrame { composite, mask })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::WORKING_SIZE;
    use crate::error::PipelineError;
    use image::{GrayImage, Luma, Rgb};

    fn pipeline_with_backdrop(color: Rgb<u8>) -> FramePipeline {
        FramePipeline::new(
            Preprocessor::new(WORKING_SIZE),
            BackgroundProvider::with_image(RgbImage::from_pixel(WORKING_SIZE, WORKING_SIZE, color)),
        )
    }

    fn pair(disparity: u8) -> FramePair {
        FramePair {
            color: RgbImage::from_pixel(640, 400, Rgb([200, 100, 0])),
            disparity: GrayImage::from_pixel(640, 400, Luma([disparity])),
        }
    }

    #[test]
    fn near_subject_keeps_camera_pixels() {
        let pipeline = pipeline_with_backdrop(Rgb([0, 0, 255]));
        let frame = pipeline.process(&pair(5), &Params::default()).unwrap();

        assert_eq!(frame.composite.dimensions(), (WORKING_SIZE, WORKING_SIZE));
        assert!(frame.composite.pixels().all(|p| p.0 == [200, 100, 0]));
    }

    #[test]
    fn far_scene_is_replaced_by_backdrop() {
        let pipeline = pipeline_with_backdrop(Rgb([0, 0, 255]));
        let frame = pipeline.process(&pair(90), &Params::default()).unwrap();

        assert!(frame.composite.pixels().all(|p| p.0 == [0, 0, 255]));
        assert!(frame.mask.iter().all(|&v| v == 1.0));
    }

    #[test]
    fn mid_band_blends_both_sources() {
        let pipeline = pipeline_with_backdrop(Rgb([0, 0, 0]));
        let frame = pipeline.process(&pair(30), &Params::default()).unwrap();

        // Mask is 80/255, so about 69% of the camera color survives
        let red = frame.composite.get_pixel(180, 180)[0];
        assert!((135..=139).contains(&red), "red {}", red);
    }

    #[test]
    fn mirror_parameter_flips_output() {
        let pipeline = pipeline_with_backdrop(Rgb([0, 0, 0]));
        let pair = FramePair {
            color: RgbImage::from_fn(720, 360, |x, _| Rgb([(x / 3) as u8, 0, 0])),
            disparity: GrayImage::from_pixel(720, 360, Luma([5])),
        };
        let params = Params::default();
        let mirrored = Params {
            mirror: true,
            ..params
        };

        let plain = pipeline.process(&pair, &params).unwrap();
        let flipped = pipeline.process(&pair, &mirrored).unwrap();
        assert_eq!(
            flipped.composite,
            image::imageops::flip_horizontal(&plain.composite)
        );
    }

    #[test]
    fn portrait_frames_are_dropped() {
        let pipeline = pipeline_with_backdrop(Rgb([0, 0, 0]));
        let pair = FramePair {
            color: RgbImage::new(360, 480),
            disparity: GrayImage::new(360, 480),
        };

        let err = pipeline.process(&pair, &Params::default()).err().unwrap();
        assert!(matches!(err, PipelineError::PortraitFrame { .. }));
    }
}
