use crate::constants::BACKGROUND_BLUR_KERNEL;
use crate::segmentation::Preprocessor;
use anyhow::{Context, Result};
use image::RgbImage;
use imageproc::filter::gaussian_blur_f32;
use std::borrow::Cow;
use std::path::Path;

/// Supplies the backdrop the foreground is composited over
pub struct BackgroundProvider {
    image: Option<RgbImage>,
    blur_sigma: f32,
}

impl BackgroundProvider {
    /// Blur the live frame when no backdrop image is configured
    pub fn synthetic() -> Self {
        Self {
            image: None,
            blur_sigma: kernel_sigma(BACKGROUND_BLUR_KERNEL),
        }
    }

    /// Use a backdrop that is already at working resolution
    pub fn with_image(image: RgbImage) -> Self {
        Self {
            image: Some(image),
            ..Self::synthetic()
        }
    }

    /// Load and normalize the configured backdrop
    ///
    /// A missing or unreadable image is not fatal: the provider falls back
    /// to the synthetic blur.
    pub fn from_config(path: Option<&Path>, preprocessor: &Preprocessor) -> Self {
        let Some(path) = path else {
            tracing::info!("No background image configured, blurring the live frame");
            return Self::synthetic();
        };

        match load_image(path, preprocessor) {
            Ok(image) => {
                tracing::info!("Loaded background image from {}", path.display());
                Self::with_image(image)
            }
            Err(e) => {
                tracing::warn!("Ignoring background image: {:#}", e);
                Self::synthetic()
            }
        }
    }

    pub fn is_static(&self) -> bool {
        self.image.is_some()
    }

    /// Background for the current frame
    ///
    /// The static image is borrowed as-is; the synthetic one is computed
    /// from `frame` and dropped with the returned value.
    pub fn background<'a>(&'a self, frame: &RgbImage) -> Cow<'a, RgbImage> {
        match &self.image {
            Some(image) => Cow::Borrowed(image),
            None => {
                let _span = tracing::debug_span!("background_blur").entered();
                Cow::Owned(gaussian_blur_f32(frame, self.blur_sigma))
            }
        }
    }
}

/// Sigma a square Gaussian kernel of this size implies when none is given
fn kernel_sigma(kernel: u32) -> f32 {
    0.3 * ((kernel as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

fn load_image(path: &Path, preprocessor: &Preprocessor) -> Result<RgbImage> {
    let image = image::open(path)
        .with_context(|| format!("Failed to read {}", path.display()))?
        .to_rgb8();

    preprocessor
        .normalize(&image)
        .with_context(|| format!("Failed to normalize {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn default_kernel_matches_reference_sigma() {
        assert!((kernel_sigma(99) - 15.2).abs() < 1e-4);
    }

    #[test]
    fn static_background_is_returned_unchanged() {
        let image = RgbImage::from_pixel(4, 4, Rgb([1, 2, 3]));
        let provider = BackgroundProvider::with_image(image.clone());
        let frame = RgbImage::from_pixel(4, 4, Rgb([200, 200, 200]));

        let background = provider.background(&frame);
        assert!(matches!(background, Cow::Borrowed(_)));
        assert_eq!(*background, image);
    }

    #[test]
    fn synthetic_background_softens_the_frame() {
        let frame = RgbImage::from_fn(40, 40, |x, _| {
            if x < 20 {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        });
        let provider = BackgroundProvider::synthetic();

        let background = provider.background(&frame);
        assert_eq!(background.dimensions(), (40, 40));
        let edge = background.get_pixel(20, 20)[0];
        assert!(edge > 0 && edge < 255, "edge value {}", edge);
    }

    #[test]
    fn missing_file_falls_back_to_synthetic() {
        let provider = BackgroundProvider::from_config(
            Some(Path::new("/nonexistent/backdrop.png")),
            &Preprocessor::new(360),
        );
        assert!(!provider.is_static());
    }

    #[test]
    fn image_file_is_loaded_and_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backdrop.png");
        RgbImage::from_pixel(64, 32, Rgb([10, 20, 30]))
            .save(&path)
            .unwrap();

        let provider = BackgroundProvider::from_config(Some(&path), &Preprocessor::new(16));
        assert!(provider.is_static());

        let background = provider.background(&RgbImage::new(16, 16));
        assert_eq!(background.dimensions(), (16, 16));
        assert!(background.pixels().all(|p| p.0 == [10, 20, 30]));
    }

    #[test]
    fn portrait_file_falls_back_to_synthetic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portrait.png");
        RgbImage::new(20, 40).save(&path).unwrap();

        let provider = BackgroundProvider::from_config(Some(&path), &Preprocessor::new(16));
        assert!(!provider.is_static());
    }
}
