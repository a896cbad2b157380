use super::types::Mask;
use crate::constants::DISPARITY_MAX;
use crate::control::Params;
use image::GrayImage;
use imageproc::{filter, morphology};

/// Map raw disparity [0, 95] onto the 8-bit intensity range
///
/// The product is truncated and wrapped to 8 bits. Inputs above the sensor
/// maximum overflow instead of saturating.
pub fn scale_to_intensity(disparity: &GrayImage) -> GrayImage {
    let multiplier = 255.0 / f64::from(DISPARITY_MAX);
    let mut intensity = disparity.clone();
    for pixel in intensity.pixels_mut() {
        let scaled = f64::from(pixel[0]) * multiplier;
        pixel[0] = (scaled as u32 & 0xFF) as u8;
    }
    intensity
}

/// Focus-band rule for a single intensity value
///
/// Values above `focus` saturate to 255, then values below
/// `focus - translucent_size` drop to 0. The two rules run in that order, so
/// a band floor above 255 also zeroes saturated pixels.
pub fn band_threshold(value: u8, params: &Params) -> u8 {
    let value = if i32::from(value) > params.focus {
        u8::MAX
    } else {
        value
    };
    if i32::from(value) < params.band_floor() {
        0
    } else {
        value
    }
}

/// Median blur then dilate the intensity frame
pub fn smooth(intensity: &GrayImage, params: &Params) -> GrayImage {
    let radius = params.blur.saturating_sub(1) / 2;
    let mut smoothed = if radius > 0 {
        let _span = tracing::debug_span!("median_blur", kernel = params.blur).entered();
        filter::median_filter(intensity, radius, radius)
    } else {
        intensity.clone()
    };

    // n passes of a 3x3 max filter equal one pass over a (2n+1) square
    if params.dilate > 0 {
        let _span = tracing::debug_span!("dilate", iterations = params.dilate).entered();
        let radius = params.dilate.min(u32::from(u8::MAX)) as u8;
        smoothed = morphology::grayscale_dilate(&smoothed, &morphology::Mask::square(radius));
    }

    smoothed
}

/// Derive the background-weight mask from a normalized disparity frame
pub fn disparity_to_mask(disparity: &GrayImage, params: &Params) -> Mask {
    let _span = tracing::debug_span!("depth_mask").entered();

    let intensity = smooth(&scale_to_intensity(disparity), params);
    let (width, height) = intensity.dimensions();

    Mask::from_shape_fn((height as usize, width as usize), |(y, x)| {
        let value = intensity.get_pixel(x as u32, y as u32)[0];
        f32::from(band_threshold(value, params)) / 255.0
    })
}
