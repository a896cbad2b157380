use crate::error::{PipelineError, Result};
use crate::segmentation::types::{mask_dimensions, Mask};
use image::{imageops, RgbImage};

/// Blend the color frame over the background using the mask as background weight
///
/// Each channel is `color * (1 - m) + background * m`. The two weights sum
/// to one, so results never leave the 8-bit range.
pub fn composite(
    color: &RgbImage,
    mask: &Mask,
    background: &RgbImage,
    mirror: bool,
) -> Result<RgbImage> {
    let _span = tracing::debug_span!("composite").entered();

    let expected = color.dimensions();
    check_dimensions("mask", expected, mask_dimensions(mask))?;
    check_dimensions("background", expected, background.dimensions())?;

    let mut result = RgbImage::from_fn(expected.0, expected.1, |x, y| {
        let weight = mask[[y as usize, x as usize]].clamp(0.0, 1.0);
        let fg = color.get_pixel(x, y);
        let bg = background.get_pixel(x, y);

        image::Rgb(std::array::from_fn(|c| {
            let value = f32::from(fg[c]) * (1.0 - weight) + f32::from(bg[c]) * weight;
            value.round().clamp(0.0, 255.0) as u8
        }))
    });

    if mirror {
        imageops::flip_horizontal_in_place(&mut result);
    }

    Ok(result)
}

fn check_dimensions(what: &'static str, expected: (u32, u32), actual: (u32, u32)) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(PipelineError::DimensionMismatch {
            what,
            expected,
            actual,
        })
    }
}
