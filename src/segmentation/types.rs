use image::RgbImage;
use ndarray::Array2;

/// Per-pixel background weight, shape `(height, width)`
///
/// Values lie in [0.0, 1.0]: 0.0 = fully foreground (kept from the color
/// frame), 1.0 = fully background, anything between is a soft blend. Lower
/// values mean "in focus". This is easy to invert by mistake; the compositor
/// weights the color frame by `1 - mask`.
pub type Mask = Array2<f32>;

/// Mask size as `(width, height)`, matching `image` conventions
pub fn mask_dimensions(mask: &Mask) -> (u32, u32) {
    let (rows, cols) = mask.dim();
    (cols as u32, rows as u32)
}

/// Render the mask as a grayscale image for preview
pub fn mask_to_rgb(mask: &Mask) -> RgbImage {
    let (width, height) = mask_dimensions(mask);
    RgbImage::from_fn(width, height, |x, y| {
        let value = (mask[[y as usize, x as usize]] * 255.0).clamp(0.0, 255.0) as u8;
        image::Rgb([value, value, value])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions_follow_image_order() {
        let mask = Mask::zeros((10, 20));
        assert_eq!(mask_dimensions(&mask), (20, 10));
    }

    #[test]
    fn preview_maps_weights_to_gray_levels() {
        let mut mask = Mask::zeros((1, 2));
        mask[[0, 1]] = 1.0;

        let preview = mask_to_rgb(&mask);
        assert_eq!(preview.get_pixel(0, 0).0, [0, 0, 0]);
        assert_eq!(preview.get_pixel(1, 0).0, [255, 255, 255]);
    }
}
