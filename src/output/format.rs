use crate::constants::{LETTERBOX_MARGIN, OUTPUT_HEIGHT, OUTPUT_WIDTH};
use clap::ValueEnum;
use image::{imageops, RgbImage};

/// Byte layout a virtual camera sink expects
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PixelLayout {
    /// Packed YUV 4:2:2 (Y0 U Y1 V), the v4l2loopback default
    Yuyv,
    Rgb24,
    Bgr24,
}

impl PixelLayout {
    pub fn fourcc(self) -> [u8; 4] {
        match self {
            PixelLayout::Yuyv => *b"YUYV",
            PixelLayout::Rgb24 => *b"RGB3",
            PixelLayout::Bgr24 => *b"BGR3",
        }
    }

    pub fn bytes_per_pixel(self) -> u32 {
        match self {
            PixelLayout::Yuyv => 2,
            PixelLayout::Rgb24 | PixelLayout::Bgr24 => 3,
        }
    }

    pub fn frame_size(self, width: u32, height: u32) -> usize {
        (width * height * self.bytes_per_pixel()) as usize
    }

    /// Serialize an RGB frame into this layout
    pub fn encode(self, frame: &RgbImage) -> Vec<u8> {
        match self {
            PixelLayout::Yuyv => rgb_to_yuyv(frame),
            PixelLayout::Rgb24 => frame.as_raw().clone(),
            PixelLayout::Bgr24 => frame
                .pixels()
                .flat_map(|p| [p[2], p[1], p[0]])
                .collect(),
        }
    }
}

/// Letterbox the square composite into the fixed virtual camera frame
///
/// The frame is centered horizontally on a black canvas with equal side
/// margins. Output is always `OUTPUT_WIDTH x OUTPUT_HEIGHT`.
pub fn letterbox(frame: &RgbImage) -> RgbImage {
    let _span = tracing::debug_span!("format").entered();

    let mut canvas = RgbImage::new(OUTPUT_WIDTH, OUTPUT_HEIGHT);
    imageops::replace(&mut canvas, frame, i64::from(LETTERBOX_MARGIN), 0);
    canvas
}

/// Convert RGB frame to YUV422 (YUYV) format
fn rgb_to_yuyv(rgb_image: &RgbImage) -> Vec<u8> {
    let (width, height) = rgb_image.dimensions();
    let mut yuyv = Vec::with_capacity(PixelLayout::Yuyv.frame_size(width, height));

    for y in 0..height {
        for x in (0..width).step_by(2) {
            let pixel1 = rgb_image.get_pixel(x, y);
            let pixel2 = if x + 1 < width {
                rgb_image.get_pixel(x + 1, y)
            } else {
                pixel1
            };

            let (y1, u1, v1) = rgb_to_yuv(pixel1[0], pixel1[1], pixel1[2]);
            let (y2, u2, v2) = rgb_to_yuv(pixel2[0], pixel2[1], pixel2[2]);

            // Chroma is shared by the pixel pair
            let u = ((u1 as u16 + u2 as u16) / 2) as u8;
            let v = ((v1 as u16 + v2 as u16) / 2) as u8;

            yuyv.extend_from_slice(&[y1, u, y2, v]);
        }
    }

    yuyv
}

fn rgb_to_yuv(r: u8, g: u8, b: u8) -> (u8, u8, u8) {
    let r = r as f32;
    let g = g as f32;
    let b = b as f32;

    let y = (0.299 * r + 0.587 * g + 0.114 * b).clamp(0.0, 255.0) as u8;
    let u = ((-0.147 * r - 0.289 * g + 0.436 * b) + 128.0).clamp(0.0, 255.0) as u8;
    let v = ((0.615 * r - 0.515 * g - 0.100 * b) + 128.0).clamp(0.0, 255.0) as u8;

    (y, u, v)
}
