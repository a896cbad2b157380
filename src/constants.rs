/// Side of the square working resolution shared by color, disparity and mask
pub const WORKING_SIZE: u32 = 360;

/// Largest raw disparity value produced by the stereo sensor
pub const DISPARITY_MAX: f32 = 95.0;

/// Kernel side used for the synthetic background blur
pub const BACKGROUND_BLUR_KERNEL: u32 = 99;

/// Virtual camera frame size
pub const OUTPUT_WIDTH: u32 = 640;
pub const OUTPUT_HEIGHT: u32 = 360;

/// Black margin added on each side to letterbox the square frame
pub const LETTERBOX_MARGIN: u32 = (OUTPUT_WIDTH - WORKING_SIZE) / 2;
