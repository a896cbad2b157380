mod depth_mask;
mod preprocess;
pub mod types;

pub use depth_mask::disparity_to_mask;
pub use preprocess::Preprocessor;
pub use types::{mask_to_rgb, Mask};
