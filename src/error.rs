use thiserror::Error;

/// Failures raised by the per-frame pipeline and its device adapters.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The depth camera returned no frame or a malformed one
    #[error("frame acquisition failed: {0}")]
    Acquisition(String),

    /// Inputs must be landscape (width >= height)
    #[error("frame is {width}x{height}, expected width >= height")]
    PortraitFrame { width: u32, height: u32 },

    #[error("{what} is {actual:?}, expected {expected:?}")]
    DimensionMismatch {
        what: &'static str,
        expected: (u32, u32),
        actual: (u32, u32),
    },

    /// The virtual camera or preview cannot accept a frame
    #[error("sink rejected frame: {0}")]
    Sink(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
