//! Error types for hashnms.

use crate::backend::Device;
use thiserror::Error;

/// Result alias for hashnms operations.
pub type NmsResult<T> = std::result::Result<T, NmsError>;

/// Errors that can occur when running suppression algorithms.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum NmsError {
    /// Box and score buffers describe a different number of detections.
    #[error("box/score count mismatch: {boxes} boxes, {scores} scores")]
    LengthMismatch { boxes: usize, scores: usize },
    /// A flat coordinate buffer is not a whole number of 4-tuples.
    #[error("malformed box buffer: {len} values is not a multiple of 4")]
    MalformedBoxes { len: usize },
    /// An index refers past the end of a detection set.
    #[error("index {index} out of bounds for {len} detections")]
    IndexOutOfBounds { index: usize, len: usize },
    /// The input data or parameters are invalid.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// A hashing parameter lies outside the domain the quantizer is defined on.
    #[error("parameter `{param}` = {value} is out of domain: {reason}")]
    Domain {
        param: &'static str,
        value: f32,
        reason: &'static str,
    },
    /// No registered backend can service buffers on the requested device.
    #[error("no backend available for device {device:?}")]
    BackendUnavailable { device: Device },
}

impl NmsError {
    /// Returns true for shape and argument errors reported before any work.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            NmsError::LengthMismatch { .. }
                | NmsError::MalformedBoxes { .. }
                | NmsError::IndexOutOfBounds { .. }
                | NmsError::InvalidInput(_)
        )
    }

    /// Returns true for degenerate algorithm parameters.
    pub fn is_domain(&self) -> bool {
        matches!(self, NmsError::Domain { .. })
    }
}
