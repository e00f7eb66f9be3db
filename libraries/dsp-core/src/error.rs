//! Error types for DSP unit construction

use std::collections::TryReserveError;
use thiserror::Error;

/// Result type for DSP operations
pub type Result<T> = std::result::Result<T, DspError>;

/// Errors raised when building or configuring processing units
///
/// Processing itself never fails under valid preconditions. These errors come
/// from construction and parameter entry points only.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DspError {
    /// Non-positive length/capacity/sample rate, out-of-range offset, unknown name
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A construction-time buffer could not be reserved
    #[error("Failed to allocate {requested} samples")]
    AllocationFailure {
        /// Number of samples that were requested
        requested: usize,
    },

    /// Coefficients or feedback that would make a recursive structure unstable
    #[error("Numerical instability: {0}")]
    NumericalInstability(String),
}

impl DspError {
    /// Shorthand for [`DspError::InvalidArgument`]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

/// Allocate a buffer of `len` default values, reporting allocation failure instead of aborting
pub(crate) fn zeroed<T: Clone + Default>(len: usize) -> Result<Vec<T>> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(len)
        .map_err(|_: TryReserveError| DspError::AllocationFailure { requested: len })?;
    buffer.resize(len, T::default());
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeroed_buffer_has_requested_length() {
        let buffer = zeroed::<f32>(16).unwrap();
        assert_eq!(buffer.len(), 16);
        assert!(buffer.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn huge_allocation_is_reported() {
        let result = zeroed::<f32>(usize::MAX / 2);
        assert!(matches!(result, Err(DspError::AllocationFailure { .. })));
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            DspError::invalid("capacity must be positive").to_string(),
            "Invalid argument: capacity must be positive"
        );
        assert_eq!(
            DspError::AllocationFailure { requested: 8 }.to_string(),
            "Failed to allocate 8 samples"
        );
    }
}
