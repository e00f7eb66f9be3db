//! Shared numeric helpers

use crate::error::{DspError, Result};

/// Smallest value treated as non-silent by [`linear_to_db`]
const MIN_LINEAR: f32 = 1e-10;

/// Convert decibels to a linear amplitude factor
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

/// Convert a linear amplitude factor to decibels
///
/// Values at or below 1e-10 (including zero and negatives) map to -200 dB.
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    if linear <= MIN_LINEAR {
        -200.0
    } else {
        20.0 * linear.log10()
    }
}

/// Reject values that are not finite and strictly positive
pub(crate) fn require_positive(name: &str, value: f32) -> Result<f32> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(DspError::invalid(format!(
            "{name} must be finite and positive, got {value}"
        )))
    }
}

/// Reject non-finite values
pub(crate) fn require_finite(name: &str, value: f32) -> Result<f32> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DspError::invalid(format!("{name} must be finite, got {value}")))
    }
}

/// Input and output blocks must be the same length
#[inline]
#[track_caller]
pub(crate) fn assert_same_len(input: &[f32], output: &[f32]) {
    assert_eq!(
        input.len(),
        output.len(),
        "input and output blocks must have the same length"
    );
}
