//! RMS envelope detection

use crate::error::{DspError, Result};
use crate::util::{assert_same_len, require_positive};

/// One-pole RMS envelope follower
///
/// Tracks the mean square of the signal with exponential smoothing and
/// reports its square root. `alpha` near 1 gives slow, smooth tracking;
/// near 0 it follows the instantaneous magnitude.
#[derive(Debug, Clone)]
pub struct RmsDetector {
    mean_square: f32,
    alpha: f32,
}

impl RmsDetector {
    /// Create a detector with smoothing coefficient `alpha` in `[0, 1)`
    pub fn new(alpha: f32) -> Result<Self> {
        if !(0.0..1.0).contains(&alpha) {
            return Err(DspError::invalid(format!(
                "RMS smoothing coefficient must be in [0, 1), got {alpha}"
            )));
        }

        Ok(Self {
            mean_square: 0.0,
            alpha,
        })
    }

    /// Create a detector from a time constant in milliseconds
    pub fn from_time_constant(time_ms: f32, sample_rate: f32) -> Result<Self> {
        let time_ms = require_positive("RMS time constant", time_ms)?;
        let sample_rate = require_positive("sample rate", sample_rate)?;
        let samples = time_ms / 1000.0 * sample_rate;
        let alpha = (-1.0 / samples).exp();
        if alpha >= 1.0 {
            return Err(DspError::invalid(format!(
                "RMS time constant {time_ms} ms is too long to represent at {sample_rate} Hz"
            )));
        }
        Self::new(alpha)
    }

    /// Smoothing coefficient
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Current envelope value
    pub fn value(&self) -> f32 {
        self.mean_square.sqrt()
    }

    /// Forget the running value
    pub fn reset(&mut self) {
        self.mean_square = 0.0;
    }

    /// Feed one sample and return the updated envelope
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        self.mean_square = self.alpha * self.mean_square + (1.0 - self.alpha) * input * input;
        self.mean_square.sqrt()
    }

    /// Envelope of a whole block
    ///
    /// # Panics
    /// If `input` and `output` differ in length.
    pub fn process_block(&mut self, input: &[f32], output: &mut [f32]) {
        assert_same_len(input, output);
        for (out, &x) in output.iter_mut().zip(input) {
            *out = self.process(x);
        }
    }
}
