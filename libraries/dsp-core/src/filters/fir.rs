//! Direct-form FIR filter
//!
//! O(N) per sample tapped delay line. Fine for short kernels; long impulse
//! responses belong in the FFT convolution path.

use crate::effects::AudioEffect;
use crate::error::{zeroed, DspError, Result};
use crate::util::assert_same_len;
use tracing::debug;

/// Finite impulse response filter
///
/// `state[0]` is the most recent input; `state` always holds the last
/// `len()` inputs, most recent first.
#[derive(Debug, Clone)]
pub struct FirFilter {
    coeffs: Vec<f32>,
    state: Vec<f32>,
    enabled: bool,
}

impl FirFilter {
    /// Copy `coeffs` and allocate zeroed state of the same length
    pub fn new(coeffs: &[f32]) -> Result<Self> {
        if coeffs.is_empty() {
            return Err(DspError::invalid("FIR filter needs at least one coefficient"));
        }

        let mut owned: Vec<f32> = zeroed(coeffs.len())?;
        owned.copy_from_slice(coeffs);
        let state = zeroed(coeffs.len())?;
        debug!(taps = coeffs.len(), "Created FIR filter");

        Ok(Self {
            coeffs: owned,
            state,
            enabled: true,
        })
    }

    /// Number of taps
    pub fn len(&self) -> usize {
        self.coeffs.len()
    }

    /// Always false; construction rejects empty kernels
    pub fn is_empty(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// Filter kernel
    pub fn coefficients(&self) -> &[f32] {
        &self.coeffs
    }

    /// Zero the tapped delay line
    pub fn reset(&mut self) {
        self.state.fill(0.0);
    }

    /// Shift one sample in and compute the dot product
    #[inline]
    pub fn process_sample(&mut self, input: f32) -> f32 {
        let last = self.state.len() - 1;
        self.state.copy_within(..last, 1);
        self.state[0] = input;

        self.coeffs
            .iter()
            .zip(&self.state)
            .map(|(c, s)| c * s)
            .sum()
    }

    /// Filter `input` into `output`
    ///
    /// # Panics
    /// If `input` and `output` differ in length.
    pub fn process(&mut self, input: &[f32], output: &mut [f32]) {
        assert_same_len(input, output);
        for (out, &x) in output.iter_mut().zip(input) {
            *out = self.process_sample(x);
        }
    }

    /// Filter a block in place
    ///
    /// The history lives in `state`, so overwriting the input is safe.
    pub fn process_in_place(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process_sample(*sample);
        }
    }
}

impl AudioEffect for FirFilter {
    fn process(&mut self, buffer: &mut [f32]) {
        if self.enabled {
            self.process_in_place(buffer);
        }
    }

    fn reset(&mut self) {
        FirFilter::reset(self);
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn name(&self) -> &str {
        "FIR"
    }
}
