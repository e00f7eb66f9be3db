use crate::error::{zeroed, DspError, Result};
use crate::fft::Fft;
use rustfft::num_complex::Complex;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::debug;

/// Full linear convolution via FFT
///
/// Returns `input.len() + ir.len() - 1` samples. Plans a fresh transform on
/// every call; hold a [`ConvolutionEngine`] to reuse plans.
pub fn convolve(input: &[f32], ir: &[f32]) -> Result<Vec<f32>> {
    ConvolutionEngine::new().convolve(input, ir)
}

/// Time-domain reference convolution, O(Ni * Nh)
pub fn convolve_direct(input: &[f32], ir: &[f32]) -> Result<Vec<f32>> {
    check_operands(input, ir)?;

    let mut output: Vec<f32> = zeroed(input.len() + ir.len() - 1)?;
    for (i, &x) in input.iter().enumerate() {
        for (j, &h) in ir.iter().enumerate() {
            output[i + j] += x * h;
        }
    }
    Ok(output)
}

fn check_operands(input: &[f32], ir: &[f32]) -> Result<()> {
    if input.is_empty() {
        return Err(DspError::invalid("convolution input is empty"));
    }
    if ir.is_empty() {
        return Err(DspError::invalid("impulse response is empty"));
    }
    Ok(())
}

/// One-shot convolver with a plan cache keyed by FFT size
#[derive(Debug, Default)]
pub struct ConvolutionEngine {
    plans: HashMap<usize, Fft>,
}

impl ConvolutionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of FFT sizes planned so far
    pub fn plan_count(&self) -> usize {
        self.plans.len()
    }

    fn plan(&mut self, len: usize) -> Result<&Fft> {
        match self.plans.entry(len) {
            Entry::Occupied(entry) => Ok(&*entry.into_mut()),
            Entry::Vacant(entry) => {
                debug!(fft_size = len, "Planning FFT");
                Ok(&*entry.insert(Fft::new(len)?))
            }
        }
    }

    /// Convolve `input` with `ir`
    ///
    /// Both operands are zero-padded to the next power of two at or above
    /// `Ni + Nh - 1`, multiplied in the frequency domain, and transformed back.
    /// The result is scaled by `1/n` and truncated to `Ni + Nh - 1` samples.
    pub fn convolve(&mut self, input: &[f32], ir: &[f32]) -> Result<Vec<f32>> {
        check_operands(input, ir)?;

        let out_len = input.len() + ir.len() - 1;
        let n = out_len.next_power_of_two();
        let fft = self.plan(n)?;

        let mut signal = to_complex(input, n)?;
        let mut kernel = to_complex(ir, n)?;
        fft.forward(&mut signal);
        fft.forward(&mut kernel);

        for (s, k) in signal.iter_mut().zip(&kernel) {
            *s *= k;
        }
        fft.inverse(&mut signal);

        let scale = 1.0 / n as f32;
        let mut output: Vec<f32> = zeroed(out_len)?;
        for (y, c) in output.iter_mut().zip(&signal) {
            *y = c.re * scale;
        }
        Ok(output)
    }
}

fn to_complex(samples: &[f32], len: usize) -> Result<Vec<Complex<f32>>> {
    let mut buffer: Vec<Complex<f32>> = zeroed(len)?;
    for (slot, &x) in buffer.iter_mut().zip(samples) {
        slot.re = x;
    }
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: &[f32], expected: &[f32], tolerance: f32) {
        assert_eq!(actual.len(), expected.len());
        for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
            assert!((a - e).abs() < tolerance, "sample {i}: {a} vs {e}");
        }
    }

    #[test]
    fn impulse_returns_kernel() {
        let output = convolve(&[1.0, 0.0, 0.0, 0.0], &[1.0, 0.5, 0.25]).unwrap();
        assert_close(&output, &[1.0, 0.5, 0.25, 0.0, 0.0, 0.0], 1e-6);
    }

    #[test]
    fn output_length_is_full_linear() {
        let output = convolve(&[0.3; 100], &[0.1; 37]).unwrap();
        assert_eq!(output.len(), 136);
    }

    #[test]
    fn single_samples_multiply() {
        let output = convolve(&[3.0], &[-0.5]).unwrap();
        assert_close(&output, &[-1.5], 1e-6);
    }

    #[test]
    fn matches_direct_convolution() {
        let input: Vec<f32> = (0..300).map(|i| (i as f32 * 0.13).sin()).collect();
        let ir: Vec<f32> = (0..45).map(|i| (-(i as f32) / 10.0).exp()).collect();

        let fast = convolve(&input, &ir).unwrap();
        let direct = convolve_direct(&input, &ir).unwrap();
        assert_close(&fast, &direct, 1e-4);
    }

    #[test]
    fn empty_operands_rejected() {
        assert!(matches!(
            convolve(&[], &[1.0]),
            Err(DspError::InvalidArgument(_))
        ));
        assert!(matches!(
            convolve(&[1.0], &[]),
            Err(DspError::InvalidArgument(_))
        ));
        assert!(convolve_direct(&[], &[]).is_err());
    }

    #[test]
    fn plans_are_reused() {
        let mut engine = ConvolutionEngine::new();
        engine.convolve(&[1.0; 10], &[0.5; 5]).unwrap();
        engine.convolve(&[0.2; 12], &[0.1; 3]).unwrap();
        assert_eq!(engine.plan_count(), 1);

        engine.convolve(&[1.0; 40], &[0.5; 5]).unwrap();
        assert_eq!(engine.plan_count(), 2);
    }
}
