//! Radix-2 decimation-in-time FFT
//!
//! In-place iterative Cooley-Tukey: bit-reversal permutation followed by
//! `log2(n)` butterfly stages. Twiddle factors are computed once per size in
//! double precision. The inverse transform flips the twiddle exponent sign and
//! is **not** normalized; divide by `n` afterwards.

use crate::error::{zeroed, DspError, Result};
use rustfft::num_complex::Complex;

/// Pre-planned transform for one power-of-two length
#[derive(Debug, Clone)]
pub struct Fft {
    len: usize,
    /// `e^{-2 pi i k / n}` for `k < n / 2`
    twiddles: Vec<Complex<f32>>,
    /// Bit-reversed index of every position
    bit_reverse: Vec<usize>,
}

impl Fft {
    /// Plan a transform of `len` points; `len` must be a power of two
    pub fn new(len: usize) -> Result<Self> {
        if len == 0 || !len.is_power_of_two() {
            return Err(DspError::invalid(format!(
                "FFT length must be a non-zero power of two, got {len}"
            )));
        }

        let mut twiddles: Vec<Complex<f32>> = zeroed(len / 2)?;
        for (k, w) in twiddles.iter_mut().enumerate() {
            let angle = -2.0 * std::f64::consts::PI * k as f64 / len as f64;
            *w = Complex::new(angle.cos() as f32, angle.sin() as f32);
        }

        let bits = len.trailing_zeros();
        let mut bit_reverse: Vec<usize> = zeroed(len)?;
        if bits > 0 {
            for (i, j) in bit_reverse.iter_mut().enumerate() {
                *j = i.reverse_bits() >> (usize::BITS - bits);
            }
        }

        Ok(Self {
            len,
            twiddles,
            bit_reverse,
        })
    }

    /// Transform length
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false; zero-length plans are rejected
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Forward transform in place
    ///
    /// # Panics
    /// If `buffer.len()` differs from the planned length.
    pub fn forward(&self, buffer: &mut [Complex<f32>]) {
        self.transform(buffer, false);
    }

    /// Unnormalized inverse transform in place
    ///
    /// # Panics
    /// If `buffer.len()` differs from the planned length.
    pub fn inverse(&self, buffer: &mut [Complex<f32>]) {
        self.transform(buffer, true);
    }

    fn transform(&self, buffer: &mut [Complex<f32>], inverse: bool) {
        let n = self.len;
        assert_eq!(buffer.len(), n, "FFT buffer length must match the plan");

        for (i, &j) in self.bit_reverse.iter().enumerate() {
            if i < j {
                buffer.swap(i, j);
            }
        }

        let mut size = 2;
        while size <= n {
            let half = size / 2;
            let stride = n / size;

            for block in buffer.chunks_exact_mut(size) {
                let (lower, upper) = block.split_at_mut(half);
                for (k, (a, b)) in lower.iter_mut().zip(upper.iter_mut()).enumerate() {
                    let w = self.twiddles[k * stride];
                    let w = if inverse { w.conj() } else { w };

                    let t = *b * w;
                    *b = *a - t;
                    *a += t;
                }
            }

            size <<= 1;
        }
    }
}
