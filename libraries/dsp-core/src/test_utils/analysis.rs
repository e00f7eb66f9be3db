//! Measurement helpers for verifying processed signals

use std::f64::consts::PI;

/// RMS level of a block; 0 for an empty block
pub fn calculate_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

/// Largest absolute sample value
pub fn calculate_peak(samples: &[f32]) -> f32 {
    samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max)
}

/// Largest sample-wise absolute difference between two equal-length signals
pub fn max_abs_difference(signal_a: &[f32], signal_b: &[f32]) -> f32 {
    assert_eq!(signal_a.len(), signal_b.len(), "signals must have the same length");
    signal_a
        .iter()
        .zip(signal_b)
        .map(|(a, b)| (a - b).abs())
        .fold(0.0f32, f32::max)
}

/// Amplitude of the `frequency` component, by single-bin DFT (Goertzel)
///
/// For a pure sine of amplitude `A` spanning a whole number of cycles this
/// returns `A`.
pub fn tone_amplitude(samples: &[f32], frequency: f32, sample_rate: u32) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let omega = 2.0 * PI * f64::from(frequency) / f64::from(sample_rate);
    let coeff = 2.0 * omega.cos();
    let (mut s1, mut s2) = (0.0f64, 0.0f64);
    for &x in samples {
        let s0 = f64::from(x) + coeff * s1 - s2;
        s2 = s1;
        s1 = s0;
    }

    let power = s1 * s1 + s2 * s2 - coeff * s1 * s2;
    (2.0 * power.max(0.0).sqrt() / samples.len() as f64) as f32
}
