//! Test signal generation
//!
//! - Sine waves (single frequency)
//! - Logarithmic sine sweeps
//! - White noise
//! - Square waves
//! - Impulses

use rand::Rng;
use std::f32::consts::PI;

/// Generate a mono sine wave
///
/// # Arguments
/// * `frequency` - Frequency in Hz
/// * `sample_rate` - Sample rate in Hz
/// * `duration` - Duration in seconds
/// * `amplitude` - Peak amplitude
pub fn generate_sine_wave(frequency: f32, sample_rate: u32, duration: f32, amplitude: f32) -> Vec<f32> {
    let num_samples = (sample_rate as f32 * duration) as usize;
    (0..num_samples)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            (2.0 * PI * frequency * t).sin() * amplitude
        })
        .collect()
}

/// Generate a logarithmic sine sweep from `start_freq` to `end_freq`
pub fn generate_sine_sweep(
    start_freq: f32,
    end_freq: f32,
    sample_rate: u32,
    duration: f32,
    amplitude: f32,
) -> Vec<f32> {
    let num_samples = (sample_rate as f32 * duration) as usize;
    let k = (end_freq / start_freq).ln() / duration;

    (0..num_samples)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            let phase = 2.0 * PI * start_freq * ((k * t).exp() - 1.0) / k;
            phase.sin() * amplitude
        })
        .collect()
}

/// Generate uniform white noise in `[-amplitude, amplitude)`
pub fn generate_white_noise(sample_rate: u32, duration: f32, amplitude: f32) -> Vec<f32> {
    let num_samples = (sample_rate as f32 * duration) as usize;
    let mut rng = rand::thread_rng();
    (0..num_samples)
        .map(|_| rng.gen_range(-1.0..1.0) * amplitude)
        .collect()
}

/// Generate a square wave (rich in odd harmonics, useful for clipping tests)
pub fn generate_square_wave(frequency: f32, sample_rate: u32, duration: f32, amplitude: f32) -> Vec<f32> {
    generate_sine_wave(frequency, sample_rate, duration, 1.0)
        .into_iter()
        .map(|s| if s >= 0.0 { amplitude } else { -amplitude })
        .collect()
}

/// Unit-position impulse of `amplitude` followed by `len - 1` zeros
pub fn generate_impulse(len: usize, amplitude: f32) -> Vec<f32> {
    let mut samples = vec![0.0; len];
    if let Some(first) = samples.first_mut() {
        *first = amplitude;
    }
    samples
}
