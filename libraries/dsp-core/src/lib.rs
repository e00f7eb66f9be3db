//! DSP Core
//!
//! Block-based mono processing units for real-time audio effects.
//!
//! This crate provides:
//! - Biquad shelving/peaking filters synthesized from the Audio EQ Cookbook
//! - Direct-form FIR filter and circular feedback delay line
//! - Gain, soft clip and hard limiter waveshapers plus an RMS envelope follower
//! - A radix-2 FFT with one-shot and streaming (overlap-add) convolution
//! - An effect chain architecture, the shelf-into-delay plugin path, and
//!   serde-friendly chain settings
//!
//! Units are created once with their sample rate and sizes, then fed blocks
//! from the host callback. Construction validates its arguments and
//! pre-allocates; processing never allocates and never fails.
//!
//! # Example: Filtering a block
//!
//! ```rust
//! use dsp_core::{BiquadDesign, BiquadFilter};
//!
//! # fn example() -> dsp_core::Result<()> {
//! let mut shelf = BiquadFilter::new(BiquadDesign::low_shelf(500.0, 6.0, 0.707, 44100.0))?;
//!
//! let input = vec![0.25; 512];
//! let mut output = vec![0.0; 512];
//! shelf.process(&input, &mut output);
//! # Ok(())
//! # }
//! ```
//!
//! # Example: Building a chain
//!
//! ```rust
//! use dsp_core::effects::EffectChain;
//! use dsp_core::{Gain, HardLimiter, SoftClip};
//!
//! # fn example() -> dsp_core::Result<()> {
//! let mut chain = EffectChain::new();
//! chain.add_effect(Box::new(Gain::new(-3.0)?));
//! chain.add_effect(Box::new(SoftClip::new()));
//! chain.add_effect(Box::new(HardLimiter::new(0.8)?));
//!
//! let mut buffer = vec![1.5; 256];
//! chain.process(&mut buffer);
//! assert!(buffer.iter().all(|s| s.abs() <= 0.8));
//! # Ok(())
//! # }
//! ```

pub mod convolution;
mod delay;
mod dsp_chain;
mod dynamics;
pub mod effects;
mod error;
pub mod fft;
mod filters;
mod settings;
mod util;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use convolution::{convolve, convolve_direct, ConvolutionEngine, StreamingConvolver};
pub use delay::{DelayBuffer, DelayEffect};
pub use dsp_chain::DspChain;
pub use dynamics::{apply_gain, limiter_process, soft_clip, Gain, HardLimiter, RmsDetector, SoftClip};
pub use error::{DspError, Result};
pub use fft::Fft;
pub use filters::{BiquadCoefficients, BiquadDesign, BiquadFilter, BiquadKind, FirFilter};
pub use settings::{ChainSettings, DelaySettings, FilterSettings};
pub use util::{db_to_linear, linear_to_db};
