//! Frequency-domain convolution
//!
//! [`convolve`] is the one-shot full linear convolution of two finite
//! signals. [`StreamingConvolver`] applies a fixed impulse response to an
//! unbounded stream with overlap-add.

mod engine;
mod streaming;

pub use engine::{convolve, convolve_direct, ConvolutionEngine};
pub use streaming::StreamingConvolver;
