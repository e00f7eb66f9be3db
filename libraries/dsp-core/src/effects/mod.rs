//! Effect chaining
//!
//! Every processing unit that works in place on a mono block implements
//! [`AudioEffect`]; an [`EffectChain`] runs them in series:
//! - **BiquadFilter** / **FirFilter**: tone shaping
//! - **DelayEffect**: feedback delay
//! - **Gain**, **SoftClip**, **HardLimiter**: level and saturation
//! - **StreamingConvolver**: impulse-response convolution

mod chain;

pub use chain::{AudioEffect, EffectChain};
