//! Stateless per-sample transforms: gain, soft clip, hard limiter
//!
//! The free functions work in place on a block. [`Gain`], [`SoftClip`] and
//! [`HardLimiter`] wrap them for use in an [`EffectChain`](crate::effects::EffectChain).

use crate::effects::AudioEffect;
use crate::error::{DspError, Result};
use crate::util::{db_to_linear, require_finite};

/// Scale a block by `gain_db` decibels
pub fn apply_gain(buffer: &mut [f32], gain_db: f32) {
    let gain = db_to_linear(gain_db);
    for sample in buffer.iter_mut() {
        *sample *= gain;
    }
}

/// Smooth `tanh` saturation toward +-1
pub fn soft_clip(buffer: &mut [f32]) {
    for sample in buffer.iter_mut() {
        *sample = sample.tanh();
    }
}

/// Brick-wall clip every sample to `+-threshold`
///
/// No lookahead and no release: samples above the threshold are simply
/// flattened, which adds harmonics at the clip point.
pub fn limiter_process(buffer: &mut [f32], threshold: f32) {
    for sample in buffer.iter_mut() {
        if *sample > threshold {
            *sample = threshold;
        } else if *sample < -threshold {
            *sample = -threshold;
        }
    }
}

/// Fixed gain stage
#[derive(Debug, Clone)]
pub struct Gain {
    gain_db: f32,
    enabled: bool,
}

impl Gain {
    pub fn new(gain_db: f32) -> Result<Self> {
        Ok(Self {
            gain_db: require_finite("gain", gain_db)?,
            enabled: true,
        })
    }

    pub fn gain_db(&self) -> f32 {
        self.gain_db
    }

    pub fn set_gain_db(&mut self, gain_db: f32) -> Result<()> {
        self.gain_db = require_finite("gain", gain_db)?;
        Ok(())
    }
}

impl AudioEffect for Gain {
    fn process(&mut self, buffer: &mut [f32]) {
        if self.enabled {
            apply_gain(buffer, self.gain_db);
        }
    }

    fn reset(&mut self) {}

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn name(&self) -> &str {
        "Gain"
    }
}

/// `tanh` saturation stage
#[derive(Debug, Clone)]
pub struct SoftClip {
    enabled: bool,
}

impl SoftClip {
    pub fn new() -> Self {
        Self { enabled: true }
    }
}

impl Default for SoftClip {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioEffect for SoftClip {
    fn process(&mut self, buffer: &mut [f32]) {
        if self.enabled {
            soft_clip(buffer);
        }
    }

    fn reset(&mut self) {}

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn name(&self) -> &str {
        "Soft Clip"
    }
}

/// Brick-wall clipping stage
#[derive(Debug, Clone)]
pub struct HardLimiter {
    threshold: f32,
    enabled: bool,
}

impl HardLimiter {
    /// Create a limiter clipping at `+-threshold` (linear, not dB)
    pub fn new(threshold: f32) -> Result<Self> {
        Ok(Self {
            threshold: Self::check_threshold(threshold)?,
            enabled: true,
        })
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn set_threshold(&mut self, threshold: f32) -> Result<()> {
        self.threshold = Self::check_threshold(threshold)?;
        Ok(())
    }

    fn check_threshold(threshold: f32) -> Result<f32> {
        if threshold.is_finite() && threshold >= 0.0 {
            Ok(threshold)
        } else {
            Err(DspError::invalid(format!(
                "limiter threshold must be finite and non-negative, got {threshold}"
            )))
        }
    }
}

impl AudioEffect for HardLimiter {
    fn process(&mut self, buffer: &mut [f32]) {
        if self.enabled {
            limiter_process(buffer, self.threshold);
        }
    }

    fn reset(&mut self) {}

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn name(&self) -> &str {
        "Limiter"
    }
}
