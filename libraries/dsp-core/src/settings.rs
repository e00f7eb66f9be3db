//! Serializable chain descriptions
//!
//! A [`ChainSettings`] describes a mono effect chain as plain data so it can
//! live in a config file. Absent optional sections mean the stage is left out;
//! [`ChainSettings::default`] describes the reference scenario (low shelf
//! boost, trim, soft clip, limiter).

use crate::delay::{seconds_to_samples, DelayBuffer, DelayEffect};
use crate::dynamics::{Gain, HardLimiter, SoftClip};
use crate::effects::EffectChain;
use crate::error::{DspError, Result};
use crate::filters::{BiquadDesign, BiquadFilter, BiquadKind, FirFilter};
use crate::util::{require_finite, require_positive};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Biquad stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSettings {
    #[serde(default = "default_filter_kind")]
    pub kind: BiquadKind,

    pub frequency: f32,

    #[serde(default)]
    pub gain_db: f32,

    #[serde(default = "default_q")]
    pub q: f32,
}

impl FilterSettings {
    /// Design at `sample_rate`
    pub fn design(&self, sample_rate: f32) -> BiquadDesign {
        BiquadDesign::new(self.kind, self.frequency, self.gain_db, self.q, sample_rate)
    }
}

/// Feedback delay stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelaySettings {
    #[serde(default = "default_max_delay_secs")]
    pub max_delay_secs: f32,

    pub delay_secs: f32,

    #[serde(default)]
    pub feedback: f32,
}

/// Mono chain: filter, FIR, delay, gain, soft clip, limiter (each optional)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainSettings {
    #[serde(default = "default_sample_rate")]
    pub sample_rate: f32,

    /// Trim in dB; 0 leaves the stage out
    #[serde(default)]
    pub gain_db: f32,

    #[serde(default)]
    pub soft_clip: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limiter_threshold: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fir: Option<Vec<f32>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterSettings>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<DelaySettings>,
}

impl ChainSettings {
    /// Empty chain at `sample_rate`
    pub fn passthrough(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            gain_db: 0.0,
            soft_clip: false,
            limiter_threshold: None,
            fir: None,
            filter: None,
            delay: None,
        }
    }

    /// Check every stage without building anything
    pub fn validate(&self) -> Result<()> {
        require_positive("sample rate", self.sample_rate)?;

        if let Some(filter) = &self.filter {
            filter.design(self.sample_rate).validate()?;
        }

        if let Some(fir) = &self.fir {
            if fir.is_empty() {
                return Err(DspError::invalid("FIR coefficient list is empty"));
            }
            if fir.iter().any(|c| !c.is_finite()) {
                return Err(DspError::invalid("FIR coefficients must be finite"));
            }
        }

        if let Some(delay) = &self.delay {
            require_positive("max delay", delay.max_delay_secs)?;
            require_finite("feedback", delay.feedback)?;
            if !(0.0..delay.max_delay_secs).contains(&delay.delay_secs) {
                return Err(DspError::invalid(format!(
                    "delay time {}s must be in [0, {})",
                    delay.delay_secs, delay.max_delay_secs
                )));
            }
            if delay.feedback.abs() >= 1.0 {
                warn!(
                    feedback = delay.feedback,
                    "Delay feedback magnitude >= 1, output will not decay"
                );
            }
        }

        require_finite("gain", self.gain_db)?;

        if let Some(threshold) = self.limiter_threshold {
            if !threshold.is_finite() || threshold < 0.0 {
                return Err(DspError::invalid(format!(
                    "limiter threshold must be finite and non-negative, got {threshold}"
                )));
            }
        }

        Ok(())
    }

    /// Build the chain in fixed order: filter, FIR, delay, gain, soft clip, limiter
    pub fn build(&self) -> Result<EffectChain> {
        self.validate()?;

        let mut chain = EffectChain::new();

        if let Some(filter) = &self.filter {
            chain.add_effect(Box::new(BiquadFilter::new(filter.design(self.sample_rate))?));
        }

        if let Some(fir) = &self.fir {
            chain.add_effect(Box::new(FirFilter::new(fir)?));
        }

        if let Some(delay) = &self.delay {
            let buffer = DelayBuffer::with_max_delay(delay.max_delay_secs, self.sample_rate)?;
            let delay_samples = seconds_to_samples(delay.delay_secs, self.sample_rate)?;
            chain.add_effect(Box::new(DelayEffect::new(
                buffer,
                delay_samples,
                delay.feedback,
            )?));
        }

        if self.gain_db != 0.0 {
            chain.add_effect(Box::new(Gain::new(self.gain_db)?));
        }

        if self.soft_clip {
            chain.add_effect(Box::new(SoftClip::new()));
        }

        if let Some(threshold) = self.limiter_threshold {
            chain.add_effect(Box::new(HardLimiter::new(threshold)?));
        }

        info!(
            sample_rate = self.sample_rate,
            stages = chain.len(),
            "Built effect chain"
        );
        Ok(chain)
    }
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            gain_db: -3.0,
            soft_clip: true,
            limiter_threshold: Some(0.8),
            fir: None,
            filter: Some(FilterSettings {
                kind: BiquadKind::LowShelf,
                frequency: 500.0,
                gain_db: 6.0,
                q: default_q(),
            }),
            delay: None,
        }
    }
}

// Default values
fn default_sample_rate() -> f32 {
    44100.0
}

fn default_filter_kind() -> BiquadKind {
    BiquadKind::LowShelf
}

fn default_q() -> f32 {
    0.707
}

fn default_max_delay_secs() -> f32 {
    2.0
}
