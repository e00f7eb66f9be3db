//! Circular delay buffer with integer read offset and feedback
//!
//! The buffer always holds the most recent `capacity` samples that were
//! written back into it (input plus fed-back delayed signal). Feedback values
//! with magnitude >= 1 are accepted: keeping the loop stable is up to the
//! caller, typically by placing a limiter downstream.

use crate::effects::AudioEffect;
use crate::error::{zeroed, DspError, Result};
use crate::util::{assert_same_len, require_finite, require_positive};
use tracing::debug;

/// Fixed-capacity circular sample buffer
#[derive(Debug, Clone)]
pub struct DelayBuffer {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl DelayBuffer {
    /// Create a zero-filled buffer holding `capacity` samples
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(DspError::invalid("delay capacity must be positive"));
        }

        let buffer = zeroed(capacity)?;
        debug!(capacity, "Allocated delay buffer");

        Ok(Self {
            buffer,
            write_pos: 0,
        })
    }

    /// Create a buffer sized for `max_delay_secs` at `sample_rate`
    pub fn with_max_delay(max_delay_secs: f32, sample_rate: f32) -> Result<Self> {
        let secs = require_positive("max delay", max_delay_secs)?;
        let rate = require_positive("sample rate", sample_rate)?;
        Self::new((secs * rate).ceil() as usize)
    }

    /// Number of samples the buffer holds
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Current write cursor
    pub fn write_pos(&self) -> usize {
        self.write_pos
    }

    /// Zero the contents and rewind the write cursor
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }

    /// Check a read offset against the capacity
    pub fn validate_delay(&self, delay_samples: usize) -> Result<()> {
        if delay_samples >= self.capacity() {
            return Err(DspError::invalid(format!(
                "delay of {delay_samples} samples exceeds capacity {}",
                self.capacity()
            )));
        }
        Ok(())
    }

    /// Advance one sample: read the delayed tap, write `input + delayed * feedback`
    ///
    /// Returns `(mixed, delayed)`.
    #[inline]
    pub(crate) fn tick(&mut self, input: f32, delay_samples: usize, feedback: f32) -> (f32, f32) {
        let capacity = self.buffer.len();
        let read_pos = (self.write_pos + capacity - delay_samples) % capacity;
        let delayed = self.buffer[read_pos];
        let mixed = input + delayed * feedback;

        self.buffer[self.write_pos] = mixed;
        self.write_pos = (self.write_pos + 1) % capacity;

        (mixed, delayed)
    }

    /// Mix the delayed signal into the input: `output[i] = input[i] + delayed * feedback`
    ///
    /// The mixed value is also written back into the buffer. An offset of 0
    /// addresses the slot about to be overwritten, i.e. the sample written
    /// `capacity` samples ago.
    ///
    /// # Errors
    /// `InvalidArgument` if `delay_samples >= capacity`; no state is touched.
    ///
    /// # Panics
    /// If `input` and `output` differ in length.
    pub fn process(
        &mut self,
        input: &[f32],
        output: &mut [f32],
        delay_samples: usize,
        feedback: f32,
    ) -> Result<()> {
        assert_same_len(input, output);
        self.validate_delay(delay_samples)?;

        for (out, &x) in output.iter_mut().zip(input) {
            *out = self.tick(x, delay_samples, feedback).0;
        }
        Ok(())
    }

    /// In-place variant of [`DelayBuffer::process`]
    pub fn process_in_place(
        &mut self,
        buffer: &mut [f32],
        delay_samples: usize,
        feedback: f32,
    ) -> Result<()> {
        self.validate_delay(delay_samples)?;

        for sample in buffer.iter_mut() {
            *sample = self.tick(*sample, delay_samples, feedback).0;
        }
        Ok(())
    }

    /// Same buffer update as [`DelayBuffer::process`], but output only the delayed tap
    ///
    /// With zero feedback this is a pure delay of `delay_samples` samples
    /// (for offsets of at least one sample).
    ///
    /// # Panics
    /// If `input` and `output` differ in length.
    pub fn process_wet(
        &mut self,
        input: &[f32],
        output: &mut [f32],
        delay_samples: usize,
        feedback: f32,
    ) -> Result<()> {
        assert_same_len(input, output);
        self.validate_delay(delay_samples)?;

        for (out, &x) in output.iter_mut().zip(input) {
            *out = self.tick(x, delay_samples, feedback).1;
        }
        Ok(())
    }
}

/// Feedback delay with a fixed offset, usable in an effect chain
///
/// Outputs `input + delayed * feedback` like [`DelayBuffer::process`]. The
/// offset is checked when set, so processing cannot fail.
#[derive(Debug, Clone)]
pub struct DelayEffect {
    buffer: DelayBuffer,
    delay_samples: usize,
    feedback: f32,
    enabled: bool,
}

impl DelayEffect {
    pub fn new(buffer: DelayBuffer, delay_samples: usize, feedback: f32) -> Result<Self> {
        buffer.validate_delay(delay_samples)?;
        Ok(Self {
            buffer,
            delay_samples,
            feedback: require_finite("feedback", feedback)?,
            enabled: true,
        })
    }

    /// Size the buffer for `max_delay_secs` and set the offset from `delay_secs`
    pub fn from_secs(
        max_delay_secs: f32,
        delay_secs: f32,
        feedback: f32,
        sample_rate: f32,
    ) -> Result<Self> {
        let buffer = DelayBuffer::with_max_delay(max_delay_secs, sample_rate)?;
        let delay_samples = seconds_to_samples(delay_secs, sample_rate)?;
        Self::new(buffer, delay_samples, feedback)
    }

    pub fn delay_samples(&self) -> usize {
        self.delay_samples
    }

    pub fn feedback(&self) -> f32 {
        self.feedback
    }

    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    pub fn set_delay_samples(&mut self, delay_samples: usize) -> Result<()> {
        self.buffer.validate_delay(delay_samples)?;
        self.delay_samples = delay_samples;
        Ok(())
    }

    pub fn set_feedback(&mut self, feedback: f32) -> Result<()> {
        self.feedback = require_finite("feedback", feedback)?;
        Ok(())
    }
}

impl AudioEffect for DelayEffect {
    fn process(&mut self, buffer: &mut [f32]) {
        if !self.enabled {
            return;
        }
        for sample in buffer.iter_mut() {
            *sample = self
                .buffer
                .tick(*sample, self.delay_samples, self.feedback)
                .0;
        }
    }

    fn reset(&mut self) {
        self.buffer.clear();
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn name(&self) -> &str {
        "Delay"
    }
}

/// Truncate a duration to whole samples; negative or non-finite is rejected
pub(crate) fn seconds_to_samples(secs: f32, sample_rate: f32) -> Result<usize> {
    let rate = require_positive("sample rate", sample_rate)?;
    if !secs.is_finite() || secs < 0.0 {
        return Err(DspError::invalid(format!(
            "delay time must be finite and non-negative, got {secs}"
        )));
    }
    Ok((secs * rate) as usize)
}
