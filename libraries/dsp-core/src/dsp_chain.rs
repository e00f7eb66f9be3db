//! Low-shelf filter into feedback delay, the plugin signal path
//!
//! The host calls the setters with its current parameter values before each
//! block and then [`DspChain::process`]. Nothing here allocates after
//! construction.

use crate::delay::{seconds_to_samples, DelayBuffer};
use crate::error::{zeroed, DspError, Result};
use crate::filters::{BiquadDesign, BiquadFilter};
use crate::util::{assert_same_len, require_finite, require_positive};
use tracing::debug;

/// Initial shelf corner frequency in Hz
pub const DEFAULT_CUTOFF_HZ: f32 = 1000.0;
/// Shelf gain; the path is tonally flat until the host changes the filter
pub const SHELF_GAIN_DB: f32 = 0.0;
/// Shelf quality factor
pub const SHELF_Q: f32 = 0.707;
/// Longest delay the buffer can hold, in seconds
pub const MAX_DELAY_SECS: f32 = 2.0;

/// Mono processing chain: low shelf, then feedback delay
#[derive(Debug, Clone)]
pub struct DspChain {
    sample_rate: f32,
    filter: BiquadFilter,
    delay: DelayBuffer,
    cutoff_hz: f32,
    delay_samples: usize,
    feedback: f32,
    /// Filter output, sized to the largest block processed in one pass
    scratch: Vec<f32>,
}

impl DspChain {
    /// Build the chain for `sample_rate`, processing at most `max_block` samples per pass
    pub fn new(sample_rate: f32, max_block: usize) -> Result<Self> {
        let sample_rate = require_positive("sample rate", sample_rate)?;
        if max_block == 0 {
            return Err(DspError::invalid("maximum block size must be positive"));
        }

        let filter = BiquadFilter::new(BiquadDesign::low_shelf(
            DEFAULT_CUTOFF_HZ,
            SHELF_GAIN_DB,
            SHELF_Q,
            sample_rate,
        ))?;
        let delay = DelayBuffer::with_max_delay(MAX_DELAY_SECS, sample_rate)?;
        let scratch = zeroed(max_block)?;

        debug!(sample_rate, max_block, "Created DSP chain");

        Ok(Self {
            sample_rate,
            filter,
            delay,
            cutoff_hz: DEFAULT_CUTOFF_HZ,
            delay_samples: 0,
            feedback: 0.0,
            scratch,
        })
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn max_block(&self) -> usize {
        self.scratch.len()
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff_hz
    }

    pub fn delay_samples(&self) -> usize {
        self.delay_samples
    }

    pub fn feedback(&self) -> f32 {
        self.feedback
    }

    /// Move the shelf corner
    ///
    /// Coefficients are only re-synthesized when the value actually changes.
    /// Filter history is kept, so the change does not click.
    pub fn set_cutoff(&mut self, cutoff_hz: f32) -> Result<()> {
        if cutoff_hz == self.cutoff_hz {
            return Ok(());
        }

        self.filter.set_design(BiquadDesign::low_shelf(
            cutoff_hz,
            SHELF_GAIN_DB,
            SHELF_Q,
            self.sample_rate,
        ))?;
        self.cutoff_hz = cutoff_hz;
        debug!(cutoff_hz, "Shelf cutoff changed");
        Ok(())
    }

    /// Set the delay time; the sample count must stay below the buffer capacity
    pub fn set_delay_time(&mut self, delay_secs: f32) -> Result<()> {
        let samples = seconds_to_samples(delay_secs, self.sample_rate)?;
        self.delay.validate_delay(samples)?;
        self.delay_samples = samples;
        Ok(())
    }

    /// Set the feedback gain; magnitudes of 1 or more are accepted
    pub fn set_feedback(&mut self, feedback: f32) -> Result<()> {
        self.feedback = require_finite("feedback", feedback)?;
        Ok(())
    }

    /// Clear filter and delay history
    pub fn reset(&mut self) {
        self.filter.reset();
        self.delay.clear();
    }

    /// Filter `input`, then mix in the delayed signal, writing to `output`
    ///
    /// # Panics
    /// If `input` and `output` differ in length.
    pub fn process(&mut self, input: &[f32], output: &mut [f32]) {
        assert_same_len(input, output);
        let block = self.scratch.len();

        for (inp, out) in input.chunks(block).zip(output.chunks_mut(block)) {
            let filtered = &mut self.scratch[..inp.len()];
            self.filter.process(inp, filtered);
            for (y, &x) in out.iter_mut().zip(filtered.iter()) {
                *y = self.delay.tick(x, self.delay_samples, self.feedback).0;
            }
        }
    }
}
