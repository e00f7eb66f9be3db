/// Render configuration
use crate::error::{RenderError, Result};
use dsp_core::{BiquadKind, FilterSettings, Gain, HardLimiter, RmsDetector};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix; nested keys use `__` (e.g. `DSP_RENDER_FILTER__FREQUENCY`)
pub const ENV_PREFIX: &str = "DSP_RENDER";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RenderConfig {
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Test tone length in seconds
    #[serde(default = "default_seconds")]
    pub seconds: f32,

    /// Test tone frequency in Hz
    #[serde(default = "default_frequency")]
    pub frequency: f32,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Smoothing coefficient of the input level meter
    #[serde(default = "default_rms_alpha")]
    pub rms_alpha: f32,

    #[serde(default = "default_gain_db")]
    pub gain_db: f32,

    #[serde(default = "default_limiter_threshold")]
    pub limiter_threshold: f32,

    #[serde(default = "default_fir")]
    pub fir: Vec<f32>,

    /// Impulse response for the FFT convolution stage
    #[serde(default = "default_impulse_response")]
    pub impulse_response: Vec<f32>,

    #[serde(default = "default_filter")]
    pub filter: FilterSettings,
}

impl RenderConfig {
    /// Load configuration from an optional file and the environment
    ///
    /// A missing default `dsp-render.toml` in the working directory is not an
    /// error; an explicitly given file must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    /// [`load`](Self::load) reading overrides from `{env_prefix}_*` variables
    pub fn load_with_prefix(path: Option<&Path>, env_prefix: &str) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from("dsp-render.toml");
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // Override with environment variables (`{env_prefix}_*`)
        settings = settings.add_source(
            config::Environment::with_prefix(env_prefix)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(RenderError::Config("sample_rate must be positive".to_string()));
        }

        if !self.seconds.is_finite() || self.seconds <= 0.0 {
            return Err(RenderError::Config(format!(
                "seconds must be positive, got {}",
                self.seconds
            )));
        }

        let nyquist = self.sample_rate as f32 / 2.0;
        if !(self.frequency > 0.0 && self.frequency < nyquist) {
            return Err(RenderError::Config(format!(
                "frequency {} Hz must be between 0 and {nyquist} Hz",
                self.frequency
            )));
        }

        if self.fir.is_empty() {
            return Err(RenderError::Config("fir needs at least one coefficient".to_string()));
        }

        if self.impulse_response.is_empty() {
            return Err(RenderError::Config("impulse_response is empty".to_string()));
        }

        RmsDetector::new(self.rms_alpha)?;
        Gain::new(self.gain_db)?;
        HardLimiter::new(self.limiter_threshold)?;
        self.filter.design(self.sample_rate as f32).validate()?;

        Ok(())
    }
}

// Default values
fn default_sample_rate() -> u32 {
    44100
}

fn default_seconds() -> f32 {
    2.0
}

fn default_frequency() -> f32 {
    1000.0
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_rms_alpha() -> f32 {
    0.1
}

fn default_gain_db() -> f32 {
    -3.0
}

fn default_limiter_threshold() -> f32 {
    0.8
}

fn default_fir() -> Vec<f32> {
    vec![0.1, 0.2, 0.4, 0.2, 0.1]
}

fn default_impulse_response() -> Vec<f32> {
    vec![1.0, 0.5, 0.25, 0.125, 0.0, 0.0, 0.0, 0.0]
}

fn default_filter() -> FilterSettings {
    FilterSettings {
        kind: BiquadKind::LowShelf,
        frequency: 500.0,
        gain_db: 6.0,
        q: 0.707,
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            seconds: default_seconds(),
            frequency: default_frequency(),
            output_dir: default_output_dir(),
            rms_alpha: default_rms_alpha(),
            gain_db: default_gain_db(),
            limiter_threshold: default_limiter_threshold(),
            fir: default_fir(),
            impulse_response: default_impulse_response(),
            filter: default_filter(),
        }
    }
}
