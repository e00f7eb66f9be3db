/// Render tool error types
use dsp_core::DspError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RenderError>;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("DSP error: {0}")]
    Dsp(#[from] DspError),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for RenderError {
    fn from(err: config::ConfigError) -> Self {
        RenderError::Config(err.to_string())
    }
}
