//! Stage-by-stage rendering of the test tone

use crate::config::RenderConfig;
use crate::error::Result;
use dsp_core::effects::AudioEffect;
use dsp_core::test_utils::generate_sine_wave;
use dsp_core::{
    BiquadFilter, ConvolutionEngine, FirFilter, Gain, HardLimiter, RmsDetector, SoftClip,
};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One rendered output file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Input through the configured biquad
    Filter,
    /// Filter output after the gain trim
    Gain,
    /// ...then soft clipped
    SoftClip,
    /// ...then hard limited
    Limiter,
    /// Input through the FIR filter
    Fir,
    /// Input convolved with the impulse response (full length)
    FftConvolution,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::Filter,
        Stage::Gain,
        Stage::SoftClip,
        Stage::Limiter,
        Stage::Fir,
        Stage::FftConvolution,
    ];

    /// File stem; the filter stage is named after its kind
    pub fn file_stem(&self, config: &RenderConfig) -> String {
        match self {
            Stage::Filter => config.filter.kind.to_string(),
            Stage::Gain => "gain".to_string(),
            Stage::SoftClip => "soft_clip".to_string(),
            Stage::Limiter => "limiter".to_string(),
            Stage::Fir => "fir".to_string(),
            Stage::FftConvolution => "fft_conv".to_string(),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Filter => "filter",
            Stage::Gain => "gain",
            Stage::SoftClip => "soft clip",
            Stage::Limiter => "limiter",
            Stage::Fir => "FIR",
            Stage::FftConvolution => "FFT convolution",
        };
        f.write_str(name)
    }
}

/// Outcome of a render run
#[derive(Debug, Clone)]
pub struct RenderReport {
    /// Written files in stage order
    pub files: Vec<(Stage, PathBuf)>,
    /// Mean of the input level meter over the whole tone
    pub average_rms: f32,
    /// Length of the test tone in samples
    pub input_samples: usize,
}

/// Render every stage into `config.output_dir`
pub fn render(config: &RenderConfig) -> Result<RenderReport> {
    config.validate()?;
    fs::create_dir_all(&config.output_dir)?;

    let sample_rate = config.sample_rate;
    let input = generate_sine_wave(config.frequency, sample_rate, config.seconds, 1.0);
    info!(
        samples = input.len(),
        frequency = config.frequency,
        sample_rate,
        "Generated test tone"
    );

    let mut files = Vec::with_capacity(Stage::ALL.len());
    let mut emit = |stage: Stage, samples: &[f32]| -> Result<()> {
        let path = config
            .output_dir
            .join(format!("{}.wav", stage.file_stem(config)));
        write_wav(&path, samples, sample_rate)?;
        info!(stage = %stage, path = %path.display(), "Wrote stage");
        files.push((stage, path));
        Ok(())
    };

    // Reference chain, each stage continuing from the previous one
    let mut filter = BiquadFilter::new(config.filter.design(sample_rate as f32))?;
    let mut output = vec![0.0; input.len()];
    filter.process(&input, &mut output);
    emit(Stage::Filter, &output)?;

    Gain::new(config.gain_db)?.process(&mut output);
    emit(Stage::Gain, &output)?;

    SoftClip::new().process(&mut output);
    emit(Stage::SoftClip, &output)?;

    HardLimiter::new(config.limiter_threshold)?.process(&mut output);
    emit(Stage::Limiter, &output)?;

    let mut fir = FirFilter::new(&config.fir)?;
    fir.process(&input, &mut output);
    emit(Stage::Fir, &output)?;

    let convolved = ConvolutionEngine::new().convolve(&input, &config.impulse_response)?;
    emit(Stage::FftConvolution, &convolved)?;

    let average_rms = average_level(&input, config.rms_alpha)?;
    info!(average_rms, "Input level");

    Ok(RenderReport {
        files,
        average_rms,
        input_samples: input.len(),
    })
}

/// Mean of the envelope follower output over `input`
fn average_level(input: &[f32], alpha: f32) -> Result<f32> {
    if input.is_empty() {
        return Ok(0.0);
    }

    let mut detector = RmsDetector::new(alpha)?;
    let total: f64 = input
        .iter()
        .map(|&x| f64::from(detector.process(x)))
        .sum();
    Ok((total / input.len() as f64) as f32)
}

/// Write mono 16-bit PCM, clamping to full scale
pub fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample((sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16)?;
    }
    writer.finalize()?;

    debug!(path = %path.display(), samples = samples.len(), "WAV finalized");
    Ok(())
}
