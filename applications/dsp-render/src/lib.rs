//! DSP Render
//!
//! Renders a test tone through each stage of the reference chain (shelf
//! filter, gain, soft clip, limiter) and through the FIR and FFT convolution
//! paths, writing one mono 16-bit WAV per stage.
//!
//! This library exposes the pieces the binary wires together so they can be
//! tested without a process boundary.

pub mod config;
pub mod error;
pub mod render;

pub use config::RenderConfig;
pub use error::{RenderError, Result};
pub use render::{render, write_wav, RenderReport, Stage};
