//! Linear filters
//!
//! - **BiquadFilter**: second-order IIR section (low shelf, high shelf, peaking)
//! - **FirFilter**: direct-form tapped delay line

mod biquad;
mod fir;

pub use biquad::{BiquadCoefficients, BiquadDesign, BiquadFilter, BiquadKind};
pub use fir::FirFilter;
