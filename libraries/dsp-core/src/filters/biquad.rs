//! Biquad filter with Audio EQ Cookbook coefficient synthesis
//!
//! Second-order IIR section in direct form I. Coefficients are normalized by
//! the design equation's `a0` once at synthesis time, so the per-sample
//! recurrence never divides.

use crate::effects::AudioEffect;
use crate::error::{DspError, Result};
use crate::util::{assert_same_len, require_finite, require_positive};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Response shape of a biquad section
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiquadKind {
    /// Low shelf - boosts/cuts below the corner frequency
    LowShelf,
    /// High shelf - boosts/cuts above the corner frequency
    HighShelf,
    /// Peaking - boosts/cuts around the center frequency with Q bandwidth
    Peaking,
}

impl fmt::Display for BiquadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BiquadKind::LowShelf => "low_shelf",
            BiquadKind::HighShelf => "high_shelf",
            BiquadKind::Peaking => "peaking",
        };
        f.write_str(name)
    }
}

impl FromStr for BiquadKind {
    type Err = DspError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "low_shelf" | "lowshelf" => Ok(Self::LowShelf),
            "high_shelf" | "highshelf" => Ok(Self::HighShelf),
            "peaking" | "peak" | "bell" => Ok(Self::Peaking),
            other => Err(DspError::invalid(format!("unknown filter type '{other}'"))),
        }
    }
}

/// Parameters from which a biquad section is synthesized
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadDesign {
    /// Response shape
    pub kind: BiquadKind,
    /// Corner (shelves) or center (peaking) frequency in Hz
    pub frequency: f32,
    /// Shelf or peak gain in dB
    pub gain_db: f32,
    /// Quality factor
    pub q: f32,
    /// Sample rate in Hz
    pub sample_rate: f32,
}

impl BiquadDesign {
    /// Create a design description
    pub fn new(kind: BiquadKind, frequency: f32, gain_db: f32, q: f32, sample_rate: f32) -> Self {
        Self {
            kind,
            frequency,
            gain_db,
            q,
            sample_rate,
        }
    }

    /// Low shelf design
    pub fn low_shelf(frequency: f32, gain_db: f32, q: f32, sample_rate: f32) -> Self {
        Self::new(BiquadKind::LowShelf, frequency, gain_db, q, sample_rate)
    }

    /// High shelf design
    pub fn high_shelf(frequency: f32, gain_db: f32, q: f32, sample_rate: f32) -> Self {
        Self::new(BiquadKind::HighShelf, frequency, gain_db, q, sample_rate)
    }

    /// Peaking (bell) design
    pub fn peaking(frequency: f32, gain_db: f32, q: f32, sample_rate: f32) -> Self {
        Self::new(BiquadKind::Peaking, frequency, gain_db, q, sample_rate)
    }

    /// Check that the parameters describe a realizable, stable section
    pub fn validate(&self) -> Result<()> {
        let sample_rate = require_positive("sample rate", self.sample_rate)?;
        let frequency = require_positive("filter frequency", self.frequency)?;
        require_positive("Q", self.q)?;
        require_finite("filter gain", self.gain_db)?;

        let nyquist = sample_rate / 2.0;
        if frequency >= nyquist {
            return Err(DspError::invalid(format!(
                "filter frequency {frequency} Hz must be below Nyquist ({nyquist} Hz)"
            )));
        }
        Ok(())
    }

    /// Synthesize normalized coefficients
    pub fn coefficients(&self) -> Result<BiquadCoefficients> {
        self.validate()?;

        let a = 10.0_f32.powf(self.gain_db / 40.0);
        let omega = 2.0 * std::f32::consts::PI * self.frequency / self.sample_rate;
        let sin_omega = omega.sin();
        let cos_omega = omega.cos();
        let alpha = sin_omega / (2.0 * self.q);

        // (b0, b1, b2) feed-forward, (a0, a1, a2) feedback, before normalization
        let (b0, b1, b2, a0, a1, a2) = match self.kind {
            BiquadKind::LowShelf => {
                let beta = 2.0 * a.sqrt() * alpha;
                (
                    a * ((a + 1.0) - (a - 1.0) * cos_omega + beta),
                    2.0 * a * ((a - 1.0) - (a + 1.0) * cos_omega),
                    a * ((a + 1.0) - (a - 1.0) * cos_omega - beta),
                    (a + 1.0) + (a - 1.0) * cos_omega + beta,
                    -2.0 * ((a - 1.0) + (a + 1.0) * cos_omega),
                    (a + 1.0) + (a - 1.0) * cos_omega - beta,
                )
            }
            BiquadKind::HighShelf => {
                let beta = 2.0 * a.sqrt() * alpha;
                (
                    a * ((a + 1.0) + (a - 1.0) * cos_omega + beta),
                    -2.0 * a * ((a - 1.0) + (a + 1.0) * cos_omega),
                    a * ((a + 1.0) + (a - 1.0) * cos_omega - beta),
                    (a + 1.0) - (a - 1.0) * cos_omega + beta,
                    2.0 * ((a - 1.0) - (a + 1.0) * cos_omega),
                    (a + 1.0) - (a - 1.0) * cos_omega - beta,
                )
            }
            BiquadKind::Peaking => (
                1.0 + alpha * a,
                -2.0 * cos_omega,
                1.0 - alpha * a,
                1.0 + alpha / a,
                -2.0 * cos_omega,
                1.0 - alpha / a,
            ),
        };

        Ok(BiquadCoefficients {
            a0: b0 / a0,
            a1: b1 / a0,
            a2: b2 / a0,
            b1: a1 / a0,
            b2: a2 / a0,
        })
    }
}

/// Normalized biquad coefficients
///
/// `a0..a2` are feed-forward, `b1..b2` feedback:
/// `y[n] = a0 x[n] + a1 x[n-1] + a2 x[n-2] - b1 y[n-1] - b2 y[n-2]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoefficients {
    pub a0: f32,
    pub a1: f32,
    pub a2: f32,
    pub b1: f32,
    pub b2: f32,
}

impl BiquadCoefficients {
    /// Pass-through section
    pub const IDENTITY: Self = Self {
        a0: 1.0,
        a1: 0.0,
        a2: 0.0,
        b1: 0.0,
        b2: 0.0,
    };

    /// Whether both poles lie strictly inside the unit circle
    ///
    /// Uses the stability triangle for `z^2 + b1 z + b2`.
    pub fn is_stable(&self) -> bool {
        self.b2.abs() < 1.0 && self.b1.abs() < 1.0 + self.b2
    }

    /// Magnitude of the transfer function at `frequency`, in dB
    pub fn magnitude_db(&self, frequency: f32, sample_rate: f32) -> f32 {
        let omega = 2.0 * std::f64::consts::PI * f64::from(frequency) / f64::from(sample_rate);
        let (c1, s1) = (omega.cos(), -omega.sin());
        let (c2, s2) = ((2.0 * omega).cos(), -(2.0 * omega).sin());

        // Numerator and denominator evaluated at z = e^{jw}
        let num_re = f64::from(self.a0) + f64::from(self.a1) * c1 + f64::from(self.a2) * c2;
        let num_im = f64::from(self.a1) * s1 + f64::from(self.a2) * s2;
        let den_re = 1.0 + f64::from(self.b1) * c1 + f64::from(self.b2) * c2;
        let den_im = f64::from(self.b1) * s1 + f64::from(self.b2) * s2;

        let num = (num_re * num_re + num_im * num_im).sqrt();
        let den = (den_re * den_re + den_im * den_im).sqrt();
        (20.0 * (num / den).log10()) as f32
    }
}

impl Default for BiquadCoefficients {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Second-order IIR filter section
///
/// State (`x1, x2, y1, y2`) is zeroed on construction and on [`reset`],
/// never elsewhere. [`set_design`] swaps coefficients while keeping state so
/// parameter changes do not click.
///
/// [`reset`]: BiquadFilter::reset
/// [`set_design`]: BiquadFilter::set_design
#[derive(Debug, Clone)]
pub struct BiquadFilter {
    coeffs: BiquadCoefficients,
    design: Option<BiquadDesign>,

    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,

    enabled: bool,
}

impl BiquadFilter {
    /// Synthesize a filter from a design with zeroed state
    pub fn new(design: BiquadDesign) -> Result<Self> {
        let coeffs = design.coefficients()?;
        debug!(
            kind = %design.kind,
            frequency = design.frequency,
            gain_db = design.gain_db,
            q = design.q,
            sample_rate = design.sample_rate,
            "Synthesized biquad"
        );

        Ok(Self::with_coefficients(coeffs, Some(design)))
    }

    /// Build a filter from raw normalized coefficients
    ///
    /// # Errors
    /// `NumericalInstability` when a pole lies on or outside the unit circle,
    /// `InvalidArgument` when a coefficient is not finite.
    pub fn from_coefficients(coeffs: BiquadCoefficients) -> Result<Self> {
        for value in [coeffs.a0, coeffs.a1, coeffs.a2, coeffs.b1, coeffs.b2] {
            require_finite("biquad coefficient", value)?;
        }
        if !coeffs.is_stable() {
            return Err(DspError::NumericalInstability(format!(
                "biquad poles outside the unit circle (b1 = {}, b2 = {})",
                coeffs.b1, coeffs.b2
            )));
        }
        Ok(Self::with_coefficients(coeffs, None))
    }

    fn with_coefficients(coeffs: BiquadCoefficients, design: Option<BiquadDesign>) -> Self {
        Self {
            coeffs,
            design,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
            enabled: true,
        }
    }

    /// Re-synthesize coefficients, keeping the filter history
    ///
    /// On error the previous coefficients stay active.
    pub fn set_design(&mut self, design: BiquadDesign) -> Result<()> {
        self.coeffs = design.coefficients()?;
        self.design = Some(design);
        Ok(())
    }

    /// The design the coefficients came from, if any
    pub fn design(&self) -> Option<BiquadDesign> {
        self.design
    }

    /// Active coefficients
    pub fn coefficients(&self) -> BiquadCoefficients {
        self.coeffs
    }

    /// Zero the filter history
    pub fn reset(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }

    /// Run one sample through the recurrence
    #[inline]
    pub fn process_sample(&mut self, x0: f32) -> f32 {
        let c = &self.coeffs;
        let y0 = c.a0 * x0 + c.a1 * self.x1 + c.a2 * self.x2 - c.b1 * self.y1 - c.b2 * self.y2;

        self.x2 = self.x1;
        self.x1 = x0;
        self.y2 = self.y1;
        self.y1 = y0;

        y0
    }

    /// Filter `input` into `output`
    ///
    /// # Panics
    /// If `input` and `output` differ in length.
    pub fn process(&mut self, input: &[f32], output: &mut [f32]) {
        assert_same_len(input, output);
        for (out, &x) in output.iter_mut().zip(input) {
            *out = self.process_sample(x);
        }
    }

    /// Filter a block in place
    pub fn process_in_place(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process_sample(*sample);
        }
    }
}

impl AudioEffect for BiquadFilter {
    fn process(&mut self, buffer: &mut [f32]) {
        if self.enabled {
            self.process_in_place(buffer);
        }
    }

    fn reset(&mut self) {
        BiquadFilter::reset(self);
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn name(&self) -> &str {
        "Biquad"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 44100.0;

    fn impulse_response(filter: &mut BiquadFilter, len: usize) -> Vec<f32> {
        let mut input = vec![0.0; len];
        input[0] = 1.0;
        let mut output = vec![0.0; len];
        filter.process(&input, &mut output);
        output
    }

    #[test]
    fn kind_parsing() {
        assert_eq!("low_shelf".parse::<BiquadKind>().unwrap(), BiquadKind::LowShelf);
        assert_eq!("High-Shelf".parse::<BiquadKind>().unwrap(), BiquadKind::HighShelf);
        assert_eq!("bell".parse::<BiquadKind>().unwrap(), BiquadKind::Peaking);
        assert!(matches!(
            "lowpass".parse::<BiquadKind>(),
            Err(DspError::InvalidArgument(_))
        ));
    }

    #[test]
    fn kind_display_round_trips() {
        for kind in [BiquadKind::LowShelf, BiquadKind::HighShelf, BiquadKind::Peaking] {
            assert_eq!(kind.to_string().parse::<BiquadKind>().unwrap(), kind);
        }
    }

    #[test]
    fn invalid_designs_rejected() {
        assert!(BiquadFilter::new(BiquadDesign::peaking(1000.0, 3.0, 0.0, SR)).is_err());
        assert!(BiquadFilter::new(BiquadDesign::peaking(1000.0, 3.0, 1.0, 0.0)).is_err());
        assert!(BiquadFilter::new(BiquadDesign::peaking(0.0, 3.0, 1.0, SR)).is_err());
        assert!(BiquadFilter::new(BiquadDesign::peaking(30000.0, 3.0, 1.0, SR)).is_err());
        assert!(BiquadFilter::new(BiquadDesign::peaking(1000.0, f32::NAN, 1.0, SR)).is_err());
    }

    #[test]
    fn zero_gain_is_identity() {
        for design in [
            BiquadDesign::low_shelf(500.0, 0.0, 0.707, SR),
            BiquadDesign::high_shelf(5000.0, 0.0, 0.707, SR),
            BiquadDesign::peaking(1000.0, 0.0, 2.0, SR),
        ] {
            let c = design.coefficients().unwrap();
            assert!((c.magnitude_db(100.0, SR)).abs() < 1e-3);
            assert!((c.magnitude_db(10000.0, SR)).abs() < 1e-3);
        }
    }

    #[test]
    fn designed_filters_are_stable() {
        for q in [0.1, 0.707, 1.0, 5.0, 20.0] {
            for gain in [-24.0, -6.0, 0.0, 6.0, 24.0] {
                for kind in [BiquadKind::LowShelf, BiquadKind::HighShelf, BiquadKind::Peaking] {
                    let c = BiquadDesign::new(kind, 1000.0, gain, q, SR)
                        .coefficients()
                        .unwrap();
                    assert!(c.is_stable(), "{kind} q={q} gain={gain} unstable");
                }
            }
        }
    }

    #[test]
    fn low_shelf_boosts_dc_not_nyquist() {
        let c = BiquadDesign::low_shelf(500.0, 6.0, 0.707, SR)
            .coefficients()
            .unwrap();
        assert!((c.magnitude_db(1.0, SR) - 6.0).abs() < 0.05);
        assert!(c.magnitude_db(20000.0, SR).abs() < 0.05);
    }

    #[test]
    fn high_shelf_boosts_nyquist_not_dc() {
        let c = BiquadDesign::high_shelf(2000.0, -9.0, 0.707, SR)
            .coefficients()
            .unwrap();
        assert!(c.magnitude_db(1.0, SR).abs() < 0.05);
        assert!((c.magnitude_db(21000.0, SR) + 9.0).abs() < 0.1);
    }

    #[test]
    fn impulse_response_dc_gain_matches_design() {
        let design = BiquadDesign::low_shelf(500.0, 6.0, 0.707, SR);
        let mut filter = BiquadFilter::new(design).unwrap();
        let response = impulse_response(&mut filter, 8192);

        // Sum of the impulse response is H(z) at z = 1
        let dc: f64 = response.iter().map(|&h| f64::from(h)).sum();
        let expected = design.coefficients().unwrap().magnitude_db(0.0, SR);
        assert!((20.0 * dc.log10() as f32 - expected).abs() < 0.01);
    }

    #[test]
    fn impulse_response_nyquist_gain_matches_design() {
        let design = BiquadDesign::high_shelf(3000.0, 4.0, 0.707, SR);
        let mut filter = BiquadFilter::new(design).unwrap();
        let response = impulse_response(&mut filter, 8192);

        // Alternating sum is H(z) at z = -1
        let nyquist: f64 = response
            .iter()
            .enumerate()
            .map(|(n, &h)| if n % 2 == 0 { f64::from(h) } else { -f64::from(h) })
            .sum();
        let expected = design.coefficients().unwrap().magnitude_db(SR / 2.0, SR);
        assert!((20.0 * nyquist.abs().log10() as f32 - expected).abs() < 0.01);
    }

    #[test]
    fn from_coefficients_rejects_unstable_poles() {
        let unstable = BiquadCoefficients {
            a0: 1.0,
            a1: 0.0,
            a2: 0.0,
            b1: -2.1,
            b2: 1.1,
        };
        assert!(matches!(
            BiquadFilter::from_coefficients(unstable),
            Err(DspError::NumericalInstability(_))
        ));

        let mut identity = BiquadFilter::from_coefficients(BiquadCoefficients::IDENTITY).unwrap();
        let mut buffer = vec![0.25, -0.5, 1.0];
        identity.process_in_place(&mut buffer);
        assert_eq!(buffer, vec![0.25, -0.5, 1.0]);
    }

    #[test]
    fn set_design_keeps_state() {
        let mut filter = BiquadFilter::new(BiquadDesign::peaking(1000.0, 6.0, 1.0, SR)).unwrap();

        let mut block = vec![0.5; 64];
        filter.process_in_place(&mut block);

        filter
            .set_design(BiquadDesign::peaking(2000.0, 6.0, 1.0, SR))
            .unwrap();
        let mut fresh = BiquadFilter::new(BiquadDesign::peaking(2000.0, 6.0, 1.0, SR)).unwrap();

        let mut a = vec![0.5; 4];
        let mut b = vec![0.5; 4];
        filter.process_in_place(&mut a);
        fresh.process_in_place(&mut b);

        // History carried over, so the first outputs differ from a fresh filter
        assert_ne!(a, b);
        assert_eq!(filter.design().unwrap().frequency, 2000.0);
    }

    #[test]
    fn failed_set_design_keeps_coefficients() {
        let mut filter = BiquadFilter::new(BiquadDesign::peaking(1000.0, 6.0, 1.0, SR)).unwrap();
        let before = filter.coefficients();
        assert!(filter
            .set_design(BiquadDesign::peaking(1000.0, 6.0, -1.0, SR))
            .is_err());
        assert_eq!(filter.coefficients(), before);
    }

    #[test]
    fn reset_clears_history() {
        let design = BiquadDesign::peaking(1000.0, 6.0, 1.0, SR);
        let mut filter = BiquadFilter::new(design).unwrap();
        let first = impulse_response(&mut filter, 32);

        filter.reset();
        let second = impulse_response(&mut filter, 32);
        assert_eq!(first, second);
    }

    #[test]
    fn in_place_matches_separate_buffers() {
        let design = BiquadDesign::low_shelf(300.0, -4.0, 0.9, SR);
        let input: Vec<f32> = (0..256).map(|i| (i as f32 * 0.05).sin()).collect();

        let mut a = BiquadFilter::new(design).unwrap();
        let mut expected = vec![0.0; input.len()];
        a.process(&input, &mut expected);

        let mut b = BiquadFilter::new(design).unwrap();
        let mut buffer = input;
        b.process_in_place(&mut buffer);

        assert_eq!(buffer, expected);
    }
}
