//! Property-based tests for the DSP units
//!
//! These tests use proptest to verify invariants across many random inputs.

use dsp_core::effects::AudioEffect;
use dsp_core::*;
use proptest::prelude::*;

// Helper: Check if buffer contains only finite values
fn all_finite(buffer: &[f32]) -> bool {
    buffer.iter().all(|s| s.is_finite())
}

fn max_difference(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).abs())
        .fold(0.0f32, f32::max)
}

proptest! {
    /// Property: with zero feedback the delayed tap is the input shifted by exactly d samples
    #[test]
    fn delay_is_exact_shift(
        capacity in 2usize..256,
        delay_fraction in 0.0f64..1.0,
        samples in prop::collection::vec(-1.0f32..1.0, 1..600)
    ) {
        let delay_samples = 1 + ((capacity - 1) as f64 * delay_fraction) as usize;
        prop_assume!(delay_samples < capacity);

        let mut delay = DelayBuffer::new(capacity).unwrap();
        let mut output = vec![0.0; samples.len()];
        delay.process_wet(&samples, &mut output, delay_samples, 0.0).unwrap();

        for (i, &y) in output.iter().enumerate() {
            let expected = if i >= delay_samples { samples[i - delay_samples] } else { 0.0 };
            prop_assert_eq!(y.to_bits(), expected.to_bits(), "sample {}", i);
        }
    }

    /// Property: gains in dB add up
    #[test]
    fn gain_is_additive_in_db(
        g1 in -24.0f32..24.0,
        g2 in -24.0f32..24.0,
        samples in prop::collection::vec(-1.0f32..1.0, 1..256)
    ) {
        let mut twice = samples.clone();
        apply_gain(&mut twice, g1);
        apply_gain(&mut twice, g2);

        let mut once = samples;
        apply_gain(&mut once, g1 + g2);

        for (a, b) in twice.iter().zip(&once) {
            prop_assert!((a - b).abs() <= 1e-4 * b.abs().max(1.0));
        }
    }

    /// Property: limiting twice equals limiting once, and never exceeds the threshold
    #[test]
    fn limiter_is_idempotent(
        threshold in 0.0f32..2.0,
        samples in prop::collection::vec(-4.0f32..4.0, 1..256)
    ) {
        let mut once = samples;
        limiter_process(&mut once, threshold);
        prop_assert!(once.iter().all(|s| s.abs() <= threshold));

        let mut twice = once.clone();
        limiter_process(&mut twice, threshold);
        prop_assert_eq!(once, twice);
    }

    /// Property: FFT convolution equals direct convolution
    #[test]
    fn fft_convolution_matches_direct(
        input in prop::collection::vec(-1.0f32..1.0, 1..200),
        ir in prop::collection::vec(-1.0f32..1.0, 1..64)
    ) {
        let fast = convolve(&input, &ir).unwrap();
        let direct = convolve_direct(&input, &ir).unwrap();

        prop_assert_eq!(fast.len(), input.len() + ir.len() - 1);
        prop_assert!(max_difference(&fast, &direct) < 1e-3);
    }

    /// Property: streaming over any block split equals one-shot convolution
    #[test]
    fn streaming_matches_one_shot(
        input in prop::collection::vec(-1.0f32..1.0, 1..400),
        ir in prop::collection::vec(-1.0f32..1.0, 1..48),
        block_size in 1usize..96,
        splits in prop::collection::vec(1usize..128, 1..16)
    ) {
        let expected = convolve_direct(&input, &ir).unwrap();

        let mut conv = StreamingConvolver::new(&ir, block_size).unwrap();
        let mut output = vec![0.0; input.len()];
        let mut start = 0;
        for size in splits.iter().cycle() {
            if start >= input.len() {
                break;
            }
            let end = (start + size).min(input.len());
            conv.process(&input[start..end], &mut output[start..end]);
            start = end;
        }

        prop_assert!(max_difference(&output, &expected[..input.len()]) < 1e-3);
    }

    /// Property: in-place biquad processing equals separate buffers
    #[test]
    fn biquad_in_place_matches_out_of_place(
        freq in 20.0f32..20000.0,
        gain_db in -12.0f32..12.0,
        q in 0.1f32..10.0,
        kind in prop_oneof![
            Just(BiquadKind::LowShelf),
            Just(BiquadKind::HighShelf),
            Just(BiquadKind::Peaking)
        ],
        samples in prop::collection::vec(-1.0f32..1.0, 1..512)
    ) {
        let design = BiquadDesign::new(kind, freq, gain_db, q, 44100.0);

        let mut a = BiquadFilter::new(design).unwrap();
        let mut expected = vec![0.0; samples.len()];
        a.process(&samples, &mut expected);

        let mut b = BiquadFilter::new(design).unwrap();
        let mut buffer = samples;
        b.process_in_place(&mut buffer);

        prop_assert_eq!(&buffer, &expected);
        prop_assert!(all_finite(&buffer), "Biquad produced NaN or Inf");
    }

    /// Property: designed filters are stable
    #[test]
    fn cookbook_designs_are_stable(
        freq in 100.0f32..20000.0,
        gain_db in -24.0f32..24.0,
        q in 0.1f32..10.0
    ) {
        for design in [
            BiquadDesign::low_shelf(freq, gain_db, q, 44100.0),
            BiquadDesign::high_shelf(freq, gain_db, q, 44100.0),
            BiquadDesign::peaking(freq, gain_db, q, 44100.0),
        ] {
            prop_assert!(design.coefficients().unwrap().is_stable());
        }
    }

    /// Property: disabled effects do not touch the signal
    #[test]
    fn disabled_effects_are_true_bypass(
        effect_type in 0u8..4,
        samples in prop::collection::vec(-2.0f32..2.0, 1..256)
    ) {
        let mut effect: Box<dyn AudioEffect> = match effect_type {
            0 => Box::new(BiquadFilter::new(BiquadDesign::peaking(1000.0, 9.0, 2.0, 44100.0)).unwrap()),
            1 => Box::new(FirFilter::new(&[0.5, 0.25, 0.125]).unwrap()),
            2 => Box::new(HardLimiter::new(0.1).unwrap()),
            _ => Box::new(Gain::new(-20.0).unwrap()),
        };
        effect.set_enabled(false);

        let mut buffer = samples.clone();
        effect.process(&mut buffer);
        prop_assert_eq!(buffer, samples);
    }
}
