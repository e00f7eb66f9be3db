use crate::effects::AudioEffect;
use crate::error::{zeroed, DspError, Result};
use crate::fft::Fft;
use crate::util::assert_same_len;
use rustfft::num_complex::Complex;
use tracing::debug;

/// Overlap-add convolver for continuous streams
///
/// The impulse response spectrum is computed once at construction. Each block
/// of up to `block_size` samples is transformed, multiplied, transformed back
/// and added into an accumulator; the first samples of the accumulator are
/// emitted and the rest (at most `ir_len - 1`) carry over to the next block.
///
/// There is no added latency: output sample `i` depends on input samples up
/// to and including `i`. Processing a stream block by block gives the same
/// result as [`convolve`](super::convolve) on the whole stream, truncated to
/// the stream length.
#[derive(Debug, Clone)]
pub struct StreamingConvolver {
    fft: Fft,
    /// IR spectrum, pre-scaled by `1/n`
    ir_spectrum: Vec<Complex<f32>>,
    ir_len: usize,
    block_size: usize,
    scratch: Vec<Complex<f32>>,
    /// Pending output; index 0 is the next sample to emit
    overlap: Vec<f32>,
    enabled: bool,
}

impl StreamingConvolver {
    /// Prepare a convolver for `ir` fed `block_size` samples at a time
    pub fn new(ir: &[f32], block_size: usize) -> Result<Self> {
        if ir.is_empty() {
            return Err(DspError::invalid("impulse response is empty"));
        }
        if block_size == 0 {
            return Err(DspError::invalid("block size must be at least 1"));
        }

        let fft_size = (block_size + ir.len() - 1).next_power_of_two();
        let fft = Fft::new(fft_size)?;

        let scale = 1.0 / fft_size as f32;
        let mut ir_spectrum: Vec<Complex<f32>> = zeroed(fft_size)?;
        for (slot, &h) in ir_spectrum.iter_mut().zip(ir) {
            slot.re = h;
        }
        fft.forward(&mut ir_spectrum);
        for bin in &mut ir_spectrum {
            *bin *= scale;
        }

        debug!(
            ir_len = ir.len(),
            block_size, fft_size, "Created streaming convolver"
        );

        Ok(Self {
            fft,
            ir_spectrum,
            ir_len: ir.len(),
            block_size,
            scratch: zeroed(fft_size)?,
            overlap: zeroed(fft_size)?,
            enabled: true,
        })
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn fft_size(&self) -> usize {
        self.fft.len()
    }

    pub fn ir_len(&self) -> usize {
        self.ir_len
    }

    /// Samples of delay introduced by the block structure (always zero)
    pub fn latency(&self) -> usize {
        0
    }

    /// Drop the pending tail
    pub fn reset(&mut self) {
        self.overlap.fill(0.0);
    }

    /// Convolve the next stretch of the stream
    ///
    /// Inputs longer than `block_size` are split internally.
    ///
    /// # Panics
    /// If `input` and `output` differ in length.
    pub fn process(&mut self, input: &[f32], output: &mut [f32]) {
        assert_same_len(input, output);
        let block = self.block_size;
        for (inp, out) in input.chunks(block).zip(output.chunks_mut(block)) {
            self.load(inp);
            self.emit(out);
        }
    }

    /// Convolve a stretch of the stream in place
    pub fn process_in_place(&mut self, buffer: &mut [f32]) {
        let block = self.block_size;
        for chunk in buffer.chunks_mut(block) {
            self.load(chunk);
            self.emit(chunk);
        }
    }

    fn load(&mut self, input: &[f32]) {
        let (head, tail) = self.scratch.split_at_mut(input.len());
        for (slot, &x) in head.iter_mut().zip(input) {
            *slot = Complex::new(x, 0.0);
        }
        tail.fill(Complex::new(0.0, 0.0));
    }

    /// Finish the block loaded into `scratch`, writing `output.len()` samples
    fn emit(&mut self, output: &mut [f32]) {
        let len = output.len();
        if len == 0 {
            return;
        }

        self.fft.forward(&mut self.scratch);
        for (bin, h) in self.scratch.iter_mut().zip(&self.ir_spectrum) {
            *bin *= h;
        }
        self.fft.inverse(&mut self.scratch);

        let produced = len + self.ir_len - 1;
        for (acc, y) in self.overlap[..produced].iter_mut().zip(&self.scratch) {
            *acc += y.re;
        }

        output.copy_from_slice(&self.overlap[..len]);

        let n = self.overlap.len();
        self.overlap.copy_within(len.., 0);
        self.overlap[n - len..].fill(0.0);
    }
}

impl AudioEffect for StreamingConvolver {
    fn process(&mut self, buffer: &mut [f32]) {
        if self.enabled {
            self.process_in_place(buffer);
        }
    }

    fn reset(&mut self) {
        StreamingConvolver::reset(self);
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn name(&self) -> &str {
        "Convolver"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convolution::convolve_direct;

    fn stream() -> Vec<f32> {
        (0..500)
            .map(|i| (i as f32 * 0.21).sin() * 0.5 + (i as f32 * 0.043).cos() * 0.3)
            .collect()
    }

    fn room_ir() -> Vec<f32> {
        (0..70)
            .map(|i| (-(i as f32) / 12.0).exp() * if i % 3 == 0 { 1.0 } else { -0.4 })
            .collect()
    }

    #[test]
    fn construction_validates() {
        assert!(StreamingConvolver::new(&[], 64).is_err());
        assert!(StreamingConvolver::new(&[1.0], 0).is_err());

        let conv = StreamingConvolver::new(&[1.0; 100], 64).unwrap();
        assert_eq!(conv.fft_size(), 256);
        assert_eq!(conv.latency(), 0);
    }

    #[test]
    fn huge_block_reports_allocation_failure() {
        assert!(matches!(
            StreamingConvolver::new(&[1.0], 1 << 42),
            Err(DspError::AllocationFailure { .. })
        ));
    }

    #[test]
    fn impulse_reproduces_ir_across_blocks() {
        let ir = [1.0, 0.5, 0.25];
        let mut conv = StreamingConvolver::new(&ir, 2).unwrap();

        let mut first = [1.0, 0.0];
        conv.process_in_place(&mut first);
        let mut second = [0.0, 0.0];
        conv.process_in_place(&mut second);

        let got = [first[0], first[1], second[0], second[1]];
        let expected = [1.0, 0.5, 0.25, 0.0];
        for (g, e) in got.iter().zip(&expected) {
            assert!((g - e).abs() < 1e-6, "{got:?}");
        }
    }

    #[test]
    fn arbitrary_splits_match_one_shot() {
        let input = stream();
        let ir = room_ir();
        let expected = convolve_direct(&input, &ir).unwrap();

        let mut conv = StreamingConvolver::new(&ir, 64).unwrap();
        let mut output = vec![0.0; input.len()];
        let mut start = 0;
        for size in [1, 7, 64, 3, 100, 33].iter().cycle() {
            if start >= input.len() {
                break;
            }
            let end = (start + size).min(input.len());
            conv.process(&input[start..end], &mut output[start..end]);
            start = end;
        }

        for (i, (a, e)) in output.iter().zip(&expected).enumerate() {
            assert!((a - e).abs() < 1e-4, "sample {i}: {a} vs {e}");
        }
    }

    #[test]
    fn in_place_matches_separate_buffers() {
        let input = stream();
        let ir = room_ir();

        let mut a = StreamingConvolver::new(&ir, 32).unwrap();
        let mut expected = vec![0.0; input.len()];
        a.process(&input, &mut expected);

        let mut b = StreamingConvolver::new(&ir, 32).unwrap();
        let mut buffer = input;
        b.process_in_place(&mut buffer);

        for (x, y) in buffer.iter().zip(&expected) {
            assert!((x - y).abs() < 1e-6);
        }
    }

    #[test]
    fn reset_drops_tail() {
        let mut conv = StreamingConvolver::new(&[0.0, 0.0, 1.0], 4).unwrap();
        let mut block = [0.0, 0.0, 0.0, 1.0];
        conv.process_in_place(&mut block);

        conv.reset();
        let mut silence = [0.0; 4];
        conv.process_in_place(&mut silence);
        assert!(silence.iter().all(|s| s.abs() < 1e-7));
    }

    #[test]
    fn disabled_effect_bypasses() {
        let mut conv = StreamingConvolver::new(&[0.5], 8).unwrap();
        conv.set_enabled(false);
        let mut buffer = vec![1.0; 8];
        AudioEffect::process(&mut conv, &mut buffer);
        assert_eq!(buffer, vec![1.0; 8]);
    }
}
