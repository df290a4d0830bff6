//! Second-order IIR filter state (transposed direct form II).
//!
//! Coefficients live in [`BiquadCoefficients`] and are shared across
//! channels; each channel carries one `Biquad` with its own delay state.
//! All operations are safe for the audio thread (no allocations).

use crate::dsp::coefficients::BiquadCoefficients;

#[derive(Debug, Clone, Copy, Default)]
pub struct Biquad {
    z1: f32,
    z2: f32,
}

impl Biquad {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a single sample.
    #[inline]
    pub fn process(&mut self, c: &BiquadCoefficients, input: f32) -> f32 {
        let out = c.b0 * input + self.z1;

        // Anti-denormal: tiny DC offset
        self.z1 = c.b1 * input + self.z2 - c.a1 * out + 1e-25;
        self.z2 = c.b2 * input - c.a2 * out + 1e-25;

        out
    }

    /// Filter a block in place.
    #[inline]
    pub fn process_block(&mut self, c: &BiquadCoefficients, samples: &mut [f32]) {
        for s in samples.iter_mut() {
            *s = self.process(c, *s);
        }
    }

    /// Clear the delay state. Not called by coefficient updates; use when a
    /// band is re-prepared or a deterministic restart is needed.
    #[inline]
    pub fn reset(&mut self) {
        self.z1 = 0.0;
        self.z2 = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::utils::db_to_gain;
    use crate::params::FilterType;

    #[test]
    fn identity_coefficients_pass_audio_through() {
        let c = BiquadCoefficients::identity();
        let mut bq = Biquad::new();
        let mut block = [0.5f32, -0.25, 1.0, 0.0, -1.0];
        let original = block;
        bq.process_block(&c, &mut block);
        for (out, inp) in block.iter().zip(original.iter()) {
            assert!((out - inp).abs() < 1e-6);
        }
    }

    #[test]
    fn peak_cut_attenuates_sine_at_center() {
        let sr = 48000.0;
        let c = BiquadCoefficients::compute(FilterType::Peak, sr, 1000.0, 1.0, db_to_gain(-12.0));
        let mut bq = Biquad::new();

        let n = 48000;
        let mut in_rms = 0.0f64;
        let mut out_rms = 0.0f64;
        for i in 0..n {
            let x = (std::f32::consts::TAU * 1000.0 * i as f32 / sr).sin();
            let y = bq.process(&c, x);
            // Skip the first 2k samples so the filter settles.
            if i >= 2000 {
                in_rms += (x * x) as f64;
                out_rms += (y * y) as f64;
            }
        }
        let atten_db = 10.0 * (out_rms / in_rms).log10();
        assert!((atten_db + 12.0).abs() < 0.5, "attenuation {atten_db}");
    }

    #[test]
    fn reset_clears_delay_state() {
        let c = BiquadCoefficients::compute(FilterType::LowCut, 48000.0, 500.0, 0.707, 1.0);
        let mut bq = Biquad::new();
        for _ in 0..64 {
            bq.process(&c, 1.0);
        }
        bq.reset();
        let fresh = Biquad::new().process(&c, 1.0);
        assert!((bq.process(&c, 1.0) - fresh).abs() < 1e-6);
    }
}
