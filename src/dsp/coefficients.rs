//! Biquad coefficient synthesis.
//!
//! One pure function per call: (shape, sample rate, frequency, Q, linear
//! gain) -> normalized second-order coefficients. Shelves and peak use the
//! RBJ cookbook shelf/peak formulas, the cut and band-pass types the matching
//! high-pass/low-pass/band-pass forms, the notch its explicit closed form.
//!
//! # Design Notes
//! - Output is always normalized so a0 = 1 before use.
//! - Frequency is clamped strictly inside (0, Nyquist) and Q to a positive
//!   floor before any trigonometric evaluation, so coefficients stay finite.
//! - Degenerate input (sample rate <= 0) yields a pass-through set, never NaN.

use std::f32::consts::TAU;

use crate::dsp::utils::{gain_to_db, DB_FLOOR};
use crate::params::FilterType;

/// Lowest Q accepted by the synthesis math.
const Q_FLOOR: f32 = 0.025;
/// Lowest frequency accepted by the synthesis math, in Hz.
const FREQ_FLOOR_HZ: f32 = 1.0;
/// Fraction of Nyquist the frequency clamp stays below.
const NYQUIST_GUARD: f32 = 0.999;
/// Lowest linear gain factor accepted for shelf/peak shapes.
const GAIN_FLOOR: f32 = 1e-3;

/// Normalized biquad coefficients (a0 folded in, so five values remain).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoefficients {
    pub b0: f32,
    pub b1: f32,
    pub b2: f32,
    pub a1: f32,
    pub a2: f32,
}

impl BiquadCoefficients {
    /// Pass-through set: output equals input.
    pub const fn identity() -> Self {
        Self {
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.b0.is_finite()
            && self.b1.is_finite()
            && self.b2.is_finite()
            && self.a1.is_finite()
            && self.a2.is_finite()
    }

    /// Synthesize coefficients for one band.
    ///
    /// `gain` is a linear factor and only affects the shelf and peak shapes;
    /// cut, notch and band-pass filters have a fixed transfer shape.
    pub fn compute(
        filter: FilterType,
        sample_rate: f32,
        frequency: f32,
        q: f32,
        gain: f32,
    ) -> Self {
        if sample_rate <= 0.0 {
            return Self::identity();
        }

        let nyquist = 0.5 * sample_rate;
        let freq = frequency.clamp(FREQ_FLOOR_HZ, nyquist * NYQUIST_GUARD);
        let q = q.max(Q_FLOOR);
        let gain = gain.max(GAIN_FLOOR);

        let w0 = TAU * freq / sample_rate;
        let cw0 = w0.cos();
        let sw0 = w0.sin();
        let alpha = sw0 / (2.0 * q);

        match filter {
            FilterType::LowShelf => {
                let a = gain.sqrt();
                let ap1 = a + 1.0;
                let am1 = a - 1.0;
                let beta = sw0 * a.sqrt() / q;
                Self::normalized(
                    a * (ap1 - am1 * cw0 + beta),
                    2.0 * a * (am1 - ap1 * cw0),
                    a * (ap1 - am1 * cw0 - beta),
                    ap1 + am1 * cw0 + beta,
                    -2.0 * (am1 + ap1 * cw0),
                    ap1 + am1 * cw0 - beta,
                )
            }
            FilterType::HighShelf => {
                let a = gain.sqrt();
                let ap1 = a + 1.0;
                let am1 = a - 1.0;
                let beta = sw0 * a.sqrt() / q;
                Self::normalized(
                    a * (ap1 + am1 * cw0 + beta),
                    -2.0 * a * (am1 + ap1 * cw0),
                    a * (ap1 + am1 * cw0 - beta),
                    ap1 - am1 * cw0 + beta,
                    2.0 * (am1 - ap1 * cw0),
                    ap1 - am1 * cw0 - beta,
                )
            }
            FilterType::Peak => {
                let a = gain.sqrt();
                Self::normalized(
                    1.0 + alpha * a,
                    -2.0 * cw0,
                    1.0 - alpha * a,
                    1.0 + alpha / a,
                    -2.0 * cw0,
                    1.0 - alpha / a,
                )
            }
            FilterType::LowCut => Self::normalized(
                (1.0 + cw0) * 0.5,
                -(1.0 + cw0),
                (1.0 + cw0) * 0.5,
                1.0 + alpha,
                -2.0 * cw0,
                1.0 - alpha,
            ),
            FilterType::HighCut => Self::normalized(
                (1.0 - cw0) * 0.5,
                1.0 - cw0,
                (1.0 - cw0) * 0.5,
                1.0 + alpha,
                -2.0 * cw0,
                1.0 - alpha,
            ),
            FilterType::Notch => Self::normalized(
                1.0,
                -2.0 * cw0,
                1.0,
                1.0 + alpha,
                -2.0 * cw0,
                1.0 - alpha,
            ),
            FilterType::BandPass => Self::normalized(
                alpha,
                0.0,
                -alpha,
                1.0 + alpha,
                -2.0 * cw0,
                1.0 - alpha,
            ),
        }
    }

    fn normalized(b0: f32, b1: f32, b2: f32, a0: f32, a1: f32, a2: f32) -> Self {
        // a0 comes out of the cookbook formulas strictly positive for every
        // clamped input, so the division is safe.
        let inv_a0 = 1.0 / a0;
        Self {
            b0: b0 * inv_a0,
            b1: b1 * inv_a0,
            b2: b2 * inv_a0,
            a1: a1 * inv_a0,
            a2: a2 * inv_a0,
        }
    }

    /// Magnitude of the transfer function at `frequency`, linear domain.
    pub fn magnitude_at(&self, frequency: f32, sample_rate: f32) -> f32 {
        if sample_rate <= 0.0 {
            return 1.0;
        }
        let w = TAU * frequency / sample_rate;
        let (cw, sw) = (w.cos(), w.sin());
        let (c2w, s2w) = ((2.0 * w).cos(), (2.0 * w).sin());

        let num_re = self.b0 + self.b1 * cw + self.b2 * c2w;
        let num_im = self.b1 * sw + self.b2 * s2w;
        let den_re = 1.0 + self.a1 * cw + self.a2 * c2w;
        let den_im = self.a1 * sw + self.a2 * s2w;

        let num = num_re * num_re + num_im * num_im;
        let den = (den_re * den_re + den_im * den_im).max(1e-30);
        (num / den).sqrt()
    }

    /// Magnitude response in dB, floored at [`DB_FLOOR`].
    pub fn magnitude_db_at(&self, frequency: f32, sample_rate: f32) -> f32 {
        gain_to_db(self.magnitude_at(frequency, sample_rate), DB_FLOOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::utils::db_to_gain;

    const SR: f32 = 48000.0;

    const ALL_TYPES: [FilterType; 7] = [
        FilterType::LowShelf,
        FilterType::Peak,
        FilterType::HighShelf,
        FilterType::LowCut,
        FilterType::HighCut,
        FilterType::Notch,
        FilterType::BandPass,
    ];

    #[test]
    fn coefficients_finite_over_parameter_grid() {
        for filter in ALL_TYPES {
            for &freq in &[20.0, 100.0, 1000.0, 10000.0, 20000.0] {
                for &q in &[0.1, 0.707, 2.0, 10.0] {
                    for &gain_db in &[-24.0, -6.0, 0.0, 6.0, 24.0] {
                        let c =
                            BiquadCoefficients::compute(filter, SR, freq, q, db_to_gain(gain_db));
                        assert!(c.is_finite(), "{filter:?} f={freq} q={q} g={gain_db}");
                        for &probe in &[30.0, 440.0, 5000.0, 18000.0] {
                            assert!(c.magnitude_at(probe, SR).is_finite());
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn degenerate_sample_rate_yields_pass_through() {
        let c = BiquadCoefficients::compute(FilterType::Peak, 0.0, 1000.0, 1.0, 2.0);
        assert_eq!(c, BiquadCoefficients::identity());
        let c = BiquadCoefficients::compute(FilterType::LowCut, -44100.0, 1000.0, 1.0, 1.0);
        assert_eq!(c, BiquadCoefficients::identity());
    }

    #[test]
    fn out_of_range_frequency_is_clamped_not_nan() {
        let c = BiquadCoefficients::compute(FilterType::HighShelf, SR, 1e9, 0.0, 1.0);
        assert!(c.is_finite());
        let c = BiquadCoefficients::compute(FilterType::Notch, SR, -50.0, 1.0, 1.0);
        assert!(c.is_finite());
    }

    #[test]
    fn synthesis_is_deterministic() {
        for filter in ALL_TYPES {
            let a = BiquadCoefficients::compute(filter, SR, 750.0, 1.3, db_to_gain(4.5));
            let b = BiquadCoefficients::compute(filter, SR, 750.0, 1.3, db_to_gain(4.5));
            assert_eq!(a, b);
        }
    }

    #[test]
    fn unity_gain_peak_is_identity_transform() {
        let c = BiquadCoefficients::compute(FilterType::Peak, SR, 1000.0, 2.0, 1.0);
        for &f in &[50.0, 500.0, 1000.0, 4000.0, 15000.0] {
            assert!((c.magnitude_db_at(f, SR)).abs() < 0.01);
        }
    }

    #[test]
    fn peak_boost_hits_target_at_center() {
        let c = BiquadCoefficients::compute(FilterType::Peak, SR, 1000.0, 1.0, db_to_gain(6.0));
        assert!((c.magnitude_db_at(1000.0, SR) - 6.0).abs() < 0.05);
        // Far from center the response returns to unity.
        assert!(c.magnitude_db_at(30.0, SR).abs() < 0.5);
        assert!(c.magnitude_db_at(18000.0, SR).abs() < 0.5);
    }

    #[test]
    fn notch_attenuates_center_and_passes_elsewhere() {
        let c = BiquadCoefficients::compute(FilterType::Notch, SR, 2000.0, 2.0, 1.0);
        assert!(c.magnitude_db_at(2000.0, SR) < -40.0);
        assert!(c.magnitude_db_at(100.0, SR).abs() < 0.5);
        assert!(c.magnitude_db_at(12000.0, SR).abs() < 0.5);
    }

    #[test]
    fn low_cut_rolls_off_low_end() {
        let c = BiquadCoefficients::compute(FilterType::LowCut, SR, 200.0, 0.707, 1.0);
        assert!(c.magnitude_db_at(20.0, SR) < -30.0);
        assert!(c.magnitude_db_at(2000.0, SR).abs() < 0.5);
    }

    #[test]
    fn shelves_settle_at_requested_gain() {
        let low = BiquadCoefficients::compute(FilterType::LowShelf, SR, 500.0, 0.707, db_to_gain(-6.0));
        assert!((low.magnitude_db_at(20.0, SR) + 6.0).abs() < 0.2);
        assert!(low.magnitude_db_at(18000.0, SR).abs() < 0.2);

        let high =
            BiquadCoefficients::compute(FilterType::HighShelf, SR, 5000.0, 0.707, db_to_gain(6.0));
        assert!((high.magnitude_db_at(20000.0, SR) - 6.0).abs() < 0.3);
        assert!(high.magnitude_db_at(50.0, SR).abs() < 0.2);
    }

    #[test]
    fn band_pass_peaks_at_center() {
        let c = BiquadCoefficients::compute(FilterType::BandPass, SR, 1000.0, 2.0, 1.0);
        assert!(c.magnitude_db_at(1000.0, SR).abs() < 0.05);
        assert!(c.magnitude_db_at(50.0, SR) < -20.0);
        assert!(c.magnitude_db_at(19000.0, SR) < -20.0);
    }
}
