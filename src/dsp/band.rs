//! A single dynamic EQ band: one parametric filter plus an envelope-driven
//! gain-reduction stage.
//!
//! The dynamics run once per block, not per sample: the block peak drives
//! the envelope follower, the resulting reduction reshapes the filter gain,
//! and the reshaped filter is applied in place to every channel. Reduction
//! granularity is therefore bounded by the block size — a deliberate trade
//! against recomputing biquad coefficients per sample.
//!
//! # Design Notes
//! - All channels share one envelope derived from the block-wide peak.
//! - The published gain reduction is a single atomic scalar, readable from
//!   any thread without locks.
//! - No allocation happens in `process`; channel filter state is sized once
//!   in `prepare`.

use std::sync::Arc;

use crate::dsp::biquad::Biquad;
use crate::dsp::coefficients::BiquadCoefficients;
use crate::dsp::envelope::EnvelopeFollower;
use crate::dsp::utils::{db_to_gain, gain_to_db, DB_FLOOR};
use crate::meters::AtomicF32;
use crate::params::BandParams;

pub struct BandProcessor {
    params: BandParams,
    sample_rate: f32,
    coeffs: BiquadCoefficients,
    channel_states: Vec<Biquad>,
    envelope: EnvelopeFollower,
    reduction_db: Arc<AtomicF32>,
}

impl Default for BandProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl BandProcessor {
    pub fn new() -> Self {
        Self {
            params: BandParams::default(),
            sample_rate: 0.0,
            coeffs: BiquadCoefficients::identity(),
            channel_states: Vec::new(),
            envelope: EnvelopeFollower::new(),
            reduction_db: Arc::new(AtomicF32::new(0.0)),
        }
    }

    /// Size per-channel filter state and reset all runtime state. The only
    /// place this band allocates.
    pub fn prepare(&mut self, sample_rate: f32, _max_block_size: usize, num_channels: usize) {
        self.sample_rate = sample_rate;
        self.envelope.prepare(sample_rate);
        self.channel_states.clear();
        self.channel_states
            .resize_with(num_channels, Biquad::new);
        self.reduction_db.store(0.0);

        // Re-derive coefficients and detector times for the new rate.
        let params = self.params;
        self.update_params(&params);
    }

    pub fn update_params(&mut self, params: &BandParams) {
        self.params = params.clamped();
        self.envelope
            .set_attack_release(self.params.attack_ms, self.params.release_ms);
        self.coeffs = self.compute_coefficients(self.params.gain_db);
    }

    /// Process one multichannel block in place.
    pub fn process(&mut self, channels: &mut [&mut [f32]]) {
        if !self.params.enabled {
            self.reduction_db.store(0.0);
            return;
        }

        if !self.params.dynamic_on {
            self.reduction_db.store(0.0);
            self.apply_filter(channels);
            return;
        }

        // Block peak across all channels and frames.
        let mut peak = 0.0f32;
        for channel in channels.iter() {
            for &s in channel.iter() {
                peak = peak.max(s.abs());
            }
        }

        // Detector runs in the linear domain, threshold comparison in dB.
        let level_db = gain_to_db(peak, DB_FLOOR);
        let env = self.envelope.process(db_to_gain(level_db));
        let env_db = gain_to_db(env, DB_FLOOR);

        let reduction_db = if env_db > self.params.threshold_db {
            let excess = env_db - self.params.threshold_db;
            excess - excess / self.params.ratio
        } else {
            0.0
        };
        self.reduction_db.store(reduction_db);

        // Reduction modulates the static gain. Gainless shapes keep their
        // static coefficients; the detector still publishes for telemetry.
        if self.params.filter.has_gain() {
            self.coeffs = self.compute_coefficients(self.params.gain_db - reduction_db);
        }
        self.apply_filter(channels);
    }

    fn compute_coefficients(&self, gain_db: f32) -> BiquadCoefficients {
        BiquadCoefficients::compute(
            self.params.filter,
            self.sample_rate,
            self.params.frequency,
            self.params.q,
            db_to_gain(gain_db),
        )
    }

    fn apply_filter(&mut self, channels: &mut [&mut [f32]]) {
        for (state, channel) in self.channel_states.iter_mut().zip(channels.iter_mut()) {
            state.process_block(&self.coeffs, channel);
        }
    }

    /// Latest published gain reduction in dB, always >= 0.
    pub fn gain_reduction_db(&self) -> f32 {
        self.reduction_db.load()
    }

    /// Shared handle to the gain-reduction cell for cross-thread readers.
    pub fn meter(&self) -> Arc<AtomicF32> {
        Arc::clone(&self.reduction_db)
    }

    pub fn params(&self) -> &BandParams {
        &self.params
    }

    /// Clear filter and detector state without touching parameters.
    pub fn reset(&mut self) {
        for state in &mut self.channel_states {
            state.reset();
        }
        self.envelope.reset();
        self.reduction_db.store(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::FilterType;

    const SR: f32 = 48000.0;
    const BLOCK: usize = 256;

    fn prepared_band(params: BandParams) -> BandProcessor {
        let mut band = BandProcessor::new();
        band.prepare(SR, BLOCK, 2);
        band.update_params(&params);
        band
    }

    fn stereo_block(value: f32) -> [Vec<f32>; 2] {
        [vec![value; BLOCK], vec![value; BLOCK]]
    }

    fn process_stereo(band: &mut BandProcessor, block: &mut [Vec<f32>; 2]) {
        let [l, r] = block;
        let mut channels: [&mut [f32]; 2] = [l.as_mut_slice(), r.as_mut_slice()];
        band.process(&mut channels);
    }

    #[test]
    fn disabled_band_is_a_no_op() {
        let mut band = prepared_band(BandParams {
            enabled: false,
            gain_db: 12.0,
            ..BandParams::default()
        });
        let mut block = stereo_block(0.5);
        process_stereo(&mut band, &mut block);
        assert!(block[0].iter().all(|&s| s == 0.5));
        assert!(block[1].iter().all(|&s| s == 0.5));
        assert_eq!(band.gain_reduction_db(), 0.0);
    }

    #[test]
    fn static_band_reports_zero_reduction() {
        let mut band = prepared_band(BandParams {
            dynamic_on: false,
            gain_db: -6.0,
            ..BandParams::default()
        });
        let mut block = stereo_block(0.5);
        process_stereo(&mut band, &mut block);
        assert_eq!(band.gain_reduction_db(), 0.0);
    }

    #[test]
    fn reduction_matches_compressor_law_at_steady_state() {
        // Envelope at -10 dB over a -20 dB threshold with ratio 4 must give
        // 10 - 10/4 = 7.5 dB of reduction.
        let mut band = prepared_band(BandParams {
            threshold_db: -20.0,
            ratio: 4.0,
            attack_ms: 0.1,
            release_ms: 1.0,
            gain_db: 0.0,
            filter: FilterType::Peak,
            ..BandParams::default()
        });

        let peak = db_to_gain(-10.0);
        // Refill the block every iteration so the detector sees a constant
        // level while the envelope settles.
        for _ in 0..400 {
            let mut block = stereo_block(peak);
            process_stereo(&mut band, &mut block);
        }
        assert!((band.gain_reduction_db() - 7.5).abs() < 1e-3);
    }

    #[test]
    fn reduction_is_zero_below_threshold() {
        let mut band = prepared_band(BandParams {
            threshold_db: 0.0,
            ..BandParams::default()
        });
        for _ in 0..100 {
            let mut block = stereo_block(0.25);
            process_stereo(&mut band, &mut block);
            assert_eq!(band.gain_reduction_db(), 0.0);
        }
    }

    #[test]
    fn reduction_never_negative() {
        let mut band = prepared_band(BandParams {
            threshold_db: -30.0,
            ratio: 8.0,
            attack_ms: 0.1,
            release_ms: 1.0,
            ..BandParams::default()
        });
        for step in 0..300 {
            // Alternate loud and silent blocks.
            let level = if step % 2 == 0 { 0.9 } else { 0.0 };
            let mut block = stereo_block(level);
            process_stereo(&mut band, &mut block);
            assert!(band.gain_reduction_db() >= 0.0);
        }
    }

    #[test]
    fn high_threshold_dynamic_matches_static_output() {
        let params = BandParams {
            gain_db: 6.0,
            threshold_db: 0.0, // never exceeded by sub-unity input
            filter: FilterType::Peak,
            frequency: 1000.0,
            q: 1.0,
            ..BandParams::default()
        };
        let mut dynamic = prepared_band(BandParams {
            dynamic_on: true,
            ..params
        });
        let mut stat = prepared_band(BandParams {
            dynamic_on: false,
            ..params
        });

        for i in 0..20 {
            let mut a = stereo_block(0.0);
            let mut b = stereo_block(0.0);
            for (n, s) in a[0].iter_mut().enumerate() {
                *s = 0.4 * (std::f32::consts::TAU * 1000.0 * (i * BLOCK + n) as f32 / SR).sin();
            }
            let (a_left, a_right) = a.split_at_mut(1);
            a_right[0].copy_from_slice(&a_left[0]);
            b[0].copy_from_slice(&a[0]);
            b[1].copy_from_slice(&a[1]);

            process_stereo(&mut dynamic, &mut a);
            process_stereo(&mut stat, &mut b);
            assert_eq!(a[0], b[0]);
            assert_eq!(a[1], b[1]);
        }
    }

    #[test]
    fn identical_params_give_identical_coefficients() {
        let params = BandParams {
            gain_db: 3.7,
            frequency: 432.0,
            q: 2.4,
            ..BandParams::default()
        };
        let mut band = prepared_band(params);
        let first = band.coeffs;
        band.update_params(&params);
        assert_eq!(band.coeffs, first);
    }
}
