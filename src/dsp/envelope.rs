//! Attack/release envelope follower.
//!
//! One state variable in the linear domain. The asymmetric coefficient
//! choice (attack when the input rises above the envelope, release when it
//! falls below) gives the fast-rise / slow-decay behavior of a compressor
//! detector. Nothing beyond first order happens here.

use crate::dsp::utils::time_constant_coeff;

#[derive(Debug, Clone, Copy)]
pub struct EnvelopeFollower {
    sample_rate: f32,
    attack_coeff: f32,
    release_coeff: f32,
    envelope: f32,
}

impl Default for EnvelopeFollower {
    fn default() -> Self {
        Self {
            sample_rate: 0.0,
            attack_coeff: 0.0,
            release_coeff: 0.0,
            envelope: 0.0,
        }
    }
}

impl EnvelopeFollower {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prepare(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.envelope = 0.0;
    }

    /// Derive the two decay coefficients from the current sample rate.
    /// No-op until `prepare` has seen a valid rate.
    pub fn set_attack_release(&mut self, attack_ms: f32, release_ms: f32) {
        if self.sample_rate <= 0.0 {
            return;
        }
        self.attack_coeff = time_constant_coeff(attack_ms, self.sample_rate);
        self.release_coeff = time_constant_coeff(release_ms, self.sample_rate);
    }

    #[inline]
    pub fn process(&mut self, input_level: f32) -> f32 {
        let coeff = if input_level > self.envelope {
            self.attack_coeff
        } else {
            self.release_coeff
        };
        self.envelope = coeff * self.envelope + (1.0 - coeff) * input_level;
        self.envelope
    }

    pub fn envelope(&self) -> f32 {
        self.envelope
    }

    pub fn reset(&mut self) {
        self.envelope = 0.0;
    }
}
