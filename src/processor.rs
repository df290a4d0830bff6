//! Top-level block processor: the band cascade plus the pre/post spectrum
//! taps that feed an analyzer display.
//!
//! Both taps see a mono downmix. The pre tap captures the input before any
//! band runs, the post tap captures the cascade output, so a display can
//! overlay what the equalizer received against what it produced.

use std::sync::Arc;

use crate::dsp::engine::EqualizerEngine;
use crate::dsp::spectrum::{spectrum_channel, SpectrumInput, SpectrumOutput};
use crate::meters::AtomicF32;
use crate::params::BandParams;
use crate::presets::EqPreset;

pub struct DynamicEqProcessor {
    engine: EqualizerEngine,
    pre_tap: SpectrumInput,
    post_tap: SpectrumInput,
    mono: Vec<f32>,
}

impl DynamicEqProcessor {
    /// Build a processor together with the consumer ends of its two
    /// analyzer taps. The outputs are free-standing and may be moved to a
    /// display thread.
    pub fn new() -> (Self, SpectrumOutput, SpectrumOutput) {
        let (pre_tap, pre_out) = spectrum_channel();
        let (post_tap, post_out) = spectrum_channel();
        let processor = Self {
            engine: EqualizerEngine::new(),
            pre_tap,
            post_tap,
            mono: Vec::new(),
        };
        (processor, pre_out, post_out)
    }

    /// Set up for a stream. Invalid geometry is ignored so a misbehaving
    /// caller degrades to the previous configuration instead of a panic.
    pub fn prepare(&mut self, sample_rate: f32, max_block_size: usize, num_channels: usize) {
        if sample_rate <= 0.0 || max_block_size == 0 || num_channels == 0 {
            log::warn!(
                "ignoring prepare with invalid geometry: sr={sample_rate}, \
                 block={max_block_size}, channels={num_channels}"
            );
            return;
        }
        self.engine.prepare(sample_rate, max_block_size, num_channels);
        self.mono.resize(max_block_size, 0.0);
        self.pre_tap.reset();
        self.post_tap.reset();
    }

    /// Process one block in place and feed both analyzer taps.
    pub fn process(&mut self, channels: &mut [&mut [f32]]) {
        let Some(frames) = channels.first().map(|c| c.len()) else {
            return;
        };

        self.feed_tap(true, channels, frames);
        self.engine.process(channels);
        self.feed_tap(false, channels, frames);
    }

    /// Downmix into the scratch buffer and push to one tap. Blocks larger
    /// than the prepared maximum skip analysis rather than allocate.
    fn feed_tap(&mut self, pre: bool, channels: &[&mut [f32]], frames: usize) {
        if frames > self.mono.len() {
            return;
        }
        let mono = &mut self.mono[..frames];
        mono.fill(0.0);
        for channel in channels {
            for (acc, &s) in mono.iter_mut().zip(channel.iter()) {
                *acc += s;
            }
        }
        let norm = 1.0 / channels.len() as f32;
        for s in mono.iter_mut() {
            *s *= norm;
        }

        let tap = if pre { &mut self.pre_tap } else { &mut self.post_tap };
        tap.push_samples(mono);
    }

    pub fn set_active_band_count(&mut self, count: usize) {
        self.engine.set_active_band_count(count);
    }

    pub fn active_band_count(&self) -> usize {
        self.engine.active_band_count()
    }

    pub fn update_band_params(&mut self, index: usize, params: &BandParams) {
        self.engine.update_band_params(index, params);
    }

    pub fn band_params(&self, index: usize) -> Option<&BandParams> {
        self.engine.band_params(index)
    }

    pub fn gain_reduction_db(&self, index: usize) -> f32 {
        self.engine.gain_reduction_db(index)
    }

    pub fn meter(&self, index: usize) -> Option<Arc<AtomicF32>> {
        self.engine.meter(index)
    }

    pub fn apply_preset(&mut self, preset: &EqPreset) {
        preset.apply_to(&mut self.engine);
    }

    pub fn capture_preset(&self) -> EqPreset {
        EqPreset::capture(&self.engine)
    }

    pub fn engine(&self) -> &EqualizerEngine {
        &self.engine
    }

    pub fn reset(&mut self) {
        self.engine.reset();
        self.pre_tap.reset();
        self.post_tap.reset();
    }
}
