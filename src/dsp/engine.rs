//! Fixed-capacity band cascade.
//!
//! The engine owns [`MAX_BANDS`] band processors and runs the active prefix
//! in ascending index order, each band filtering the previous band's output
//! in place. The order is part of the contract: overlapping bands interact,
//! so reordering changes the overall response. Changes to the active count
//! take effect on the next processed block.

use std::sync::Arc;

use crate::dsp::band::BandProcessor;
use crate::meters::AtomicF32;
use crate::params::BandParams;

/// Maximum number of bands, fixed at build time.
pub const MAX_BANDS: usize = 8;

/// Active band count when none has been requested yet.
pub const DEFAULT_ACTIVE_BANDS: usize = 4;

pub struct EqualizerEngine {
    bands: Vec<BandProcessor>,
    active_bands: usize,
}

impl Default for EqualizerEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl EqualizerEngine {
    pub fn new() -> Self {
        let mut bands = Vec::with_capacity(MAX_BANDS);
        for i in 0..MAX_BANDS {
            let mut band = BandProcessor::new();
            band.update_params(&BandParams::default_for_band(i));
            bands.push(band);
        }
        Self {
            bands,
            active_bands: DEFAULT_ACTIVE_BANDS,
        }
    }

    /// Prepare every band for the given stream geometry. All per-band
    /// allocation happens here, never in `process`.
    pub fn prepare(&mut self, sample_rate: f32, max_block_size: usize, num_channels: usize) {
        for band in &mut self.bands {
            band.prepare(sample_rate, max_block_size, num_channels);
        }
        log::debug!(
            "equalizer prepared: sr={sample_rate}, block={max_block_size}, channels={num_channels}"
        );
    }

    /// Clamp into [1, MAX_BANDS]; takes effect on the next block.
    pub fn set_active_band_count(&mut self, count: usize) {
        self.active_bands = count.clamp(1, MAX_BANDS);
    }

    pub fn active_band_count(&self) -> usize {
        self.active_bands
    }

    pub fn update_band_params(&mut self, index: usize, params: &BandParams) {
        if let Some(band) = self.bands.get_mut(index) {
            band.update_params(params);
        }
    }

    pub fn band_params(&self, index: usize) -> Option<&BandParams> {
        self.bands.get(index).map(|b| b.params())
    }

    /// Latest gain reduction published by a band, 0 for out-of-range indices.
    pub fn gain_reduction_db(&self, index: usize) -> f32 {
        self.bands
            .get(index)
            .map(|b| b.gain_reduction_db())
            .unwrap_or(0.0)
    }

    /// Shared gain-reduction cell for concurrent readers.
    pub fn meter(&self, index: usize) -> Option<Arc<AtomicF32>> {
        self.bands.get(index).map(|b| b.meter())
    }

    /// Run the active prefix of the cascade, strictly in index order.
    pub fn process(&mut self, channels: &mut [&mut [f32]]) {
        for band in &mut self.bands[..self.active_bands] {
            band.process(channels);
        }
    }

    pub fn reset(&mut self) {
        for band in &mut self.bands {
            band.reset();
        }
    }
}
