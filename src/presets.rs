//! Serializable equalizer state.
//!
//! A preset is the full parameter surface of the engine: the active band
//! count plus one [`BandParams`] per slot. JSON is the interchange format;
//! loading clamps every field back into its legal range so hand-edited or
//! version-skewed files cannot push the engine out of bounds.

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

use crate::dsp::engine::{EqualizerEngine, DEFAULT_ACTIVE_BANDS, MAX_BANDS};
use crate::params::BandParams;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EqPreset {
    pub active_bands: usize,
    pub bands: Vec<BandParams>,
}

impl Default for EqPreset {
    fn default() -> Self {
        Self {
            active_bands: DEFAULT_ACTIVE_BANDS,
            bands: (0..MAX_BANDS).map(BandParams::default_for_band).collect(),
        }
    }
}

impl EqPreset {
    /// Snapshot the engine's current state.
    pub fn capture(engine: &EqualizerEngine) -> Self {
        let bands = (0..MAX_BANDS)
            .map(|i| {
                engine
                    .band_params(i)
                    .copied()
                    .unwrap_or_else(|| BandParams::default_for_band(i))
            })
            .collect();
        Self {
            active_bands: engine.active_band_count(),
            bands,
        }
    }

    /// Push this preset into the engine. Missing trailing bands keep their
    /// per-slot defaults; extra bands are ignored.
    pub fn apply_to(&self, engine: &mut EqualizerEngine) {
        engine.set_active_band_count(self.active_bands);
        for i in 0..MAX_BANDS {
            let params = self
                .bands
                .get(i)
                .map(|p| p.clamped())
                .unwrap_or_else(|| BandParams::default_for_band(i));
            engine.update_band_params(i, &params);
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize preset")
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let mut preset: Self =
            serde_json::from_str(json).context("failed to parse preset JSON")?;
        ensure!(!preset.bands.is_empty(), "preset contains no bands");

        preset.active_bands = preset.active_bands.clamp(1, MAX_BANDS);
        preset.bands.truncate(MAX_BANDS);
        for band in &mut preset.bands {
            *band = band.clamped();
        }
        log::debug!(
            "loaded preset: {} bands, {} active",
            preset.bands.len(),
            preset.active_bands
        );
        Ok(preset)
    }
}
