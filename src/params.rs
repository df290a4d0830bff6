//! Band parameter model.
//!
//! These values are owned by an external configuration layer (host, UI, or
//! test harness) and handed to the engine once per block. Everything here is
//! plain data; the ranges mirror what the processing core can handle without
//! destabilizing coefficient synthesis.

use serde::{Deserialize, Serialize};

pub const MIN_FREQ_HZ: f32 = 20.0;
pub const MAX_FREQ_HZ: f32 = 20_000.0;
pub const MIN_GAIN_DB: f32 = -24.0;
pub const MAX_GAIN_DB: f32 = 24.0;
pub const MIN_Q: f32 = 0.1;
pub const MAX_Q: f32 = 10.0;
pub const MIN_THRESHOLD_DB: f32 = -60.0;
pub const MAX_THRESHOLD_DB: f32 = 0.0;
pub const MIN_RATIO: f32 = 1.0;
pub const MAX_RATIO: f32 = 20.0;
pub const MIN_ATTACK_MS: f32 = 0.1;
pub const MAX_ATTACK_MS: f32 = 200.0;
pub const MIN_RELEASE_MS: f32 = 1.0;
pub const MAX_RELEASE_MS: f32 = 1000.0;

/// Default center frequencies for the eight bands.
pub const DEFAULT_BAND_FREQS: [f32; 8] = [
    60.0, 200.0, 500.0, 1000.0, 2000.0, 5000.0, 10000.0, 16000.0,
];

/// Second-order filter shapes available per band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterType {
    LowShelf,
    Peak,
    HighShelf,
    LowCut,
    HighCut,
    Notch,
    BandPass,
}

impl FilterType {
    /// Whether the shape responds to the gain parameter. Cut, notch and
    /// band-pass filters have a fixed transfer shape.
    pub fn has_gain(&self) -> bool {
        matches!(
            self,
            FilterType::LowShelf | FilterType::Peak | FilterType::HighShelf
        )
    }
}

/// Parameters for a single dynamic EQ band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandParams {
    /// Center / corner frequency in Hz.
    pub frequency: f32,
    /// Static filter gain in dB (signed).
    pub gain_db: f32,
    /// Q factor, controls bandwidth.
    pub q: f32,
    /// Dynamics threshold in dB.
    pub threshold_db: f32,
    /// Compression ratio (>= 1).
    pub ratio: f32,
    /// Detector attack time in ms.
    pub attack_ms: f32,
    /// Detector release time in ms.
    pub release_ms: f32,
    /// Band is in the processing chain at all.
    pub enabled: bool,
    /// Envelope-driven gain reduction is active.
    pub dynamic_on: bool,
    /// Filter shape.
    pub filter: FilterType,
}

impl Default for BandParams {
    fn default() -> Self {
        Self {
            frequency: 1000.0,
            gain_db: 0.0,
            q: 1.0,
            threshold_db: -20.0,
            ratio: 4.0,
            attack_ms: 10.0,
            release_ms: 100.0,
            enabled: true,
            dynamic_on: true,
            filter: FilterType::Peak,
        }
    }
}

impl BandParams {
    /// Default parameters for a band at the given cascade position: low shelf
    /// first, high shelf last, peak in between, with staggered frequencies.
    pub fn default_for_band(index: usize) -> Self {
        let last = DEFAULT_BAND_FREQS.len() - 1;
        let slot = index.min(last);
        Self {
            frequency: DEFAULT_BAND_FREQS[slot],
            filter: if slot == 0 {
                FilterType::LowShelf
            } else if slot == last {
                FilterType::HighShelf
            } else {
                FilterType::Peak
            },
            ..Self::default()
        }
    }

    /// Fold every field back into its legal range. Applied by the engine
    /// before use so an out-of-range value from the configuration layer can
    /// never reach coefficient synthesis.
    pub fn clamped(&self) -> Self {
        Self {
            frequency: self.frequency.clamp(MIN_FREQ_HZ, MAX_FREQ_HZ),
            gain_db: self.gain_db.clamp(MIN_GAIN_DB, MAX_GAIN_DB),
            q: self.q.clamp(MIN_Q, MAX_Q),
            threshold_db: self.threshold_db.clamp(MIN_THRESHOLD_DB, MAX_THRESHOLD_DB),
            ratio: self.ratio.clamp(MIN_RATIO, MAX_RATIO),
            attack_ms: self.attack_ms.clamp(MIN_ATTACK_MS, MAX_ATTACK_MS),
            release_ms: self.release_ms.clamp(MIN_RELEASE_MS, MAX_RELEASE_MS),
            enabled: self.enabled,
            dynamic_on: self.dynamic_on,
            filter: self.filter,
        }
    }
}
