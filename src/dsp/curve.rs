//! Cached frequency-response curves for display.
//!
//! The cache evaluates each band's transfer-function magnitude on a fixed
//! log-spaced frequency grid and multiplies the per-band responses into one
//! aggregate curve. Recomputation is change-driven: a band's curve is only
//! re-evaluated when its snapshot (parameters, cascade membership, published
//! gain reduction) moved since the last update, and the aggregate product is
//! only rebuilt when at least one band curve did.
//!
//! The grid is independent of any display width or zoom. Consumers resample
//! the returned points themselves; the cache never learns about pixels.

use crate::dsp::coefficients::BiquadCoefficients;
use crate::dsp::engine::{EqualizerEngine, MAX_BANDS};
use crate::dsp::utils::db_to_gain;
use crate::params::BandParams;

/// Gain-reduction wobble below this threshold does not invalidate a curve.
/// Keeps idle redraw cost at zero while the detector breathes.
const GR_TOLERANCE_DB: f32 = 0.05;

#[derive(Debug, Clone, Copy)]
pub struct CurveConfig {
    pub num_points: usize,
    pub min_hz: f32,
    pub max_hz: f32,
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self {
            num_points: 1024,
            min_hz: 20.0,
            max_hz: 20_000.0,
        }
    }
}

/// Everything that can change a band's displayed curve.
#[derive(Debug, Clone, Copy, PartialEq)]
struct BandSnapshot {
    params: BandParams,
    in_cascade: bool,
    reduction_db: f32,
}

impl BandSnapshot {
    fn capture(engine: &EqualizerEngine, index: usize) -> Option<Self> {
        let params = *engine.band_params(index)?;
        Some(Self {
            params,
            in_cascade: index < engine.active_band_count(),
            reduction_db: engine.gain_reduction_db(index),
        })
    }

    fn differs_from(&self, other: &Self) -> bool {
        self.params != other.params
            || self.in_cascade != other.in_cascade
            || (self.reduction_db - other.reduction_db).abs() > GR_TOLERANCE_DB
    }
}

pub struct CurveCache {
    config: CurveConfig,
    sample_rate: f32,
    frequencies: Vec<f32>,
    snapshots: [Option<BandSnapshot>; MAX_BANDS],
    // Linear magnitudes per band; the aggregate is their product, converted
    // to dB once at the end to avoid accumulating per-band rounding.
    band_linear: Vec<Vec<f64>>,
    band_db: Vec<Vec<f32>>,
    aggregate_db: Vec<f32>,
}

impl Default for CurveCache {
    fn default() -> Self {
        Self::new(CurveConfig::default())
    }
}

impl CurveCache {
    pub fn new(config: CurveConfig) -> Self {
        let num_points = config.num_points.max(2);
        let config = CurveConfig {
            num_points,
            ..config
        };

        // Log-spaced grid from min_hz to max_hz inclusive.
        let span = (config.max_hz / config.min_hz).ln();
        let frequencies = (0..num_points)
            .map(|i| {
                let t = i as f32 / (num_points - 1) as f32;
                config.min_hz * (span * t).exp()
            })
            .collect();

        Self {
            config,
            sample_rate: 0.0,
            frequencies,
            snapshots: [None; MAX_BANDS],
            band_linear: vec![vec![1.0; num_points]; MAX_BANDS],
            band_db: vec![vec![0.0; num_points]; MAX_BANDS],
            aggregate_db: vec![0.0; num_points],
        }
    }

    pub fn config(&self) -> &CurveConfig {
        &self.config
    }

    /// The evaluation grid in Hz, ascending.
    pub fn frequencies(&self) -> &[f32] {
        &self.frequencies
    }

    /// Combined response of the active cascade in dB, one value per grid
    /// point. Valid after the first `update`.
    pub fn aggregate_db(&self) -> &[f32] {
        &self.aggregate_db
    }

    /// Response of one band in dB. Flat for disabled or inactive bands.
    pub fn band_curve_db(&self, index: usize) -> Option<&[f32]> {
        self.band_db.get(index).map(|c| c.as_slice())
    }

    /// Drop all snapshots so the next `update` rebuilds everything.
    pub fn invalidate(&mut self) {
        self.snapshots = [None; MAX_BANDS];
    }

    /// Refresh curves against the engine's current state. Returns true when
    /// any curve actually changed.
    pub fn update(&mut self, engine: &EqualizerEngine, sample_rate: f32) -> bool {
        if sample_rate != self.sample_rate {
            self.sample_rate = sample_rate;
            self.invalidate();
        }
        if self.sample_rate <= 0.0 {
            return false;
        }

        let mut any_changed = false;
        for index in 0..MAX_BANDS {
            let Some(fresh) = BandSnapshot::capture(engine, index) else {
                continue;
            };
            let stale = match &self.snapshots[index] {
                Some(prev) => fresh.differs_from(prev),
                None => true,
            };
            if stale {
                self.recompute_band(index, &fresh);
                self.snapshots[index] = Some(fresh);
                any_changed = true;
            }
        }

        if any_changed {
            self.rebuild_aggregate();
        }
        any_changed
    }

    fn recompute_band(&mut self, index: usize, snapshot: &BandSnapshot) {
        let linear = &mut self.band_linear[index];
        let db = &mut self.band_db[index];

        if !snapshot.in_cascade || !snapshot.params.enabled {
            linear.fill(1.0);
            db.fill(0.0);
            return;
        }

        // Mirror the audio path: reduction folds into the filter gain only
        // for shapes that carry a gain parameter.
        let params = &snapshot.params;
        let effective_gain_db = if params.dynamic_on && params.filter.has_gain() {
            params.gain_db - snapshot.reduction_db
        } else {
            params.gain_db
        };
        let coeffs = BiquadCoefficients::compute(
            params.filter,
            self.sample_rate,
            params.frequency,
            params.q,
            db_to_gain(effective_gain_db),
        );

        for ((linear, db), &freq) in linear.iter_mut().zip(db.iter_mut()).zip(&self.frequencies) {
            let magnitude = coeffs.magnitude_at(freq, self.sample_rate);
            *linear = magnitude as f64;
            *db = 20.0 * magnitude.max(1e-30).log10();
        }
    }

    fn rebuild_aggregate(&mut self) {
        for (point, out) in self.aggregate_db.iter_mut().enumerate() {
            let mut product = 1.0f64;
            for band in &self.band_linear {
                product *= band[point];
            }
            *out = 20.0 * (product.max(1e-60)).log10() as f32;
        }
    }
}
