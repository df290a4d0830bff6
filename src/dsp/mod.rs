//! Signal-processing core: filters, dynamics, the band cascade, and the
//! analysis pipelines that feed a display.

pub mod band;
pub mod biquad;
pub mod coefficients;
pub mod curve;
pub mod engine;
pub mod envelope;
pub mod spectrum;
pub mod utils;

pub use band::BandProcessor;
pub use biquad::Biquad;
pub use coefficients::BiquadCoefficients;
pub use curve::{CurveCache, CurveConfig};
pub use engine::{EqualizerEngine, DEFAULT_ACTIVE_BANDS, MAX_BANDS};
pub use envelope::EnvelopeFollower;
pub use spectrum::{
    spectrum_channel, SpectrumInput, SpectrumOutput, SpectrumSmoother, FFT_SIZE, HOP_SIZE,
    SPECTRUM_BINS,
};
