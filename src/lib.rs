//! Multi-band dynamic equalizer core.
//!
//! Each band pairs a second-order parametric filter with an envelope-driven
//! gain-reduction stage: when the detector rises past the band's threshold,
//! the filter gain is pulled down according to the compression ratio, so a
//! boost ducks and a cut deepens as the signal gets louder. Bands run as a
//! fixed-order cascade, each filtering the previous band's output.
//!
//! Around the cascade sit the observability pieces: lock-free pre/post
//! spectrum taps ([`dsp::spectrum`]), per-band gain-reduction meters
//! ([`meters::AtomicF32`] cells shared by `Arc`), and a change-driven
//! frequency-response cache ([`dsp::curve`]) that turns band state into
//! displayable curves.
//!
//! [`DynamicEqProcessor`] ties it together for block-based hosts;
//! [`EqualizerEngine`] is the cascade alone for callers that bring their own
//! analysis.

pub mod dsp;
pub mod meters;
pub mod params;
pub mod presets;
pub mod processor;

pub use dsp::{
    BandProcessor, Biquad, BiquadCoefficients, CurveCache, CurveConfig, EnvelopeFollower,
    EqualizerEngine, SpectrumInput, SpectrumOutput, SpectrumSmoother, DEFAULT_ACTIVE_BANDS,
    MAX_BANDS,
};
pub use meters::AtomicF32;
pub use params::{BandParams, FilterType};
pub use presets::EqPreset;
pub use processor::DynamicEqProcessor;
