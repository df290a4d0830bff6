//! Lock-free spectrum capture and FFT pipeline.
//!
//! The producer half lives on the audio thread: it keeps the last `FFT_SIZE`
//! samples in a ring buffer and, every `HOP_SIZE` samples, publishes the
//! oldest-to-newest window through a triple buffer. Publication is
//! last-write-wins: an unread window is replaced, never queued, and the
//! consumer copy can never tear because reader and writer always hold
//! distinct slots.
//!
//! The consumer half runs at display rate: it fetches the latest window,
//! applies a Hann window, runs a magnitude-only forward transform, scales by
//! 1/`FFT_SIZE` and maps each bin from dB into [0, 1] for direct display.
//! This is a best-effort pipeline with no backpressure; windows that arrive
//! while the consumer sleeps are simply dropped.

use std::f32::consts::TAU;
use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use triple_buffer::TripleBuffer;

use crate::dsp::utils::{gain_to_db, normalize_range, DB_FLOOR};

/// 4096-point FFT.
pub const FFT_ORDER: usize = 12;
pub const FFT_SIZE: usize = 1 << FFT_ORDER;
/// New analysis window every 512 input samples (~86 captures/sec at 44.1k).
pub const HOP_SIZE: usize = 512;
/// Usable half of the magnitude spectrum.
pub const SPECTRUM_BINS: usize = FFT_SIZE / 2;

/// dB range mapped onto [0, 1] for display.
pub const DEFAULT_MIN_DB: f32 = DB_FLOOR;
pub const DEFAULT_MAX_DB: f32 = 0.0;

/// Display-side smoothing coefficients: fast rise, lingering decay.
const SMOOTH_ATTACK: f32 = 0.20;
const SMOOTH_RELEASE: f32 = 0.55;

type SpectrumWindow = [f32; FFT_SIZE];

/// Create a connected producer/consumer pair.
pub fn spectrum_channel() -> (SpectrumInput, SpectrumOutput) {
    let (tx, rx) = TripleBuffer::new(&[0.0f32; FFT_SIZE]).split();
    (SpectrumInput::new(tx), SpectrumOutput::new(rx))
}

/// Audio-thread half: sample accumulation and window publication.
/// No allocation or locking after construction.
pub struct SpectrumInput {
    ring: Box<SpectrumWindow>,
    capture: Box<SpectrumWindow>,
    write_pos: usize,
    hop_counter: usize,
    tx: triple_buffer::Input<SpectrumWindow>,
}

impl SpectrumInput {
    fn new(tx: triple_buffer::Input<SpectrumWindow>) -> Self {
        Self {
            ring: Box::new([0.0; FFT_SIZE]),
            capture: Box::new([0.0; FFT_SIZE]),
            write_pos: 0,
            hop_counter: 0,
            tx,
        }
    }

    /// Append mono samples; publishes a snapshot every [`HOP_SIZE`] samples.
    pub fn push_samples(&mut self, samples: &[f32]) {
        for &sample in samples {
            self.ring[self.write_pos] = sample;
            // FFT_SIZE is a power of two, bit-mask wraparound is safe.
            self.write_pos = (self.write_pos + 1) & (FFT_SIZE - 1);
            self.hop_counter += 1;

            if self.hop_counter >= HOP_SIZE {
                self.hop_counter = 0;
                // write_pos now points at the oldest slot: unroll the ring
                // into capture order before publishing.
                for (j, slot) in self.capture.iter_mut().enumerate() {
                    *slot = self.ring[(self.write_pos + j) & (FFT_SIZE - 1)];
                }
                self.tx.write(*self.capture);
            }
        }
    }

    pub fn reset(&mut self) {
        self.ring.fill(0.0);
        self.write_pos = 0;
        self.hop_counter = 0;
    }
}

/// Display-thread half: FFT extraction and normalization.
pub struct SpectrumOutput {
    rx: triple_buffer::Output<SpectrumWindow>,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    work: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    min_db: f32,
    max_db: f32,
}

impl SpectrumOutput {
    fn new(rx: triple_buffer::Output<SpectrumWindow>) -> Self {
        let fft = FftPlanner::new().plan_fft_forward(FFT_SIZE);
        let scratch = vec![Complex::default(); fft.get_inplace_scratch_len()];

        // Hann window, computed once.
        let window = (0..FFT_SIZE)
            .map(|n| 0.5 - 0.5 * (TAU * n as f32 / (FFT_SIZE - 1) as f32).cos())
            .collect();

        Self {
            rx,
            fft,
            window,
            work: vec![Complex::default(); FFT_SIZE],
            scratch,
            min_db: DEFAULT_MIN_DB,
            max_db: DEFAULT_MAX_DB,
        }
    }

    /// Change the dB range mapped onto [0, 1].
    pub fn set_db_range(&mut self, min_db: f32, max_db: f32) {
        if max_db > min_db {
            self.min_db = min_db;
            self.max_db = max_db;
        }
    }

    /// Non-destructive peek: has the producer published since the last
    /// `process_fft`?
    pub fn is_new_data_available(&self) -> bool {
        self.rx.updated()
    }

    /// Transform the latest published window into `magnitudes` (normalized
    /// [0, 1], `SPECTRUM_BINS` values). Returns false, leaving `magnitudes`
    /// untouched, when no new window has been published.
    pub fn process_fft(&mut self, magnitudes: &mut [f32]) -> bool {
        assert_eq!(magnitudes.len(), SPECTRUM_BINS);

        // Fetch-and-clear: a stale window is never processed twice.
        if !self.rx.updated() {
            return false;
        }
        let snapshot = self.rx.read();
        for ((w, &s), &win) in self.work.iter_mut().zip(snapshot.iter()).zip(&self.window) {
            *w = Complex::new(s * win, 0.0);
        }

        self.fft.process_with_scratch(&mut self.work, &mut self.scratch);

        let scale = 1.0 / FFT_SIZE as f32;
        for (out, bin) in magnitudes.iter_mut().zip(self.work.iter()) {
            let db = gain_to_db(bin.norm() * scale, self.min_db);
            *out = normalize_range(db, self.min_db, self.max_db);
        }
        true
    }
}

/// Per-tick asymmetric smoother for displayed spectra: rises fast, decays
/// slowly, like a peak program meter.
pub struct SpectrumSmoother {
    attack: f32,
    release: f32,
    state: Vec<f32>,
}

impl Default for SpectrumSmoother {
    fn default() -> Self {
        Self::new()
    }
}

impl SpectrumSmoother {
    pub fn new() -> Self {
        Self::with_coeffs(SMOOTH_ATTACK, SMOOTH_RELEASE)
    }

    /// Coefficients are per-tick retention factors in [0, 1); smaller means
    /// faster tracking.
    pub fn with_coeffs(attack: f32, release: f32) -> Self {
        Self {
            attack: attack.clamp(0.0, 0.9999),
            release: release.clamp(0.0, 0.9999),
            state: vec![0.0; SPECTRUM_BINS],
        }
    }

    pub fn smooth(&mut self, fresh: &[f32]) -> &[f32] {
        for (state, &new) in self.state.iter_mut().zip(fresh.iter()) {
            let coeff = if new > *state {
                self.attack
            } else {
                self.release
            };
            *state = coeff * *state + (1.0 - coeff) * new;
        }
        &self.state
    }

    pub fn reset(&mut self) {
        self.state.fill(0.0);
    }
}
