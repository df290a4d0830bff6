//! Lock-free telemetry cells shared between the audio thread and readers.
//!
//! A single f32 published through an `AtomicU32` bit pattern is tear-free on
//! its own; no ordering is needed between separate meter updates, so all
//! accesses are `Relaxed`.

use std::sync::atomic::{AtomicU32, Ordering};

/// Atomic f32 storage built on `AtomicU32::to_bits`.
#[derive(Debug, Default)]
pub struct AtomicF32(AtomicU32);

impl AtomicF32 {
    pub fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    #[inline]
    pub fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }

    #[inline]
    pub fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn round_trips_values() {
        let cell = AtomicF32::new(0.0);
        for &v in &[0.0, -7.5, 3.25, f32::MIN_POSITIVE, 1e6] {
            cell.store(v);
            assert_eq!(cell.load(), v);
        }
    }

    #[test]
    fn readable_from_another_thread() {
        let cell = Arc::new(AtomicF32::new(0.0));
        let writer = Arc::clone(&cell);
        let handle = std::thread::spawn(move || writer.store(7.5));
        handle.join().unwrap();
        assert_eq!(cell.load(), 7.5);
    }
}
