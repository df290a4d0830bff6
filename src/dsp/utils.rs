pub const DB_FLOOR: f32 = -100.0;

pub fn db_to_gain(db: f32) -> f32 {
    (10.0f32).powf(db / 20.0)
}

/// Linear gain to dB with a floor. Zero and negative inputs land on the floor
/// instead of producing -inf/NaN.
pub fn gain_to_db(gain: f32, floor_db: f32) -> f32 {
    if gain > 0.0 {
        (20.0 * gain.log10()).max(floor_db)
    } else {
        floor_db
    }
}

/// One-pole smoothing coefficient for a time constant in milliseconds.
pub fn time_constant_coeff(time_ms: f32, sample_rate: f32) -> f32 {
    if sample_rate <= 0.0 || time_ms <= 0.0 {
        return 0.0;
    }
    (-1.0 / (sample_rate * time_ms * 0.001)).exp()
}

/// Linear remap of `v` from [in_min, in_max] to [0, 1], clamped.
pub fn normalize_range(v: f32, in_min: f32, in_max: f32) -> f32 {
    let span = in_max - in_min;
    if span <= 0.0 {
        return 0.0;
    }
    ((v - in_min) / span).clamp(0.0, 1.0)
}
