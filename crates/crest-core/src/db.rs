//! Decibel/gain conversions with the engine's silence floor

/// Floor for decibel conversions. Levels at or below this are treated as
/// silence throughout the engine.
pub const MIN_DB: f64 = -100.0;

/// Convert a linear gain to decibels, flooring at [`MIN_DB`].
///
/// Zero and negative gains map to the floor rather than −∞, so envelope
/// values can be converted without poisoning downstream math.
#[inline]
pub fn gain_to_db(gain: f64) -> f64 {
    if gain > 0.0 {
        (20.0 * gain.log10()).max(MIN_DB)
    } else {
        MIN_DB
    }
}

/// Convert decibels to linear gain. Values at or below [`MIN_DB`] map to 0.
#[inline]
pub fn db_to_gain(db: f64) -> f64 {
    if db > MIN_DB {
        10.0_f64.powf(db / 20.0)
    } else {
        0.0
    }
}
