//! General-purpose utility functions.

use super::*;

/// Calculates amplitude in decibels from a linear level.
///
/// Any level below [`MINUS_INFINITY_GAIN`] (including `0.0`) maps to exactly
/// [`MINUS_INFINITY_DB`], so the result is never infinite or NaN for finite
/// input.
#[inline]
pub fn level_to_db(level: f64) -> f64 {
    if level < MINUS_INFINITY_GAIN {
        MINUS_INFINITY_DB
    }
    else {
        20.0 * level.log10()
    }
}

/// Calculates the linear level from amplitude as decibels.
#[inline]
pub fn db_to_level(db_value: f64) -> f64 {
    10.0f64.powf(db_value / 20.0)
}

/// Converts a time in milliseconds to seconds.
#[inline]
pub fn ms_to_secs(time_ms: f64) -> f64 {
    time_ms * 0.001
}

/// Returns `0.0` if the magnitude of `value` is below
/// [`DENORMAL_THRESHOLD`], otherwise returns `value` unchanged.
#[inline]
pub fn flush_denormal(value: f64) -> f64 {
    if value.abs() < DENORMAL_THRESHOLD {
        0.0
    }
    else {
        value
    }
}

/// Returns whether `value` and `target` are equal, with a tolerance of
/// [`f64::EPSILON`].
pub fn epsilon_eq(value: f64, target: f64) -> bool {
    (target - value).abs() < f64::EPSILON
}

/// Returns whether the absolute value of `value` is less than the provided
/// `tolerance` value. Useful for checking approximate equality.
pub fn within_tolerance(value: f64, target: f64, tolerance: f64) -> bool {
    (value - target).abs() <= tolerance
}
