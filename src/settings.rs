//! Crate-wide constants, parameter ranges and defaults.

/// The sample rate assumed until the host calls `configure()`.
pub const DEFAULT_SAMPLE_RATE: f64 = 44100.0;

/// The default number of audio channels (stereo).
pub const NUM_CHANNELS: usize = 2;

/// The level, in decibels, reported for any amplitude below
/// [`MINUS_INFINITY_GAIN`].
pub const MINUS_INFINITY_DB: f64 = -120.0;

/// The linear amplitude below which a signal is treated as silence.
pub const MINUS_INFINITY_GAIN: f64 = 1e-6;

/// The smallest attack or release time accepted by the envelope follower, in
/// seconds. Shorter times (including `0.0`) are raised to this value.
pub const MIN_TIME_SECS: f64 = 1e-6;

/// Values with a magnitude below this are flushed to zero at the end of each
/// processed buffer.
pub const DENORMAL_THRESHOLD: f64 = 1e-20;

/// `ln(9)`, used by the attack/release coefficients. After one time constant
/// the envelope has covered `8/9` of a step.
pub const TIME_CONSTANT_LOG: f64 = 2.197_224_577_336_219_6; // ln(9)

/// The capacity of the parameter update channel. A control context which
/// sends faster than buffers are processed will see `try_send` fail.
pub const PARAM_UPDATE_QUEUE_SIZE: usize = 64;

// *** Parameter ranges *** //

pub const THRESHOLD_MIN_DB: f64 = -32.0;
pub const THRESHOLD_MAX_DB: f64 = 0.0;
pub const DEFAULT_THRESHOLD_DB: f64 = 0.0;

pub const RATIO_MIN: f64 = 1.0;
pub const RATIO_MAX: f64 = 20.0;
pub const DEFAULT_RATIO: f64 = 1.0;

pub const ATTACK_MIN_MS: f64 = 0.0;
pub const ATTACK_MAX_MS: f64 = 500.0;
pub const DEFAULT_ATTACK_MS: f64 = 20.0;

pub const RELEASE_MIN_MS: f64 = 0.0;
pub const RELEASE_MAX_MS: f64 = 500.0;
pub const DEFAULT_RELEASE_MS: f64 = 20.0;
