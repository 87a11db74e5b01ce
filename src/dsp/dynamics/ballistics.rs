//! Gain ballistics, used to smooth the compressor's gain reduction.

use crate::prelude::*;

/// A one-pole envelope follower for gain changes in decibels, with separate
/// attack and release time constants.
///
/// Each time constant is the time taken to cover `8/9` (~90%) of a step in
/// the target value.
#[derive(Clone, Debug)]
pub struct GainBallistics {
    /// The last smoothed gain change for each state slot, in decibels.
    y_old: Vec<f64>,

    /// The attack smoothing coefficient.
    alpha_attack: f64,
    /// The release smoothing coefficient.
    alpha_release: f64,

    attack_secs: f64,
    release_secs: f64,

    /// Whether all channels share the first state slot.
    linked: bool,

    /// The internal sample rate.
    sample_rate: f64,
}

impl GainBallistics {
    /// Creates a new `GainBallistics` which stores state for `num_channels`
    /// channels, or a single shared state if `linked` is `true`.
    pub fn new(num_channels: usize, sample_rate: f64, linked: bool) -> Self {
        let num_slots = if linked { 1 } else { num_channels.max(1) };

        let mut s = Self {
            y_old: vec![0.0; num_slots],

            alpha_attack: 0.0,
            alpha_release: 0.0,

            attack_secs: ms_to_secs(DEFAULT_ATTACK_MS),
            release_secs: ms_to_secs(DEFAULT_RELEASE_MS),

            linked,
            sample_rate,
        };

        s.recalculate();
        s
    }

    /// Resets the internal state to `0.0` dB (no gain change).
    pub fn reset(&mut self) {
        self.y_old.iter_mut().for_each(|x| *x = 0.0);
    }

    /// Sets the sample rate and recomputes both coefficients. The smoothed
    /// state is kept.
    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        debug_assert!(sample_rate > 0.0);
        self.sample_rate = sample_rate;
        self.recalculate();
    }

    /// Sets the attack and release times in seconds and recomputes both
    /// coefficients.
    ///
    /// Times shorter than [`MIN_TIME_SECS`] are raised to it.
    pub fn set_times(&mut self, attack_secs: f64, release_secs: f64) {
        debug_assert!(attack_secs.is_sign_positive());
        debug_assert!(release_secs.is_sign_positive());

        self.attack_secs = attack_secs.max(MIN_TIME_SECS);
        self.release_secs = release_secs.max(MIN_TIME_SECS);
        self.recalculate();
    }

    /// Returns the `(attack, release)` coefficients.
    pub fn coefficients(&self) -> (f64, f64) {
        (self.alpha_attack, self.alpha_release)
    }

    /// Returns the smoothed gain change currently held for `channel`, in
    /// decibels.
    pub fn current(&self, channel: usize) -> f64 {
        self.y_old[self.slot(channel)]
    }

    /// Smooths `target_db` towards the state of `channel`, returning the new
    /// smoothed value.
    ///
    /// The attack coefficient is used when `target_db` asks for more gain
    /// reduction than is currently applied, otherwise the release coefficient
    /// is used.
    #[inline]
    pub fn process(&mut self, target_db: f64, channel: usize) -> f64 {
        let slot = self.slot(channel);
        let prev = self.y_old[slot];

        let alpha = if target_db < prev {
            self.alpha_attack
        }
        else {
            self.alpha_release
        };

        let out = (1.0 - alpha).mul_add(target_db, alpha * prev);
        self.y_old[slot] = out;

        out
    }

    /// Flushes any near-zero state to exactly `0.0`.
    pub fn flush_denormals(&mut self) {
        self.y_old.iter_mut().for_each(|x| *x = flush_denormal(*x));
    }

    #[inline]
    fn slot(&self, channel: usize) -> usize {
        if self.linked {
            0
        }
        else {
            debug_assert!(channel < self.y_old.len());
            channel
        }
    }

    fn recalculate(&mut self) {
        self.alpha_attack =
            Self::calculate_coefficient(self.sample_rate, self.attack_secs);
        self.alpha_release =
            Self::calculate_coefficient(self.sample_rate, self.release_secs);
    }

    /// Calculates the smoothing coefficient for a time constant of
    /// `time_secs` at `sample_rate`.
    fn calculate_coefficient(sample_rate: f64, time_secs: f64) -> f64 {
        (-TIME_CONSTANT_LOG / (sample_rate * time_secs.max(MIN_TIME_SECS)))
            .exp()
    }
}
