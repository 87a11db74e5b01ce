//! Module for signal compression (dynamics compression).

use super::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Where the compressor measures the level it reacts to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetectionTopology {
    #[default]
    /// Detects the level of the current input sample.
    FeedForward,
    /// Detects the level of the previous output sample of the same channel.
    Feedback,
}

/// Structural options for a [`CompressorEngine`], fixed at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressorConfig {
    /// The number of channels the engine holds state for.
    pub num_channels: usize,
    /// Whether every channel shares a single smoothed gain state.
    pub linked_channels: bool,
    /// The level detection topology.
    pub topology: DetectionTopology,
}

impl CompressorConfig {
    pub fn with_channels(mut self, num_channels: usize) -> Self {
        self.num_channels = num_channels;
        self
    }

    pub fn with_linked_channels(mut self, linked: bool) -> Self {
        self.linked_channels = linked;
        self
    }

    pub fn with_topology(mut self, topology: DetectionTopology) -> Self {
        self.topology = topology;
        self
    }
}

impl Default for CompressorConfig {
    fn default() -> Self {
        Self {
            num_channels: NUM_CHANNELS,
            linked_channels: false,
            topology: DetectionTopology::FeedForward,
        }
    }
}

/// A hard-knee dynamics compressor with smoothed attack and release.
///
/// The engine itself does not own its threshold and ratio; they are passed
/// to [`process_sample()`][Self::process_sample] so that they may change
/// between any two samples.
#[derive(Clone, Debug)]
pub struct CompressorEngine {
    sample_rate: f64,
    config: CompressorConfig,

    envelope: GainBallistics,

    /// The last output sample of each channel, for feedback detection.
    y_prev: Vec<f64>,
}

impl CompressorEngine {
    /// Creates a new engine at [`DEFAULT_SAMPLE_RATE`], with the default
    /// attack and release times.
    pub fn new(config: CompressorConfig) -> Self {
        let num_channels = config.num_channels.max(1);
        let config = config.with_channels(num_channels);

        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            config,

            envelope: GainBallistics::new(
                num_channels,
                DEFAULT_SAMPLE_RATE,
                config.linked_channels,
            ),

            y_prev: vec![0.0; num_channels],
        }
    }

    /// Records the sample rate and recomputes the smoothing coefficients.
    /// The envelope state is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`CompressorError::InvalidParameter`] if `sample_rate` is not
    /// a finite, positive value.
    pub fn configure(&mut self, sample_rate: f64) -> Result<()> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(CompressorError::InvalidParameter {
                name: "sample rate",
                value: sample_rate,
            });
        }

        self.sample_rate = sample_rate;
        self.envelope.set_sample_rate(sample_rate);

        debug!(
            sample_rate,
            num_channels = self.config.num_channels,
            "compressor configured"
        );

        Ok(())
    }

    /// Clears the smoothed gain state and the previous output samples of
    /// every channel.
    pub fn reset(&mut self) {
        self.envelope.reset();
        self.y_prev.iter_mut().for_each(|x| *x = 0.0);
    }

    /// Recomputes the attack and release coefficients for the given times in
    /// seconds. A time of `0.0` makes the envelope jump straight to its
    /// target.
    ///
    /// # Errors
    ///
    /// Returns [`CompressorError::InvalidParameter`] if either time is
    /// negative or not finite. Neither coefficient is changed in that case.
    pub fn update_coefficients(
        &mut self,
        attack_secs: f64,
        release_secs: f64,
    ) -> Result<()> {
        let attack_secs = validate_time("attack time", attack_secs)?;
        let release_secs = validate_time("release time", release_secs)?;

        self.envelope.set_times(attack_secs, release_secs);

        Ok(())
    }

    /// Compresses one sample of `channel`.
    ///
    /// With linked channels every call advances the shared envelope, so a
    /// multichannel signal should go through
    /// [`process_frame()`][Self::process_frame] instead.
    #[inline]
    pub fn process_sample(
        &mut self,
        channel: usize,
        input: f64,
        threshold_db: f64,
        ratio: f64,
    ) -> f64 {
        debug_assert!(channel < self.y_prev.len());

        let x_db = self.detect_db(channel, input);
        let gain_change_db = Self::gain_function(x_db, threshold_db, ratio);
        let gain_smooth = self.envelope.process(gain_change_db, channel);

        self.apply_gain(channel, input, gain_smooth)
    }

    /// Compresses one frame in-place, holding one sample for each of the
    /// first `frame.len()` channels.
    ///
    /// With linked channels the shared envelope advances once per frame,
    /// towards the largest gain reduction asked for by any channel, and the
    /// result is applied to every channel.
    #[inline]
    pub fn process_frame(
        &mut self,
        frame: &mut [f64],
        threshold_db: f64,
        ratio: f64,
    ) {
        debug_assert!(frame.len() <= self.y_prev.len());

        if !self.config.linked_channels {
            for (ch, sample) in frame.iter_mut().enumerate() {
                *sample = self.process_sample(ch, *sample, threshold_db, ratio);
            }
            return;
        }

        if frame.is_empty() {
            return;
        }

        let gain_change_db = frame
            .iter()
            .enumerate()
            .map(|(ch, &x)| {
                Self::gain_function(self.detect_db(ch, x), threshold_db, ratio)
            })
            .fold(0.0, f64::min);
        let gain_smooth = self.envelope.process(gain_change_db, 0);

        for (ch, sample) in frame.iter_mut().enumerate() {
            *sample = self.apply_gain(ch, *sample, gain_smooth);
        }
    }

    /// The hard-knee static characteristic. Returns the gain change, in
    /// decibels, for a detected level of `input_db`; this is never positive.
    ///
    /// Ratios below `1.0` (and NaN) are treated as `1.0`.
    pub fn gain_function(input_db: f64, threshold_db: f64, ratio: f64) -> f64 {
        if input_db >= threshold_db {
            (ratio.max(1.0).recip() - 1.0) * (input_db - threshold_db)
        }
        else {
            0.0
        }
    }

    /// The smoothed gain change currently applied to `channel`, in decibels.
    pub fn gain_reduction_db(&self, channel: usize) -> f64 {
        self.envelope.current(channel)
    }

    /// Returns the `(attack, release)` smoothing coefficients.
    pub fn coefficients(&self) -> (f64, f64) {
        self.envelope.coefficients()
    }

    /// Flushes near-zero envelope and feedback state to zero. Intended to be
    /// called once per buffer, not per sample.
    pub fn flush_denormals(&mut self) {
        self.envelope.flush_denormals();
        self.y_prev.iter_mut().for_each(|x| *x = flush_denormal(*x));
    }

    pub fn num_channels(&self) -> usize {
        self.config.num_channels
    }

    pub fn config(&self) -> &CompressorConfig {
        &self.config
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// The detected level of `channel`, in decibels.
    #[inline]
    fn detect_db(&self, channel: usize, input: f64) -> f64 {
        let x_uni = match self.config.topology {
            DetectionTopology::FeedForward => input.abs(),
            DetectionTopology::Feedback => self.y_prev[channel].abs(),
        };

        level_to_db(x_uni)
    }

    #[inline]
    fn apply_gain(&mut self, channel: usize, input: f64, gain_db: f64) -> f64 {
        let output = db_to_level(gain_db) * input;
        self.y_prev[channel] = output;

        output
    }
}

impl Default for CompressorEngine {
    fn default() -> Self {
        Self::new(CompressorConfig::default())
    }
}

fn validate_time(name: &'static str, time_secs: f64) -> Result<f64> {
    if time_secs.is_finite() && time_secs >= 0.0 {
        Ok(time_secs.max(MIN_TIME_SECS))
    }
    else {
        Err(CompressorError::InvalidParameter { name, value: time_secs })
    }
}
