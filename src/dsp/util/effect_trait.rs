//! Trait for audio-processing types.

use crate::error::Result;

/// The host-facing interface of an audio effect.
///
/// Hosts call [`configure()`][Effect::configure] once per playback session,
/// [`reset()`][Effect::reset] on playback discontinuities, and
/// [`process_buffer()`][Effect::process_buffer] once per audio buffer.
pub trait Effect: dyn_clone::DynClone + Send + std::fmt::Debug {
    /// Prepares the effect for `sample_rate`. Does not clear any running state.
    fn configure(&mut self, sample_rate: f64) -> Result<()>;

    /// Clears all running state.
    fn reset(&mut self);

    /// Processes the first `num_samples` samples of each channel in-place.
    /// `channels` is planar: one slice per channel.
    fn process_buffer(&mut self, channels: &mut [&mut [f64]], num_samples: usize);

    /// Optional method to process a single sample of audio.
    fn process_mono(&mut self, input: f64, _channel_idx: usize) -> f64 {
        input
    }

    /// Required method to obtain the sample rate of the processor.
    fn get_sample_rate(&self) -> f64;

    /// Required method to obtain the name of the effect processor.
    fn get_identifier(&self) -> &str;
}

// This is used to allow `dyn Effect` trait objects to implement clone.
dyn_clone::clone_trait_object!(Effect);
