//! The host-facing compressor.
//!
//! [`CompressorProcessor`] connects a [`CompressorEngine`] to a shared
//! [`CompressorParams`] store. Once per buffer it drains any pushed
//! parameter updates, reads the store, and refreshes the smoothing
//! coefficients if the attack or release time changed.

use crate::dsp::{CompressorConfig, CompressorEngine, Effect};
use crate::params::{CompressorParams, ParameterSnapshot, ParameterUpdate};
use crate::prelude::*;
use std::sync::Arc;
use tracing::info;

/// A [`CompressorEngine`] driven by a shared [`CompressorParams`] store,
/// implementing [`Effect`] for a host.
///
/// Nothing on the processing path logs or allocates; logging is limited to
/// configuration and playback transitions.
#[derive(Clone, Debug)]
pub struct CompressorProcessor {
    engine: CompressorEngine,
    params: Arc<CompressorParams>,

    /// Scratch space holding one frame of the active channels.
    frame: Vec<f64>,

    /// Parameter updates pushed from a control context.
    updates: Option<CCReceiver<ParameterUpdate>>,

    /// The `(attack, release)` times, in ms, that the engine's coefficients
    /// were last computed from.
    coeff_times_ms: Option<(f64, f64)>,

    is_playing: bool,
}

impl CompressorProcessor {
    pub fn new(config: CompressorConfig, params: Arc<CompressorParams>) -> Self {
        let engine = CompressorEngine::new(config);
        let frame = vec![0.0; engine.num_channels()];

        let mut s = Self {
            engine,
            params,
            frame,

            updates: None,
            coeff_times_ms: None,

            is_playing: false,
        };

        let snapshot = s.params.snapshot();
        s.refresh_coefficients(&snapshot);
        s
    }

    /// Attaches the receiving end of an [`update_channel()`][crate::params::update_channel].
    pub fn with_update_receiver(
        mut self,
        receiver: CCReceiver<ParameterUpdate>,
    ) -> Self {
        self.updates = Some(receiver);
        self
    }

    pub fn params(&self) -> &Arc<CompressorParams> {
        &self.params
    }

    pub fn engine(&self) -> &CompressorEngine {
        &self.engine
    }

    /// The smoothed gain change currently applied to `channel`, in decibels.
    pub fn gain_reduction_db(&self, channel: usize) -> f64 {
        self.engine.gain_reduction_db(channel)
    }

    /// The compressor produces no output after its input stops.
    pub fn tail_length_secs(&self) -> f64 {
        0.0
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// Notifies the processor that playback started or stopped. Either
    /// transition resets the envelope, so no gain reduction is carried
    /// across the discontinuity.
    pub fn set_playing(&mut self, playing: bool) {
        if playing == self.is_playing {
            return;
        }

        info!(playing, "playback state changed, resetting envelope");
        self.is_playing = playing;
        self.engine.reset();
    }

    /// Processes an interleaved buffer of `num_channels` channels in-place.
    /// A trailing partial frame is left untouched.
    pub fn process_interleaved(
        &mut self,
        buffer: &mut [f64],
        num_channels: usize,
    ) {
        if num_channels == 0 {
            return;
        }

        let ParameterSnapshot { threshold_db, ratio, .. } = self.begin_buffer();
        let active = self.engine.num_channels().min(num_channels);

        for frame in buffer.chunks_exact_mut(num_channels) {
            let (active_samples, extra_samples) = frame.split_at_mut(active);

            self.engine.process_frame(active_samples, threshold_db, ratio);
            extra_samples.fill(0.0);
        }

        self.engine.flush_denormals();
    }

    /// Applies pending updates and returns the values to use for this
    /// buffer. Nothing here logs, as it runs on the audio thread.
    fn begin_buffer(&mut self) -> ParameterSnapshot {
        if let Some(rx) = &self.updates {
            for update in rx.try_iter() {
                self.params.apply(update);
            }
        }

        let snapshot = self.params.snapshot();
        self.refresh_coefficients(&snapshot);

        snapshot
    }

    fn refresh_coefficients(&mut self, snapshot: &ParameterSnapshot) {
        let times = (snapshot.attack_ms, snapshot.release_ms);
        if self.coeff_times_ms == Some(times) {
            return;
        }

        // the store only holds in-range times, so this cannot fail
        if self
            .engine
            .update_coefficients(snapshot.attack_secs(), snapshot.release_secs())
            .is_ok()
        {
            self.coeff_times_ms = Some(times);
        }
    }
}

impl Effect for CompressorProcessor {
    fn configure(&mut self, sample_rate: f64) -> Result<()> {
        self.engine.configure(sample_rate)
    }

    fn reset(&mut self) {
        self.engine.reset();
    }

    /// Channels beyond the engine's channel count are cleared.
    fn process_buffer(&mut self, channels: &mut [&mut [f64]], num_samples: usize) {
        let ParameterSnapshot { threshold_db, ratio, .. } = self.begin_buffer();

        let num_samples =
            channels.iter().fold(num_samples, |n, ch| n.min(ch.len()));
        let active = self.engine.num_channels().min(channels.len());
        let (active_channels, extra_channels) = channels.split_at_mut(active);

        for ch in extra_channels.iter_mut() {
            ch[..num_samples].fill(0.0);
        }

        let frame = &mut self.frame[..active];

        for i in 0..num_samples {
            for (x, ch) in frame.iter_mut().zip(active_channels.iter()) {
                *x = ch[i];
            }

            self.engine.process_frame(frame, threshold_db, ratio);

            for (ch, &x) in active_channels.iter_mut().zip(frame.iter()) {
                ch[i] = x;
            }
        }

        self.engine.flush_denormals();
    }

    /// Channels beyond the engine's channel count output silence.
    fn process_mono(&mut self, input: f64, channel_idx: usize) -> f64 {
        if channel_idx >= self.engine.num_channels() {
            return 0.0;
        }

        let snapshot = self.params.snapshot();
        self.refresh_coefficients(&snapshot);

        self.engine.process_sample(
            channel_idx,
            input,
            snapshot.threshold_db,
            snapshot.ratio,
        )
    }

    fn get_sample_rate(&self) -> f64 {
        self.engine.sample_rate()
    }

    fn get_identifier(&self) -> &str {
        "compressor"
    }
}
