//! The compressor's control parameters.
//!
//! [`CompressorParams`] holds the four parameters in atomic cells, so a
//! control context may write them while the audio thread reads them. Reads
//! and writes are atomic per value; there is no snapshot across values.

pub mod state;
pub mod types;

pub use types::*;

use crate::prelude::*;
use std::sync::Arc;
use tracing::warn;

/// Creates a bounded channel for pushing [`ParameterUpdate`]s to a
/// processor.
pub fn update_channel() -> (CCSender<ParameterUpdate>, CCReceiver<ParameterUpdate>)
{
    bounded_channel(PARAM_UPDATE_QUEUE_SIZE)
}

/// The parameter store shared between the control context and the audio
/// thread.
#[derive(Debug)]
pub struct CompressorParams {
    threshold_db: AtomicF64,
    ratio: AtomicF64,
    attack_ms: AtomicF64,
    release_ms: AtomicF64,
}

impl CompressorParams {
    /// Creates a parameter store holding the default values.
    pub fn new() -> Self {
        Self::from_snapshot(ParameterSnapshot::default())
    }

    /// Creates a parameter store from `snapshot`, clamping any out-of-range
    /// values.
    pub fn from_snapshot(snapshot: ParameterSnapshot) -> Self {
        let s = Self {
            threshold_db: AtomicF64::new(DEFAULT_THRESHOLD_DB),
            ratio: AtomicF64::new(DEFAULT_RATIO),
            attack_ms: AtomicF64::new(DEFAULT_ATTACK_MS),
            release_ms: AtomicF64::new(DEFAULT_RELEASE_MS),
        };
        s.store_snapshot(&snapshot);
        s
    }

    /// Creates a new shared parameter store holding the default values.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Returns the current value of `id`.
    pub fn get(&self, id: ParamId) -> f64 {
        self.cell(id).lr()
    }

    /// Sets `id` to `value`, returning the value actually stored.
    ///
    /// Values outside of the parameter's range are clamped to it (or replaced
    /// by the default if NaN), and a warning is logged.
    pub fn set(&self, id: ParamId, value: f64) -> f64 {
        let range = id.range();
        let value = range.validate(id, value).unwrap_or_else(|e| {
            let clamped = range.clamp(value);
            warn!(error = %e, clamped, "clamping parameter");
            clamped
        });

        self.cell(id).sr(value);
        value
    }

    /// Applies a pushed parameter update, returning the value actually
    /// stored. Out-of-range values are clamped as in [`set()`][Self::set],
    /// but nothing is logged, so this is safe to call from the audio thread.
    pub fn apply(&self, update: ParameterUpdate) -> f64 {
        let id = update.id();
        let value = id.range().clamp(update.value());

        self.cell(id).sr(value);
        value
    }

    /// Reads all four values. Each read is atomic, but a concurrent writer
    /// may change one value between reads.
    pub fn snapshot(&self) -> ParameterSnapshot {
        ParameterSnapshot {
            threshold_db: self.threshold_db.lr(),
            ratio: self.ratio.lr(),
            attack_ms: self.attack_ms.lr(),
            release_ms: self.release_ms.lr(),
        }
    }

    /// Sets all four values from `snapshot`, clamping where needed.
    pub fn store_snapshot(&self, snapshot: &ParameterSnapshot) {
        for id in ParamId::ALL {
            self.set(id, snapshot.get(id));
        }
    }

    /// Restores every parameter to its default.
    pub fn reset_to_defaults(&self) {
        self.store_snapshot(&ParameterSnapshot::default());
    }

    fn cell(&self, id: ParamId) -> &AtomicF64 {
        match id {
            ParamId::Threshold => &self.threshold_db,
            ParamId::Ratio => &self.ratio,
            ParamId::Attack => &self.attack_ms,
            ParamId::Release => &self.release_ms,
        }
    }
}

impl Default for CompressorParams {
    fn default() -> Self {
        Self::new()
    }
}
