#![allow(
    clippy::module_name_repetitions,
    clippy::wildcard_imports,
    clippy::return_self_not_must_use,
    clippy::redundant_closure_for_method_calls
)]

// Signal processing
pub mod dsp;

// Control parameters and persisted state
pub mod params;

// The host-facing processor
pub mod processor;

// Configuration and parameter errors
pub mod error;

// General utilities
pub mod util;

// Some widely-used re-exports
pub mod prelude;

// Crate-wide settings
pub mod settings;

pub use dsp::{CompressorConfig, CompressorEngine, DetectionTopology, Effect};
pub use error::CompressorError;
pub use params::{
    update_channel, CompressorParams, ParamId, ParameterSnapshot,
    ParameterUpdate,
};
pub use processor::CompressorProcessor;
