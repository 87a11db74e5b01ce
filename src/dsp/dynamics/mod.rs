//! Module for dynamics processors.

use super::*;

pub mod ballistics;
pub mod compressor;

pub use ballistics::GainBallistics;
pub use compressor::{CompressorConfig, CompressorEngine, DetectionTopology};
