//! Digital signal processors and utilities.

use crate::prelude::*;

pub mod dynamics;
pub mod util;

pub use dynamics::{
    CompressorConfig, CompressorEngine, DetectionTopology, GainBallistics,
};
pub use util::*;
