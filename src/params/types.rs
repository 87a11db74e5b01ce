//! Parameter identifiers, ranges, snapshots and update messages.

use crate::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use tracing::warn;

/// Identifies one of the compressor's control parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamId {
    /// Level above which compression engages, in dBFS.
    Threshold,
    /// Compression ratio; `1.0` is no compression.
    Ratio,
    /// Attack time in milliseconds.
    Attack,
    /// Release time in milliseconds.
    Release,
}

impl ParamId {
    pub const ALL: [Self; 4] =
        [Self::Threshold, Self::Ratio, Self::Attack, Self::Release];

    /// The key used for this parameter in persisted state.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Threshold => "threshold",
            Self::Ratio => "ratio",
            Self::Attack => "attack",
            Self::Release => "release",
        }
    }

    /// The declared range and default of this parameter.
    pub fn range(&self) -> ParamRange {
        match self {
            Self::Threshold => ParamRange::new(
                THRESHOLD_MIN_DB,
                THRESHOLD_MAX_DB,
                DEFAULT_THRESHOLD_DB,
            ),
            Self::Ratio => ParamRange::new(RATIO_MIN, RATIO_MAX, DEFAULT_RATIO),
            Self::Attack => {
                ParamRange::new(ATTACK_MIN_MS, ATTACK_MAX_MS, DEFAULT_ATTACK_MS)
            }
            Self::Release => ParamRange::new(
                RELEASE_MIN_MS,
                RELEASE_MAX_MS,
                DEFAULT_RELEASE_MS,
            ),
        }
    }
}

impl Display for ParamId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// An inclusive parameter range with a default value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParamRange {
    pub min: f64,
    pub max: f64,
    pub default: f64,
}

impl ParamRange {
    pub const fn new(min: f64, max: f64, default: f64) -> Self {
        Self { min, max, default }
    }

    /// Whether `value` lies within the range. Always `false` for NaN.
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    /// Returns `value` if it lies within the range.
    ///
    /// # Errors
    ///
    /// Returns [`CompressorError::OutOfRangeParameter`] otherwise.
    pub fn validate(&self, id: ParamId, value: f64) -> Result<f64> {
        if self.contains(value) {
            Ok(value)
        }
        else {
            Err(CompressorError::OutOfRangeParameter {
                id,
                value,
                min: self.min,
                max: self.max,
            })
        }
    }

    /// Clamps `value` to the range. NaN is replaced by the default.
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            self.default
        }
        else {
            value.clamp(self.min, self.max)
        }
    }
}

/// A plain copy of all four parameter values.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterSnapshot {
    pub threshold_db: f64,
    pub ratio: f64,
    pub attack_ms: f64,
    pub release_ms: f64,
}

impl ParameterSnapshot {
    pub fn get(&self, id: ParamId) -> f64 {
        match id {
            ParamId::Threshold => self.threshold_db,
            ParamId::Ratio => self.ratio,
            ParamId::Attack => self.attack_ms,
            ParamId::Release => self.release_ms,
        }
    }

    pub fn set(&mut self, id: ParamId, value: f64) {
        match id {
            ParamId::Threshold => self.threshold_db = value,
            ParamId::Ratio => self.ratio = value,
            ParamId::Attack => self.attack_ms = value,
            ParamId::Release => self.release_ms = value,
        }
    }

    /// The attack time in seconds.
    pub fn attack_secs(&self) -> f64 {
        ms_to_secs(self.attack_ms)
    }

    /// The release time in seconds.
    pub fn release_secs(&self) -> f64 {
        ms_to_secs(self.release_ms)
    }
}

impl Default for ParameterSnapshot {
    fn default() -> Self {
        Self {
            threshold_db: DEFAULT_THRESHOLD_DB,
            ratio: DEFAULT_RATIO,
            attack_ms: DEFAULT_ATTACK_MS,
            release_ms: DEFAULT_RELEASE_MS,
        }
    }
}

/// A parameter change pushed from a control context.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParameterUpdate {
    Threshold(f64),
    Ratio(f64),
    Attack(f64),
    Release(f64),
}

impl ParameterUpdate {
    pub fn new(id: ParamId, value: f64) -> Self {
        match id {
            ParamId::Threshold => Self::Threshold(value),
            ParamId::Ratio => Self::Ratio(value),
            ParamId::Attack => Self::Attack(value),
            ParamId::Release => Self::Release(value),
        }
    }

    /// Clamps the value to its parameter's range, logging a warning if it
    /// was out of range. Meant for the control context, before sending.
    pub fn clamped(self) -> Self {
        let id = self.id();
        let range = id.range();

        match range.validate(id, self.value()) {
            Ok(_) => self,
            Err(e) => {
                let clamped = range.clamp(self.value());
                warn!(error = %e, clamped, "clamping parameter update");
                Self::new(id, clamped)
            }
        }
    }

    pub fn id(&self) -> ParamId {
        match self {
            Self::Threshold(_) => ParamId::Threshold,
            Self::Ratio(_) => ParamId::Ratio,
            Self::Attack(_) => ParamId::Attack,
            Self::Release(_) => ParamId::Release,
        }
    }

    pub fn value(&self) -> f64 {
        match *self {
            Self::Threshold(v)
            | Self::Ratio(v)
            | Self::Attack(v)
            | Self::Release(v) => v,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_serialize_as_state_keys() {
        for id in ParamId::ALL {
            let value = serde_json::to_value(id).unwrap();
            assert_eq!(value, serde_json::Value::from(id.key()));
            assert_eq!(serde_json::from_value::<ParamId>(value).unwrap(), id);
        }
    }

    #[test]
    fn snapshot_serializes_field_by_field() {
        let snapshot = ParameterSnapshot {
            threshold_db: -6.5,
            ratio: 3.0,
            attack_ms: 0.5,
            release_ms: 300.0,
        };

        let text = serde_json::to_string(&snapshot).unwrap();
        assert!(text.contains("\"release_ms\":300.0"));
        assert_eq!(
            serde_json::from_str::<ParameterSnapshot>(&text).unwrap(),
            snapshot
        );
    }

    #[test]
    fn update_round_trips_through_id() {
        for id in ParamId::ALL {
            let update = ParameterUpdate::new(id, 2.0);
            assert_eq!(update.id(), id);
            assert_eq!(update.value(), 2.0);
        }
    }
}
