//! Saving and restoring the parameter store.
//!
//! Two layouts are supported:
//!
//! - a self-describing JSON document, e.g.
//!   `{"tag":"PARAMETERS","threshold":-10.0,"ratio":4.0,"attack":20.0,"release":100.0}`;
//! - a fixed-order binary layout of 16 little-endian bytes: threshold,
//!   attack and release as `f32`, followed by the ratio as `i32`.
//!
//! Loading never fails. A malformed blob restores every default, and a
//! missing or out-of-range value restores that parameter's default.

use super::*;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// The root tag of the JSON document.
pub const STATE_TAG: &str = "PARAMETERS";

/// The size of the binary layout.
pub const STATE_LEN_BYTES: usize = 16;

const STATE_SCHEMA: &str = include_str!("../../assets/json/state_schema.json");

lazy_static! {
    static ref STATE_SCHEMA_VALIDATOR: jsonschema::Validator = {
        let schema: Value = serde_json::from_str(STATE_SCHEMA)
            .expect("failed to parse state schema to JSON");
        jsonschema::Validator::new(&schema)
            .expect("failed to create state schema validator")
    };
}

/// Parameter values as read from persisted state, before validation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    pub tag: String,
    #[serde(default)]
    pub threshold: Option<f64>,
    #[serde(default)]
    pub ratio: Option<f64>,
    #[serde(default)]
    pub attack: Option<f64>,
    #[serde(default)]
    pub release: Option<f64>,
}

impl PersistedState {
    pub fn value(&self, id: ParamId) -> Option<f64> {
        match id {
            ParamId::Threshold => self.threshold,
            ParamId::Ratio => self.ratio,
            ParamId::Attack => self.attack,
            ParamId::Release => self.release,
        }
    }

    /// Validates each value against its range, substituting the default for
    /// any value which is missing or out of range.
    pub fn restore(&self) -> ParameterSnapshot {
        let mut snapshot = ParameterSnapshot::default();

        for id in ParamId::ALL {
            let Some(value) = self.value(id) else {
                warn!(param = %id, "persisted parameter missing, using default");
                continue;
            };

            match id.range().validate(id, value) {
                Ok(value) => snapshot.set(id, value),
                Err(e) => {
                    warn!(error = %e, "persisted parameter invalid, using default");
                }
            }
        }

        snapshot
    }
}

/// Encodes `snapshot` as a JSON document.
pub fn encode_json(snapshot: &ParameterSnapshot) -> String {
    json!({
        "tag": STATE_TAG,
        "threshold": snapshot.threshold_db,
        "ratio": snapshot.ratio,
        "attack": snapshot.attack_ms,
        "release": snapshot.release_ms,
    })
    .to_string()
}

/// Decodes a JSON document.
///
/// # Errors
///
/// Returns [`CompressorError::MalformedPersistedState`] if `text` is not JSON,
/// or does not match the state schema.
pub fn decode_json(text: &str) -> Result<PersistedState> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| CompressorError::MalformedPersistedState(e.to_string()))?;

    if !STATE_SCHEMA_VALIDATOR.is_valid(&value) {
        return Err(CompressorError::MalformedPersistedState(String::from(
            "document does not match the state schema",
        )));
    }

    serde_json::from_value(value)
        .map_err(|e| CompressorError::MalformedPersistedState(e.to_string()))
}

/// Encodes `snapshot` in the fixed-order binary layout. The ratio is rounded
/// to the nearest integer.
pub fn encode_bytes(snapshot: &ParameterSnapshot) -> [u8; STATE_LEN_BYTES] {
    let mut bytes = [0; STATE_LEN_BYTES];

    bytes[0..4].copy_from_slice(&(snapshot.threshold_db as f32).to_le_bytes());
    bytes[4..8].copy_from_slice(&(snapshot.attack_ms as f32).to_le_bytes());
    bytes[8..12].copy_from_slice(&(snapshot.release_ms as f32).to_le_bytes());
    bytes[12..16].copy_from_slice(&(snapshot.ratio.round() as i32).to_le_bytes());

    bytes
}

/// Decodes the fixed-order binary layout.
///
/// # Errors
///
/// Returns [`CompressorError::MalformedPersistedState`] if `bytes` is not
/// exactly [`STATE_LEN_BYTES`] long.
pub fn decode_bytes(bytes: &[u8]) -> Result<PersistedState> {
    if bytes.len() != STATE_LEN_BYTES {
        return Err(CompressorError::MalformedPersistedState(format!(
            "expected {STATE_LEN_BYTES} bytes, found {}",
            bytes.len()
        )));
    }

    let word = |i: usize| {
        [bytes[i * 4], bytes[i * 4 + 1], bytes[i * 4 + 2], bytes[i * 4 + 3]]
    };

    Ok(PersistedState {
        tag: STATE_TAG.to_string(),
        threshold: Some(f32::from_le_bytes(word(0)).into()),
        attack: Some(f32::from_le_bytes(word(1)).into()),
        release: Some(f32::from_le_bytes(word(2)).into()),
        ratio: Some(i32::from_le_bytes(word(3)).into()),
    })
}

/// Restores a decoded state, or every default if decoding failed.
pub fn restore_or_default(decoded: Result<PersistedState>) -> ParameterSnapshot {
    match decoded {
        Ok(state) => state.restore(),
        Err(e) => {
            warn!(error = %e, "restoring default parameters");
            ParameterSnapshot::default()
        }
    }
}

impl CompressorParams {
    /// Saves the current values as a JSON document.
    pub fn to_json(&self) -> String {
        encode_json(&self.snapshot())
    }

    /// Loads a JSON document into the store, returning the values applied.
    pub fn load_json(&self, text: &str) -> ParameterSnapshot {
        let snapshot = restore_or_default(decode_json(text));
        self.store_snapshot(&snapshot);
        snapshot
    }

    /// Saves the current values in the fixed-order binary layout.
    pub fn to_bytes(&self) -> [u8; STATE_LEN_BYTES] {
        encode_bytes(&self.snapshot())
    }

    /// Loads the fixed-order binary layout into the store, returning the
    /// values applied.
    pub fn load_bytes(&self, bytes: &[u8]) -> ParameterSnapshot {
        let snapshot = restore_or_default(decode_bytes(bytes));
        self.store_snapshot(&snapshot);
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn custom() -> ParameterSnapshot {
        ParameterSnapshot {
            threshold_db: -10.0,
            ratio: 4.0,
            attack_ms: 5.0,
            release_ms: 120.0,
        }
    }

    #[test]
    fn json_document_restores_values() {
        let params = CompressorParams::from_snapshot(custom());
        let text = params.to_json();

        let other = CompressorParams::new();
        assert_eq!(other.load_json(&text), custom());
        assert_eq!(other.snapshot(), custom());
    }

    #[test]
    fn missing_and_out_of_range_values_use_defaults() {
        let params = CompressorParams::from_snapshot(custom());
        let restored = params.load_json(
            r#"{"tag":"PARAMETERS","threshold":-40.0,"ratio":6.0,"attack":12.0}"#,
        );

        assert_eq!(restored.threshold_db, DEFAULT_THRESHOLD_DB);
        assert_eq!(restored.ratio, 6.0);
        assert_eq!(restored.attack_ms, 12.0);
        assert_eq!(restored.release_ms, DEFAULT_RELEASE_MS);
    }

    #[test]
    fn malformed_json_restores_all_defaults() {
        for text in [
            "",
            "{\"tag\":\"PARAMETERS\",\"ratio\":",
            "[1, 2, 3]",
            r#"{"tag":"OTHER","ratio":4.0}"#,
            r#"{"ratio":4.0}"#,
            r#"{"tag":"PARAMETERS","ratio":"four"}"#,
        ] {
            assert!(matches!(
                decode_json(text),
                Err(CompressorError::MalformedPersistedState(_))
            ));

            let params = CompressorParams::from_snapshot(custom());
            assert_eq!(params.load_json(text), ParameterSnapshot::default());
            assert_eq!(params.snapshot(), ParameterSnapshot::default());
        }
    }

    #[test]
    fn binary_layout() {
        let bytes = encode_bytes(&custom());

        assert_eq!(&bytes[0..4], &(-10.0f32).to_le_bytes());
        assert_eq!(&bytes[4..8], &5.0f32.to_le_bytes());
        assert_eq!(&bytes[8..12], &120.0f32.to_le_bytes());
        assert_eq!(&bytes[12..16], &4i32.to_le_bytes());

        let params = CompressorParams::new();
        assert_eq!(params.load_bytes(&bytes), custom());
    }

    #[test]
    fn binary_ratio_is_rounded() {
        let mut snapshot = custom();
        snapshot.ratio = 2.6;

        let restored = decode_bytes(&encode_bytes(&snapshot)).unwrap().restore();
        assert_eq!(restored.ratio, 3.0);
    }

    #[test]
    fn truncated_bytes_restore_defaults() {
        let bytes = encode_bytes(&custom());
        let params = CompressorParams::from_snapshot(custom());

        assert!(decode_bytes(&bytes[..12]).is_err());
        assert_eq!(params.load_bytes(&bytes[..12]), ParameterSnapshot::default());
        assert_eq!(params.load_bytes(&[]), ParameterSnapshot::default());
    }

    #[test]
    fn non_finite_bytes_use_defaults() {
        let mut bytes = encode_bytes(&custom());
        bytes[0..4].copy_from_slice(&f32::NAN.to_le_bytes());
        bytes[12..16].copy_from_slice(&0i32.to_le_bytes());

        let restored = CompressorParams::new().load_bytes(&bytes);
        assert_eq!(restored.threshold_db, DEFAULT_THRESHOLD_DB);
        assert_eq!(restored.ratio, DEFAULT_RATIO);
        assert_eq!(restored.attack_ms, 5.0);
    }
}
