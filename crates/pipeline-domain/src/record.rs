use crate::coerce::{float_from_value, int_from_value, string_from_value};
use crate::error::{DomainError, DomainResult};
use serde::Serialize;

/// Canonical sensor reading passed between pipeline stages.
///
/// Every field is optional on the wire. The completeness filter
/// ([`SensorRecord::is_complete`]) guarantees `temperature`, `humidity`, and
/// `pressure` are present before a record reaches downstream consumers.
///
/// Units depend on position in the pipeline: `temperature` is Celsius and
/// `pressure` is kilopascals on the raw topic, Fahrenheit and psi on the
/// processed topic. `humidity` is a unit-less percentage throughout.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SensorRecord {
    pub time: Option<i64>,
    pub profile_name: Option<String>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
}

impl SensorRecord {
    /// Decode a UTF-8 JSON payload into a record.
    ///
    /// Coercion is lenient: numeric fields accept numbers or numeric strings
    /// (scientific notation included for `time`), and a field that cannot be
    /// coerced becomes `None` instead of failing the record. Unknown keys are
    /// ignored. Only a payload that is not a JSON object at all is an error.
    pub fn decode(payload: &[u8]) -> DomainResult<Self> {
        let value: serde_json::Value = serde_json::from_slice(payload)
            .map_err(|e| DomainError::DecodeError(e.to_string()))?;

        let map = match value {
            serde_json::Value::Object(map) => map,
            other => {
                return Err(DomainError::DecodeError(format!(
                    "expected a JSON object, got {}",
                    json_type_name(&other)
                )))
            }
        };

        Ok(Self {
            time: map.get("time").and_then(int_from_value),
            // Producers that skipped the profileName -> profile_name rename
            // still decode; encode always emits profile_name.
            profile_name: map
                .get("profile_name")
                .or_else(|| map.get("profileName"))
                .and_then(string_from_value),
            temperature: map.get("temperature").and_then(float_from_value),
            humidity: map.get("humidity").and_then(float_from_value),
            pressure: map.get("pressure").and_then(float_from_value),
        })
    }

    /// Encode to the wire form: a flat JSON object with absent fields emitted
    /// as explicit nulls, keeping the schema stable across hops.
    pub fn encode(&self) -> DomainResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// A record is complete when all three measurements are present.
    ///
    /// `time` and `profile_name` are metadata and deliberately not required;
    /// a reading without a location is still a reading.
    pub fn is_complete(&self) -> bool {
        self.temperature.is_some() && self.humidity.is_some() && self.pressure.is_some()
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
