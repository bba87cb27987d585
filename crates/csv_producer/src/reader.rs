use pipeline_domain::{float_from_str, int_from_str, SensorRecord};
use serde::Deserialize;

/// One row of the sensor export.
///
/// Every cell is read as an optional string and coerced afterwards with the
/// same lenient rules the wire decoder uses, so a row that would decode on
/// the wire also reads from the file. The export's `profileName` column is
/// renamed to `profile_name` here, once, and stays renamed on every hop.
#[derive(Debug, Deserialize)]
pub struct CsvRow {
    pub time: Option<String>,
    #[serde(rename = "profileName")]
    pub profile_name: Option<String>,
    pub temperature: Option<String>,
    pub humidity: Option<String>,
    pub pressure: Option<String>,
}

impl From<CsvRow> for SensorRecord {
    fn from(row: CsvRow) -> Self {
        SensorRecord {
            time: row.time.as_deref().and_then(int_from_str),
            profile_name: row.profile_name.filter(|s| !s.is_empty()),
            temperature: row.temperature.as_deref().and_then(float_from_str),
            humidity: row.humidity.as_deref().and_then(float_from_str),
            pressure: row.pressure.as_deref().and_then(float_from_str),
        }
    }
}
