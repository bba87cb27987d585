use pipeline_domain::{DomainError, DomainResult, SensorRecord};

const KPA_PER_PSI: f64 = 6.895;

/// Convert a record's measurements to imperial units.
///
/// Temperature goes Celsius -> Fahrenheit (2 decimal places), pressure goes
/// kilopascals -> psi (4 decimal places). Humidity, time, and profile name
/// pass through unchanged, as do absent measurements.
///
/// The input is never mutated: conversion is NOT idempotent, and callers must
/// be able to retry a message without double-converting whatever they already
/// hold. Non-finite values (a `"NaN"` or `"inf"` string survives lenient
/// decoding) are a [`DomainError::ConversionFault`] rather than corrupt output.
pub fn convert_units(record: &SensorRecord) -> DomainResult<SensorRecord> {
    let mut converted = record.clone();

    if let Some(celsius) = record.temperature {
        converted.temperature = Some(round_to(celsius_to_fahrenheit(celsius)?, 2));
    }

    if let Some(kpa) = record.pressure {
        converted.pressure = Some(round_to(kpa_to_psi(kpa)?, 4));
    }

    Ok(converted)
}

fn celsius_to_fahrenheit(celsius: f64) -> DomainResult<f64> {
    if !celsius.is_finite() {
        return Err(DomainError::ConversionFault {
            field: "temperature",
            reason: format!("value {} is not a finite number", celsius),
        });
    }
    Ok(celsius * 1.8 + 32.0)
}

fn kpa_to_psi(kpa: f64) -> DomainResult<f64> {
    if !kpa.is_finite() {
        return Err(DomainError::ConversionFault {
            field: "pressure",
            reason: format!("value {} is not a finite number", kpa),
        });
    }
    Ok(kpa / KPA_PER_PSI)
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_freezing_point_and_standard_atmosphere() {
        let record = SensorRecord {
            temperature: Some(0.0),
            humidity: Some(50.0),
            pressure: Some(101.325),
            ..Default::default()
        };

        let converted = convert_units(&record).unwrap();

        assert_eq!(converted.temperature, Some(32.0));
        assert_eq!(converted.pressure, Some(14.6954));
        assert_eq!(converted.humidity, Some(50.0));
    }

    #[test]
    fn test_convert_boiling_point_and_zero_pressure() {
        let record = SensorRecord {
            temperature: Some(100.0),
            humidity: Some(10.0),
            pressure: Some(0.0),
            ..Default::default()
        };

        let converted = convert_units(&record).unwrap();

        assert_eq!(converted.temperature, Some(212.0));
        assert_eq!(converted.pressure, Some(0.0));
        assert_eq!(converted.humidity, Some(10.0));
    }

    #[test]
    fn test_convert_rounds_to_declared_precision() {
        let record = SensorRecord {
            temperature: Some(20.0),
            pressure: Some(100.0),
            ..Default::default()
        };

        let converted = convert_units(&record).unwrap();

        assert_eq!(converted.temperature, Some(68.0));
        assert_eq!(converted.pressure, Some(14.5033));
    }

    #[test]
    fn test_convert_passes_metadata_through() {
        let record = SensorRecord {
            time: Some(1_600_000_000),
            profile_name: Some("cellar".to_string()),
            temperature: Some(20.0),
            humidity: Some(45.0),
            pressure: Some(100.0),
        };

        let converted = convert_units(&record).unwrap();

        assert_eq!(converted.time, record.time);
        assert_eq!(converted.profile_name, record.profile_name);
        assert_eq!(converted.humidity, record.humidity);
    }

    #[test]
    fn test_convert_none_measurements_pass_through() {
        let record = SensorRecord {
            humidity: Some(45.0),
            ..Default::default()
        };

        let converted = convert_units(&record).unwrap();

        assert_eq!(converted.temperature, None);
        assert_eq!(converted.pressure, None);
        assert_eq!(converted.humidity, Some(45.0));
    }

    #[test]
    fn test_convert_does_not_mutate_input() {
        let record = SensorRecord {
            temperature: Some(20.0),
            pressure: Some(100.0),
            ..Default::default()
        };
        let original = record.clone();

        let _ = convert_units(&record).unwrap();

        assert_eq!(record, original);
    }

    #[test]
    fn test_convert_applied_twice_corrupts_values() {
        // Conversion is deliberately non-idempotent; the pipeline guarantees
        // single application, and this documents why that guarantee matters.
        let record = SensorRecord {
            temperature: Some(20.0),
            pressure: Some(100.0),
            ..Default::default()
        };

        let once = convert_units(&record).unwrap();
        let twice = convert_units(&once).unwrap();

        assert_ne!(once.temperature, twice.temperature);
        assert_ne!(once.pressure, twice.pressure);
    }

    #[test]
    fn test_convert_non_finite_temperature_is_fault() {
        let record = SensorRecord {
            temperature: Some(f64::NAN),
            ..Default::default()
        };

        let result = convert_units(&record);

        assert!(matches!(
            result,
            Err(DomainError::ConversionFault {
                field: "temperature",
                ..
            })
        ));
    }

    #[test]
    fn test_convert_non_finite_pressure_is_fault() {
        let record = SensorRecord {
            pressure: Some(f64::INFINITY),
            ..Default::default()
        };

        let result = convert_units(&record);

        assert!(matches!(
            result,
            Err(DomainError::ConversionFault {
                field: "pressure",
                ..
            })
        ));
    }
}
