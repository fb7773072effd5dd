// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Length unit scale and the millimetre normalization heuristic

use crate::{CheckError, Result};
use ifcore_model::UnitAssignment;

/// Raw values above this are taken to be millimetres already
pub const MM_HEURISTIC_LIMIT: f64 = 100.0;

/// Millimetres per model length unit
///
/// Without a declared length unit the schema default (metres) applies.
pub fn length_scale_to_mm(units: &UnitAssignment) -> Result<f64> {
    let Some(length) = units.length_unit() else {
        return Ok(1000.0);
    };

    if let Some(factor) = length.conversion_factor {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(CheckError::unit(format!(
                "conversion factor {} of '{}' is not positive",
                factor, length.name
            )));
        }
        return Ok(factor * 1000.0);
    }

    if !length.name.eq_ignore_ascii_case("METRE") {
        return Err(CheckError::unit(format!(
            "length unit '{}' is neither METRE nor conversion based",
            length.name
        )));
    }

    match length.prefix.as_deref() {
        None => Ok(1000.0),
        Some("MILLI") => Ok(1.0),
        Some("CENTI") => Ok(10.0),
        Some("DECI") => Ok(100.0),
        Some("KILO") => Ok(1_000_000.0),
        Some(other) => Err(CheckError::unit(format!(
            "unsupported length prefix '{}'",
            other
        ))),
    }
}

/// Convert a raw length of unknown unit to millimetres
///
/// Values above 100 are assumed to be millimetres, anything else metres.
/// A 99 mm value is therefore read as 99 m; this is kept as-is for
/// compatibility with existing reports. Rounded to 0.01 mm.
pub fn normalize_to_mm(raw: f64) -> f64 {
    let mm = if raw > MM_HEURISTIC_LIMIT {
        raw
    } else {
        raw * 1000.0
    };
    round_to(mm, 2)
}

/// Round to a number of decimal places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use ifcore_model::DeclaredUnit;

    fn assignment(unit: DeclaredUnit) -> UnitAssignment {
        UnitAssignment { units: vec![unit] }
    }

    #[test]
    fn test_normalize_heuristic() {
        assert_eq!(normalize_to_mm(95.0), 95000.0);
        assert_eq!(normalize_to_mm(0.095), 95.0);
        assert_eq!(normalize_to_mm(250.0), 250.0);
        // exactly 100 is not above the limit
        assert_eq!(normalize_to_mm(100.0), 100000.0);
        assert_eq!(normalize_to_mm(100.01), 100.01);
    }

    #[test]
    fn test_default_is_metres() {
        assert_eq!(length_scale_to_mm(&UnitAssignment::default()).unwrap(), 1000.0);
    }

    #[test]
    fn test_prefixes() {
        let cases = [
            (None, 1000.0),
            (Some("MILLI"), 1.0),
            (Some("CENTI"), 10.0),
            (Some("DECI"), 100.0),
            (Some("KILO"), 1_000_000.0),
        ];
        for (prefix, expected) in cases {
            let units = assignment(DeclaredUnit::si("LENGTHUNIT", prefix, "METRE"));
            assert_eq!(length_scale_to_mm(&units).unwrap(), expected);
        }
    }

    #[test]
    fn test_unsupported_prefix() {
        let units = assignment(DeclaredUnit::si("LENGTHUNIT", Some("MICRO"), "METRE"));
        assert!(matches!(
            length_scale_to_mm(&units),
            Err(CheckError::InvalidUnit(_))
        ));
    }

    #[test]
    fn test_conversion_based() {
        let units = assignment(DeclaredUnit::converted("LENGTHUNIT", "FOOT", 0.3048));
        assert!((length_scale_to_mm(&units).unwrap() - 304.8).abs() < 1e-9);
    }

    #[test]
    fn test_non_length_units_ignored() {
        let units = assignment(DeclaredUnit::si("AREAUNIT", None, "SQUARE_METRE"));
        assert_eq!(length_scale_to_mm(&units).unwrap(), 1000.0);
    }
}
