// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Declared project units, as written in the file's IfcUnitAssignment

use serde::{Deserialize, Serialize};

/// One declared unit
///
/// SI units carry a `name` ("METRE") and an optional `prefix` ("MILLI").
/// Conversion-based units (feet, inches) carry the factor that converts one
/// of them into the SI base unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeclaredUnit {
    /// UnitType enumeration, e.g. "LENGTHUNIT"
    pub unit_type: String,
    /// SI unit name ("METRE") or conversion unit name ("FOOT")
    pub name: String,
    /// SI prefix, e.g. "MILLI"
    pub prefix: Option<String>,
    /// SI base units per one of this unit, for conversion-based units
    pub conversion_factor: Option<f64>,
}

impl DeclaredUnit {
    /// Create a declared SI unit
    pub fn si(unit_type: impl Into<String>, prefix: Option<&str>, name: impl Into<String>) -> Self {
        Self {
            unit_type: unit_type.into(),
            name: name.into(),
            prefix: prefix.map(str::to_string),
            conversion_factor: None,
        }
    }

    /// Create a declared conversion-based unit
    pub fn converted(unit_type: impl Into<String>, name: impl Into<String>, factor: f64) -> Self {
        Self {
            unit_type: unit_type.into(),
            name: name.into(),
            prefix: None,
            conversion_factor: Some(factor),
        }
    }
}

/// The project's unit assignment
///
/// An empty assignment is valid and means the schema defaults (metres).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitAssignment {
    pub units: Vec<DeclaredUnit>,
}

impl UnitAssignment {
    /// Get the declared length unit, if any
    pub fn length_unit(&self) -> Option<&DeclaredUnit> {
        self.unit("LENGTHUNIT")
    }

    /// Get the declared unit of a given UnitType
    pub fn unit(&self, unit_type: &str) -> Option<&DeclaredUnit> {
        self.units
            .iter()
            .find(|u| u.unit_type.eq_ignore_ascii_case(unit_type))
    }
}
