// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Threshold configuration
//!
//! All regulatory limits are data. A caller supplies a flat map of named
//! options; keys it does not know are ignored so richer configuration
//! front ends keep working against older engines.

use crate::{CheckError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Prefix of environment variables that override thresholds
pub const ENV_PREFIX: &str = "IFCORE_";

/// Climate zone for external wall U-value limits
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClimateZone {
    A,
    B,
    C,
    D,
    E,
}

impl ClimateZone {
    /// Maximum U-value in W/(m2.K)
    pub fn u_limit(self) -> f64 {
        match self {
            ClimateZone::A => 0.80,
            ClimateZone::B => 0.65,
            ClimateZone::C => 0.57,
            ClimateZone::D => 0.49,
            ClimateZone::E => 0.37,
        }
    }
}

impl FromStr for ClimateZone {
    type Err = CheckError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(ClimateZone::A),
            "B" => Ok(ClimateZone::B),
            "C" => Ok(ClimateZone::C),
            "D" => Ok(ClimateZone::D),
            "E" => Ok(ClimateZone::E),
            _ => Err(CheckError::InvalidClimateZone(s.to_string())),
        }
    }
}

impl fmt::Display for ClimateZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Named thresholds and design parameters
///
/// Lengths are millimetres, areas square metres, loads kN/m2, strengths MPa.
/// Enumerated options (climate zone, structural system, exposure class,
/// deflection method) stay strings here and are parsed by the rules that use
/// them, so a bad value blocks only those rules.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    // Walls
    pub wall_thickness_mm: f64,
    pub wall_height_mm: f64,
    pub wall_service_height_mm: f64,
    pub space_aware_height: bool,
    pub wall_max_u_value: f64,
    pub climate_zone: Option<String>,

    // Slabs and foundations
    pub floor_slab_min_mm: f64,
    pub floor_slab_max_mm: f64,
    pub roof_slab_min_mm: f64,
    pub roof_slab_max_mm: f64,
    pub ground_slab_min_mm: f64,
    pub foundation_min_mm: f64,
    pub foundation_slab_min_mm: f64,
    pub bearing_beam_min_mm: f64,

    // Structural members
    pub beam_depth_mm: f64,
    pub beam_width_mm: f64,
    pub column_min_dim_mm: f64,

    // Accessibility
    pub door_width_mm: f64,
    pub window_height_mm: f64,
    pub opening_height_mm: f64,
    pub corridor_width_mm: f64,
    pub room_area_m2: f64,
    pub ceiling_height_mm: f64,
    pub stair_riser_min_mm: f64,
    pub stair_riser_max_mm: f64,
    pub stair_tread_mm: f64,
    pub railing_height_mm: f64,

    // Loads
    pub bearing_capacity_kn_m2: f64,
    pub floor_load_kn_m2: f64,

    // Slab design (EC2)
    pub structural_system: String,
    pub span_m: f64,
    pub cover_mm: f64,
    pub bar_diameter_mm: f64,
    pub f_ck_mpa: f64,
    pub f_yk_mpa: f64,
    pub exposure_class: String,
    pub g_k_kn_m2: f64,
    pub q_k_kn_m2: f64,
    pub rho_l: f64,
    pub rho_prime: f64,
    pub punching_beta: f64,
    pub control_perimeter_mm: f64,
    pub cover_deviation_mm: f64,
    pub deflection_method: String,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            wall_thickness_mm: 100.0,
            wall_height_mm: 2500.0,
            wall_service_height_mm: 2200.0,
            space_aware_height: true,
            wall_max_u_value: 0.80,
            climate_zone: None,

            floor_slab_min_mm: 100.0,
            floor_slab_max_mm: 200.0,
            roof_slab_min_mm: 200.0,
            roof_slab_max_mm: 350.0,
            ground_slab_min_mm: 150.0,
            foundation_min_mm: 200.0,
            foundation_slab_min_mm: 300.0,
            bearing_beam_min_mm: 300.0,

            beam_depth_mm: 200.0,
            beam_width_mm: 150.0,
            column_min_dim_mm: 250.0,

            door_width_mm: 800.0,
            window_height_mm: 1200.0,
            opening_height_mm: 2000.0,
            corridor_width_mm: 1100.0,
            room_area_m2: 5.0,
            ceiling_height_mm: 2200.0,
            stair_riser_min_mm: 130.0,
            stair_riser_max_mm: 185.0,
            stair_tread_mm: 280.0,
            railing_height_mm: 900.0,

            bearing_capacity_kn_m2: 150.0,
            floor_load_kn_m2: 7.0,

            structural_system: "one_way_continuous".to_string(),
            span_m: 6.0,
            cover_mm: 30.0,
            bar_diameter_mm: 12.0,
            f_ck_mpa: 30.0,
            f_yk_mpa: 500.0,
            exposure_class: "XC3".to_string(),
            g_k_kn_m2: 5.0,
            q_k_kn_m2: 3.0,
            rho_l: 0.005,
            rho_prime: 0.0,
            punching_beta: 1.5,
            control_perimeter_mm: 2000.0,
            cover_deviation_mm: 10.0,
            deflection_method: "formula".to_string(),
        }
    }
}

impl Thresholds {
    /// Load from a JSON object; missing keys keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        match value {
            Value::Object(map) => Self::from_map(&map),
            other => Err(CheckError::config(format!(
                "thresholds must be a JSON object, got {}",
                other
            ))),
        }
    }

    /// Load from a flat option map
    pub fn from_map(map: &Map<String, Value>) -> Result<Self> {
        Self::default().with_overrides(map)
    }

    /// Apply overrides on top of these thresholds
    ///
    /// Unknown keys are ignored. A known key with the wrong type is an error.
    pub fn with_overrides(&self, overrides: &Map<String, Value>) -> Result<Self> {
        let Value::Object(mut current) = serde_json::to_value(self)? else {
            return Err(CheckError::config("thresholds did not serialize to an object"));
        };

        for (key, value) in overrides {
            match current.get_mut(key) {
                Some(slot) => *slot = value.clone(),
                None => log::debug!("ignoring unknown threshold '{}'", key),
            }
        }

        serde_json::from_value(Value::Object(current))
            .map_err(|e| CheckError::config(format!("invalid threshold value: {}", e)))
    }

    /// Defaults overridden by `IFCORE_<KEY>` environment variables
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_vars(std::env::vars())
    }

    /// Apply overrides from `IFCORE_<KEY>` style variables
    ///
    /// Values are read as JSON scalars (`0.65`, `false`, `null`) and fall back
    /// to plain strings (`B`, `flat_slab`).
    pub fn with_env_vars<I, K, V>(&self, vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut overrides = Map::new();
        for (key, raw) in vars {
            let Some(name) = key.as_ref().strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let raw = raw.as_ref().trim();
            let value = serde_json::from_str::<Value>(raw)
                .ok()
                .filter(|v| !v.is_object() && !v.is_array())
                .unwrap_or_else(|| Value::String(raw.to_string()));
            overrides.insert(name.to_ascii_lowercase(), value);
        }
        self.with_overrides(&overrides)
    }

    /// U-value limit for external walls and the zone it came from
    pub fn wall_u_limit(&self) -> Result<(f64, Option<ClimateZone>)> {
        match self.climate_zone.as_deref() {
            Some(code) => {
                let zone: ClimateZone = code.parse()?;
                Ok((zone.u_limit(), Some(zone)))
            }
            None => Ok((self.wall_max_u_value, None)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let t = Thresholds::default();
        assert_eq!(t.wall_thickness_mm, 100.0);
        assert_eq!(t.punching_beta, 1.5);
        assert_eq!(t.deflection_method, "formula");
        assert_eq!(t.wall_u_limit().unwrap(), (0.80, None));
    }

    #[test]
    fn test_from_json_ignores_unknown_keys() {
        let t = Thresholds::from_json(r#"{"wall_thickness_mm": 120, "future_option": [1, 2]}"#)
            .unwrap();
        assert_eq!(t.wall_thickness_mm, 120.0);
        assert_eq!(t.wall_height_mm, 2500.0);
    }

    #[test]
    fn test_wrong_type_is_error() {
        let err = Thresholds::from_json(r#"{"wall_thickness_mm": "thick"}"#).unwrap_err();
        assert!(matches!(err, CheckError::Config(_)));
        assert!(Thresholds::from_json("[1]").is_err());
    }

    #[test]
    fn test_climate_zone() {
        let map = json!({"climate_zone": "c"});
        let t = Thresholds::from_map(map.as_object().unwrap()).unwrap();
        let (limit, zone) = t.wall_u_limit().unwrap();
        assert_eq!(limit, 0.57);
        assert_eq!(zone, Some(ClimateZone::C));

        let map = json!({"climate_zone": "Z"});
        let t = Thresholds::from_map(map.as_object().unwrap()).unwrap();
        assert!(matches!(
            t.wall_u_limit(),
            Err(CheckError::InvalidClimateZone(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let vars = [
            ("IFCORE_WALL_THICKNESS_MM", "150"),
            ("IFCORE_SPACE_AWARE_HEIGHT", "false"),
            ("IFCORE_CLIMATE_ZONE", "B"),
            ("IFCORE_UNKNOWN", "1"),
            ("PATH", "/usr/bin"),
        ];
        let t = Thresholds::default().with_env_vars(vars).unwrap();
        assert_eq!(t.wall_thickness_mm, 150.0);
        assert!(!t.space_aware_height);
        assert_eq!(t.climate_zone.as_deref(), Some("B"));
    }

    #[test]
    fn test_overrides_keep_base() {
        let base = Thresholds {
            door_width_mm: 900.0,
            ..Thresholds::default()
        };
        let map = json!({"railing_height_mm": 1100});
        let t = base.with_overrides(map.as_object().unwrap()).unwrap();
        assert_eq!(t.door_width_mm, 900.0);
        assert_eq!(t.railing_height_mm, 1100.0);
    }
}
