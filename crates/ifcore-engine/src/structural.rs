// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reinforced concrete slab evaluators (Eurocode 2, simplified)
//!
//! Every evaluator is a pure function of its inputs and returns whether the
//! slab complies, the demand/capacity utilisation, and the intermediate
//! values that led there. Inputs outside their physical domain are errors,
//! never verdicts.

use crate::units::round_to;
use crate::{CheckError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Partial safety factor for concrete
pub const GAMMA_C: f64 = 1.5;
/// Partial safety factor for reinforcing steel
pub const GAMMA_S: f64 = 1.15;
/// Punching shear resistance coefficient C_Rd,c
pub const C_RD_C: f64 = 0.18 / GAMMA_C;
/// Limiting moment coefficient (x/d <= 0.45)
pub const MU_LIM: f64 = 0.167;
/// Strip width for per-metre checks (mm)
pub const STRIP_WIDTH_MM: f64 = 1000.0;
/// Upper bound of the reinforcement ratio in shear formulas
pub const RHO_L_CAP: f64 = 0.02;

/// Support condition of a slab
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructuralSystem {
    SimplySupported,
    OneWayEndSpan,
    OneWayContinuous,
    TwoWayContinuous,
    FlatSlab,
    Cantilever,
}

impl StructuralSystem {
    pub const ALL: [StructuralSystem; 6] = [
        StructuralSystem::SimplySupported,
        StructuralSystem::OneWayEndSpan,
        StructuralSystem::OneWayContinuous,
        StructuralSystem::TwoWayContinuous,
        StructuralSystem::FlatSlab,
        StructuralSystem::Cantilever,
    ];

    /// Structural system factor K
    pub fn k_factor(self) -> f64 {
        match self {
            StructuralSystem::SimplySupported => 1.0,
            StructuralSystem::OneWayEndSpan => 1.3,
            StructuralSystem::OneWayContinuous => 1.5,
            StructuralSystem::TwoWayContinuous => 1.5,
            StructuralSystem::FlatSlab => 1.2,
            StructuralSystem::Cantilever => 0.4,
        }
    }

    /// Basic span/effective depth ratio (rho = 0.5 %, C30)
    pub fn basic_span_depth(self) -> f64 {
        match self {
            StructuralSystem::SimplySupported => 20.0,
            StructuralSystem::OneWayEndSpan => 26.0,
            StructuralSystem::OneWayContinuous => 30.0,
            StructuralSystem::TwoWayContinuous => 30.0,
            StructuralSystem::FlatSlab => 24.0,
            StructuralSystem::Cantilever => 8.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StructuralSystem::SimplySupported => "simply_supported",
            StructuralSystem::OneWayEndSpan => "one_way_end_span",
            StructuralSystem::OneWayContinuous => "one_way_continuous",
            StructuralSystem::TwoWayContinuous => "two_way_continuous",
            StructuralSystem::FlatSlab => "flat_slab",
            StructuralSystem::Cantilever => "cantilever",
        }
    }
}

impl FromStr for StructuralSystem {
    type Err = CheckError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|system| system.as_str() == key)
            .ok_or_else(|| {
                let valid: Vec<_> = Self::ALL.iter().map(|s| s.as_str()).collect();
                CheckError::domain(format!(
                    "Unknown structural system '{}'. Valid: {}",
                    s,
                    valid.join(", ")
                ))
            })
    }
}

impl fmt::Display for StructuralSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Environmental exposure class
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExposureClass {
    X0,
    XC1,
    XC2,
    XC3,
    XC4,
    XD1,
    XD2,
    XD3,
    XS1,
    XS2,
    XS3,
}

impl ExposureClass {
    pub const ALL: [ExposureClass; 11] = [
        ExposureClass::X0,
        ExposureClass::XC1,
        ExposureClass::XC2,
        ExposureClass::XC3,
        ExposureClass::XC4,
        ExposureClass::XD1,
        ExposureClass::XD2,
        ExposureClass::XD3,
        ExposureClass::XS1,
        ExposureClass::XS2,
        ExposureClass::XS3,
    ];

    /// Minimum durability cover c_min,dur (mm), structural class S4
    pub fn min_cover_mm(self) -> f64 {
        match self {
            ExposureClass::X0 => 10.0,
            ExposureClass::XC1 => 15.0,
            ExposureClass::XC2 | ExposureClass::XC3 => 25.0,
            ExposureClass::XC4 => 30.0,
            ExposureClass::XD1 | ExposureClass::XS1 => 35.0,
            ExposureClass::XD2 | ExposureClass::XS2 => 40.0,
            ExposureClass::XD3 | ExposureClass::XS3 => 45.0,
        }
    }

    /// Maximum crack width w_max (mm)
    pub fn crack_limit_mm(self) -> f64 {
        match self {
            ExposureClass::X0 | ExposureClass::XC1 => 0.4,
            ExposureClass::XD3 | ExposureClass::XS3 => 0.2,
            _ => 0.3,
        }
    }
}

impl FromStr for ExposureClass {
    type Err = CheckError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|class| class.to_string() == key)
            .ok_or_else(|| {
                let valid: Vec<_> = Self::ALL.iter().map(|c| c.to_string()).collect();
                CheckError::domain(format!(
                    "Unknown exposure '{}'. Valid: {}",
                    s,
                    valid.join(", ")
                ))
            })
    }
}

impl fmt::Display for ExposureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Outcome of one evaluator
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Evaluation {
    pub compliant: bool,
    /// Demand over capacity; above 1.0 means non-compliant
    pub utilisation: f64,
    /// Intermediate values, rounded for display
    pub diagnostics: BTreeMap<&'static str, f64>,
}

impl Evaluation {
    fn new(compliant: bool, demand: f64, capacity: f64) -> Self {
        let utilisation = if capacity > 0.0 {
            round_to(demand / capacity, 4)
        } else {
            f64::INFINITY
        };
        Self {
            compliant,
            utilisation,
            diagnostics: BTreeMap::new(),
        }
    }

    fn with(mut self, key: &'static str, value: f64, decimals: i32) -> Self {
        self.diagnostics.insert(key, round_to(value, decimals));
        self
    }

    /// Get a diagnostic value
    pub fn get(&self, key: &str) -> Option<f64> {
        self.diagnostics.get(key).copied()
    }

    /// Diagnostics as `key=value` pairs
    pub fn log_line(&self) -> String {
        self.diagnostics
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn require_positive(name: &str, value: f64) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(CheckError::domain(format!("{} must be > 0, got {}", name, value)))
    }
}

/// Effective depth d = h - cover - phi/2 (mm), rounded to 0.01 mm
pub fn effective_depth(h_mm: f64, cover_mm: f64, phi_mm: f64) -> Result<f64> {
    let d = h_mm - cover_mm - phi_mm / 2.0;
    if d <= 0.0 || !d.is_finite() {
        return Err(CheckError::domain(format!(
            "Effective depth must be > 0: h={}, cover={}, phi={} -> d={}",
            h_mm, cover_mm, phi_mm, d
        )));
    }
    Ok(round_to(d, 2))
}

/// ULS load combination 1.35 g_k + 1.5 q_k (kN/m2)
pub fn design_load(g_k: f64, q_k: f64) -> f64 {
    1.35 * g_k + 1.5 * q_k
}

/// Loads and geometry shared by the slab evaluators
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlabInput {
    /// Permanent load (kN/m2)
    pub g_k: f64,
    /// Variable load (kN/m2)
    pub q_k: f64,
    /// Span or column spacing (m)
    pub span_m: f64,
    /// Effective depth (mm)
    pub d_mm: f64,
    /// Characteristic concrete strength (MPa)
    pub f_ck: f64,
}

/// ULS bending of a simply supported one-metre strip
///
/// M_Ed = q_uls L^2 / 8, M_Rd = mu_lim f_cd b d^2.
pub fn bending(input: &SlabInput) -> Result<Evaluation> {
    require_positive("d", input.d_mm)?;
    require_positive("L", input.span_m)?;
    require_positive("f_ck", input.f_ck)?;

    let d_m = input.d_mm / 1000.0;
    let b_m = STRIP_WIDTH_MM / 1000.0;
    let f_cd = input.f_ck / GAMMA_C;
    let q_uls = design_load(input.g_k, input.q_k);
    let m_ed = q_uls * input.span_m.powi(2) / 8.0;
    // MPa * m * m2 = MNm
    let m_rd = MU_LIM * f_cd * b_m * d_m.powi(2) * 1000.0;

    Ok(Evaluation::new(m_ed <= m_rd, m_ed, m_rd)
        .with("q_uls_kn_m2", q_uls, 2)
        .with("d_mm", input.d_mm, 1)
        .with("f_cd_mpa", f_cd, 2)
        .with("m_ed_knm", m_ed, 2)
        .with("m_rd_knm", m_rd, 2))
}

/// Shear resistance stress and its parts: (k, v_Rd,c, v_min)
fn punching_resistance(d_mm: f64, f_ck: f64, rho_l: f64) -> (f64, f64, f64) {
    let rho_l = rho_l.min(RHO_L_CAP);
    let k = (1.0 + (200.0 / d_mm).sqrt()).min(2.0);
    let v_rd_c = C_RD_C * k * (100.0 * rho_l * f_ck).cbrt();
    let v_min = 0.035 * k.powf(1.5) * f_ck.sqrt();
    (k, v_rd_c.max(v_min), v_min)
}

/// Punching shear input with a given design shear force
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PunchingInput {
    /// Design shear force (kN)
    pub v_ed_kn: f64,
    /// Control perimeter (mm)
    pub u1_mm: f64,
    /// Effective depth (mm)
    pub d_mm: f64,
    pub f_ck: f64,
    /// Longitudinal reinforcement ratio, capped at 0.02
    pub rho_l: f64,
    /// Eccentricity factor
    pub beta: f64,
}

/// Punching shear without shear reinforcement, for a known V_Ed
pub fn punching_shear(input: &PunchingInput) -> Result<Evaluation> {
    require_positive("d", input.d_mm)?;
    require_positive("u_1", input.u1_mm)?;
    require_positive("f_ck", input.f_ck)?;

    let (k, v_rd_c, v_min) = punching_resistance(input.d_mm, input.f_ck, input.rho_l);
    let v_rd_c_kn = v_rd_c * input.u1_mm * input.d_mm / 1000.0;
    let demand = input.beta * input.v_ed_kn;
    let v_ed = demand * 1000.0 / (input.u1_mm * input.d_mm);

    Ok(Evaluation::new(demand <= v_rd_c_kn, demand, v_rd_c_kn)
        .with("k", k, 4)
        .with("v_rd_c_mpa", v_rd_c, 4)
        .with("v_min_mpa", v_min, 4)
        .with("v_rd_c_kn", v_rd_c_kn, 2)
        .with("v_ed_mpa", v_ed, 4)
        .with("beta_v_ed_kn", demand, 2))
}

/// ULS punching at an interior column
///
/// V_Ed = beta q_uls (L/2)^2 from the quarter-panel tributary area.
pub fn uls_punching(input: &SlabInput, u1_mm: f64, rho_l: f64, beta: f64) -> Result<Evaluation> {
    require_positive("d", input.d_mm)?;
    require_positive("L", input.span_m)?;
    require_positive("u_1", u1_mm)?;
    require_positive("f_ck", input.f_ck)?;

    let q_uls = design_load(input.g_k, input.q_k);
    let a_trib = (input.span_m / 2.0).powi(2);
    let v_ed_kn = beta * q_uls * a_trib;

    let (k, v_rd_c, v_min) = punching_resistance(input.d_mm, input.f_ck, rho_l);
    let v_rd_c_kn = v_rd_c * u1_mm * input.d_mm / 1000.0;
    let v_ed = v_ed_kn * 1000.0 / (u1_mm * input.d_mm);

    Ok(Evaluation::new(v_ed_kn <= v_rd_c_kn, v_ed_kn, v_rd_c_kn)
        .with("q_uls_kn_m2", q_uls, 2)
        .with("a_trib_m2", a_trib, 2)
        .with("v_ed_kn", v_ed_kn, 2)
        .with("k", k, 4)
        .with("v_rd_c_mpa", v_rd_c, 4)
        .with("v_min_mpa", v_min, 4)
        .with("v_rd_c_kn", v_rd_c_kn, 2)
        .with("v_ed_mpa", v_ed, 4))
}

/// SLS deflection by the span/depth formula
///
/// `rho` and `rho_prime` are tension and compression reinforcement ratios
/// (dimensionless). The limit branches around rho_0 = 1e-3 sqrt(f_ck).
pub fn deflection(
    span_m: f64,
    d_mm: f64,
    rho: f64,
    rho_prime: f64,
    f_ck: f64,
    system: StructuralSystem,
) -> Result<Evaluation> {
    require_positive("d", d_mm)?;
    require_positive("L", span_m)?;
    require_positive("rho", rho)?;
    require_positive("f_ck", f_ck)?;

    let k = system.k_factor();
    let sqrt_fck = f_ck.sqrt();
    let rho_0 = 1e-3 * sqrt_fck;

    let limit = if rho <= rho_0 {
        k * (11.0 + 1.5 * sqrt_fck * rho_0 / rho + 3.2 * sqrt_fck * (rho_0 / rho - 1.0).powf(1.5))
    } else {
        if rho <= rho_prime {
            return Err(CheckError::domain(format!(
                "rho ({}) must exceed rho' ({})",
                rho, rho_prime
            )));
        }
        k * (11.0
            + 1.5 * sqrt_fck * rho_0 / (rho - rho_prime)
            + sqrt_fck * (rho_prime / rho_0).sqrt() / 12.0)
    };

    let actual = span_m / (d_mm / 1000.0);

    Ok(Evaluation::new(actual <= limit, actual, limit)
        .with("k", k, 2)
        .with("rho_0", rho_0, 6)
        .with("rho", rho, 6)
        .with("ld_limit", limit, 2)
        .with("ld_actual", actual, 2))
}

/// SLS deflection against the tabulated span/depth ratio
pub fn tabulated_deflection(span_m: f64, d_mm: f64, system: StructuralSystem) -> Result<Evaluation> {
    require_positive("d", d_mm)?;
    require_positive("L", span_m)?;

    let limit = system.basic_span_depth();
    let actual = span_m * 1000.0 / d_mm;

    Ok(Evaluation::new(actual <= limit, actual, limit)
        .with("ld_limit", limit, 2)
        .with("ld_actual", actual, 2))
}

/// Nominal cover against exposure class
///
/// Required c_nom = c_min,dur + delta_c,dev.
pub fn concrete_cover(c_nom_mm: f64, exposure: ExposureClass, deviation_mm: f64) -> Result<Evaluation> {
    if c_nom_mm < 0.0 || !c_nom_mm.is_finite() {
        return Err(CheckError::domain(format!("c_nom must be >= 0, got {}", c_nom_mm)));
    }

    let c_min_dur = exposure.min_cover_mm();
    let required = c_min_dur + deviation_mm;
    // utilisation is required over provided
    let mut eval = Evaluation::new(c_nom_mm >= required, required, c_nom_mm);
    eval = eval
        .with("c_min_dur_mm", c_min_dur, 1)
        .with("delta_c_dev_mm", deviation_mm, 1)
        .with("c_nom_required_mm", required, 1)
        .with("c_nom_provided_mm", c_nom_mm, 1)
        .with("margin_mm", c_nom_mm - required, 2)
        .with("w_max_mm", exposure.crack_limit_mm(), 2);
    Ok(eval)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_input(d_mm: f64) -> SlabInput {
        SlabInput {
            g_k: 5.0,
            q_k: 3.0,
            span_m: 6.0,
            d_mm,
            f_ck: 30.0,
        }
    }

    #[test]
    fn test_effective_depth() {
        assert_eq!(effective_depth(250.0, 30.0, 12.0).unwrap(), 214.0);
        assert!(matches!(
            effective_depth(30.0, 30.0, 12.0),
            Err(CheckError::Domain(_))
        ));
    }

    #[test]
    fn test_bending() {
        let d = effective_depth(250.0, 30.0, 12.0).unwrap();
        let eval = bending(&default_input(d)).unwrap();
        assert!(eval.compliant);
        assert_eq!(eval.get("q_uls_kn_m2"), Some(11.25));
        assert_eq!(eval.get("m_ed_knm"), Some(50.63));
        assert!((eval.get("m_rd_knm").unwrap() - 152.96).abs() < 0.01);
        assert!(eval.utilisation > 0.3 && eval.utilisation < 0.35);
    }

    #[test]
    fn test_bending_fails_for_thin_slab() {
        let eval = bending(&default_input(60.0)).unwrap();
        assert!(!eval.compliant);
        assert!(eval.utilisation > 1.0);
    }

    #[test]
    fn test_uls_punching() {
        let eval = uls_punching(&default_input(214.0), 2000.0, 0.005, 1.5).unwrap();
        assert_eq!(eval.get("v_ed_kn"), Some(151.88));
        assert!((eval.get("k").unwrap() - 1.9667).abs() < 1e-3);
        // v_Rd,c governs over v_min here
        assert!(eval.get("v_rd_c_mpa").unwrap() > eval.get("v_min_mpa").unwrap());
        assert!(eval.compliant);
    }

    #[test]
    fn test_punching_size_factor_capped() {
        let input = PunchingInput {
            v_ed_kn: 100.0,
            u1_mm: 2000.0,
            d_mm: 400.0,
            f_ck: 30.0,
            rho_l: 0.05,
            beta: 1.15,
        };
        let eval = punching_shear(&input).unwrap();
        assert!(eval.get("k").unwrap() <= 2.0);
        assert_eq!(eval.get("beta_v_ed_kn"), Some(115.0));

        // small d hits the cap
        let eval = punching_shear(&PunchingInput { d_mm: 150.0, ..input }).unwrap();
        assert_eq!(eval.get("k"), Some(2.0));
    }

    #[test]
    fn test_deflection_formula() {
        let eval = deflection(6.0, 214.0, 0.005, 0.0, 30.0, StructuralSystem::OneWayContinuous)
            .unwrap();
        assert!((eval.get("ld_limit").unwrap() - 30.78).abs() < 0.05);
        assert_eq!(eval.get("ld_actual"), Some(28.04));
        assert!(eval.compliant);

        // above rho_0 takes the second branch
        let eval = deflection(6.0, 214.0, 0.01, 0.0, 30.0, StructuralSystem::SimplySupported)
            .unwrap();
        assert!(eval.get("ld_limit").unwrap() < 20.0);
        assert!(!eval.compliant);

        assert!(deflection(6.0, 214.0, 0.0, 0.0, 30.0, StructuralSystem::FlatSlab).is_err());
    }

    #[test]
    fn test_tabulated_deflection() {
        let eval = tabulated_deflection(6.0, 214.0, StructuralSystem::SimplySupported).unwrap();
        assert_eq!(eval.get("ld_limit"), Some(20.0));
        assert!(!eval.compliant);
        assert!(tabulated_deflection(0.0, 214.0, StructuralSystem::Cantilever).is_err());
    }

    #[test]
    fn test_concrete_cover() {
        let eval = concrete_cover(30.0, ExposureClass::XC3, 10.0).unwrap();
        assert!(!eval.compliant);
        assert_eq!(eval.get("c_nom_required_mm"), Some(35.0));
        assert_eq!(eval.get("margin_mm"), Some(-5.0));

        let eval = concrete_cover(35.0, ExposureClass::XC1, 10.0).unwrap();
        assert!(eval.compliant);
        assert!(concrete_cover(-1.0, ExposureClass::X0, 10.0).is_err());
    }

    #[test]
    fn test_parse_enums() {
        assert_eq!(
            "Flat_Slab".parse::<StructuralSystem>().unwrap(),
            StructuralSystem::FlatSlab
        );
        assert!("dome".parse::<StructuralSystem>().is_err());
        assert_eq!(" xd2 ".parse::<ExposureClass>().unwrap(), ExposureClass::XD2);
        assert!("XZ9".parse::<ExposureClass>().is_err());
        assert_eq!(ExposureClass::XS3.crack_limit_mm(), 0.2);
    }
}
