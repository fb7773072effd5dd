// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! EC2 slab design checks on every structural slab
//!
//! The resolved slab thickness is the section height h; every other input is
//! a design parameter from the thresholds. An unknown structural system,
//! exposure class or deflection method fails the whole rule, while a slab too
//! thin for the configured cover blocks only its own verdict.

use super::{is_structural_slab, RuleContext};
use crate::element::{ElementGroup, ElementRecord};
use crate::structural::{
    bending, concrete_cover, deflection, effective_depth, tabulated_deflection, uls_punching,
    Evaluation, ExposureClass, SlabInput, StructuralSystem,
};
use crate::verdict::{fmt_mm, fmt_num, CheckStatus, Verdict};
use crate::{CheckError, Result};

const GROUP: ElementGroup = ElementGroup::Slabs;

/// Result of one evaluator, ready for display
struct Outcome {
    evaluation: Evaluation,
    actual: String,
    required: String,
}

fn structural_slabs<'a>(ctx: &RuleContext<'a>) -> impl Iterator<Item = &'a ElementRecord> {
    ctx.elements(GROUP).iter().filter(|slab| is_structural_slab(slab))
}

fn slab_input(ctx: &RuleContext<'_>, d_mm: f64) -> SlabInput {
    let t = ctx.thresholds;
    SlabInput {
        g_k: t.g_k_kn_m2,
        q_k: t.q_k_kn_m2,
        span_m: t.span_m,
        d_mm,
        f_ck: t.f_ck_mpa,
    }
}

fn outcome_verdict(slab: &ElementRecord, check: &str, outcome: Outcome) -> Verdict {
    let Outcome {
        evaluation,
        actual,
        required,
    } = outcome;
    let (status, verb) = if evaluation.compliant {
        (CheckStatus::Pass, "satisfied")
    } else {
        (CheckStatus::Fail, "exceeded")
    };
    Verdict::for_element(slab, status)
        .actual(actual)
        .required(required)
        .comment(format!(
            "EC2 {} {}: utilisation {:.2}",
            check, verb, evaluation.utilisation
        ))
        .long_name(format!("{} ({}) - EC2 {}", slab.label(), slab.storey_name(), check))
        .log(format!(
            "thickness_source={} {}",
            slab.provenance("thickness"),
            evaluation.log_line()
        ))
}

/// Run `evaluate` on the effective depth of every structural slab
fn per_slab<F>(ctx: &RuleContext<'_>, check: &str, mut evaluate: F) -> Result<Vec<Verdict>>
where
    F: FnMut(f64) -> Result<Outcome>,
{
    let t = ctx.thresholds;
    let mut verdicts = Vec::new();
    for slab in structural_slabs(ctx) {
        let Some(h) = slab.length("thickness") else {
            verdicts.push(ctx.missing(GROUP, slab, "thickness", "Slab thickness"));
            continue;
        };
        let d = match effective_depth(h, t.cover_mm, t.bar_diameter_mm) {
            Ok(d) => d,
            Err(err) => {
                log::debug!("{}: {}", slab.label(), err);
                verdicts.push(
                    Verdict::for_element(slab, CheckStatus::Blocked)
                        .actual(format!("h = {}", fmt_mm(h)))
                        .comment(err.to_string())
                        .log(format!(
                            "h_mm={} cover_mm={} phi_mm={} thickness_source={}",
                            h,
                            t.cover_mm,
                            t.bar_diameter_mm,
                            slab.provenance("thickness")
                        )),
                );
                continue;
            }
        };
        verdicts.push(outcome_verdict(slab, check, evaluate(d)?));
    }
    Ok(verdicts)
}

/// ULS bending of a one-metre strip
pub fn slab_bending(ctx: &RuleContext<'_>) -> Result<Vec<Verdict>> {
    per_slab(ctx, "bending", |d| {
        let evaluation = bending(&slab_input(ctx, d))?;
        let m_ed = evaluation.get("m_ed_knm").unwrap_or_default();
        let m_rd = evaluation.get("m_rd_knm").unwrap_or_default();
        Ok(Outcome {
            actual: format!("M_Ed = {} kNm/m", fmt_num(m_ed)),
            required: format!("<= M_Rd = {} kNm/m", fmt_num(m_rd)),
            evaluation,
        })
    })
}

/// Punching shear at an interior column
pub fn slab_punching(ctx: &RuleContext<'_>) -> Result<Vec<Verdict>> {
    let t = ctx.thresholds;
    per_slab(ctx, "punching", |d| {
        let evaluation = uls_punching(
            &slab_input(ctx, d),
            t.control_perimeter_mm,
            t.rho_l,
            t.punching_beta,
        )?;
        let v_ed = evaluation.get("v_ed_kn").unwrap_or_default();
        let v_rd = evaluation.get("v_rd_c_kn").unwrap_or_default();
        Ok(Outcome {
            actual: format!("V_Ed = {} kN", fmt_num(v_ed)),
            required: format!("<= V_Rd,c = {} kN", fmt_num(v_rd)),
            evaluation,
        })
    })
}

/// How the span/depth limit is obtained
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DeflectionMethod {
    Formula,
    Tabulated,
}

impl DeflectionMethod {
    fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "formula" => Ok(DeflectionMethod::Formula),
            "tabulated" => Ok(DeflectionMethod::Tabulated),
            other => Err(CheckError::config(format!(
                "Unknown deflection method '{}'. Valid: formula, tabulated",
                other
            ))),
        }
    }
}

/// SLS span/effective depth
pub fn slab_deflection(ctx: &RuleContext<'_>) -> Result<Vec<Verdict>> {
    let t = ctx.thresholds;
    let system: StructuralSystem = t.structural_system.parse()?;
    let method = DeflectionMethod::parse(&t.deflection_method)?;
    per_slab(ctx, "deflection", |d| {
        let evaluation = match method {
            DeflectionMethod::Formula => {
                deflection(t.span_m, d, t.rho_l, t.rho_prime, t.f_ck_mpa, system)?
            }
            DeflectionMethod::Tabulated => tabulated_deflection(t.span_m, d, system)?,
        };
        let actual = evaluation.get("ld_actual").unwrap_or_default();
        let limit = evaluation.get("ld_limit").unwrap_or_default();
        Ok(Outcome {
            actual: format!("L/d = {}", fmt_num(actual)),
            required: format!("<= {} ({})", fmt_num(limit), system),
            evaluation,
        })
    })
}

/// Nominal cover against the exposure class
///
/// The cover is a design parameter, so every structural slab gets the same
/// outcome; slabs are still listed so the report shows what it applies to.
pub fn slab_cover(ctx: &RuleContext<'_>) -> Result<Vec<Verdict>> {
    let t = ctx.thresholds;
    let exposure: ExposureClass = t.exposure_class.parse()?;
    let evaluation = concrete_cover(t.cover_mm, exposure, t.cover_deviation_mm)?;
    let required = evaluation.get("c_nom_required_mm").unwrap_or_default();
    Ok(structural_slabs(ctx)
        .map(|slab| {
            outcome_verdict(
                slab,
                "cover",
                Outcome {
                    evaluation: evaluation.clone(),
                    actual: format!("c_nom = {}", fmt_mm(t.cover_mm)),
                    required: format!(">= {} ({})", fmt_mm(required), exposure),
                },
            )
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Thresholds;
    use crate::rules::test_support::*;
    use ifcore_model::IfcType;

    fn slabs() -> crate::element::Population {
        population(vec![(
            GROUP,
            vec![
                with_length(record(1, IfcType::IfcSlab, "Floor 250"), "thickness", 250.0),
                with_length(record(2, IfcType::IfcSlab, "Floor 60"), "thickness", 60.0),
                with_length(record(3, IfcType::IfcSlab, "Floor 30"), "thickness", 30.0),
                record(4, IfcType::IfcSlab, "Floor"),
                with_length(record(5, IfcType::IfcSlab, "Floor Finish"), "thickness", 20.0),
            ],
        )])
    }

    #[test]
    fn test_slab_bending() {
        let population = slabs();
        let thresholds = Thresholds::default();
        let verdicts = slab_bending(&RuleContext::new(&population, &thresholds)).unwrap();
        assert_eq!(
            statuses(&verdicts),
            vec![
                CheckStatus::Pass,
                CheckStatus::Fail,
                CheckStatus::Blocked,
                CheckStatus::Blocked
            ]
        );
        assert_eq!(verdicts[0].actual_value.as_deref(), Some("M_Ed = 50.63 kNm/m"));
        assert!(verdicts[0].log.as_deref().unwrap().contains("d_mm=214"));
        assert!(verdicts[2]
            .comment
            .as_deref()
            .unwrap()
            .contains("Effective depth must be > 0"));
    }

    #[test]
    fn test_slab_punching() {
        let population = slabs();
        let thresholds = Thresholds::default();
        let verdicts = slab_punching(&RuleContext::new(&population, &thresholds)).unwrap();
        assert_eq!(verdicts[0].check_status, CheckStatus::Pass);
        assert_eq!(verdicts[0].actual_value.as_deref(), Some("V_Ed = 151.88 kN"));
    }

    #[test]
    fn test_slab_deflection_methods() {
        let population = slabs();
        let thresholds = Thresholds::default();
        let formula = slab_deflection(&RuleContext::new(&population, &thresholds)).unwrap();
        assert_eq!(formula[0].check_status, CheckStatus::Pass);
        assert_eq!(formula[0].actual_value.as_deref(), Some("L/d = 28.04"));

        let tabulated = Thresholds {
            deflection_method: "tabulated".to_string(),
            ..Thresholds::default()
        };
        let verdicts = slab_deflection(&RuleContext::new(&population, &tabulated)).unwrap();
        assert_eq!(
            verdicts[0].required_value.as_deref(),
            Some("<= 30 (one_way_continuous)")
        );
        assert_eq!(verdicts[1].check_status, CheckStatus::Fail);
    }

    #[test]
    fn test_slab_deflection_bad_configuration() {
        let population = slabs();
        let bad_method = Thresholds {
            deflection_method: "exact".to_string(),
            ..Thresholds::default()
        };
        assert!(matches!(
            slab_deflection(&RuleContext::new(&population, &bad_method)),
            Err(CheckError::Config(_))
        ));

        let bad_system = Thresholds {
            structural_system: "suspended".to_string(),
            ..Thresholds::default()
        };
        assert!(slab_deflection(&RuleContext::new(&population, &bad_system)).is_err());
    }

    #[test]
    fn test_slab_cover() {
        let population = slabs();
        let thresholds = Thresholds::default();
        let verdicts = slab_cover(&RuleContext::new(&population, &thresholds)).unwrap();
        assert_eq!(verdicts.len(), 4);
        assert!(verdicts.iter().all(|v| v.check_status == CheckStatus::Fail));
        assert_eq!(verdicts[0].required_value.as_deref(), Some(">= 35 mm (XC3)"));

        let exposed = Thresholds {
            cover_mm: 40.0,
            ..Thresholds::default()
        };
        let verdicts = slab_cover(&RuleContext::new(&population, &exposed)).unwrap();
        assert!(verdicts.iter().all(|v| v.check_status == CheckStatus::Pass));

        let unknown = Thresholds {
            exposure_class: "XZ9".to_string(),
            ..Thresholds::default()
        };
        assert!(slab_cover(&RuleContext::new(&population, &unknown)).is_err());
    }
}
