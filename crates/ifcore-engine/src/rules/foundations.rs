// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Foundation rules: slab thickness (Art. 69), footing area against the
//! building load, floor capacity (Art. 128) and bearing beam sections
//! (DB SE-AE)

use super::RuleContext;
use crate::element::{ElementGroup, ElementRecord};
use crate::units::round_to;
use crate::verdict::{fmt_mm, fmt_num, CheckStatus, Verdict};
use crate::Result;

/// Tolerance above the lowest storey still counted as ground level
const GROUND_TOLERANCE_MM: f64 = 1000.0;

/// Building load inputs shared by the footing checks
struct Loads {
    floors: usize,
    floor_load: f64,
}

impl Loads {
    fn from_context(ctx: &RuleContext<'_>) -> Self {
        let floors = ctx.population.storeys.len().max(1);
        let floor_load = ctx
            .elements(ElementGroup::Spaces)
            .first()
            .and_then(|space| space.number("floor_load"))
            .filter(|q| *q > 0.0)
            .unwrap_or(ctx.thresholds.floor_load_kn_m2);
        Self { floors, floor_load }
    }
}

/// Bearing capacity of a footing and whether the default was used
fn bearing_capacity(ctx: &RuleContext<'_>, footing: &ElementRecord) -> (f64, bool) {
    match footing.number("bearing_capacity").filter(|s| *s > 0.0) {
        Some(sigma) => (sigma, false),
        None => {
            log::debug!(
                "{}: no bearing capacity, using {} kN/m2",
                footing.label(),
                ctx.thresholds.bearing_capacity_kn_m2
            );
            (ctx.thresholds.bearing_capacity_kn_m2, true)
        }
    }
}

fn at_ground(ctx: &RuleContext<'_>, slab: &ElementRecord) -> bool {
    match (ctx.population.lowest_storey(), &slab.storey) {
        (Some(lowest), Some(storey)) => {
            storey.elevation_mm <= lowest.elevation_mm + GROUND_TOLERANCE_MM
        }
        _ => true,
    }
}

/// Footings, then base slabs and on-grade floor slabs near ground level
fn foundation_slabs<'a>(ctx: &RuleContext<'a>) -> Vec<(ElementGroup, &'a ElementRecord)> {
    let footings = ctx
        .elements(ElementGroup::Footings)
        .iter()
        .map(|f| (ElementGroup::Footings, f));
    let slabs = ctx
        .elements(ElementGroup::Slabs)
        .iter()
        .filter(|slab| {
            let on_grade = slab.is_predefined("FLOOR") && slab.name_lower().contains("on grade");
            (slab.is_predefined("BASESLAB") || on_grade) && at_ground(ctx, slab)
        })
        .map(|s| (ElementGroup::Slabs, s));
    footings.chain(slabs).collect()
}

pub fn foundation_slab_thickness(ctx: &RuleContext<'_>) -> Result<Vec<Verdict>> {
    let min = ctx.thresholds.foundation_slab_min_mm;
    let verdicts = foundation_slabs(ctx)
        .into_iter()
        .map(|(group, element)| {
            let verdict = match element.length("thickness") {
                None => ctx.missing(group, element, "thickness", "Thickness"),
                Some(h) if h >= min => Verdict::for_element(element, CheckStatus::Pass)
                    .actual(fmt_mm(h))
                    .comment(format!("Art. 69 satisfied: {} >= {}", fmt_mm(h), fmt_mm(min))),
                Some(h) => Verdict::for_element(element, CheckStatus::Fail)
                    .actual(fmt_mm(h))
                    .comment(format!(
                        "Art. 69: {} below minimum (requires 150 mm concrete + 150 mm drainage layer)",
                        fmt_mm((min - h).round())
                    )),
            };
            verdict
                .required(format!(">= {}", fmt_mm(min)))
                .long_name(format!(
                    "{} ({}) - Art. 69 Foundation Slab Thickness",
                    element.label(),
                    element.storey_name()
                ))
                .log(format!("thickness_source={}", element.provenance("thickness")))
        })
        .collect();
    Ok(verdicts)
}

/// Footing plan area against n x q x A / sigma
pub fn foundation_dimensions(ctx: &RuleContext<'_>) -> Result<Vec<Verdict>> {
    const GROUP: ElementGroup = ElementGroup::Footings;
    let loads = Loads::from_context(ctx);
    let verdicts = ctx
        .elements(GROUP)
        .iter()
        .map(|footing| {
            let (sigma, default_sigma) = bearing_capacity(ctx, footing);
            let note = if default_sigma { " [σ default]" } else { "" };
            let (length, width) = match (footing.length("length"), footing.length("width")) {
                (None, _) => return ctx.missing(GROUP, footing, "length", "Footing length"),
                (_, None) => return ctx.missing(GROUP, footing, "width", "Footing width"),
                (Some(l), Some(w)) => (l / 1000.0, w / 1000.0),
            };

            let provided = round_to(length * width, 4);
            let required = round_to(
                loads.floors as f64 * loads.floor_load * provided / sigma,
                4,
            );
            let verdict = if provided >= required {
                Verdict::for_element(footing, CheckStatus::Pass).comment(format!(
                    "Provided {:.2} m² >= required {:.2} m² ({} floors x {} kN/m² / {} kN/m²){}",
                    provided,
                    required,
                    loads.floors,
                    fmt_num(loads.floor_load),
                    fmt_num(sigma),
                    note
                ))
            } else {
                Verdict::for_element(footing, CheckStatus::Fail).comment(format!(
                    "Deficit {:.3} m²: required {:.2} m² > provided {:.2} m² ({} floors, q={} kN/m², σ={} kN/m²){}",
                    round_to(required - provided, 3),
                    required,
                    provided,
                    loads.floors,
                    fmt_num(loads.floor_load),
                    fmt_num(sigma),
                    note
                ))
            };
            verdict
                .actual(format!("{:.2} m² ({:.2} x {:.2} m)", provided, length, width))
                .required(format!("{:.2} m²", required))
                .long_name(format!(
                    "{} ({}) - Foundation Dimensions / Load Check",
                    footing.label(),
                    footing.storey_name()
                ))
                .log(format!(
                    "L={:.3}m W={:.3}m bearing={}kN/m2 q={}kN/m2 n={} length_source={} width_source={} bearing_source={}",
                    length,
                    width,
                    fmt_num(sigma),
                    fmt_num(loads.floor_load),
                    loads.floors,
                    footing.provenance("length"),
                    footing.provenance("width"),
                    footing.provenance("bearing_capacity")
                ))
        })
        .collect();
    Ok(verdicts)
}

/// Floors the foundation can carry at the design floor load
pub fn floor_capacity(ctx: &RuleContext<'_>) -> Result<Vec<Verdict>> {
    let loads = Loads::from_context(ctx);
    let existing = loads.floors as i64;
    let verdicts = ctx
        .elements(ElementGroup::Footings)
        .iter()
        .map(|footing| {
            let (sigma, default_sigma) = bearing_capacity(ctx, footing);
            let max_floors = (sigma / loads.floor_load).floor() as i64;
            let addable = max_floors - existing;
            let (status, comment) = match addable {
                n if n > 0 => (
                    CheckStatus::Pass,
                    format!(
                        "Art. 128: {} floor(s) can be added. Current: {}, capacity: {}",
                        n, existing, max_floors
                    ),
                ),
                0 => (
                    CheckStatus::Warning,
                    format!(
                        "Art. 128: Foundation is at capacity, no additional floors possible. Current: {} = max: {}",
                        existing, max_floors
                    ),
                ),
                n => (
                    CheckStatus::Fail,
                    format!(
                        "Art. 128: Existing {} floors exceeds capacity of {} floors by {}. Underpinning required.",
                        existing,
                        max_floors,
                        n.abs()
                    ),
                ),
            };
            let note = if default_sigma {
                format!(" [bearing: default {} kN/m²]", fmt_num(sigma))
            } else {
                String::new()
            };
            Verdict::for_element(footing, status)
                .actual(format!("{} existing floors", existing))
                .required(format!(
                    "max {} floors (σ={} kN/m², q={} kN/m²){}",
                    max_floors,
                    fmt_num(sigma),
                    fmt_num(loads.floor_load),
                    note
                ))
                .comment(comment)
                .long_name(format!(
                    "{} ({}) - Art. 128 Floor Capacity",
                    footing.label(),
                    footing.storey_name()
                ))
                .log(format!(
                    "bearing={}kN/m2 q={}kN/m2 max={} existing={} addable={} bearing_source={}",
                    fmt_num(sigma),
                    fmt_num(loads.floor_load),
                    max_floors,
                    existing,
                    addable,
                    footing.provenance("bearing_capacity")
                ))
        })
        .collect();
    Ok(verdicts)
}

/// Beams on the lowest storey need a minimum width and depth
pub fn bearing_beam_section(ctx: &RuleContext<'_>) -> Result<Vec<Verdict>> {
    const GROUP: ElementGroup = ElementGroup::Beams;
    let Some(lowest) = ctx.population.lowest_storey() else {
        return Ok(Vec::new());
    };
    let min = ctx.thresholds.bearing_beam_min_mm;
    let required = format!("{} x {}", fmt_num(min), fmt_mm(min));

    let verdicts = ctx
        .elements(GROUP)
        .iter()
        .filter(|beam| beam.storey.as_ref().is_some_and(|s| s.id == lowest.id))
        .map(|beam| {
            let (width, depth) = (beam.length("width"), beam.length("depth"));
            let show = |v: Option<f64>| v.map(fmt_num).unwrap_or_else(|| "N/A".to_string());
            let verdict = match (width, depth) {
                (Some(w), Some(d)) if w >= min && d >= min => {
                    Verdict::for_element(beam, CheckStatus::Pass).comment(format!(
                        "DB SE-AE satisfied: {} x {} >= {}",
                        fmt_num(w),
                        fmt_mm(d),
                        required
                    ))
                }
                (Some(w), Some(d)) => {
                    let mut parts = Vec::new();
                    if w < min {
                        parts.push(format!("width {} < min {}", fmt_mm(w), fmt_mm(min)));
                    }
                    if d < min {
                        parts.push(format!("depth {} < min {}", fmt_mm(d), fmt_mm(min)));
                    }
                    Verdict::for_element(beam, CheckStatus::Fail)
                        .comment(format!("DB SE-AE violation: {}", parts.join("; ")))
                }
                (None, _) => ctx.missing(GROUP, beam, "width", "Cross-section width"),
                (_, None) => ctx.missing(GROUP, beam, "depth", "Cross-section depth"),
            };
            let actual = match (width, depth) {
                (None, None) => None,
                (Some(w), Some(d)) => Some(format!("{} x {}", fmt_num(w), fmt_mm(d))),
                _ => Some(format!("w={} / d={}", show(width), show(depth))),
            };
            verdict
                .actual_opt(actual)
                .required(required.clone())
                .long_name(format!(
                    "{} @ {} - DB SE-AE Bearing Beam",
                    beam.label(),
                    beam.storey_name()
                ))
                .log(format!(
                    "width_source={} depth_source={}",
                    beam.provenance("width"),
                    beam.provenance("depth")
                ))
        })
        .collect();
    Ok(verdicts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Thresholds;
    use crate::rules::test_support::*;
    use ifcore_model::IfcType;

    fn footing(id: u32, length: f64, width: f64) -> ElementRecord {
        with_length(
            with_length(record(id, IfcType::IfcFooting, &format!("F{}", id)), "length", length),
            "width",
            width,
        )
    }

    fn slab(id: u32, name: &str, predefined: &str, storey_elevation: Option<f64>) -> ElementRecord {
        let mut slab = with_length(record(id, IfcType::IfcSlab, name), "thickness", 350.0);
        slab.predefined_type = Some(predefined.to_string());
        slab.storey = storey_elevation.map(|e| storey(100 + e as u32, "S", e));
        slab
    }

    #[test]
    fn test_foundation_slab_candidates() {
        let mut population = population(vec![
            (
                ElementGroup::Footings,
                vec![with_length(record(1, IfcType::IfcFooting, "F1"), "thickness", 250.0)],
            ),
            (
                ElementGroup::Slabs,
                vec![
                    slab(2, "Base", "BASESLAB", Some(0.0)),
                    slab(3, "Slab on grade", "FLOOR", Some(500.0)),
                    slab(4, "Floor", "FLOOR", Some(0.0)),
                    slab(5, "Upper base", "BASESLAB", Some(3000.0)),
                    slab(6, "Loose base", "BASESLAB", None),
                ],
            ),
        ]);
        population.storeys = vec![storey(100, "Ground", 0.0), storey(3100, "First", 3000.0)];
        let thresholds = Thresholds::default();
        let verdicts = foundation_slab_thickness(&RuleContext::new(&population, &thresholds)).unwrap();

        let ids: Vec<_> = verdicts.iter().map(|v| v.element_id.clone().unwrap()).collect();
        assert_eq!(ids, vec!["g1", "g2", "g3", "g6"]);
        assert_eq!(
            statuses(&verdicts),
            vec![
                CheckStatus::Fail,
                CheckStatus::Pass,
                CheckStatus::Pass,
                CheckStatus::Pass
            ]
        );
        assert!(verdicts[0].comment.as_deref().unwrap().starts_with("Art. 69: 50 mm below minimum"));
    }

    #[test]
    fn test_foundation_dimensions() {
        let mut population = population(vec![(
            ElementGroup::Footings,
            vec![
                with_number(footing(1, 2000.0, 2000.0), "bearing_capacity", 200.0),
                footing(2, 1000.0, 1000.0),
                with_length(record(3, IfcType::IfcFooting, "F3"), "length", 1000.0),
            ],
        )]);
        population.storeys = (0..3).map(|i| storey(i, "S", i as f64 * 3000.0)).collect();
        let thresholds = Thresholds::default();
        let verdicts = foundation_dimensions(&RuleContext::new(&population, &thresholds)).unwrap();

        // 3 x 7 x 4 / 200 = 0.42 m² required
        assert_eq!(verdicts[0].check_status, CheckStatus::Pass);
        assert_eq!(verdicts[0].required_value.as_deref(), Some("0.42 m²"));
        assert_eq!(verdicts[0].actual_value.as_deref(), Some("4.00 m² (2.00 x 2.00 m)"));
        // default sigma is noted
        assert!(verdicts[1].comment.as_deref().unwrap().ends_with("[σ default]"));
        assert_eq!(verdicts[2].check_status, CheckStatus::Blocked);
    }

    #[test]
    fn test_floor_capacity() {
        let mut population = population(vec![
            (
                ElementGroup::Footings,
                vec![
                    with_number(footing(1, 1.0, 1.0), "bearing_capacity", 21.0),
                    with_number(footing(2, 1.0, 1.0), "bearing_capacity", 30.0),
                    with_number(footing(3, 1.0, 1.0), "bearing_capacity", 14.0),
                ],
            ),
            (
                ElementGroup::Spaces,
                vec![with_number(record(9, IfcType::IfcSpace, "Room"), "floor_load", 7.0)],
            ),
        ]);
        population.storeys = (0..3).map(|i| storey(i, "S", i as f64 * 3000.0)).collect();
        let thresholds = Thresholds::default();
        let verdicts = floor_capacity(&RuleContext::new(&population, &thresholds)).unwrap();
        assert_eq!(
            statuses(&verdicts),
            vec![CheckStatus::Warning, CheckStatus::Pass, CheckStatus::Fail]
        );
        assert_eq!(
            verdicts[1].comment.as_deref(),
            Some("Art. 128: 1 floor(s) can be added. Current: 3, capacity: 4")
        );
    }

    #[test]
    fn test_bearing_beam_section() {
        let ground = storey(1, "Ground", 0.0);
        let beam = |id: u32, w: Option<f64>, d: Option<f64>, on_ground: bool| {
            let mut beam = record(id, IfcType::IfcBeam, &format!("B{}", id));
            if let Some(w) = w {
                beam = with_length(beam, "width", w);
            }
            if let Some(d) = d {
                beam = with_length(beam, "depth", d);
            }
            beam.storey = Some(if on_ground {
                ground.clone()
            } else {
                storey(2, "First", 3000.0)
            });
            beam
        };
        let mut population = population(vec![(
            ElementGroup::Beams,
            vec![
                beam(10, Some(300.0), Some(400.0), true),
                beam(11, Some(250.0), Some(400.0), true),
                beam(12, None, Some(400.0), true),
                beam(13, Some(100.0), Some(100.0), false),
            ],
        )]);
        population.storeys = vec![ground.clone(), storey(2, "First", 3000.0)];
        let thresholds = Thresholds::default();
        let verdicts = bearing_beam_section(&RuleContext::new(&population, &thresholds)).unwrap();
        assert_eq!(
            statuses(&verdicts),
            vec![CheckStatus::Pass, CheckStatus::Fail, CheckStatus::Blocked]
        );
        assert_eq!(verdicts[0].required_value.as_deref(), Some("300 x 300 mm"));
        assert_eq!(
            verdicts[1].comment.as_deref(),
            Some("DB SE-AE violation: width 250 mm < min 300 mm")
        );
        assert_eq!(verdicts[2].actual_value.as_deref(), Some("w=N/A / d=400"));
    }
}
