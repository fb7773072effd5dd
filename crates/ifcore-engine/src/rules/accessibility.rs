// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Accessibility and habitability: doors, windows, openings, rooms, stairs
//! and guardrails

use super::{Minimum, RuleContext};
use crate::classify::{contains_keyword, normalize};
use crate::element::{ElementGroup, ElementRecord};
use crate::units::round_to;
use crate::verdict::{fmt_mm, fmt_num, CheckStatus, Verdict};
use crate::Result;

const CORRIDOR_KEYWORDS: &[&str] = &[
    "corridor",
    "hall",
    "hallway",
    "passage",
    "circulation",
    "pasillo",
    "distribuidor",
];

fn minimum<'a>(
    group: ElementGroup,
    attribute: &'a str,
    label: &'a str,
    regulation: &'a str,
    minimum: f64,
) -> Minimum<'a> {
    Minimum {
        group,
        attribute,
        label,
        subject: label,
        regulation,
        minimum,
        unit: "mm",
    }
}

pub fn door_width(ctx: &RuleContext<'_>) -> Result<Vec<Verdict>> {
    let rule = minimum(
        ElementGroup::Doors,
        "width",
        "Door width",
        "DB SUA Annex A",
        ctx.thresholds.door_width_mm,
    );
    Ok(rule.check(ctx, ctx.elements(ElementGroup::Doors)))
}

pub fn window_height(ctx: &RuleContext<'_>) -> Result<Vec<Verdict>> {
    let rule = minimum(
        ElementGroup::Windows,
        "height",
        "Window height",
        "Decree 141/2012",
        ctx.thresholds.window_height_mm,
    );
    Ok(rule.check(ctx, ctx.elements(ElementGroup::Windows)))
}

pub fn opening_height(ctx: &RuleContext<'_>) -> Result<Vec<Verdict>> {
    let rule = minimum(
        ElementGroup::Openings,
        "height",
        "Opening height",
        "DB SUA 2",
        ctx.thresholds.opening_height_mm,
    );
    Ok(rule.check(ctx, ctx.elements(ElementGroup::Openings)))
}

fn is_corridor(space: &ElementRecord) -> bool {
    let text = space
        .long_name
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .or(space.name.as_deref())
        .map(normalize)
        .unwrap_or_default();
    CORRIDOR_KEYWORDS
        .iter()
        .any(|keyword| contains_keyword(&text, keyword))
}

/// Short side in metres of the rectangle with the given area and perimeter
///
/// Falls back to `A / (P / 4)` when no such rectangle exists.
pub(crate) fn rectangle_short_side(area_m2: f64, perimeter_m: f64) -> f64 {
    let half = perimeter_m / 2.0;
    let disc = half * half - 4.0 * area_m2;
    if disc >= 0.0 {
        (half - disc.sqrt()) / 2.0
    } else {
        area_m2 / (perimeter_m / 4.0)
    }
}

/// Corridor width estimated from space area and perimeter
pub fn corridor_width(ctx: &RuleContext<'_>) -> Result<Vec<Verdict>> {
    const GROUP: ElementGroup = ElementGroup::Spaces;
    let min = ctx.thresholds.corridor_width_mm;
    let verdicts = ctx
        .elements(GROUP)
        .iter()
        .filter(|space| is_corridor(space))
        .map(|space| {
            let area = space.number("area").filter(|a| *a > 0.0);
            let perimeter = space.length("perimeter");
            let verdict = match (area, perimeter) {
                (None, _) => ctx.missing(GROUP, space, "area", "Corridor area"),
                (_, None) => ctx.missing(GROUP, space, "perimeter", "Corridor perimeter"),
                (Some(area), Some(perimeter_mm)) => {
                    let width = round_to(rectangle_short_side(area, perimeter_mm / 1000.0) * 1000.0, 0);
                    let status = if width >= min {
                        CheckStatus::Pass
                    } else {
                        CheckStatus::Fail
                    };
                    Verdict::for_element(space, status)
                        .actual(format!("~{}", fmt_mm(width)))
                        .comment(format!(
                            "Width estimated from area {} m² and perimeter {}",
                            area,
                            fmt_mm(perimeter_mm)
                        ))
                }
            };
            verdict
                .required(format!(">= {}", fmt_mm(min)))
                .long_name(format!(
                    "{} ({}) - DB SUA Corridor Width",
                    space.label(),
                    space.storey_name()
                ))
                .log(format!(
                    "area_source={} perimeter_source={}",
                    space.provenance("area"),
                    space.provenance("perimeter")
                ))
        })
        .collect();
    Ok(verdicts)
}

pub fn room_area(ctx: &RuleContext<'_>) -> Result<Vec<Verdict>> {
    const GROUP: ElementGroup = ElementGroup::Spaces;
    let rule = Minimum {
        group: GROUP,
        attribute: "area",
        label: "Room area",
        subject: "Room area",
        regulation: "Decree 141/2012",
        minimum: ctx.thresholds.room_area_m2,
        unit: "m²",
    };
    Ok(rule.check(ctx, ctx.elements(GROUP)))
}

pub fn room_ceiling_height(ctx: &RuleContext<'_>) -> Result<Vec<Verdict>> {
    let rule = minimum(
        ElementGroup::Spaces,
        "ceiling_height",
        "Ceiling height",
        "DB SUA 2",
        ctx.thresholds.ceiling_height_mm,
    );
    Ok(rule.check(ctx, ctx.elements(ElementGroup::Spaces)))
}

/// Riser height within the configured range
pub fn stair_riser(ctx: &RuleContext<'_>) -> Result<Vec<Verdict>> {
    const GROUP: ElementGroup = ElementGroup::StairFlights;
    let (min, max) = (ctx.thresholds.stair_riser_min_mm, ctx.thresholds.stair_riser_max_mm);
    let verdicts = ctx
        .elements(GROUP)
        .iter()
        .map(|flight| {
            let verdict = match flight.length("riser") {
                None => ctx.missing(GROUP, flight, "riser", "Riser height"),
                Some(riser) if riser < min || riser > max => {
                    Verdict::for_element(flight, CheckStatus::Fail)
                        .actual(fmt_mm(riser))
                        .comment(format!("Riser {} outside {}-{}", fmt_mm(riser), fmt_num(min), fmt_mm(max)))
                }
                Some(riser) => Verdict::for_element(flight, CheckStatus::Pass)
                    .actual(fmt_mm(riser))
                    .comment(format!("DB SUA 1 satisfied: riser {}", fmt_mm(riser))),
            };
            verdict
                .required(format!("{}-{}", fmt_num(min), fmt_mm(max)))
                .long_name(format!("{} ({}) - Stair Riser", flight.label(), flight.storey_name()))
                .log(format!("riser_source={}", flight.provenance("riser")))
        })
        .collect();
    Ok(verdicts)
}

pub fn stair_tread(ctx: &RuleContext<'_>) -> Result<Vec<Verdict>> {
    let rule = minimum(
        ElementGroup::StairFlights,
        "tread",
        "Tread depth",
        "DB SUA 1",
        ctx.thresholds.stair_tread_mm,
    );
    Ok(rule.check(ctx, ctx.elements(ElementGroup::StairFlights)))
}

pub fn railing_height(ctx: &RuleContext<'_>) -> Result<Vec<Verdict>> {
    let rule = minimum(
        ElementGroup::Railings,
        "height",
        "Guardrail height",
        "DB SUA 1",
        ctx.thresholds.railing_height_mm,
    );
    Ok(rule.check(ctx, ctx.elements(ElementGroup::Railings)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Thresholds;
    use crate::rules::test_support::*;
    use ifcore_model::IfcType;

    fn space(id: u32, name: &str, long_name: Option<&str>) -> ElementRecord {
        let mut space = record(id, IfcType::IfcSpace, name);
        space.long_name = long_name.map(str::to_string);
        space
    }

    #[test]
    fn test_rectangle_short_side() {
        // 1.2 x 5 m corridor
        assert!((rectangle_short_side(6.0, 12.4) - 1.2).abs() < 1e-9);
        // no real rectangle: square estimate
        assert!((rectangle_short_side(10.0, 4.0) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_corridor_detection_uses_whole_words() {
        assert!(is_corridor(&space(1, "101", Some("Main Corridor"))));
        assert!(is_corridor(&space(2, "Pasillo 2", None)));
        assert!(is_corridor(&space(3, "Hall", Some(" "))));
        assert!(!is_corridor(&space(4, "Challenge Room", None)));
        assert!(!is_corridor(&space(5, "Hall", Some("Bedroom"))));
    }

    #[test]
    fn test_corridor_width() {
        let population = population(vec![(
            ElementGroup::Spaces,
            vec![
                with_length(
                    with_number(space(1, "C1", Some("Corridor")), "area", 6.0),
                    "perimeter",
                    12400.0,
                ),
                with_length(
                    with_number(space(2, "C2", Some("Corridor")), "area", 4.0),
                    "perimeter",
                    10000.0,
                ),
                space(3, "C3", Some("Hallway")),
                with_number(space(4, "Kitchen", None), "area", 12.0),
            ],
        )]);
        let thresholds = Thresholds::default();
        let verdicts = corridor_width(&RuleContext::new(&population, &thresholds)).unwrap();
        assert_eq!(
            statuses(&verdicts),
            vec![CheckStatus::Pass, CheckStatus::Fail, CheckStatus::Blocked]
        );
        assert_eq!(verdicts[0].actual_value.as_deref(), Some("~1200 mm"));
        assert!(verdicts[2]
            .comment
            .as_deref()
            .unwrap()
            .starts_with("Corridor area not found"));
    }

    #[test]
    fn test_room_area_in_square_metres() {
        let population = population(vec![(
            ElementGroup::Spaces,
            vec![
                with_number(space(1, "Bedroom", None), "area", 4.5),
                with_number(space(2, "Living", None), "area", 20.126),
            ],
        )]);
        let thresholds = Thresholds::default();
        let verdicts = room_area(&RuleContext::new(&population, &thresholds)).unwrap();
        assert_eq!(statuses(&verdicts), vec![CheckStatus::Fail, CheckStatus::Pass]);
        assert_eq!(verdicts[0].actual_value.as_deref(), Some("4.5 m²"));
        assert_eq!(verdicts[1].actual_value.as_deref(), Some("20.13 m²"));
        assert_eq!(verdicts[0].required_value.as_deref(), Some(">= 5 m²"));
    }

    #[test]
    fn test_stair_riser_and_tread_are_separate() {
        let flight = |id, riser, tread| {
            with_length(
                with_length(record(id, IfcType::IfcStairFlight, "Flight"), "riser", riser),
                "tread",
                tread,
            )
        };
        let population = population(vec![(
            ElementGroup::StairFlights,
            vec![flight(1, 175.0, 270.0), flight(2, 190.0, 290.0)],
        )]);
        let thresholds = Thresholds::default();
        let ctx = RuleContext::new(&population, &thresholds);

        let risers = stair_riser(&ctx).unwrap();
        assert_eq!(statuses(&risers), vec![CheckStatus::Pass, CheckStatus::Fail]);
        assert_eq!(risers[0].required_value.as_deref(), Some("130-185 mm"));

        let treads = stair_tread(&ctx).unwrap();
        assert_eq!(statuses(&treads), vec![CheckStatus::Fail, CheckStatus::Pass]);
    }

    #[test]
    fn test_door_window_opening_railing() {
        let population = population(vec![
            (
                ElementGroup::Doors,
                vec![with_length(record(1, IfcType::IfcDoor, "D1"), "width", 900.0)],
            ),
            (
                ElementGroup::Windows,
                vec![with_length(record(2, IfcType::IfcWindow, "W1"), "height", 1000.0)],
            ),
            (ElementGroup::Openings, vec![record(3, IfcType::IfcOpeningElement, "")]),
            (
                ElementGroup::Railings,
                vec![with_length(record(4, IfcType::IfcRailing, "R1"), "height", 1100.0)],
            ),
        ]);
        let thresholds = Thresholds::default();
        let ctx = RuleContext::new(&population, &thresholds);

        assert_eq!(statuses(&door_width(&ctx).unwrap()), vec![CheckStatus::Pass]);
        assert_eq!(statuses(&window_height(&ctx).unwrap()), vec![CheckStatus::Fail]);
        let openings = opening_height(&ctx).unwrap();
        assert_eq!(statuses(&openings), vec![CheckStatus::Blocked]);
        assert_eq!(openings[0].element_name, "Unknown Storey / IfcOpeningElement #3");
        assert_eq!(statuses(&railing_height(&ctx).unwrap()), vec![CheckStatus::Pass]);
    }
}
