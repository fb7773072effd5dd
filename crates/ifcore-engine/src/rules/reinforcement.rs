// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Minimum concrete thickness for ground slabs and foundation elements

use super::RuleContext;
use crate::element::{ElementGroup, ElementRecord};
use crate::verdict::{fmt_mm, CheckStatus, Verdict};
use crate::Result;

fn thickness_verdict(
    ctx: &RuleContext<'_>,
    group: ElementGroup,
    element: &ElementRecord,
    min: f64,
    subject: &str,
) -> Verdict {
    let verdict = match element.length("thickness") {
        None => ctx.missing(group, element, "thickness", "Thickness"),
        Some(h) if h >= min => Verdict::for_element(element, CheckStatus::Pass).actual(fmt_mm(h)),
        Some(h) => Verdict::for_element(element, CheckStatus::Fail)
            .actual(fmt_mm(h))
            .comment(format!("{} is {} too thin", subject, fmt_mm((min - h).round()))),
    };
    verdict
        .required(format!(">= {}", fmt_mm(min)))
        .long_name(format!("{} ({})", element.label(), element.storey_name()))
        .log(format!("thickness_source={}", element.provenance("thickness")))
}

fn is_ground_slab(ctx: &RuleContext<'_>, slab: &ElementRecord) -> bool {
    let on_lowest = match (ctx.population.lowest_storey(), &slab.storey) {
        (Some(lowest), Some(storey)) => storey.id == lowest.id,
        _ => false,
    };
    on_lowest || slab.is_predefined("BASESLAB") || slab.name_lower().contains("ground")
}

pub fn ground_slab_thickness(ctx: &RuleContext<'_>) -> Result<Vec<Verdict>> {
    const GROUP: ElementGroup = ElementGroup::Slabs;
    let min = ctx.thresholds.ground_slab_min_mm;
    Ok(ctx
        .elements(GROUP)
        .iter()
        .filter(|slab| is_ground_slab(ctx, slab))
        .map(|slab| thickness_verdict(ctx, GROUP, slab, min, "Ground slab"))
        .collect())
}

/// Footings and base slabs
pub fn foundation_thickness(ctx: &RuleContext<'_>) -> Result<Vec<Verdict>> {
    let min = ctx.thresholds.foundation_min_mm;
    let footings = ctx
        .elements(ElementGroup::Footings)
        .iter()
        .map(|f| (ElementGroup::Footings, f));
    let base_slabs = ctx
        .elements(ElementGroup::Slabs)
        .iter()
        .filter(|s| s.is_predefined("BASESLAB"))
        .map(|s| (ElementGroup::Slabs, s));
    Ok(footings
        .chain(base_slabs)
        .map(|(group, element)| thickness_verdict(ctx, group, element, min, "Foundation"))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Thresholds;
    use crate::rules::test_support::*;
    use ifcore_model::IfcType;

    #[test]
    fn test_ground_slab_selection() {
        let ground = storey(1, "Ground", 0.0);
        let upper = storey(2, "First", 3000.0);
        let slab = |id: u32, name: &str, at: &crate::element::StoreyRef, h: f64| {
            let mut s = with_length(record(id, IfcType::IfcSlab, name), "thickness", h);
            s.storey = Some(at.clone());
            s
        };
        let mut base = slab(13, "Base", &upper, 400.0);
        base.predefined_type = Some("BASESLAB".to_string());

        let mut population = population(vec![(
            ElementGroup::Slabs,
            vec![
                slab(10, "Floor 200", &ground, 200.0),
                slab(11, "Floor 120", &ground, 120.0),
                slab(12, "Floor upper", &upper, 100.0),
                base,
                slab(14, "Ground terrace", &upper, 150.0),
            ],
        )]);
        population.storeys = vec![ground.clone(), upper.clone()];
        let thresholds = Thresholds::default();
        let verdicts = ground_slab_thickness(&RuleContext::new(&population, &thresholds)).unwrap();

        let ids: Vec<_> = verdicts.iter().map(|v| v.element_id.clone().unwrap()).collect();
        assert_eq!(ids, vec!["g10", "g11", "g13", "g14"]);
        assert_eq!(
            statuses(&verdicts),
            vec![
                CheckStatus::Pass,
                CheckStatus::Fail,
                CheckStatus::Pass,
                CheckStatus::Pass
            ]
        );
        assert_eq!(verdicts[1].comment.as_deref(), Some("Ground slab is 30 mm too thin"));
        assert_eq!(verdicts[1].required_value.as_deref(), Some(">= 150 mm"));
    }

    #[test]
    fn test_foundation_thickness_includes_base_slabs() {
        let mut base = with_length(record(2, IfcType::IfcSlab, "Base"), "thickness", 180.0);
        base.predefined_type = Some("BASESLAB".to_string());
        let population = population(vec![
            (
                ElementGroup::Footings,
                vec![
                    with_length(record(1, IfcType::IfcFooting, "F1"), "thickness", 400.0),
                    record(3, IfcType::IfcFooting, "F3"),
                ],
            ),
            (ElementGroup::Slabs, vec![base, record(4, IfcType::IfcSlab, "Floor")]),
        ]);
        let thresholds = Thresholds::default();
        let verdicts = foundation_thickness(&RuleContext::new(&population, &thresholds)).unwrap();
        assert_eq!(
            statuses(&verdicts),
            vec![CheckStatus::Pass, CheckStatus::Blocked, CheckStatus::Fail]
        );
        assert_eq!(verdicts[2].comment.as_deref(), Some("Foundation is 20 mm too thin"));
        assert_eq!(verdicts[2].element_type, "IfcSlab");
    }
}
