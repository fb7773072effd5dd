// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Slab thickness ranges (EHE / Codigo Estructural)

use super::{is_structural_slab, RuleContext};
use crate::element::ElementGroup;
use crate::verdict::{fmt_mm, fmt_num, CheckStatus, Verdict};
use crate::Result;

const GROUP: ElementGroup = ElementGroup::Slabs;

/// Floor slabs and roof slabs have separate ranges; finishes are skipped
pub fn slab_thickness(ctx: &RuleContext<'_>) -> Result<Vec<Verdict>> {
    let t = ctx.thresholds;
    let verdicts = ctx
        .elements(GROUP)
        .iter()
        .filter(|slab| is_structural_slab(slab))
        .map(|slab| {
            let (min, max, kind) = if slab.name_lower().contains("roof") {
                (t.roof_slab_min_mm, t.roof_slab_max_mm, "roof slab")
            } else {
                (t.floor_slab_min_mm, t.floor_slab_max_mm, "floor slab")
            };
            let verdict = match slab.length("thickness") {
                None => ctx.missing(GROUP, slab, "thickness", "Thickness"),
                Some(h) if h < min => Verdict::for_element(slab, CheckStatus::Fail)
                    .actual(fmt_mm(h))
                    .comment(format!("{} is {} too thin", capitalize(kind), fmt_mm(min - h))),
                Some(h) if h > max => Verdict::for_element(slab, CheckStatus::Fail)
                    .actual(fmt_mm(h))
                    .comment(format!("{} is {} too thick", capitalize(kind), fmt_mm(h - max))),
                Some(h) => Verdict::for_element(slab, CheckStatus::Pass).actual(fmt_mm(h)),
            };
            verdict
                .required(format!("{}-{} mm ({})", fmt_num(min), fmt_num(max), kind))
                .long_name(format!("{} ({})", slab.label(), slab.storey_name()))
                .log(format!("thickness_source={}", slab.provenance("thickness")))
        })
        .collect();
    Ok(verdicts)
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Thresholds;
    use crate::rules::test_support::*;
    use ifcore_model::IfcType;

    #[test]
    fn test_slab_thickness_ranges() {
        let population = population(vec![(
            GROUP,
            vec![
                with_length(record(1, IfcType::IfcSlab, "Floor:Generic 150"), "thickness", 150.0),
                with_length(record(2, IfcType::IfcSlab, "Floor:Generic 80"), "thickness", 80.0),
                with_length(record(3, IfcType::IfcSlab, "Basic Roof 250"), "thickness", 250.0),
                with_length(record(4, IfcType::IfcSlab, "Basic Roof 400"), "thickness", 400.0),
                with_length(record(5, IfcType::IfcSlab, "Floor Finish"), "thickness", 20.0),
                record(6, IfcType::IfcSlab, "Floor"),
            ],
        )]);
        let thresholds = Thresholds::default();
        let verdicts = slab_thickness(&RuleContext::new(&population, &thresholds)).unwrap();

        assert_eq!(verdicts.len(), 5);
        assert_eq!(
            statuses(&verdicts),
            vec![
                CheckStatus::Pass,
                CheckStatus::Fail,
                CheckStatus::Pass,
                CheckStatus::Fail,
                CheckStatus::Blocked,
            ]
        );
        assert_eq!(verdicts[1].comment.as_deref(), Some("Floor slab is 20 mm too thin"));
        assert_eq!(verdicts[1].required_value.as_deref(), Some("100-200 mm (floor slab)"));
        assert_eq!(verdicts[3].comment.as_deref(), Some("Roof slab is 50 mm too thick"));
        assert_eq!(verdicts[3].required_value.as_deref(), Some("200-350 mm (roof slab)"));
        assert!(verdicts[0].comment.is_none());
    }
}
