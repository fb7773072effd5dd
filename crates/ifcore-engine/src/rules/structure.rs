// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Beam and column sections

use super::{Minimum, RuleContext};
use crate::element::ElementGroup;
use crate::verdict::{fmt_mm, CheckStatus, Verdict};
use crate::Result;

pub fn beam_depth(ctx: &RuleContext<'_>) -> Result<Vec<Verdict>> {
    let minimum = Minimum {
        group: ElementGroup::Beams,
        attribute: "depth",
        label: "Beam depth",
        subject: "Beam depth",
        regulation: "EHE / DB SE",
        minimum: ctx.thresholds.beam_depth_mm,
        unit: "mm",
    };
    Ok(minimum.check(ctx, ctx.elements(ElementGroup::Beams)))
}

pub fn beam_width(ctx: &RuleContext<'_>) -> Result<Vec<Verdict>> {
    let minimum = Minimum {
        group: ElementGroup::Beams,
        attribute: "width",
        label: "Beam width",
        subject: "Beam width",
        regulation: "EHE / DB SE",
        minimum: ctx.thresholds.beam_width_mm,
        unit: "mm",
    };
    Ok(minimum.check(ctx, ctx.elements(ElementGroup::Beams)))
}

/// The smaller of the resolved column sides must reach the minimum
pub fn column_min_dimension(ctx: &RuleContext<'_>) -> Result<Vec<Verdict>> {
    const GROUP: ElementGroup = ElementGroup::Columns;
    let min = ctx.thresholds.column_min_dim_mm;
    let verdicts = ctx
        .elements(GROUP)
        .iter()
        .map(|column| {
            let sides = [column.length("width"), column.length("depth")];
            let smallest = sides.iter().flatten().copied().reduce(f64::min);
            let verdict = match smallest {
                None => ctx.missing(GROUP, column, "width", "Column section"),
                Some(side) if side < min => Verdict::for_element(column, CheckStatus::Fail)
                    .actual(fmt_mm(side))
                    .comment(format!(
                        "Smallest column side {} < minimum {}",
                        fmt_mm(side),
                        fmt_mm(min)
                    )),
                Some(side) => Verdict::for_element(column, CheckStatus::Pass)
                    .actual(fmt_mm(side))
                    .comment(format!("EHE satisfied: {} >= {}", fmt_mm(side), fmt_mm(min))),
            };
            verdict
                .required(format!(">= {}", fmt_mm(min)))
                .long_name(format!(
                    "{} ({}) - Column Minimum Dimension",
                    column.label(),
                    column.storey_name()
                ))
                .log(format!(
                    "width_source={} depth_source={}",
                    column.provenance("width"),
                    column.provenance("depth")
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

    #[test]
    fn test_beam_depth_and_width() {
        let beam = with_length(
            with_length(record(1, IfcType::IfcBeam, "B 120x300"), "depth", 300.0),
            "width",
            120.0,
        );
        let population = population(vec![(ElementGroup::Beams, vec![beam])]);
        let thresholds = Thresholds::default();
        let ctx = RuleContext::new(&population, &thresholds);

        let depth = beam_depth(&ctx).unwrap();
        assert_eq!(statuses(&depth), vec![CheckStatus::Pass]);
        assert_eq!(
            depth[0].comment.as_deref(),
            Some("EHE / DB SE satisfied: 300 mm >= 200 mm")
        );

        let width = beam_width(&ctx).unwrap();
        assert_eq!(statuses(&width), vec![CheckStatus::Fail]);
        assert_eq!(
            width[0].comment.as_deref(),
            Some("Beam width 120 mm < minimum 150 mm")
        );
    }

    #[test]
    fn test_column_min_dimension() {
        let population = population(vec![(
            ElementGroup::Columns,
            vec![
                with_length(
                    with_length(record(1, IfcType::IfcColumn, "C1"), "width", 300.0),
                    "depth",
                    200.0,
                ),
                with_length(record(2, IfcType::IfcColumn, "C2"), "depth", 300.0),
                record(3, IfcType::IfcColumn, "C3"),
            ],
        )]);
        let thresholds = Thresholds::default();
        let verdicts = column_min_dimension(&RuleContext::new(&population, &thresholds)).unwrap();
        assert_eq!(
            statuses(&verdicts),
            vec![CheckStatus::Fail, CheckStatus::Pass, CheckStatus::Blocked]
        );
        assert_eq!(verdicts[0].actual_value.as_deref(), Some("200 mm"));
        assert_eq!(verdicts[2].log.as_deref(), Some("width_source=NOT_FOUND depth_source=NOT_FOUND"));
    }
}
