// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Rule registry
//!
//! Every check is a plain function over the element population and the
//! thresholds, listed once in [`RULES`]. A rule emits exactly one verdict per
//! element it iterates over; unresolved inputs give `blocked` verdicts.
//! Returning `Err` means the rule as a whole could not run.

mod accessibility;
mod foundations;
mod reinforcement;
mod slab_design;
mod slabs;
mod structure;
mod walls;

use crate::config::Thresholds;
use crate::element::{ElementGroup, ElementRecord, Population};
use crate::verdict::{fmt_num, CheckStatus, Verdict};
use crate::Result;
use std::fmt;

/// Signature of a rule
pub type CheckFn = fn(&RuleContext<'_>) -> Result<Vec<Verdict>>;

/// A registered compliance rule
#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    /// Owning domain
    pub team: &'static str,
    pub description: &'static str,
    /// Population the rule iterates over
    pub group: ElementGroup,
    /// Catalog attributes the rule reads
    pub requires: &'static [&'static str],
    pub check: CheckFn,
}

impl Rule {
    /// Run the rule
    pub fn run(&self, ctx: &RuleContext<'_>) -> Result<Vec<Verdict>> {
        (self.check)(ctx)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("team", &self.team)
            .field("group", &self.group)
            .field("requires", &self.requires)
            .finish()
    }
}

/// Everything a rule may read
#[derive(Clone, Copy, Debug)]
pub struct RuleContext<'a> {
    pub population: &'a Population,
    pub thresholds: &'a Thresholds,
}

impl<'a> RuleContext<'a> {
    pub fn new(population: &'a Population, thresholds: &'a Thresholds) -> Self {
        Self {
            population,
            thresholds,
        }
    }

    pub fn elements(&self, group: ElementGroup) -> &'a [ElementRecord] {
        self.population.group(group)
    }

    /// Blocked verdict naming the sources searched for `attribute`
    pub fn missing(
        &self,
        group: ElementGroup,
        element: &ElementRecord,
        attribute: &str,
        label: &str,
    ) -> Verdict {
        Verdict::for_element(element, CheckStatus::Blocked)
            .comment(format!(
                "{} not found. Searched: {}",
                label,
                self.population.catalog.searched(group, attribute)
            ))
            .log(format!("{}_source=NOT_FOUND", attribute))
    }
}

/// A "value must reach a minimum" check on one attribute
pub(crate) struct Minimum<'a> {
    pub group: ElementGroup,
    pub attribute: &'a str,
    /// What is measured, e.g. "Beam depth"
    pub label: &'a str,
    /// Subject of the failure comment
    pub subject: &'a str,
    pub regulation: &'a str,
    pub minimum: f64,
    pub unit: &'a str,
}

impl Minimum<'_> {
    fn show(&self, value: f64) -> String {
        format!("{} {}", fmt_num(value), self.unit)
    }

    /// One verdict per element
    pub fn check<'e>(
        &self,
        ctx: &RuleContext<'_>,
        elements: impl IntoIterator<Item = &'e ElementRecord>,
    ) -> Vec<Verdict> {
        let required = format!(">= {}", self.show(self.minimum));
        elements
            .into_iter()
            .map(|element| {
                let verdict = match element.number(self.attribute) {
                    None => ctx.missing(self.group, element, self.attribute, self.label),
                    Some(value) if value < self.minimum => {
                        Verdict::for_element(element, CheckStatus::Fail)
                            .actual(self.show(value))
                            .comment(format!(
                                "{} {} < minimum {}",
                                self.subject,
                                self.show(value),
                                self.show(self.minimum)
                            ))
                    }
                    Some(value) => Verdict::for_element(element, CheckStatus::Pass)
                        .actual(self.show(value))
                        .comment(format!(
                            "{} satisfied: {} >= {}",
                            self.regulation,
                            self.show(value),
                            self.show(self.minimum)
                        )),
                };
                verdict
                    .required(required.clone())
                    .long_name(format!(
                        "{} ({}) - {}",
                        element.label(),
                        element.storey_name(),
                        self.label
                    ))
                    .log(format!(
                        "{}_source={}",
                        self.attribute,
                        element.provenance(self.attribute)
                    ))
            })
            .collect()
    }
}

/// Slabs that are finishes or non-structural build-ups
pub(crate) fn is_structural_slab(slab: &ElementRecord) -> bool {
    let name = slab.name_lower();
    !["finish", "wood joist", "live roof"]
        .iter()
        .any(|kw| name.contains(kw))
}

/// All registered rules, in report order
pub static RULES: &[Rule] = &[
    // walls
    Rule {
        name: "wall_thickness",
        team: "walls",
        description: "DB SE-F / EHE: wall thickness >= minimum",
        group: ElementGroup::Walls,
        requires: &["thickness"],
        check: walls::wall_thickness,
    },
    Rule {
        name: "wall_height",
        team: "walls",
        description: "Decree 141/2012: free height, reduced for service spaces",
        group: ElementGroup::Walls,
        requires: &["height"],
        check: walls::wall_height,
    },
    Rule {
        name: "wall_u_value",
        team: "walls",
        description: "CTE DB HE: external wall U-value <= limit",
        group: ElementGroup::Walls,
        requires: &["is_external", "u_value"],
        check: walls::wall_u_value,
    },
    Rule {
        name: "wall_external_u_value",
        team: "walls",
        description: "External walls must declare a U-value",
        group: ElementGroup::Walls,
        requires: &["is_external", "u_value"],
        check: walls::wall_external_u_value,
    },
    Rule {
        name: "wall_fire_rating",
        team: "walls",
        description: "Load-bearing walls must declare a fire rating",
        group: ElementGroup::Walls,
        requires: &["load_bearing", "fire_rating"],
        check: walls::wall_fire_rating,
    },
    Rule {
        name: "wall_space_boundary",
        team: "walls",
        description: "Walls should bound at least one space",
        group: ElementGroup::Walls,
        requires: &[],
        check: walls::wall_space_boundary,
    },
    // slabs
    Rule {
        name: "slab_thickness",
        team: "slabs",
        description: "EHE: floor slabs 100-200 mm, roof slabs 200-350 mm",
        group: ElementGroup::Slabs,
        requires: &["thickness"],
        check: slabs::slab_thickness,
    },
    // structure
    Rule {
        name: "beam_depth",
        team: "structure",
        description: "EHE / DB SE: beam depth >= minimum",
        group: ElementGroup::Beams,
        requires: &["depth"],
        check: structure::beam_depth,
    },
    Rule {
        name: "beam_width",
        team: "structure",
        description: "EHE / DB SE: beam width >= minimum",
        group: ElementGroup::Beams,
        requires: &["width"],
        check: structure::beam_width,
    },
    Rule {
        name: "column_min_dimension",
        team: "structure",
        description: "EHE: smallest column side >= minimum",
        group: ElementGroup::Columns,
        requires: &["width", "depth"],
        check: structure::column_min_dimension,
    },
    // accessibility
    Rule {
        name: "door_width",
        team: "accessibility",
        description: "DB SUA Annex A: door width >= minimum",
        group: ElementGroup::Doors,
        requires: &["width"],
        check: accessibility::door_width,
    },
    Rule {
        name: "window_height",
        team: "accessibility",
        description: "Decree 141/2012: window height >= minimum",
        group: ElementGroup::Windows,
        requires: &["height"],
        check: accessibility::window_height,
    },
    Rule {
        name: "opening_height",
        team: "accessibility",
        description: "DB SUA 2: opening clear height >= minimum",
        group: ElementGroup::Openings,
        requires: &["height"],
        check: accessibility::opening_height,
    },
    Rule {
        name: "corridor_width",
        team: "accessibility",
        description: "DB SUA Annex A: corridor width >= minimum",
        group: ElementGroup::Spaces,
        requires: &["area", "perimeter"],
        check: accessibility::corridor_width,
    },
    Rule {
        name: "room_area",
        team: "accessibility",
        description: "Decree 141/2012: room area >= minimum",
        group: ElementGroup::Spaces,
        requires: &["area"],
        check: accessibility::room_area,
    },
    Rule {
        name: "room_ceiling_height",
        team: "accessibility",
        description: "DB SUA 2: ceiling height >= minimum",
        group: ElementGroup::Spaces,
        requires: &["ceiling_height"],
        check: accessibility::room_ceiling_height,
    },
    Rule {
        name: "stair_riser",
        team: "accessibility",
        description: "DB SUA 1: riser within range",
        group: ElementGroup::StairFlights,
        requires: &["riser"],
        check: accessibility::stair_riser,
    },
    Rule {
        name: "stair_tread",
        team: "accessibility",
        description: "DB SUA 1: tread >= minimum",
        group: ElementGroup::StairFlights,
        requires: &["tread"],
        check: accessibility::stair_tread,
    },
    Rule {
        name: "railing_height",
        team: "accessibility",
        description: "DB SUA 1: guardrail height >= minimum",
        group: ElementGroup::Railings,
        requires: &["height"],
        check: accessibility::railing_height,
    },
    // foundations
    Rule {
        name: "foundation_slab_thickness",
        team: "foundations",
        description: "Art. 69: foundation slab thickness >= minimum",
        group: ElementGroup::Footings,
        requires: &["thickness"],
        check: foundations::foundation_slab_thickness,
    },
    Rule {
        name: "foundation_dimensions",
        team: "foundations",
        description: "Footing area against building load",
        group: ElementGroup::Footings,
        requires: &["length", "width"],
        check: foundations::foundation_dimensions,
    },
    Rule {
        name: "floor_capacity",
        team: "foundations",
        description: "Art. 128: floors the foundation can bear",
        group: ElementGroup::Footings,
        requires: &["bearing_capacity"],
        check: foundations::floor_capacity,
    },
    Rule {
        name: "bearing_beam_section",
        team: "foundations",
        description: "DB SE-AE: foundation beam section >= minimum",
        group: ElementGroup::Beams,
        requires: &["width", "depth"],
        check: foundations::bearing_beam_section,
    },
    // reinforcement
    Rule {
        name: "ground_slab_thickness",
        team: "reinforcement",
        description: "Ground floor slab thickness >= minimum",
        group: ElementGroup::Slabs,
        requires: &["thickness"],
        check: reinforcement::ground_slab_thickness,
    },
    Rule {
        name: "foundation_thickness",
        team: "reinforcement",
        description: "Foundation element thickness >= minimum",
        group: ElementGroup::Footings,
        requires: &["thickness"],
        check: reinforcement::foundation_thickness,
    },
    // slab design
    Rule {
        name: "slab_bending",
        team: "slab_design",
        description: "EC2 ULS bending of a one-metre strip",
        group: ElementGroup::Slabs,
        requires: &["thickness"],
        check: slab_design::slab_bending,
    },
    Rule {
        name: "slab_punching",
        team: "slab_design",
        description: "EC2 punching shear at an interior column",
        group: ElementGroup::Slabs,
        requires: &["thickness"],
        check: slab_design::slab_punching,
    },
    Rule {
        name: "slab_deflection",
        team: "slab_design",
        description: "EC2 span/effective depth limit",
        group: ElementGroup::Slabs,
        requires: &["thickness"],
        check: slab_design::slab_deflection,
    },
    Rule {
        name: "slab_cover",
        team: "slab_design",
        description: "EC2 nominal cover for the exposure class",
        group: ElementGroup::Slabs,
        requires: &[],
        check: slab_design::slab_cover,
    },
];

/// The full registry
pub fn registry() -> &'static [Rule] {
    RULES
}

/// Look up a rule by name
pub fn find(name: &str) -> Option<&'static Rule> {
    RULES.iter().find(|rule| rule.name == name)
}

/// Team names in registry order
pub fn teams() -> Vec<&'static str> {
    let mut teams: Vec<&'static str> = Vec::new();
    for rule in RULES {
        if !teams.contains(&rule.team) {
            teams.push(rule.team);
        }
    }
    teams
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::resolve::{Catalog, Provenance, Resolution, Value};
    use crate::element::StoreyRef;
    use ifcore_model::{EntityId, IfcType};

    pub fn record(id: u32, ifc_type: IfcType, name: &str) -> ElementRecord {
        let mut record = ElementRecord::new(EntityId(id), ifc_type);
        record.global_id = format!("g{}", id);
        record.name = Some(name.to_string());
        record
    }

    pub fn with_length(mut record: ElementRecord, attribute: &str, mm: f64) -> ElementRecord {
        record.resolved.insert(
            attribute.to_string(),
            Resolution::found(Value::Length(mm), Provenance::InstanceLayers),
        );
        record
    }

    pub fn with_number(mut record: ElementRecord, attribute: &str, value: f64) -> ElementRecord {
        record.resolved.insert(
            attribute.to_string(),
            Resolution::found(
                Value::Number(value),
                Provenance::Property {
                    set: "Test".to_string(),
                    key: attribute.to_string(),
                },
            ),
        );
        record
    }

    pub fn with_flag(mut record: ElementRecord, attribute: &str, value: bool) -> ElementRecord {
        record.resolved.insert(
            attribute.to_string(),
            Resolution::found(
                Value::Flag(value),
                Provenance::Property {
                    set: "Pset_WallCommon".to_string(),
                    key: attribute.to_string(),
                },
            ),
        );
        record
    }

    pub fn with_text(mut record: ElementRecord, attribute: &str, value: &str) -> ElementRecord {
        record.resolved.insert(
            attribute.to_string(),
            Resolution::found(
                Value::Text(value.to_string()),
                Provenance::Property {
                    set: "Pset_WallCommon".to_string(),
                    key: attribute.to_string(),
                },
            ),
        );
        record
    }

    pub fn storey(id: u32, name: &str, elevation_mm: f64) -> StoreyRef {
        StoreyRef {
            id: EntityId(id),
            name: name.to_string(),
            elevation_mm,
        }
    }

    pub fn population(groups: Vec<(ElementGroup, Vec<ElementRecord>)>) -> Population {
        Population {
            groups: groups.into_iter().collect(),
            catalog: Catalog::standard(),
            length_scale_mm: 1000.0,
            ..Default::default()
        }
    }

    pub fn statuses(verdicts: &[Verdict]) -> Vec<CheckStatus> {
        verdicts.iter().map(|v| v.check_status).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use ifcore_model::IfcType;
    use std::collections::HashSet;

    #[test]
    fn test_registry_names_unique() {
        let names: HashSet<_> = registry().iter().map(|r| r.name).collect();
        assert_eq!(names.len(), registry().len());
        assert!(find("wall_thickness").is_some());
        assert!(find("no_such_rule").is_none());
        assert_eq!(
            teams(),
            vec![
                "walls",
                "slabs",
                "structure",
                "accessibility",
                "foundations",
                "reinforcement",
                "slab_design"
            ]
        );
    }

    #[test]
    fn test_required_attributes_are_in_catalog() {
        let catalog = crate::resolve::Catalog::standard();
        for rule in registry() {
            for attribute in rule.requires {
                assert!(
                    catalog.spec(rule.group, attribute).is_some(),
                    "{} requires unknown attribute {}",
                    rule.name,
                    attribute
                );
            }
        }
    }

    #[test]
    fn test_minimum_emits_one_verdict_per_element() {
        let population = population(vec![(
            ElementGroup::Beams,
            vec![
                with_length(record(1, IfcType::IfcBeam, "B1"), "depth", 250.0),
                with_length(record(2, IfcType::IfcBeam, "B2"), "depth", 150.0),
                record(3, IfcType::IfcBeam, "B3"),
            ],
        )]);
        let thresholds = Thresholds::default();
        let ctx = RuleContext::new(&population, &thresholds);
        let minimum = Minimum {
            group: ElementGroup::Beams,
            attribute: "depth",
            label: "Beam depth",
            subject: "Beam depth",
            regulation: "EHE",
            minimum: 200.0,
            unit: "mm",
        };
        let verdicts = minimum.check(&ctx, ctx.elements(ElementGroup::Beams));
        assert_eq!(
            statuses(&verdicts),
            vec![CheckStatus::Pass, CheckStatus::Fail, CheckStatus::Blocked]
        );
        assert_eq!(verdicts[1].comment.as_deref(), Some("Beam depth 150 mm < minimum 200 mm"));
        assert!(verdicts[2]
            .comment
            .as_deref()
            .unwrap()
            .starts_with("Beam depth not found. Searched: PSet_Revit_Type_Dimensions"));
        assert!(verdicts.iter().all(|v| v.required_value.as_deref() == Some(">= 200 mm")));
    }

    #[test]
    fn test_structural_slab_filter() {
        assert!(is_structural_slab(&record(1, IfcType::IfcSlab, "Floor:Concrete 200")));
        assert!(!is_structural_slab(&record(2, IfcType::IfcSlab, "Floor Finish 20")));
        assert!(!is_structural_slab(&record(3, IfcType::IfcSlab, "Live Roof")));
    }
}
