// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Element records: everything a rule may read about one element

use crate::classify::SpaceContext;
use crate::resolve::{Catalog, Resolution, Value};
use ifcore_model::{EntityId, IfcType, MaterialLayerSet, PropertySet, QuantitySet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Element population a group of rules iterates over
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementGroup {
    Walls,
    Slabs,
    Beams,
    Columns,
    Doors,
    Windows,
    Openings,
    Spaces,
    StairFlights,
    Railings,
    Footings,
}

impl ElementGroup {
    pub const ALL: [ElementGroup; 11] = [
        ElementGroup::Walls,
        ElementGroup::Slabs,
        ElementGroup::Beams,
        ElementGroup::Columns,
        ElementGroup::Doors,
        ElementGroup::Windows,
        ElementGroup::Openings,
        ElementGroup::Spaces,
        ElementGroup::StairFlights,
        ElementGroup::Railings,
        ElementGroup::Footings,
    ];

    /// IFC classes that make up the group
    ///
    /// Subtypes are listed explicitly since the type index is by exact class.
    pub fn classes(self) -> Vec<IfcType> {
        match self {
            ElementGroup::Walls => vec![IfcType::IfcWall, IfcType::IfcWallStandardCase],
            ElementGroup::Slabs => vec![IfcType::IfcSlab, IfcType::IfcSlabStandardCase],
            ElementGroup::Beams => vec![IfcType::IfcBeam, IfcType::IfcBeamStandardCase],
            ElementGroup::Columns => vec![IfcType::IfcColumn, IfcType::IfcColumnStandardCase],
            ElementGroup::Doors => vec![IfcType::IfcDoor, IfcType::IfcDoorStandardCase],
            ElementGroup::Windows => vec![IfcType::IfcWindow, IfcType::IfcWindowStandardCase],
            ElementGroup::Openings => vec![IfcType::IfcOpeningElement],
            ElementGroup::Spaces => vec![IfcType::IfcSpace],
            ElementGroup::StairFlights => vec![IfcType::IfcStairFlight],
            ElementGroup::Railings => vec![IfcType::IfcRailing],
            ElementGroup::Footings => vec![IfcType::IfcFooting],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ElementGroup::Walls => "walls",
            ElementGroup::Slabs => "slabs",
            ElementGroup::Beams => "beams",
            ElementGroup::Columns => "columns",
            ElementGroup::Doors => "doors",
            ElementGroup::Windows => "windows",
            ElementGroup::Openings => "openings",
            ElementGroup::Spaces => "spaces",
            ElementGroup::StairFlights => "stair_flights",
            ElementGroup::Railings => "railings",
            ElementGroup::Footings => "footings",
        }
    }
}

impl fmt::Display for ElementGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storey an element is contained in
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoreyRef {
    pub id: EntityId,
    pub name: String,
    /// Elevation in millimetres
    pub elevation_mm: f64,
}

/// Material layers of one owner, in millimetres
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerSummary {
    pub names: Vec<String>,
    pub thicknesses_mm: Vec<f64>,
    /// Sum of known layer thicknesses, if any layer declares one
    pub total_mm: Option<f64>,
}

impl LayerSummary {
    /// Summarize a layer set given the model's length scale
    pub fn from_layers(set: &MaterialLayerSet, scale_to_mm: f64) -> Self {
        Self {
            names: set.material_names(),
            thicknesses_mm: set
                .layers
                .iter()
                .filter_map(|l| l.thickness)
                .map(|t| crate::units::round_to(t * scale_to_mm, 2))
                .collect(),
            total_mm: set
                .total_thickness()
                .map(|t| crate::units::round_to(t * scale_to_mm, 2)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.thicknesses_mm.is_empty()
    }
}

/// Adjacent spaces found through space boundaries
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SpaceLinks {
    pub space_ids: Vec<String>,
    pub space_names: Vec<String>,
    /// Usage hints collected from the spaces, deduplicated in order
    pub hints: Vec<String>,
    /// Number of boundary relationships pointing at the element
    pub boundary_count: usize,
}

impl SpaceLinks {
    pub fn has_links(&self) -> bool {
        self.boundary_count > 0
    }
}

/// One building element under check
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ElementRecord {
    pub id: EntityId,
    /// GlobalId, or `#<id>` when the file omits it
    pub global_id: String,
    pub ifc_type: IfcType,
    pub name: Option<String>,
    pub long_name: Option<String>,
    pub object_type: Option<String>,
    pub predefined_type: Option<String>,
    pub storey: Option<StoreyRef>,
    pub type_name: Option<String>,

    pub property_sets: Vec<PropertySet>,
    pub type_property_sets: Vec<PropertySet>,
    pub quantity_sets: Vec<QuantitySet>,

    /// OverallHeight in model units (openings: from their first filling)
    pub overall_height: Option<f64>,
    /// OverallWidth in model units
    pub overall_width: Option<f64>,

    pub materials: LayerSummary,
    pub type_materials: LayerSummary,

    pub spaces: SpaceLinks,
    pub context: SpaceContext,

    /// Catalog attributes, keyed by attribute name
    pub resolved: BTreeMap<String, Resolution>,
}

impl ElementRecord {
    /// Create a bare record
    pub fn new(id: EntityId, ifc_type: IfcType) -> Self {
        Self {
            id,
            global_id: format!("#{}", id.0),
            ifc_type,
            ..Default::default()
        }
    }

    /// Resolve every catalog attribute of `group` into the record
    pub fn resolve_all(&mut self, catalog: &Catalog, group: ElementGroup) {
        let resolved: BTreeMap<_, _> = catalog
            .specs(group)
            .iter()
            .map(|spec| (spec.name.clone(), spec.resolve(self)))
            .collect();
        self.resolved = resolved;
    }

    pub fn resolution(&self, attribute: &str) -> Option<&Resolution> {
        self.resolved.get(attribute)
    }

    fn value(&self, attribute: &str) -> Option<&Value> {
        self.resolved.get(attribute).and_then(|r| r.value.as_ref())
    }

    /// Resolved length in millimetres
    pub fn length(&self, attribute: &str) -> Option<f64> {
        match self.value(attribute)? {
            Value::Length(mm) => Some(*mm),
            _ => None,
        }
    }

    /// Resolved plain number
    pub fn number(&self, attribute: &str) -> Option<f64> {
        match self.value(attribute)? {
            Value::Number(v) | Value::Length(v) => Some(*v),
            _ => None,
        }
    }

    pub fn flag(&self, attribute: &str) -> Option<bool> {
        match self.value(attribute)? {
            Value::Flag(b) => Some(*b),
            _ => None,
        }
    }

    pub fn text(&self, attribute: &str) -> Option<&str> {
        match self.value(attribute)? {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Provenance tag of an attribute, `NOT_FOUND` when unresolved
    pub fn provenance(&self, attribute: &str) -> String {
        self.resolved
            .get(attribute)
            .map(|r| r.provenance.to_string())
            .unwrap_or_else(|| "NOT_FOUND".to_string())
    }

    /// Name attribute, or `IfcX #id`
    pub fn label(&self) -> String {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("{} #{}", self.ifc_type.class_name(), self.id.0),
        }
    }

    pub fn storey_name(&self) -> &str {
        self.storey
            .as_ref()
            .map(|s| s.name.as_str())
            .unwrap_or("Unknown Storey")
    }

    /// `{storey} / {name}` as shown in reports
    pub fn display_name(&self) -> String {
        format!("{} / {}", self.storey_name(), self.label())
    }

    /// Lowercased name for keyword tests
    pub fn name_lower(&self) -> String {
        self.name.as_deref().unwrap_or_default().to_lowercase()
    }

    /// Check the PredefinedType enumeration (case-insensitive)
    pub fn is_predefined(&self, value: &str) -> bool {
        self.predefined_type
            .as_deref()
            .is_some_and(|p| p.eq_ignore_ascii_case(value))
    }
}

/// All element records of one model
#[derive(Clone, Debug, Default)]
pub struct Population {
    pub groups: BTreeMap<ElementGroup, Vec<ElementRecord>>,
    /// Storeys sorted by elevation
    pub storeys: Vec<StoreyRef>,
    pub catalog: Catalog,
    pub file_name: String,
    pub schema_version: String,
    /// Factor from model length units to millimetres
    pub length_scale_mm: f64,
}

impl Population {
    /// Records of a group (empty if the model has none)
    pub fn group(&self, group: ElementGroup) -> &[ElementRecord] {
        self.groups.get(&group).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn insert(&mut self, group: ElementGroup, record: ElementRecord) {
        self.groups.entry(group).or_default().push(record);
    }

    /// Lowest storey by elevation
    pub fn lowest_storey(&self) -> Option<&StoreyRef> {
        self.storeys.first()
    }

    pub fn element_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::Provenance;
    use ifcore_model::MaterialLayer;

    #[test]
    fn test_group_classes() {
        assert_eq!(
            ElementGroup::Walls.classes(),
            vec![IfcType::IfcWall, IfcType::IfcWallStandardCase]
        );
        assert_eq!(ElementGroup::StairFlights.to_string(), "stair_flights");
        assert_eq!(
            serde_json::to_string(&ElementGroup::StairFlights).unwrap(),
            "\"stair_flights\""
        );
    }

    #[test]
    fn test_display_name() {
        let mut record = ElementRecord::new(EntityId(42), IfcType::IfcWall);
        assert_eq!(record.display_name(), "Unknown Storey / IfcWall #42");
        assert_eq!(record.global_id, "#42");

        record.name = Some("Basic Wall:Interior".to_string());
        record.storey = Some(StoreyRef {
            id: EntityId(7),
            name: "Level 1".to_string(),
            elevation_mm: 0.0,
        });
        assert_eq!(record.display_name(), "Level 1 / Basic Wall:Interior");
    }

    #[test]
    fn test_layer_summary() {
        let set = MaterialLayerSet {
            name: None,
            layers: vec![
                MaterialLayer {
                    material: Some("Plaster".to_string()),
                    thickness: Some(0.015),
                },
                MaterialLayer {
                    material: Some("Brick".to_string()),
                    thickness: Some(0.115),
                },
            ],
        };
        let summary = LayerSummary::from_layers(&set, 1000.0);
        assert_eq!(summary.names, vec!["Plaster", "Brick"]);
        assert_eq!(summary.thicknesses_mm, vec![15.0, 115.0]);
        assert_eq!(summary.total_mm, Some(130.0));
        assert!(LayerSummary::default().is_empty());
    }

    #[test]
    fn test_typed_accessors() {
        let mut record = ElementRecord::new(EntityId(1), IfcType::IfcWall);
        record.resolved.insert(
            "thickness".to_string(),
            Resolution {
                value: Some(Value::Length(200.0)),
                provenance: Provenance::InstanceLayers,
            },
        );
        record.resolved.insert(
            "is_external".to_string(),
            Resolution {
                value: Some(Value::Flag(true)),
                provenance: Provenance::NotFound,
            },
        );
        assert_eq!(record.length("thickness"), Some(200.0));
        assert_eq!(record.number("thickness"), Some(200.0));
        assert_eq!(record.flag("is_external"), Some(true));
        assert_eq!(record.length("is_external"), None);
        assert_eq!(record.provenance("thickness"), "MAT:instance_layers");
        assert_eq!(record.provenance("height"), "NOT_FOUND");
    }
}
