// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Multi-source attribute resolution
//!
//! The same physical attribute lives in different places depending on the
//! authoring tool: quantity sets, instance or type property sets, material
//! layers, direct attributes or even the element name. An [`AttributeSpec`]
//! names an attribute and the ordered list of [`Source`]s to try; the first
//! source that yields a usable value wins and is recorded as the value's
//! [`Provenance`]. No source is ever merged with another.
//!
//! Chains are plain data. The standard [`Catalog`] can be replaced or
//! partially overridden from JSON.

use crate::element::{ElementGroup, ElementRecord, LayerSummary};
use crate::units::normalize_to_mm;
use crate::Result;
use ifcore_model::{PropertySet, PropertyValue};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

static DIMENSION_PAIR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s*[xX×]\s*(\d+)").expect("dimension pair pattern"));
static DIMENSION_MM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)\s*mm").expect("millimetre pattern"));

/// Whose material layers to sum
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerOwner {
    Instance,
    Type,
}

/// Direct schema attribute
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DirectAttribute {
    OverallHeight,
    OverallWidth,
}

/// Dimension read from an element name like `Footing - 900 x 300`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamePart {
    /// Smaller number of an `A x B` pair
    Smaller,
    /// Larger number of an `A x B` pair
    Larger,
    /// A standalone `NNN mm` token, only when no pair is present
    Millimetres,
}

/// One place to look for a value
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum Source {
    /// Named quantity sets, set-major; numeric only
    Quantities { sets: Vec<String>, keys: Vec<String> },
    /// Named instance property sets, set-major
    InstanceProperties { sets: Vec<String>, keys: Vec<String> },
    /// Named property sets of the element's type
    TypeProperties { sets: Vec<String>, keys: Vec<String> },
    /// Any instance property set, key-major
    AnyInstanceProperty { keys: Vec<String> },
    /// Any type property set, key-major
    AnyTypeProperty { keys: Vec<String> },
    MaterialLayers { owner: LayerOwner },
    Attribute { attribute: DirectAttribute },
    NameDimension { part: NamePart },
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Source {
    pub fn quantities(sets: &[&str], keys: &[&str]) -> Self {
        Source::Quantities {
            sets: strings(sets),
            keys: strings(keys),
        }
    }

    pub fn properties(sets: &[&str], keys: &[&str]) -> Self {
        Source::InstanceProperties {
            sets: strings(sets),
            keys: strings(keys),
        }
    }

    pub fn type_properties(sets: &[&str], keys: &[&str]) -> Self {
        Source::TypeProperties {
            sets: strings(sets),
            keys: strings(keys),
        }
    }

    pub fn any_property(keys: &[&str]) -> Self {
        Source::AnyInstanceProperty { keys: strings(keys) }
    }

    pub fn any_type_property(keys: &[&str]) -> Self {
        Source::AnyTypeProperty { keys: strings(keys) }
    }

    fn lookup(&self, kind: ValueKind, element: &ElementRecord) -> Option<Resolution> {
        match self {
            Source::Quantities { sets, keys } => sets.iter().find_map(|set_name| {
                let set = element.quantity_sets.iter().find(|q| &q.name == set_name)?;
                keys.iter().find_map(|key| {
                    let quantity = set.get(key)?;
                    let value = kind.from_number(quantity.value)?;
                    Some(Resolution::found(
                        value,
                        Provenance::Quantity {
                            set: set.name.clone(),
                            key: key.clone(),
                        },
                    ))
                })
            }),
            Source::InstanceProperties { sets, keys } => {
                named_sets(&element.property_sets, sets, keys, kind)
                    .map(|(value, set, key)| Resolution::found(value, Provenance::Property { set, key }))
            }
            Source::TypeProperties { sets, keys } => {
                named_sets(&element.type_property_sets, sets, keys, kind).map(|(value, set, key)| {
                    Resolution::found(value, Provenance::TypeProperty { set, key })
                })
            }
            Source::AnyInstanceProperty { keys } => any_set(&element.property_sets, keys, kind)
                .map(|(value, set, key)| Resolution::found(value, Provenance::Property { set, key })),
            Source::AnyTypeProperty { keys } => any_set(&element.type_property_sets, keys, kind)
                .map(|(value, set, key)| {
                    Resolution::found(value, Provenance::TypeProperty { set, key })
                }),
            Source::MaterialLayers { owner } => {
                if kind != ValueKind::Length {
                    return None;
                }
                let (summary, provenance): (&LayerSummary, _) = match owner {
                    LayerOwner::Instance => (&element.materials, Provenance::InstanceLayers),
                    LayerOwner::Type => (&element.type_materials, Provenance::TypeLayers),
                };
                // layer sums are already in millimetres
                summary
                    .total_mm
                    .filter(|mm| *mm > 0.0)
                    .map(|mm| Resolution::found(Value::Length(mm), provenance))
            }
            Source::Attribute { attribute } => {
                let raw = match attribute {
                    DirectAttribute::OverallHeight => element.overall_height,
                    DirectAttribute::OverallWidth => element.overall_width,
                }?;
                let value = kind.from_number(raw)?;
                Some(Resolution::found(value, Provenance::Attribute(*attribute)))
            }
            Source::NameDimension { part } => {
                if kind != ValueKind::Length {
                    return None;
                }
                let mm = name_dimension(element.name.as_deref()?, *part)?;
                Some(Resolution::found(Value::Length(mm), Provenance::Name(*part)))
            }
        }
    }

    /// Human-readable description for diagnostics
    pub fn describe(&self) -> String {
        match self {
            Source::Quantities { sets, keys } => {
                format!("{} [{}]", sets.join("/"), keys.join("|"))
            }
            Source::InstanceProperties { sets, keys } => {
                format!("{} [{}]", sets.join("/"), keys.join("|"))
            }
            Source::TypeProperties { sets, keys } => {
                format!("type {} [{}]", sets.join("/"), keys.join("|"))
            }
            Source::AnyInstanceProperty { keys } => format!("any property set [{}]", keys.join("|")),
            Source::AnyTypeProperty { keys } => {
                format!("any type property set [{}]", keys.join("|"))
            }
            Source::MaterialLayers { owner: LayerOwner::Instance } => "material layers".to_string(),
            Source::MaterialLayers { owner: LayerOwner::Type } => {
                "type material layers".to_string()
            }
            Source::Attribute { attribute } => format!("{:?} attribute", attribute),
            Source::NameDimension { .. } => "element name".to_string(),
        }
    }
}

fn named_sets(
    psets: &[PropertySet],
    sets: &[String],
    keys: &[String],
    kind: ValueKind,
) -> Option<(Value, String, String)> {
    sets.iter().find_map(|set_name| {
        let pset = psets.iter().find(|p| &p.name == set_name)?;
        keys.iter().find_map(|key| {
            let value = kind.from_property(&pset.get(key)?.value)?;
            Some((value, pset.name.clone(), key.clone()))
        })
    })
}

fn any_set(psets: &[PropertySet], keys: &[String], kind: ValueKind) -> Option<(Value, String, String)> {
    keys.iter().find_map(|key| {
        psets.iter().find_map(|pset| {
            let value = kind.from_property(&pset.get(key)?.value)?;
            Some((value, pset.name.clone(), key.clone()))
        })
    })
}

/// Parse a dimension in millimetres from an element name
pub fn name_dimension(name: &str, part: NamePart) -> Option<f64> {
    if let Some(caps) = DIMENSION_PAIR.captures(name) {
        let a: f64 = caps[1].parse().ok()?;
        let b: f64 = caps[2].parse().ok()?;
        return match part {
            NamePart::Smaller => Some(a.min(b)),
            NamePart::Larger => Some(a.max(b)),
            NamePart::Millimetres => None,
        };
    }
    match part {
        NamePart::Millimetres => DIMENSION_MM.captures(name)?[1].parse().ok(),
        _ => None,
    }
}

/// How a raw value is interpreted
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// Positive length, normalized to millimetres
    Length,
    /// Any finite number, kept as-is
    Number,
    Flag,
    /// Non-empty text
    Text,
}

impl ValueKind {
    fn from_number(self, raw: f64) -> Option<Value> {
        if !raw.is_finite() {
            return None;
        }
        match self {
            ValueKind::Length if raw > 0.0 => Some(Value::Length(normalize_to_mm(raw))),
            ValueKind::Length => None,
            ValueKind::Number => Some(Value::Number(raw)),
            ValueKind::Flag | ValueKind::Text => None,
        }
    }

    fn from_property(self, value: &PropertyValue) -> Option<Value> {
        match self {
            ValueKind::Length | ValueKind::Number => self.from_number(value.as_f64()?),
            ValueKind::Flag => match value {
                PropertyValue::Boolean(b) => Some(Value::Flag(*b)),
                PropertyValue::Integer(i) => Some(Value::Flag(*i != 0)),
                PropertyValue::Real(r) => Some(Value::Flag(*r != 0.0)),
                other => parse_flag(other.as_text()?).map(Value::Flag),
            },
            ValueKind::Text => {
                let text = match value {
                    PropertyValue::Null => return None,
                    PropertyValue::Text(_) | PropertyValue::Enumeration(_) => {
                        value.as_text()?.trim().to_string()
                    }
                    other => other.to_string(),
                };
                (!text.is_empty()).then_some(Value::Text(text))
            }
        }
    }
}

/// Lenient boolean parsing of text values
pub fn parse_flag(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" | ".t." => Some(true),
        "false" | "f" | "0" | "no" | "n" | ".f." => Some(false),
        _ => None,
    }
}

/// A resolved value
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Millimetres
    Length(f64),
    Number(f64),
    Flag(bool),
    Text(String),
}

/// Where a resolved value came from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Provenance {
    Quantity { set: String, key: String },
    Property { set: String, key: String },
    TypeProperty { set: String, key: String },
    InstanceLayers,
    TypeLayers,
    Attribute(DirectAttribute),
    Name(NamePart),
    NotFound,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::Quantity { set, key } => write!(f, "QTO:{}.{}", set, key),
            Provenance::Property { set, key } => write!(f, "PSET:{}.{}", set, key),
            Provenance::TypeProperty { set, key } => write!(f, "TYPE_PSET:{}.{}", set, key),
            Provenance::InstanceLayers => f.write_str("MAT:instance_layers"),
            Provenance::TypeLayers => f.write_str("MAT:type_layers"),
            Provenance::Attribute(attr) => write!(f, "ATTR:{:?}", attr),
            Provenance::Name(NamePart::Millimetres) => f.write_str("NAME:mm"),
            Provenance::Name(_) => f.write_str("NAME:AxB"),
            Provenance::NotFound => f.write_str("NOT_FOUND"),
        }
    }
}

impl Serialize for Provenance {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Outcome of resolving one attribute
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Resolution {
    pub value: Option<Value>,
    pub provenance: Provenance,
}

impl Resolution {
    pub fn found(value: Value, provenance: Provenance) -> Self {
        Self {
            value: Some(value),
            provenance,
        }
    }

    pub fn not_found() -> Self {
        Self {
            value: None,
            provenance: Provenance::NotFound,
        }
    }

    pub fn is_found(&self) -> bool {
        self.value.is_some()
    }
}

/// A named attribute and its source chain
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttributeSpec {
    pub name: String,
    pub kind: ValueKind,
    pub chain: Vec<Source>,
}

impl AttributeSpec {
    pub fn new(name: impl Into<String>, kind: ValueKind, chain: Vec<Source>) -> Self {
        Self {
            name: name.into(),
            kind,
            chain,
        }
    }

    /// Walk the chain; first usable value wins
    pub fn resolve(&self, element: &ElementRecord) -> Resolution {
        self.chain
            .iter()
            .find_map(|source| source.lookup(self.kind, element))
            .unwrap_or_else(Resolution::not_found)
    }

    /// The sources that were searched, for blocked comments
    pub fn searched(&self) -> String {
        self.chain
            .iter()
            .map(Source::describe)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Attribute specs per element group
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    groups: BTreeMap<ElementGroup, Vec<AttributeSpec>>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl Catalog {
    /// Empty catalog
    pub fn empty() -> Self {
        Self {
            groups: BTreeMap::new(),
        }
    }

    /// Parse a catalog and merge it over the standard one
    ///
    /// A spec with an existing name replaces it; new names are appended.
    pub fn from_json(json: &str) -> Result<Self> {
        let overrides: Catalog = serde_json::from_str(json)?;
        let mut catalog = Self::standard();
        for (group, specs) in overrides.groups {
            for spec in specs {
                catalog.insert(group, spec);
            }
        }
        Ok(catalog)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Add or replace a spec
    pub fn insert(&mut self, group: ElementGroup, spec: AttributeSpec) {
        let specs = self.groups.entry(group).or_default();
        match specs.iter_mut().find(|s| s.name == spec.name) {
            Some(existing) => *existing = spec,
            None => specs.push(spec),
        }
    }

    pub fn specs(&self, group: ElementGroup) -> &[AttributeSpec] {
        self.groups.get(&group).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn spec(&self, group: ElementGroup, name: &str) -> Option<&AttributeSpec> {
        self.specs(group).iter().find(|s| s.name == name)
    }

    /// Search description for an attribute, for blocked comments
    pub fn searched(&self, group: ElementGroup, name: &str) -> String {
        self.spec(group, name)
            .map(AttributeSpec::searched)
            .unwrap_or_else(|| "no configured sources".to_string())
    }

    /// Built-in chains, tuned for Revit, ArchiCAD and plain IFC exports
    pub fn standard() -> Self {
        use Source as S;
        use ValueKind::*;

        const REVIT_DIMS: &str = "PSet_Revit_Dimensions";
        const REVIT_TYPE_DIMS: &str = "PSet_Revit_Type_Dimensions";
        const REVIT_CONSTRUCTION: &str = "PSet_Revit_Type_Construction";
        const REVIT_CONSTRAINTS: &str = "PSet_Revit_Constraints";

        let mat = |owner| S::MaterialLayers { owner };
        let attr = |attribute| S::Attribute { attribute };
        let name = |part| S::NameDimension { part };

        let wall_sets = ["Pset_WallCommon", "Construction", "Dimensions"];
        let u_keys = ["ThermalTransmittance", "UValue", "U-value"];

        let mut catalog = Self::empty();
        let mut add = |group, spec| catalog.insert(group, spec);

        // walls
        add(
            ElementGroup::Walls,
            AttributeSpec::new(
                "thickness",
                Length,
                vec![
                    S::quantities(&["Qto_WallBaseQuantities", "BaseQuantities", "Dimensions"], &["Width", "Thickness"]),
                    S::properties(&wall_sets, &["Width", "Thickness"]),
                    S::type_properties(&[REVIT_CONSTRUCTION], &["Width"]),
                    S::type_properties(&wall_sets, &["Width", "Thickness"]),
                    mat(LayerOwner::Instance),
                    mat(LayerOwner::Type),
                ],
            ),
        );
        add(
            ElementGroup::Walls,
            AttributeSpec::new(
                "height",
                Length,
                vec![
                    S::quantities(&["Qto_WallBaseQuantities", "BaseQuantities"], &["Height"]),
                    S::properties(&[REVIT_CONSTRAINTS], &["Unconnected Height"]),
                    S::properties(&wall_sets, &["Height"]),
                    S::type_properties(&wall_sets, &["Height"]),
                    S::any_property(&["Height"]),
                ],
            ),
        );
        add(
            ElementGroup::Walls,
            AttributeSpec::new(
                "length",
                Length,
                vec![
                    S::quantities(&["Qto_WallBaseQuantities", "BaseQuantities"], &["Length"]),
                    S::properties(&wall_sets, &["Length"]),
                ],
            ),
        );
        add(
            ElementGroup::Walls,
            AttributeSpec::new(
                "area",
                Number,
                vec![
                    S::quantities(
                        &["Qto_WallBaseQuantities", "BaseQuantities"],
                        &["NetSideArea", "GrossSideArea"],
                    ),
                    S::properties(&wall_sets, &["Area"]),
                ],
            ),
        );
        add(
            ElementGroup::Walls,
            AttributeSpec::new(
                "u_value",
                Number,
                vec![
                    S::properties(&["Pset_WallCommon"], &u_keys),
                    S::any_property(&u_keys),
                    S::type_properties(&["Pset_WallCommon"], &u_keys),
                    S::any_type_property(&u_keys),
                ],
            ),
        );
        for (attribute, key) in [
            ("is_external", "IsExternal"),
            ("load_bearing", "LoadBearing"),
        ] {
            add(
                ElementGroup::Walls,
                AttributeSpec::new(
                    attribute,
                    Flag,
                    vec![
                        S::properties(&["Pset_WallCommon"], &[key]),
                        S::type_properties(&["Pset_WallCommon"], &[key]),
                        S::any_property(&[key]),
                        S::any_type_property(&[key]),
                    ],
                ),
            );
        }
        add(
            ElementGroup::Walls,
            AttributeSpec::new(
                "fire_rating",
                Text,
                vec![
                    S::properties(&["Pset_WallCommon"], &["FireRating"]),
                    S::type_properties(&["Pset_WallCommon"], &["FireRating"]),
                    S::any_property(&["FireRating"]),
                    S::any_type_property(&["FireRating"]),
                ],
            ),
        );

        // slabs: material layers are the most reliable source for slabs
        add(
            ElementGroup::Slabs,
            AttributeSpec::new(
                "thickness",
                Length,
                vec![
                    mat(LayerOwner::Instance),
                    S::quantities(
                        &["Qto_SlabBaseQuantities", "BaseQuantities"],
                        &["Depth", "Width", "Height"],
                    ),
                    S::properties(&[REVIT_DIMS, "Pset_SlabCommon", "Dimensions"], &["Thickness", "Depth"]),
                    S::type_properties(&[REVIT_CONSTRUCTION], &["Default Thickness"]),
                    mat(LayerOwner::Type),
                    name(NamePart::Millimetres),
                ],
            ),
        );

        // beams
        add(
            ElementGroup::Beams,
            AttributeSpec::new(
                "depth",
                Length,
                vec![
                    S::properties(&[REVIT_TYPE_DIMS], &["d", "h"]),
                    S::type_properties(&[REVIT_TYPE_DIMS], &["d", "h"]),
                    S::quantities(&["Qto_BeamBaseQuantities", "BaseQuantities"], &["Depth", "Height"]),
                    S::properties(&["Pset_BeamCommon"], &["Depth"]),
                    S::any_property(&["CrossSectionHeight", "Depth", "Height"]),
                    name(NamePart::Larger),
                ],
            ),
        );
        add(
            ElementGroup::Beams,
            AttributeSpec::new(
                "width",
                Length,
                vec![
                    S::properties(&[REVIT_TYPE_DIMS], &["bf", "tw", "b"]),
                    S::type_properties(&[REVIT_TYPE_DIMS], &["bf", "tw", "b"]),
                    S::quantities(&["Qto_BeamBaseQuantities", "BaseQuantities"], &["Width"]),
                    S::properties(&["Pset_BeamCommon"], &["Width"]),
                    S::any_property(&["CrossSectionWidth", "Width"]),
                    name(NamePart::Smaller),
                ],
            ),
        );

        // columns
        add(
            ElementGroup::Columns,
            AttributeSpec::new(
                "width",
                Length,
                vec![
                    S::properties(&[REVIT_TYPE_DIMS], &["b", "bf"]),
                    S::type_properties(&[REVIT_TYPE_DIMS], &["b", "bf"]),
                    S::quantities(&["Qto_ColumnBaseQuantities", "BaseQuantities"], &["Width"]),
                    name(NamePart::Smaller),
                ],
            ),
        );
        add(
            ElementGroup::Columns,
            AttributeSpec::new(
                "depth",
                Length,
                vec![
                    S::properties(&[REVIT_TYPE_DIMS], &["d", "h"]),
                    S::type_properties(&[REVIT_TYPE_DIMS], &["d", "h"]),
                    S::quantities(&["Qto_ColumnBaseQuantities", "BaseQuantities"], &["Depth"]),
                    name(NamePart::Larger),
                ],
            ),
        );

        // doors and windows
        add(
            ElementGroup::Doors,
            AttributeSpec::new(
                "width",
                Length,
                vec![
                    attr(DirectAttribute::OverallWidth),
                    S::quantities(&["Qto_DoorBaseQuantities", "BaseQuantities"], &["Width"]),
                    S::properties(&["Pset_DoorCommon"], &["Width"]),
                ],
            ),
        );
        add(
            ElementGroup::Windows,
            AttributeSpec::new(
                "height",
                Length,
                vec![
                    attr(DirectAttribute::OverallHeight),
                    S::quantities(&["Qto_WindowBaseQuantities", "BaseQuantities"], &["Height"]),
                    S::properties(&["Pset_WindowCommon"], &["Height"]),
                ],
            ),
        );
        add(
            ElementGroup::Openings,
            AttributeSpec::new(
                "height",
                Length,
                vec![
                    attr(DirectAttribute::OverallHeight),
                    S::quantities(&["Qto_OpeningElementBaseQuantities", "BaseQuantities"], &["Height"]),
                    S::any_property(&["Height"]),
                ],
            ),
        );

        // spaces
        add(
            ElementGroup::Spaces,
            AttributeSpec::new(
                "area",
                Number,
                vec![
                    S::properties(&[REVIT_DIMS], &["Area"]),
                    S::properties(&["GSA Space Areas"], &["GSA BIM Area"]),
                    S::quantities(
                        &["Qto_SpaceBaseQuantities", "BaseQuantities"],
                        &["NetFloorArea", "GrossFloorArea"],
                    ),
                ],
            ),
        );
        add(
            ElementGroup::Spaces,
            AttributeSpec::new(
                "perimeter",
                Length,
                vec![
                    S::properties(&[REVIT_DIMS], &["Perimeter"]),
                    S::quantities(
                        &["Qto_SpaceBaseQuantities", "BaseQuantities"],
                        &["NetPerimeter", "GrossPerimeter"],
                    ),
                ],
            ),
        );
        add(
            ElementGroup::Spaces,
            AttributeSpec::new(
                "ceiling_height",
                Length,
                vec![
                    S::properties(&[REVIT_DIMS], &["Unbounded Height"]),
                    S::properties(&[REVIT_CONSTRAINTS], &["Limit Offset"]),
                    S::quantities(
                        &["Qto_SpaceBaseQuantities", "BaseQuantities"],
                        &["Height", "FinishCeilingHeight"],
                    ),
                ],
            ),
        );
        add(
            ElementGroup::Spaces,
            AttributeSpec::new(
                "floor_load",
                Number,
                vec![S::any_property(&["DesignLoad", "FloorLoad", "LoadBearingCapacity"])],
            ),
        );

        // stairs and railings
        add(
            ElementGroup::StairFlights,
            AttributeSpec::new(
                "riser",
                Length,
                vec![
                    S::properties(&["Pset_StairFlightCommon"], &["RiserHeight"]),
                    S::quantities(&["Qto_StairFlightBaseQuantities"], &["RiserHeight"]),
                    S::type_properties(&["Pset_StairFlightCommon"], &["RiserHeight"]),
                ],
            ),
        );
        add(
            ElementGroup::StairFlights,
            AttributeSpec::new(
                "tread",
                Length,
                vec![
                    S::properties(&["Pset_StairFlightCommon"], &["TreadLength"]),
                    S::quantities(&["Qto_StairFlightBaseQuantities"], &["TreadLength"]),
                    S::type_properties(&["Pset_StairFlightCommon"], &["TreadLength"]),
                ],
            ),
        );
        add(
            ElementGroup::Railings,
            AttributeSpec::new(
                "height",
                Length,
                vec![
                    S::properties(&["Pset_RailingCommon"], &["Height"]),
                    S::type_properties(&[REVIT_CONSTRUCTION], &["Railing Height"]),
                    S::quantities(&["Qto_RailingBaseQuantities", "BaseQuantities"], &["Height"]),
                ],
            ),
        );

        // footings
        let footing_sets = ["Qto_FootingBaseQuantities", "BaseQuantities"];
        add(
            ElementGroup::Footings,
            AttributeSpec::new(
                "thickness",
                Length,
                vec![
                    S::quantities(&footing_sets, &["Depth", "Thickness", "Height"]),
                    mat(LayerOwner::Instance),
                    name(NamePart::Smaller),
                    name(NamePart::Millimetres),
                ],
            ),
        );
        add(
            ElementGroup::Footings,
            AttributeSpec::new(
                "length",
                Length,
                vec![S::quantities(&footing_sets, &["Length", "FootingLength"])],
            ),
        );
        add(
            ElementGroup::Footings,
            AttributeSpec::new(
                "width",
                Length,
                vec![
                    S::quantities(&footing_sets, &["Width", "FootingWidth"]),
                    name(NamePart::Larger),
                ],
            ),
        );
        add(
            ElementGroup::Footings,
            AttributeSpec::new(
                "bearing_capacity",
                Number,
                vec![S::any_property(&[
                    "BearingCapacity",
                    "AllowableBearingCapacity",
                    "WorkingStress",
                    "FatiguesDeTraball",
                    "SoilBearingCapacity",
                ])],
            ),
        );

        catalog
    }
}
