// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Property, quantity and direct-attribute access for IFC elements

use crate::{EntityId, IfcType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A typed property value
///
/// Property values keep the type they were declared with in the file
/// (`IFCBOOLEAN(.T.)` is a boolean, `IFCLENGTHMEASURE(0.2)` is a real), so
/// consumers can decide how lenient to be when coercing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum PropertyValue {
    /// Measures and plain reals
    Real(f64),
    /// Integers and counts
    Integer(i64),
    /// IFCBOOLEAN and known IFCLOGICAL values
    Boolean(bool),
    /// Labels, texts, identifiers
    Text(String),
    /// Enumerated values (IfcPropertyEnumeratedValue)
    Enumeration(Vec<String>),
    /// Unset, or IFCLOGICAL(.U.)
    #[default]
    Null,
}

impl PropertyValue {
    /// Numeric view: reals, integers, and text that parses as a number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Real(v) => Some(*v),
            PropertyValue::Integer(v) => Some(*v as f64),
            PropertyValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Boolean view (strict: only declared booleans)
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Text view (first entry for enumerations)
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            PropertyValue::Enumeration(values) => values.first().map(String::as_str),
            _ => None,
        }
    }

    /// Check if the value carries no information
    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Real(v) => write!(f, "{}", v),
            PropertyValue::Integer(v) => write!(f, "{}", v),
            PropertyValue::Boolean(true) => f.write_str("True"),
            PropertyValue::Boolean(false) => f.write_str("False"),
            PropertyValue::Text(s) => f.write_str(s),
            PropertyValue::Enumeration(values) => f.write_str(&values.join(", ")),
            PropertyValue::Null => f.write_str("-"),
        }
    }
}

/// A single property value with optional unit
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// Property name
    pub name: String,
    /// Typed value
    pub value: PropertyValue,
    /// Unit of measurement (if applicable)
    pub unit: Option<String>,
}

impl Property {
    /// Create a new property
    pub fn new(name: impl Into<String>, value: PropertyValue) -> Self {
        Self {
            name: name.into(),
            value,
            unit: None,
        }
    }

    /// Create a property with unit
    pub fn with_unit(name: impl Into<String>, value: PropertyValue, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value,
            unit: Some(unit.into()),
        }
    }
}

/// A property set containing multiple properties
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertySet {
    /// Property set name (e.g., "Pset_WallCommon")
    pub name: String,
    /// Properties in this set
    pub properties: Vec<Property>,
}

impl PropertySet {
    /// Create a new property set
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
        }
    }

    /// Add a property to this set
    pub fn add(&mut self, property: Property) {
        self.properties.push(property);
    }

    /// Builder-style add
    pub fn with(mut self, name: impl Into<String>, value: PropertyValue) -> Self {
        self.add(Property::new(name, value));
        self
    }

    /// Get a property by name
    pub fn get(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }
}

/// Quantity types supported in IFC
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuantityType {
    /// Linear measurement (IfcQuantityLength)
    Length,
    /// Area measurement (IfcQuantityArea)
    Area,
    /// Volume measurement (IfcQuantityVolume)
    Volume,
    /// Count (IfcQuantityCount)
    Count,
    /// Weight/mass measurement (IfcQuantityWeight)
    Weight,
    /// Time measurement (IfcQuantityTime)
    Time,
}

impl QuantityType {
    /// Map a quantity entity type to its quantity kind
    pub fn from_ifc_type(ifc_type: &IfcType) -> Option<Self> {
        match ifc_type {
            IfcType::IfcQuantityLength => Some(QuantityType::Length),
            IfcType::IfcQuantityArea => Some(QuantityType::Area),
            IfcType::IfcQuantityVolume => Some(QuantityType::Volume),
            IfcType::IfcQuantityCount => Some(QuantityType::Count),
            IfcType::IfcQuantityWeight => Some(QuantityType::Weight),
            IfcType::IfcQuantityTime => Some(QuantityType::Time),
            _ => None,
        }
    }
}

/// A quantity value with type
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    /// Quantity name
    pub name: String,
    /// Numeric value in the model's declared units
    pub value: f64,
    /// Type of quantity
    pub quantity_type: QuantityType,
}

impl Quantity {
    /// Create a new quantity
    pub fn new(name: impl Into<String>, value: f64, quantity_type: QuantityType) -> Self {
        Self {
            name: name.into(),
            value,
            quantity_type,
        }
    }
}

/// A named quantity set (IfcElementQuantity)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuantitySet {
    /// Quantity set name (e.g., "Qto_WallBaseQuantities")
    pub name: String,
    /// Quantities in this set
    pub quantities: Vec<Quantity>,
}

impl QuantitySet {
    /// Create a new, empty quantity set
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantities: Vec::new(),
        }
    }

    /// Builder-style add
    pub fn with(mut self, name: impl Into<String>, value: f64, quantity_type: QuantityType) -> Self {
        self.quantities.push(Quantity::new(name, value, quantity_type));
        self
    }

    /// Get a quantity by name
    pub fn get(&self, name: &str) -> Option<&Quantity> {
        self.quantities.iter().find(|q| q.name == name)
    }
}

/// Direct (schema) attributes of an element
///
/// These are the attributes a check may read without going through a
/// property set. Overall dimensions are only populated for doors and windows.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementInfo {
    pub id: EntityId,
    pub ifc_type: IfcType,
    pub global_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub object_type: Option<String>,
    /// LongName of spatial elements (e.g. room names on IfcSpace)
    pub long_name: Option<String>,
    pub tag: Option<String>,
    /// PredefinedType enumeration, e.g. "BASESLAB" for ground slabs
    pub predefined_type: Option<String>,
    /// OverallHeight in model length units
    pub overall_height: Option<f64>,
    /// OverallWidth in model length units
    pub overall_width: Option<f64>,
}

/// Property and quantity reader trait
///
/// Provides access to the data a compliance check reads from an element:
/// property sets and quantity sets attached to the element itself, the
/// property sets of its type object, and the element's direct attributes.
///
/// # Example
///
/// ```ignore
/// use ifcore_model::{PropertyReader, EntityId};
///
/// fn fire_rating(props: &dyn PropertyReader, wall_id: EntityId) -> Option<String> {
///     props
///         .get_property(wall_id, "FireRating")
///         .and_then(|p| p.value.as_text().map(str::to_string))
/// }
/// ```
pub trait PropertyReader: Send + Sync {
    /// Get all property sets attached to an entity
    ///
    /// # Arguments
    /// * `id` - The entity ID to get property sets for
    ///
    /// # Returns
    /// A vector of property sets (empty if none found)
    fn property_sets(&self, id: EntityId) -> Vec<PropertySet>;

    /// Get all quantity sets attached to an entity
    ///
    /// # Arguments
    /// * `id` - The entity ID to get quantity sets for
    ///
    /// # Returns
    /// A vector of quantity sets (empty if none found)
    fn quantity_sets(&self, id: EntityId) -> Vec<QuantitySet>;

    /// Get the type object assigned to an element (IfcRelDefinesByType)
    ///
    /// # Arguments
    /// * `id` - The element ID
    ///
    /// # Returns
    /// The type object ID if the element has one
    fn type_object(&self, id: EntityId) -> Option<EntityId>;

    /// Get the property sets of an element's type object
    ///
    /// Includes both the type's own HasPropertySets and any property sets
    /// attached to the type through IfcRelDefinesByProperties.
    ///
    /// # Arguments
    /// * `id` - The element ID (not the type ID)
    ///
    /// # Returns
    /// A vector of property sets (empty if the element has no type)
    fn type_property_sets(&self, id: EntityId) -> Vec<PropertySet>;

    /// Get an element's direct attributes
    ///
    /// # Arguments
    /// * `id` - The element ID
    ///
    /// # Returns
    /// The decoded attributes, or `None` if the entity does not exist
    fn element_info(&self, id: EntityId) -> Option<ElementInfo>;

    /// Get all quantities attached to an entity, flattened across sets
    fn quantities(&self, id: EntityId) -> Vec<Quantity> {
        self.quantity_sets(id)
            .into_iter()
            .flat_map(|set| set.quantities)
            .collect()
    }

    /// Get a specific property by name
    ///
    /// Searches all property sets for the entity and returns the first
    /// property with the matching name.
    fn get_property(&self, id: EntityId, name: &str) -> Option<Property> {
        self.property_sets(id)
            .into_iter()
            .flat_map(|pset| pset.properties)
            .find(|p| p.name == name)
    }

    /// Get entity's Name attribute
    fn name(&self, id: EntityId) -> Option<String> {
        self.element_info(id).and_then(|info| info.name)
    }
}
