// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types for IFC data representation

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Type-safe entity identifier
///
/// Wraps the raw STEP instance number (e.g., #123 becomes EntityId(123))
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize, Default,
)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u32> for EntityId {
    fn from(id: u32) -> Self {
        EntityId(id)
    }
}

impl From<EntityId> for u32 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

/// Generates [`IfcType`] together with its STEP-name lookup tables.
macro_rules! ifc_types {
    ($($variant:ident => $step:literal,)*) => {
        /// IFC entity type enumeration
        ///
        /// Covers the classes a compliance check needs to reach: spatial
        /// structure, building elements and their type objects, the
        /// relationships that link them, and the property, material and unit
        /// resources. Anything else is kept as [`IfcType::Unknown`].
        #[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum IfcType {
            $($variant,)*
            /// Unknown type - stores the original type name string
            Unknown(String),
        }

        impl IfcType {
            /// Parse a type name string into an IfcType (case-insensitive)
            pub fn parse(s: &str) -> Self {
                match s.to_ascii_uppercase().as_str() {
                    $($step => IfcType::$variant,)*
                    _ => IfcType::Unknown(s.to_string()),
                }
            }

            /// Get the STEP keyword (e.g., "IFCWALL")
            pub fn name(&self) -> &str {
                match self {
                    $(IfcType::$variant => $step,)*
                    IfcType::Unknown(s) => s,
                }
            }

            /// Get the schema class name (e.g., "IfcWall")
            pub fn class_name(&self) -> &str {
                match self {
                    $(IfcType::$variant => stringify!($variant),)*
                    IfcType::Unknown(s) => s,
                }
            }
        }
    };
}

ifc_types! {
    // Spatial structure
    IfcProject => "IFCPROJECT",
    IfcSite => "IFCSITE",
    IfcBuilding => "IFCBUILDING",
    IfcBuildingStorey => "IFCBUILDINGSTOREY",
    IfcSpace => "IFCSPACE",

    // Building elements
    IfcWall => "IFCWALL",
    IfcWallStandardCase => "IFCWALLSTANDARDCASE",
    IfcWallElementedCase => "IFCWALLELEMENTEDCASE",
    IfcCurtainWall => "IFCCURTAINWALL",
    IfcSlab => "IFCSLAB",
    IfcSlabStandardCase => "IFCSLABSTANDARDCASE",
    IfcRoof => "IFCROOF",
    IfcBeam => "IFCBEAM",
    IfcBeamStandardCase => "IFCBEAMSTANDARDCASE",
    IfcColumn => "IFCCOLUMN",
    IfcColumnStandardCase => "IFCCOLUMNSTANDARDCASE",
    IfcDoor => "IFCDOOR",
    IfcDoorStandardCase => "IFCDOORSTANDARDCASE",
    IfcWindow => "IFCWINDOW",
    IfcWindowStandardCase => "IFCWINDOWSTANDARDCASE",
    IfcStair => "IFCSTAIR",
    IfcStairFlight => "IFCSTAIRFLIGHT",
    IfcRamp => "IFCRAMP",
    IfcRampFlight => "IFCRAMPFLIGHT",
    IfcRailing => "IFCRAILING",
    IfcCovering => "IFCCOVERING",
    IfcPlate => "IFCPLATE",
    IfcMember => "IFCMEMBER",
    IfcFooting => "IFCFOOTING",
    IfcPile => "IFCPILE",
    IfcBuildingElementProxy => "IFCBUILDINGELEMENTPROXY",
    IfcOpeningElement => "IFCOPENINGELEMENT",
    IfcFurnishingElement => "IFCFURNISHINGELEMENT",

    // Type objects
    IfcWallType => "IFCWALLTYPE",
    IfcSlabType => "IFCSLABTYPE",
    IfcBeamType => "IFCBEAMTYPE",
    IfcColumnType => "IFCCOLUMNTYPE",
    IfcDoorType => "IFCDOORTYPE",
    IfcDoorStyle => "IFCDOORSTYLE",
    IfcWindowType => "IFCWINDOWTYPE",
    IfcWindowStyle => "IFCWINDOWSTYLE",
    IfcStairFlightType => "IFCSTAIRFLIGHTTYPE",
    IfcRailingType => "IFCRAILINGTYPE",
    IfcFootingType => "IFCFOOTINGTYPE",
    IfcSpaceType => "IFCSPACETYPE",
    IfcCoveringType => "IFCCOVERINGTYPE",
    IfcMemberType => "IFCMEMBERTYPE",
    IfcPlateType => "IFCPLATETYPE",
    IfcBuildingElementProxyType => "IFCBUILDINGELEMENTPROXYTYPE",

    // Relationships
    IfcRelAggregates => "IFCRELAGGREGATES",
    IfcRelContainedInSpatialStructure => "IFCRELCONTAINEDINSPATIALSTRUCTURE",
    IfcRelDefinesByProperties => "IFCRELDEFINESBYPROPERTIES",
    IfcRelDefinesByType => "IFCRELDEFINESBYTYPE",
    IfcRelAssociatesMaterial => "IFCRELASSOCIATESMATERIAL",
    IfcRelSpaceBoundary => "IFCRELSPACEBOUNDARY",
    IfcRelSpaceBoundary1stLevel => "IFCRELSPACEBOUNDARY1STLEVEL",
    IfcRelSpaceBoundary2ndLevel => "IFCRELSPACEBOUNDARY2NDLEVEL",
    IfcRelFillsElement => "IFCRELFILLSELEMENT",
    IfcRelVoidsElement => "IFCRELVOIDSELEMENT",

    // Properties and quantities
    IfcPropertySet => "IFCPROPERTYSET",
    IfcPropertySingleValue => "IFCPROPERTYSINGLEVALUE",
    IfcPropertyEnumeratedValue => "IFCPROPERTYENUMERATEDVALUE",
    IfcPropertyBoundedValue => "IFCPROPERTYBOUNDEDVALUE",
    IfcPropertyListValue => "IFCPROPERTYLISTVALUE",
    IfcElementQuantity => "IFCELEMENTQUANTITY",
    IfcQuantityLength => "IFCQUANTITYLENGTH",
    IfcQuantityArea => "IFCQUANTITYAREA",
    IfcQuantityVolume => "IFCQUANTITYVOLUME",
    IfcQuantityCount => "IFCQUANTITYCOUNT",
    IfcQuantityWeight => "IFCQUANTITYWEIGHT",
    IfcQuantityTime => "IFCQUANTITYTIME",

    // Materials
    IfcMaterial => "IFCMATERIAL",
    IfcMaterialLayer => "IFCMATERIALLAYER",
    IfcMaterialLayerSet => "IFCMATERIALLAYERSET",
    IfcMaterialLayerSetUsage => "IFCMATERIALLAYERSETUSAGE",
    IfcMaterialList => "IFCMATERIALLIST",

    // Units
    IfcUnitAssignment => "IFCUNITASSIGNMENT",
    IfcSiUnit => "IFCSIUNIT",
    IfcConversionBasedUnit => "IFCCONVERSIONBASEDUNIT",
    IfcMeasureWithUnit => "IFCMEASUREWITHUNIT",
    IfcDimensionalExponents => "IFCDIMENSIONALEXPONENTS",
    IfcDerivedUnit => "IFCDERIVEDUNIT",
    IfcMonetaryUnit => "IFCMONETARYUNIT",
}

impl FromStr for IfcType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl IfcType {
    /// Check if this type is a spatial structure element
    pub fn is_spatial(&self) -> bool {
        matches!(
            self,
            IfcType::IfcProject
                | IfcType::IfcSite
                | IfcType::IfcBuilding
                | IfcType::IfcBuildingStorey
                | IfcType::IfcSpace
        )
    }

    /// Check if this type is a space boundary relationship (any level)
    pub fn is_space_boundary(&self) -> bool {
        matches!(
            self,
            IfcType::IfcRelSpaceBoundary
                | IfcType::IfcRelSpaceBoundary1stLevel
                | IfcType::IfcRelSpaceBoundary2ndLevel
        )
    }

    /// Check if this type is a door or window (carries OverallHeight/OverallWidth)
    pub fn is_door_or_window(&self) -> bool {
        matches!(
            self,
            IfcType::IfcDoor
                | IfcType::IfcDoorStandardCase
                | IfcType::IfcWindow
                | IfcType::IfcWindowStandardCase
        )
    }
}

impl Default for IfcType {
    fn default() -> Self {
        IfcType::Unknown(String::new())
    }
}

impl fmt::Display for IfcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Decoded attribute value
///
/// Represents any value that can appear in an IFC entity's attribute list.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum AttributeValue {
    /// Null value ($)
    #[default]
    Null,
    /// Derived value (*)
    Derived,
    /// Entity reference (#123)
    EntityRef(EntityId),
    /// Boolean value
    Bool(bool),
    /// Integer value
    Integer(i64),
    /// Floating point value
    Float(f64),
    /// String value, with STEP escapes already decoded
    String(String),
    /// Enumeration value (.VALUE.)
    Enum(String),
    /// List of values
    List(Vec<AttributeValue>),
    /// Typed value like IFCLABEL('text')
    TypedValue(String, Vec<AttributeValue>),
}

impl AttributeValue {
    /// Try to get as entity reference
    pub fn as_entity_ref(&self) -> Option<EntityId> {
        match self {
            AttributeValue::EntityRef(id) => Some(*id),
            _ => None,
        }
    }

    /// Try to get as string (unwraps typed values)
    pub fn as_string(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            AttributeValue::TypedValue(_, args) => args.first().and_then(|a| a.as_string()),
            _ => None,
        }
    }

    /// Try to get as float (integers widen, typed values unwrap)
    pub fn as_float(&self) -> Option<f64> {
        match self {
            AttributeValue::Float(f) => Some(*f),
            AttributeValue::Integer(i) => Some(*i as f64),
            AttributeValue::TypedValue(_, args) => args.first().and_then(|a| a.as_float()),
            _ => None,
        }
    }

    /// Try to get as integer
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            AttributeValue::Integer(i) => Some(*i),
            AttributeValue::TypedValue(_, args) => args.first().and_then(|a| a.as_integer()),
            _ => None,
        }
    }

    /// Try to get as boolean
    ///
    /// `.T.`/`.F.` enumerations count as booleans; `.U.` (unknown) does not.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(b) => Some(*b),
            AttributeValue::Enum(s) => match s.to_ascii_uppercase().as_str() {
                "TRUE" | "T" => Some(true),
                "FALSE" | "F" => Some(false),
                _ => None,
            },
            AttributeValue::TypedValue(_, args) => args.first().and_then(|a| a.as_bool()),
            _ => None,
        }
    }

    /// Try to get as enum string
    pub fn as_enum(&self) -> Option<&str> {
        match self {
            AttributeValue::Enum(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as list
    pub fn as_list(&self) -> Option<&[AttributeValue]> {
        match self {
            AttributeValue::List(list) => Some(list),
            _ => None,
        }
    }

    /// Check if this is a null value
    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }
}

/// Decoded IFC entity
#[derive(Clone, Debug)]
pub struct DecodedEntity {
    /// Entity ID
    pub id: EntityId,
    /// Entity type
    pub ifc_type: IfcType,
    /// Attribute values in schema order
    pub attributes: Vec<AttributeValue>,
}

impl DecodedEntity {
    /// Get attribute at index
    pub fn get(&self, index: usize) -> Option<&AttributeValue> {
        self.attributes.get(index)
    }

    /// Get entity reference at index
    pub fn get_ref(&self, index: usize) -> Option<EntityId> {
        self.get(index).and_then(|v| v.as_entity_ref())
    }

    /// Get string at index
    pub fn get_string(&self, index: usize) -> Option<&str> {
        self.get(index).and_then(|v| v.as_string())
    }

    /// Get a non-empty string at index as an owned value
    pub fn get_text(&self, index: usize) -> Option<String> {
        self.get_string(index)
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
    }

    /// Get float at index
    pub fn get_float(&self, index: usize) -> Option<f64> {
        self.get(index).and_then(|v| v.as_float())
    }

    /// Get list at index
    pub fn get_list(&self, index: usize) -> Option<&[AttributeValue]> {
        self.get(index).and_then(|v| v.as_list())
    }

    /// Get boolean at index
    pub fn get_bool(&self, index: usize) -> Option<bool> {
        self.get(index).and_then(|v| v.as_bool())
    }

    /// Get enum string at index
    pub fn get_enum(&self, index: usize) -> Option<&str> {
        self.get(index).and_then(|v| v.as_enum())
    }

    /// Get list of entity references at index
    ///
    /// A single reference in place of a list is accepted as a one-element list.
    pub fn get_refs(&self, index: usize) -> Option<Vec<EntityId>> {
        match self.get(index)? {
            AttributeValue::List(list) => {
                Some(list.iter().filter_map(|v| v.as_entity_ref()).collect())
            }
            AttributeValue::EntityRef(id) => Some(vec![*id]),
            _ => None,
        }
    }
}

/// Model metadata extracted from the STEP header
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// IFC schema version (e.g., "IFC2X3", "IFC4", "IFC4X3")
    pub schema_version: String,
    /// Originating system (CAD application)
    pub originating_system: Option<String>,
    /// Preprocessor version
    pub preprocessor_version: Option<String>,
    /// File name from header
    pub file_name: Option<String>,
    /// File description (view definition)
    pub file_description: Option<String>,
    /// Author
    pub author: Option<String>,
    /// Organization
    pub organization: Option<String>,
    /// Timestamp
    pub timestamp: Option<String>,
}
