// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! PropertyReader trait implementation

use ifcore_model::{
    AttributeValue, DecodedEntity, ElementInfo, EntityId, EntityResolver, IfcType, Property,
    PropertyReader, PropertySet, PropertyValue, Quantity, QuantitySet, QuantityType,
};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Property reader implementation
///
/// Relationship caches are built once at construction; the property and
/// quantity entities themselves are decoded lazily through the resolver.
pub struct PropertyReaderImpl {
    resolver: Arc<dyn EntityResolver>,
    /// Object ID -> IfcPropertySet IDs
    pset_cache: FxHashMap<u32, Vec<EntityId>>,
    /// Object ID -> IfcElementQuantity IDs
    qset_cache: FxHashMap<u32, Vec<EntityId>>,
    /// Element ID -> type object ID
    type_cache: FxHashMap<u32, EntityId>,
}

impl PropertyReaderImpl {
    /// Create a new property reader
    pub fn new(resolver: Arc<dyn EntityResolver>) -> Self {
        let mut pset_cache: FxHashMap<u32, Vec<EntityId>> = FxHashMap::default();
        let mut qset_cache: FxHashMap<u32, Vec<EntityId>> = FxHashMap::default();
        let mut type_cache: FxHashMap<u32, EntityId> = FxHashMap::default();

        // IfcRelDefinesByProperties: RelatedObjects at 4, RelatingPropertyDefinition at 5
        for rel in resolver.entities_by_type(&IfcType::IfcRelDefinesByProperties) {
            let (Some(related), Some(definition_id)) = (rel.get_refs(4), rel.get_ref(5)) else {
                continue;
            };
            let Some(definition) = resolver.get(definition_id) else {
                continue;
            };

            let cache = match definition.ifc_type {
                IfcType::IfcPropertySet => &mut pset_cache,
                IfcType::IfcElementQuantity => &mut qset_cache,
                _ => continue,
            };
            for object in related {
                cache.entry(object.0).or_default().push(definition_id);
            }
        }

        // IfcRelDefinesByType: RelatedObjects at 4, RelatingType at 5
        for rel in resolver.entities_by_type(&IfcType::IfcRelDefinesByType) {
            let (Some(related), Some(type_id)) = (rel.get_refs(4), rel.get_ref(5)) else {
                continue;
            };
            for object in related {
                type_cache.entry(object.0).or_insert(type_id);
            }
        }

        log::debug!(
            "property index: {} objects with psets, {} with qsets, {} typed",
            pset_cache.len(),
            qset_cache.len(),
            type_cache.len()
        );

        Self {
            resolver,
            pset_cache,
            qset_cache,
            type_cache,
        }
    }

    /// Decode a property set entity (Name at 2, HasProperties at 4)
    fn read_property_set(&self, pset_id: EntityId) -> Option<PropertySet> {
        let pset = self.resolver.get(pset_id)?;
        if pset.ifc_type != IfcType::IfcPropertySet {
            return None;
        }

        let name = pset.get_text(2).unwrap_or_else(|| "Unknown".to_string());
        let properties = pset
            .get_refs(4)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|id| self.resolver.get(id))
            .filter_map(|prop| self.read_property(&prop))
            .collect();

        Some(PropertySet { name, properties })
    }

    /// Decode a single IfcProperty entity
    fn read_property(&self, prop: &DecodedEntity) -> Option<Property> {
        let name = prop.get_text(0)?;

        let value = match prop.ifc_type {
            // NominalValue at 2, Unit at 3
            IfcType::IfcPropertySingleValue => property_value(prop.get(2)?),
            // EnumerationValues at 2
            IfcType::IfcPropertyEnumeratedValue | IfcType::IfcPropertyListValue => {
                PropertyValue::Enumeration(
                    prop.get_list(2)?
                        .iter()
                        .map(property_value)
                        .filter(|v| !v.is_null())
                        .map(|v| v.to_string())
                        .collect(),
                )
            }
            // UpperBoundValue at 2, LowerBoundValue at 3
            IfcType::IfcPropertyBoundedValue => {
                let upper = prop.get(2).map(property_value).filter(|v| !v.is_null());
                let lower = prop.get(3).map(property_value).filter(|v| !v.is_null());
                match (lower, upper) {
                    (Some(l), Some(u)) => PropertyValue::Text(format!("{} - {}", l, u)),
                    (Some(l), None) => PropertyValue::Text(format!(">= {}", l)),
                    (None, Some(u)) => PropertyValue::Text(format!("<= {}", u)),
                    (None, None) => return None,
                }
            }
            _ => return None,
        };

        let unit = match prop.ifc_type {
            IfcType::IfcPropertySingleValue => prop.get(3).and_then(|v| self.unit_symbol(v)),
            _ => None,
        };

        Some(Property { name, value, unit })
    }

    /// Readable symbol for a unit reference (e.g. "mm", "m²")
    fn unit_symbol(&self, attr: &AttributeValue) -> Option<String> {
        let unit = self.resolver.get(attr.as_entity_ref()?)?;

        match unit.ifc_type {
            IfcType::IfcSiUnit => {
                let prefix = match unit.get_enum(2).unwrap_or("") {
                    "MILLI" => "m",
                    "CENTI" => "c",
                    "DECI" => "d",
                    "KILO" => "k",
                    _ => "",
                };
                let name = unit.get_enum(3)?;
                let symbol = match name {
                    "METRE" => "m",
                    "SQUARE_METRE" => "m²",
                    "CUBIC_METRE" => "m³",
                    "GRAM" => "g",
                    "SECOND" => "s",
                    "KELVIN" => "K",
                    "PASCAL" => "Pa",
                    "NEWTON" => "N",
                    _ => name,
                };
                Some(format!("{}{}", prefix, symbol))
            }
            // Name at 2
            IfcType::IfcConversionBasedUnit => unit.get_text(2),
            _ => None,
        }
    }

    /// Decode an IfcElementQuantity (Name at 2, Quantities at 5)
    fn read_quantity_set(&self, qset_id: EntityId) -> Option<QuantitySet> {
        let qset = self.resolver.get(qset_id)?;
        let name = qset.get_text(2).unwrap_or_else(|| "Unknown".to_string());

        let quantities = qset
            .get_refs(5)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|id| self.resolver.get(id))
            .filter_map(|qty| {
                // Name at 0, value at 3 for every IfcPhysicalSimpleQuantity
                let quantity_type = QuantityType::from_ifc_type(&qty.ifc_type)?;
                Some(Quantity::new(qty.get_text(0)?, qty.get_float(3)?, quantity_type))
            })
            .collect();

        Some(QuantitySet { name, quantities })
    }
}

/// Convert a NominalValue into a typed property value
fn property_value(attr: &AttributeValue) -> PropertyValue {
    match attr {
        AttributeValue::TypedValue(type_name, args) => {
            let Some(inner) = args.first() else {
                return PropertyValue::Null;
            };
            match type_name.as_str() {
                "IFCBOOLEAN" | "IFCLOGICAL" => inner
                    .as_bool()
                    .map(PropertyValue::Boolean)
                    .unwrap_or(PropertyValue::Null),
                _ => property_value(inner),
            }
        }
        AttributeValue::Float(f) => PropertyValue::Real(*f),
        AttributeValue::Integer(i) => PropertyValue::Integer(*i),
        AttributeValue::Bool(b) => PropertyValue::Boolean(*b),
        AttributeValue::String(s) => PropertyValue::Text(s.clone()),
        AttributeValue::Enum(e) => match attr.as_bool() {
            Some(b) => PropertyValue::Boolean(b),
            None if e.eq_ignore_ascii_case("U") || e.eq_ignore_ascii_case("UNKNOWN") => {
                PropertyValue::Null
            }
            None => PropertyValue::Text(e.clone()),
        },
        AttributeValue::List(items) => PropertyValue::Enumeration(
            items
                .iter()
                .map(property_value)
                .filter(|v| !v.is_null())
                .map(|v| v.to_string())
                .collect(),
        ),
        AttributeValue::EntityRef(_) | AttributeValue::Null | AttributeValue::Derived => {
            PropertyValue::Null
        }
    }
}

impl PropertyReader for PropertyReaderImpl {
    fn property_sets(&self, id: EntityId) -> Vec<PropertySet> {
        self.pset_cache
            .get(&id.0)
            .map(|ids| {
                ids.iter()
                    .filter_map(|pset_id| self.read_property_set(*pset_id))
                    .filter(|pset| !pset.properties.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn quantity_sets(&self, id: EntityId) -> Vec<QuantitySet> {
        self.qset_cache
            .get(&id.0)
            .map(|ids| {
                ids.iter()
                    .filter_map(|qset_id| self.read_quantity_set(*qset_id))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn type_object(&self, id: EntityId) -> Option<EntityId> {
        self.type_cache.get(&id.0).copied()
    }

    fn type_property_sets(&self, id: EntityId) -> Vec<PropertySet> {
        let Some(type_id) = self.type_object(id) else {
            return Vec::new();
        };
        let Some(type_entity) = self.resolver.get(type_id) else {
            return Vec::new();
        };

        // IfcTypeObject.HasPropertySets at 5
        let mut sets: Vec<PropertySet> = type_entity
            .get_refs(5)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|pset_id| self.read_property_set(pset_id))
            .filter(|pset| !pset.properties.is_empty())
            .collect();
        sets.extend(self.property_sets(type_id));
        sets
    }

    fn element_info(&self, id: EntityId) -> Option<ElementInfo> {
        let entity = self.resolver.get(id)?;
        let spatial = entity.ifc_type.is_spatial();
        let opening_filler = entity.ifc_type.is_door_or_window();

        Some(ElementInfo {
            id,
            ifc_type: entity.ifc_type.clone(),
            global_id: entity.get_text(0),
            name: entity.get_text(2),
            description: entity.get_text(3),
            object_type: entity.get_text(4),
            long_name: spatial.then(|| entity.get_text(7)).flatten(),
            tag: (!spatial).then(|| entity.get_text(7)).flatten(),
            // IFC4 doors and windows carry PredefinedType after the overall dimensions
            predefined_type: if spatial {
                None
            } else if opening_filler {
                entity.get_enum(10).map(str::to_string)
            } else {
                entity.get_enum(8).map(str::to_string)
            },
            overall_height: opening_filler.then(|| entity.get_float(8)).flatten(),
            overall_width: opening_filler.then(|| entity.get_float(9)).flatten(),
        })
    }
}
