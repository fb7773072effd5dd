// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entity lookup and reference resolution

use crate::{AttributeValue, DecodedEntity, EntityId, IfcType};
use std::sync::Arc;

/// Entity lookup and reference resolution
///
/// Implementations should provide O(1) lookup by entity ID and must be safe
/// to share between threads.
pub trait EntityResolver: Send + Sync {
    /// Get entity by ID
    ///
    /// # Arguments
    /// * `id` - The entity ID to look up
    ///
    /// # Returns
    /// `Some(Arc<DecodedEntity>)` if found, `None` otherwise
    fn get(&self, id: EntityId) -> Option<Arc<DecodedEntity>>;

    /// Resolve an entity reference from an attribute value
    fn resolve_ref(&self, attr: &AttributeValue) -> Option<Arc<DecodedEntity>> {
        match attr {
            AttributeValue::EntityRef(id) => self.get(*id),
            _ => None,
        }
    }

    /// Resolve a list of entity references, skipping anything that is not one
    fn resolve_ref_list(&self, attr: &AttributeValue) -> Vec<Arc<DecodedEntity>> {
        match attr {
            AttributeValue::List(items) => items
                .iter()
                .filter_map(|item| self.resolve_ref(item))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Get all entities of a specific type, in file order
    ///
    /// # Arguments
    /// * `ifc_type` - The IFC type to filter by
    ///
    /// # Returns
    /// A vector of all entities matching the specified type
    fn entities_by_type(&self, ifc_type: &IfcType) -> Vec<Arc<DecodedEntity>>;

    /// Find entities by class name (case-insensitive, e.g. "IfcWall")
    fn find_by_type_name(&self, type_name: &str) -> Vec<Arc<DecodedEntity>> {
        self.entities_by_type(&IfcType::parse(type_name))
    }

    /// Count entities of a specific type
    fn count_by_type(&self, ifc_type: &IfcType) -> usize;

    /// Get all entity IDs in the model
    fn all_ids(&self) -> Vec<EntityId>;

    /// Get total entity count
    fn entity_count(&self) -> usize {
        self.all_ids().len()
    }
}

/// Extension methods for EntityResolver
pub trait EntityResolverExt: EntityResolver {
    /// Get entity or return error
    fn get_or_err(&self, id: EntityId) -> crate::Result<Arc<DecodedEntity>> {
        self.get(id).ok_or(crate::ParseError::EntityNotFound(id))
    }

    /// Resolve the reference held at `attr_index` of `entity`, or return error
    fn resolve_attr_or_err(
        &self,
        entity: &DecodedEntity,
        attr_index: usize,
    ) -> crate::Result<Arc<DecodedEntity>> {
        entity
            .get(attr_index)
            .and_then(|attr| self.resolve_ref(attr))
            .ok_or(crate::ParseError::InvalidReference {
                entity: entity.id,
                attribute: attr_index,
            })
    }
}

// Blanket implementation for all EntityResolver types
impl<T: EntityResolver + ?Sized> EntityResolverExt for T {}
