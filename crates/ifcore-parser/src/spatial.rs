// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Spatial structure index and query implementation

use ifcore_model::{EntityId, EntityResolver, IfcType, SpatialQuery, StoreyInfo};
use rustc_hash::{FxHashMap, FxHashSet};

/// Upper bound on decomposition depth when walking up to a storey
const MAX_SPATIAL_DEPTH: usize = 32;

/// Spatial query implementation
///
/// All relationships are indexed once at load time; queries are map lookups.
#[derive(Default)]
pub struct SpatialQueryImpl {
    /// Storeys sorted by elevation
    storeys: Vec<StoreyInfo>,
    storey_ids: FxHashSet<u32>,
    /// Child -> parent, through containment or aggregation
    parents: FxHashMap<u32, EntityId>,
    /// Spatial structure -> directly contained elements
    contained: FxHashMap<u32, Vec<EntityId>>,
    /// Building element -> relating spaces, one per boundary
    boundaries: FxHashMap<u32, Vec<EntityId>>,
    /// Opening -> filling elements
    fillings: FxHashMap<u32, Vec<EntityId>>,
}

impl SpatialQueryImpl {
    /// Build the spatial index from resolver
    pub fn build(resolver: &dyn EntityResolver) -> Self {
        let mut index = Self::default();

        // IfcRelContainedInSpatialStructure: RelatedElements at 4, RelatingStructure at 5
        for rel in resolver.entities_by_type(&IfcType::IfcRelContainedInSpatialStructure) {
            let (Some(elements), Some(structure)) = (rel.get_refs(4), rel.get_ref(5)) else {
                continue;
            };
            for element in elements {
                index.parents.entry(element.0).or_insert(structure);
                index.contained.entry(structure.0).or_default().push(element);
            }
        }

        // IfcRelAggregates: RelatingObject at 4, RelatedObjects at 5
        for rel in resolver.entities_by_type(&IfcType::IfcRelAggregates) {
            let (Some(parent), Some(children)) = (rel.get_ref(4), rel.get_refs(5)) else {
                continue;
            };
            for child in children {
                index.parents.entry(child.0).or_insert(parent);
            }
        }

        // IfcRelSpaceBoundary (any level): RelatingSpace at 4, RelatedBuildingElement at 5
        for boundary_type in [
            IfcType::IfcRelSpaceBoundary,
            IfcType::IfcRelSpaceBoundary1stLevel,
            IfcType::IfcRelSpaceBoundary2ndLevel,
        ] {
            for rel in resolver.entities_by_type(&boundary_type) {
                let (Some(space), Some(element)) = (rel.get_ref(4), rel.get_ref(5)) else {
                    continue;
                };
                index.boundaries.entry(element.0).or_default().push(space);
            }
        }

        // IfcRelFillsElement: RelatingOpeningElement at 4, RelatedBuildingElement at 5
        for rel in resolver.entities_by_type(&IfcType::IfcRelFillsElement) {
            let (Some(opening), Some(element)) = (rel.get_ref(4), rel.get_ref(5)) else {
                continue;
            };
            index.fillings.entry(opening.0).or_default().push(element);
        }

        // IfcBuildingStorey: Name at 2, Elevation at 9
        for storey in resolver.entities_by_type(&IfcType::IfcBuildingStorey) {
            let name = storey
                .get_text(2)
                .unwrap_or_else(|| format!("Storey {}", storey.id));
            let element_count = index.contained.get(&storey.id.0).map_or(0, Vec::len);
            index.storey_ids.insert(storey.id.0);
            index.storeys.push(StoreyInfo::new(
                storey.id,
                name,
                storey.get_float(9).unwrap_or(0.0),
                element_count,
            ));
        }
        index
            .storeys
            .sort_by(|a, b| a.elevation.total_cmp(&b.elevation).then(a.id.cmp(&b.id)));

        log::debug!(
            "spatial index: {} storeys, {} boundary-linked elements, {} filled openings",
            index.storeys.len(),
            index.boundaries.len(),
            index.fillings.len()
        );

        index
    }
}

impl SpatialQuery for SpatialQueryImpl {
    fn storeys(&self) -> Vec<StoreyInfo> {
        self.storeys.clone()
    }

    fn elements_in_storey(&self, storey_id: EntityId) -> Vec<EntityId> {
        self.contained.get(&storey_id.0).cloned().unwrap_or_default()
    }

    fn containing_storey(&self, element_id: EntityId) -> Option<EntityId> {
        let mut current = *self.parents.get(&element_id.0)?;
        for _ in 0..MAX_SPATIAL_DEPTH {
            if self.storey_ids.contains(&current.0) {
                return Some(current);
            }
            current = *self.parents.get(&current.0)?;
        }
        None
    }

    fn space_boundaries(&self, element_id: EntityId) -> Vec<EntityId> {
        self.boundaries.get(&element_id.0).cloned().unwrap_or_default()
    }

    fn fillings(&self, opening_id: EntityId) -> Vec<EntityId> {
        self.fillings.get(&opening_id.0).cloned().unwrap_or_default()
    }
}
