// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Spatial structure queries: storeys, containment, space boundaries

use crate::EntityId;
use serde::{Deserialize, Serialize};

/// Building storey information
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoreyInfo {
    /// Entity ID
    pub id: EntityId,
    /// Storey name
    pub name: String,
    /// Elevation in model length units
    pub elevation: f64,
    /// Number of elements directly contained in this storey
    pub element_count: usize,
}

impl StoreyInfo {
    /// Create new storey info
    pub fn new(id: EntityId, name: impl Into<String>, elevation: f64, element_count: usize) -> Self {
        Self {
            id,
            name: name.into(),
            elevation,
            element_count,
        }
    }
}

/// Spatial query interface
///
/// # Example
///
/// ```ignore
/// use ifcore_model::{SpatialQuery, EntityId};
///
/// fn storey_name(spatial: &dyn SpatialQuery, wall: EntityId) -> String {
///     spatial
///         .containing_storey(wall)
///         .and_then(|id| spatial.storeys().into_iter().find(|s| s.id == id))
///         .map(|s| s.name)
///         .unwrap_or_else(|| "Unknown Storey".to_string())
/// }
/// ```
pub trait SpatialQuery: Send + Sync {
    /// Get all building storeys, sorted by elevation (lowest first)
    fn storeys(&self) -> Vec<StoreyInfo>;

    /// Get elements directly contained in a storey
    ///
    /// # Arguments
    /// * `storey_id` - The storey entity ID
    ///
    /// # Returns
    /// A vector of element IDs contained in the storey
    fn elements_in_storey(&self, storey_id: EntityId) -> Vec<EntityId>;

    /// Get the storey an element belongs to
    ///
    /// Elements contained in a space (or any other spatial element below a
    /// storey) resolve to the storey above it.
    ///
    /// # Arguments
    /// * `element_id` - The element entity ID
    ///
    /// # Returns
    /// The storey ID if the element is placed under a storey
    fn containing_storey(&self, element_id: EntityId) -> Option<EntityId>;

    /// Get the spaces bounded by an element
    ///
    /// One entry per space boundary relationship, so a space bounded twice by
    /// the same element appears twice. The length is the boundary count.
    ///
    /// # Arguments
    /// * `element_id` - The building element ID
    ///
    /// # Returns
    /// Relating space IDs, in file order
    fn space_boundaries(&self, element_id: EntityId) -> Vec<EntityId>;

    /// Get the elements (doors, windows) filling an opening
    ///
    /// # Arguments
    /// * `opening_id` - The IfcOpeningElement ID
    ///
    /// # Returns
    /// Filling element IDs (IfcRelFillsElement)
    fn fillings(&self, opening_id: EntityId) -> Vec<EntityId>;

    /// Get the storey name for an element
    fn storey_name(&self, element_id: EntityId) -> Option<String> {
        let storey = self.containing_storey(element_id)?;
        self.storeys()
            .into_iter()
            .find(|s| s.id == storey)
            .map(|s| s.name)
    }
}
