// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Material layer sets attached to elements and element types

use crate::EntityId;
use serde::{Deserialize, Serialize};

/// One layer of a layered material (IfcMaterialLayer)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaterialLayer {
    /// Name of the layer's material, if any
    pub material: Option<String>,
    /// Layer thickness in model length units
    pub thickness: Option<f64>,
}

/// An ordered set of material layers (IfcMaterialLayerSet)
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialLayerSet {
    /// LayerSetName, if given
    pub name: Option<String>,
    /// Layers from one face of the element to the other
    pub layers: Vec<MaterialLayer>,
}

impl MaterialLayerSet {
    /// Sum of all known layer thicknesses, in model length units
    ///
    /// Returns `None` when no layer declares a thickness, so an empty set is
    /// never mistaken for a zero-thickness element.
    pub fn total_thickness(&self) -> Option<f64> {
        let mut known = self.layers.iter().filter_map(|l| l.thickness).peekable();
        known.peek()?;
        Some(known.sum())
    }

    /// Material names of all layers that have one
    pub fn material_names(&self) -> Vec<String> {
        self.layers.iter().filter_map(|l| l.material.clone()).collect()
    }
}

/// Material association reader
///
/// Follows IfcRelAssociatesMaterial from an element (or a type object) to the
/// material definition it points at.
pub trait MaterialReader: Send + Sync {
    /// Get the layer set associated with an entity
    ///
    /// Both IfcMaterialLayerSetUsage and a bare IfcMaterialLayerSet resolve to
    /// the same layer set.
    ///
    /// # Arguments
    /// * `id` - The element or type object ID
    ///
    /// # Returns
    /// The layer set, or `None` if the entity has no layered material
    fn material_layers(&self, id: EntityId) -> Option<MaterialLayerSet>;

    /// Get the name of a single material (IfcMaterial) associated with an entity
    fn material_name(&self, id: EntityId) -> Option<String>;
}
