// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MaterialReader trait implementation

use ifcore_model::{
    DecodedEntity, EntityId, EntityResolver, IfcType, MaterialLayer, MaterialLayerSet,
    MaterialReader,
};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Material reader implementation
pub struct MaterialReaderImpl {
    resolver: Arc<dyn EntityResolver>,
    /// Object ID -> RelatingMaterial ID
    associations: FxHashMap<u32, EntityId>,
}

impl MaterialReaderImpl {
    /// Create a new material reader
    pub fn new(resolver: Arc<dyn EntityResolver>) -> Self {
        let mut associations = FxHashMap::default();

        // IfcRelAssociatesMaterial: RelatedObjects at 4, RelatingMaterial at 5
        for rel in resolver.entities_by_type(&IfcType::IfcRelAssociatesMaterial) {
            let (Some(related), Some(material)) = (rel.get_refs(4), rel.get_ref(5)) else {
                continue;
            };
            for object in related {
                associations.entry(object.0).or_insert(material);
            }
        }

        Self {
            resolver,
            associations,
        }
    }

    fn layer_set(&self, set: &DecodedEntity) -> MaterialLayerSet {
        // MaterialLayers at 0, LayerSetName at 1
        let layers = set
            .get_refs(0)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|id| self.resolver.get(id))
            .filter(|layer| layer.ifc_type == IfcType::IfcMaterialLayer)
            .map(|layer| MaterialLayer {
                // Material at 0, LayerThickness at 1
                material: layer
                    .get_ref(0)
                    .and_then(|id| self.resolver.get(id))
                    .and_then(|material| material.get_text(0)),
                thickness: layer.get_float(1),
            })
            .collect();

        MaterialLayerSet {
            name: set.get_text(1),
            layers,
        }
    }
}

impl MaterialReader for MaterialReaderImpl {
    fn material_layers(&self, id: EntityId) -> Option<MaterialLayerSet> {
        let material = self.resolver.get(*self.associations.get(&id.0)?)?;

        match material.ifc_type {
            // ForLayerSet at 0
            IfcType::IfcMaterialLayerSetUsage => {
                let set = self.resolver.get(material.get_ref(0)?)?;
                Some(self.layer_set(&set))
            }
            IfcType::IfcMaterialLayerSet => Some(self.layer_set(&material)),
            _ => None,
        }
    }

    fn material_name(&self, id: EntityId) -> Option<String> {
        let material = self.resolver.get(*self.associations.get(&id.0)?)?;
        match material.ifc_type {
            IfcType::IfcMaterial => material.get_text(0),
            _ => None,
        }
    }
}
