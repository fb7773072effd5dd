// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Element extraction from a parsed model

use crate::classify::classify;
use crate::element::{ElementGroup, ElementRecord, LayerSummary, Population, SpaceLinks, StoreyRef};
use crate::resolve::Catalog;
use crate::units::{length_scale_to_mm, round_to};
use crate::Result;
use ifcore_model::{EntityId, IfcModel, IfcType};
use rustc_hash::{FxHashMap, FxHashSet};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Property keys on spaces that often carry the room's usage
const SPACE_USAGE_KEYS: [&str; 6] = [
    "Reference",
    "Category",
    "OccupancyType",
    "RoomTag",
    "Function",
    "Usage",
];

/// What a boundary link tells about the space on the other side
#[derive(Clone, Debug, Default)]
struct SpaceSummary {
    global_id: Option<String>,
    name: Option<String>,
    hints: Vec<String>,
}

/// Shared read-only state for building records
struct Extractor<'a> {
    model: &'a dyn IfcModel,
    catalog: &'a Catalog,
    scale: f64,
    storeys: FxHashMap<EntityId, StoreyRef>,
    spaces: FxHashMap<EntityId, SpaceSummary>,
}

/// Build element records for every group in the model
///
/// Fails only if the model's length unit cannot be converted to millimetres.
pub fn extract(model: &dyn IfcModel, catalog: &Catalog) -> Result<Population> {
    let scale = length_scale_to_mm(model.units())?;
    log::debug!("Length scale: 1 model unit = {} mm", scale);

    let storeys: Vec<StoreyRef> = model
        .spatial()
        .storeys()
        .into_iter()
        .map(|s| StoreyRef {
            id: s.id,
            name: s.name,
            elevation_mm: round_to(s.elevation * scale, 2),
        })
        .collect();

    let spaces = model
        .resolver()
        .entities_by_type(&IfcType::IfcSpace)
        .iter()
        .map(|space| (space.id, space_summary(model, space.id)))
        .collect();

    let extractor = Extractor {
        model,
        catalog,
        scale,
        storeys: storeys.iter().map(|s| (s.id, s.clone())).collect(),
        spaces,
    };

    let metadata = model.metadata();
    let mut population = Population {
        storeys,
        catalog: catalog.clone(),
        file_name: metadata.file_name.clone().unwrap_or_default(),
        schema_version: metadata.schema_version.clone(),
        length_scale_mm: scale,
        ..Default::default()
    };

    for group in ElementGroup::ALL {
        let members = group_members(model, group);

        #[cfg(feature = "parallel")]
        let records: Vec<ElementRecord> = members
            .par_iter()
            .map(|(id, ifc_type)| extractor.record(*id, ifc_type.clone(), group))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let records: Vec<ElementRecord> = members
            .iter()
            .map(|(id, ifc_type)| extractor.record(*id, ifc_type.clone(), group))
            .collect();

        log::debug!("Extracted {} {}", records.len(), group);
        population.groups.insert(group, records);
    }

    log::debug!(
        "Extraction complete: {} elements, {} storeys",
        population.element_count(),
        population.storeys.len()
    );
    Ok(population)
}

/// Entity ids of a group in file order, without duplicates
fn group_members(model: &dyn IfcModel, group: ElementGroup) -> Vec<(EntityId, IfcType)> {
    let mut seen = FxHashSet::default();
    let mut members: Vec<(EntityId, IfcType)> = group
        .classes()
        .iter()
        .flat_map(|class| model.resolver().entities_by_type(class))
        .filter(|entity| seen.insert(entity.id))
        .map(|entity| (entity.id, entity.ifc_type.clone()))
        .collect();
    members.sort_by_key(|(id, _)| *id);
    members
}

/// Usage hints of a space: direct attributes, usage properties, pset names
fn space_summary(model: &dyn IfcModel, id: EntityId) -> SpaceSummary {
    let props = model.properties();
    let info = props.element_info(id).unwrap_or_default();

    let mut hints: Vec<String> = Vec::new();
    let mut push = |value: Option<&str>| {
        if let Some(v) = value.map(str::trim).filter(|v| !v.is_empty()) {
            if !hints.iter().any(|h| h == v) {
                hints.push(v.to_string());
            }
        }
    };

    push(info.name.as_deref());
    push(info.long_name.as_deref());
    push(info.object_type.as_deref());
    push(info.description.as_deref());

    for pset in props.property_sets(id) {
        for key in SPACE_USAGE_KEYS {
            push(pset.get(key).and_then(|p| p.value.as_text()));
        }
        push(Some(pset.name.as_str()));
    }

    SpaceSummary {
        global_id: info.global_id,
        name: info.name,
        hints,
    }
}

impl Extractor<'_> {
    fn record(&self, id: EntityId, ifc_type: IfcType, group: ElementGroup) -> ElementRecord {
        let props = self.model.properties();
        let materials = self.model.materials();
        let spatial = self.model.spatial();

        let mut record = ElementRecord::new(id, ifc_type);

        if let Some(info) = props.element_info(id) {
            if let Some(global_id) = info.global_id.filter(|g| !g.is_empty()) {
                record.global_id = global_id;
            }
            record.name = info.name;
            record.long_name = info.long_name;
            record.object_type = info.object_type;
            record.predefined_type = info.predefined_type;
            record.overall_height = info.overall_height;
            record.overall_width = info.overall_width;
        }

        // openings carry no dimensions of their own
        if group == ElementGroup::Openings {
            if let Some(filling) = spatial
                .fillings(id)
                .first()
                .and_then(|f| props.element_info(*f))
            {
                record.overall_height = filling.overall_height;
                record.overall_width = filling.overall_width;
            }
        }

        record.storey = spatial
            .containing_storey(id)
            .and_then(|s| self.storeys.get(&s).cloned());

        let type_id = props.type_object(id);
        record.type_name = type_id.and_then(|t| props.name(t));

        record.property_sets = props.property_sets(id);
        record.type_property_sets = props.type_property_sets(id);
        record.quantity_sets = props.quantity_sets(id);

        record.materials = materials
            .material_layers(id)
            .map(|set| LayerSummary::from_layers(&set, self.scale))
            .unwrap_or_default();
        record.type_materials = type_id
            .and_then(|t| materials.material_layers(t))
            .map(|set| LayerSummary::from_layers(&set, self.scale))
            .unwrap_or_default();

        record.spaces = self.space_links(id);
        record.context = classify(&record.spaces.hints, record.spaces.has_links());

        record.resolve_all(self.catalog, group);
        record
    }

    fn space_links(&self, id: EntityId) -> SpaceLinks {
        let boundaries = self.model.spatial().space_boundaries(id);
        let mut links = SpaceLinks {
            boundary_count: boundaries.len(),
            ..Default::default()
        };

        let mut seen = FxHashSet::default();
        for space_id in boundaries {
            if !seen.insert(space_id) {
                continue;
            }
            let Some(space) = self.spaces.get(&space_id) else {
                continue;
            };
            let global_id = space
                .global_id
                .clone()
                .unwrap_or_else(|| format!("#{}", space_id.0));
            if !links.space_ids.contains(&global_id) {
                links.space_ids.push(global_id);
            }
            if let Some(name) = &space.name {
                if !links.space_names.contains(name) {
                    links.space_names.push(name.clone());
                }
            }
            for hint in &space.hints {
                if !links.hints.contains(hint) {
                    links.hints.push(hint.clone());
                }
            }
        }
        links
    }
}
