// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! EntityResolver trait implementation

use crate::scanner::{EntityIndex, TypeIndex};
use crate::tokenizer::parse_entity_at;
use ifcore_model::{DecodedEntity, EntityId, EntityResolver, IfcType};
use rustc_hash::FxHashMap;
use std::sync::{Arc, RwLock};

/// Thread-safe, lazily decoding entity resolver
///
/// Entities are decoded on first access and cached behind an `RwLock`, so
/// many threads can read the same model at once.
pub struct ResolverImpl {
    /// Raw IFC content (owned for thread safety)
    content: String,
    /// Entity ID -> (start, end) byte offsets
    index: EntityIndex,
    /// Type -> entity IDs, in file order
    type_index: TypeIndex,
    /// Decoded entity cache
    cache: RwLock<FxHashMap<u32, Arc<DecodedEntity>>>,
}

impl ResolverImpl {
    /// Create a resolver from the scanner's indices
    pub fn new(content: String, index: EntityIndex, type_index: TypeIndex) -> Self {
        Self {
            content,
            index,
            type_index,
            cache: RwLock::new(FxHashMap::default()),
        }
    }

    /// Number of entities decoded so far
    pub fn cached_count(&self) -> usize {
        self.cache.read().map(|c| c.len()).unwrap_or(0)
    }

    fn decode_and_cache(&self, id: u32) -> Option<Arc<DecodedEntity>> {
        if let Some(cached) = self.cache.read().ok()?.get(&id) {
            return Some(Arc::clone(cached));
        }

        let (start, end) = self.index.get(&id)?;
        let entity = match parse_entity_at(&self.content, *start, *end) {
            Ok(entity) => Arc::new(entity),
            Err(err) => {
                log::debug!("skipping undecodable entity #{}: {}", id, err);
                return None;
            }
        };

        if let Ok(mut cache) = self.cache.write() {
            cache.insert(id, Arc::clone(&entity));
        }

        Some(entity)
    }
}

impl EntityResolver for ResolverImpl {
    fn get(&self, id: EntityId) -> Option<Arc<DecodedEntity>> {
        self.decode_and_cache(id.0)
    }

    fn entities_by_type(&self, ifc_type: &IfcType) -> Vec<Arc<DecodedEntity>> {
        self.type_index
            .get(ifc_type)
            .map(|ids| ids.iter().filter_map(|id| self.get(*id)).collect())
            .unwrap_or_default()
    }

    fn count_by_type(&self, ifc_type: &IfcType) -> usize {
        self.type_index.get(ifc_type).map(Vec::len).unwrap_or(0)
    }

    fn all_ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self.index.keys().map(|&id| EntityId(id)).collect();
        ids.sort_unstable();
        ids
    }

    fn entity_count(&self) -> usize {
        self.index.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::EntityScanner;

    const TEST_IFC: &str = r#"ISO-10303-21;
HEADER;
FILE_SCHEMA(('IFC2X3'));
ENDSEC;
DATA;
#1=IFCPROJECT('guid',$,'Project',$,$,$,$,$,#2);
#2=IFCUNITASSIGNMENT((#3));
#3=IFCSIUNIT(*,.LENGTHUNIT.,.MILLI.,.METRE.);
#4=IFCWALL('guid2',$,'Wall 1',$,$,$,$,$);
#5=IFCWALLSTANDARDCASE('guid3',$,'Wall 2',$,$,$,$,$);
ENDSEC;
END-ISO-10303-21;
"#;

    fn resolver() -> ResolverImpl {
        let (index, types) = EntityScanner::build_indices(TEST_IFC);
        ResolverImpl::new(TEST_IFC.to_string(), index, types)
    }

    #[test]
    fn test_resolver_get_is_lazy() {
        let resolver = resolver();
        assert_eq!(resolver.cached_count(), 0);

        let entity = resolver.get(EntityId(1)).unwrap();
        assert_eq!(entity.id, EntityId(1));
        assert_eq!(resolver.cached_count(), 1);
        assert!(resolver.get(EntityId(99)).is_none());
    }

    #[test]
    fn test_resolver_lookup_by_class_name() {
        let resolver = resolver();

        let walls = resolver.find_by_type_name("IfcWall");
        assert_eq!(walls.len(), 1);
        assert_eq!(walls[0].id, EntityId(4));
        assert_eq!(resolver.count_by_type(&IfcType::IfcWallStandardCase), 1);
        assert_eq!(resolver.all_ids().first(), Some(&EntityId(1)));
    }

    #[test]
    fn test_resolver_thread_safe() {
        use std::thread;

        let resolver = Arc::new(resolver());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let resolver = Arc::clone(&resolver);
                thread::spawn(move || (1..=5).filter(|id| resolver.get(EntityId(*id)).is_some()).count())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 5);
        }
    }
}
