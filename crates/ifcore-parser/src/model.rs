// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ParsedModel - Main IFC model implementation

use crate::materials::MaterialReaderImpl;
use crate::properties::PropertyReaderImpl;
use crate::resolver::ResolverImpl;
use crate::scanner::{parse_header, EntityScanner};
use crate::spatial::SpatialQueryImpl;
use crate::units::extract_unit_assignment;

use ifcore_model::{
    EntityResolver, IfcModel, MaterialReader, ModelMetadata, PropertyReader, Result,
    SpatialQuery, UnitAssignment,
};
use std::sync::Arc;

/// Parsed IFC model implementing the `IfcModel` trait
///
/// This is the main entry point for accessing IFC data. It provides access
/// to entities, properties, materials and spatial structure through trait objects.
pub struct ParsedModel {
    /// Entity resolver for lookups
    resolver: Arc<ResolverImpl>,
    /// Property reader
    properties: Arc<PropertyReaderImpl>,
    /// Material reader
    materials: Arc<MaterialReaderImpl>,
    /// Spatial query
    spatial: Arc<SpatialQueryImpl>,
    /// Declared project units
    units: UnitAssignment,
    /// File metadata
    metadata: ModelMetadata,
}

impl ParsedModel {
    /// Parse IFC content and create a model
    ///
    /// Fails only when the project declares a unit assignment that cannot be
    /// read; every other defect degrades to missing data.
    pub fn parse(content: &str) -> Result<Self> {
        Self::parse_with_progress(content, Box::new(|_, _| {}))
    }

    /// Parse with progress reporting
    pub fn parse_with_progress(
        content: &str,
        on_progress: ifcore_model::ProgressCallback,
    ) -> Result<Self> {
        on_progress("Scanning entities", 0.0);

        // Entity and type indices in one pass
        let (index, type_index) = EntityScanner::build_indices(content);
        on_progress("Building index", 30.0);

        let resolver = Arc::new(ResolverImpl::new(content.to_string(), index, type_index));

        // Unit assignment errors are fatal
        let units = extract_unit_assignment(resolver.as_ref())?;
        on_progress("Extracting units", 50.0);

        let shared: Arc<dyn EntityResolver> = resolver.clone();
        let properties = Arc::new(PropertyReaderImpl::new(shared.clone()));
        on_progress("Building property index", 60.0);

        let materials = Arc::new(MaterialReaderImpl::new(shared));
        on_progress("Building material index", 70.0);

        let spatial = Arc::new(SpatialQueryImpl::build(resolver.as_ref()));
        on_progress("Processing metadata", 90.0);

        let header = parse_header(content);
        let metadata = ModelMetadata {
            schema_version: header.schema_version,
            originating_system: header.originating_system,
            preprocessor_version: header.preprocessor_version,
            file_name: header.file_name,
            file_description: header.file_description,
            author: header.author,
            organization: header.organization,
            timestamp: header.timestamp,
        };

        log::debug!(
            "parsed {} entities ({}), {} units declared",
            resolver.entity_count(),
            metadata.schema_version,
            units.units.len()
        );
        on_progress("Complete", 100.0);

        Ok(Self {
            resolver,
            properties,
            materials,
            spatial,
            units,
            metadata,
        })
    }

    /// Get the resolver as a shared handle
    pub fn resolver_arc(&self) -> Arc<ResolverImpl> {
        self.resolver.clone()
    }
}

impl IfcModel for ParsedModel {
    fn resolver(&self) -> &dyn EntityResolver {
        self.resolver.as_ref()
    }

    fn properties(&self) -> &dyn PropertyReader {
        self.properties.as_ref()
    }

    fn materials(&self) -> &dyn MaterialReader {
        self.materials.as_ref()
    }

    fn spatial(&self) -> &dyn SpatialQuery {
        self.spatial.as_ref()
    }

    fn units(&self) -> &UnitAssignment {
        &self.units
    }

    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}
