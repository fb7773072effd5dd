// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core traits for loading and querying a building model

use crate::{
    EntityResolver, MaterialReader, ModelMetadata, PropertyReader, Result, SpatialQuery,
    UnitAssignment,
};
use std::sync::Arc;

/// Progress callback type for parsing operations
pub type ProgressCallback = Box<dyn Fn(&str, f32) + Send>;

/// Main parsing interface - entry point for loading IFC content
pub trait IfcParser: Send + Sync {
    /// Parse IFC content and return a model
    ///
    /// # Arguments
    /// * `content` - The IFC file content as a string
    ///
    /// # Returns
    /// An `Arc<dyn IfcModel>` on success, or a `ParseError` on failure.
    /// A present but malformed unit assignment is a failure.
    fn parse(&self, content: &str) -> Result<Arc<dyn IfcModel>>;

    /// Parse IFC content with progress reporting
    ///
    /// # Arguments
    /// * `content` - The IFC file content as a string
    /// * `on_progress` - Callback function receiving (phase_name, percent_complete)
    fn parse_with_progress(
        &self,
        content: &str,
        on_progress: ProgressCallback,
    ) -> Result<Arc<dyn IfcModel>>;
}

/// Read-only access to a parsed building model
///
/// The model is `Send + Sync` so element records can be extracted in
/// parallel.
pub trait IfcModel: Send + Sync {
    /// Entity lookups, element lookup by class, reference resolution
    fn resolver(&self) -> &dyn EntityResolver;

    /// Instance and type property sets, quantity sets, direct attributes
    fn properties(&self) -> &dyn PropertyReader;

    /// Material layer sets of elements and types
    fn materials(&self) -> &dyn MaterialReader;

    /// Storeys, containment, space boundaries, opening fillings
    fn spatial(&self) -> &dyn SpatialQuery;

    /// The project's declared unit assignment
    fn units(&self) -> &UnitAssignment;

    /// Get file metadata (schema version, originating system, etc.)
    fn metadata(&self) -> &ModelMetadata;
}
