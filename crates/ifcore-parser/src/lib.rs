// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFCore Parser - STEP/IFC loader for compliance checking
//!
//! This crate reads IFC (STEP physical file) content into a model that
//! implements the traits defined in `ifcore-model`.
//!
//! # Features
//!
//! - **Fast tokenization** using `nom` combinators
//! - **SIMD-accelerated scanning** using `memchr`
//! - **Lazy entity decoding** - only parse entities when needed
//! - **Relationship indices** for property sets, types, materials and
//!   spatial containment, built once at load time
//! - **Strict unit assignment** - a broken unit declaration fails the load
//!
//! # Example
//!
//! ```ignore
//! use ifcore_parser::StepParser;
//! use ifcore_model::IfcParser;
//!
//! let parser = StepParser::new();
//! let model = parser.parse(ifc_content)?;
//!
//! let walls = model.resolver().find_by_type_name("IFCWALL");
//! println!("Found {} walls", walls.len());
//! ```

mod materials;
mod model;
mod properties;
mod resolver;
mod scanner;
mod spatial;
mod tokenizer;
mod units;

pub use model::ParsedModel;
pub use scanner::{parse_header, EntityScanner, HeaderInfo};
pub use tokenizer::{decode_step_string, parse_entity, Token};
pub use units::prefix_scale;

use ifcore_model::{IfcModel, IfcParser, ProgressCallback, Result};
use std::sync::Arc;

/// Main STEP/IFC parser implementing `IfcParser` trait
#[derive(Default, Clone, Copy, Debug)]
pub struct StepParser;

impl StepParser {
    /// Create a new parser
    pub fn new() -> Self {
        Self
    }
}

impl IfcParser for StepParser {
    fn parse(&self, content: &str) -> Result<Arc<dyn IfcModel>> {
        ParsedModel::parse(content).map(|m| Arc::new(m) as Arc<dyn IfcModel>)
    }

    fn parse_with_progress(
        &self,
        content: &str,
        on_progress: ProgressCallback,
    ) -> Result<Arc<dyn IfcModel>> {
        ParsedModel::parse_with_progress(content, on_progress)
            .map(|m| Arc::new(m) as Arc<dyn IfcModel>)
    }
}

/// Quick parse function for simple use cases
pub fn parse(content: &str) -> Result<Arc<dyn IfcModel>> {
    StepParser::new().parse(content)
}

/// Parse with progress reporting
pub fn parse_with_progress(
    content: &str,
    on_progress: impl Fn(&str, f32) + Send + 'static,
) -> Result<Arc<dyn IfcModel>> {
    StepParser::new().parse_with_progress(content, Box::new(on_progress))
}
