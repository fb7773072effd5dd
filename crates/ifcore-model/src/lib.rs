// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFCore Model - shared types and query traits for IFC compliance checking
//!
//! This crate describes what a compliance engine may ask of a loaded building
//! model. It does not parse anything itself; a parser backend (such as
//! `ifcore-parser`) implements the traits and hands out an [`IfcModel`].
//!
//! # Architecture
//!
//! - [`IfcParser`] - Entry point for turning STEP content into a model
//! - [`IfcModel`] - Read-only, thread-safe access to a parsed model
//! - [`EntityResolver`] - Entity lookup and reference resolution
//! - [`PropertyReader`] - Instance and type property sets, quantity sets,
//!   and direct element attributes
//! - [`MaterialReader`] - Material layer sets attached to elements and types
//! - [`SpatialQuery`] - Storeys, containment, space boundaries, opening fillings
//! - [`UnitAssignment`] - The project's declared units, as written in the file
//!
//! # Example
//!
//! ```ignore
//! use ifcore_model::{IfcModel, IfcType};
//!
//! fn count_walls(model: &dyn IfcModel) -> usize {
//!     model.resolver().count_by_type(&IfcType::IfcWall)
//! }
//! ```

pub mod error;
pub mod materials;
pub mod properties;
pub mod resolver;
pub mod spatial;
pub mod traits;
pub mod types;
pub mod units;

// Re-export all public types
pub use error::*;
pub use materials::*;
pub use properties::*;
pub use resolver::*;
pub use spatial::*;
pub use traits::*;
pub use types::*;
pub use units::*;
