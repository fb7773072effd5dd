// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for model loading

use crate::EntityId;
use thiserror::Error;

/// Result type alias for model operations
pub type Result<T> = std::result::Result<T, ParseError>;

/// Errors that can occur while loading or querying a model
#[derive(Error, Debug)]
pub enum ParseError {
    /// Invalid IFC file format
    #[error("Invalid IFC format: {0}")]
    InvalidFormat(String),

    /// Failed to parse header section
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// Failed to parse entity
    #[error("Failed to parse entity {0}: {1}")]
    EntityParse(EntityId, String),

    /// Entity not found
    #[error("Entity {0} not found")]
    EntityNotFound(EntityId),

    /// Invalid entity reference
    #[error("Invalid entity reference at {entity}: attribute {attribute}")]
    InvalidReference { entity: EntityId, attribute: usize },

    /// The project's unit assignment exists but cannot be understood
    #[error("Invalid unit assignment: {0}")]
    InvalidUnit(String),

    /// Unsupported IFC schema version
    #[error("Unsupported schema version: {0}")]
    UnsupportedSchema(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl ParseError {
    /// Create a new format error
    pub fn format(msg: impl Into<String>) -> Self {
        ParseError::InvalidFormat(msg.into())
    }

    /// Create a new entity parse error
    pub fn entity_parse(id: EntityId, msg: impl Into<String>) -> Self {
        ParseError::EntityParse(id, msg.into())
    }

    /// Create a new unit assignment error
    pub fn unit(msg: impl Into<String>) -> Self {
        ParseError::InvalidUnit(msg.into())
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        ParseError::Other(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ParseError::unit("IFCPROJECT #1 points at #9 which is not a unit assignment");
        assert_eq!(
            err.to_string(),
            "Invalid unit assignment: IFCPROJECT #1 points at #9 which is not a unit assignment"
        );

        let err = ParseError::InvalidReference {
            entity: EntityId(4),
            attribute: 5,
        };
        assert_eq!(err.to_string(), "Invalid entity reference at #4: attribute 5");
    }
}
