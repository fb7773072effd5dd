// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for compliance evaluation

use ifcore_model::ParseError;
use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, CheckError>;

/// Errors raised by the engine
///
/// Missing data is never an error; it becomes a `blocked` verdict. These
/// variants abort one computation (a formula, a rule, or a whole run when the
/// model cannot be loaded).
#[derive(Error, Debug)]
pub enum CheckError {
    /// Model could not be loaded
    #[error("Model error: {0}")]
    Model(#[from] ParseError),

    /// Declared length unit cannot be converted to millimetres
    #[error("Invalid unit: {0}")]
    InvalidUnit(String),

    /// Formula input outside its physical domain
    #[error("Domain error: {0}")]
    Domain(String),

    /// Threshold or catalog configuration is malformed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Climate zone code outside A-E
    #[error("Invalid climate zone '{0}'. Expected one of: A, B, C, D, E")]
    InvalidClimateZone(String),

    /// Status string outside pass, fail, warning, blocked
    #[error("Invalid check status '{0}'")]
    InvalidStatus(String),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Rule failed on unexpected data
    #[error("{0}")]
    Rule(String),
}

impl CheckError {
    /// Create a unit error
    pub fn unit(msg: impl Into<String>) -> Self {
        CheckError::InvalidUnit(msg.into())
    }

    /// Create a domain error
    pub fn domain(msg: impl Into<String>) -> Self {
        CheckError::Domain(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        CheckError::Config(msg.into())
    }

    /// Create a rule error
    pub fn rule(msg: impl Into<String>) -> Self {
        CheckError::Rule(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            CheckError::domain("d must be > 0").to_string(),
            "Domain error: d must be > 0"
        );
        assert_eq!(
            CheckError::InvalidClimateZone("Z".into()).to_string(),
            "Invalid climate zone 'Z'. Expected one of: A, B, C, D, E"
        );
        assert_eq!(CheckError::rule("bad data").to_string(), "bad data");
    }

    #[test]
    fn test_parse_error_conversion() {
        let err: CheckError = ParseError::unit("dangling").into();
        assert!(matches!(err, CheckError::Model(ParseError::InvalidUnit(_))));
    }
}
