// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-element verdicts

use crate::element::ElementRecord;
use crate::{CheckError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Outcome of one rule on one element
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Fail,
    Warning,
    /// A required input could not be resolved
    Blocked,
}

impl CheckStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CheckStatus::Pass => "pass",
            CheckStatus::Fail => "fail",
            CheckStatus::Warning => "warning",
            CheckStatus::Blocked => "blocked",
        }
    }
}

impl FromStr for CheckStatus {
    type Err = CheckError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pass" => Ok(CheckStatus::Pass),
            "fail" => Ok(CheckStatus::Fail),
            "warning" => Ok(CheckStatus::Warning),
            "blocked" => Ok(CheckStatus::Blocked),
            other => Err(CheckError::InvalidStatus(other.to_string())),
        }
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict of one rule on one element
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub element_id: Option<String>,
    pub element_type: String,
    /// `{storey} / {name}`
    pub element_name: String,
    pub element_name_long: Option<String>,
    pub check_status: CheckStatus,
    pub actual_value: Option<String>,
    pub required_value: Option<String>,
    pub comment: Option<String>,
    /// Diagnostic line naming where each value came from
    pub log: Option<String>,
}

impl Verdict {
    /// Verdict for an element, identity filled from its record
    pub fn for_element(element: &ElementRecord, status: CheckStatus) -> Self {
        Self {
            element_id: Some(element.global_id.clone()),
            element_type: element.ifc_type.class_name().to_string(),
            element_name: element.display_name(),
            element_name_long: None,
            check_status: status,
            actual_value: None,
            required_value: None,
            comment: None,
            log: None,
        }
    }

    pub fn actual(mut self, value: impl Into<String>) -> Self {
        self.actual_value = Some(value.into());
        self
    }

    pub fn actual_opt(mut self, value: Option<String>) -> Self {
        self.actual_value = value;
        self
    }

    pub fn required(mut self, value: impl Into<String>) -> Self {
        self.required_value = Some(value.into());
        self
    }

    pub fn comment(mut self, text: impl Into<String>) -> Self {
        self.comment = Some(text.into());
        self
    }

    pub fn log(mut self, text: impl Into<String>) -> Self {
        self.log = Some(text.into());
        self
    }

    pub fn long_name(mut self, text: impl Into<String>) -> Self {
        self.element_name_long = Some(text.into());
        self
    }
}

/// Format a number with up to two decimals, trailing zeros trimmed
pub fn fmt_num(value: f64) -> String {
    let text = format!("{:.2}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

/// `80 mm`, `92.5 mm`
pub fn fmt_mm(value: f64) -> String {
    format!("{} mm", fmt_num(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ifcore_model::{EntityId, IfcType};

    #[test]
    fn test_status_strings() {
        for status in [
            CheckStatus::Pass,
            CheckStatus::Fail,
            CheckStatus::Warning,
            CheckStatus::Blocked,
        ] {
            assert_eq!(status.as_str().parse::<CheckStatus>().unwrap(), status);
        }
        assert!(matches!(
            "unknown".parse::<CheckStatus>(),
            Err(CheckError::InvalidStatus(_))
        ));
        assert!("PASS".parse::<CheckStatus>().is_err());
        assert_eq!(serde_json::to_string(&CheckStatus::Blocked).unwrap(), "\"blocked\"");
    }

    #[test]
    fn test_number_format() {
        assert_eq!(fmt_mm(80.0), "80 mm");
        assert_eq!(fmt_mm(92.5), "92.5 mm");
        assert_eq!(fmt_mm(100.456), "100.46 mm");
        assert_eq!(fmt_num(0.45), "0.45");
        assert_eq!(fmt_num(-0.001), "0");
        assert_eq!(fmt_num(2500.0), "2500");
    }

    #[test]
    fn test_for_element() {
        let mut record = ElementRecord::new(EntityId(3), IfcType::IfcWallStandardCase);
        record.global_id = "2O2Fr$t4X7Zf8NOew3FLOH".to_string();
        let verdict = Verdict::for_element(&record, CheckStatus::Fail)
            .actual(fmt_mm(80.0))
            .required(">= 100 mm");
        assert_eq!(verdict.element_id.as_deref(), Some("2O2Fr$t4X7Zf8NOew3FLOH"));
        assert_eq!(verdict.element_type, "IfcWallStandardCase");
        assert_eq!(verdict.element_name, "Unknown Storey / IfcWallStandardCase #3");
        assert_eq!(verdict.actual_value.as_deref(), Some("80 mm"));
    }
}
