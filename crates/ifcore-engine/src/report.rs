// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Flat report records for presentation layers

use crate::aggregate::ProjectResult;
use crate::verdict::{CheckStatus, Verdict};
use crate::Result;
use serde::{Deserialize, Serialize};

/// One verdict as a flat row
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FlatRecord {
    pub element_id: Option<String>,
    pub element_type: String,
    pub element_name: String,
    pub check_status: CheckStatus,
    pub actual_value: Option<String>,
    pub required_value: Option<String>,
    pub comment: Option<String>,
}

impl From<&Verdict> for FlatRecord {
    fn from(v: &Verdict) -> Self {
        Self {
            element_id: v.element_id.clone(),
            element_type: v.element_type.clone(),
            element_name: v.element_name.clone(),
            check_status: v.check_status,
            actual_value: v.actual_value.clone(),
            required_value: v.required_value.clone(),
            comment: v.comment.clone(),
        }
    }
}

/// Row as received from outside, status not yet validated
#[derive(Deserialize)]
struct RawRecord {
    element_id: Option<String>,
    element_type: String,
    element_name: String,
    check_status: String,
    #[serde(default)]
    actual_value: Option<String>,
    #[serde(default)]
    required_value: Option<String>,
    #[serde(default)]
    comment: Option<String>,
}

impl ProjectResult {
    /// Every verdict of every check, in check order
    pub fn flat_records(&self) -> Vec<FlatRecord> {
        self.check_results
            .iter()
            .flat_map(|check| check.elements.iter().map(FlatRecord::from))
            .collect()
    }

    /// Pretty JSON of the whole result tree
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Serialize flat records as a JSON array
pub fn records_to_json(records: &[FlatRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Parse a JSON array of flat records
///
/// A status outside `pass|fail|warning|blocked` is an error.
pub fn records_from_json(json: &str) -> Result<Vec<FlatRecord>> {
    let raw: Vec<RawRecord> = serde_json::from_str(json)?;
    raw.into_iter()
        .map(|r| -> Result<FlatRecord> {
            Ok(FlatRecord {
                check_status: r.check_status.parse()?,
                element_id: r.element_id,
                element_type: r.element_type,
                element_name: r.element_name,
                actual_value: r.actual_value,
                required_value: r.required_value,
                comment: r.comment,
            })
        })
        .collect()
}
