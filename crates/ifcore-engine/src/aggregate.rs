// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Check results and the project result tree

use crate::rules::Rule;
use crate::verdict::{CheckStatus, Verdict};
use crate::CheckError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Roll-up status of one rule over the whole model
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleStatus {
    Pass,
    Fail,
    /// No verdict passed and none failed
    Unknown,
    /// The rule itself could not run
    Blocked,
}

impl RuleStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RuleStatus::Pass => "pass",
            RuleStatus::Fail => "fail",
            RuleStatus::Unknown => "unknown",
            RuleStatus::Blocked => "blocked",
        }
    }

    /// `fail` if any verdict failed, else `unknown` unless one passed
    pub fn roll_up(verdicts: &[Verdict]) -> Self {
        if verdicts.iter().any(|v| v.check_status == CheckStatus::Fail) {
            RuleStatus::Fail
        } else if verdicts.iter().any(|v| v.check_status == CheckStatus::Pass) {
            RuleStatus::Pass
        } else {
            RuleStatus::Unknown
        }
    }
}

impl fmt::Display for RuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One rule execution over the full model
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub check_name: String,
    pub team: String,
    pub status: RuleStatus,
    pub summary: String,
    pub has_elements: bool,
    pub elements: Vec<Verdict>,
}

impl CheckResult {
    pub fn from_verdicts(rule: &Rule, verdicts: Vec<Verdict>) -> Self {
        let (status, summary) = if verdicts.is_empty() {
            (
                RuleStatus::Unknown,
                "No elements found for this check.".to_string(),
            )
        } else {
            let count = |status| verdicts.iter().filter(|v| v.check_status == status).count();
            let (pass, fail) = (count(CheckStatus::Pass), count(CheckStatus::Fail));
            let total = verdicts.len();
            (
                RuleStatus::roll_up(&verdicts),
                format!(
                    "{} pass, {} fail, {} other (of {})",
                    pass,
                    fail,
                    total - pass - fail,
                    total
                ),
            )
        };
        Self {
            check_name: rule.name.to_string(),
            team: rule.team.to_string(),
            status,
            summary,
            has_elements: !verdicts.is_empty(),
            elements: verdicts,
        }
    }

    /// A rule that returned an error
    pub fn from_error(rule: &Rule, error: &CheckError) -> Self {
        Self {
            check_name: rule.name.to_string(),
            team: rule.team.to_string(),
            status: RuleStatus::Blocked,
            summary: format!("Error: {}", error),
            has_elements: false,
            elements: Vec::new(),
        }
    }

    pub fn count(&self, status: CheckStatus) -> usize {
        self.elements
            .iter()
            .filter(|v| v.check_status == status)
            .count()
    }
}

/// Check statuses of one team
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamTally {
    pub pass: usize,
    pub fail: usize,
    pub unknown: usize,
    pub blocked: usize,
    pub total: usize,
}

impl TeamTally {
    fn add(&mut self, status: RuleStatus) {
        match status {
            RuleStatus::Pass => self.pass += 1,
            RuleStatus::Fail => self.fail += 1,
            RuleStatus::Unknown => self.unknown += 1,
            RuleStatus::Blocked => self.blocked += 1,
        }
        self.total += 1;
    }
}

/// Aggregate counts of a run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    /// Verdict rows
    pub total_elements: usize,
    pub passed_elements: usize,
    pub failed_elements: usize,
    pub total_checks: usize,
    pub passed_checks: usize,
    pub failed_checks: usize,
}

/// The full result of one analysis run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectResult {
    pub name: String,
    pub file_name: String,
    pub schema_version: String,
    pub check_results: Vec<CheckResult>,
    pub counts: Counts,
}

impl ProjectResult {
    pub fn new(
        name: impl Into<String>,
        file_name: impl Into<String>,
        schema_version: impl Into<String>,
        check_results: Vec<CheckResult>,
    ) -> Self {
        let counts = Self::tally(&check_results);
        Self {
            name: name.into(),
            file_name: file_name.into(),
            schema_version: schema_version.into(),
            check_results,
            counts,
        }
    }

    fn tally(check_results: &[CheckResult]) -> Counts {
        let mut counts = Counts {
            total_checks: check_results.len(),
            ..Counts::default()
        };
        for check in check_results {
            counts.total_elements += check.elements.len();
            counts.passed_elements += check.count(CheckStatus::Pass);
            counts.failed_elements += check.count(CheckStatus::Fail);
            match check.status {
                RuleStatus::Pass => counts.passed_checks += 1,
                RuleStatus::Fail => counts.failed_checks += 1,
                _ => {}
            }
        }
        counts
    }

    /// Check statuses per team
    pub fn summary_by_team(&self) -> BTreeMap<String, TeamTally> {
        let mut teams: BTreeMap<String, TeamTally> = BTreeMap::new();
        for check in &self.check_results {
            teams.entry(check.team.clone()).or_default().add(check.status);
        }
        teams
    }

    /// Look up a check by rule name
    pub fn check(&self, name: &str) -> Option<&CheckResult> {
        self.check_results.iter().find(|c| c.check_name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules;

    fn verdict(status: CheckStatus) -> Verdict {
        Verdict {
            element_id: Some("id".into()),
            element_type: "IfcWall".into(),
            element_name: "Unknown Storey / W".into(),
            element_name_long: None,
            check_status: status,
            actual_value: None,
            required_value: None,
            comment: None,
            log: None,
        }
    }

    fn rule() -> &'static Rule {
        rules::find("wall_thickness").unwrap()
    }

    #[test]
    fn test_one_fail_rolls_up_to_fail() {
        let mut verdicts = vec![verdict(CheckStatus::Fail)];
        verdicts.extend((0..9).map(|_| verdict(CheckStatus::Pass)));
        let check = CheckResult::from_verdicts(rule(), verdicts);
        assert_eq!(check.status, RuleStatus::Fail);
        assert_eq!(check.summary, "9 pass, 1 fail, 0 other (of 10)");
    }

    #[test]
    fn test_all_blocked_rolls_up_to_unknown() {
        let verdicts = (0..10).map(|_| verdict(CheckStatus::Blocked)).collect();
        let check = CheckResult::from_verdicts(rule(), verdicts);
        assert_eq!(check.status, RuleStatus::Unknown);
        assert_eq!(check.summary, "0 pass, 0 fail, 10 other (of 10)");
    }

    #[test]
    fn test_pass_with_warnings() {
        let verdicts = vec![verdict(CheckStatus::Warning), verdict(CheckStatus::Pass)];
        assert_eq!(RuleStatus::roll_up(&verdicts), RuleStatus::Pass);
    }

    #[test]
    fn test_empty_and_error_results() {
        let empty = CheckResult::from_verdicts(rule(), Vec::new());
        assert_eq!(empty.status, RuleStatus::Unknown);
        assert_eq!(empty.summary, "No elements found for this check.");
        assert!(!empty.has_elements);

        let err = CheckResult::from_error(rule(), &CheckError::config("bad"));
        assert_eq!(err.status, RuleStatus::Blocked);
        assert_eq!(err.summary, "Error: Configuration error: bad");
    }

    #[test]
    fn test_project_counts_and_teams() {
        let checks = vec![
            CheckResult::from_verdicts(
                rule(),
                vec![verdict(CheckStatus::Pass), verdict(CheckStatus::Fail)],
            ),
            CheckResult::from_verdicts(
                rules::find("slab_thickness").unwrap(),
                vec![verdict(CheckStatus::Pass)],
            ),
            CheckResult::from_error(rules::find("wall_u_value").unwrap(), &CheckError::rule("x")),
        ];
        let project = ProjectResult::new("model", "model.ifc", "IFC4", checks);
        assert_eq!(
            project.counts,
            Counts {
                total_elements: 3,
                passed_elements: 2,
                failed_elements: 1,
                total_checks: 3,
                passed_checks: 1,
                failed_checks: 1,
            }
        );
        let teams = project.summary_by_team();
        assert_eq!(
            teams["walls"],
            TeamTally {
                pass: 0,
                fail: 1,
                unknown: 0,
                blocked: 1,
                total: 2
            }
        );
        assert_eq!(teams["slabs"].pass, 1);
        assert!(project.check("wall_u_value").is_some());
    }
}
