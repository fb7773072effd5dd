// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFCore Engine - building code compliance checks over IFC models
//!
//! The engine turns a parsed model into element records, resolves every
//! attribute a rule needs through an ordered, data-driven source chain, and
//! runs a static registry of rules over the records. Each rule yields one
//! verdict per element; verdicts roll up into check results and a project
//! result that serializes to flat report rows.
//!
//! # Pipeline
//!
//! - [`units`]: model length unit to millimetres
//! - [`extract`]: element records with psets, quantities, materials and
//!   adjacent spaces
//! - [`resolve`]: attribute values with provenance
//! - [`classify`]: general or service use of the adjacent spaces
//! - [`rules`]: wall, slab, structure, accessibility, foundation and EC2
//!   slab design checks
//! - [`aggregate`] and [`report`]: check results, team tallies and flat rows
//!
//! # Example
//!
//! ```ignore
//! use ifcore_engine::{Engine, Thresholds};
//!
//! let engine = Engine::new(Thresholds::from_env()?);
//! let result = engine.run_content(&ifc_content)?;
//!
//! for check in &result.check_results {
//!     println!("{}: {} ({})", check.check_name, check.status, check.summary);
//! }
//! ```

pub mod aggregate;
pub mod classify;
pub mod config;
pub mod element;
mod error;
pub mod extract;
pub mod report;
pub mod resolve;
pub mod rules;
pub mod structural;
pub mod units;
pub mod verdict;

pub use aggregate::{CheckResult, Counts, ProjectResult, RuleStatus, TeamTally};
pub use classify::{SpaceCategory, SpaceContext};
pub use config::{ClimateZone, Thresholds};
pub use element::{ElementGroup, ElementRecord, Population};
pub use error::{CheckError, Result};
pub use report::FlatRecord;
pub use resolve::{AttributeSpec, Catalog, Provenance, Resolution, Source, Value, ValueKind};
pub use rules::{Rule, RuleContext};
pub use verdict::{CheckStatus, Verdict};

use ifcore_model::IfcModel;
use ifcore_parser::ParsedModel;
use std::path::Path;

/// Runs the rule registry over models
#[derive(Clone, Debug)]
pub struct Engine {
    thresholds: Thresholds,
    catalog: Catalog,
    rules: Vec<Rule>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Thresholds::default())
    }
}

impl Engine {
    /// Engine with the standard catalog and every registered rule
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            catalog: Catalog::standard(),
            rules: rules::registry().to_vec(),
        }
    }

    /// Replace the attribute catalog
    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Replace the rule set
    pub fn with_rules(mut self, rules: Vec<Rule>) -> Self {
        self.rules = rules;
        self
    }

    /// Keep only the named rules, in the given order
    pub fn select(self, names: &[&str]) -> Result<Self> {
        let rules = names
            .iter()
            .map(|name| {
                rules::find(name)
                    .copied()
                    .ok_or_else(|| CheckError::rule(format!("Unknown rule '{}'", name)))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(self.with_rules(rules))
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Extract and check a parsed model
    ///
    /// Fails only when the model's unit assignment cannot be used.
    pub fn run(&self, model: &dyn IfcModel) -> Result<ProjectResult> {
        let population = extract::extract(model, &self.catalog)?;
        Ok(self.evaluate(&population))
    }

    /// Parse STEP content and check it
    pub fn run_content(&self, content: &str) -> Result<ProjectResult> {
        let model = ParsedModel::parse(content)?;
        self.run(&model)
    }

    /// Run every rule over an extracted population
    ///
    /// A rule that returns an error becomes a blocked check result; the
    /// remaining rules still run.
    pub fn evaluate(&self, population: &Population) -> ProjectResult {
        let ctx = RuleContext::new(population, &self.thresholds);
        let check_results: Vec<CheckResult> = self
            .rules
            .iter()
            .map(|rule| match rule.run(&ctx) {
                Ok(verdicts) => {
                    log::debug!("{}: {} verdicts", rule.name, verdicts.len());
                    CheckResult::from_verdicts(rule, verdicts)
                }
                Err(err) => {
                    log::warn!("Rule {} failed: {}", rule.name, err);
                    CheckResult::from_error(rule, &err)
                }
            })
            .collect();

        let result = ProjectResult::new(
            project_name(&population.file_name),
            population.file_name.clone(),
            population.schema_version.clone(),
            check_results,
        );
        log::info!(
            "Checked {} elements with {} rules: {} checks passed, {} failed",
            population.element_count(),
            result.counts.total_checks,
            result.counts.passed_checks,
            result.counts.failed_checks
        );
        result
    }
}

fn project_name(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .unwrap_or("Unnamed Project")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_IFC: &str = r#"ISO-10303-21;
HEADER;
FILE_DESCRIPTION(('ViewDefinition [CoordinationView]'),'2;1');
FILE_NAME('duplex.ifc','2024-01-01T00:00:00',('Author'),('Org'),'Preprocessor','App','');
FILE_SCHEMA(('IFC4'));
ENDSEC;
DATA;
#1=IFCPROJECT('proj',$,'Duplex',$,$,$,$,$,#2);
#2=IFCUNITASSIGNMENT((#3));
#3=IFCSIUNIT(*,.LENGTHUNIT.,$,.METRE.);
#8=IFCBUILDINGSTOREY('st0',$,'Level 1',$,$,$,$,$,.ELEMENT.,0.0);
#10=IFCWALL('wall1',$,'Partition',$,$,$,$,$,$);
#11=IFCRELCONTAINEDINSPATIALSTRUCTURE('r1',$,$,$,(#10),#8);
#20=IFCQUANTITYLENGTH('Width',$,$,0.08,$);
#21=IFCELEMENTQUANTITY('q1',$,'Qto_WallBaseQuantities',$,$,(#20));
#22=IFCRELDEFINESBYPROPERTIES('r2',$,$,$,(#10),#21);
ENDSEC;
END-ISO-10303-21;
"#;

    #[test]
    fn test_thin_wall_fails_thickness() {
        let result = Engine::default().run_content(TEST_IFC).unwrap();
        assert_eq!(result.name, "duplex");
        assert_eq!(result.schema_version, "IFC4");

        let check = result.check("wall_thickness").unwrap();
        assert_eq!(check.elements.len(), 1);
        let verdict = &check.elements[0];
        assert_eq!(verdict.check_status, CheckStatus::Fail);
        assert_eq!(verdict.actual_value.as_deref(), Some("80 mm"));
        assert_eq!(verdict.required_value.as_deref(), Some(">= 100 mm"));
        assert_eq!(verdict.element_name, "Level 1 / Partition");
        assert_eq!(check.status, RuleStatus::Fail);
    }

    #[test]
    fn test_every_rule_reports() {
        let engine = Engine::default();
        let result = engine.run_content(TEST_IFC).unwrap();
        assert_eq!(result.check_results.len(), engine.rules().len());

        // no slabs in the model
        let slabs = result.check("slab_thickness").unwrap();
        assert_eq!(slabs.status, RuleStatus::Unknown);
        assert_eq!(slabs.summary, "No elements found for this check.");

        // external flag and U-value both missing
        let u_value = result.check("wall_u_value").unwrap();
        assert_eq!(u_value.elements[0].check_status, CheckStatus::Blocked);
        assert_eq!(u_value.status, RuleStatus::Unknown);
    }

    #[test]
    fn test_rule_error_blocks_only_that_rule() {
        let thresholds = Thresholds {
            climate_zone: Some("Q".to_string()),
            ..Thresholds::default()
        };
        let result = Engine::new(thresholds).run_content(TEST_IFC).unwrap();
        let u_value = result.check("wall_u_value").unwrap();
        assert_eq!(u_value.status, RuleStatus::Blocked);
        assert!(u_value.summary.starts_with("Error: Invalid climate zone 'Q'"));
        assert_eq!(
            result.check("wall_thickness").unwrap().status,
            RuleStatus::Fail
        );
    }

    #[test]
    fn test_select_rules() {
        let engine = Engine::default()
            .select(&["wall_thickness", "wall_height"])
            .unwrap();
        assert_eq!(engine.rules().len(), 2);
        assert!(matches!(
            Engine::default().select(&["no_such_rule"]),
            Err(CheckError::Rule(_))
        ));
    }

    #[test]
    fn test_bad_unit_fails_the_run() {
        let content = TEST_IFC.replace("#2=IFCUNITASSIGNMENT((#3));", "#2=IFCUNITASSIGNMENT((#99));");
        assert!(Engine::default().run_content(&content).is_err());
    }

    #[test]
    fn test_project_name() {
        assert_eq!(project_name("model.ifc"), "model");
        assert_eq!(project_name(""), "Unnamed Project");
    }
}
