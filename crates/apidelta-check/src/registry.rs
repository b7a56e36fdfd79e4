use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use apidelta_diff::{compare_documents, DiffTree, SourceMap};
use apidelta_types::Document;
use chrono::NaiveDate;
use serde::Serialize;

use crate::config::CompatConfig;
use crate::error::{CheckError, CheckResult};
use crate::finding::{sort_findings, Finding};
use crate::level::Level;
use crate::rule::{CheckContext, Rule};
use crate::rules::catalogue;

// ---------------------------------------------------------------------------
// CheckReport
// ---------------------------------------------------------------------------

/// Per-rule timing and finding count, in run order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleRun {
    pub rule_id: &'static str,
    /// Findings kept after suppression and level filtering.
    pub findings: usize,
    pub elapsed: Duration,
}

/// The outcome of running a registry over one diff tree.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckReport {
    /// Findings in stable report order.
    pub findings: Vec<Finding>,
    /// BLAKE3 fingerprint of the policy that was active.
    pub config_hash: String,
    /// Date sunsets were measured against.
    pub evaluation_date: NaiveDate,
    #[serde(skip)]
    pub rule_runs: Vec<RuleRun>,
    #[serde(skip)]
    pub elapsed: Duration,
}

impl CheckReport {
    /// Returns `true` if any finding is `WARN` or above.
    pub fn is_breaking(&self) -> bool {
        self.findings.iter().any(Finding::is_breaking)
    }

    /// Number of findings at exactly `level`.
    pub fn count(&self, level: Level) -> usize {
        self.findings.iter().filter(|f| f.level == level).count()
    }

    pub fn max_level(&self) -> Option<Level> {
        self.findings.iter().map(|f| f.level).max()
    }

    /// Returns `true` if some finding is at `level` or above.
    pub fn reaches(&self, level: Level) -> bool {
        self.max_level().is_some_and(|max| max >= level)
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// An ordered set of rules.
///
/// Starts empty with [`Self::new`]; [`Self::default_rules`] holds the full
/// built-in catalogue.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    rules: Vec<Rule>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in rule.
    pub fn default_rules() -> Self {
        Self { rules: catalogue() }
    }

    /// Append a rule to the end of the run order.
    pub fn add_rule(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn rule(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }

    /// Number of rules in the registry.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Reject configurations naming rules this registry does not hold, and
    /// registries holding two rules with the same id.
    pub fn validate(&self, config: &CompatConfig) -> CheckResult<()> {
        let mut seen = BTreeSet::new();
        for rule in &self.rules {
            if !seen.insert(rule.id) {
                return Err(CheckError::Config(format!("duplicate rule id '{}'", rule.id)));
            }
        }

        let sets: [(&'static str, Vec<&String>); 4] = [
            ("included_rules", config.included_rules.iter().collect()),
            ("excluded_rules", config.excluded_rules.iter().collect()),
            ("level_overrides", config.level_overrides.keys().collect()),
            ("suppressed_rules", config.suppressed_rules.iter().collect()),
        ];
        for (field, ids) in sets {
            if let Some(id) = ids.into_iter().find(|id| !seen.contains(id.as_str())) {
                return Err(CheckError::UnknownRule {
                    field,
                    id: id.clone(),
                });
            }
        }
        Ok(())
    }

    /// Level `rule` reports at under `config`.
    pub fn effective_level(rule: &Rule, config: &CompatConfig) -> Level {
        if let Some(level) = config.level_overrides.get(rule.id) {
            return *level;
        }
        if rule.optional && !config.included_rules.contains(rule.id) {
            return Level::Info;
        }
        rule.level
    }

    /// Run every rule over `tree` and collect the report.
    pub fn run(
        &self,
        tree: &DiffTree<'_>,
        sources: &SourceMap,
        config: &CompatConfig,
    ) -> CheckResult<CheckReport> {
        self.validate(config)?;

        let start = Instant::now();
        let today = config.today();
        let minimum = config.effective_minimum_level();
        let mut findings = Vec::new();
        let mut rule_runs = Vec::with_capacity(self.rules.len());

        for rule in &self.rules {
            if config.excluded_rules.contains(rule.id) {
                continue;
            }
            let rule_start = Instant::now();
            let ctx = CheckContext {
                tree,
                sources,
                config,
                today,
                rule,
                level: Self::effective_level(rule, config),
            };
            let mut produced = (rule.check)(&ctx);
            if config.suppressed_rules.contains(rule.id) {
                produced.clear();
            }
            produced.retain(|f| f.level >= minimum);

            let run = RuleRun {
                rule_id: rule.id,
                findings: produced.len(),
                elapsed: rule_start.elapsed(),
            };
            tracing::debug!(rule = run.rule_id, findings = run.findings, elapsed = ?run.elapsed, "rule evaluated");
            rule_runs.push(run);
            findings.extend(produced);
        }

        sort_findings(&mut findings);
        let report = CheckReport {
            findings,
            config_hash: config.fingerprint(today),
            evaluation_date: today,
            rule_runs,
            elapsed: start.elapsed(),
        };
        tracing::info!(
            findings = report.findings.len(),
            errors = report.count(Level::Error),
            warnings = report.count(Level::Warn),
            breaking = report.is_breaking(),
            "compatibility check complete"
        );
        Ok(report)
    }

    /// Compare two documents and run every rule over the result.
    pub fn check(
        &self,
        base: &Document,
        revision: &Document,
        config: &CompatConfig,
    ) -> CheckResult<CheckReport> {
        let (tree, sources) = compare_documents(&config.diff_config(), base, revision)?;
        self.run(&tree, &sources, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{endpoints, responses};

    #[test]
    fn default_registry_holds_the_catalogue() {
        let registry = Registry::default_rules();
        assert_eq!(registry.len(), 31);
        assert!(registry.rule("endpoint-added").is_some());
        assert!(registry.validate(&CompatConfig::default()).is_ok());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut registry = Registry::new();
        registry.add_rule(endpoints::ENDPOINT_ADDED);
        registry.add_rule(endpoints::ENDPOINT_ADDED);
        let err = registry.validate(&CompatConfig::default()).unwrap_err();
        assert!(matches!(err, CheckError::Config(_)));
    }

    #[test]
    fn unknown_ids_name_their_field() {
        let registry = Registry::default_rules();
        let mut config = CompatConfig::default();
        config.level_overrides.insert("no-such-rule".into(), Level::Error);
        match registry.validate(&config) {
            Err(CheckError::UnknownRule { field, id }) => {
                assert_eq!(field, "level_overrides");
                assert_eq!(id, "no-such-rule");
            }
            other => panic!("expected UnknownRule, got {other:?}"),
        }
    }

    #[test]
    fn optional_rules_report_at_info_unless_included() {
        let rule = responses::RESPONSE_NON_SUCCESS_STATUS_REMOVED;
        let mut config = CompatConfig::default();
        assert_eq!(Registry::effective_level(&rule, &config), Level::Info);

        config.included_rules.insert(rule.id.into());
        assert_eq!(Registry::effective_level(&rule, &config), Level::Error);

        config.level_overrides.insert(rule.id.into(), Level::Warn);
        assert_eq!(Registry::effective_level(&rule, &config), Level::Warn);
    }

    #[test]
    fn empty_report_is_not_breaking() {
        let report = CheckReport {
            findings: Vec::new(),
            config_hash: String::new(),
            evaluation_date: NaiveDate::MIN,
            rule_runs: Vec::new(),
            elapsed: Duration::ZERO,
        };
        assert!(!report.is_breaking());
        assert_eq!(report.max_level(), None);
        assert!(!report.reaches(Level::Info));
    }
}
