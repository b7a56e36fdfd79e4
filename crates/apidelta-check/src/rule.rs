use apidelta_diff::{DiffTree, SourceMap};
use apidelta_types::{EndpointKey, Method, Operation};
use chrono::NaiveDate;

use crate::config::CompatConfig;
use crate::finding::Finding;
use crate::level::Level;

/// A rule body: a pure function of the comparison context.
pub type CheckFn = fn(&CheckContext<'_>) -> Vec<Finding>;

/// One compatibility rule.
///
/// Rules are plain values so a registry is just an ordered list of them.
#[derive(Clone, Copy, Debug)]
pub struct Rule {
    /// Stable, unique identifier.
    pub id: &'static str,
    /// Level reported unless overridden by configuration.
    pub level: Level,
    /// Optional rules report at `INFO` unless explicitly included.
    pub optional: bool,
    /// One-line summary, shown by the CLI.
    pub description: &'static str,
    pub check: CheckFn,
}

/// Everything a rule may look at.
pub struct CheckContext<'a> {
    pub tree: &'a DiffTree<'a>,
    pub sources: &'a SourceMap,
    pub config: &'a CompatConfig,
    /// Date sunsets are measured against.
    pub today: NaiveDate,
    pub rule: &'a Rule,
    /// Level this run reports at, after overrides.
    pub level: Level,
}

/// Where a finding points.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Site {
    pub path: String,
    pub operation: String,
    pub operation_id: String,
    pub source: String,
}

impl Site {
    /// Document-level site with no endpoint.
    pub fn document(source: &str) -> Self {
        Self {
            source: source.to_string(),
            ..Self::default()
        }
    }
}

impl CheckContext<'_> {
    /// Site of an endpoint that exists in the revision.
    pub fn revision_site(&self, path: &str, method: Method, op: &Operation) -> Site {
        let key = EndpointKey::new(path, method);
        self.site(path, method, op, self.sources.revision_source(&key))
    }

    /// Site of an endpoint that exists only in the base.
    pub fn base_site(&self, path: &str, method: Method, op: &Operation) -> Site {
        let key = EndpointKey::new(path, method);
        self.site(path, method, op, self.sources.base_source(&key))
    }

    fn site(&self, path: &str, method: Method, op: &Operation, source: &str) -> Site {
        Site {
            path: path.to_string(),
            operation: method.to_string(),
            operation_id: op.operation_id.clone().unwrap_or_default(),
            source: source.to_string(),
        }
    }

    /// Build a finding for the running rule.
    pub fn finding(&self, site: &Site, text: impl Into<String>) -> Finding {
        Finding {
            id: self.rule.id.to_string(),
            level: self.level,
            text: text.into(),
            operation: site.operation.clone(),
            operation_id: site.operation_id.clone(),
            path: site.path.clone(),
            source: site.source.clone(),
            comment: None,
            todo: None,
        }
    }
}
