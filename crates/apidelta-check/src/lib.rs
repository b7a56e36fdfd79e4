//! Compatibility rules for apidelta.
//!
//! Walks a [`DiffTree`](apidelta_diff::DiffTree) with a registry of rules and
//! classifies every relevant change as a [`Finding`] at `INFO`, `WARN` or
//! `ERROR`. `WARN` and above are breaking.
//!
//! # Quick Start
//!
//! ```rust
//! use apidelta_check::{CompatConfig, Registry};
//! use apidelta_types::Document;
//!
//! let doc = Document::default();
//! let report = Registry::default_rules()
//!     .check(&doc, &doc, &CompatConfig::default())
//!     .unwrap();
//! assert!(report.findings.is_empty());
//! ```

pub mod config;
pub mod error;
pub mod finding;
pub mod level;
pub mod registry;
pub mod rule;
pub mod rules;
mod walk;

// Re-exports for convenience.
pub use config::CompatConfig;
pub use error::{CheckError, CheckResult};
pub use finding::{sort_findings, Finding};
pub use level::Level;
pub use registry::{CheckReport, Registry, RuleRun};
pub use rule::{CheckContext, CheckFn, Rule, Site};
