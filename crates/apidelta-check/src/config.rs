use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use apidelta_diff::DiffConfig;
use chrono::{Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CheckError, CheckResult};
use crate::level::Level;

/// Compatibility policy applied to one comparison.
///
/// Rule id sets:
/// - `included_rules` -- optional rules that report at their own level
///   (other optional rules still run, at `INFO`)
/// - `excluded_rules` -- rules that do not run at all
/// - `suppressed_rules` -- rules that run but whose findings are dropped
/// - `level_overrides` -- rule id to level, replacing the default
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompatConfig {
    /// Report only breaking findings (raises the minimum level to `WARN`).
    pub breaking_only: bool,
    /// Minimum notice, in days, between deprecation and sunset. `0` turns
    /// the deprecation-notice policy off.
    pub deprecation_days: u32,
    pub path_param_aware_matching: bool,
    pub minimum_level: Level,
    pub included_rules: BTreeSet<String>,
    pub excluded_rules: BTreeSet<String>,
    pub level_overrides: BTreeMap<String, Level>,
    pub suppressed_rules: BTreeSet<String>,
    pub strip_prefix_base: String,
    pub strip_prefix_revision: String,
    /// Date sunsets are measured against. Today (UTC) when unset.
    pub evaluation_date: Option<NaiveDate>,
}

impl Default for CompatConfig {
    fn default() -> Self {
        Self {
            breaking_only: false,
            deprecation_days: 0,
            path_param_aware_matching: false,
            minimum_level: Level::Info,
            included_rules: BTreeSet::new(),
            excluded_rules: BTreeSet::new(),
            level_overrides: BTreeMap::new(),
            suppressed_rules: BTreeSet::new(),
            strip_prefix_base: String::new(),
            strip_prefix_revision: String::new(),
            evaluation_date: None,
        }
    }
}

impl CompatConfig {
    /// Parse a TOML policy file body.
    pub fn from_toml_str(raw: &str) -> CheckResult<Self> {
        toml::from_str(raw).map_err(|e| CheckError::Config(e.to_string()))
    }

    /// Load a TOML policy file.
    pub fn load(path: &Path) -> CheckResult<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| CheckError::Config(format!("reading {}: {e}", path.display())))?;
        Self::from_toml_str(&raw)
    }

    pub fn today(&self) -> NaiveDate {
        self.evaluation_date
            .unwrap_or_else(|| Utc::now().date_naive())
    }

    /// Lowest level that is reported.
    pub fn effective_minimum_level(&self) -> Level {
        if self.breaking_only {
            self.minimum_level.max(Level::Warn)
        } else {
            self.minimum_level
        }
    }

    pub fn deprecation_policy_active(&self) -> bool {
        self.deprecation_days > 0
    }

    /// Earliest sunset acceptable for something deprecated on `today`.
    pub fn earliest_sunset(&self, today: NaiveDate) -> NaiveDate {
        today
            .checked_add_days(Days::new(u64::from(self.deprecation_days)))
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn diff_config(&self) -> DiffConfig {
        DiffConfig {
            path_param_aware: self.path_param_aware_matching,
            strip_prefix_base: self.strip_prefix_base.clone(),
            strip_prefix_revision: self.strip_prefix_revision.clone(),
        }
    }

    /// BLAKE3 fingerprint of the policy with the evaluation date pinned.
    pub fn fingerprint(&self, today: NaiveDate) -> String {
        let pinned = Self {
            evaluation_date: Some(today),
            ..self.clone()
        };
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"apidelta-compat-config-v1");
        match serde_json::to_vec(&pinned) {
            Ok(bytes) => {
                hasher.update(&bytes);
            }
            Err(e) => {
                tracing::warn!(error = %e, "config not serializable; fingerprint covers the domain tag only");
            }
        }
        hasher.finalize().to_hex().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = CompatConfig::default();
        assert_eq!(config.effective_minimum_level(), Level::Info);
        assert!(!config.deprecation_policy_active());
        assert_eq!(config.diff_config(), DiffConfig::default());
    }

    #[test]
    fn breaking_only_raises_minimum_level() {
        let config = CompatConfig {
            breaking_only: true,
            ..CompatConfig::default()
        };
        assert_eq!(config.effective_minimum_level(), Level::Warn);

        let strict = CompatConfig {
            breaking_only: true,
            minimum_level: Level::Error,
            ..CompatConfig::default()
        };
        assert_eq!(strict.effective_minimum_level(), Level::Error);
    }

    #[test]
    fn parses_toml() {
        let config = CompatConfig::from_toml_str(
            r#"
            deprecation_days = 10
            path_param_aware_matching = true
            minimum_level = "WARN"
            excluded_rules = ["api-tag-removed"]
            evaluation_date = "2030-01-01"

            [level_overrides]
            request-parameter-removed = "ERROR"
            "#,
        )
        .unwrap();
        assert_eq!(config.deprecation_days, 10);
        assert!(config.diff_config().path_param_aware);
        assert_eq!(config.minimum_level, Level::Warn);
        assert!(config.excluded_rules.contains("api-tag-removed"));
        assert_eq!(config.level_overrides["request-parameter-removed"], Level::Error);
        assert_eq!(config.today(), NaiveDate::from_ymd_opt(2030, 1, 1).unwrap());
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(matches!(
            CompatConfig::from_toml_str("deprecation_days = \"soon\""),
            Err(CheckError::Config(_))
        ));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "breaking_only = true").unwrap();
        let config = CompatConfig::load(file.path()).unwrap();
        assert!(config.breaking_only);
    }

    #[test]
    fn earliest_sunset_adds_notice_days() {
        let config = CompatConfig {
            deprecation_days: 10,
            ..CompatConfig::default()
        };
        let today = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
        assert_eq!(config.earliest_sunset(today), NaiveDate::from_ymd_opt(2030, 1, 11).unwrap());
    }

    #[test]
    fn fingerprint_tracks_policy_changes() {
        let today = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
        let a = CompatConfig::default();
        let b = CompatConfig {
            deprecation_days: 5,
            ..CompatConfig::default()
        };
        assert_eq!(a.fingerprint(today), a.fingerprint(today));
        assert_ne!(a.fingerprint(today), b.fingerprint(today));
        assert_eq!(a.fingerprint(today).len(), 64);
    }
}
