use serde::{Deserialize, Serialize};

/// Options that change how endpoints are matched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    /// Match path parameters by position instead of by name.
    pub path_param_aware: bool,
    /// Prefix removed from base templates before matching.
    pub strip_prefix_base: String,
    /// Prefix removed from revision templates before matching.
    pub strip_prefix_revision: String,
}
