//! Document-level diff tree.

use apidelta_types::Document;
use serde::Serialize;

use crate::components_diff::{diff_components, diff_servers, ComponentsDiff, ServersDiff};
use crate::config::DiffConfig;
use crate::error::DiffResult;
use crate::path_diff::{diff_paths, PathsDiff};
use crate::security_diff::{diff_security, SecurityDiff};
use crate::source_map::SourceMap;
use crate::validate::validate_document;

/// Everything that differs between two documents.
///
/// Borrows both documents; every branch is `None` when unchanged, so an
/// empty tree serializes to `{}`.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffTree<'a> {
    #[serde(skip)]
    pub base: &'a Document,
    #[serde(skip)]
    pub revision: &'a Document,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paths_diff: Option<PathsDiff<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components_diff: Option<ComponentsDiff<'a>>,
    /// Document-level security requirements.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_diff: Option<SecurityDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servers_diff: Option<ServersDiff>,
}

impl DiffTree<'_> {
    pub fn is_empty(&self) -> bool {
        self.paths_diff.is_none()
            && self.components_diff.is_none()
            && self.security_diff.is_none()
            && self.servers_diff.is_none()
    }
}

/// Compare two documents.
///
/// Both documents are validated first; on any structural error no tree is
/// produced.
pub fn compare_documents<'a>(
    config: &DiffConfig,
    base: &'a Document,
    revision: &'a Document,
) -> DiffResult<(DiffTree<'a>, SourceMap)> {
    validate_document(base)?;
    validate_document(revision)?;

    let tree = DiffTree {
        base,
        revision,
        paths_diff: diff_paths(config, base, revision)?,
        components_diff: diff_components(&base.components, &revision.components),
        security_diff: diff_security(&base.security, &revision.security),
        servers_diff: diff_servers(&base.servers, &revision.servers),
    };
    let sources = SourceMap::build(base, revision);

    tracing::info!(
        base = %base.source,
        revision = %revision.source,
        changed = !tree.is_empty(),
        "documents compared"
    );
    Ok((tree, sources))
}
