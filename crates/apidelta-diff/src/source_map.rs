//! Where each endpoint of a document was defined.

use std::collections::BTreeMap;

use apidelta_types::{Document, EndpointKey};

/// Endpoint to origin, for both documents.
///
/// An operation's own origin wins over the document source, which lets
/// merged documents attribute endpoints to the file they came from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SourceMap {
    pub base: BTreeMap<EndpointKey, String>,
    pub revision: BTreeMap<EndpointKey, String>,
}

impl SourceMap {
    pub fn build(base: &Document, revision: &Document) -> Self {
        Self {
            base: origins(base),
            revision: origins(revision),
        }
    }

    /// Origin of a base endpoint, or `""` if unknown.
    pub fn base_source(&self, key: &EndpointKey) -> &str {
        self.base.get(key).map(String::as_str).unwrap_or_default()
    }

    /// Origin of a revision endpoint, or `""` if unknown.
    pub fn revision_source(&self, key: &EndpointKey) -> &str {
        self.revision.get(key).map(String::as_str).unwrap_or_default()
    }
}

fn origins(doc: &Document) -> BTreeMap<EndpointKey, String> {
    doc.operations()
        .map(|(path, method, _, op)| {
            let origin = op.origin.clone().unwrap_or_else(|| doc.source.clone());
            (EndpointKey::new(path, method), origin)
        })
        .collect()
}
