//! Security requirement comparison.
//!
//! A requirement is identified by the sorted names of the schemes it
//! combines, so `{a: [], b: []}` and `{b: [], a: []}` are the same
//! requirement. Scopes are compared per scheme within a requirement.

use std::collections::BTreeMap;

use apidelta_types::SecurityRequirement;
use serde::Serialize;

use crate::value::StringsDiff;

/// Id of the empty requirement, which allows unauthenticated access.
pub const ANONYMOUS_REQUIREMENT: &str = "anonymous";

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityDiff {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub added: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub deleted: Vec<String>,
    /// Requirement id, then scheme name, then scope changes.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub modified: BTreeMap<String, BTreeMap<String, StringsDiff>>,
}

impl SecurityDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.deleted.is_empty() && self.modified.is_empty()
    }
}

/// Identity of one requirement: scheme names joined with ` AND `.
pub fn requirement_id(requirement: &SecurityRequirement) -> String {
    if requirement.is_empty() {
        return ANONYMOUS_REQUIREMENT.to_string();
    }
    requirement
        .keys()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" AND ")
}

pub(crate) fn diff_security(
    base: &[SecurityRequirement],
    revision: &[SecurityRequirement],
) -> Option<SecurityDiff> {
    let index = |list: &[SecurityRequirement]| -> BTreeMap<String, SecurityRequirement> {
        list.iter().map(|r| (requirement_id(r), r.clone())).collect()
    };
    let base_map = index(base);
    let revision_map = index(revision);

    let mut result = SecurityDiff::default();
    for (id, b) in &base_map {
        match revision_map.get(id) {
            Some(r) => {
                let scopes: BTreeMap<String, StringsDiff> = b
                    .iter()
                    .filter_map(|(scheme, base_scopes)| {
                        let revision_scopes = r.get(scheme)?;
                        StringsDiff::between(base_scopes, revision_scopes)
                            .map(|d| (scheme.clone(), d))
                    })
                    .collect();
                if !scopes.is_empty() {
                    result.modified.insert(id.clone(), scopes);
                }
            }
            None => result.deleted.push(id.clone()),
        }
    }
    for id in revision_map.keys() {
        if !base_map.contains_key(id) {
            result.added.push(id.clone());
        }
    }

    (!result.is_empty()).then_some(result)
}
