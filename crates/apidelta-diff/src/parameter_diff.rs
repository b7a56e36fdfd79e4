//! Parameter comparison, keyed by location and name.
//!
//! When path parameters are matched by position, a revision path parameter
//! is looked up under the name its segment had in the base template.

use std::collections::BTreeMap;

use apidelta_types::{Parameter, ParameterLocation};
use serde::Serialize;

use crate::schema_diff::{schema_change, SchemaChange};
use crate::value::ValueDiff;

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParametersDiff<'a> {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub added: Vec<&'a Parameter>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub deleted: Vec<&'a Parameter>,
    /// Location, then base-side name.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub modified: BTreeMap<ParameterLocation, BTreeMap<String, ParameterDiff<'a>>>,
}

impl<'a> ParametersDiff<'a> {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.deleted.is_empty() && self.modified.is_empty()
    }

    /// Every modified parameter, in location then name order.
    pub fn modified_iter(&self) -> impl Iterator<Item = &ParameterDiff<'a>> {
        self.modified.values().flat_map(BTreeMap::values)
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDiff<'a> {
    #[serde(skip)]
    pub base: &'a Parameter,
    #[serde(skip)]
    pub revision: &'a Parameter,
    /// Path parameter renamed at the same template position.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_diff: Option<ValueDiff<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_diff: Option<ValueDiff<bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated_diff: Option<ValueDiff<bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_diff: Option<ValueDiff<Option<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explode_diff: Option<ValueDiff<Option<bool>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_diff: Option<ValueDiff<Option<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_diff: Option<SchemaChange<'a>>,
}

impl ParameterDiff<'_> {
    pub fn location(&self) -> ParameterLocation {
        self.base.location
    }

    pub fn name(&self) -> &str {
        &self.base.name
    }
}

fn diff_parameter<'a>(base: &'a Parameter, revision: &'a Parameter) -> Option<ParameterDiff<'a>> {
    if base == revision {
        return None;
    }
    let diff = ParameterDiff {
        base,
        revision,
        name_diff: ValueDiff::between(&base.name, &revision.name),
        required_diff: ValueDiff::between(&base.required, &revision.required),
        deprecated_diff: ValueDiff::between(&base.deprecated, &revision.deprecated),
        style_diff: ValueDiff::between(&base.style, &revision.style),
        explode_diff: ValueDiff::between(&base.explode, &revision.explode),
        description_diff: ValueDiff::between(&base.description, &revision.description),
        schema_diff: schema_change(base.schema.as_ref(), revision.schema.as_ref()),
    };
    let changed = diff.name_diff.is_some()
        || diff.required_diff.is_some()
        || diff.deprecated_diff.is_some()
        || diff.style_diff.is_some()
        || diff.explode_diff.is_some()
        || diff.description_diff.is_some()
        || diff.schema_diff.is_some();
    changed.then_some(diff)
}

/// Compare effective parameter lists.
///
/// `renames` maps a revision path-parameter name to the base name at the
/// same template position; it is empty unless position matching is on.
pub(crate) fn diff_parameters<'a>(
    base: &[&'a Parameter],
    revision: &[&'a Parameter],
    renames: &BTreeMap<String, String>,
) -> Option<ParametersDiff<'a>> {
    let key = |p: &'a Parameter, rename: bool| -> (ParameterLocation, String) {
        let name = if rename && p.location == ParameterLocation::Path {
            renames.get(&p.name).unwrap_or(&p.name).clone()
        } else {
            p.name.clone()
        };
        (p.location, name)
    };

    let base_map: BTreeMap<_, &'a Parameter> = base.iter().map(|p| (key(*p, false), *p)).collect();
    let revision_map: BTreeMap<_, &'a Parameter> =
        revision.iter().map(|p| (key(*p, true), *p)).collect();

    let mut result = ParametersDiff::default();
    for ((location, name), b) in &base_map {
        match revision_map.get(&(*location, name.clone())) {
            Some(r) => {
                if let Some(d) = diff_parameter(*b, *r) {
                    result
                        .modified
                        .entry(*location)
                        .or_default()
                        .insert(name.clone(), d);
                }
            }
            None => result.deleted.push(*b),
        }
    }
    for (k, r) in &revision_map {
        if !base_map.contains_key(k) {
            result.added.push(*r);
        }
    }

    (!result.is_empty()).then_some(result)
}
