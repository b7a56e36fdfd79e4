//! Reusable components and server list.

use std::collections::BTreeMap;

use apidelta_types::{Components, SecurityScheme, Server};
use serde::Serialize;

use crate::schema_diff::{diff_schema, SchemaDiff};
use crate::value::{diff_keyed, KeyedDiff, ValueDiff};

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentsDiff<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schemas_diff: Option<KeyedDiff<String, SchemaDiff<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_schemes_diff: Option<KeyedDiff<String, ValueDiff<SecurityScheme>>>,
}

pub(crate) fn diff_components<'a>(
    base: &'a Components,
    revision: &'a Components,
) -> Option<ComponentsDiff<'a>> {
    let diff = ComponentsDiff {
        schemas_diff: diff_keyed(&base.schemas, &revision.schemas, diff_schema),
        security_schemes_diff: diff_keyed(
            &base.security_schemes,
            &revision.security_schemes,
            ValueDiff::between,
        ),
    };
    (diff.schemas_diff.is_some() || diff.security_schemes_diff.is_some()).then_some(diff)
}

/// Servers keyed by URL; a modification is a description change.
pub type ServersDiff = KeyedDiff<String, ValueDiff<Option<String>>>;

pub(crate) fn diff_servers(base: &[Server], revision: &[Server]) -> Option<ServersDiff> {
    let by_url = |servers: &[Server]| -> BTreeMap<String, Option<String>> {
        servers
            .iter()
            .map(|s| (s.url.clone(), s.description.clone()))
            .collect()
    };
    let base = by_url(base);
    let revision = by_url(revision);
    diff_keyed(&base, &revision, ValueDiff::between)
}
