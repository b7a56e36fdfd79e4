//! Schema-level diff: recursive comparison of data-shape nodes.
//!
//! Compares scalars by equality, properties as a keyed container, the
//! required list as a set, enum values as added/removed sets, and
//! composition lists (`allOf`/`oneOf`/`anyOf`) by correlating subschemas.
//!
//! # Composition correlation
//!
//! Subschemas reached through `$ref` are paired by their reference. Inline
//! subschemas carry no identity: identical ones on both sides are paired
//! first, then the leftovers are paired only if exactly one remains on each
//! side. With several leftovers on both sides the list is reported as
//! [`CompositionDiff::Ambiguous`] and nothing inside it is correlated.

use std::collections::BTreeMap;

use apidelta_types::{Schema, SUNSET_EXTENSION};
use serde::Serialize;
use serde_json::Value;

use crate::error::{DiffError, DiffResult};
use crate::value::{diff_keyed, Change, KeyedDiff, StringsDiff, ValueDiff};

/// A schema that was added, deleted, or modified.
pub type SchemaChange<'a> = Change<'a, Schema, Box<SchemaDiff<'a>>>;

/// Differences between two versions of one schema node.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDiff<'a> {
    #[serde(skip)]
    pub base: &'a Schema,
    #[serde(skip)]
    pub revision: &'a Schema,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_diff: Option<ValueDiff<Option<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_diff: Option<ValueDiff<Option<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format_diff: Option<ValueDiff<Option<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_diff: Option<ValueDiff<Option<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nullable_diff: Option<ValueDiff<bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_diff: Option<EnumDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_diff: Option<StringsDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties_diff: Option<KeyedDiff<String, SchemaDiff<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items_diff: Option<Box<SchemaChange<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_of_diff: Option<CompositionDiff<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub one_of_diff: Option<CompositionDiff<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub any_of_diff: Option<CompositionDiff<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_diff: Option<Box<SchemaChange<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_diff: Option<ValueDiff<Option<f64>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_diff: Option<ValueDiff<Option<f64>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum_diff: Option<ValueDiff<bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum_diff: Option<ValueDiff<bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length_diff: Option<ValueDiff<Option<u64>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length_diff: Option<ValueDiff<Option<u64>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items_diff: Option<ValueDiff<Option<u64>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items_diff: Option<ValueDiff<Option<u64>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern_diff: Option<ValueDiff<Option<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_only_diff: Option<ValueDiff<bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_only_diff: Option<ValueDiff<bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated_diff: Option<ValueDiff<bool>>,
    /// Raw `x-sunset` transition; interpreted by the checker layer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sunset_diff: Option<ValueDiff<Option<Value>>>,
    /// Other `x-` extensions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions_diff: Option<KeyedDiff<String, ValueDiff<Value>>>,
}

impl<'a> SchemaDiff<'a> {
    fn is_empty(&self) -> bool {
        self.reference_diff.is_none()
            && self.type_diff.is_none()
            && self.format_diff.is_none()
            && self.description_diff.is_none()
            && self.nullable_diff.is_none()
            && self.enum_diff.is_none()
            && self.required_diff.is_none()
            && self.properties_diff.is_none()
            && self.items_diff.is_none()
            && self.all_of_diff.is_none()
            && self.one_of_diff.is_none()
            && self.any_of_diff.is_none()
            && self.not_diff.is_none()
            && self.minimum_diff.is_none()
            && self.maximum_diff.is_none()
            && self.exclusive_minimum_diff.is_none()
            && self.exclusive_maximum_diff.is_none()
            && self.min_length_diff.is_none()
            && self.max_length_diff.is_none()
            && self.min_items_diff.is_none()
            && self.max_items_diff.is_none()
            && self.pattern_diff.is_none()
            && self.read_only_diff.is_none()
            && self.write_only_diff.is_none()
            && self.deprecated_diff.is_none()
            && self.sunset_diff.is_none()
            && self.extensions_diff.is_none()
    }

    /// Composition diffs that are present, with their keyword.
    pub fn compositions(&self) -> impl Iterator<Item = (&'static str, &CompositionDiff<'a>)> {
        [
            ("allOf", self.all_of_diff.as_ref()),
            ("oneOf", self.one_of_diff.as_ref()),
            ("anyOf", self.any_of_diff.as_ref()),
        ]
        .into_iter()
        .filter_map(|(keyword, diff)| diff.map(|d| (keyword, d)))
    }

    /// Revision-side schema of a property added in this diff.
    pub fn added_property(&self, name: &str) -> Option<&'a Schema> {
        self.revision.properties.get(name)
    }

    /// Base-side schema of a property deleted in this diff.
    pub fn deleted_property(&self, name: &str) -> Option<&'a Schema> {
        self.base.properties.get(name)
    }
}

/// Enum value changes. Added and removed values carry opposite meaning
/// depending on whether the schema is read or written by clients.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumDiff {
    /// The base had no enum; the revision restricts values.
    pub became_enum: bool,
    /// The base restricted values; the revision does not.
    pub no_longer_enum: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub added: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub deleted: Vec<Value>,
}

impl EnumDiff {
    pub fn between(base: &[Value], revision: &[Value]) -> Option<Self> {
        let added: Vec<Value> = revision
            .iter()
            .filter(|v| !base.contains(v))
            .cloned()
            .collect();
        let deleted: Vec<Value> = base
            .iter()
            .filter(|v| !revision.contains(v))
            .cloned()
            .collect();
        if added.is_empty() && deleted.is_empty() {
            return None;
        }
        Some(Self {
            became_enum: base.is_empty() && !revision.is_empty(),
            no_longer_enum: !base.is_empty() && revision.is_empty(),
            added,
            deleted,
        })
    }

    /// Values added to an enum that already existed.
    pub fn values_added(&self) -> &[Value] {
        if self.became_enum {
            &[]
        } else {
            &self.added
        }
    }

    /// Values removed from an enum that still exists.
    pub fn values_deleted(&self) -> &[Value] {
        if self.no_longer_enum {
            &[]
        } else {
            &self.deleted
        }
    }
}

/// Differences in a composition list.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CompositionDiff<'a> {
    /// Subschemas were paired across versions. Keys are the `$ref` for
    /// named subschemas and `#<index>` for inline ones.
    Correlated {
        #[serde(serialize_with = "crate::value::serialize_keys")]
        added: BTreeMap<String, &'a Schema>,
        #[serde(serialize_with = "crate::value::serialize_keys")]
        deleted: BTreeMap<String, &'a Schema>,
        modified: BTreeMap<String, SchemaDiff<'a>>,
    },
    /// Several inline subschemas changed on both sides; pairing was
    /// abandoned. Holds the unpaired subschemas of each side.
    Ambiguous {
        base: Vec<&'a Schema>,
        revision: Vec<&'a Schema>,
    },
}

impl CompositionDiff<'_> {
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Self::Ambiguous { .. })
    }
}

/// Compare two optional schemas.
///
/// One side absent is a pure addition or deletion. Both sides absent is a
/// caller error.
pub fn compare_schemas<'a>(
    base: Option<&'a Schema>,
    revision: Option<&'a Schema>,
) -> DiffResult<Option<SchemaChange<'a>>> {
    if base.is_none() && revision.is_none() {
        return Err(DiffError::MissingBothSides);
    }
    Ok(schema_change(base, revision))
}

/// [`compare_schemas`] for internal callers where both sides may be absent.
pub(crate) fn schema_change<'a>(
    base: Option<&'a Schema>,
    revision: Option<&'a Schema>,
) -> Option<SchemaChange<'a>> {
    Change::compare(base, revision, |b, r| diff_schema(b, r).map(Box::new))
}

/// Compare two present schemas. `None` when nothing tracked differs.
pub fn diff_schema<'a>(base: &'a Schema, revision: &'a Schema) -> Option<SchemaDiff<'a>> {
    if base == revision {
        return None;
    }

    let diff = SchemaDiff {
        base,
        revision,
        reference_diff: ValueDiff::between(&base.reference, &revision.reference),
        type_diff: ValueDiff::between(&base.kind, &revision.kind),
        format_diff: ValueDiff::between(&base.format, &revision.format),
        description_diff: ValueDiff::between(&base.description, &revision.description),
        nullable_diff: ValueDiff::between(&base.nullable, &revision.nullable),
        enum_diff: EnumDiff::between(&base.enum_values, &revision.enum_values),
        required_diff: StringsDiff::between(&base.required, &revision.required),
        properties_diff: diff_keyed(&base.properties, &revision.properties, diff_schema),
        items_diff: schema_change(base.items.as_deref(), revision.items.as_deref()).map(Box::new),
        all_of_diff: diff_composition(&base.all_of, &revision.all_of),
        one_of_diff: diff_composition(&base.one_of, &revision.one_of),
        any_of_diff: diff_composition(&base.any_of, &revision.any_of),
        not_diff: schema_change(base.not.as_deref(), revision.not.as_deref()).map(Box::new),
        minimum_diff: ValueDiff::between(&base.minimum, &revision.minimum),
        maximum_diff: ValueDiff::between(&base.maximum, &revision.maximum),
        exclusive_minimum_diff: ValueDiff::between(
            &base.exclusive_minimum,
            &revision.exclusive_minimum,
        ),
        exclusive_maximum_diff: ValueDiff::between(
            &base.exclusive_maximum,
            &revision.exclusive_maximum,
        ),
        min_length_diff: ValueDiff::between(&base.min_length, &revision.min_length),
        max_length_diff: ValueDiff::between(&base.max_length, &revision.max_length),
        min_items_diff: ValueDiff::between(&base.min_items, &revision.min_items),
        max_items_diff: ValueDiff::between(&base.max_items, &revision.max_items),
        pattern_diff: ValueDiff::between(&base.pattern, &revision.pattern),
        read_only_diff: ValueDiff::between(&base.read_only, &revision.read_only),
        write_only_diff: ValueDiff::between(&base.write_only, &revision.write_only),
        deprecated_diff: ValueDiff::between(&base.deprecated, &revision.deprecated),
        sunset_diff: ValueDiff::between(&base.sunset().cloned(), &revision.sunset().cloned()),
        extensions_diff: diff_extensions(base, revision),
    };

    (!diff.is_empty()).then_some(diff)
}

fn diff_extensions(base: &Schema, revision: &Schema) -> Option<KeyedDiff<String, ValueDiff<Value>>> {
    let collect = |schema: &Schema| -> BTreeMap<String, Value> {
        schema
            .vendor_extensions()
            .filter(|(k, _)| k.as_str() != SUNSET_EXTENSION)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    };
    let base_ext = collect(base);
    let revision_ext = collect(revision);
    diff_keyed(&base_ext, &revision_ext, ValueDiff::between)
}

/// Correlate and compare two composition lists.
fn diff_composition<'a>(base: &'a [Schema], revision: &'a [Schema]) -> Option<CompositionDiff<'a>> {
    if base == revision {
        return None;
    }

    let mut added = BTreeMap::new();
    let mut deleted = BTreeMap::new();
    let mut modified = BTreeMap::new();

    // Named subschemas: paired by reference.
    let base_named = named(base);
    let revision_named = named(revision);
    for (reference, b) in &base_named {
        match revision_named.get(reference) {
            Some(r) => {
                if let Some(d) = diff_schema(*b, *r) {
                    modified.insert(reference.to_string(), d);
                }
            }
            None => {
                deleted.insert(reference.to_string(), *b);
            }
        }
    }
    for (reference, r) in &revision_named {
        if !base_named.contains_key(reference) {
            added.insert(reference.to_string(), *r);
        }
    }

    // Inline subschemas: drop identical pairs, then pair a single leftover.
    let mut unpaired_revision = inline(revision);
    let mut unpaired_base = Vec::new();
    for (index, b) in inline(base) {
        match unpaired_revision.iter().position(|(_, r)| *r == b) {
            Some(pos) => {
                unpaired_revision.remove(pos);
            }
            None => unpaired_base.push((index, b)),
        }
    }

    match (unpaired_base.as_slice(), unpaired_revision.as_slice()) {
        ([], rest) => {
            for (index, r) in rest {
                added.insert(inline_label(*index), *r);
            }
        }
        (rest, []) => {
            for (index, b) in rest {
                deleted.insert(inline_label(*index), *b);
            }
        }
        ([(_, b)], [(index, r)]) => {
            if let Some(d) = diff_schema(*b, *r) {
                modified.insert(inline_label(*index), d);
            }
        }
        (bases, revisions) => {
            tracing::warn!(
                base = bases.len(),
                revision = revisions.len(),
                "inline subschemas changed on both sides; composition left uncorrelated"
            );
            return Some(CompositionDiff::Ambiguous {
                base: bases.iter().map(|(_, s)| *s).collect(),
                revision: revisions.iter().map(|(_, s)| *s).collect(),
            });
        }
    }

    if added.is_empty() && deleted.is_empty() && modified.is_empty() {
        return None;
    }
    Some(CompositionDiff::Correlated {
        added,
        deleted,
        modified,
    })
}

fn named(list: &[Schema]) -> BTreeMap<&str, &Schema> {
    list.iter()
        .filter_map(|s| s.reference.as_deref().map(|r| (r, s)))
        .collect()
}

fn inline(list: &[Schema]) -> Vec<(usize, &Schema)> {
    list.iter()
        .enumerate()
        .filter(|(_, s)| s.reference.is_none())
        .collect()
}

fn inline_label(index: usize) -> String {
    format!("#{index}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema(value: Value) -> Schema {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn identical_schemas_have_no_diff() {
        let s = schema(json!({"type": "object", "properties": {"a": {"type": "string"}}}));
        assert!(diff_schema(&s, &s).is_none());
    }

    #[test]
    fn both_sides_absent_is_an_error() {
        assert!(matches!(compare_schemas(None, None), Err(DiffError::MissingBothSides)));
    }

    #[test]
    fn one_side_absent_is_addition_or_deletion() {
        let s = Schema::of_type("string");
        assert!(matches!(compare_schemas(None, Some(&s)).unwrap(), Some(Change::Added(_))));
        assert!(matches!(compare_schemas(Some(&s), None).unwrap(), Some(Change::Deleted(_))));
    }

    #[test]
    fn scalar_changes_record_from_and_to() {
        let base = schema(json!({"type": "string", "maxLength": 10}));
        let revision = schema(json!({"type": "integer", "maxLength": 5}));
        let d = diff_schema(&base, &revision).unwrap();
        let type_diff = d.type_diff.unwrap();
        assert_eq!(type_diff.from.as_deref(), Some("string"));
        assert_eq!(type_diff.to.as_deref(), Some("integer"));
        assert_eq!(d.max_length_diff, Some(ValueDiff { from: Some(10), to: Some(5) }));
    }

    #[test]
    fn enum_additions_and_removals_are_separate() {
        let base = schema(json!({"enum": ["a", "b"]}));
        let revision = schema(json!({"enum": ["b", "c"]}));
        let e = diff_schema(&base, &revision).unwrap().enum_diff.unwrap();
        assert_eq!(e.values_added(), &[json!("c")]);
        assert_eq!(e.values_deleted(), &[json!("a")]);
        assert!(!e.became_enum);
    }

    #[test]
    fn became_enum_hides_value_additions() {
        let base = schema(json!({"type": "string"}));
        let revision = schema(json!({"type": "string", "enum": ["x"]}));
        let e = diff_schema(&base, &revision).unwrap().enum_diff.unwrap();
        assert!(e.became_enum);
        assert!(e.values_added().is_empty());
    }

    #[test]
    fn properties_recurse() {
        let base = schema(json!({"properties": {
            "a": {"type": "string"},
            "b": {"type": "string"},
            "nested": {"properties": {"x": {"type": "string"}}}
        }}));
        let revision = schema(json!({"properties": {
            "a": {"type": "string"},
            "c": {"type": "string"},
            "nested": {"properties": {"x": {"type": "integer"}}}
        }}));
        let props = diff_schema(&base, &revision).unwrap().properties_diff.unwrap();
        assert_eq!(props.added, vec!["c".to_string()]);
        assert_eq!(props.deleted, vec!["b".to_string()]);
        let nested = &props.modified["nested"];
        assert!(nested.properties_diff.as_ref().unwrap().modified["x"].type_diff.is_some());
    }

    #[test]
    fn required_is_diffed_as_a_set() {
        let base = schema(json!({"required": ["a", "b"]}));
        let revision = schema(json!({"required": ["b", "c"]}));
        let r = diff_schema(&base, &revision).unwrap().required_diff.unwrap();
        assert_eq!(r.added, vec!["c".to_string()]);
        assert_eq!(r.deleted, vec!["a".to_string()]);
    }

    #[test]
    fn sunset_is_separate_from_other_extensions() {
        let base = schema(json!({"x-sunset": "2030-01-01", "x-owner": "a"}));
        let revision = schema(json!({"x-sunset": "2031-01-01", "x-owner": "b"}));
        let d = diff_schema(&base, &revision).unwrap();
        assert!(d.sunset_diff.is_some());
        let ext = d.extensions_diff.unwrap();
        assert_eq!(ext.modified.len(), 1);
        assert!(ext.modified.contains_key("x-owner"));
    }

    #[test]
    fn non_vendor_extras_are_ignored() {
        let base = schema(json!({"type": "string", "example": "a"}));
        let revision = schema(json!({"type": "string", "example": "b"}));
        assert!(diff_schema(&base, &revision).is_none());
    }

    #[test]
    fn named_subschemas_correlate_by_reference() {
        let base = schema(json!({"allOf": [
            {"$ref": "#/components/schemas/A", "required": ["x"]},
            {"$ref": "#/components/schemas/B"}
        ]}));
        let revision = schema(json!({"allOf": [
            {"$ref": "#/components/schemas/C"},
            {"$ref": "#/components/schemas/A", "required": ["x", "y"]}
        ]}));
        match diff_schema(&base, &revision).unwrap().all_of_diff.unwrap() {
            CompositionDiff::Correlated { added, deleted, modified } => {
                assert!(added.contains_key("#/components/schemas/C"));
                assert!(deleted.contains_key("#/components/schemas/B"));
                assert!(modified["#/components/schemas/A"].required_diff.is_some());
            }
            other => panic!("expected Correlated, got {other:?}"),
        }
    }

    #[test]
    fn single_inline_change_correlates_positionally() {
        let base = schema(json!({"allOf": [
            {"properties": {"a": {"type": "string"}}},
            {"properties": {"b": {"type": "string"}}}
        ]}));
        let revision = schema(json!({"allOf": [
            {"properties": {"a": {"type": "string"}}},
            {"properties": {"b": {"type": "string"}}, "required": ["b"]}
        ]}));
        match diff_schema(&base, &revision).unwrap().all_of_diff.unwrap() {
            CompositionDiff::Correlated { modified, added, deleted } => {
                assert!(added.is_empty() && deleted.is_empty());
                assert!(modified["#1"].required_diff.is_some());
            }
            other => panic!("expected Correlated, got {other:?}"),
        }
    }

    #[test]
    fn simultaneous_inline_changes_are_ambiguous() {
        let base = schema(json!({"allOf": [
            {"properties": {"a": {"type": "string"}}},
            {"properties": {"b": {"type": "string"}}}
        ]}));
        let revision = schema(json!({"allOf": [
            {"properties": {"a": {"type": "string"}}, "required": ["a"]},
            {"properties": {"b": {"type": "string"}}, "required": ["b"]}
        ]}));
        let composition = diff_schema(&base, &revision).unwrap().all_of_diff.unwrap();
        assert!(composition.is_ambiguous());
        match composition {
            CompositionDiff::Ambiguous { base, revision } => {
                assert_eq!(base.len(), 2);
                assert_eq!(revision.len(), 2);
            }
            other => panic!("expected Ambiguous, got {other:?}"),
        }
    }

    #[test]
    fn inline_additions_only_are_not_ambiguous() {
        let base = schema(json!({"oneOf": [{"type": "string"}]}));
        let revision = schema(json!({"oneOf": [
            {"type": "string"},
            {"type": "integer"},
            {"type": "boolean"}
        ]}));
        match diff_schema(&base, &revision).unwrap().one_of_diff.unwrap() {
            CompositionDiff::Correlated { added, .. } => {
                assert_eq!(added.len(), 2);
                assert!(added.contains_key("#1") && added.contains_key("#2"));
            }
            other => panic!("expected Correlated, got {other:?}"),
        }
    }

    #[test]
    fn reordered_inline_subschemas_are_unchanged() {
        let base = schema(json!({"anyOf": [{"type": "string"}, {"type": "integer"}]}));
        let revision = schema(json!({"anyOf": [{"type": "integer"}, {"type": "string"}]}));
        assert!(diff_schema(&base, &revision).is_none());
    }

    #[test]
    fn items_change_is_nested() {
        let base = schema(json!({"type": "array", "items": {"type": "string"}}));
        let revision = schema(json!({"type": "array", "items": {"type": "integer"}}));
        let items = diff_schema(&base, &revision).unwrap().items_diff.unwrap();
        assert!(items.modified().unwrap().type_diff.is_some());
    }

    #[test]
    fn diff_serializes_without_schema_bodies() {
        let base = schema(json!({"type": "string"}));
        let revision = schema(json!({"type": "integer"}));
        let value = serde_json::to_value(diff_schema(&base, &revision).unwrap()).unwrap();
        assert_eq!(value, json!({"typeDiff": {"from": "string", "to": "integer"}}));
    }
}
