//! Request bodies, responses and their media-type content.

use std::collections::BTreeMap;

use apidelta_types::{MediaType, RequestBody, Response};
use serde::Serialize;

use crate::schema_diff::{schema_change, SchemaChange};
use crate::value::{diff_keyed, Change, KeyedDiff, ValueDiff};

/// Differences in one media type entry.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaTypeDiff<'a> {
    #[serde(skip)]
    pub base: &'a MediaType,
    #[serde(skip)]
    pub revision: &'a MediaType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_diff: Option<SchemaChange<'a>>,
}

/// Media types keyed by name (`application/json`, ...).
pub type ContentDiff<'a> = KeyedDiff<String, MediaTypeDiff<'a>>;

pub(crate) fn diff_media_type<'a>(
    base: &'a MediaType,
    revision: &'a MediaType,
) -> Option<MediaTypeDiff<'a>> {
    let schema_diff = schema_change(base.schema.as_ref(), revision.schema.as_ref())?;
    Some(MediaTypeDiff {
        base,
        revision,
        schema_diff: Some(schema_diff),
    })
}

pub(crate) fn diff_content<'a>(
    base: &'a BTreeMap<String, MediaType>,
    revision: &'a BTreeMap<String, MediaType>,
) -> Option<ContentDiff<'a>> {
    diff_keyed(base, revision, diff_media_type)
}

/// A request body that appeared, vanished or changed.
pub type RequestBodyChange<'a> = Change<'a, RequestBody, RequestBodyDiff<'a>>;

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBodyDiff<'a> {
    #[serde(skip)]
    pub base: &'a RequestBody,
    #[serde(skip)]
    pub revision: &'a RequestBody,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_diff: Option<ValueDiff<bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_diff: Option<ValueDiff<Option<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_diff: Option<ContentDiff<'a>>,
}

pub(crate) fn diff_request_body<'a>(
    base: &'a RequestBody,
    revision: &'a RequestBody,
) -> Option<RequestBodyDiff<'a>> {
    let diff = RequestBodyDiff {
        base,
        revision,
        required_diff: ValueDiff::between(&base.required, &revision.required),
        description_diff: ValueDiff::between(&base.description, &revision.description),
        content_diff: diff_content(&base.content, &revision.content),
    };
    let empty = diff.required_diff.is_none()
        && diff.description_diff.is_none()
        && diff.content_diff.is_none();
    (!empty).then_some(diff)
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseDiff<'a> {
    #[serde(skip)]
    pub base: &'a Response,
    #[serde(skip)]
    pub revision: &'a Response,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_diff: Option<ValueDiff<Option<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_diff: Option<ContentDiff<'a>>,
}

/// Responses keyed by status (`200`, `4XX`, `default`).
pub type ResponsesDiff<'a> = KeyedDiff<String, ResponseDiff<'a>>;

pub(crate) fn diff_responses<'a>(
    base: &'a BTreeMap<String, Response>,
    revision: &'a BTreeMap<String, Response>,
) -> Option<ResponsesDiff<'a>> {
    diff_keyed(base, revision, |b, r| {
        let diff = ResponseDiff {
            base: b,
            revision: r,
            description_diff: ValueDiff::between(&b.description, &r.description),
            content_diff: diff_content(&b.content, &r.content),
        };
        (diff.description_diff.is_some() || diff.content_diff.is_some()).then_some(diff)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use apidelta_types::Schema;

    fn json_body(schema: Schema, required: bool) -> RequestBody {
        RequestBody {
            description: None,
            content: [("application/json".to_string(), MediaType::with_schema(schema))].into(),
            required,
        }
    }

    #[test]
    fn identical_bodies_have_no_diff() {
        let body = json_body(Schema::of_type("object"), true);
        assert!(diff_request_body(&body, &body).is_none());
    }

    #[test]
    fn body_required_flag_is_tracked() {
        let base = json_body(Schema::of_type("object"), false);
        let revision = json_body(Schema::of_type("object"), true);
        let d = diff_request_body(&base, &revision).unwrap();
        assert!(d.required_diff.unwrap().enabled());
        assert!(d.content_diff.is_none());
    }

    #[test]
    fn media_type_schema_change_is_nested() {
        let base = json_body(Schema::of_type("object"), true);
        let revision = json_body(Schema::of_type("array"), true);
        let content = diff_request_body(&base, &revision).unwrap().content_diff.unwrap();
        let media = &content.modified["application/json"];
        let schema = media.schema_diff.as_ref().and_then(|c| c.modified()).unwrap();
        assert!(schema.type_diff.is_some());
    }

    #[test]
    fn responses_keyed_by_status() {
        let ok = Response {
            description: Some("ok".into()),
            content: BTreeMap::new(),
        };
        let base: BTreeMap<String, Response> =
            [("200".to_string(), ok.clone()), ("404".to_string(), Response::default())].into();
        let revision: BTreeMap<String, Response> = [
            ("200".to_string(), Response { description: Some("fine".into()), ..ok }),
            ("201".to_string(), Response::default()),
        ]
        .into();
        let d = diff_responses(&base, &revision).unwrap();
        assert_eq!(d.added, vec!["201".to_string()]);
        assert_eq!(d.deleted, vec!["404".to_string()]);
        assert!(d.modified["200"].description_diff.is_some());
    }

    #[test]
    fn media_type_removal_is_reported() {
        let base: BTreeMap<String, MediaType> = [
            ("application/json".to_string(), MediaType::default()),
            ("application/xml".to_string(), MediaType::default()),
        ]
        .into();
        let revision: BTreeMap<String, MediaType> =
            [("application/json".to_string(), MediaType::default())].into();
        let d = diff_content(&base, &revision).unwrap();
        assert_eq!(d.deleted, vec!["application/xml".to_string()]);
    }
}
