//! Diff engine for apidelta.
//!
//! Compares two API descriptions and produces a structured, borrowed diff
//! tree: endpoints matched across versions, operations, parameters, request
//! and response content, down to individual schema properties.
//!
//! # Key Types
//!
//! - [`DiffTree`] -- root of the diff, built by [`compare_documents`]
//! - [`PathsDiff`] / [`OperationsDiff`] / [`OperationDiff`] -- endpoint level
//! - [`SchemaDiff`] / [`CompositionDiff`] -- recursive schema comparison
//! - [`ValueDiff`] / [`StringsDiff`] / [`KeyedDiff`] / [`Change`] -- generic node shapes
//! - [`SourceMap`] -- endpoint origins for findings

pub mod components_diff;
pub mod config;
pub mod content_diff;
pub mod error;
pub mod operation_diff;
pub mod parameter_diff;
pub mod path_diff;
pub mod schema_diff;
pub mod security_diff;
pub mod source_map;
pub mod tree;
pub mod validate;
pub mod value;

pub use components_diff::{ComponentsDiff, ServersDiff};
pub use config::DiffConfig;
pub use content_diff::{
    ContentDiff, MediaTypeDiff, RequestBodyChange, RequestBodyDiff, ResponseDiff, ResponsesDiff,
};
pub use error::{DiffError, DiffResult};
pub use operation_diff::{OperationDiff, OperationsDiff};
pub use parameter_diff::{ParameterDiff, ParametersDiff};
pub use path_diff::{match_key, PathDiff, PathsDiff};
pub use schema_diff::{compare_schemas, diff_schema, CompositionDiff, EnumDiff, SchemaChange, SchemaDiff};
pub use security_diff::{requirement_id, SecurityDiff, ANONYMOUS_REQUIREMENT};
pub use source_map::SourceMap;
pub use tree::{compare_documents, DiffTree};
pub use validate::validate_document;
pub use value::{diff_keyed, Change, KeyedDiff, StringsDiff, ValueDiff};

#[cfg(test)]
mod tests {
    use super::*;
    use apidelta_types::{Document, Method, Operation, PathItem, Schema};
    use proptest::prelude::*;
    use serde_json::json;

    fn petstore() -> Document {
        serde_json::from_value(json!({
            "openapi": "3.0.3",
            "info": {"title": "pets", "version": "1"},
            "paths": {
                "/pets": {
                    "get": {
                        "operationId": "listPets",
                        "parameters": [{"name": "limit", "in": "query", "schema": {"type": "integer"}}],
                        "responses": {"200": {"content": {"application/json": {"schema": {
                            "type": "array",
                            "items": {"$ref": "#/components/schemas/Pet"}
                        }}}}}
                    }
                }
            },
            "components": {"schemas": {"Pet": {"type": "object", "required": ["id"], "properties": {
                "id": {"type": "string"},
                "name": {"type": "string"}
            }}}}
        }))
        .unwrap()
    }

    #[test]
    fn document_compared_with_itself_is_empty() {
        let doc = petstore();
        let (tree, _) = compare_documents(&DiffConfig::default(), &doc, &doc).unwrap();
        assert!(tree.is_empty());
        assert_eq!(serde_json::to_value(&tree).unwrap(), json!({}));
    }

    #[test]
    fn endpoint_added_and_removed() {
        let base = petstore();
        let mut revision = petstore();
        let pets = revision.paths.get_mut("/pets").unwrap();
        pets.post = Some(Operation::default());
        revision.paths.insert("/owners", PathItem::default());

        let (tree, _) = compare_documents(&DiffConfig::default(), &base, &revision).unwrap();
        let paths = tree.paths_diff.as_ref().unwrap();
        assert!(paths.added.contains_key("/owners"));
        let ops = paths.modified["/pets"].operations_diff.as_ref().unwrap();
        assert!(ops.added.contains_key(&Method::Post));
    }

    #[test]
    fn tree_serializes_as_nested_json() {
        let base = petstore();
        let mut revision = petstore();
        let get = revision.paths.get_mut("/pets").unwrap().get.as_mut().unwrap();
        get.parameters[0].required = true;

        let (tree, _) = compare_documents(&DiffConfig::default(), &base, &revision).unwrap();
        let value = serde_json::to_value(&tree).unwrap();
        assert_eq!(
            value["pathsDiff"]["modified"]["/pets"]["operationsDiff"]["modified"]["GET"]
                ["parametersDiff"]["modified"]["query"]["limit"]["requiredDiff"],
            json!({"from": false, "to": true})
        );
    }

    #[test]
    fn invalid_document_yields_no_tree() {
        let base = petstore();
        let mut revision = petstore();
        let mut broken = Schema::default();
        broken.all_of = vec![
            Schema { reference: Some("#/a".into()), ..Schema::default() },
            Schema { reference: Some("#/a".into()), ..Schema::default() },
        ];
        revision.components.schemas.insert("Broken".into(), broken);
        assert!(matches!(
            compare_documents(&DiffConfig::default(), &base, &revision),
            Err(DiffError::MalformedReference { .. })
        ));
    }

    #[test]
    fn components_and_security_are_compared() {
        let base = petstore();
        let mut revision = petstore();
        revision.security = vec![[("apiKey".to_string(), vec![])].into()];
        revision
            .components
            .schemas
            .get_mut("Pet")
            .unwrap()
            .required
            .push("name".into());

        let (tree, _) = compare_documents(&DiffConfig::default(), &base, &revision).unwrap();
        assert_eq!(tree.security_diff.unwrap().added, vec!["apiKey".to_string()]);
        let schemas = tree.components_diff.unwrap().schemas_diff.unwrap();
        assert!(schemas.modified["Pet"].required_diff.as_ref().unwrap().added.contains(&"name".to_string()));
    }

    proptest! {
        #[test]
        fn self_comparison_is_always_empty(
            paths in proptest::collection::btree_set("/[a-z]{1,5}(/\\{[a-z]{1,3}\\})?", 0..6),
            required in any::<bool>(),
        ) {
            let mut doc = Document::default();
            for path in &paths {
                let mut op = Operation::default();
                if required {
                    op.request_body = Some(apidelta_types::RequestBody {
                        required: true,
                        ..Default::default()
                    });
                }
                let mut item = PathItem::default();
                item.get = Some(op);
                doc.paths.insert(path.clone(), item);
            }
            let (tree, _) = compare_documents(&DiffConfig::default(), &doc, &doc).unwrap();
            prop_assert!(tree.is_empty());
        }
    }
}
