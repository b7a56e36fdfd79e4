//! Structural checks run on both documents before comparison.
//!
//! Composition correlation keys named subschemas by their `$ref`. An empty
//! reference, or the same reference twice in one list, would make that
//! pairing meaningless, so both are rejected up front.

use std::collections::HashSet;

use apidelta_types::{Document, MediaType, Schema};

use crate::error::{DiffError, DiffResult};

/// Validate every schema reachable from `doc`.
pub fn validate_document(doc: &Document) -> DiffResult<()> {
    for (name, schema) in &doc.components.schemas {
        validate_schema(schema, &format!("components.schemas.{name}"))?;
    }
    for (path, item) in &doc.paths {
        for param in &item.parameters {
            if let Some(schema) = &param.schema {
                validate_schema(schema, &format!("paths.{path}.parameters.{}", param.name))?;
            }
        }
        for (method, op) in item.operations() {
            let at = format!("paths.{path}.{method}");
            for param in &op.parameters {
                if let Some(schema) = &param.schema {
                    validate_schema(schema, &format!("{at}.parameters.{}", param.name))?;
                }
            }
            if let Some(body) = &op.request_body {
                validate_content(body.content.iter(), &format!("{at}.requestBody"))?;
            }
            for (status, response) in &op.responses {
                validate_content(response.content.iter(), &format!("{at}.responses.{status}"))?;
            }
        }
    }
    Ok(())
}

fn validate_content<'a>(
    content: impl Iterator<Item = (&'a String, &'a MediaType)>,
    at: &str,
) -> DiffResult<()> {
    for (media, entry) in content {
        if let Some(schema) = &entry.schema {
            validate_schema(schema, &format!("{at}.{media}"))?;
        }
    }
    Ok(())
}

fn validate_schema(schema: &Schema, at: &str) -> DiffResult<()> {
    if schema.reference.as_deref() == Some("") {
        return Err(DiffError::MalformedReference {
            location: at.to_string(),
            reason: "empty $ref".into(),
        });
    }

    for (keyword, list) in schema.compositions() {
        let mut seen = HashSet::new();
        for (index, sub) in list.iter().enumerate() {
            let here = format!("{at}.{keyword}[{index}]");
            if let Some(reference) = sub.reference.as_deref() {
                if !reference.is_empty() && !seen.insert(reference) {
                    return Err(DiffError::MalformedReference {
                        location: here,
                        reason: format!("'{reference}' appears more than once"),
                    });
                }
            }
            validate_schema(sub, &here)?;
        }
    }

    for (name, property) in &schema.properties {
        validate_schema(property, &format!("{at}.properties.{name}"))?;
    }
    if let Some(items) = &schema.items {
        validate_schema(items, &format!("{at}.items"))?;
    }
    if let Some(not) = &schema.not {
        validate_schema(not, &format!("{at}.not"))?;
    }
    Ok(())
}
