//! Required-property policy.
//!
//! | side     | change                                | result                    |
//! |----------|---------------------------------------|---------------------------|
//! | request  | new required property                 | breaking unless readOnly  |
//! | request  | existing property became required     | breaking unless readOnly  |
//! | request  | required removed                      | not breaking              |
//! | response | required property removed             | breaking unless writeOnly |
//! | response | property lost required                | breaking unless writeOnly |
//! | response | property became required              | not breaking              |
//! | response | required property no longer writeOnly | warning                   |
//!
//! A composition list whose correlation was abandoned is reported as
//! breaking on both sides.

use apidelta_diff::SchemaDiff;

use crate::finding::Finding;
use crate::level::Level;
use crate::rule::{CheckContext, Rule};
use crate::walk::{
    ambiguity_findings, for_each_node, property_path, request_schemas, response_schemas,
};

pub const REQUEST_REQUIRED_PROPERTY_ADDED: Rule = Rule {
    id: "request-required-property-added",
    level: Level::Error,
    optional: false,
    description: "a new required property was added to a request",
    check: request_required_property_added,
};

pub const REQUEST_PROPERTY_BECAME_REQUIRED: Rule = Rule {
    id: "request-property-became-required",
    level: Level::Error,
    optional: false,
    description: "an existing request property became required",
    check: request_property_became_required,
};

pub const RESPONSE_REQUIRED_PROPERTY_REMOVED: Rule = Rule {
    id: "response-required-property-removed",
    level: Level::Error,
    optional: false,
    description: "a required property was removed from a response",
    check: response_required_property_removed,
};

pub const RESPONSE_PROPERTY_BECAME_OPTIONAL: Rule = Rule {
    id: "response-property-became-optional",
    level: Level::Error,
    optional: false,
    description: "a response property is no longer required",
    check: response_property_became_optional,
};

pub const RESPONSE_REQUIRED_PROPERTY_BECAME_NOT_WRITE_ONLY: Rule = Rule {
    id: "response-required-property-became-not-write-only",
    level: Level::Warn,
    optional: false,
    description: "a required response property is no longer write-only",
    check: response_required_property_became_not_write_only,
};

fn request_required_property_added(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    for_each_node(ctx, request_schemas, &mut |site, payload, path, node| {
        findings.extend(ambiguity_findings(ctx, site, payload, path, node));
        let Some(required) = &node.required_diff else {
            return;
        };
        for name in &required.added {
            if node.base.properties.contains_key(name) {
                continue;
            }
            if node.added_property(name).is_some_and(|p| p.read_only) {
                continue;
            }
            findings.push(ctx.finding(
                site,
                format!(
                    "added the new required property '{}' to the {}",
                    property_path(path, name),
                    payload.label
                ),
            ));
        }
    });
    findings
}

fn request_property_became_required(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    for_each_node(ctx, request_schemas, &mut |site, payload, path, node| {
        let Some(required) = &node.required_diff else {
            return;
        };
        for name in &required.added {
            if !node.base.properties.contains_key(name) {
                continue;
            }
            if node.revision.properties.get(name).is_some_and(|p| p.read_only) {
                continue;
            }
            findings.push(ctx.finding(
                site,
                format!(
                    "the property '{}' of the {} became required",
                    property_path(path, name),
                    payload.label
                ),
            ));
        }
    });
    findings
}

/// Response-side required names dropped from `node` whose removal matters:
/// the base property is not writeOnly and, if deprecated, its sunset has not
/// passed. Returns `(name, still defined in revision)`.
fn dropped_required<'n>(ctx: &CheckContext<'_>, node: &'n SchemaDiff<'_>) -> Vec<(&'n str, bool)> {
    let Some(required) = &node.required_diff else {
        return Vec::new();
    };
    required
        .deleted
        .iter()
        .filter_map(|name| {
            let base = node.base.properties.get(name);
            if base.is_some_and(|p| p.write_only || p.deprecation().sunset_passed(ctx.today)) {
                return None;
            }
            Some((name.as_str(), node.revision.properties.contains_key(name)))
        })
        .collect()
}

fn response_required_property_removed(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    for_each_node(ctx, response_schemas, &mut |site, payload, path, node| {
        findings.extend(ambiguity_findings(ctx, site, payload, path, node));
        for (name, still_defined) in dropped_required(ctx, node) {
            if still_defined {
                continue;
            }
            findings.push(ctx.finding(
                site,
                format!(
                    "removed the required property '{}' from the {}",
                    property_path(path, name),
                    payload.label
                ),
            ));
        }
    });
    findings
}

fn response_property_became_optional(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    for_each_node(ctx, response_schemas, &mut |site, payload, path, node| {
        for (name, still_defined) in dropped_required(ctx, node) {
            if !still_defined || node.revision.properties.get(name).is_some_and(|p| p.write_only) {
                continue;
            }
            findings.push(ctx.finding(
                site,
                format!(
                    "the property '{}' of the {} became optional",
                    property_path(path, name),
                    payload.label
                ),
            ));
        }
    });
    findings
}

fn response_required_property_became_not_write_only(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    for_each_node(ctx, response_schemas, &mut |site, payload, path, node| {
        let Some(properties) = &node.properties_diff else {
            return;
        };
        for (name, property) in &properties.modified {
            let lost_write_only = property.write_only_diff.as_ref().is_some_and(|d| d.disabled());
            if lost_write_only && node.revision.is_required(name) {
                findings.push(ctx.finding(
                    site,
                    format!(
                        "the required property '{}' of the {} is no longer write-only",
                        property_path(path, name),
                        payload.label
                    ),
                ));
            }
        }
    });
    findings
}
