//! Deprecation and sunset policy.
//!
//! Removing an operation or property is safe only once it was deprecated and
//! its sunset date is on or before the evaluation date. Deprecating something
//! while a notice policy is active (`deprecation_days > 0`) needs a valid
//! sunset date at least that many days away.

use apidelta_types::{DeprecationState, Operation};

use crate::finding::Finding;
use crate::level::Level;
use crate::rule::{CheckContext, Rule};
use crate::walk::{
    modified_operations, property_path, request_schemas, response_schemas, walk_schema,
    ModifiedOperation,
};

pub const API_PATH_REMOVED_BEFORE_SUNSET: Rule = Rule {
    id: "api-path-removed-before-sunset",
    level: Level::Error,
    optional: false,
    description: "a path was removed while one of its operations was still before its sunset",
    check: api_path_removed_before_sunset,
};

pub const API_REMOVED_BEFORE_SUNSET: Rule = Rule {
    id: "api-removed-before-sunset",
    level: Level::Error,
    optional: false,
    description: "an operation was removed before its sunset date",
    check: api_removed_before_sunset,
};

pub const API_DEPRECATED_SUNSET_MISSING: Rule = Rule {
    id: "api-deprecated-sunset-missing",
    level: Level::Error,
    optional: false,
    description: "an operation was deprecated without a sunset date",
    check: api_deprecated_sunset_missing,
};

pub const API_SUNSET_DATE_TOO_SMALL: Rule = Rule {
    id: "api-sunset-date-too-small",
    level: Level::Error,
    optional: false,
    description: "an operation was deprecated with too short a notice period",
    check: api_sunset_date_too_small,
};

pub const API_INVALID_SUNSET_DATE: Rule = Rule {
    id: "api-invalid-sunset-date",
    level: Level::Error,
    optional: false,
    description: "an operation was deprecated with an unparsable sunset date",
    check: api_invalid_sunset_date,
};

pub const PROPERTY_SUNSET_DATE_TOO_SMALL: Rule = Rule {
    id: "property-sunset-date-too-small",
    level: Level::Error,
    optional: false,
    description: "a property was deprecated without a sunset date far enough away",
    check: property_sunset_date_too_small,
};

pub const PROPERTY_REMOVED_BEFORE_SUNSET: Rule = Rule {
    id: "property-removed-before-sunset",
    level: Level::Error,
    optional: false,
    description: "a deprecated property was removed before its sunset date",
    check: property_removed_before_sunset,
};

/// Why removing `op` breaks clients, or `None` if its sunset has passed.
fn removal_blocker(op: &Operation, ctx: &CheckContext<'_>) -> Option<String> {
    match op.deprecation() {
        DeprecationState::NotDeprecated => Some("without deprecation".into()),
        DeprecationState::WithoutSunset => Some("while deprecated without a sunset date".into()),
        DeprecationState::InvalidSunset(raw) => {
            Some(format!("while deprecated with an invalid sunset date '{raw}'"))
        }
        DeprecationState::WithSunset(date) if date > ctx.today => {
            Some(format!("before the sunset date '{date}'"))
        }
        DeprecationState::WithSunset(_) => None,
    }
}

fn api_path_removed_before_sunset(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    let Some(paths) = &ctx.tree.paths_diff else {
        return findings;
    };
    for (path, item) in &paths.deleted {
        for (method, op) in item.operations() {
            if let Some(reason) = removal_blocker(op, ctx) {
                let site = ctx.base_site(path, method, op);
                findings.push(ctx.finding(&site, format!("api path removed {reason}")));
            }
        }
    }
    findings
}

fn api_removed_before_sunset(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    let Some(paths) = &ctx.tree.paths_diff else {
        return findings;
    };
    for (path, path_diff) in &paths.modified {
        let Some(ops) = &path_diff.operations_diff else {
            continue;
        };
        let base_path = path_diff.base_path(path);
        for (method, op) in &ops.deleted {
            if let Some(reason) = removal_blocker(op, ctx) {
                let site = ctx.base_site(base_path, *method, op);
                findings.push(ctx.finding(&site, format!("api removed {reason}")));
            }
        }
    }
    findings
}

/// Operations deprecated in this revision, with their new state. Empty when
/// no notice policy is active.
fn newly_deprecated<'c>(ctx: &CheckContext<'c>) -> Vec<(ModifiedOperation<'c, 'c>, DeprecationState)> {
    if !ctx.config.deprecation_policy_active() {
        return Vec::new();
    }
    modified_operations(ctx.tree)
        .into_iter()
        .filter(|op| op.diff.deprecated_diff.as_ref().is_some_and(|d| d.enabled()))
        .map(|op| {
            let state = op.revision().deprecation();
            (op, state)
        })
        .collect()
}

fn api_deprecated_sunset_missing(ctx: &CheckContext<'_>) -> Vec<Finding> {
    newly_deprecated(ctx)
        .into_iter()
        .filter(|(_, state)| *state == DeprecationState::WithoutSunset)
        .map(|(op, _)| {
            let site = ctx.revision_site(op.path, op.method, op.revision());
            ctx.finding(
                &site,
                format!(
                    "api deprecated without a sunset date; at least {} days of notice are required",
                    ctx.config.deprecation_days
                ),
            )
        })
        .collect()
}

fn api_sunset_date_too_small(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let earliest = ctx.config.earliest_sunset(ctx.today);
    newly_deprecated(ctx)
        .into_iter()
        .filter_map(|(op, state)| match state {
            DeprecationState::WithSunset(date) if date < earliest => {
                let site = ctx.revision_site(op.path, op.method, op.revision());
                Some(ctx.finding(
                    &site,
                    format!(
                        "api sunset date '{date}' is too small; it must be on or after '{earliest}' ({} days notice)",
                        ctx.config.deprecation_days
                    ),
                ))
            }
            _ => None,
        })
        .collect()
}

fn api_invalid_sunset_date(ctx: &CheckContext<'_>) -> Vec<Finding> {
    newly_deprecated(ctx)
        .into_iter()
        .filter_map(|(op, state)| match state {
            DeprecationState::InvalidSunset(raw) => {
                let site = ctx.revision_site(op.path, op.method, op.revision());
                Some(ctx.finding(&site, format!("api sunset date '{raw}' is not a valid date")))
            }
            _ => None,
        })
        .collect()
}

fn property_sunset_date_too_small(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    if !ctx.config.deprecation_policy_active() {
        return findings;
    }
    let earliest = ctx.config.earliest_sunset(ctx.today);

    for op in modified_operations(ctx.tree) {
        let site = ctx.revision_site(op.path, op.method, op.revision());
        let mut schemas = request_schemas(op.diff);
        schemas.extend(response_schemas(op.diff));
        for payload in schemas {
            walk_schema(payload.diff, &mut |path, node| {
                let Some(properties) = &node.properties_diff else {
                    return;
                };
                for (name, property) in &properties.modified {
                    if !property.deprecated_diff.as_ref().is_some_and(|d| d.enabled()) {
                        continue;
                    }
                    let problem = match property.revision.deprecation() {
                        DeprecationState::WithoutSunset => "has no sunset date".to_string(),
                        DeprecationState::InvalidSunset(raw) => {
                            format!("has an invalid sunset date '{raw}'")
                        }
                        DeprecationState::WithSunset(date) if date < earliest => {
                            format!("has sunset date '{date}', before '{earliest}'")
                        }
                        _ => continue,
                    };
                    findings.push(ctx.finding(
                        &site,
                        format!(
                            "property '{}' of the {} was deprecated but {problem}",
                            property_path(path, name),
                            payload.label
                        ),
                    ));
                }
            });
        }
    }
    findings
}

fn property_removed_before_sunset(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    for op in modified_operations(ctx.tree) {
        let site = ctx.revision_site(op.path, op.method, op.revision());
        let mut schemas = request_schemas(op.diff);
        schemas.extend(response_schemas(op.diff));
        for payload in schemas {
            walk_schema(payload.diff, &mut |path, node| {
                let Some(properties) = &node.properties_diff else {
                    return;
                };
                for name in &properties.deleted {
                    let Some(removed) = node.deleted_property(name) else {
                        continue;
                    };
                    if let DeprecationState::WithSunset(date) = removed.deprecation() {
                        if date > ctx.today {
                            findings.push(ctx.finding(
                                &site,
                                format!(
                                    "property '{}' removed from the {} before its sunset date '{date}'",
                                    property_path(path, name),
                                    payload.label
                                ),
                            ));
                        }
                    }
                }
            });
        }
    }
    findings
}
