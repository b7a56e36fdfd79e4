use crate::finding::Finding;
use crate::level::Level;
use crate::rule::{CheckContext, Rule};

pub const ENDPOINT_ADDED: Rule = Rule {
    id: "endpoint-added",
    level: Level::Info,
    optional: false,
    description: "a new endpoint was added",
    check: endpoint_added,
};

fn endpoint_added(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    let Some(paths) = &ctx.tree.paths_diff else {
        return findings;
    };

    for (path, item) in &paths.added {
        for (method, op) in item.operations() {
            let site = ctx.revision_site(path, method, op);
            findings.push(ctx.finding(&site, "endpoint added"));
        }
    }
    for (path, path_diff) in &paths.modified {
        let Some(ops) = &path_diff.operations_diff else {
            continue;
        };
        for (method, op) in &ops.added {
            let site = ctx.revision_site(path, *method, op);
            findings.push(ctx.finding(&site, "endpoint added"));
        }
    }
    findings
}
