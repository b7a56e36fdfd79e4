use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use apidelta_check::{CheckReport, CompatConfig, Finding, Level, Registry};
use apidelta_diff::{compare_documents, DiffConfig};
use apidelta_types::Document;
use colored::Colorize;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.command {
        Command::Diff(args) => cmd_diff(&args),
        Command::Breaking(args) => cmd_check(&args, true, cli.format),
        Command::Changelog(args) => cmd_check(&args, false, cli.format),
        Command::Checks => cmd_checks(cli.format),
    }
}

/// Read a JSON document; its file name becomes the finding source.
pub fn load_document(path: &Path) -> anyhow::Result<Document> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let doc: Document = serde_json::from_str(&raw)
        .with_context(|| format!("parsing {}", path.display()))?;
    let source = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(doc.with_source(source))
}

fn diff_config(args: &CompareArgs) -> DiffConfig {
    DiffConfig {
        path_param_aware: args.match_path_params,
        strip_prefix_base: args.strip_prefix_base.clone().unwrap_or_default(),
        strip_prefix_revision: args.strip_prefix_revision.clone().unwrap_or_default(),
    }
}

/// Policy from the config file (if any) with command-line flags on top.
pub fn build_config(args: &CheckArgs, breaking: bool) -> anyhow::Result<CompatConfig> {
    let mut config = match &args.config {
        Some(path) => CompatConfig::load(path)?,
        None => CompatConfig::default(),
    };
    let compare = &args.compare;
    if compare.match_path_params {
        config.path_param_aware_matching = true;
    }
    if let Some(prefix) = &compare.strip_prefix_base {
        config.strip_prefix_base = prefix.clone();
    }
    if let Some(prefix) = &compare.strip_prefix_revision {
        config.strip_prefix_revision = prefix.clone();
    }
    if let Some(days) = args.deprecation_days {
        config.deprecation_days = days;
    }
    if let Some(date) = args.evaluation_date {
        config.evaluation_date = Some(date);
    }
    config.included_rules.extend(args.include_checks.iter().cloned());
    config.excluded_rules.extend(args.exclude_checks.iter().cloned());
    if breaking {
        config.breaking_only = true;
    }
    Ok(config)
}

fn cmd_diff(args: &CompareArgs) -> anyhow::Result<ExitCode> {
    let base = load_document(&args.base)?;
    let revision = load_document(&args.revision)?;
    let (tree, _) = compare_documents(&diff_config(args), &base, &revision)?;
    println!("{}", serde_json::to_string_pretty(&tree)?);
    Ok(ExitCode::SUCCESS)
}

fn cmd_check(args: &CheckArgs, breaking: bool, format: OutputFormat) -> anyhow::Result<ExitCode> {
    let config = build_config(args, breaking)?;
    let base = load_document(&args.compare.base)?;
    let revision = load_document(&args.compare.revision)?;
    let report = Registry::default_rules()
        .check(&base, &revision, &config)
        .context("checking compatibility")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print!("{}", render_text(&report)),
    }

    Ok(exit_code(&report, args.fail_on))
}

fn cmd_checks(format: OutputFormat) -> anyhow::Result<ExitCode> {
    let registry = Registry::default_rules();
    match format {
        OutputFormat::Json => {
            let rules: Vec<_> = registry
                .rules()
                .iter()
                .map(|r| {
                    serde_json::json!({
                        "id": r.id,
                        "level": r.level,
                        "optional": r.optional,
                        "description": r.description,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rules)?);
        }
        OutputFormat::Text => {
            for rule in registry.rules() {
                let optional = if rule.optional { " (optional)" } else { "" };
                println!("{:<5} {}{}  {}", rule.level.as_str(), rule.id.bold(), optional, rule.description.dimmed());
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn colored_level(level: Level) -> colored::ColoredString {
    match level {
        Level::Error => level.as_str().red().bold(),
        Level::Warn => level.as_str().yellow().bold(),
        Level::Info => level.as_str().cyan(),
    }
}

fn render_finding(finding: &Finding) -> String {
    let mut out = format!("{} [{}]", colored_level(finding.level), finding.id.bold());
    if !finding.source.is_empty() {
        out.push_str(&format!(" at {}", finding.source));
    }
    if !finding.operation.is_empty() {
        out.push_str(&format!("\n\tin API {} {}", finding.operation, finding.path));
    }
    out.push_str(&format!("\n\t\t{}", finding.text));
    if let Some(comment) = &finding.comment {
        out.push_str(&format!("\n\t\t{}", comment.dimmed()));
    }
    out
}

/// Findings followed by a one-line summary.
pub fn render_text(report: &CheckReport) -> String {
    if report.findings.is_empty() {
        return format!("{} No changes to report.\n", "✓".green().bold());
    }
    let mut out = String::new();
    for finding in &report.findings {
        out.push_str(&render_finding(finding));
        out.push_str("\n\n");
    }
    out.push_str(&format!(
        "{} changes: {} error, {} warning, {} info\n",
        report.findings.len(),
        report.count(Level::Error),
        report.count(Level::Warn),
        report.count(Level::Info)
    ));
    out
}

/// Returns `true` if `--fail-on` was given and some finding reaches it.
pub fn fails(report: &CheckReport, fail_on: Option<Level>) -> bool {
    fail_on.is_some_and(|level| report.reaches(level))
}

fn exit_code(report: &CheckReport, fail_on: Option<Level>) -> ExitCode {
    if fails(report, fail_on) {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}
