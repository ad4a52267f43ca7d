//! Classify command - audit role inference and allocation plans.

use super::{Format, load_model, load_options, report};
use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::path::{Path, PathBuf};
use vkmock_codegen::ir::{ApiSpec, Role};
use vkmock_codegen::{
    AllocationPlan, Cardinality, HandleKind, OverrideTable, RoleSource, classify_with_source,
    plan_allocation,
};

/// Classify command arguments
#[derive(Args)]
pub struct ClassifyArgs {
    /// API description (vk.xml or a JSON model)
    pub input: PathBuf,

    /// Input format
    #[arg(short, long, value_enum, default_value = "auto")]
    pub format: Format,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// How one command will be mocked.
#[derive(Debug, Serialize)]
struct Classification<'a> {
    command: &'a str,
    role: Role,
    source: RoleSource,
    /// An override replaces whatever synthesis would produce.
    overridden: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    plan: Option<AllocationPlan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inconsistency: Option<String>,
}

/// Run the classify command
pub fn run(args: ClassifyArgs, config: Option<&Path>) -> i32 {
    report(execute(args, config))
}

fn execute(args: ClassifyArgs, config: Option<&Path>) -> Result<()> {
    let spec = load_model(&args.input, args.format)?;
    let options = load_options(config)?;
    let rows = classify_all(&spec, &options.overrides);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        for row in &rows {
            println!("{}", format_row(row));
        }
    }
    Ok(())
}

fn classify_all<'a>(spec: &'a ApiSpec, overrides: &OverrideTable) -> Vec<Classification<'a>> {
    spec.commands
        .iter()
        .map(|command| {
            let (role, source) = classify_with_source(command);
            let (plan, inconsistency) = if role == Role::Acquire {
                match plan_allocation(command, spec) {
                    Ok(plan) => (plan, None),
                    Err(e) => (None, Some(e.to_string())),
                }
            } else {
                (None, None)
            };
            Classification {
                command: &command.name,
                role,
                source,
                overridden: overrides.lookup(&command.name).is_some(),
                plan,
                inconsistency,
            }
        })
        .collect()
}

fn format_row(row: &Classification<'_>) -> String {
    let role = match row.role {
        Role::Acquire => "acquire",
        Role::Release => "release",
        Role::Plain => "plain",
    };
    let source = match row.source {
        RoleSource::Annotated => "annotated",
        RoleSource::Heuristic => "heuristic",
    };

    let mut line = format!("{} {} ({})", row.command, role, source);
    if row.overridden {
        line.push_str(" [override]");
    }
    if let Some(plan) = &row.plan {
        let kind = match plan.kind {
            HandleKind::Dispatchable => "dispatchable",
            HandleKind::NonDispatchable => "non-dispatchable",
        };
        match &plan.cardinality {
            Cardinality::Single => {
                line.push_str(&format!(" -> {}: {} {}", plan.target, kind, plan.handle_type))
            }
            Cardinality::Array { len } => line.push_str(&format!(
                " -> {}[{}]: {} {}",
                plan.target, len, kind, plan.handle_type
            )),
        }
    }
    if let Some(reason) = &row.inconsistency {
        line.push_str(&format!(" !! {}", reason));
    }
    line
}
