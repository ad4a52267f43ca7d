//! Extensions command - show what the generated driver advertises.

use super::{Format, load_model, load_options, report};
use anyhow::Result;
use clap::Args;
use std::path::{Path, PathBuf};
use vkmock_codegen::ExtensionTables;
use vkmock_codegen::generate::build_tables;

/// Extensions command arguments
#[derive(Args)]
pub struct ExtensionsArgs {
    /// API description (vk.xml or a JSON model)
    pub input: PathBuf,

    /// Input format
    #[arg(short, long, value_enum, default_value = "auto")]
    pub format: Format,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the extensions command
pub fn run(args: ExtensionsArgs, config: Option<&Path>) -> i32 {
    report(execute(args, config))
}

fn execute(args: ExtensionsArgs, config: Option<&Path>) -> Result<()> {
    let spec = load_model(&args.input, args.format)?;
    let options = load_options(config)?;
    let tables = build_tables(&spec, &options);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&tables)?);
    } else {
        print!("{}", format_tables(&tables));
    }
    Ok(())
}

fn format_tables(tables: &ExtensionTables) -> String {
    let mut out = String::new();
    for (label, entries) in [("instance", &tables.instance), ("device", &tables.device)] {
        out.push_str(&format!("{} ({}):\n", label, entries.len()));
        for entry in entries {
            out.push_str(&format!("  {} v{}\n", entry.name, entry.version));
        }
    }
    out
}
