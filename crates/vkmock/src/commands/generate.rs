//! Generate command - render the mock driver artifacts.

use super::{Format, load_model, load_options, report};
use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};

/// Generate command arguments
#[derive(Args)]
pub struct GenerateArgs {
    /// API description (vk.xml or a JSON model)
    pub input: PathBuf,

    /// Input format
    #[arg(short, long, value_enum, default_value = "auto")]
    pub format: Format,

    /// Directory receiving both artifacts
    #[arg(short, long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Header file name (also used in the source's #include)
    #[arg(long)]
    pub header: Option<String>,

    /// Source file name
    #[arg(long)]
    pub source: Option<String>,
}

/// Run the generate command
pub fn run(args: GenerateArgs, config: Option<&Path>) -> i32 {
    report(execute(args, config))
}

fn execute(args: GenerateArgs, config: Option<&Path>) -> Result<()> {
    let spec = load_model(&args.input, args.format)?;

    let mut options = load_options(config)?;
    if let Some(header) = args.header {
        options.header_name = header;
    }
    if let Some(source) = args.source {
        options.source_name = source;
    }

    // Both artifacts are rendered before anything touches the disk.
    let artifacts = vkmock_codegen::generate(&spec, &options).context("generation failed")?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("failed to create {}", args.out_dir.display()))?;
    for artifact in artifacts.iter() {
        let path = args.out_dir.join(&artifact.file_name);
        std::fs::write(&path, &artifact.contents)
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), bytes = artifact.contents.len(), "wrote artifact");
        println!("{}", path.display());
    }
    Ok(())
}
