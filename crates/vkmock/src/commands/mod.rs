//! Subcommand implementations.

pub mod classify;
pub mod extensions;
pub mod generate;

use crate::config::VkmockConfig;
use anyhow::{Context, Result};
use clap::ValueEnum;
use std::path::Path;
use vkmock_codegen::GenerateOptions;
use vkmock_codegen::input::parse;
use vkmock_codegen::ir::ApiSpec;

/// Input format selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Detect from file content
    #[default]
    Auto,
    /// Vulkan XML registry (vk.xml)
    Xml,
    /// Serialized JSON model
    Json,
}

impl Format {
    fn resolve(self, content: &str) -> vkmock_codegen::InputFormat {
        match self {
            Format::Auto => vkmock_codegen::InputFormat::sniff(content),
            Format::Xml => vkmock_codegen::InputFormat::Registry,
            Format::Json => vkmock_codegen::InputFormat::Json,
        }
    }
}

/// Read and parse an API description.
pub fn load_model(input: &Path, format: Format) -> Result<ApiSpec> {
    let content = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let format = format.resolve(&content);
    tracing::debug!(input = %input.display(), ?format, "parsing API description");

    let spec = parse(&content, format)
        .with_context(|| format!("failed to parse {}", input.display()))?;
    tracing::info!(
        commands = spec.commands.len(),
        types = spec.types.len(),
        extensions = spec.extensions.len(),
        "loaded API description"
    );
    Ok(spec)
}

/// Generation options from the layered configuration of the working directory.
pub fn load_options(config: Option<&Path>) -> Result<GenerateOptions> {
    let root = std::env::current_dir().context("failed to resolve working directory")?;
    Ok(VkmockConfig::load(&root, config)?.into_options())
}

/// Print an error chain and map the outcome to an exit code.
pub fn report(result: Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("error: {:#}", e);
            1
        }
    }
}
