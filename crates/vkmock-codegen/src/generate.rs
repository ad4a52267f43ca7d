//! Generation driver.
//!
//! Runs the pipeline in its load-bearing order: extension tables first
//! (override bodies read them), then synthesis, then the backends. Both
//! artifacts are rendered in memory; nothing is written on error.

use crate::error::GenerateError;
use crate::extensions::{ExtensionFilter, ExtensionTables};
use crate::model::SpecModel;
use crate::overrides::OverrideTable;
use crate::registry::get_backend;
use crate::synth::{Surface, Synthesizer};

/// Registry name of the header backend.
pub const HEADER_BACKEND: &str = "mock-icd-header";

/// Registry name of the source backend.
pub const SOURCE_BACKEND: &str = "mock-icd-source";

/// Options for one generation run.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// C++ namespace wrapping the generated code.
    pub namespace: String,
    pub header_name: String,
    pub source_name: String,
    /// Extensions denied on top of the built-in deny-list.
    pub deny_extensions: Vec<String>,
    pub overrides: OverrideTable,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            namespace: "vkmock".to_string(),
            header_name: "mock_icd.h".to_string(),
            source_name: "mock_icd.cpp".to_string(),
            deny_extensions: Vec::new(),
            overrides: OverrideTable::builtin(),
        }
    }
}

/// Everything a backend renders from.
pub struct Generation<'a> {
    pub model: &'a dyn SpecModel,
    pub options: &'a GenerateOptions,
    pub tables: &'a ExtensionTables,
    pub surface: Surface<'a>,
}

/// One rendered file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: String,
    pub contents: String,
}

/// The header and source pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub header: Artifact,
    pub source: Artifact,
}

impl Artifacts {
    pub fn iter(&self) -> impl Iterator<Item = &Artifact> {
        [&self.header, &self.source].into_iter()
    }
}

/// Build the instance/device extension tables for a model.
pub fn build_tables(model: &dyn SpecModel, options: &GenerateOptions) -> ExtensionTables {
    ExtensionFilter::default()
        .deny(options.deny_extensions.iter().cloned())
        .build_tables(model.list_extensions())
}

/// Synthesize every command against already-built tables.
pub fn synthesize<'a>(
    model: &'a dyn SpecModel,
    options: &'a GenerateOptions,
    tables: &'a ExtensionTables,
) -> Result<Surface<'a>, GenerateError> {
    Synthesizer::new(model, &options.overrides, tables).synthesize()
}

/// Run the whole pipeline and render both artifacts.
pub fn generate(
    model: &dyn SpecModel,
    options: &GenerateOptions,
) -> Result<Artifacts, GenerateError> {
    let tables = build_tables(model, options);
    tracing::debug!(
        instance = tables.instance.len(),
        device = tables.device.len(),
        "built extension tables"
    );

    let surface = synthesize(model, options, &tables)?;
    let generation = Generation {
        model,
        options,
        tables: &tables,
        surface,
    };

    let header = render(&generation, HEADER_BACKEND, &options.header_name)?;
    let source = render(&generation, SOURCE_BACKEND, &options.source_name)?;
    tracing::info!(
        header = %header.file_name,
        source = %source.file_name,
        intercepts = generation.surface.intercepts.len(),
        "rendered artifacts"
    );
    Ok(Artifacts { header, source })
}

fn render(
    generation: &Generation<'_>,
    backend: &str,
    file_name: &str,
) -> Result<Artifact, GenerateError> {
    let backend =
        get_backend(backend).ok_or_else(|| GenerateError::UnknownBackend(backend.to_string()))?;
    Ok(Artifact {
        file_name: file_name.to_string(),
        contents: backend.generate(generation),
    })
}
