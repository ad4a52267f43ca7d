//! Output backends.
//!
//! Each backend renders one artifact from a [`Generation`]. Both implement
//! the [`Backend`](crate::traits::Backend) trait for uniform access via the
//! registry.

pub mod cpp;
pub mod prelude;

#[cfg(feature = "backend-header")]
pub mod header;
#[cfg(feature = "backend-source")]
pub mod source;

#[cfg(feature = "backend-header")]
pub use header::HeaderBackend;
#[cfg(feature = "backend-source")]
pub use source::SourceBackend;

use crate::generate::Generation;
use crate::guard::wrap_block;
use crate::sink::{Section, SectionSink};
use crate::synth::SynthesizedCommand;
use std::collections::HashMap;

/// What a feature block carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BlockContent {
    /// Aggregate typedefs and command declarations.
    Declarations,
    /// Command definitions.
    Definitions,
}

/// Render every feature block in feature order.
///
/// Commands whose owner is not a listed feature are collected into one
/// trailing block without `#ifndef` protection.
pub(crate) fn feature_blocks(generation: &Generation<'_>, content: BlockContent) -> String {
    let render = |unit: &SynthesizedCommand<'_>| match content {
        BlockContent::Declarations => cpp::declaration(unit),
        BlockContent::Definitions => cpp::definition(unit),
    };

    let mut by_feature: HashMap<&str, Vec<&SynthesizedCommand<'_>>> = HashMap::new();
    let mut orphans = Vec::new();
    for unit in &generation.surface.commands {
        match unit.command.feature.as_deref() {
            Some(owner) if generation.model.resolve_feature(owner).is_some() => {
                by_feature.entry(owner).or_default().push(unit)
            }
            _ => orphans.push(unit),
        }
    }

    let mut out = String::new();
    for feature in generation.model.list_features() {
        let block_guard = generation.tables.feature_guard(feature);
        let mut sink = SectionSink::new();

        if content == BlockContent::Declarations {
            for ty in generation
                .model
                .list_types()
                .iter()
                .filter(|t| t.feature.as_deref() == Some(feature.name.as_str()))
            {
                if let Some(text) = cpp::aggregate_typedef(ty) {
                    sink.append(Section::Struct, text);
                }
            }
        }

        for unit in by_feature.remove(feature.name.as_str()).unwrap_or_default() {
            sink.append(Section::Command, "");
            sink.append(
                Section::Command,
                cpp::guard_within_block(render(unit), unit.guard.as_deref(), block_guard),
            );
        }

        if !sink.is_empty() {
            out.push_str(&cpp::feature_block(
                Some(&feature.name),
                block_guard,
                &mut sink,
            ));
        }
    }

    let mut sink = SectionSink::new();
    for unit in orphans {
        sink.append(Section::Command, "");
        sink.append(
            Section::Command,
            wrap_block(unit.guard.as_deref(), &render(unit)),
        );
    }
    if !sink.is_empty() {
        out.push_str(&cpp::feature_block(None, None, &mut sink));
    }
    out
}
