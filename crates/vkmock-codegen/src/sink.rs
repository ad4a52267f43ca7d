//! Named section buckets for generated text.

use std::collections::BTreeMap;

/// A bucket of generated text within one feature block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Section {
    Include,
    Define,
    BaseType,
    Handle,
    Enum,
    Group,
    Bitmask,
    FuncPointer,
    Struct,
    Command,
}

impl Section {
    /// Type sections in the order they are flushed.
    pub const TYPES: &'static [Section] = &[
        Section::Include,
        Section::Define,
        Section::BaseType,
        Section::Handle,
        Section::Enum,
        Section::Group,
        Section::Bitmask,
        Section::FuncPointer,
        Section::Struct,
    ];

    /// Every section, type sections first.
    pub const ALL: &'static [Section] = &[
        Section::Include,
        Section::Define,
        Section::BaseType,
        Section::Handle,
        Section::Enum,
        Section::Group,
        Section::Bitmask,
        Section::FuncPointer,
        Section::Struct,
        Section::Command,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Section::Include => "include",
            Section::Define => "define",
            Section::BaseType => "basetype",
            Section::Handle => "handle",
            Section::Enum => "enum",
            Section::Group => "group",
            Section::Bitmask => "bitmask",
            Section::FuncPointer => "funcpointer",
            Section::Struct => "struct",
            Section::Command => "command",
        }
    }
}

/// Accumulates text per section and concatenates it in a fixed order.
#[derive(Debug, Default)]
pub struct SectionSink {
    sections: BTreeMap<Section, Vec<String>>,
}

impl SectionSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, section: Section, text: impl Into<String>) {
        self.sections.entry(section).or_default().push(text.into());
    }

    pub fn is_empty(&self) -> bool {
        self.sections.values().all(Vec::is_empty)
    }

    /// Drain the named sections in `order`.
    ///
    /// Type sections are joined line by line and followed by a blank line;
    /// the command section is joined without a trailing separator.
    pub fn flush(&mut self, order: &[Section]) -> String {
        let mut out = String::new();
        for section in order {
            let Some(contents) = self.sections.remove(section) else {
                continue;
            };
            if contents.is_empty() {
                continue;
            }
            tracing::trace!(section = section.name(), entries = contents.len(), "flush");
            out.push_str(&contents.join("\n"));
            out.push('\n');
            if *section != Section::Command {
                out.push('\n');
            }
        }
        out
    }
}
