//! Traits for artifact backends.

use crate::generate::Generation;

/// Which artifact a backend produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Declarations, shared state, and the intercept table.
    Header,
    /// Definitions and the C-linkage exports.
    Source,
}

/// An artifact backend.
///
/// Backends render one artifact from a synthesized [`Generation`]. They do no
/// I/O; the caller writes the returned text.
///
/// # Implementing Custom Backends
///
/// ```ignore
/// use vkmock_codegen::{ArtifactKind, Backend, Generation, register_backend};
///
/// struct CommandList;
///
/// impl Backend for CommandList {
///     fn name(&self) -> &'static str { "command-list" }
///     fn extension(&self) -> &'static str { "txt" }
///     fn kind(&self) -> ArtifactKind { ArtifactKind::Source }
///     fn generate(&self, generation: &Generation<'_>) -> String {
///         generation
///             .surface
///             .intercepts
///             .iter()
///             .map(|row| format!("{}\n", row.item.command))
///             .collect()
///     }
/// }
///
/// // Register before first use
/// register_backend(&CommandList);
/// ```
pub trait Backend: Send + Sync {
    /// Unique backend identifier (e.g., "mock-icd-header").
    fn name(&self) -> &'static str;

    /// File extension for the artifact (e.g., "h", "cpp").
    fn extension(&self) -> &'static str;

    /// Artifact produced.
    fn kind(&self) -> ArtifactKind;

    /// Render the artifact.
    fn generate(&self, generation: &Generation<'_>) -> String;
}
