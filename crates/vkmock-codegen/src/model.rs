//! Query surface over an API description.

use crate::ir::{ApiSpec, Command, Extension, Feature, TypeDef};

/// Read-only view of an API description consumed by the synthesizer.
///
/// [`ApiSpec`] implements this directly; other front ends can implement it
/// over their own object model.
pub trait SpecModel {
    /// Commands in declaration order.
    fn list_commands(&self) -> &[Command];

    /// Type definitions in declaration order.
    fn list_types(&self) -> &[TypeDef];

    /// Extensions in declaration order.
    fn list_extensions(&self) -> &[Extension];

    /// Features in emission order.
    fn list_features(&self) -> &[Feature];

    /// Look up a type by name.
    fn resolve_type(&self, name: &str) -> Option<&TypeDef> {
        self.list_types().iter().find(|t| t.name == name)
    }

    /// Look up a feature by name.
    fn resolve_feature(&self, name: &str) -> Option<&Feature> {
        self.list_features().iter().find(|f| f.name == name)
    }
}

impl SpecModel for ApiSpec {
    fn list_commands(&self) -> &[Command] {
        &self.commands
    }

    fn list_types(&self) -> &[TypeDef] {
        &self.types
    }

    fn list_extensions(&self) -> &[Extension] {
        &self.extensions
    }

    fn list_features(&self) -> &[Feature] {
        &self.features
    }
}
