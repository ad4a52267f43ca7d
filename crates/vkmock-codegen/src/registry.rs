//! Registry for artifact backends.

use crate::traits::{ArtifactKind, Backend};
use std::sync::{OnceLock, RwLock};

/// Global registry of backends.
static BACKENDS: RwLock<Vec<&'static dyn Backend>> = RwLock::new(Vec::new());
static INITIALIZED: OnceLock<()> = OnceLock::new();

/// Register a custom backend.
///
/// Built-in backends are registered automatically on first use. A custom
/// backend registered under a built-in name is shadowed by the built-in.
pub fn register_backend(backend: &'static dyn Backend) {
    init_builtin();
    BACKENDS.write().unwrap().push(backend);
}

/// Initialize built-in backends (called automatically on first use).
fn init_builtin() {
    INITIALIZED.get_or_init(|| {
        let mut backends = BACKENDS.write().unwrap();

        #[cfg(feature = "backend-header")]
        {
            backends.push(&crate::output::header::HEADER_BACKEND);
        }

        #[cfg(feature = "backend-source")]
        {
            backends.push(&crate::output::source::SOURCE_BACKEND);
        }
    });
}

/// Get a backend by name.
pub fn get_backend(name: &str) -> Option<&'static dyn Backend> {
    init_builtin();
    BACKENDS
        .read()
        .unwrap()
        .iter()
        .find(|b| b.name() == name)
        .copied()
}

/// Get all backends producing one kind of artifact.
pub fn backends_by_kind(kind: ArtifactKind) -> Vec<&'static dyn Backend> {
    init_builtin();
    BACKENDS
        .read()
        .unwrap()
        .iter()
        .filter(|b| b.kind() == kind)
        .copied()
        .collect()
}

/// List all registered backend names.
pub fn backend_names() -> Vec<&'static str> {
    init_builtin();
    BACKENDS.read().unwrap().iter().map(|b| b.name()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::Generation;

    #[test]
    fn builtin_backends_are_registered() {
        let names = backend_names();
        assert!(names.contains(&"mock-icd-header"));
        assert!(names.contains(&"mock-icd-source"));
        assert_eq!(get_backend("mock-icd-header").unwrap().extension(), "h");
        assert!(get_backend("nope").is_none());
    }

    #[test]
    fn lookup_by_kind() {
        let sources = backends_by_kind(ArtifactKind::Source);
        assert!(sources.iter().any(|b| b.name() == "mock-icd-source"));
        assert!(!sources.iter().any(|b| b.name() == "mock-icd-header"));
    }

    struct Listing;

    impl Backend for Listing {
        fn name(&self) -> &'static str {
            "test-listing"
        }
        fn extension(&self) -> &'static str {
            "txt"
        }
        fn kind(&self) -> ArtifactKind {
            ArtifactKind::Source
        }
        fn generate(&self, generation: &Generation<'_>) -> String {
            generation.surface.intercepts.len().to_string()
        }
    }

    static LISTING: Listing = Listing;

    #[test]
    fn custom_backend_registration() {
        register_backend(&LISTING);
        assert!(backend_names().contains(&"test-listing"));
        assert!(get_backend("mock-icd-header").is_some());
    }
}
