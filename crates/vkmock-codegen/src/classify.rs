//! Lifecycle role inference.

use crate::ir::{Command, Role};
use serde::Serialize;

/// Name fragments marking a command that creates or allocates handles.
pub const ACQUIRE_MARKERS: &[&str] = &["Create", "Allocate"];

/// Name fragments marking a command that destroys or frees handles.
pub const RELEASE_MARKERS: &[&str] = &["Destroy", "Free"];

/// Where a role decision came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleSource {
    /// The description annotated the command explicitly.
    Annotated,
    /// Inferred from name fragments.
    Heuristic,
}

/// Classify a command into its lifecycle role.
///
/// An explicit annotation wins. Otherwise creation markers are checked
/// before release markers, so a name carrying both is an acquisition.
/// Acquisition also requires at least one parameter to hold the output.
pub fn classify(command: &Command) -> Role {
    classify_with_source(command).0
}

/// Like [`classify`], also reporting how the role was decided.
pub fn classify_with_source(command: &Command) -> (Role, RoleSource) {
    if let Some(role) = command.role {
        return (role, RoleSource::Annotated);
    }

    let name = command.name.as_str();
    let role = if contains_any(name, ACQUIRE_MARKERS) && !command.params.is_empty() {
        Role::Acquire
    } else if contains_any(name, RELEASE_MARKERS) {
        Role::Release
    } else {
        Role::Plain
    };
    tracing::debug!(command = name, ?role, "heuristic role");
    (role, RoleSource::Heuristic)
}

fn contains_any(name: &str, markers: &[&str]) -> bool {
    markers.iter().any(|m| name.contains(m))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Param;

    fn cmd(name: &str) -> Command {
        Command::new(name, vec![Param::value("device", "VkDevice")])
    }

    #[test]
    fn creation_markers() {
        assert_eq!(classify(&cmd("vkCreateFence")), Role::Acquire);
        assert_eq!(classify(&cmd("vkAllocateMemory")), Role::Acquire);
        assert_eq!(classify(&cmd("vkCreateGraphicsPipelines")), Role::Acquire);
    }

    #[test]
    fn release_markers() {
        assert_eq!(classify(&cmd("vkDestroyFence")), Role::Release);
        assert_eq!(classify(&cmd("vkFreeMemory")), Role::Release);
    }

    #[test]
    fn markers_are_case_sensitive() {
        assert_eq!(classify(&cmd("vkrecreatething")), Role::Plain);
        assert_eq!(classify(&cmd("vkCmdDraw")), Role::Plain);
    }

    #[test]
    fn creation_wins_tie() {
        assert_eq!(classify(&cmd("vkCreateOrDestroyThing")), Role::Acquire);
    }

    #[test]
    fn acquisition_needs_a_parameter() {
        let bare = Command::new("vkCreateNothing", vec![]);
        assert_eq!(classify(&bare), Role::Plain);
    }

    #[test]
    fn annotation_overrides_heuristic() {
        let annotated = cmd("vkCreateInfoCheck").with_role(Role::Plain);
        assert_eq!(
            classify_with_source(&annotated),
            (Role::Plain, RoleSource::Annotated)
        );
        assert_eq!(
            classify_with_source(&cmd("vkCreateInfoCheck")),
            (Role::Acquire, RoleSource::Heuristic)
        );
    }
}
