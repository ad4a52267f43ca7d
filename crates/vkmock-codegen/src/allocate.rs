//! Handle allocation policy for acquisition commands.
//!
//! Decides how many handles an acquisition mints and which identity scheme
//! each one uses. Only the command's last parameter is inspected: creation
//! and allocation entry points place their output handles last.

use crate::ir::{Command, TypeKind};
use crate::model::SpecModel;
use serde::Serialize;

/// Identity scheme for a minted handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HandleKind {
    /// A heap object tagged for the loader; identity is its address.
    Dispatchable,
    /// A value from the shared 64-bit counter.
    NonDispatchable,
}

/// How many handles one call mints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cardinality {
    /// Store one handle through the output pointer.
    Single,
    /// Store one handle per index of the length expression.
    Array { len: String },
}

/// Minting strategy for one acquisition command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllocationPlan {
    /// Output parameter receiving the handles.
    pub target: String,
    /// Handle type name, used for the cast in generated code.
    pub handle_type: String,
    pub kind: HandleKind,
    pub cardinality: Cardinality,
}

/// The description contradicts the role a command was given.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpecInconsistency {
    #[error("{command}: output parameter type `{type_name}` is not declared")]
    UnknownOutputType { command: String, type_name: String },
}

/// Plan handle minting for an acquisition command.
///
/// Returns `Ok(None)` when the last parameter is not a pointer, leaving
/// nothing to mint. Known types that are not handles fall back to
/// dispatchable minting, which still yields a unique value.
///
/// A pointee type the model does not declare at all is not minted
/// dispatchable: it is reported as [`SpecInconsistency`] and the caller
/// emits a plain body with a marker comment naming the type.
pub fn plan_allocation(
    command: &Command,
    model: &dyn SpecModel,
) -> Result<Option<AllocationPlan>, SpecInconsistency> {
    let Some(last) = command.last_param() else {
        return Ok(None);
    };
    if !last.is_pointer {
        return Ok(None);
    }

    let Some(ty) = model.resolve_type(&last.type_name) else {
        return Err(SpecInconsistency::UnknownOutputType {
            command: command.name.clone(),
            type_name: last.type_name.clone(),
        });
    };

    let kind = match ty.kind {
        TypeKind::NonDispatchableHandle => HandleKind::NonDispatchable,
        TypeKind::DispatchableHandle => HandleKind::Dispatchable,
        other => {
            tracing::debug!(
                command = %command.name,
                ty = %ty.name,
                kind = ?other,
                "output is not a handle type; minting dispatchable objects"
            );
            HandleKind::Dispatchable
        }
    };

    let cardinality = match &last.len {
        Some(len) => Cardinality::Array {
            len: render_len(len),
        },
        None => Cardinality::Single,
    };

    Ok(Some(AllocationPlan {
        target: last.name.clone(),
        handle_type: last.type_name.clone(),
        kind,
        cardinality,
    }))
}

/// Render a registry length expression as a C expression.
///
/// Nested member paths use `::` in the registry (`pAllocateInfo::count`)
/// and become pointer member accesses.
pub fn render_len(len: &str) -> String {
    len.replace("::", "->")
}

impl AllocationPlan {
    pub fn is_array(&self) -> bool {
        matches!(self.cardinality, Cardinality::Array { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{ApiSpec, Param, TypeDef};

    fn model() -> ApiSpec {
        let mut spec = ApiSpec::new();
        spec.add_type(TypeDef::new("VkDevice", TypeKind::DispatchableHandle));
        spec.add_type(TypeDef::new(
            "VkCommandBuffer",
            TypeKind::DispatchableHandle,
        ));
        spec.add_type(TypeDef::new("VkFence", TypeKind::NonDispatchableHandle));
        spec.add_type(TypeDef::structure("VkWidgetInfo", vec![]));
        spec
    }

    #[test]
    fn single_non_dispatchable() {
        let cmd = Command::new(
            "vkCreateFence",
            vec![
                Param::value("device", "VkDevice"),
                Param::out("pFence", "VkFence"),
            ],
        );
        let plan = plan_allocation(&cmd, &model()).unwrap().unwrap();
        assert_eq!(plan.kind, HandleKind::NonDispatchable);
        assert_eq!(plan.cardinality, Cardinality::Single);
        assert_eq!(plan.target, "pFence");
    }

    #[test]
    fn array_with_member_path() {
        let cmd = Command::new(
            "vkAllocateCommandBuffers",
            vec![
                Param::value("device", "VkDevice"),
                Param::out("pCommandBuffers", "VkCommandBuffer")
                    .with_len("pAllocateInfo::commandBufferCount"),
            ],
        );
        let plan = plan_allocation(&cmd, &model()).unwrap().unwrap();
        assert_eq!(plan.kind, HandleKind::Dispatchable);
        assert_eq!(
            plan.cardinality,
            Cardinality::Array {
                len: "pAllocateInfo->commandBufferCount".into()
            }
        );
    }

    #[test]
    fn non_pointer_last_param_has_no_plan() {
        let cmd = Command::new(
            "vkCreateSomething",
            vec![Param::value("device", "VkDevice")],
        );
        assert_eq!(plan_allocation(&cmd, &model()), Ok(None));
    }

    #[test]
    fn known_non_handle_defaults_to_dispatchable() {
        let cmd = Command::new(
            "vkCreateWidgetInfo",
            vec![Param::out("pInfo", "VkWidgetInfo")],
        );
        let plan = plan_allocation(&cmd, &model()).unwrap().unwrap();
        assert_eq!(plan.kind, HandleKind::Dispatchable);
    }

    #[test]
    fn unknown_type_is_inconsistent() {
        let cmd = Command::new("vkCreateGhost", vec![Param::out("pGhost", "VkGhost")]);
        let err = plan_allocation(&cmd, &model()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "vkCreateGhost: output parameter type `VkGhost` is not declared"
        );
    }
}
