//! C++ rendering shared by the header and source backends.

use crate::allocate::{AllocationPlan, Cardinality, HandleKind};
use crate::guard::wrap_block;
use crate::ir::{Command, Param, TypeDef};
use crate::sink::{Section, SectionSink};
use crate::synth::{Body, SynthesizedCommand};
use std::fmt::Write;

/// Column at which parameter and member names start.
pub const ALIGN_COLUMN: usize = 48;

/// Return statement appended to value-returning synthesized bodies.
pub const SUCCESS_RETURN: &str = "    return VK_SUCCESS;\n";

/// One parameter or member declaration, name aligned at [`ALIGN_COLUMN`].
pub fn param_decl(param: &Param) -> String {
    let mut line = format!("    {}", param.decl_prefix);
    if line.len() < ALIGN_COLUMN {
        line.push_str(&" ".repeat(ALIGN_COLUMN - line.len()));
    } else {
        line.push(' ');
    }
    line.push_str(&param.name);
    line.push_str(&param.decl_suffix);
    line
}

/// Parameter list, one per line; `void` when empty.
pub fn param_list(params: &[Param]) -> String {
    if params.is_empty() {
        return "void".to_string();
    }
    let decls: Vec<_> = params.iter().map(param_decl).collect();
    format!("\n{}", decls.join(",\n"))
}

/// `static RET VKAPI_CALL Symbol(params)` without a terminator.
pub fn prototype(command: &Command, symbol: &str) -> String {
    format!(
        "static {} VKAPI_CALL {}({})",
        command.return_type.as_c(),
        symbol,
        param_list(&command.params)
    )
}

/// Comma-separated argument names for forwarding calls.
pub fn argument_list(params: &[Param]) -> String {
    params
        .iter()
        .map(|p| p.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// `typedef struct Name { members; } Name;`
pub fn aggregate_typedef(ty: &TypeDef) -> Option<String> {
    let keyword = ty.kind.aggregate_keyword()?;
    let mut out = format!("typedef {} {} {{\n", keyword, ty.name);
    for member in &ty.members {
        out.push_str(&param_decl(member));
        out.push_str(";\n");
    }
    write!(out, "}} {};\n", ty.name).unwrap();
    Some(out)
}

/// Declaration emitted into the header.
pub fn declaration(unit: &SynthesizedCommand<'_>) -> String {
    format!("{};", prototype(unit.command, &unit.symbol))
}

/// Definition emitted into the source.
pub fn definition(unit: &SynthesizedCommand<'_>) -> String {
    let head = prototype(unit.command, &unit.symbol);
    match &unit.body {
        Body::DeclareOnly => format!(
            "// declare only\n{head};\n// TODO: Implement custom intercept body"
        ),
        Body::Literal(text) => format!("{head}\n{{\n{text}}}"),
        body => {
            let mut out = format!("{head}\n{{\n");
            out.push_str(&synthesized_statements(body));
            if unit.command.returns_value() {
                out.push_str(SUCCESS_RETURN);
            }
            out.push('}');
            out
        }
    }
}

/// Statements of a synthesized body, without the success return.
fn synthesized_statements(body: &Body) -> String {
    match body {
        Body::Acquire(plan) => minting_statements(plan),
        Body::Release => "    // Destroy object\n".to_string(),
        Body::Inconsistent(reason) => format!(
            "    // FIXME: {reason}\n    // Not a create or destroy function\n"
        ),
        _ => "    // Not a create or destroy function\n".to_string(),
    }
}

/// Lock, then mint one handle per output slot.
pub fn minting_statements(plan: &AllocationPlan) -> String {
    let mint = match plan.kind {
        HandleKind::Dispatchable => "CreateDispObjHandle()",
        HandleKind::NonDispatchable => "global_unique_handle++",
    };
    let mut out = String::from("    unique_lock_t lock(global_lock);\n");
    match &plan.cardinality {
        Cardinality::Array { len } => {
            writeln!(out, "    for (uint32_t i = 0; i < {len}; ++i) {{").unwrap();
            writeln!(
                out,
                "        {}[i] = ({}){};",
                plan.target, plan.handle_type, mint
            )
            .unwrap();
            out.push_str("    }\n");
        }
        Cardinality::Single => {
            writeln!(out, "    *{} = ({}){};", plan.target, plan.handle_type, mint).unwrap();
        }
    }
    out
}

/// Renders one `#ifndef FEATURE` block from a sink.
///
/// `guard` wraps the sections inside the feature protection; an unnamed
/// block (commands without a known feature) gets no `#ifndef`.
pub fn feature_block(name: Option<&str>, guard: Option<&str>, sink: &mut SectionSink) -> String {
    let mut out = String::from("\n");
    if let Some(name) = name {
        writeln!(out, "#ifndef {name}").unwrap();
    }
    if let Some(guard) = guard {
        writeln!(out, "#ifdef {guard}").unwrap();
    }
    out.push_str(&sink.flush(Section::ALL));
    if let Some(guard) = guard {
        writeln!(out, "#endif /* {guard} */").unwrap();
    }
    if let Some(name) = name {
        writeln!(out, "#endif /* {name} */").unwrap();
    }
    out
}

/// Apply a command's own guard when it differs from its block's guard.
pub fn guard_within_block(
    rendered: String,
    command_guard: Option<&str>,
    block_guard: Option<&str>,
) -> String {
    if command_guard.is_some() && command_guard != block_guard {
        wrap_block(command_guard, &rendered)
    } else {
        rendered
    }
}

/// Include-guard symbol for a header file name.
pub fn include_guard(header_name: &str) -> String {
    let base = header_name.rsplit(['/', '\\']).next().unwrap_or(header_name);
    let mangled: String = base
        .replace(".h", "_h_")
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("__{mangled}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocate::SpecInconsistency;
    use crate::ir::{Command, TypeKind};

    fn unit(command: &Command, body: Body) -> SynthesizedCommand<'_> {
        SynthesizedCommand {
            command,
            symbol: command.name.trim_start_matches("vk").to_string(),
            role: None,
            body,
            guard: None,
        }
    }

    fn create_widget() -> Command {
        Command::new(
            "vkCreateWidget",
            vec![
                Param::value("device", "VkDevice"),
                Param::out("pWidget", "VkWidget"),
            ],
        )
        .returning("VkResult")
    }

    #[test]
    fn aligned_prototype() {
        let cmd = create_widget();
        insta::assert_snapshot!(prototype(&cmd, "CreateWidget"), @r"
        static VkResult VKAPI_CALL CreateWidget(
            VkDevice                                    device,
            VkWidget*                                   pWidget)
        ");
    }

    #[test]
    fn long_prefix_keeps_a_space() {
        let param = Param::input(
            "pCreateInfo",
            "VkPhysicalDeviceShaderIntegerDotProductFeaturesKHR",
        );
        let line = param_decl(&param);
        assert!(line.ends_with("FeaturesKHR* pCreateInfo"));
    }

    #[test]
    fn empty_parameter_list() {
        let cmd = Command::new("vkNothing", vec![]);
        assert_eq!(prototype(&cmd, "Nothing"), "static void VKAPI_CALL Nothing(void)");
    }

    #[test]
    fn non_dispatchable_single_definition() {
        let cmd = create_widget();
        let plan = AllocationPlan {
            target: "pWidget".into(),
            handle_type: "VkWidget".into(),
            kind: HandleKind::NonDispatchable,
            cardinality: Cardinality::Single,
        };
        let def = definition(&unit(&cmd, Body::Acquire(plan)));
        assert!(def.ends_with(
            "{\n    unique_lock_t lock(global_lock);\n    *pWidget = (VkWidget)global_unique_handle++;\n    return VK_SUCCESS;\n}"
        ));
    }

    #[test]
    fn dispatchable_array_definition() {
        let plan = AllocationPlan {
            target: "pCommandBuffers".into(),
            handle_type: "VkCommandBuffer".into(),
            kind: HandleKind::Dispatchable,
            cardinality: Cardinality::Array {
                len: "pAllocateInfo->commandBufferCount".into(),
            },
        };
        assert_eq!(
            minting_statements(&plan),
            "    unique_lock_t lock(global_lock);\n\
             \x20   for (uint32_t i = 0; i < pAllocateInfo->commandBufferCount; ++i) {\n\
             \x20       pCommandBuffers[i] = (VkCommandBuffer)CreateDispObjHandle();\n\
             \x20   }\n"
        );
    }

    #[test]
    fn release_is_marker_only() {
        let cmd = Command::new(
            "vkDestroyWidget",
            vec![
                Param::value("device", "VkDevice"),
                Param::value("widget", "VkWidget"),
            ],
        );
        let def = definition(&unit(&cmd, Body::Release));
        assert!(def.ends_with("{\n    // Destroy object\n}"));
        assert!(!def.contains("global_lock"));
    }

    #[test]
    fn inconsistency_is_visible() {
        let cmd = Command::new("vkCreateGhost", vec![Param::out("pGhost", "VkGhost")])
            .returning("VkResult");
        let body = Body::Inconsistent(SpecInconsistency::UnknownOutputType {
            command: "vkCreateGhost".into(),
            type_name: "VkGhost".into(),
        });
        let def = definition(&unit(&cmd, body));
        assert!(def.contains("// FIXME: vkCreateGhost: output parameter type `VkGhost` is not declared"));
        assert!(def.contains(SUCCESS_RETURN));
    }

    #[test]
    fn declare_only_has_no_body() {
        let cmd = create_widget();
        let def = definition(&unit(&cmd, Body::DeclareOnly));
        assert!(def.starts_with("// declare only\nstatic VkResult VKAPI_CALL CreateWidget("));
        assert!(!def.contains('{'));
    }

    #[test]
    fn struct_typedef() {
        let ty = TypeDef {
            name: "VkExtent2D".into(),
            kind: TypeKind::Struct,
            members: vec![
                Param::value("width", "uint32_t"),
                Param::value("height", "uint32_t"),
            ],
            feature: None,
        };
        let text = aggregate_typedef(&ty).unwrap();
        assert!(text.starts_with("typedef struct VkExtent2D {\n"));
        assert!(text.ends_with("} VkExtent2D;\n"));
        assert!(aggregate_typedef(&TypeDef::new("VkFence", TypeKind::NonDispatchableHandle)).is_none());
    }

    #[test]
    fn include_guards() {
        assert_eq!(include_guard("mock_icd.h"), "__mock_icd_h_");
        assert_eq!(include_guard("out/mock-icd.h"), "__mock_icd_h_");
    }
}
