//! Source artifact backend.
//!
//! Layout: includes, namespace, source-owned tables and `SetLimits`,
//! per-feature definitions, the physical-device resolver, then the
//! C-linkage exports outside the namespace.

use super::{BlockContent, cpp, feature_blocks, prelude};
use crate::generate::Generation;
use crate::guard::wrap_block;
use crate::synth::SynthesizedCommand;
use crate::traits::{ArtifactKind, Backend};
use std::fmt::Write;

/// Static instance of the source backend.
pub static SOURCE_BACKEND: SourceBackend = SourceBackend;

/// Source backend: `mock-icd-source`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceBackend;

impl Backend for SourceBackend {
    fn name(&self) -> &'static str {
        "mock-icd-source"
    }

    fn extension(&self) -> &'static str {
        "cpp"
    }

    fn kind(&self) -> ArtifactKind {
        ArtifactKind::Source
    }

    fn generate(&self, generation: &Generation<'_>) -> String {
        generate_source(generation)
    }
}

/// Render the source artifact.
pub fn generate_source(generation: &Generation<'_>) -> String {
    let options = generation.options;
    let ns = options.namespace.as_str();
    let mut out = String::new();

    writeln!(out, "#include \"{}\"", options.header_name).unwrap();
    for include in prelude::SOURCE_INCLUDES {
        writeln!(out, "{include}").unwrap();
    }
    writeln!(out, "namespace {ns} {{").unwrap();
    out.push('\n');
    out.push_str(prelude::SOURCE_STATE);
    out.push('\n');
    out.push_str(&prelude::set_limits());

    out.push_str(&feature_blocks(generation, BlockContent::Definitions));

    out.push('\n');
    out.push_str(prelude::PHYSICAL_DEVICE_PROC_ADDR);
    out.push('\n');
    writeln!(out, "}} // namespace {ns}").unwrap();
    out.push('\n');
    out.push_str(prelude::EXPORT_MACRO);
    out.push('\n');
    out.push_str("extern \"C\" {\n\n");
    out.push_str(&prelude::loader_exports(ns));

    for unit in generation
        .surface
        .commands
        .iter()
        .filter(|unit| prelude::EXPORTED_SURFACE_COMMANDS.contains(&unit.command.name.as_str()))
    {
        out.push('\n');
        out.push_str(&wrap_block(unit.guard.as_deref(), &export_forwarder(unit, ns)));
        out.push('\n');
    }

    out.push_str("\n} // extern \"C\"\n");
    out
}

/// C-linkage forwarder exporting a command under its API name.
pub fn export_forwarder(unit: &SynthesizedCommand<'_>, ns: &str) -> String {
    let command = unit.command;
    let call = format!(
        "{ns}::{}({})",
        unit.symbol,
        cpp::argument_list(&command.params)
    );
    let statement = if command.returns_value() {
        format!("return {call};")
    } else {
        format!("{call};")
    };
    format!(
        "EXPORT VKAPI_ATTR {} VKAPI_CALL {}({})\n{{\n    {statement}\n}}",
        command.return_type.as_c(),
        command.name,
        cpp::param_list(&command.params)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::{GenerateOptions, build_tables, synthesize};
    use crate::ir::{ApiSpec, Command, Feature, Param, TypeDef, TypeKind};

    fn model() -> ApiSpec {
        let mut spec = ApiSpec::new();
        spec.add_feature(Feature::new("VK_KHR_surface"));
        spec.add_feature(Feature::new("VK_KHR_xlib_surface").with_guard("VK_USE_PLATFORM_XLIB_KHR"));
        spec.add_type(TypeDef::new("VkInstance", TypeKind::DispatchableHandle));
        spec.add_type(TypeDef::new("VkSurfaceKHR", TypeKind::NonDispatchableHandle));
        spec.add_command(
            Command::new(
                "vkDestroySurfaceKHR",
                vec![
                    Param::value("instance", "VkInstance"),
                    Param::value("surface", "VkSurfaceKHR"),
                    Param::input("pAllocator", "VkAllocationCallbacks"),
                ],
            )
            .in_feature("VK_KHR_surface"),
        );
        spec.add_command(
            Command::new(
                "vkCreateXlibSurfaceKHR",
                vec![
                    Param::value("instance", "VkInstance"),
                    Param::out("pSurface", "VkSurfaceKHR"),
                ],
            )
            .returning("VkResult")
            .in_feature("VK_KHR_xlib_surface")
            .with_guard("VK_USE_PLATFORM_XLIB_KHR"),
        );
        spec.add_command(
            Command::new("vkGetOrphanStatus", vec![Param::value("instance", "VkInstance")])
                .returning("VkResult"),
        );
        spec
    }

    fn render(spec: &ApiSpec) -> String {
        let options = GenerateOptions::default();
        let tables = build_tables(spec, &options);
        let surface = synthesize(spec, &options, &tables).unwrap();
        generate_source(&Generation {
            model: spec,
            options: &options,
            tables: &tables,
            surface,
        })
    }

    #[test]
    fn framing() {
        let text = render(&model());
        assert!(text.starts_with("#include \"mock_icd.h\"\n#include <stdlib.h>\n"));
        assert!(text.contains("static VkPhysicalDeviceLimits SetLimits("));
        assert!(text.contains("} // namespace vkmock\n"));
        assert!(text.contains("vk_icdNegotiateLoaderICDInterfaceVersion"));
        assert!(text.ends_with("} // extern \"C\"\n"));
    }

    #[test]
    fn synthesized_definitions() {
        let text = render(&model());
        assert!(text.contains("    *pSurface = (VkSurfaceKHR)global_unique_handle++;\n"));
        assert!(text.contains("    // Destroy object\n"));
    }

    #[test]
    fn commands_without_feature_are_still_emitted() {
        let text = render(&model());
        assert!(text.contains("static VkResult VKAPI_CALL GetOrphanStatus("));
        assert!(!text.contains("#ifndef vkGetOrphanStatus"));
    }

    #[test]
    fn surface_forwarders() {
        let text = render(&model());
        assert!(text.contains(
            "EXPORT VKAPI_ATTR void VKAPI_CALL vkDestroySurfaceKHR(\n"
        ));
        assert!(text.contains("    vkmock::DestroySurfaceKHR(instance, surface, pAllocator);\n}"));
        assert!(text.contains(
            "#ifdef VK_USE_PLATFORM_XLIB_KHR\nEXPORT VKAPI_ATTR VkResult VKAPI_CALL vkCreateXlibSurfaceKHR("
        ));
        assert!(text.contains("    return vkmock::CreateXlibSurfaceKHR(instance, pSurface);\n}\n#endif /* VK_USE_PLATFORM_XLIB_KHR */"));
        assert!(!text.contains("VKAPI_CALL vkGetOrphanStatus"));
    }
}
