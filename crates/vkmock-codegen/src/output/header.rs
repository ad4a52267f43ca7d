//! Header artifact backend.
//!
//! Layout: include guard, includes, namespace, shared state, extension
//! tables, per-feature declarations, intercept table.

use super::{BlockContent, cpp, feature_blocks, prelude};
use crate::extensions::ExtensionEntry;
use crate::generate::Generation;
use crate::guard::wrap_lines;
use crate::traits::{ArtifactKind, Backend};
use std::fmt::Write;

/// Static instance of the header backend.
pub static HEADER_BACKEND: HeaderBackend = HeaderBackend;

/// Header backend: `mock-icd-header`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderBackend;

impl Backend for HeaderBackend {
    fn name(&self) -> &'static str {
        "mock-icd-header"
    }

    fn extension(&self) -> &'static str {
        "h"
    }

    fn kind(&self) -> ArtifactKind {
        ArtifactKind::Header
    }

    fn generate(&self, generation: &Generation<'_>) -> String {
        generate_header(generation)
    }
}

/// Render the header artifact.
pub fn generate_header(generation: &Generation<'_>) -> String {
    let options = generation.options;
    let include_guard = cpp::include_guard(&options.header_name);
    let mut out = String::new();

    writeln!(out, "#ifndef {include_guard}").unwrap();
    writeln!(out, "#define {include_guard} 1").unwrap();
    out.push('\n');
    for include in prelude::HEADER_INCLUDES {
        writeln!(out, "{include}").unwrap();
    }
    writeln!(out, "namespace {} {{", options.namespace).unwrap();
    out.push('\n');
    out.push_str(&prelude::shared_state());
    out.push('\n');

    extension_map(&mut out, "instance", &generation.tables.instance);
    extension_map(&mut out, "device", &generation.tables.device);

    out.push_str(&feature_blocks(generation, BlockContent::Declarations));

    out.push('\n');
    out.push_str(&intercept_table(generation));
    out.push('\n');
    writeln!(out, "}} // namespace {}", options.namespace).unwrap();
    out.push('\n');
    writeln!(out, "#endif /* {include_guard} */").unwrap();
    out
}

fn extension_map(out: &mut String, scope: &str, entries: &[ExtensionEntry]) {
    writeln!(out, "// Map of {scope} extension name to version").unwrap();
    writeln!(
        out,
        "static const std::unordered_map<std::string, uint32_t> {scope}_extension_map = {{"
    )
    .unwrap();
    for entry in entries {
        writeln!(out, "    {{\"{}\", {}}},", entry.name, entry.version).unwrap();
    }
    out.push_str("};\n");
}

/// `name_to_funcptr_map`, one row per command, guarded rows wrapped.
pub fn intercept_table(generation: &Generation<'_>) -> String {
    let mut lines = vec![
        "// Map of all APIs to be intercepted by this layer".to_string(),
        "static const std::unordered_map<std::string, void*> name_to_funcptr_map = {".to_string(),
    ];
    for registration in &generation.surface.intercepts {
        let row = format!(
            "    {{\"{}\", (void*){}}},",
            registration.item.command, registration.item.symbol
        );
        lines.extend(wrap_lines(registration.guard.as_deref(), vec![row]));
    }
    lines.push("};".to_string());
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::{GenerateOptions, build_tables, synthesize};
    use crate::ir::{ApiSpec, Command, Extension, ExtensionScope, Feature, Param, TypeDef, TypeKind};

    fn model() -> ApiSpec {
        let mut spec = ApiSpec::new();
        spec.add_feature(Feature::new("VK_VERSION_1_0"));
        spec.add_feature(Feature::new("VK_KHR_xlib_surface").with_guard("VK_USE_PLATFORM_XLIB_KHR"));
        spec.add_type(TypeDef::new("VkInstance", TypeKind::DispatchableHandle));
        spec.add_type(TypeDef::new("VkSurfaceKHR", TypeKind::NonDispatchableHandle));
        spec.add_type(
            TypeDef::structure(
                "VkExtent2D",
                vec![
                    Param::value("width", "uint32_t"),
                    Param::value("height", "uint32_t"),
                ],
            )
            .in_feature("VK_VERSION_1_0"),
        );
        spec.add_extension(
            Extension::new("VK_KHR_xlib_surface", 6)
                .with_scope(ExtensionScope::Instance)
                .with_guard("VK_USE_PLATFORM_XLIB_KHR"),
        );
        spec.add_command(
            Command::new("vkQueueWaitIdle", vec![Param::value("queue", "VkQueue")])
                .returning("VkResult")
                .in_feature("VK_VERSION_1_0"),
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
        spec
    }

    fn render(spec: &ApiSpec) -> String {
        let options = GenerateOptions::default();
        let tables = build_tables(spec, &options);
        let surface = synthesize(spec, &options, &tables).unwrap();
        let generation = Generation {
            model: spec,
            options: &options,
            tables: &tables,
            surface,
        };
        generate_header(&generation)
    }

    #[test]
    fn framing() {
        let text = render(&model());
        assert!(text.starts_with("#ifndef __mock_icd_h_\n#define __mock_icd_h_ 1\n\n#include <unordered_map>\n"));
        assert!(text.contains("namespace vkmock {\n"));
        assert!(text.ends_with("} // namespace vkmock\n\n#endif /* __mock_icd_h_ */\n"));
    }

    #[test]
    fn extension_tables() {
        let text = render(&model());
        assert!(text.contains(
            "instance_extension_map = {\n    {\"VK_KHR_xlib_surface\", 6},\n};\n"
        ));
        assert!(text.contains("device_extension_map = {\n};\n"));
    }

    #[test]
    fn guarded_feature_block() {
        let text = render(&model());
        assert!(text.contains(
            "\n#ifndef VK_KHR_xlib_surface\n#ifdef VK_USE_PLATFORM_XLIB_KHR\n\nstatic VkResult VKAPI_CALL CreateXlibSurfaceKHR("
        ));
        assert!(text.contains("#endif /* VK_USE_PLATFORM_XLIB_KHR */\n#endif /* VK_KHR_xlib_surface */\n"));
        assert!(text.contains("typedef struct VkExtent2D {\n"));
    }

    #[test]
    fn intercept_rows() {
        let text = render(&model());
        assert!(text.contains(
            "static const std::unordered_map<std::string, void*> name_to_funcptr_map = {\n\
             \x20   {\"vkQueueWaitIdle\", (void*)QueueWaitIdle},\n\
             #ifdef VK_USE_PLATFORM_XLIB_KHR\n\
             \x20   {\"vkCreateXlibSurfaceKHR\", (void*)CreateXlibSurfaceKHR},\n\
             #endif\n\
             };\n"
        ));
    }
}
