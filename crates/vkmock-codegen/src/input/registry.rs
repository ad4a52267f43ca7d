//! Vulkan XML registry reader.
//!
//! Reads `vk.xml` into the IR:
//! - `<types>`: handles (`VK_DEFINE_HANDLE` / `VK_DEFINE_NON_DISPATCHABLE_HANDLE`,
//!   aliases resolved), structs and unions with members, enums, everything
//!   else as [`TypeKind::Other`]
//! - `<commands>`: prototypes and parameters; aliased commands copy their
//!   target's signature under the new name
//! - `<feature>` / `<extension>`: emission order, extension versions, scopes
//!   and platform guards
//!
//! Commands are ordered by the first feature or extension that requires
//! them; commands nothing requires are dropped. Elements restricted to
//! another API variant (`api="vulkansc"`) are skipped.

use super::ParseError;
use crate::ir::{
    ApiSpec, Command, Extension, ExtensionScope, Feature, Param, ReturnType, TypeDef, TypeKind,
};
use roxmltree::{Document, Node};
use std::collections::{HashMap, HashSet};

/// API variant this reader keeps.
const API: &str = "vulkan";

/// Parse a Vulkan XML registry.
pub fn parse_registry(content: &str) -> Result<ApiSpec, ParseError> {
    let doc = Document::parse(content).map_err(|e| ParseError::Xml(e.to_string()))?;
    let root = doc.root_element();
    if root.tag_name().name() != "registry" {
        return Err(ParseError::Unsupported(format!(
            "expected <registry> root element, found <{}>",
            root.tag_name().name()
        )));
    }

    let platforms = read_platforms(root);
    let mut types = Vec::new();
    let mut handle_aliases = Vec::new();
    let mut commands = CommandTable::default();
    let mut features = Vec::new();
    let mut extensions = Vec::new();

    for child in root.children().filter(Node::is_element) {
        match child.tag_name().name() {
            "types" => read_types(child, &mut types, &mut handle_aliases),
            "commands" => read_commands(child, &mut commands)?,
            "feature" if supports_api(child.attribute("api")) => features.push(child),
            "extensions" => {
                for ext in child.children().filter(|n| n.has_tag_name("extension")) {
                    if supports_api(ext.attribute("supported")) {
                        extensions.push(ext);
                    }
                }
            }
            _ => {}
        }
    }
    resolve_handle_aliases(&mut types, &handle_aliases);
    commands.resolve_aliases();

    extensions.sort_by_key(|ext| {
        ext.attribute("number")
            .and_then(|n| n.parse::<u32>().ok())
            .unwrap_or(u32::MAX)
    });

    let mut spec = ApiSpec::new();
    let mut groupings = Vec::new();
    for feature in &features {
        let name = required_attribute(*feature, "feature", "name")?;
        spec.add_feature(Feature::new(name));
        groupings.push((*feature, name, None));
    }
    for ext in &extensions {
        let extension = read_extension(*ext, &platforms)?;
        let mut feature = Feature::new(&extension.name);
        feature.guard = extension.guard.clone();
        spec.add_feature(feature);
        let name = required_attribute(*ext, "extension", "name")?;
        groupings.push((*ext, name, extension.guard.clone()));
        spec.add_extension(extension);
    }

    let mut type_owner: HashMap<&str, &str> = HashMap::new();
    let mut taken: HashSet<String> = HashSet::new();
    for (node, owner, guard) in &groupings {
        for require in node
            .children()
            .filter(|n| n.has_tag_name("require") && supports_api(n.attribute("api")))
        {
            for item in require.children().filter(Node::is_element) {
                let Some(name) = item.attribute("name") else {
                    continue;
                };
                match item.tag_name().name() {
                    "type" => {
                        type_owner.entry(name).or_insert(*owner);
                    }
                    "command" => {
                        if taken.contains(name) {
                            continue;
                        }
                        let Some(def) = commands.get(name) else {
                            tracing::warn!(
                                command = name,
                                owner = *owner,
                                "required command is not defined"
                            );
                            continue;
                        };
                        let mut command = def.clone();
                        command.feature = Some(owner.to_string());
                        command.guard = guard.clone();
                        taken.insert(name.to_string());
                        spec.add_command(command);
                    }
                    _ => {}
                }
            }
        }
    }

    let dropped = commands.len() - taken.len();
    if dropped > 0 {
        tracing::debug!(dropped, "commands not required by any feature or extension");
    }

    for mut ty in types {
        ty.feature = type_owner.get(ty.name.as_str()).map(|f| f.to_string());
        spec.add_type(ty);
    }

    tracing::debug!(
        features = spec.features.len(),
        commands = spec.commands.len(),
        types = spec.types.len(),
        extensions = spec.extensions.len(),
        "parsed registry"
    );
    Ok(spec)
}

/// Whether a comma-separated `api`/`supported` list includes this API.
/// An absent attribute applies to every variant.
fn supports_api(list: Option<&str>) -> bool {
    list.is_none_or(|list| list.split(',').any(|api| api.trim() == API))
}

fn required_attribute<'a>(
    node: Node<'a, '_>,
    element: &'static str,
    attribute: &'static str,
) -> Result<&'a str, ParseError> {
    node.attribute(attribute)
        .ok_or(ParseError::MissingAttribute { element, attribute })
}

fn child<'a, 'i>(node: Node<'a, 'i>, tag: &str) -> Option<Node<'a, 'i>> {
    node.children().find(|n| n.has_tag_name(tag))
}

fn child_text<'a>(node: Node<'a, '_>, tag: &str) -> Option<&'a str> {
    child(node, tag).and_then(|n| n.text())
}

/// Platform name → protection macro.
fn read_platforms<'a>(root: Node<'a, '_>) -> HashMap<&'a str, &'a str> {
    child(root, "platforms")
        .into_iter()
        .flat_map(|p| p.children().filter(|n| n.has_tag_name("platform")))
        .filter_map(|p| Some((p.attribute("name")?, p.attribute("protect")?)))
        .collect()
}

fn read_types(
    types: Node<'_, '_>,
    out: &mut Vec<TypeDef>,
    aliases: &mut Vec<(String, String)>,
) {
    for node in types
        .children()
        .filter(|n| n.has_tag_name("type") && supports_api(n.attribute("api")))
    {
        let Some(name) = node.attribute("name").or_else(|| child_text(node, "name")) else {
            continue;
        };
        let category = node.attribute("category").unwrap_or("");
        let kind = match (category, node.attribute("alias")) {
            ("handle", Some(target)) => {
                // Resolved once every handle has been read.
                aliases.push((name.to_string(), target.to_string()));
                TypeKind::Other
            }
            ("handle", None) => match child_text(node, "type") {
                Some("VK_DEFINE_HANDLE") => TypeKind::DispatchableHandle,
                _ => TypeKind::NonDispatchableHandle,
            },
            ("struct", None) => TypeKind::Struct,
            ("union", None) => TypeKind::Union,
            ("enum", _) => TypeKind::Enum,
            _ => TypeKind::Other,
        };
        let mut ty = TypeDef::new(name, kind);
        if kind.aggregate_keyword().is_some() {
            ty.members = node
                .children()
                .filter(|n| n.has_tag_name("member") && supports_api(n.attribute("api")))
                .map(read_param)
                .collect();
        }
        out.push(ty);
    }
}

/// Give handle aliases the kind of the handle they alias.
fn resolve_handle_aliases(types: &mut [TypeDef], aliases: &[(String, String)]) {
    let kinds: HashMap<String, TypeKind> = types
        .iter()
        .filter(|t| t.kind.is_handle())
        .map(|t| (t.name.clone(), t.kind))
        .collect();
    let targets: HashMap<&str, &str> = aliases
        .iter()
        .map(|(alias, target)| (alias.as_str(), target.as_str()))
        .collect();
    for ty in types.iter_mut() {
        let Some(target) = targets.get(ty.name.as_str()) else {
            continue;
        };
        match kinds.get(*target) {
            Some(kind) => ty.kind = *kind,
            None => tracing::warn!(alias = %ty.name, target, "handle alias target is not a handle"),
        }
    }
}

/// Assemble a `<param>` or `<member>` from its mixed text content.
fn read_param(node: Node<'_, '_>) -> Param {
    let mut prefix = String::new();
    let mut suffix = String::new();
    let mut name = String::new();
    let mut type_name = String::new();

    for part in node.children() {
        let text = part.text().unwrap_or("");
        if part.is_element() {
            match part.tag_name().name() {
                "name" => {
                    name = text.to_string();
                    continue;
                }
                "type" => type_name = text.to_string(),
                "comment" => continue,
                _ => {}
            }
        } else if !part.is_text() {
            continue;
        }
        if name.is_empty() {
            prefix.push_str(text);
        } else {
            suffix.push_str(text);
        }
    }

    let decl_prefix = collapse_whitespace(&prefix);
    let len = node
        .attribute("len")
        .and_then(|len| len.split(',').next())
        .filter(|len| *len != "null-terminated")
        .map(str::to_string);

    Param {
        name,
        type_name,
        is_pointer: decl_prefix.contains('*'),
        decl_prefix,
        decl_suffix: collapse_whitespace(&suffix),
        len,
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Command definitions keyed by name, plus pending aliases.
#[derive(Default)]
struct CommandTable {
    defs: HashMap<String, Command>,
    aliases: Vec<(String, String)>,
}

impl CommandTable {
    fn get(&self, name: &str) -> Option<&Command> {
        self.defs.get(name)
    }

    fn len(&self) -> usize {
        self.defs.len()
    }

    fn resolve_aliases(&mut self) {
        for (alias, target) in std::mem::take(&mut self.aliases) {
            match self.defs.get(&target) {
                Some(def) => {
                    let mut command = def.clone();
                    command.name = alias.clone();
                    self.defs.insert(alias, command);
                }
                None => tracing::warn!(%alias, %target, "command alias target is not defined"),
            }
        }
    }
}

fn read_commands(commands: Node<'_, '_>, table: &mut CommandTable) -> Result<(), ParseError> {
    for node in commands
        .children()
        .filter(|n| n.has_tag_name("command") && supports_api(n.attribute("api")))
    {
        if let Some(target) = node.attribute("alias") {
            let alias = required_attribute(node, "command", "name")?;
            table.aliases.push((alias.to_string(), target.to_string()));
            continue;
        }

        let proto = child(node, "proto").ok_or(ParseError::MissingChild {
            element: "command",
            child: "proto",
        })?;
        let name = child_text(proto, "name").ok_or(ParseError::MissingChild {
            element: "proto",
            child: "name",
        })?;
        let return_type = match child_text(proto, "type") {
            None | Some("void") => ReturnType::Void,
            Some(ty) => ReturnType::Value(ty.to_string()),
        };
        let params = node
            .children()
            .filter(|n| n.has_tag_name("param") && supports_api(n.attribute("api")))
            .map(read_param)
            .collect();

        let mut command = Command::new(name, params);
        command.return_type = return_type;
        table.defs.insert(name.to_string(), command);
    }
    Ok(())
}

fn read_extension(
    node: Node<'_, '_>,
    platforms: &HashMap<&str, &str>,
) -> Result<Extension, ParseError> {
    let name = required_attribute(node, "extension", "name")?;

    let version_enum = node
        .children()
        .filter(|n| n.has_tag_name("require"))
        .flat_map(|r| r.children().filter(|n| n.has_tag_name("enum")))
        .find(|e| e.attribute("name").is_some_and(|n| n.ends_with("_SPEC_VERSION")));
    let version = match version_enum.and_then(|e| e.attribute("value")) {
        Some(value) => value
            .trim_matches('"')
            .parse::<u32>()
            .map_err(|_| ParseError::InvalidVersion {
                extension: name.to_string(),
                value: value.to_string(),
            })?,
        None => {
            tracing::warn!(extension = name, "no spec version; treating as unimplemented");
            0
        }
    };

    let mut extension = Extension::new(name, version);
    extension.scope = match node.attribute("type") {
        Some("instance") => Some(ExtensionScope::Instance),
        Some("device") => Some(ExtensionScope::Device),
        _ => None,
    };
    extension.guard = node
        .attribute("protect")
        .or_else(|| {
            node.attribute("platform")
                .and_then(|p| platforms.get(p).copied())
        })
        .map(str::to_string);
    Ok(extension)
}
