//! Intermediate representation of an API description.
//!
//! All input formats (registry XML, JSON) normalize to this IR before the
//! synthesizer and the output backends see it. The IR is read-only once built.

use serde::{Deserialize, Serialize};

/// A complete API description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSpec {
    /// Features and extensions, in emission order.
    pub features: Vec<Feature>,
    /// Commands, in declaration order.
    pub commands: Vec<Command>,
    /// Type definitions, in declaration order.
    pub types: Vec<TypeDef>,
    /// Extensions, in declaration order.
    pub extensions: Vec<Extension>,
}

/// A feature (core version) or extension grouping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feature {
    /// Feature macro name (e.g., "VK_VERSION_1_0", "VK_KHR_surface").
    pub name: String,
    /// Platform guard wrapped around the whole feature block.
    #[serde(default)]
    pub guard: Option<String>,
}

/// A command (entry point).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Command {
    /// Full API name (e.g., "vkCreateInstance").
    pub name: String,
    #[serde(default)]
    pub params: Vec<Param>,
    #[serde(default)]
    pub return_type: ReturnType,
    /// Feature or extension that introduces the command.
    #[serde(default)]
    pub feature: Option<String>,
    /// Extension guard token gating the command.
    #[serde(default)]
    pub guard: Option<String>,
    /// Explicit lifecycle role; takes precedence over name heuristics.
    #[serde(default)]
    pub role: Option<Role>,
}

/// Lifecycle role of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Creates or allocates handles.
    Acquire,
    /// Destroys or frees handles.
    Release,
    /// Anything else.
    Plain,
}

/// Return type of a command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnType {
    #[default]
    Void,
    /// A value-returning command (usually `VkResult`).
    Value(String),
}

/// A command parameter or struct member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    /// Base type name (e.g., "VkInstance").
    pub type_name: String,
    /// Declaration text before the name (e.g., "const VkInstanceCreateInfo*").
    #[serde(default)]
    pub decl_prefix: String,
    /// Declaration text after the name (e.g., "[4]").
    #[serde(default)]
    pub decl_suffix: String,
    #[serde(default)]
    pub is_pointer: bool,
    /// Length expression for array-valued parameters.
    #[serde(default)]
    pub len: Option<String>,
}

/// A named type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDef {
    pub name: String,
    pub kind: TypeKind,
    /// Members of structs and unions.
    #[serde(default)]
    pub members: Vec<Param>,
    /// Feature or extension that introduces the type.
    #[serde(default)]
    pub feature: Option<String>,
}

/// Classification of a named type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    DispatchableHandle,
    NonDispatchableHandle,
    Struct,
    Union,
    Enum,
    Other,
}

/// An extension declared by the description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Extension {
    pub name: String,
    /// Spec version; zero means not implemented.
    pub version: u32,
    #[serde(default)]
    pub scope: Option<ExtensionScope>,
    /// Platform guard token (e.g., "VK_USE_PLATFORM_XLIB_KHR").
    #[serde(default)]
    pub guard: Option<String>,
}

/// Whether an extension is enumerated by the instance or by a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtensionScope {
    Instance,
    Device,
}

impl ApiSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_feature(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    pub fn add_command(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn add_type(&mut self, ty: TypeDef) {
        self.types.push(ty);
    }

    pub fn add_extension(&mut self, extension: Extension) {
        self.extensions.push(extension);
    }
}

impl Feature {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            guard: None,
        }
    }

    pub fn with_guard(mut self, guard: impl Into<String>) -> Self {
        self.guard = Some(guard.into());
        self
    }
}

impl Command {
    pub fn new(name: impl Into<String>, params: Vec<Param>) -> Self {
        Self {
            name: name.into(),
            params,
            return_type: ReturnType::Void,
            feature: None,
            guard: None,
            role: None,
        }
    }

    pub fn returning(mut self, ty: impl Into<String>) -> Self {
        self.return_type = ReturnType::Value(ty.into());
        self
    }

    pub fn in_feature(mut self, feature: impl Into<String>) -> Self {
        self.feature = Some(feature.into());
        self
    }

    pub fn with_guard(mut self, guard: impl Into<String>) -> Self {
        self.guard = Some(guard.into());
        self
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// The parameter inspected for lifecycle inference.
    pub fn last_param(&self) -> Option<&Param> {
        self.params.last()
    }

    pub fn returns_value(&self) -> bool {
        matches!(self.return_type, ReturnType::Value(_))
    }
}

impl ReturnType {
    /// C spelling of the return type.
    pub fn as_c(&self) -> &str {
        match self {
            ReturnType::Void => "void",
            ReturnType::Value(ty) => ty,
        }
    }
}

impl Param {
    /// A by-value parameter (`VkDevice device`).
    pub fn value(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        Self {
            name: name.into(),
            decl_prefix: type_name.clone(),
            type_name,
            decl_suffix: String::new(),
            is_pointer: false,
            len: None,
        }
    }

    /// An output pointer parameter (`VkFence* pFence`).
    pub fn out(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        Self {
            name: name.into(),
            decl_prefix: format!("{}*", type_name),
            type_name,
            decl_suffix: String::new(),
            is_pointer: true,
            len: None,
        }
    }

    /// An input pointer parameter (`const VkFenceCreateInfo* pCreateInfo`).
    pub fn input(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        Self {
            name: name.into(),
            decl_prefix: format!("const {}*", type_name),
            type_name,
            decl_suffix: String::new(),
            is_pointer: true,
            len: None,
        }
    }

    pub fn with_len(mut self, len: impl Into<String>) -> Self {
        self.len = Some(len.into());
        self
    }

    pub fn is_array(&self) -> bool {
        self.len.is_some()
    }
}

impl TypeDef {
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            members: Vec::new(),
            feature: None,
        }
    }

    pub fn structure(name: impl Into<String>, members: Vec<Param>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Struct,
            members,
            feature: None,
        }
    }

    pub fn in_feature(mut self, feature: impl Into<String>) -> Self {
        self.feature = Some(feature.into());
        self
    }
}

impl TypeKind {
    pub fn is_handle(self) -> bool {
        matches!(
            self,
            TypeKind::DispatchableHandle | TypeKind::NonDispatchableHandle
        )
    }

    /// C keyword used for aggregate typedefs.
    pub fn aggregate_keyword(self) -> Option<&'static str> {
        match self {
            TypeKind::Struct => Some("struct"),
            TypeKind::Union => Some("union"),
            _ => None,
        }
    }
}

impl Extension {
    pub fn new(name: impl Into<String>, version: u32) -> Self {
        Self {
            name: name.into(),
            version,
            scope: None,
            guard: None,
        }
    }

    pub fn with_scope(mut self, scope: ExtensionScope) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn with_guard(mut self, guard: impl Into<String>) -> Self {
        self.guard = Some(guard.into());
        self
    }

    /// Version zero marks an extension the description does not implement.
    pub fn is_implemented(&self) -> bool {
        self.version != 0
    }

    /// Declared scope; unscoped extensions are device extensions.
    pub fn effective_scope(&self) -> ExtensionScope {
        self.scope.unwrap_or(ExtensionScope::Device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_spec_programmatically() {
        let mut spec = ApiSpec::new();
        spec.add_feature(Feature::new("VK_VERSION_1_0"));
        spec.add_type(TypeDef::new("VkDevice", TypeKind::DispatchableHandle));
        spec.add_type(TypeDef::new("VkFence", TypeKind::NonDispatchableHandle));
        spec.add_command(
            Command::new(
                "vkCreateFence",
                vec![
                    Param::value("device", "VkDevice"),
                    Param::input("pCreateInfo", "VkFenceCreateInfo"),
                    Param::out("pFence", "VkFence"),
                ],
            )
            .returning("VkResult")
            .in_feature("VK_VERSION_1_0"),
        );

        let cmd = &spec.commands[0];
        assert!(cmd.returns_value());
        assert_eq!(cmd.last_param().map(|p| p.name.as_str()), Some("pFence"));
        assert_eq!(cmd.params[1].decl_prefix, "const VkFenceCreateInfo*");
    }

    #[test]
    fn unscoped_extension_is_device() {
        let ext = Extension::new("VK_KHR_swapchain", 70);
        assert_eq!(ext.effective_scope(), ExtensionScope::Device);
        assert!(ext.is_implemented());
        assert!(!Extension::new("VK_NV_placeholder", 0).is_implemented());
    }

    #[test]
    fn spec_deserializes_with_defaults() {
        let json = serde_json::json!({
            "commands": [
                { "name": "vkCmdDraw", "params": [] }
            ],
            "types": [
                { "name": "VkBuffer", "kind": "non_dispatchable_handle" }
            ],
            "extensions": [
                { "name": "VK_KHR_surface", "version": 25, "scope": "instance" }
            ]
        });
        let spec: ApiSpec = serde_json::from_value(json).unwrap();
        assert_eq!(spec.commands[0].return_type, ReturnType::Void);
        assert_eq!(spec.types[0].kind, TypeKind::NonDispatchableHandle);
        assert_eq!(
            spec.extensions[0].scope,
            Some(ExtensionScope::Instance)
        );
    }
}
