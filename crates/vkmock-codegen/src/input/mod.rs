//! Input readers.
//!
//! Each reader produces an IR [`ApiSpec`](crate::ir::ApiSpec).

#[cfg(feature = "input-json")]
mod json;
#[cfg(feature = "input-registry")]
mod registry;

#[cfg(feature = "input-json")]
pub use json::parse_json_model;
#[cfg(feature = "input-registry")]
pub use registry::parse_registry;

/// Error reading an API description.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("malformed XML: {0}")]
    Xml(String),

    #[error("malformed JSON model: {0}")]
    Json(#[from] serde_json::Error),

    #[error("<{element}> is missing required attribute `{attribute}`")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    #[error("<{element}> is missing its <{child}> child")]
    MissingChild {
        element: &'static str,
        child: &'static str,
    },

    #[error("extension `{extension}` has non-numeric version `{value}`")]
    InvalidVersion { extension: String, value: String },

    #[error("unsupported input: {0}")]
    Unsupported(String),
}

/// Input format of an API description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Vulkan XML registry (`vk.xml`).
    Registry,
    /// Serialized [`ApiSpec`](crate::ir::ApiSpec).
    Json,
}

impl InputFormat {
    /// Guess the format from file contents.
    pub fn sniff(content: &str) -> Self {
        match content.trim_start().as_bytes().first() {
            Some(b'{') => InputFormat::Json,
            _ => InputFormat::Registry,
        }
    }
}

/// Parse `content` in the given format.
pub fn parse(content: &str, format: InputFormat) -> Result<crate::ir::ApiSpec, ParseError> {
    match format {
        #[cfg(feature = "input-registry")]
        InputFormat::Registry => parse_registry(content),
        #[cfg(feature = "input-json")]
        InputFormat::Json => parse_json_model(content),
        #[allow(unreachable_patterns)]
        other => Err(ParseError::Unsupported(format!(
            "{other:?} input support is not compiled in"
        ))),
    }
}
