//! JSON model reader.
//!
//! Accepts the serde form of [`ApiSpec`], mainly for hand-authored test
//! models.

use super::ParseError;
use crate::ir::ApiSpec;
use std::collections::HashSet;

/// Parse a JSON-serialized [`ApiSpec`].
pub fn parse_json_model(content: &str) -> Result<ApiSpec, ParseError> {
    let spec: ApiSpec = serde_json::from_str(content)?;

    let mut seen = HashSet::new();
    for ext in &spec.extensions {
        if !seen.insert(ext.name.as_str()) {
            tracing::warn!(extension = %ext.name, "extension listed more than once");
        }
    }

    tracing::debug!(
        commands = spec.commands.len(),
        types = spec.types.len(),
        extensions = spec.extensions.len(),
        "parsed JSON model"
    );
    Ok(spec)
}
