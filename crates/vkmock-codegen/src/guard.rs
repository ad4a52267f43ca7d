//! Conditional emission wrapper.

use serde::Serialize;

/// An emitted unit that may be gated by an extension guard token.
///
/// The token is opaque: it is carried from the description to the output
/// and rendered as `#ifdef TOKEN ... #endif`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Guarded<T> {
    pub guard: Option<String>,
    pub item: T,
}

impl<T> Guarded<T> {
    pub fn new(guard: Option<String>, item: T) -> Self {
        Self { guard, item }
    }
}

/// Wrap rendered lines in `#ifdef guard` / `#endif` when a guard is present.
pub fn wrap_lines(guard: Option<&str>, lines: Vec<String>) -> Vec<String> {
    match guard {
        None => lines,
        Some(guard) => {
            let mut out = Vec::with_capacity(lines.len() + 2);
            out.push(format!("#ifdef {}", guard));
            out.extend(lines);
            out.push("#endif".to_string());
            out
        }
    }
}

/// Wrap a rendered block, annotating the closing `#endif` with the token.
pub fn wrap_block(guard: Option<&str>, block: &str) -> String {
    match guard {
        None => block.to_string(),
        Some(guard) => format!("#ifdef {guard}\n{block}\n#endif /* {guard} */"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unguarded_lines_pass_through() {
        let lines = vec!["a".to_string()];
        assert_eq!(wrap_lines(None, lines.clone()), lines);
    }

    #[test]
    fn guarded_lines() {
        let lines = wrap_lines(Some("VK_USE_PLATFORM_XCB_KHR"), vec!["row".into()]);
        assert_eq!(lines, ["#ifdef VK_USE_PLATFORM_XCB_KHR", "row", "#endif"]);
    }

    #[test]
    fn guarded_block_names_token() {
        assert_eq!(
            wrap_block(Some("G"), "body"),
            "#ifdef G\nbody\n#endif /* G */"
        );
    }
}
