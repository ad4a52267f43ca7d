//! Fatal generation errors.

use crate::input::ParseError;

/// An error that aborts a generation run before any artifact is written.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("command `{0}` is declared more than once")]
    DuplicateCommand(String),

    #[error("commands `{first}` and `{second}` both map to symbol `{symbol}`")]
    SymbolCollision {
        symbol: String,
        first: String,
        second: String,
    },

    #[error("unknown backend: {0}")]
    UnknownBackend(String),
}
