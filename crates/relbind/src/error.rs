//! Facade error types.

use thiserror::Error;

/// Errors raised while opening a mapper or resolving metadata through it.
#[derive(Debug, Error)]
pub enum Error {
    /// Metadata error from the core engine.
    #[error(transparent)]
    Core(#[from] relbind_core::Error),

    /// The driver identifier does not name a supported dialect.
    #[error("no dialect matches driver {0:?}")]
    UnknownDialect(String),

    /// Configuration file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed.
    #[error("config parse error: {0}")]
    Config(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error reflects an invalid static configuration or schema.
    pub fn is_configuration(&self) -> bool {
        match self {
            Error::Core(err) => err.is_configuration(),
            Error::UnknownDialect(_) | Error::Config(_) => true,
            Error::Io(_) => false,
        }
    }
}

/// Result type for facade operations.
pub type Result<T> = std::result::Result<T, Error>;
