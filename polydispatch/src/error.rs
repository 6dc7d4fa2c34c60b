//! Construction-time errors.
//!
//! Everything in this module is raised while registering types or
//! compiling a function, before any call can happen. Call-time failures
//! live in [`crate::dispatch::DispatchError`].

use thiserror::Error;

/// A miswired registry or function declaration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("function `{name}` has no signatures")]
    NoSignatures { name: String },

    #[error("unknown type `{name}`: no guards registered")]
    UnknownType { name: String },

    #[error("function `{name}` declares {count} nullary overloads; at most one is allowed")]
    AmbiguousNullary { name: String, count: usize },
}

/// Result type for construction-time operations.
pub type ConfigResult<T> = Result<T, ConfigurationError>;

/// Failure to load a [`RegistryConfig`](crate::config::RegistryConfig).
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("invalid registry configuration: {0}")]
    Toml(#[from] toml::de::Error),
}
