//! Error types for screentest

use thiserror::Error;

use crate::validate::StructuralError;

/// Result type alias using the screentest Error
pub type Result<T> = std::result::Result<T, Error>;

/// screentest error types
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Structural(#[from] StructuralError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML encode error: {0}")]
    TomlEncode(#[from] toml::ser::Error),
}
