//! screentest Common Library
//!
//! Specification model, structural validation, configuration and shared
//! error types for the screentest workspace.

pub mod config;
pub mod error;
pub mod types;
pub mod validate;

// Re-export commonly used types
pub use config::GeneratorConfig;
pub use error::{Error, Result};
pub use types::*;
pub use validate::{validate, StructuralError, Violation};

/// screentest version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "screentest.toml";
