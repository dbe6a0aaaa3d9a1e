//! Error types for code generation

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::render::BlockKind;

/// Template syntax problem, always detected before any substitution happens
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("unbalanced '{construct}' blocks: {opened} opened, {closed} closed")]
    Unbalanced {
        construct: BlockKind,
        opened: usize,
        closed: usize,
    },

    #[error("'{found}' closing tag at offset {offset} does not match the open '{expected}' block")]
    Misnested {
        expected: BlockKind,
        found: BlockKind,
        offset: usize,
    },

    #[error("'{construct}' closing tag at offset {offset} has no open block")]
    UnexpectedClose { construct: BlockKind, offset: usize },

    #[error("'{construct}' block opened at offset {offset} is never closed")]
    Unclosed { construct: BlockKind, offset: usize },

    #[error("'{construct}' block at offset {offset} is missing a name")]
    MissingName { construct: BlockKind, offset: usize },
}

/// Classification of a failed generative call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationErrorKind {
    /// No credential, or the provider rejected it
    Credential,
    /// Provider signalled throttling
    RateLimit,
    /// Malformed request, transport fault or server fault
    Provider,
    /// The call did not finish within the configured timeout
    Timeout,
    /// Anything that could not be classified
    Unknown,
}

impl fmt::Display for GenerationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationErrorKind::Credential => write!(f, "credential"),
            GenerationErrorKind::RateLimit => write!(f, "rate_limit"),
            GenerationErrorKind::Provider => write!(f, "provider"),
            GenerationErrorKind::Timeout => write!(f, "timeout"),
            GenerationErrorKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// Errors raised by the code generation crate
#[derive(Error, Debug)]
pub enum CodegenError {
    #[error("Template syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type CodegenResult<T> = Result<T, CodegenError>;
