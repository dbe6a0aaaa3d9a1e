//! Collaborator seams for generation: credential lookup and completion calls

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::GenerationErrorKind;

/// Resolves the API key to use on behalf of a caller
#[async_trait]
pub trait CredentialLookup: Send + Sync {
    async fn api_key(&self, caller: &str) -> Option<String>;
}

/// A single completion request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub max_tokens: u32,
}

/// Text and token usage returned by a backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    pub text: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// Raw failure reported by a backend, before classification
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("provider returned status {code}: {body}")]
    Status { code: u16, body: String },

    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    /// The request could not be built, e.g. an invalid header value or URL
    #[error("malformed request: {0}")]
    Request(String),

    #[error("could not decode provider response: {0}")]
    Decode(String),
}

impl BackendError {
    /// Map onto the generation error taxonomy, with the retry decision
    pub fn classify(&self) -> (GenerationErrorKind, bool) {
        match self {
            BackendError::Status { code, .. } => match code {
                401 | 403 => (GenerationErrorKind::Credential, false),
                408 => (GenerationErrorKind::Timeout, true),
                429 => (GenerationErrorKind::RateLimit, true),
                500..=599 => (GenerationErrorKind::Provider, true),
                _ => (GenerationErrorKind::Provider, false),
            },
            BackendError::Timeout => (GenerationErrorKind::Timeout, true),
            BackendError::Transport(_) => (GenerationErrorKind::Provider, true),
            BackendError::Request(_) => (GenerationErrorKind::Provider, false),
            BackendError::Decode(_) => (GenerationErrorKind::Unknown, false),
        }
    }
}

/// Something that can turn a prompt into text
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(
        &self,
        request: &CompletionRequest,
        api_key: &str,
    ) -> Result<Completion, BackendError>;
}

/// Reads the key from an environment variable, whoever the caller is
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    var: String,
}

impl EnvCredentials {
    pub const DEFAULT_VAR: &'static str = "ANTHROPIC_API_KEY";

    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvCredentials {
    fn default() -> Self {
        Self::new(Self::DEFAULT_VAR)
    }
}

#[async_trait]
impl CredentialLookup for EnvCredentials {
    async fn api_key(&self, _caller: &str) -> Option<String> {
        std::env::var(&self.var)
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn status(code: u16) -> BackendError {
        BackendError::Status {
            code,
            body: String::new(),
        }
    }

    #[test_case(status(401), GenerationErrorKind::Credential, false)]
    #[test_case(status(403), GenerationErrorKind::Credential, false)]
    #[test_case(status(429), GenerationErrorKind::RateLimit, true)]
    #[test_case(status(400), GenerationErrorKind::Provider, false)]
    #[test_case(status(404), GenerationErrorKind::Provider, false)]
    #[test_case(status(500), GenerationErrorKind::Provider, true)]
    #[test_case(status(529), GenerationErrorKind::Provider, true)]
    #[test_case(BackendError::Timeout, GenerationErrorKind::Timeout, true)]
    #[test_case(BackendError::Transport("reset".into()), GenerationErrorKind::Provider, true)]
    #[test_case(BackendError::Request("invalid header".into()), GenerationErrorKind::Provider, false)]
    #[test_case(BackendError::Decode("eof".into()), GenerationErrorKind::Unknown, false)]
    fn test_classification(error: BackendError, kind: GenerationErrorKind, retryable: bool) {
        assert_eq!(error.classify(), (kind, retryable));
    }

    #[tokio::test]
    async fn test_env_credentials_ignore_missing_and_blank() {
        let lookup = EnvCredentials::new("SCREENTEST_TEST_KEY_THAT_IS_NEVER_SET");
        assert_eq!(lookup.api_key("anyone").await, None);
    }
}
