//! Generative fallback
//!
//! Test cases no template fits are turned into a prompt, sent to a completion
//! backend on the tier their complexity calls for, and priced from the token
//! usage the backend reports. Every backend failure is reclassified into
//! [`GenerationErrorKind`] and returned as a value.

mod anthropic;
mod backend;
mod cost;
mod prompt;
mod retry;
mod tier;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::{debug, info, warn};

use screentest_common::config::{RequestConfig, RetryConfig};
use screentest_common::{GeneratorConfig, ModelTier, TestCase};

use crate::error::GenerationErrorKind;

pub use anthropic::AnthropicBackend;
pub use backend::{
    BackendError, Completion, CompletionBackend, CompletionRequest, CredentialLookup,
    EnvCredentials,
};
pub use cost::{cost_usd, estimate_tokens, CostEstimate, CostEstimator, CHARS_PER_TOKEN};
pub use prompt::{build_prompt, WORKED_EXAMPLES};
pub use retry::{backoff_delay, with_retry};
pub use tier::select_tier;

/// Cost and usage of one billed backend call, for an external ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub tier: ModelTier,
    pub model: String,
    pub cost_usd: f64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub recorded_at: DateTime<Utc>,
}

/// Code produced by a backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedCode {
    pub code: String,
    pub usage: UsageRecord,
    pub attempts: u32,
}

/// Why generation did not produce code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationFailure {
    pub kind: GenerationErrorKind,
    pub message: String,
    pub retryable: bool,
    /// Backend calls made before giving up
    pub attempts: u32,
    /// Set when the backend answered and billed tokens but the answer was unusable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageRecord>,
}

impl GenerationFailure {
    pub fn new(kind: GenerationErrorKind, message: impl Into<String>, retryable: bool) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable,
            attempts: 0,
            usage: None,
        }
    }

    pub(crate) fn from_backend(error: &BackendError, attempts: u32) -> Self {
        let (kind, retryable) = error.classify();
        Self {
            kind,
            message: error.to_string(),
            retryable,
            attempts,
            usage: None,
        }
    }

    /// Cost of billed calls behind this failure, if any
    pub fn cost_usd(&self) -> f64 {
        self.usage.as_ref().map_or(0.0, |usage| usage.cost_usd)
    }
}

/// Outcome of a generative call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum GenerationResult {
    Success(GeneratedCode),
    Failure(GenerationFailure),
}

impl GenerationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, GenerationResult::Success(_))
    }
}

/// Generates test code for cases the templates cannot handle
#[derive(Clone)]
pub struct GenerativeFallback {
    backend: Arc<dyn CompletionBackend>,
    credentials: Arc<dyn CredentialLookup>,
    estimator: CostEstimator,
    retry: RetryConfig,
    request: RequestConfig,
}

impl GenerativeFallback {
    pub fn new(
        backend: Arc<dyn CompletionBackend>,
        credentials: Arc<dyn CredentialLookup>,
        config: &GeneratorConfig,
    ) -> Self {
        Self {
            backend,
            credentials,
            estimator: CostEstimator::from_config(config),
            retry: config.retry.clone(),
            request: config.request.clone(),
        }
    }

    /// Price a case without calling the backend
    pub fn estimate_cost(&self, test: &TestCase) -> CostEstimate {
        self.estimator.estimate(test)
    }

    /// Generate code for a case on behalf of `caller`
    pub async fn refine(&self, test: &TestCase, caller: &str) -> GenerationResult {
        let tier = select_tier(test, self.estimator.tiers());
        let pricing = self.estimator.pricing().for_tier(tier);

        let api_key = match self.credentials.api_key(caller).await {
            Some(key) if !key.trim().is_empty() => key,
            _ => {
                warn!(caller, test = %test.name, "No API key available");
                return GenerationResult::Failure(GenerationFailure::new(
                    GenerationErrorKind::Credential,
                    format!("no API key available for caller '{}'", caller),
                    false,
                ));
            }
        };

        let request = CompletionRequest {
            model: pricing.model.clone(),
            prompt: build_prompt(test),
            max_tokens: self.request.max_tokens,
        };
        debug!(
            test = %test.name,
            %tier,
            model = %request.model,
            prompt_chars = request.prompt.len(),
            "Requesting generation"
        );

        let timeout = Duration::from_secs(self.request.timeout_secs);
        let backend = self.backend.as_ref();
        let (request_ref, key) = (&request, api_key.as_str());
        let (completion, attempts) = match with_retry(&self.retry, timeout, move || {
            backend.complete(request_ref, key)
        })
        .await
        {
            Ok(done) => done,
            Err(failure) => return GenerationResult::Failure(failure),
        };

        let cost = cost_usd(pricing, completion.input_tokens, completion.output_tokens);
        let usage = UsageRecord {
            tier,
            model: pricing.model.clone(),
            cost_usd: cost,
            input_tokens: completion.input_tokens,
            output_tokens: completion.output_tokens,
            recorded_at: Utc::now(),
        };

        let code = extract_code(&completion.text);
        if code.is_empty() {
            warn!(test = %test.name, cost_usd = cost, "Completion contained no code");
            return GenerationResult::Failure(GenerationFailure {
                kind: GenerationErrorKind::Provider,
                message: "completion contained no code".to_string(),
                retryable: false,
                attempts,
                usage: Some(usage),
            });
        }

        info!(
            test = %test.name,
            %tier,
            input_tokens = completion.input_tokens,
            output_tokens = completion.output_tokens,
            cost_usd = cost,
            "Generated test code"
        );

        GenerationResult::Success(GeneratedCode {
            code,
            usage,
            attempts,
        })
    }
}

fn code_fence() -> Option<&'static Regex> {
    static FENCE: OnceLock<Option<Regex>> = OnceLock::new();
    FENCE
        .get_or_init(|| Regex::new(r"(?s)```[A-Za-z]*[ \t]*\r?\n(.*?)```").ok())
        .as_ref()
}

/// First fenced block of a completion, or the whole text when unfenced
pub fn extract_code(text: &str) -> String {
    let body = code_fence()
        .and_then(|fence| fence.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(text)
        .trim();

    if body.is_empty() {
        String::new()
    } else {
        format!("{}\n", body)
    }
}
