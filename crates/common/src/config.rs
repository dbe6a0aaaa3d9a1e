//! Generator configuration
//!
//! All tables that drive selection, tiering, pricing and retries live here as
//! plain values. Components receive them at construction time and never
//! mutate them afterwards.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::ModelTier;

/// Top-level generator configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Template selection settings
    pub selection: SelectionConfig,

    /// Model tier policy
    pub tiers: TierConfig,

    /// Per-tier model and pricing
    pub pricing: PricingConfig,

    /// Retry policy for a single completion call
    pub retry: RetryConfig,

    /// Completion request settings
    pub request: RequestConfig,

    /// Batch processing settings
    pub batch: BatchConfig,
}

/// Template selection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Score a pattern must reach when it does not override the threshold
    pub default_threshold: f64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            default_threshold: 0.7,
        }
    }
}

/// Rules that decide between the fast and capable tiers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierConfig {
    /// Largest step count still eligible for the fast tier
    pub max_fast_steps: usize,

    /// Largest assertion count still eligible for the fast tier
    pub max_fast_assertions: usize,

    /// Any of these in the description or steps forces the capable tier
    pub complexity_keywords: Vec<String>,
}

impl Default for TierConfig {
    fn default() -> Self {
        Self {
            max_fast_steps: 3,
            max_fast_assertions: 3,
            complexity_keywords: [
                "conditional",
                "loop",
                "dynamic",
                "multiple",
                "animation timing",
                "state management",
                "complex",
            ]
            .iter()
            .map(|k| k.to_string())
            .collect(),
        }
    }
}

/// Model and token rates for one tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierPricing {
    /// Provider model identifier
    pub model: String,

    /// USD per million input tokens
    pub input_per_million: f64,

    /// USD per million output tokens
    pub output_per_million: f64,
}

/// Pricing table for both tiers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    pub fast: TierPricing,
    pub capable: TierPricing,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            fast: TierPricing {
                model: "claude-haiku-4-5".to_string(),
                input_per_million: 1.0,
                output_per_million: 5.0,
            },
            capable: TierPricing {
                model: "claude-sonnet-4-5".to_string(),
                input_per_million: 3.0,
                output_per_million: 15.0,
            },
        }
    }
}

impl PricingConfig {
    /// Pricing entry for a tier
    pub fn for_tier(&self, tier: ModelTier) -> &TierPricing {
        match tier {
            ModelTier::Fast => &self.fast,
            ModelTier::Capable => &self.capable,
        }
    }
}

/// Bounded exponential backoff for transient completion failures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts including the first one
    pub max_attempts: u32,

    /// Delay before the second attempt
    pub initial_backoff_ms: u64,

    /// Upper bound for any single delay
    pub max_backoff_ms: u64,

    /// Growth factor between consecutive delays
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 500,
            max_backoff_ms: 8_000,
            multiplier: 2.0,
        }
    }
}

/// Completion request settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestConfig {
    /// Messages endpoint of the completion provider
    pub endpoint: String,

    /// Provider API version header value
    pub api_version: String,

    /// Maximum output tokens requested per call
    pub max_tokens: u32,

    /// Per-attempt timeout
    pub timeout_secs: u64,

    /// Output tokens assumed when estimating cost before a call
    pub assumed_output_tokens: u64,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.anthropic.com/v1/messages".to_string(),
            api_version: "2023-06-01".to_string(),
            max_tokens: 4096,
            timeout_secs: 60,
            assumed_output_tokens: 1_500,
        }
    }
}

/// Batch processing settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Test cases processed at the same time
    pub concurrency: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { concurrency: 4 }
    }
}

impl GeneratorConfig {
    /// Load configuration from file, falling back to defaults when absent
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Serialize as pretty TOML
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = self.to_toml()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject values no component can work with
    pub fn validate(&self) -> Result<()> {
        let threshold = self.selection.default_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(Error::InvalidConfig(format!(
                "selection.default_threshold must be within [0, 1], got {}",
                threshold
            )));
        }

        for (name, pricing) in [("fast", &self.pricing.fast), ("capable", &self.pricing.capable)] {
            if pricing.model.trim().is_empty() {
                return Err(Error::InvalidConfig(format!("pricing.{}.model is empty", name)));
            }
            if pricing.input_per_million < 0.0 || pricing.output_per_million < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "pricing.{} rates must not be negative",
                    name
                )));
            }
        }

        if self.retry.max_attempts == 0 {
            return Err(Error::InvalidConfig("retry.max_attempts must be at least 1".to_string()));
        }
        if self.retry.multiplier < 1.0 {
            return Err(Error::InvalidConfig("retry.multiplier must be at least 1.0".to_string()));
        }
        if self.request.timeout_secs == 0 {
            return Err(Error::InvalidConfig("request.timeout_secs must be positive".to_string()));
        }
        if self.batch.concurrency == 0 {
            return Err(Error::InvalidConfig("batch.concurrency must be positive".to_string()));
        }

        Ok(())
    }
}
