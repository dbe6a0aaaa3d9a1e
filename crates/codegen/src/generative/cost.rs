//! Token pricing and pre-flight cost estimates

use serde::{Deserialize, Serialize};

use screentest_common::config::{GeneratorConfig, PricingConfig, TierConfig, TierPricing};
use screentest_common::{ModelTier, TestCase};

use super::prompt::build_prompt;
use super::tier::select_tier;

/// Characters assumed per input token when estimating
pub const CHARS_PER_TOKEN: usize = 4;

/// USD cost of a call at the given tier rates
pub fn cost_usd(pricing: &TierPricing, input_tokens: u64, output_tokens: u64) -> f64 {
    input_tokens as f64 / 1_000_000.0 * pricing.input_per_million
        + output_tokens as f64 / 1_000_000.0 * pricing.output_per_million
}

/// Heuristic input token count for a prompt
pub fn estimate_tokens(prompt: &str) -> u64 {
    prompt.chars().count().div_ceil(CHARS_PER_TOKEN) as u64
}

/// Expected cost of generating one test case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostEstimate {
    pub tier: ModelTier,
    pub model: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cost_usd: f64,
}

/// Prices test cases without calling any backend
#[derive(Debug, Clone)]
pub struct CostEstimator {
    tiers: TierConfig,
    pricing: PricingConfig,
    assumed_output_tokens: u64,
}

impl CostEstimator {
    pub fn new(tiers: TierConfig, pricing: PricingConfig, assumed_output_tokens: u64) -> Self {
        Self {
            tiers,
            pricing,
            assumed_output_tokens,
        }
    }

    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self::new(
            config.tiers.clone(),
            config.pricing.clone(),
            config.request.assumed_output_tokens,
        )
    }

    pub fn tiers(&self) -> &TierConfig {
        &self.tiers
    }

    pub fn pricing(&self) -> &PricingConfig {
        &self.pricing
    }

    pub fn estimate(&self, test: &TestCase) -> CostEstimate {
        let tier = select_tier(test, &self.tiers);
        let pricing = self.pricing.for_tier(tier);
        let input_tokens = estimate_tokens(&build_prompt(test));

        CostEstimate {
            tier,
            model: pricing.model.clone(),
            input_tokens,
            output_tokens: self.assumed_output_tokens,
            cost_usd: cost_usd(pricing, input_tokens, self.assumed_output_tokens),
        }
    }
}
