//! Model tier policy

use screentest_common::config::TierConfig;
use screentest_common::{ModelTier, TestCase};

/// Fast tier only for short cases whose text carries no complexity keyword
pub fn select_tier(test: &TestCase, config: &TierConfig) -> ModelTier {
    if test.steps.len() > config.max_fast_steps || test.assertions.len() > config.max_fast_assertions {
        return ModelTier::Capable;
    }

    let mut text = test.description.to_lowercase();
    for step in &test.steps {
        text.push(' ');
        text.push_str(&step.to_lowercase());
    }

    let complex = config
        .complexity_keywords
        .iter()
        .any(|keyword| text.contains(keyword.to_lowercase().as_str()));

    if complex {
        ModelTier::Capable
    } else {
        ModelTier::Fast
    }
}
