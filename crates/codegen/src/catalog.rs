//! Weighted keyword vocabularies for the built-in templates

use serde::{Deserialize, Serialize};

use screentest_common::config::SelectionConfig;
use screentest_common::TemplateId;

/// A keyword and the weight it contributes when found
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    pub term: String,
    pub weight: f64,
}

/// Vocabulary used to score one template against a test case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplatePattern {
    pub id: TemplateId,
    pub keywords: Vec<Keyword>,
    /// Overrides the catalog-wide threshold when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
}

impl TemplatePattern {
    pub fn new(id: TemplateId, keywords: &[(&str, f64)]) -> Self {
        Self {
            id,
            keywords: keywords
                .iter()
                .map(|(term, weight)| Keyword {
                    term: term.to_lowercase(),
                    weight: weight.max(0.0),
                })
                .collect(),
            threshold: None,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn total_weight(&self) -> f64 {
        self.keywords.iter().map(|k| k.weight).sum()
    }
}

/// Immutable, ordered set of template patterns.
///
/// Declaration order matters: when two patterns score the same, the earlier
/// one wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateCatalog {
    patterns: Vec<TemplatePattern>,
    default_threshold: f64,
}

impl TemplateCatalog {
    pub fn new(patterns: Vec<TemplatePattern>, default_threshold: f64) -> Self {
        Self {
            patterns,
            default_threshold,
        }
    }

    /// Built-in catalog with the configured default threshold
    pub fn from_config(config: &SelectionConfig) -> Self {
        Self::new(builtin_patterns(), config.default_threshold)
    }

    /// Built-in catalog with a 0.7 default threshold
    pub fn builtin() -> Self {
        Self::from_config(&SelectionConfig::default())
    }

    pub fn patterns(&self) -> &[TemplatePattern] {
        &self.patterns
    }

    pub fn get(&self, id: TemplateId) -> Option<&TemplatePattern> {
        self.patterns.iter().find(|p| p.id == id)
    }

    pub fn default_threshold(&self) -> f64 {
        self.default_threshold
    }

    /// Effective threshold for a pattern
    pub fn threshold_for(&self, pattern: &TemplatePattern) -> f64 {
        pattern.threshold.unwrap_or(self.default_threshold)
    }

    /// Effective threshold for an identifier, even one missing from the catalog
    pub fn threshold_of(&self, id: TemplateId) -> f64 {
        self.get(id)
            .map(|p| self.threshold_for(p))
            .unwrap_or(self.default_threshold)
    }
}

fn builtin_patterns() -> Vec<TemplatePattern> {
    vec![
        TemplatePattern::new(
            TemplateId::FormSubmission,
            &[
                ("form", 3.0),
                ("submit", 3.0),
                ("fill", 2.0),
                ("field", 1.0),
                ("success", 1.0),
            ],
        ),
        TemplatePattern::new(
            TemplateId::Navigation,
            &[
                ("navigate", 3.0),
                ("link", 2.0),
                ("url", 2.0),
                ("click", 1.0),
                ("page", 1.0),
                ("redirect", 1.0),
            ],
        ),
        TemplatePattern::new(
            TemplateId::ModalDialog,
            &[
                ("modal", 3.0),
                ("dialog", 2.0),
                ("open", 2.0),
                ("close", 2.0),
                ("overlay", 1.0),
            ],
        )
        .with_threshold(0.6),
        TemplatePattern::new(
            TemplateId::ListFilter,
            &[
                ("filter", 3.0),
                ("search", 3.0),
                ("list", 2.0),
                ("results", 2.0),
                ("empty", 1.0),
                ("sort", 1.0),
            ],
        ),
        TemplatePattern::new(
            TemplateId::AuthFlow,
            &[
                ("login", 3.0),
                ("password", 3.0),
                ("sign in", 2.0),
                ("logout", 2.0),
                ("email", 1.0),
                ("session", 1.0),
            ],
        )
        .with_threshold(0.65),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_covers_every_template_in_order() {
        let catalog = TemplateCatalog::builtin();
        let ids: Vec<TemplateId> = catalog.patterns().iter().map(|p| p.id).collect();
        assert_eq!(ids, TemplateId::ALL.to_vec());
    }

    #[test]
    fn test_thresholds_fall_back_to_default() {
        let catalog = TemplateCatalog::from_config(&SelectionConfig {
            default_threshold: 0.5,
        });
        assert_eq!(catalog.threshold_of(TemplateId::Navigation), 0.5);
        assert_eq!(catalog.threshold_of(TemplateId::ModalDialog), 0.6);
    }

    #[test]
    fn test_keywords_are_lowercased_and_non_negative() {
        let pattern = TemplatePattern::new(TemplateId::Navigation, &[("URL", 2.0), ("bad", -1.0)]);
        assert_eq!(pattern.keywords[0].term, "url");
        assert_eq!(pattern.keywords[1].weight, 0.0);
        assert_eq!(pattern.total_weight(), 2.0);
    }
}
