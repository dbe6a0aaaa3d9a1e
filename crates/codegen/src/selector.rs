//! Template applicability scoring
//!
//! Decides, per test case, whether a built-in template can render the test or
//! whether generation must take over.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

use screentest_common::{TemplateHint, TemplateId, TestCase};

use crate::catalog::{TemplateCatalog, TemplatePattern};

/// Why a decision was reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchSource {
    /// The test named a template explicitly
    Explicit,
    /// The test asked for generation explicitly
    ForcedGenerative,
    /// Keyword scoring against the catalog
    Scored,
}

/// Outcome of template selection for one test case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateMatch {
    pub template: TemplateId,
    /// Normalized score in [0, 1]
    pub score: f64,
    pub matched_keywords: Vec<String>,
    pub threshold: f64,
    pub should_use_template: bool,
    pub source: MatchSource,
}

/// Score of a single pattern, for diagnostics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternScore {
    pub template: TemplateId,
    pub score: f64,
    pub matched_keywords: Vec<String>,
    pub threshold: f64,
}

/// Scores test cases against a catalog
#[derive(Debug, Clone)]
pub struct TemplateSelector {
    catalog: TemplateCatalog,
}

impl TemplateSelector {
    pub fn new(catalog: TemplateCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    /// Pick a template or decide to escalate
    pub fn select(&self, test: &TestCase) -> TemplateMatch {
        let decision = match test.template_hint {
            Some(TemplateHint::Template(id)) => TemplateMatch {
                template: id,
                score: 1.0,
                matched_keywords: Vec::new(),
                threshold: self.catalog.threshold_of(id),
                should_use_template: true,
                source: MatchSource::Explicit,
            },
            Some(TemplateHint::Generative) => {
                let template = self
                    .catalog
                    .patterns()
                    .first()
                    .map(|p| p.id)
                    .unwrap_or(TemplateId::ALL[0]);
                TemplateMatch {
                    template,
                    score: 0.0,
                    matched_keywords: Vec::new(),
                    threshold: self.catalog.threshold_of(template),
                    should_use_template: false,
                    source: MatchSource::ForcedGenerative,
                }
            }
            None => self.best_scored(test),
        };

        debug!(
            test = %test.name,
            template = %decision.template,
            score = decision.score,
            use_template = decision.should_use_template,
            "Template selection"
        );
        decision
    }

    /// Every pattern's score, highest first; equal scores keep catalog order
    pub fn score_all(&self, test: &TestCase) -> Vec<PatternScore> {
        let blob = text_blob(test);
        let mut scores: Vec<PatternScore> = self
            .catalog
            .patterns()
            .iter()
            .map(|pattern| self.score_pattern(pattern, &blob))
            .collect();
        scores.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        scores
    }

    /// Human-readable rationale for the decision on a test case
    pub fn explain(&self, test: &TestCase) -> String {
        let decision = self.select(test);
        let matched = if decision.matched_keywords.is_empty() {
            "none".to_string()
        } else {
            decision.matched_keywords.join(", ")
        };

        match decision.source {
            MatchSource::Explicit => format!(
                "Using template '{}': selected by explicit template hint (scoring skipped)",
                decision.template
            ),
            MatchSource::ForcedGenerative => {
                "Escalating to generative synthesis: template hint forces generation (scoring skipped)"
                    .to_string()
            }
            MatchSource::Scored if decision.should_use_template => format!(
                "Using template '{}': score {:.1}% meets threshold {:.1}% (matched keywords: {})",
                decision.template,
                decision.score * 100.0,
                decision.threshold * 100.0,
                matched
            ),
            MatchSource::Scored => format!(
                "Escalating to generative synthesis: best template '{}' scored {:.1}%, below threshold {:.1}% (matched keywords: {})",
                decision.template,
                decision.score * 100.0,
                decision.threshold * 100.0,
                matched
            ),
        }
    }

    fn best_scored(&self, test: &TestCase) -> TemplateMatch {
        match self.score_all(test).into_iter().next() {
            Some(best) => TemplateMatch {
                template: best.template,
                should_use_template: best.score >= best.threshold,
                score: best.score,
                matched_keywords: best.matched_keywords,
                threshold: best.threshold,
                source: MatchSource::Scored,
            },
            None => TemplateMatch {
                template: TemplateId::ALL[0],
                score: 0.0,
                matched_keywords: Vec::new(),
                threshold: self.catalog.default_threshold(),
                should_use_template: false,
                source: MatchSource::Scored,
            },
        }
    }

    fn score_pattern(&self, pattern: &TemplatePattern, blob: &str) -> PatternScore {
        let total = pattern.total_weight();
        let mut found = 0.0;
        let mut matched_keywords = Vec::new();

        for keyword in &pattern.keywords {
            if blob.contains(keyword.term.as_str()) {
                found += keyword.weight;
                matched_keywords.push(keyword.term.clone());
            }
        }

        let score = if total > 0.0 { found / total } else { 0.0 };
        PatternScore {
            template: pattern.id,
            score,
            matched_keywords,
            threshold: self.catalog.threshold_for(pattern),
        }
    }
}

impl Default for TemplateSelector {
    fn default() -> Self {
        Self::new(TemplateCatalog::builtin())
    }
}

/// Lowercased name, description, steps and assertions in one string
fn text_blob(test: &TestCase) -> String {
    let mut parts: Vec<&str> = vec![test.name.as_str(), test.description.as_str()];
    parts.extend(test.steps.iter().map(String::as_str));
    parts.extend(test.assertions.iter().map(String::as_str));
    parts.join(" ").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use screentest_common::Priority;

    fn case(name: &str, steps: &[&str], assertions: &[&str]) -> TestCase {
        TestCase {
            name: name.to_string(),
            description: String::new(),
            steps: steps.iter().map(|s| s.to_string()).collect(),
            assertions: assertions.iter().map(|s| s.to_string()).collect(),
            template_hint: None,
            priority: Some(Priority::Medium),
            skip_if_empty: false,
        }
    }

    #[test]
    fn test_form_case_selects_form_template() {
        let selector = TemplateSelector::default();
        let test = case(
            "Submit contact form",
            &["Fill the name field", "Click submit"],
            &["Success banner is shown"],
        );
        let decision = selector.select(&test);
        assert_eq!(decision.template, TemplateId::FormSubmission);
        assert_eq!(decision.score, 1.0);
        assert!(decision.should_use_template);
        assert_eq!(decision.source, MatchSource::Scored);
        assert_eq!(decision.matched_keywords, vec!["form", "submit", "fill", "field", "success"]);
    }

    #[test]
    fn test_score_is_weight_ratio() {
        let selector = TemplateSelector::default();
        // form (3) + submit (3) of 10
        let test = case("form", &["submit"], &["done"]);
        let decision = selector.select(&test);
        assert_eq!(decision.template, TemplateId::FormSubmission);
        assert!((decision.score - 0.6).abs() < 1e-9);
        assert!(!decision.should_use_template);
    }

    #[test]
    fn test_matching_is_case_insensitive_substring() {
        let selector = TemplateSelector::default();
        let test = case("LOGIN with Password", &["Sign In"], &["Session starts"]);
        let decision = selector.select(&test);
        assert_eq!(decision.template, TemplateId::AuthFlow);
        // 3 + 3 + 2 + 1 of 12
        assert!((decision.score - 0.75).abs() < 1e-9);
        assert!(decision.should_use_template);
    }

    #[test]
    fn test_ties_go_to_first_declared_pattern() {
        let catalog = TemplateCatalog::new(
            vec![
                TemplatePattern::new(TemplateId::ListFilter, &[("table", 1.0)]),
                TemplatePattern::new(TemplateId::Navigation, &[("table", 5.0)]),
            ],
            0.7,
        );
        let selector = TemplateSelector::new(catalog);
        let decision = selector.select(&case("table view", &["open"], &["rows"]));
        assert_eq!(decision.template, TemplateId::ListFilter);
        assert_eq!(decision.score, 1.0);
    }

    #[test]
    fn test_explicit_hint_skips_scoring() {
        let selector = TemplateSelector::default();
        let mut test = case("anything", &["x"], &["y"]);
        test.template_hint = Some(TemplateHint::Template(TemplateId::ModalDialog));
        let decision = selector.select(&test);
        assert_eq!(decision.template, TemplateId::ModalDialog);
        assert_eq!(decision.score, 1.0);
        assert_eq!(decision.source, MatchSource::Explicit);
        assert!(decision.should_use_template);
    }

    #[test]
    fn test_generative_hint_always_escalates() {
        let selector = TemplateSelector::default();
        let mut test = case(
            "Submit contact form",
            &["Fill the name field", "Click submit"],
            &["Success banner is shown"],
        );
        test.template_hint = Some(TemplateHint::Generative);
        let decision = selector.select(&test);
        assert_eq!(decision.score, 0.0);
        assert!(!decision.should_use_template);
        assert_eq!(decision.source, MatchSource::ForcedGenerative);
    }

    #[test]
    fn test_score_all_is_sorted_descending() {
        let selector = TemplateSelector::default();
        let scores = selector.score_all(&case("search the list", &["type query"], &["results"]));
        assert_eq!(scores.len(), 5);
        assert_eq!(scores[0].template, TemplateId::ListFilter);
        assert!(scores.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_explain_mentions_score_threshold_and_keywords() {
        let selector = TemplateSelector::default();
        let text = selector.explain(&case("form", &["submit"], &["done"]));
        assert!(text.starts_with("Escalating to generative synthesis"));
        assert!(text.contains("60.0%"));
        assert!(text.contains("70.0%"));
        assert!(text.contains("form, submit"));

        let text = selector.explain(&case("open the modal dialog", &["close it"], &["overlay gone"]));
        assert!(text.starts_with("Using template 'modal-dialog'"));
    }
}
