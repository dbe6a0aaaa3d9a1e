//! Structural validation of raw screen specifications
//!
//! Validation never stops at the first problem: every violation found in the
//! input is collected so the author can fix them all in one pass.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::debug;

use crate::types::{
    Priority, RawScreenSpec, RawTestCase, ScreenSpec, TemplateHint, TestCase,
};

/// A single broken invariant in a specification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Location of the offending value, e.g. `tests[2].steps[0]`
    pub path: String,
    pub message: String,
}

impl Violation {
    fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Every violation found in a specification
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("invalid specification ({} violation(s)): {}", .violations.len(), join(.violations))]
pub struct StructuralError {
    pub violations: Vec<Violation>,
}

fn join(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Validate and normalize a raw specification
pub fn validate(raw: &RawScreenSpec) -> Result<ScreenSpec, StructuralError> {
    let mut violations = Vec::new();

    let screen = required_text(raw.screen.as_deref(), "screen", &mut violations);
    let description = required_text(raw.description.as_deref(), "description", &mut violations);
    let route = raw
        .route
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(String::from);

    let mut tests = Vec::new();
    match raw.tests.as_deref() {
        None => violations.push(Violation::new("tests", "is required")),
        Some([]) => violations.push(Violation::new("tests", "must contain at least one test case")),
        Some(raw_tests) => {
            for (index, raw_test) in raw_tests.iter().enumerate() {
                if let Some(test) = validate_test(raw_test, index, &mut violations) {
                    tests.push(test);
                }
            }
        }
    }

    if !violations.is_empty() {
        debug!("Specification rejected with {} violation(s)", violations.len());
        return Err(StructuralError { violations });
    }

    Ok(ScreenSpec {
        screen,
        description,
        route,
        tests,
    })
}

fn validate_test(
    raw: &RawTestCase,
    index: usize,
    violations: &mut Vec<Violation>,
) -> Option<TestCase> {
    let prefix = format!("tests[{}]", index);
    let before = violations.len();

    let name = required_text(raw.name.as_deref(), &format!("{}.name", prefix), violations);
    let description = raw
        .description
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .to_string();

    let steps = trimmed_list(raw.steps.as_deref(), &prefix, "steps", "step", violations);
    let assertions = trimmed_list(
        raw.assertions.as_deref(),
        &prefix,
        "assertions",
        "assertion",
        violations,
    );

    let template_hint = raw.template_hint.as_deref().and_then(|hint| {
        hint.trim()
            .to_lowercase()
            .parse::<TemplateHint>()
            .map_err(|e| violations.push(Violation::new(format!("{}.templateHint", prefix), e.to_string())))
            .ok()
    });

    let priority = raw.priority.as_deref().and_then(|priority| {
        priority
            .trim()
            .to_lowercase()
            .parse::<Priority>()
            .map_err(|e| violations.push(Violation::new(format!("{}.priority", prefix), e.to_string())))
            .ok()
    });

    if violations.len() > before {
        return None;
    }

    Some(TestCase {
        name,
        description,
        steps,
        assertions,
        template_hint,
        priority,
        skip_if_empty: raw.skip_if_empty.unwrap_or(false),
    })
}

fn required_text(value: Option<&str>, path: &str, violations: &mut Vec<Violation>) -> String {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => text.to_string(),
        Some(_) => {
            violations.push(Violation::new(path, "must not be empty"));
            String::new()
        }
        None => {
            violations.push(Violation::new(path, "is required"));
            String::new()
        }
    }
}

fn trimmed_list(
    items: Option<&[String]>,
    prefix: &str,
    field: &str,
    item_label: &str,
    violations: &mut Vec<Violation>,
) -> Vec<String> {
    let path = format!("{}.{}", prefix, field);
    let items = match items {
        None | Some([]) => {
            violations.push(Violation::new(path, format!("must contain at least one {}", item_label)));
            return Vec::new();
        }
        Some(items) => items,
    };

    let mut trimmed = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let item = item.trim();
        if item.is_empty() {
            violations.push(Violation::new(
                format!("{}[{}]", path, i),
                format!("{} is empty after trimming", item_label),
            ));
        } else {
            trimmed.push(item.to_string());
        }
    }
    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TemplateId;
    use test_case::test_case;

    fn raw_test(steps: &[&str], assertions: &[&str]) -> RawTestCase {
        RawTestCase {
            name: Some("submits form".to_string()),
            description: Some("happy path".to_string()),
            steps: Some(steps.iter().map(|s| s.to_string()).collect()),
            assertions: Some(assertions.iter().map(|s| s.to_string()).collect()),
            ..Default::default()
        }
    }

    fn raw_spec(tests: Vec<RawTestCase>) -> RawScreenSpec {
        RawScreenSpec {
            screen: Some("Signup".to_string()),
            description: Some("Account creation".to_string()),
            route: Some(" /signup ".to_string()),
            tests: Some(tests),
        }
    }

    #[test]
    fn test_valid_spec_is_trimmed() {
        let raw = raw_spec(vec![raw_test(&["  fill email  ", "click submit"], &[" welcome shown "])]);
        let spec = validate(&raw).unwrap();
        assert_eq!(spec.route.as_deref(), Some("/signup"));
        assert_eq!(spec.tests[0].steps, vec!["fill email", "click submit"]);
        assert_eq!(spec.tests[0].assertions, vec!["welcome shown"]);
        assert!(!spec.tests[0].skip_if_empty);
    }

    #[test]
    fn test_collects_every_violation() {
        let mut bad_enums = raw_test(&["a"], &["b"]);
        bad_enums.priority = Some("urgent".to_string());
        bad_enums.template_hint = Some("wizard".to_string());

        let raw = RawScreenSpec {
            screen: None,
            description: Some("   ".to_string()),
            route: None,
            tests: Some(vec![raw_test(&[], &["x"]), raw_test(&["x"], &[]), bad_enums]),
        };

        let err = validate(&raw).unwrap_err();
        let paths: Vec<&str> = err.violations.iter().map(|v| v.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "screen",
                "description",
                "tests[0].steps",
                "tests[1].assertions",
                "tests[2].templateHint",
                "tests[2].priority",
            ]
        );
    }

    #[test]
    fn test_blank_step_is_rejected_with_index() {
        let raw = raw_spec(vec![raw_test(&["open page", "   "], &["ok"])]);
        let err = validate(&raw).unwrap_err();
        assert_eq!(err.violations.len(), 1);
        assert_eq!(err.violations[0].path, "tests[0].steps[1]");
    }

    #[test_case(None ; "missing test array")]
    #[test_case(Some(vec![]) ; "empty test array")]
    fn test_requires_tests(tests: Option<Vec<RawTestCase>>) {
        let raw = RawScreenSpec {
            tests,
            ..raw_spec(vec![])
        };
        let err = validate(&raw).unwrap_err();
        assert_eq!(err.violations[0].path, "tests");
    }

    #[test]
    fn test_parses_hint_and_priority() {
        let mut test = raw_test(&["a"], &["b"]);
        test.template_hint = Some("modal-dialog".to_string());
        test.priority = Some("High".to_string());
        test.skip_if_empty = Some(true);

        let spec = validate(&raw_spec(vec![test])).unwrap();
        let case = &spec.tests[0];
        assert_eq!(case.template_hint, Some(TemplateHint::Template(TemplateId::ModalDialog)));
        assert_eq!(case.priority, Some(Priority::High));
        assert!(case.skip_if_empty);
    }

    #[test_case("modal-dialog", TemplateHint::Template(TemplateId::ModalDialog) ; "lowercase")]
    #[test_case(" Modal-Dialog ", TemplateHint::Template(TemplateId::ModalDialog) ; "mixed case")]
    #[test_case("GENERATIVE", TemplateHint::Generative ; "upper sentinel")]
    fn test_hint_is_case_insensitive(hint: &str, expected: TemplateHint) {
        let mut test = raw_test(&["a"], &["b"]);
        test.template_hint = Some(hint.to_string());
        test.priority = Some(" LOW ".to_string());

        let spec = validate(&raw_spec(vec![test])).unwrap();
        assert_eq!(spec.tests[0].template_hint, Some(expected));
        assert_eq!(spec.tests[0].priority, Some(Priority::Low));
    }

    #[test]
    fn test_error_message_lists_all_violations() {
        let raw = RawScreenSpec::default();
        let err = validate(&raw).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("3 violation(s)"));
        assert!(message.contains("screen: is required"));
        assert!(message.contains("tests: is required"));
    }
}
