//! Core types for screen specifications

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Hint value that forces generative synthesis for a test case
pub const GENERATIVE_HINT: &str = "generative";

/// Error returned when a string does not name a known enum variant
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
    pub expected: String,
}

/// Identifier of a built-in, pre-authored test template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateId {
    FormSubmission,
    Navigation,
    ModalDialog,
    ListFilter,
    AuthFlow,
}

impl TemplateId {
    /// Every identifier, in catalog declaration order
    pub const ALL: [TemplateId; 5] = [
        TemplateId::FormSubmission,
        TemplateId::Navigation,
        TemplateId::ModalDialog,
        TemplateId::ListFilter,
        TemplateId::AuthFlow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateId::FormSubmission => "form-submission",
            TemplateId::Navigation => "navigation",
            TemplateId::ModalDialog => "modal-dialog",
            TemplateId::ListFilter => "list-filter",
            TemplateId::AuthFlow => "auth-flow",
        }
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TemplateId {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TemplateId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "template",
                value: s.to_string(),
                expected: TemplateId::ALL
                    .iter()
                    .map(|id| id.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

/// Author-supplied steering for template selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TemplateHint {
    /// Use this template without scoring
    Template(TemplateId),
    /// Skip templates entirely and synthesize the test
    Generative,
}

impl fmt::Display for TemplateHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateHint::Template(id) => write!(f, "{}", id),
            TemplateHint::Generative => write!(f, "{}", GENERATIVE_HINT),
        }
    }
}

impl FromStr for TemplateHint {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == GENERATIVE_HINT {
            return Ok(TemplateHint::Generative);
        }
        s.parse::<TemplateId>()
            .map(TemplateHint::Template)
            .map_err(|mut e| {
                e.kind = "template hint";
                e.expected = format!("{}, {}", e.expected, GENERATIVE_HINT);
                e
            })
    }
}

impl TryFrom<String> for TemplateHint {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TemplateHint> for String {
    fn from(hint: TemplateHint) -> Self {
        hint.to_string()
    }
}

/// Test case priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Medium => write!(f, "medium"),
            Priority::High => write!(f, "high"),
            Priority::Critical => write!(f, "critical"),
        }
    }
}

impl FromStr for Priority {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "critical" => Ok(Priority::Critical),
            other => Err(UnknownVariant {
                kind: "priority",
                value: other.to_string(),
                expected: "low, medium, high, critical".to_string(),
            }),
        }
    }
}

/// Generative model cost tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelTier {
    /// Small, cheap model for simple flows
    Fast,
    /// Larger model for long or stateful flows
    Capable,
}

impl fmt::Display for ModelTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelTier::Fast => write!(f, "fast"),
            ModelTier::Capable => write!(f, "capable"),
        }
    }
}

/// Screen specification exactly as an author wrote it.
///
/// Every field is optional so that a single validation pass can report all
/// problems at once instead of failing at the first missing key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawScreenSpec {
    #[serde(default)]
    pub screen: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub route: Option<String>,
    #[serde(default)]
    pub tests: Option<Vec<RawTestCase>>,
}

impl RawScreenSpec {
    /// Parse a raw specification from YAML text
    pub fn from_yaml(yaml: &str) -> crate::Result<Self> {
        serde_yaml::from_str(yaml).map_err(crate::Error::from)
    }

    /// Parse a raw specification from JSON text
    pub fn from_json(json: &str) -> crate::Result<Self> {
        serde_json::from_str(json).map_err(crate::Error::from)
    }
}

/// A single test case as written by the author
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTestCase {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub steps: Option<Vec<String>>,
    #[serde(default)]
    pub assertions: Option<Vec<String>>,
    #[serde(default)]
    pub template_hint: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub skip_if_empty: Option<bool>,
}

/// A validated screen specification.
///
/// Values of this type are produced by [`crate::validate::validate`]; every
/// test case carries at least one trimmed step and one trimmed assertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenSpec {
    pub screen: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    pub tests: Vec<TestCase>,
}

/// A validated test case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub steps: Vec<String>,
    pub assertions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_hint: Option<TemplateHint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub skip_if_empty: bool,
}
