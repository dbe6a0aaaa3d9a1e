//! screentest Code Generation
//!
//! Turns validated screen specs into Playwright test files:
//! - Scores each test case against a catalog of weighted keyword vocabularies
//! - Renders matching cases with built-in templates
//! - Escalates the rest to a completion backend on a cost-aware model tier
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Pipeline (per screen spec)                │
//! ├─────────────────────────────────────────────────────────────┤
//! │  validate(raw) -> ScreenSpec                                │
//! │    └── for each TestCase, concurrently:                     │
//! │          TemplateSelector::select(test) -> TemplateMatch    │
//! │            ├── should_use_template                          │
//! │            │     └── BuiltinTemplates::render -> code       │
//! │            └── otherwise                                    │
//! │                  └── GenerativeFallback::refine             │
//! │                        ├── select_tier / build_prompt       │
//! │                        ├── CompletionBackend (retried)      │
//! │                        └── UsageRecord { cost, tokens }     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  SpecReport { cases: [CaseOutcome], summary }               │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod catalog;
pub mod error;
pub mod generative;
pub mod pipeline;
pub mod render;
pub mod selector;
pub mod templates;

pub use catalog::{Keyword, TemplateCatalog, TemplatePattern};
pub use error::{CodegenError, CodegenResult, GenerationErrorKind, SyntaxError};
pub use generative::{
    AnthropicBackend, CostEstimate, CostEstimator, CredentialLookup, GenerationFailure,
    GenerationResult, GenerativeFallback, UsageRecord,
};
pub use pipeline::{CaseOutcome, Pipeline, ReportSummary, Resolution, SpecReport};
pub use render::{RenderContext, Template};
pub use selector::{MatchSource, TemplateMatch, TemplateSelector};
pub use templates::BuiltinTemplates;
