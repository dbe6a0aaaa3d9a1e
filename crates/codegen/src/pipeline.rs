//! Batch pipeline: validate a screen spec, then route every test case through
//! template rendering or generation

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info};

use screentest_common::{
    validate, GeneratorConfig, RawScreenSpec, ScreenSpec, StructuralError, TemplateId, TestCase,
};

use crate::catalog::TemplateCatalog;
use crate::error::{CodegenResult, GenerationErrorKind};
use crate::generative::{GenerationFailure, GenerationResult, GeneratedCode, GenerativeFallback};
use crate::render::kebab_case;
use crate::selector::{TemplateMatch, TemplateSelector};
use crate::templates::BuiltinTemplates;

/// How a test case was turned into code, or why it was not
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "path", rename_all = "snake_case")]
pub enum Resolution {
    Template { template: TemplateId, code: String },
    Generated(GeneratedCode),
    Failed(GenerationFailure),
}

/// Result of processing one test case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseOutcome {
    pub name: String,
    pub decision: TemplateMatch,
    pub resolution: Resolution,
    pub duration_ms: u64,
}

impl CaseOutcome {
    pub fn code(&self) -> Option<&str> {
        match &self.resolution {
            Resolution::Template { code, .. } => Some(code),
            Resolution::Generated(generated) => Some(&generated.code),
            Resolution::Failed(_) => None,
        }
    }

    /// Billed cost, including calls whose output was unusable
    pub fn cost_usd(&self) -> f64 {
        match &self.resolution {
            Resolution::Template { .. } => 0.0,
            Resolution::Generated(generated) => generated.usage.cost_usd,
            Resolution::Failed(failure) => failure.cost_usd(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.resolution, Resolution::Failed(_))
    }
}

/// Totals for one processed spec
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total: usize,
    pub templated: usize,
    pub generated: usize,
    pub failed: usize,
    pub total_cost_usd: f64,
    pub duration_ms: u64,
}

/// Everything produced for one screen spec
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecReport {
    pub screen: String,
    pub route: Option<String>,
    pub cases: Vec<CaseOutcome>,
    pub summary: ReportSummary,
    pub generated_at: DateTime<Utc>,
}

impl SpecReport {
    /// File name for the code of every produced case, in case order.
    ///
    /// Names look like `user-settings-saves-profile.spec.ts`. A case whose
    /// kebab-case name collides with an earlier one gets a `-2`, `-3`, ...
    /// suffix, so every produced case has its own file.
    pub fn case_file_names(&self) -> Vec<(&CaseOutcome, String)> {
        let screen = kebab_case(&self.screen);
        let mut taken = HashSet::new();

        self.cases
            .iter()
            .filter(|case| case.code().is_some())
            .map(|case| {
                let stem = format!("{}-{}", screen, kebab_case(&case.name));
                let mut name = format!("{}.spec.ts", stem);
                let mut suffix = 2;
                while !taken.insert(name.clone()) {
                    name = format!("{}-{}.spec.ts", stem, suffix);
                    suffix += 1;
                }
                (case, name)
            })
            .collect()
    }

    /// Write every produced test file into `dir`
    pub fn write_code(&self, dir: &Path) -> CodegenResult<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;
        let mut written = Vec::new();
        for (case, name) in self.case_file_names() {
            if let Some(code) = case.code() {
                let path = dir.join(name);
                std::fs::write(&path, code)?;
                debug!("Wrote {}", path.display());
                written.push(path);
            }
        }
        Ok(written)
    }

    /// Write the report as pretty JSON into `dir`
    pub fn write_report(&self, dir: &Path) -> CodegenResult<PathBuf> {
        std::fs::create_dir_all(dir)?;

        let path = dir.join(format!("{}.report.json", kebab_case(&self.screen)));
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;

        info!("Report written to: {}", path.display());
        Ok(path)
    }
}

/// Routes test cases to templates or to generation
pub struct Pipeline {
    selector: TemplateSelector,
    templates: BuiltinTemplates,
    fallback: Option<GenerativeFallback>,
    concurrency: usize,
}

impl Pipeline {
    /// Pipeline without a generative backend; escalated cases fail
    pub fn new(config: &GeneratorConfig) -> CodegenResult<Self> {
        Ok(Self {
            selector: TemplateSelector::new(TemplateCatalog::from_config(&config.selection)),
            templates: BuiltinTemplates::compile()?,
            fallback: None,
            concurrency: config.batch.concurrency.max(1),
        })
    }

    pub fn with_fallback(mut self, fallback: GenerativeFallback) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Validate a raw spec and process all of its test cases
    pub async fn process(
        &self,
        raw: &RawScreenSpec,
        caller: &str,
    ) -> Result<SpecReport, StructuralError> {
        let spec = validate(raw)?;
        Ok(self.process_spec(&spec, caller).await)
    }

    /// Process every case of an already validated spec.
    ///
    /// Cases run concurrently up to the configured limit; outcomes keep the
    /// order of `spec.tests`.
    pub async fn process_spec(&self, spec: &ScreenSpec, caller: &str) -> SpecReport {
        let start = Instant::now();
        info!(
            "Processing {} test case(s) for '{}'...",
            spec.tests.len(),
            spec.screen
        );

        let cases: Vec<CaseOutcome> = stream::iter(&spec.tests)
            .map(|test| self.process_case(spec, test, caller))
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut summary = ReportSummary {
            total: cases.len(),
            templated: 0,
            generated: 0,
            failed: 0,
            total_cost_usd: 0.0,
            duration_ms: start.elapsed().as_millis() as u64,
        };
        for case in &cases {
            match &case.resolution {
                Resolution::Template { .. } => summary.templated += 1,
                Resolution::Generated(_) => summary.generated += 1,
                Resolution::Failed(_) => summary.failed += 1,
            }
            summary.total_cost_usd += case.cost_usd();
        }

        info!(
            "Results for '{}': {} templated, {} generated, {} failed (${:.4}, {} ms)",
            spec.screen,
            summary.templated,
            summary.generated,
            summary.failed,
            summary.total_cost_usd,
            summary.duration_ms
        );

        SpecReport {
            screen: spec.screen.clone(),
            route: spec.route.clone(),
            cases,
            summary,
            generated_at: Utc::now(),
        }
    }

    /// Select, then either render or generate; never both
    pub async fn process_case(&self, spec: &ScreenSpec, test: &TestCase, caller: &str) -> CaseOutcome {
        let start = Instant::now();
        let decision = self.selector.select(test);

        let resolution = if decision.should_use_template {
            Resolution::Template {
                template: decision.template,
                code: self.templates.render(decision.template, spec, test),
            }
        } else {
            match &self.fallback {
                Some(fallback) => match fallback.refine(test, caller).await {
                    GenerationResult::Success(generated) => Resolution::Generated(generated),
                    GenerationResult::Failure(failure) => Resolution::Failed(failure),
                },
                None => Resolution::Failed(GenerationFailure::new(
                    GenerationErrorKind::Credential,
                    "no generative backend configured",
                    false,
                )),
            }
        };

        match &resolution {
            Resolution::Template { template, .. } => info!("✓ {} (template '{}')", test.name, template),
            Resolution::Generated(generated) => info!(
                "✓ {} (generated, {} tier, ${:.4})",
                test.name, generated.usage.tier, generated.usage.cost_usd
            ),
            Resolution::Failed(failure) => {
                error!("✗ {} - {}: {}", test.name, failure.kind, failure.message)
            }
        }

        CaseOutcome {
            name: test.name.clone(),
            decision,
            resolution,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }
}
