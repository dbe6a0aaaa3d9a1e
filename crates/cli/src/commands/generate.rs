//! Generate Command
//!
//! Runs the full pipeline over screen specs and writes Playwright test files
//! plus one JSON report per screen.

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use screentest_codegen::generative::EnvCredentials;
use screentest_codegen::render::kebab_case;
use screentest_codegen::{AnthropicBackend, GenerativeFallback, Pipeline, Resolution};
use screentest_common::GeneratorConfig;

use crate::output::{print_list, print_success, print_warning, usd, OutputFormat, TableDisplay};
use crate::specs;

#[derive(Args)]
pub struct GenerateArgs {
    /// Spec files or directories
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Directory for generated tests and reports
    #[arg(short, long, default_value = "tests/generated")]
    pub out: PathBuf,

    /// Identity used to look up the API key
    #[arg(long, env = "SCREENTEST_CALLER", default_value = "local")]
    pub caller: String,

    /// Environment variable holding the API key
    #[arg(long, default_value = EnvCredentials::DEFAULT_VAR)]
    pub api_key_env: String,

    /// Templates only; cases that need generation are reported as failed
    #[arg(long)]
    pub offline: bool,
}

/// Outcome of one test case, for display
#[derive(Serialize, Clone)]
pub struct OutcomeRow {
    pub screen: String,
    pub test: String,
    pub path: String,
    pub detail: String,
    pub cost_usd: f64,
}

impl TableDisplay for OutcomeRow {
    fn headers() -> Vec<&'static str> {
        vec!["Screen", "Test", "Path", "Detail", "Cost"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.screen.clone(),
            self.test.clone(),
            self.path.clone(),
            self.detail.clone(),
            usd(self.cost_usd),
        ]
    }
}

pub async fn execute(args: GenerateArgs, config: &GeneratorConfig, format: OutputFormat) -> Result<()> {
    let mut pipeline = Pipeline::new(config)?;
    if !args.offline {
        let backend = AnthropicBackend::new(&config.request).context("Failed to build HTTP client")?;
        let credentials = EnvCredentials::new(&args.api_key_env);
        pipeline = pipeline.with_fallback(GenerativeFallback::new(
            Arc::new(backend),
            Arc::new(credentials),
            config,
        ));
    }

    let files = specs::load_all(&args.inputs)?;
    let mut rows = Vec::new();
    let mut failed = 0;
    let mut total_cost = 0.0;
    let mut screens = HashMap::new();

    for file in &files {
        let report = pipeline
            .process(&file.raw, &args.caller)
            .await
            .with_context(|| format!("Invalid spec {}", file.path.display()))?;
        claim_screen(&mut screens, &report.screen, &file.path)?;

        let written = report.write_code(&args.out)?;
        report.write_report(&args.out)?;
        info!("Wrote {} test file(s) for '{}'", written.len(), report.screen);

        failed += report.summary.failed;
        total_cost += report.summary.total_cost_usd;

        for case in &report.cases {
            let (path, detail) = match &case.resolution {
                Resolution::Template { template, .. } => ("template", template.to_string()),
                Resolution::Generated(generated) => (
                    "generated",
                    format!("{} ({})", generated.usage.model, generated.usage.tier),
                ),
                Resolution::Failed(failure) => ("failed", format!("{}: {}", failure.kind, failure.message)),
            };
            rows.push(OutcomeRow {
                screen: report.screen.clone(),
                test: case.name.clone(),
                path: path.to_string(),
                detail,
                cost_usd: case.cost_usd(),
            });
        }
    }

    print_list(&rows, format);
    if format.is_human() {
        if failed > 0 {
            print_warning(&format!("{} test case(s) could not be generated", failed));
        }
        print_success(&format!(
            "Output written to {} (total cost {})",
            args.out.display(),
            usd(total_cost)
        ));
    }
    Ok(())
}

/// Output files are named after the screen, so two specs for one screen
/// would overwrite each other
fn claim_screen(claimed: &mut HashMap<String, PathBuf>, screen: &str, path: &Path) -> Result<()> {
    let slug = kebab_case(screen);
    if let Some(previous) = claimed.get(&slug) {
        bail!(
            "{} and {} both write output for screen '{}'",
            previous.display(),
            path.display(),
            slug
        );
    }
    claimed.insert(slug, path.to_path_buf());
    Ok(())
}
