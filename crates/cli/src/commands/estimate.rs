//! Estimate Command
//!
//! Prices generation for the test cases that would escalate, without calling
//! any backend.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use screentest_codegen::{CostEstimator, TemplateCatalog, TemplateSelector};
use screentest_common::{validate, GeneratorConfig};

use crate::output::{print_list, print_message, usd, OutputFormat, TableDisplay};
use crate::specs;

#[derive(Args)]
pub struct EstimateArgs {
    /// Spec files or directories
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Estimate every test case, including those a template would handle
    #[arg(short, long)]
    pub all: bool,
}

/// Estimated generation cost for one test case
#[derive(Serialize, Clone)]
pub struct EstimateRow {
    pub screen: String,
    pub test: String,
    pub tier: String,
    pub model: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cost_usd: f64,
}

impl TableDisplay for EstimateRow {
    fn headers() -> Vec<&'static str> {
        vec!["Screen", "Test", "Tier", "Model", "Input", "Output", "Cost"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.screen.clone(),
            self.test.clone(),
            self.tier.clone(),
            self.model.clone(),
            self.input_tokens.to_string(),
            self.output_tokens.to_string(),
            usd(self.cost_usd),
        ]
    }
}

pub async fn execute(args: EstimateArgs, config: &GeneratorConfig, format: OutputFormat) -> Result<()> {
    let selector = TemplateSelector::new(TemplateCatalog::from_config(&config.selection));
    let estimator = CostEstimator::from_config(config);
    let files = specs::load_all(&args.inputs)?;

    let mut rows = Vec::new();
    for file in &files {
        let spec = validate(&file.raw)?;
        for test in &spec.tests {
            if !args.all && selector.select(test).should_use_template {
                continue;
            }
            let estimate = estimator.estimate(test);
            rows.push(EstimateRow {
                screen: spec.screen.clone(),
                test: test.name.clone(),
                tier: estimate.tier.to_string(),
                model: estimate.model,
                input_tokens: estimate.input_tokens,
                output_tokens: estimate.output_tokens,
                cost_usd: estimate.cost_usd,
            });
        }
    }

    print_list(&rows, format);
    if format.is_human() {
        let total: f64 = rows.iter().map(|r| r.cost_usd).sum();
        print_message(
            &format!("Estimated total: {} for {} case(s)", usd(total), rows.len()),
            format,
        );
    }
    Ok(())
}
