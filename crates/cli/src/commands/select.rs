//! Select Command
//!
//! Shows which template each test case would use, or why it escalates.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

use screentest_codegen::{TemplateCatalog, TemplateSelector};
use screentest_common::{validate, GeneratorConfig};

use crate::output::{percent, print_list, OutputFormat, TableDisplay};
use crate::specs;

#[derive(Args)]
pub struct SelectArgs {
    /// Spec files or directories
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Show every template's score, not just the best one
    #[arg(short, long)]
    pub all: bool,

    /// Print a one-line rationale per test case
    #[arg(short, long)]
    pub explain: bool,
}

/// Selection decision for one test case
#[derive(Serialize, Clone)]
pub struct SelectionRow {
    pub screen: String,
    pub test: String,
    pub template: String,
    pub score: f64,
    pub threshold: f64,
    pub matched_keywords: Vec<String>,
    pub use_template: bool,
}

impl TableDisplay for SelectionRow {
    fn headers() -> Vec<&'static str> {
        vec!["Screen", "Test", "Template", "Score", "Threshold", "Matched", "Decision"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.screen.clone(),
            self.test.clone(),
            self.template.clone(),
            percent(self.score),
            percent(self.threshold),
            self.matched_keywords.join(", "),
            if self.use_template {
                "template".to_string()
            } else {
                "generative".to_string()
            },
        ]
    }
}

pub async fn execute(args: SelectArgs, config: &GeneratorConfig, format: OutputFormat) -> Result<()> {
    let selector = TemplateSelector::new(TemplateCatalog::from_config(&config.selection));
    let files = specs::load_all(&args.inputs)?;

    let mut rows = Vec::new();
    let mut explanations = Vec::new();

    for file in &files {
        let spec = validate(&file.raw)?;
        for test in &spec.tests {
            if args.explain {
                explanations.push(format!(
                    "{} / {}: {}",
                    spec.screen.bold(),
                    test.name,
                    selector.explain(test)
                ));
            }

            if args.all {
                for score in selector.score_all(test) {
                    rows.push(SelectionRow {
                        screen: spec.screen.clone(),
                        test: test.name.clone(),
                        template: score.template.to_string(),
                        use_template: score.score >= score.threshold,
                        score: score.score,
                        threshold: score.threshold,
                        matched_keywords: score.matched_keywords,
                    });
                }
            } else {
                let decision = selector.select(test);
                rows.push(SelectionRow {
                    screen: spec.screen.clone(),
                    test: test.name.clone(),
                    template: decision.template.to_string(),
                    score: decision.score,
                    threshold: decision.threshold,
                    matched_keywords: decision.matched_keywords,
                    use_template: decision.should_use_template,
                });
            }
        }
    }

    print_list(&rows, format);
    for line in explanations {
        println!("{}", line);
    }
    Ok(())
}
