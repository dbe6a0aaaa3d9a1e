//! Validate Command
//!
//! Checks screen specs for structural problems and reports every violation.

use anyhow::{bail, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use screentest_common::validate;

use crate::output::{print_error, print_list, OutputFormat, TableDisplay};
use crate::specs;

#[derive(Args)]
pub struct ValidateArgs {
    /// Spec files or directories
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,
}

/// Validation status of one spec file
#[derive(Serialize, Clone)]
pub struct SpecStatus {
    pub file: String,
    pub screen: String,
    pub tests: usize,
    pub valid: bool,
    pub violations: Vec<String>,
}

impl TableDisplay for SpecStatus {
    fn headers() -> Vec<&'static str> {
        vec!["File", "Screen", "Tests", "Status"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.file.clone(),
            self.screen.clone(),
            self.tests.to_string(),
            if self.valid {
                "valid".to_string()
            } else {
                format!("{} violation(s)", self.violations.len())
            },
        ]
    }
}

pub async fn execute(args: ValidateArgs, format: OutputFormat) -> Result<()> {
    let files = specs::load_all(&args.inputs)?;

    let statuses: Vec<SpecStatus> = files
        .iter()
        .map(|file| {
            let screen = file.raw.screen.clone().unwrap_or_default();
            let tests = file.raw.tests.as_ref().map(Vec::len).unwrap_or(0);
            let violations = match validate(&file.raw) {
                Ok(_) => Vec::new(),
                Err(err) => err.violations.iter().map(ToString::to_string).collect(),
            };
            SpecStatus {
                file: file.path.display().to_string(),
                screen,
                tests,
                valid: violations.is_empty(),
                violations,
            }
        })
        .collect();

    print_list(&statuses, format);

    let invalid: Vec<&SpecStatus> = statuses.iter().filter(|s| !s.valid).collect();
    if format.is_human() {
        for status in &invalid {
            for violation in &status.violations {
                print_error(&format!("{}: {}", status.file, violation));
            }
        }
    }

    if !invalid.is_empty() {
        bail!("{} of {} spec(s) failed validation", invalid.len(), statuses.len());
    }
    Ok(())
}
