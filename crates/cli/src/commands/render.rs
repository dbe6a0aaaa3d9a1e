//! Render Command
//!
//! Renders a template against a context file, or inspects a template's syntax
//! and referenced names.

use anyhow::{bail, Context, Result};
use clap::Args;
use serde_json::Value;
use std::path::{Path, PathBuf};

use screentest_codegen::render::{extract_variables, validate_syntax};
use screentest_codegen::{templates, RenderContext, Template};
use screentest_common::TemplateId;

use crate::output::{print_success, print_value, OutputFormat};

#[derive(Args)]
pub struct RenderArgs {
    /// Template file to render
    #[arg(conflicts_with = "builtin", required_unless_present = "builtin")]
    pub template: Option<PathBuf>,

    /// Use a built-in template instead of a file
    #[arg(long)]
    pub builtin: Option<TemplateId>,

    /// Context file (YAML or JSON mapping)
    #[arg(short, long)]
    pub context: Option<PathBuf>,

    /// Only check syntax
    #[arg(long)]
    pub check: bool,

    /// List the names the template references
    #[arg(long)]
    pub variables: bool,

    /// Write the output to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub async fn execute(args: RenderArgs, format: OutputFormat) -> Result<()> {
    let (label, source) = match (&args.template, args.builtin) {
        (_, Some(id)) => (id.to_string(), templates::source(id).to_string()),
        (Some(path), None) => (
            path.display().to_string(),
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?,
        ),
        (None, None) => bail!("Either a template file or --builtin is required"),
    };

    if args.variables {
        let names: Vec<String> = extract_variables(&source).into_iter().collect();
        match format {
            OutputFormat::Json | OutputFormat::Yaml => print_value(&names, format),
            _ => names.iter().for_each(|name| println!("{}", name)),
        }
        return Ok(());
    }

    if args.check {
        validate_syntax(&source).with_context(|| format!("{} has invalid syntax", label))?;
        print_success(&format!("{} is valid", label));
        return Ok(());
    }

    let template = Template::compile(&source).with_context(|| format!("{} has invalid syntax", label))?;
    let context = match &args.context {
        Some(path) => load_context(path)?,
        None => RenderContext::new(),
    };
    let rendered = template.render(&context);

    match &args.output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            print_success(&format!("Rendered {} to {}", label, path.display()));
        }
        None => print!("{}", rendered),
    }
    Ok(())
}

fn load_context(path: &Path) -> Result<RenderContext> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let value: Value = if path.extension().and_then(|e| e.to_str()) == Some("json") {
        serde_json::from_str(&content)?
    } else {
        serde_yaml::from_str(&content)?
    };

    RenderContext::try_from(value)
        .map_err(|_| anyhow::anyhow!("{} must contain a mapping at the top level", path.display()))
}
