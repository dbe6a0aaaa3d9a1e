//! screentest CLI - Main Entry Point
//!
//! Validates screen specs, previews template selection and cost, and compiles
//! specs into Playwright test files.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use screentest_cli::commands::{config, estimate, generate, render, select, validate};
use screentest_cli::output;
use screentest_common::{GeneratorConfig, DEFAULT_CONFIG_FILE};

/// screentest - Screen specs to Playwright tests
#[derive(Parser)]
#[command(name = "screentest")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file
    #[arg(long, env = "SCREENTEST_CONFIG", default_value = DEFAULT_CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check specs for structural problems
    Validate(validate::ValidateArgs),

    /// Show template selection for every test case
    Select(select::SelectArgs),

    /// Render or inspect a template
    Render(render::RenderArgs),

    /// Estimate generation cost without calling a model
    Estimate(estimate::EstimateArgs),

    /// Compile specs into Playwright test files
    Generate(generate::GenerateArgs),

    /// Inspect or create configuration
    #[command(subcommand)]
    Config(config::ConfigCommands),

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = GeneratorConfig::load(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;

    match cli.command {
        Commands::Validate(args) => validate::execute(args, cli.format).await?,
        Commands::Select(args) => select::execute(args, &config, cli.format).await?,
        Commands::Render(args) => render::execute(args, cli.format).await?,
        Commands::Estimate(args) => estimate::execute(args, &config, cli.format).await?,
        Commands::Generate(args) => generate::execute(args, &config, cli.format).await?,
        Commands::Config(cmd) => config::execute(cmd, &config, cli.format).await?,
        Commands::Version => {
            println!("screentest v{}", screentest_common::VERSION);
            println!("Screen specs to Playwright tests, by template or by model");
        }
    }

    Ok(())
}
