//! Config Commands

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use std::path::PathBuf;

use screentest_common::{GeneratorConfig, DEFAULT_CONFIG_FILE};

use crate::output::{print_success, print_value, OutputFormat};

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,

    /// Write a configuration file with every default spelled out
    Init(InitArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// Destination file
    #[arg(default_value = DEFAULT_CONFIG_FILE)]
    pub path: PathBuf,

    /// Overwrite an existing file
    #[arg(short, long)]
    pub force: bool,
}

pub async fn execute(cmd: ConfigCommands, config: &GeneratorConfig, format: OutputFormat) -> Result<()> {
    match cmd {
        ConfigCommands::Show => {
            match format {
                OutputFormat::Json | OutputFormat::Yaml => print_value(config, format),
                _ => print!("{}", config.to_toml()?),
            }
            Ok(())
        }
        ConfigCommands::Init(args) => {
            if args.path.exists() && !args.force {
                bail!("{} already exists (use --force to overwrite)", args.path.display());
            }
            GeneratorConfig::default().save(&args.path)?;
            print_success(&format!("Wrote {}", args.path.display()));
            Ok(())
        }
    }
}
