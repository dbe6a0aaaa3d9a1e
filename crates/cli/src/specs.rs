//! Loading screen specs from disk

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use screentest_common::RawScreenSpec;

/// A raw spec and the file it came from
#[derive(Debug, Clone)]
pub struct SpecFile {
    pub path: PathBuf,
    pub raw: RawScreenSpec,
}

fn is_spec_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml") | Some("json")
    )
}

/// Parse one spec file; the extension decides between JSON and YAML
pub fn load_file(path: &Path) -> Result<SpecFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let raw = if path.extension().and_then(|e| e.to_str()) == Some("json") {
        RawScreenSpec::from_json(&content)
    } else {
        RawScreenSpec::from_yaml(&content)
    }
    .with_context(|| format!("Failed to parse {}", path.display()))?;

    Ok(SpecFile {
        path: path.to_path_buf(),
        raw,
    })
}

/// Load every spec named on the command line, descending into directories
pub fn load_all(inputs: &[PathBuf]) -> Result<Vec<SpecFile>> {
    let mut specs = Vec::new();

    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(input)
                .into_iter()
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().is_file() && is_spec_file(entry.path()))
                .map(|entry| entry.into_path())
                .collect();
            found.sort();
            debug!("Found {} spec file(s) in {}", found.len(), input.display());

            for path in found {
                specs.push(load_file(&path)?);
            }
        } else if input.exists() {
            specs.push(load_file(input)?);
        } else {
            bail!("No such file or directory: {}", input.display());
        }
    }

    if specs.is_empty() {
        bail!("No spec files found (expected .yaml, .yml or .json)");
    }
    Ok(specs)
}
