//! Discover command - build a configuration from a GitHub directory page
//!
//! The discovered configuration is always written to disk before anything is
//! converted, so the CRD list can be reviewed and the conversion re-run with
//! `crd2kcl convert --config <file>`.

use console::style;
use crd2kcl_core::ModuleConfig;
use crd2kcl_repo::{HttpClient, discover_module};

use super::{Settings, convert};
use crate::error::{CliError, Result};

pub fn run(url: &str, module_name: &str, no_convert: bool, settings: &Settings) -> Result<()> {
    let draft = ModuleConfig::new(module_name, Default::default());
    draft.validate()?;

    let client = HttpClient::new().map_err(|e| CliError::internal(e.to_string()))?;
    let config = discover_module(&client, url, module_name)?;

    if config.crds.is_empty() {
        println!(
            "  {} {}",
            style("⚠").yellow(),
            style(format!("No .yaml files found at {}", url)).yellow()
        );
    } else {
        tracing::debug!(count = config.crds.len(), "discovered CRDs");
    }

    let path = config.default_path(&settings.config_dir);
    config.save_to(&path)?;
    println!(
        "  {} {}",
        style("✓").green().bold(),
        style(format!("JSON configuration saved to {}", path.display())).green()
    );

    if no_convert {
        println!(
            "  {} {}",
            style("ℹ").cyan(),
            style(format!(
                "Run `crd2kcl convert --config {}` to convert",
                path.display()
            ))
            .dim()
        );
        return Ok(());
    }

    // Convert from the file on disk, exactly as a later `convert` run would
    convert::run(&path, settings)
}
