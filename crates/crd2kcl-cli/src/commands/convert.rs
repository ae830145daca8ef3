//! Convert command - build a KCL module from a configuration file
//!
//! Downloads every CRD listed in the configuration, converts it with `kcl`,
//! lays the results out by API version and prints a summary.

use console::style;
use crd2kcl_core::{Job, JobReport, KclConverter, ModuleConfig};
use crd2kcl_repo::HttpFetcher;
use std::path::Path;

use super::Settings;
use crate::error::{CliError, Result};

pub fn run(config_path: &Path, settings: &Settings) -> Result<()> {
    let config = ModuleConfig::load(config_path)?;
    run_job(&config, settings)
}

/// Run a conversion job for an already loaded configuration
pub fn run_job(config: &ModuleConfig, settings: &Settings) -> Result<()> {
    let batch_root = config.batch_root(&settings.modules_dir);
    print_header(config, &batch_root);

    let fetcher = HttpFetcher::new().map_err(|e| CliError::internal(e.to_string()))?;
    let converter = KclConverter::new(&settings.converter).verbose(settings.verbose);

    let steps = &settings.steps;
    let job = Job::new(&fetcher, &converter);
    let result = job.run_with(config, &settings.modules_dir, |e| steps.on_event(e));
    steps.finish();
    let report = result?;

    print_layout_notes(&report);
    print_summary(&report);

    println!(
        "  {}",
        style("All tasks completed successfully.").green().bold()
    );
    println!();
    Ok(())
}

fn print_header(config: &ModuleConfig, batch_root: &Path) {
    println!();
    println!(
        "  {} {} {}",
        style("crd2kcl").bold().cyan(),
        style("─").dim(),
        style("CRD → KCL").dim()
    );
    println!();
    println!(
        "  {} {} {}",
        style("Module:").dim(),
        style(&config.module_name).cyan(),
        style(format!("({} CRDs)", config.crds.len())).dim()
    );
    println!(
        "  {} {}",
        style("Target:").dim(),
        style(batch_root.display()).green()
    );
    println!();
}

fn print_layout_notes(report: &JobReport) {
    let Some(organized) = &report.organize else {
        println!(
            "  {} {}",
            style("⚠").yellow(),
            style("Output tree could not be organized (see log above)").yellow()
        );
        println!();
        return;
    };

    if organized.has_failures() || !report.compact.failed.is_empty() {
        println!("  {}", style("Layout Warnings").bold().yellow());
        println!("  {}", style("───────────────").dim());
        for path in &organized.failed {
            println!("  {} not moved: {}", style("⚠").yellow(), path.display());
        }
        for path in &organized.dedupe_failed {
            println!(
                "  {} duplicate regex_match helper not removed: {}",
                style("⚠").yellow(),
                path.display()
            );
        }
        for path in &report.compact.failed {
            println!("  {} not removed: {}", style("⚠").yellow(), path.display());
        }
        println!();
    }
}

fn print_summary(report: &JobReport) {
    println!();
    println!("  {}", style("Summary").bold());
    println!("  {}", style("───────").dim());

    for (version, names) in report.by_version() {
        let label = if version == "unknown" {
            style(format!("{:<10}", version)).yellow()
        } else {
            style(format!("{:<10}", version)).cyan()
        };
        println!(
            "  {} {} file{}",
            label,
            style(format!("{:>3}", names.len())).green().bold(),
            if names.len() == 1 { "" } else { "s" }
        );
    }

    if let Some(organized) = &report.organize {
        if !organized.moved.is_empty() {
            println!(
                "  {} {} relocated",
                style(format!("{:>14}", organized.moved.len())).blue().bold(),
                style("files").dim()
            );
        }
        if !organized.deduplicated.is_empty() {
            println!(
                "  {} {} {}",
                style(format!("{:>14}", organized.deduplicated.len())).blue().bold(),
                style("files").dim(),
                style("had a duplicate regex_match helper removed").dim()
            );
        }
    }

    println!();
}
