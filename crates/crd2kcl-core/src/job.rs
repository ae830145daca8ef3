//! Batch conversion
//!
//! A job takes a [`ModuleConfig`] and produces `<modules_dir>/<module>/`:
//!
//! 1. download every CRD to `crds/<stem>.yaml`
//! 2. convert each one into `<tag>/<stem>.k`
//! 3. [`organize`] the tree (relocate + dedupe)
//! 4. [`compact`] away empty directories
//!
//! Steps 1 and 2 run entry by entry and stop at the first failure. Steps 3 and
//! 4 never fail the job.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::compact::{CompactReport, compact};
use crate::config::ModuleConfig;
use crate::converter::{Converter, convert_crd, source_stem};
use crate::error::Result;
use crate::layout::{OrganizeReport, organize};

/// Directory under the batch root holding the downloaded sources
pub const SOURCES_DIR: &str = "crds";

/// Something that downloads one URL to one local file
pub trait Fetcher {
    /// Download `url` to `dest`, replacing any existing file
    fn fetch(&self, url: &str, dest: &Path) -> Result<()>;
}

/// Progress notifications emitted while a job runs
#[derive(Debug, Clone, Copy)]
pub enum JobEvent<'a> {
    Fetching { name: &'a str, url: &'a str },
    Fetched { name: &'a str },
    Converting {
        name: &'a str,
        input: &'a Path,
        output_dir: &'a Path,
    },
    Converted { name: &'a str, output: &'a Path },
    Organizing,
    Compacting,
}

/// Outcome of a successful job
#[derive(Debug, Default)]
pub struct JobReport {
    /// `<modules_dir>/<module>`
    pub batch_root: PathBuf,
    /// Logical CRD name -> final location of its KCL file
    pub outputs: BTreeMap<String, PathBuf>,
    /// `None` when the tree could not be walked (logged, not fatal)
    pub organize: Option<OrganizeReport>,
    pub compact: CompactReport,
}

impl JobReport {
    /// Converted files grouped by the version directory they ended up in
    pub fn by_version(&self) -> BTreeMap<String, Vec<&str>> {
        let mut grouped: BTreeMap<String, Vec<&str>> = BTreeMap::new();
        for (name, path) in &self.outputs {
            let version = path
                .parent()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            grouped.entry(version).or_default().push(name.as_str());
        }
        grouped
    }
}

/// One batch conversion run
pub struct Job<'a> {
    fetcher: &'a dyn Fetcher,
    converter: &'a dyn Converter,
}

impl<'a> Job<'a> {
    pub fn new(fetcher: &'a dyn Fetcher, converter: &'a dyn Converter) -> Self {
        Self { fetcher, converter }
    }

    /// Run the job without progress notifications
    pub fn run(&self, config: &ModuleConfig, modules_dir: &Path) -> Result<JobReport> {
        self.run_with(config, modules_dir, |_| {})
    }

    /// Run the job, calling `on_event` before and after each step
    pub fn run_with(
        &self,
        config: &ModuleConfig,
        modules_dir: &Path,
        mut on_event: impl FnMut(JobEvent<'_>),
    ) -> Result<JobReport> {
        config.validate()?;

        let batch_root = config.batch_root(modules_dir);
        let sources_dir = batch_root.join(SOURCES_DIR);
        fs::create_dir_all(&sources_dir)?;

        tracing::debug!(
            module = %config.module_name,
            crds = config.crds.len(),
            root = %batch_root.display(),
            "starting conversion job"
        );

        let mut report = JobReport {
            batch_root: batch_root.clone(),
            ..Default::default()
        };

        for (name, url) in &config.crds {
            let source = sources_dir.join(format!("{}.yaml", source_stem(name)));

            on_event(JobEvent::Fetching { name, url });
            self.fetcher.fetch(url, &source)?;
            on_event(JobEvent::Fetched { name });

            on_event(JobEvent::Converting {
                name,
                input: &source,
                output_dir: &batch_root,
            });
            let output = convert_crd(self.converter, &source, name, &batch_root)?;
            on_event(JobEvent::Converted { name, output: &output });

            report.outputs.insert(name.clone(), output);
        }

        on_event(JobEvent::Organizing);
        match organize(&batch_root) {
            Ok(organized) => {
                for (from, to) in &organized.moved {
                    for output in report.outputs.values_mut() {
                        if output == from {
                            *output = to.clone();
                        }
                    }
                }
                report.organize = Some(organized);
            }
            Err(e) => {
                tracing::warn!("Failed to organize '{}': {}", batch_root.display(), e);
            }
        }

        on_event(JobEvent::Compacting);
        report.compact = compact(&batch_root);

        Ok(report)
    }
}
