//! CRD to KCL conversion
//!
//! The schema generation itself is done by an external program (`kcl import -m crd`).
//! This module only decides where each converted file goes and how the program
//! is invoked.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{CoreError, Result};
use crate::version::classify;

/// Extension of generated KCL files
pub const OUTPUT_EXTENSION: &str = "k";

/// Something that turns one CRD YAML file into one KCL file
pub trait Converter {
    /// Convert `input` and write the result to `output`
    ///
    /// `output`'s parent directory already exists when this is called.
    fn convert(&self, input: &Path, output: &Path) -> Result<()>;
}

/// Converter backed by the `kcl` command line
#[derive(Debug, Clone)]
pub struct KclConverter {
    program: PathBuf,
    verbose: bool,
}

impl KclConverter {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            verbose: false,
        }
    }

    /// Forward the program's stdout/stderr instead of discarding them
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn command(&self, input: &Path, output: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("import")
            .args(["-m", "crd"])
            .arg(input)
            .arg("-o")
            .arg(output);

        if self.verbose {
            cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
        } else {
            cmd.stdout(Stdio::null()).stderr(Stdio::null());
        }
        cmd
    }
}

impl Converter for KclConverter {
    fn convert(&self, input: &Path, output: &Path) -> Result<()> {
        tracing::debug!(
            program = %self.program.display(),
            input = %input.display(),
            output = %output.display(),
            "running converter"
        );

        let status = self.command(input, output).status().map_err(|e| {
            CoreError::conversion(
                input,
                format!("failed to run {}: {}", self.program.display(), e),
            )
        })?;

        if !status.success() {
            return Err(CoreError::conversion(
                input,
                format!("{} exited with {}", self.program.display(), status),
            ));
        }

        Ok(())
    }
}

/// Strip a trailing `.yaml` / `.yml` from a logical CRD name
///
/// Names discovered from a listing page carry the extension, names written by
/// hand in a config usually don't; both map to the same files on disk.
pub fn source_stem(logical_name: &str) -> &str {
    logical_name
        .strip_suffix(".yaml")
        .or_else(|| logical_name.strip_suffix(".yml"))
        .unwrap_or(logical_name)
}

/// File name of the converted output for a logical CRD name
pub fn output_file_name(logical_name: &str) -> String {
    format!("{}.{}", source_stem(logical_name), OUTPUT_EXTENSION)
}

/// Convert one fetched CRD into `<batch_root>/<tag>/<stem>.k`
///
/// Returns the path of the generated file.
pub fn convert_crd(
    converter: &dyn Converter,
    input: &Path,
    logical_name: &str,
    batch_root: &Path,
) -> Result<PathBuf> {
    let tag = classify(logical_name);

    let output_dir = batch_root.join(tag.as_str());
    fs::create_dir_all(&output_dir)?;
    let output = output_dir.join(output_file_name(logical_name));

    converter.convert(input, &output)?;
    Ok(output)
}
