//! CLI commands

use std::path::PathBuf;

use crate::progress::StepLine;

pub mod convert;
pub mod discover;

/// Options shared by every command
#[derive(Debug, Clone)]
pub struct Settings {
    /// Root under which `<module>/` output trees are created
    pub modules_dir: PathBuf,
    /// Where discovered configurations are written
    pub config_dir: PathBuf,
    /// Converter program invoked as `<converter> import -m crd <in> -o <out>`
    pub converter: PathBuf,
    /// Show step detail and converter output
    pub verbose: bool,
    /// Status line, also the log writer
    pub steps: StepLine,
}
