//! Module configuration
//!
//! A configuration names one KCL module and the CRDs that go into it:
//!
//! ```json
//! {
//!     "moduleName": "prometheus-operator",
//!     "crds": {
//!         "monitoring.coreos.com_v1_servicemonitors": "https://raw.githubusercontent.com/..."
//!     }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{CoreError, Result};

/// Configuration for one module conversion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleConfig {
    /// Module name, also the directory name under the modules root
    pub module_name: String,

    /// Logical CRD name -> source URL
    #[serde(default)]
    pub crds: BTreeMap<String, String>,
}

impl ModuleConfig {
    pub fn new(module_name: impl Into<String>, crds: BTreeMap<String, String>) -> Self {
        Self {
            module_name: module_name.into(),
            crds,
        }
    }

    /// Load and validate a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => CoreError::ConfigNotFound {
                path: path.to_path_buf(),
            },
            _ => CoreError::Io(e),
        })?;

        let config: Self =
            serde_json::from_str(&content).map_err(|e| CoreError::ConfigParse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Write the configuration as 4-space indented JSON
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut ser)?;
        out.push(b'\n');

        fs::write(path, out)?;
        Ok(())
    }

    /// Where a discovered configuration is persisted: `<config_dir>/<module>.json`
    pub fn default_path(&self, config_dir: &Path) -> PathBuf {
        config_dir.join(format!("{}.json", self.module_name))
    }

    /// Output directory for this module: `<modules_dir>/<module>`
    pub fn batch_root(&self, modules_dir: &Path) -> PathBuf {
        modules_dir.join(&self.module_name)
    }

    /// Check that the module name and every CRD name are usable as file names
    pub fn validate(&self) -> Result<()> {
        if !is_plain_name(&self.module_name) {
            return Err(CoreError::InvalidConfig(format!(
                "moduleName '{}' must be a non-empty plain directory name",
                self.module_name
            )));
        }
        if let Some(name) = self.crds.keys().find(|name| !is_plain_name(name)) {
            return Err(CoreError::InvalidConfig(format!(
                "CRD name '{}' must be a non-empty plain file name",
                name
            )));
        }
        Ok(())
    }
}

/// Non-empty, no path separators, not `.` or `..`
fn is_plain_name(name: &str) -> bool {
    let name = name.trim();
    !name.is_empty() && !name.contains(['/', '\\']) && name != "." && name != ".."
}
