//! crd2kcl Core - turn Kubernetes CRDs into KCL modules laid out by API version
//!
//! This crate holds everything that has actual decision logic in the pipeline:
//!
//! - [`version`]: extract an API version tag (`v1`, `v1beta1`, ...) from a resource name
//! - [`converter`]: place one converted file under `<batch root>/<tag>/`
//! - [`layout`]: relocate converted files by tag and drop duplicated `regex_match` helpers
//! - [`compact`]: remove directories left empty, until nothing changes
//! - [`job`]: run a whole batch (fetch, convert, organize, compact)
//!
//! Network access and the external `kcl` process are behind the [`Fetcher`] and
//! [`Converter`] traits so the layout logic can run against temporary directories.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use crd2kcl_core::{Job, KclConverter, ModuleConfig};
//! # fn example(fetcher: &dyn crd2kcl_core::Fetcher) -> crd2kcl_core::Result<()> {
//! let config = ModuleConfig::load(Path::new("config/prometheus.json"))?;
//! let converter = KclConverter::new("kcl");
//!
//! let report = Job::new(fetcher, &converter).run(&config, Path::new("modules"))?;
//! println!("Converted {} CRDs", report.outputs.len());
//! # Ok(())
//! # }
//! ```

pub mod compact;
pub mod config;
pub mod converter;
pub mod error;
pub mod job;
pub mod layout;
pub mod version;

// Re-exports
pub use compact::{CompactReport, compact};
pub use config::ModuleConfig;
pub use converter::{Converter, KclConverter, convert_crd, output_file_name, source_stem};
pub use error::{CoreError, Result};
pub use job::{Fetcher, Job, JobEvent, JobReport};
pub use layout::{BOILERPLATE_LINE, DedupeReport, OrganizeReport, dedupe_boilerplate, organize};
pub use version::{KNOWN_API_VERSIONS, VersionTag, classify};
