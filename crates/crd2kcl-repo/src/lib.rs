//! crd2kcl source retrieval
//!
//! - [`HttpFetcher`]: downloads CRD sources for a conversion job
//! - [`discovery`]: builds a module configuration from a GitHub directory page
//!
//! ## Example
//!
//! ```rust,no_run
//! use crd2kcl_repo::{HttpClient, discover_module};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new()?;
//! let config = discover_module(
//!     &client,
//!     "https://github.com/cert-manager/cert-manager/tree/master/deploy/crds",
//!     "cert-manager",
//! )?;
//! println!("{} CRDs found", config.crds.len());
//! # Ok(())
//! # }
//! ```

pub mod discovery;
pub mod error;
pub mod http;

// Re-exports for convenience
pub use discovery::{discover, discover_module, parse_listing, raw_base_url};
pub use error::{RepoError, Result};
pub use http::{HttpClient, HttpFetcher};
