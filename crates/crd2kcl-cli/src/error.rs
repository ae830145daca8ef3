//! CLI error types with exit code handling
//!
//! Every error reaching `main` is fatal: it is rendered through miette and the
//! process exits with the matching code from [`crate::exit_codes`].

use crd2kcl_core::CoreError;
use crd2kcl_repo::RepoError;
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum CliError {
    /// Module configuration missing or invalid
    #[error("Configuration error: {message}")]
    #[diagnostic(code(crd2kcl::cli::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// A CRD source could not be downloaded
    #[error("Download failed: {message}")]
    #[diagnostic(code(crd2kcl::cli::fetch))]
    Fetch { message: String },

    /// The converter failed for one CRD
    #[error("{message}")]
    #[diagnostic(code(crd2kcl::cli::conversion))]
    Conversion {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Listing page discovery failed
    #[error("Discovery failed: {message}")]
    #[diagnostic(code(crd2kcl::cli::discovery))]
    Discovery {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// IO error (file not found, permissions, etc.)
    #[error("IO error: {message}")]
    #[diagnostic(code(crd2kcl::cli::io))]
    Io { message: String },

    /// Internal error (client setup, unexpected failure)
    #[error("Internal error: {message}")]
    #[diagnostic(code(crd2kcl::cli::internal))]
    Internal { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config { .. } => exit_codes::CONFIG_ERROR,
            CliError::Fetch { .. } => exit_codes::FETCH_ERROR,
            CliError::Conversion { .. } => exit_codes::CONVERSION_ERROR,
            CliError::Discovery { .. } => exit_codes::DISCOVERY_ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::Internal { .. } => exit_codes::ERROR,
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConfigNotFound { .. } => CliError::Config {
                message: err.to_string(),
                help: Some(
                    "Create one with `crd2kcl discover --url <github tree url> --name <module>`"
                        .to_string(),
                ),
            },
            CoreError::ConfigParse { .. } | CoreError::InvalidConfig(_) => CliError::Config {
                message: err.to_string(),
                help: Some(
                    r#"Expected {"moduleName": "<name>", "crds": {"<name>": "<url>"}}"#.to_string(),
                ),
            },
            CoreError::FetchFailed { .. } => CliError::Fetch {
                message: err.to_string(),
            },
            CoreError::ConversionFailed { .. } => CliError::Conversion {
                message: err.to_string(),
                help: Some(
                    "Check that `kcl` is installed and on PATH, or pass --converter <program>. \
                     Re-run with --debug to see the converter output."
                        .to_string(),
                ),
            },
            CoreError::Io(e) => CliError::from(e),
            CoreError::Json(e) => CliError::internal(e.to_string()),
        }
    }
}

impl From<RepoError> for CliError {
    fn from(err: RepoError) -> Self {
        let help = match &err {
            RepoError::EmbeddedDataNotFound { .. } | RepoError::EmbeddedDataInvalid { .. } => Some(
                "The URL must point at a GitHub directory page, e.g. \
                 https://github.com/<owner>/<repo>/tree/<branch>/<dir>"
                    .to_string(),
            ),
            _ => None,
        };
        CliError::Discovery {
            message: err.to_string(),
            help,
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
