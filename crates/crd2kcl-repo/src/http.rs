//! Blocking HTTP client
//!
//! Every request in a run is made one after the other, so a blocking client is
//! all that's needed.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use crd2kcl_core::{CoreError, Fetcher};

use crate::error::{RepoError, Result};

/// Request timeout in seconds
pub const TIMEOUT_SECS: u64 = 30;

/// HTTP client with status checking
pub struct HttpClient {
    client: reqwest::blocking::Client,
}

impl HttpClient {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .user_agent(concat!("crd2kcl/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RepoError::NetworkError {
                message: e.to_string(),
            })?;

        Ok(Self { client })
    }

    /// GET a URL, failing on any non-2xx status
    pub fn get(&self, url: &str) -> Result<reqwest::blocking::Response> {
        tracing::debug!(url, "GET");
        let response = self.client.get(url).send()?;
        let status = response.status();

        if !status.is_success() {
            return Err(RepoError::HttpError {
                status: status.as_u16(),
                message: format!("Request to {} failed", url),
            });
        }

        Ok(response)
    }

    /// Fetch a URL as text
    pub fn get_text(&self, url: &str) -> Result<String> {
        let response = self.get(url)?;
        let text = response.text().map_err(|e| RepoError::NetworkError {
            message: e.to_string(),
        })?;
        Ok(text)
    }

    /// Stream a URL's body into `dest`, replacing any existing file
    pub fn download_to(&self, url: &str, dest: &Path) -> Result<u64> {
        let mut response = self.get(url)?;

        let mut out = BufWriter::new(File::create(dest)?);
        let written = response.copy_to(&mut out)?;
        out.flush()?;

        tracing::debug!(url, dest = %dest.display(), bytes = written, "downloaded");
        Ok(written)
    }
}

/// [`Fetcher`] over HTTP(S)
pub struct HttpFetcher {
    client: HttpClient,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: HttpClient::new()?,
        })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> crd2kcl_core::Result<()> {
        self.client
            .download_to(url, dest)
            .map(|_| ())
            .map_err(|e| CoreError::fetch(url, e))
    }
}
