//! CRD discovery from a GitHub directory page
//!
//! GitHub renders tree pages (`https://github.com/<owner>/<repo>/tree/<ref>/<dir>`)
//! with the directory listing embedded as JSON in a
//! `<script type="application/json" data-target="react-app.embeddedData">` tag.
//! Every `.yaml` entry of that listing becomes one CRD source, downloaded from
//! `raw.githubusercontent.com`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use url::Url;

use crd2kcl_core::ModuleConfig;

use crate::error::{RepoError, Result};
use crate::http::HttpClient;

static SCRIPT_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script([^>]*)>(.*?)</script>").expect("valid regex"));

const GITHUB_PREFIX: &str = "https://github.com/";
const RAW_PREFIX: &str = "https://raw.githubusercontent.com/";

#[derive(Debug, Deserialize)]
struct EmbeddedData {
    payload: Payload,
}

#[derive(Debug, Deserialize)]
struct Payload {
    tree: Tree,
}

#[derive(Debug, Deserialize)]
struct Tree {
    items: Vec<TreeItem>,
}

#[derive(Debug, Deserialize)]
struct TreeItem {
    name: String,
}

/// Fetch a listing page and map every `.yaml` file in it to its raw URL
pub fn discover(client: &HttpClient, listing_url: &str) -> Result<BTreeMap<String, String>> {
    Url::parse(listing_url).map_err(|e| RepoError::InvalidListingUrl {
        url: listing_url.to_string(),
        reason: e.to_string(),
    })?;

    tracing::debug!(url = listing_url, "fetching listing page");
    let html = client.get_text(listing_url)?;
    parse_listing(&html, listing_url)
}

/// Discover a listing page and wrap the result as a module configuration
pub fn discover_module(
    client: &HttpClient,
    listing_url: &str,
    module_name: &str,
) -> Result<ModuleConfig> {
    let crds = discover(client, listing_url)?;
    Ok(ModuleConfig::new(module_name, crds))
}

/// Extract the CRD links from a listing page's HTML
pub fn parse_listing(html: &str, listing_url: &str) -> Result<BTreeMap<String, String>> {
    let json = embedded_data(html).ok_or_else(|| RepoError::EmbeddedDataNotFound {
        url: listing_url.to_string(),
    })?;

    let data: EmbeddedData =
        serde_json::from_str(json).map_err(|e| RepoError::EmbeddedDataInvalid {
            message: e.to_string(),
        })?;

    let base = raw_base_url(listing_url);
    tracing::debug!(base = %base, "raw data URL");

    let crds = data
        .payload
        .tree
        .items
        .into_iter()
        .filter(|item| item.name.ends_with(".yaml"))
        .map(|item| {
            let link = format!("{}/{}", base, item.name);
            tracing::debug!(link = %link, "found raw link");
            (item.name, link)
        })
        .collect();

    Ok(crds)
}

/// Turn a `github.com/.../tree/<ref>/<dir>` URL into its raw content base
pub fn raw_base_url(listing_url: &str) -> String {
    let raw = listing_url.replacen(GITHUB_PREFIX, RAW_PREFIX, 1);
    let raw = raw.replacen("/tree/", "/", 1);
    raw.trim_end_matches('/').to_string()
}

fn embedded_data(html: &str) -> Option<&str> {
    SCRIPT_TAG.captures_iter(html).find_map(|caps| {
        let attrs = caps.get(1)?.as_str();
        let is_embedded = attrs.contains(r#"type="application/json""#)
            && attrs.contains(r#"data-target="react-app.embeddedData""#);
        if !is_embedded {
            return None;
        }
        caps.get(2).map(|m| m.as_str().trim())
    })
}
