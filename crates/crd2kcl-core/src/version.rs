//! API version classification
//!
//! CRD sources are conventionally named `<group>_<kind>_<version>.yaml`, e.g.
//! `monitoring.coreos.com_v1_servicemonitor.yaml` or `certificates_v1beta1.yaml`.
//! The version token is recovered from the first `_v<alphanumerics>` in the name
//! and checked against a closed list; anything else lands in `unknown`.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// API versions recognized as directory names, in dedup iteration order
#[rustfmt::skip]
pub const KNOWN_API_VERSIONS: &[&str] = &[
    "v1", "v2", "v3", "v4", "v5", "v6", "v7", "v8", "v9", "v10",
    "v1alpha1", "v1alpha2", "v1alpha3", "v1alpha4", "v1alpha5",
    "v2alpha1", "v2alpha2", "v2alpha3", "v2alpha4", "v2alpha5",
    "v3alpha1", "v3alpha2", "v3alpha3", "v3alpha4", "v3alpha5",
    "v1beta1", "v1beta2", "v1beta3", "v1beta4", "v1beta5",
    "v2beta1", "v2beta2", "v2beta3", "v2beta4", "v2beta5",
    "v3beta1", "v3beta2", "v3beta3", "v3beta4", "v3beta5",
];

/// Directory name used when no known version is found
pub const UNKNOWN: &str = "unknown";

static VERSION_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"_v([0-9A-Za-z]+)").expect("valid regex"));

/// Version tag derived from a resource name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VersionTag {
    /// One of [`KNOWN_API_VERSIONS`]
    Known(&'static str),
    /// No `_v<token>` in the name, or the token is not a known version
    Unknown,
}

impl VersionTag {
    /// Directory name for this tag
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionTag::Known(v) => *v,
            VersionTag::Unknown => UNKNOWN,
        }
    }

    /// All known tags in declaration order
    pub fn known() -> impl Iterator<Item = VersionTag> {
        KNOWN_API_VERSIONS.iter().map(|v| VersionTag::Known(*v))
    }

    /// Look up a known version by exact, case-sensitive name
    pub fn lookup(candidate: &str) -> Option<VersionTag> {
        KNOWN_API_VERSIONS
            .iter()
            .find(|v| **v == candidate)
            .map(|v| VersionTag::Known(*v))
    }
}

impl fmt::Display for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a resource or file name by API version
///
/// Only the leftmost `_v<token>` is considered: `foo_v2_bar_v1beta1` is `v2`.
/// Never fails; a miss is [`VersionTag::Unknown`].
pub fn classify(name: &str) -> VersionTag {
    let Some(captures) = VERSION_TOKEN.captures(name) else {
        tracing::debug!(name, "no version token found");
        return VersionTag::Unknown;
    };

    let candidate = format!("v{}", &captures[1]);
    match VersionTag::lookup(&candidate) {
        Some(tag) => {
            tracing::debug!(name, version = tag.as_str(), "found known API version");
            tag
        }
        None => {
            tracing::debug!(name, candidate = %candidate, "version token is not a known API version");
            VersionTag::Unknown
        }
    }
}
