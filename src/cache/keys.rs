//! Cache key normalization.
//!
//! Every layer of the comic cache is keyed by [`CacheKey`]; there is no other
//! place where URLs are normalized.

use std::fmt;

const SCHEME_MARKERS: [&str; 2] = ["http://", "https://"];
const DEFAULT_SCHEME: &str = "https://";

/// Canonical, scheme-qualified form of a product URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn normalize(raw: &str) -> Self {
        Self(normalize_url(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trim, lowercase, and prefix `https://` when no HTTP(S) scheme is present.
///
/// Idempotent: the output always starts with a scheme marker and carries no
/// surrounding whitespace.
pub fn normalize_url(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    if SCHEME_MARKERS
        .iter()
        .any(|marker| lowered.starts_with(marker))
    {
        lowered
    } else {
        format!("{DEFAULT_SCHEME}{lowered}")
    }
}
