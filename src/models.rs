//! Core data models for crlfscan

use crate::error::CrlfError;

/// Default number of concurrent probers
pub const DEFAULT_CONCURRENCY: usize = 25;

/// Default connect timeout and overall request deadline, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Header name and value the injected payload tries to make the server emit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    /// Header name, matched case-insensitively
    pub header: String,
    /// Substring that must appear in one of the header's values
    pub value: String,
}

impl Marker {
    pub fn new(header: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            value: value.into(),
        }
    }
}

impl Default for Marker {
    fn default() -> Self {
        Self::new("X-Injected", "crlfscan")
    }
}

/// Configuration for a scan session
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// HTTP method sent with every candidate
    pub method: String,
    /// Request body, empty for none
    pub data: String,
    /// Raw `Name:Value` header strings, in the order given
    pub headers: Vec<String>,
    /// HTTP/HTTPS proxy URL for the standard client
    pub proxy: Option<String>,
    /// Number of concurrent probers
    pub concurrency: usize,
    /// Connect timeout and overall deadline in seconds
    pub timeout_secs: u64,
    /// Whether the standard client follows redirects
    pub follow_redirects: bool,
    /// Evidence the oracle looks for
    pub marker: Marker,
    /// Print only vulnerable URLs, nothing else
    pub silent: bool,
    /// Print every probed URL and per-candidate errors
    pub verbose: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            method: "GET".to_string(),
            data: String::new(),
            headers: Vec::new(),
            proxy: None,
            concurrency: DEFAULT_CONCURRENCY,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            follow_redirects: true,
            marker: Marker::default(),
            silent: false,
            verbose: false,
        }
    }
}

/// Outcome of probing a single candidate URL
#[derive(Debug)]
pub struct ScanVerdict {
    pub url: String,
    pub vulnerable: bool,
    pub err: Option<CrlfError>,
}

impl ScanVerdict {
    pub fn vulnerable(url: impl Into<String>, vulnerable: bool) -> Self {
        Self {
            url: url.into(),
            vulnerable,
            err: None,
        }
    }

    pub fn failed(url: impl Into<String>, err: CrlfError) -> Self {
        Self {
            url: url.into(),
            vulnerable: false,
            err: Some(err),
        }
    }
}

/// Counters gathered over a complete run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Candidates probed, one per verdict
    pub probed: usize,
    /// Verdicts with `vulnerable == true`
    pub vulnerable: usize,
    /// Verdicts carrying an error
    pub errors: usize,
}

impl ScanSummary {
    /// Folds one verdict into the counters
    pub fn record(&mut self, verdict: &ScanVerdict) {
        self.probed += 1;
        if verdict.vulnerable {
            self.vulnerable += 1;
        }
        if verdict.err.is_some() {
            self.errors += 1;
        }
    }

    /// Adds the counters of another summary
    pub fn merge(&mut self, other: &ScanSummary) {
        self.probed += other.probed;
        self.vulnerable += other.vulnerable;
        self.errors += other.errors;
    }
}
