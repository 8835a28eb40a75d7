//! Configuration management for crlfscan

use crate::error::{CrlfError, Result};
use crate::models::ScanConfig;
use reqwest::header::HeaderName;
use serde::Deserialize;
use std::path::Path;

/// File-based configuration structure
#[derive(Debug, Deserialize)]
struct FileConfig {
    scan: Option<ScanSection>,
    marker: Option<MarkerSection>,
    output: Option<OutputSection>,
}

#[derive(Debug, Deserialize)]
struct ScanSection {
    method: Option<String>,
    data: Option<String>,
    headers: Option<Vec<String>>,
    proxy: Option<String>,
    concurrency: Option<usize>,
    timeout_secs: Option<u64>,
    follow_redirects: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct MarkerSection {
    header: Option<String>,
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OutputSection {
    silent: Option<bool>,
    verbose: Option<bool>,
}

/// Loads configuration from a TOML file and merges with defaults
pub fn load_config(path: &Path) -> Result<ScanConfig> {
    let content = std::fs::read_to_string(path).map_err(CrlfError::IoError)?;
    parse_config(&content)
}

/// Parses TOML configuration text over the defaults
pub fn parse_config(content: &str) -> Result<ScanConfig> {
    let file_config: FileConfig = toml::from_str(content)?;

    let mut config = ScanConfig::default();

    if let Some(scan) = file_config.scan {
        if let Some(method) = scan.method {
            config.method = method;
        }
        if let Some(data) = scan.data {
            config.data = data;
        }
        if let Some(headers) = scan.headers {
            config.headers = headers;
        }
        if let Some(proxy) = scan.proxy {
            config.proxy = Some(proxy).filter(|p| !p.is_empty());
        }
        if let Some(concurrency) = scan.concurrency {
            config.concurrency = concurrency;
        }
        if let Some(timeout) = scan.timeout_secs {
            config.timeout_secs = timeout;
        }
        if let Some(follow) = scan.follow_redirects {
            config.follow_redirects = follow;
        }
    }

    if let Some(marker) = file_config.marker {
        if let Some(header) = marker.header {
            config.marker.header = header;
        }
        if let Some(value) = marker.value {
            config.marker.value = value;
        }
    }

    if let Some(output) = file_config.output {
        if let Some(silent) = output.silent {
            config.silent = silent;
        }
        if let Some(verbose) = output.verbose {
            config.verbose = verbose;
        }
    }

    Ok(config)
}

/// CLI values that override the loaded configuration when present
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub method: Option<String>,
    pub data: Option<String>,
    pub headers: Vec<String>,
    pub proxy: Option<String>,
    pub concurrency: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub no_redirects: bool,
    pub marker_header: Option<String>,
    pub marker_value: Option<String>,
    pub silent: bool,
    pub verbose: bool,
}

/// Merges CLI arguments into an existing ScanConfig
pub fn merge_cli_args(config: &mut ScanConfig, cli: CliOverrides) {
    if let Some(m) = cli.method {
        config.method = m;
    }
    if let Some(d) = cli.data {
        config.data = d;
    }
    // CLI headers are appended after file headers, order preserved
    config.headers.extend(cli.headers);
    if let Some(p) = cli.proxy {
        config.proxy = Some(p).filter(|p| !p.is_empty());
    }
    if let Some(c) = cli.concurrency {
        config.concurrency = c;
    }
    if let Some(t) = cli.timeout_secs {
        config.timeout_secs = t;
    }
    if cli.no_redirects {
        config.follow_redirects = false;
    }
    if let Some(h) = cli.marker_header {
        config.marker.header = h;
    }
    if let Some(v) = cli.marker_value {
        config.marker.value = v;
    }
    if cli.silent {
        config.silent = true;
    }
    if cli.verbose {
        config.verbose = true;
    }
}

/// Rejects configurations a scan cannot run with
pub fn validate(config: &ScanConfig) -> Result<()> {
    if config.concurrency == 0 {
        return Err(CrlfError::ConfigError(
            "concurrency must be at least 1".to_string(),
        ));
    }
    if config.timeout_secs == 0 {
        return Err(CrlfError::ConfigError(
            "timeout must be at least 1 second".to_string(),
        ));
    }
    if config.method.trim().is_empty() {
        return Err(CrlfError::ConfigError("method must not be empty".to_string()));
    }
    if HeaderName::from_bytes(config.marker.header.as_bytes()).is_err() {
        return Err(CrlfError::ConfigError(format!(
            "invalid marker header name '{}'",
            config.marker.header
        )));
    }
    if config.marker.value.is_empty() {
        return Err(CrlfError::ConfigError(
            "marker value must not be empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial_config() {
        let config = parse_config(
            r#"
            [scan]
            method = "POST"
            headers = ["Cookie:a=b", "X-Forwarded-For: 127.0.0.1"]
            concurrency = 5

            [marker]
            header = "Set-Cookie"
            "#,
        )
        .expect("valid config");

        assert_eq!(config.method, "POST");
        assert_eq!(config.headers.len(), 2);
        assert_eq!(config.concurrency, 5);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.marker.header, "Set-Cookie");
        assert_eq!(config.marker.value, "crlfscan");
    }

    #[test]
    fn test_empty_proxy_means_direct() {
        let config = parse_config("[scan]\nproxy = \"\"\n").expect("valid config");
        assert!(config.proxy.is_none());
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut config = parse_config("[scan]\nheaders = [\"A:1\"]\n").expect("valid config");
        merge_cli_args(
            &mut config,
            CliOverrides {
                headers: vec!["B:2".to_string()],
                concurrency: Some(3),
                no_redirects: true,
                silent: true,
                ..CliOverrides::default()
            },
        );

        assert_eq!(config.headers, vec!["A:1".to_string(), "B:2".to_string()]);
        assert_eq!(config.concurrency, 3);
        assert!(!config.follow_redirects);
        assert!(config.silent);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = ScanConfig::default();
        assert!(validate(&config).is_ok());

        config.concurrency = 0;
        assert!(validate(&config).is_err());

        config.concurrency = 1;
        config.marker.header = "Bad Header".to_string();
        assert!(validate(&config).is_err());
    }
}
