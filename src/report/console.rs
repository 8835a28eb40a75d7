//! Terminal output for probe progress and findings

use colored::Colorize;

/// Renders a URL on a single line.
///
/// Uses the escaped `Debug` form without its surrounding quotes, so raw
/// CR/LF and other control characters print as `\r`, `\n`, `\u{..}`.
pub fn display_url(url: &str) -> String {
    let quoted = format!("{url:?}");
    quoted
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .map(str::to_string)
        .unwrap_or(quoted)
}

/// Prints a diagnostic line to stderr
pub fn show_error(message: &str) {
    eprintln!("[{}] {}", "ERR".red(), message);
}

/// Console output policy for one run
#[derive(Debug, Clone, Copy, Default)]
pub struct Console {
    /// Only vulnerable URLs are printed, undecorated
    pub silent: bool,
    /// Probed URLs and per-candidate errors are printed
    pub verbose: bool,
}

impl Console {
    pub fn new(silent: bool, verbose: bool) -> Self {
        Self { silent, verbose }
    }

    /// Whether `[TST]` lines and per-candidate errors are printed
    pub fn shows_diagnostics(&self) -> bool {
        self.verbose && !self.silent
    }

    /// Announces a candidate about to be probed
    pub fn testing(&self, url: &str) {
        if self.shows_diagnostics() {
            println!("[{}] {}", "TST".blue(), url);
        }
    }

    /// Reports a vulnerable candidate on stdout
    pub fn vulnerable(&self, url: &str) {
        if self.silent {
            println!("{url}");
        } else {
            println!("[{}] {}", "VLN".green(), url.green());
        }
    }

    /// Reports a failed candidate; suppressed unless verbose and not silent
    pub fn probe_failed(&self, url: &str, error: &dyn std::error::Error) {
        if self.shows_diagnostics() {
            show_error(&format!("{url}: {error}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_url_escapes_line_breaks() {
        let shown = display_url("http://a.test/\r\nSet-Cookie: x=1");
        assert_eq!(shown, "http://a.test/\\r\\nSet-Cookie: x=1");
        assert!(!shown.contains('\n'));
    }

    #[test]
    fn test_display_url_plain_unchanged() {
        assert_eq!(display_url("http://a.test/%0d%0a"), "http://a.test/%0d%0a");
    }

    #[test]
    fn test_diagnostics_only_when_verbose_and_not_silent() {
        assert!(Console::new(false, true).shows_diagnostics());
        assert!(!Console::new(false, false).shows_diagnostics());
        assert!(!Console::new(true, true).shows_diagnostics());
        assert!(!Console::new(true, false).shows_diagnostics());
        assert!(!Console::default().shows_diagnostics());
    }

    #[test]
    fn test_display_url_escapes_tab_and_quotes() {
        assert_eq!(display_url("http://a.test/\t\"x\""), "http://a.test/\\t\\\"x\\\"");
    }
}
