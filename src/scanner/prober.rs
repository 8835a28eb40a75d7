//! Probes a single candidate: send, judge, report

use crate::http::Sender;
use crate::models::{Marker, ScanVerdict};
use crate::report::{display_url, show_error, Console, ResultWriter};
use std::sync::Arc;
use tracing::debug;

use super::oracle::response_is_vulnerable;

/// Sender, oracle and result sinks for one scan, shared by every worker
pub struct Prober {
    sender: Arc<dyn Sender>,
    marker: Marker,
    console: Console,
    results: Option<Arc<ResultWriter>>,
}

impl Prober {
    pub fn new(sender: Arc<dyn Sender>, marker: Marker, console: Console) -> Self {
        Self {
            sender,
            marker,
            console,
            results: None,
        }
    }

    /// Also appends every vulnerable URL to `writer`
    pub fn with_results(mut self, writer: Arc<ResultWriter>) -> Self {
        self.results = Some(writer);
        self
    }

    /// Sends one request for `url` and produces exactly one verdict.
    ///
    /// Failures are folded into the verdict; a results-file write error is
    /// shown but leaves the verdict untouched.
    pub async fn probe(&self, url: &str) -> ScanVerdict {
        let shown = display_url(url);
        self.console.testing(&shown);

        let verdict = match self.sender.send(url).await {
            Ok(response) => {
                let vulnerable = response_is_vulnerable(&response, &self.marker);
                debug!("{shown} -> {} (vulnerable: {vulnerable})", response.status);
                ScanVerdict::vulnerable(url, vulnerable)
            }
            Err(e) => ScanVerdict::failed(url, e),
        };

        if let Some(ref err) = verdict.err {
            debug!("{shown}: {err}");
            self.console.probe_failed(&shown, err);
        }

        if verdict.vulnerable {
            self.console.vulnerable(&shown);

            if let Some(ref results) = self.results {
                if let Err(e) = results.write_line(&shown).await {
                    show_error(&e.to_string());
                }
            }
        }

        verdict
    }
}
