//! Scan dispatcher: fans candidate URLs out to a fixed pool of probers

pub mod generator;
pub mod oracle;
pub mod prober;

pub use generator::{is_target_url, CandidateGenerator, PayloadGenerator};
pub use oracle::is_vulnerable;
pub use prober::Prober;

use crate::error::Result;
use crate::http::RequestSender;
use crate::models::{ScanConfig, ScanSummary};
use crate::report::{Console, ResultWriter};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, error, info};

/// Owns the worker pool for one scan
pub struct Dispatcher {
    prober: Arc<Prober>,
    generator: Arc<dyn CandidateGenerator>,
    concurrency: usize,
}

impl Dispatcher {
    /// Creates a dispatcher from its parts
    pub fn new(
        prober: Prober,
        generator: Arc<dyn CandidateGenerator>,
        concurrency: usize,
    ) -> Self {
        Self {
            prober: Arc::new(prober),
            generator,
            concurrency: concurrency.max(1),
        }
    }

    /// Wires the routing sender, payload generator and console from configuration
    pub fn from_config(config: &ScanConfig, results: Option<Arc<ResultWriter>>) -> Result<Self> {
        let sender = Arc::new(RequestSender::from_config(config)?);
        let mut prober = Prober::new(
            sender,
            config.marker.clone(),
            Console::new(config.silent, config.verbose),
        );
        if let Some(writer) = results {
            prober = prober.with_results(writer);
        }
        let generator = Arc::new(PayloadGenerator::new(&config.marker));
        Ok(Self::new(prober, generator, config.concurrency))
    }

    /// Probes every candidate expanded from the URL lines of `target`.
    ///
    /// Workers start before anything is queued; the queue closes once all
    /// candidates are in, and this returns only after every worker exits.
    /// Lines that are not http(s) URLs are skipped.
    pub async fn run(&self, target: &str) -> ScanSummary {
        let (tx, rx) = mpsc::unbounded_channel::<String>();
        let rx = Arc::new(Mutex::new(rx));

        let mut workers = JoinSet::new();
        for id in 0..self.concurrency {
            let rx = Arc::clone(&rx);
            let prober = Arc::clone(&self.prober);

            workers.spawn(async move {
                let mut summary = ScanSummary::default();
                loop {
                    let next = rx.lock().await.recv().await;
                    let Some(url) = next else { break };
                    let verdict = prober.probe(&url).await;
                    summary.record(&verdict);
                }
                debug!("Worker {id} finished after {} candidates", summary.probed);
                summary
            });
        }

        let mut queued = 0usize;
        for line in target.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if !is_target_url(line) {
                debug!("Skipping non-URL target line {line:?}");
                continue;
            }
            for url in self.generator.generate(line) {
                if tx.send(url).is_err() {
                    error!("Work queue closed before all candidates were queued");
                    break;
                }
                queued += 1;
            }
        }
        drop(tx);
        info!("Queued {queued} candidates across {} workers", self.concurrency);

        let mut summary = ScanSummary::default();
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(worker_summary) => summary.merge(&worker_summary),
                Err(e) => error!("Worker task panicked: {e}"),
            }
        }

        info!(
            "Scan complete: {} probed, {} vulnerable, {} errors",
            summary.probed, summary.vulnerable, summary.errors
        );
        summary
    }
}
