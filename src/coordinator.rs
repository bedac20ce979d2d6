//! Transfer coordinator — drives a batch of items through one direction
//!
//! The coordinator admits items under bounded concurrency, catches every
//! per-item failure, and aggregates outcomes into a [`BatchReport`] whose
//! sequence preserves manifest input order even though completion order is
//! unordered. It never raises for partial failure: an all-failed batch is
//! still a successfully returned report.

use futures::stream::{self, StreamExt};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::fetcher::Fetcher;
use crate::manifest::WorkManifest;
use crate::pusher::Pusher;
use crate::sink::HttpObjectSink;
use crate::types::{BatchReport, Direction, TransferItem, TransferOutcome};

/// Orchestrates a batch of items through the Fetcher or Pusher
#[derive(Clone, Debug)]
pub struct TransferCoordinator {
    fetcher: Arc<Fetcher>,
    pusher: Arc<Pusher>,
    fetch_concurrency: usize,
    push_concurrency: usize,
    cancel: CancellationToken,
}

impl TransferCoordinator {
    /// Build a coordinator from configuration
    ///
    /// Constructs the single shared HTTP client for the run and wires it into
    /// both the fetcher and the sink — no ambient global clients.
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.http.request_timeout)
            .connect_timeout(config.http.connect_timeout)
            .pool_max_idle_per_host(config.http.max_idle_connections)
            .build()
            .map_err(|e| Error::Config {
                message: format!("cannot build HTTP client: {}", e),
                key: None,
            })?;

        let fetcher = Fetcher::new(client.clone(), config.staging_root.clone());
        let sink = HttpObjectSink::new(client, &config.sink)?;
        let pusher = Pusher::new(
            Arc::new(sink),
            config.retry.clone(),
            config.sink.key_prefix.clone(),
        );

        Ok(Self::from_parts(
            fetcher,
            pusher,
            config.transfer.fetch_concurrency,
            config.transfer.push_concurrency,
        ))
    }

    /// Assemble a coordinator from pre-built components
    ///
    /// Useful for injecting a custom sink or client in tests.
    pub fn from_parts(
        fetcher: Fetcher,
        pusher: Pusher,
        fetch_concurrency: usize,
        push_concurrency: usize,
    ) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            pusher: Arc::new(pusher),
            fetch_concurrency: fetch_concurrency.max(1),
            push_concurrency: push_concurrency.max(1),
            cancel: CancellationToken::new(),
        }
    }

    /// Token observed before admitting each item
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Stop admitting new items; in-flight attempts run to completion
    pub fn shutdown(&self) {
        tracing::info!("shutdown requested, no new transfers will be admitted");
        self.cancel.cancel();
    }

    /// Run a batch in the given direction, yielding one outcome per item
    pub async fn run(&self, manifest: &WorkManifest, direction: Direction) -> BatchReport {
        let report = match direction {
            Direction::Fetch => self.run_fetch(manifest).await,
            Direction::Push => self.run_push(manifest).await,
        };

        tracing::info!(
            ?direction,
            total = report.total,
            succeeded = report.succeeded,
            failed = report.failed,
            "batch complete"
        );
        report
    }

    async fn run_fetch(&self, manifest: &WorkManifest) -> BatchReport {
        let indexed = self
            .admit(manifest, self.fetch_concurrency, |item| {
                let fetcher = Arc::clone(&self.fetcher);
                async move {
                    match fetcher.fetch(&item).await {
                        Ok(_asset) => TransferOutcome::success(item, 1),
                        Err(e) => TransferOutcome::failed(item, &e, 1),
                    }
                }
            })
            .await;

        Self::into_report(indexed)
    }

    async fn run_push(&self, manifest: &WorkManifest) -> BatchReport {
        let indexed = self
            .admit(manifest, self.push_concurrency, |item| {
                let pusher = Arc::clone(&self.pusher);
                async move {
                    let path = Path::new(&item.reference).to_path_buf();
                    let (result, attempts) = pusher.push(&path).await;
                    match result {
                        Ok(_location) => TransferOutcome::success(item, attempts),
                        Err(e) => TransferOutcome::failed(item, &e, attempts),
                    }
                }
            })
            .await;

        Self::into_report(indexed)
    }

    /// Run `process` over every item under the direction's admission limit
    ///
    /// Each item is paired with its manifest index so the report can be
    /// re-sorted into input order after unordered completion. Once the
    /// cancellation token fires, remaining items are recorded without being
    /// started.
    async fn admit<F, Fut>(
        &self,
        manifest: &WorkManifest,
        concurrency: usize,
        process: F,
    ) -> Vec<(usize, TransferOutcome)>
    where
        F: Fn(TransferItem) -> Fut,
        Fut: std::future::Future<Output = TransferOutcome>,
    {
        let cancel = &self.cancel;
        let process = &process;

        stream::iter(manifest.items().iter().cloned().enumerate())
            .map(|(index, item)| async move {
                if cancel.is_cancelled() {
                    return (index, TransferOutcome::cancelled(item));
                }
                (index, process(item).await)
            })
            .buffer_unordered(concurrency)
            .collect()
            .await
    }

    fn into_report(mut indexed: Vec<(usize, TransferOutcome)>) -> BatchReport {
        indexed.sort_by_key(|(index, _)| *index);
        BatchReport::from_outcomes(indexed.into_iter().map(|(_, outcome)| outcome).collect())
    }
}
