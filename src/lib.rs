//! # asset-relay
//!
//! Resilient bulk transfer engine for binary assets. Moves a manifest of
//! work items between three tiers: arbitrary HTTP origins, a date-partitioned
//! local staging tree, and an object-storage sink.
//!
//! ## Design Philosophy
//!
//! asset-relay is designed to be:
//! - **Failure-isolating** - One bad item never aborts the rest of the batch
//! - **Bounded** - Push admission and per-file memory stay constant as batches grow
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Explicit** - Clients and sinks are constructed and injected, never ambient
//!
//! ## Quick Start
//!
//! ```no_run
//! use asset_relay::{Config, Direction, TransferCoordinator, WorkManifest};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let coordinator = TransferCoordinator::new(&config)?;
//!
//!     let manifest = WorkManifest::load(Path::new("manifest.json")).await?;
//!     let report = coordinator.run(&manifest, Direction::Fetch).await;
//!
//!     println!("{}", serde_json::to_string_pretty(&report)?);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Batch orchestration across fetch and push directions
pub mod coordinator;
/// Error types
pub mod error;
/// Remote-to-staging fetch pipeline
pub mod fetcher;
/// Work manifest loading
pub mod manifest;
/// Date-based staging partition resolution
pub mod partition;
/// Staging-to-sink push pipeline
pub mod pusher;
/// Retry logic with exponential backoff
pub mod retry;
/// Content URL rewriting against a precomputed mapping
pub mod rewrite;
/// Object-storage sink abstraction
pub mod sink;
/// Core types and batch reports
pub mod types;
/// Utility functions
pub mod utils;

// Re-export commonly used types
pub use config::{Config, HttpConfig, RetryConfig, SinkConfig, TransferConfig};
pub use coordinator::TransferCoordinator;
pub use error::{Error, ErrorClass, Result};
pub use fetcher::Fetcher;
pub use manifest::WorkManifest;
pub use partition::{PartitionKey, PartitionResolver};
pub use pusher::Pusher;
pub use rewrite::{MappingEntry, UrlRewriter};
pub use sink::{HttpObjectSink, ObjectSink};
pub use types::{
    BatchReport, Direction, ItemKind, StoredAsset, TransferItem, TransferOutcome, TransferStatus,
};

/// Helper to run a coordinator until a termination signal arrives.
///
/// Waits for a signal and then calls [`TransferCoordinator::shutdown`], which
/// stops admitting new items while letting in-flight attempts finish.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use asset_relay::{Config, Direction, TransferCoordinator, WorkManifest, shutdown_on_signal};
/// use std::path::Path;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let coordinator = TransferCoordinator::new(&Config::default())?;
///
///     // Cancel the batch cleanly on SIGTERM/SIGINT
///     tokio::spawn(shutdown_on_signal(coordinator.clone()));
///
///     let manifest = WorkManifest::load(Path::new("manifest.json")).await?;
///     let report = coordinator.run(&manifest, Direction::Push).await;
///     println!("pushed {}/{}", report.succeeded, report.total);
///     Ok(())
/// }
/// ```
pub async fn shutdown_on_signal(coordinator: TransferCoordinator) {
    wait_for_signal().await;
    coordinator.shutdown();
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Signal registration may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("received SIGTERM signal");
            } else {
                tracing::error!("could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to listen for Ctrl+C signal");
        }
    }
}
