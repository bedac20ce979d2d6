//! Error types for asset-relay
//!
//! This module provides error handling for the transfer engine, including:
//! - Domain-specific error variants (manifest, network, sink, filesystem)
//! - A single classification point ([`Error::classify`]) that tags each error
//!   as retryable, non-retryable, or fatal
//!
//! Per-item errors are always caught inside the Fetcher/Pusher and converted
//! into a [`TransferOutcome`](crate::types::TransferOutcome); only manifest
//! loading can abort a batch before any item is processed.

use thiserror::Error;

/// Result type alias for asset-relay operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for asset-relay
///
/// Each variant includes contextual information to help diagnose issues.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "sink.endpoint")
        key: Option<String>,
    },

    /// Manifest could not be read or parsed (the only batch-aborting condition)
    #[error("manifest error: {0}")]
    Manifest(String),

    /// Reference could not be parsed as a usable URL or path
    #[error("invalid reference: {0}")]
    Parse(String),

    /// Network error from the HTTP transport
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Fetch source answered with a non-success HTTP status
    #[error("unexpected HTTP status {status} fetching {url}")]
    HttpStatus {
        /// The HTTP status code returned by the origin
        status: u16,
        /// The URL that was being fetched
        url: String,
    },

    /// The object-storage sink rejected the request
    #[error("sink rejected request (status {status}): {message}")]
    SinkRejected {
        /// The HTTP status code returned by the sink
        status: u16,
        /// The response body or reason supplied by the sink
        message: String,
    },

    /// I/O error (staging directory creation, file read/write)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Shutdown in progress - not admitting new transfers
    #[error("shutdown in progress: not admitting new transfers")]
    ShuttingDown,

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Tagged error classification, produced once at the point an error is caught
///
/// Call sites act on the tag instead of re-inspecting raw error shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    /// Transient failure - the operation may succeed if retried after a delay
    Retryable,
    /// Permanent failure for this item - retrying cannot help
    NonRetryable,
    /// Batch-level failure - no items can be processed at all
    Fatal,
}

impl Error {
    /// Classify this error into a retry category
    ///
    /// Network connectivity problems and timeouts are transient. Sink
    /// rejections are transient only when the status indicates server-side
    /// trouble (408, 429, 5xx); authentication and validation failures are
    /// permanent. Manifest and configuration errors are fatal because they
    /// occur before any item is processed.
    pub fn classify(&self) -> ErrorClass {
        match self {
            Error::Network(e) => {
                if e.is_timeout() || e.is_connect() {
                    ErrorClass::Retryable
                } else {
                    ErrorClass::NonRetryable
                }
            }
            Error::Io(e) => match e.kind() {
                std::io::ErrorKind::TimedOut
                | std::io::ErrorKind::ConnectionRefused
                | std::io::ErrorKind::ConnectionReset
                | std::io::ErrorKind::ConnectionAborted
                | std::io::ErrorKind::NotConnected
                | std::io::ErrorKind::BrokenPipe
                | std::io::ErrorKind::Interrupted => ErrorClass::Retryable,
                _ => ErrorClass::NonRetryable,
            },
            Error::SinkRejected { status, .. } => match status {
                408 | 429 | 500..=599 => ErrorClass::Retryable,
                _ => ErrorClass::NonRetryable,
            },
            // Fetch failures are reported once, never retried
            Error::HttpStatus { .. } => ErrorClass::NonRetryable,
            Error::Parse(_) => ErrorClass::NonRetryable,
            Error::Serialization(_) => ErrorClass::NonRetryable,
            Error::ShuttingDown => ErrorClass::NonRetryable,
            Error::Manifest(_) | Error::Config { .. } => ErrorClass::Fatal,
            Error::Other(_) => ErrorClass::NonRetryable,
        }
    }
}
