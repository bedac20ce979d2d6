//! Pusher — streams staged files to the object-storage sink
//!
//! This is the one place where resource usage scales with concurrency rather
//! than batch size: each attempt streams the file body instead of buffering
//! it, so peak memory stays bounded regardless of file or batch size. The
//! pusher owns the retry/backoff policy; the coordinator above it never
//! retries on its own.

use std::path::Path;
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use crate::config::RetryConfig;
use crate::error::{Error, Result};
use crate::retry::retry_with_backoff;
use crate::sink::ObjectSink;
use crate::utils;

/// Pushes local files to the sink under a flat `<prefix>/<basename>` namespace
#[derive(Clone)]
pub struct Pusher {
    sink: Arc<dyn ObjectSink>,
    retry: RetryConfig,
    key_prefix: String,
}

impl Pusher {
    /// Create a pusher over an injected sink with the given retry policy
    pub fn new(
        sink: Arc<dyn ObjectSink>,
        retry: RetryConfig,
        key_prefix: impl Into<String>,
    ) -> Self {
        Self {
            sink,
            retry,
            key_prefix: key_prefix.into(),
        }
    }

    /// Push one file, returning the sink location and the attempt count
    ///
    /// Retryable failures (connectivity, timeout, sink unavailability) back
    /// off exponentially between attempts, up to the configured ceiling.
    /// Non-retryable rejections short-circuit immediately. The attempt count
    /// is always at least 1.
    pub async fn push(&self, file_path: &Path) -> (Result<String>, u32) {
        let Some(file_name) = file_path.file_name().and_then(|n| n.to_str()) else {
            return (
                Err(Error::Parse(format!(
                    "no filename in path {}",
                    file_path.display()
                ))),
                1,
            );
        };

        let key = format!("{}/{}", self.key_prefix, file_name);
        let content_type = utils::content_type_for(file_path);

        let (result, attempts) = retry_with_backoff(&self.retry, || {
            let sink = Arc::clone(&self.sink);
            let key = key.clone();
            let file_path = file_path.to_path_buf();
            async move {
                // Reopen per attempt: a streamed body cannot be rewound
                let file = tokio::fs::File::open(&file_path).await?;
                let content_length = file.metadata().await?.len();
                let body = reqwest::Body::wrap_stream(ReaderStream::new(file));

                sink.put_object(&key, body, content_type, content_length)
                    .await
            }
        })
        .await;

        match &result {
            Ok(location) => {
                tracing::info!(key = %key, location = %location, attempts, "pushed to sink");
            }
            Err(e) => {
                tracing::warn!(key = %key, attempts, error = %e, "push failed");
            }
        }

        (result, attempts)
    }
}

impl std::fmt::Debug for Pusher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pusher")
            .field("retry", &self.retry)
            .field("key_prefix", &self.key_prefix)
            .finish_non_exhaustive()
    }
}
