//! Object-storage sink abstraction
//!
//! The sink is the remote destination for pushed assets. It is modeled as an
//! explicitly constructed, dependency-injected trait object rather than an
//! ambient global client: one instance per run, shared read-only across tasks.

use async_trait::async_trait;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use url::Url;

use crate::config::SinkConfig;
use crate::error::{Error, Result};

/// A PUT-style object-storage destination
///
/// Takes a key, a byte stream, a content type, and a content length; returns
/// the sink-assigned location identifier. Errors come back already classified
/// by [`Error::classify`] — transport and timeout failures are retryable,
/// authentication and validation rejections are not.
#[async_trait]
pub trait ObjectSink: Send + Sync {
    /// Store an object under `key`, streaming `body` to the sink
    async fn put_object(
        &self,
        key: &str,
        body: reqwest::Body,
        content_type: &str,
        content_length: u64,
    ) -> Result<String>;
}

/// HTTP object-storage sink writing to `<endpoint>/<bucket>/<key>`
#[derive(Clone, Debug)]
pub struct HttpObjectSink {
    client: reqwest::Client,
    endpoint: Url,
    bucket: String,
}

impl HttpObjectSink {
    /// Create a sink from a shared HTTP client and sink configuration
    pub fn new(client: reqwest::Client, config: &SinkConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint).map_err(|e| Error::Config {
            message: format!("invalid sink endpoint '{}': {}", config.endpoint, e),
            key: Some("sink.endpoint".to_string()),
        })?;

        Ok(Self {
            client,
            endpoint,
            bucket: config.bucket.clone(),
        })
    }

    fn object_url(&self, key: &str) -> Result<Url> {
        let base = self.endpoint.as_str().trim_end_matches('/');
        let full = format!("{}/{}/{}", base, self.bucket, key);
        Url::parse(&full).map_err(|e| Error::Parse(format!("invalid object key '{}': {}", key, e)))
    }
}

#[async_trait]
impl ObjectSink for HttpObjectSink {
    async fn put_object(
        &self,
        key: &str,
        body: reqwest::Body,
        content_type: &str,
        content_length: u64,
    ) -> Result<String> {
        let url = self.object_url(key)?;

        let response = self
            .client
            .put(url.clone())
            .header(CONTENT_TYPE, content_type)
            .header(CONTENT_LENGTH, content_length)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(key = %key, location = %url, "object stored");
            Ok(url.to_string())
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(Error::SinkRejected {
                status: status.as_u16(),
                message,
            })
        }
    }
}
