//! Fetcher — pulls remote resources into partitioned local staging
//!
//! Each fetch is isolated: a network or HTTP failure produces a per-item
//! error for the caller to record, never aborting the rest of the batch.
//! Fetches are not retried — a failed fetch is reported once.

use std::path::{Path, PathBuf};
use url::Url;

use crate::error::{Error, Result};
use crate::partition::PartitionResolver;
use crate::types::{ItemKind, StoredAsset, TransferItem};
use crate::utils;

/// Pulls one remote resource at a time into the staging tree
#[derive(Clone, Debug)]
pub struct Fetcher {
    client: reqwest::Client,
    staging_root: PathBuf,
    resolver: PartitionResolver,
}

impl Fetcher {
    /// Create a fetcher over a shared HTTP client and staging root
    pub fn new(client: reqwest::Client, staging_root: impl Into<PathBuf>) -> Self {
        Self {
            client,
            staging_root: staging_root.into(),
            resolver: PartitionResolver,
        }
    }

    /// The staging root this fetcher writes under
    pub fn staging_root(&self) -> &Path {
        &self.staging_root
    }

    /// Fetch one item into `staging_root/<year>/<month>/<basename>`
    ///
    /// Directory creation is idempotent and an existing file at the
    /// destination is overwritten; partition plus basename derivation is
    /// deterministic, so repeat fetches of the same reference land on the
    /// same path with the latest content.
    pub async fn fetch(&self, item: &TransferItem) -> Result<StoredAsset> {
        if item.kind != ItemKind::Source {
            return Err(Error::Parse(format!(
                "cannot fetch non-URL reference: {}",
                item.reference
            )));
        }

        let url = Url::parse(&item.reference)
            .map_err(|e| Error::Parse(format!("{}: {}", item.reference, e)))?;
        let file_name = utils::file_name_from_url(&url)
            .ok_or_else(|| Error::Parse(format!("no filename in {}", item.reference)))?;

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                url: item.reference.clone(),
            });
        }

        let header_content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());

        let body = response.bytes().await?;

        let partition = self.resolver.resolve(&item.reference);
        let dir = self.staging_root.join(partition.relative_dir());
        tokio::fs::create_dir_all(&dir).await?;

        let local_path = dir.join(&file_name);
        tokio::fs::write(&local_path, &body).await?;

        let content_type = header_content_type
            .unwrap_or_else(|| utils::content_type_for(Path::new(&file_name)).to_string());

        tracing::info!(
            reference = %item.reference,
            path = %local_path.display(),
            bytes = body.len(),
            "fetched into staging"
        );

        Ok(StoredAsset {
            local_path,
            byte_size: body.len() as u64,
            content_type,
        })
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn fetch_writes_into_partition_directory() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/assets/2023/07/photo.png"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(b"png bytes".to_vec())
                    .insert_header("content-type", "image/png"),
            )
            .mount(&server)
            .await;

        let staging = tempfile::tempdir().unwrap();
        let fetcher = Fetcher::new(reqwest::Client::new(), staging.path());

        let item = TransferItem::new(format!("{}/assets/2023/07/photo.png", server.uri()));
        let asset = fetcher.fetch(&item).await.unwrap();

        let expected = staging.path().join("2023").join("07").join("photo.png");
        assert_eq!(asset.local_path, expected);
        assert_eq!(asset.byte_size, 9);
        assert_eq!(asset.content_type, "image/png");
        assert_eq!(std::fs::read(&expected).unwrap(), b"png bytes");
    }

    #[tokio::test]
    async fn refetch_overwrites_at_deterministic_path() {
        let server = MockServer::start().await;
        let staging = tempfile::tempdir().unwrap();
        let fetcher = Fetcher::new(reqwest::Client::new(), staging.path());
        let item = TransferItem::new(format!("{}/assets/2023/07/photo.png", server.uri()));

        let first = Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"old content".to_vec()))
            .expect(1)
            .mount_as_scoped(&server)
            .await;
        fetcher.fetch(&item).await.unwrap();
        drop(first);

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"new content".to_vec()))
            .mount(&server)
            .await;
        let asset = fetcher.fetch(&item).await.unwrap();

        // One file, latest content
        let dir = staging.path().join("2023").join("07");
        let entries: Vec<_> = std::fs::read_dir(&dir).unwrap().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(std::fs::read(&asset.local_path).unwrap(), b"new content");
    }

    #[tokio::test]
    async fn non_success_status_is_item_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let staging = tempfile::tempdir().unwrap();
        let fetcher = Fetcher::new(reqwest::Client::new(), staging.path());
        let item = TransferItem::new(format!("{}/missing.png", server.uri()));

        let err = fetcher.fetch(&item).await.unwrap_err();
        assert!(matches!(err, Error::HttpStatus { status: 404, .. }));
    }

    #[tokio::test]
    async fn undated_url_lands_in_current_date_partition() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"x".to_vec()))
            .mount(&server)
            .await;

        let staging = tempfile::tempdir().unwrap();
        let fetcher = Fetcher::new(reqwest::Client::new(), staging.path());
        let item = TransferItem::new(format!("{}/photo.png", server.uri()));

        let asset = fetcher.fetch(&item).await.unwrap();
        let now = chrono::Utc::now();
        let expected = staging
            .path()
            .join(now.format("%Y").to_string())
            .join(now.format("%m").to_string())
            .join("photo.png");
        assert_eq!(asset.local_path, expected);
    }

    #[tokio::test]
    async fn missing_content_type_falls_back_to_extension() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"x".to_vec()))
            .mount(&server)
            .await;

        let staging = tempfile::tempdir().unwrap();
        let fetcher = Fetcher::new(reqwest::Client::new(), staging.path());
        let item = TransferItem::new(format!("{}/2023/07/photo.webp", server.uri()));

        let asset = fetcher.fetch(&item).await.unwrap();
        assert_eq!(asset.content_type, "image/webp");
    }

    #[tokio::test]
    async fn local_reference_is_rejected() {
        let staging = tempfile::tempdir().unwrap();
        let fetcher = Fetcher::new(reqwest::Client::new(), staging.path());

        let err = fetcher
            .fetch(&TransferItem::new("/local/path.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }
}
