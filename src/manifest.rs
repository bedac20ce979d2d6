//! Work manifest loading
//!
//! A manifest is a JSON array of string references — URLs for the fetch
//! direction, local paths for the push direction. Malformed entries
//! (non-string, empty) are skipped with a logged warning. Only a manifest
//! that cannot be read or parsed at all aborts the batch, before any item
//! is processed.

use std::path::Path;

use crate::error::{Error, Result};
use crate::types::TransferItem;

/// Ordered list of transfer items for a batch run
#[derive(Clone, Debug)]
pub struct WorkManifest {
    items: Vec<TransferItem>,
}

impl WorkManifest {
    /// Load a manifest from a JSON file containing an array of references
    pub async fn load(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::Manifest(format!("cannot read {}: {}", path.display(), e)))?;
        Self::parse(&raw)
    }

    /// Parse manifest content from a JSON string
    pub fn parse(raw: &str) -> Result<Self> {
        let values: Vec<serde_json::Value> = serde_json::from_str(raw)
            .map_err(|e| Error::Manifest(format!("expected a JSON array of strings: {}", e)))?;

        let mut items = Vec::with_capacity(values.len());
        for (index, value) in values.iter().enumerate() {
            match value.as_str() {
                Some(s) if !s.trim().is_empty() => {
                    items.push(TransferItem::new(s.trim()));
                }
                Some(_) => {
                    tracing::warn!(index, "skipping empty manifest entry");
                }
                None => {
                    tracing::warn!(index, "skipping non-string manifest entry");
                }
            }
        }

        Ok(Self { items })
    }

    /// Build a manifest directly from references (e.g. staged file paths)
    pub fn from_references<I, S>(references: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            items: references.into_iter().map(TransferItem::new).collect(),
        }
    }

    /// The ordered transfer items
    pub fn items(&self) -> &[TransferItem] {
        &self.items
    }

    /// Number of items in the manifest
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if the manifest holds no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
