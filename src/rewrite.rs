//! Content URL rewriting against a precomputed mapping
//!
//! After a batch has been pushed, documents referencing the original image
//! URLs need those references swapped for the sink locations. This is pure
//! string substitution: image URLs whose basename appears in the mapping are
//! replaced, everything else passes through unchanged.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{Error, Result};

/// Image URL pattern matched inside content
const IMAGE_URL_PATTERN: &str = r"(?i)https?://[^\s]+\.(?:webp|png|jpg|jpeg)";

/// One filename-to-location mapping entry
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MappingEntry {
    /// Original basename of the asset (e.g. "photo.png")
    pub name: String,
    /// Replacement location (the sink-assigned URL)
    pub path: String,
}

/// Rewrites image URLs in content using a basename-keyed mapping
#[derive(Clone, Debug)]
pub struct UrlRewriter {
    map: HashMap<String, String>,
    pattern: Regex,
}

impl UrlRewriter {
    /// Build a rewriter from mapping entries
    pub fn new(entries: Vec<MappingEntry>) -> Result<Self> {
        let pattern = Regex::new(IMAGE_URL_PATTERN)
            .map_err(|e| Error::Other(format!("invalid URL pattern: {}", e)))?;

        Ok(Self {
            map: entries.into_iter().map(|e| (e.name, e.path)).collect(),
            pattern,
        })
    }

    /// Load mapping entries from a JSON file (`[{ "name": ..., "path": ... }]`)
    pub async fn load(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path).await?;
        let entries: Vec<MappingEntry> = serde_json::from_str(&raw)?;
        Self::new(entries)
    }

    /// Number of mapping entries
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// True if the mapping is empty
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Replace every mapped image URL in `content`
    ///
    /// A URL is looked up by its basename; URLs without a mapping are left
    /// untouched.
    pub fn rewrite(&self, content: &str) -> String {
        self.pattern
            .replace_all(content, |caps: &regex::Captures<'_>| {
                let url = &caps[0];
                match url.rsplit('/').next().and_then(|name| self.map.get(name)) {
                    Some(replacement) => replacement.clone(),
                    None => url.to_string(),
                }
            })
            .into_owned()
    }
}
