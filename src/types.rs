//! Core types for asset-relay

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::Error;

/// Transfer direction for a batch run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Pull remote resources into the local staging tree
    Fetch,
    /// Push staged files to the object-storage sink
    Push,
}

/// Kind of reference a manifest entry carries
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// Remote HTTP(S) URL to fetch from
    Source,
    /// Local file path to push from
    Local,
}

/// A single unit of transfer work, immutable once read from the manifest
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferItem {
    /// The source URL or local path
    pub reference: String,
    /// Whether the reference is remote or local
    pub kind: ItemKind,
}

impl TransferItem {
    /// Create an item, detecting the kind from the reference scheme
    pub fn new(reference: impl Into<String>) -> Self {
        let reference = reference.into();
        let kind = if reference.starts_with("http://") || reference.starts_with("https://") {
            ItemKind::Source
        } else {
            ItemKind::Local
        };
        Self { reference, kind }
    }
}

impl std::fmt::Display for TransferItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reference)
    }
}

/// A fetched asset sitting in the staging tree, pending push
///
/// Created exclusively by the Fetcher; the Pusher only reads it. Nothing
/// deletes staged files during a run — staging is append-only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredAsset {
    /// Location under the staging root (`<root>/<year>/<month>/<basename>`)
    pub local_path: PathBuf,
    /// Size of the written file in bytes
    pub byte_size: u64,
    /// Content type, from the origin's response header or the file extension
    pub content_type: String,
}

/// Terminal status of a transfer item
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    /// The item reached its destination
    Success,
    /// The item failed after all applicable retries
    Failed,
}

/// Terminal per-item result, one per manifest entry
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransferOutcome {
    /// The manifest item this outcome belongs to
    pub item: TransferItem,
    /// Terminal status after all applicable retries
    pub status: TransferStatus,
    /// Cause of failure, if any
    pub error: Option<String>,
    /// Number of attempts made (0 only for items never admitted due to shutdown)
    pub attempts: u32,
}

impl TransferOutcome {
    /// Successful outcome after `attempts` attempts
    pub fn success(item: TransferItem, attempts: u32) -> Self {
        Self {
            item,
            status: TransferStatus::Success,
            error: None,
            attempts,
        }
    }

    /// Failed outcome carrying the terminal cause
    pub fn failed(item: TransferItem, error: &Error, attempts: u32) -> Self {
        Self {
            item,
            status: TransferStatus::Failed,
            error: Some(error.to_string()),
            attempts,
        }
    }

    /// Outcome for an item that was never admitted because the batch was
    /// cancelled; `attempts` is 0 since no work was started
    pub fn cancelled(item: TransferItem) -> Self {
        Self {
            item,
            status: TransferStatus::Failed,
            error: Some(Error::ShuttingDown.to_string()),
            attempts: 0,
        }
    }

    /// True if the item succeeded
    pub fn is_success(&self) -> bool {
        self.status == TransferStatus::Success
    }
}

/// Machine-readable summary of a completed batch run
///
/// Outcomes preserve manifest input order regardless of completion order.
/// A run that failed every item is still a successfully returned report;
/// the failed count and per-item causes are the sole failure surface.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BatchReport {
    /// Number of items in the batch
    pub total: usize,
    /// Number of items that succeeded
    pub succeeded: usize,
    /// Number of items that failed
    pub failed: usize,
    /// Per-item outcomes in manifest order
    pub outcomes: Vec<TransferOutcome>,
}

impl BatchReport {
    /// Build a report from outcomes already in manifest order
    pub fn from_outcomes(outcomes: Vec<TransferOutcome>) -> Self {
        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        Self {
            total: outcomes.len(),
            succeeded,
            failed: outcomes.len() - succeeded,
            outcomes,
        }
    }

    /// True when every item in the batch succeeded
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_kind_detected_from_scheme() {
        assert_eq!(
            TransferItem::new("https://host/a.png").kind,
            ItemKind::Source
        );
        assert_eq!(TransferItem::new("http://host/a.png").kind, ItemKind::Source);
        assert_eq!(
            TransferItem::new("/staging/2023/07/a.png").kind,
            ItemKind::Local
        );
        assert_eq!(TransferItem::new("relative/b.jpg").kind, ItemKind::Local);
    }

    #[test]
    fn report_counts_match_outcomes() {
        let outcomes = vec![
            TransferOutcome::success(TransferItem::new("https://host/a.png"), 1),
            TransferOutcome::failed(
                TransferItem::new("https://host/b.png"),
                &Error::HttpStatus {
                    status: 500,
                    url: "https://host/b.png".to_string(),
                },
                1,
            ),
            TransferOutcome::success(TransferItem::new("https://host/c.png"), 2),
        ];

        let report = BatchReport::from_outcomes(outcomes);
        assert_eq!(report.total, 3);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed, 1);
        assert!(!report.all_succeeded());
    }

    #[test]
    fn empty_report_is_all_succeeded() {
        let report = BatchReport::from_outcomes(Vec::new());
        assert_eq!(report.total, 0);
        assert!(report.all_succeeded());
    }

    #[test]
    fn cancelled_outcome_has_zero_attempts() {
        let outcome = TransferOutcome::cancelled(TransferItem::new("https://host/a.png"));
        assert_eq!(outcome.status, TransferStatus::Failed);
        assert_eq!(outcome.attempts, 0);
        assert!(outcome.error.unwrap().contains("shutdown"));
    }

    #[test]
    fn report_serializes_to_structured_json() {
        let report = BatchReport::from_outcomes(vec![TransferOutcome::success(
            TransferItem::new("https://host/a.png"),
            1,
        )]);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["total"], 1);
        assert_eq!(json["succeeded"], 1);
        assert_eq!(json["outcomes"][0]["status"], "success");
        assert_eq!(json["outcomes"][0]["item"]["kind"], "source");
    }
}
