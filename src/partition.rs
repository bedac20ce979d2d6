//! Date-based staging partition resolution
//!
//! Staged assets live under `<staging_root>/<year>/<month>`. The partition is
//! derived from the source URL when its path encodes a date (a 4-digit segment
//! immediately followed by a 2-digit segment), falling back to the processing
//! date otherwise. The fallback is the designed default path, not a failure.

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use url::Url;

/// Year/month directory grouping for the local staging tree
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartitionKey {
    /// 4-digit year
    pub year: String,
    /// Zero-padded 2-digit month
    pub month: String,
}

impl PartitionKey {
    /// Partition for a given instant (used as the fallback)
    pub fn from_date(date: DateTime<Utc>) -> Self {
        Self {
            year: date.format("%Y").to_string(),
            month: date.format("%m").to_string(),
        }
    }

    /// Relative directory under the staging root (`year/month`)
    pub fn relative_dir(&self) -> PathBuf {
        PathBuf::from(&self.year).join(&self.month)
    }
}

/// Derives a deterministic staging partition for a source reference
#[derive(Clone, Copy, Debug, Default)]
pub struct PartitionResolver;

impl PartitionResolver {
    /// Resolve the partition for a reference
    ///
    /// Scans URL path segments in order and takes the first adjacent pair of
    /// a 4-digit token followed by a 2-digit token as year/month. Malformed
    /// URLs and undated paths resolve to the current date.
    pub fn resolve(&self, reference: &str) -> PartitionKey {
        if let Ok(url) = Url::parse(reference) {
            if let Some(segments) = url.path_segments() {
                let parts: Vec<&str> = segments.collect();
                for pair in parts.windows(2) {
                    if is_digits(pair[0], 4) && is_digits(pair[1], 2) {
                        return PartitionKey {
                            year: pair[0].to_string(),
                            month: pair[1].to_string(),
                        };
                    }
                }
            }
        }

        PartitionKey::from_date(Utc::now())
    }
}

fn is_digits(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_digit())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_dated_url() {
        let key = PartitionResolver.resolve("https://host/assets/2023/07/photo.png");
        assert_eq!(key.year, "2023");
        assert_eq!(key.month, "07");
    }

    #[test]
    fn takes_first_matching_pair() {
        let key = PartitionResolver.resolve("https://host/2021/03/archive/2022/11/photo.png");
        assert_eq!(key.year, "2021");
        assert_eq!(key.month, "03");
    }

    #[test]
    fn ignores_non_adjacent_tokens() {
        // Year and month separated by another segment do not form a pair
        let key = PartitionResolver.resolve("https://host/2023/assets/07/photo.png");
        let now = PartitionKey::from_date(Utc::now());
        assert_eq!(key, now);
    }

    #[test]
    fn undated_url_falls_back_to_processing_date() {
        let key = PartitionResolver.resolve("https://host/assets/photo.png");
        let now = PartitionKey::from_date(Utc::now());
        assert_eq!(key, now);
        assert_eq!(key.year.len(), 4);
        assert_eq!(key.month.len(), 2);
    }

    #[test]
    fn malformed_reference_falls_back_without_error() {
        let key = PartitionResolver.resolve("not a url at all");
        let now = PartitionKey::from_date(Utc::now());
        assert_eq!(key, now);
    }

    #[test]
    fn month_must_be_exactly_two_digits() {
        let key = PartitionResolver.resolve("https://host/2023/7/photo.png");
        let now = PartitionKey::from_date(Utc::now());
        assert_eq!(key, now, "single-digit month segment does not match");
    }

    #[test]
    fn relative_dir_joins_year_and_month() {
        let key = PartitionKey {
            year: "2023".to_string(),
            month: "07".to_string(),
        };
        assert_eq!(key.relative_dir(), PathBuf::from("2023").join("07"));
    }

    #[test]
    fn resolution_is_deterministic() {
        let a = PartitionResolver.resolve("https://host/assets/2023/07/photo.png");
        let b = PartitionResolver.resolve("https://host/assets/2023/07/photo.png");
        assert_eq!(a, b);
    }
}
